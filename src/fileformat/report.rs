use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use log::info;

use crate::jump::{AttributionResult, JumpReport, RunSummary};
use crate::runtime::Error;

///////////////////////////////
/// Destination of the per-sample table and the run summary
pub trait ReportSink {
    fn write_attributions(&mut self, attributions: &[AttributionResult]) -> Result<(), Error>;
    fn write_summary(&mut self, summary: &RunSummary) -> Result<(), Error>;

    fn write_report(&mut self, report: &JumpReport) -> Result<(), Error> {
        self.write_attributions(&report.attributions)?;
        self.write_summary(&report.summary)
    }
}

///////////////////////////////
/// Writes the per-sample table as CSV and the summary as plain text
pub struct ReportWriter<C, S>
where
    C: Write,
    S: Write,
{
    csv_out: C,
    summary_out: S,
}

impl<C, S> ReportWriter<C, S>
where
    C: Write,
    S: Write,
{
    pub fn new(csv_out: C, summary_out: S) -> Self {
        Self {
            csv_out,
            summary_out,
        }
    }

    pub fn into_inner(self) -> (C, S) {
        (self.csv_out, self.summary_out)
    }
}

impl ReportWriter<BufWriter<File>, BufWriter<File>> {
    pub fn create(path_csv: impl AsRef<Path>, path_summary: impl AsRef<Path>) -> Result<Self, Error> {
        let csv_out = BufWriter::new(File::create(path_csv.as_ref())?);
        let summary_out = BufWriter::new(File::create(path_summary.as_ref())?);
        info!(
            "Writing expected false reads per sample to {}, summary to {}",
            path_csv.as_ref().display(),
            path_summary.as_ref().display()
        );
        Ok(Self::new(csv_out, summary_out))
    }
}

impl<C, S> ReportSink for ReportWriter<C, S>
where
    C: Write,
    S: Write,
{
    fn write_attributions(&mut self, attributions: &[AttributionResult]) -> Result<(), Error> {
        let mut writer = csv::Writer::from_writer(&mut self.csv_out);
        for attribution in attributions {
            writer.serialize(attribution)?;
        }
        writer.flush()?;
        Ok(())
    }

    fn write_summary(&mut self, summary: &RunSummary) -> Result<(), Error> {
        write!(self.summary_out, "{}", summary)?;
        self.summary_out.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_csv_and_summary() {
        let attributions = vec![
            AttributionResult {
                sample_id: "S01-11".to_string(),
                expected_false_reads: 4,
            },
            AttributionResult {
                sample_id: "S01-12".to_string(),
                expected_false_reads: 14,
            },
        ];
        let summary = RunSummary::summarize(0.1, &attributions, 300).unwrap();

        let mut sink = ReportWriter::new(Vec::new(), Vec::new());
        sink.write_attributions(&attributions).unwrap();
        sink.write_summary(&summary).unwrap();
        let (csv_out, summary_out) = sink.into_inner();

        assert_eq!(
            String::from_utf8(csv_out).unwrap(),
            "SampleIndex,Expected False Reads\nS01-11,4\nS01-12,14\n"
        );
        assert!(String::from_utf8(summary_out)
            .unwrap()
            .contains("Total number of false reads: 18 / 300"));
    }
}
