use std::fs::File;
use std::io::Read;
use std::path::Path;

use log::debug;

use crate::runtime::Error;

/// Header names accepted for the sample identifier column
pub const SAMPLE_ID_COLUMNS: [&str; 5] = ["sample ID", "sample-id", "sampleid", "SampleID", "#SampleID"];

pub const DEFAULT_COUNT_COLUMN: &str = "forward sequence count";

///////////////////////////////
/// Read count of one sample, as listed in a demultiplexing summary
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SampleCount {
    pub sample_id: String,
    pub read_count: u64,
}

///////////////////////////////
/// Parse a read count. Summaries sometimes store counts as floats
fn parse_count(s: &str) -> Option<u64> {
    let s = s.trim();
    if let Ok(v) = s.parse::<u64>() {
        return Some(v);
    }
    match s.parse::<f64>() {
        Ok(v) if v >= 0.0 && v.fract() == 0.0 && v <= u64::MAX as f64 => Some(v as u64),
        _ => None,
    }
}

///////////////////////////////
/// Read a tab separated per-sample count table, such as per-sample-fastq-counts.tsv
pub fn read_per_sample_counts(src: impl Read, count_column: &str) -> Result<Vec<SampleCount>, Error> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .flexible(true)
        .from_reader(src);

    let headers = reader.headers()?.clone();
    let col_id = headers
        .iter()
        .position(|h| SAMPLE_ID_COLUMNS.contains(&h.trim()))
        .ok_or_else(|| {
            Error::parse_error(
                "per-sample counts",
                Some(format!(
                    "no sample identifier column, expected one of {:?}",
                    SAMPLE_ID_COLUMNS
                )),
            )
        })?;
    let col_count = headers
        .iter()
        .position(|h| h.trim() == count_column)
        .ok_or_else(|| {
            Error::parse_error(
                "per-sample counts",
                Some(format!("no column named '{}'", count_column)),
            )
        })?;

    let mut counts = Vec::new();
    for (line, result) in reader.records().enumerate() {
        let record = result?;
        let sample_id = record.get(col_id).unwrap_or("").trim();
        if sample_id.is_empty() {
            //Blank lines are fine, but a row with data and no sample would lose its reads
            if record.iter().all(|cell| cell.trim().is_empty()) {
                debug!("Skipping blank row {} of per-sample counts", line + 1);
                continue;
            }
            return Err(Error::parse_error(
                "per-sample counts",
                Some(format!("row {} has no sample identifier", line + 1)),
            ));
        }
        let raw = record.get(col_count).unwrap_or("");
        let read_count = parse_count(raw).ok_or_else(|| {
            Error::parse_error(
                "per-sample counts",
                Some(format!(
                    "'{}' is not a read count (sample '{}', row {})",
                    raw,
                    sample_id,
                    line + 1
                )),
            )
        })?;
        counts.push(SampleCount {
            sample_id: sample_id.to_string(),
            read_count,
        });
    }

    debug!("Read counts for {} samples", counts.len());
    Ok(counts)
}

pub fn read_per_sample_counts_file(
    path: impl AsRef<Path>,
    count_column: &str,
) -> Result<Vec<SampleCount>, Error> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(Error::file_not_found(path));
    }
    let file = File::open(path)?;
    read_per_sample_counts(file, count_column).map_err(|e| match e {
        Error::ParseError { msg, .. } => Error::file_not_valid(path, msg),
        e => e,
    })
}
