use std::io::Read;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use log::info;

use crate::fileformat::{
    read_per_sample_counts, read_per_sample_counts_file, ReportSink, ReportWriter, SampleCount,
    SampleMap, DEFAULT_COUNT_COLUMN,
};
use crate::jump::{evaluate, CalibrationPair, EstimationStrategy, JumpReport, SampleIndexTable};

pub const DEFAULT_PATH_CSV: &str = "Expected_False_Reads_Per_Index.csv";
pub const DEFAULT_PATH_SUMMARY: &str = "log.txt";

#[derive(Args)]
pub struct IndexJumpCMD {
    #[arg(short = 'i', value_parser)]
    /// Per-sample read counts (tab separated, e.g. per-sample-fastq-counts.tsv)
    pub path_counts: PathBuf,

    #[arg(short = 'm', value_parser)]
    /// Tab separated sample map with a True_False column
    pub path_sample_map: PathBuf,

    #[arg(short = 'c', long = "calibrator", value_parser = clap::value_parser!(CalibrationPair))]
    /// Calibrator tag pair as FWD,REV, e.g. 01,11. Can be given several times.
    /// Without calibrators the rate is estimated from the false samples in the sample map
    pub calibrators: Vec<CalibrationPair>,

    #[arg(short = 'o', value_parser, default_value = DEFAULT_PATH_CSV)]
    /// Where to store expected false reads per sample
    pub path_out: PathBuf,

    #[arg(short = 's', long = "summary", value_parser, default_value = DEFAULT_PATH_SUMMARY)]
    /// Where to store the run summary
    pub path_summary: PathBuf,

    #[arg(long = "count-column", default_value = DEFAULT_COUNT_COLUMN)]
    /// Column of the count table holding the read counts
    pub count_column: String,
}

impl IndexJumpCMD {
    /// Run the commandline option
    pub fn try_execute(&mut self) -> Result<()> {
        let max_false = IndexJump::run(&IndexJump {
            path_counts: self.path_counts.clone(),
            path_sample_map: self.path_sample_map.clone(),
            path_out: self.path_out.clone(),
            path_summary: self.path_summary.clone(),
            count_column: self.count_column.clone(),
            strategy: EstimationStrategy::from_pairs(self.calibrators.clone()),
        })?;

        println!("{}", max_false);
        log::info!("IndexJump has finished succesfully");
        Ok(())
    }
}

pub struct IndexJump {
    pub path_counts: PathBuf,
    pub path_sample_map: PathBuf,
    pub path_out: PathBuf,
    pub path_summary: PathBuf,
    pub count_column: String,
    pub strategy: EstimationStrategy,
}

impl IndexJump {
    ///////////////////////////////
    /// Run the algorithm. Returns the maximum number of false reads expected in a single sample
    pub fn run(params: &IndexJump) -> Result<u64> {
        let counts = read_per_sample_counts_file(&params.path_counts, &params.count_column)
            .with_context(|| format!("Failed to read counts from {}", params.path_counts.display()))?;
        let sample_map = SampleMap::read_file(&params.path_sample_map).with_context(|| {
            format!("Failed to read sample map {}", params.path_sample_map.display())
        })?;

        let report = IndexJump::compute(&counts, &sample_map, &params.strategy)?;

        //Only create output files once everything is computed
        let mut sink = ReportWriter::create(&params.path_out, &params.path_summary)?;
        sink.write_report(&report)?;

        Ok(report.max_expected_false_reads())
    }

    ///////////////////////////////
    /// Build the sample table and evaluate it
    pub fn compute(
        counts: &[SampleCount],
        sample_map: &SampleMap,
        strategy: &EstimationStrategy,
    ) -> Result<JumpReport> {
        let ids: Vec<&str> = counts.iter().map(|c| c.sample_id.as_str()).collect();
        let labels = sample_map.labels_for(&ids)?;

        let table = SampleIndexTable::from_counts(
            counts.iter().map(|c| (c.sample_id.as_str(), c.read_count)),
            &labels,
        )?;
        info!(
            "Loaded {} samples with {} reads",
            table.len(),
            table.total_reads()
        );

        let report = evaluate(&table, strategy)?;
        info!(
            "Jump rate {}, expecting at most {} false reads in a single sample",
            report.estimate.rate,
            report.max_expected_false_reads()
        );
        Ok(report)
    }

    ///////////////////////////////
    /// Same as run, but on in-memory inputs and an arbitrary sink
    pub fn run_with_sink(
        counts_src: impl Read,
        sample_map_src: impl Read,
        count_column: &str,
        strategy: &EstimationStrategy,
        sink: &mut impl ReportSink,
    ) -> Result<u64> {
        let counts = read_per_sample_counts(counts_src, count_column)?;
        let sample_map = SampleMap::read(sample_map_src)?;
        let report = IndexJump::compute(&counts, &sample_map, strategy)?;
        sink.write_report(&report)?;
        Ok(report.max_expected_false_reads())
    }
}
