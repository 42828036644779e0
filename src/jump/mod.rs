pub mod attribution;
pub mod estimator;
pub mod sample_table;
pub mod summary;

pub use attribution::{attribute, attribute_over_axes, expected_false_reads, AttributionResult};
pub use estimator::{
    estimate_calibrated, estimate_jump_rate, estimate_uncalibrated, validate_calibration_pairs,
    CalibrationPair, EstimationStrategy, JumpRateEstimate,
};
pub use sample_table::{split_sample_id, SampleIndexTable, SampleRecord, MIN_SAMPLE_ID_LEN};
pub use summary::{format_rate, RunSummary};

use crate::runtime::Error;

///////////////////////////////
/// Everything computed for one run
#[derive(Clone, Debug, PartialEq)]
pub struct JumpReport {
    pub estimate: JumpRateEstimate,
    pub attributions: Vec<AttributionResult>,
    pub summary: RunSummary,
}

impl JumpReport {
    /// The number to use as a per-sample filtering threshold
    pub fn max_expected_false_reads(&self) -> u64 {
        self.summary.max_expected_false_reads
    }
}

///////////////////////////////
/// Estimate the jump rate, attribute it to every sample and summarize. Nothing partial is returned on error
pub fn evaluate(table: &SampleIndexTable, strategy: &EstimationStrategy) -> Result<JumpReport, Error> {
    let estimate = estimate_jump_rate(table, strategy)?;
    let attributions = attribute(table, &estimate)?;
    let summary = RunSummary::summarize(estimate.rate, &attributions, table.total_reads())?;
    Ok(JumpReport {
        estimate,
        attributions,
        summary,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn calibrated_run_without_jumps() {
        let table = SampleIndexTable::from_records(vec![
            SampleRecord::new("S01-11", 100, true).unwrap(),
            SampleRecord::new("S02-12", 0, false).unwrap(),
        ])
        .unwrap();
        let strategy = EstimationStrategy::Calibrated(vec![CalibrationPair::new("01", "11").unwrap()]);

        let report = evaluate(&table, &strategy).unwrap();
        assert_eq!(report.estimate.rate, 0.0);
        assert!(report.attributions.iter().all(|a| a.expected_false_reads == 0));
        assert_eq!(report.max_expected_false_reads(), 0);
    }

    #[test]
    fn evaluate_is_repeatable() {
        let table = SampleIndexTable::from_records(vec![
            SampleRecord::new("S01-11", 800, true).unwrap(),
            SampleRecord::new("S01-12", 12, false).unwrap(),
            SampleRecord::new("S02-11", 7, false).unwrap(),
            SampleRecord::new("S02-12", 640, true).unwrap(),
        ])
        .unwrap();
        let a = evaluate(&table, &EstimationStrategy::Uncalibrated).unwrap();
        let b = evaluate(&table, &EstimationStrategy::Uncalibrated).unwrap();
        assert_eq!(a, b);
        assert!(a.max_expected_false_reads() > 0);
    }
}
