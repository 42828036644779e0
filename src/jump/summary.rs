use std::fmt;

use crate::jump::attribution::AttributionResult;
use crate::runtime::Error;

///////////////////////////////
/// Run level totals over all attributed samples
#[derive(Clone, Debug, PartialEq)]
pub struct RunSummary {
    pub jump_rate: f64,
    pub total_false_reads: u64,
    pub total_reads: u64,
    pub false_read_percentage: f64,

    //Largest number of false reads expected in any one sample
    pub max_expected_false_reads: u64,
}

impl RunSummary {
    pub fn summarize(
        jump_rate: f64,
        attributions: &[AttributionResult],
        total_reads: u64,
    ) -> Result<RunSummary, Error> {
        if total_reads == 0 {
            return Err(Error::division_by_zero("percentage of false reads"));
        }

        let total_false_reads: u64 = attributions.iter().map(|a| a.expected_false_reads).sum();
        let max_expected_false_reads = attributions
            .iter()
            .map(|a| a.expected_false_reads)
            .max()
            .unwrap_or(0);

        Ok(RunSummary {
            jump_rate,
            total_false_reads,
            total_reads,
            false_read_percentage: (total_false_reads as f64 / total_reads as f64) * 100.0,
            max_expected_false_reads,
        })
    }
}

///////////////////////////////
/// Shortest round-trip form of a rate, with the exponent written as sign and at least two digits (1e-05)
pub fn format_rate(rate: f64) -> String {
    let repr = format!("{:?}", rate);
    match repr.split_once('e') {
        Some((mantissa, exponent)) => {
            let (sign, digits) = match exponent.strip_prefix('-') {
                Some(digits) => ('-', digits),
                None => ('+', exponent),
            };
            format!("{}e{}{:0>2}", mantissa, sign, digits)
        }
        None => repr,
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Calculated Average jump rate: {}", format_rate(self.jump_rate))?;
        writeln!(
            f,
            "Total number of false reads: {} / {}",
            self.total_false_reads, self.total_reads
        )?;
        writeln!(f, "Total percent of false reads: {:.3}%", self.false_read_percentage)?;
        writeln!(
            f,
            "Maximum number of false reads expected in a single sample: {}",
            self.max_expected_false_reads
        )
    }
}
