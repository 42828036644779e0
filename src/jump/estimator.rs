use std::fmt;
use std::str::FromStr;

use log::{debug, info, warn};

use crate::jump::sample_table::{SampleIndexTable, INDEX_ID_LEN};
use crate::runtime::Error;

///////////////////////////////
/// A forward and a reverse index that by design each carry exactly one true sample.
/// Reads seen on any other combination with these indices must have jumped
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CalibrationPair {
    pub forward: String,
    pub reverse: String,
}

impl CalibrationPair {
    pub fn new(forward: &str, reverse: &str) -> Result<CalibrationPair, Error> {
        let pair = CalibrationPair {
            forward: forward.to_string(),
            reverse: reverse.to_string(),
        };
        pair.check_format()?;
        Ok(pair)
    }

    fn check_format(&self) -> Result<(), Error> {
        for tag in [&self.forward, &self.reverse] {
            if tag.chars().count() != INDEX_ID_LEN {
                return Err(Error::invalid_calibration_pair(
                    self.to_string(),
                    Some(format!("tag '{}' is not {} characters long", tag, INDEX_ID_LEN)),
                ));
            }
        }
        Ok(())
    }
}

impl FromStr for CalibrationPair {
    type Err = Error;

    /// Parse FWD,REV as given on the command line
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(',').map(|p| p.trim()).collect();
        if parts.len() != 2 {
            return Err(Error::invalid_calibration_pair(
                s,
                Some(format!("expected 2 comma separated tags, got {}", parts.len())),
            ));
        }
        CalibrationPair::new(parts[0], parts[1])
    }
}

impl fmt::Display for CalibrationPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.forward, self.reverse)
    }
}

///////////////////////////////
/// How to estimate the jump rate
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EstimationStrategy {
    /// From the reads on all samples flagged false in the sample map. A lower bound
    Uncalibrated,
    /// From the reads that land on combinations of known calibrator tags
    Calibrated(Vec<CalibrationPair>),
}

impl EstimationStrategy {
    pub fn from_pairs(pairs: Vec<CalibrationPair>) -> EstimationStrategy {
        if pairs.is_empty() {
            EstimationStrategy::Uncalibrated
        } else {
            EstimationStrategy::Calibrated(pairs)
        }
    }
}

///////////////////////////////
/// Run-wide probability of a read being assigned the wrong index
#[derive(Clone, Debug, PartialEq)]
pub struct JumpRateEstimate {
    pub rate: f64,

    //Per-tag false read fractions the rate was averaged from; empty when uncalibrated
    pub tag_fractions: Vec<f64>,
}

///////////////////////////////
/// Estimate the jump rate of a run with the given strategy
pub fn estimate_jump_rate(
    table: &SampleIndexTable,
    strategy: &EstimationStrategy,
) -> Result<JumpRateEstimate, Error> {
    match strategy {
        EstimationStrategy::Uncalibrated => estimate_uncalibrated(table),
        EstimationStrategy::Calibrated(pairs) => estimate_calibrated(table, pairs),
    }
}

///////////////////////////////
/// Rate = 2 * (reads on false samples) / (all reads). A jump can happen on either index, hence the 2
pub fn estimate_uncalibrated(table: &SampleIndexTable) -> Result<JumpRateEstimate, Error> {
    warn!(
        "No calibrator tags given. Calculating index jump rate based on the false samples in the sample map. \
         This estimate is lower than the true rate and false reads may be retained in the sample pool"
    );

    let total = table.total_reads();
    if total == 0 {
        return Err(Error::division_by_zero("uncalibrated jump rate"));
    }
    let summed_false = table.sum_counts(|r| !r.is_calibration_true);
    let rate = (summed_false as f64 / total as f64) * 2.0;

    info!("Uncalibrated jump rate {} ({} false reads of {})", rate, summed_false, total);
    Ok(JumpRateEstimate {
        rate,
        tag_fractions: Vec::new(),
    })
}

///////////////////////////////
/// Check that each tag of each pair has exactly one true sample. Every pair is checked before any rate is computed
pub fn validate_calibration_pairs(
    table: &SampleIndexTable,
    pairs: &[CalibrationPair],
) -> Result<(), Error> {
    info!("Validating calibrator tag input");
    for pair in pairs {
        pair.check_format()?;

        let fwd_true = table
            .with_forward(&pair.forward)
            .filter(|r| r.is_calibration_true)
            .count();
        if fwd_true != 1 {
            return Err(Error::invalid_calibration_pair(
                pair.to_string(),
                Some(format!(
                    "forward tag {} has {} true samples in the sample map, should have exactly one",
                    pair.forward, fwd_true
                )),
            ));
        }

        let rev_true = table
            .with_reverse(&pair.reverse)
            .filter(|r| r.is_calibration_true)
            .count();
        if rev_true != 1 {
            return Err(Error::invalid_calibration_pair(
                pair.to_string(),
                Some(format!(
                    "reverse tag {} has {} true samples in the sample map, should have exactly one",
                    pair.reverse, rev_true
                )),
            ));
        }
    }
    Ok(())
}

///////////////////////////////
/// Mean over all pairs of the false read fraction seen on the forward tag and on the reverse tag
pub fn estimate_calibrated(
    table: &SampleIndexTable,
    pairs: &[CalibrationPair],
) -> Result<JumpRateEstimate, Error> {
    if pairs.is_empty() {
        return Err(Error::invalid_calibration_pair(
            "[]",
            Some("at least one pair is needed"),
        ));
    }
    validate_calibration_pairs(table, pairs)?;

    let mut tag_fractions = Vec::with_capacity(pairs.len() * 2);
    for pair in pairs {
        let fwd_all = table.forward_total(&pair.forward);
        let fwd_false = table.sum_counts(|r| r.forward_index == pair.forward && !r.is_calibration_true);
        if fwd_all == 0 {
            return Err(Error::division_by_zero(format!(
                "jump rate for calibrator forward tag {}",
                pair.forward
            )));
        }

        let rev_all = table.reverse_total(&pair.reverse);
        let rev_false = table.sum_counts(|r| r.reverse_index == pair.reverse && !r.is_calibration_true);
        if rev_all == 0 {
            return Err(Error::division_by_zero(format!(
                "jump rate for calibrator reverse tag {}",
                pair.reverse
            )));
        }

        let fwd_rate = fwd_false as f64 / fwd_all as f64;
        let rev_rate = rev_false as f64 / rev_all as f64;
        debug!("Calibrator tags {}: forward rate {}, reverse rate {}", pair, fwd_rate, rev_rate);

        tag_fractions.push(fwd_rate);
        tag_fractions.push(rev_rate);
    }

    let rate = tag_fractions.iter().sum::<f64>() / tag_fractions.len() as f64;
    info!("Average jump rate over {} calibrator pairs: {}", pairs.len(), rate);
    Ok(JumpRateEstimate { rate, tag_fractions })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jump::SampleRecord;

    fn table(recs: &[(&str, u64, bool)]) -> SampleIndexTable {
        SampleIndexTable::from_records(
            recs.iter()
                .map(|(id, c, t)| SampleRecord::new(id, *c, *t).unwrap())
                .collect(),
        )
        .unwrap()
    }

    fn pair(f: &str, r: &str) -> CalibrationPair {
        CalibrationPair::new(f, r).unwrap()
    }

    //A 2x2 design where 01-11 and 02-12 are real and the cross combinations are jumps
    fn two_by_two() -> SampleIndexTable {
        table(&[
            ("S01-11", 90, true),
            ("S01-12", 10, false),
            ("S02-11", 5, false),
            ("S02-12", 95, true),
        ])
    }

    #[test]
    fn parse_pair() {
        assert_eq!("01,11".parse::<CalibrationPair>().unwrap(), pair("01", "11"));
        assert_eq!(" 02 , 12 ".parse::<CalibrationPair>().unwrap(), pair("02", "12"));
        assert!(matches!(
            "011,11".parse::<CalibrationPair>().unwrap_err(),
            Error::InvalidCalibrationPair { .. }
        ));
        assert!("01".parse::<CalibrationPair>().is_err());
        assert!("01,11,12".parse::<CalibrationPair>().is_err());
        assert!(CalibrationPair::new("1", "11").is_err());
    }

    #[test]
    fn strategy_from_pairs() {
        assert_eq!(EstimationStrategy::from_pairs(vec![]), EstimationStrategy::Uncalibrated);
        assert_eq!(
            EstimationStrategy::from_pairs(vec![pair("01", "11")]),
            EstimationStrategy::Calibrated(vec![pair("01", "11")])
        );
    }

    #[test]
    fn uncalibrated_rate() {
        let est = estimate_jump_rate(&two_by_two(), &EstimationStrategy::Uncalibrated).unwrap();
        assert!((est.rate - 2.0 * 15.0 / 200.0).abs() < 1e-12);
        assert!(est.tag_fractions.is_empty());
    }

    #[test]
    fn uncalibrated_rate_bounds() {
        let all_true = table(&[("S01-11", 10, true), ("S02-12", 7, true)]);
        assert_eq!(estimate_uncalibrated(&all_true).unwrap().rate, 0.0);

        let all_false = table(&[("S01-11", 10, false), ("S02-12", 7, false)]);
        assert_eq!(estimate_uncalibrated(&all_false).unwrap().rate, 2.0);
    }

    #[test]
    fn uncalibrated_zero_reads() {
        let empty = table(&[("S01-11", 0, true), ("S02-12", 0, false)]);
        assert!(matches!(
            estimate_uncalibrated(&empty).unwrap_err(),
            Error::DivisionByZero { .. }
        ));
    }

    #[test]
    fn calibrated_rate_is_mean_of_tag_fractions() {
        let pairs = vec![pair("01", "11"), pair("02", "12")];
        let est = estimate_jump_rate(&two_by_two(), &EstimationStrategy::Calibrated(pairs.clone())).unwrap();

        assert_eq!(est.tag_fractions.len(), 2 * pairs.len());
        assert!(est.tag_fractions.iter().all(|f| (0.0..=1.0).contains(f)));

        //fwd 01: 10/100, rev 11: 5/95, fwd 02: 5/100, rev 12: 10/105
        let expected = (10.0 / 100.0 + 5.0 / 95.0 + 5.0 / 100.0 + 10.0 / 105.0) / 4.0;
        assert!((est.rate - expected).abs() < 1e-12);
    }

    #[test]
    fn calibrated_without_jumps() {
        let t = table(&[("S01-11", 100, true), ("S02-12", 0, false)]);
        let est = estimate_calibrated(&t, &[pair("01", "11")]).unwrap();
        assert_eq!(est.tag_fractions, vec![0.0, 0.0]);
        assert_eq!(est.rate, 0.0);
    }

    #[test]
    fn calibrator_needs_exactly_one_true_sample() {
        let t = table(&[
            ("S01-11", 90, true),
            ("S01-12", 10, true),
            ("S02-12", 95, true),
        ]);
        let err = estimate_calibrated(&t, &[pair("01", "11")]).unwrap_err();
        assert!(matches!(err, Error::InvalidCalibrationPair { .. }));
        assert!(err.to_string().contains("(01, 11)"));

        //Tag not present at all
        let err = estimate_calibrated(&two_by_two(), &[pair("03", "11")]).unwrap_err();
        assert!(matches!(err, Error::InvalidCalibrationPair { .. }));
    }

    #[test]
    fn invalid_pair_aborts_before_any_rate() {
        //First pair is fine, second is not. Nothing is returned
        let res = estimate_calibrated(&two_by_two(), &[pair("01", "11"), pair("09", "19")]);
        assert!(res.is_err());
    }

    #[test]
    fn calibrator_with_zero_reads() {
        let t = table(&[("S01-11", 0, true), ("S02-12", 10, true)]);
        assert!(matches!(
            estimate_calibrated(&t, &[pair("01", "11")]).unwrap_err(),
            Error::DivisionByZero { .. }
        ));
    }
}
