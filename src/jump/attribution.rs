use log::debug;
use rayon::prelude::*;
use rustc_hash::FxHashMap;
use serde::Serialize;

use crate::jump::estimator::JumpRateEstimate;
use crate::jump::sample_table::SampleIndexTable;
use crate::runtime::Error;

///////////////////////////////
/// Number of reads in one sample expected to have jumped in from other samples
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AttributionResult {
    #[serde(rename = "SampleIndex")]
    pub sample_id: String,

    #[serde(rename = "Expected False Reads")]
    pub expected_false_reads: u64,
}

///////////////////////////////
/// Expected false reads for the combination (i, j).
///
/// Reads of forward index i may jump onto reverse index j, in proportion to the share of all reads that
/// carry j without i; likewise the other way around. The sum is rounded up
pub fn expected_false_reads(i_total: u64, j_total: u64, s_ij: u64, total_reads: u64, rate: f64) -> u64 {
    let i_without_j = (i_total - s_ij) as f64;
    let j_without_i = (j_total - s_ij) as f64;
    let total_reads = total_reads as f64;

    //Reads of i expected to get a false j index
    let i_jumps = i_total as f64 * rate;
    let i_to_j = i_jumps * (j_without_i / total_reads);

    //Reads of j expected to get a false i index
    let j_jumps = j_total as f64 * rate;
    let j_to_i = j_jumps * (i_without_j / total_reads);

    (i_to_j + j_to_i).ceil() as u64
}

///////////////////////////////
/// Expected false reads for every sample in the table, in table order
pub fn attribute(
    table: &SampleIndexTable,
    estimate: &JumpRateEstimate,
) -> Result<Vec<AttributionResult>, Error> {
    attribute_over_axes(
        table,
        estimate.rate,
        table.forward_identities(),
        table.reverse_identities(),
    )
}

///////////////////////////////
/// Cross-tabulate over the given forward and reverse axes. Each combination is attributed to the sample
/// with that exact key, so the order of the axes has no effect on the result
pub fn attribute_over_axes(
    table: &SampleIndexTable,
    rate: f64,
    forward_axis: &[String],
    reverse_axis: &[String],
) -> Result<Vec<AttributionResult>, Error> {
    let total_reads = table.total_reads();
    if total_reads == 0 {
        return Err(Error::division_by_zero("expected false reads per sample"));
    }

    let map_record_expected: FxHashMap<usize, u64> = forward_axis
        .par_iter()
        .flat_map_iter(|i| {
            let i_total = table.forward_total(i);
            reverse_axis.iter().filter_map(move |j| {
                //Combinations that were never sequenced get nothing
                let rec_index = table.record_index(i, j)?;
                let s_ij = table.records()[rec_index].read_count;
                let j_total = table.reverse_total(j);
                Some((
                    rec_index,
                    expected_false_reads(i_total, j_total, s_ij, total_reads, rate),
                ))
            })
        })
        .collect();

    debug!(
        "Attributed false reads to {} of {} forward x {} reverse combinations",
        map_record_expected.len(),
        forward_axis.len(),
        reverse_axis.len()
    );

    let results = table
        .records()
        .iter()
        .enumerate()
        .filter_map(|(rec_index, rec)| {
            map_record_expected
                .get(&rec_index)
                .map(|&expected| AttributionResult {
                    sample_id: rec.sample_id.clone(),
                    expected_false_reads: expected,
                })
        })
        .collect();
    Ok(results)
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

    fn estimate(rate: f64) -> JumpRateEstimate {
        JumpRateEstimate {
            rate,
            tag_fractions: vec![],
        }
    }

    fn as_pairs(res: &[AttributionResult]) -> Vec<(&str, u64)> {
        res.iter()
            .map(|r| (r.sample_id.as_str(), r.expected_false_reads))
            .collect()
    }

    #[test]
    fn three_samples_uniform_counts() {
        let t = table(&[
            ("S01-11", 100, true),
            ("S01-12", 100, false),
            ("S02-12", 100, true),
        ]);
        let res = attribute(&t, &estimate(0.1)).unwrap();

        //total 300; fwd 01 = 200, fwd 02 = 100; rev 11 = 100, rev 12 = 200
        //01-11: 200*0.1*(0/300) + 100*0.1*(100/300) = 3.33 -> 4
        //01-12: 200*0.1*(100/300) + 200*0.1*(100/300) = 13.33 -> 14
        //02-12: 100*0.1*(100/300) + 200*0.1*(0/300) = 3.33 -> 4
        assert_eq!(as_pairs(&res), vec![("S01-11", 4), ("S01-12", 14), ("S02-12", 4)]);
    }

    #[test]
    fn formula() {
        assert_eq!(expected_false_reads(200, 100, 100, 300, 0.1), 4);
        assert_eq!(expected_false_reads(200, 200, 100, 300, 0.1), 14);
        assert_eq!(expected_false_reads(200, 200, 100, 300, 0.0), 0);
    }

    #[test]
    fn zero_rate_gives_zero() {
        let t = table(&[("S01-11", 100, true), ("S02-12", 0, false)]);
        let res = attribute(&t, &estimate(0.0)).unwrap();
        assert_eq!(as_pairs(&res), vec![("S01-11", 0), ("S02-12", 0)]);
    }

    #[test]
    fn single_sample_gives_zero() {
        let t = table(&[("S01-11", 1000, true)]);
        let res = attribute(&t, &estimate(0.7)).unwrap();
        assert_eq!(as_pairs(&res), vec![("S01-11", 0)]);
    }

    #[test]
    fn axis_order_does_not_matter() {
        let t = table(&[
            ("S01-11", 523, true),
            ("S01-12", 17, false),
            ("S02-11", 3, false),
            ("S02-13", 871, true),
            ("S03-12", 402, true),
            ("S03-13", 9, false),
        ]);
        let sorted = attribute(&t, &estimate(0.013)).unwrap();

        let fwd_rev: Vec<String> = t.forward_identities().iter().rev().cloned().collect();
        let rev_rev: Vec<String> = t.reverse_identities().iter().rev().cloned().collect();
        let reversed = attribute_over_axes(&t, 0.013, &fwd_rev, &rev_rev).unwrap();

        assert_eq!(sorted, reversed);
        assert_eq!(sorted.len(), t.len());
        assert_eq!(sorted[0].sample_id, "S01-11");
    }

    #[test]
    fn only_existing_combinations_reported() {
        //3 x 3 axes, 4 samples
        let t = table(&[
            ("S01-11", 10, true),
            ("S02-12", 10, true),
            ("S03-13", 10, true),
            ("S01-13", 1, false),
        ]);
        let res = attribute(&t, &estimate(0.05)).unwrap();
        assert_eq!(res.len(), 4);
    }

    #[test]
    fn zero_total_reads() {
        let t = table(&[("S01-11", 0, true), ("S02-12", 0, true)]);
        assert!(matches!(
            attribute(&t, &estimate(0.1)).unwrap_err(),
            Error::DivisionByZero { .. }
        ));
    }
}
