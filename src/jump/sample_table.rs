use itertools::Itertools;
use log::debug;
use rustc_hash::FxHashMap;

use crate::runtime::Error;

/// Shortest sample identifier the forward and reverse indices can be cut from
pub const MIN_SAMPLE_ID_LEN: usize = 6;

/// Width of a forward or reverse index identifier
pub const INDEX_ID_LEN: usize = 2;

///////////////////////////////
/// Cut the forward (characters 2-3) and reverse (characters 5-6) index out of a sample identifier such as S01-11
pub fn split_sample_id(sample_id: &str) -> Result<(String, String), Error> {
    let chars: Vec<char> = sample_id.chars().collect();
    if chars.len() < MIN_SAMPLE_ID_LEN {
        return Err(Error::malformed_identifier(
            sample_id,
            Some(format!("only {} characters long", chars.len())),
        ));
    }
    let forward: String = chars[1..1 + INDEX_ID_LEN].iter().collect();
    let reverse: String = chars[4..4 + INDEX_ID_LEN].iter().collect();
    Ok((forward, reverse))
}

///////////////////////////////
/// One sequenced sample, identified by its forward/reverse index combination
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SampleRecord {
    pub sample_id: String,
    pub forward_index: String,
    pub reverse_index: String,
    pub read_count: u64,

    //True if the sample map lists this as the legitimate sample for its indices
    pub is_calibration_true: bool,
}

impl SampleRecord {
    pub fn new(
        sample_id: &str,
        read_count: u64,
        is_calibration_true: bool,
    ) -> Result<SampleRecord, Error> {
        let (forward_index, reverse_index) = split_sample_id(sample_id)?;
        Ok(SampleRecord {
            sample_id: sample_id.to_string(),
            forward_index,
            reverse_index,
            read_count,
            is_calibration_true,
        })
    }
}

///////////////////////////////
/// All samples of one sequencing run, sorted by sample identifier
#[derive(Clone, Debug)]
pub struct SampleIndexTable {
    records: Vec<SampleRecord>,

    //Distinct index identifiers, sorted ascending
    forward_axis: Vec<String>,
    reverse_axis: Vec<String>,

    //(forward, reverse) -> position in records
    map_key_to_record: FxHashMap<(String, String), usize>,

    forward_totals: FxHashMap<String, u64>,
    reverse_totals: FxHashMap<String, u64>,
    total_reads: u64,
}

impl SampleIndexTable {
    ///////////////////////////////
    /// Build the table from records in any order. Composite keys must be unique
    pub fn from_records(mut records: Vec<SampleRecord>) -> Result<SampleIndexTable, Error> {
        if records.is_empty() {
            return Err(Error::EmptyTable);
        }

        //Stable, so ties keep their input order
        records.sort_by(|a, b| a.sample_id.cmp(&b.sample_id));

        let mut map_key_to_record: FxHashMap<(String, String), usize> = FxHashMap::default();
        let mut forward_totals: FxHashMap<String, u64> = FxHashMap::default();
        let mut reverse_totals: FxHashMap<String, u64> = FxHashMap::default();
        let mut total_reads: u64 = 0;

        for (i, rec) in records.iter().enumerate() {
            let key = (rec.forward_index.clone(), rec.reverse_index.clone());
            if let Some(&prev) = map_key_to_record.get(&key) {
                return Err(Error::DuplicateCompositeKey {
                    first: records[prev].sample_id.clone(),
                    second: rec.sample_id.clone(),
                    forward: rec.forward_index.clone(),
                    reverse: rec.reverse_index.clone(),
                });
            }
            map_key_to_record.insert(key, i);

            *forward_totals.entry(rec.forward_index.clone()).or_insert(0) += rec.read_count;
            *reverse_totals.entry(rec.reverse_index.clone()).or_insert(0) += rec.read_count;
            total_reads += rec.read_count;
        }

        let forward_axis = records
            .iter()
            .map(|r| r.forward_index.clone())
            .sorted()
            .dedup()
            .collect_vec();
        let reverse_axis = records
            .iter()
            .map(|r| r.reverse_index.clone())
            .sorted()
            .dedup()
            .collect_vec();

        debug!(
            "Sample table has {} samples over {} forward and {} reverse indices, {} reads in total",
            records.len(),
            forward_axis.len(),
            reverse_axis.len(),
            total_reads
        );

        Ok(SampleIndexTable {
            records,
            forward_axis,
            reverse_axis,
            map_key_to_record,
            forward_totals,
            reverse_totals,
            total_reads,
        })
    }

    ///////////////////////////////
    /// Build the table from per-sample read counts and true/false labels keyed by sample identifier
    pub fn from_counts<'a, I>(
        counts: I,
        labels: &FxHashMap<String, bool>,
    ) -> Result<SampleIndexTable, Error>
    where
        I: IntoIterator<Item = (&'a str, u64)>,
    {
        let mut records = Vec::new();
        for (sample_id, read_count) in counts {
            let is_true = labels.get(sample_id).copied().ok_or_else(|| {
                Error::parse_error(
                    "sample map",
                    Some(format!("no True_False label for sample '{}'", sample_id)),
                )
            })?;
            records.push(SampleRecord::new(sample_id, read_count, is_true)?);
        }
        SampleIndexTable::from_records(records)
    }

    pub fn records(&self) -> &[SampleRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn forward_identities(&self) -> &[String] {
        &self.forward_axis
    }

    pub fn reverse_identities(&self) -> &[String] {
        &self.reverse_axis
    }

    pub fn total_reads(&self) -> u64 {
        self.total_reads
    }

    /// Reads over all samples carrying this forward index
    pub fn forward_total(&self, forward: &str) -> u64 {
        self.forward_totals.get(forward).copied().unwrap_or(0)
    }

    /// Reads over all samples carrying this reverse index
    pub fn reverse_total(&self, reverse: &str) -> u64 {
        self.reverse_totals.get(reverse).copied().unwrap_or(0)
    }

    pub fn record_index(&self, forward: &str, reverse: &str) -> Option<usize> {
        self.map_key_to_record
            .get(&(forward.to_string(), reverse.to_string()))
            .copied()
    }

    pub fn lookup(&self, forward: &str, reverse: &str) -> Option<&SampleRecord> {
        self.record_index(forward, reverse).map(|i| &self.records[i])
    }

    pub fn with_forward<'a>(&'a self, forward: &'a str) -> impl Iterator<Item = &'a SampleRecord> {
        self.records.iter().filter(move |r| r.forward_index == forward)
    }

    pub fn with_reverse<'a>(&'a self, reverse: &'a str) -> impl Iterator<Item = &'a SampleRecord> {
        self.records.iter().filter(move |r| r.reverse_index == reverse)
    }

    /// Sum of read counts over records matching the predicate
    pub fn sum_counts<F>(&self, pred: F) -> u64
    where
        F: Fn(&SampleRecord) -> bool,
    {
        self.records.iter().filter(|r| pred(r)).map(|r| r.read_count).sum()
    }
}
