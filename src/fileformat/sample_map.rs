use std::fs::File;
use std::io::Read;
use std::path::Path;

use itertools::Itertools;
use log::{debug, warn};
use rustc_hash::{FxHashMap, FxHashSet};

use crate::runtime::Error;

pub const TRUE_FALSE_COLUMN: &str = "True_False";

///////////////////////////////
/// True/false labels from a tab separated sample map. The first column holds the sample identifier
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SampleMap {
    pub rows: Vec<(String, bool)>,
}

///////////////////////////////
/// Labels may be written as numbers (1, 0, 1.0) or as true/false
fn parse_true_false(s: &str) -> Option<bool> {
    let s = s.trim().to_lowercase();
    match s.as_str() {
        "true" => return Some(true),
        "false" => return Some(false),
        _ => {}
    }
    match s.parse::<f64>() {
        Ok(v) if v == 1.0 => Some(true),
        Ok(v) if v == 0.0 => Some(false),
        _ => None,
    }
}

impl SampleMap {
    pub fn read(src: impl Read) -> Result<SampleMap, Error> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(b'\t')
            .flexible(true)
            .from_reader(src);

        let headers = reader.headers()?.clone();
        let col_tf = headers
            .iter()
            .position(|h| h.trim() == TRUE_FALSE_COLUMN)
            .ok_or_else(|| {
                Error::parse_error(
                    "sample map",
                    Some(format!("no column named '{}'", TRUE_FALSE_COLUMN)),
                )
            })?;

        let mut rows = Vec::new();
        for result in reader.records() {
            let record = result?;
            let sample_id = record.get(0).unwrap_or("").trim();

            //QIIME2 metadata directives such as #q2:types
            if sample_id.is_empty() || sample_id.starts_with('#') {
                continue;
            }

            let raw = record.get(col_tf).unwrap_or("");
            let is_true = parse_true_false(raw).ok_or_else(|| {
                Error::parse_error(
                    "sample map",
                    Some(format!(
                        "{} for sample '{}' is '{}', expected 0 or 1",
                        TRUE_FALSE_COLUMN, sample_id, raw
                    )),
                )
            })?;
            rows.push((sample_id.to_string(), is_true));
        }

        debug!("Sample map lists {} samples", rows.len());
        Ok(SampleMap { rows })
    }

    pub fn read_file(path: impl AsRef<Path>) -> Result<SampleMap, Error> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::file_not_found(path));
        }
        let file = File::open(path)?;
        SampleMap::read(file).map_err(|e| match e {
            Error::ParseError { msg, .. } => Error::file_not_valid(path, msg),
            e => e,
        })
    }

    ///////////////////////////////
    /// Labels for the given samples, joined by identifier. Only when no identifier in the map matches
    /// any sample, and the number of rows agree, are the map rows taken in the sorted order of the samples
    pub fn labels_for(&self, sample_ids: &[&str]) -> Result<FxHashMap<String, bool>, Error> {
        let by_id: FxHashMap<String, bool> = self.rows.iter().cloned().collect();
        let distinct: FxHashSet<&str> = sample_ids.iter().copied().collect();

        let unmatched = distinct
            .iter()
            .filter(|id| !by_id.contains_key(**id))
            .copied()
            .sorted()
            .collect_vec();
        if unmatched.is_empty() {
            return Ok(by_id);
        }

        let any_matched = distinct.iter().any(|id| by_id.contains_key(*id));
        if !any_matched && self.rows.len() == distinct.len() {
            warn!(
                "Sample map identifiers do not match any sample name; assigning {} by row order",
                TRUE_FALSE_COLUMN
            );
            let labels = distinct
                .into_iter()
                .sorted()
                .zip(self.rows.iter())
                .map(|(id, (_, is_true))| (id.to_string(), *is_true))
                .collect();
            return Ok(labels);
        }

        Err(Error::parse_error(
            "sample map",
            Some(format!(
                "no {} label for {} of {} samples: {}",
                TRUE_FALSE_COLUMN,
                unmatched.len(),
                distinct.len(),
                unmatched.iter().take(10).join(", ")
            )),
        ))
    }
}
