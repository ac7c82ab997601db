use std::collections::{BTreeMap, BTreeSet};

/// Dense integer codes for a set of observed strings.
///
/// Codes run `0..len()` in lexicographic order of the values, so two
/// encodings of the same distinct set agree. Codes are not stable across
/// snapshots: a new value shifts every code after it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureCodes {
    codes: BTreeMap<String, usize>,
}

impl FeatureCodes {
    pub fn code(&self, value: &str) -> Option<usize> {
        self.codes.get(value).copied()
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }
}

pub fn encode<I, S>(values: I) -> FeatureCodes
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let distinct: BTreeSet<String> = values
        .into_iter()
        .map(|v| v.as_ref().to_string())
        .collect();
    let codes = distinct
        .into_iter()
        .enumerate()
        .map(|(code, value)| (value, code))
        .collect();
    FeatureCodes { codes }
}
