//! Partition selection and storage key naming.
//!
//! A fixture list lives in one of three partitions depending on how its date
//! relates to the current UTC day. The key is a pure function of
//! (partition, resource, date, live flag), so the same logical entry always
//! maps to the same physical location.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::constants::{FIXTURES_RESOURCE, chunking};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Partition {
    Historical,
    Today,
    Future,
}

impl Partition {
    /// Places `date` relative to the UTC `today`
    pub fn for_date(date: NaiveDate, today: NaiveDate) -> Self {
        match date.cmp(&today) {
            std::cmp::Ordering::Less => Partition::Historical,
            std::cmp::Ordering::Equal => Partition::Today,
            std::cmp::Ordering::Greater => Partition::Future,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Partition::Historical => "historical",
            Partition::Today => "today",
            Partition::Future => "future",
        }
    }
}

impl fmt::Display for Partition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Logical identity of a cached fixture list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntryId {
    pub date: NaiveDate,
    pub is_live: bool,
}

impl EntryId {
    pub fn new(date: NaiveDate, is_live: bool) -> Self {
        Self { date, is_live }
    }

    /// Storage key of this entry when it sits in `partition`
    pub fn key_in(&self, partition: Partition) -> String {
        build_key(partition, FIXTURES_RESOURCE, self.date, self.is_live)
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_live {
            write!(f, "{} (live)", self.date)
        } else {
            write!(f, "{}", self.date)
        }
    }
}

/// Builds `{partition}/{resource}-{date}{-live?}.json`
pub fn build_key(partition: Partition, resource: &str, date: NaiveDate, is_live: bool) -> String {
    let live_suffix = if is_live { "-live" } else { "" };
    format!(
        "{partition}/{resource}-{}{live_suffix}.json",
        date.format("%Y-%m-%d")
    )
}

/// Key of the meta record of a chunked entry
pub fn chunk_meta_key(key: &str) -> String {
    format!("{key}{}", chunking::META_SUFFIX)
}

/// Key of chunk `index` of a chunked entry
pub fn chunk_key(key: &str, index: usize) -> String {
    format!("{key}{}{index}", chunking::CHUNK_SUFFIX)
}

/// Parses a caller-supplied `YYYY-MM-DD` date, defaulting to `today`
pub fn resolve_date(date: Option<&str>, today: NaiveDate) -> Option<NaiveDate> {
    match date {
        None => Some(today),
        Some(raw) => parse_date(raw),
    }
}

/// Strict `YYYY-MM-DD` parsing; chrono alone accepts unpadded fields
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    let well_formed = raw.len() == 10
        && raw.char_indices().all(|(i, c)| match i {
            4 | 7 => c == '-',
            _ => c.is_ascii_digit(),
        });
    if !well_formed {
        return None;
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
}
