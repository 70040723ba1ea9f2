//! Refresh strategy selection

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::constants::cache_ttl;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Strategy {
    /// Live data and the yesterday/today/tomorrow window, which can still change
    FrequentRefresh,
    /// Dates after the window
    Standard,
    /// Dates before the window
    LongTerm,
}

impl Strategy {
    /// Picks the strategy for `date` relative to the UTC `today`.
    ///
    /// Pure: the same inputs always give the same strategy.
    pub fn select(date: NaiveDate, is_live: bool, today: NaiveDate) -> Self {
        if is_live || in_three_day_window(date, today) {
            Strategy::FrequentRefresh
        } else if date < today {
            Strategy::LongTerm
        } else {
            Strategy::Standard
        }
    }

    pub fn ttl_seconds(&self) -> u64 {
        match self {
            Strategy::FrequentRefresh => cache_ttl::FREQUENT_REFRESH_SECONDS,
            Strategy::Standard => cache_ttl::STANDARD_SECONDS,
            Strategy::LongTerm => cache_ttl::LONG_TERM_SECONDS,
        }
    }

    pub fn ttl(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.ttl_seconds())
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::FrequentRefresh => "FREQUENT_REFRESH",
            Strategy::Standard => "STANDARD",
            Strategy::LongTerm => "LONG_TERM",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// True when `date` is yesterday, today or tomorrow
pub fn in_three_day_window(date: NaiveDate, today: NaiveDate) -> bool {
    (date - today).num_days().abs() <= 1
}

/// Yesterday, today and tomorrow around `today`
pub fn three_day_window(today: NaiveDate) -> (NaiveDate, NaiveDate, NaiveDate) {
    (today - Duration::days(1), today, today + Duration::days(1))
}
