//! Read-model returned to clients: fixtures grouped by country and league

use serde::{Deserialize, Serialize};

use super::fixtures::{FixtureStatus, Goals};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormattedCountry {
    pub name: String,
    pub flag: Option<String>,
    pub leagues: Vec<FormattedLeague>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormattedLeague {
    pub id: i64,
    pub name: String,
    pub logo: Option<String>,
    pub matches: Vec<FormattedMatch>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormattedMatch {
    pub id: i64,
    /// Kickoff date in the requested timezone, `YYYY-MM-DD`
    pub date: String,
    /// Kickoff time in the requested timezone, `HH:MM`
    pub time: String,
    /// Kickoff instant as Unix seconds
    pub timestamp: i64,
    pub status: FixtureStatus,
    pub home_team: FormattedTeam,
    pub away_team: FormattedTeam,
    pub goals: Goals,
    pub penalty: Goals,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormattedTeam {
    pub id: Option<i64>,
    pub name: String,
    pub logo: Option<String>,
    pub winner: Option<bool>,
}

/// Where a response was served from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseSource {
    Cache,
    Origin,
}

/// Result of a fixtures lookup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixturesPayload {
    pub data: Vec<FormattedCountry>,
    pub source: ResponseSource,
}

impl FixturesPayload {
    /// Total number of matches across every country and league
    pub fn match_count(&self) -> usize {
        self.data
            .iter()
            .flat_map(|country| &country.leagues)
            .map(|league| league.matches.len())
            .sum()
    }
}
