use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One scheduled or played match as delivered by the origin API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fixture {
    pub fixture: FixtureInfo,
    #[serde(default)]
    pub league: League,
    pub teams: Teams,
    #[serde(default)]
    pub goals: Goals,
    #[serde(default)]
    pub score: Score,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixtureInfo {
    pub id: i64,
    /// Timezone the origin used when rendering `date`
    #[serde(default = "default_source_timezone")]
    pub timezone: String,
    /// Kickoff instant, normalized to UTC on deserialization
    pub date: DateTime<Utc>,
    #[serde(default)]
    pub timestamp: Option<i64>,
    #[serde(default)]
    pub status: FixtureStatus,
}

fn default_source_timezone() -> String {
    "UTC".to_string()
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixtureStatus {
    #[serde(default)]
    pub long: String,
    #[serde(default)]
    pub short: String,
    #[serde(default)]
    pub elapsed: Option<i32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct League {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub flag: Option<String>,
    #[serde(default)]
    pub logo: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Teams {
    pub home: Team,
    pub away: Team,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub logo: Option<String>,
    #[serde(default)]
    pub winner: Option<bool>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Goals {
    #[serde(default)]
    pub home: Option<i32>,
    #[serde(default)]
    pub away: Option<i32>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Score {
    #[serde(default)]
    pub halftime: Goals,
    #[serde(default)]
    pub fulltime: Goals,
    #[serde(default)]
    pub extratime: Goals,
    #[serde(default)]
    pub penalty: Goals,
}

/// Status codes for matches that are in progress.
const LIVE_STATUS_CODES: [&str; 8] = ["1H", "HT", "2H", "ET", "BT", "P", "SUSP", "INT"];

/// Status codes for matches that are over and will not change again.
const FINISHED_STATUS_CODES: [&str; 3] = ["FT", "AET", "PEN"];

impl Fixture {
    pub fn id(&self) -> i64 {
        self.fixture.id
    }

    pub fn kickoff(&self) -> DateTime<Utc> {
        self.fixture.date
    }

    /// Whether the match is currently being played
    pub fn is_live(&self) -> bool {
        LIVE_STATUS_CODES.contains(&self.fixture.status.short.as_str())
    }

    /// Whether the match has finished
    pub fn is_finished(&self) -> bool {
        FINISHED_STATUS_CODES.contains(&self.fixture.status.short.as_str())
    }
}

/// Envelope of the origin `/fixtures` endpoint.
///
/// The origin reports request-level problems (bad key, exhausted quota) inside
/// `errors` with a 200 status, so the field is kept loosely typed: it is an
/// empty array on success and an object otherwise.
#[derive(Debug, Clone, Deserialize)]
pub struct FixturesResponse {
    #[serde(default)]
    pub errors: serde_json::Value,
    #[serde(default)]
    pub results: Option<u32>,
    pub response: Vec<Fixture>,
}

impl FixturesResponse {
    /// Returns the reported errors as text, or `None` when the request succeeded
    pub fn error_message(&self) -> Option<String> {
        match &self.errors {
            serde_json::Value::Null => None,
            serde_json::Value::Array(items) if items.is_empty() => None,
            serde_json::Value::Object(map) if map.is_empty() => None,
            other => Some(other.to_string()),
        }
    }
}

/// Counts fixtures that are currently in progress
pub fn count_live_fixtures(fixtures: &[Fixture]) -> usize {
    fixtures.iter().filter(|f| f.is_live()).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "get": "fixtures",
        "errors": [],
        "results": 1,
        "response": [{
            "fixture": {
                "id": 1035037,
                "timezone": "UTC",
                "date": "2024-05-01T19:00:00+00:00",
                "timestamp": 1714590000,
                "status": {"long": "Match Finished", "short": "FT", "elapsed": 90}
            },
            "league": {
                "id": 39, "name": "Premier League", "country": "England",
                "logo": "https://media.api-sports.io/football/leagues/39.png",
                "flag": "https://media.api-sports.io/flags/gb.svg"
            },
            "teams": {
                "home": {"id": 33, "name": "Manchester United", "logo": "mu.png", "winner": true},
                "away": {"id": 34, "name": "Newcastle", "logo": "nc.png", "winner": false}
            },
            "goals": {"home": 2, "away": 1},
            "score": {
                "halftime": {"home": 1, "away": 0},
                "fulltime": {"home": 2, "away": 1},
                "extratime": {"home": null, "away": null},
                "penalty": {"home": null, "away": null}
            }
        }]
    }"#;

    #[test]
    fn test_deserialize_origin_response() {
        let response: FixturesResponse = serde_json::from_str(SAMPLE).unwrap();
        assert!(response.error_message().is_none());
        assert_eq!(response.results, Some(1));

        let fixture = &response.response[0];
        assert_eq!(fixture.id(), 1035037);
        assert_eq!(fixture.kickoff().to_rfc3339(), "2024-05-01T19:00:00+00:00");
        assert_eq!(fixture.league.name.as_deref(), Some("Premier League"));
        assert_eq!(fixture.teams.home.winner, Some(true));
        assert_eq!(fixture.score.fulltime.home, Some(2));
        assert_eq!(fixture.score.penalty.home, None);
        assert!(fixture.is_finished());
        assert!(!fixture.is_live());
    }

    #[test]
    fn test_offset_kickoff_is_normalized_to_utc() {
        let json = r#"{
            "fixture": {"id": 1, "timezone": "Europe/Helsinki", "date": "2024-05-01T21:00:00+03:00"},
            "teams": {"home": {"name": "HJK"}, "away": {"name": "KuPS"}}
        }"#;
        let fixture: Fixture = serde_json::from_str(json).unwrap();
        assert_eq!(fixture.kickoff().to_rfc3339(), "2024-05-01T18:00:00+00:00");
        assert_eq!(fixture.fixture.timezone, "Europe/Helsinki");
        assert_eq!(fixture.league, League::default());
    }

    #[test]
    fn test_reported_errors_are_surfaced() {
        let json = r#"{"errors": {"token": "Error/Missing application key."}, "response": []}"#;
        let response: FixturesResponse = serde_json::from_str(json).unwrap();
        let message = response.error_message().unwrap();
        assert!(message.contains("Missing application key"));
    }

    #[test]
    fn test_count_live_fixtures() {
        let mut response: FixturesResponse = serde_json::from_str(SAMPLE).unwrap();
        let mut live = response.response[0].clone();
        live.fixture.status.short = "2H".to_string();
        response.response.push(live);
        assert_eq!(count_live_fixtures(&response.response), 1);
    }
}
