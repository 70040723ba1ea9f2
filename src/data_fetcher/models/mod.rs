pub mod fixtures;
pub mod formatted;

pub use fixtures::{
    Fixture, FixtureInfo, FixtureStatus, FixturesResponse, Goals, League, Score, Team, Teams,
    count_live_fixtures,
};
pub use formatted::{
    FixturesPayload, FormattedCountry, FormattedLeague, FormattedMatch, FormattedTeam,
    ResponseSource,
};
