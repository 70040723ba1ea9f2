//! Groups raw fixtures into the country → league → match read-model.

use chrono_tz::Tz;
use std::collections::HashMap;

use crate::constants::buckets::{UNKNOWN_COUNTRY, UNKNOWN_LEAGUE, UNKNOWN_LEAGUE_ID};
use crate::data_fetcher::models::{
    Fixture, FormattedCountry, FormattedLeague, FormattedMatch, FormattedTeam, Team,
};

/// Shapes `fixtures` into countries and leagues with kickoff times local to `timezone`.
///
/// Countries and leagues are sorted by name and matches by kickoff. All sorts
/// are stable, so ties keep input order and identical input yields identical
/// output. Every input fixture appears exactly once; fixtures without a
/// country or league land in the "Other" bucket.
///
/// # Arguments
///
/// * `fixtures` - Raw fixtures in any order
/// * `timezone` - Already validated target timezone
///
/// # Examples
///
/// ```
/// use fixture_cache::data_fetcher::processors::shape_fixtures;
///
/// let countries = shape_fixtures(&[], chrono_tz::UTC);
/// assert!(countries.is_empty());
/// ```
pub fn shape_fixtures(fixtures: &[Fixture], timezone: Tz) -> Vec<FormattedCountry> {
    let mut countries: Vec<FormattedCountry> = Vec::new();
    // country name -> (position in `countries`, league id -> position in its leagues)
    let mut index: HashMap<String, (usize, HashMap<i64, usize>)> = HashMap::new();

    for fixture in fixtures {
        let league = &fixture.league;
        let country_name = league
            .country
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or(UNKNOWN_COUNTRY);

        let (country_pos, leagues) = index
            .entry(country_name.to_string())
            .or_insert_with(|| {
                countries.push(FormattedCountry {
                    name: country_name.to_string(),
                    flag: None,
                    leagues: Vec::new(),
                });
                (countries.len() - 1, HashMap::new())
            });
        let country = &mut countries[*country_pos];
        if country.flag.is_none() {
            country.flag = league.flag.clone();
        }

        let (league_id, league_name) = match league.id {
            Some(id) => (
                id,
                league
                    .name
                    .clone()
                    .unwrap_or_else(|| UNKNOWN_LEAGUE.to_string()),
            ),
            None => (UNKNOWN_LEAGUE_ID, UNKNOWN_LEAGUE.to_string()),
        };
        let league_pos = *leagues.entry(league_id).or_insert_with(|| {
            country.leagues.push(FormattedLeague {
                id: league_id,
                name: league_name,
                logo: league.logo.clone(),
                matches: Vec::new(),
            });
            country.leagues.len() - 1
        });

        country.leagues[league_pos]
            .matches
            .push(format_match(fixture, timezone));
    }

    countries.sort_by(|a, b| a.name.cmp(&b.name));
    for country in &mut countries {
        country.leagues.sort_by(|a, b| a.name.cmp(&b.name));
        for league in &mut country.leagues {
            league.matches.sort_by_key(|m| m.timestamp);
        }
    }
    countries
}

/// Projects one fixture into its presentation form
pub fn format_match(fixture: &Fixture, timezone: Tz) -> FormattedMatch {
    let kickoff = fixture.kickoff();
    let local = kickoff.with_timezone(&timezone);

    FormattedMatch {
        id: fixture.id(),
        date: local.format("%Y-%m-%d").to_string(),
        time: local.format("%H:%M").to_string(),
        timestamp: kickoff.timestamp(),
        status: fixture.fixture.status.clone(),
        home_team: format_team(&fixture.teams.home),
        away_team: format_team(&fixture.teams.away),
        goals: fixture.goals,
        penalty: fixture.score.penalty,
    }
}

fn format_team(team: &Team) -> FormattedTeam {
    FormattedTeam {
        id: team.id,
        name: team.name.clone(),
        logo: team.logo.clone(),
        winner: team.winner,
    }
}
