use chrono_tz::Tz;

use crate::error::AppError;

/// Whether `name` is an IANA timezone identifier known to the tz database.
///
/// # Examples
///
/// ```
/// use fixture_cache::data_fetcher::processors::is_valid_timezone;
///
/// assert!(is_valid_timezone("Europe/Helsinki"));
/// assert!(!is_valid_timezone("Mars/Olympus_Mons"));
/// ```
pub fn is_valid_timezone(name: &str) -> bool {
    parse_timezone(name).is_ok()
}

/// Parses an IANA timezone identifier.
///
/// # Errors
///
/// Returns [`AppError::InvalidTimezone`] for unknown or empty names.
pub fn parse_timezone(name: &str) -> Result<Tz, AppError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(AppError::invalid_timezone(name));
    }
    trimmed
        .parse::<Tz>()
        .map_err(|_| AppError::invalid_timezone(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_zones() {
        for name in ["UTC", "Europe/London", "America/New_York", "Asia/Kolkata"] {
            assert!(is_valid_timezone(name), "{name}");
        }
    }

    #[test]
    fn test_unknown_zones() {
        for name in ["", "   ", "Europe/Atlantis", "GMT+25"] {
            assert!(!is_valid_timezone(name), "{name}");
        }
    }

    #[test]
    fn test_error_is_validation_error() {
        let err = parse_timezone("Nowhere/Town").unwrap_err();
        assert!(err.is_validation_error());
        assert!(err.to_string().contains("Nowhere/Town"));
    }
}
