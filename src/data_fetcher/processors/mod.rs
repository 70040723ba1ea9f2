pub mod shaper;
pub mod timezone;

pub use shaper::{format_match, shape_fixtures};
pub use timezone::{is_valid_timezone, parse_timezone};
