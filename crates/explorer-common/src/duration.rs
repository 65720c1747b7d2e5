//! ISO-8601 duration parsing for slider steps.
//!
//! Only day, hour, minute and second components are accepted. Calendar
//! components (years, months, weeks) have no fixed length and are rejected.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{ExplorerError, ExplorerResult};

static DURATION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^P(?:(?P<days>\d+(?:[.,]\d+)?)D)?(?:T(?:(?P<hours>\d+(?:[.,]\d+)?)H)?(?:(?P<minutes>\d+(?:[.,]\d+)?)M)?(?:(?P<seconds>\d+(?:[.,]\d+)?)S)?)?$",
    )
    .expect("duration pattern is valid")
});

/// Parse an ISO-8601 duration (`P1D`, `PT1H`, `P1DT6H30M`, ...) into milliseconds.
///
/// Total is `((days*24 + hours)*60 + minutes)*60*1000 + seconds*1000`.
pub fn parse_duration_ms(duration: &str) -> ExplorerResult<i64> {
    let malformed = || ExplorerError::MalformedDuration(duration.to_string());

    let caps = DURATION_RE.captures(duration.trim()).ok_or_else(malformed)?;

    let component = |name: &str| -> ExplorerResult<Option<f64>> {
        caps.name(name)
            .map(|m| m.as_str().replace(',', ".").parse::<f64>())
            .transpose()
            .map_err(|_| malformed())
    };

    let days = component("days")?;
    let hours = component("hours")?;
    let minutes = component("minutes")?;
    let seconds = component("seconds")?;

    // "P" and "PT" match the pattern but carry no components
    if days.is_none() && hours.is_none() && minutes.is_none() && seconds.is_none() {
        return Err(malformed());
    }
    if duration.trim().ends_with('T') {
        return Err(malformed());
    }

    let total_minutes = (days.unwrap_or(0.0) * 24.0 + hours.unwrap_or(0.0)) * 60.0
        + minutes.unwrap_or(0.0);
    let ms = total_minutes * 60.0 * 1000.0 + seconds.unwrap_or(0.0) * 1000.0;

    Ok(ms.round() as i64)
}
