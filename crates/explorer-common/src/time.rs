//! Time handling for forecast date selection.
//!
//! The slider and the asset resolver operate in UTC. The date picker renders
//! in the browser's local zone, so the two conversions between them live
//! here instead of at each call site.

use chrono::{
    DateTime, Duration, NaiveDateTime, NaiveTime, Offset, SecondsFormat, TimeZone, Timelike, Utc,
};

use crate::error::{ExplorerError, ExplorerResult};

/// Model run cycles (forecast systems publish at synoptic hours).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelCycle {
    /// 00Z run
    Z00,
    /// 06Z run
    Z06,
    /// 12Z run
    Z12,
    /// 18Z run
    Z18,
}

impl ModelCycle {
    pub fn from_hour(hour: u32) -> Option<Self> {
        match hour {
            0 => Some(ModelCycle::Z00),
            6 => Some(ModelCycle::Z06),
            12 => Some(ModelCycle::Z12),
            18 => Some(ModelCycle::Z18),
            _ => None,
        }
    }

    /// The latest cycle starting at or before `hour` on the same day.
    pub fn latest_at(hour: u32) -> Self {
        match hour {
            h if h >= 18 => ModelCycle::Z18,
            h if h >= 12 => ModelCycle::Z12,
            h if h >= 6 => ModelCycle::Z06,
            _ => ModelCycle::Z00,
        }
    }

    pub fn hour(&self) -> u32 {
        match self {
            ModelCycle::Z00 => 0,
            ModelCycle::Z06 => 6,
            ModelCycle::Z12 => 12,
            ModelCycle::Z18 => 18,
        }
    }
}

/// Most recent synoptic hour (00/06/12/18 UTC) at or before `now`, same UTC date.
pub fn most_recent_cycle_utc(now: DateTime<Utc>) -> DateTime<Utc> {
    let cycle = ModelCycle::latest_at(now.hour());
    let midnight = now.date_naive().and_time(NaiveTime::default());
    Utc.from_utc_datetime(&(midnight + Duration::hours(cycle.hour() as i64)))
}

/// Pick the upper bound for date selection.
///
/// A declared extent always wins over the last-available hint; the fallback
/// (typically the most recent cycle) is only consulted when both are absent.
pub fn resolve_max_date<F>(
    extent_upper_bound: Option<DateTime<Utc>>,
    last_available_hint: Option<DateTime<Utc>>,
    fallback: F,
) -> DateTime<Utc>
where
    F: FnOnce() -> DateTime<Utc>,
{
    extent_upper_bound
        .or(last_available_hint)
        .unwrap_or_else(fallback)
}

/// Turn a date-only picker value into UTC midnight of the same calendar date.
///
/// The calendar date is read in the picker's own zone and the clock fields are
/// overwritten with zero. No offset shift is applied, so the date never rolls
/// to a neighbouring day.
pub fn normalize_local_picker_input_to_utc_midnight<Tz: TimeZone>(
    local_date: &DateTime<Tz>,
) -> DateTime<Utc> {
    let date = local_date.date_naive();
    Utc.from_utc_datetime(&date.and_time(NaiveTime::default()))
}

/// Instant to hand the picker so its local rendering shows the UTC calendar fields.
///
/// Display only: stored state keeps the UTC instant.
pub fn picker_display_instant<Tz: TimeZone>(utc: DateTime<Utc>, zone: &Tz) -> DateTime<Utc> {
    let offset_secs = zone
        .offset_from_utc_datetime(&utc.naive_utc())
        .fix()
        .local_minus_utc();
    utc - Duration::seconds(offset_secs as i64)
}

/// Parse an ISO-8601 instant coming from the picker, slider or a layer config.
///
/// Accepts RFC 3339, a naive datetime (assumed UTC) or a bare date.
pub fn parse_instant(s: &str) -> ExplorerResult<DateTime<Utc>> {
    // Try full datetime with timezone
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }

    // Try without timezone (assume UTC)
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(ndt) = NaiveDateTime::parse_from_str(s, format) {
            return Ok(Utc.from_utc_datetime(&ndt));
        }
    }

    // Try date only
    if let Ok(ndt) =
        NaiveDateTime::parse_from_str(&format!("{}T00:00:00", s), "%Y-%m-%dT%H:%M:%S")
    {
        return Ok(Utc.from_utc_datetime(&ndt));
    }

    Err(ExplorerError::InvalidDate(s.to_string()))
}

/// ISO-8601 UTC string with millisecond precision (`2024-06-19T06:00:00.000Z`).
pub fn to_iso_string(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Human-readable UTC rendering of an epoch used as slider value text.
///
/// Absent and zero epochs produce nothing.
pub fn display_date(epoch_ms: Option<i64>) -> Option<String> {
    let epoch_ms = epoch_ms.filter(|ms| *ms != 0)?;
    let dt = Utc.timestamp_millis_opt(epoch_ms).single()?;
    Some(dt.format("%a, %d %b %Y %H:%M:%S GMT").to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, FixedOffset};

    fn utc(s: &str) -> DateTime<Utc> {
        parse_instant(s).unwrap()
    }

    #[test]
    fn test_most_recent_cycle() {
        assert_eq!(
            most_recent_cycle_utc(utc("2024-06-19T07:00:00Z")),
            utc("2024-06-19T06:00:00Z")
        );
        assert_eq!(
            most_recent_cycle_utc(utc("2024-06-19T23:00:00Z")),
            utc("2024-06-19T18:00:00Z")
        );
        assert_eq!(
            most_recent_cycle_utc(utc("2024-06-19T02:00:00Z")),
            utc("2024-06-19T00:00:00Z")
        );
    }

    #[test]
    fn test_most_recent_cycle_zeroes_minutes() {
        let cycle = most_recent_cycle_utc(utc("2024-06-19T12:59:59.999Z"));
        assert_eq!(cycle, utc("2024-06-19T12:00:00Z"));
        assert!(ModelCycle::from_hour(cycle.hour()).is_some());
    }

    #[test]
    fn test_resolve_max_date_precedence() {
        let extent = utc("2024-06-01T00:00:00Z");
        let hint = utc("2024-06-10T00:00:00Z");
        let fallback = utc("2024-06-19T00:00:00Z");

        assert_eq!(resolve_max_date(Some(extent), Some(hint), || fallback), extent);
        assert_eq!(resolve_max_date(None, Some(hint), || fallback), hint);
        assert_eq!(resolve_max_date(None, None, || fallback), fallback);
    }

    #[test]
    fn test_resolve_max_date_skips_fallback_when_declared() {
        let extent = utc("2024-06-01T00:00:00Z");
        let result = resolve_max_date(Some(extent), None, || panic!("fallback called"));
        assert_eq!(result, extent);
    }

    #[test]
    fn test_normalize_keeps_local_calendar_date() {
        // Local midnight in UTC+2 is 22:00Z the previous day
        let zone = FixedOffset::east_opt(2 * 3600).unwrap();
        let picked = zone.with_ymd_and_hms(2024, 6, 19, 0, 0, 0).unwrap();
        let normalized = normalize_local_picker_input_to_utc_midnight(&picked);
        assert_eq!(normalized, utc("2024-06-19T00:00:00Z"));

        // West of UTC the date must not roll forward either
        let zone = FixedOffset::west_opt(7 * 3600).unwrap();
        let picked = zone.with_ymd_and_hms(2024, 6, 19, 23, 30, 0).unwrap();
        let normalized = normalize_local_picker_input_to_utc_midnight(&picked);
        assert_eq!(normalized, utc("2024-06-19T00:00:00Z"));
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let once = normalize_local_picker_input_to_utc_midnight(&utc("2024-06-19T15:45:00Z"));
        let twice = normalize_local_picker_input_to_utc_midnight(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_picker_display_instant_shows_utc_fields() {
        let stored = utc("2024-06-19T00:00:00Z");
        for offset_hours in [-10, -5, 0, 3, 9] {
            let zone = FixedOffset::east_opt(offset_hours * 3600).unwrap();
            let shown = picker_display_instant(stored, &zone).with_timezone(&zone);
            assert_eq!(shown.naive_local(), stored.naive_utc(), "offset {offset_hours}");
        }
    }

    #[test]
    fn test_parse_instant_formats() {
        let dt = parse_instant("2024-01-15T12:00:00Z").unwrap();
        assert_eq!((dt.year(), dt.month(), dt.day(), dt.hour()), (2024, 1, 15, 12));
        assert_eq!(parse_instant("2024-01-15T12:00:00").unwrap(), dt);
        assert_eq!(parse_instant("2024-01-15").unwrap().hour(), 0);
        assert!(matches!(
            parse_instant("not a date"),
            Err(ExplorerError::InvalidDate(_))
        ));
    }

    #[test]
    fn test_iso_string() {
        assert_eq!(
            to_iso_string(&utc("2024-06-19T06:00:00Z")),
            "2024-06-19T06:00:00.000Z"
        );
    }

    #[test]
    fn test_display_date() {
        let ms = utc("2024-06-19T06:00:00Z").timestamp_millis();
        assert_eq!(
            display_date(Some(ms)).as_deref(),
            Some("Wed, 19 Jun 2024 06:00:00 GMT")
        );
        assert_eq!(display_date(None), None);
        assert_eq!(display_date(Some(0)), None);
    }
}
