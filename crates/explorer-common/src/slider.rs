//! Date/time slider window.

use chrono::{DateTime, Duration, Utc};

use crate::duration::parse_duration_ms;
use crate::error::ExplorerResult;

/// Default slider step when none is configured.
pub const DEFAULT_STEP: &str = "P1D";

/// A bounded, stepped range of UTC instants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SliderWindow {
    pub min: DateTime<Utc>,
    pub max: DateTime<Utc>,
    /// Step between ticks in milliseconds
    pub step_ms: i64,
}

impl SliderWindow {
    /// Build a window from an ISO-8601 step. An open `max` means "now".
    pub fn new(
        min: DateTime<Utc>,
        max: Option<DateTime<Utc>>,
        step: Option<&str>,
    ) -> ExplorerResult<Self> {
        let step_ms = parse_duration_ms(step.unwrap_or(DEFAULT_STEP))?;
        Ok(Self {
            min,
            max: max.unwrap_or_else(Utc::now),
            step_ms,
        })
    }

    /// Window used by the forecast form: 48 hours from the selected start, hourly.
    pub fn forecast(start: DateTime<Utc>) -> ExplorerResult<Self> {
        Self::new(start, Some(start + Duration::hours(48)), Some("PT1H"))
    }

    /// Snap an instant to the nearest tick, clamped into the window.
    pub fn snap(&self, value: DateTime<Utc>) -> DateTime<Utc> {
        if value <= self.min || self.step_ms <= 0 {
            return self.min.max(value.min(self.max));
        }
        let offset = (value - self.min).num_milliseconds();
        let steps = (offset as f64 / self.step_ms as f64).round() as i64;
        let snapped = self.min + Duration::milliseconds(steps * self.step_ms);
        if snapped > self.max {
            self.last_tick()
        } else {
            snapped
        }
    }

    /// Every tick from `min` up to and including `max` when it lands on a step.
    pub fn ticks(&self) -> Vec<DateTime<Utc>> {
        if self.step_ms <= 0 || self.max < self.min {
            return vec![self.min];
        }
        let span = (self.max - self.min).num_milliseconds();
        (0..=span / self.step_ms)
            .map(|i| self.min + Duration::milliseconds(i * self.step_ms))
            .collect()
    }

    fn last_tick(&self) -> DateTime<Utc> {
        let span = (self.max - self.min).num_milliseconds();
        self.min + Duration::milliseconds((span / self.step_ms) * self.step_ms)
    }
}
