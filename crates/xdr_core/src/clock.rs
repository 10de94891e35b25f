use std::cell::Cell;

use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Duration, OffsetDateTime, UtcOffset};

use crate::error::AppError;

/// Source of "now" for update stamps and server-assigned timestamps.
pub trait Clock {
    fn now_utc(&self) -> OffsetDateTime;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_utc(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc()
    }
}

/// Manually driven clock for deterministic tests and demo data.
#[derive(Debug)]
pub struct FixedClock {
    now: Cell<OffsetDateTime>,
}

impl FixedClock {
    pub fn new(now: OffsetDateTime) -> Self {
        Self {
            now: Cell::new(now),
        }
    }

    pub fn at_rfc3339(s: &str) -> Result<Self, AppError> {
        Ok(Self::new(parse_rfc3339(s)?))
    }

    pub fn set(&self, now: OffsetDateTime) {
        self.now.set(now);
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Clock for FixedClock {
    fn now_utc(&self) -> OffsetDateTime {
        self.now.get()
    }
}

/// Canonical stored form: RFC3339 in UTC with a fixed six-digit fraction, so that text order
/// matches time order.
pub fn format_rfc3339_utc(dt: OffsetDateTime) -> Result<String, AppError> {
    dt.to_offset(UtcOffset::UTC)
        .format(format_description!(
            "[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:6]Z"
        ))
        .map_err(|e| {
            AppError::new("TIME_FORMAT_FAILED", "Failed to format timestamp")
                .with_details(e.to_string())
        })
}

pub fn parse_rfc3339(s: &str) -> Result<OffsetDateTime, AppError> {
    OffsetDateTime::parse(s, &Rfc3339).map_err(|e| {
        AppError::new("TIME_PARSE_FAILED", "Failed to parse RFC3339 timestamp")
            .with_details(format!("value={s}; err={e}"))
    })
}

/// Re-renders any RFC3339 timestamp in the canonical stored form.
pub fn normalize_rfc3339_utc(s: &str) -> Result<String, AppError> {
    format_rfc3339_utc(parse_rfc3339(s)?)
}

pub fn now_rfc3339_utc(clock: &dyn Clock) -> Result<String, AppError> {
    format_rfc3339_utc(clock.now_utc())
}
