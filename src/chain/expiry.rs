//! Expiry moments.
//!
//! Expiries are identified by `DD-MON-YYYY` labels (e.g. `21-OCT-2025`) and
//! settle at a fixed session-close time in the exchange's time zone.

use super::calendar::TradingCalendar;
use super::error::ChainError;
use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveDate, NaiveTime, TimeZone, Timelike, Weekday};
use serde::{Deserialize, Serialize};

/// Seconds in a 365-day year.
pub const SECONDS_PER_YEAR: f64 = 365.0 * 24.0 * 60.0 * 60.0;

/// Label format accepted by [`ExpiryMoment::parse`].
const LABEL_FORMAT: &str = "%d-%b-%Y";

/// An expiry date localized at its settlement time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpiryMoment {
    at: DateTime<FixedOffset>,
}

impl ExpiryMoment {
    /// Localizes `date` at `close` in `offset`.
    pub fn new(date: NaiveDate, close: NaiveTime, offset: FixedOffset) -> Result<Self, ChainError> {
        let at = offset
            .from_local_datetime(&date.and_time(close))
            .single()
            .ok_or_else(|| ChainError::InvalidExpiry {
                input: date.to_string(),
            })?;
        Ok(Self { at })
    }

    /// Parses a `DD-MON-YYYY` label; the month name is case-insensitive.
    pub fn parse(label: &str, close: NaiveTime, offset: FixedOffset) -> Result<Self, ChainError> {
        let date = NaiveDate::parse_from_str(label.trim(), LABEL_FORMAT).map_err(|_| {
            ChainError::InvalidExpiry {
                input: label.to_string(),
            }
        })?;
        Self::new(date, close, offset)
    }

    /// Settlement instant.
    #[must_use]
    pub fn at(&self) -> DateTime<FixedOffset> {
        self.at
    }

    /// Settlement date.
    #[must_use]
    pub fn date(&self) -> NaiveDate {
        self.at.date_naive()
    }

    /// Upper-case `DD-MON-YYYY` label.
    #[must_use]
    pub fn label(&self) -> String {
        self.at.format(LABEL_FORMAT).to_string().to_uppercase()
    }

    /// Fraction of a 365-day year from `now` to settlement.
    ///
    /// Negative once the expiry has passed; the solver rejects that.
    #[must_use]
    pub fn time_to_expiry<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> f64 {
        let remaining = self.at.signed_duration_since(now.with_timezone(&self.at.timezone()));
        remaining.num_milliseconds() as f64 / 1000.0 / SECONDS_PER_YEAR
    }
}

/// Next weekly expiry on `weekday`, as seen from `now`.
///
/// Today counts when it is the expiry weekday and the local hour is before
/// `rollover_hour`. An expiry falling on a holiday moves to the previous
/// trading day.
pub fn next_weekly_expiry<Tz: TimeZone>(
    calendar: &TradingCalendar,
    now: &DateTime<Tz>,
    weekday: Weekday,
    rollover_hour: u32,
    close: NaiveTime,
) -> Result<ExpiryMoment, ChainError> {
    let local = calendar.local(now);
    let today = local.date_naive();

    let mut days_ahead =
        i64::from(weekday.num_days_from_monday()) - i64::from(today.weekday().num_days_from_monday());
    if days_ahead < 0 || (days_ahead == 0 && local.hour() >= rollover_hour) {
        days_ahead += 7;
    }

    let nominal = today + Duration::days(days_ahead);
    let date = calendar.trading_day_on_or_before(nominal);
    ExpiryMoment::new(date, close, calendar.offset())
}
