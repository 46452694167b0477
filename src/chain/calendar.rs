//! Trading session clock.
//!
//! Decides whether an instant falls inside a trading session: a weekday, not
//! on the holiday list, and within the inclusive `[open, close]` window of
//! the exchange's fixed time zone. The holiday list is configuration data.

use super::error::ChainError;
use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, NaiveTime, TimeZone, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use tracing::debug;

/// Bundled exchange calendar (NSE, 2025-2026).
const NSE_CALENDAR: &str = include_str!("../../data/nse_calendar.json");

/// A market holiday.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Holiday {
    /// Calendar date of the holiday.
    pub date: NaiveDate,
    /// Optional display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Session hours, time zone and holiday list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarConfig {
    /// Offset of the exchange's time zone from UTC, in minutes.
    pub utc_offset_minutes: i32,
    /// First instant of the session (inclusive, already includes any buffer).
    pub open: NaiveTime,
    /// Last instant of the session (inclusive, already includes any buffer).
    pub close: NaiveTime,
    /// Exchange holidays.
    #[serde(default)]
    pub holidays: Vec<Holiday>,
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            utc_offset_minutes: 330,
            open: NaiveTime::from_hms_opt(9, 15, 0).unwrap_or_default(),
            close: NaiveTime::from_hms_opt(15, 40, 0).unwrap_or_default(),
            holidays: Vec::new(),
        }
    }
}

/// Why a session is or is not open at a given instant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionStatus {
    /// Inside session hours on a trading day.
    Open {
        /// Local trading date.
        date: NaiveDate,
    },
    /// Saturday or Sunday.
    Weekend {
        /// Local date.
        date: NaiveDate,
    },
    /// A listed holiday.
    Holiday {
        /// Holiday date.
        date: NaiveDate,
        /// Holiday name, if the calendar carries one.
        name: Option<String>,
    },
    /// Trading day, session not yet open.
    BeforeOpen {
        /// Whole hours until the open.
        hours: i64,
        /// Remaining whole minutes until the open.
        minutes: i64,
        /// Session open time.
        opens_at: NaiveTime,
    },
    /// Trading day, session already closed.
    AfterClose,
}

impl SessionStatus {
    /// Returns true when downstream work should run.
    #[must_use]
    pub fn is_open(&self) -> bool {
        matches!(self, SessionStatus::Open { .. })
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionStatus::Open { date } => {
                write!(f, "Market open - {}", date.format("%A"))
            }
            SessionStatus::Weekend { date } => {
                write!(f, "Market closed - {} (Weekend)", date.format("%A"))
            }
            SessionStatus::Holiday { date, name } => match name {
                Some(name) => write!(
                    f,
                    "Market closed - {} ({name}) (Holiday)",
                    date.format("%A")
                ),
                None => write!(
                    f,
                    "Market closed - {} ({date}) (Holiday)",
                    date.format("%A")
                ),
            },
            SessionStatus::BeforeOpen {
                hours,
                minutes,
                opens_at,
            } => write!(
                f,
                "Market opens in {hours}h {minutes}m at {}",
                opens_at.format("%H:%M")
            ),
            SessionStatus::AfterClose => write!(f, "Market closed for the day"),
        }
    }
}

/// Trading calendar for a single exchange.
#[derive(Debug, Clone)]
pub struct TradingCalendar {
    offset: FixedOffset,
    open: NaiveTime,
    close: NaiveTime,
    holidays: BTreeMap<NaiveDate, Option<String>>,
}

impl TradingCalendar {
    /// Builds a calendar from configuration.
    pub fn new(config: CalendarConfig) -> Result<Self, ChainError> {
        let offset = FixedOffset::east_opt(config.utc_offset_minutes * 60).ok_or_else(|| {
            ChainError::InvalidConfig {
                message: format!(
                    "utc offset of {} minutes is out of range",
                    config.utc_offset_minutes
                ),
            }
        })?;

        if config.open > config.close {
            return Err(ChainError::InvalidConfig {
                message: format!(
                    "session open {} is after close {}",
                    config.open, config.close
                ),
            });
        }

        let holidays = config
            .holidays
            .into_iter()
            .map(|holiday| (holiday.date, holiday.name))
            .collect();

        Ok(Self {
            offset,
            open: config.open,
            close: config.close,
            holidays,
        })
    }

    /// Parses a calendar from its JSON configuration.
    pub fn from_json(data: &str) -> Result<Self, ChainError> {
        let config: CalendarConfig =
            serde_json::from_str(data).map_err(|error| ChainError::DeserializationError {
                message: error.to_string(),
            })?;
        Self::new(config)
    }

    /// The bundled NSE calendar.
    pub fn nse() -> Result<Self, ChainError> {
        Self::from_json(NSE_CALENDAR)
    }

    /// The exchange's fixed time zone.
    #[must_use]
    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    /// Converts an instant into exchange-local time.
    #[must_use]
    pub fn local<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> DateTime<FixedOffset> {
        now.with_timezone(&self.offset)
    }

    /// Returns true if `date` is a listed holiday.
    #[must_use]
    pub fn is_holiday(&self, date: NaiveDate) -> bool {
        self.holidays.contains_key(&date)
    }

    /// Returns true if `date` is a weekday that is not a holiday.
    #[must_use]
    pub fn is_trading_day(&self, date: NaiveDate) -> bool {
        !is_weekend(date.weekday()) && !self.is_holiday(date)
    }

    /// The latest trading day on or before `date`.
    ///
    /// Gives up after a year of lookback and returns `date` unchanged.
    #[must_use]
    pub fn trading_day_on_or_before(&self, date: NaiveDate) -> NaiveDate {
        let mut candidate = date;
        for _ in 0..366 {
            if self.is_trading_day(candidate) {
                return candidate;
            }
            match candidate.pred_opt() {
                Some(previous) => candidate = previous,
                None => break,
            }
        }
        date
    }

    /// Classifies `now` against the session rules.
    #[must_use]
    pub fn session_status<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> SessionStatus {
        let local = self.local(now);
        let date = local.date_naive();
        let time = local.time();

        let status = if is_weekend(date.weekday()) {
            SessionStatus::Weekend { date }
        } else if let Some(name) = self.holidays.get(&date) {
            SessionStatus::Holiday {
                date,
                name: name.clone(),
            }
        } else if time < self.open {
            let seconds = self.open.signed_duration_since(time).num_seconds();
            SessionStatus::BeforeOpen {
                hours: seconds / 3600,
                minutes: (seconds % 3600) / 60,
                opens_at: self.open,
            }
        } else if time > self.close {
            SessionStatus::AfterClose
        } else {
            SessionStatus::Open { date }
        };

        debug!(local = %local, status = %status, "session status");
        status
    }

    /// Returns whether the session is open at `now` together with a
    /// human-readable reason.
    #[must_use]
    pub fn is_session_open<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> (bool, String) {
        let status = self.session_status(now);
        (status.is_open(), status.to_string())
    }
}

fn is_weekend(weekday: Weekday) -> bool {
    matches!(weekday, Weekday::Sat | Weekday::Sun)
}
