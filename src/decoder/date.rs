//! Dates whose wire representation is chosen at decode time.
//!
//! A [`Date`] field does not know how the server encodes dates; the
//! [`DateDecodingStrategy`] of the decoder currently running on this thread
//! decides. [`JsonDecoder`](crate::decoder::json_decoder::JsonDecoder) installs
//! its strategy for exactly the duration of one `decode` call.

use std::{cell::RefCell, fmt, ops::Deref};

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, de};

/// Seconds between the Unix epoch and 2001-01-01T00:00:00Z.
const REFERENCE_DATE_OFFSET: f64 = 978_307_200.0;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DateDecodingStrategy {
    /// Seconds since 2001-01-01T00:00:00Z.
    #[default]
    DeferredToDate,
    SecondsSince1970,
    MillisecondsSince1970,
    /// RFC 3339 strings.
    Iso8601,
    /// A chrono format string. Values without an offset are read as UTC.
    Formatted(String),
}

thread_local! {
    static ACTIVE_STRATEGY: RefCell<Option<DateDecodingStrategy>> = const { RefCell::new(None) };
}

struct StrategyGuard {
    previous: Option<DateDecodingStrategy>,
}

impl Drop for StrategyGuard {
    fn drop(&mut self) {
        let previous = self.previous.take();
        ACTIVE_STRATEGY.with(|active| *active.borrow_mut() = previous);
    }
}

/// Runs `f` with `strategy` active for every [`Date`] deserialized on this thread.
pub(crate) fn with_date_strategy<R>(strategy: &DateDecodingStrategy, f: impl FnOnce() -> R) -> R {
    let previous = ACTIVE_STRATEGY.with(|active| active.replace(Some(strategy.clone())));
    let _guard = StrategyGuard { previous };
    f()
}

fn active_strategy() -> DateDecodingStrategy {
    ACTIVE_STRATEGY.with(|active| active.borrow().clone().unwrap_or_default())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Date(pub DateTime<Utc>);

impl Date {
    pub fn into_inner(self) -> DateTime<Utc> {
        self.0
    }
}

impl Deref for Date {
    type Target = DateTime<Utc>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<DateTime<Utc>> for Date {
    fn from(value: DateTime<Utc>) -> Self {
        Date(value)
    }
}

impl fmt::Display for Date {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawDate {
    Number(f64),
    Text(String),
}

fn from_seconds(seconds: f64) -> Option<DateTime<Utc>> {
    if !seconds.is_finite() {
        return None;
    }
    let whole = seconds.floor();
    let nanos = (((seconds - whole) * 1e9).round() as u32).min(999_999_999);
    Utc.timestamp_opt(whole as i64, nanos).single()
}

fn from_formatted(text: &str, format: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_str(text, format)
        .map(|date| date.with_timezone(&Utc))
        .or_else(|_| NaiveDateTime::parse_from_str(text, format).map(|naive| naive.and_utc()))
        .or_else(|_| {
            NaiveDate::parse_from_str(text, format)
                .map(|date| date.and_time(NaiveTime::MIN).and_utc())
        })
        .ok()
}

impl<'de> Deserialize<'de> for Date {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = RawDate::deserialize(deserializer)?;
        let strategy = active_strategy();

        let parsed = match (&strategy, raw) {
            (DateDecodingStrategy::DeferredToDate, RawDate::Number(seconds)) => {
                from_seconds(seconds + REFERENCE_DATE_OFFSET)
            }
            (DateDecodingStrategy::SecondsSince1970, RawDate::Number(seconds)) => {
                from_seconds(seconds)
            }
            (DateDecodingStrategy::MillisecondsSince1970, RawDate::Number(millis)) => {
                from_seconds(millis / 1000.0)
            }
            (DateDecodingStrategy::Iso8601, RawDate::Text(text)) => {
                DateTime::parse_from_rfc3339(&text)
                    .map(|date| date.with_timezone(&Utc))
                    .ok()
            }
            (DateDecodingStrategy::Formatted(format), RawDate::Text(text)) => {
                from_formatted(&text, format)
            }
            (strategy, RawDate::Number(_)) => {
                return Err(de::Error::custom(format!(
                    "expected a date string for {strategy:?}, found a number"
                )));
            }
            (strategy, RawDate::Text(_)) => {
                return Err(de::Error::custom(format!(
                    "expected a numeric date for {strategy:?}, found a string"
                )));
            }
        };

        parsed
            .map(Date)
            .ok_or_else(|| de::Error::custom(format!("date does not match {strategy:?}")))
    }
}
