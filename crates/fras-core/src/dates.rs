//! Burn-date canonicalization.
//!
//! Source layers carry their burn dates in whatever shape the supplying
//! agency exported: native date values, `YYYY-MM-DD` strings, digit strings
//! with or without `-`/`/` separators, or nothing at all. Everything is
//! normalized to one canonical form, an eight-digit `YYYYMMDD` integer,
//! before the layers are merged.
//!
//! # Parsing strategy
//!
//! Strategies are tried in order; the first success wins:
//!
//! 1. null input stays null;
//! 2. a date value is formatted directly;
//! 3. a `YYYY-MM-DD` string is parsed and reformatted;
//! 4. as a fallback, `-` and `/` are stripped from the string form and the
//!    remainder is read as an integer.
//!
//! When every strategy fails the result is a [`DateParseError`]; whether
//! that aborts the enclosing computation or degrades to a stored null is
//! the caller's choice via [`DateErrorPolicy`].

use chrono::Datelike;
use thiserror::Error;
use tracing::warn;

use fras_engine::ComputeError;
use fras_model::{Record, Value};

/// Sentinel stored in the Victoria start-date field when the source value
/// is null.
pub const NULL_START_DATE: &str = "20230101";

/// No parsing strategy could interpret the value as a calendar date.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("no date interpretation for {0:?}")]
pub struct DateParseError(pub String);

/// What to do when a raw date value cannot be parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DateErrorPolicy {
    /// Propagate the error and abort the enclosing stage.
    #[default]
    Fail,
    /// Store null for the offending record and log a warning.
    NullAndWarn,
}

/// Canonicalizes a raw attribute value to a `YYYYMMDD` integer.
///
/// Null maps to `Ok(None)`; any non-null value that resists every parsing
/// strategy is an error.
pub fn to_yyyymmdd(value: &Value) -> Result<Option<i64>, DateParseError> {
    let raw = match value {
        Value::Null => return Ok(None),
        Value::Date(datetime) => {
            let date = datetime.date();
            return Ok(Some(
                i64::from(date.year()) * 10_000
                    + i64::from(date.month()) * 100
                    + i64::from(date.day()),
            ));
        }
        Value::Text(text) => text.clone(),
        Value::Long(number) => number.to_string(),
        Value::Double(number) => number.to_string(),
    };
    let trimmed = raw.trim();
    if let Ok(date) = chrono::NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Ok(Some(
            i64::from(date.year()) * 10_000
                + i64::from(date.month()) * 100
                + i64::from(date.day()),
        ));
    }
    let stripped: String = trimmed
        .chars()
        .filter(|ch| *ch != '-' && *ch != '/')
        .collect();
    stripped
        .parse::<i64>()
        .map(Some)
        .map_err(|_| DateParseError(raw))
}

/// Clamps an out-of-range month component to December, keeping the year and
/// day. Some Victoria start dates were keyed with month values above 12.
pub fn repair_month(date: i64) -> i64 {
    let month = (date / 100) % 100;
    if month > 12 {
        let year = date / 10_000;
        let day = date % 100;
        year * 10_000 + 1_200 + day
    } else {
        date
    }
}

/// Builds the compute expression that populates a canonical burn-date field
/// from `date_field`, honoring the configured parse-failure policy.
pub fn burn_date_expr(
    date_field: &str,
    policy: DateErrorPolicy,
) -> impl Fn(&Record<'_>) -> Result<Value, ComputeError> + '_ {
    move |record| {
        let raw = record.value(date_field);
        match to_yyyymmdd(&raw) {
            Ok(canonical) => Ok(Value::from(canonical)),
            Err(error) => match policy {
                DateErrorPolicy::Fail => Err(error.into()),
                DateErrorPolicy::NullAndWarn => {
                    warn!(field = date_field, %error, "unparseable date; storing null");
                    Ok(Value::Null)
                }
            },
        }
    }
}
