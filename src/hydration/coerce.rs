//! Date/time coercion for properties registered with [`Setter::Date`].
//!
//! [`Setter::Date`]: crate::model::Setter::Date

use crate::config::DateConfig;
use crate::error::ValueError;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::Value;

/// Converts record values to UTC date/times
#[derive(Debug, Clone)]
pub struct DateCoercer {
    formats: Vec<String>,
    accept_timestamps: bool,
}

impl DateCoercer {
    pub fn new(config: &DateConfig) -> Self {
        Self {
            formats: config.formats.clone(),
            accept_timestamps: config.accept_timestamps,
        }
    }

    /// Coerce a value; `null` and empty strings become `None`
    pub fn coerce(&self, value: &Value) -> Result<Option<DateTime<Utc>>, ValueError> {
        match value {
            Value::Null => Ok(None),
            Value::String(s) if s.trim().is_empty() => Ok(None),
            Value::String(s) => self.parse(s.trim()).map(Some),
            Value::Number(n) if self.accept_timestamps => n
                .as_i64()
                .and_then(|secs| DateTime::from_timestamp(secs, 0))
                .map(Some)
                .ok_or_else(|| ValueError::new(format!("timestamp out of range: {n}"))),
            other => Err(ValueError::new(format!("not a date: {other}"))),
        }
    }

    fn parse(&self, s: &str) -> Result<DateTime<Utc>, ValueError> {
        if let Ok(date) = DateTime::parse_from_rfc3339(s) {
            return Ok(date.with_timezone(&Utc));
        }

        for format in &self.formats {
            if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
                return Ok(naive.and_utc());
            }
            if let Some(midnight) = NaiveDate::parse_from_str(s, format)
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
            {
                return Ok(midnight.and_utc());
            }
        }

        Err(ValueError::new(format!("unrecognized date format: {s}")))
    }
}

impl Default for DateCoercer {
    fn default() -> Self {
        Self::new(&DateConfig::default())
    }
}
