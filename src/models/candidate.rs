//! Candidate records submitted to `POST /weather`
//!
//! Defines the structure of incoming write batches.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer};

use super::record::dedup_key;

/// A weather record that has not been stored yet.
///
/// # Fields
/// - `city`: Location name, must not be blank
/// - `temperatureC`: Temperature in Celsius
/// - `date`: Either `YYYY-MM-DD` or an ISO 8601 date-time; the time is dropped
///
/// Any `id` sent by the client is ignored, the store assigns one.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewWeatherRecord {
    /// Location name
    pub city: String,
    /// Temperature in degrees Celsius
    #[serde(default)]
    pub temperature_c: i32,
    /// Observation day
    #[serde(deserialize_with = "deserialize_day")]
    pub date: NaiveDate,
}

impl NewWeatherRecord {
    /// Creates a candidate record.
    pub fn new(city: impl Into<String>, temperature_c: i32, date: NaiveDate) -> Self {
        Self {
            city: city.into(),
            temperature_c,
            date,
        }
    }

    /// Returns the `city_YYYYMMDD` key this candidate is deduplicated on.
    pub fn dedup_key(&self) -> String {
        dedup_key(&self.city, self.date)
    }

    /// Validates the candidate
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if self.city.trim().is_empty() {
            return Some("City cannot be empty".to_string());
        }
        None
    }
}

fn deserialize_day<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_day(&raw).ok_or_else(|| serde::de::Error::custom(format!("invalid date: {raw}")))
}

fn parse_day(raw: &str) -> Option<NaiveDate> {
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(datetime) = DateTime::parse_from_rfc3339(raw) {
        return Some(datetime.date_naive());
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|datetime| datetime.date())
}
