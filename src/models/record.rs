//! Stored weather record and its dedup key.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A weather observation as held by the record store.
///
/// Serialized with the same field names the HTTP API exposes, which is also
/// the form kept in the snapshot cache entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherRecord {
    /// Store-assigned identifier
    pub id: i64,
    /// Location name
    pub city: String,
    /// Temperature in degrees Celsius
    pub temperature_c: i32,
    /// Observation day
    pub date: NaiveDate,
}

impl WeatherRecord {
    /// Returns the key two records must share to count as duplicates.
    pub fn dedup_key(&self) -> String {
        dedup_key(&self.city, self.date)
    }
}

/// Builds the `city_YYYYMMDD` dedup key.
///
/// Temperature never takes part: two readings for the same city and day are
/// the same observation.
pub fn dedup_key(city: &str, date: NaiveDate) -> String {
    format!("{}_{}", city, date.format("%Y%m%d"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_dedup_key_format() {
        assert_eq!(dedup_key("Paris", day(2024, 1, 1)), "Paris_20240101");
        assert_eq!(dedup_key("New York", day(1999, 12, 31)), "New York_19991231");
    }

    #[test]
    fn test_dedup_key_ignores_temperature() {
        let a = WeatherRecord {
            id: 1,
            city: "Rome".to_string(),
            temperature_c: 10,
            date: day(2024, 1, 2),
        };
        let b = WeatherRecord {
            id: 2,
            temperature_c: 35,
            ..a.clone()
        };
        assert_eq!(a.dedup_key(), b.dedup_key());
    }

    #[test]
    fn test_dedup_key_is_case_sensitive() {
        assert_ne!(dedup_key("paris", day(2024, 1, 1)), dedup_key("Paris", day(2024, 1, 1)));
    }

    #[test]
    fn test_record_json_field_names() {
        let record = WeatherRecord {
            id: 7,
            city: "Oslo".to_string(),
            temperature_c: -4,
            date: day(2024, 2, 29),
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["id"], 7);
        assert_eq!(json["city"], "Oslo");
        assert_eq!(json["temperatureC"], -4);
        assert_eq!(json["date"], "2024-02-29");
    }
}
