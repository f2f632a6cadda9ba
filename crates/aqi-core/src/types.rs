//! Core data types for air-quality observations

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Upper bound of the AQI scale
pub const AQI_MAX: i32 = 500;

/// One pollutant reading for a reporting area.
///
/// Field names on the wire follow the AirNow observation payload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ObservationRecord {
    /// Calendar date of the observation (`YYYY-MM-DD`)
    #[serde(rename = "DateObserved")]
    pub date_observed: String,

    /// Local hour of the observation, 0-23
    #[serde(rename = "HourObserved")]
    pub hour_observed: u8,

    /// Short timezone label, e.g. "EST"
    #[serde(rename = "LocalTimeZone")]
    pub time_zone: String,

    #[serde(rename = "ReportingArea")]
    pub reporting_area: String,

    /// Pollutant identifier as reported upstream ("PM2.5", "O3", ...)
    #[serde(rename = "ParameterName")]
    pub parameter_name: String,

    #[serde(rename = "AQI")]
    pub aqi: i32,

    #[serde(rename = "Category")]
    pub category: Category,
}

/// EPA-style category bucket attached to an AQI value
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Category {
    #[serde(rename = "Number")]
    pub number: i32,

    #[serde(rename = "Name")]
    pub name: String,
}

impl Category {
    pub fn new(number: i32, name: impl Into<String>) -> Self {
        Self {
            number,
            name: name.into(),
        }
    }

    /// Recompute the category from an AQI value using the EPA breakpoints.
    pub fn for_aqi(aqi: i32) -> Self {
        let (number, name) = match aqi {
            i32::MIN..=50 => (1, "Good"),
            51..=100 => (2, "Moderate"),
            101..=150 => (3, "Unhealthy for Sensitive Groups"),
            151..=200 => (4, "Unhealthy"),
            201..=300 => (5, "Very Unhealthy"),
            _ => (6, "Hazardous"),
        };
        Self::new(number, name)
    }
}

impl ObservationRecord {
    /// Parsed observation date, `None` when upstream sent something other than `YYYY-MM-DD`.
    pub fn observed_date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(&self.date_observed, "%Y-%m-%d").ok()
    }

    /// "2025-08-01 @ 14:00 EST"
    pub fn observed_label(&self) -> String {
        format!(
            "{} @ {:02}:00 {}",
            self.date_observed, self.hour_observed, self.time_zone
        )
    }

    /// Whether the upstream category number agrees with the breakpoint table.
    pub fn category_matches_aqi(&self) -> bool {
        Category::for_aqi(self.aqi).number == self.category.number
    }

    /// AQI inside the 0-500 scale. Out-of-range values are kept, just flagged.
    pub fn aqi_in_range(&self) -> bool {
        (0..=AQI_MAX).contains(&self.aqi)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(aqi: i32, number: i32, name: &str) -> ObservationRecord {
        ObservationRecord {
            date_observed: "2025-08-01".to_string(),
            hour_observed: 9,
            time_zone: "EST".to_string(),
            reporting_area: "New York City".to_string(),
            parameter_name: "O3".to_string(),
            aqi,
            category: Category::new(number, name),
        }
    }

    #[test]
    fn test_category_breakpoints() {
        assert_eq!(Category::for_aqi(0).number, 1);
        assert_eq!(Category::for_aqi(50).number, 1);
        assert_eq!(Category::for_aqi(51).number, 2);
        assert_eq!(Category::for_aqi(100).number, 2);
        assert_eq!(Category::for_aqi(150).name, "Unhealthy for Sensitive Groups");
        assert_eq!(Category::for_aqi(175).name, "Unhealthy");
        assert_eq!(Category::for_aqi(300).number, 5);
        assert_eq!(Category::for_aqi(301).name, "Hazardous");
        assert_eq!(Category::for_aqi(999).number, 6);
    }

    #[test]
    fn test_category_consistency_check() {
        assert!(record(45, 1, "Good").category_matches_aqi());
        assert!(!record(175, 1, "Good").category_matches_aqi());
    }

    #[test]
    fn test_observed_date_and_label() {
        let rec = record(45, 1, "Good");
        assert_eq!(
            rec.observed_date(),
            NaiveDate::from_ymd_opt(2025, 8, 1)
        );
        assert_eq!(rec.observed_label(), "2025-08-01 @ 09:00 EST");

        let mut bad = rec.clone();
        bad.date_observed = "08/01/2025".to_string();
        assert_eq!(bad.observed_date(), None);
    }

    #[test]
    fn test_aqi_range() {
        assert!(record(0, 1, "Good").aqi_in_range());
        assert!(record(500, 6, "Hazardous").aqi_in_range());
        assert!(!record(-1, 1, "Good").aqi_in_range());
        assert!(!record(501, 6, "Hazardous").aqi_in_range());
    }

    #[test]
    fn test_observation_record_serde() {
        let json = r#"{"DateObserved":"2025-08-01","HourObserved":9,"LocalTimeZone":"EST",
            "ReportingArea":"New York City","StateCode":"NY","ParameterName":"O3","AQI":45,
            "Category":{"Number":1,"Name":"Good"}}"#;
        let rec: ObservationRecord = serde_json::from_str(json).unwrap();

        assert_eq!(rec, record(45, 1, "Good"));
    }
}
