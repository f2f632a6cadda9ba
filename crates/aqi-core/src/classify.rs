//! Per-pollutant normalization and category severity tags

use crate::types::ObservationRecord;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// The six pollutants always shown in the per-pollutant table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Pollutant {
    #[serde(rename = "PM2.5")]
    Pm25,
    #[serde(rename = "PM10")]
    Pm10,
    #[serde(rename = "O3")]
    O3,
    #[serde(rename = "NO2")]
    No2,
    #[serde(rename = "SO2")]
    So2,
    #[serde(rename = "CO")]
    Co,
}

impl Pollutant {
    pub const ALL: [Pollutant; 6] = [
        Pollutant::Pm25,
        Pollutant::Pm10,
        Pollutant::O3,
        Pollutant::No2,
        Pollutant::So2,
        Pollutant::Co,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Pollutant::Pm25 => "PM2.5",
            Pollutant::Pm10 => "PM10",
            Pollutant::O3 => "O3",
            Pollutant::No2 => "NO2",
            Pollutant::So2 => "SO2",
            Pollutant::Co => "CO",
        }
    }

    /// Case-insensitive match against an upstream `ParameterName`.
    pub fn matches(&self, parameter_name: &str) -> bool {
        self.as_str().eq_ignore_ascii_case(parameter_name.trim())
    }

    pub fn from_name(parameter_name: &str) -> Option<Pollutant> {
        Self::ALL.into_iter().find(|p| p.matches(parameter_name))
    }
}

impl fmt::Display for Pollutant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Display severity tier derived from a category name
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Good,
    Moderate,
    UnhealthyForSensitiveGroups,
    Unhealthy,
    VeryUnhealthy,
    Hazardous,
    /// Any category name outside the EPA table
    Unrecognized,
}

impl Severity {
    pub fn from_category_name(name: &str) -> Severity {
        match name.trim().to_ascii_lowercase().as_str() {
            "good" => Severity::Good,
            "moderate" => Severity::Moderate,
            "unhealthy for sensitive groups" => Severity::UnhealthyForSensitiveGroups,
            "unhealthy" => Severity::Unhealthy,
            "very unhealthy" => Severity::VeryUnhealthy,
            "hazardous" => Severity::Hazardous,
            _ => Severity::Unrecognized,
        }
    }

    /// Badge color for the tier
    pub fn color(&self) -> &'static str {
        match self {
            Severity::Good => "green",
            Severity::Moderate => "yellow",
            Severity::UnhealthyForSensitiveGroups => "orange",
            Severity::Unhealthy => "red",
            Severity::VeryUnhealthy => "purple",
            Severity::Hazardous => "indigo",
            Severity::Unrecognized => "blue",
        }
    }
}

/// Classification slot for one pollutant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Reading {
    Observed(ObservationRecord),
    /// Checked, and the source had nothing for this pollutant
    NoData,
}

impl Reading {
    pub fn record(&self) -> Option<&ObservationRecord> {
        match self {
            Reading::Observed(rec) => Some(rec),
            Reading::NoData => None,
        }
    }

    pub fn severity(&self) -> Option<Severity> {
        self.record()
            .map(|rec| Severity::from_category_name(&rec.category.name))
    }

    pub fn is_no_data(&self) -> bool {
        matches!(self, Reading::NoData)
    }
}

/// Exactly one [`Reading`] per canonical pollutant, in canonical order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct PollutantTable {
    readings: BTreeMap<Pollutant, Reading>,
}

impl PollutantTable {
    /// A table where every pollutant is `NoData`.
    pub fn empty() -> Self {
        Self {
            readings: Pollutant::ALL
                .into_iter()
                .map(|p| (p, Reading::NoData))
                .collect(),
        }
    }

    pub fn get(&self, pollutant: Pollutant) -> &Reading {
        // every pollutant is inserted at construction
        &self.readings[&pollutant]
    }

    pub fn iter(&self) -> impl Iterator<Item = (Pollutant, &Reading)> {
        self.readings.iter().map(|(p, r)| (*p, r))
    }

    pub fn len(&self) -> usize {
        self.readings.len()
    }

    /// True when no pollutant has an observation.
    pub fn is_empty(&self) -> bool {
        self.observed_count() == 0
    }

    pub fn observed_count(&self) -> usize {
        self.readings.values().filter(|r| !r.is_no_data()).count()
    }
}

/// Build the per-pollutant table from a fetched batch.
///
/// When the batch holds several records for the same pollutant the last one
/// in input order wins. Records for pollutants outside the canonical six are
/// ignored here.
pub fn classify(records: &[ObservationRecord]) -> PollutantTable {
    let mut table = PollutantTable::empty();

    for record in records {
        if let Some(pollutant) = Pollutant::from_name(&record.parameter_name) {
            table
                .readings
                .insert(pollutant, Reading::Observed(record.clone()));
        }
    }

    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Category;

    fn obs(param: &str, aqi: i32, category: &str) -> ObservationRecord {
        ObservationRecord {
            date_observed: "2025-08-01".to_string(),
            hour_observed: 14,
            time_zone: "EST".to_string(),
            reporting_area: "New York City".to_string(),
            parameter_name: param.to_string(),
            aqi,
            category: Category::new(Category::for_aqi(aqi).number, category),
        }
    }

    #[test]
    fn test_single_ozone_reading() {
        let o3 = obs("O3", 45, "Good");
        let table = classify(std::slice::from_ref(&o3));

        assert_eq!(table.len(), 6);
        assert_eq!(table.get(Pollutant::O3), &Reading::Observed(o3));
        for (pollutant, reading) in table.iter() {
            if pollutant != Pollutant::O3 {
                assert!(reading.is_no_data(), "{} should be no-data", pollutant);
            }
        }
    }

    #[test]
    fn test_empty_input_is_all_no_data() {
        let table = classify(&[]);
        assert_eq!(table.len(), 6);
        assert!(table.is_empty());
        assert_eq!(table, PollutantTable::empty());
    }

    #[test]
    fn test_case_insensitive_match() {
        let table = classify(&[obs("pm2.5", 60, "Moderate"), obs("o3", 20, "Good")]);
        assert!(!table.get(Pollutant::Pm25).is_no_data());
        assert!(!table.get(Pollutant::O3).is_no_data());
        assert_eq!(table.observed_count(), 2);
    }

    #[test]
    fn test_last_duplicate_wins() {
        let first = obs("PM2.5", 40, "Good");
        let second = obs("PM2.5", 80, "Moderate");
        let table = classify(&[first, second.clone()]);
        assert_eq!(table.get(Pollutant::Pm25).record(), Some(&second));
    }

    #[test]
    fn test_unknown_parameter_ignored() {
        let table = classify(&[obs("PM1", 300, "Very Unhealthy")]);
        assert!(table.is_empty());
    }

    #[test]
    fn test_classify_is_idempotent() {
        let input = vec![
            obs("O3", 45, "Good"),
            obs("PM10", 120, "Unhealthy for Sensitive Groups"),
            obs("O3", 60, "Moderate"),
        ];
        assert_eq!(classify(&input), classify(&input));
    }

    #[test]
    fn test_iteration_order_is_canonical() {
        let order: Vec<_> = classify(&[]).iter().map(|(p, _)| p).collect();
        assert_eq!(order, Pollutant::ALL.to_vec());
    }

    #[test]
    fn test_severity_mapping() {
        assert_eq!(Severity::from_category_name("Good"), Severity::Good);
        assert_eq!(Severity::from_category_name("MODERATE"), Severity::Moderate);
        assert_eq!(
            Severity::from_category_name("Unhealthy for Sensitive Groups"),
            Severity::UnhealthyForSensitiveGroups
        );
        assert_eq!(Severity::from_category_name("Unhealthy"), Severity::Unhealthy);
        assert_eq!(
            Severity::from_category_name("very unhealthy"),
            Severity::VeryUnhealthy
        );
        assert_eq!(Severity::from_category_name("Hazardous"), Severity::Hazardous);
        assert_eq!(
            Severity::from_category_name("Unavailable"),
            Severity::Unrecognized
        );
        assert_eq!(Severity::Unrecognized.color(), "blue");
        assert_eq!(Severity::Unhealthy.color(), "red");
    }

    #[test]
    fn test_reading_severity() {
        let table = classify(&[obs("CO", 175, "Unhealthy")]);
        assert_eq!(table.get(Pollutant::Co).severity(), Some(Severity::Unhealthy));
        assert_eq!(table.get(Pollutant::So2).severity(), None);
    }

    #[test]
    fn test_pollutant_from_name() {
        assert_eq!(Pollutant::from_name("no2"), Some(Pollutant::No2));
        assert_eq!(Pollutant::from_name(" PM10 "), Some(Pollutant::Pm10));
        assert_eq!(Pollutant::from_name("NOX"), None);
    }
}
