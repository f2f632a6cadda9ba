//! Alert decisions for readings above a threshold
//!
//! The policy only selects which readings qualify. Presenting them to a user
//! is the job of an [`AlertNotifier`] supplied by the caller.

use crate::types::ObservationRecord;
use anyhow::Result;
use serde::{Deserialize, Serialize};

/// AQI above which a reading raises an alert unless the caller overrides it
pub const DEFAULT_THRESHOLD: i32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlertPolicy {
    threshold: i32,
}

impl Default for AlertPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_THRESHOLD)
    }
}

impl AlertPolicy {
    pub fn new(threshold: i32) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> i32 {
        self.threshold
    }

    /// Records whose AQI strictly exceeds the threshold, in input order.
    pub fn evaluate(&self, records: &[ObservationRecord]) -> Vec<ObservationRecord> {
        records
            .iter()
            .filter(|rec| rec.aqi > self.threshold)
            .cloned()
            .collect()
    }

    /// Same selection as [`AlertPolicy::evaluate`], wrapped with delivery ids.
    pub fn alerts(&self, records: &[ObservationRecord]) -> Vec<Alert> {
        self.evaluate(records).into_iter().map(Alert::new).collect()
    }
}

/// A reading that crossed the threshold, plus a stable id for deduplicating
/// repeated deliveries of the same alert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alert {
    pub id: String,
    pub record: ObservationRecord,
}

impl Alert {
    pub fn new(record: ObservationRecord) -> Self {
        Self {
            id: alert_id(&record),
            record,
        }
    }

    pub fn title(&self) -> &'static str {
        "Air Quality Alert"
    }

    pub fn message(&self) -> String {
        format!(
            "AQI for {} in {} is {} ({}).",
            self.record.parameter_name,
            self.record.reporting_area,
            self.record.aqi,
            self.record.category.name
        )
    }
}

/// Deterministic identifier derived from pollutant and reporting area.
pub fn alert_id(record: &ObservationRecord) -> String {
    format!("AQI_{}_{}", record.parameter_name, record.reporting_area)
}

/// Delivery collaborator for alerts (push, desktop notification, log line...)
#[async_trait::async_trait]
pub trait AlertNotifier: Send + Sync {
    async fn deliver(&self, alert: &Alert) -> Result<()>;
}
