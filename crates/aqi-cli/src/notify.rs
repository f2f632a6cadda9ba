//! Alert delivery through the log stream

use std::collections::HashMap;

use anyhow::Result;
use aqi_core::{Alert, AlertNotifier};
use tokio::sync::Mutex;

/// Emits each alert as a warning event.
///
/// An alert id that was already delivered with the same AQI is skipped, so
/// repeated lookups of an unchanged reading do not repeat the alert.
#[derive(Default)]
pub struct LogNotifier {
    delivered: Mutex<HashMap<String, i32>>,
}

impl LogNotifier {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl AlertNotifier for LogNotifier {
    async fn deliver(&self, alert: &Alert) -> Result<()> {
        let mut delivered = self.delivered.lock().await;
        if delivered.get(&alert.id) == Some(&alert.record.aqi) {
            tracing::debug!(id = %alert.id, "alert already delivered");
            return Ok(());
        }
        delivered.insert(alert.id.clone(), alert.record.aqi);

        tracing::warn!(id = %alert.id, title = alert.title(), "{}", alert.message());
        Ok(())
    }
}

/// Hand every alert to `notifier`. Failures are logged and skipped; returns
/// how many deliveries succeeded.
pub async fn deliver_alerts(notifier: &dyn AlertNotifier, alerts: &[Alert]) -> usize {
    let mut delivered = 0;
    for alert in alerts {
        match notifier.deliver(alert).await {
            Ok(()) => delivered += 1,
            Err(e) => tracing::warn!(id = %alert.id, error = ?e, "alert delivery failed"),
        }
    }
    delivered
}
