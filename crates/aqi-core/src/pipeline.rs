//! Fetch -> classify -> alert orchestration

use std::future::Future;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::alerts::{Alert, AlertPolicy};
use crate::classify::{classify, PollutantTable};
use crate::error::{FetchResult, PipelineError, PipelineOutcome};
use crate::types::ObservationRecord;

/// Remote source of current observations for a ZIP code.
///
/// Implementations make exactly one request per call and never retry.
#[async_trait::async_trait]
pub trait ObservationSource: Send + Sync {
    fn name(&self) -> &str;

    async fn fetch(&self, zip_code: &str) -> FetchResult<Vec<ObservationRecord>>;
}

/// Output of one pipeline run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineResult {
    pub by_pollutant: PollutantTable,
    pub alerts: Vec<Alert>,
    /// The fetched batch, verbatim and in source order
    pub records: Vec<ObservationRecord>,
}

impl PipelineResult {
    pub fn empty() -> Self {
        Self {
            by_pollutant: PollutantTable::empty(),
            alerts: Vec::new(),
            records: Vec::new(),
        }
    }

    /// Reporting area of the first fetched record
    pub fn reporting_area(&self) -> Option<&str> {
        self.records.first().map(|r| r.reporting_area.as_str())
    }
}

pub struct Pipeline {
    source: Box<dyn ObservationSource>,
}

impl Pipeline {
    pub fn new(source: Box<dyn ObservationSource>) -> Self {
        Self { source }
    }

    pub fn source_name(&self) -> &str {
        self.source.name()
    }

    /// Run the pipeline for one ZIP code.
    pub async fn run(&self, zip_code: &str, threshold: i32) -> PipelineOutcome<PipelineResult> {
        self.run_until(zip_code, threshold, std::future::pending::<()>())
            .await
    }

    /// Like [`Pipeline::run`], but fails with [`PipelineError::Cancelled`] as
    /// soon as `cancel` resolves. A cancelled run never yields partial data.
    pub async fn run_until<F>(
        &self,
        zip_code: &str,
        threshold: i32,
        cancel: F,
    ) -> PipelineOutcome<PipelineResult>
    where
        F: Future<Output = ()> + Send,
    {
        debug!(source = self.source.name(), zip = zip_code, "fetching observations");

        let records = tokio::select! {
            biased;
            _ = cancel => {
                info!(zip = zip_code, "pipeline run cancelled");
                return Err(PipelineError::Cancelled);
            }
            fetched = self.source.fetch(zip_code) => fetched.map_err(|e| {
                warn!(zip = zip_code, error = %e, "fetch failed");
                PipelineError::Fetch(e)
            })?,
        };

        if records.is_empty() {
            info!(zip = zip_code, "no observations returned");
            return Ok(PipelineResult::empty());
        }

        for record in &records {
            if !record.aqi_in_range() {
                warn!(
                    parameter = %record.parameter_name,
                    aqi = record.aqi,
                    "AQI outside 0-500 scale"
                );
            } else if !record.category_matches_aqi() {
                debug!(
                    parameter = %record.parameter_name,
                    aqi = record.aqi,
                    category = record.category.number,
                    "upstream category disagrees with breakpoints"
                );
            }
        }

        let by_pollutant = classify(&records);
        let alerts = AlertPolicy::new(threshold).alerts(&records);

        info!(
            zip = zip_code,
            records = records.len(),
            observed = by_pollutant.observed_count(),
            alerts = alerts.len(),
            "pipeline run complete"
        );

        Ok(PipelineResult {
            by_pollutant,
            alerts,
            records,
        })
    }
}
