//! Plain-text rendering of pipeline results

use aqi_core::{ObservationRecord, PipelineResult, Reading, Severity};

/// Header, per-pollutant table and alert list for one lookup.
pub fn render_report(result: &PipelineResult) -> String {
    let mut lines = Vec::new();

    match result.records.first() {
        Some(first) => {
            lines.push(format!("City: {}", first.reporting_area));
            lines.push(format!("Date: {}", first.observed_label()));
        }
        None => lines.push("No observations reported for this ZIP code.".to_string()),
    }
    lines.push(String::new());

    for (pollutant, reading) in result.by_pollutant.iter() {
        match reading {
            Reading::Observed(rec) => {
                let severity = Severity::from_category_name(&rec.category.name);
                lines.push(format!(
                    "{:<6} {:>4}  {} [{}]",
                    pollutant.as_str(),
                    rec.aqi,
                    rec.category.name,
                    severity.color()
                ));
            }
            Reading::NoData => lines.push(format!("{:<6} {:>4}", pollutant.as_str(), "N/A")),
        }
    }

    if !result.alerts.is_empty() {
        lines.push(String::new());
        lines.push("Alerts:".to_string());
        for alert in &result.alerts {
            lines.push(format!("  ! {}", alert.message()));
        }
    }

    lines.join("\n")
}

/// Detail view for a single observation.
pub fn render_detail(record: &ObservationRecord) -> String {
    [
        record.parameter_name.clone(),
        format!("AQI: {}", record.aqi),
        record.category.name.clone(),
        format!("Location: {}", record.reporting_area),
        format!("Time: {}", record.observed_label()),
    ]
    .join("\n")
}
