use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::time::Duration;

/// Install the Prometheus recorder and describe all metrics
pub fn init_metrics() -> anyhow::Result<PrometheusHandle> {
    let handle = PrometheusBuilder::new().install_recorder()?;

    init_metric_descriptions();

    Ok(handle)
}

/// Initialize metric descriptions (can be called multiple times safely)
fn init_metric_descriptions() {
    describe_counter!(
        "valuer_estimates_total",
        "Total number of completed price estimates"
    );
    describe_counter!(
        "valuer_estimate_errors_total",
        "Total number of failed estimate requests"
    );
    describe_counter!(
        "valuer_geocode_lookups_total",
        "Geocoding outcomes, including offline fallbacks"
    );
    describe_histogram!(
        "valuer_estimate_duration_seconds",
        "End-to-end estimate duration in seconds"
    );
    describe_gauge!(
        "valuer_info",
        "Valuer version and build information"
    );

    gauge!("valuer_info", "version" => env!("CARGO_PKG_VERSION")).set(1.0);
}

/// Record a completed estimate
pub fn record_estimate(mode: &str, duration: Duration) {
    counter!("valuer_estimates_total", "mode" => mode.to_string()).increment(1);
    histogram!("valuer_estimate_duration_seconds", "mode" => mode.to_string())
        .record(duration.as_secs_f64());
}

/// Record a failed estimate
pub fn record_error(error_type: &str) {
    counter!(
        "valuer_estimate_errors_total",
        "error_type" => error_type.to_string(),
    )
    .increment(1);
}

/// Record a geocoding outcome
pub fn record_geocode(outcome: &str) {
    counter!(
        "valuer_geocode_lookups_total",
        "outcome" => outcome.to_string(),
    )
    .increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_metrics() {
        init_metric_descriptions();

        record_estimate("neighborhood", Duration::from_millis(12));
        record_error("location_not_found");
        record_geocode("hit");
        record_geocode("timeout");

        // Without an installed recorder these are no-ops; the calls must not panic
    }
}
