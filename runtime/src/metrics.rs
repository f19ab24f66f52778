//! Prometheus metrics for the store runtime and seed fetching.
//!
//! Metrics are recorded through the `metrics` facade everywhere; nothing is
//! exported until [`install_prometheus`] installs a recorder. Without a
//! recorder the macros are no-ops, which is what tests rely on.
//!
//! # Example
//!
//! ```rust,no_run
//! use todo_store_runtime::metrics::install_prometheus;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! install_prometheus("0.0.0.0:9000".parse()?)?;
//! // Metrics available at http://localhost:9000/metrics
//! # Ok(())
//! # }
//! ```

use metrics::{describe_counter, describe_histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder};
use std::net::SocketAddr;
use thiserror::Error;

/// Errors from metrics operations.
#[derive(Error, Debug)]
pub enum MetricsError {
    /// Failed to build metrics exporter
    #[error("Failed to build metrics exporter: {0}")]
    Build(String),
    /// Failed to install metrics exporter
    #[error("Failed to install metrics exporter: {0}")]
    Install(String),
}

/// Install a Prometheus recorder with an HTTP listener on `addr`.
///
/// Must be called from within a tokio runtime; the listener runs on it.
///
/// # Errors
///
/// Returns [`MetricsError`] if the exporter cannot be built or a recorder is
/// already installed.
pub fn install_prometheus(addr: SocketAddr) -> Result<(), MetricsError> {
    register_metrics();

    PrometheusBuilder::new()
        .with_http_listener(addr)
        .set_buckets_for_metric(
            Matcher::Suffix("duration_seconds".to_string()),
            &[0.000_01, 0.000_1, 0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0],
        )
        .map_err(|e| MetricsError::Build(e.to_string()))?
        .install()
        .map_err(|e| MetricsError::Install(e.to_string()))?;

    tracing::info!(%addr, "Metrics available at http://{addr}/metrics");
    Ok(())
}

/// Register all metric descriptions.
fn register_metrics() {
    describe_counter!("store.commands.total", "Total number of actions sent to a store");
    describe_counter!(
        "store.effects.executed",
        "Effects executed by the runtime, labelled by effect type"
    );
    describe_counter!(
        "store.shutdown.rejected_actions",
        "Actions rejected because the store was shutting down"
    );
    describe_histogram!(
        "store.reducer.duration_seconds",
        "Time spent inside the reducer per action"
    );
    describe_counter!(
        "todo.seed.fetch.total",
        "Seed fetch attempts, labelled by outcome"
    );
}
