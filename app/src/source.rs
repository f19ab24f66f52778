//! Seed sources: where the initial todo list comes from.
//!
//! [`HttpSeedSource`] reads the JSONPlaceholder-style endpoint. [`StaticSeedSource`]
//! serves a fixed payload (or a fixed failure) and backs tests and offline runs.

use crate::types::RemoteTodo;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use thiserror::Error;
use tokio::sync::Semaphore;

/// Default endpoint of the public demo API
pub const DEFAULT_SEED_URL: &str = "https://jsonplaceholder.typicode.com/todos";

/// Future returned by [`SeedSource::fetch`]
pub type SeedFuture<'a> =
    Pin<Box<dyn Future<Output = Result<Vec<RemoteTodo>, SeedError>> + Send + 'a>>;

/// Errors from reading the seed source
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SeedError {
    /// The request never produced a response
    #[error("network request failed: {0}")]
    Transport(String),

    /// The server answered with a non-success status
    #[error("seed source responded with HTTP {0}")]
    Status(u16),

    /// The body was not a list of todo records
    #[error("could not decode seed response: {0}")]
    Decode(String),
}

/// A provider of seed records
///
/// Returns a boxed future so the source can be shared as `Arc<dyn SeedSource>`
/// and captured by the fetch effect.
pub trait SeedSource: Send + Sync {
    /// Read every record, in source order
    fn fetch(&self) -> SeedFuture<'_>;
}

/// Reads seed records over HTTP
#[derive(Debug, Clone)]
pub struct HttpSeedSource {
    client: reqwest::Client,
    url: String,
}

impl HttpSeedSource {
    /// Creates a source for `url` with a fresh client
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), url)
    }

    /// Creates a source sharing an existing client
    #[must_use]
    pub fn with_client(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }

    /// The endpoint this source reads
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    async fn fetch_records(&self) -> Result<Vec<RemoteTodo>, SeedError> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| SeedError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SeedError::Status(status.as_u16()));
        }

        response
            .json::<Vec<RemoteTodo>>()
            .await
            .map_err(|e| SeedError::Decode(e.to_string()))
    }
}

impl Default for HttpSeedSource {
    fn default() -> Self {
        Self::new(DEFAULT_SEED_URL)
    }
}

impl SeedSource for HttpSeedSource {
    fn fetch(&self) -> SeedFuture<'_> {
        Box::pin(async move {
            tracing::debug!(url = %self.url, "Requesting seed records");
            let result = self.fetch_records().await;
            match &result {
                Ok(records) => {
                    metrics::counter!("todo.seed.fetch.total", "outcome" => "success")
                        .increment(1);
                    tracing::debug!(count = records.len(), "Seed records received");
                },
                Err(error) => {
                    metrics::counter!("todo.seed.fetch.total", "outcome" => "failure")
                        .increment(1);
                    tracing::debug!(%error, "Seed request failed");
                },
            }
            result
        })
    }
}

/// Holds back a gated [`StaticSeedSource`] until released
#[derive(Debug, Clone)]
pub struct SeedGate(Arc<Semaphore>);

impl SeedGate {
    /// Let `fetches` pending or future fetches complete
    pub fn release(&self, fetches: usize) {
        self.0.add_permits(fetches);
    }
}

/// Serves a fixed outcome from memory
#[derive(Debug, Clone)]
pub struct StaticSeedSource {
    outcome: Result<Vec<RemoteTodo>, SeedError>,
    gate: Option<Arc<Semaphore>>,
    calls: Arc<AtomicUsize>,
}

impl StaticSeedSource {
    /// A source that always returns `records`
    #[must_use]
    pub fn new(records: Vec<RemoteTodo>) -> Self {
        Self {
            outcome: Ok(records),
            gate: None,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// A source that always fails with `error`
    #[must_use]
    pub fn failing(error: SeedError) -> Self {
        Self {
            outcome: Err(error),
            gate: None,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// A source serving records parsed from a JSON array
    ///
    /// # Errors
    ///
    /// Returns [`SeedError::Decode`] if `json` is not a list of records.
    pub fn from_json(json: &str) -> Result<Self, SeedError> {
        serde_json::from_str(json)
            .map(Self::new)
            .map_err(|e| SeedError::Decode(e.to_string()))
    }

    /// Make every fetch wait until the returned gate releases it
    #[must_use]
    pub fn gated(mut self) -> (Self, SeedGate) {
        let semaphore = Arc::new(Semaphore::new(0));
        self.gate = Some(Arc::clone(&semaphore));
        (self, SeedGate(semaphore))
    }

    /// Number of fetches started so far
    #[must_use]
    pub fn fetch_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl SeedSource for StaticSeedSource {
    fn fetch(&self) -> SeedFuture<'_> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Box::pin(async move {
            if let Some(gate) = &self.gate {
                gate.acquire()
                    .await
                    .map_err(|_| SeedError::Transport("seed gate closed".to_string()))?
                    .forget();
            }
            self.outcome.clone()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TodoId;

    fn record(id: u64, title: &str, completed: bool) -> RemoteTodo {
        RemoteTodo {
            id: TodoId::from(id.to_string()),
            title: title.to_string(),
            completed,
        }
    }

    #[test]
    fn static_source_returns_payload() {
        let source = StaticSeedSource::new(vec![record(1, "X", false)]);
        let records = tokio_test::block_on(source.fetch()).unwrap();
        assert_eq!(records, vec![record(1, "X", false)]);
        assert_eq!(source.fetch_count(), 1);
    }

    #[test]
    fn static_source_returns_failure() {
        let source = StaticSeedSource::failing(SeedError::Status(503));
        let error = tokio_test::block_on(source.fetch()).unwrap_err();
        assert_eq!(error.to_string(), "seed source responded with HTTP 503");
    }

    #[test]
    fn from_json_rejects_non_lists() {
        let error = StaticSeedSource::from_json(r#"{"id": 1}"#).unwrap_err();
        assert!(matches!(error, SeedError::Decode(_)));
    }

    #[test]
    fn bundled_fixture_parses() {
        let source = StaticSeedSource::from_json(include_str!("../fixtures/seed.json")).unwrap();
        let records = tokio_test::block_on(source.fetch()).unwrap();
        assert!(!records.is_empty());
    }

    #[tokio::test]
    async fn gated_source_waits_for_release() {
        let (source, gate) = StaticSeedSource::new(vec![record(1, "X", false)]).gated();

        let pending = tokio::spawn({
            let source = source.clone();
            async move { source.fetch().await }
        });

        tokio::task::yield_now().await;
        assert!(!pending.is_finished());

        gate.release(1);
        let records = pending.await.unwrap().unwrap();
        assert_eq!(records.len(), 1);
    }

    #[tokio::test]
    async fn http_source_reports_transport_errors() {
        // Port 9 (discard) is closed on loopback in test environments.
        let source = HttpSeedSource::new("http://127.0.0.1:9/todos");
        let error = source.fetch().await.unwrap_err();
        assert!(matches!(error, SeedError::Transport(_)));
    }
}
