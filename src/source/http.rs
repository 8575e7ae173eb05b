//! HTTP polling source.
//!
//! Runs one background task per active [`QueryKey`] that fetches through a
//! [`PikaClient`] every refresh interval and forwards results over a
//! channel. Switching keys aborts the old task; results that arrive for a
//! key that is no longer active are dropped.

use std::time::Duration;

use pikawatch_client::PikaClient;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::{fetch, MetricsPayload, MetricsSource, QueryKey, SourceUpdate};

type Fetched = (QueryKey, Result<MetricsPayload, String>);

/// A data source that polls the backend API.
///
/// # Example
///
/// ```no_run
/// use std::time::Duration;
/// use pikawatch::HttpSource;
/// use pikawatch_client::PikaClient;
///
/// # tokio_test::block_on(async {
/// let client = PikaClient::builder().endpoint("http://localhost:8080/api").build().unwrap();
/// let source = HttpSource::new(client, tokio::runtime::Handle::current(), Duration::from_secs(5));
/// # });
/// ```
#[derive(Debug)]
pub struct HttpSource {
    client: PikaClient,
    runtime: Handle,
    refresh: Duration,
    tx: mpsc::Sender<Fetched>,
    rx: mpsc::Receiver<Fetched>,
    active: Option<(QueryKey, JoinHandle<()>)>,
    description: String,
    last_error: Option<String>,
}

impl HttpSource {
    /// Create a source that spawns its pollers on `runtime`.
    pub fn new(client: PikaClient, runtime: Handle, refresh: Duration) -> Self {
        let (tx, rx) = mpsc::channel(16);
        let description = format!("api: {}", client.endpoint());
        Self {
            client,
            runtime,
            refresh,
            tx,
            rx,
            active: None,
            description,
            last_error: None,
        }
    }

    /// The key currently being polled.
    pub fn active_key(&self) -> Option<&QueryKey> {
        self.active.as_ref().map(|(key, _)| key)
    }

    fn spawn_poller(&mut self, key: QueryKey) {
        self.stop();

        let client = self.client.clone();
        let tx = self.tx.clone();
        let refresh = self.refresh;
        let task_key = key.clone();

        let handle = self.runtime.spawn(async move {
            loop {
                // One request in flight per key: the next one starts only
                // after this one has been answered and the interval elapsed.
                let result = fetch(&client, &task_key).await.map_err(|e| e.to_string());
                if tx.send((task_key.clone(), result)).await.is_err() {
                    break;
                }
                tokio::time::sleep(refresh).await;
            }
        });

        debug!(key = %key, "started poller");
        self.active = Some((key, handle));
    }

    fn stop(&mut self) {
        if let Some((key, handle)) = self.active.take() {
            debug!(key = %key, "stopping poller");
            handle.abort();
        }
    }
}

impl Drop for HttpSource {
    fn drop(&mut self) {
        self.stop();
    }
}

impl MetricsSource for HttpSource {
    fn request(&mut self, key: QueryKey) {
        if self.active_key() == Some(&key) {
            return;
        }
        self.last_error = None;
        self.spawn_poller(key);
    }

    fn poll(&mut self) -> Option<SourceUpdate> {
        while let Ok((key, result)) = self.rx.try_recv() {
            if self.active_key() != Some(&key) {
                debug!(key = %key, "discarding stale result");
                continue;
            }
            match result {
                Ok(payload) => {
                    self.last_error = None;
                    return Some(SourceUpdate { key, payload });
                }
                Err(e) => {
                    warn!(key = %key, error = %e, "fetch failed");
                    self.last_error = Some(e);
                }
            }
        }
        None
    }

    fn refresh(&mut self) {
        if let Some(key) = self.active_key().cloned() {
            self.spawn_poller(key);
        }
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }
}
