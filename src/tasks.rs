//! Background fetches that report back over a channel.
//!
//! The host's event loop must stay responsive while a sync is in flight, so
//! a fetch is spawned onto the tokio runtime and its single result is sent
//! back as a [`SyncMessage`]:
//!
//! 1. The host calls [`TaskSpawner::spawn_fetch_issue_count`] and keeps the
//!    returned request id.
//! 2. The spawned task runs one fetch against a snapshot of the credentials.
//! 3. The result arrives on the receiver created by [`channel`].
//!
//! Overlapping fetches are independent: nothing de-duplicates or cancels
//! them. A consumer that only wants the newest result drops messages whose
//! id is older than the last one it requested.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{debug, error};

use crate::api::{ApiError, IssueSearchResult, JiraClient, DEFAULT_TIMEOUT};
use crate::config::Credentials;

/// Messages sent from background tasks to the host's event loop.
#[derive(Debug)]
pub enum SyncMessage {
    /// An assigned-issue count fetch finished.
    IssueCountFetched {
        /// Id returned by the spawn call that produced this result.
        request_id: u64,
        result: IssueSearchResult,
    },
}

/// Create a connected spawner and receiver.
pub fn channel() -> (TaskSpawner, mpsc::UnboundedReceiver<SyncMessage>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (TaskSpawner::new(tx), rx)
}

/// Spawns background tasks for async operations.
#[derive(Clone)]
pub struct TaskSpawner {
    tx: mpsc::UnboundedSender<SyncMessage>,
    next_id: Arc<AtomicU64>,
    timeout: Duration,
}

impl TaskSpawner {
    /// Create a new TaskSpawner with the given channel sender.
    pub fn new(tx: mpsc::UnboundedSender<SyncMessage>) -> Self {
        Self {
            tx,
            next_id: Arc::new(AtomicU64::new(1)),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Use `timeout` for every request spawned from now on.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Spawn a task that counts the issues assigned to `creds`' user.
    ///
    /// Must be called from within a tokio runtime. Returns the request id
    /// carried by the resulting message.
    pub fn spawn_fetch_issue_count(&self, creds: Credentials) -> u64 {
        let timeout = self.timeout;
        self.spawn_reporting(async move {
            JiraClient::fetch_assigned_issue_count_with_timeout(&creds, timeout).await
        })
    }

    /// Run `fetch` in its own task and send exactly one message for it.
    ///
    /// A panicking fetch is reported as [`ApiError::Interrupted`].
    pub(crate) fn spawn_reporting<F>(&self, fetch: F) -> u64
    where
        F: Future<Output = IssueSearchResult> + Send + 'static,
    {
        let request_id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let tx = self.tx.clone();
        debug!(request_id, "Spawning issue count fetch");

        tokio::spawn(async move {
            let result = match tokio::spawn(fetch).await {
                Ok(result) => result,
                Err(e) => {
                    error!(request_id, "Issue count fetch did not finish: {}", e);
                    IssueSearchResult::Failure(ApiError::Interrupted(e.to_string()))
                }
            };
            let _ = tx.send(SyncMessage::IssueCountFetched { request_id, result });
        });

        request_id
    }
}
