//! Bulk sync coordinator
//!
//! Owns the bounded worker pool: a batch of repository URLs is enqueued up
//! front, at most `concurrency` workers are live at any moment, and the
//! caller's future resolves only once every job has reported an outcome (or
//! an interrupt stopped admission).

use futures::stream::{FuturesUnordered, StreamExt};
use std::future::Future;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::{watch, Semaphore};

use crate::config::Credentials;
use crate::naming::NamingPolicy;
use crate::sync::{sync_repository, DiagnosticSink, SyncOutcome};

/// Options shared by every job in a bulk sync batch
#[derive(Clone, Debug)]
pub struct BulkSyncOptions {
    pub destination_root: PathBuf,
    pub credentials: Option<Credentials>,
    pub policy: NamingPolicy,
    pub concurrency: usize,
}

/// Statistics for tracking bulk synchronization results
#[derive(Clone, Default)]
pub struct SyncStatistics {
    pub synced_repos: u32,
    pub cloned_repos: u32,
    pub pulled_repos: u32,
    pub error_repos: u32,
    pub skipped_repos: u32,
    pub failed_repos: Vec<(String, String)>, // (url, error_message)
}

impl SyncStatistics {
    /// Creates a new statistics tracker with all counters initialized to zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Updates statistics based on one job's outcome
    pub fn update(&mut self, url: &str, outcome: &SyncOutcome) {
        match outcome {
            SyncOutcome::Cloned => {
                self.synced_repos += 1;
                self.cloned_repos += 1;
            }
            SyncOutcome::Pulled => {
                self.synced_repos += 1;
                self.pulled_repos += 1;
            }
            SyncOutcome::FailedToCreateDestination(reason)
            | SyncOutcome::FailedToSync(reason) => {
                self.error_repos += 1;
                self.failed_repos.push((url.to_string(), reason.clone()));
            }
        }
    }

    /// Records a job that was never dispatched because of an interrupt
    pub fn record_skipped(&mut self) {
        self.skipped_repos += 1;
    }

    /// Generates a one-line summary of the batch results
    pub fn generate_summary(&self, duration: Duration) -> String {
        let duration_secs = duration.as_secs_f64();

        let mut summary = format!(
            "✅ Completed in {:.1}s • {} cloned • {} pulled",
            duration_secs, self.cloned_repos, self.pulled_repos
        );
        if self.error_repos > 0 {
            summary.push_str(&format!(" • {} failed", self.error_repos));
        }
        if self.skipped_repos > 0 {
            summary.push_str(&format!(" • {} skipped", self.skipped_repos));
        }

        summary
    }

    /// Generates a detailed listing of failed repositories
    pub fn generate_detailed_summary(&self) -> String {
        if self.failed_repos.is_empty() {
            return String::new();
        }

        let mut lines = vec![format!("🔴 FAILED REPOS ({})", self.failed_repos.len())];
        for (i, (url, error)) in self.failed_repos.iter().enumerate() {
            let tree_char = if i == self.failed_repos.len() - 1 {
                "└─"
            } else {
                "├─"
            };
            lines.push(format!("   {} {} # {}", tree_char, url, error));
        }

        lines.join("\n")
    }
}

/// Helper function to safely acquire a mutex lock with error handling
/// Returns the lock guard or panics with a descriptive message
pub fn acquire_stats_lock(stats: &Mutex<SyncStatistics>) -> MutexGuard<'_, SyncStatistics> {
    stats
        .lock()
        .expect("Failed to acquire lock on statistics mutex - mutex may be poisoned")
}

/// Resolves when the shutdown channel reports an interrupt
///
/// A dropped sender means shutdown can never arrive; pend forever so the
/// select loop keeps draining jobs instead of spinning.
async fn wait_for_shutdown(mut shutdown: watch::Receiver<bool>) {
    loop {
        if *shutdown.borrow() {
            return;
        }
        if shutdown.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

/// Drives a batch of jobs through the bounded worker pool
///
/// Generic over the per-URL operation so the pool discipline can be tested
/// against an instrumented fake. One fresh future per URL, all created up
/// front; each acquires a semaphore permit (capping live workers at
/// `concurrency`), re-checks the shutdown flag, runs the job, and records
/// its outcome. Completion order between jobs is unspecified.
pub async fn sync_all_with<F, Fut>(
    urls: Vec<String>,
    concurrency: usize,
    shutdown: watch::Receiver<bool>,
    job: F,
) -> SyncStatistics
where
    F: Fn(String) -> Fut,
    Fut: Future<Output = SyncOutcome>,
{
    let semaphore = Arc::new(Semaphore::new(concurrency.max(1)));
    let statistics = Arc::new(Mutex::new(SyncStatistics::new()));

    let job = &job;
    let mut pending = FuturesUnordered::new();
    for url in urls {
        let semaphore = Arc::clone(&semaphore);
        let statistics = Arc::clone(&statistics);
        let shutdown = shutdown.clone();
        pending.push(async move {
            let _permit = semaphore
                .acquire()
                .await
                .expect("Failed to acquire semaphore permit for concurrent sync operations");

            // An interrupt stops admission; jobs still waiting on a permit
            // are never dispatched.
            if *shutdown.borrow() {
                acquire_stats_lock(&statistics).record_skipped();
                return;
            }

            let outcome = job(url.clone()).await;
            acquire_stats_lock(&statistics).update(&url, &outcome);
        });
    }

    let shutdown_fired = wait_for_shutdown(shutdown);
    tokio::pin!(shutdown_fired);

    loop {
        tokio::select! {
            _ = &mut shutdown_fired => break,
            next = pending.next() => {
                if next.is_none() {
                    break;
                }
            }
        }
    }

    // Dropping undrained futures cancels jobs still waiting on a permit;
    // already-spawned git processes finish detached.
    drop(pending);

    let stats = acquire_stats_lock(&statistics).clone();
    stats
}

/// Synchronizes a whole batch of repository URLs, blocking until done
///
/// The URLs are expected to be deduplicated by the caller: duplicates would
/// produce two jobs racing for the same destination path.
pub async fn sync_all(
    urls: Vec<String>,
    options: BulkSyncOptions,
    sink: Arc<DiagnosticSink>,
    shutdown: watch::Receiver<bool>,
) -> SyncStatistics {
    let BulkSyncOptions {
        destination_root,
        credentials,
        policy,
        concurrency,
    } = options;

    sync_all_with(urls, concurrency, shutdown, move |url| {
        let destination_root = destination_root.clone();
        let credentials = credentials.clone();
        let sink = Arc::clone(&sink);
        async move {
            sync_repository(&url, &destination_root, credentials.as_ref(), policy, &sink).await
        }
    })
    .await
}
