//! Per-repository sync worker and git subprocess plumbing
//!
//! A worker owns exactly one clone-or-pull attempt. Every failure is caught
//! at this boundary and converted into a [`SyncOutcome`]; nothing propagates
//! to the coordinator and nothing aborts sibling jobs.

use anyhow::Result;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;
use tokio::process::Command;

use crate::config::Credentials;
use crate::naming::{derive_path, normalize_url, split_owner_repo, NamingPolicy};

const GIT_PULL_ARGS: &[&str] = &["pull"];

/// Outcome of a single repository sync attempt
///
/// `Cloned` and `Pulled` are both successes; the split records which branch
/// the worker took so repeated runs can be verified as idempotent.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SyncOutcome {
    /// First-time clone into a fresh local directory
    Cloned,
    /// Existing working copy updated with a pull
    Pulled,
    /// The destination directory could not be created and the sync failed
    FailedToCreateDestination(String),
    /// The clone or pull operation itself failed
    FailedToSync(String),
}

impl SyncOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, SyncOutcome::Cloned | SyncOutcome::Pulled)
    }

    /// Returns the emoji symbol for this outcome
    pub fn symbol(&self) -> &str {
        match self {
            SyncOutcome::Cloned | SyncOutcome::Pulled => "🟢",
            SyncOutcome::FailedToCreateDestination(_) | SyncOutcome::FailedToSync(_) => "🔴",
        }
    }

    /// Returns the text representation of this outcome
    pub fn text(&self) -> &str {
        match self {
            SyncOutcome::Cloned => "cloned",
            SyncOutcome::Pulled => "pulled",
            SyncOutcome::FailedToCreateDestination(_) => "no destination",
            SyncOutcome::FailedToSync(_) => "failed",
        }
    }
}

/// Shared, mutex-guarded sink for per-repository diagnostic output
///
/// Workers emit each resolved destination path through this sink before the
/// network operation starts, so concurrent emissions never interleave
/// mid-line.
pub struct DiagnosticSink {
    out: Mutex<Box<dyn Write + Send>>,
}

impl DiagnosticSink {
    /// Creates a sink writing to standard output
    pub fn stdout() -> Self {
        Self::from_writer(Box::new(std::io::stdout()))
    }

    /// Creates a sink writing to an arbitrary writer (used by tests)
    pub fn from_writer(writer: Box<dyn Write + Send>) -> Self {
        DiagnosticSink {
            out: Mutex::new(writer),
        }
    }

    /// Writes one full line atomically
    pub fn emit_line(&self, line: &str) {
        let mut out = self
            .out
            .lock()
            .expect("Failed to acquire lock on diagnostic sink - mutex may be poisoned");
        // Best effort: a closed pipe must not take down the worker
        let _ = writeln!(out, "{}", line);
        let _ = out.flush();
    }
}

/// Runs a git command in the specified directory
/// Returns (success, stdout, stderr)
///
/// There is deliberately no timeout here: a slow clone of a large repository
/// is indistinguishable from a hung one, and killing it would discard
/// already-transferred objects. A wedged operation occupies one worker slot
/// until its process exits.
pub async fn run_git(path: &Path, args: &[&str]) -> Result<(bool, String, String)> {
    let output = Command::new("git")
        .args(args)
        .current_dir(path)
        .output()
        .await?;

    Ok((
        output.status.success(),
        String::from_utf8_lossy(&output.stdout).trim().to_string(),
        String::from_utf8_lossy(&output.stderr).trim().to_string(),
    ))
}

/// Cleans and condenses git error output for single-line display
pub fn clean_error_message(error: &str) -> String {
    let cleaned = error.replace(['\n', '\t'], " ").replace('\r', "");
    let cleaned = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");

    if cleaned.contains("Authentication failed") || cleaned.contains("Permission denied") {
        "authentication failed".to_string()
    } else if cleaned.contains("conflict") || cleaned.contains("diverged") {
        "merge conflict".to_string()
    } else if cleaned.contains("Could not resolve host") || cleaned.contains("Connection") {
        "network error".to_string()
    } else if cleaned.chars().count() > 120 {
        let truncated = cleaned.chars().take(117).collect::<String>();
        format!("{}...", truncated)
    } else {
        cleaned
    }
}

/// Clones the repository URL into the given local path
///
/// Runs from the process working directory: the target path is resolved
/// relative to it, the same way the caller supplied the destination root.
async fn clone_repo(url: &str, path: &Path) -> Result<()> {
    let path_str = path.to_string_lossy();
    let (success, _, stderr) = run_git(Path::new("."), &["clone", url, &path_str]).await?;
    if !success {
        anyhow::bail!("{}", clean_error_message(&stderr));
    }
    Ok(())
}

/// Pulls new changes into an existing working copy
async fn pull_repo(path: &Path) -> Result<()> {
    let (success, _, stderr) = run_git(path, GIT_PULL_ARGS).await?;
    if !success {
        anyhow::bail!("{}", clean_error_message(&stderr));
    }
    Ok(())
}

/// Synchronizes a single repository URL into the destination root
///
/// Ensures the destination directories exist, derives the local path from the
/// naming policy, emits that path through the sink, and then clones the URL
/// or pulls the existing working copy. Directory-creation failures are logged
/// and non-fatal for the attempt; the subsequent git call fails with a more
/// specific error and the failure is classified accordingly.
pub async fn sync_repository(
    url: &str,
    dest_root: &Path,
    credentials: Option<&Credentials>,
    policy: NamingPolicy,
    sink: &DiagnosticSink,
) -> SyncOutcome {
    let mut create_error: Option<String> = None;

    if let Err(e) = std::fs::create_dir_all(dest_root) {
        eprintln!(
            "Error: failed to create destination directory {}: {}",
            dest_root.display(),
            e
        );
        create_error = Some(e.to_string());
    }

    let fetch_url = normalize_url(url, credentials);
    let (owner, repo) = split_owner_repo(url);
    let relative = derive_path(&owner, &repo, policy);
    let full_path = dest_root.join(&relative);

    // The directory policy nests repositories one level deeper
    if policy == NamingPolicy::Directory {
        if let Some(parent) = full_path.parent() {
            if let Err(e) = std::fs::create_dir_all(parent) {
                eprintln!(
                    "Error: failed to create owner directory {}: {}",
                    parent.display(),
                    e
                );
                create_error = Some(e.to_string());
            }
        }
    }

    sink.emit_line(&full_path.display().to_string());

    let already_exists = full_path.exists();
    let result = if already_exists {
        pull_repo(&full_path).await
    } else {
        clone_repo(&fetch_url, &full_path).await
    };

    match result {
        Ok(()) => {
            if already_exists {
                SyncOutcome::Pulled
            } else {
                SyncOutcome::Cloned
            }
        }
        Err(e) => {
            eprintln!("Error: There was an error in cloning [{}]: {}", url, e);
            match create_error {
                Some(create_reason) => SyncOutcome::FailedToCreateDestination(format!(
                    "{} (after: {})",
                    e, create_reason
                )),
                None => SyncOutcome::FailedToSync(e.to_string()),
            }
        }
    }
}
