//! Integration tests for the per-repository sync worker
//!
//! These use real git against local source repositories: a directory path
//! whose last two segments are `owner/name` doubles as a repository URL, so
//! path derivation behaves exactly as it does for remote URLs.

mod common;
use common::{create_source_repo, is_git_available, CaptureWriter};

use github_cloner::naming::NamingPolicy;
use github_cloner::sync::{sync_repository, DiagnosticSink, SyncOutcome};

#[tokio::test]
async fn first_sync_clones_second_sync_pulls() {
    if !is_git_available() {
        eprintln!("Git not available, skipping test");
        return;
    }

    let sources = tempfile::tempdir().expect("Failed to create source dir");
    let dest = tempfile::tempdir().expect("Failed to create dest dir");
    let source = create_source_repo(sources.path(), "octocat", "hello")
        .expect("Failed to create source repo");
    let url = source.to_string_lossy().to_string();
    let sink = DiagnosticSink::from_writer(Box::new(std::io::sink()));

    let first =
        sync_repository(&url, dest.path(), None, NamingPolicy::Underscore, &sink).await;
    assert_eq!(first, SyncOutcome::Cloned);
    assert!(dest.path().join("octocat_hello").join("README.md").exists());

    let second =
        sync_repository(&url, dest.path(), None, NamingPolicy::Underscore, &sink).await;
    assert_eq!(second, SyncOutcome::Pulled);
}

#[tokio::test]
async fn directory_policy_nests_under_owner() {
    if !is_git_available() {
        eprintln!("Git not available, skipping test");
        return;
    }

    let sources = tempfile::tempdir().expect("Failed to create source dir");
    let dest = tempfile::tempdir().expect("Failed to create dest dir");
    let source = create_source_repo(sources.path(), "octocat", "hello")
        .expect("Failed to create source repo");
    let url = source.to_string_lossy().to_string();
    let sink = DiagnosticSink::from_writer(Box::new(std::io::sink()));

    let outcome =
        sync_repository(&url, dest.path(), None, NamingPolicy::Directory, &sink).await;
    assert_eq!(outcome, SyncOutcome::Cloned);
    assert!(dest.path().join("octocat").join("hello").is_dir());
}

#[tokio::test]
async fn worker_emits_resolved_path_through_sink() {
    if !is_git_available() {
        eprintln!("Git not available, skipping test");
        return;
    }

    let sources = tempfile::tempdir().expect("Failed to create source dir");
    let dest = tempfile::tempdir().expect("Failed to create dest dir");
    let source = create_source_repo(sources.path(), "octocat", "hello")
        .expect("Failed to create source repo");
    let url = source.to_string_lossy().to_string();

    let capture = CaptureWriter::default();
    let sink = DiagnosticSink::from_writer(Box::new(capture.clone()));

    sync_repository(&url, dest.path(), None, NamingPolicy::None, &sink).await;

    let expected = dest.path().join("hello").display().to_string();
    assert_eq!(capture.contents(), format!("{}\n", expected));
}

#[tokio::test]
async fn unreachable_url_fails_without_panicking() {
    if !is_git_available() {
        eprintln!("Git not available, skipping test");
        return;
    }

    let dest = tempfile::tempdir().expect("Failed to create dest dir");
    let sink = DiagnosticSink::from_writer(Box::new(std::io::sink()));

    let outcome = sync_repository(
        "/nonexistent/owner/repo",
        dest.path(),
        None,
        NamingPolicy::Underscore,
        &sink,
    )
    .await;

    match outcome {
        SyncOutcome::FailedToSync(reason) => assert!(!reason.is_empty()),
        other => panic!("Expected FailedToSync, got {:?}", other),
    }
}
