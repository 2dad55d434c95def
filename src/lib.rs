//! # github-cloner
//!
//! `github-cloner` is a library for mirroring the repositories of GitHub
//! users and organizations to local disk. It powers the `ghcloner` CLI tool.
//!
//! ## Core Features
//!
//! - **Discovery**: Paginated REST API enumeration of user, organization,
//!   member, and gist repositories.
//! - **Concurrent Sync**: A bounded worker pool clones or pulls hundreds of
//!   repositories without overwhelming the network or the disk.
//! - **Idempotent Re-runs**: Repositories that already exist on disk are
//!   updated with a pull instead of being re-cloned.
//!
//! ## Example
//!
//! ```rust,no_run
//! use github_cloner::bulk::{sync_all, BulkSyncOptions};
//! use github_cloner::naming::NamingPolicy;
//! use github_cloner::sync::DiagnosticSink;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() {
//!     let urls = vec!["https://github.com/octocat/Hello-World.git".to_string()];
//!     let options = BulkSyncOptions {
//!         destination_root: "repositories".into(),
//!         credentials: None,
//!         policy: NamingPolicy::Underscore,
//!         concurrency: 5,
//!     };
//!     let sink = Arc::new(DiagnosticSink::stdout());
//!     let (_shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
//!     let stats = sync_all(urls, options, sink, shutdown_rx).await;
//!     println!("{} synced", stats.synced_repos);
//! }
//! ```

pub mod bulk;
pub mod config;
pub mod github;
pub mod naming;
pub mod sync;
