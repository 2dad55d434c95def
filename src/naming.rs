//! URL normalization and destination path derivation
//!
//! Everything here is pure string manipulation: rewriting repository URLs
//! into fetch-capable HTTPS form and mapping an (owner, repository) pair to
//! a relative filesystem path according to the configured naming policy.

use std::fmt;
use std::str::FromStr;

use crate::config::Credentials;

const GIT_SCHEME_PREFIX: &str = "git://";
const HTTPS_SCHEME_PREFIX: &str = "https://";
const GIT_DIR_SUFFIX: &str = ".git";

/// Controls how an (owner, repository) pair maps to a relative local path
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NamingPolicy {
    /// Repository name only: `repo`
    None,
    /// Owner and repository joined with an underscore: `owner_repo`
    Underscore,
    /// Per-owner subdirectory: `owner/repo`
    Directory,
}

impl FromStr for NamingPolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(NamingPolicy::None),
            "underscore" => Ok(NamingPolicy::Underscore),
            "directory" => Ok(NamingPolicy::Directory),
            other => Err(anyhow::anyhow!(
                "Invalid prefix mode '{}' (expected none, underscore, or directory)",
                other
            )),
        }
    }
}

impl fmt::Display for NamingPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NamingPolicy::None => "none",
            NamingPolicy::Underscore => "underscore",
            NamingPolicy::Directory => "directory",
        };
        write!(f, "{}", name)
    }
}

/// Rewrites a repository URL into fetch-capable HTTPS form
///
/// A `git://` scheme becomes `https://`; when credentials are supplied they
/// are injected immediately after the scheme as `username:token@`. URLs that
/// already use HTTPS pass through unchanged apart from credential injection.
pub fn normalize_url(url: &str, credentials: Option<&Credentials>) -> String {
    let https_url = match url.strip_prefix(GIT_SCHEME_PREFIX) {
        Some(rest) => format!("{}{}", HTTPS_SCHEME_PREFIX, rest),
        None => url.to_string(),
    };

    if let Some(creds) = credentials {
        if let Some(rest) = https_url.strip_prefix(HTTPS_SCHEME_PREFIX) {
            return format!(
                "{}{}:{}@{}",
                HTTPS_SCHEME_PREFIX, creds.username, creds.token, rest
            );
        }
    }

    https_url
}

/// Extracts the (owner, repository) pair from a repository URL
///
/// The owner and repository name are the last two path segments. Gist URLs
/// have no owner segment before the hash, in which case the host stands in
/// as the owner; `derive_path` strips any credential fragment it may carry.
pub fn split_owner_repo(url: &str) -> (String, String) {
    let trimmed = url.trim_end_matches('/');
    let mut segments = trimmed.rsplit('/');
    let repo = segments.next().unwrap_or_default().to_string();
    let owner = segments.next().unwrap_or_default().to_string();
    (owner, repo)
}

/// Maps an (owner, repository) pair to a relative local path
///
/// A trailing `.git` suffix on the repository name is always stripped, as is
/// any `credentials@` fragment embedded in the owner segment. Policy validity
/// is checked once at configuration time, so this function is total.
pub fn derive_path(owner: &str, repo: &str, policy: NamingPolicy) -> String {
    let repo = repo.strip_suffix(GIT_DIR_SUFFIX).unwrap_or(repo);
    let owner = owner.rsplit('@').next().unwrap_or(owner);

    match policy {
        NamingPolicy::None => repo.to_string(),
        NamingPolicy::Underscore => format!("{}_{}", owner, repo),
        NamingPolicy::Directory => format!("{}/{}", owner, repo),
    }
}
