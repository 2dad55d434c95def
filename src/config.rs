//! Run configuration and validation
//!
//! All configuration checks happen here, before any network or disk work
//! begins: naming policy tags, thread limits, credential format, and the
//! mutual requirements between flags.

use anyhow::Result;
use std::path::PathBuf;

use crate::naming::NamingPolicy;

// Concurrency configuration
//
// Cloning is I/O-bound, but each worker holds a git subprocess, an open
// connection, and a disk write stream, so the ceiling is advisory rather
// than CPU-derived.
pub const DEFAULT_THREADS_LIMIT: usize = 5;
pub const ADVISORY_THREADS_CAP: usize = 10;

/// GitHub credentials in `username:token` form
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub token: String,
}

impl Credentials {
    /// Parses a `username:token` pair as passed on the command line
    pub fn parse(raw: &str) -> Result<Self> {
        match raw.split_once(':') {
            Some((username, token)) if !username.is_empty() && !token.is_empty() => {
                Ok(Credentials {
                    username: username.to_string(),
                    token: token.to_string(),
                })
            }
            _ => Err(anyhow::anyhow!(
                "Invalid token format (expected username:token)"
            )),
        }
    }
}

/// Validated run configuration consumed by discovery and the sync pool
#[derive(Clone, Debug)]
pub struct RunConfig {
    pub users: Vec<String>,
    pub organizations: Vec<String>,
    pub output_path: Option<PathBuf>,
    pub threads_limit: usize,
    pub credentials: Option<Credentials>,
    pub include_org_members: bool,
    pub include_authenticated_repos: bool,
    pub include_gists: bool,
    pub echo_urls: bool,
    pub policy: NamingPolicy,
}

impl RunConfig {
    /// Validates the assembled configuration, failing fast on any problem
    pub fn validate(&self) -> Result<()> {
        if self.users.is_empty()
            && self.organizations.is_empty()
            && !self.include_authenticated_repos
        {
            anyhow::bail!(
                "Nothing to clone: specify --user, --org, or --include-authenticated-repos"
            );
        }

        if self.threads_limit == 0 {
            anyhow::bail!("The threads limit must be a positive integer");
        }

        if self.output_path.is_none() && !self.echo_urls {
            anyhow::bail!("The output path is not specified");
        }

        if self.include_authenticated_repos && self.credentials.is_none() {
            anyhow::bail!("--include-authenticated-repos requires --token username:token");
        }

        Ok(())
    }

    /// Warns when the threads limit exceeds the advisory maximum
    ///
    /// The cap is advisory: more workers tend to trip GitHub's abuse
    /// detection, but the value is honored as given.
    pub fn warn_on_thread_limit(&self) {
        if self.threads_limit > ADVISORY_THREADS_CAP {
            eprintln!(
                "Warning: using more than {} threads may cause errors; consider decreasing -t",
                ADVISORY_THREADS_CAP
            );
        }
    }
}

/// Splits a comma-separated CLI list, tolerating stray spaces
pub fn parse_name_list(raw: &str) -> Vec<String> {
    raw.replace(' ', "")
        .split(',')
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> RunConfig {
        RunConfig {
            users: vec!["octocat".to_string()],
            organizations: Vec::new(),
            output_path: Some(PathBuf::from("out")),
            threads_limit: DEFAULT_THREADS_LIMIT,
            credentials: None,
            include_org_members: false,
            include_authenticated_repos: false,
            include_gists: false,
            echo_urls: false,
            policy: NamingPolicy::Underscore,
        }
    }

    #[test]
    fn credentials_parse_splits_on_first_colon() {
        let creds = Credentials::parse("user:ghp:abc").unwrap();
        assert_eq!(creds.username, "user");
        assert_eq!(creds.token, "ghp:abc");
    }

    #[test]
    fn credentials_parse_rejects_missing_colon() {
        assert!(Credentials::parse("justatoken").is_err());
        assert!(Credentials::parse("user:").is_err());
        assert!(Credentials::parse(":token").is_err());
    }

    #[test]
    fn validate_accepts_minimal_config() {
        assert!(base_config().validate().is_ok());
    }

    #[test]
    fn validate_rejects_empty_sources() {
        let mut config = base_config();
        config.users.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_threads() {
        let mut config = base_config();
        config.threads_limit = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_requires_output_path_unless_echoing() {
        let mut config = base_config();
        config.output_path = None;
        assert!(config.validate().is_err());

        config.echo_urls = true;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validate_requires_token_for_authenticated_repos() {
        let mut config = base_config();
        config.include_authenticated_repos = true;
        assert!(config.validate().is_err());

        config.credentials = Some(Credentials::parse("u:t").unwrap());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn name_list_parsing_strips_spaces_and_empties() {
        assert_eq!(
            parse_name_list("alice, bob ,, carol"),
            vec!["alice", "bob", "carol"]
        );
        assert!(parse_name_list("").is_empty());
    }
}
