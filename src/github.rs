//! GitHub REST API discovery client
//!
//! Enumerates repository and gist URLs for users and organizations through
//! the paginated REST API. Each listing is a plain GET + pagination + JSON
//! decode loop; the interesting failure modes are the API's error envelope
//! (a JSON object carrying `message` where an array was expected), which
//! covers missing entities, bad credentials, and exceeded rate limits.

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::BTreeSet;
use std::time::Duration;

use crate::config::{Credentials, RunConfig};

const API_BASE: &str = "https://api.github.com";
const USER_AGENT: &str = "github-cloner";
const PER_PAGE: usize = 100;
const HTTP_TIMEOUT_SECS: u64 = 30;

#[derive(Deserialize, Debug)]
struct RepoEntry {
    git_url: String,
}

#[derive(Deserialize, Debug)]
struct GistEntry {
    git_pull_url: String,
}

#[derive(Deserialize, Debug)]
struct MemberEntry {
    login: String,
}

/// Error envelope returned by the API in place of a result array
#[derive(Deserialize, Debug)]
struct ApiMessage {
    message: String,
}

/// Client for the GitHub REST API
pub struct GithubClient {
    http: reqwest::Client,
    credentials: Option<Credentials>,
}

impl GithubClient {
    /// Creates a client, optionally authenticating every request
    pub fn new(credentials: Option<Credentials>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(GithubClient { http, credentials })
    }

    fn get(&self, url: &str) -> reqwest::RequestBuilder {
        let mut request = self.http.get(url);
        if let Some(creds) = &self.credentials {
            request = request.basic_auth(&creds.username, Some(&creds.token));
        }
        request
    }

    /// Fetches every page of a listing endpoint
    ///
    /// Pages are requested until a short page signals the end. A JSON object
    /// with a `message` field in place of the expected array is the API's
    /// error envelope: "Not Found" means the entity does not exist and yields
    /// an empty list, a rate-limit message is reported as such, anything else
    /// is surfaced verbatim.
    async fn paginated<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>> {
        let mut items = Vec::new();
        let mut page = 1usize;

        loop {
            let url = format!(
                "{}{}?per_page={}&page={}",
                API_BASE, path, PER_PAGE, page
            );
            let body = self
                .get(&url)
                .send()
                .await
                .with_context(|| format!("Request to {} failed", url))?
                .text()
                .await
                .with_context(|| format!("Failed to read response from {}", url))?;

            if let Ok(envelope) = serde_json::from_str::<ApiMessage>(&body) {
                let message = envelope.message;
                if message == "Not Found" {
                    return Ok(Vec::new());
                }
                if message.to_lowercase().contains("rate limit") {
                    anyhow::bail!("GitHub API rate limit exceeded");
                }
                anyhow::bail!("GitHub API error: {}", message);
            }

            let page_items: Vec<T> = serde_json::from_str(&body)
                .with_context(|| format!("Unexpected response from {}", url))?;
            let count = page_items.len();
            items.extend(page_items);

            if count < PER_PAGE {
                return Ok(items);
            }
            page += 1;
        }
    }

    /// Lists the repository URLs of a user
    pub async fn user_repos(&self, user: &str) -> Result<Vec<String>> {
        let repos: Vec<RepoEntry> = self.paginated(&format!("/users/{}/repos", user)).await?;
        Ok(repos.into_iter().map(|r| r.git_url).collect())
    }

    /// Lists the gist URLs of a user
    pub async fn user_gists(&self, user: &str) -> Result<Vec<String>> {
        let gists: Vec<GistEntry> = self.paginated(&format!("/users/{}/gists", user)).await?;
        Ok(gists.into_iter().map(|g| g.git_pull_url).collect())
    }

    /// Lists the repository URLs of an organization
    pub async fn org_repos(&self, org: &str) -> Result<Vec<String>> {
        let repos: Vec<RepoEntry> = self.paginated(&format!("/orgs/{}/repos", org)).await?;
        Ok(repos.into_iter().map(|r| r.git_url).collect())
    }

    /// Lists the member logins of an organization
    pub async fn org_members(&self, org: &str) -> Result<Vec<String>> {
        let members: Vec<MemberEntry> =
            self.paginated(&format!("/orgs/{}/members", org)).await?;
        Ok(members.into_iter().map(|m| m.login).collect())
    }

    /// Lists the repository URLs of the authenticated user (requires credentials)
    pub async fn authenticated_repos(&self) -> Result<Vec<String>> {
        let repos: Vec<RepoEntry> = self.paginated("/user/repos").await?;
        Ok(repos.into_iter().map(|r| r.git_url).collect())
    }

    /// Checks whether the configured credentials are accepted by the API
    pub async fn check_credentials(&self) -> Result<bool> {
        let response = self
            .get(&format!("{}/user", API_BASE))
            .send()
            .await
            .context("Credential check request failed")?;
        Ok(response.status().is_success())
    }
}

/// Reports a discovery failure for one source and keeps going
fn report_source_error(kind: &str, name: &str, error: &anyhow::Error) {
    eprintln!("Error: failed to list {} for {}: {}", kind, name, error);
}

/// Aggregates every requested source into one deduplicated URL set
///
/// A failure against one user or organization is reported and does not
/// prevent the remaining sources from being listed; the sync pool receives
/// whatever was discovered.
pub async fn discover_urls(client: &GithubClient, config: &RunConfig) -> BTreeSet<String> {
    let mut urls = BTreeSet::new();

    let mut users: Vec<String> = config.users.clone();

    for org in &config.organizations {
        match client.org_repos(org).await {
            Ok(repos) => urls.extend(repos),
            Err(e) => report_source_error("repositories", org, &e),
        }

        if config.include_org_members {
            match client.org_members(org).await {
                Ok(members) => users.extend(members),
                Err(e) => report_source_error("members", org, &e),
            }
        }
    }

    for user in &users {
        match client.user_repos(user).await {
            Ok(repos) => urls.extend(repos),
            Err(e) => report_source_error("repositories", user, &e),
        }

        if config.include_gists {
            match client.user_gists(user).await {
                Ok(gists) => urls.extend(gists),
                Err(e) => report_source_error("gists", user, &e),
            }
        }
    }

    if config.include_authenticated_repos {
        match client.authenticated_repos().await {
            Ok(repos) => urls.extend(repos),
            Err(e) => eprintln!("Error: failed to list authenticated repositories: {}", e),
        }
    }

    urls
}
