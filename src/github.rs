use crate::error::{MetricsError, Result};
use crate::models::RateLimitState;
use crate::types::{GitHubCommit, GitHubContributor, GitHubOrganization, GitHubRepo};
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::header::{HeaderMap, LINK};
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

pub const API_BASE_URL: &str = "https://api.github.com";
const PER_PAGE: u32 = 100;
const LOW_RATE_LIMIT: u32 = 10;

pub struct GitHubClient {
    client: Client,
    token: String,
    base_url: String,
}

impl GitHubClient {
    pub fn new(token: String) -> Result<Self> {
        Self::with_base_url(token, API_BASE_URL)
    }

    /// Client against a GitHub-compatible API root, e.g. an Enterprise
    /// instance at `https://ghe.example.com/api/v3`.
    pub fn with_base_url(token: String, base_url: &str) -> Result<Self> {
        Url::parse(base_url)?;

        let client = Client::builder()
            .user_agent("GitHub Metrics Dashboard/0.1.0")
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(GitHubClient {
            client,
            token,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str, params: &[(&str, String)]) -> Result<Url> {
        let raw = format!("{}{}", self.base_url, path);
        let url = if params.is_empty() {
            Url::parse(&raw)?
        } else {
            Url::parse_with_params(&raw, params)?
        };
        Ok(url)
    }

    /// Send a GET request, logging the remaining quota. The status is not checked.
    async fn send(&self, url: &Url) -> Result<Response> {
        debug!(%url, "GET");

        let response = self
            .client
            .get(url.clone())
            .header("Accept", "application/vnd.github+json")
            .header("Authorization", format!("Bearer {}", self.token))
            .header("X-GitHub-Api-Version", "2022-11-28")
            .send()
            .await?;

        if let Some(state) = rate_limit_state(response.headers()) {
            if state.remaining < LOW_RATE_LIMIT {
                warn!(
                    remaining = state.remaining,
                    limit = state.limit,
                    reset = %state.reset_time,
                    "GitHub rate limit is running low"
                );
            }
        }

        Ok(response)
    }

    async fn check_status(&self, response: Response, url: &Url) -> Result<Response> {
        let rate_limit = rate_limit_state(response.headers());

        match response.status() {
            StatusCode::OK | StatusCode::NO_CONTENT => Ok(response),
            StatusCode::UNAUTHORIZED => Err(MetricsError::AuthError(format!(
                "Bad credentials for {}",
                url
            ))),
            StatusCode::NOT_FOUND => Err(MetricsError::NotFound(url.to_string())),
            status @ (StatusCode::FORBIDDEN | StatusCode::TOO_MANY_REQUESTS) => {
                let limited = status == StatusCode::TOO_MANY_REQUESTS
                    || rate_limit.as_ref().map(|s| s.is_limited).unwrap_or(false);

                if limited {
                    let reset = rate_limit
                        .map(|s| s.reset_time.to_rfc3339_opts(SecondsFormat::Secs, true))
                        .unwrap_or_else(|| "unknown".to_string());
                    Err(MetricsError::RateLimitExceeded(format!(
                        "{} (resets at {})",
                        url, reset
                    )))
                } else {
                    let error_text = response.text().await.unwrap_or_default();
                    Err(MetricsError::ApiError(format!("Forbidden: {}", error_text)))
                }
            }
            status => {
                let error_text = response.text().await.unwrap_or_default();
                Err(MetricsError::ApiError(format!(
                    "API request failed with status {}: {}",
                    status, error_text
                )))
            }
        }
    }

    async fn make_request(&self, url: &Url) -> Result<Response> {
        let response = self.send(url).await?;
        self.check_status(response, url).await
    }

    async fn fetch_page<T: DeserializeOwned>(&self, url: &Url) -> Result<Vec<T>> {
        let response = self.make_request(url).await?;
        if response.status() == StatusCode::NO_CONTENT {
            return Ok(Vec::new());
        }
        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// Walk `page=1..` until a page comes back shorter than `per_page`.
    async fn paginate<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>> {
        let mut items = Vec::new();
        let mut page = 1u32;

        loop {
            let url = self.endpoint(
                path,
                &[("per_page", PER_PAGE.to_string()), ("page", page.to_string())],
            )?;
            let batch: Vec<T> = self.fetch_page(&url).await?;
            let has_more = batch.len() == PER_PAGE as usize;
            items.extend(batch);

            if !has_more {
                break;
            }
            page += 1;
        }

        Ok(items)
    }

    pub async fn get_organization(&self, org: &str) -> Result<GitHubOrganization> {
        let url = self.endpoint(&format!("/orgs/{}", org), &[])?;
        let response = self.make_request(&url).await?;
        let org: GitHubOrganization = response.json().await?;
        Ok(org)
    }

    /// All repositories of `org` visible to the token, in API order.
    pub async fn list_org_repos(&self, org: &str) -> Result<Vec<GitHubRepo>> {
        self.paginate(&format!("/orgs/{}/repos", org)).await
    }

    pub async fn list_contributors(&self, owner: &str, repo: &str) -> Result<Vec<GitHubContributor>> {
        self.paginate(&format!("/repos/{}/{}/contributors", owner, repo)).await
    }

    /// Number of commits by `author` in `owner/repo`.
    ///
    /// Requests a single commit per page so the `rel="last"` page number in the
    /// `Link` header is the total. Without a `Link` header everything fit on one
    /// page and the body length is the count.
    pub async fn count_commits(
        &self,
        owner: &str,
        repo: &str,
        author: &str,
        since: Option<DateTime<Utc>>,
    ) -> Result<u64> {
        let mut params = vec![("author", author.to_string()), ("per_page", "1".to_string())];
        if let Some(since) = since {
            params.push(("since", since.to_rfc3339_opts(SecondsFormat::Secs, true)));
        }
        let url = self.endpoint(&format!("/repos/{}/{}/commits", owner, repo), &params)?;

        let response = self.send(&url).await?;
        // Empty repositories answer the commit listing with 409
        if response.status() == StatusCode::CONFLICT {
            return Ok(0);
        }
        let response = self.check_status(response, &url).await?;
        if response.status() == StatusCode::NO_CONTENT {
            return Ok(0);
        }

        let last_page = response
            .headers()
            .get(LINK)
            .and_then(|h| h.to_str().ok())
            .and_then(last_page_from_link);

        let body = response.text().await?;
        let commits: Vec<GitHubCommit> = serde_json::from_str(&body)?;

        Ok(last_page.unwrap_or(commits.len() as u64))
    }
}

/// Rate limit state from `X-RateLimit-*` headers, `None` when the server sent none.
pub fn rate_limit_state(headers: &HeaderMap) -> Option<RateLimitState> {
    let remaining = headers
        .get("X-RateLimit-Remaining")
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.parse::<u32>().ok())?;

    let limit = headers
        .get("X-RateLimit-Limit")
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.parse::<u32>().ok())
        .unwrap_or(5000);

    let reset = headers
        .get("X-RateLimit-Reset")
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.parse::<i64>().ok())
        .and_then(|timestamp| DateTime::from_timestamp(timestamp, 0))
        .unwrap_or_else(|| Utc::now() + chrono::Duration::hours(1));

    Some(RateLimitState {
        remaining,
        limit,
        reset_time: reset,
        is_limited: remaining == 0,
    })
}

/// Page number of the `rel="last"` entry of a `Link` header.
pub fn last_page_from_link(header: &str) -> Option<u64> {
    header.split(',').find_map(|entry| {
        let mut parts = entry.split(';');
        let target = parts
            .next()?
            .trim()
            .trim_start_matches('<')
            .trim_end_matches('>');

        if !parts.any(|p| p.trim() == r#"rel="last""#) {
            return None;
        }

        let url = Url::parse(target).ok()?;
        url.query_pairs()
            .find(|(key, _)| key == "page")
            .and_then(|(_, value)| value.parse().ok())
    })
}
