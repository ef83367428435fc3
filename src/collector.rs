use crate::error::Result;
use crate::github::GitHubClient;
use crate::models::MetricRecord;
use chrono::{DateTime, Utc};
use tracing::{debug, info};

/// Builds the commits-per-user-per-repo table for one organization.
///
/// Requests are issued one after another: one per repository listing page,
/// one per contributor page, then one commit count per (repository,
/// contributor) pair. The first failing request aborts the whole run.
pub struct MetricsCollector<'a> {
    client: &'a GitHubClient,
    since: Option<DateTime<Utc>>,
}

impl<'a> MetricsCollector<'a> {
    pub fn new(client: &'a GitHubClient) -> Self {
        Self { client, since: None }
    }

    /// Only count commits made after `since`.
    pub fn since(mut self, since: DateTime<Utc>) -> Self {
        self.since = Some(since);
        self
    }

    pub async fn collect(&self, org: &str) -> Result<Vec<MetricRecord>> {
        let organization = self.client.get_organization(org).await?;
        info!(
            org = %organization.login,
            public_repos = ?organization.public_repos,
            "Resolved organization"
        );

        let repos = self.client.list_org_repos(&organization.login).await?;
        info!(org = %organization.login, repos = repos.len(), "Enumerating repositories");

        let mut records = Vec::new();

        for repo in &repos {
            let contributors = self
                .client
                .list_contributors(&repo.owner.login, &repo.name)
                .await?;

            debug!(
                repo = %repo.full_name,
                fork = repo.fork,
                archived = repo.archived,
                contributors = contributors.len(),
                "Fetched contributors"
            );

            for contributor in contributors {
                let commits = self
                    .client
                    .count_commits(&repo.owner.login, &repo.name, &contributor.login, self.since)
                    .await?;

                debug!(repo = %repo.name, user = %contributor.login, commits, "Counted commits");

                records.push(MetricRecord {
                    repo: repo.name.clone(),
                    user: contributor.login,
                    contributions: contributor.contributions,
                    commits,
                });
            }
        }

        info!(records = records.len(), "Collection finished");
        Ok(records)
    }
}
