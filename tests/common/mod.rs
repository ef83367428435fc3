#![allow(dead_code)]

use github_metrics_dashboard::chart::Renderer;
use github_metrics_dashboard::error::Result;
use github_metrics_dashboard::github::GitHubClient;
use github_metrics_dashboard::models::MetricRecord;
use serde_json::{json, Value};
use std::sync::Mutex;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const ORG: &str = "acme";

pub fn client_for(server: &MockServer) -> GitHubClient {
    GitHubClient::with_base_url("test_token".to_string(), &server.uri())
        .expect("Failed to create client")
}

pub fn repo_json(org: &str, name: &str) -> Value {
    json!({
        "name": name,
        "full_name": format!("{}/{}", org, name),
        "owner": { "login": org },
        "html_url": format!("https://github.com/{}/{}", org, name),
        "fork": false,
        "archived": false
    })
}

pub fn contributor_json(login: &str, contributions: u64) -> Value {
    json!({
        "login": login,
        "id": login.len() as u64,
        "contributions": contributions,
        "html_url": format!("https://github.com/{}", login)
    })
}

pub async fn mount_org(server: &MockServer, org: &str) {
    Mock::given(method("GET"))
        .and(path(format!("/orgs/{}", org)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "login": org,
            "id": 1,
            "name": "Acme Corp",
            "public_repos": 2
        })))
        .mount(server)
        .await;
}

pub async fn mount_repos(server: &MockServer, org: &str, names: &[&str]) {
    let repos: Vec<Value> = names.iter().map(|name| repo_json(org, name)).collect();
    Mock::given(method("GET"))
        .and(path(format!("/orgs/{}/repos", org)))
        .respond_with(ResponseTemplate::new(200).set_body_json(repos))
        .mount(server)
        .await;
}

pub async fn mount_contributors(server: &MockServer, org: &str, repo: &str, contributors: &[(&str, u64)]) {
    let body: Vec<Value> = contributors
        .iter()
        .map(|(login, contributions)| contributor_json(login, *contributions))
        .collect();
    Mock::given(method("GET"))
        .and(path(format!("/repos/{}/{}/contributors", org, repo)))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

/// Commit listing for one author, shaped like GitHub's `per_page=1` answer.
pub fn commit_count_response(server: &MockServer, org: &str, repo: &str, author: &str, count: u64) -> ResponseTemplate {
    match count {
        0 => ResponseTemplate::new(200).set_body_json(json!([])),
        1 => ResponseTemplate::new(200).set_body_json(json!([{ "sha": "c0ffee" }])),
        _ => {
            let base = format!("{}/repos/{}/{}/commits?author={}&per_page=1", server.uri(), org, repo, author);
            let link = format!(
                "<{base}&page=2>; rel=\"next\", <{base}&page={count}>; rel=\"last\""
            );
            ResponseTemplate::new(200)
                .insert_header("Link", link.as_str())
                .set_body_json(json!([{ "sha": "c0ffee" }]))
        }
    }
}

pub async fn mount_commit_count(server: &MockServer, org: &str, repo: &str, author: &str, count: u64) {
    Mock::given(method("GET"))
        .and(path(format!("/repos/{}/{}/commits", org, repo)))
        .and(query_param("author", author))
        .respond_with(commit_count_response(server, org, repo, author, count))
        .mount(server)
        .await;
}

/// Org `acme` with R1 (alice 3/2, bob 1/1) and R2 (alice 5/5).
pub async fn mount_two_repo_org(server: &MockServer) {
    mount_org(server, ORG).await;
    mount_repos(server, ORG, &["R1", "R2"]).await;
    mount_contributors(server, ORG, "R1", &[("alice", 3), ("bob", 1)]).await;
    mount_contributors(server, ORG, "R2", &[("alice", 5)]).await;
    mount_commit_count(server, ORG, "R1", "alice", 2).await;
    mount_commit_count(server, ORG, "R1", "bob", 1).await;
    mount_commit_count(server, ORG, "R2", "alice", 5).await;
}

pub fn record(repo: &str, user: &str, contributions: u64, commits: u64) -> MetricRecord {
    MetricRecord {
        repo: repo.to_string(),
        user: user.to_string(),
        contributions,
        commits,
    }
}

/// Renderer that keeps every table it was handed
#[derive(Default)]
pub struct RecordingRenderer {
    pub calls: Mutex<Vec<Vec<MetricRecord>>>,
}

impl RecordingRenderer {
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

impl Renderer for RecordingRenderer {
    fn render(&self, records: &[MetricRecord]) -> Result<()> {
        self.calls.lock().unwrap().push(records.to_vec());
        Ok(())
    }
}
