use clap::Parser;
use std::path::PathBuf;

pub const DEFAULT_ORG: &str = "nbnHackathon25";
/// Upper bound for `--since-days`, roughly a century
pub const MAX_SINCE_DAYS: i64 = 36500;

#[derive(Parser, Debug)]
#[command(name = "github-metrics-dashboard")]
#[command(about = "GitHub Metrics Dashboard - Charts commits per user per repository of an organization")]
#[command(version = "0.1.0")]
pub struct Cli {
    /// GitHub access token
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub token: String,

    /// Organization to report on
    #[arg(long, env = "GITHUB_ORG", default_value = DEFAULT_ORG)]
    pub org: String,

    /// GitHub API root
    #[arg(long, env = "GITHUB_API_URL", default_value = "https://api.github.com")]
    pub api_url: String,

    /// Chart output file (.svg or .png)
    #[arg(short, long, default_value = "commits_per_user.svg")]
    pub output: PathBuf,

    /// Chart caption
    #[arg(long, default_value = "Commits per User per Repo")]
    pub title: String,

    /// Chart width in pixels
    #[arg(long, default_value_t = 1280)]
    pub width: u32,

    /// Chart height in pixels
    #[arg(long, default_value_t = 720)]
    pub height: u32,

    /// Only count commits from the last N days
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..=MAX_SINCE_DAYS))]
    pub since_days: Option<u32>,

    /// Print the collected records as JSON instead of a summary table
    #[arg(long)]
    pub json: bool,
}
