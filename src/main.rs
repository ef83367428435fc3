use anyhow::Context;
use chrono::Utc;
use clap::Parser;
use colored::*;
use github_metrics_dashboard::chart::ChartRenderer;
use github_metrics_dashboard::cli::Cli;
use github_metrics_dashboard::collector::MetricsCollector;
use github_metrics_dashboard::dashboard::run_dashboard;
use github_metrics_dashboard::github::GitHubClient;
use github_metrics_dashboard::models::MetricsReport;
use github_metrics_dashboard::report;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if it exists
    dotenv::dotenv().ok();

    // Logs go to stderr so --json output stays parseable
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info"))
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if !cli.json {
        println!("{}", "GitHub Metrics Dashboard".bold().green());
        println!("{}\n", "=".repeat(50).dimmed());
        println!("📊 Organization: {}", cli.org.bold());
    }

    let client = GitHubClient::with_base_url(cli.token.clone(), &cli.api_url)
        .context("Failed to create GitHub client")?;

    let mut collector = MetricsCollector::new(&client);
    if let Some(days) = cli.since_days {
        let since = Utc::now()
            .checked_sub_signed(chrono::Duration::days(i64::from(days)))
            .with_context(|| format!("--since-days {} is out of range", days))?;
        collector = collector.since(since);
    }

    let renderer = ChartRenderer::new(cli.output.clone())
        .title(cli.title.as_str())
        .size(cli.width, cli.height);

    let records = run_dashboard(&collector, &cli.org, &renderer)
        .await
        .with_context(|| format!("Failed to build commit chart for organization {}", cli.org))?;

    if cli.json {
        report::print_json(&MetricsReport::new(cli.org.as_str(), records))?;
    } else {
        println!();
        report::print_summary(&records);
        println!("\n✅ Chart written to {}", renderer.path().display().to_string().bold());
    }

    Ok(())
}
