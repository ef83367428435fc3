use crate::error::Result;
use crate::models::{MetricRecord, MetricsReport};
use colored::*;

/// Plain-text table of the records, one line per record, in collection order.
pub fn format_summary(records: &[MetricRecord]) -> String {
    if records.is_empty() {
        return format!("{}\n", "No contributors found".yellow());
    }

    let repo_width = records.iter().map(|r| r.repo.len()).max().unwrap_or(0).max(10);
    let user_width = records.iter().map(|r| r.user.len()).max().unwrap_or(0).max(4);

    let mut out = String::new();
    let header = format!(
        "{:<repo_width$}  {:<user_width$}  {:>7}  {:>13}",
        "Repository", "User", "Commits", "Contributions"
    );
    out.push_str(&format!("{}\n", header.bold()));
    out.push_str(&format!("{}\n", "-".repeat(header.len()).dimmed()));

    for record in records {
        out.push_str(&format!(
            "{}  {:<user_width$}  {}  {:>13}\n",
            format!("{:<repo_width$}", record.repo).cyan(),
            record.user,
            format!("{:>7}", record.commits).green(),
            record.contributions
        ));
    }

    let mut repos: Vec<&str> = records.iter().map(|r| r.repo.as_str()).collect();
    repos.sort_unstable();
    repos.dedup();
    let total: u64 = records.iter().map(|r| r.commits).sum();

    out.push_str(&format!(
        "\n{} records, {} commits across {} repositories\n",
        records.len(),
        total,
        repos.len()
    ));
    out
}

pub fn print_summary(records: &[MetricRecord]) {
    print!("{}", format_summary(records));
}

pub fn print_json(report: &MetricsReport) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(report)?);
    Ok(())
}
