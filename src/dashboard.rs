use crate::chart::Renderer;
use crate::collector::MetricsCollector;
use crate::error::Result;
use crate::models::MetricRecord;
use tracing::info;

/// Collect the table for `org`, then hand it to `renderer`.
///
/// The renderer only runs once collection has succeeded, so a failed run never
/// produces a partial chart.
pub async fn run_dashboard<R: Renderer + ?Sized>(
    collector: &MetricsCollector<'_>,
    org: &str,
    renderer: &R,
) -> Result<Vec<MetricRecord>> {
    let records = collector.collect(org).await?;

    info!(org, records = records.len(), "Rendering chart");
    renderer.render(&records)?;

    Ok(records)
}
