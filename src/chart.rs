use crate::error::{MetricsError, Result};
use crate::models::MetricRecord;
use plotters::coord::Shift;
use plotters::drawing::DrawingAreaErrorKind;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::path::{Path, PathBuf};
use tracing::info;

pub const DEFAULT_TITLE: &str = "Commits per User per Repo";
pub const DEFAULT_SIZE: (u32, u32) = (1280, 720);

// Share of a user's slot taken by its group of bars
const GROUP_WIDTH: f64 = 0.8;

/// Consumes the collected table. Called once per run, after collection succeeded.
pub trait Renderer {
    fn render(&self, records: &[MetricRecord]) -> Result<()>;
}

/// Commit counts laid out as users × repositories, both in first-appearance order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartGrid {
    pub users: Vec<String>,
    pub repos: Vec<String>,
    /// `commits[user][repo]`; duplicate records are summed.
    pub commits: Vec<Vec<u64>>,
}

impl ChartGrid {
    pub fn from_records(records: &[MetricRecord]) -> Self {
        let mut users: Vec<String> = Vec::new();
        let mut repos: Vec<String> = Vec::new();

        for record in records {
            if !users.contains(&record.user) {
                users.push(record.user.clone());
            }
            if !repos.contains(&record.repo) {
                repos.push(record.repo.clone());
            }
        }

        let mut commits = vec![vec![0u64; repos.len()]; users.len()];
        for record in records {
            let u = users.iter().position(|name| *name == record.user);
            let r = repos.iter().position(|name| *name == record.repo);
            if let (Some(u), Some(r)) = (u, r) {
                commits[u][r] += record.commits;
            }
        }

        Self { users, repos, commits }
    }

    pub fn max_commits(&self) -> u64 {
        self.commits
            .iter()
            .flat_map(|row| row.iter().copied())
            .max()
            .unwrap_or(0)
    }
}

/// Writes a grouped bar chart (x = user, y = commits, color = repository).
/// `.png` paths use the bitmap backend, anything else is written as SVG.
pub struct ChartRenderer {
    path: PathBuf,
    title: String,
    size: (u32, u32),
}

impl ChartRenderer {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            title: DEFAULT_TITLE.to_string(),
            size: DEFAULT_SIZE,
        }
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn size(mut self, width: u32, height: u32) -> Self {
        self.size = (width, height);
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn is_png(&self) -> bool {
        self.path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("png"))
            .unwrap_or(false)
    }
}

impl Renderer for ChartRenderer {
    fn render(&self, records: &[MetricRecord]) -> Result<()> {
        let grid = ChartGrid::from_records(records);

        if self.is_png() {
            let root = BitMapBackend::new(&self.path, self.size).into_drawing_area();
            draw_grouped_bars(&root, &grid, &self.title)?;
            root.present().map_err(chart_error)?;
        } else {
            let root = SVGBackend::new(&self.path, self.size).into_drawing_area();
            draw_grouped_bars(&root, &grid, &self.title)?;
            root.present().map_err(chart_error)?;
        }

        info!(
            path = %self.path.display(),
            users = grid.users.len(),
            repos = grid.repos.len(),
            "Chart written"
        );
        Ok(())
    }
}

fn chart_error<E: std::error::Error + Send + Sync>(err: DrawingAreaErrorKind<E>) -> MetricsError {
    MetricsError::ChartError(err.to_string())
}

/// Draw the chart on any backend. User groups are centered on integer x values
/// so mesh labels line up with them.
pub fn draw_grouped_bars<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    grid: &ChartGrid,
    title: &str,
) -> Result<()> {
    root.fill(&WHITE).map_err(chart_error)?;

    let groups = grid.users.len().max(1);
    let y_max = (grid.max_commits() as f64 * 1.1).max(1.0);

    let mut chart = ChartBuilder::on(root)
        .caption(title, ("sans-serif", 30))
        .margin(10)
        .x_label_area_size(90)
        .y_label_area_size(50)
        .build_cartesian_2d(-0.5f64..(groups as f64 - 0.5), 0f64..y_max)
        .map_err(chart_error)?;

    let users = &grid.users;
    let x_label_formatter = |x: &f64| {
        let idx = x.round();
        if idx < 0.0 || (x - idx).abs() > 1e-6 {
            return String::new();
        }
        users.get(idx as usize).cloned().unwrap_or_default()
    };

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(groups)
        .x_label_formatter(&x_label_formatter)
        .x_label_style(
            ("sans-serif", 15)
                .into_font()
                .color(&BLACK)
                .transform(FontTransform::Rotate90)
                .pos(Pos::new(HPos::Right, VPos::Center)),
        )
        .x_desc("User")
        .y_desc("Commits")
        .draw()
        .map_err(chart_error)?;

    let slot_width = GROUP_WIDTH / grid.repos.len().max(1) as f64;

    for (j, repo) in grid.repos.iter().enumerate() {
        let color = Palette99::pick(j).to_rgba();
        let bars = grid
            .commits
            .iter()
            .enumerate()
            .filter(|(_, row)| row[j] > 0)
            .map(move |(i, row)| {
                let x0 = i as f64 - GROUP_WIDTH / 2.0 + j as f64 * slot_width;
                Rectangle::new([(x0, 0.0), (x0 + slot_width, row[j] as f64)], color.filled())
            });

        chart
            .draw_series(bars)
            .map_err(chart_error)?
            .label(repo.as_str())
            .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], color.filled()));
    }

    if !grid.repos.is_empty() {
        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperRight)
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()
            .map_err(chart_error)?;
    }

    Ok(())
}
