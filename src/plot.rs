//! Horizontal bar charts of percentile scores.
//!
//! [`horiz_bar_plot`] draws one bar per task on a 0-100 "Percentile" axis
//! using the [`plotters`] bitmap backend, so it works headless. The default
//! canvas is 400x800 pixels (a 4x8 inch figure at 100 dpi).
//!
//! ```no_run
//! use rpacs_pack::plot::{horiz_bar_plot, BarChartOptions};
//!
//! let names = ["Word reading", "Spelling", "Rapid naming"];
//! let scores = [34.0, 12.5, 71.0];
//! let options = BarChartOptions::save_to("scores.png");
//! horiz_bar_plot(&names, &scores, &options).unwrap();
//! ```

use std::path::{Path, PathBuf};

use plotters::coord::Shift;
use plotters::prelude::*;
use serde::Deserialize;
use thiserror::Error;

/// Default canvas width in pixels.
pub const DEFAULT_WIDTH: u32 = 400;
/// Default canvas height in pixels.
pub const DEFAULT_HEIGHT: u32 = 800;

const PERCENTILE_MAX: f64 = 100.0;

/// Errors that can occur during plot generation
#[derive(Error, Debug)]
pub enum PlotError {
    #[error("Failed to create drawing area: {0}")]
    DrawingArea(String),

    #[error("Failed to configure chart: {0}")]
    ChartConfig(String),

    #[error("Failed to draw chart elements: {0}")]
    Drawing(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Failed to read scores from {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

type Result<T> = core::result::Result<T, PlotError>;

/// Options for [`horiz_bar_plot`].
#[derive(Debug, Clone)]
pub struct BarChartOptions {
    /// Write the chart to `save_path` instead of returning the pixels
    pub save: bool,
    /// PNG output path, required when `save` is set
    pub save_path: PathBuf,
    /// Optional caption above the chart
    pub title: Option<String>,
    /// Canvas size in pixels (width, height)
    pub size: (u32, u32),
}

impl Default for BarChartOptions {
    fn default() -> Self {
        Self {
            save: true,
            save_path: PathBuf::new(),
            title: None,
            size: (DEFAULT_WIDTH, DEFAULT_HEIGHT),
        }
    }
}

impl BarChartOptions {
    /// Options that save the chart to `path`.
    #[must_use]
    pub fn save_to(path: impl Into<PathBuf>) -> Self {
        Self {
            save_path: path.into(),
            ..Default::default()
        }
    }

    /// Options that return the RGB pixel buffer instead of saving.
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            save: false,
            ..Default::default()
        }
    }

    /// Set the caption.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the canvas size in pixels.
    #[must_use]
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.size = (width, height);
        self
    }
}

/// Render a horizontal bar chart of percentile scores.
///
/// The first task is drawn at the bottom. When `options.save` is set the
/// chart is written as PNG and `Ok(None)` is returned; otherwise the RGB
/// buffer (`width * height * 3` bytes) is returned.
///
/// # Errors
///
/// Returns [`PlotError::InvalidData`] for empty input, mismatched lengths,
/// scores outside 0..=100, a zero-sized canvas or a missing save path, and
/// drawing errors from the backend.
pub fn horiz_bar_plot<S: AsRef<str>>(
    task_names: &[S],
    task_scores: &[f64],
    options: &BarChartOptions,
) -> Result<Option<Vec<u8>>> {
    validate(task_names, task_scores)?;
    let (width, height) = options.size;
    if width == 0 || height == 0 {
        let msg = format!("Canvas size {width}x{height} is empty");
        return Err(PlotError::InvalidData(msg));
    }

    let names: Vec<&str> = task_names.iter().map(AsRef::as_ref).collect();
    let title = options.title.as_deref();

    if options.save {
        if options.save_path.as_os_str().is_empty() {
            return Err(PlotError::InvalidData(
                "A save path is required when saving the chart".to_string(),
            ));
        }
        let root = BitMapBackend::new(&options.save_path, (width, height)).into_drawing_area();
        draw_bars(&root, &names, task_scores, title)?;
        log::info!("Saved bar chart to {}", options.save_path.display());
        Ok(None)
    } else {
        let mut buffer = vec![0u8; width as usize * height as usize * 3];
        {
            let root = BitMapBackend::with_buffer(&mut buffer, (width, height)).into_drawing_area();
            draw_bars(&root, &names, task_scores, title)?;
        }
        Ok(Some(buffer))
    }
}

/// Check that names and scores describe a drawable chart.
///
/// # Errors
///
/// Returns [`PlotError::InvalidData`] describing the first problem found.
pub fn validate<S: AsRef<str>>(task_names: &[S], task_scores: &[f64]) -> Result<()> {
    if task_names.is_empty() {
        return Err(PlotError::InvalidData("No tasks to plot".to_string()));
    }
    if task_names.len() != task_scores.len() {
        return Err(PlotError::InvalidData(format!(
            "{} task names but {} scores",
            task_names.len(),
            task_scores.len()
        )));
    }
    for (name, score) in task_names.iter().zip(task_scores) {
        if !score.is_finite() || !(0.0..=PERCENTILE_MAX).contains(score) {
            return Err(PlotError::InvalidData(format!(
                "Percentile {score} for '{}' is outside 0-100",
                name.as_ref()
            )));
        }
    }
    Ok(())
}

/// Pixels reserved left of the plot for task labels.
#[must_use]
pub fn label_area_width<S: AsRef<str>>(task_names: &[S]) -> u32 {
    let longest = task_names
        .iter()
        .map(|n| n.as_ref().chars().count())
        .max()
        .unwrap_or(0) as u32;
    (longest * 7 + 12).clamp(40, 220)
}

fn draw_bars<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    names: &[&str],
    scores: &[f64],
    title: Option<&str>,
) -> Result<()> {
    root.fill(&WHITE).map_err(|e| PlotError::DrawingArea(e.to_string()))?;

    let count = names.len() as u32;
    let mut builder = ChartBuilder::on(root);
    builder
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(label_area_width(names));
    if let Some(title) = title {
        builder.caption(title, ("sans-serif", 18));
    }

    let mut chart = builder
        .build_cartesian_2d(0f64..PERCENTILE_MAX, (0u32..count).into_segmented())
        .map_err(|e| PlotError::ChartConfig(e.to_string()))?;

    chart
        .configure_mesh()
        .disable_y_mesh()
        .x_desc("Percentile")
        .y_labels(names.len())
        .y_label_formatter(&|v| match v {
            SegmentValue::CenterOf(i) => names
                .get(*i as usize)
                .map(|s| (*s).to_string())
                .unwrap_or_default(),
            _ => String::new(),
        })
        .label_style(("sans-serif", 12))
        .draw()
        .map_err(|e| PlotError::Drawing(e.to_string()))?;

    chart
        .draw_series(scores.iter().enumerate().map(|(i, &score)| {
            let i = i as u32;
            let mut bar = Rectangle::new(
                [(0.0, SegmentValue::Exact(i)), (score, SegmentValue::Exact(i + 1))],
                BLUE.mix(0.8).filled(),
            );
            bar.set_margin(4, 4, 0, 0);
            bar
        }))
        .map_err(|e| PlotError::Drawing(e.to_string()))?;

    root.present().map_err(|e| PlotError::Drawing(e.to_string()))?;
    Ok(())
}

#[derive(Debug, Deserialize)]
struct ScoreRow {
    task: String,
    score: f64,
}

/// Load `task,score` rows from a CSV file with a header line.
///
/// # Errors
///
/// Returns [`PlotError::Csv`] if the file cannot be read or a row does not
/// parse.
pub fn read_scores_csv(path: &Path) -> Result<(Vec<String>, Vec<f64>)> {
    let csv_err = |source| PlotError::Csv {
        path: path.to_path_buf(),
        source,
    };
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(csv_err)?;

    let mut names = Vec::new();
    let mut scores = Vec::new();
    for row in reader.deserialize::<ScoreRow>() {
        let row = row.map_err(csv_err)?;
        names.push(row.task);
        scores.push(row.score);
    }
    log::debug!("Read {} score(s) from {}", names.len(), path.display());
    Ok((names, scores))
}
