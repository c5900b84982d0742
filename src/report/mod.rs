//! Multi-page report assembly.
//!
//! A [`Report`] is a plain description of pages and their items; it holds no
//! rendering state. [`render`] lays it out as fixed-size pages and writes a PDF.
//!
//! The pages are always, in order:
//!
//! 1. **Data Overview**: head preview and rounded descriptive statistics
//! 2. **Plots**: line plot above the correlation heatmap
//! 3. **Histograms**: the histogram grid
//!
//! Column selections left unset (or empty) fall back to the first numeric
//! columns of the table. A chart whose resolved selection is still empty is
//! left off its page.

pub mod render;

pub use render::{DEFAULT_REPORT_FILE, render_pages, render_pdf, save_report};

use crate::config::AppSettings;
use crate::data::stats::{TextTable, describe, preview, summary_table};
use crate::error::Result;
use crate::utils::numeric_column_names;
use crate::viz::{Figure, correlation_heatmap, histograms_with_width, line_plot};
use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};

pub const OVERVIEW_PAGE: &str = "Data Overview";
pub const PLOTS_PAGE: &str = "Plots";
pub const HISTOGRAMS_PAGE: &str = "Histograms";

/// Page dimensions in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageSize {
    pub width: u32,
    pub height: u32,
}

impl PageSize {
    /// A4 at 96 dpi.
    pub const A4: Self = Self {
        width: 794,
        height: 1123,
    };
}

impl Default for PageSize {
    fn default() -> Self {
        Self::A4
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum PageItem {
    Table(TextTable),
    Figure(Figure),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Page {
    pub title: String,
    /// Stacked top to bottom
    pub items: Vec<PageItem>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub title: String,
    /// RFC 3339 creation time
    pub generated_at: String,
    pub pages: Vec<Page>,
}

impl Report {
    pub fn page(&self, title: &str) -> Option<&Page> {
        self.pages.iter().find(|p| p.title == title)
    }
}

/// Which columns each chart uses. `None` means "use the fallback".
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSelection {
    pub plot_columns: Option<Vec<String>>,
    pub heatmap_columns: Option<Vec<String>>,
    pub hist_columns: Option<Vec<String>>,
}

/// Layout knobs, normally taken from [`AppSettings`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReportOptions {
    pub preview_rows: usize,
    pub stats_decimals: usize,
    pub fallback_columns: usize,
    pub histogram_grid_width: usize,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self::from(&AppSettings::default())
    }
}

impl From<&AppSettings> for ReportOptions {
    fn from(settings: &AppSettings) -> Self {
        Self {
            preview_rows: settings.preview_rows,
            stats_decimals: settings.stats_decimals as usize,
            fallback_columns: settings.report_fallback_columns,
            histogram_grid_width: settings.histogram_grid_width,
        }
    }
}

pub fn build_report(df: &DataFrame, selection: &ReportSelection) -> Result<Report> {
    build_report_with(df, selection, &ReportOptions::default())
}

pub fn build_report_with(
    df: &DataFrame,
    selection: &ReportSelection,
    options: &ReportOptions,
) -> Result<Report> {
    let fallback: Vec<String> = numeric_column_names(df)
        .into_iter()
        .take(options.fallback_columns)
        .collect();
    let resolve = |chosen: &Option<Vec<String>>| match chosen {
        Some(cols) if !cols.is_empty() => cols.clone(),
        _ => fallback.clone(),
    };
    let plot_cols = resolve(&selection.plot_columns);
    let heatmap_cols = resolve(&selection.heatmap_columns);
    let hist_cols = resolve(&selection.hist_columns);

    let overview = Page {
        title: OVERVIEW_PAGE.to_owned(),
        items: vec![
            PageItem::Table(preview(df, options.preview_rows)?),
            PageItem::Table(summary_table(&describe(df)?, options.stats_decimals)),
        ],
    };

    let mut plots = Page {
        title: PLOTS_PAGE.to_owned(),
        items: Vec::new(),
    };
    if !plot_cols.is_empty() {
        plots.items.push(PageItem::Figure(line_plot(df, &plot_cols)?));
    }
    if !heatmap_cols.is_empty() && df.height() > 0 {
        plots
            .items
            .push(PageItem::Figure(correlation_heatmap(df, &heatmap_cols)?));
    }

    let mut hist_page = Page {
        title: HISTOGRAMS_PAGE.to_owned(),
        items: Vec::new(),
    };
    if !hist_cols.is_empty() {
        hist_page.items.push(PageItem::Figure(histograms_with_width(
            df,
            &hist_cols,
            options.histogram_grid_width,
        )?));
    }

    tracing::info!(
        "Built report: {} plot, {} heatmap, {} histogram columns",
        plot_cols.len(),
        heatmap_cols.len(),
        hist_cols.len()
    );

    Ok(Report {
        title: "Data Report".to_owned(),
        generated_at: chrono::Local::now().to_rfc3339(),
        pages: vec![overview, plots, hist_page],
    })
}
