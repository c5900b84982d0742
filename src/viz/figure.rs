//! Renderer-agnostic chart descriptions and their plotters rendering.
//!
//! Generators build a [`Figure`] from data; nothing is drawn until
//! [`Figure::render_svg`] or [`draw_figure`] is called, so the same figure
//! can go to a standalone SVG file or into a report page.

use crate::error::{Result, render_err};
use plotters::coord::Shift;
use plotters::prelude::{
    BLACK, ChartBuilder, Color as _, DrawingArea, DrawingBackend, IntoDrawingArea as _,
    IntoFont as _, IntoSegmentedCoord as _, Palette as _, Palette99, PathElement, RGBColor,
    Rectangle, SVGBackend, SegmentValue, Text, WHITE,
};
use plotters::style::text_anchor::{HPos, Pos, VPos};
use serde::{Deserialize, Serialize};
use std::ops::Range;

const FONT: &str = "sans-serif";

/// A titled grid of panes, filled row by row.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Figure {
    pub title: String,
    /// `(rows, cols)`
    pub grid: (usize, usize),
    pub panes: Vec<Pane>,
}

impl Figure {
    /// A 1×1 figure holding `pane`.
    pub fn single(pane: Pane) -> Self {
        Self {
            title: String::new(),
            grid: (1, 1),
            panes: vec![pane],
        }
    }

    pub fn pane(&self, idx: usize) -> Option<&Pane> {
        self.panes.get(idx)
    }

    /// Renders the figure to an SVG document.
    pub fn render_svg(&self, width: u32, height: u32) -> Result<String> {
        let mut buf = String::new();
        {
            let root = SVGBackend::with_string(&mut buf, (width, height)).into_drawing_area();
            root.fill(&WHITE).map_err(render_err)?;
            draw_figure(self, &root)?;
            root.present().map_err(render_err)?;
        }
        Ok(buf)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Pane {
    pub title: String,
    pub x_label: Option<String>,
    pub y_label: Option<String>,
    pub content: PaneContent,
}

impl Pane {
    pub fn new(title: impl Into<String>, content: PaneContent) -> Self {
        Self {
            title: title.into(),
            x_label: None,
            y_label: None,
            content,
        }
    }

    pub fn with_labels(mut self, x: impl Into<String>, y: impl Into<String>) -> Self {
        self.x_label = Some(x.into());
        self.y_label = Some(y.into());
        self
    }

    pub fn empty() -> Self {
        Self::new("", PaneContent::Empty)
    }

    pub fn is_empty(&self) -> bool {
        matches!(self.content, PaneContent::Empty)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum PaneContent {
    Lines(Vec<LineSeries>),
    Bars(Vec<Bar>),
    Heatmap(CorrelationMatrix),
    Histogram {
        /// `(bin start, count)`
        bins: Vec<(f64, usize)>,
        bin_width: f64,
        /// Fitted Gaussian, scaled to counts. Empty when the std is zero.
        density: Vec<(f64, f64)>,
    },
    Empty,
}

/// Values plotted against row index; `None` breaks the line.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LineSeries {
    pub name: String,
    pub values: Vec<Option<f64>>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bar {
    pub label: String,
    pub count: usize,
}

/// Square matrix of pairwise correlations; NaN where undefined.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CorrelationMatrix {
    pub columns: Vec<String>,
    pub data: Vec<Vec<f64>>,
}

impl CorrelationMatrix {
    pub fn get(&self, row: &str, col: &str) -> Option<f64> {
        let i = self.columns.iter().position(|c| c == row)?;
        let j = self.columns.iter().position(|c| c == col)?;
        self.data.get(i)?.get(j).copied()
    }
}

/// Draws `figure` into `area`: title on top, panes split evenly below.
/// Empty panes leave their cell blank.
pub fn draw_figure<DB: DrawingBackend>(
    figure: &Figure,
    area: &DrawingArea<DB, Shift>,
) -> Result<()> {
    let body = if figure.title.is_empty() {
        area.clone()
    } else {
        area.titled(&figure.title, (FONT, 24).into_font())
            .map_err(render_err)?
    };

    let (rows, cols) = figure.grid;
    let cells = body.split_evenly((rows.max(1), cols.max(1)));
    for (pane, cell) in figure.panes.iter().zip(cells.iter()) {
        draw_pane(pane, cell)?;
    }
    Ok(())
}

fn draw_pane<DB: DrawingBackend>(pane: &Pane, area: &DrawingArea<DB, Shift>) -> Result<()> {
    match &pane.content {
        PaneContent::Lines(lines) => draw_lines(pane, lines, area),
        PaneContent::Bars(bars) => draw_bars(pane, bars, area),
        PaneContent::Heatmap(matrix) => draw_heatmap(pane, matrix, area),
        PaneContent::Histogram {
            bins,
            bin_width,
            density,
        } => draw_histogram(pane, bins, *bin_width, density, area),
        PaneContent::Empty => Ok(()),
    }
}

/// Axis range covering `lo..hi` with a small margin; degenerate input gets a
/// unit-wide window.
fn padded_range(lo: f64, hi: f64) -> Range<f64> {
    if !lo.is_finite() || !hi.is_finite() {
        return 0.0..1.0;
    }
    if (hi - lo).abs() < f64::EPSILON {
        return lo - 0.5..hi + 0.5;
    }
    let pad = (hi - lo) * 0.05;
    lo - pad..hi + pad
}

/// Splits a series into runs of consecutive present values.
fn segments(values: &[Option<f64>]) -> Vec<Vec<(f64, f64)>> {
    let mut out = Vec::new();
    let mut current = Vec::new();
    for (i, v) in values.iter().enumerate() {
        match v {
            Some(y) if y.is_finite() => current.push((i as f64, *y)),
            _ => {
                if !current.is_empty() {
                    out.push(std::mem::take(&mut current));
                }
            }
        }
    }
    if !current.is_empty() {
        out.push(current);
    }
    out
}

fn draw_lines<DB: DrawingBackend>(
    pane: &Pane,
    lines: &[LineSeries],
    area: &DrawingArea<DB, Shift>,
) -> Result<()> {
    let len = lines.iter().map(|l| l.values.len()).max().unwrap_or(0);
    let present = lines.iter().flat_map(|l| l.values.iter().flatten().copied());
    let (lo, hi) = present.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });

    let mut chart = ChartBuilder::on(area)
        .caption(&pane.title, (FONT, 18).into_font())
        .margin(10)
        .x_label_area_size(35)
        .y_label_area_size(50)
        .build_cartesian_2d(0.0..(len.max(2) - 1) as f64, padded_range(lo, hi))
        .map_err(render_err)?;

    chart
        .configure_mesh()
        .x_desc(pane.x_label.as_deref().unwrap_or_default())
        .y_desc(pane.y_label.as_deref().unwrap_or_default())
        .draw()
        .map_err(render_err)?;

    for (i, line) in lines.iter().enumerate() {
        let color = Palette99::pick(i).to_rgba();
        for (n, segment) in segments(&line.values).into_iter().enumerate() {
            let anno = chart
                .draw_series(plotters::series::LineSeries::new(
                    segment,
                    color.stroke_width(2),
                ))
                .map_err(render_err)?;
            if n == 0 {
                anno.label(line.name.as_str()).legend(move |(x, y)| {
                    PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2))
                });
            }
        }
    }

    if !lines.is_empty() {
        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()
            .map_err(render_err)?;
    }
    Ok(())
}

fn draw_bars<DB: DrawingBackend>(
    pane: &Pane,
    bars: &[Bar],
    area: &DrawingArea<DB, Shift>,
) -> Result<()> {
    let n = i32::try_from(bars.len().max(1)).map_err(render_err)?;
    let max = bars.iter().map(|b| b.count).max().unwrap_or(0).max(1) as f64;
    let label_of = |v: &SegmentValue<i32>| match v {
        SegmentValue::CenterOf(i) | SegmentValue::Exact(i) => usize::try_from(*i)
            .ok()
            .and_then(|i| bars.get(i))
            .map(|b| b.label.clone())
            .unwrap_or_default(),
        SegmentValue::Last => String::new(),
    };

    let mut chart = ChartBuilder::on(area)
        .caption(&pane.title, (FONT, 18).into_font())
        .margin(10)
        .x_label_area_size(35)
        .y_label_area_size(50)
        .build_cartesian_2d((0..n).into_segmented(), 0.0..max * 1.1)
        .map_err(render_err)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(bars.len().max(1))
        .x_label_formatter(&label_of)
        .x_desc(pane.x_label.as_deref().unwrap_or_default())
        .y_desc(pane.y_label.as_deref().unwrap_or_default())
        .draw()
        .map_err(render_err)?;

    let fill = Palette99::pick(0).mix(0.8).filled();
    chart
        .draw_series(bars.iter().zip(0..).map(|(bar, i)| {
            let mut rect = Rectangle::new(
                [
                    (SegmentValue::Exact(i), 0.0),
                    (SegmentValue::Exact(i + 1), bar.count as f64),
                ],
                fill,
            );
            rect.set_margin(0, 0, 4, 4);
            rect
        }))
        .map_err(render_err)?;
    Ok(())
}

/// Diverging blue-white-red colour for a correlation in `[-1, 1]`.
pub(crate) fn coolwarm(v: f64) -> RGBColor {
    const COLD: (f64, f64, f64) = (59.0, 76.0, 192.0);
    const MID: (f64, f64, f64) = (221.0, 221.0, 221.0);
    const WARM: (f64, f64, f64) = (180.0, 4.0, 38.0);

    let t = v.clamp(-1.0, 1.0);
    let (from, to, k) = if t < 0.0 {
        (MID, COLD, -t)
    } else {
        (MID, WARM, t)
    };
    let lerp = |a: f64, b: f64| (a + (b - a) * k).round() as u8;
    RGBColor(lerp(from.0, to.0), lerp(from.1, to.1), lerp(from.2, to.2))
}

fn draw_heatmap<DB: DrawingBackend>(
    pane: &Pane,
    matrix: &CorrelationMatrix,
    area: &DrawingArea<DB, Shift>,
) -> Result<()> {
    let size = matrix.columns.len();
    let n = i32::try_from(size.max(1)).map_err(render_err)?;
    // Row 0 is drawn at the top.
    let label_of = |flip: bool| {
        move |v: &SegmentValue<i32>| match v {
            SegmentValue::CenterOf(i) | SegmentValue::Exact(i) => {
                let i = if flip { n - 1 - i } else { *i };
                usize::try_from(i)
                    .ok()
                    .and_then(|i| matrix.columns.get(i))
                    .cloned()
                    .unwrap_or_default()
            }
            SegmentValue::Last => String::new(),
        }
    };
    let x_label = label_of(false);
    let y_label = label_of(true);

    let mut chart = ChartBuilder::on(area)
        .caption(&pane.title, (FONT, 18).into_font())
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(90)
        .build_cartesian_2d((0..n).into_segmented(), (0..n).into_segmented())
        .map_err(render_err)?;

    chart
        .configure_mesh()
        .disable_mesh()
        .x_labels(size.max(1))
        .y_labels(size.max(1))
        .x_label_formatter(&x_label)
        .y_label_formatter(&y_label)
        .draw()
        .map_err(render_err)?;

    let mut cells = Vec::new();
    for (i, row) in (0..n).zip(&matrix.data) {
        for (j, &v) in (0..n).zip(row) {
            if v.is_finite() {
                cells.push((j, n - 1 - i, v));
            }
        }
    }

    chart
        .draw_series(cells.iter().map(|&(x, y, v)| {
            Rectangle::new(
                [
                    (SegmentValue::Exact(x), SegmentValue::Exact(y)),
                    (SegmentValue::Exact(x + 1), SegmentValue::Exact(y + 1)),
                ],
                coolwarm(v).filled(),
            )
        }))
        .map_err(render_err)?;

    let annotation = (FONT, 12)
        .into_font()
        .color(&BLACK)
        .pos(Pos::new(HPos::Center, VPos::Center));
    chart
        .draw_series(cells.iter().map(|&(x, y, v)| {
            Text::new(
                format!("{v:.2}"),
                (SegmentValue::CenterOf(x), SegmentValue::CenterOf(y)),
                annotation.clone(),
            )
        }))
        .map_err(render_err)?;
    Ok(())
}

fn draw_histogram<DB: DrawingBackend>(
    pane: &Pane,
    bins: &[(f64, usize)],
    bin_width: f64,
    density: &[(f64, f64)],
    area: &DrawingArea<DB, Shift>,
) -> Result<()> {
    let lo = bins
        .first()
        .map(|b| b.0)
        .into_iter()
        .chain(density.first().map(|d| d.0))
        .fold(f64::INFINITY, f64::min);
    let hi = bins
        .last()
        .map(|b| b.0 + bin_width)
        .into_iter()
        .chain(density.last().map(|d| d.0))
        .fold(f64::NEG_INFINITY, f64::max);
    let top = bins
        .iter()
        .map(|b| b.1 as f64)
        .chain(density.iter().map(|d| d.1))
        .fold(1.0, f64::max);

    let mut chart = ChartBuilder::on(area)
        .caption(&pane.title, (FONT, 16).into_font())
        .margin(8)
        .x_label_area_size(30)
        .y_label_area_size(40)
        .build_cartesian_2d(padded_range(lo, hi), 0.0..top * 1.1)
        .map_err(render_err)?;

    chart
        .configure_mesh()
        .x_desc(pane.x_label.as_deref().unwrap_or_default())
        .y_desc(pane.y_label.as_deref().unwrap_or_default())
        .draw()
        .map_err(render_err)?;

    let fill = Palette99::pick(0).mix(0.6).filled();
    chart
        .draw_series(bins.iter().map(|&(start, count)| {
            Rectangle::new([(start, 0.0), (start + bin_width, count as f64)], fill)
        }))
        .map_err(render_err)?;

    if !density.is_empty() {
        chart
            .draw_series(plotters::series::LineSeries::new(
                density.iter().copied(),
                Palette99::pick(1).stroke_width(2),
            ))
            .map_err(render_err)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segments_break_on_missing() {
        let segs = segments(&[Some(1.0), Some(2.0), None, Some(4.0), Some(f64::NAN)]);
        assert_eq!(segs, vec![vec![(0.0, 1.0), (1.0, 2.0)], vec![(3.0, 4.0)]]);
    }

    #[test]
    fn test_padded_range_degenerate() {
        assert_eq!(padded_range(3.0, 3.0), 2.5..3.5);
        assert_eq!(padded_range(f64::INFINITY, f64::NEG_INFINITY), 0.0..1.0);
    }

    #[test]
    fn test_coolwarm_endpoints() {
        assert_eq!(coolwarm(-1.0), RGBColor(59, 76, 192));
        assert_eq!(coolwarm(0.0), RGBColor(221, 221, 221));
        assert_eq!(coolwarm(1.0), RGBColor(180, 4, 38));
    }

    #[test]
    fn test_render_svg_with_empty_pane() {
        let figure = Figure {
            title: "Mixed".to_owned(),
            grid: (1, 2),
            panes: vec![
                Pane::new(
                    "Line Plot",
                    PaneContent::Lines(vec![LineSeries {
                        name: "a".to_owned(),
                        values: vec![Some(1.0), None, Some(3.0), Some(2.0)],
                    }]),
                )
                .with_labels("Index", "Values"),
                Pane::empty(),
            ],
        };
        let svg = figure.render_svg(600, 300).unwrap();
        assert!(svg.contains("<svg"));
        assert!(svg.contains("Line Plot"));
    }

    #[test]
    fn test_matrix_lookup() {
        let matrix = CorrelationMatrix {
            columns: vec!["a".to_owned(), "b".to_owned()],
            data: vec![vec![1.0, 0.5], vec![0.5, 1.0]],
        };
        assert_eq!(matrix.get("a", "b"), Some(0.5));
        assert_eq!(matrix.get("a", "z"), None);
    }
}
