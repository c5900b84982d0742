use super::figure::{Figure, Pane, PaneContent};
use super::plots::require_selection;
use crate::error::{IdmdError, Result};
use crate::utils::{get_column, numeric_values, require_columns};
use polars::prelude::*;

/// Histogram panes per grid row unless configured otherwise.
pub const DEFAULT_GRID_WIDTH: usize = 3;

const MIN_BINS: usize = 5;
const MAX_BINS: usize = 50;
const CONSTANT_BINS: usize = 20;
const CURVE_POINTS: usize = 100;

/// Bins `values` (all finite) and returns `(bin_width, [(bin start, count)])`.
///
/// Bin width follows Freedman–Diaconis, falling back to a square-root rule
/// when the IQR is zero, with the count clamped to 5..=50. A constant column
/// gets 20 unit-wide bins with every value in the middle one.
pub fn histogram_bins(values: &[f64]) -> (f64, Vec<(f64, usize)>) {
    let ca = Float64Chunked::from_slice("values".into(), values);
    let (Some(min_v), Some(max_v)) = (ca.min(), ca.max()) else {
        return (0.0, Vec::new());
    };
    let n = values.len();

    if (max_v - min_v).abs() < f64::EPSILON {
        let bin_width = 1.0;
        let start = min_v - (CONSTANT_BINS / 2) as f64 * bin_width;
        let bins = (0..CONSTANT_BINS)
            .map(|i| {
                let count = if i == CONSTANT_BINS / 2 { n } else { 0 };
                (start + i as f64 * bin_width, count)
            })
            .collect();
        return (bin_width, bins);
    }

    let q1 = ca.quantile(0.25, QuantileMethod::Linear).ok().flatten();
    let q3 = ca.quantile(0.75, QuantileMethod::Linear).ok().flatten();
    let iqr = q3.unwrap_or(max_v) - q1.unwrap_or(min_v);
    let h = if iqr > 0.0 {
        2.0 * iqr / (n as f64).cbrt()
    } else {
        (max_v - min_v) / (n as f64).sqrt()
    };

    let num_bins = (((max_v - min_v) / h).ceil() as usize).clamp(MIN_BINS, MAX_BINS);
    let bin_width = (max_v - min_v) / num_bins as f64;

    let mut counts = vec![0; num_bins];
    for &val in values {
        let idx = ((val - min_v) / bin_width).floor() as usize;
        if let Some(count) = counts.get_mut(idx.min(num_bins - 1)) {
            *count += 1;
        }
    }

    let bins = counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| (min_v + i as f64 * bin_width, count))
        .collect();
    (bin_width, bins)
}

/// Normal density with the sample mean and std of `values`, scaled by
/// `count × bin_width` so it overlays the bars. Empty for zero spread.
pub fn gaussian_overlay(values: &[f64], bins: &[(f64, usize)], bin_width: f64) -> Vec<(f64, f64)> {
    let ca = Float64Chunked::from_slice("values".into(), values);
    let (Some(mu), Some(sigma)) = (ca.mean(), ca.std(1)) else {
        return Vec::new();
    };
    if sigma <= 0.0 || !sigma.is_finite() {
        return Vec::new();
    }
    let (Some(first), Some(last)) = (bins.first(), bins.last()) else {
        return Vec::new();
    };

    let total: usize = bins.iter().map(|b| b.1).sum();
    let scale = total as f64 * bin_width;
    let lo = first.0 - bin_width;
    let hi = last.0 + 2.0 * bin_width;
    let step = (hi - lo) / CURVE_POINTS as f64;

    (0..=CURVE_POINTS)
        .map(|i| {
            let x = lo + i as f64 * step;
            let z = (x - mu) / sigma;
            let y = scale * (1.0 / (sigma * (2.0 * std::f64::consts::PI).sqrt()))
                * (-0.5 * z * z).exp();
            (x, y)
        })
        .collect()
}

/// Histogram pane for one numeric column.
pub fn histogram_pane(df: &DataFrame, column: &str) -> Result<Pane> {
    let values: Vec<f64> = numeric_values(get_column(df, column)?)?
        .into_iter()
        .flatten()
        .collect();
    let (bin_width, bins) = histogram_bins(&values);
    let density = gaussian_overlay(&values, &bins, bin_width);

    Ok(Pane::new(
        format!("Histogram of {column}"),
        PaneContent::Histogram {
            bins,
            bin_width,
            density,
        },
    ))
}

/// Grid of histograms, three per row.
pub fn histograms<S: AsRef<str>>(df: &DataFrame, columns: &[S]) -> Result<Figure> {
    histograms_with_width(df, columns, DEFAULT_GRID_WIDTH)
}

/// Grid of histograms, `width` per row; unused trailing cells are empty.
pub fn histograms_with_width<S: AsRef<str>>(
    df: &DataFrame,
    columns: &[S],
    width: usize,
) -> Result<Figure> {
    require_selection(columns, "histograms")?;
    require_columns(df, columns)?;
    if width == 0 {
        return Err(IdmdError::InvalidParams(
            "histogram grid width must be positive".to_owned(),
        ));
    }

    let rows = columns.len().div_ceil(width);
    let mut panes = Vec::with_capacity(rows * width);
    for name in columns {
        panes.push(histogram_pane(df, name.as_ref())?);
    }
    panes.resize_with(rows * width, Pane::empty);

    tracing::debug!("Histogram grid {rows}x{width} for {} columns", columns.len());
    Ok(Figure {
        title: String::new(),
        grid: (rows, width),
        panes,
    })
}
