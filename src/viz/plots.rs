use super::figure::{Bar, Figure, LineSeries, Pane, PaneContent};
use crate::error::{IdmdError, Result};
use crate::utils::{get_column, numeric_values, require_columns};
use polars::prelude::*;
use std::collections::HashMap;

/// One line per column, plotted against row index.
pub fn line_plot<S: AsRef<str>>(df: &DataFrame, columns: &[S]) -> Result<Figure> {
    require_columns(df, columns)?;

    let mut lines = Vec::with_capacity(columns.len());
    for name in columns {
        let col = get_column(df, name.as_ref())?;
        lines.push(LineSeries {
            name: name.as_ref().to_owned(),
            values: numeric_values(col)?,
        });
    }

    tracing::debug!("Line plot of {} columns", lines.len());
    Ok(Figure::single(
        Pane::new("Line Plot", PaneContent::Lines(lines)).with_labels("Index", "Values"),
    ))
}

/// Frequency of each distinct non-missing value, most frequent first.
/// Ties keep the order of first appearance.
pub fn bar_plot(df: &DataFrame, column: &str) -> Result<Figure> {
    let col = get_column(df, column)?;
    let as_text = col.as_materialized_series().cast(&DataType::String)?;
    let float_nan = if col.dtype().is_float() {
        col.as_materialized_series()
            .cast(&DataType::Float64)?
            .f64()?
            .into_iter()
            .map(|v| v.is_some_and(f64::is_nan))
            .collect()
    } else {
        vec![false; col.len()]
    };

    let mut counts: HashMap<&str, usize> = HashMap::new();
    let mut order: Vec<&str> = Vec::new();
    for (value, is_nan) in as_text.str()?.into_iter().zip(float_nan) {
        let Some(value) = value else { continue };
        if is_nan {
            continue;
        }
        let count = counts.entry(value).or_insert_with(|| {
            order.push(value);
            0
        });
        *count += 1;
    }

    let mut bars: Vec<Bar> = order
        .into_iter()
        .map(|label| Bar {
            label: label.to_owned(),
            count: counts.get(label).copied().unwrap_or_default(),
        })
        .collect();
    // Stable sort keeps first-appearance order among equal counts.
    bars.sort_by(|a, b| b.count.cmp(&a.count));

    if bars.is_empty() {
        tracing::warn!("Column '{column}' has no values to count");
    }

    Ok(Figure::single(
        Pane::new(format!("Bar Plot of {column}"), PaneContent::Bars(bars))
            .with_labels("Categories", "Frequency"),
    ))
}

/// Rejects an empty column selection.
pub(crate) fn require_selection<S: AsRef<str>>(columns: &[S], what: &str) -> Result<()> {
    if columns.is_empty() {
        return Err(IdmdError::EmptyInput(format!("no columns selected for {what}")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_plot() {
        let df = df!("a" => [Some(1.0), None, Some(3.0)], "b" => [4, 5, 6]).unwrap();
        let figure = line_plot(&df, &["a", "b"]).unwrap();

        assert_eq!(figure.grid, (1, 1));
        let pane = figure.pane(0).unwrap();
        assert_eq!(pane.title, "Line Plot");
        assert_eq!(pane.x_label.as_deref(), Some("Index"));
        assert_eq!(pane.y_label.as_deref(), Some("Values"));
        let PaneContent::Lines(lines) = &pane.content else {
            panic!("expected lines");
        };
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].values, vec![Some(1.0), None, Some(3.0)]);
        assert_eq!(lines[1].name, "b");
    }

    #[test]
    fn test_line_plot_errors() {
        let df = df!("a" => [1.0], "t" => ["x"]).unwrap();
        assert!(matches!(
            line_plot(&df, &["z"]),
            Err(IdmdError::ColumnNotFound(_))
        ));
        assert!(matches!(
            line_plot(&df, &["t"]),
            Err(IdmdError::UnsupportedPolicy(_))
        ));
    }

    #[test]
    fn test_bar_plot_counts_and_order() {
        let df = df!("c" => [Some("b"), Some("a"), None, Some("a"), Some("c"), Some("b"), Some("a")])
            .unwrap();
        let figure = bar_plot(&df, "c").unwrap();
        let pane = figure.pane(0).unwrap();
        assert_eq!(pane.title, "Bar Plot of c");
        assert_eq!(pane.x_label.as_deref(), Some("Categories"));

        let PaneContent::Bars(bars) = &pane.content else {
            panic!("expected bars");
        };
        let got: Vec<(&str, usize)> = bars.iter().map(|b| (b.label.as_str(), b.count)).collect();
        assert_eq!(got, vec![("a", 3), ("b", 2), ("c", 1)]);
    }

    #[test]
    fn test_bar_plot_numeric_skips_nan() {
        let df = df!("n" => [Some(1.0), Some(f64::NAN), None, Some(1.0)]).unwrap();
        let figure = bar_plot(&df, "n").unwrap();
        let PaneContent::Bars(bars) = &figure.panes[0].content else {
            panic!("expected bars");
        };
        assert_eq!(bars.len(), 1);
        assert_eq!(bars[0].count, 2);
    }

    #[test]
    fn test_bar_plot_missing_column() {
        let df = df!("a" => [1]).unwrap();
        assert!(matches!(
            bar_plot(&df, "z"),
            Err(IdmdError::ColumnNotFound(_))
        ));
    }
}
