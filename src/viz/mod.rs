//! Chart generators. Each takes a table plus a column selection and returns a
//! [`Figure`]; rendering lives in [`figure`].

pub mod figure;
pub mod heatmap;
pub mod histograms;
pub mod plots;

pub use figure::{Bar, CorrelationMatrix, Figure, LineSeries, Pane, PaneContent, draw_figure};
pub use heatmap::{correlation_heatmap, correlation_matrix};
pub use histograms::{histograms, histograms_with_width};
pub use plots::{bar_plot, line_plot};

use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnOverview {
    pub name: String,
    pub dtype: String,
    /// Numeric columns can go into line plots, heatmaps and histograms.
    pub plottable: bool,
}

pub fn column_overview(df: &DataFrame) -> Vec<ColumnOverview> {
    df.get_columns()
        .iter()
        .map(|col| ColumnOverview {
            name: col.name().to_string(),
            dtype: col.dtype().to_string(),
            plottable: col.dtype().is_primitive_numeric(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::*;

    #[test]
    fn test_column_overview() {
        let df = df!("n" => [1, 2], "t" => ["a", "b"]).unwrap();
        let overview = column_overview(&df);
        assert_eq!(overview.len(), 2);
        assert!(overview[0].plottable);
        assert!(!overview[1].plottable);
        assert_eq!(overview[1].name, "t");
    }
}
