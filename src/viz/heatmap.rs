use super::figure::{CorrelationMatrix, Figure, Pane, PaneContent};
use super::plots::require_selection;
use crate::error::{IdmdError, Result};
use crate::utils::{get_column, numeric_values, require_columns};
use polars::prelude::{ChunkVar as _, DataFrame, Float64Chunked, NewChunkedArray as _, cov};

/// Pearson correlation over the rows where both values are present.
///
/// Returns NaN when fewer than two such rows exist or either side has zero
/// variance.
pub fn pearson(x: &[Option<f64>], y: &[Option<f64>]) -> f64 {
    let (xs, ys): (Vec<f64>, Vec<f64>) = x
        .iter()
        .zip(y)
        .filter_map(|(a, b)| Some(((*a)?, (*b)?)))
        .unzip();
    if xs.len() < 2 {
        return f64::NAN;
    }

    let xs = Float64Chunked::from_vec("x".into(), xs);
    let ys = Float64Chunked::from_vec("y".into(), ys);
    if [&xs, &ys].iter().any(|ca| ca.std(1).is_none_or(|s| s == 0.0)) {
        return f64::NAN;
    }

    cov::pearson_corr(&xs, &ys)
        .filter(|r| r.is_finite())
        .map_or(f64::NAN, |r| r.clamp(-1.0, 1.0))
}

/// Pairwise correlation matrix of `columns`, in the given order.
pub fn correlation_matrix<S: AsRef<str>>(df: &DataFrame, columns: &[S]) -> Result<CorrelationMatrix> {
    require_selection(columns, "correlation")?;
    require_columns(df, columns)?;
    if df.height() == 0 {
        return Err(IdmdError::EmptyInput("table has no rows".to_owned()));
    }

    let mut values = Vec::with_capacity(columns.len());
    for name in columns {
        values.push(numeric_values(get_column(df, name.as_ref())?)?);
    }

    let mut data = Vec::with_capacity(values.len());
    for x in &values {
        data.push(values.iter().map(|y| pearson(x, y)).collect());
    }

    Ok(CorrelationMatrix {
        columns: columns.iter().map(|c| c.as_ref().to_owned()).collect(),
        data,
    })
}

/// Annotated heatmap of the correlation matrix.
pub fn correlation_heatmap<S: AsRef<str>>(df: &DataFrame, columns: &[S]) -> Result<Figure> {
    let matrix = correlation_matrix(df, columns)?;
    tracing::debug!("Correlation heatmap of {} columns", matrix.columns.len());
    Ok(Figure::single(Pane::new(
        "Correlation Heatmap",
        PaneContent::Heatmap(matrix),
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_perfect_correlations() {
        let df = df!(
            "x" => [1.0, 2.0, 3.0, 4.0],
            "up" => [2.0, 4.0, 6.0, 8.0],
            "down" => [8.0, 6.0, 4.0, 2.0]
        )
        .unwrap();
        let m = correlation_matrix(&df, &["x", "up", "down"]).unwrap();

        assert!(close(m.get("x", "x").unwrap(), 1.0));
        assert!(close(m.get("x", "up").unwrap(), 1.0));
        assert!(close(m.get("x", "down").unwrap(), -1.0));
        assert_eq!(m.get("up", "down"), m.get("down", "up"));
    }

    #[test]
    fn test_pairwise_complete_rows() {
        let x = [Some(1.0), Some(2.0), None, Some(3.0)];
        let y = [Some(1.0), Some(2.0), Some(100.0), Some(3.0)];
        assert!(close(pearson(&x, &y), 1.0));

        let one_pair = [Some(1.0), None, Some(2.0)];
        let other = [Some(4.0), Some(5.0), None];
        assert!(pearson(&one_pair, &other).is_nan());
    }

    #[test]
    fn test_partial_correlation_value() {
        let x = [Some(1.0), Some(2.0), Some(3.0), Some(4.0)];
        let y = [Some(1.0), Some(3.0), Some(2.0), Some(4.0)];
        assert!(close(pearson(&x, &y), 0.8));
    }

    #[test]
    fn test_zero_variance_is_nan() {
        let df = df!("x" => [1.0, 2.0, 3.0], "c" => [5.0, 5.0, 5.0]).unwrap();
        let m = correlation_matrix(&df, &["x", "c"]).unwrap();
        assert!(m.get("x", "c").unwrap().is_nan());
        assert!(m.get("c", "c").unwrap().is_nan());
    }

    #[test]
    fn test_heatmap_figure() {
        let df = df!("a" => [1, 2, 3], "b" => [3, 1, 2]).unwrap();
        let figure = correlation_heatmap(&df, &["a", "b"]).unwrap();
        let pane = figure.pane(0).unwrap();
        assert_eq!(pane.title, "Correlation Heatmap");
        assert!(matches!(&pane.content, PaneContent::Heatmap(m) if m.columns.len() == 2));
    }

    #[test]
    fn test_heatmap_errors() {
        let df = df!("a" => [1.0, 2.0]).unwrap();
        let none: [&str; 0] = [];
        assert!(matches!(
            correlation_heatmap(&df, &none),
            Err(IdmdError::EmptyInput(_))
        ));
        assert!(matches!(
            correlation_heatmap(&df, &["a", "z"]),
            Err(IdmdError::ColumnNotFound(_))
        ));

        let empty = df.head(Some(0));
        assert!(matches!(
            correlation_heatmap(&empty, &["a"]),
            Err(IdmdError::EmptyInput(_))
        ));
    }
}
