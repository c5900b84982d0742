use crate::error::{IdmdError, Result};
use polars::prelude::*;

/// Formats an optional f64 to the given decimals, or returns "—" if None or non-finite.
pub fn fmt_opt(v: Option<f64>, decimals: usize) -> String {
    match v {
        Some(x) if x.is_finite() => format!("{x:.decimals$}"),
        _ => "—".to_owned(),
    }
}

/// Names of all columns, in table order.
pub fn column_names(df: &DataFrame) -> Vec<String> {
    df.get_column_names()
        .into_iter()
        .map(|s| s.to_string())
        .collect()
}

/// Names of numeric columns, in table order.
pub fn numeric_column_names(df: &DataFrame) -> Vec<String> {
    df.get_columns()
        .iter()
        .filter(|c| c.dtype().is_primitive_numeric())
        .map(|c| c.name().to_string())
        .collect()
}

/// Fails with `ColumnNotFound` on the first name absent from `df`.
pub fn require_columns<S: AsRef<str>>(df: &DataFrame, names: &[S]) -> Result<()> {
    for name in names {
        let name = name.as_ref();
        if df.column(name).is_err() {
            return Err(IdmdError::ColumnNotFound(name.to_owned()));
        }
    }
    Ok(())
}

/// Looks up a column, mapping absence to `ColumnNotFound`.
pub fn get_column<'a>(df: &'a DataFrame, name: &str) -> Result<&'a Column> {
    df.column(name)
        .map_err(|_| IdmdError::ColumnNotFound(name.to_owned()))
}

/// Numeric column values as `f64`; nulls and NaNs both become `None`.
pub fn numeric_values(col: &Column) -> Result<Vec<Option<f64>>> {
    if !col.dtype().is_primitive_numeric() {
        return Err(IdmdError::UnsupportedPolicy(format!(
            "column '{}' is not numeric ({})",
            col.name(),
            col.dtype()
        )));
    }
    let series = col.as_materialized_series().cast(&DataType::Float64)?;
    let ca = series.f64()?;
    Ok(ca
        .into_iter()
        .map(|v| v.filter(|x| !x.is_nan()))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fmt_opt() {
        assert_eq!(fmt_opt(Some(1.23456), 2), "1.23");
        assert_eq!(fmt_opt(Some(f64::NAN), 2), "—");
        assert_eq!(fmt_opt(None, 2), "—");
    }

    #[test]
    fn test_numeric_values_treats_nan_as_missing() {
        let s = Series::new("a".into(), vec![Some(1.0), None, Some(f64::NAN)]);
        let values = numeric_values(&Column::from(s)).unwrap();
        assert_eq!(values, vec![Some(1.0), None, None]);
    }

    #[test]
    fn test_numeric_column_names() {
        let df = df!(
            "a" => [1, 2],
            "b" => ["x", "y"],
            "c" => [1.5, 2.5]
        )
        .unwrap();
        assert_eq!(numeric_column_names(&df), vec!["a", "c"]);
        assert!(require_columns(&df, &["a", "b"]).is_ok());
        assert!(matches!(
            require_columns(&df, &["a", "z"]),
            Err(IdmdError::ColumnNotFound(name)) if name == "z"
        ));
    }
}
