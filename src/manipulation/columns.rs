use crate::error::Result;
use crate::utils::{column_names, require_columns};
use polars::prelude::*;

/// Exchanges the positions of two columns; everything else stays in place.
///
/// Swapping a column with itself returns the table unchanged.
pub fn swap_columns(df: &DataFrame, a: &str, b: &str) -> Result<DataFrame> {
    require_columns(df, &[a, b])?;

    let mut order = column_names(df);
    let ia = order.iter().position(|n| n == a);
    let ib = order.iter().position(|n| n == b);
    if let (Some(ia), Some(ib)) = (ia, ib) {
        order.swap(ia, ib);
    }

    tracing::debug!("Swapping columns '{a}' and '{b}'");
    Ok(df.select(order.iter().map(String::as_str))?)
}

pub fn drop_column(df: &DataFrame, name: &str) -> Result<DataFrame> {
    require_columns(df, &[name])?;
    tracing::debug!("Dropping column '{name}'");
    Ok(df.drop(name)?)
}

/// Projects onto `names`, in the given order. Repeated names keep their
/// first occurrence.
pub fn select_columns<S: AsRef<str>>(df: &DataFrame, names: &[S]) -> Result<DataFrame> {
    require_columns(df, names)?;

    let mut unique: Vec<&str> = Vec::with_capacity(names.len());
    for name in names {
        let name = name.as_ref();
        if !unique.contains(&name) {
            unique.push(name);
        }
    }

    tracing::debug!("Selecting {} columns", unique.len());
    Ok(df.select(unique)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::IdmdError;

    fn same(a: &DataFrame, b: &DataFrame, name: &str) -> bool {
        a.column(name)
            .unwrap()
            .as_materialized_series()
            .equals_missing(b.column(name).unwrap().as_materialized_series())
    }

    fn sample() -> DataFrame {
        df!("A" => [1, 2], "B" => [3, 4], "C" => [5, 6]).unwrap()
    }

    #[test]
    fn test_swap_columns() {
        let df = sample();
        let swapped = swap_columns(&df, "A", "B").unwrap();

        assert_eq!(column_names(&swapped), vec!["B", "A", "C"]);
        assert!(same(&swapped, &df, "A"));
        assert!(same(&swapped, &df, "B"));
    }

    #[test]
    fn test_swap_is_involution() {
        let df = sample();
        let twice = swap_columns(&swap_columns(&df, "A", "C").unwrap(), "A", "C").unwrap();
        assert!(twice.equals(&df));
    }

    #[test]
    fn test_swap_with_itself() {
        let df = sample();
        assert!(swap_columns(&df, "B", "B").unwrap().equals(&df));
    }

    #[test]
    fn test_swap_missing_column() {
        let result = swap_columns(&sample(), "A", "Z");
        assert!(matches!(result, Err(IdmdError::ColumnNotFound(name)) if name == "Z"));
    }

    #[test]
    fn test_drop_column() {
        let df = sample();
        let dropped = drop_column(&df, "B").unwrap();

        assert_eq!(column_names(&dropped), vec!["A", "C"]);
        assert_eq!(dropped.height(), 2);
        assert!(same(&dropped, &df, "C"));
    }

    #[test]
    fn test_drop_missing_column() {
        assert!(matches!(
            drop_column(&sample(), "Z"),
            Err(IdmdError::ColumnNotFound(_))
        ));
    }

    #[test]
    fn test_select_columns() {
        let selected = select_columns(&sample(), &["C", "A"]).unwrap();
        assert_eq!(column_names(&selected), vec!["C", "A"]);
        assert_eq!(selected.shape(), (2, 2));
    }

    #[test]
    fn test_select_collapses_duplicates() {
        let selected = select_columns(&sample(), &["A", "C", "A"]).unwrap();
        assert_eq!(column_names(&selected), vec!["A", "C"]);
    }

    #[test]
    fn test_select_missing_column() {
        assert!(matches!(
            select_columns(&sample(), &["A", "Z"]),
            Err(IdmdError::ColumnNotFound(name)) if name == "Z"
        ));
    }
}
