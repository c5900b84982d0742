//! Tabular summaries of a dataset: head preview, descriptive statistics and
//! per-column metadata.

use crate::error::Result;
use crate::utils::{fmt_opt, numeric_values};
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// A grid of already-formatted cells with a header row.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextTable {
    pub title: String,
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl TextTable {
    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn n_cols(&self) -> usize {
        self.header.len()
    }

    /// Renders a Markdown table preceded by the title as a heading.
    pub fn to_markdown(&self) -> String {
        let mut md = String::new();
        if !self.title.is_empty() {
            md.push_str(&format!("### {}\n\n", self.title));
        }
        md.push_str(&format!("| {} |\n", self.header.join(" | ")));
        md.push_str(&format!(
            "|{}\n",
            self.header.iter().map(|_| "---|").collect::<String>()
        ));
        for row in &self.rows {
            let cells: Vec<String> = row.iter().map(|c| c.replace('|', "\\|")).collect();
            md.push_str(&format!("| {} |\n", cells.join(" | ")));
        }
        md
    }
}

/// First `n` rows of the table, rendered as text. Missing values show as "—".
pub fn preview(df: &DataFrame, n: usize) -> Result<TextTable> {
    let head = df.head(Some(n));
    let mut columns = Vec::with_capacity(head.width());
    for col in head.get_columns() {
        let as_text = col.as_materialized_series().cast(&DataType::String)?;
        let cells: Vec<String> = as_text
            .str()?
            .into_iter()
            .map(|v| v.map_or_else(|| "—".to_owned(), str::to_owned))
            .collect();
        columns.push(cells);
    }

    let rows = (0..head.height())
        .map(|i| {
            columns
                .iter()
                .map(|c| c.get(i).cloned().unwrap_or_default())
                .collect()
        })
        .collect();

    Ok(TextTable {
        title: "Data Preview".to_owned(),
        header: crate::utils::column_names(&head),
        rows,
    })
}

/// Descriptive statistics of one numeric column, over its non-missing values.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SummaryStats {
    pub column: String,
    pub count: usize,
    pub mean: Option<f64>,
    pub std: Option<f64>,
    pub min: Option<f64>,
    pub q1: Option<f64>,
    pub median: Option<f64>,
    pub q3: Option<f64>,
    pub max: Option<f64>,
}

impl SummaryStats {
    pub fn from_values(column: &str, values: &[f64]) -> Self {
        let ca = Float64Chunked::from_slice(column.into(), values);
        Self {
            column: column.to_owned(),
            count: values.len(),
            mean: ca.mean(),
            std: ca.std(1),
            min: ca.min(),
            q1: ca.quantile(0.25, QuantileMethod::Linear).unwrap_or(None),
            median: ca.median(),
            q3: ca.quantile(0.75, QuantileMethod::Linear).unwrap_or(None),
            max: ca.max(),
        }
    }
}

/// Statistics for every numeric column, in table order.
pub fn describe(df: &DataFrame) -> Result<Vec<SummaryStats>> {
    let mut out = Vec::new();
    for col in df.get_columns() {
        if !col.dtype().is_primitive_numeric() {
            continue;
        }
        let values: Vec<f64> = numeric_values(col)?.into_iter().flatten().collect();
        out.push(SummaryStats::from_values(col.name(), &values));
    }
    Ok(out)
}

/// Lays statistics out the way `describe()` tables usually read: one row per
/// statistic, one column per dataset column.
pub fn summary_table(stats: &[SummaryStats], decimals: usize) -> TextTable {
    let mut header = vec![String::new()];
    header.extend(stats.iter().map(|s| s.column.clone()));

    let fields: [(&str, fn(&SummaryStats) -> Option<f64>); 7] = [
        ("mean", |s| s.mean),
        ("std", |s| s.std),
        ("min", |s| s.min),
        ("25%", |s| s.q1),
        ("50%", |s| s.median),
        ("75%", |s| s.q3),
        ("max", |s| s.max),
    ];

    let mut rows = Vec::with_capacity(fields.len() + 1);
    let mut count_row = vec!["count".to_owned()];
    count_row.extend(stats.iter().map(|s| s.count.to_string()));
    rows.push(count_row);

    for (label, get) in fields {
        let mut row = vec![label.to_owned()];
        row.extend(stats.iter().map(|s| fmt_opt(get(s), decimals)));
        rows.push(row);
    }

    TextTable {
        title: "Summary Statistics".to_owned(),
        header,
        rows,
    }
}

/// Name, type and null counts of one column.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnInfo {
    pub name: String,
    pub dtype: String,
    pub non_null: usize,
    pub nulls: usize,
}

pub fn column_info(df: &DataFrame) -> Vec<ColumnInfo> {
    df.get_columns()
        .iter()
        .map(|col| {
            let nulls = col.null_count();
            ColumnInfo {
                name: col.name().to_string(),
                dtype: col.dtype().to_string(),
                non_null: col.len() - nulls,
                nulls,
            }
        })
        .collect()
}

pub fn column_info_table(info: &[ColumnInfo]) -> TextTable {
    TextTable {
        title: "Column Metadata".to_owned(),
        header: vec![
            "Column".to_owned(),
            "Dtype".to_owned(),
            "Non-Null".to_owned(),
            "Null".to_owned(),
        ],
        rows: info
            .iter()
            .map(|c| {
                vec![
                    c.name.clone(),
                    c.dtype.clone(),
                    c.non_null.to_string(),
                    c.nulls.to_string(),
                ]
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_basic() {
        let df = df!("a" => [1.0, 2.0, 3.0, 4.0], "label" => ["w", "x", "y", "z"]).unwrap();
        let stats = describe(&df).unwrap();

        assert_eq!(stats.len(), 1, "text columns are skipped");
        let a = &stats[0];
        assert_eq!(a.count, 4);
        assert_eq!(a.mean, Some(2.5));
        assert_eq!(a.median, Some(2.5));
        assert_eq!(a.min, Some(1.0));
        assert_eq!(a.max, Some(4.0));
        assert_eq!(a.q1, Some(1.75));
    }

    #[test]
    fn test_describe_ignores_missing() {
        let df = df!("a" => [Some(1.0), None, Some(3.0)]).unwrap();
        let stats = describe(&df).unwrap();
        assert_eq!(stats[0].count, 2);
        assert_eq!(stats[0].mean, Some(2.0));
    }

    #[test]
    fn test_summary_table_rounding() {
        let df = df!("a" => [1.0, 2.0, 2.0]).unwrap();
        let table = summary_table(&describe(&df).unwrap(), 2);
        assert_eq!(table.header, vec!["", "a"]);
        assert_eq!(table.rows[0], vec!["count", "3"]);
        assert_eq!(table.rows[1], vec!["mean", "1.67"]);
        assert_eq!(table.n_rows(), 8);
    }

    #[test]
    fn test_preview_head() {
        let df = df!("a" => [Some(1), None, Some(3)], "b" => ["x", "y", "z"]).unwrap();
        let table = preview(&df, 2).unwrap();
        assert_eq!(table.header, vec!["a", "b"]);
        assert_eq!(table.rows, vec![vec!["1", "x"], vec!["—", "y"]]);
    }

    #[test]
    fn test_column_info() {
        let df = df!("a" => [Some(1), None], "b" => ["x", "y"]).unwrap();
        let info = column_info(&df);
        assert_eq!(info[0].nulls, 1);
        assert_eq!(info[0].non_null, 1);
        assert_eq!(info[1].nulls, 0);
        assert_eq!(column_info_table(&info).n_rows(), 2);
    }

    #[test]
    fn test_markdown_render() {
        let table = TextTable {
            title: "T".to_owned(),
            header: vec!["a".to_owned(), "b".to_owned()],
            rows: vec![vec!["1".to_owned(), "x|y".to_owned()]],
        };
        let md = table.to_markdown();
        assert!(md.starts_with("### T"));
        assert!(md.contains("| a | b |"));
        assert!(md.contains("|---|---|"));
        assert!(md.contains("| 1 | x\\|y |"));
    }
}
