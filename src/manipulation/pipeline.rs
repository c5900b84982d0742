use super::columns::{drop_column, select_columns, swap_columns};
use super::replace::{ReplacementSpec, replace_values};
use crate::error::{Result, ResultExt as _};
use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};

/// One table edit, serializable so edit sequences can be saved and replayed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Operation {
    Swap { a: String, b: String },
    Drop { column: String },
    Select { columns: Vec<String> },
    Replace(ReplacementSpec),
}

impl Operation {
    pub fn apply(&self, df: &DataFrame) -> Result<DataFrame> {
        match self {
            Self::Swap { a, b } => swap_columns(df, a, b),
            Self::Drop { column } => drop_column(df, column),
            Self::Select { columns } => select_columns(df, columns.as_slice()),
            Self::Replace(spec) => replace_values(df, spec),
        }
    }

    pub fn description(&self) -> String {
        match self {
            Self::Swap { a, b } => format!("Swap columns '{a}' and '{b}'"),
            Self::Drop { column } => format!("Drop column '{column}'"),
            Self::Select { columns } => format!("Select columns: {}", columns.join(", ")),
            Self::Replace(spec) => format!(
                "Replace {} values in '{}' with {}",
                spec.selector, spec.column, spec.policy
            ),
        }
    }
}

/// Runs `ops` in order, stopping at the first failure.
pub fn apply_operations(df: &DataFrame, ops: &[Operation]) -> Result<DataFrame> {
    let mut result = df.clone();
    for (idx, op) in ops.iter().enumerate() {
        tracing::debug!("Applying operation {idx}: {}", op.description());
        result = op.apply(&result)?;
    }
    Ok(result)
}

/// An ordered list of operations with JSON persistence.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationPipeline {
    operations: Vec<Operation>,
}

impl OperationPipeline {
    pub fn new(operations: Vec<Operation>) -> Self {
        Self { operations }
    }

    pub fn add(&mut self, op: Operation) {
        self.operations.push(op);
    }

    pub fn apply(&self, df: &DataFrame) -> Result<DataFrame> {
        apply_operations(df, &self.operations)
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("Failed to serialize pipeline")
    }

    /// Accepts either `{"operations": [...]}` or a bare array of operations.
    pub fn from_json(json: &str) -> Result<Self> {
        if let Ok(operations) = serde_json::from_str::<Vec<Operation>>(json) {
            return Ok(Self::new(operations));
        }
        serde_json::from_str(json).context("Failed to deserialize pipeline")
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Operation> {
        self.operations.iter()
    }

    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::IdmdError;
    use crate::manipulation::replace::{ReplacementPolicy, ValueSelector};
    use crate::utils::column_names;
    use polars::prelude::*;

    fn sample() -> DataFrame {
        df!(
            "A" => [0, 2, 3, 0, 5],
            "B" => [1.0, 2.0, 3.0, 4.0, 5.0],
            "C" => ["a", "b", "c", "d", "e"]
        )
        .unwrap()
    }

    #[test]
    fn test_apply_operations_in_order() {
        let ops = vec![
            Operation::Replace(ReplacementSpec::new(
                "A",
                ValueSelector::Zero,
                ReplacementPolicy::Median,
            )),
            Operation::Swap {
                a: "A".to_owned(),
                b: "C".to_owned(),
            },
            Operation::Drop {
                column: "B".to_owned(),
            },
        ];
        let out = apply_operations(&sample(), &ops).unwrap();

        assert_eq!(column_names(&out), vec!["C", "A"]);
        let a: Vec<Option<i32>> = out
            .column("A")
            .unwrap()
            .as_materialized_series()
            .i32()
            .unwrap()
            .into_iter()
            .collect();
        assert_eq!(a, vec![Some(3), Some(2), Some(3), Some(3), Some(5)]);
    }

    #[test]
    fn test_stops_at_first_error() {
        let ops = vec![
            Operation::Drop {
                column: "B".to_owned(),
            },
            Operation::Select {
                columns: vec!["A".to_owned(), "B".to_owned()],
            },
        ];
        let result = apply_operations(&sample(), &ops);
        assert!(matches!(result, Err(IdmdError::ColumnNotFound(name)) if name == "B"));
    }

    #[test]
    fn test_operation_json_shape() {
        let op = Operation::Replace(ReplacementSpec::new(
            "A",
            ValueSelector::Outlier,
            ReplacementPolicy::RandomSample,
        ));
        let json = serde_json::to_value(&op).unwrap();
        assert_eq!(json["op"], "replace");
        assert_eq!(json["column"], "A");
        assert_eq!(json["selector"], "outlier");
        assert_eq!(json["policy"], "random_sample");
    }

    #[test]
    fn test_pipeline_from_json() {
        let json = r#"[
            {"op": "swap", "a": "A", "b": "B"},
            {"op": "select", "columns": ["B", "A"]},
            {"op": "replace", "column": "A", "selector": "zero", "policy": "max"}
        ]"#;
        let pipeline = OperationPipeline::from_json(json).unwrap();
        assert_eq!(pipeline.len(), 3);

        let out = pipeline.apply(&sample()).unwrap();
        assert_eq!(column_names(&out), vec!["B", "A"]);

        let reparsed = OperationPipeline::from_json(&pipeline.to_json().unwrap()).unwrap();
        assert_eq!(reparsed, pipeline);
    }

    #[test]
    fn test_description() {
        let op = Operation::Swap {
            a: "x".to_owned(),
            b: "y".to_owned(),
        };
        assert_eq!(op.description(), "Swap columns 'x' and 'y'");
    }
}
