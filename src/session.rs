//! Working state of one exploration: the dataset as loaded plus the edited
//! copy every operation acts on.

use crate::error::Result;
use crate::manipulation::Operation;
use polars::prelude::DataFrame;

#[derive(Clone, Debug)]
pub struct Session {
    original: DataFrame,
    current: DataFrame,
    history: Vec<Operation>,
}

impl Session {
    pub fn new(df: DataFrame) -> Self {
        Self {
            current: df.clone(),
            original: df,
            history: Vec::new(),
        }
    }

    pub fn current(&self) -> &DataFrame {
        &self.current
    }

    pub fn original(&self) -> &DataFrame {
        &self.original
    }

    /// Discards every applied operation.
    pub fn reset(&mut self) {
        self.current = self.original.clone();
        self.history.clear();
    }

    /// Applies `op` to the working copy. On failure the working copy is
    /// left as it was.
    pub fn apply(&mut self, op: &Operation) -> Result<&DataFrame> {
        let next = op.apply(&self.current)?;
        tracing::debug!("{}", op.description());
        self.current = next;
        self.history.push(op.clone());
        Ok(&self.current)
    }

    /// Applies `ops` in order. Operations before a failing one stay applied.
    pub fn apply_all(&mut self, ops: &[Operation]) -> Result<&DataFrame> {
        for op in ops {
            self.apply(op)?;
        }
        Ok(&self.current)
    }

    pub fn operations(&self) -> &[Operation] {
        &self.history
    }

    /// Human-readable descriptions of the applied operations, oldest first.
    pub fn history(&self) -> Vec<String> {
        self.history.iter().map(Operation::description).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::IdmdError;
    use crate::utils::column_names;
    use polars::prelude::*;

    fn sample() -> DataFrame {
        df!("A" => [1, 2], "B" => [3, 4], "C" => [5, 6]).unwrap()
    }

    fn drop(column: &str) -> Operation {
        Operation::Drop {
            column: column.to_owned(),
        }
    }

    #[test]
    fn test_apply_and_reset() {
        let mut session = Session::new(sample());
        session.apply(&drop("B")).unwrap();
        assert_eq!(column_names(session.current()), vec!["A", "C"]);
        assert_eq!(session.original().width(), 3);
        assert_eq!(session.history(), vec!["Drop column 'B'"]);

        session.reset();
        assert!(session.current().equals(&sample()));
        assert!(session.history().is_empty());
    }

    #[test]
    fn test_failed_apply_keeps_state() {
        let mut session = Session::new(sample());
        session.apply(&drop("B")).unwrap();

        let err = session.apply(&drop("B")).unwrap_err();
        assert!(matches!(err, IdmdError::ColumnNotFound(_)));
        assert_eq!(column_names(session.current()), vec!["A", "C"]);
        assert_eq!(session.operations().len(), 1);
    }

    #[test]
    fn test_apply_all_partial() {
        let mut session = Session::new(sample());
        let result = session.apply_all(&[drop("A"), drop("Z"), drop("B")]);
        assert!(result.is_err());
        assert_eq!(column_names(session.current()), vec!["B", "C"]);
    }
}
