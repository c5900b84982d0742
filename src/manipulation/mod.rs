//! Table edits: column reordering and removal, value replacement, and
//! replayable sequences of both.

pub mod columns;
pub mod pipeline;
pub mod replace;

pub use columns::{drop_column, select_columns, swap_columns};
pub use pipeline::{Operation, OperationPipeline, apply_operations};
pub use replace::{
    OutlierBounds, ReplacementPolicy, ReplacementSpec, ValueSelector, iqr_bounds, replace_values,
    replace_values_with_rng,
};
