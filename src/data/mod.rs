pub mod generator;
pub mod io;
pub mod stats;

pub use generator::{Distribution, generate, generate_with_rng};
pub use io::{load_csv_bytes, load_df, save_csv, to_csv_string};
pub use stats::{
    ColumnInfo, SummaryStats, TextTable, column_info, column_info_table, describe, preview,
    summary_table,
};
