use crate::error::{IdmdError, Result, ResultExt as _};
use polars::prelude::*;
use std::io::Cursor;
use std::path::Path;

fn extension(path: &Path) -> String {
    path.extension()
        .and_then(|s| s.to_str())
        .unwrap_or("")
        .to_lowercase()
}

/// Loads a table from a CSV, Parquet or JSON file, chosen by extension.
pub fn load_df(path: &Path) -> Result<DataFrame> {
    let ext = extension(path);

    let failed = |what: &str| format!("Failed to read {what} {}", path.display());
    let df = match ext.as_str() {
        "csv" => LazyCsvReader::new(path)
            .with_infer_schema_length(Some(10000))
            .with_has_header(true)
            .finish()
            .and_then(|lf| lf.collect())
            .with_context(|| failed("CSV"))?,
        "parquet" => std::fs::File::open(path)
            .map_err(IdmdError::from)
            .and_then(|file| Ok(ParquetReader::new(file).finish()?))
            .with_context(|| failed("Parquet"))?,
        "json" => std::fs::File::open(path)
            .map_err(IdmdError::from)
            .and_then(|file| Ok(JsonReader::new(file).finish()?))
            .with_context(|| failed("JSON"))?,
        _ => return Err(IdmdError::UnsupportedFormat(ext)),
    };

    tracing::debug!(
        "Loaded {} ({} rows, {} columns)",
        path.display(),
        df.height(),
        df.width()
    );
    Ok(df)
}

/// Parses CSV bytes, e.g. an uploaded file held in memory.
pub fn load_csv_bytes(bytes: &[u8]) -> Result<DataFrame> {
    CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(10000))
        .into_reader_with_file_handle(Cursor::new(bytes.to_vec()))
        .finish()
        .context("Failed to parse CSV data")
}

/// Serializes the table as CSV: a header row, then one line per row.
pub fn to_csv_string(df: &DataFrame) -> Result<String> {
    let mut df = df.clone();
    let mut buf = Vec::new();
    CsvWriter::new(&mut buf)
        .include_header(true)
        .finish(&mut df)
        .context("Failed to write CSV")?;
    String::from_utf8(buf).map_err(|e| IdmdError::DataProcessing(e.to_string()))
}

pub fn save_csv(df: &DataFrame, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }
    let mut df = df.clone();
    let file = std::fs::File::create(path).context("Failed to create CSV file")?;
    CsvWriter::new(file)
        .include_header(true)
        .finish(&mut df)
        .context("Failed to write CSV file")?;
    tracing::debug!("Wrote {} rows to {}", df.height(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_to_csv_creates_valid_csv() {
        let df = df!("col1" => [1, 2, 3], "col2" => [4, 5, 6]).unwrap();
        let csv = to_csv_string(&df).unwrap();

        assert!(csv.contains("col1,col2"));
        assert!(csv.contains("1,4"));
        assert!(csv.contains("2,5"));
        assert!(csv.contains("3,6"));
    }

    #[test]
    fn test_csv_bytes_round_trip() {
        let df = df!("a" => [1.5, 2.5], "b" => ["x", "y"]).unwrap();
        let csv = to_csv_string(&df).unwrap();
        let parsed = load_csv_bytes(csv.as_bytes()).unwrap();
        assert!(parsed.equals(&df));
    }

    #[test]
    fn test_save_and_load_csv() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("data.csv");
        let df = df!("a" => [1, 2], "b" => [3, 4]).unwrap();
        save_csv(&df, &path).unwrap();
        let loaded = load_df(&path).unwrap();
        assert_eq!(loaded.shape(), (2, 2));
    }

    #[test]
    fn test_missing_file_names_the_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.csv");
        let err = load_df(&path).unwrap_err();

        assert!(matches!(err, IdmdError::Other(_)));
        let msg = err.to_string();
        assert!(msg.starts_with("Failed to read CSV"), "{msg}");
        assert!(msg.contains("absent.csv"), "{msg}");
    }

    #[test]
    fn test_unsupported_extension() {
        let result = load_df(Path::new("data.xlsx"));
        assert!(matches!(result, Err(IdmdError::UnsupportedFormat(ext)) if ext == "xlsx"));
    }
}
