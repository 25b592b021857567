//! Read and write tables as delimited files.

use std::fs::{self, File};
use std::io::BufWriter;
use std::path::Path;

use crate::error::{Result, RoadriskError};
use crate::input::{Parser, ParserConfig};

use super::frame::Table;
use super::value::render_cell;

impl Table {
    /// Write the table as CSV, creating parent directories as needed.
    ///
    /// Missing cells are written empty.
    pub fn write_csv(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        ensure_parent_dir(path)?;

        let file = File::create(path).map_err(|e| RoadriskError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        let mut writer = csv::Writer::from_writer(BufWriter::new(file));

        writer.write_record(self.columns().iter().map(|c| c.name.as_str()))?;
        for row in 0..self.row_count() {
            writer.write_record(self.row(row).into_iter().map(render_cell))?;
        }
        writer.flush().map_err(|e| RoadriskError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        Ok(())
    }

    /// Read a delimited file, typing each column by inspection.
    ///
    /// A header-only file yields a table with zero rows.
    pub fn read_csv(path: impl AsRef<Path>) -> Result<Self> {
        let parser = Parser::with_config(ParserConfig {
            allow_empty: true,
            ..ParserConfig::default()
        });
        let (raw, _) = parser.parse_file(path)?;
        Ok(Table::from_raw(&raw))
    }
}

/// Create the parent directory of `path` if it does not exist.
pub(crate) fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent).map_err(|e| {
                RoadriskError::Persistence(format!(
                    "Failed to create directory '{}': {}",
                    parent.display(),
                    e
                ))
            })?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::{Column, Value};
    use tempfile::TempDir;

    #[test]
    fn test_write_then_read_preserves_types() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("clean.csv");

        let table = Table::from_columns(vec![
            Column::new("state", vec![Some(Value::text("kerala")), None]),
            Column::new("year", vec![Some(Value::Integer(2021)), None]),
        ]);
        table.write_csv(&path).unwrap();

        let back = Table::read_csv(&path).unwrap();
        assert_eq!(back.column_names(), vec!["state", "year"]);
        assert_eq!(back.get(0, "year"), Some(&Value::Integer(2021)));
        assert_eq!(back.get(1, "state"), None);
    }

    #[test]
    fn test_read_missing_file_is_io_error() {
        let dir = TempDir::new().unwrap();
        let err = Table::read_csv(dir.path().join("absent.csv")).unwrap_err();
        assert!(matches!(err, RoadriskError::Io { .. }));
    }
}
