//! Tab-separated table reading and writing.
//!
//! Every canonical table is UTF-8 with one header row, tab-separated and
//! unquoted. Fields therefore must not contain tabs or newlines; nothing is
//! escaped on the way out, so writing then reading reproduces the input
//! bytes for unchanged fields.

use std::fs;
use std::io::Write;
use std::path::Path;

use crate::{Error, Result};

/// An in-memory tab-separated table: one header row plus data rows.
#[derive(Debug, Clone)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    /// Read a table from `path`.
    ///
    /// Fails with a format error if the file is empty (no header row) or if
    /// any data row has a different number of fields than the header.
    pub fn read(path: &Path) -> Result<Table> {
        let content = fs::read_to_string(path)?;
        let mut lines = content.lines();

        let header = lines
            .next()
            .ok_or_else(|| Error::format(format!("'{}' has no header row", path.display())))?;
        let columns: Vec<String> = header.split('\t').map(str::to_string).collect();

        let mut rows = Vec::new();
        for (lineno, line) in lines.enumerate() {
            if line.is_empty() {
                continue;
            }
            let fields: Vec<String> = line.split('\t').map(str::to_string).collect();
            if fields.len() != columns.len() {
                return Err(Error::format(format!(
                    "'{}' row {} has {} fields, header has {}",
                    path.display(),
                    lineno + 2,
                    fields.len(),
                    columns.len()
                )));
            }
            rows.push(fields);
        }

        Ok(Table { columns, rows })
    }

    /// Column names in header order.
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Data rows in table order.
    #[must_use]
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Index of a named column, or a format error if the header lacks it.
    pub fn column_index(&self, name: &str) -> Result<usize> {
        self.columns
            .iter()
            .position(|c| c == name)
            .ok_or_else(|| Error::format(format!("missing column '{}'", name)))
    }

    /// The value of column `name` in `row`.
    pub fn value<'a>(&self, row: &'a [String], name: &str) -> Result<&'a str> {
        Ok(row[self.column_index(name)?].as_str())
    }
}

/// Write a table to `path`, replacing any existing file.
pub fn write_table(path: &Path, columns: &[&str], rows: &[Vec<String>]) -> Result<()> {
    let mut file = fs::File::create(path)?;
    writeln!(file, "{}", columns.join("\t"))?;
    for row in rows {
        writeln!(file, "{}", row.join("\t"))?;
    }
    Ok(())
}
