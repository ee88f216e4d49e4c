//! Minimal reader for SBtab documents, the tab separated format used to describe pathways
//! for thermodynamic analysis
//!
//! A document is a sequence of tables. Each table starts with a declaration line such as
//! `!!SBtab TableID='Flux' TableType='Quantity' Unit='mM/s'`, followed by a header line of
//! column names prefixed with `!` and then the data rows. Lines starting with `%` and blank
//! lines are ignored.
use std::io::Read;
use std::path::Path;
use std::sync::LazyLock;

use indexmap::IndexMap;
use log::debug;
use regex::Regex;
use thiserror::Error;

static ATTRIBUTE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(\w+)\s*=\s*['"]([^'"]*)['"]"#).expect("attribute pattern is valid")
});

/// A single table of an SBtab document
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SbtabTable {
    /// Attributes from the declaration line, e.g. `TableID`, `TableType` and `Unit`
    pub attributes: IndexMap<String, String>,
    /// Column names, without the leading `!`
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl SbtabTable {
    pub fn table_id(&self) -> &str {
        self.attributes
            .get("TableID")
            .map(|s| s.as_str())
            .unwrap_or_default()
    }

    pub fn table_type(&self) -> Option<&str> {
        self.attributes.get("TableType").map(|s| s.as_str())
    }

    pub fn unit(&self) -> Option<&str> {
        self.attributes.get("Unit").map(|s| s.as_str())
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }

    /// Position of a column, erroring if the table doesn't have it
    pub fn column_index(&self, column: &str) -> Result<usize, SbtabError> {
        self.columns
            .iter()
            .position(|c| c == column)
            .ok_or_else(|| SbtabError::MissingColumn {
                table: self.table_id().to_string(),
                column: column.to_string(),
            })
    }

    /// Value of a cell, None when the cell is empty or the row is too short
    pub fn get(&self, row: usize, column: &str) -> Result<Option<&str>, SbtabError> {
        let index = self.column_index(column)?;
        Ok(self
            .rows
            .get(row)
            .and_then(|r| r.get(index))
            .map(|v| v.as_str())
            .filter(|v| !v.is_empty()))
    }

    /// Value of a cell which must be present
    pub fn require(&self, row: usize, column: &str) -> Result<&str, SbtabError> {
        self.get(row, column)?.ok_or_else(|| SbtabError::MissingValue {
            table: self.table_id().to_string(),
            column: column.to_string(),
            row: row + 1,
        })
    }

    /// Numeric value of a cell, None when the cell is empty
    pub fn get_f64(&self, row: usize, column: &str) -> Result<Option<f64>, SbtabError> {
        self.get(row, column)?
            .map(|value| {
                value.parse::<f64>().map_err(|_| SbtabError::InvalidNumber {
                    table: self.table_id().to_string(),
                    column: column.to_string(),
                    value: value.to_string(),
                })
            })
            .transpose()
    }

    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }
}

/// Tables of an SBtab document keyed by their `TableID`
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SbtabDocument {
    pub tables: IndexMap<String, SbtabTable>,
}

impl SbtabDocument {
    /// Read an SBtab document from a file
    pub fn read<P: AsRef<Path>>(path: P) -> Result<Self, SbtabError> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)
            .map_err(|err| SbtabError::UnableToRead(format!("{}: {}", path.display(), err)))?;
        let document = Self::from_reader(file)?;
        debug!(
            "Read SBtab document {} with tables {:?}",
            path.display(),
            document.tables.keys().collect::<Vec<_>>()
        );
        Ok(document)
    }

    /// Parse an SBtab document from any reader
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, SbtabError> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(b'\t')
            .has_headers(false)
            .flexible(true)
            .quoting(false)
            .comment(Some(b'%'))
            .from_reader(reader);
        let mut document = SbtabDocument::default();
        let mut current: Option<SbtabTable> = None;
        for record in reader.records() {
            let record = record?;
            let line = record.position().map(|p| p.line()).unwrap_or_default();
            let fields: Vec<String> = record.iter().map(|f| f.trim().to_string()).collect();
            let first = match fields.first() {
                Some(first) => first.as_str(),
                None => continue,
            };
            if fields.iter().all(|f| f.is_empty()) {
                continue;
            }
            if first.starts_with("!!") {
                if let Some(table) = current.take() {
                    document.insert(table);
                }
                let declaration = fields.join(" ");
                let attributes: IndexMap<String, String> = ATTRIBUTE_RE
                    .captures_iter(&declaration)
                    .map(|caps| (caps[1].to_string(), caps[2].to_string()))
                    .collect();
                if !attributes.contains_key("TableID") {
                    return Err(SbtabError::MissingTableId(line));
                }
                current = Some(SbtabTable {
                    attributes,
                    ..Default::default()
                });
            } else if first.starts_with('!') {
                let table = current
                    .as_mut()
                    .ok_or(SbtabError::MissingTableDeclaration(line))?;
                table.columns = fields
                    .iter()
                    .filter(|f| !f.is_empty())
                    .map(|f| f.trim_start_matches('!').to_string())
                    .collect();
            } else {
                let table = current
                    .as_mut()
                    .ok_or(SbtabError::MissingTableDeclaration(line))?;
                if table.columns.is_empty() {
                    return Err(SbtabError::MissingColumns(table.table_id().to_string()));
                }
                table.rows.push(fields);
            }
        }
        if let Some(table) = current.take() {
            document.insert(table);
        }
        Ok(document)
    }

    fn insert(&mut self, table: SbtabTable) {
        self.tables.insert(table.table_id().to_string(), table);
    }

    pub fn table(&self, table_id: &str) -> Option<&SbtabTable> {
        self.tables.get(table_id)
    }

    /// Table which must be present in the document
    pub fn require_table(&self, table_id: &str) -> Result<&SbtabTable, SbtabError> {
        self.table(table_id)
            .ok_or_else(|| SbtabError::MissingTable(table_id.to_string()))
    }
}

#[derive(Clone, Debug, Error, PartialEq)]
pub enum SbtabError {
    #[error("Unable to read SBtab file {0}")]
    UnableToRead(String),
    #[error("Malformed SBtab file: {0}")]
    Malformed(String),
    #[error("Line {0} appears before any !!SBtab table declaration")]
    MissingTableDeclaration(u64),
    #[error("Table declaration on line {0} has no TableID")]
    MissingTableId(u64),
    #[error("Table {0} has data rows before its column header line")]
    MissingColumns(String),
    #[error("Document has no table {0}")]
    MissingTable(String),
    #[error("Table {table} has no column {column}")]
    MissingColumn { table: String, column: String },
    #[error("Table {table} is missing a value for {column} in row {row}")]
    MissingValue {
        table: String,
        column: String,
        row: usize,
    },
    #[error("Table {table} has non numeric value '{value}' in column {column}")]
    InvalidNumber {
        table: String,
        column: String,
        value: String,
    },
}

impl From<csv::Error> for SbtabError {
    fn from(value: csv::Error) -> Self {
        SbtabError::Malformed(value.to_string())
    }
}
