//! Labelled tables of numeric results
use std::fmt::{Display, Formatter};
use std::path::Path;

use indexmap::{IndexMap, IndexSet};
use log::info;
use prettytable::{Cell, Row, Table};

use crate::workflows::{round_to, WorkflowError};

/// A table of `f64` values with labelled rows and columns
///
/// Rows and columns keep the order in which they were first set. Cells which were never set
/// read as NaN.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ResultTable {
    /// Header of the row label column
    pub index_name: String,
    columns: IndexSet<String>,
    rows: IndexMap<String, IndexMap<String, f64>>,
}

impl ResultTable {
    pub fn new(index_name: &str) -> Self {
        ResultTable {
            index_name: index_name.to_string(),
            ..Default::default()
        }
    }

    pub fn set(&mut self, row: &str, column: &str, value: f64) {
        self.columns.insert(column.to_string());
        self.rows
            .entry(row.to_string())
            .or_default()
            .insert(column.to_string(), value);
    }

    pub fn get(&self, row: &str, column: &str) -> f64 {
        self.rows
            .get(row)
            .and_then(|r| r.get(column))
            .copied()
            .unwrap_or(f64::NAN)
    }

    pub fn row_labels(&self) -> impl Iterator<Item = &str> {
        self.rows.keys().map(|r| r.as_str())
    }

    pub fn column_labels(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.as_str())
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.columns.contains(column)
    }

    /// Values of a row in column order
    pub fn row(&self, row: &str) -> Vec<f64> {
        self.columns.iter().map(|c| self.get(row, c)).collect()
    }

    /// Values of a column in row order
    pub fn column(&self, column: &str) -> Vec<f64> {
        self.rows.keys().map(|r| self.get(r, column)).collect()
    }

    /// Round every value in place
    pub fn round(&mut self, decimals: u32) {
        for row in self.rows.values_mut() {
            for value in row.values_mut() {
                *value = round_to(*value, decimals);
            }
        }
    }

    /// Express every value as a percentage of the value in `column` of the same row
    pub fn normalize_to_column(&self, column: &str) -> Result<ResultTable, WorkflowError> {
        if !self.has_column(column) {
            return Err(WorkflowError::UnknownVariant(column.to_string()));
        }
        let mut normalized = ResultTable::new(&self.index_name);
        for row in self.rows.keys() {
            let reference = self.get(row, column);
            for col in &self.columns {
                normalized.set(row, col, self.get(row, col) / reference * 100.);
            }
        }
        Ok(normalized)
    }

    /// Write the table as CSV, with NaN cells left empty
    pub fn write_csv<P: AsRef<Path>>(&self, path: P) -> Result<(), WorkflowError> {
        let path = path.as_ref();
        let unable = |err: &dyn std::fmt::Display| {
            WorkflowError::UnableToWrite(format!("{}: {}", path.display(), err))
        };
        let mut writer = csv::Writer::from_path(path).map_err(|e| unable(&e))?;
        let mut header = vec![self.index_name.clone()];
        header.extend(self.columns.iter().cloned());
        writer.write_record(&header).map_err(|e| unable(&e))?;
        for row in self.rows.keys() {
            let mut record = vec![row.clone()];
            record.extend(self.row(row).into_iter().map(|v| match v.is_nan() {
                true => String::new(),
                false => v.to_string(),
            }));
            writer.write_record(&record).map_err(|e| unable(&e))?;
        }
        writer.flush().map_err(|e| unable(&e))?;
        info!("Results written to {}", path.display());
        Ok(())
    }
}

impl Display for ResultTable {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let mut table = Table::new();
        let mut header = vec![Cell::new(&self.index_name)];
        header.extend(self.columns.iter().map(|c| Cell::new(c)));
        table.add_row(Row::new(header));
        for row in self.rows.keys() {
            let mut cells = vec![Cell::new(row)];
            cells.extend(self.row(row).iter().map(|v| Cell::new(&format!("{}", v))));
            table.add_row(Row::new(cells));
        }
        write!(f, "{}", table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn yields() -> ResultTable {
        let mut table = ResultTable::new("product");
        table.set("biomass", "RuMP", 0.4);
        table.set("biomass", "EuMP", 0.5);
        table.set("pyr_c", "RuMP", 2.);
        table.set("pyr_c", "EuMP", 1.);
        table
    }

    #[test]
    fn set_and_get() {
        let mut table = yields();
        assert_eq!(table.get("pyr_c", "RuMP"), 2.);
        assert!(table.get("pyr_c", "XuMP").is_nan());
        table.set("akg_c", "XuMP", 1.5);
        assert_eq!(
            table.column_labels().collect::<Vec<_>>(),
            vec!["RuMP", "EuMP", "XuMP"]
        );
        assert!(table.row("biomass")[2].is_nan());
        assert_eq!(table.column("RuMP")[..2], [0.4, 2.]);
    }

    #[test]
    fn normalize_and_round() {
        let mut normalized = yields().normalize_to_column("RuMP").unwrap();
        normalized.round(1);
        assert_eq!(normalized.row("biomass"), vec![100., 125.]);
        assert_eq!(normalized.row("pyr_c"), vec![100., 50.]);
        assert!(matches!(
            yields().normalize_to_column("XuMP"),
            Err(WorkflowError::UnknownVariant(_))
        ));
    }

    #[test]
    fn csv_and_display() {
        let mut table = yields();
        table.set("oaa_c", "XuMP", 3.);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("yields.csv");
        table.write_csv(&path).unwrap();
        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines[0], "product,RuMP,EuMP,XuMP");
        assert_eq!(lines[1], "biomass,0.4,0.5,");
        assert_eq!(lines[3], "oaa_c,,,3");

        let rendered = table.to_string();
        assert!(rendered.contains("RuMP"));
        assert!(rendered.contains("oaa_c"));
    }
}
