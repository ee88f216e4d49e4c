//! Reading tables of reactions to insert into a model
//!
//! A reaction table is a CSV file with the columns
//! `RxnID, RxnName, RxnFormula, Subsystem, LowerBound, UpperBound`. Whitespace around fields is
//! ignored, and empty bound fields fall back to the bounds implied by the formula arrow.
use std::collections::HashSet;
use std::path::Path;

use log::{debug, info};
use serde::Deserialize;
use thiserror::Error;

use crate::metabolic_model::model::Model;
use crate::metabolic_model::ModelError;

/// A single row of a reaction table
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct ReactionRecord {
    #[serde(rename = "RxnID")]
    pub id: String,
    #[serde(rename = "RxnName", default)]
    pub name: Option<String>,
    #[serde(rename = "RxnFormula")]
    pub formula: String,
    #[serde(rename = "Subsystem", default)]
    pub subsystem: Option<String>,
    #[serde(rename = "LowerBound", default)]
    pub lower_bound: Option<f64>,
    #[serde(rename = "UpperBound", default)]
    pub upper_bound: Option<f64>,
}

/// Read all records from a reaction table, erroring on repeated reaction ids
pub fn read_reaction_table<P: AsRef<Path>>(path: P) -> Result<Vec<ReactionRecord>, ReactionTableError> {
    let path = path.as_ref();
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|err| ReactionTableError::UnableToRead(format!("{}: {}", path.display(), err)))?;
    let mut records = Vec::new();
    let mut seen = HashSet::new();
    for record in reader.deserialize() {
        let record: ReactionRecord = record?;
        if !seen.insert(record.id.clone()) {
            return Err(ReactionTableError::DuplicateId(record.id));
        }
        records.push(record);
    }
    debug!("Read {} reactions from {}", records.len(), path.display());
    Ok(records)
}

impl Model {
    /// Add every reaction of a reaction table to the model, in file order
    ///
    /// Returns the ids of the added reactions. Adding stops at the first reaction which can't
    /// be added; when called inside a [scope](crate::metabolic_model::scope) the reactions
    /// already added are removed again with it.
    pub fn add_reactions_from_table<P: AsRef<Path>>(
        &mut self,
        path: P,
    ) -> Result<Vec<String>, ReactionTableError> {
        let records = read_reaction_table(&path)?;
        self.add_reaction_records(&records)?;
        info!(
            "Added {} reactions from {}",
            records.len(),
            path.as_ref().display()
        );
        Ok(records.into_iter().map(|r| r.id).collect())
    }

    /// Add already parsed reaction records to the model
    pub fn add_reaction_records(&mut self, records: &[ReactionRecord]) -> Result<(), ModelError> {
        for record in records {
            self.add_reaction_from_formula(
                &record.id,
                record.name.as_deref(),
                &record.formula,
                record.subsystem.as_deref(),
                record.lower_bound,
                record.upper_bound,
            )?;
        }
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum ReactionTableError {
    #[error("Unable to read reaction table {0}")]
    UnableToRead(String),
    #[error("Malformed reaction table row: {0}")]
    MalformedRow(#[from] csv::Error),
    #[error("Reaction {0} appears more than once in the reaction table")]
    DuplicateId(String),
    #[error("Unable to add reaction to model: {0}")]
    Model(#[from] ModelError),
}
