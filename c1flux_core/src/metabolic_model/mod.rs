//! Module providing the Model struct for representing a metabolic model, along with its
//! reactions, metabolites, genes, and the undo scopes used to make temporary changes.

pub mod formula;
pub mod gene;
pub mod metabolite;
pub mod model;
pub mod reaction;
pub mod scope;

use thiserror::Error;

use crate::metabolic_model::gene::GprError;

/// Errors raised while querying or modifying a model
#[derive(Clone, Debug, Error, PartialEq)]
pub enum ModelError {
    #[error("Reaction {0} not found in model")]
    ReactionNotFound(String),
    #[error("Metabolite {0} not found in model")]
    MetaboliteNotFound(String),
    #[error("Gene {0} not found in model")]
    GeneNotFound(String),
    #[error("Reaction {0} already exists in model")]
    DuplicateReaction(String),
    #[error("Metabolite {0} already exists in model")]
    DuplicateMetabolite(String),
    #[error("Flux constraint {0} already exists in model")]
    DuplicateConstraint(String),
    #[error("Invalid bounds for {id}: lower bound {lower_bound} is greater than upper bound {upper_bound}")]
    InvalidBounds {
        id: String,
        lower_bound: f64,
        upper_bound: f64,
    },
    #[error("Unable to parse reaction formula '{formula}': {reason}")]
    InvalidReactionFormula { formula: String, reason: String },
    #[error("Unable to parse chemical formula '{0}'")]
    InvalidChemicalFormula(String),
    #[error("Error evaluating GPR: {0}")]
    Gpr(#[from] GprError),
}
