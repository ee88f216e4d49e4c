//! Analysis workflows comparing engineered pathway variants
//!
//! Each workflow applies the modifications of a pathway variant inside a
//! [scope](crate::metabolic_model::scope), runs an optimization and collects the results into
//! a [`ResultTable`](results::ResultTable). The model is left unchanged afterwards.
pub mod costs;
pub mod dependency;
pub mod mdf_sweep;
pub mod medium;
pub mod objective;
pub mod results;
pub mod screens;
pub mod variant;

use thiserror::Error;

use crate::flux_analysis::fba::Solution;
use crate::flux_analysis::FluxAnalysisError;
use crate::io::flux_table::FluxTableError;
use crate::io::reaction_table::ReactionTableError;
use crate::metabolic_model::ModelError;
use crate::thermodynamics::ThermodynamicsError;

#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error(transparent)]
    Model(#[from] ModelError),
    #[error(transparent)]
    FluxAnalysis(#[from] FluxAnalysisError),
    #[error(transparent)]
    ReactionTable(#[from] ReactionTableError),
    #[error(transparent)]
    FluxTable(#[from] FluxTableError),
    #[error(transparent)]
    Thermodynamics(#[from] ThermodynamicsError),
    #[error("Variant {0} is not part of the comparison")]
    UnknownVariant(String),
    #[error("At least two points with distinct growth rates are needed, got {0}")]
    InsufficientPoints(usize),
    #[error("Unable to write {0}")]
    UnableToWrite(String),
}

/// Round to a number of decimal places
pub(crate) fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}

/// Absolute flux through a reaction, an error if the reaction is not part of the solution
pub(crate) fn absolute_flux(solution: &Solution, reaction: &str) -> Result<f64, WorkflowError> {
    solution
        .flux(reaction)
        .map(f64::abs)
        .ok_or_else(|| ModelError::ReactionNotFound(reaction.to_string()).into())
}
