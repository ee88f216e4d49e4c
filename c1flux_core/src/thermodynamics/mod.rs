//! Thermodynamic analysis of pathways
//!
//! A [`ThermodynamicModel`](model::ThermodynamicModel) describes a pathway by the
//! stoichiometry and relative fluxes of its reactions, their standard Gibbs energies and
//! bounds on compound concentrations. [Max-min driving force](mdf) analysis then finds the
//! concentrations which make the least favourable reaction as favourable as possible.
pub mod mdf;
pub mod model;

use thiserror::Error;

use crate::io::sbtab::SbtabError;
use crate::metabolic_model::ModelError;
use crate::optimize::problem::ProblemError;
use crate::optimize::solvers::SolverError;
use crate::optimize::OptimizationStatus;

/// Gas constant in kJ/(mol K)
pub const GAS_CONSTANT: f64 = 8.31446e-3;

/// Conversion factor from a concentration unit to molar
pub fn molar_factor(unit: &str) -> Result<f64, ThermodynamicsError> {
    match unit.trim() {
        "M" | "molar" => Ok(1.),
        "mM" | "millimolar" => Ok(1e-3),
        "uM" | "µM" | "μM" | "micromolar" => Ok(1e-6),
        "nM" | "nanomolar" => Ok(1e-9),
        other => Err(ThermodynamicsError::InvalidUnit(other.to_string())),
    }
}

#[derive(Clone, Debug, Error, PartialEq)]
pub enum ThermodynamicsError {
    #[error(transparent)]
    Sbtab(#[from] SbtabError),
    #[error("Invalid reaction formula: {0}")]
    Formula(#[from] ModelError),
    #[error("Unable to build MDF problem: {0}")]
    Problem(#[from] ProblemError),
    #[error("Solver failed: {0}")]
    Solver(#[from] SolverError),
    #[error("Reaction {0} is not part of the pathway")]
    UnknownReaction(String),
    #[error("Compound {0} is not part of the pathway")]
    UnknownCompound(String),
    #[error("Reaction {0} is defined more than once")]
    DuplicateReaction(String),
    #[error("Unsupported unit {0}")]
    InvalidUnit(String),
    #[error("Invalid concentration bounds for {compound}: [{lower_bound}, {upper_bound}] M")]
    InvalidBounds {
        compound: String,
        lower_bound: f64,
        upper_bound: f64,
    },
    #[error("No standard Gibbs energy for reaction {0}")]
    MissingStandardDg(String),
    #[error("No reaction in the pathway carries flux")]
    NoActiveReactions,
    #[error("MDF optimization finished with status {0:?}")]
    NotOptimal(OptimizationStatus),
    #[error("Unable to write {0}")]
    UnableToWrite(String),
}
