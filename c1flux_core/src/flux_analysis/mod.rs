//! Constraint based flux analysis of [`Model`](crate::metabolic_model::model::Model)s
//!
//! [`fba`](fba::fba) solves the flux balance problem built from the model's reactions, mass
//! balances, flux constraints and objective. [`pfba`](pfba::pfba) additionally minimizes the
//! total flux needed to reach the optimum. [`ModelSummary`](summary::ModelSummary) renders the
//! exchange fluxes of a solution.
pub mod fba;
pub mod pfba;
pub mod summary;

use thiserror::Error;

use crate::metabolic_model::ModelError;
use crate::optimize::problem::ProblemError;
use crate::optimize::solvers::SolverError;
use crate::optimize::OptimizationStatus;

#[derive(Clone, Debug, Error, PartialEq)]
pub enum FluxAnalysisError {
    #[error("Unable to build optimization problem: {0}")]
    Problem(#[from] ProblemError),
    #[error("Solver failed: {0}")]
    Solver(#[from] SolverError),
    #[error(transparent)]
    Model(#[from] ModelError),
    #[error("Optimization finished with status {0:?}")]
    NotOptimal(OptimizationStatus),
    #[error("Model has no objective")]
    NoObjective,
}
