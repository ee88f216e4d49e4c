//! Solver backends for [`Problem`]s
pub mod clarabel;

use thiserror::Error;

use crate::optimize::problem::Problem;
use crate::optimize::ProblemSolution;

/// A backend able to solve linear problems
///
/// Failing to find an optimum (infeasible or unbounded problems, iteration limits) is not an
/// error, it is reported through the status of the returned [`ProblemSolution`]. Errors are
/// reserved for problems which can't be handed to the solver at all.
pub trait Solver {
    fn solve(&self, problem: &Problem) -> Result<ProblemSolution, SolverError>;
}

#[derive(Clone, Debug, Error, PartialEq)]
pub enum SolverError {
    #[error("Problem has no variables")]
    EmptyProblem,
    #[error("Problem contains a non finite coefficient in {0}")]
    NonFiniteCoefficient(String),
    #[error("Variable {0} is not part of the problem")]
    UnknownVariable(String),
}
