//! Parsimonious Flux Balance Analysis
//!
//! The model is first optimized as in FBA. The objective is then held at (a fraction of) its
//! optimum while the total flux, the sum of all forward and reverse variables, is minimized.
use log::info;

use crate::configuration::configuration;
use crate::flux_analysis::fba::Solution;
use crate::flux_analysis::FluxAnalysisError;
use crate::metabolic_model::model::Model;
use crate::optimize::constraint::Constraint;
use crate::optimize::objective::ObjectiveSense;
use crate::optimize::solvers::clarabel::ClarabelSolver;
use crate::optimize::solvers::Solver;

/// Id of the constraint holding the original objective near its optimum
const OBJECTIVE_CONSTRAINT: &str = "pfba_objective";

/// Run parsimonious FBA with the default solver
///
/// `fraction_of_optimum` is the fraction of the optimal objective value which must still be
/// reached when minimizing total flux, usually `1.0`. The returned solution's objective value
/// is the minimized total flux.
pub fn pfba(model: &Model, fraction_of_optimum: f64) -> Result<Solution, FluxAnalysisError> {
    pfba_with_solver(model, fraction_of_optimum, &ClarabelSolver::default())
}

/// Run parsimonious FBA using the provided solver
pub fn pfba_with_solver<S: Solver>(
    model: &Model,
    fraction_of_optimum: f64,
    solver: &S,
) -> Result<Solution, FluxAnalysisError> {
    if model.objective().is_empty() {
        return Err(FluxAnalysisError::NoObjective);
    }
    let mut problem = model.build_problem()?;
    let first = problem.solve(solver)?;
    let optimum = match first.objective_value {
        Some(value) if first.status.is_optimal() => value,
        _ => return Err(FluxAnalysisError::NotOptimal(first.status)),
    };

    // Hold the objective near its optimum
    let slack = configuration().tolerance * optimum.abs().max(1.);
    let relaxation = (1. - fraction_of_optimum) * optimum.abs() + slack;
    let (lower_bound, upper_bound) = match problem.objective_sense() {
        ObjectiveSense::Maximize => (optimum - relaxation, f64::INFINITY),
        ObjectiveSense::Minimize => (f64::NEG_INFINITY, optimum + relaxation),
    };
    let (variables, coefficients): (Vec<&str>, Vec<f64>) = problem
        .objective()
        .terms()
        .iter()
        .map(|term| (term.variable(), term.coefficient()))
        .unzip();
    let objective_constraint = Constraint::new_inequality(
        OBJECTIVE_CONSTRAINT,
        &variables,
        &coefficients,
        lower_bound,
        upper_bound,
    );
    problem.add_constraint(objective_constraint)?;

    // Minimize total flux
    problem.remove_all_objective_terms();
    problem.update_objective_sense(ObjectiveSense::Minimize);
    let variable_ids: Vec<String> = problem.variables().keys().cloned().collect();
    for variable in variable_ids {
        problem.add_new_linear_objective_term(&variable, 1.)?;
    }

    let solution = Solution::from_problem_solution(model, problem.solve(solver)?);
    info!(
        "pFBA finished with status {:?}, original objective {}, total flux {:?}",
        solution.status, optimum, solution.objective_value
    );
    Ok(solution)
}

impl Model {
    /// Run parsimonious FBA at the full optimum, see [`pfba`]
    pub fn optimize_parsimonious(&self) -> Result<Solution, FluxAnalysisError> {
        pfba(self, 1.)
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;
    use crate::io::json::tests::toy_model;
    use crate::optimize::OptimizationStatus;

    #[test]
    fn shortest_route_is_used() {
        let model = toy_model();
        let solution = model
            .optimize_parsimonious()
            .unwrap()
            .require_optimal()
            .unwrap();
        assert_abs_diff_eq!(solution.flux("BIOMASS").unwrap(), 20., epsilon = 1e-3);
        assert_abs_diff_eq!(solution.flux("PGI").unwrap(), 10., epsilon = 1e-3);
        assert_abs_diff_eq!(solution.flux("G6PX").unwrap(), 0., epsilon = 1e-3);
        assert_abs_diff_eq!(solution.flux("ATPM").unwrap(), 0., epsilon = 1e-3);
        // uptake, GLCpts, HEX1, PGI, GLYC at 10 and BIOMASS at 20
        assert_abs_diff_eq!(solution.objective_value.unwrap(), 70., epsilon = 1e-3);
    }

    #[test]
    fn fraction_of_optimum() {
        let model = toy_model();
        let solution = pfba(&model, 0.5).unwrap().require_optimal().unwrap();
        assert_abs_diff_eq!(solution.flux("BIOMASS").unwrap(), 10., epsilon = 1e-3);
        assert_abs_diff_eq!(solution.flux("EX_glc__D_e").unwrap(), -5., epsilon = 1e-3);
    }

    #[test]
    fn minimization_objective() {
        let mut model = toy_model();
        model.set_bounds("BIOMASS", 4., 4.).unwrap();
        model.set_objective(&[("EX_glc__D_e", -1.)]).unwrap();
        model.set_objective_sense(ObjectiveSense::Minimize);
        let solution = pfba(&model, 1.).unwrap().require_optimal().unwrap();
        assert_abs_diff_eq!(solution.flux("EX_glc__D_e").unwrap(), -2., epsilon = 1e-3);
    }

    #[test]
    fn infeasible_first_stage() {
        let mut model = toy_model();
        model.set_bounds("BIOMASS", 30., 1000.).unwrap();
        assert_eq!(
            pfba(&model, 1.).unwrap_err(),
            FluxAnalysisError::NotOptimal(OptimizationStatus::Infeasible)
        );
    }
}
