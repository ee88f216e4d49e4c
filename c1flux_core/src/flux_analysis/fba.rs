//! Flux Balance Analysis
//!
//! Every reaction is split into a forward and a reverse variable, both non-negative, so that
//! the flux through the reaction is `forward - reverse`. Each metabolite contributes a
//! steady state constraint `S v = 0`, keyed by the metabolite id, and every model
//! [`FluxConstraint`](crate::metabolic_model::model::FluxConstraint) becomes an inequality
//! over the net fluxes of its reactions.
use indexmap::IndexMap;
use log::{debug, info, warn};

use crate::flux_analysis::FluxAnalysisError;
use crate::metabolic_model::model::Model;
use crate::optimize::problem::Problem;
use crate::optimize::solvers::clarabel::ClarabelSolver;
use crate::optimize::solvers::Solver;
use crate::optimize::{OptimizationStatus, ProblemSolution};

/// Result of optimizing a model
#[derive(Clone, Debug)]
pub struct Solution {
    /// Status reported by the solver
    pub status: OptimizationStatus,
    /// Value of the objective at the optimum, None if the problem couldn't be solved
    pub objective_value: Option<f64>,
    /// Net flux of each reaction, in model order (empty if not optimal)
    pub fluxes: IndexMap<String, f64>,
    /// Dual value of each metabolite's mass balance (empty if not optimal)
    pub shadow_prices: IndexMap<String, f64>,
}

impl Solution {
    /// Convert a problem solution into fluxes for the reactions of `model`
    pub(crate) fn from_problem_solution(model: &Model, solution: ProblemSolution) -> Self {
        let (variable_values, dual_values) =
            match (solution.variable_values, solution.dual_values) {
                (Some(values), Some(duals)) if solution.status.is_optimal() => (values, duals),
                _ => {
                    return Solution {
                        status: solution.status,
                        objective_value: None,
                        fluxes: IndexMap::new(),
                        shadow_prices: IndexMap::new(),
                    }
                }
            };
        let fluxes = model
            .reactions()
            .values()
            .map(|rxn| {
                let forward = variable_values
                    .get(&rxn.get_forward_id())
                    .copied()
                    .unwrap_or(0.);
                let reverse = variable_values
                    .get(&rxn.get_reverse_id())
                    .copied()
                    .unwrap_or(0.);
                (rxn.id.clone(), forward - reverse)
            })
            .collect();
        let shadow_prices = model
            .metabolites()
            .keys()
            .map(|met| (met.clone(), dual_values.get(met).copied().unwrap_or(0.)))
            .collect();
        Solution {
            status: solution.status,
            objective_value: solution.objective_value,
            fluxes,
            shadow_prices,
        }
    }

    /// Whether the solver found an (almost) optimal solution
    pub fn is_optimal(&self) -> bool {
        self.status.is_optimal()
    }

    /// Return the solution if it is optimal, or a [`FluxAnalysisError::NotOptimal`] otherwise
    pub fn require_optimal(self) -> Result<Self, FluxAnalysisError> {
        if self.is_optimal() {
            Ok(self)
        } else {
            Err(FluxAnalysisError::NotOptimal(self.status))
        }
    }

    /// Net flux through a reaction
    pub fn flux(&self, reaction_id: &str) -> Option<f64> {
        self.fluxes.get(reaction_id).copied()
    }
}

impl Model {
    /// Build the flux balance optimization problem for the current state of the model
    pub fn build_problem(&self) -> Result<Problem, FluxAnalysisError> {
        let mut problem = Problem::new(self.objective_sense);

        // Add variables
        for rxn in self.reactions.values() {
            problem.add_new_variable(
                &rxn.get_forward_id(),
                None,
                rxn.get_forward_lower_bound(),
                rxn.get_forward_upper_bound(),
            )?;
            problem.add_new_variable(
                &rxn.get_reverse_id(),
                None,
                rxn.get_reverse_lower_bound(),
                rxn.get_reverse_upper_bound(),
            )?;
        }

        // Add mass balance constraints
        let mut balances: IndexMap<&str, (Vec<String>, Vec<f64>)> = self
            .metabolites
            .keys()
            .map(|id| (id.as_str(), (Vec::new(), Vec::new())))
            .collect();
        for rxn in self.reactions.values() {
            for (met_id, coef) in &rxn.metabolites {
                if let Some((variables, coefficients)) = balances.get_mut(met_id.as_str()) {
                    variables.push(rxn.get_forward_id());
                    coefficients.push(*coef);
                    variables.push(rxn.get_reverse_id());
                    coefficients.push(-coef);
                }
            }
        }
        for (met_id, (variables, coefficients)) in balances {
            if variables.is_empty() {
                continue;
            }
            let variables: Vec<&str> = variables.iter().map(|v| v.as_str()).collect();
            problem.add_new_equality_constraint(met_id, &variables, &coefficients, 0.)?;
        }

        // Add additional flux constraints
        for constraint in self.constraints.values() {
            let (variables, coefficients) = self.split_terms(&constraint.coefficients)?;
            let variables: Vec<&str> = variables.iter().map(|v| v.as_str()).collect();
            problem.add_new_inequality_constraint(
                &constraint.id,
                &variables,
                &coefficients,
                constraint.lower_bound,
                constraint.upper_bound,
            )?;
        }

        // Add objective
        let (variables, coefficients) = self.split_terms(&self.objective)?;
        for (variable, coefficient) in variables.iter().zip(coefficients) {
            problem.add_new_linear_objective_term(variable, coefficient)?;
        }
        debug!(
            "Built problem with {} variables and {} constraints",
            problem.num_variables(),
            problem.num_constraints()
        );
        Ok(problem)
    }

    /// Expand coefficients on net reaction fluxes into coefficients on forward and reverse
    /// variables
    fn split_terms(
        &self,
        coefficients: &IndexMap<String, f64>,
    ) -> Result<(Vec<String>, Vec<f64>), FluxAnalysisError> {
        let mut variables = Vec::with_capacity(coefficients.len() * 2);
        let mut values = Vec::with_capacity(coefficients.len() * 2);
        for (rxn_id, coef) in coefficients {
            let rxn = self.reaction(rxn_id)?;
            variables.push(rxn.get_forward_id());
            values.push(*coef);
            variables.push(rxn.get_reverse_id());
            values.push(-coef);
        }
        Ok((variables, values))
    }

    /// Run flux balance analysis on the model with the default solver
    pub fn optimize(&self) -> Result<Solution, FluxAnalysisError> {
        fba(self)
    }
}

/// Run flux balance analysis on the model with the default solver
///
/// Infeasible or unbounded models are not an error, check [`Solution::status`] or use
/// [`Solution::require_optimal`].
pub fn fba(model: &Model) -> Result<Solution, FluxAnalysisError> {
    fba_with_solver(model, &ClarabelSolver::default())
}

/// Run flux balance analysis using the provided solver
pub fn fba_with_solver<S: Solver>(model: &Model, solver: &S) -> Result<Solution, FluxAnalysisError> {
    if model.objective().is_empty() {
        return Err(FluxAnalysisError::NoObjective);
    }
    let problem = model.build_problem()?;
    let solution = Solution::from_problem_solution(model, problem.solve(solver)?);
    match solution.objective_value {
        Some(value) => info!("FBA finished with status {:?}, objective {}", solution.status, value),
        None => warn!("FBA finished with status {:?}", solution.status),
    }
    Ok(solution)
}
