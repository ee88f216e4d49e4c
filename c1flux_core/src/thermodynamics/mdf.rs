//! Max-min driving force analysis
//!
//! With `x_i = ln c_i` and `B` the smallest driving force, the problem is
//!
//! ```text
//! maximize    B
//! subject to  B + s_j RT Σ_i S_ij x_i <= -s_j ΔG'°_j    for every reaction j with flux v_j != 0
//!             ln lb_i <= x_i <= ln ub_i
//! ```
//!
//! where `s_j` is the sign of `v_j`. The dual value of each reaction constraint is its shadow
//! price, and the shadow prices sum to one.
use std::path::Path;

use log::info;
use serde::Serialize;

use crate::metabolic_model::formula::format_reaction_formula;
use crate::optimize::problem::Problem;
use crate::optimize::solvers::clarabel::ClarabelSolver;
use crate::optimize::solvers::Solver;
use crate::thermodynamics::model::ThermodynamicModel;
use crate::thermodynamics::ThermodynamicsError;

/// Id of the variable holding the minimal driving force
const MDF_VARIABLE: &str = "mdf";

/// Fluxes smaller than this are treated as zero
const FLUX_THRESHOLD: f64 = 1e-9;

/// Reaction row of an MDF result
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MdfReaction {
    pub reaction_id: String,
    pub reaction_formula: String,
    pub flux: f64,
    /// ΔG'° in kJ/mol
    pub standard_dg_prime: Option<f64>,
    /// ΔG' at the optimal concentrations in kJ/mol
    pub optimized_dg_prime: Option<f64>,
    pub shadow_price: f64,
}

/// Compound row of an MDF result, concentrations in M
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MdfCompound {
    pub compound_id: String,
    pub concentration: f64,
    pub lower_bound: f64,
    pub upper_bound: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct MdfResult {
    /// The max-min driving force in kJ/mol
    pub score: f64,
    pub reactions: Vec<MdfReaction>,
    pub compounds: Vec<MdfCompound>,
}

impl MdfResult {
    /// Reaction whose driving force limits the pathway the most, by shadow price
    pub fn bottleneck(&self) -> Option<&MdfReaction> {
        self.reactions
            .iter()
            .max_by(|a, b| a.shadow_price.total_cmp(&b.shadow_price))
    }

    pub fn write_reaction_table<P: AsRef<Path>>(&self, path: P) -> Result<(), ThermodynamicsError> {
        write_rows(path.as_ref(), &self.reactions)
    }

    pub fn write_concentration_table<P: AsRef<Path>>(
        &self,
        path: P,
    ) -> Result<(), ThermodynamicsError> {
        write_rows(path.as_ref(), &self.compounds)
    }
}

fn write_rows<T: Serialize>(path: &Path, rows: &[T]) -> Result<(), ThermodynamicsError> {
    let unable = |err: &dyn std::fmt::Display| {
        ThermodynamicsError::UnableToWrite(format!("{}: {}", path.display(), err))
    };
    let mut writer = csv::Writer::from_path(path).map_err(|e| unable(&e))?;
    for row in rows {
        writer.serialize(row).map_err(|e| unable(&e))?;
    }
    writer.flush().map_err(|e| unable(&e))?;
    Ok(())
}

fn log_variable(compound_id: &str) -> String {
    format!("ln_{}", compound_id)
}

impl ThermodynamicModel {
    /// Build the MDF linear problem
    fn build_mdf_problem(&self) -> Result<Problem, ThermodynamicsError> {
        let rt = self.rt();
        let mut problem = Problem::new_maximization();
        for (i, compound) in self.compound_ids.iter().enumerate() {
            problem.add_new_variable(
                &log_variable(compound),
                Some(compound.as_str()),
                self.lower_bounds[i].ln(),
                self.upper_bounds[i].ln(),
            )?;
        }
        problem.add_new_variable(MDF_VARIABLE, None, f64::NEG_INFINITY, f64::INFINITY)?;
        problem.add_new_linear_objective_term(MDF_VARIABLE, 1.)?;

        let mut active = 0;
        for (j, reaction_id) in self.reaction_ids.iter().enumerate() {
            let flux = self.fluxes[j];
            if flux.abs() <= FLUX_THRESHOLD {
                continue;
            }
            let standard_dg = self.standard_dgs[j]
                .ok_or_else(|| ThermodynamicsError::MissingStandardDg(reaction_id.clone()))?;
            let sign = flux.signum();
            let mut variables = vec![MDF_VARIABLE.to_string()];
            let mut coefficients = vec![1.];
            for (compound, coef) in self.reaction_stoichiometry(j) {
                variables.push(log_variable(&compound));
                coefficients.push(sign * rt * coef);
            }
            let variables: Vec<&str> = variables.iter().map(|v| v.as_str()).collect();
            problem.add_new_inequality_constraint(
                reaction_id,
                &variables,
                &coefficients,
                f64::NEG_INFINITY,
                -sign * standard_dg,
            )?;
            active += 1;
        }
        if active == 0 {
            return Err(ThermodynamicsError::NoActiveReactions);
        }
        Ok(problem)
    }

    /// Run max-min driving force analysis with the default solver
    pub fn mdf_analysis(&self) -> Result<MdfResult, ThermodynamicsError> {
        self.mdf_analysis_with_solver(&ClarabelSolver::default())
    }

    /// Run max-min driving force analysis with the provided solver
    pub fn mdf_analysis_with_solver<S: Solver>(
        &self,
        solver: &S,
    ) -> Result<MdfResult, ThermodynamicsError> {
        let problem = self.build_mdf_problem()?;
        let solution = problem.solve(solver)?;
        let (score, values, duals) = match (
            solution.objective_value,
            solution.variable_values,
            solution.dual_values,
        ) {
            (Some(score), Some(values), Some(duals)) if solution.status.is_optimal() => {
                (score, values, duals)
            }
            _ => return Err(ThermodynamicsError::NotOptimal(solution.status)),
        };

        let log_concentrations: Vec<f64> = self
            .compound_ids
            .iter()
            .map(|c| values.get(&log_variable(c)).copied().unwrap_or(0.))
            .collect();
        let rt = self.rt();
        let reactions = self
            .reaction_ids
            .iter()
            .enumerate()
            .map(|(j, reaction_id)| {
                let stoichiometry = self.reaction_stoichiometry(j);
                let optimized_dg_prime = self.standard_dgs[j].map(|dg| {
                    dg + rt
                        * self
                            .stoichiometry
                            .column(j)
                            .iter()
                            .zip(&log_concentrations)
                            .map(|(coef, x)| coef * x)
                            .sum::<f64>()
                });
                MdfReaction {
                    reaction_id: reaction_id.clone(),
                    reaction_formula: format_reaction_formula(&stoichiometry, "<=>"),
                    flux: self.fluxes[j],
                    standard_dg_prime: self.standard_dgs[j],
                    optimized_dg_prime,
                    shadow_price: duals.get(reaction_id).copied().unwrap_or(0.),
                }
            })
            .collect();
        let compounds = self
            .compound_ids
            .iter()
            .enumerate()
            .map(|(i, compound_id)| MdfCompound {
                compound_id: compound_id.clone(),
                concentration: log_concentrations[i].exp(),
                lower_bound: self.lower_bounds[i],
                upper_bound: self.upper_bounds[i],
            })
            .collect();
        info!("MDF = {:.3} kJ/mol", score);
        Ok(MdfResult {
            score,
            reactions,
            compounds,
        })
    }
}
