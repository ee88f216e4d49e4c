//! Summary of the exchange fluxes of a solution
use std::fmt::{Display, Formatter};

use prettytable::{row, Table};

use crate::configuration::configuration;
use crate::flux_analysis::fba::Solution;
use crate::flux_analysis::FluxAnalysisError;
use crate::metabolic_model::model::Model;
use crate::optimize::objective::ObjectiveSense;

/// Flux of one metabolite into or out of the system
#[derive(Clone, Debug, PartialEq)]
pub struct ExchangeFlux {
    pub metabolite: String,
    pub reaction: String,
    /// Magnitude of the exchange, always non-negative
    pub flux: f64,
    /// Carbon atoms per molecule, 0 when the metabolite has no formula
    pub carbon_atoms: f64,
    /// Share of the carbon moving in the same direction, in percent
    pub carbon_percent: f64,
}

/// Uptake and secretion through the boundary reactions of a model
#[derive(Clone, Debug)]
pub struct ModelSummary {
    pub objective: String,
    pub objective_sense: ObjectiveSense,
    pub objective_value: f64,
    pub uptake: Vec<ExchangeFlux>,
    pub secretion: Vec<ExchangeFlux>,
}

impl ModelSummary {
    /// Summarize an optimal solution of `model`
    ///
    /// The objective value is computed from the fluxes, so parsimonious solutions report the
    /// model objective rather than the total flux.
    pub fn new(model: &Model, solution: &Solution) -> Result<Self, FluxAnalysisError> {
        if !solution.is_optimal() {
            return Err(FluxAnalysisError::NotOptimal(solution.status));
        }
        let objective_value: f64 = model
            .objective()
            .iter()
            .map(|(rxn, coef)| coef * solution.flux(rxn).unwrap_or(0.))
            .sum();
        let threshold = configuration().tolerance * 10.;
        let mut uptake = Vec::new();
        let mut secretion = Vec::new();
        for rxn in model.boundary_reactions() {
            let flux = solution.flux(&rxn.id).unwrap_or(0.);
            for (met_id, coef) in &rxn.metabolites {
                // Positive when the metabolite leaves the system
                let export = -coef * flux;
                if export.abs() <= threshold {
                    continue;
                }
                let carbon_atoms = model.metabolite(met_id)?.carbon_atoms()?;
                let exchange = ExchangeFlux {
                    metabolite: met_id.clone(),
                    reaction: rxn.id.clone(),
                    flux: export.abs(),
                    carbon_atoms,
                    carbon_percent: 0.,
                };
                if export > 0. {
                    secretion.push(exchange);
                } else {
                    uptake.push(exchange);
                }
            }
        }
        set_carbon_percent(&mut uptake);
        set_carbon_percent(&mut secretion);
        let objective = model
            .objective()
            .iter()
            .map(|(rxn, coef)| format!("{} {}", coef, rxn))
            .collect::<Vec<_>>()
            .join(" + ");
        Ok(ModelSummary {
            objective,
            objective_sense: model.objective_sense(),
            objective_value,
            uptake,
            secretion,
        })
    }
}

fn set_carbon_percent(exchanges: &mut [ExchangeFlux]) {
    let total: f64 = exchanges.iter().map(|e| e.flux * e.carbon_atoms).sum();
    if total <= 0. {
        return;
    }
    for exchange in exchanges.iter_mut() {
        exchange.carbon_percent = exchange.flux * exchange.carbon_atoms / total * 100.;
    }
}

fn exchange_table(exchanges: &[ExchangeFlux]) -> Table {
    let mut table = Table::new();
    table.add_row(row!["Metabolite", "Reaction", "Flux", "C-Number", "C-Flux"]);
    for exchange in exchanges {
        table.add_row(row![
            exchange.metabolite,
            exchange.reaction,
            format!("{:.4}", exchange.flux),
            exchange.carbon_atoms,
            format!("{:.2}%", exchange.carbon_percent)
        ]);
    }
    table
}

impl Display for ModelSummary {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let sense = match self.objective_sense {
            ObjectiveSense::Maximize => "max",
            ObjectiveSense::Minimize => "min",
        };
        writeln!(f, "Objective")?;
        writeln!(f, "{} {} = {:.4}", sense, self.objective, self.objective_value)?;
        writeln!(f)?;
        writeln!(f, "Uptake")?;
        write!(f, "{}", exchange_table(&self.uptake))?;
        writeln!(f)?;
        writeln!(f, "Secretion")?;
        write!(f, "{}", exchange_table(&self.secretion))
    }
}

impl Model {
    /// Summarize the exchange fluxes of a parsimonious optimum
    pub fn summary(&self) -> Result<ModelSummary, FluxAnalysisError> {
        let solution = self.optimize_parsimonious()?;
        ModelSummary::new(self, &solution)
    }
}
