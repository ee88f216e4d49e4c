//! Minimal substrate uptake required for growth
//!
//! For a range of fixed growth rates the uptake of a substrate is minimized with pFBA. The
//! slope of uptake over growth rate is the substrate dependency of the strain (mmol/gCDW),
//! and conditions are compared by the ratio of their slopes.
use indexmap::IndexMap;
use log::info;

use crate::configuration::configuration;
use crate::flux_analysis::pfba::pfba;
use crate::metabolic_model::model::Model;
use crate::optimize::objective::ObjectiveSense;
use crate::workflows::results::ResultTable;
use crate::workflows::{absolute_flux, WorkflowError};

/// Growth rates used by default, in 1/h
pub const DEFAULT_GROWTH_RATES: [f64; 5] = [0., 0.1, 0.2, 0.3, 0.4];

#[derive(Clone, Debug)]
pub struct DependencyConditions {
    pub uptake_reaction: String,
    pub growth_reaction: String,
    pub growth_rates: Vec<f64>,
    /// Reactions whose absolute flux is recorded at every growth rate
    pub tracked_reactions: Vec<String>,
}

impl DependencyConditions {
    pub fn new(uptake_reaction: &str, growth_reaction: &str) -> Self {
        DependencyConditions {
            uptake_reaction: uptake_reaction.to_string(),
            growth_reaction: growth_reaction.to_string(),
            growth_rates: DEFAULT_GROWTH_RATES.to_vec(),
            tracked_reactions: Vec::new(),
        }
    }

    pub fn with_growth_rates(mut self, growth_rates: &[f64]) -> Self {
        self.growth_rates = growth_rates.to_vec();
        self
    }

    pub fn with_tracked_reactions(mut self, reactions: &[&str]) -> Self {
        self.tracked_reactions = reactions.iter().map(|r| r.to_string()).collect();
        self
    }
}

/// Minimal uptake (absolute flux) at each growth rate
#[derive(Clone, Debug, PartialEq)]
pub struct DependencyCurve {
    pub uptake_reaction: String,
    pub growth_rates: Vec<f64>,
    pub uptake: Vec<f64>,
    pub tracked: IndexMap<String, Vec<f64>>,
}

impl DependencyCurve {
    /// Change in uptake per change in growth rate, between the first and last point
    pub fn slope(&self) -> Result<f64, WorkflowError> {
        let n = self.growth_rates.len().min(self.uptake.len());
        if n < 2 || self.growth_rates[n - 1] == self.growth_rates[0] {
            return Err(WorkflowError::InsufficientPoints(n));
        }
        Ok((self.uptake[n - 1] - self.uptake[0]) / (self.growth_rates[n - 1] - self.growth_rates[0]))
    }

    /// How many times steeper this curve is than `reference`
    pub fn ratio(&self, reference: &DependencyCurve) -> Result<f64, WorkflowError> {
        Ok(self.slope()? / reference.slope()?)
    }

    /// Table with one row per growth rate, and columns for the uptake and tracked reactions
    pub fn to_table(&self) -> ResultTable {
        let mut table = ResultTable::new("growth_rate");
        for (growth_rate, uptake) in self.growth_rates.iter().zip(&self.uptake) {
            table.set(&growth_rate.to_string(), &self.uptake_reaction, *uptake);
        }
        for (reaction, fluxes) in &self.tracked {
            for (growth_rate, flux) in self.growth_rates.iter().zip(fluxes) {
                table.set(&growth_rate.to_string(), reaction, *flux);
            }
        }
        table
    }
}

/// Minimal uptake of `conditions.uptake_reaction` at each of the growth rates
///
/// Uptake is opened to the configured lower bound, so the result is limited only by what
/// growth requires. The model is unchanged afterwards.
pub fn substrate_dependency(
    model: &mut Model,
    conditions: &DependencyConditions,
) -> Result<DependencyCurve, WorkflowError> {
    for reaction in [&conditions.growth_reaction]
        .into_iter()
        .chain(&conditions.tracked_reactions)
    {
        model.reaction(reaction)?;
    }
    let mut scope = model.scope();
    scope.set_lower_bound(&conditions.uptake_reaction, configuration().lower_bound)?;
    scope.set_objective(&[(conditions.uptake_reaction.as_str(), -1.)])?;
    scope.set_objective_sense(ObjectiveSense::Minimize);

    let mut curve = DependencyCurve {
        uptake_reaction: conditions.uptake_reaction.clone(),
        growth_rates: conditions.growth_rates.clone(),
        uptake: Vec::with_capacity(conditions.growth_rates.len()),
        tracked: conditions
            .tracked_reactions
            .iter()
            .map(|r| (r.clone(), Vec::with_capacity(conditions.growth_rates.len())))
            .collect(),
    };
    for growth_rate in &conditions.growth_rates {
        let mut fixed = scope.scope();
        fixed.set_bounds(&conditions.growth_reaction, *growth_rate, *growth_rate)?;
        let solution = pfba(&fixed, 1.)?.require_optimal()?;
        curve
            .uptake
            .push(absolute_flux(&solution, &conditions.uptake_reaction)?);
        for (reaction, fluxes) in curve.tracked.iter_mut() {
            fluxes.push(absolute_flux(&solution, reaction)?);
        }
    }
    info!(
        "Minimal {} uptake computed at {} growth rates",
        conditions.uptake_reaction,
        conditions.growth_rates.len()
    );
    Ok(curve)
}
