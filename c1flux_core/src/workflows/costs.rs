//! Comparing the energetic cost of pathway variants
//!
//! The base model supplies ATP, NAD(P)H and reduced ferredoxin through dedicated regeneration
//! reactions, and its objective minimizes their use while a fixed product flux is drained. The
//! fluxes through the regeneration reactions are converted into reducing equivalents, whose
//! inverse is the yield of the variant.
use std::path::PathBuf;

use log::info;

use crate::flux_analysis::fba::fba;
use crate::io::flux_table::write_flux_table;
use crate::metabolic_model::model::Model;
use crate::workflows::results::ResultTable;
use crate::workflows::variant::PathwayVariant;
use crate::workflows::{absolute_flux, WorkflowError};

pub const REDUCING_EQUIVALENTS: &str = "reducing_eq";
pub const YIELD: &str = "Yield";
pub const RELATIVE_YIELD: &str = "Rel_yield";

/// Conversion of cofactors into reducing equivalents
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CostWeights {
    /// ATP regenerated per reducing equivalent (P/O ratio)
    pub atp_per_reducing_equivalent: f64,
    /// Reduced ferredoxin obtained per reducing equivalent
    pub ferredoxin_per_reducing_equivalent: f64,
}

impl Default for CostWeights {
    fn default() -> Self {
        CostWeights {
            atp_per_reducing_equivalent: 2.5,
            ferredoxin_per_reducing_equivalent: 2.,
        }
    }
}

impl CostWeights {
    pub fn reducing_equivalents(&self, atp: f64, electrons: f64, ferredoxin: f64) -> f64 {
        atp / self.atp_per_reducing_equivalent
            + electrons
            + ferredoxin / self.ferredoxin_per_reducing_equivalent
    }
}

#[derive(Clone, Debug)]
pub struct CostComparison {
    pub variants: Vec<PathwayVariant>,
    pub atp_reaction: String,
    pub electron_reaction: String,
    pub ferredoxin_reaction: String,
    /// Further reactions whose absolute flux is reported
    pub tracked_reactions: Vec<String>,
    /// Label of the variant the relative yields refer to
    pub reference: String,
    pub weights: CostWeights,
    /// Directory and product name of the flux tables written per variant
    pub flux_output: Option<(PathBuf, String)>,
}

impl CostComparison {
    /// Compare variants using the `DM_atp`, `DM_e` and `Fdr` regeneration reactions
    pub fn new(variants: Vec<PathwayVariant>, reference: &str) -> Self {
        CostComparison {
            variants,
            atp_reaction: "DM_atp".to_string(),
            electron_reaction: "DM_e".to_string(),
            ferredoxin_reaction: "Fdr".to_string(),
            tracked_reactions: Vec::new(),
            reference: reference.to_string(),
            weights: CostWeights::default(),
            flux_output: None,
        }
    }

    pub fn with_tracked_reactions(mut self, reactions: &[&str]) -> Self {
        self.tracked_reactions = reactions.iter().map(|r| r.to_string()).collect();
        self
    }

    pub fn with_weights(mut self, weights: CostWeights) -> Self {
        self.weights = weights;
        self
    }

    pub fn with_flux_output<P: Into<PathBuf>>(mut self, dir: P, product: &str) -> Self {
        self.flux_output = Some((dir.into(), product.to_string()));
        self
    }

    /// Run the comparison, the model is unchanged afterwards
    ///
    /// The table has one column per variant. Rows hold the absolute flux of the regeneration
    /// and tracked reactions, followed by the reducing equivalents, the yield and the yield
    /// relative to the reference in percent.
    pub fn run(&self, model: &mut Model) -> Result<ResultTable, WorkflowError> {
        if !self.variants.iter().any(|v| v.label == self.reference) {
            return Err(WorkflowError::UnknownVariant(self.reference.clone()));
        }
        let mut table = ResultTable::new("reaction");
        let cost_reactions = [
            &self.atp_reaction,
            &self.electron_reaction,
            &self.ferredoxin_reaction,
        ];
        for variant in &self.variants {
            let mut variant_model = model.scope();
            variant.apply(&mut variant_model)?;
            let solution = fba(&variant_model)?.require_optimal()?;
            if let Some((dir, product)) = &self.flux_output {
                write_flux_table(&variant_model, &solution, dir, &variant.label, product)?;
            }
            for reaction in cost_reactions.into_iter().chain(&self.tracked_reactions) {
                table.set(reaction, &variant.label, absolute_flux(&solution, reaction)?);
            }
            let reducing_eq = self.weights.reducing_equivalents(
                absolute_flux(&solution, &self.atp_reaction)?,
                absolute_flux(&solution, &self.electron_reaction)?,
                absolute_flux(&solution, &self.ferredoxin_reaction)?,
            );
            info!("Variant {} needs {} reducing equivalents", variant.label, reducing_eq);
            table.set(REDUCING_EQUIVALENTS, &variant.label, reducing_eq);
            table.set(YIELD, &variant.label, 1. / reducing_eq);
        }
        let reference_yield = table.get(YIELD, &self.reference);
        for variant in &self.variants {
            let relative = table.get(YIELD, &variant.label) / reference_yield * 100.;
            table.set(RELATIVE_YIELD, &variant.label, relative);
        }
        Ok(table)
    }
}
