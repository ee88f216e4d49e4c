//! Making the production of a metabolite the objective
use indexmap::IndexMap;
use log::{info, warn};

use crate::configuration::configuration;
use crate::metabolic_model::model::Model;
use crate::metabolic_model::reaction::ReactionBuilder;
use crate::metabolic_model::ModelError;
use crate::optimize::objective::ObjectiveSense;
use crate::workflows::WorkflowError;

/// Acyl-CoA products, drained releasing free CoA
pub const ACYL_COA_PRODUCTS: [&str; 2] = ["accoa_c", "succoa_c"];

/// Phosphorylated products, drained releasing phosphate
pub const PHOSPHORYLATED_PRODUCTS: [&str; 7] = [
    "g6p_c", "f6p_c", "e4p_c", "r5p_c", "g3p_c", "3pg_c", "pep_c",
];

/// Maximize the production of `product`
///
/// An existing `EX_{product}` reaction is reused. Otherwise a drain is added, which for
/// acyl-CoAs and phosphorylated sugars and acids releases `coa_c` or `pi_c` so that the
/// cofactor is recycled. New drains have the default bounds. Returns the id of the objective
/// reaction.
pub fn change_objective_to_product(model: &mut Model, product: &str) -> Result<String, WorkflowError> {
    model.metabolite(product)?;
    let drain_id = format!("EX_{}", product);
    let released = if ACYL_COA_PRODUCTS.contains(&product) {
        Some("coa_c")
    } else if PHOSPHORYLATED_PRODUCTS.contains(&product) {
        Some("pi_c")
    } else {
        None
    };
    if model.has_reaction(&drain_id) {
        if released.is_some() {
            warn!("Reusing existing {} as drain of {}", drain_id, product);
        }
    } else {
        let mut metabolites = IndexMap::from([(product.to_string(), -1.)]);
        if let Some(released) = released {
            metabolites.insert(released.to_string(), 1.);
        }
        let config = configuration();
        let drain = ReactionBuilder::default()
            .id(drain_id.clone())
            .name(Some(format!("{} drain", product)))
            .metabolites(metabolites)
            .lower_bound(config.lower_bound)
            .upper_bound(config.upper_bound)
            .build()
            .map_err(|err| ModelError::InvalidReactionFormula {
                formula: drain_id.clone(),
                reason: err.to_string(),
            })?;
        model.add_reaction(drain)?;
    }
    model.set_objective_reaction(&drain_id)?;
    model.set_objective_sense(ObjectiveSense::Maximize);
    info!("Objective changed to production of {}", product);
    Ok(drain_id)
}
