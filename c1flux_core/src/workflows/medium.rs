//! Growth medium changes
use log::info;

use crate::configuration::configuration;
use crate::metabolic_model::model::Model;
use crate::workflows::WorkflowError;

/// Block the uptake of every carbon containing compound
///
/// Every boundary reaction whose mass balance involves carbon gets bounds
/// `(0, upper_bound)`, with the configured default upper bound. Returns the ids of the
/// changed reactions. Carbon sources are opened again afterwards with [`set_bounds`].
pub fn restrict_carbon_uptake(model: &mut Model) -> Result<Vec<String>, WorkflowError> {
    let mut carbon_exchanges = Vec::new();
    for reaction in model.boundary_reactions() {
        if model.check_mass_balance(&reaction.id)?.contains_key("C") {
            carbon_exchanges.push(reaction.id.clone());
        }
    }
    let upper_bound = configuration().upper_bound;
    for id in &carbon_exchanges {
        model.set_bounds(id, 0., upper_bound)?;
    }
    info!(
        "Restricted uptake of {} carbon containing compounds",
        carbon_exchanges.len()
    );
    Ok(carbon_exchanges)
}

/// Apply several bound changes, e.g. to open the carbon source of a medium
pub fn set_bounds(model: &mut Model, bounds: &[(&str, f64, f64)]) -> Result<(), WorkflowError> {
    for (reaction, lower_bound, upper_bound) in bounds {
        model.set_bounds(reaction, *lower_bound, *upper_bound)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;
    use crate::io::json::tests::toy_model;

    #[test]
    fn carbon_uptake_is_blocked() {
        let mut model = toy_model();
        let changed = restrict_carbon_uptake(&mut model).unwrap();
        assert_eq!(changed, vec!["EX_glc__D_e", "EX_pyr_c"]);
        assert_eq!(model.reaction("EX_glc__D_e").unwrap().lower_bound, 0.);
        assert_eq!(model.reaction("EX_o2_e").unwrap().lower_bound, -1000.);
        let solution = model.optimize().unwrap();
        assert_abs_diff_eq!(solution.objective_value.unwrap(), 0., epsilon = 1e-4);

        // Reopen glucose as the only carbon source
        set_bounds(&mut model, &[("EX_glc__D_e", -10., 0.)]).unwrap();
        let solution = model.optimize().unwrap();
        assert_abs_diff_eq!(solution.objective_value.unwrap(), 20., epsilon = 1e-4);
    }

    #[test]
    fn restriction_is_scoped() {
        let mut model = toy_model();
        {
            let mut scope = model.scope();
            restrict_carbon_uptake(&mut scope).unwrap();
        }
        assert_eq!(model.reaction("EX_glc__D_e").unwrap().lower_bound, -10.);
    }
}
