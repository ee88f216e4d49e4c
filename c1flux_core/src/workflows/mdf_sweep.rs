//! Max-min driving force as a function of one concentration bound
use log::info;

use crate::thermodynamics::model::ThermodynamicModel;
use crate::workflows::results::ResultTable;
use crate::workflows::WorkflowError;

/// Which concentration bound of the compound is swept
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BoundSide {
    Lower,
    Upper,
}

/// MDF score (kJ/mol) for each bound value in mM, the model itself is not changed
pub fn sweep_bound(
    model: &ThermodynamicModel,
    compound: &str,
    side: BoundSide,
    values_mm: &[f64],
) -> Result<Vec<f64>, WorkflowError> {
    let scores = values_mm
        .iter()
        .map(|value| -> Result<f64, WorkflowError> {
            let mut swept = model.clone();
            match side {
                BoundSide::Lower => swept.set_bounds_mm(compound, Some(*value), None)?,
                BoundSide::Upper => swept.set_bounds_mm(compound, None, Some(*value))?,
            }
            Ok(swept.mdf_analysis()?.score)
        })
        .collect::<Result<Vec<f64>, WorkflowError>>()?;
    info!(
        "Swept {:?} bound of {} over {} values",
        side,
        compound,
        values_mm.len()
    );
    Ok(scores)
}

/// MDF score for each upper bound of `compound`, given in mM
pub fn sweep_upper_bound(
    model: &ThermodynamicModel,
    compound: &str,
    values_mm: &[f64],
) -> Result<Vec<f64>, WorkflowError> {
    sweep_bound(model, compound, BoundSide::Upper, values_mm)
}

/// MDF score for each lower bound of `compound`, given in mM
pub fn sweep_lower_bound(
    model: &ThermodynamicModel,
    compound: &str,
    values_mm: &[f64],
) -> Result<Vec<f64>, WorkflowError> {
    sweep_bound(model, compound, BoundSide::Lower, values_mm)
}

/// Sweep the same bound in several labelled pathways
///
/// Rows are the bound values in mM and columns the pathway labels.
pub fn sweep_pathways(
    pathways: &[(&str, &ThermodynamicModel)],
    compound: &str,
    side: BoundSide,
    values_mm: &[f64],
) -> Result<ResultTable, WorkflowError> {
    let mut table = ResultTable::new(&format!("{}_mM", compound));
    for (label, model) in pathways {
        let scores = sweep_bound(model, compound, side, values_mm)?;
        for (value, score) in values_mm.iter().zip(scores) {
            table.set(&value.to_string(), label, score);
        }
    }
    Ok(table)
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;
    use crate::thermodynamics::ThermodynamicsError;

    fn linear_pathway(standard_dg: f64) -> ThermodynamicModel {
        let mut model =
            ThermodynamicModel::new(&[("R1", "A <=> B", 1.), ("R2", "B <=> C", 1.)]).unwrap();
        model.set_standard_dg("R1", standard_dg).unwrap();
        model.set_standard_dg("R2", standard_dg).unwrap();
        model
    }

    #[test]
    fn substrate_upper_bound() {
        let model = linear_pathway(-5.);
        let scores = sweep_upper_bound(&model, "A", &[1., 10.]).unwrap();
        assert_abs_diff_eq!(scores[0], 13.562, epsilon = 1e-2);
        assert_abs_diff_eq!(scores[1], 16.416, epsilon = 1e-2);
        // Unchanged
        assert_eq!(model.bounds("A").unwrap(), (1e-6, 1e-2));
    }

    #[test]
    fn product_lower_bound() {
        let model = linear_pathway(-5.);
        let scores = sweep_lower_bound(&model, "C", &[0.001, 1.]).unwrap();
        assert_abs_diff_eq!(scores[0], 16.416, epsilon = 1e-2);
        // (10 + RT ln(1e-2 / 1e-3)) / 2
        assert_abs_diff_eq!(scores[1], 7.854, epsilon = 1e-2);
    }

    #[test]
    fn pathway_table() {
        let favourable = linear_pathway(-5.);
        let neutral = linear_pathway(0.);
        let table = sweep_pathways(
            &[("favourable", &favourable), ("neutral", &neutral)],
            "A",
            BoundSide::Upper,
            &[1., 10.],
        )
        .unwrap();
        assert_eq!(table.index_name, "A_mM");
        assert_eq!(table.row_labels().collect::<Vec<_>>(), vec!["1", "10"]);
        assert_abs_diff_eq!(table.get("10", "favourable"), 16.416, epsilon = 1e-2);
        // RT ln(1e-2 / 1e-6) / 2
        assert_abs_diff_eq!(table.get("10", "neutral"), 11.416, epsilon = 1e-2);
    }

    #[test]
    fn unknown_compound() {
        let model = linear_pathway(-5.);
        assert!(matches!(
            sweep_upper_bound(&model, "formate", &[1.]),
            Err(WorkflowError::Thermodynamics(ThermodynamicsError::UnknownCompound(_)))
        ));
    }
}
