//! Export of per-reaction flux tables
use std::fs;
use std::path::{Path, PathBuf};

use log::info;
use serde::Serialize;
use thiserror::Error;

use crate::flux_analysis::fba::Solution;
use crate::metabolic_model::model::Model;
use crate::optimize::OptimizationStatus;

/// One row of a flux table
#[derive(Clone, Debug, Serialize)]
pub struct FluxRecord<'a> {
    #[serde(rename = "N")]
    pub number: usize,
    #[serde(rename = "RxnID")]
    pub id: &'a str,
    #[serde(rename = "RxnName")]
    pub name: &'a str,
    #[serde(rename = "Reaction")]
    pub reaction: String,
    #[serde(rename = "SubSystem")]
    pub subsystem: &'a str,
    #[serde(rename = "LowerBound")]
    pub lower_bound: f64,
    #[serde(rename = "UpperBound")]
    pub upper_bound: f64,
    #[serde(rename = "Flux")]
    pub flux: f64,
    #[serde(rename = "abs(Flux)")]
    pub abs_flux: f64,
}

/// Build the rows of the flux table for every reaction of the model, numbered from 1
pub fn flux_records<'a>(model: &'a Model, solution: &Solution) -> Vec<FluxRecord<'a>> {
    model
        .reactions()
        .values()
        .enumerate()
        .map(|(index, rxn)| {
            let flux = solution.flux(&rxn.id).unwrap_or(0.);
            FluxRecord {
                number: index + 1,
                id: &rxn.id,
                name: rxn.name.as_deref().unwrap_or(""),
                reaction: rxn.reaction_string(),
                subsystem: rxn.subsystem.as_deref().unwrap_or(""),
                lower_bound: rxn.lower_bound,
                upper_bound: rxn.upper_bound,
                flux,
                abs_flux: flux.abs(),
            }
        })
        .collect()
}

/// Write the flux table of a solution to `{dir}/{label}_{product}.csv`
///
/// The directory is created if needed. Returns the path of the written file.
pub fn write_flux_table<P: AsRef<Path>>(
    model: &Model,
    solution: &Solution,
    dir: P,
    label: &str,
    product: &str,
) -> Result<PathBuf, FluxTableError> {
    if !solution.is_optimal() {
        return Err(FluxTableError::NoFluxes(solution.status));
    }
    let dir = dir.as_ref();
    fs::create_dir_all(dir)
        .map_err(|err| FluxTableError::UnableToWrite(format!("{}: {}", dir.display(), err)))?;
    let path = dir.join(format!("{}_{}.csv", label, product));
    let mut writer = csv::Writer::from_path(&path)?;
    for record in flux_records(model, solution) {
        writer.serialize(record)?;
    }
    writer
        .flush()
        .map_err(|err| FluxTableError::UnableToWrite(format!("{}: {}", path.display(), err)))?;
    info!("Flux table written to {}", path.display());
    Ok(path)
}

#[derive(Debug, Error)]
pub enum FluxTableError {
    #[error("Solution with status {0:?} has no fluxes to write")]
    NoFluxes(OptimizationStatus),
    #[error("Unable to write flux table {0}")]
    UnableToWrite(String),
    #[error("Error writing CSV: {0}")]
    Csv(#[from] csv::Error),
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;
    use crate::flux_analysis::pfba::pfba;
    use crate::io::json::tests::toy_model;

    #[test]
    fn write_table() {
        let model = toy_model();
        let solution = pfba(&model, 1.).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let out_dir = dir.path().join("fluxes");
        let path = write_flux_table(&model, &solution, &out_dir, "WT", "biomass").unwrap();
        assert_eq!(path, out_dir.join("WT_biomass.csv"));

        let mut reader = csv::Reader::from_path(&path).unwrap();
        let headers = reader.headers().unwrap().clone();
        assert_eq!(
            headers.iter().collect::<Vec<_>>(),
            vec![
                "N",
                "RxnID",
                "RxnName",
                "Reaction",
                "SubSystem",
                "LowerBound",
                "UpperBound",
                "Flux",
                "abs(Flux)"
            ]
        );
        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), model.reactions().len());
        assert_eq!(&rows[0][0], "1");
        assert_eq!(&rows[0][1], "EX_glc__D_e");
        let uptake: f64 = rows[0][7].parse().unwrap();
        let abs_uptake: f64 = rows[0][8].parse().unwrap();
        assert_abs_diff_eq!(uptake, -10., epsilon = 1e-3);
        assert_abs_diff_eq!(abs_uptake, 10., epsilon = 1e-3);
        assert_eq!(&rows[2][4], "Glycolysis");
    }

    #[test]
    fn non_optimal_solution() {
        let model = toy_model();
        let solution = Solution {
            status: OptimizationStatus::Infeasible,
            objective_value: None,
            fluxes: Default::default(),
            shadow_prices: Default::default(),
        };
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            write_flux_table(&model, &solution, dir.path(), "WT", "biomass"),
            Err(FluxTableError::NoFluxes(OptimizationStatus::Infeasible))
        ));
    }
}
