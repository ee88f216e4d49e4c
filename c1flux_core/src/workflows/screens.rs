//! Screening the production of biomass precursors across pathway variants
use std::path::PathBuf;

use log::{info, warn};

use crate::flux_analysis::fba::fba;
use crate::io::flux_table::write_flux_table;
use crate::metabolic_model::model::Model;
use crate::workflows::objective::change_objective_to_product;
use crate::workflows::results::ResultTable;
use crate::workflows::variant::PathwayVariant;
use crate::workflows::{round_to, WorkflowError};

/// Product name which keeps the objective of the model
pub const BIOMASS: &str = "biomass";

/// The twelve precursor metabolites of central metabolism, and biomass
pub const PRECURSORS: [&str; 13] = [
    BIOMASS, "g6p_c", "f6p_c", "r5p_c", "e4p_c", "g3p_c", "3pg_c", "pep_c", "pyr_c", "accoa_c",
    "akg_c", "succoa_c", "oaa_c",
];

/// Maximal production of each product, for each pathway variant
#[derive(Clone, Debug)]
pub struct PrecursorScreen {
    pub variants: Vec<PathwayVariant>,
    pub products: Vec<String>,
    /// Directory receiving one flux table per variant and product
    pub flux_output: Option<PathBuf>,
}

impl PrecursorScreen {
    /// Screen all of [`PRECURSORS`]
    pub fn new(variants: Vec<PathwayVariant>) -> Self {
        PrecursorScreen {
            variants,
            products: PRECURSORS.iter().map(|p| p.to_string()).collect(),
            flux_output: None,
        }
    }

    pub fn with_products(mut self, products: &[&str]) -> Self {
        self.products = products.iter().map(|p| p.to_string()).collect();
        self
    }

    pub fn with_flux_output<P: Into<PathBuf>>(mut self, dir: P) -> Self {
        self.flux_output = Some(dir.into());
        self
    }

    /// Run the screen, the model is unchanged afterwards
    ///
    /// Returns a table with one row per product and one column per variant, holding the
    /// optimal objective rounded to 3 decimals. Products which can't be optimized (e.g. an
    /// infeasible variant) are recorded as NaN, while missing metabolites or reactions are
    /// errors.
    pub fn run(&self, model: &mut Model) -> Result<ResultTable, WorkflowError> {
        let mut table = ResultTable::new("product");
        for variant in &self.variants {
            let mut variant_model = model.scope();
            variant.apply(&mut variant_model)?;
            for product in &self.products {
                let mut product_model = variant_model.scope();
                if product != BIOMASS {
                    change_objective_to_product(&mut product_model, product)?;
                }
                let solution = fba(&product_model)?;
                let value = match (solution.is_optimal(), solution.objective_value) {
                    (true, Some(value)) => round_to(value, 3),
                    _ => {
                        warn!(
                            "No optimum for {} in variant {}: {:?}",
                            product, variant.label, solution.status
                        );
                        f64::NAN
                    }
                };
                table.set(product, &variant.label, value);
                if let (Some(dir), true) = (&self.flux_output, solution.is_optimal()) {
                    write_flux_table(&product_model, &solution, dir, &variant.label, product)?;
                }
            }
        }
        info!(
            "Screened {} products in {} variants",
            self.products.len(),
            self.variants.len()
        );
        Ok(table)
    }
}
