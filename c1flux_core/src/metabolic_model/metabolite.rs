//! This module provides the metabolite struct representing a metabolite

use std::hash::Hash;

use derive_builder::Builder;

use crate::metabolic_model::formula::{parse_formula, ElementCounts};
use crate::metabolic_model::ModelError;

/// Represents a metabolite
#[derive(Builder, Debug, Clone, PartialEq)]
pub struct Metabolite {
    /// Used to identify the metabolite (must be unique)
    pub id: String,
    /// Human Readable name of the metabolite
    #[builder(default = "None")]
    pub name: Option<String>,
    /// Which compartment the metabolite is in
    #[builder(default = "None")]
    pub compartment: Option<String>,
    /// Electrical charge of the Metabolite
    #[builder(default = "0")]
    pub charge: i32,
    /// Chemical Formula of the metabolite
    #[builder(default = "None")]
    pub formula: Option<String>,
    /// Notes about the metabolite
    #[builder(default = "None")]
    pub notes: Option<String>,
    /// Metabolite annotations
    #[builder(default = "None")]
    pub annotation: Option<String>,
}

impl Metabolite {
    /// Create a metabolite with only an id, and optionally a compartment
    pub fn new(id: &str, compartment: Option<&str>) -> Metabolite {
        Metabolite {
            id: id.to_string(),
            name: None,
            compartment: compartment.map(|c| c.to_string()),
            charge: 0,
            formula: None,
            notes: None,
            annotation: None,
        }
    }

    /// Elemental composition of the metabolite, empty when no formula is known
    pub fn elements(&self) -> Result<ElementCounts, ModelError> {
        match &self.formula {
            Some(formula) => parse_formula(formula),
            None => Ok(ElementCounts::new()),
        }
    }

    /// Number of carbon atoms, zero when no formula is known
    pub fn carbon_atoms(&self) -> Result<f64, ModelError> {
        Ok(self.elements()?.get("C").copied().unwrap_or(0.))
    }
}

impl Hash for Metabolite {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state); // Hash by id
                             // If the metabolite has an associated compartment, also hash by that
        if let Some(ref compartment) = self.compartment {
            compartment.hash(state)
        };
    }
}
