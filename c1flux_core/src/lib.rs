//! Core rust implementation of c1flux, a crate for constraint based and thermodynamic analysis
//! of engineered C1 (formaldehyde, formate, CO2) assimilation pathways in metabolic models.

pub mod configuration;
pub mod flux_analysis;
pub mod io;
pub mod metabolic_model;
pub mod optimize;
pub mod thermodynamics;
mod utils;
pub mod workflows;
