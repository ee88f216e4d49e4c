//! Module for reading and writing Models, reaction tables, flux tables and SBtab files
pub mod flux_table;
pub mod gpr_parse;
pub mod json;
pub mod reaction_table;
pub mod sbtab;
