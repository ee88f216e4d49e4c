//! Pathway variants, the set of modifications that turn a base model into an engineered strain
use std::path::PathBuf;

use log::info;

use crate::metabolic_model::model::Model;
use crate::workflows::WorkflowError;

/// Modifications describing one pathway variant
#[derive(Clone, Debug, Default)]
pub struct PathwayVariant {
    /// Used as column label in result tables and in flux table file names
    pub label: String,
    /// Reaction tables added in order
    pub reaction_tables: Vec<PathBuf>,
    /// Reactions knocked out after the reactions were added
    pub knockouts: Vec<String>,
    /// Metabolites combined into existing reactions, e.g. extra ATP hydrolysis of an enzyme
    pub stoichiometry_changes: Vec<(String, Vec<(String, f64)>)>,
    /// Bound changes applied last
    pub bounds: Vec<(String, f64, f64)>,
}

impl PathwayVariant {
    pub fn new(label: &str) -> Self {
        PathwayVariant {
            label: label.to_string(),
            ..Default::default()
        }
    }

    pub fn with_reaction_table<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.reaction_tables.push(path.into());
        self
    }

    pub fn with_knockouts(mut self, reactions: &[&str]) -> Self {
        self.knockouts
            .extend(reactions.iter().map(|r| r.to_string()));
        self
    }

    pub fn with_stoichiometry_change(mut self, reaction: &str, metabolites: &[(&str, f64)]) -> Self {
        self.stoichiometry_changes.push((
            reaction.to_string(),
            metabolites
                .iter()
                .map(|(m, c)| (m.to_string(), *c))
                .collect(),
        ));
        self
    }

    pub fn with_bounds(mut self, reaction: &str, lower_bound: f64, upper_bound: f64) -> Self {
        self.bounds
            .push((reaction.to_string(), lower_bound, upper_bound));
        self
    }

    /// Apply the modifications to a model, normally one opened with
    /// [`Model::scope`](crate::metabolic_model::model::Model::scope)
    pub fn apply(&self, model: &mut Model) -> Result<(), WorkflowError> {
        info!("Applying pathway variant {}", self.label);
        for table in &self.reaction_tables {
            model.add_reactions_from_table(table)?;
        }
        for reaction in &self.knockouts {
            model.knock_out_reaction(reaction)?;
        }
        for (reaction, metabolites) in &self.stoichiometry_changes {
            let metabolites: Vec<(&str, f64)> =
                metabolites.iter().map(|(m, c)| (m.as_str(), *c)).collect();
            model.add_metabolites_to_reaction(reaction, &metabolites)?;
        }
        for (reaction, lower_bound, upper_bound) in &self.bounds {
            model.set_bounds(reaction, *lower_bound, *upper_bound)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::json::tests::toy_model;
    use crate::workflows::tests::reaction_table_path;

    #[test]
    fn apply_in_scope() {
        let mut model = toy_model();
        let variant = PathwayVariant::new("bypass")
            .with_reaction_table(reaction_table_path("toy_bypass.csv"))
            .with_knockouts(&["PGI"])
            .with_stoichiometry_change("G6PX", &[("atp_c", -1.), ("adp_c", 1.)])
            .with_bounds("EX_glc__D_e", -5., 1000.);
        {
            let mut scope = model.scope();
            variant.apply(&mut scope).unwrap();
            assert!(scope.has_reaction("G6PDH"));
            assert_eq!(scope.reaction("PGI").unwrap().upper_bound, 0.);
            assert_eq!(scope.reaction("G6PX").unwrap().metabolites["atp_c"], -1.);
            assert_eq!(scope.reaction("EX_glc__D_e").unwrap().lower_bound, -5.);
        }
        assert!(!model.has_reaction("G6PDH"));
        assert_eq!(model.reaction("PGI").unwrap().lower_bound, -1000.);
        assert!(!model
            .reaction("G6PX")
            .unwrap()
            .metabolites
            .contains_key("atp_c"));
    }

    #[test]
    fn unknown_knockout() {
        let mut model = toy_model();
        let variant = PathwayVariant::new("broken").with_knockouts(&["NOPE"]);
        assert!(matches!(
            variant.apply(&mut model.scope()),
            Err(WorkflowError::Model(_))
        ));
    }
}
