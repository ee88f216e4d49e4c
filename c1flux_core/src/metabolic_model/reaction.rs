//! This module provides a struct for representing reactions
use derive_builder::Builder;
use indexmap::IndexMap;

use crate::configuration::configuration;
use crate::metabolic_model::formula::format_reaction_formula;
use crate::metabolic_model::gene::{GeneActivity, Gpr};
use crate::utils::hashing::hash_as_hex_string;

/// Represents a reaction in the metabolic model
#[derive(Builder, Debug, Clone, PartialEq)]
pub struct Reaction {
    /// Used to identify the reaction
    pub id: String,
    /// Metabolite stoichiometry of the reaction
    #[builder(default = "IndexMap::new()")]
    pub metabolites: IndexMap<String, f64>,
    /// Human-readable reaction name
    #[builder(default = "None")]
    pub name: Option<String>,
    /// Gene Protein Reaction rule to determine if reaction is active
    #[builder(default = "None")]
    pub gpr: Option<Gpr>,
    /// Lower flux bound
    #[builder(default = "configuration().lower_bound")]
    pub lower_bound: f64,
    /// Upper flux bound
    #[builder(default = "configuration().upper_bound")]
    pub upper_bound: f64,
    /// Reaction subsystem
    #[builder(default = "None")]
    pub subsystem: Option<String>,
    /// Notes about the reaction
    #[builder(default = "None")]
    pub notes: Option<String>,
    /// Reaction Annotations
    #[builder(default = "None")]
    pub annotation: Option<String>,
    /// Reaction Activity, set to inactive when a gene knockout disables the GPR
    #[builder(default = "ReactionActivity::Active")]
    pub activity: ReactionActivity,
}

impl Reaction {
    /// Determine the id to be associated with the forward reaction in the optimization problem
    ///
    /// # Note:
    /// The forward id is "{reaction_id}_forward"
    pub fn get_forward_id(&self) -> String {
        format!("{}_forward", &self.id)
    }

    /// Determine the id to be associated with the reverse reaction in the optimization problem
    ///
    /// # Note:
    /// The reverse id is "{reaction_id}_reverse_{hexidecimal hash of reaction_id}"
    pub fn get_reverse_id(&self) -> String {
        format!("{}_reverse_{}", &self.id, hash_as_hex_string(&self.id))
    }

    /// Determine the upper bound of the variable associated with the forward reaction
    pub(crate) fn get_forward_upper_bound(&self) -> f64 {
        match self.activity {
            ReactionActivity::Active => self.upper_bound.max(0.),
            ReactionActivity::Inactive => 0f64,
        }
    }

    /// Determine the lower bound of the variable associated with the forward reaction
    pub(crate) fn get_forward_lower_bound(&self) -> f64 {
        match self.activity {
            ReactionActivity::Active => self.lower_bound.max(0.),
            ReactionActivity::Inactive => 0f64,
        }
    }

    /// Determine the upper bound of the variable associated with the reverse reaction
    pub(crate) fn get_reverse_upper_bound(&self) -> f64 {
        match self.activity {
            ReactionActivity::Active => (-self.lower_bound).max(0.),
            ReactionActivity::Inactive => 0f64,
        }
    }

    /// Determine the lower bound of the variable associated with the reverse reaction
    pub(crate) fn get_reverse_lower_bound(&self) -> f64 {
        match self.activity {
            ReactionActivity::Active => (-self.upper_bound).max(0.),
            ReactionActivity::Inactive => 0f64,
        }
    }

    /// Whether the reaction is a boundary (exchange, demand or sink) reaction, that is whether
    /// it involves exactly one metabolite
    pub fn is_boundary(&self) -> bool {
        self.metabolites.len() == 1
    }

    /// Whether the reaction can currently carry flux in either direction
    pub fn is_blocked(&self) -> bool {
        self.activity == ReactionActivity::Inactive
            || (self.lower_bound == 0. && self.upper_bound == 0.)
    }

    /// Render the reaction as a formula, e.g. `glc__D_c + atp_c --> g6p_c + adp_c`
    ///
    /// The arrow reflects the current bounds: `<=>` when flux can go both ways, `<--` when it
    /// can only go backwards, and `-->` otherwise.
    pub fn reaction_string(&self) -> String {
        let arrow = if self.lower_bound < 0. && self.upper_bound > 0. {
            "<=>"
        } else if self.lower_bound < 0. {
            "<--"
        } else {
            "-->"
        };
        format_reaction_formula(&self.metabolites, arrow)
    }
}

/// Whether a Reaction is active or inactive
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReactionActivity {
    /// The Reaction is active and can carry flux
    Active,
    /// The Reaction is inactive and can't carry flux
    Inactive,
}

impl From<GeneActivity> for ReactionActivity {
    fn from(value: GeneActivity) -> Self {
        match value {
            GeneActivity::Active => ReactionActivity::Active,
            GeneActivity::Inactive => ReactionActivity::Inactive,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hex1() -> Reaction {
        let mut metabolites = IndexMap::new();
        metabolites.insert("glc__D_c".to_string(), -1.);
        metabolites.insert("atp_c".to_string(), -1.);
        metabolites.insert("g6p_c".to_string(), 1.);
        metabolites.insert("adp_c".to_string(), 1.);
        ReactionBuilder::default()
            .id("HEX1".to_string())
            .metabolites(metabolites)
            .lower_bound(0.)
            .upper_bound(1000.)
            .build()
            .unwrap()
    }

    #[test]
    fn builder_uses_configured_bounds() {
        let rxn = ReactionBuilder::default()
            .id("r".to_string())
            .build()
            .unwrap();
        assert_eq!(rxn.lower_bound, -1000.);
        assert_eq!(rxn.upper_bound, 1000.);
        assert_eq!(rxn.activity, ReactionActivity::Active);
    }

    #[test]
    fn split_variable_bounds() {
        let mut rxn = hex1();
        rxn.lower_bound = -5.;
        rxn.upper_bound = 10.;
        assert_eq!(rxn.get_forward_lower_bound(), 0.);
        assert_eq!(rxn.get_forward_upper_bound(), 10.);
        assert_eq!(rxn.get_reverse_lower_bound(), 0.);
        assert_eq!(rxn.get_reverse_upper_bound(), 5.);

        rxn.lower_bound = 2.;
        assert_eq!(rxn.get_forward_lower_bound(), 2.);
        assert_eq!(rxn.get_reverse_upper_bound(), 0.);

        rxn.lower_bound = -8.;
        rxn.upper_bound = -3.;
        assert_eq!(rxn.get_forward_upper_bound(), 0.);
        assert_eq!(rxn.get_reverse_lower_bound(), 3.);
        assert_eq!(rxn.get_reverse_upper_bound(), 8.);

        rxn.activity = ReactionActivity::Inactive;
        assert_eq!(rxn.get_reverse_upper_bound(), 0.);
        assert!(rxn.is_blocked());
    }

    #[test]
    fn variable_ids() {
        let rxn = hex1();
        assert_eq!(rxn.get_forward_id(), "HEX1_forward");
        assert!(rxn.get_reverse_id().starts_with("HEX1_reverse_"));
        assert_ne!(rxn.get_reverse_id(), hex1().get_forward_id());
    }

    #[test]
    fn reaction_string_follows_bounds() {
        let mut rxn = hex1();
        assert_eq!(
            rxn.reaction_string(),
            "glc__D_c + atp_c --> g6p_c + adp_c"
        );
        rxn.lower_bound = -1000.;
        assert_eq!(
            rxn.reaction_string(),
            "glc__D_c + atp_c <=> g6p_c + adp_c"
        );
        rxn.upper_bound = 0.;
        assert_eq!(
            rxn.reaction_string(),
            "glc__D_c + atp_c <-- g6p_c + adp_c"
        );
        assert!(!rxn.is_boundary());
    }
}
