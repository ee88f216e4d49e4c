//! Temporary model modifications
//!
//! [`Model::scope`] opens a scope and returns a [`ModelScope`] guard. The guard dereferences to
//! the model, and every change made through it is recorded in an undo log. When the guard is
//! dropped the changes are reverted in reverse order, restoring the model exactly (including
//! reaction order). Scopes can be nested.
//!
//! ```rust
//! use c1flux_core::metabolic_model::model::Model;
//! let mut model = Model::new_empty();
//! {
//!     let mut scope = model.scope();
//!     scope.add_reaction_from_formula("DM_a", None, "a_c -->", None, None, None).unwrap();
//!     assert!(scope.has_reaction("DM_a"));
//! }
//! assert!(!model.has_reaction("DM_a"));
//! ```
use std::ops::{Deref, DerefMut};

use indexmap::IndexMap;
use log::debug;

use crate::metabolic_model::gene::Gene;
use crate::metabolic_model::model::Model;
use crate::metabolic_model::reaction::Reaction;
use crate::optimize::objective::ObjectiveSense;

/// A recorded change, holding what is needed to undo it
#[derive(Clone, Debug)]
pub(crate) enum Change {
    /// Restore the bounds of a reaction
    Bounds {
        reaction: String,
        lower_bound: f64,
        upper_bound: f64,
    },
    /// Restore a reaction to a previous state
    Reaction(Reaction),
    /// Remove a reaction which was added
    RemoveReaction(String),
    /// Remove a metabolite which was added
    RemoveMetabolite(String),
    /// Restore a gene to a previous state
    Gene(Gene),
    /// Remove a gene which was added
    RemoveGene(String),
    /// Restore the previous objective
    Objective {
        coefficients: IndexMap<String, f64>,
        sense: ObjectiveSense,
    },
    /// Remove a flux constraint which was added
    RemoveConstraint(String),
}

/// Guard for a model scope, see the [module documentation](self)
pub struct ModelScope<'m> {
    model: &'m mut Model,
}

impl Model {
    /// Open a new scope, changes made through the returned guard are undone when it is dropped
    pub fn scope(&mut self) -> ModelScope<'_> {
        self.history.push(Vec::new());
        ModelScope { model: self }
    }

    /// Apply the inverse of a recorded change, without recording it
    fn undo(&mut self, change: Change) {
        match change {
            Change::Bounds {
                reaction,
                lower_bound,
                upper_bound,
            } => {
                if let Some(rxn) = self.reactions.get_mut(&reaction) {
                    rxn.lower_bound = lower_bound;
                    rxn.upper_bound = upper_bound;
                }
            }
            Change::Reaction(reaction) => {
                self.reactions.insert(reaction.id.clone(), reaction);
            }
            Change::RemoveReaction(id) => {
                self.reactions.shift_remove(&id);
            }
            Change::RemoveMetabolite(id) => {
                self.metabolites.shift_remove(&id);
            }
            Change::Gene(gene) => {
                self.genes.insert(gene.id.clone(), gene);
            }
            Change::RemoveGene(id) => {
                self.genes.shift_remove(&id);
            }
            Change::Objective {
                coefficients,
                sense,
            } => {
                self.objective = coefficients;
                self.objective_sense = sense;
            }
            Change::RemoveConstraint(id) => {
                self.constraints.shift_remove(&id);
            }
        }
    }
}

impl Deref for ModelScope<'_> {
    type Target = Model;

    fn deref(&self) -> &Self::Target {
        self.model
    }
}

impl DerefMut for ModelScope<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.model
    }
}

impl Drop for ModelScope<'_> {
    fn drop(&mut self) {
        let changes = self.model.history.pop().unwrap_or_default();
        debug!("Reverting {} model changes", changes.len());
        for change in changes.into_iter().rev() {
            self.model.undo(change);
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::metabolic_model::gene::GeneActivity;
    use crate::metabolic_model::model::tests::linear_model;
    use crate::metabolic_model::reaction::ReactionActivity;
    use crate::optimize::objective::ObjectiveSense;

    #[test]
    fn scope_reverts_bounds_and_knockouts() {
        let mut model = linear_model();
        {
            let mut scope = model.scope();
            scope.set_bounds("EX_a", -20., 0.).unwrap();
            scope.knock_out_reaction("R1").unwrap();
            scope.knock_out_gene("g1").unwrap();
            scope.set_bounds("EX_a", -30., 0.).unwrap();
            assert_eq!(scope.reaction("EX_a").unwrap().lower_bound, -30.);
            assert_eq!(
                scope.reaction("R1").unwrap().activity,
                ReactionActivity::Inactive
            );
            // g2 still catalyzes R2
            assert_eq!(
                scope.reaction("R2").unwrap().activity,
                ReactionActivity::Active
            );
            scope.knock_out_gene("g2").unwrap();
            assert_eq!(
                scope.reaction("R2").unwrap().activity,
                ReactionActivity::Inactive
            );
        }
        let ex = model.reaction("EX_a").unwrap();
        assert_eq!((ex.lower_bound, ex.upper_bound), (-10., 1000.));
        assert_eq!(model.reaction("R1").unwrap().upper_bound, 1000.);
        assert_eq!(
            model.reaction("R1").unwrap().activity,
            ReactionActivity::Active
        );
        assert_eq!(
            model.reaction("R2").unwrap().activity,
            ReactionActivity::Active
        );
        assert_eq!(model.gene("g1").unwrap().activity, GeneActivity::Active);
        assert_eq!(model.gene("g2").unwrap().activity, GeneActivity::Active);
        assert!(model.history.is_empty());
    }

    #[test]
    fn scope_removes_added_components() {
        let mut model = linear_model();
        let original_order: Vec<String> = model.reactions().keys().cloned().collect();
        {
            let mut scope = model.scope();
            scope
                .add_reaction_from_formula("NEW", None, "b_c --> new_c", None, None, None)
                .unwrap();
            scope
                .add_flux_constraint("c1", &[("R1", 1.), ("NEW", -1.)], 0., 0.)
                .unwrap();
            scope.set_objective_reaction("NEW").unwrap();
            scope.set_objective_sense(ObjectiveSense::Minimize);
            scope
                .add_metabolites_to_reaction("R2", &[("new_c", 1.)])
                .unwrap();
        }
        let order: Vec<String> = model.reactions().keys().cloned().collect();
        assert_eq!(order, original_order);
        assert!(!model.has_metabolite("new_c"));
        assert!(model.flux_constraints().is_empty());
        assert_eq!(model.objective()["EX_b"], 1.);
        assert_eq!(model.objective_sense(), ObjectiveSense::Maximize);
        assert!(!model.reaction("R2").unwrap().metabolites.contains_key("new_c"));
    }

    #[test]
    fn nested_scopes() {
        let mut model = linear_model();
        {
            let mut outer = model.scope();
            outer
                .add_reaction_from_formula("DM_b", None, "b_c -->", None, None, None)
                .unwrap();
            {
                let mut inner = outer.scope();
                inner.set_objective_reaction("DM_b").unwrap();
                inner.knock_out_reaction("R2").unwrap();
            }
            assert!(outer.has_reaction("DM_b"));
            assert_eq!(outer.objective()["EX_b"], 1.);
            assert_eq!(outer.reaction("R2").unwrap().upper_bound, 1000.);
        }
        assert!(!model.has_reaction("DM_b"));
    }

    #[test]
    fn changes_outside_scope_are_kept() {
        let mut model = linear_model();
        model.knock_out_reaction("R1").unwrap();
        {
            let _scope = model.scope();
        }
        assert_eq!(model.reaction("R1").unwrap().upper_bound, 0.);
    }
}
