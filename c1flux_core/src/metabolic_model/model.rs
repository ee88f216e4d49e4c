//! This module provides the Model struct for representing an entire metabolic model
use indexmap::IndexMap;
use log::{debug, info};

use crate::configuration::configuration;
use crate::metabolic_model::formula::{parse_reaction_formula, ElementCounts};
use crate::metabolic_model::gene::{Gene, GeneActivity};
use crate::metabolic_model::metabolite::Metabolite;
use crate::metabolic_model::reaction::{Reaction, ReactionActivity, ReactionBuilder};
use crate::metabolic_model::scope::Change;
use crate::metabolic_model::ModelError;
use crate::optimize::objective::ObjectiveSense;

/// Entries smaller than this are dropped from mass balance results
const MASS_BALANCE_TOLERANCE: f64 = 1e-9;

/// Represents a Genome Scale Metabolic Model
///
/// Reactions, metabolites, genes, the objective and additional flux constraints are only
/// modified through methods, so that changes made inside a [`ModelScope`](super::scope::ModelScope)
/// can be rolled back.
#[derive(Clone, Debug)]
pub struct Model {
    /// Map of reaction ids to Reactions
    pub(crate) reactions: IndexMap<String, Reaction>,
    /// Map of gene ids to Genes
    pub(crate) genes: IndexMap<String, Gene>,
    /// Map of metabolite ids to Metabolites
    pub(crate) metabolites: IndexMap<String, Metabolite>,
    /// Map of reaction ids to objective function coefficients
    pub(crate) objective: IndexMap<String, f64>,
    /// Whether the objective is maximized or minimized
    pub(crate) objective_sense: ObjectiveSense,
    /// Additional linear constraints on reaction fluxes
    pub(crate) constraints: IndexMap<String, FluxConstraint>,
    /// Id associated with the Model
    pub id: Option<String>,
    /// Compartments in the model
    ///
    /// An IndexMap<String, String> of {short name: long name}
    pub compartments: Option<IndexMap<String, String>>,
    /// A version identifier for the Model, stored as a string
    pub version: Option<String>,
    /// Undo log, one frame per open scope
    pub(crate) history: Vec<Vec<Change>>,
}

/// A linear constraint on reaction fluxes, `lower_bound <= sum(coef * flux) <= upper_bound`
#[derive(Clone, Debug, PartialEq)]
pub struct FluxConstraint {
    /// Id of the constraint
    pub id: String,
    /// Reaction id to coefficient
    pub coefficients: IndexMap<String, f64>,
    /// Lowest value of the combination
    pub lower_bound: f64,
    /// Highest value of the combination
    pub upper_bound: f64,
}

impl Default for Model {
    fn default() -> Self {
        Model::new_empty()
    }
}

impl Model {
    pub fn new_empty() -> Self {
        Model {
            reactions: IndexMap::new(),
            genes: IndexMap::new(),
            metabolites: IndexMap::new(),
            objective: IndexMap::new(),
            objective_sense: ObjectiveSense::Maximize,
            constraints: IndexMap::new(),
            id: None,
            compartments: None,
            version: None,
            history: Vec::new(),
        }
    }

    /// Create an independent copy of the model, without any open scopes
    pub fn copy(&self) -> Model {
        let mut copy = self.clone();
        copy.history.clear();
        copy
    }

    // region Accessors
    pub fn reactions(&self) -> &IndexMap<String, Reaction> {
        &self.reactions
    }

    pub fn metabolites(&self) -> &IndexMap<String, Metabolite> {
        &self.metabolites
    }

    pub fn genes(&self) -> &IndexMap<String, Gene> {
        &self.genes
    }

    /// Map of reaction ids to objective coefficients
    pub fn objective(&self) -> &IndexMap<String, f64> {
        &self.objective
    }

    pub fn objective_sense(&self) -> ObjectiveSense {
        self.objective_sense
    }

    pub fn flux_constraints(&self) -> &IndexMap<String, FluxConstraint> {
        &self.constraints
    }

    /// Look up a reaction by id
    pub fn reaction(&self, id: &str) -> Result<&Reaction, ModelError> {
        self.reactions
            .get(id)
            .ok_or_else(|| ModelError::ReactionNotFound(id.to_string()))
    }

    /// Look up a metabolite by id
    pub fn metabolite(&self, id: &str) -> Result<&Metabolite, ModelError> {
        self.metabolites
            .get(id)
            .ok_or_else(|| ModelError::MetaboliteNotFound(id.to_string()))
    }

    /// Look up a gene by id
    pub fn gene(&self, id: &str) -> Result<&Gene, ModelError> {
        self.genes
            .get(id)
            .ok_or_else(|| ModelError::GeneNotFound(id.to_string()))
    }

    pub fn has_reaction(&self, id: &str) -> bool {
        self.reactions.contains_key(id)
    }

    pub fn has_metabolite(&self, id: &str) -> bool {
        self.metabolites.contains_key(id)
    }
    // endregion Accessors

    // region Adding components
    /// Add a metabolite to the model
    ///
    /// # Examples
    /// ```rust
    /// use c1flux_core::metabolic_model::metabolite::Metabolite;
    /// use c1flux_core::metabolic_model::model::Model;
    /// let mut model = Model::new_empty();
    /// model.add_metabolite(Metabolite::new("fald_c", Some("c"))).unwrap();
    /// assert!(model.has_metabolite("fald_c"));
    /// ```
    pub fn add_metabolite(&mut self, metabolite: Metabolite) -> Result<(), ModelError> {
        if self.metabolites.contains_key(&metabolite.id) {
            return Err(ModelError::DuplicateMetabolite(metabolite.id));
        }
        self.record(Change::RemoveMetabolite(metabolite.id.clone()));
        self.metabolites.insert(metabolite.id.clone(), metabolite);
        Ok(())
    }

    /// Add a gene to the model, a gene with the same id already present is kept as is
    ///
    /// # Examples
    /// ```rust
    /// use c1flux_core::metabolic_model::gene::GeneBuilder;
    /// use c1flux_core::metabolic_model::model::Model;
    /// let mut model=Model::new_empty();
    /// let new_gene = GeneBuilder::default().id("new_gene".to_string()).build().unwrap();
    /// model.add_gene(new_gene);
    /// ```
    pub fn add_gene(&mut self, gene: Gene) {
        if self.genes.contains_key(&gene.id) {
            debug!("Gene {} already in model", gene.id);
            return;
        }
        self.record(Change::RemoveGene(gene.id.clone()));
        self.genes.insert(gene.id.clone(), gene);
    }

    /// Add a reaction to the model
    ///
    /// Every metabolite in the stoichiometry must already be part of the model. Genes referenced
    /// by the GPR which are not yet known are added as active genes, and the activity of the
    /// reaction is evaluated from its GPR.
    ///
    /// # Examples
    /// ```rust
    /// use c1flux_core::metabolic_model::model::Model;
    /// use c1flux_core::metabolic_model::reaction::ReactionBuilder;
    /// let mut model = Model::new_empty();
    /// let new_reaction = ReactionBuilder::default().id("new_reaction".to_string()).build().unwrap();
    /// model.add_reaction(new_reaction).unwrap();
    /// ```
    pub fn add_reaction(&mut self, mut reaction: Reaction) -> Result<(), ModelError> {
        if self.reactions.contains_key(&reaction.id) {
            return Err(ModelError::DuplicateReaction(reaction.id));
        }
        if reaction.lower_bound > reaction.upper_bound {
            return Err(ModelError::InvalidBounds {
                id: reaction.id,
                lower_bound: reaction.lower_bound,
                upper_bound: reaction.upper_bound,
            });
        }
        if let Some(missing) = reaction
            .metabolites
            .keys()
            .find(|m| !self.metabolites.contains_key(*m))
        {
            return Err(ModelError::MetaboliteNotFound(missing.clone()));
        }
        if let Some(gpr) = &reaction.gpr {
            for gene_id in gpr.gene_ids() {
                self.add_gene(Gene::new_active(&gene_id));
            }
            if gpr.eval(&self.genes)? == GeneActivity::Inactive {
                reaction.activity = ReactionActivity::Inactive;
            }
        }
        self.record(Change::RemoveReaction(reaction.id.clone()));
        self.reactions.insert(reaction.id.clone(), reaction);
        Ok(())
    }

    /// Add a reaction described by a formula such as `ru5p__D_c + fald_c <=> h6p_c`
    ///
    /// Metabolites not yet in the model are created. When the model knows the compartment
    /// given by the `_x` suffix of a new metabolite id, the metabolite is placed in it. Bounds
    /// not given explicitly follow the arrow of the formula.
    pub fn add_reaction_from_formula(
        &mut self,
        id: &str,
        name: Option<&str>,
        formula: &str,
        subsystem: Option<&str>,
        lower_bound: Option<f64>,
        upper_bound: Option<f64>,
    ) -> Result<(), ModelError> {
        if self.reactions.contains_key(id) {
            return Err(ModelError::DuplicateReaction(id.to_string()));
        }
        let parsed = parse_reaction_formula(formula)?;
        let config = configuration();
        let (default_lb, default_ub) = parsed
            .direction
            .default_bounds(config.lower_bound, config.upper_bound);
        let lower_bound = lower_bound.unwrap_or(default_lb);
        let upper_bound = upper_bound.unwrap_or(default_ub);
        if lower_bound > upper_bound {
            return Err(ModelError::InvalidBounds {
                id: id.to_string(),
                lower_bound,
                upper_bound,
            });
        }
        for met_id in parsed.stoichiometry.keys() {
            if !self.metabolites.contains_key(met_id) {
                let compartment = self.compartment_from_suffix(met_id);
                debug!("Creating metabolite {} for reaction {}", met_id, id);
                self.add_metabolite(Metabolite::new(met_id, compartment.as_deref()))?;
            }
        }
        let reaction = ReactionBuilder::default()
            .id(id.to_string())
            .name(name.map(|n| n.to_string()))
            .metabolites(parsed.stoichiometry)
            .subsystem(subsystem.map(|s| s.to_string()))
            .lower_bound(lower_bound)
            .upper_bound(upper_bound)
            .build()
            .map_err(|err| ModelError::InvalidReactionFormula {
                formula: formula.to_string(),
                reason: err.to_string(),
            })?;
        self.add_reaction(reaction)
    }

    /// Find the compartment named by a trailing `_x` in a metabolite id, if the model knows it
    fn compartment_from_suffix(&self, metabolite_id: &str) -> Option<String> {
        let (_, suffix) = metabolite_id.rsplit_once('_')?;
        let known = match &self.compartments {
            Some(compartments) => compartments.contains_key(suffix),
            None => self
                .metabolites
                .values()
                .any(|m| m.compartment.as_deref() == Some(suffix)),
        };
        known.then(|| suffix.to_string())
    }

    /// Add a linear constraint over reaction fluxes, e.g. `RBPC - 3 RBPO = 0`
    pub fn add_flux_constraint(
        &mut self,
        id: &str,
        coefficients: &[(&str, f64)],
        lower_bound: f64,
        upper_bound: f64,
    ) -> Result<(), ModelError> {
        if self.constraints.contains_key(id) {
            return Err(ModelError::DuplicateConstraint(id.to_string()));
        }
        if lower_bound > upper_bound {
            return Err(ModelError::InvalidBounds {
                id: id.to_string(),
                lower_bound,
                upper_bound,
            });
        }
        let mut combination = IndexMap::new();
        for (rxn_id, coef) in coefficients {
            self.reaction(rxn_id)?;
            *combination.entry(rxn_id.to_string()).or_insert(0.) += coef;
        }
        self.record(Change::RemoveConstraint(id.to_string()));
        self.constraints.insert(
            id.to_string(),
            FluxConstraint {
                id: id.to_string(),
                coefficients: combination,
                lower_bound,
                upper_bound,
            },
        );
        Ok(())
    }
    // endregion Adding components

    // region Modifying reactions
    /// Set both flux bounds of a reaction
    pub fn set_bounds(
        &mut self,
        id: &str,
        lower_bound: f64,
        upper_bound: f64,
    ) -> Result<(), ModelError> {
        let reaction = self.reaction(id)?;
        if lower_bound > upper_bound {
            return Err(ModelError::InvalidBounds {
                id: id.to_string(),
                lower_bound,
                upper_bound,
            });
        }
        let previous = Change::Bounds {
            reaction: id.to_string(),
            lower_bound: reaction.lower_bound,
            upper_bound: reaction.upper_bound,
        };
        self.record(previous);
        if let Some(reaction) = self.reactions.get_mut(id) {
            reaction.lower_bound = lower_bound;
            reaction.upper_bound = upper_bound;
        }
        Ok(())
    }

    /// Set the lower flux bound of a reaction, keeping the upper bound
    pub fn set_lower_bound(&mut self, id: &str, lower_bound: f64) -> Result<(), ModelError> {
        let upper_bound = self.reaction(id)?.upper_bound;
        self.set_bounds(id, lower_bound, upper_bound)
    }

    /// Set the upper flux bound of a reaction, keeping the lower bound
    pub fn set_upper_bound(&mut self, id: &str, upper_bound: f64) -> Result<(), ModelError> {
        let lower_bound = self.reaction(id)?.lower_bound;
        self.set_bounds(id, lower_bound, upper_bound)
    }

    /// Knock out a reaction by setting both of its bounds to zero
    pub fn knock_out_reaction(&mut self, id: &str) -> Result<(), ModelError> {
        self.set_bounds(id, 0., 0.)?;
        info!("Knocked out reaction {}", id);
        Ok(())
    }

    /// Knock out several reactions, stopping at the first unknown id
    pub fn knock_out_reactions(&mut self, ids: &[&str]) -> Result<(), ModelError> {
        ids.iter().try_for_each(|id| self.knock_out_reaction(id))
    }

    /// Knock out a gene
    ///
    /// The gene becomes inactive, and every reaction whose GPR no longer evaluates as active
    /// is made inactive, so it can't carry flux.
    pub fn knock_out_gene(&mut self, id: &str) -> Result<(), ModelError> {
        let gene = self.gene(id)?.clone();
        self.record(Change::Gene(gene));
        if let Some(gene) = self.genes.get_mut(id) {
            gene.activity = GeneActivity::Inactive;
        }
        let mut disabled = Vec::new();
        for reaction in self.reactions.values() {
            let Some(gpr) = &reaction.gpr else {
                continue;
            };
            if reaction.activity == ReactionActivity::Active
                && gpr.gene_ids().contains(id)
                && gpr.eval(&self.genes)? == GeneActivity::Inactive
            {
                disabled.push(reaction.clone());
            }
        }
        for reaction in disabled {
            debug!("Reaction {} disabled by knockout of {}", reaction.id, id);
            let rxn_id = reaction.id.clone();
            self.record(Change::Reaction(reaction));
            if let Some(reaction) = self.reactions.get_mut(&rxn_id) {
                reaction.activity = ReactionActivity::Inactive;
            }
        }
        info!("Knocked out gene {}", id);
        Ok(())
    }

    /// Add metabolites to an existing reaction
    ///
    /// Coefficients are added to existing ones, and metabolites whose coefficient ends up zero
    /// are removed from the reaction.
    pub fn add_metabolites_to_reaction(
        &mut self,
        id: &str,
        metabolites: &[(&str, f64)],
    ) -> Result<(), ModelError> {
        let previous = self.reaction(id)?.clone();
        for (met_id, _) in metabolites {
            self.metabolite(met_id)?;
        }
        self.record(Change::Reaction(previous));
        if let Some(reaction) = self.reactions.get_mut(id) {
            for (met_id, coef) in metabolites {
                *reaction
                    .metabolites
                    .entry(met_id.to_string())
                    .or_insert(0.) += coef;
            }
            reaction.metabolites.retain(|_, coef| *coef != 0.);
        }
        Ok(())
    }
    // endregion Modifying reactions

    // region Objective
    /// Replace the objective with a linear combination of reaction fluxes
    pub fn set_objective(&mut self, coefficients: &[(&str, f64)]) -> Result<(), ModelError> {
        let mut objective = IndexMap::new();
        for (rxn_id, coef) in coefficients {
            self.reaction(rxn_id)?;
            objective.insert(rxn_id.to_string(), *coef);
        }
        self.record(Change::Objective {
            coefficients: self.objective.clone(),
            sense: self.objective_sense,
        });
        info!("Objective set to {:?}", objective);
        self.objective = objective;
        Ok(())
    }

    /// Make a single reaction the objective, with coefficient 1
    pub fn set_objective_reaction(&mut self, id: &str) -> Result<(), ModelError> {
        self.set_objective(&[(id, 1.)])
    }

    /// Change whether the objective is maximized or minimized
    pub fn set_objective_sense(&mut self, sense: ObjectiveSense) {
        self.record(Change::Objective {
            coefficients: self.objective.clone(),
            sense: self.objective_sense,
        });
        self.objective_sense = sense;
    }
    // endregion Objective

    // region Queries
    /// Reactions involving exactly one metabolite (exchanges, demands and sinks)
    pub fn boundary_reactions(&self) -> Vec<&Reaction> {
        self.reactions.values().filter(|r| r.is_boundary()).collect()
    }

    /// Elemental and charge imbalance of a reaction
    ///
    /// Returns the net count of every element (and `charge`) over the reaction; a balanced
    /// reaction gives an empty map. Metabolites without a formula contribute no elements.
    pub fn check_mass_balance(&self, id: &str) -> Result<ElementCounts, ModelError> {
        let reaction = self.reaction(id)?;
        let mut balance = ElementCounts::new();
        for (met_id, coef) in &reaction.metabolites {
            let metabolite = self.metabolite(met_id)?;
            for (element, count) in metabolite.elements()? {
                *balance.entry(element).or_insert(0.) += coef * count;
            }
            if metabolite.charge != 0 {
                *balance.entry("charge".to_string()).or_insert(0.) +=
                    coef * metabolite.charge as f64;
            }
        }
        balance.retain(|_, v| v.abs() > MASS_BALANCE_TOLERANCE);
        Ok(balance)
    }
    // endregion Queries

    /// Push a change onto the innermost open scope, if there is one
    pub(crate) fn record(&mut self, change: Change) {
        if let Some(frame) = self.history.last_mut() {
            frame.push(change);
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::metabolic_model::gene::{Gpr, GprOperatorType};
    use crate::metabolic_model::metabolite::MetaboliteBuilder;

    /// Small linear pathway `EX_a: a_e <=>`, `Ta: a_e --> a_c`, `R1: a_c --> b_c`,
    /// `R2: a_c --> b_c`, `EX_b: b_c -->`
    pub(crate) fn linear_model() -> Model {
        let mut model = Model::new_empty();
        for (id, compartment, formula) in [
            ("a_e", "e", "C2H4O2"),
            ("a_c", "c", "C2H4O2"),
            ("b_c", "c", "C2H4O2"),
        ] {
            let met = MetaboliteBuilder::default()
                .id(id.to_string())
                .compartment(Some(compartment.to_string()))
                .formula(Some(formula.to_string()))
                .build()
                .unwrap();
            model.add_metabolite(met).unwrap();
        }
        model
            .add_reaction_from_formula("EX_a", None, "a_e <=> ", None, Some(-10.), None)
            .unwrap();
        model
            .add_reaction_from_formula("Ta", None, "a_e --> a_c", None, None, None)
            .unwrap();
        let r1 = ReactionBuilder::default()
            .id("R1".to_string())
            .metabolites(IndexMap::from([
                ("a_c".to_string(), -1.),
                ("b_c".to_string(), 1.),
            ]))
            .gpr(Some(Gpr::new_gene_node("g1")))
            .lower_bound(0.)
            .build()
            .unwrap();
        model.add_reaction(r1).unwrap();
        let r2 = ReactionBuilder::default()
            .id("R2".to_string())
            .metabolites(IndexMap::from([
                ("a_c".to_string(), -1.),
                ("b_c".to_string(), 1.),
            ]))
            .gpr(Some(
                Gpr::new_binary_operation(
                    Gpr::new_gene_node("g1"),
                    GprOperatorType::Or,
                    Gpr::new_gene_node("g2"),
                )
                .unwrap(),
            ))
            .lower_bound(0.)
            .build()
            .unwrap();
        model.add_reaction(r2).unwrap();
        model
            .add_reaction_from_formula("EX_b", None, "b_c --> ", None, None, None)
            .unwrap();
        model.set_objective_reaction("EX_b").unwrap();
        model
    }

    #[test]
    fn adding_components() {
        let model = linear_model();
        assert_eq!(model.reactions().len(), 5);
        assert_eq!(model.metabolites().len(), 3);
        assert_eq!(model.genes().len(), 2);
        assert_eq!(model.reaction("EX_a").unwrap().lower_bound, -10.);
        assert_eq!(model.reaction("Ta").unwrap().lower_bound, 0.);
        assert_eq!(model.objective()["EX_b"], 1.);
        assert_eq!(model.objective_sense(), ObjectiveSense::Maximize);
    }

    #[test]
    fn duplicates_and_missing_ids() {
        let mut model = linear_model();
        assert_eq!(
            model.add_reaction_from_formula("R1", None, "a_c --> b_c", None, None, None),
            Err(ModelError::DuplicateReaction("R1".to_string()))
        );
        assert_eq!(
            model.add_metabolite(Metabolite::new("a_c", None)),
            Err(ModelError::DuplicateMetabolite("a_c".to_string()))
        );
        assert_eq!(
            model.knock_out_reaction("NOPE"),
            Err(ModelError::ReactionNotFound("NOPE".to_string()))
        );
        assert_eq!(
            model.knock_out_gene("g9"),
            Err(ModelError::GeneNotFound("g9".to_string()))
        );
        let unknown_met = ReactionBuilder::default()
            .id("R3".to_string())
            .metabolites(IndexMap::from([("z_c".to_string(), -1.)]))
            .build()
            .unwrap();
        assert_eq!(
            model.add_reaction(unknown_met),
            Err(ModelError::MetaboliteNotFound("z_c".to_string()))
        );
    }

    #[test]
    fn formula_creates_metabolites_in_known_compartments() {
        let mut model = linear_model();
        model
            .add_reaction_from_formula(
                "FALDS",
                Some("formaldehyde synthesis"),
                "b_c + fald_c <=> 2 c_c",
                Some("C1"),
                None,
                Some(50.),
            )
            .unwrap();
        let rxn = model.reaction("FALDS").unwrap();
        assert_eq!(rxn.lower_bound, -1000.);
        assert_eq!(rxn.upper_bound, 50.);
        assert_eq!(rxn.metabolites["c_c"], 2.);
        assert_eq!(
            model.metabolite("fald_c").unwrap().compartment.as_deref(),
            Some("c")
        );
        model
            .add_reaction_from_formula("Tx", None, "x_p --> ", None, None, None)
            .unwrap();
        assert!(model.metabolite("x_p").unwrap().compartment.is_none());
    }

    #[test]
    fn bounds() {
        let mut model = linear_model();
        model.set_bounds("R1", -5., 5.).unwrap();
        assert_eq!(model.reaction("R1").unwrap().lower_bound, -5.);
        model.set_upper_bound("R1", 2.).unwrap();
        assert_eq!(model.reaction("R1").unwrap().upper_bound, 2.);
        assert!(matches!(
            model.set_lower_bound("R1", 3.),
            Err(ModelError::InvalidBounds { .. })
        ));
        model.knock_out_reactions(&["R1", "R2"]).unwrap();
        assert_eq!(model.reaction("R2").unwrap().upper_bound, 0.);
    }

    #[test]
    fn gene_knockout_follows_gpr() {
        let mut model = linear_model();
        model.knock_out_gene("g2").unwrap();
        assert_eq!(
            model.reaction("R2").unwrap().activity,
            ReactionActivity::Active
        );
        model.knock_out_gene("g1").unwrap();
        assert_eq!(
            model.reaction("R1").unwrap().activity,
            ReactionActivity::Inactive
        );
        assert_eq!(
            model.reaction("R2").unwrap().activity,
            ReactionActivity::Inactive
        );
        assert_eq!(model.gene("g1").unwrap().activity, GeneActivity::Inactive);
    }

    #[test]
    fn adding_metabolites_to_reaction() {
        let mut model = linear_model();
        model
            .add_metabolites_to_reaction("R1", &[("a_e", -1.), ("b_c", -1.)])
            .unwrap();
        let rxn = model.reaction("R1").unwrap();
        assert_eq!(rxn.metabolites["a_e"], -1.);
        assert!(!rxn.metabolites.contains_key("b_c"));
        assert!(model
            .add_metabolites_to_reaction("R1", &[("nope_c", 1.)])
            .is_err());
    }

    #[test]
    fn boundary_and_mass_balance() {
        let mut model = linear_model();
        let ids: Vec<&str> = model
            .boundary_reactions()
            .iter()
            .map(|r| r.id.as_str())
            .collect();
        assert_eq!(ids, vec!["EX_a", "EX_b"]);
        assert!(model.check_mass_balance("R1").unwrap().is_empty());
        let ex = model.check_mass_balance("EX_a").unwrap();
        assert_eq!(ex["C"], -2.);
        assert_eq!(ex["H"], -4.);

        model
            .add_reaction_from_formula("UNK", None, "a_c --> q_c", None, None, None)
            .unwrap();
        assert_eq!(model.check_mass_balance("UNK").unwrap()["C"], -2.);
    }

    #[test]
    fn flux_constraints_and_objective() {
        let mut model = linear_model();
        model
            .add_flux_constraint("split", &[("R1", 1.), ("R2", -3.)], 0., 0.)
            .unwrap();
        assert_eq!(model.flux_constraints()["split"].coefficients["R2"], -3.);
        assert!(model
            .add_flux_constraint("split", &[("R1", 1.)], 0., 0.)
            .is_err());
        assert!(model
            .add_flux_constraint("other", &[("NOPE", 1.)], 0., 0.)
            .is_err());

        model.set_objective(&[("EX_a", -1.)]).unwrap();
        model.set_objective_sense(ObjectiveSense::Minimize);
        assert_eq!(model.objective().len(), 1);
        assert_eq!(model.objective()["EX_a"], -1.);
        assert_eq!(model.objective_sense(), ObjectiveSense::Minimize);
    }

    #[test]
    fn copy_is_independent() {
        let model = linear_model();
        let mut copy = model.copy();
        copy.knock_out_reaction("R1").unwrap();
        assert_eq!(model.reaction("R1").unwrap().upper_bound, 1000.);
        assert!(copy.history.is_empty());
    }
}
