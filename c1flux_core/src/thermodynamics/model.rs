//! Pathway description used for thermodynamic analysis
use std::path::Path;

use indexmap::{IndexMap, IndexSet};
use log::{debug, info, warn};
use nalgebra::{DMatrix, DVector};

use crate::configuration::configuration;
use crate::io::sbtab::{SbtabDocument, SbtabError, SbtabTable};
use crate::metabolic_model::formula::{format_reaction_formula, parse_reaction_formula};
use crate::thermodynamics::{molar_factor, ThermodynamicsError, GAS_CONSTANT};

/// Source of standard Gibbs energies of reaction (ΔG'°, kJ/mol)
///
/// Implemented by estimators such as group contribution methods. Returning `None` leaves the
/// current value of the reaction untouched.
pub trait StandardGibbsEnergySource {
    fn standard_dg(&self, reaction_id: &str, stoichiometry: &IndexMap<String, f64>) -> Option<f64>;
}

/// Standard Gibbs energies looked up from tables
///
/// A value given for the reaction id takes precedence. Otherwise the reaction energy is
/// computed from standard Gibbs energies of formation, when all compounds of the reaction have
/// one.
#[derive(Clone, Debug, Default)]
pub struct TabulatedGibbsEnergies {
    reactions: IndexMap<String, f64>,
    formation: IndexMap<String, f64>,
}

impl TabulatedGibbsEnergies {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a standard Gibbs energy of reaction in kJ/mol
    pub fn with_reaction(mut self, reaction_id: &str, standard_dg: f64) -> Self {
        self.reactions.insert(reaction_id.to_string(), standard_dg);
        self
    }

    /// Add a standard Gibbs energy of formation in kJ/mol
    pub fn with_formation(mut self, compound_id: &str, standard_dg: f64) -> Self {
        self.formation.insert(compound_id.to_string(), standard_dg);
        self
    }
}

impl StandardGibbsEnergySource for TabulatedGibbsEnergies {
    fn standard_dg(&self, reaction_id: &str, stoichiometry: &IndexMap<String, f64>) -> Option<f64> {
        if let Some(dg) = self.reactions.get(reaction_id) {
            return Some(*dg);
        }
        stoichiometry
            .iter()
            .map(|(compound, coef)| self.formation.get(compound).map(|dg| coef * dg))
            .sum()
    }
}

/// A pathway with stoichiometry, relative fluxes, standard Gibbs energies and concentration
/// bounds
#[derive(Clone, Debug)]
pub struct ThermodynamicModel {
    pub(crate) compound_ids: Vec<String>,
    pub(crate) reaction_ids: Vec<String>,
    /// Compounds × reactions
    pub(crate) stoichiometry: DMatrix<f64>,
    pub(crate) fluxes: DVector<f64>,
    /// ΔG'° of each reaction in kJ/mol
    pub(crate) standard_dgs: Vec<Option<f64>>,
    /// Concentration bounds in M
    pub(crate) lower_bounds: Vec<f64>,
    pub(crate) upper_bounds: Vec<f64>,
    /// External identifiers of compounds (e.g. `KEGG:C00058`), for estimators
    pub compound_identifiers: IndexMap<String, String>,
    /// Temperature in K
    pub temperature: f64,
}

impl ThermodynamicModel {
    /// Create a pathway from `(reaction id, formula, relative flux)` triples
    ///
    /// Compounds get the configured default concentration bounds and reactions have no
    /// standard Gibbs energy yet.
    pub fn new(reactions: &[(&str, &str, f64)]) -> Result<Self, ThermodynamicsError> {
        let mut compound_ids: IndexSet<String> = IndexSet::new();
        let mut reaction_ids: Vec<String> = Vec::with_capacity(reactions.len());
        let mut parsed = Vec::with_capacity(reactions.len());
        for (id, formula, _) in reactions {
            if reaction_ids.iter().any(|r| r == *id) {
                return Err(ThermodynamicsError::DuplicateReaction(id.to_string()));
            }
            let reaction = parse_reaction_formula(formula)?;
            for compound in reaction.stoichiometry.keys() {
                compound_ids.insert(compound.clone());
            }
            reaction_ids.push(id.to_string());
            parsed.push(reaction.stoichiometry);
        }
        let compound_ids: Vec<String> = compound_ids.into_iter().collect();
        let mut stoichiometry = DMatrix::zeros(compound_ids.len(), reaction_ids.len());
        for (j, reaction) in parsed.iter().enumerate() {
            for (compound, coef) in reaction {
                if let Some(i) = compound_ids.iter().position(|c| c == compound) {
                    stoichiometry[(i, j)] = *coef;
                }
            }
        }
        let config = configuration();
        let n_compounds = compound_ids.len();
        Ok(ThermodynamicModel {
            compound_ids,
            stoichiometry,
            fluxes: DVector::from_iterator(reactions.len(), reactions.iter().map(|r| r.2)),
            standard_dgs: vec![None; reaction_ids.len()],
            reaction_ids,
            lower_bounds: vec![config.default_min_concentration; n_compounds],
            upper_bounds: vec![config.default_max_concentration; n_compounds],
            compound_identifiers: IndexMap::new(),
            temperature: config.temperature,
        })
    }

    /// Read a pathway from an SBtab file
    pub fn from_sbtab<P: AsRef<Path>>(path: P) -> Result<Self, ThermodynamicsError> {
        let document = SbtabDocument::read(&path)?;
        let model = Self::from_sbtab_document(&document)?;
        info!(
            "Loaded pathway {} with {} reactions and {} compounds",
            path.as_ref().display(),
            model.reaction_ids.len(),
            model.compound_ids.len()
        );
        Ok(model)
    }

    /// Build a pathway from the tables of an SBtab document
    ///
    /// Requires `Reaction` (`!ID`, `!ReactionFormula`) and `Flux` (`!Reaction`, `!Value`)
    /// tables. `ConcentrationConstraint`, `Parameter`, `Compound` and `Configuration` tables are
    /// used when present.
    pub fn from_sbtab_document(document: &SbtabDocument) -> Result<Self, ThermodynamicsError> {
        let reaction_table = document.require_table("Reaction")?;
        let mut formulas = Vec::with_capacity(reaction_table.num_rows());
        for row in 0..reaction_table.num_rows() {
            formulas.push((
                reaction_table.require(row, "ID")?,
                reaction_table.require(row, "ReactionFormula")?,
            ));
        }

        let flux_table = document.require_table("Flux")?;
        let mut fluxes: IndexMap<&str, f64> = IndexMap::new();
        for row in 0..flux_table.num_rows() {
            let reaction = flux_table.require(row, "Reaction")?;
            if !formulas.iter().any(|(id, _)| *id == reaction) {
                return Err(ThermodynamicsError::UnknownReaction(reaction.to_string()));
            }
            fluxes.insert(reaction, flux_table.get_f64(row, "Value")?.unwrap_or(0.));
        }
        let reactions: Vec<(&str, &str, f64)> = formulas
            .iter()
            .map(|(id, formula)| {
                let flux = fluxes.get(id).copied().unwrap_or_else(|| {
                    warn!("No flux given for reaction {}, assuming 0", id);
                    0.
                });
                (*id, *formula, flux)
            })
            .collect();
        let mut model = Self::new(&reactions)?;

        if let Some(table) = document.table("Configuration") {
            model.read_configuration(table)?;
        }
        if let Some(table) = document.table("Compound") {
            if table.has_column("Identifiers") {
                for row in 0..table.num_rows() {
                    if let (Some(id), Some(identifier)) =
                        (table.get(row, "ID")?, table.get(row, "Identifiers")?)
                    {
                        model
                            .compound_identifiers
                            .insert(id.to_string(), identifier.to_string());
                    }
                }
            }
        }
        if let Some(table) = document.table("ConcentrationConstraint") {
            model.read_concentration_constraints(table)?;
        }
        if let Some(table) = document.table("Parameter") {
            model.read_parameters(table)?;
        }
        Ok(model)
    }

    fn read_configuration(&mut self, table: &SbtabTable) -> Result<(), ThermodynamicsError> {
        for row in 0..table.num_rows() {
            let option = table.require(row, "Option")?;
            let value = table.get(row, "Value")?.unwrap_or_default();
            match option {
                "temperature" => {
                    // Values may carry a unit, e.g. "298.15 K"
                    let number = value.split_whitespace().next().unwrap_or_default();
                    self.temperature = number.parse().map_err(|_| SbtabError::InvalidNumber {
                        table: table.table_id().to_string(),
                        column: "Value".to_string(),
                        value: value.to_string(),
                    })?;
                }
                other => debug!("Ignoring configuration option {}", other),
            }
        }
        Ok(())
    }

    fn read_concentration_constraints(
        &mut self,
        table: &SbtabTable,
    ) -> Result<(), ThermodynamicsError> {
        let factor = molar_factor(table.unit().unwrap_or("mM"))?;
        for row in 0..table.num_rows() {
            let compound = table.require(row, "Compound")?;
            let lower = table.get_f64(row, "Min")?.map(|v| v * factor);
            let upper = table.get_f64(row, "Max")?.map(|v| v * factor);
            self.set_bounds(compound, lower, upper)?;
        }
        Ok(())
    }

    fn read_parameters(&mut self, table: &SbtabTable) -> Result<(), ThermodynamicsError> {
        let rt = self.rt();
        for row in 0..table.num_rows() {
            let quantity = table.require(row, "QuantityType")?.to_lowercase();
            let Some(reaction) = table.get(row, "Reaction")? else {
                continue;
            };
            let Some(value) = table.get_f64(row, "Value")? else {
                continue;
            };
            let row_unit = match table.has_column("Unit") {
                true => table.get(row, "Unit")?,
                false => None,
            };
            let unit = row_unit.or(table.unit());
            let standard_dg = match quantity.as_str() {
                "standard gibbs energy of reaction" | "standard gibbs free energy of reaction" => {
                    match unit {
                        Some("J/mol") => value / 1000.,
                        _ => value,
                    }
                }
                "equilibrium constant" => -rt * value.ln(),
                _ => continue,
            };
            let index = self.reaction_index(reaction)?;
            self.standard_dgs[index] = Some(standard_dg);
        }
        Ok(())
    }

    pub fn compound_ids(&self) -> &[String] {
        &self.compound_ids
    }

    pub fn reaction_ids(&self) -> &[String] {
        &self.reaction_ids
    }

    pub fn stoichiometry(&self) -> &DMatrix<f64> {
        &self.stoichiometry
    }

    pub fn fluxes(&self) -> &DVector<f64> {
        &self.fluxes
    }

    pub fn standard_dgs(&self) -> &[Option<f64>] {
        &self.standard_dgs
    }

    /// RT in kJ/mol
    pub fn rt(&self) -> f64 {
        GAS_CONSTANT * self.temperature
    }

    pub(crate) fn reaction_index(&self, reaction_id: &str) -> Result<usize, ThermodynamicsError> {
        self.reaction_ids
            .iter()
            .position(|r| r == reaction_id)
            .ok_or_else(|| ThermodynamicsError::UnknownReaction(reaction_id.to_string()))
    }

    pub(crate) fn compound_index(&self, compound_id: &str) -> Result<usize, ThermodynamicsError> {
        self.compound_ids
            .iter()
            .position(|c| c == compound_id)
            .ok_or_else(|| ThermodynamicsError::UnknownCompound(compound_id.to_string()))
    }

    /// Stoichiometry of a single reaction, compounds with zero coefficient omitted
    pub fn reaction_stoichiometry(&self, reaction: usize) -> IndexMap<String, f64> {
        self.compound_ids
            .iter()
            .zip(self.stoichiometry.column(reaction).iter())
            .filter(|(_, coef)| **coef != 0.)
            .map(|(compound, coef)| (compound.clone(), *coef))
            .collect()
    }

    /// Overall reaction of the pathway, `S · v` written as a formula
    pub fn net_reaction_formula(&self) -> String {
        let net = &self.stoichiometry * &self.fluxes;
        let stoichiometry: IndexMap<String, f64> = self
            .compound_ids
            .iter()
            .zip(net.iter())
            .filter(|(_, coef)| coef.abs() > 1e-9)
            .map(|(compound, coef)| (compound.clone(), *coef))
            .collect();
        format_reaction_formula(&stoichiometry, "<=>")
    }

    /// Concentration bounds of a compound in M
    pub fn bounds(&self, compound_id: &str) -> Result<(f64, f64), ThermodynamicsError> {
        let index = self.compound_index(compound_id)?;
        Ok((self.lower_bounds[index], self.upper_bounds[index]))
    }

    /// Change the concentration bounds (in M) of a compound, `None` keeps the current bound
    pub fn set_bounds(
        &mut self,
        compound_id: &str,
        lower_bound: Option<f64>,
        upper_bound: Option<f64>,
    ) -> Result<(), ThermodynamicsError> {
        let index = self.compound_index(compound_id)?;
        let lower_bound = lower_bound.unwrap_or(self.lower_bounds[index]);
        let upper_bound = upper_bound.unwrap_or(self.upper_bounds[index]);
        if lower_bound <= 0. || upper_bound < lower_bound || !upper_bound.is_finite() {
            return Err(ThermodynamicsError::InvalidBounds {
                compound: compound_id.to_string(),
                lower_bound,
                upper_bound,
            });
        }
        self.lower_bounds[index] = lower_bound;
        self.upper_bounds[index] = upper_bound;
        Ok(())
    }

    /// Change the concentration bounds of a compound, given in mM
    pub fn set_bounds_mm(
        &mut self,
        compound_id: &str,
        lower_bound: Option<f64>,
        upper_bound: Option<f64>,
    ) -> Result<(), ThermodynamicsError> {
        self.set_bounds(
            compound_id,
            lower_bound.map(|v| v * 1e-3),
            upper_bound.map(|v| v * 1e-3),
        )
    }

    /// Set the standard Gibbs energy of a reaction in kJ/mol
    pub fn set_standard_dg(
        &mut self,
        reaction_id: &str,
        standard_dg: f64,
    ) -> Result<(), ThermodynamicsError> {
        let index = self.reaction_index(reaction_id)?;
        self.standard_dgs[index] = Some(standard_dg);
        Ok(())
    }

    /// Fill in or replace standard Gibbs energies using an estimator
    ///
    /// Returns the number of reactions updated.
    pub fn update_standard_dgs<S: StandardGibbsEnergySource>(&mut self, source: &S) -> usize {
        let mut updated = 0;
        for index in 0..self.reaction_ids.len() {
            let stoichiometry = self.reaction_stoichiometry(index);
            if let Some(dg) = source.standard_dg(&self.reaction_ids[index], &stoichiometry) {
                self.standard_dgs[index] = Some(dg);
                updated += 1;
            }
        }
        debug!("Updated {} standard Gibbs energies", updated);
        updated
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::path::PathBuf;

    use approx::assert_abs_diff_eq;

    use super::*;

    pub(crate) fn toy_pathway_path() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("test_data")
            .join("pathways")
            .join("toy_pathway.tsv")
    }

    #[test]
    fn new_pathway() {
        let model =
            ThermodynamicModel::new(&[("R1", "A <=> B", 1.), ("R2", "2 B <=> C", 0.5)]).unwrap();
        assert_eq!(model.compound_ids(), &["A", "B", "C"]);
        assert_eq!(model.stoichiometry()[(1, 1)], -2.);
        assert_eq!(model.net_reaction_formula(), "A <=> 0.5 C");
        assert_eq!(model.bounds("A").unwrap(), (1e-6, 1e-2));
        assert!(matches!(
            ThermodynamicModel::new(&[("R1", "A <=> B", 1.), ("R1", "B <=> C", 1.)]),
            Err(ThermodynamicsError::DuplicateReaction(_))
        ));
    }

    #[test]
    fn read_sbtab() {
        let model = ThermodynamicModel::from_sbtab(toy_pathway_path()).unwrap();
        assert_eq!(model.reaction_ids(), &["R1", "R2", "R3"]);
        assert_eq!(model.fluxes().as_slice(), &[1., 1., 0.]);
        assert_eq!(model.standard_dgs()[0], Some(-5.));
        // Given as an equilibrium constant of 1
        assert_abs_diff_eq!(model.standard_dgs()[1].unwrap(), 0., epsilon = 1e-12);
        assert_eq!(model.standard_dgs()[2], None);
        let (lb, ub) = model.bounds("A").unwrap();
        assert_abs_diff_eq!(lb, 1e-6, epsilon = 1e-15);
        assert_abs_diff_eq!(ub, 1e-2, epsilon = 1e-15);
        let (lb, ub) = model.bounds("D").unwrap();
        assert_abs_diff_eq!(lb, 1e-3, epsilon = 1e-15);
        assert_abs_diff_eq!(ub, 1e-3, epsilon = 1e-15);
        assert_eq!(model.temperature, 298.15);
        assert_eq!(model.compound_identifiers["A"], "KEGG:C00001");
        assert_eq!(model.net_reaction_formula(), "A <=> C");
    }

    #[test]
    fn bounds() {
        let mut model = ThermodynamicModel::new(&[("R1", "A <=> B", 1.)]).unwrap();
        model.set_bounds_mm("A", None, Some(50.)).unwrap();
        assert_eq!(model.bounds("A").unwrap(), (1e-6, 50e-3));
        assert!(matches!(
            model.set_bounds("A", Some(0.), None),
            Err(ThermodynamicsError::InvalidBounds { .. })
        ));
        assert!(matches!(
            model.set_bounds("A", Some(1.), Some(0.5)),
            Err(ThermodynamicsError::InvalidBounds { .. })
        ));
        assert_eq!(
            model.set_bounds("Z", None, None).unwrap_err(),
            ThermodynamicsError::UnknownCompound("Z".to_string())
        );
    }

    #[test]
    fn tabulated_energies() {
        let mut model =
            ThermodynamicModel::new(&[("R1", "A <=> B", 1.), ("R2", "B <=> 2 C", 1.)]).unwrap();
        let source = TabulatedGibbsEnergies::new()
            .with_reaction("R1", -3.)
            .with_formation("B", -10.)
            .with_formation("C", -8.);
        assert_eq!(model.update_standard_dgs(&source), 2);
        assert_eq!(model.standard_dgs(), &[Some(-3.), Some(-6.)]);

        // Formation energy of A is unknown
        let partial = TabulatedGibbsEnergies::new().with_formation("B", -10.);
        let mut model = ThermodynamicModel::new(&[("R1", "A <=> B", 1.)]).unwrap();
        assert_eq!(model.update_standard_dgs(&partial), 0);
        assert_eq!(model.standard_dgs(), &[None]);
    }
}
