//! Module providing JSON IO for Models, using the COBRA JSON schema
use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use log::info;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::io::gpr_parse::{parse_gpr, GprParseError};
use crate::metabolic_model::gene::{Gene, GeneActivity};
use crate::metabolic_model::metabolite::Metabolite;
use crate::metabolic_model::model::Model;
use crate::metabolic_model::reaction::{ReactionBuilder, ReactionBuilderError};
use crate::metabolic_model::ModelError;

// region JSON Model
/// Represents a JSON serialized model, used for reading and writing models in json format
#[derive(Serialize, Deserialize)]
struct JsonModel {
    metabolites: Vec<JsonMetabolite>,
    reactions: Vec<JsonReaction>,
    #[serde(default)]
    genes: Vec<JsonGene>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    compartments: Option<IndexMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    version: Option<String>,
}

#[derive(Serialize, Deserialize)]
struct JsonMetabolite {
    id: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    compartment: Option<String>,
    #[serde(default)]
    charge: Option<i32>,
    #[serde(default)]
    formula: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    notes: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    annotation: Option<Value>,
}

#[derive(Serialize, Deserialize)]
struct JsonReaction {
    id: String,
    #[serde(default)]
    name: Option<String>,
    metabolites: IndexMap<String, f64>,
    lower_bound: f64,
    upper_bound: f64,
    #[serde(default)]
    gene_reaction_rule: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    objective_coefficient: Option<f64>,
    #[serde(default)]
    subsystem: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    notes: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    annotation: Option<Value>,
}

#[derive(Serialize, Deserialize)]
struct JsonGene {
    id: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    notes: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    annotation: Option<Value>,
}
// endregion JSON Model

// region Conversions
/// Notes and annotations are kept as JSON strings, this turns them back into values
fn string_to_value(s: String) -> Value {
    serde_json::from_str(&s).unwrap_or(Value::String(s))
}

impl From<JsonGene> for Gene {
    fn from(g: JsonGene) -> Self {
        Self {
            id: g.id,
            name: g.name,
            activity: GeneActivity::Active, // All genes start as active
            notes: g.notes.map(|v| v.to_string()),
            annotation: g.annotation.map(|v| v.to_string()),
        }
    }
}

impl From<JsonMetabolite> for Metabolite {
    fn from(m: JsonMetabolite) -> Self {
        Self {
            id: m.id,
            name: m.name,
            compartment: m.compartment,
            charge: m.charge.unwrap_or_default(),
            formula: m.formula.filter(|f| !f.is_empty()),
            notes: m.notes.map(|v| v.to_string()),
            annotation: m.annotation.map(|v| v.to_string()),
        }
    }
}

impl From<Gene> for JsonGene {
    fn from(g: Gene) -> Self {
        Self {
            id: g.id,
            name: g.name,
            notes: g.notes.map(string_to_value),
            annotation: g.annotation.map(string_to_value),
        }
    }
}

impl From<Metabolite> for JsonMetabolite {
    fn from(m: Metabolite) -> Self {
        Self {
            id: m.id,
            name: m.name,
            compartment: m.compartment,
            charge: Some(m.charge),
            formula: m.formula,
            notes: m.notes.map(string_to_value),
            annotation: m.annotation.map(string_to_value),
        }
    }
}

impl Model {
    /// Read a model in the COBRA JSON format
    ///
    /// GPR rules are parsed into [`Gpr`](crate::metabolic_model::gene::Gpr) trees, and reactions
    /// with an objective coefficient form the objective, which is maximized.
    pub fn read_json<P: AsRef<Path>>(path: P) -> Result<Model, JsonError> {
        let model_str = fs::read_to_string(path.as_ref()).map_err(|err| {
            JsonError::UnableToRead(format!("{}: {}", path.as_ref().display(), err))
        })?;
        let json_model = serde_json::from_str::<JsonModel>(&model_str)
            .map_err(|err| JsonError::UnableToParse(err.to_string()))?;
        let model = Model::from_json(json_model)?;
        info!(
            "Read model {} with {} reactions, {} metabolites and {} genes",
            model.id.as_deref().unwrap_or("<unnamed>"),
            model.reactions().len(),
            model.metabolites().len(),
            model.genes().len()
        );
        Ok(model)
    }

    /// Write the model in the COBRA JSON format
    pub fn write_json<P: AsRef<Path>>(&self, path: P) -> Result<(), JsonError> {
        let json_model = self.to_json();
        let model_string = serde_json::to_string(&json_model)?;
        fs::write(path, model_string)?;
        Ok(())
    }

    fn from_json(json_model: JsonModel) -> Result<Self, JsonError> {
        let mut model = Model::new_empty();
        model.id = json_model.id;
        model.compartments = json_model.compartments;
        model.version = json_model.version;

        let mut genes: IndexMap<String, Gene> = json_model
            .genes
            .into_iter()
            .map(|g| (g.id.clone(), Gene::from(g)))
            .collect();
        for met in json_model.metabolites {
            model.add_metabolite(Metabolite::from(met))?;
        }

        /* Parse every GPR first, so that genes only referenced by rules end up in the gene map
        before any reaction is added
        */
        let mut reactions = Vec::with_capacity(json_model.reactions.len());
        let mut objective: Vec<(String, f64)> = Vec::new();
        for rxn in json_model.reactions {
            let gpr = if !rxn.gene_reaction_rule.trim().is_empty() {
                Some(parse_gpr(&rxn.gene_reaction_rule, &mut genes)?)
            } else {
                None
            };
            // Add the reaction to the objective function if desired
            if let Some(coef) = rxn.objective_coefficient.filter(|c| *c != 0.) {
                objective.push((rxn.id.clone(), coef));
            }
            reactions.push(
                ReactionBuilder::default()
                    .id(rxn.id)
                    .metabolites(rxn.metabolites)
                    .name(rxn.name)
                    .gpr(gpr)
                    .lower_bound(rxn.lower_bound)
                    .upper_bound(rxn.upper_bound)
                    .subsystem(rxn.subsystem)
                    .notes(rxn.notes.map(|v| v.to_string()))
                    .annotation(rxn.annotation.map(|v| v.to_string()))
                    .build()?,
            );
        }
        for gene in genes.into_values() {
            model.add_gene(gene);
        }
        for reaction in reactions {
            model.add_reaction(reaction)?;
        }
        let objective: Vec<(&str, f64)> = objective
            .iter()
            .map(|(id, coef)| (id.as_str(), *coef))
            .collect();
        model.set_objective(&objective)?;
        Ok(model)
    }

    fn to_json(&self) -> JsonModel {
        let json_genes: Vec<JsonGene> = self.genes().values().map(|g| g.clone().into()).collect();
        let json_metabolites: Vec<JsonMetabolite> = self
            .metabolites()
            .values()
            .map(|m| m.clone().into())
            .collect();
        let json_reactions: Vec<JsonReaction> = self
            .reactions()
            .values()
            .map(|r| JsonReaction {
                id: r.id.clone(),
                name: r.name.clone(),
                metabolites: r.metabolites.clone(),
                lower_bound: r.lower_bound,
                upper_bound: r.upper_bound,
                gene_reaction_rule: r
                    .gpr
                    .as_ref()
                    .map(|rule| rule.to_string_id())
                    .unwrap_or_default(),
                objective_coefficient: self.objective().get(&r.id).copied(),
                subsystem: r.subsystem.clone(),
                notes: r.notes.clone().map(string_to_value),
                annotation: r.annotation.clone().map(string_to_value),
            })
            .collect();

        JsonModel {
            metabolites: json_metabolites,
            reactions: json_reactions,
            genes: json_genes,
            id: self.id.clone(),
            compartments: self.compartments.clone(),
            version: self.version.clone(),
        }
    }
}
// endregion Conversions

#[derive(Error, Debug)]
pub enum JsonError {
    #[error("Unable to parse a GPR rule during conversion from JSON: {0}")]
    GprParserError(#[from] GprParseError),
    #[error("Unable to read file due to {0}")]
    UnableToRead(String),
    #[error("Unable to parse json due to {0}")]
    UnableToParse(String),
    #[error("Unable to build reaction: {0}")]
    UnableToBuildReaction(#[from] ReactionBuilderError),
    #[error("Inconsistent model: {0}")]
    InconsistentModel(#[from] ModelError),
    #[error("Serde json error: {0}")]
    SerdeJsonParseError(#[from] serde_json::Error),
    #[error("Unable to write to file: {0}")]
    UnableToWrite(#[from] std::io::Error),
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::metabolic_model::gene::{Gpr, GprOperation};
    use crate::metabolic_model::reaction::ReactionActivity;
    use crate::optimize::objective::ObjectiveSense;
    use std::path::PathBuf;

    pub(crate) fn toy_model_path() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("test_data")
            .join("test_models")
            .join("toy_model.json")
    }

    /// Small glucose to pyruvate network, maximal BIOMASS flux is 20
    pub(crate) fn toy_model() -> Model {
        Model::read_json(toy_model_path()).unwrap()
    }

    #[test]
    fn json_metabolite() {
        let data = r#"{
"id":"glc__D_e",
"name":"D-Glucose",
"compartment":"e",
"charge":0,
"formula":"C6H12O6",
"notes":{"original_bigg_ids":["glc_D_e"]},
"annotation":{"kegg.compound":["C00031"],"sbo":"SBO:0000247"}
}"#;
        let met: JsonMetabolite = serde_json::from_str(data).unwrap();
        let met = Metabolite::from(met);
        assert_eq!(met.id, "glc__D_e");
        assert_eq!(met.name.as_deref(), Some("D-Glucose"));
        assert_eq!(met.compartment.as_deref(), Some("e"));
        assert_eq!(met.formula.as_deref(), Some("C6H12O6"));
        assert!(met.annotation.unwrap().contains("C00031"));
    }

    #[test]
    fn json_reaction_defaults() {
        let data = r#"{
"id":"PFK",
"metabolites":{"adp_c":1.0,"atp_c":-1.0,"f6p_c":-1.0,"fdp_c":1.0,"h_c":1.0},
"lower_bound":0.0,
"upper_bound":1000.0
}"#;
        let reaction: JsonReaction = serde_json::from_str(data).unwrap();
        assert_eq!(reaction.gene_reaction_rule, "");
        assert!(reaction.name.is_none());
        assert!(reaction.objective_coefficient.is_none());
        assert_eq!(reaction.metabolites["f6p_c"], -1.0);
    }

    #[test]
    fn read_json() {
        let model = toy_model();
        assert_eq!(model.id.as_deref(), Some("toy_glycolysis"));
        assert_eq!(model.version.as_deref(), Some("1"));
        assert_eq!(model.compartments.as_ref().unwrap()["e"], "extracellular space");
        assert_eq!(model.reactions().len(), 12);
        assert_eq!(model.metabolites().len(), 10);
        assert_eq!(model.genes().len(), 4);

        let (first_id, _) = model.reactions().first().unwrap();
        assert_eq!(first_id, "EX_glc__D_e");
        let hex = model.reaction("HEX1").unwrap();
        assert_eq!(hex.metabolites["atp_c"], -1.0);
        assert_eq!(hex.subsystem.as_deref(), Some("Glycolysis"));
        assert_eq!(hex.activity, ReactionActivity::Active);
        match hex.gpr.as_ref().unwrap() {
            Gpr::Operation(GprOperation::Or { left, right }) => {
                assert_eq!(**left, Gpr::new_gene_node("b2388"));
                assert_eq!(**right, Gpr::new_gene_node("b1854"));
            }
            _ => panic!("Incorrect Parse"),
        }
        assert_eq!(model.gene("b2388").unwrap().name.as_deref(), Some("glk"));
        assert_eq!(model.objective().len(), 1);
        assert_eq!(model.objective()["BIOMASS"], 1.0);
        assert_eq!(model.objective_sense(), ObjectiveSense::Maximize);
    }

    #[test]
    fn missing_file() {
        assert!(matches!(
            Model::read_json("does/not/exist.json"),
            Err(JsonError::UnableToRead(_))
        ));
    }

    #[test]
    fn write_and_reread() {
        let model = toy_model();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("toy.json");
        model.write_json(&path).unwrap();
        let reread = Model::read_json(&path).unwrap();
        assert_eq!(reread.id, model.id);
        assert_eq!(reread.compartments, model.compartments);
        assert_eq!(
            reread.reactions().keys().collect::<Vec<_>>(),
            model.reactions().keys().collect::<Vec<_>>()
        );
        let hex = reread.reaction("HEX1").unwrap();
        assert_eq!(hex.metabolites, model.reaction("HEX1").unwrap().metabolites);
        assert_eq!(
            hex.gpr.as_ref().unwrap().to_string_id(),
            "(b2388 or b1854)"
        );
        assert_eq!(reread.objective(), model.objective());
        assert_eq!(
            reread.metabolite("g6p_c").unwrap(),
            model.metabolite("g6p_c").unwrap()
        );
    }
}
