//! This module provides the Gene struct, representing a gene, and the GPR enum, representing a
//! gene protein reaction rule which decides whether a reaction survives gene knockouts
use std::collections::BTreeSet;
use std::fmt::{Display, Formatter};
use std::hash::Hash;

use derive_builder::Builder;
use indexmap::IndexMap;
use thiserror::Error;

/// Structure Representing a Gene
#[derive(Builder, Clone, Debug, Eq, PartialEq)]
pub struct Gene {
    /// Used to identify the gene (e.g. the b-number `b0114`)
    pub id: String,
    /// Human Readable Gene Name (e.g. `aceE`)
    #[builder(default = "None")]
    pub name: Option<String>,
    /// Whether this gene is currently active (see [`GeneActivity`])
    #[builder(default = "GeneActivity::Active")]
    pub activity: GeneActivity,
    /// Notes about the gene
    #[builder(default = "None")]
    pub notes: Option<String>,
    /// Gene Annotations
    #[builder(default = "None")]
    pub annotation: Option<String>,
}

impl Gene {
    /// Create a new active gene with only an id
    pub fn new_active(id: &str) -> Gene {
        Gene {
            id: id.to_string(),
            name: None,
            activity: GeneActivity::Active,
            notes: None,
            annotation: None,
        }
    }
}

impl Display for Gene {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.id)
    }
}

impl Hash for Gene {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
        self.activity.hash(state);
    }
}

/// Whether a gene is active or not
#[derive(Clone, Debug, Hash, Eq, PartialEq, Copy)]
pub enum GeneActivity {
    /// Gene is considered active
    Active,
    /// Gene is considered inactive (knocked out)
    Inactive,
}

/// Representation of a Gene Protein Reaction Rule as an AST
#[derive(Clone, Debug, PartialEq)]
pub enum Gpr {
    /// Operation on one or two sub-rules (see [`GprOperation`])
    Operation(GprOperation),
    /// A terminal gene node, holding the gene id
    GeneNode(String),
}

impl Gpr {
    /// Create a new binary operation node
    pub fn new_binary_operation(
        left: Gpr,
        operator: GprOperatorType,
        right: Gpr,
    ) -> Result<Gpr, GprError> {
        let op = match operator {
            GprOperatorType::Or => GprOperation::Or {
                left: Box::new(left),
                right: Box::new(right),
            },
            GprOperatorType::And => GprOperation::And {
                left: Box::new(left),
                right: Box::new(right),
            },
            GprOperatorType::Not => return Err(GprError::InvalidBinaryOp),
        };
        Ok(Gpr::Operation(op))
    }

    /// Create a new unary operation node
    pub fn new_unary_operation(operator: GprOperatorType, operand: Gpr) -> Result<Gpr, GprError> {
        let op = match operator {
            GprOperatorType::Not => GprOperation::Not {
                val: Box::new(operand),
            },
            _ => return Err(GprError::InvalidUnaryOp),
        };
        Ok(Gpr::Operation(op))
    }

    /// Create a new gene node
    pub fn new_gene_node(gene: &str) -> Gpr {
        Gpr::GeneNode(gene.to_string())
    }

    /// Evaluate whether the rule is Active or Inactive given the activity of the genes in
    /// `genes`
    pub fn eval(&self, genes: &IndexMap<String, Gene>) -> Result<GeneActivity, GprError> {
        match self {
            Gpr::Operation(op) => match op {
                GprOperation::Or { left, right } => {
                    let l = left.eval(genes)?;
                    let r = right.eval(genes)?;
                    if l == GeneActivity::Active || r == GeneActivity::Active {
                        Ok(GeneActivity::Active)
                    } else {
                        Ok(GeneActivity::Inactive)
                    }
                }
                GprOperation::And { left, right } => {
                    let l = left.eval(genes)?;
                    let r = right.eval(genes)?;
                    if l == GeneActivity::Active && r == GeneActivity::Active {
                        Ok(GeneActivity::Active)
                    } else {
                        Ok(GeneActivity::Inactive)
                    }
                }
                GprOperation::Not { val } => match val.eval(genes)? {
                    GeneActivity::Active => Ok(GeneActivity::Inactive),
                    GeneActivity::Inactive => Ok(GeneActivity::Active),
                },
            },
            Gpr::GeneNode(gene) => match genes.get(gene) {
                Some(g) => Ok(g.activity),
                None => Err(GprError::GeneNotFound(gene.clone())),
            },
        }
    }

    /// Ids of every gene referenced by this rule
    pub fn gene_ids(&self) -> BTreeSet<String> {
        let mut ids = BTreeSet::new();
        self.collect_gene_ids(&mut ids);
        ids
    }

    fn collect_gene_ids(&self, ids: &mut BTreeSet<String>) {
        match self {
            Gpr::Operation(GprOperation::Or { left, right })
            | Gpr::Operation(GprOperation::And { left, right }) => {
                left.collect_gene_ids(ids);
                right.collect_gene_ids(ids);
            }
            Gpr::Operation(GprOperation::Not { val }) => val.collect_gene_ids(ids),
            Gpr::GeneNode(gene) => {
                ids.insert(gene.clone());
            }
        }
    }

    /// Generate a GPR string with gene ids from the GPR AST
    pub fn to_string_id(&self) -> String {
        match self {
            Gpr::Operation(op) => match op {
                GprOperation::Or { left, right } => {
                    format!("({} or {})", left.to_string_id(), right.to_string_id())
                }
                GprOperation::And { left, right } => {
                    format!("({} and {})", left.to_string_id(), right.to_string_id())
                }
                GprOperation::Not { val } => {
                    format!("(not {})", val.to_string_id())
                }
            },
            Gpr::GeneNode(gene_ref) => gene_ref.to_string(),
        }
    }
}

impl Display for Gpr {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_string_id())
    }
}

/// Possible operations on genes
#[derive(Clone, Debug, PartialEq)]
pub enum GprOperation {
    Or { left: Box<Gpr>, right: Box<Gpr> },
    And { left: Box<Gpr>, right: Box<Gpr> },
    Not { val: Box<Gpr> },
}

/// Types of Allowed GPR Operations
pub enum GprOperatorType {
    /// Or, results in active if either left or right are active
    Or,
    /// And, results in active if both left and right are active
    And,
    /// Not, results in active if val is inactive
    Not,
}

#[derive(Clone, Debug, Error, PartialEq)]
pub enum GprError {
    #[error("Invalid Binary Operation")]
    InvalidBinaryOp,
    #[error("Invalid Unary Operation")]
    InvalidUnaryOp,
    #[error("Gene {0} in GPR is not present in the model")]
    GeneNotFound(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gene_map() -> IndexMap<String, Gene> {
        let mut genes = IndexMap::new();
        for (id, activity) in [
            ("active1", GeneActivity::Active),
            ("active2", GeneActivity::Active),
            ("inactive1", GeneActivity::Inactive),
            ("inactive2", GeneActivity::Inactive),
        ] {
            let gene = GeneBuilder::default()
                .id(id.to_string())
                .activity(activity)
                .build()
                .unwrap();
            genes.insert(id.to_string(), gene);
        }
        genes
    }

    fn binary(left: &str, op: GprOperatorType, right: &str) -> Gpr {
        Gpr::new_binary_operation(Gpr::new_gene_node(left), op, Gpr::new_gene_node(right))
            .unwrap()
    }

    #[test]
    fn gene_node() {
        let genes = gene_map();
        assert_eq!(
            Gpr::new_gene_node("active1").eval(&genes).unwrap(),
            GeneActivity::Active
        );
        assert_eq!(
            Gpr::new_gene_node("inactive1").eval(&genes).unwrap(),
            GeneActivity::Inactive
        );
    }

    #[test]
    fn and_node() {
        let genes = gene_map();
        let both_active = binary("active1", GprOperatorType::And, "active2");
        assert_eq!(both_active.eval(&genes).unwrap(), GeneActivity::Active);
        let mixed = binary("active1", GprOperatorType::And, "inactive1");
        assert_eq!(mixed.eval(&genes).unwrap(), GeneActivity::Inactive);
        let both_inactive = binary("inactive1", GprOperatorType::And, "inactive2");
        assert_eq!(both_inactive.eval(&genes).unwrap(), GeneActivity::Inactive);
    }

    #[test]
    fn or_node() {
        let genes = gene_map();
        let mixed = binary("active1", GprOperatorType::Or, "inactive1");
        assert_eq!(mixed.eval(&genes).unwrap(), GeneActivity::Active);
        let both_inactive = binary("inactive1", GprOperatorType::Or, "inactive2");
        assert_eq!(both_inactive.eval(&genes).unwrap(), GeneActivity::Inactive);
    }

    #[test]
    fn not_node() {
        let genes = gene_map();
        let not_active =
            Gpr::new_unary_operation(GprOperatorType::Not, Gpr::new_gene_node("active1")).unwrap();
        assert_eq!(not_active.eval(&genes).unwrap(), GeneActivity::Inactive);
        let not_inactive =
            Gpr::new_unary_operation(GprOperatorType::Not, Gpr::new_gene_node("inactive1"))
                .unwrap();
        assert_eq!(not_inactive.eval(&genes).unwrap(), GeneActivity::Active);
    }

    #[test]
    fn invalid_operators() {
        let res = Gpr::new_binary_operation(
            Gpr::new_gene_node("a"),
            GprOperatorType::Not,
            Gpr::new_gene_node("b"),
        );
        assert_eq!(res, Err(GprError::InvalidBinaryOp));
        let res = Gpr::new_unary_operation(GprOperatorType::And, Gpr::new_gene_node("a"));
        assert_eq!(res, Err(GprError::InvalidUnaryOp));
    }

    #[test]
    fn missing_gene() {
        let genes = gene_map();
        let gpr = binary("active1", GprOperatorType::And, "b9999");
        assert_eq!(
            gpr.eval(&genes),
            Err(GprError::GeneNotFound("b9999".to_string()))
        );
    }

    #[test]
    fn display_and_gene_ids() {
        let gpr = Gpr::new_binary_operation(
            binary("b0114", GprOperatorType::And, "b0115"),
            GprOperatorType::Or,
            Gpr::new_unary_operation(GprOperatorType::Not, Gpr::new_gene_node("b0116")).unwrap(),
        )
        .unwrap();
        assert_eq!(format!("{}", gpr), "((b0114 and b0115) or (not b0116))");
        let ids: Vec<String> = gpr.gene_ids().into_iter().collect();
        assert_eq!(ids, vec!["b0114", "b0115", "b0116"]);
    }
}
