//! Parsing of chemical formulas (`C6H12O6`) and reaction formulas (`2 a_c + b_c --> c_c`)
use std::sync::LazyLock;

use indexmap::IndexMap;
use regex::Regex;

use crate::metabolic_model::ModelError;

/// Element symbol mapped to (possibly fractional) atom count
pub type ElementCounts = IndexMap<String, f64>;

static ELEMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([A-Z][a-z]*)(\d*\.?\d*)").expect("element pattern is valid"));

static PLUS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+\+\s+").expect("plus pattern is valid"));

/// Arrows recognised in reaction formulas, longest first so that `-->` wins over `->`
const ARROWS: [(&str, ReactionDirection); 9] = [
    ("<=>", ReactionDirection::Reversible),
    ("<->", ReactionDirection::Reversible),
    ("-->", ReactionDirection::Forward),
    ("<--", ReactionDirection::Backward),
    ("->", ReactionDirection::Forward),
    ("=>", ReactionDirection::Forward),
    ("<-", ReactionDirection::Backward),
    ("<=", ReactionDirection::Backward),
    ("=", ReactionDirection::Reversible),
];

/// Parse a chemical formula into element counts
///
/// Repeated elements are summed, so `CH3COOH` gives `C: 2, H: 4, O: 2`. Characters that are not
/// part of an element group (parentheses, charges, `*`) are rejected.
///
/// # Examples
/// ```rust
/// use c1flux_core::metabolic_model::formula::parse_formula;
/// let glucose = parse_formula("C6H12O6").unwrap();
/// assert_eq!(glucose["C"], 6.);
/// ```
pub fn parse_formula(formula: &str) -> Result<ElementCounts, ModelError> {
    let formula = formula.trim();
    let mut counts = ElementCounts::new();
    let mut covered = 0usize;
    for caps in ELEMENT_RE.captures_iter(formula) {
        covered += caps[0].len();
        let element = caps[1].to_string();
        let count = match &caps[2] {
            "" => 1.,
            n => n
                .parse::<f64>()
                .map_err(|_| ModelError::InvalidChemicalFormula(formula.to_string()))?,
        };
        *counts.entry(element).or_insert(0.) += count;
    }
    if covered != formula.len() {
        return Err(ModelError::InvalidChemicalFormula(formula.to_string()));
    }
    Ok(counts)
}

/// Direction implied by the arrow of a reaction formula
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReactionDirection {
    /// `<=>`, flux can go either way
    Reversible,
    /// `-->`, only forward flux
    Forward,
    /// `<--`, only backward flux
    Backward,
}

impl ReactionDirection {
    /// Flux bounds implied by the arrow, using the provided default magnitudes
    pub fn default_bounds(&self, lower_bound: f64, upper_bound: f64) -> (f64, f64) {
        match self {
            ReactionDirection::Reversible => (lower_bound, upper_bound),
            ReactionDirection::Forward => (0., upper_bound),
            ReactionDirection::Backward => (lower_bound, 0.),
        }
    }
}

/// Result of parsing a reaction formula
#[derive(Clone, Debug, PartialEq)]
pub struct ParsedReaction {
    /// Metabolite id to stoichiometric coefficient (negative for substrates)
    pub stoichiometry: IndexMap<String, f64>,
    /// Direction from the arrow
    pub direction: ReactionDirection,
}

/// Parse a reaction formula such as `ru5p__D_c + fald_c <=> h6p_c`
///
/// Either side may be empty (exchange reactions are written `glc__D_e <=> `). Metabolites that
/// appear more than once have their coefficients summed.
pub fn parse_reaction_formula(formula: &str) -> Result<ParsedReaction, ModelError> {
    let invalid = |reason: &str| ModelError::InvalidReactionFormula {
        formula: formula.to_string(),
        reason: reason.to_string(),
    };
    let (arrow, direction) = ARROWS
        .iter()
        .find(|(arrow, _)| formula.contains(arrow))
        .ok_or_else(|| invalid("no reaction arrow found"))?;
    let (lhs, rhs) = formula
        .split_once(arrow)
        .ok_or_else(|| invalid("no reaction arrow found"))?;

    let mut stoichiometry: IndexMap<String, f64> = IndexMap::new();
    for (side, sign) in [(lhs, -1.), (rhs, 1.)] {
        // Pad so that a leading or trailing " + " is still split on
        let side = format!(" {} ", side.trim());
        for term in PLUS_RE.split(&side) {
            let parts: Vec<&str> = term.split_whitespace().collect();
            let (coefficient, metabolite) = match parts.as_slice() {
                [] => continue,
                [metabolite] => (1., *metabolite),
                [coefficient, metabolite] => {
                    let coefficient = coefficient
                        .parse::<f64>()
                        .map_err(|_| invalid("coefficient is not a number"))?;
                    (coefficient, *metabolite)
                }
                _ => return Err(invalid("unable to split term into coefficient and metabolite")),
            };
            *stoichiometry.entry(metabolite.to_string()).or_insert(0.) += sign * coefficient;
        }
    }
    stoichiometry.retain(|_, coef| *coef != 0.);
    Ok(ParsedReaction {
        stoichiometry,
        direction: *direction,
    })
}

/// Render a stoichiometry as a formula, substrates on the left
pub fn format_reaction_formula(stoichiometry: &IndexMap<String, f64>, arrow: &str) -> String {
    let side = |sign: f64| {
        stoichiometry
            .iter()
            .filter(|(_, coef)| **coef * sign > 0.)
            .map(|(met, coef)| {
                let coef = coef.abs();
                if (coef - 1.).abs() < 1e-12 {
                    met.to_string()
                } else {
                    format!("{} {}", coef, met)
                }
            })
            .collect::<Vec<_>>()
            .join(" + ")
    };
    format!("{} {} {}", side(-1.), arrow, side(1.))
        .trim()
        .to_string()
}
