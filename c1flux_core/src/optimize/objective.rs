//! Provides struct for representing an optimization problem's objective
use indexmap::IndexMap;

/// Represents the linear objective of an optimization problem
#[derive(Debug, Clone, PartialEq)]
pub struct Objective {
    /// Terms included in the objective (See [`ObjectiveTerm`])
    terms: Vec<ObjectiveTerm>,
    /// Sense of the objective (maximize, or minimize), see [`ObjectiveSense`]
    sense: ObjectiveSense,
}

impl Objective {
    /// Create a new empty objective, with a given sense
    pub fn new(sense: ObjectiveSense) -> Self {
        Self {
            terms: Vec::new(),
            sense,
        }
    }

    /// Create a new empty maximization objective
    pub fn new_maximize() -> Self {
        Self::new(ObjectiveSense::Maximize)
    }

    /// Create a new empty minimization objective
    pub fn new_minimize() -> Self {
        Self::new(ObjectiveSense::Minimize)
    }

    /// Change the sense of the objective
    pub fn set_sense(&mut self, sense: ObjectiveSense) {
        self.sense = sense;
    }

    pub fn sense(&self) -> ObjectiveSense {
        self.sense
    }

    pub fn terms(&self) -> &[ObjectiveTerm] {
        &self.terms
    }

    /// Add a new term to the objective
    pub fn add_term(&mut self, term: ObjectiveTerm) {
        self.terms.push(term);
    }

    /// Add a new Linear term to the objective
    pub fn add_linear_term(&mut self, variable: &str, coefficient: f64) {
        self.terms.push(ObjectiveTerm::new(variable, coefficient));
    }

    /// Remove every term involving `variable_id`
    pub(crate) fn remove_terms_with_variable(&mut self, variable_id: &str) {
        self.terms.retain(|t| t.variable != variable_id)
    }

    /// Remove all terms, keeping the sense
    pub fn remove_all_terms(&mut self) {
        self.terms.clear();
    }

    /// Coefficient of each variable, terms on the same variable summed
    pub fn coefficients(&self) -> IndexMap<&str, f64> {
        let mut coefficients = IndexMap::new();
        for term in &self.terms {
            *coefficients.entry(term.variable.as_str()).or_insert(0.) += term.coefficient;
        }
        coefficients
    }

    /// Value of the objective for the given variable values (missing variables count as zero)
    pub fn evaluate(&self, values: &IndexMap<String, f64>) -> f64 {
        self.terms
            .iter()
            .map(|t| t.coefficient * values.get(&t.variable).copied().unwrap_or(0.))
            .sum()
    }
}

/// Represents the sense of the objective, whether it should be maximized or minimized
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectiveSense {
    /// The objective should be minimized
    Minimize,
    /// The objective should be maximized
    Maximize,
}

/// A linear term in the objective, `coefficient * variable`
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectiveTerm {
    /// Id of the variable in the term
    pub(crate) variable: String,
    /// Coefficient for the term
    pub(crate) coefficient: f64,
}

impl ObjectiveTerm {
    /// Create a new linear objective term
    pub fn new(variable: &str, coefficient: f64) -> Self {
        ObjectiveTerm {
            variable: variable.to_string(),
            coefficient,
        }
    }

    pub fn variable(&self) -> &str {
        &self.variable
    }

    pub fn coefficient(&self) -> f64 {
        self.coefficient
    }
}
