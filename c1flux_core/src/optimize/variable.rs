//! Module providing representation of optimization problem variables
use std::fmt::{Display, Formatter};

use derive_builder::Builder;

/// A continuous variable of an optimization problem
#[derive(Builder, Debug, Clone, PartialEq)]
pub struct Variable {
    /// Id of the variable, unique within a problem
    #[builder(setter(into))]
    pub(crate) id: String,
    /// Optional human readable name
    #[builder(setter(into, strip_option), default = "None")]
    pub(crate) name: Option<String>,
    /// Lowest value the variable can take, may be `f64::NEG_INFINITY`
    #[builder(default = "f64::NEG_INFINITY")]
    pub(crate) lower_bound: f64,
    /// Highest value the variable can take, may be `f64::INFINITY`
    #[builder(default = "f64::INFINITY")]
    pub(crate) upper_bound: f64,
    /// Column of the variable in the problem, set when it is added to a problem
    #[builder(setter(skip), default = "0")]
    pub(crate) index: usize,
}

impl Variable {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn lower_bound(&self) -> f64 {
        self.lower_bound
    }

    pub fn upper_bound(&self) -> f64 {
        self.upper_bound
    }

    /// Column of the variable within its problem
    pub fn index(&self) -> usize {
        self.index
    }

    /// Whether both bounds are equal
    pub fn is_fixed(&self) -> bool {
        self.lower_bound == self.upper_bound
    }
}

impl Display for Variable {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let label = self.name.as_deref().unwrap_or(&self.id);
        write!(f, "{} <= {} <= {}", self.lower_bound, label, self.upper_bound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_defaults_to_free_variable() {
        let x = VariableBuilder::default().id("x").build().unwrap();
        assert_eq!(x.lower_bound(), f64::NEG_INFINITY);
        assert_eq!(x.upper_bound(), f64::INFINITY);
        assert!(!x.is_fixed());
        assert_eq!(format!("{}", x), "-inf <= x <= inf");
    }

    #[test]
    fn named_variable_display() {
        let v = VariableBuilder::default()
            .id("PGI_forward")
            .name("PGI")
            .lower_bound(0.)
            .upper_bound(0.)
            .build()
            .unwrap();
        assert!(v.is_fixed());
        assert_eq!(format!("{}", v), "0 <= PGI <= 0");
    }
}
