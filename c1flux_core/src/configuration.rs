//! Process wide defaults used when building reactions, problems and thermodynamic models
use std::sync::{LazyLock, RwLock};

pub static CONFIGURATION: LazyLock<RwLock<Configuration>> =
    LazyLock::new(|| RwLock::new(Configuration::default()));

/// Returns a snapshot of the current configuration
///
/// A poisoned lock still holds a valid configuration, so it is recovered rather than
/// propagated.
pub fn configuration() -> Configuration {
    match CONFIGURATION.read() {
        Ok(guard) => guard.clone(),
        Err(poisoned) => poisoned.into_inner().clone(),
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Configuration {
    /// Default lower flux bound for new reactions
    pub lower_bound: f64,
    /// Default upper flux bound for new reactions
    pub upper_bound: f64,
    /// Tolerance used when fixing objectives and comparing fluxes against zero
    pub tolerance: f64,
    /// Maximum number of interior point iterations
    pub max_iterations: u32,
    /// Print the solver's iteration log
    pub verbose_solver: bool,
    /// Temperature in Kelvin used for thermodynamic calculations
    pub temperature: f64,
    /// Default lower concentration bound (M) for compounds without explicit constraints
    pub default_min_concentration: f64,
    /// Default upper concentration bound (M) for compounds without explicit constraints
    pub default_max_concentration: f64,
}

impl Default for Configuration {
    fn default() -> Self {
        Configuration {
            lower_bound: -1000.,
            upper_bound: 1000.,
            tolerance: 1e-07,
            max_iterations: 200,
            verbose_solver: false,
            temperature: 298.15,
            default_min_concentration: 1e-6,
            default_max_concentration: 1e-2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_bounds_are_ordered() {
        let config = Configuration::default();
        assert!(config.lower_bound < config.upper_bound);
        assert!(config.default_min_concentration < config.default_max_concentration);
    }

    #[test]
    fn snapshot_matches_global() {
        let snapshot = configuration();
        let global = CONFIGURATION.read().unwrap().clone();
        assert_eq!(snapshot, global);
    }
}
