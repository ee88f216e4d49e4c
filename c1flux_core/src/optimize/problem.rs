//! Provides struct representing an optimization problem
use indexmap::IndexMap;
use thiserror::Error;

use crate::optimize::constraint::Constraint;
use crate::optimize::objective::{Objective, ObjectiveSense, ObjectiveTerm};
use crate::optimize::solvers::{Solver, SolverError};
use crate::optimize::variable::{Variable, VariableBuilder};
use crate::optimize::ProblemSolution;

/// A linear optimization problem over continuous variables
#[derive(Debug, Clone)]
pub struct Problem {
    /// Objective to optimize
    objective: Objective,
    /// Variables of the optimization problem, keyed by id
    variables: IndexMap<String, Variable>,
    /// Constraints of the optimization problem, keyed by id
    constraints: IndexMap<String, Constraint>,
}

impl Problem {
    // region Creation Functions
    /// Create a new optimization problem
    pub fn new(objective_sense: ObjectiveSense) -> Self {
        Self {
            objective: Objective::new(objective_sense),
            variables: IndexMap::new(),
            constraints: IndexMap::new(),
        }
    }

    /// Create a new maximization problem
    pub fn new_maximization() -> Self {
        Self::new(ObjectiveSense::Maximize)
    }

    /// Create a new minimization problem
    pub fn new_minimization() -> Self {
        Self::new(ObjectiveSense::Minimize)
    }
    // endregion Creation Functions

    // region Accessors
    pub fn objective(&self) -> &Objective {
        &self.objective
    }

    pub fn objective_sense(&self) -> ObjectiveSense {
        self.objective.sense()
    }

    pub fn variables(&self) -> &IndexMap<String, Variable> {
        &self.variables
    }

    pub fn variable(&self, id: &str) -> Option<&Variable> {
        self.variables.get(id)
    }

    pub fn constraints(&self) -> &IndexMap<String, Constraint> {
        &self.constraints
    }

    pub fn num_variables(&self) -> usize {
        self.variables.len()
    }

    pub fn num_constraints(&self) -> usize {
        self.constraints.len()
    }
    // endregion Accessors

    /// Update the objective sense of the problem
    pub fn update_objective_sense(&mut self, sense: ObjectiveSense) {
        self.objective.set_sense(sense);
    }

    // region Adding Variables
    /// Add a variable to the optimization problem
    pub fn add_variable(&mut self, mut variable: Variable) -> Result<(), ProblemError> {
        self.validate_variable(&variable)?;
        variable.index = self.variables.len();
        self.variables.insert(variable.id.clone(), variable);
        Ok(())
    }

    /// Create a new variable and add it to the optimization problem
    pub fn add_new_variable(
        &mut self,
        id: &str,
        name: Option<&str>,
        lower_bound: f64,
        upper_bound: f64,
    ) -> Result<(), ProblemError> {
        let mut builder = VariableBuilder::default();
        builder.id(id).lower_bound(lower_bound).upper_bound(upper_bound);
        if let Some(name) = name {
            builder.name(name);
        }
        let variable = builder
            .build()
            .map_err(|err| ProblemError::InvalidVariable(err.to_string()))?;
        self.add_variable(variable)
    }
    // endregion Adding Variables

    // region Adding Constraints
    /// Add a constraint to the problem
    pub fn add_constraint(&mut self, constraint: Constraint) -> Result<(), ProblemError> {
        self.validate_constraint(&constraint)?;
        self.constraints
            .insert(constraint.get_id().to_string(), constraint);
        Ok(())
    }

    /// Create a new equality constraint from variable ids and add it to the problem
    pub fn add_new_equality_constraint(
        &mut self,
        id: &str,
        variables: &[&str],
        coefficients: &[f64],
        equals: f64,
    ) -> Result<(), ProblemError> {
        self.add_constraint(Constraint::new_equality(
            id,
            variables,
            coefficients,
            equals,
        ))
    }

    /// Create a new inequality constraint from variable ids and add it to the problem
    pub fn add_new_inequality_constraint(
        &mut self,
        id: &str,
        variables: &[&str],
        coefficients: &[f64],
        lower_bound: f64,
        upper_bound: f64,
    ) -> Result<(), ProblemError> {
        self.add_constraint(Constraint::new_inequality(
            id,
            variables,
            coefficients,
            lower_bound,
            upper_bound,
        ))
    }
    // endregion Adding Constraints

    // region Adding Objective Terms
    /// Add a new term to the objective
    pub fn add_objective_term(&mut self, objective_term: ObjectiveTerm) -> Result<(), ProblemError> {
        if !self.variables.contains_key(&objective_term.variable) {
            return Err(ProblemError::NonExistentVariablesInObjective(
                objective_term.variable,
            ));
        }
        self.objective.add_term(objective_term);
        Ok(())
    }

    /// Add a new linear term to the objective using the variable id
    pub fn add_new_linear_objective_term(
        &mut self,
        variable_id: &str,
        coefficient: f64,
    ) -> Result<(), ProblemError> {
        self.add_objective_term(ObjectiveTerm::new(variable_id, coefficient))
    }
    // endregion Adding Objective Terms

    /// Update the bounds of a variable
    pub fn update_variable_bounds(
        &mut self,
        id: &str,
        lower_bound: f64,
        upper_bound: f64,
    ) -> Result<(), ProblemError> {
        if lower_bound > upper_bound {
            return Err(ProblemError::InvalidVariableBounds(id.to_string()));
        }
        let variable = self
            .variables
            .get_mut(id)
            .ok_or_else(|| ProblemError::NonExistentVariable(id.to_string()))?;
        variable.lower_bound = lower_bound;
        variable.upper_bound = upper_bound;
        Ok(())
    }

    // region Removal
    /// Remove a variable from the problem, will also remove it as a term from all constraints
    /// and any terms in the objective that include this variable
    pub fn delete_variable(&mut self, variable_id: &str) -> Result<(), ProblemError> {
        if self.variables.shift_remove(variable_id).is_none() {
            return Err(ProblemError::NonExistentVariable(variable_id.to_string()));
        }
        self.objective.remove_terms_with_variable(variable_id);
        self.constraints
            .values_mut()
            .for_each(|cons| cons.remove_variable(variable_id));
        self.fix_variable_indices();
        Ok(())
    }

    /// Remove a constraint (by id) from the problem
    pub fn remove_constraint(&mut self, constraint_id: &str) -> Option<Constraint> {
        self.constraints.shift_remove(constraint_id)
    }

    /// Remove all terms from the objective
    pub fn remove_all_objective_terms(&mut self) {
        self.objective.remove_all_terms();
    }
    // endregion Removal

    /// Solve the problem with the given solver
    pub fn solve<S: Solver>(&self, solver: &S) -> Result<ProblemSolution, SolverError> {
        solver.solve(self)
    }

    // region Validation Functions
    /// Check that a variable to be added is valid to add to this problem
    fn validate_variable(&self, variable: &Variable) -> Result<(), ProblemError> {
        if self.variables.contains_key(&variable.id) {
            return Err(ProblemError::VariableIdAlreadyExists(variable.id.clone()));
        };
        if variable.lower_bound > variable.upper_bound
            || variable.lower_bound.is_nan()
            || variable.upper_bound.is_nan()
        {
            return Err(ProblemError::InvalidVariableBounds(variable.id.clone()));
        }
        Ok(())
    }

    /// Check that a constraint to be added is valid to add to this Problem
    fn validate_constraint(&self, constraint: &Constraint) -> Result<(), ProblemError> {
        let id = constraint.get_id();
        if self.constraints.contains_key(id) {
            return Err(ProblemError::ConstraintAlreadyExists(id.to_string()));
        }
        if let Constraint::Inequality {
            lower_bound,
            upper_bound,
            ..
        } = constraint
        {
            if lower_bound > upper_bound {
                return Err(ProblemError::InvalidConstraintBounds(id.to_string()));
            }
        }
        if let Some(missing) = constraint
            .get_variables()
            .find(|v| !self.variables.contains_key(*v))
        {
            return Err(ProblemError::NonExistentVariablesInConstraint {
                constraint: id.to_string(),
                variable: missing.to_string(),
            });
        }
        Ok(())
    }
    // endregion Validation Functions

    fn fix_variable_indices(&mut self) {
        self.variables
            .values_mut()
            .enumerate()
            .for_each(|(ind, var)| var.index = ind);
    }

    /// Insert a constraint without checking its variables, for exercising solver checks
    #[cfg(test)]
    pub(crate) fn insert_constraint_unchecked(&mut self, constraint: Constraint) {
        self.constraints
            .insert(constraint.get_id().to_string(), constraint);
    }
}

/// Errors associated with the Problem
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProblemError {
    /// Error when trying to add a variable with the same id as an existing variable
    #[error("Tried to add variable {0} with the same id as an existing variable")]
    VariableIdAlreadyExists(String),
    /// Error when trying to add variable with invalid bounds
    #[error("Tried to add variable {0} with lower_bound>upper_bound")]
    InvalidVariableBounds(String),
    /// Error when a variable can't be built
    #[error("Unable to build variable: {0}")]
    InvalidVariable(String),
    /// Error when trying to add a constraint with the same id as an existing constraint
    #[error("Tried to add constraint {0} with the same id as an existing constraint")]
    ConstraintAlreadyExists(String),
    /// Error when trying to add a constraint with invalid bounds
    #[error("Tried to add inequality constraint {0} with lower_bound > upper_bound")]
    InvalidConstraintBounds(String),
    /// Error when trying to add a constraint that contains variables not in the model
    #[error("Constraint {constraint} uses variable {variable} which is not in the problem")]
    NonExistentVariablesInConstraint { constraint: String, variable: String },
    /// Error when trying to add an objective term which includes variables not in the model
    #[error("Tried adding an objective term with variable {0} which is not in the problem")]
    NonExistentVariablesInObjective(String),
    /// Error when trying to perform an update or drop on a variable that doesn't exist
    #[error("Tried to access variable {0} which doesn't exist")]
    NonExistentVariable(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_variable_problem() -> Problem {
        let mut problem = Problem::new(ObjectiveSense::Maximize);
        problem.add_new_variable("x", None, 0., 100.).unwrap();
        problem.add_new_variable("y", Some("why"), 0., 100.).unwrap();
        problem
    }

    #[test]
    fn new_problem() {
        let max_problem = Problem::new_maximization();
        assert_eq!(max_problem.objective_sense(), ObjectiveSense::Maximize);

        let mut min_problem = Problem::new_minimization();
        assert_eq!(min_problem.objective_sense(), ObjectiveSense::Minimize);
        min_problem.update_objective_sense(ObjectiveSense::Maximize);
        assert_eq!(min_problem.objective_sense(), ObjectiveSense::Maximize);
    }

    #[test]
    fn add_variables() {
        let problem = two_variable_problem();
        let y = problem.variable("y").unwrap();
        assert_eq!(y.index(), 1);
        assert_eq!(y.upper_bound(), 100.);
        assert_eq!(problem.num_variables(), 2);
    }

    #[test]
    fn add_bad_variable() {
        let mut problem = two_variable_problem();
        assert_eq!(
            problem.add_new_variable("z", None, 100., 64.),
            Err(ProblemError::InvalidVariableBounds("z".to_string()))
        );
        assert_eq!(
            problem.add_new_variable("x", None, 0., 1.),
            Err(ProblemError::VariableIdAlreadyExists("x".to_string()))
        );
    }

    #[test]
    fn add_constraint() {
        let mut problem = two_variable_problem();
        problem
            .add_new_equality_constraint("eq", &["x", "y"], &[2., 3.], 200.)
            .unwrap();
        problem
            .add_new_inequality_constraint("ineq", &["x", "y"], &[2., 3.], 100., 200.)
            .unwrap();
        match problem.constraints().get("ineq").unwrap() {
            Constraint::Inequality {
                lower_bound,
                upper_bound,
                ..
            } => {
                assert_eq!(*lower_bound, 100.);
                assert_eq!(*upper_bound, 200.);
            }
            Constraint::Equality { .. } => panic!("Incorrect constraint type added"),
        }
        assert_eq!(problem.num_constraints(), 2);
    }

    #[test]
    fn add_bad_constraint() {
        let mut problem = two_variable_problem();
        assert_eq!(
            problem.add_new_inequality_constraint("bad", &["x", "y"], &[2., 3.], 200., 100.),
            Err(ProblemError::InvalidConstraintBounds("bad".to_string()))
        );
        assert!(matches!(
            problem.add_new_equality_constraint("missing", &["x", "z"], &[1., 1.], 0.),
            Err(ProblemError::NonExistentVariablesInConstraint { .. })
        ));
        problem
            .add_new_equality_constraint("eq", &["x"], &[1.], 0.)
            .unwrap();
        assert_eq!(
            problem.add_new_equality_constraint("eq", &["y"], &[1.], 0.),
            Err(ProblemError::ConstraintAlreadyExists("eq".to_string()))
        );
    }

    #[test]
    fn objective_terms() {
        let mut problem = two_variable_problem();
        problem.add_new_linear_objective_term("x", 1.).unwrap();
        assert_eq!(
            problem.add_new_linear_objective_term("z", 1.),
            Err(ProblemError::NonExistentVariablesInObjective(
                "z".to_string()
            ))
        );
        assert_eq!(problem.objective().terms().len(), 1);
        problem.remove_all_objective_terms();
        assert!(problem.objective().terms().is_empty());
    }

    #[test]
    fn delete_variable_updates_everything() {
        let mut problem = two_variable_problem();
        problem.add_new_variable("z", None, 0., 1.).unwrap();
        problem
            .add_new_equality_constraint("eq", &["x", "y"], &[1., 1.], 1.)
            .unwrap();
        problem.add_new_linear_objective_term("x", 1.).unwrap();
        problem.delete_variable("x").unwrap();
        assert_eq!(problem.variable("z").unwrap().index(), 1);
        assert_eq!(problem.constraints()["eq"].terms().len(), 1);
        assert!(problem.objective().terms().is_empty());
        assert_eq!(
            problem.delete_variable("x"),
            Err(ProblemError::NonExistentVariable("x".to_string()))
        );
        assert!(problem.remove_constraint("eq").is_some());
        problem.update_variable_bounds("z", -1., 1.).unwrap();
        assert_eq!(problem.variable("z").unwrap().lower_bound(), -1.);
    }
}
