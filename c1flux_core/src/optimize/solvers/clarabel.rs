//! Implements a solver interface for Clarabel
//!
//! Clarabel solves conic problems of the form
//!
//! ```text
//! minimize    1/2 x'Px + q'x
//! subject to  Ax + s = b,  s in K
//! ```
//!
//! Linear problems are mapped onto this with `P = 0`. Equality constraints and fixed variables
//! become rows in the zero cone, while finite variable bounds and inequality constraint bounds
//! become rows in the nonnegative cone. Maximization problems are solved by negating `q`.
use clarabel::algebra::CscMatrix as ClarabelMatrix;
use clarabel::solver::{DefaultSettings, DefaultSolver, IPSolver, SolverStatus, SupportedConeT};
use indexmap::IndexMap;
use log::debug;
use nalgebra_sparse::{CooMatrix, CscMatrix};

use crate::configuration::configuration;
use crate::optimize::constraint::Constraint;
use crate::optimize::objective::ObjectiveSense;
use crate::optimize::problem::Problem;
use crate::optimize::solvers::{Solver, SolverError};
use crate::optimize::{OptimizationStatus, ProblemSolution};

/// Interior point solver backed by the `clarabel` crate
#[derive(Clone, Debug)]
pub struct ClarabelSolver {
    /// Print Clarabel's iteration log
    pub verbose: bool,
    /// Maximum number of interior point iterations
    pub max_iterations: u32,
}

impl Default for ClarabelSolver {
    fn default() -> Self {
        let config = configuration();
        ClarabelSolver {
            verbose: config.verbose_solver,
            max_iterations: config.max_iterations,
        }
    }
}

/// One sparse row of the constraint matrix and its right hand side
struct Row {
    entries: Vec<(usize, f64)>,
    rhs: f64,
}

impl Row {
    fn new(entries: Vec<(usize, f64)>, rhs: f64) -> Self {
        Row { entries, rhs }
    }

    fn negated(&self, rhs: f64) -> Self {
        Row {
            entries: self.entries.iter().map(|(c, v)| (*c, -v)).collect(),
            rhs,
        }
    }
}

/// Where the rows belonging to a problem constraint ended up
enum DualRows {
    Equality(usize),
    Inequality {
        lower: Option<usize>,
        upper: Option<usize>,
    },
}

/// Rows of the conic problem, split by cone
#[derive(Default)]
struct ConicRows {
    zero: Vec<Row>,
    nonnegative: Vec<Row>,
}

impl ConicRows {
    fn build(problem: &Problem) -> Result<(ConicRows, Vec<(String, DualRows)>), SolverError> {
        let mut rows = ConicRows::default();
        let mut dual_rows = Vec::with_capacity(problem.num_constraints());

        for (id, constraint) in problem.constraints() {
            let mut entries = Vec::with_capacity(constraint.terms().len());
            for term in constraint.terms() {
                if !term.coefficient().is_finite() {
                    return Err(SolverError::NonFiniteCoefficient(id.clone()));
                }
                let variable = problem
                    .variable(term.variable())
                    .ok_or_else(|| SolverError::UnknownVariable(term.variable().to_string()))?;
                entries.push((variable.index(), term.coefficient()));
            }
            match constraint {
                Constraint::Equality { equals, .. } => {
                    if !equals.is_finite() {
                        return Err(SolverError::NonFiniteCoefficient(id.clone()));
                    }
                    rows.zero.push(Row::new(entries, *equals));
                    dual_rows.push((id.clone(), DualRows::Equality(rows.zero.len() - 1)));
                }
                Constraint::Inequality {
                    lower_bound,
                    upper_bound,
                    ..
                } => {
                    if lower_bound.is_nan() || upper_bound.is_nan() {
                        return Err(SolverError::NonFiniteCoefficient(id.clone()));
                    }
                    let row = Row::new(entries, *upper_bound);
                    let lower = if lower_bound.is_finite() {
                        rows.nonnegative.push(row.negated(-lower_bound));
                        Some(rows.nonnegative.len() - 1)
                    } else {
                        None
                    };
                    let upper = if upper_bound.is_finite() {
                        rows.nonnegative.push(row);
                        Some(rows.nonnegative.len() - 1)
                    } else {
                        None
                    };
                    dual_rows.push((id.clone(), DualRows::Inequality { lower, upper }));
                }
            }
        }

        for variable in problem.variables().values() {
            let (lb, ub) = (variable.lower_bound(), variable.upper_bound());
            if variable.is_fixed() {
                if !lb.is_finite() {
                    return Err(SolverError::NonFiniteCoefficient(variable.id().to_string()));
                }
                rows.zero.push(Row::new(vec![(variable.index(), 1.)], lb));
                continue;
            }
            if ub.is_finite() {
                rows.nonnegative
                    .push(Row::new(vec![(variable.index(), 1.)], ub));
            }
            if lb.is_finite() {
                rows.nonnegative
                    .push(Row::new(vec![(variable.index(), -1.)], -lb));
            }
        }
        Ok((rows, dual_rows))
    }

    fn num_rows(&self) -> usize {
        self.zero.len() + self.nonnegative.len()
    }

    /// Assemble `A` (in Clarabel's CSC layout) and `b`, zero cone rows first
    fn assemble(&self, num_variables: usize) -> (ClarabelMatrix<f64>, Vec<f64>) {
        let num_rows = self.num_rows();
        let mut coo = CooMatrix::new(num_rows, num_variables);
        let mut b = Vec::with_capacity(num_rows);
        for (row_index, row) in self.zero.iter().chain(self.nonnegative.iter()).enumerate() {
            for (column, value) in &row.entries {
                coo.push(row_index, *column, *value);
            }
            b.push(row.rhs);
        }
        let (col_offsets, row_indices, values) = CscMatrix::from(&coo).disassemble();
        (
            ClarabelMatrix::new(num_rows, num_variables, col_offsets, row_indices, values),
            b,
        )
    }
}

impl Solver for ClarabelSolver {
    fn solve(&self, problem: &Problem) -> Result<ProblemSolution, SolverError> {
        let n = problem.num_variables();
        if n == 0 {
            return Err(SolverError::EmptyProblem);
        }
        let sign = match problem.objective_sense() {
            ObjectiveSense::Minimize => 1.,
            ObjectiveSense::Maximize => -1.,
        };
        let mut q = vec![0.; n];
        for (variable_id, coefficient) in problem.objective().coefficients() {
            if !coefficient.is_finite() {
                return Err(SolverError::NonFiniteCoefficient("objective".to_string()));
            }
            let variable = problem
                .variable(variable_id)
                .ok_or_else(|| SolverError::UnknownVariable(variable_id.to_string()))?;
            q[variable.index()] = sign * coefficient;
        }

        let (rows, dual_rows) = ConicRows::build(problem)?;
        let (a, b) = rows.assemble(n);
        let p = ClarabelMatrix::new(n, n, vec![0; n + 1], vec![], vec![]);
        let mut cones = Vec::with_capacity(2);
        if !rows.zero.is_empty() {
            cones.push(SupportedConeT::ZeroConeT(rows.zero.len()));
        }
        if !rows.nonnegative.is_empty() {
            cones.push(SupportedConeT::NonnegativeConeT(rows.nonnegative.len()));
        }
        let settings = DefaultSettings {
            verbose: self.verbose,
            max_iter: self.max_iterations,
            ..DefaultSettings::default()
        };

        debug!(
            "Solving problem with {} variables, {} equality rows and {} inequality rows",
            n,
            rows.zero.len(),
            rows.nonnegative.len()
        );
        let mut solver = DefaultSolver::new(&p, &q, &a, &b, &cones, settings);
        solver.solve();

        let status = match solver.solution.status {
            SolverStatus::Solved => OptimizationStatus::Optimal,
            SolverStatus::AlmostSolved => OptimizationStatus::AlmostOptimal,
            SolverStatus::PrimalInfeasible | SolverStatus::AlmostPrimalInfeasible => {
                OptimizationStatus::Infeasible
            }
            SolverStatus::DualInfeasible | SolverStatus::AlmostDualInfeasible => {
                OptimizationStatus::Unbounded
            }
            SolverStatus::MaxIterations
            | SolverStatus::MaxTime
            | SolverStatus::InsufficientProgress => OptimizationStatus::SolverHalted,
            SolverStatus::NumericalError => OptimizationStatus::NumericalError,
            _ => OptimizationStatus::Unoptimized,
        };
        debug!("Clarabel finished with status {:?}", status);
        if !status.is_optimal() {
            return Ok(ProblemSolution::failed(status));
        }

        let x = &solver.solution.x;
        let z = &solver.solution.z;
        let variable_values: IndexMap<String, f64> = problem
            .variables()
            .values()
            .map(|v| (v.id().to_string(), x[v.index()]))
            .collect();
        let objective_value = problem.objective().evaluate(&variable_values);

        // Inequality rows come after all zero cone rows
        let offset = rows.zero.len();
        let dual_values: IndexMap<String, f64> = dual_rows
            .into_iter()
            .map(|(id, dual_row)| {
                let dual = match dual_row {
                    DualRows::Equality(row) => -sign * z[row],
                    DualRows::Inequality { lower, upper } => {
                        let z_lower = lower.map(|r| z[offset + r]).unwrap_or(0.);
                        let z_upper = upper.map(|r| z[offset + r]).unwrap_or(0.);
                        sign * (z_lower - z_upper)
                    }
                };
                (id, dual)
            })
            .collect();

        Ok(ProblemSolution {
            status,
            objective_value: Some(objective_value),
            variable_values: Some(variable_values),
            dual_values: Some(dual_values),
        })
    }
}
