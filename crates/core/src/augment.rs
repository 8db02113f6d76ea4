use optigen_symbolic::{Expr, Vector};

use crate::{Constraints, Problem, ProblemError};

/// Base name of the penalty multiplier symbols.
const MULTIPLIER_NAME: &str = "mu";

/// A problem with its constraints folded into the cost.
///
/// ```text
/// p̃ = [p; μ]
/// φ̃(u, p̃) = φ(u, p) + μᵀ · penalty(c(u, p))
/// ```
///
/// The multipliers `μ` are ordinary parameters: the generated solver supplies
/// their values at evaluation time. Augmentation only reserves their slots at
/// the end of the parameter vector.
#[derive(Debug, Clone)]
pub struct AugmentedProblem {
    decision_variables: Vector,
    original_parameters: Vector,
    multipliers: Vector,
    parameters: Vector,
    cost: Expr,
    constraints: Vector,
    hard_constraints: Constraints,
}

impl AugmentedProblem {
    #[must_use]
    pub fn decision_variables(&self) -> &Vector {
        &self.decision_variables
    }

    /// The augmented parameter vector `[p; μ]`.
    #[must_use]
    pub fn parameters(&self) -> &Vector {
        &self.parameters
    }

    /// The parameters of the original problem, `p`.
    #[must_use]
    pub fn original_parameters(&self) -> &Vector {
        &self.original_parameters
    }

    /// The penalty multipliers `μ`; empty when the problem is unconstrained.
    #[must_use]
    pub fn multipliers(&self) -> &Vector {
        &self.multipliers
    }

    /// The augmented cost `φ̃`.
    #[must_use]
    pub fn cost(&self) -> &Expr {
        &self.cost
    }

    /// The raw constraint vector `c(u, p)`, before any penalty is applied.
    #[must_use]
    pub fn penalty_constraints(&self) -> &Vector {
        &self.constraints
    }

    /// The hard constraint set `U`, carried over unchanged.
    #[must_use]
    pub fn constraints(&self) -> &Constraints {
        &self.hard_constraints
    }
}

/// Folds the penalty-type constraints of `problem` into its cost.
///
/// With no constraints, the parameters and cost are returned unchanged.
/// Otherwise `n_c` multiplier symbols are appended to the parameters and the
/// cost is extended by `dot(μ, penalty(c))`.
///
/// Augmentation never modifies `problem` and is deterministic: the same
/// problem always produces a structurally identical augmented cost.
///
/// # Errors
///
/// Returns an error if the penalty function does not produce one entry per
/// constraint.
pub fn augment(problem: &Problem) -> Result<AugmentedProblem, ProblemError> {
    let u = problem.decision_variables().clone();
    let p = problem.parameter_variables().clone();
    let constraints = problem.penalty_constraints().clone();

    if constraints.is_empty() {
        return Ok(AugmentedProblem {
            decision_variables: u,
            original_parameters: p.clone(),
            multipliers: Vector::empty(),
            parameters: p,
            cost: problem.cost_function().clone(),
            constraints,
            hard_constraints: problem.constraints().clone(),
        });
    }

    let mu = Vector::symbolic(&multiplier_name(problem), constraints.len());
    let penalty = problem.penalty_function().apply(&constraints)?;
    let cost = problem.cost_function() + mu.dot(&penalty)?;

    Ok(AugmentedProblem {
        decision_variables: u,
        parameters: p.concat(&mu),
        original_parameters: p,
        multipliers: mu,
        cost,
        constraints,
        hard_constraints: problem.constraints().clone(),
    })
}

/// Picks a multiplier name that no problem symbol already uses.
fn multiplier_name(problem: &Problem) -> String {
    let taken = problem.symbol_names();
    let mut name = MULTIPLIER_NAME.to_owned();
    while taken.contains(name.as_str()) {
        name.push('_');
    }
    name
}
