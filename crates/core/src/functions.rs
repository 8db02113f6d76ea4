//! Sample cost functions for examples and tests.

use optigen_symbolic::{Expr, Vector};

use crate::ProblemError;

/// The generalized Rosenbrock function.
///
/// ```text
/// f(u; a, b) = Σ_{i < n-1} b (u[i+1] - u[i]²)² + (a - u[i])²
/// ```
///
/// The minimum is at `u = (a, a², ...)` for the two-dimensional case and at
/// `u = (1, ..., 1)` when `a = 1`.
///
/// # Errors
///
/// Returns [`ProblemError::InvalidArgument`] if `u` is empty or `p` does not
/// have exactly two entries `(a, b)`.
///
/// # Example
///
/// ```
/// use optigen_core::{Problem, functions::rosenbrock, symbolic::Vector};
///
/// let u = Vector::symbolic("u", 5);
/// let p = Vector::symbolic("p", 2);
/// let cost = rosenbrock(&u, &p).unwrap();
/// let problem = Problem::new(u, p, cost).unwrap();
/// assert_eq!(problem.dim_decision_variables(), 5);
/// ```
pub fn rosenbrock(u: &Vector, p: &Vector) -> Result<Expr, ProblemError> {
    if u.is_empty() {
        return Err(ProblemError::InvalidArgument {
            name: "u",
            reason: "must have at least one entry".into(),
        });
    }
    if p.len() != 2 {
        return Err(ProblemError::InvalidArgument {
            name: "p",
            reason: format!("must have exactly two entries (a, b), found {}", p.len()),
        });
    }

    let (a, b) = (&p[0], &p[1]);
    Ok(u.entries()
        .windows(2)
        .map(|w| b * (&w[1] - w[0].powi(2)).powi(2) + (a - &w[0]).powi(2))
        .sum())
}
