use std::collections::HashSet;

use optigen_symbolic::{Expr, Symbol, Vector};

use crate::{Constraints, PenaltyFunction, ProblemError};

/// A parametric optimization problem.
///
/// ```text
/// minimize    φ(u, p)
/// subject to  u ∈ U         (projected onto by the solver)
///             c(u, p) = 0   (handled by penalty augmentation)
/// ```
///
/// `u` holds the decision variables, `p` the parameters supplied at solve
/// time, and `c` the penalty-type constraints. A problem with no constraints
/// (`n_c = 0`) is solved as is; otherwise the constraints are folded into the
/// cost by [`augment`](crate::augment).
///
/// A `Problem` is immutable once built; every check happens on construction
/// so that a malformed problem is rejected before anything is generated.
#[derive(Debug, Clone)]
pub struct Problem {
    decision_variables: Vector,
    parameters: Vector,
    cost: Expr,
    constraints: Vector,
    penalty: PenaltyFunction,
    hard_constraints: Constraints,
}

impl Problem {
    /// Creates an unconstrained problem.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `u` is empty ([`ProblemError::NoDecisionVariables`])
    /// - an entry of `u` or `p` is not a plain symbol
    /// - a symbol is declared twice
    /// - `cost` depends on a symbol not in `u` or `p`
    pub fn new(u: Vector, p: Vector, cost: Expr) -> Result<Self, ProblemError> {
        if u.is_empty() {
            return Err(ProblemError::NoDecisionVariables);
        }

        let mut declared = HashSet::new();
        for (role, vector) in [("decision variable", &u), ("parameter", &p)] {
            for entry in vector {
                let symbol = entry.as_symbol().ok_or_else(|| ProblemError::NotSymbolic {
                    role,
                    expr: entry.to_string(),
                })?;
                if !declared.insert(symbol.clone()) {
                    return Err(ProblemError::DuplicateSymbol(symbol.clone()));
                }
            }
        }

        // Decision variables and parameters may not share a base name.
        let u_names: HashSet<&str> = u.iter().filter_map(Expr::as_symbol).map(Symbol::name).collect();
        if let Some(symbol) = p
            .iter()
            .filter_map(Expr::as_symbol)
            .find(|s| u_names.contains(s.name()))
        {
            return Err(ProblemError::DuplicateSymbol(symbol.clone()));
        }

        check_declared("cost", &cost, &declared)?;

        Ok(Self {
            decision_variables: u,
            parameters: p,
            cost,
            constraints: Vector::empty(),
            penalty: PenaltyFunction::default(),
            hard_constraints: Constraints::None,
        })
    }

    /// Attaches penalty-type constraints and the function that penalizes them.
    ///
    /// Replaces any constraints set earlier. An empty `constraints` vector
    /// makes the problem unconstrained again.
    ///
    /// # Errors
    ///
    /// Returns an error if a constraint depends on an undeclared symbol or if
    /// `penalty` does not map the constraints to one entry each.
    pub fn with_penalty_constraints(
        mut self,
        constraints: Vector,
        penalty: PenaltyFunction,
    ) -> Result<Self, ProblemError> {
        let declared: HashSet<Symbol> = self
            .decision_variables
            .iter()
            .chain(&self.parameters)
            .filter_map(Expr::as_symbol)
            .cloned()
            .collect();

        for c in &constraints {
            check_declared("constraint", c, &declared)?;
        }
        penalty.apply(&constraints)?;

        self.constraints = constraints;
        self.penalty = penalty;
        Ok(self)
    }

    /// Restricts the decision variables to a hard constraint set `U`.
    ///
    /// # Errors
    ///
    /// Returns an error if the set is not sized for `n_u` or is otherwise
    /// invalid (see [`Constraints::validate`]).
    pub fn with_constraints(mut self, constraints: Constraints) -> Result<Self, ProblemError> {
        constraints.validate(self.dim_decision_variables())?;
        self.hard_constraints = constraints;
        Ok(self)
    }

    /// The decision variables `u`.
    #[must_use]
    pub fn decision_variables(&self) -> &Vector {
        &self.decision_variables
    }

    /// The parameters `p`.
    #[must_use]
    pub fn parameter_variables(&self) -> &Vector {
        &self.parameters
    }

    /// The cost `φ(u, p)`.
    #[must_use]
    pub fn cost_function(&self) -> &Expr {
        &self.cost
    }

    /// The penalty-type constraints `c(u, p)`; empty if unconstrained.
    #[must_use]
    pub fn penalty_constraints(&self) -> &Vector {
        &self.constraints
    }

    #[must_use]
    pub fn penalty_function(&self) -> &PenaltyFunction {
        &self.penalty
    }

    /// The hard constraint set `U`.
    #[must_use]
    pub fn constraints(&self) -> &Constraints {
        &self.hard_constraints
    }

    /// `n_u`
    #[must_use]
    pub fn dim_decision_variables(&self) -> usize {
        self.decision_variables.len()
    }

    /// `n_p`
    #[must_use]
    pub fn dim_parameters(&self) -> usize {
        self.parameters.len()
    }

    /// `n_c`
    #[must_use]
    pub fn dim_constraints_penalty(&self) -> usize {
        self.constraints.len()
    }

    /// Returns the names used by decision variables and parameters.
    pub(crate) fn symbol_names(&self) -> HashSet<&str> {
        self.decision_variables
            .iter()
            .chain(&self.parameters)
            .filter_map(Expr::as_symbol)
            .map(Symbol::name)
            .collect()
    }
}

fn check_declared(
    role: &'static str,
    expr: &Expr,
    declared: &HashSet<Symbol>,
) -> Result<(), ProblemError> {
    match expr.free_symbols().into_iter().find(|s| !declared.contains(s)) {
        Some(symbol) => Err(ProblemError::UndeclaredSymbol { role, symbol }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uv() -> (Vector, Vector) {
        (Vector::symbolic("u", 2), Vector::symbolic("p", 1))
    }

    #[test]
    fn exposes_dimensions() {
        let (u, p) = uv();
        let cost = u.sum_squares() * &p[0];
        let problem = Problem::new(u.clone(), p, cost)
            .unwrap()
            .with_penalty_constraints(Vector::new(vec![&u[0] - &u[1]]), PenaltyFunction::default())
            .unwrap();

        assert_eq!(problem.dim_decision_variables(), 2);
        assert_eq!(problem.dim_parameters(), 1);
        assert_eq!(problem.dim_constraints_penalty(), 1);
    }

    #[test]
    fn requires_decision_variables() {
        let err = Problem::new(Vector::empty(), Vector::empty(), Expr::one()).unwrap_err();
        assert_eq!(err, ProblemError::NoDecisionVariables);
    }

    #[test]
    fn rejects_compound_decision_variables() {
        let (u, p) = uv();
        let bad = Vector::new(vec![&u[0] * 2.0]);
        let err = Problem::new(bad, p, Expr::one()).unwrap_err();
        assert!(matches!(
            err,
            ProblemError::NotSymbolic {
                role: "decision variable",
                ..
            }
        ));
    }

    #[test]
    fn rejects_compound_parameters() {
        let (u, p) = uv();
        let bad = Vector::new(vec![p[0].exp()]);
        let err = Problem::new(u, bad, Expr::one()).unwrap_err();
        assert!(matches!(
            err,
            ProblemError::NotSymbolic {
                role: "parameter",
                ..
            }
        ));
    }

    #[test]
    fn rejects_shared_symbols() {
        let u = Vector::symbolic("x", 2);
        let p = Vector::symbolic("x", 1);
        let err = Problem::new(u, p, Expr::one()).unwrap_err();
        assert_eq!(err, ProblemError::DuplicateSymbol(Symbol::new("x", 0)));
    }

    #[test]
    fn rejects_names_shared_between_roles() {
        let x = Vector::symbolic("x", 2);
        let u = Vector::new(vec![x[1].clone()]);
        let p = Vector::new(vec![x[0].clone()]);

        let err = Problem::new(u, p, &x[1] * &x[0]).unwrap_err();
        assert_eq!(err, ProblemError::DuplicateSymbol(Symbol::new("x", 0)));
    }

    #[test]
    fn hard_constraints_match_decision_variables() {
        let (u, p) = uv();
        let problem = Problem::new(u.clone(), p, u.sum_squares()).unwrap();
        assert_eq!(problem.constraints(), &Constraints::None);

        let ball = Constraints::ball2(Some(vec![1.0, 2.0]), 0.5);
        let problem = problem.with_constraints(ball.clone()).unwrap();
        assert_eq!(problem.constraints(), &ball);

        let err = problem
            .with_constraints(Constraints::rectangle(Some(vec![0.0; 3]), None))
            .unwrap_err();
        assert_eq!(
            err,
            ProblemError::ConstraintDimension {
                name: "xmin",
                expected: 2,
                actual: 3
            }
        );
    }

    #[test]
    fn rejects_undeclared_symbols() {
        let (u, p) = uv();
        let stray = Vector::symbolic("z", 1);

        let err = Problem::new(u.clone(), p.clone(), &u[0] + &stray[0]).unwrap_err();
        assert!(matches!(err, ProblemError::UndeclaredSymbol { role: "cost", .. }));

        let err = Problem::new(u.clone(), p, u.sum())
            .unwrap()
            .with_penalty_constraints(stray, PenaltyFunction::Identity)
            .unwrap_err();
        assert!(matches!(
            err,
            ProblemError::UndeclaredSymbol {
                role: "constraint",
                ..
            }
        ));
    }
}
