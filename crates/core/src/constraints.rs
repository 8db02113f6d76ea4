use crate::ProblemError;

/// A hard constraint set `U` on the decision variables.
///
/// The generated solver projects onto `U` at every iteration, so these
/// constraints hold exactly at the solution, unlike the penalty-type
/// constraints folded into the cost.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Constraints {
    /// `U = ℝⁿ`
    #[default]
    None,

    /// The Euclidean ball `‖u - center‖ ≤ radius`.
    ///
    /// A missing `center` means the origin.
    Ball2 {
        center: Option<Vec<f64>>,
        radius: f64,
    },

    /// The box `xmin ≤ u ≤ xmax`, element-wise.
    ///
    /// A missing bound leaves that side open, but at least one side must be
    /// given.
    Rectangle {
        xmin: Option<Vec<f64>>,
        xmax: Option<Vec<f64>>,
    },
}

impl Constraints {
    /// A ball of `radius` around `center`.
    #[must_use]
    pub fn ball2(center: Option<Vec<f64>>, radius: f64) -> Self {
        Self::Ball2 { center, radius }
    }

    /// A box with optional lower and upper bounds.
    #[must_use]
    pub fn rectangle(xmin: Option<Vec<f64>>, xmax: Option<Vec<f64>>) -> Self {
        Self::Rectangle { xmin, xmax }
    }

    /// Checks that the set is nonempty and sized for `n_u` decision variables.
    ///
    /// # Errors
    ///
    /// Returns [`ProblemError::ConstraintDimension`] if a center or bound has
    /// the wrong length, or [`ProblemError::InvalidConstraints`] if a value is
    /// not finite, the radius is not positive, no bound is given, or
    /// `xmin > xmax` somewhere.
    pub fn validate(&self, n_u: usize) -> Result<(), ProblemError> {
        match self {
            Self::None => Ok(()),
            Self::Ball2 { center, radius } => {
                if !radius.is_finite() || *radius <= 0.0 {
                    return Err(ProblemError::InvalidConstraints(
                        "ball radius must be finite and positive".into(),
                    ));
                }
                if let Some(center) = center {
                    check_vector("center", center, n_u)?;
                }
                Ok(())
            }
            Self::Rectangle { xmin, xmax } => {
                if xmin.is_none() && xmax.is_none() {
                    return Err(ProblemError::InvalidConstraints(
                        "a rectangle needs at least one of xmin and xmax".into(),
                    ));
                }
                if let Some(xmin) = xmin {
                    check_vector("xmin", xmin, n_u)?;
                }
                if let Some(xmax) = xmax {
                    check_vector("xmax", xmax, n_u)?;
                }
                if let (Some(xmin), Some(xmax)) = (xmin, xmax) {
                    if let Some(i) = xmin.iter().zip(xmax).position(|(lo, hi)| lo > hi) {
                        return Err(ProblemError::InvalidConstraints(format!(
                            "xmin[{i}] = {} exceeds xmax[{i}] = {}",
                            xmin[i], xmax[i]
                        )));
                    }
                }
                Ok(())
            }
        }
    }
}

fn check_vector(name: &'static str, values: &[f64], n_u: usize) -> Result<(), ProblemError> {
    if values.len() != n_u {
        return Err(ProblemError::ConstraintDimension {
            name,
            expected: n_u,
            actual: values.len(),
        });
    }
    if values.iter().any(|v| !v.is_finite()) {
        return Err(ProblemError::InvalidConstraints(format!(
            "{name} must be finite"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_constraints_fit_any_dimension() {
        assert!(Constraints::None.validate(1).is_ok());
        assert!(Constraints::None.validate(100).is_ok());
    }

    #[test]
    fn ball_checks_radius_and_center() {
        assert!(Constraints::ball2(None, 1.5).validate(3).is_ok());
        assert!(Constraints::ball2(Some(vec![0.0, 1.0]), 1.0).validate(2).is_ok());

        for radius in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                Constraints::ball2(None, radius).validate(2),
                Err(ProblemError::InvalidConstraints(_))
            ));
        }
        assert_eq!(
            Constraints::ball2(Some(vec![0.0]), 1.0).validate(2),
            Err(ProblemError::ConstraintDimension {
                name: "center",
                expected: 2,
                actual: 1
            })
        );
    }

    #[test]
    fn rectangle_needs_ordered_bounds() {
        assert!(Constraints::rectangle(Some(vec![-1.0, 0.0]), None).validate(2).is_ok());
        assert!(
            Constraints::rectangle(Some(vec![-1.0, 0.0]), Some(vec![1.0, 0.0]))
                .validate(2)
                .is_ok()
        );

        assert!(matches!(
            Constraints::rectangle(None, None).validate(2),
            Err(ProblemError::InvalidConstraints(_))
        ));
        assert!(matches!(
            Constraints::rectangle(Some(vec![0.0, 2.0]), Some(vec![1.0, 1.0])).validate(2),
            Err(ProblemError::InvalidConstraints(reason)) if reason.contains("xmin[1]")
        ));
        assert_eq!(
            Constraints::rectangle(None, Some(vec![1.0; 3])).validate(2),
            Err(ProblemError::ConstraintDimension {
                name: "xmax",
                expected: 2,
                actual: 3
            })
        );
        assert!(matches!(
            Constraints::rectangle(Some(vec![f64::NEG_INFINITY, 0.0]), None).validate(2),
            Err(ProblemError::InvalidConstraints(_))
        ));
    }
}
