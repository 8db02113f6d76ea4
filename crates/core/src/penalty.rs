use std::{fmt, sync::Arc};

use optigen_symbolic::Vector;

use crate::ProblemError;

type CustomPenalty = dyn Fn(&Vector) -> Vector + Send + Sync;

/// Maps constraint values to their penalty terms.
///
/// The image has one entry per constraint. The augmented cost weights each
/// entry with its own penalty multiplier, so with `SumOfSquares` the penalty
/// term is `Σ μᵢ cᵢ²`.
#[derive(Clone, Default)]
pub enum PenaltyFunction {
    /// `cᵢ ↦ cᵢ²`, for equality-type constraints `c(u, p) = 0`.
    #[default]
    SumOfSquares,

    /// `cᵢ ↦ cᵢ`, for constraints that are already penalties.
    Identity,

    /// `cᵢ ↦ max(0, cᵢ)²`, for inequality-type constraints `c(u, p) ≤ 0`.
    PositivePartSquared,

    /// A caller-supplied element-wise map.
    Custom(Arc<CustomPenalty>),
}

impl PenaltyFunction {
    /// Wraps a caller-supplied penalty map.
    pub fn custom(f: impl Fn(&Vector) -> Vector + Send + Sync + 'static) -> Self {
        Self::Custom(Arc::new(f))
    }

    /// Applies the penalty function to the constraint vector.
    ///
    /// # Errors
    ///
    /// Returns [`ProblemError::PenaltyDimension`] if the image does not have
    /// one entry per constraint.
    pub fn apply(&self, constraints: &Vector) -> Result<Vector, ProblemError> {
        let image = match self {
            Self::SumOfSquares => constraints.map(|c| c.powi(2)),
            Self::Identity => constraints.clone(),
            Self::PositivePartSquared => constraints.map(|c| c.max(0.0).powi(2)),
            Self::Custom(f) => f(constraints),
        };

        if image.len() != constraints.len() {
            return Err(ProblemError::PenaltyDimension {
                expected: constraints.len(),
                actual: image.len(),
            });
        }

        Ok(image)
    }
}

impl fmt::Debug for PenaltyFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SumOfSquares => f.write_str("SumOfSquares"),
            Self::Identity => f.write_str("Identity"),
            Self::PositivePartSquared => f.write_str("PositivePartSquared"),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}
