use serde::{Deserialize, Serialize};

use super::ConfigError;

/// Tuning parameters of the generated solver.
///
/// These values are not used by the build itself; they are written into the
/// generated solver source as constants.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SolverConfiguration {
    tolerance: f64,
    lbfgs_memory: usize,
    max_iterations: usize,
    max_duration_micros: Option<u64>,
    penalty_weight_initial: f64,
}

impl Default for SolverConfiguration {
    fn default() -> Self {
        Self {
            tolerance: 1e-4,
            lbfgs_memory: 10,
            max_iterations: 500,
            max_duration_micros: None,
            penalty_weight_initial: 1.0,
        }
    }
}

impl SolverConfiguration {
    /// Creates a configuration with validated tolerance and memory.
    ///
    /// # Errors
    ///
    /// Returns an error if `tolerance` is not finite and positive, or if
    /// `lbfgs_memory` or `max_iterations` is zero.
    pub fn new(
        tolerance: f64,
        lbfgs_memory: usize,
        max_iterations: usize,
    ) -> Result<Self, ConfigError> {
        let config = Self {
            tolerance,
            lbfgs_memory,
            max_iterations,
            ..Self::default()
        };
        config.validate()?;
        Ok(config)
    }

    /// Limits the wall-clock time of a single solve.
    #[must_use]
    pub fn with_max_duration_micros(mut self, micros: u64) -> Self {
        self.max_duration_micros = Some(micros);
        self
    }

    /// Sets the weight the generated solver uses for every penalty
    /// multiplier when the caller does not supply one.
    #[must_use]
    pub fn with_penalty_weight_initial(mut self, weight: f64) -> Self {
        self.penalty_weight_initial = weight;
        self
    }

    #[must_use]
    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    #[must_use]
    pub fn lbfgs_memory(&self) -> usize {
        self.lbfgs_memory
    }

    #[must_use]
    pub fn max_iterations(&self) -> usize {
        self.max_iterations
    }

    #[must_use]
    pub fn max_duration_micros(&self) -> Option<u64> {
        self.max_duration_micros
    }

    #[must_use]
    pub fn penalty_weight_initial(&self) -> f64 {
        self.penalty_weight_initial
    }

    /// Checks that every tuning value is in range.
    ///
    /// # Errors
    ///
    /// Returns the first out-of-range value found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.tolerance.is_finite() || self.tolerance <= 0.0 {
            return Err(ConfigError::Tolerance);
        }
        if self.lbfgs_memory == 0 {
            return Err(ConfigError::LbfgsMemory);
        }
        if self.max_iterations == 0 {
            return Err(ConfigError::MaxIterations);
        }
        if !self.penalty_weight_initial.is_finite() || self.penalty_weight_initial < 0.0 {
            return Err(ConfigError::PenaltyWeight);
        }
        Ok(())
    }
}
