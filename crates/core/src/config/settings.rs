use std::path::Path;

use serde::{Deserialize, Serialize};

use super::{BuildConfiguration, ConfigError, OptimizerMeta, SolverConfiguration};

/// Complete build settings, as read from a TOML file.
///
/// Every section and every key is optional:
///
/// ```toml
/// [meta]
/// optimizer_name = "rosenbrock"
/// version = "0.1.0"
///
/// [build]
/// build_dir = "target/optimizers"
/// build_mode = "debug"
/// rebuild = "reuse"
///
/// [solver]
/// tolerance = 1e-6
/// lbfgs_memory = 20
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub meta: OptimizerMeta,
    pub build: BuildConfiguration,
    pub solver: SolverConfiguration,
}

impl Settings {
    /// Parses and validates settings from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed TOML, unknown keys, or
    /// unknown values,
    /// or the validation error of the first invalid section.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let settings: Self = toml::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Reads, parses, and validates settings from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Read`] if the file cannot be read, otherwise
    /// the same errors as [`Settings::from_toml_str`].
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::from_toml_str(&text)
    }

    /// Validates every section.
    ///
    /// # Errors
    ///
    /// Returns the first validation error found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.meta.validate()?;
        self.build.validate()?;
        self.solver.validate()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::config::{BuildMode, RebuildPolicy};

    #[test]
    fn empty_document_gives_defaults() {
        assert_eq!(Settings::from_toml_str("").unwrap(), Settings::default());
    }

    #[test]
    fn reads_partial_sections() {
        let settings = Settings::from_toml_str(
            r#"
            [meta]
            optimizer_name = "rosenbrock"

            [build]
            build_mode = "debug"
            rebuild = "reuse"
            cost_function_name = "f"

            [solver]
            lbfgs_memory = 20
            "#,
        )
        .unwrap();

        assert_eq!(settings.meta.optimizer_name(), "rosenbrock");
        assert_eq!(settings.meta.version(), "0.0.1");
        assert_eq!(settings.build.build_mode(), BuildMode::Debug);
        assert_eq!(settings.build.rebuild(), RebuildPolicy::Reuse);
        assert_eq!(settings.build.cost_function_name(), "f");
        assert_eq!(settings.build.grad_function_name(), "grad_phi");
        assert_eq!(settings.solver.lbfgs_memory(), 20);
    }

    #[test]
    fn validates_after_parsing() {
        let err = Settings::from_toml_str("[meta]\noptimizer_name = \"../x\"\n").unwrap_err();
        assert_eq!(err, ConfigError::InvalidName("../x".into()));
    }

    #[test]
    fn rejects_unknown_build_mode() {
        let err = Settings::from_toml_str("[build]\nbuild_mode = \"fast\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn rejects_misspelled_keys() {
        for text in [
            "[build]\nbuild_mod = \"debug\"\n",
            "[meta]\noptimiser_name = \"x\"\n",
            "[solver]\ntolerence = 1e-6\n",
            "[bulid]\nbuild_mode = \"debug\"\n",
        ] {
            let err = Settings::from_toml_str(text).unwrap_err();
            assert!(matches!(err, ConfigError::Parse(_)), "{text:?} was accepted");
        }
    }

    #[test]
    fn reads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[solver]\ntolerance = 1e-8").unwrap();

        let settings = Settings::from_path(file.path()).unwrap();
        assert_eq!(settings.solver.tolerance(), 1e-8);
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let err = Settings::from_path("/nonexistent/optigen.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
