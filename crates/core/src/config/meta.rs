use serde::{Deserialize, Serialize};

use super::ConfigError;

/// Package metadata of the generated optimizer.
///
/// The optimizer name is also the name of the target directory and of the
/// generated crate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OptimizerMeta {
    optimizer_name: String,
    version: String,
    authors: Vec<String>,
    licence: String,
}

impl Default for OptimizerMeta {
    fn default() -> Self {
        Self {
            optimizer_name: "open_optimizer".to_owned(),
            version: "0.0.1".to_owned(),
            authors: vec!["John Smith".to_owned()],
            licence: "MIT".to_owned(),
        }
    }
}

impl OptimizerMeta {
    /// Creates metadata for an optimizer called `name`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidName`] if `name` is not usable as both a
    /// directory and a crate name.
    pub fn new(name: impl Into<String>) -> Result<Self, ConfigError> {
        let meta = Self {
            optimizer_name: name.into(),
            ..Self::default()
        };
        meta.validate()?;
        Ok(meta)
    }

    #[must_use]
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    #[must_use]
    pub fn with_authors(mut self, authors: Vec<String>) -> Self {
        self.authors = authors;
        self
    }

    #[must_use]
    pub fn with_licence(mut self, licence: impl Into<String>) -> Self {
        self.licence = licence.into();
        self
    }

    #[must_use]
    pub fn optimizer_name(&self) -> &str {
        &self.optimizer_name
    }

    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }

    #[must_use]
    pub fn authors(&self) -> &[String] {
        &self.authors
    }

    #[must_use]
    pub fn licence(&self) -> &str {
        &self.licence
    }

    /// Checks that the optimizer name is a plain identifier.
    ///
    /// Path separators, dots, and leading digits are all rejected, so the
    /// name can never resolve outside the build directory.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidName`] if the name is not
    /// `[A-Za-z_][A-Za-z0-9_]*`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut chars = self.optimizer_name.chars();
        let valid = chars
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
            && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');

        if valid {
            Ok(())
        } else {
            Err(ConfigError::InvalidName(self.optimizer_name.clone()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        assert!(OptimizerMeta::default().validate().is_ok());
    }

    #[test]
    fn accepts_identifiers() {
        for name in ["rosenbrock", "my_optimizer_2", "_hidden"] {
            assert!(OptimizerMeta::new(name).is_ok(), "{name} should be accepted");
        }
    }

    #[test]
    fn rejects_path_like_names() {
        for name in ["", "..", "../escape", "a/b", "a\\b", "9lives", "with space", "dash-name"] {
            assert_eq!(
                OptimizerMeta::new(name),
                Err(ConfigError::InvalidName(name.to_owned())),
            );
        }
    }

    #[test]
    fn builder_sets_fields() {
        let meta = OptimizerMeta::new("demo")
            .unwrap()
            .with_version("1.2.3")
            .with_authors(vec!["Ada".into(), "Grace".into()])
            .with_licence("Apache-2.0");

        assert_eq!(meta.optimizer_name(), "demo");
        assert_eq!(meta.version(), "1.2.3");
        assert_eq!(meta.authors(), ["Ada", "Grace"]);
        assert_eq!(meta.licence(), "Apache-2.0");
    }
}
