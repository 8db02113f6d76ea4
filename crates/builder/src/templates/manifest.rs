use serde::Serialize;

use crate::{RenderError, scaffold::RUNTIME_DIR};

use super::{Bindings, Template};

/// Version requirement of the solver crate the generated project builds on.
const OPTIMIZATION_ENGINE: &str = "0.9";

/// The generated project's `Cargo.toml`.
///
/// The manifest declares an empty `[workspace]` so the generated project is
/// always its own workspace root, even when the build directory sits inside
/// another workspace. The runtime-support crate is a path dependency and so
/// becomes a member of that workspace.
#[derive(Debug, Clone, Copy, Default)]
pub struct ManifestTemplate;

#[derive(Serialize)]
struct Manifest<'a> {
    package: Package<'a>,
    dependencies: Dependencies,
    workspace: Workspace,
}

#[derive(Serialize)]
struct Package<'a> {
    name: &'a str,
    version: &'a str,
    authors: &'a [String],
    license: &'a str,
    edition: &'static str,
    publish: bool,
}

#[derive(Serialize)]
struct Dependencies {
    optimization_engine: &'static str,
    icasadi: PathDependency,
}

#[derive(Serialize)]
struct PathDependency {
    path: &'static str,
}

#[derive(Serialize)]
struct Workspace {}

impl Template for ManifestTemplate {
    fn id(&self) -> &'static str {
        "optimizer_cargo.toml"
    }

    fn path(&self) -> &'static str {
        "Cargo.toml"
    }

    fn render(&self, bindings: &Bindings<'_>) -> Result<String, RenderError> {
        let meta = bindings.meta;
        let manifest = Manifest {
            package: Package {
                name: meta.optimizer_name(),
                version: meta.version(),
                authors: meta.authors(),
                license: meta.licence(),
                edition: "2021",
                publish: false,
            },
            dependencies: Dependencies {
                optimization_engine: OPTIMIZATION_ENGINE,
                icasadi: PathDependency { path: RUNTIME_DIR },
            },
            workspace: Workspace {},
        };

        Ok(toml::to_string(&manifest)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::templates::fixtures::Inputs;

    use optigen_core::config::OptimizerMeta;

    #[test]
    fn renders_package_metadata() {
        let mut inputs = Inputs::default();
        inputs.meta = OptimizerMeta::new("ball_solver")
            .unwrap()
            .with_version("1.0.0")
            .with_authors(vec!["Ada Lovelace".into()])
            .with_licence("Apache-2.0");

        let text = ManifestTemplate.render(&inputs.bindings()).unwrap();
        let manifest: toml::Table = text.parse().unwrap();

        let package = manifest["package"].as_table().unwrap();
        assert_eq!(package["name"].as_str(), Some("ball_solver"));
        assert_eq!(package["version"].as_str(), Some("1.0.0"));
        assert_eq!(package["license"].as_str(), Some("Apache-2.0"));
        assert_eq!(
            package["authors"].as_array().unwrap()[0].as_str(),
            Some("Ada Lovelace")
        );
    }

    #[test]
    fn depends_on_runtime_support() {
        let text = ManifestTemplate.render(&Inputs::default().bindings()).unwrap();
        let manifest: toml::Table = text.parse().unwrap();

        let dependencies = manifest["dependencies"].as_table().unwrap();
        assert_eq!(dependencies["icasadi"]["path"].as_str(), Some("icasadi"));
        assert!(dependencies.contains_key("optimization_engine"));
        assert!(manifest.contains_key("workspace"));
    }
}
