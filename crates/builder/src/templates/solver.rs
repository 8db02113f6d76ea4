use proc_macro2::{Ident, Literal, Span, TokenStream};
use quote::quote;

use optigen_core::Constraints;

use crate::RenderError;

use super::{Bindings, Template};

/// The generated project's `src/lib.rs`.
///
/// Exposes the problem dimensions and solver settings as constants, and wraps
/// the runtime-support kernels in a PANOC solver:
///
/// - `initialize_solver()` allocates the solver cache
/// - `solve(p, cache, u)` solves with every penalty multiplier set to
///   `PENALTY_WEIGHT_INITIAL`
/// - `solve_with_multipliers(p, multipliers, cache, u)` solves with explicit
///   multipliers, for outer penalty loops
/// - `constraints_penalty(u, p, out)` evaluates the raw constraints
///
/// The hard constraint set of the problem becomes the solver's projection
/// set: `NoConstraints`, `Ball2`, or `Rectangle` from `optimization_engine`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SolverTemplate;

impl SolverTemplate {
    fn tokens(bindings: &Bindings<'_>) -> Result<TokenStream, RenderError> {
        let dims = bindings.dimensions;
        let solver = bindings.solver;

        let doc = format!(
            " Optimizer `{}`, generated by optigen. Do not edit.",
            bindings.meta.optimizer_name()
        );
        let n_u = Literal::usize_unsuffixed(dims.decision_variables);
        let n_p = Literal::usize_unsuffixed(dims.parameters);
        let n_p_original = Literal::usize_unsuffixed(dims.original_parameters);
        let n_c = Literal::usize_unsuffixed(dims.constraints);
        let tolerance = float("tolerance", solver.tolerance())?;
        let lbfgs_memory = Literal::usize_unsuffixed(solver.lbfgs_memory());
        let max_iterations = Literal::usize_unsuffixed(solver.max_iterations());
        let penalty_weight = float("penalty_weight_initial", solver.penalty_weight_initial())?;
        let max_duration = match solver.max_duration_micros() {
            Some(micros) => {
                let micros = Literal::u64_unsuffixed(micros);
                quote! { Some(Duration::from_micros(#micros)) }
            }
            None => quote! { None },
        };
        let (set, bounds) = constraint_set(bindings.constraints)?;

        Ok(quote! {
            #![doc = #doc]

            use std::time::Duration;

            use optimization_engine::{
                constraints::#set,
                core::SolverStatus,
                panoc::{PANOCCache, PANOCOptimizer},
                Optimizer, Problem, SolverError,
            };

            pub const NUM_DECISION_VARIABLES: usize = #n_u;
            pub const NUM_PARAMETERS: usize = #n_p;
            pub const NUM_ORIGINAL_PARAMETERS: usize = #n_p_original;
            pub const NUM_CONSTRAINTS_PENALTY: usize = #n_c;

            pub const TOLERANCE: f64 = #tolerance;
            pub const LBFGS_MEMORY: usize = #lbfgs_memory;
            pub const MAX_ITERATIONS: usize = #max_iterations;
            pub const MAX_DURATION: Option<Duration> = #max_duration;
            pub const PENALTY_WEIGHT_INITIAL: f64 = #penalty_weight;

            /// Allocates the solver cache; reuse it across solves.
            pub fn initialize_solver() -> PANOCCache {
                PANOCCache::new(NUM_DECISION_VARIABLES, TOLERANCE, LBFGS_MEMORY)
            }

            /// Solves for parameters `p`, weighting every constraint with
            /// `PENALTY_WEIGHT_INITIAL`. `u` holds the initial guess on entry and
            /// the solution on return.
            pub fn solve(
                p: &[f64],
                cache: &mut PANOCCache,
                u: &mut [f64],
            ) -> Result<SolverStatus, SolverError> {
                let multipliers = [PENALTY_WEIGHT_INITIAL; NUM_CONSTRAINTS_PENALTY];
                solve_with_multipliers(p, &multipliers, cache, u)
            }

            /// Solves for parameters `p` with explicit penalty multipliers.
            pub fn solve_with_multipliers(
                p: &[f64],
                multipliers: &[f64],
                cache: &mut PANOCCache,
                u: &mut [f64],
            ) -> Result<SolverStatus, SolverError> {
                assert_eq!(p.len(), NUM_ORIGINAL_PARAMETERS, "wrong number of parameters");
                assert_eq!(multipliers.len(), NUM_CONSTRAINTS_PENALTY, "wrong number of multipliers");
                assert_eq!(u.len(), NUM_DECISION_VARIABLES, "wrong number of decision variables");

                let mut params = Vec::with_capacity(NUM_PARAMETERS);
                params.extend_from_slice(p);
                params.extend_from_slice(multipliers);

                let cost = |u: &[f64], c: &mut f64| -> Result<(), SolverError> {
                    if icasadi::icasadi_cost(u, &params, c) == 0 {
                        Ok(())
                    } else {
                        Err(SolverError::Cost)
                    }
                };
                let grad = |u: &[f64], g: &mut [f64]| -> Result<(), SolverError> {
                    if icasadi::icasadi_grad(u, &params, g) == 0 {
                        Ok(())
                    } else {
                        Err(SolverError::Cost)
                    }
                };

                #bounds
                let problem = Problem::new(&bounds, grad, cost);
                let mut optimizer = PANOCOptimizer::new(problem, cache).with_max_iter(MAX_ITERATIONS);
                if let Some(duration) = MAX_DURATION {
                    optimizer = optimizer.with_max_duration(duration);
                }
                optimizer.solve(u)
            }

            /// Evaluates the raw penalty-type constraints at `(u, p)`.
            pub fn constraints_penalty(u: &[f64], p: &[f64], out: &mut [f64]) {
                icasadi::icasadi_constraints_penalty(u, p, out);
            }
        })
    }
}

fn float(name: &'static str, value: f64) -> Result<Literal, RenderError> {
    if value.is_finite() {
        Ok(Literal::f64_unsuffixed(value))
    } else {
        Err(RenderError::NonFinite(name))
    }
}

/// A signed float expression; literals themselves carry no sign.
fn signed(name: &'static str, value: f64) -> Result<TokenStream, RenderError> {
    let magnitude = float(name, value.abs())?;
    Ok(if value.is_sign_negative() {
        quote! { -#magnitude }
    } else {
        quote! { #magnitude }
    })
}

/// Declares `name` as a local array and returns the slice argument for it.
fn array(
    name: &'static str,
    values: Option<&Vec<f64>>,
) -> Result<(TokenStream, TokenStream), RenderError> {
    let Some(values) = values else {
        return Ok((TokenStream::new(), quote! { None }));
    };
    let ident = Ident::new(name, Span::call_site());
    let len = Literal::usize_unsuffixed(values.len());
    let entries = values
        .iter()
        .map(|v| signed(name, *v))
        .collect::<Result<Vec<_>, _>>()?;
    Ok((
        quote! { let #ident: [f64; #len] = [#(#entries),*]; },
        quote! { Some(&#ident[..]) },
    ))
}

/// The `optimization_engine` set type and the statements that build `bounds`.
fn constraint_set(constraints: &Constraints) -> Result<(Ident, TokenStream), RenderError> {
    let ident = |name| Ident::new(name, Span::call_site());
    Ok(match constraints {
        Constraints::None => (
            ident("NoConstraints"),
            quote! { let bounds = NoConstraints::new(); },
        ),
        Constraints::Ball2 { center, radius } => {
            let radius = float("radius", *radius)?;
            let (decl, arg) = array("center", center.as_ref())?;
            (
                ident("Ball2"),
                quote! {
                    #decl
                    let bounds = Ball2::new(#arg, #radius);
                },
            )
        }
        Constraints::Rectangle { xmin, xmax } => {
            let (min_decl, min_arg) = array("xmin", xmin.as_ref())?;
            let (max_decl, max_arg) = array("xmax", xmax.as_ref())?;
            (
                ident("Rectangle"),
                quote! {
                    #min_decl
                    #max_decl
                    let bounds = Rectangle::new(#min_arg, #max_arg);
                },
            )
        }
    })
}

impl Template for SolverTemplate {
    fn id(&self) -> &'static str {
        "optimizer.rs"
    }

    fn path(&self) -> &'static str {
        "src/lib.rs"
    }

    fn render(&self, bindings: &Bindings<'_>) -> Result<String, RenderError> {
        let file: syn::File = syn::parse2(Self::tokens(bindings)?)?;
        Ok(prettyplease::unparse(&file))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::templates::fixtures::Inputs;

    use optigen_core::config::SolverConfiguration;

    #[test]
    fn renders_constants() {
        let mut inputs = Inputs::default();
        inputs.solver = SolverConfiguration::new(1e-6, 20, 300).unwrap();

        let text = SolverTemplate.render(&inputs.bindings()).unwrap();

        for line in [
            "pub const NUM_DECISION_VARIABLES: usize = 5;",
            "pub const NUM_PARAMETERS: usize = 4;",
            "pub const NUM_ORIGINAL_PARAMETERS: usize = 2;",
            "pub const NUM_CONSTRAINTS_PENALTY: usize = 2;",
            "pub const LBFGS_MEMORY: usize = 20;",
            "pub const MAX_ITERATIONS: usize = 300;",
            "pub const MAX_DURATION: Option<Duration> = None;",
        ] {
            assert!(text.lines().any(|l| l.trim() == line), "missing `{line}`");
        }
        assert!(text.starts_with("//! Optimizer `rosenbrock`"));
    }

    #[test]
    fn renders_duration_limit() {
        let mut inputs = Inputs::default();
        inputs.solver = SolverConfiguration::default().with_max_duration_micros(5_000);

        let text = SolverTemplate.render(&inputs.bindings()).unwrap();
        assert!(text.contains("Some(Duration::from_micros(5000))"));
    }

    #[test]
    fn exposes_entry_points() {
        let text = SolverTemplate.render(&Inputs::default().bindings()).unwrap();
        let file = syn::parse_file(&text).unwrap();

        let functions: Vec<String> = file
            .items
            .iter()
            .filter_map(|item| match item {
                syn::Item::Fn(f) => Some(f.sig.ident.to_string()),
                _ => None,
            })
            .collect();

        assert_eq!(
            functions,
            [
                "initialize_solver",
                "solve",
                "solve_with_multipliers",
                "constraints_penalty"
            ]
        );
    }

    /// Every path brought into scope by a `use` item, joined with `::`.
    fn imports(file: &syn::File) -> Vec<String> {
        fn walk(prefix: &str, tree: &syn::UseTree, out: &mut Vec<String>) {
            match tree {
                syn::UseTree::Path(path) => walk(&format!("{prefix}{}::", path.ident), &path.tree, out),
                syn::UseTree::Name(name) => out.push(format!("{prefix}{}", name.ident)),
                syn::UseTree::Group(group) => {
                    for tree in &group.items {
                        walk(prefix, tree, out);
                    }
                }
                syn::UseTree::Rename(_) | syn::UseTree::Glob(_) => {
                    panic!("unexpected import form under `{prefix}`")
                }
            }
        }

        let mut out = Vec::new();
        for item in &file.items {
            if let syn::Item::Use(item) = item {
                walk("", &item.tree, &mut out);
            }
        }
        out.sort();
        out
    }

    #[test]
    fn imports_resolve_in_the_runtime_crate() {
        let text = SolverTemplate.render(&Inputs::default().bindings()).unwrap();
        let file = syn::parse_file(&text).unwrap();

        assert_eq!(
            imports(&file),
            [
                "optimization_engine::Optimizer",
                "optimization_engine::Problem",
                "optimization_engine::SolverError",
                "optimization_engine::constraints::NoConstraints",
                "optimization_engine::core::SolverStatus",
                "optimization_engine::panoc::PANOCCache",
                "optimization_engine::panoc::PANOCOptimizer",
                "std::time::Duration",
            ]
        );
    }

    #[test]
    fn renders_ball_constraints() {
        let mut inputs = Inputs::default();
        inputs.constraints = Constraints::ball2(Some(vec![1.0, -2.5, 0.0, 0.0, 3.0]), 0.5);

        let text = SolverTemplate.render(&inputs.bindings()).unwrap();
        let file = syn::parse_file(&text).unwrap();

        assert!(imports(&file).contains(&"optimization_engine::constraints::Ball2".to_owned()));
        assert!(text.contains("let center: [f64; 5] = [1.0, -2.5, 0.0, 0.0, 3.0];"));
        assert!(text.contains("let bounds = Ball2::new(Some(&center[..]), 0.5);"));
        assert!(!text.contains("NoConstraints"));
    }

    #[test]
    fn renders_ball_around_the_origin() {
        let mut inputs = Inputs::default();
        inputs.constraints = Constraints::ball2(None, 2.0);

        let text = SolverTemplate.render(&inputs.bindings()).unwrap();
        assert!(text.contains("let bounds = Ball2::new(None, 2.0);"));
    }

    #[test]
    fn renders_one_sided_rectangle() {
        let mut inputs = Inputs::default();
        inputs.constraints = Constraints::rectangle(Some(vec![-1.0; 5]), None);

        let text = SolverTemplate.render(&inputs.bindings()).unwrap();
        let file = syn::parse_file(&text).unwrap();

        assert!(imports(&file).contains(&"optimization_engine::constraints::Rectangle".to_owned()));
        assert!(text.contains("let xmin: [f64; 5] = [-1.0, -1.0, -1.0, -1.0, -1.0];"));
        assert!(text.contains("let bounds = Rectangle::new(Some(&xmin[..]), None);"));
        assert!(!text.contains("let xmax"));
    }

    #[test]
    fn rejects_non_finite_settings() {
        let mut inputs = Inputs::default();
        inputs.solver = SolverConfiguration::default().with_penalty_weight_initial(f64::INFINITY);

        assert!(matches!(
            SolverTemplate.render(&inputs.bindings()),
            Err(RenderError::NonFinite("penalty_weight_initial"))
        ));
    }
}
