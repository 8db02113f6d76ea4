//! Builds a Rosenbrock optimizer with one penalty-type constraint.
//!
//! # Usage
//!
//! ```text
//! cargo run --example rosenbrock
//! cargo run --example rosenbrock -- --generate-only
//! cargo run --example rosenbrock -- --settings optigen.toml
//! RUST_LOG=optigen_builder=debug cargo run --example rosenbrock
//! ```
//!
//! The optimizer minimizes the five-dimensional Rosenbrock function with
//! parameters `(a, b)`, subject to `u[0] + u[1] = 1` enforced by a
//! sum-of-squares penalty. The project is written to `build/rosenbrock/`
//! unless a settings file says otherwise.

use std::error::Error;

use tracing_subscriber::EnvFilter;

use optigen_builder::{Event, OptimizerBuilder};
use optigen_core::{
    PenaltyFunction, Problem,
    config::{OptimizerMeta, Settings},
    functions::rosenbrock,
    symbolic::Vector,
};

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let mut generate_only = false;
    let mut settings = Settings {
        meta: OptimizerMeta::new("rosenbrock")?,
        ..Settings::default()
    };

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--generate-only" => generate_only = true,
            "--settings" => {
                let path = args.next().ok_or("--settings needs a path")?;
                settings = Settings::from_path(path)?;
            }
            other => {
                eprintln!("Unknown argument: {other}");
                eprintln!("Usage: rosenbrock [--generate-only] [--settings FILE]");
                std::process::exit(1);
            }
        }
    }

    let u = Vector::symbolic("u", 5);
    let p = Vector::symbolic("p", 2);
    let cost = rosenbrock(&u, &p)?;
    let constraints = Vector::new(vec![&u[0] + &u[1] - 1.0]);

    let problem = Problem::new(u, p, cost)?
        .with_penalty_constraints(constraints, PenaltyFunction::SumOfSquares)?;

    let report = OptimizerBuilder::new(problem)
        .with_meta(settings.meta)
        .with_build_config(settings.build)
        .with_solver_config(settings.solver)
        .with_generate_only(generate_only)
        .build_observed(|event: &Event<'_>| {
            if let Event::StageCompleted { stage, outputs } = event {
                for path in *outputs {
                    println!("{stage:>22}  {}", path.display());
                }
            }
            None
        })?;

    println!("{:?}: {}", report.status, report.target_dir.display());
    Ok(())
}
