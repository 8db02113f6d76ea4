use std::path::Path;

const SOURCES: [&str; 4] = [
    "extern/icasadi.c",
    "extern/auto_casadi_cost.c",
    "extern/auto_casadi_grad.c",
    "extern/auto_casadi_constraints_type_penalty.c",
];

fn main() {
    for source in SOURCES {
        assert!(
            Path::new(source).is_file(),
            "{source} is missing; generate the optimizer before building icasadi"
        );
        println!("cargo:rerun-if-changed={source}");
    }
    println!("cargo:rerun-if-changed=extern/icasadi.h");
    println!("cargo:rerun-if-changed=extern/icasadi_config.h");

    cc::Build::new()
        .include("extern")
        .files(SOURCES)
        .flag_if_supported("-Wall")
        .flag_if_supported("-O3")
        .compile("icasadi");
}
