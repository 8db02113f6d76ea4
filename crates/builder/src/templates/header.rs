use std::fmt::Write;

use crate::{KernelKind, RenderError};

use super::{Bindings, Template};

/// The runtime-support configuration header, `icasadi_config.h`.
///
/// Carries the problem dimensions and the C names of the three kernels as
/// preprocessor definitions.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConfigHeaderTemplate;

impl ConfigHeaderTemplate {
    fn write(bindings: &Bindings<'_>, out: &mut String) -> std::fmt::Result {
        let dims = bindings.dimensions;
        let name_of = |kind: KernelKind| kind.function_name(bindings.build);

        writeln!(out, "/*")?;
        writeln!(out, " * Configuration of optimizer `{}`.", bindings.meta.optimizer_name())?;
        writeln!(out, " *")?;
        writeln!(out, " * Generated by optigen at {}. Do not edit.", bindings.timestamp)?;
        writeln!(out, " */")?;
        writeln!(out)?;
        writeln!(out, "#ifndef ICASADI_CONFIG_H")?;
        writeln!(out, "#define ICASADI_CONFIG_H")?;
        writeln!(out)?;
        writeln!(out, "/* Number of decision variables */")?;
        writeln!(out, "#define NU {}", dims.decision_variables)?;
        writeln!(out)?;
        writeln!(out, "/* Number of parameters, including penalty multipliers */")?;
        writeln!(out, "#define NP {}", dims.parameters)?;
        writeln!(out)?;
        writeln!(out, "/* Number of parameters before augmentation */")?;
        writeln!(out, "#define NP_ORIGINAL {}", dims.original_parameters)?;
        writeln!(out)?;
        writeln!(out, "/* Number of penalty-type constraints */")?;
        writeln!(out, "#define NUM_CONSTRAINTS_TYPE_PENALTY {}", dims.constraints)?;
        writeln!(out)?;
        writeln!(out, "#define ICASADI_COST {}", name_of(KernelKind::Cost))?;
        writeln!(out, "#define ICASADI_GRAD {}", name_of(KernelKind::Gradient))?;
        writeln!(
            out,
            "#define ICASADI_CONSTRAINTS_PENALTY {}",
            name_of(KernelKind::ConstraintPenalty)
        )?;
        writeln!(out)?;
        writeln!(out, "#endif /* ICASADI_CONFIG_H */")
    }
}

impl Template for ConfigHeaderTemplate {
    fn id(&self) -> &'static str {
        "icasadi_config.h"
    }

    fn path(&self) -> &'static str {
        "icasadi/extern/icasadi_config.h"
    }

    fn render(&self, bindings: &Bindings<'_>) -> Result<String, RenderError> {
        let mut out = String::new();
        Self::write(bindings, &mut out).map_err(|_| RenderError::Format(self.id()))?;
        Ok(out)
    }
}
