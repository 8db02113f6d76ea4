const C_KEYWORDS: &[&str] = &[
    "auto", "break", "case", "char", "const", "continue", "default", "do", "double", "else",
    "enum", "extern", "float", "for", "goto", "if", "inline", "int", "long", "register",
    "restrict", "return", "short", "signed", "sizeof", "static", "struct", "switch", "typedef",
    "union", "unsigned", "void", "volatile", "while",
];

/// Functions and macros declared by `<math.h>`. The `f` and `l` variants of
/// each function are reserved too.
const MATH_NAMES: &[&str] = &[
    "acos", "acosh", "asin", "asinh", "atan", "atan2", "atanh", "cbrt", "ceil", "copysign",
    "cos", "cosh", "erf", "erfc", "exp", "exp2", "expm1", "fabs", "fdim", "floor", "fma", "fmax",
    "fmin", "fmod", "frexp", "hypot", "ilogb", "ldexp", "lgamma", "llrint", "llround", "log",
    "log10", "log1p", "log2", "logb", "lrint", "lround", "modf", "nan", "nearbyint", "nextafter",
    "nexttoward", "pow", "remainder", "remquo", "rint", "round", "scalbln", "scalbn", "sin",
    "sinh", "sqrt", "tan", "tanh", "tgamma", "trunc", "fpclassify", "isfinite", "isinf",
    "isnan", "isnormal", "signbit", "HUGE_VAL", "INFINITY", "NAN",
];

/// Type names every emitted source defines.
const EMITTED_TYPES: &[&str] = &["casadi_real", "casadi_int"];

/// Returns `true` if `name` can be used as a function name in emitted C.
///
/// The name must start with an ASCII letter or underscore and continue with
/// ASCII alphanumerics or underscores. It must not be a C keyword, a name
/// from `<math.h>` (which every emitted source includes), or one of the
/// emitted `casadi_real` and `casadi_int` types.
#[must_use]
pub fn is_c_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };

    (first.is_ascii_alphabetic() || first == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        && !C_KEYWORDS.contains(&name)
        && !EMITTED_TYPES.contains(&name)
        && !is_math_name(name)
}

fn is_math_name(name: &str) -> bool {
    MATH_NAMES.iter().any(|math| {
        name.strip_prefix(math)
            .is_some_and(|rest| rest.is_empty() || rest == "f" || rest == "l")
    })
}
