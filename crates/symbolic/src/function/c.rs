use std::fmt::Write;

use super::{Op, Program};

impl Program {
    /// Emits the program as a self-contained C translation unit.
    ///
    /// The entry point follows the CasADi calling convention:
    ///
    /// ```c
    /// int NAME(const casadi_real** arg, casadi_real** res,
    ///          casadi_int* iw, casadi_real* w, int mem);
    /// ```
    ///
    /// together with `NAME_n_in`, `NAME_n_out`, `NAME_size_in`,
    /// `NAME_size_out`, and `NAME_work`. A null `arg[i]` reads as zeros and a
    /// null `res[i]` is skipped.
    #[must_use]
    pub fn to_c(&self) -> String {
        let mut out = String::new();
        // Writing into a String cannot fail.
        let _ = self.write_c(&mut out);
        out
    }

    fn write_c(&self, out: &mut String) -> std::fmt::Result {
        let name = self.name();

        writeln!(out, "/* This file was automatically generated by optigen. Do not edit. */")?;
        writeln!(out)?;
        writeln!(out, "#ifdef __cplusplus")?;
        writeln!(out, "extern \"C\" {{")?;
        writeln!(out, "#endif")?;
        writeln!(out)?;
        writeln!(out, "#include <math.h>")?;
        writeln!(out)?;
        writeln!(out, "#ifndef casadi_real")?;
        writeln!(out, "#define casadi_real double")?;
        writeln!(out, "#endif")?;
        writeln!(out)?;
        writeln!(out, "#ifndef casadi_int")?;
        writeln!(out, "#define casadi_int long long int")?;
        writeln!(out, "#endif")?;
        writeln!(out)?;

        writeln!(
            out,
            "int {name}(const casadi_real** arg, casadi_real** res, casadi_int* iw, casadi_real* w, int mem) {{"
        )?;
        writeln!(out, "  (void)iw;")?;
        writeln!(out, "  (void)w;")?;
        writeln!(out, "  (void)mem;")?;
        for (slot, op) in self.instructions().iter().enumerate() {
            writeln!(out, "  casadi_real a{slot} = {};", c_expr(*op))?;
        }
        for (i, slots) in self.outputs().iter().enumerate() {
            if slots.is_empty() {
                continue;
            }
            writeln!(out, "  if (res[{i}] != 0) {{")?;
            for (j, slot) in slots.iter().enumerate() {
                writeln!(out, "    res[{i}][{j}] = a{slot};")?;
            }
            writeln!(out, "  }}")?;
        }
        writeln!(out, "  return 0;")?;
        writeln!(out, "}}")?;
        writeln!(out)?;

        let n_in = self.input_sizes().len();
        let n_out = self.outputs().len();

        writeln!(out, "casadi_int {name}_n_in(void) {{ return {n_in}; }}")?;
        writeln!(out)?;
        writeln!(out, "casadi_int {name}_n_out(void) {{ return {n_out}; }}")?;
        writeln!(out)?;
        write_size_fn(out, name, "size_in", self.input_sizes())?;
        write_size_fn(out, name, "size_out", &self.output_sizes())?;

        writeln!(
            out,
            "int {name}_work(casadi_int* sz_arg, casadi_int* sz_res, casadi_int* sz_iw, casadi_int* sz_w) {{"
        )?;
        writeln!(out, "  if (sz_arg) *sz_arg = {n_in};")?;
        writeln!(out, "  if (sz_res) *sz_res = {n_out};")?;
        writeln!(out, "  if (sz_iw) *sz_iw = 0;")?;
        writeln!(out, "  if (sz_w) *sz_w = 0;")?;
        writeln!(out, "  return 0;")?;
        writeln!(out, "}}")?;
        writeln!(out)?;
        writeln!(out, "#ifdef __cplusplus")?;
        writeln!(out, "}} /* extern \"C\" */")?;
        writeln!(out, "#endif")?;

        Ok(())
    }
}

fn write_size_fn(out: &mut String, name: &str, suffix: &str, sizes: &[usize]) -> std::fmt::Result {
    writeln!(out, "casadi_int {name}_{suffix}(casadi_int i) {{")?;
    writeln!(out, "  switch (i) {{")?;
    for (i, size) in sizes.iter().enumerate() {
        writeln!(out, "    case {i}: return {size};")?;
    }
    writeln!(out, "    default: return 0;")?;
    writeln!(out, "  }}")?;
    writeln!(out, "}}")?;
    writeln!(out)
}

fn c_expr(op: Op) -> String {
    match op {
        Op::Constant(bits) => c_literal(f64::from_bits(bits)),
        Op::Input { arg, index } => format!("arg[{arg}] ? arg[{arg}][{index}] : 0"),
        Op::Neg(a) => format!("-a{a}"),
        Op::Add(a, b) => format!("a{a} + a{b}"),
        Op::Sub(a, b) => format!("a{a} - a{b}"),
        Op::Mul(a, b) => format!("a{a} * a{b}"),
        Op::Div(a, b) => format!("a{a} / a{b}"),
        Op::Powi(a, 2) => format!("a{a} * a{a}"),
        Op::Powi(a, n) => format!("pow(a{a}, {n}.)"),
        Op::Unary(f, a) => format!("{}(a{a})", f.c_name()),
        Op::Max(a, b) => format!("fmax(a{a}, a{b})"),
        Op::Min(a, b) => format!("fmin(a{a}, a{b})"),
        Op::Ge(a, b) => format!("a{a} >= a{b} ? 1. : 0."),
    }
}

fn c_literal(value: f64) -> String {
    if value.is_nan() {
        "NAN".to_owned()
    } else if value == f64::INFINITY {
        "INFINITY".to_owned()
    } else if value == f64::NEG_INFINITY {
        "-INFINITY".to_owned()
    } else {
        format!("{value:.17e}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Function, Vector};

    fn square_plus_param() -> Program {
        let u = Vector::symbolic("u", 2);
        let p = Vector::symbolic("p", 1);
        let f = u[0].powi(2) + &u[1] * &p[0];
        Function::new("phi", vec![u, p], vec![Vector::from(f)])
            .unwrap()
            .lower()
    }

    #[test]
    fn emits_casadi_entry_points() {
        let source = square_plus_param().to_c();

        assert!(source.contains(
            "int phi(const casadi_real** arg, casadi_real** res, casadi_int* iw, casadi_real* w, int mem) {"
        ));
        assert!(source.contains("casadi_int phi_n_in(void) { return 2; }"));
        assert!(source.contains("casadi_int phi_n_out(void) { return 1; }"));
        assert!(source.contains("int phi_work("));
        assert!(source.contains("    case 0: return 2;"));
    }

    #[test]
    fn emits_one_statement_per_instruction() {
        let program = square_plus_param();
        let source = program.to_c();

        let statements = source
            .lines()
            .filter(|l| l.trim_start().starts_with("casadi_real a"))
            .count();
        assert_eq!(statements, program.instructions().len());
        assert!(source.contains("arg[1] ? arg[1][0] : 0"));
        assert!(source.contains("res[0][0] = a"));
    }

    #[test]
    fn empty_outputs_write_nothing() {
        let u = Vector::symbolic("u", 2);
        let source = Function::new("c", vec![u], vec![Vector::empty()])
            .unwrap()
            .lower()
            .to_c();

        assert!(!source.contains("res[0]"));
        assert!(source.contains("casadi_int c_size_out(casadi_int i) {"));
    }

    #[test]
    fn generation_is_deterministic() {
        assert_eq!(square_plus_param().to_c(), square_plus_param().to_c());
    }

    #[test]
    fn literals_are_valid_c() {
        assert_eq!(c_literal(f64::INFINITY), "INFINITY");
        assert_eq!(c_literal(f64::NEG_INFINITY), "-INFINITY");
        assert_eq!(c_literal(f64::NAN), "NAN");
        assert_eq!(c_literal(2.0), "2.00000000000000000e0");
    }
}
