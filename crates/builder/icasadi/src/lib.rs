//! Safe access to the C kernels generated by optigen.
//!
//! The dimensions are read from the generated `icasadi_config.h` at run time,
//! so this crate never needs to be edited between builds.

use std::os::raw::{c_double, c_int};

extern "C" {
    fn icasadi_num_decision_variables() -> c_int;
    fn icasadi_num_parameters() -> c_int;
    fn icasadi_num_original_parameters() -> c_int;
    fn icasadi_num_constraints_penalty() -> c_int;

    #[link_name = "icasadi_cost"]
    fn icasadi_cost_raw(u: *const c_double, p: *const c_double, cost: *mut c_double) -> c_int;
    #[link_name = "icasadi_grad"]
    fn icasadi_grad_raw(u: *const c_double, p: *const c_double, grad: *mut c_double) -> c_int;
    #[link_name = "icasadi_constraints_penalty"]
    fn icasadi_constraints_penalty_raw(
        u: *const c_double,
        p: *const c_double,
        out: *mut c_double,
    ) -> c_int;
}

/// Number of decision variables.
pub fn num_decision_variables() -> usize {
    unsafe { icasadi_num_decision_variables() as usize }
}

/// Number of parameters, including the penalty multipliers.
pub fn num_parameters() -> usize {
    unsafe { icasadi_num_parameters() as usize }
}

/// Number of parameters of the problem before augmentation.
pub fn num_original_parameters() -> usize {
    unsafe { icasadi_num_original_parameters() as usize }
}

/// Number of penalty-type constraints.
pub fn num_constraints_penalty() -> usize {
    unsafe { icasadi_num_constraints_penalty() as usize }
}

fn check(u: &[f64], p: &[f64], min_params: usize) {
    assert_eq!(u.len(), num_decision_variables(), "wrong number of decision variables");
    assert!(p.len() >= min_params, "too few parameters");
}

/// Evaluates the cost at `(u, p)`; `p` holds the parameters and multipliers.
pub fn icasadi_cost(u: &[f64], p: &[f64], cost: &mut f64) -> i32 {
    check(u, p, num_parameters());
    unsafe { icasadi_cost_raw(u.as_ptr(), p.as_ptr(), cost) }
}

/// Evaluates the gradient of the cost with respect to `u`.
pub fn icasadi_grad(u: &[f64], p: &[f64], grad: &mut [f64]) -> i32 {
    check(u, p, num_parameters());
    assert_eq!(grad.len(), num_decision_variables(), "wrong gradient length");
    unsafe { icasadi_grad_raw(u.as_ptr(), p.as_ptr(), grad.as_mut_ptr()) }
}

/// Evaluates the raw penalty-type constraints.
///
/// Only the original parameters are read, so `p` may also be the full
/// parameter vector including multipliers.
pub fn icasadi_constraints_penalty(u: &[f64], p: &[f64], out: &mut [f64]) -> i32 {
    check(u, p, num_original_parameters());
    assert_eq!(out.len(), num_constraints_penalty(), "wrong constraint length");
    unsafe { icasadi_constraints_penalty_raw(u.as_ptr(), p.as_ptr(), out.as_mut_ptr()) }
}
