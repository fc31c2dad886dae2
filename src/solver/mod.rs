//! QP solvers for the SVM dual
//!
//! [`qp`] holds the canonical problem form and the [`QpSolver`] seam;
//! [`smo`] is the default Sequential Minimal Optimization backend.

pub mod qp;
pub mod smo;

pub use self::qp::*;
pub use self::smo::*;
