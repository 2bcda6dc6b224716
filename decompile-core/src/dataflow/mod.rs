//! Per-function data-flow passes run after p-code generation:
//! heritage (SSA construction), consume-mask liveness, non-zero mask
//! propagation, and conditional constant propagation.

pub mod condconst;
pub mod consume;
pub mod heritage;
pub mod nonzero;
