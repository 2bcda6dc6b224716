//! The data-type lattice and propagation.

pub mod datatype;
pub mod propagate;
