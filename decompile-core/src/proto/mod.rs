//! Prototype and parameter recovery.

pub mod callspec;
pub mod paramrecovery;
pub mod prototype;
pub mod stackptr;
