//! Function-level decompilation engine: p-code intermediate representation,
//! SSA construction, the peephole rule pool and action scheduler, data type
//! propagation, prototype/parameter recovery, split-varnode recomposition,
//! and cast insertion. See `SPEC_FULL.md` for the system this crate
//! implements and `DESIGN.md` for where each part is grounded.
//!
//! This crate does not load binaries, disassemble instructions, structure
//! control flow into high-level statements, or emit C-like source text;
//! those concerns sit behind the collaborator traits in [`arch`] and are
//! supplied by a caller.

pub mod action;
pub mod actiondatabase;
pub mod arch;
pub mod casts;
pub mod dataflow;
pub mod error;
pub mod ir;
pub mod proto;
pub mod rule;
pub mod rules;
pub mod schedule;
pub mod split;
pub mod symbol;
pub mod timing;
pub mod types;

pub use error::{DecompileError, DecompileResult};
