//! Error taxonomy for the decompilation pipeline.
//!
//! Each failure domain gets its own small enum; `DecompileError` unifies them
//! with `#[from]` so call sites can use `?` without manual wrapping, the same
//! split cranelift-codegen keeps between e.g. verifier errors and `CodegenError`.

use crate::ir::address::Address;

/// Invariant violation or unexpected graph shape. Fatal for the current
/// function, non-fatal for the pipeline (the caller drops this function and
/// continues with the next).
#[derive(Debug, thiserror::Error)]
pub enum LowLevelError {
    #[error("varnode {0:?} has no defining op but is marked written")]
    WrittenWithoutDef(crate::ir::entities::VarnodeId),
    #[error("op {0:?} input descendant list is out of sync")]
    DescendantMismatch(crate::ir::entities::OpId),
    #[error("block {0:?} sequence numbers are not monotonic")]
    SeqOutOfOrder(crate::ir::entities::BlockId),
    #[error("attempted to mutate a destroyed op {0:?}")]
    UseAfterDestroy(crate::ir::entities::OpId),
    #[error("PHI op found outside block entry in {0:?}")]
    MisplacedPhi(crate::ir::entities::BlockId),
    #[error("{0}")]
    Other(String),
}

/// Malformed specification input (address-space table, calling model,
/// injection library). Aborts setup rather than a single function.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("unknown address space '{0}'")]
    UnknownSpace(String),
    #[error("duplicate address space index {0}")]
    DuplicateSpaceIndex(u32),
    #[error("malformed prototype model '{0}': {1}")]
    BadPrototypeModel(String, String),
}

/// Loader miss for a required byte range.
#[derive(Debug, thiserror::Error)]
#[error("data unavailable at {addr:?} (+{size} bytes){}", if *required { " (required)" } else { "" })]
pub struct DataUnavailable {
    pub addr: Address,
    pub size: u32,
    /// If true the miss is inside a required code region and must fail the
    /// decompilation rather than being filled with zero and warned about.
    pub required: bool,
}

/// Type propagation or parameter recovery exceeded its iteration budget.
/// Non-fatal: callers attach this as a function warning and proceed with
/// best-effort results.
#[derive(Debug, thiserror::Error)]
#[error("{analysis} exceeded its iteration budget ({iterations} iterations)")]
pub struct RecoveryExceeded {
    pub analysis: &'static str,
    pub iterations: u32,
}

/// A call site's input/output locations could not be assigned within the
/// chosen prototype model.
#[derive(Debug, thiserror::Error)]
#[error("call at {call_addr:?}: {reason}")]
pub struct PrototypeError {
    pub call_addr: Address,
    pub reason: String,
}

/// Top-level error type threaded through action/rule boundaries.
#[derive(Debug, thiserror::Error)]
pub enum DecompileError {
    #[error(transparent)]
    LowLevel(#[from] LowLevelError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    DataUnavailable(#[from] DataUnavailable),
    #[error(transparent)]
    RecoveryExceeded(#[from] RecoveryExceeded),
    #[error(transparent)]
    Prototype(#[from] PrototypeError),
    #[error("instruction budget exceeded ({0} ops)")]
    InstructionBudgetExceeded(u64),
    #[error("action '{0}' exceeded its pass limit")]
    PassLimitExceeded(String),
}

pub type DecompileResult<T> = Result<T, DecompileError>;
