//! External collaborator contracts plus the `Architecture` struct that
//! bundles the read-mostly ones together: the architecture object passed in
//! at construction, shared read-only across a whole decompilation session.
//! Grounded on cranelift-codegen's `TargetIsa`
//! trait in `cranelift-codegen/src/isa/mod.rs` for the "one object handed
//! to every pass, trait-object collaborators behind it" shape.
//!
//! None of these traits are implemented here — the loader, translator,
//! block structurer and emitter are explicitly out of scope.
//! What this module owns is the *contract* and a small amount of
//! in-memory state (the prototype model registry, the comment database)
//! that the core itself needs to exist in order to be testable without a
//! real loader/translator behind it.

use crate::ir::address::Address;
use crate::proto::prototype::ParamTrial;
use rustc_hash::FxHashMap;
use std::fmt;

/// Loader / load-image contract ("Loader").
pub trait Loader {
    fn load(&self, size: u32, addr: Address) -> Result<Vec<u8>, crate::error::DataUnavailable>;
    fn load_fill(&self, buf: &mut [u8], addr: Address) -> Result<(), crate::error::DataUnavailable>;
    fn architecture_id(&self) -> &str;
    fn is_read_only(&self, addr: Address, size: u32) -> bool;
}

/// Processor translator contract ("Translator"). Disassembly and
/// join-address synthesis are delegated here; our own
/// `SpaceManager::construct_join_address` is the in-core
/// fallback used when no translator is wired up.
pub trait Translator {
    fn endianness_big(&self) -> bool;
    fn alignment(&self) -> u32;
    fn float_format_bits(&self, size: u32) -> Option<u32>;
}

/// Keyed by (address range, property id) -> integer ("Context
/// database").
pub trait ContextDatabase {
    fn tracked_value(&self, addr: Address, property_id: u32) -> Option<i64>;
}

/// Calling-convention storage assignment contract.
pub trait PrototypeModel {
    fn name(&self) -> &str;
    /// Canonical (address, size) slots this model offers for input
    /// parameters, in calling order.
    fn candidate_input_slots(&self) -> Vec<(Address, u32)>;
    fn candidate_output_slots(&self) -> Vec<(Address, u32)>;
    /// Indices into `trials` that survive as real parameters.
    fn derive_input_map(&self, trials: &[ParamTrial]) -> Vec<usize>;
    fn derive_output_map(&self, trials: &[ParamTrial]) -> Vec<usize>;
    fn assumed_input_extension(&self) -> crate::proto::prototype::Extension;
    fn assumed_output_extension(&self) -> crate::proto::prototype::Extension;
    fn possible_input_param(&self, addr: Address, size: u32) -> bool;
    fn unjustified_input_param(&self, addr: Address, size: u32) -> bool;
}

/// Registry of named prototype models, looked up by the architecture
/// object at setup time.
#[derive(Default)]
pub struct PrototypeModelRegistry {
    models: FxHashMap<String, Box<dyn PrototypeModel>>,
    pub default_model: Option<String>,
}

impl PrototypeModelRegistry {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn register(&mut self, model: Box<dyn PrototypeModel>) {
        let name = model.name().to_string();
        self.models.insert(name, model);
    }
    pub fn get(&self, name: &str) -> Option<&dyn PrototypeModel> {
        self.models.get(name).map(|b| b.as_ref())
    }
}

/// A named payload applied to replace the body of a fixup-marked op
/// ("Inject library"). Expansion itself is opcode-specific and
/// left to the caller; this is the lookup contract only.
pub trait InjectLibrary {
    fn payload(&self, name: &str) -> Option<InjectPayload>;
}

#[derive(Debug, Clone)]
pub struct InjectPayload {
    pub name: String,
    pub kind: InjectKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InjectKind {
    CallFixup,
    CallOtherFixup,
    EntryInject,
}

/// Severity of a structured diagnostic, for comment/warning emission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone)]
pub struct Comment {
    pub text: String,
    pub address: Option<Address>,
    pub severity: Severity,
}

/// `CommentDatabase` contract, extended with a `Severity` on every entry.
pub trait CommentDatabase {
    fn warning(&mut self, text: String, address: Address);
    fn warning_header(&mut self, text: String);
    fn comments(&self) -> &[Comment];
}

/// The in-memory default `CommentDatabase` used by tests and by any
/// caller that doesn't need persistence across runs.
#[derive(Debug, Default)]
pub struct InMemoryCommentDatabase {
    comments: Vec<Comment>,
}

impl InMemoryCommentDatabase {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn push(&mut self, text: impl Into<String>, address: Option<Address>, severity: Severity) {
        self.comments.push(Comment { text: text.into(), address, severity });
    }
}

impl CommentDatabase for InMemoryCommentDatabase {
    fn warning(&mut self, text: String, address: Address) {
        self.push(text, Some(address), Severity::Warning);
    }
    fn warning_header(&mut self, text: String) {
        self.push(text, None, Severity::Warning);
    }
    fn comments(&self) -> &[Comment] {
        &self.comments
    }
}

/// Structured block-overlay contract. A conservative stub is provided in
/// `crate::schedule` sufficient to
/// exercise the contract in tests; a real structurer is out of scope.
pub trait BlockStructurer {
    fn structure(&mut self, func: &crate::ir::funcdata::Funcdata) -> StructureNode;
}

#[derive(Debug, Clone)]
pub enum StructureNode {
    Block(crate::ir::entities::BlockId),
    If { cond: crate::ir::entities::BlockId, then_branch: Box<StructureNode>, else_branch: Option<Box<StructureNode>> },
    While { cond: crate::ir::entities::BlockId, body: Box<StructureNode> },
    DoWhile { body: Box<StructureNode>, cond: crate::ir::entities::BlockId },
    Switch { selector: crate::ir::entities::BlockId, cases: Vec<StructureNode> },
    Goto(crate::ir::entities::BlockId),
    Sequence(Vec<StructureNode>),
}

/// Emitter contract ("Emitter"). Op-level emission hooks live on
/// `OpCode` itself; the emitter consumes the finished tree.
pub trait Emitter {
    fn emit_function(&mut self, func: &crate::ir::funcdata::Funcdata, structure: &StructureNode) -> String;
}

impl fmt::Debug for dyn PrototypeModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PrototypeModel({})", self.name())
    }
}

/// Bundles the read-mostly collaborators shared read-only across a whole
/// decompilation session, passed in once at construction and shared between
/// function decompilations.
pub struct Architecture {
    pub translator: Box<dyn Translator>,
    pub loader: Box<dyn Loader>,
    pub context: Box<dyn ContextDatabase>,
    pub prototype_models: PrototypeModelRegistry,
    pub inject_library: Box<dyn InjectLibrary>,
    /// funcptr_align used by call-indirection folding.
    pub funcptr_align: u32,
}

impl Architecture {
    pub fn default_model(&self) -> Option<&dyn PrototypeModel> {
        let name = self.prototype_models.default_model.as_deref()?;
        self.prototype_models.get(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comment_database_records_severity() {
        let mut db = InMemoryCommentDatabase::new();
        db.warning("bad thing".into(), Address::new(1, 0));
        db.warning_header("function-level note".into());
        assert_eq!(db.comments.len(), 2);
        assert_eq!(db.comments()[0].severity, Severity::Warning);
        assert!(db.comments()[1].address.is_none());
    }
}
