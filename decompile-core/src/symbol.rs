//! Symbol / Scope / Database and HighVariable ("Symbol / Scope /
//! Database", "HighVariable"). Grounded on `cranelift-codegen/src/ir/
//! stackslot.rs` for the "named storage with a fake local address range"
//! shape, and on the `PrimaryMap`-per-owner idiom used throughout
//! `ir/dfg.rs` for the scope's symbol table.

use crate::ir::address::Address;
use crate::ir::entities::{HighId, SymbolId, VarnodeId};
use crate::types::datatype::TypeId;
use cranelift_entity::PrimaryMap;
use rustc_hash::FxHashMap;

/// What role a symbol plays, beyond "just a named storage location":
/// parameter, equate, fake input, or return value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolCategory {
    Normal,
    Parameter(u16),
    Equate,
    FakeInput,
    ReturnValue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SymbolFlags(u32);

impl SymbolFlags {
    pub const TYPE_LOCKED: Self = Self(1 << 0);
    pub const NAME_LOCKED: Self = Self(1 << 1);
    pub const SIZE_TYPE_LOCKED: Self = Self(1 << 2);

    pub const fn empty() -> Self {
        Self(0)
    }
    pub fn set(&mut self, bit: Self) {
        self.0 |= bit.0;
    }
    pub fn contains(self, bit: Self) -> bool {
        self.0 & bit.0 == bit.0
    }
}

#[derive(Debug, Clone)]
pub struct Symbol {
    pub name: String,
    pub ty: TypeId,
    pub flags: SymbolFlags,
    pub category: SymbolCategory,
    /// Where this symbol's storage begins.
    pub address: Address,
}

impl Symbol {
    pub fn is_type_locked(&self) -> bool {
        self.flags.contains(SymbolFlags::TYPE_LOCKED)
    }
    pub fn is_name_locked(&self) -> bool {
        self.flags.contains(SymbolFlags::NAME_LOCKED)
    }
}

/// A single level of the scope hierarchy: global and per-function-local.
/// The function-local scope additionally owns a fake address range
/// standing in for the stack frame, so that stack-relative varnodes can be
/// named as if they were ordinary memory.
#[derive(Debug)]
pub struct Scope {
    pub name: String,
    symbols: PrimaryMap<SymbolId, Symbol>,
    by_address: FxHashMap<Address, SymbolId>,
    by_name: FxHashMap<String, SymbolId>,
    parent: Option<Box<Scope>>,
    /// Next free offset to hand out in the fake stack-frame space, if this
    /// is a local scope.
    next_fake_offset: i64,
    pub fake_space: Option<u32>,
}

impl Scope {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            symbols: PrimaryMap::new(),
            by_address: FxHashMap::default(),
            by_name: FxHashMap::default(),
            parent: None,
            next_fake_offset: 0,
            fake_space: None,
        }
    }

    pub fn with_parent(name: impl Into<String>, parent: Scope) -> Self {
        let mut s = Self::new(name);
        s.parent = Some(Box::new(parent));
        s
    }

    pub fn add_symbol(&mut self, symbol: Symbol) -> SymbolId {
        let addr = symbol.address;
        let name = symbol.name.clone();
        let id = self.symbols.push(symbol);
        self.by_address.insert(addr, id);
        self.by_name.insert(name, id);
        id
    }

    pub fn symbol(&self, id: SymbolId) -> &Symbol {
        &self.symbols[id]
    }
    pub fn symbol_mut(&mut self, id: SymbolId) -> &mut Symbol {
        &mut self.symbols[id]
    }

    /// Look up by address in this scope, falling back to the parent scope
    /// (global symbols are visible from every function-local scope).
    pub fn find_by_address(&self, addr: Address) -> Option<SymbolId> {
        self.by_address.get(&addr).copied().or_else(|| self.parent.as_ref()?.find_by_address(addr))
    }

    pub fn find_by_name(&self, name: &str) -> Option<SymbolId> {
        self.by_name.get(name).copied().or_else(|| self.parent.as_ref()?.find_by_name(name))
    }

    /// Reserve `size` bytes in the fake stack-frame address range and bind
    /// a new symbol to it. Only meaningful for function-local scopes that
    /// have had `fake_space` set up by prototype recovery.
    pub fn new_fake_stack_symbol(&mut self, name: impl Into<String>, ty: TypeId, size: i64) -> SymbolId {
        let space = self.fake_space.expect("fake stack space not configured for this scope");
        let offset = self.next_fake_offset;
        self.next_fake_offset += size;
        self.add_symbol(Symbol {
            name: name.into(),
            ty,
            flags: SymbolFlags::empty(),
            category: SymbolCategory::Normal,
            address: Address::new(space, offset as u64),
        })
    }

    pub fn symbols(&self) -> impl Iterator<Item = SymbolId> + '_ {
        self.symbols.keys()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HighFlags(u32);

impl HighFlags {
    /// Members disagree on storage in a way that forbids merging further
    /// ("flags for un-mergeable conflict states").
    pub const UNMERGEABLE: Self = Self(1 << 0);
    pub const ADDRTIED: Self = Self(1 << 1);

    pub const fn empty() -> Self {
        Self(0)
    }
    pub fn set(&mut self, bit: Self) {
        self.0 |= bit.0;
    }
    pub fn contains(self, bit: Self) -> bool {
        self.0 & bit.0 == bit.0
    }
}

/// A merge group of varnode instances the emitter presents as a single
/// source-level variable.
#[derive(Debug, Clone)]
pub struct HighVariable {
    pub members: Vec<VarnodeId>,
    pub size: u32,
    pub printed_type: Option<TypeId>,
    pub symbol: Option<SymbolId>,
    /// Byte offset into `symbol`'s type this HighVariable names, when the
    /// symbol is wider than this group ("symbol offset").
    pub symbol_offset: Option<u64>,
    pub flags: HighFlags,
}

impl HighVariable {
    pub fn new(first: VarnodeId, size: u32) -> Self {
        Self {
            members: vec![first],
            size,
            printed_type: None,
            symbol: None,
            symbol_offset: None,
            flags: HighFlags::empty(),
        }
    }

    pub fn is_mergeable(&self) -> bool {
        !self.flags.contains(HighFlags::UNMERGEABLE)
    }

    /// Fold `other` into `self`. Only same-size groups merge: returns
    /// `false`, marking both groups unmergeable, if the sizes disagree.
    pub fn absorb(&mut self, other: &mut HighVariable) -> bool {
        if self.size != other.size {
            self.flags.set(HighFlags::UNMERGEABLE);
            other.flags.set(HighFlags::UNMERGEABLE);
            return false;
        }
        self.members.append(&mut other.members);
        true
    }
}

/// Owns every HighVariable produced by the merge pass for one function.
/// Touched only by the merge pass itself and read-only afterward.
#[derive(Debug, Default)]
pub struct HighDatabase {
    highs: PrimaryMap<HighId, HighVariable>,
}

impl HighDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(&mut self, first: VarnodeId, size: u32) -> HighId {
        self.highs.push(HighVariable::new(first, size))
    }

    pub fn get(&self, id: HighId) -> &HighVariable {
        &self.highs[id]
    }
    pub fn get_mut(&mut self, id: HighId) -> &mut HighVariable {
        &mut self.highs[id]
    }

    pub fn ids(&self) -> impl Iterator<Item = HighId> + '_ {
        self.highs.keys()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::entities::OpId;
    use cranelift_entity::EntityRef;

    #[test]
    fn scope_lookup_falls_back_to_parent() {
        let mut global = Scope::new("global");
        let id = global.add_symbol(Symbol {
            name: "g".into(),
            ty: TypeId::new(0),
            flags: SymbolFlags::empty(),
            category: SymbolCategory::Normal,
            address: Address::new(1, 0x1000),
        });
        let local = Scope::with_parent("local", global);
        assert_eq!(local.find_by_address(Address::new(1, 0x1000)), Some(id));
    }

    #[test]
    fn high_absorb_rejects_mismatched_size() {
        let mut a = HighVariable::new(VarnodeId::new(0), 4);
        let mut b = HighVariable::new(VarnodeId::new(1), 8);
        assert!(!a.absorb(&mut b));
        assert!(!a.is_mergeable());
    }

    #[test]
    fn high_database_round_trip() {
        let mut db = HighDatabase::new();
        let id = db.create(VarnodeId::new(0), 4);
        assert_eq!(db.get(id).members.len(), 1);
        db.get_mut(id).members.push(VarnodeId::new(1));
        assert_eq!(db.get(id).members.len(), 2);
        let _ = OpId::new(0);
    }
}
