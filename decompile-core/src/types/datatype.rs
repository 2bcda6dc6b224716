//! The data-type lattice used for local typing. Grounded on
//! `cranelift-codegen/src/ir/types.rs` for the entity-handle shape (a small
//! `Copy` id into an interning arena rather than an `Rc` graph), generalised
//! from Cranelift's flat machine-type enum to a compositional lattice with
//! pointers, structs, and an explicit unknown element.

use cranelift_entity::{entity_impl, PrimaryMap};
use rustc_hash::FxHashMap;

#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeId(u32);
entity_impl!(TypeId, "type");

/// One lattice element. Composite kinds hold member `TypeId`s rather than
/// nested `Datatype`s so the arena stays flat and `Copy`-cheap to pass
/// around.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Kind {
    Int,
    UInt,
    Bool,
    Float,
    /// Pointer to `TypeId`, with the pointed-to space's word size.
    Ptr { to: TypeId, word_size: u32 },
    /// Pointer into the interior of `parent` at a fixed, possibly unresolved
    /// byte offset.
    PtrRel { parent: TypeId, offset: i64 },
    Array { of: TypeId, len: u64 },
    Struct { fields: Vec<Field> },
    Union { fields: Vec<Field> },
    /// A struct/union viewed through a sub-range that doesn't land on a
    /// single field boundary.
    PartialStruct { whole: TypeId, offset: u64 },
    PartialUnion { whole: TypeId, offset: u64 },
    Code,
    Enum { underlying: TypeId, values: Vec<(String, i64)> },
    Spacebase,
    Void,
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: String,
    pub offset: u64,
    pub ty: TypeId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Datatype {
    pub name: String,
    pub size: u32,
    pub kind: Kind,
}

impl Datatype {
    pub fn is_pointer(&self) -> bool {
        matches!(self.kind, Kind::Ptr { .. } | Kind::PtrRel { .. })
    }
    pub fn is_composite(&self) -> bool {
        matches!(
            self.kind,
            Kind::Struct { .. } | Kind::Union { .. } | Kind::Array { .. }
        )
    }
}

/// Specificity order used by the type-order comparison: higher is more
/// specific; two types with no order between them meet at `Unknown`.
fn rank(kind: &Kind) -> u32 {
    match kind {
        Kind::Unknown => 0,
        Kind::Void => 1,
        Kind::Int | Kind::UInt | Kind::Bool | Kind::Float | Kind::Code | Kind::Spacebase => 2,
        Kind::Enum { .. } => 3,
        Kind::PartialStruct { .. } | Kind::PartialUnion { .. } => 3,
        Kind::PtrRel { .. } => 4,
        Kind::Ptr { .. } => 4,
        Kind::Array { .. } => 4,
        Kind::Struct { .. } | Kind::Union { .. } => 5,
    }
}

/// Interns and owns every `Datatype` reachable in a compilation, mirroring
/// cranelift-codegen's single flat `ir::types` registry. One instance is shared
/// by a whole run ("type database is process/session state").
#[derive(Debug, Default)]
pub struct TypeStore {
    types: PrimaryMap<TypeId, Datatype>,
    by_name: FxHashMap<String, TypeId>,
    pub void: Option<TypeId>,
    pub unknown: Option<TypeId>,
}

impl TypeStore {
    pub fn new() -> Self {
        let mut store = Self::default();
        let void = store.intern(Datatype { name: "void".into(), size: 0, kind: Kind::Void });
        let unknown = store.intern(Datatype { name: "undefined".into(), size: 1, kind: Kind::Unknown });
        store.void = Some(void);
        store.unknown = Some(unknown);
        store
    }

    pub fn intern(&mut self, ty: Datatype) -> TypeId {
        if let Some(&id) = self.by_name.get(&ty.name) {
            return id;
        }
        let name = ty.name.clone();
        let id = self.types.push(ty);
        self.by_name.insert(name, id);
        id
    }

    pub fn get(&self, id: TypeId) -> &Datatype {
        &self.types[id]
    }

    pub fn by_name(&self, name: &str) -> Option<TypeId> {
        self.by_name.get(name).copied()
    }

    /// The lattice meet of `a` and `b`: the most specific type both agree
    /// on, used by local-typing's "choose the most specific compatible
    /// candidate" rule.
    pub fn meet(&self, a: TypeId, b: TypeId) -> TypeId {
        if a == b {
            return a;
        }
        let (da, db) = (self.get(a), self.get(b));
        if da.size != db.size {
            return self.unknown.unwrap();
        }
        match (rank(&da.kind), rank(&db.kind)) {
            (ra, rb) if ra > rb => a,
            (ra, rb) if rb > ra => b,
            _ => self.unknown.unwrap(),
        }
    }

    /// Is `candidate` at least as specific as `floor`? Used to freeze
    /// type-locked varnodes against weaker propagated types.
    pub fn at_least_as_specific(&self, candidate: TypeId, floor: TypeId) -> bool {
        rank(&self.get(candidate).kind) >= rank(&self.get(floor).kind)
    }

    /// Walk down a composite type to the field covering byte `offset`,
    /// the core of `findResolve` for union/struct field selection.
    pub fn field_at(&self, composite: TypeId, offset: u64) -> Option<&Field> {
        match &self.get(composite).kind {
            Kind::Struct { fields } | Kind::Union { fields } => {
                fields.iter().find(|f| f.offset == offset)
                    .or_else(|| fields.iter().filter(|f| f.offset <= offset).max_by_key(|f| f.offset))
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn meet_of_equal_types_is_identity() {
        let mut store = TypeStore::new();
        let int4 = store.intern(Datatype { name: "int4".into(), size: 4, kind: Kind::Int });
        assert_eq!(store.meet(int4, int4), int4);
    }

    #[test]
    fn meet_prefers_more_specific_kind() {
        let mut store = TypeStore::new();
        let unknown4 = store.intern(Datatype { name: "undefined4".into(), size: 4, kind: Kind::Unknown });
        let int4 = store.intern(Datatype { name: "int4".into(), size: 4, kind: Kind::Int });
        assert_eq!(store.meet(unknown4, int4), int4);
    }

    #[test]
    fn meet_of_mismatched_size_is_unknown() {
        let mut store = TypeStore::new();
        let int4 = store.intern(Datatype { name: "int4".into(), size: 4, kind: Kind::Int });
        let int8 = store.intern(Datatype { name: "int8".into(), size: 8, kind: Kind::Int });
        assert_eq!(store.meet(int4, int8), store.unknown.unwrap());
    }

    #[test]
    fn field_at_finds_containing_field_for_interior_offset() {
        let mut store = TypeStore::new();
        let int4 = store.intern(Datatype { name: "int4".into(), size: 4, kind: Kind::Int });
        let s = store.intern(Datatype {
            name: "point".into(),
            size: 8,
            kind: Kind::Struct {
                fields: vec![
                    Field { name: "x".into(), offset: 0, ty: int4 },
                    Field { name: "y".into(), offset: 4, ty: int4 },
                ],
            },
        });
        assert_eq!(store.field_at(s, 4).unwrap().name, "y");
        assert_eq!(store.field_at(s, 6).unwrap().name, "y");
    }
}
