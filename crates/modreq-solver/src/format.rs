//! Human-readable rendering of types.

use crate::arena::TypeArena;
use crate::region::Region;
use crate::types::{TypeData, TypeId, TypePackData, TypePackId};

/// Renders types of one arena, e.g. `(string, boolean?) -> any`.
pub struct TypeFormatter<'a, R: Region> {
    arena: &'a TypeArena<R>,
    max_depth: u32,
}

impl<'a, R: Region> TypeFormatter<'a, R> {
    pub fn new(arena: &'a TypeArena<R>) -> Self {
        TypeFormatter {
            arena,
            max_depth: 8,
        }
    }

    #[must_use]
    pub fn with_max_depth(mut self, max_depth: u32) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn format(&self, id: TypeId<R>) -> String {
        self.format_type(id, 0)
    }

    pub fn format_pack(&self, id: TypePackId<R>) -> String {
        self.format_pack_inner(id, 0)
    }

    fn format_type(&self, id: TypeId<R>, depth: u32) -> String {
        if depth > self.max_depth {
            return "...".to_string();
        }
        let id = self.arena.follow(id);
        if let Some(kind) = id.intrinsic_kind() {
            return kind.name().to_string();
        }
        let Some(data) = self.arena.get(id) else {
            return "<stale>".to_string();
        };
        match &*data {
            TypeData::Intrinsic(kind) => kind.name().to_string(),
            TypeData::Union(members) => {
                // `T?` for the common two-member option.
                if members.len() == 2 && members[1] == TypeId::NIL {
                    let inner = self.format_type(members[0], depth + 1);
                    return if inner.contains(' ') {
                        format!("({inner})?")
                    } else {
                        format!("{inner}?")
                    };
                }
                members
                    .iter()
                    .map(|member| self.format_type(*member, depth + 1))
                    .collect::<Vec<_>>()
                    .join(" | ")
            }
            TypeData::Function(function) => {
                let params = self.format_pack_inner(function.params, depth + 1);
                let ret = self.format_pack_inner(function.ret, depth + 1);
                format!("({params}) -> {ret}")
            }
            TypeData::Module { virtual_path } => format!("module<{virtual_path}>"),
            TypeData::Free => "free".to_string(),
            TypeData::Lazy(_) | TypeData::Bound(_) => "*error-type*".to_string(),
        }
    }

    fn format_pack_inner(&self, id: TypePackId<R>, depth: u32) -> String {
        let id = self.arena.follow_pack(id);
        match self.arena.get_pack(id) {
            Some(TypePackData::List(types)) => types
                .iter()
                .map(|ty| self.format_type(*ty, depth))
                .collect::<Vec<_>>()
                .join(", "),
            Some(TypePackData::Free) => "...free".to_string(),
            Some(TypePackData::Bound(_)) | None => "<stale>".to_string(),
        }
    }
}
