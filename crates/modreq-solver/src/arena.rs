//! Region-tagged type arenas.
//!
//! An arena owns the data behind every non-intrinsic [`TypeId`] and
//! [`TypePackId`] of its region. Allocation and binding take `&self`: the
//! storage sits behind `RwLock`s so that a context's global arena can be
//! shared by concurrent checking passes.
//!
//! ```compile_fail
//! use modreq_solver::{InstanceRegion, ModuleRegion, TypeArena, TypeId, TypePackId};
//!
//! // A provisional instance-region pack can never stand in for a module result.
//! let instance = TypeArena::<InstanceRegion>::new();
//! let pack = instance.add_pack(vec![TypeId::ANY]);
//! let result: TypePackId<ModuleRegion> = pack;
//! ```

use std::sync::{Arc, RwLock};

use modreq_common::limits::{MAX_FOLLOW_DEPTH, MAX_IMPORT_DEPTH};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use tracing::{trace, warn};

use crate::region::Region;
use crate::types::{
    ArenaId, FunctionType, INTRINSIC_COUNT, IntrinsicKind, LazyType, TypeData, TypeId,
    TypePackData, TypePackId,
};

/// Errors from binding free types and packs.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum BindError {
    #[error("type pack {0} is already bound")]
    AlreadyBound(String),
    #[error("handle {0} does not belong to this arena")]
    ForeignHandle(String),
    #[error("binding {0} to itself would create a cycle")]
    SelfBinding(String),
}

pub struct TypeArena<R: Region> {
    id: ArenaId,
    types: RwLock<Vec<Arc<TypeData<R>>>>,
    packs: RwLock<Vec<TypePackData<R>>>,
}

impl<R: Region> Default for TypeArena<R> {
    fn default() -> Self {
        TypeArena::new()
    }
}

impl<R: Region> std::fmt::Debug for TypeArena<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeArena")
            .field("region", &R::NAME)
            .field("id", &self.id)
            .field("types", &self.type_count())
            .field("packs", &self.pack_count())
            .finish()
    }
}

fn intrinsic_slots<R: Region>() -> Vec<Arc<TypeData<R>>> {
    IntrinsicKind::ALL
        .iter()
        .map(|kind| Arc::new(TypeData::Intrinsic(*kind)))
        .collect()
}

impl<R: Region> TypeArena<R> {
    pub fn new() -> TypeArena<R> {
        TypeArena {
            id: ArenaId::fresh(),
            types: RwLock::new(intrinsic_slots()),
            packs: RwLock::new(Vec::new()),
        }
    }

    pub const fn id(&self) -> ArenaId {
        self.id
    }

    /// Drops every allocated type and pack. Handles allocated before the
    /// clear no longer resolve in this arena.
    pub fn clear(&mut self) {
        self.id = ArenaId::fresh();
        *self.types.get_mut().expect("types lock poisoned") = intrinsic_slots();
        self.packs.get_mut().expect("packs lock poisoned").clear();
    }

    pub fn type_count(&self) -> usize {
        self.types.read().expect("types lock poisoned").len() - INTRINSIC_COUNT as usize
    }

    pub fn pack_count(&self) -> usize {
        self.packs.read().expect("packs lock poisoned").len()
    }

    /// Whether `id` can be looked up in this arena.
    pub fn owns(&self, id: TypeId<R>) -> bool {
        id.is_intrinsic() || id.arena == self.id
    }

    pub fn owns_pack(&self, id: TypePackId<R>) -> bool {
        id.arena == self.id
    }

    // =========================================================================
    // Allocation
    // =========================================================================

    pub fn add_type(&self, data: TypeData<R>) -> TypeId<R> {
        let mut types = self.types.write().expect("types lock poisoned");
        let index = types.len() as u32;
        types.push(Arc::new(data));
        TypeId::new(index, self.id)
    }

    pub fn add_function(&self, function: FunctionType<R>) -> TypeId<R> {
        self.add_type(TypeData::Function(function))
    }

    pub fn add_lazy(
        &self,
        thunk: impl Fn(&TypeArena<R>) -> TypeId<R> + Send + Sync + 'static,
    ) -> TypeId<R> {
        self.add_type(TypeData::Lazy(Arc::new(LazyType::new(thunk))))
    }

    pub fn fresh_type(&self) -> TypeId<R> {
        self.add_type(TypeData::Free)
    }

    pub fn add_pack(&self, types: impl IntoIterator<Item = TypeId<R>>) -> TypePackId<R> {
        self.add_pack_data(TypePackData::List(types.into_iter().collect()))
    }

    /// Reserves an unbound pack to be filled in later by [`Self::bind_pack`].
    pub fn fresh_pack(&self) -> TypePackId<R> {
        self.add_pack_data(TypePackData::Free)
    }

    fn add_pack_data(&self, data: TypePackData<R>) -> TypePackId<R> {
        let mut packs = self.packs.write().expect("packs lock poisoned");
        let index = packs.len() as u32;
        packs.push(data);
        TypePackId::new(index, self.id)
    }

    // =========================================================================
    // Lookup
    // =========================================================================

    /// The data behind `id`, or `None` when `id` came from another arena or
    /// from before a [`Self::clear`].
    pub fn get(&self, id: TypeId<R>) -> Option<Arc<TypeData<R>>> {
        if !self.owns(id) {
            return None;
        }
        self.types
            .read()
            .expect("types lock poisoned")
            .get(id.index as usize)
            .cloned()
    }

    pub fn get_pack(&self, id: TypePackId<R>) -> Option<TypePackData<R>> {
        if !self.owns_pack(id) {
            return None;
        }
        self.packs
            .read()
            .expect("packs lock poisoned")
            .get(id.index as usize)
            .cloned()
    }

    /// The function data behind `id` after following indirections.
    pub fn get_function(&self, id: TypeId<R>) -> Option<FunctionType<R>> {
        match &*self.get(self.follow(id))? {
            TypeData::Function(function) => Some(function.clone()),
            _ => None,
        }
    }

    /// Resolves `Bound` links and forces `Lazy` types.
    ///
    /// Forcing a lazy type runs its thunk without any arena lock held, so the
    /// thunk may allocate into this arena.
    pub fn follow(&self, id: TypeId<R>) -> TypeId<R> {
        let mut current = id;
        for _ in 0..MAX_FOLLOW_DEPTH {
            let Some(data) = self.get(current) else {
                return current;
            };
            current = match &*data {
                TypeData::Bound(next) => *next,
                TypeData::Lazy(lazy) => lazy.force(self),
                _ => return current,
            };
        }
        warn!(region = R::NAME, ?id, "follow depth limit reached");
        TypeId::ERROR
    }

    pub fn follow_pack(&self, id: TypePackId<R>) -> TypePackId<R> {
        let mut current = id;
        for _ in 0..MAX_FOLLOW_DEPTH {
            match self.get_pack(current) {
                Some(TypePackData::Bound(next)) => current = next,
                _ => return current,
            }
        }
        warn!(region = R::NAME, ?id, "pack follow depth limit reached");
        current
    }

    /// The types of a pack after following, or `None` while it is free.
    pub fn pack_types(&self, id: TypePackId<R>) -> Option<SmallVec<[TypeId<R>; 2]>> {
        match self.get_pack(self.follow_pack(id))? {
            TypePackData::List(types) => Some(types),
            _ => None,
        }
    }

    /// The first type of a pack, `nil` for an empty pack.
    pub fn first(&self, id: TypePackId<R>) -> Option<TypeId<R>> {
        self.pack_types(id)
            .map(|types| types.first().copied().unwrap_or(TypeId::NIL))
    }

    // =========================================================================
    // Binding
    // =========================================================================

    /// Binds a free pack to `target`. A pack may be bound once.
    pub fn bind_pack(&self, id: TypePackId<R>, target: TypePackId<R>) -> Result<(), BindError> {
        if !self.owns_pack(id) || !self.owns_pack(target) {
            return Err(BindError::ForeignHandle(format!("{id:?}")));
        }
        if self.follow_pack(target) == id {
            return Err(BindError::SelfBinding(format!("{id:?}")));
        }
        let mut packs = self.packs.write().expect("packs lock poisoned");
        let slot = packs
            .get_mut(id.index as usize)
            .ok_or_else(|| BindError::ForeignHandle(format!("{id:?}")))?;
        match slot {
            TypePackData::Free => {
                trace!(region = R::NAME, ?id, ?target, "bind pack");
                *slot = TypePackData::Bound(target);
                Ok(())
            }
            _ => Err(BindError::AlreadyBound(format!("{id:?}"))),
        }
    }

    /// Binds a free type to `target`.
    pub fn bind_type(&self, id: TypeId<R>, target: TypeId<R>) -> Result<(), BindError> {
        if id.is_intrinsic() || !self.owns(id) || !self.owns(target) {
            return Err(BindError::ForeignHandle(format!("{id:?}")));
        }
        if self.follow(target) == id {
            return Err(BindError::SelfBinding(format!("{id:?}")));
        }
        let mut types = self.types.write().expect("types lock poisoned");
        let slot = types
            .get_mut(id.index as usize)
            .ok_or_else(|| BindError::ForeignHandle(format!("{id:?}")))?;
        if !matches!(**slot, TypeData::Free) {
            return Err(BindError::AlreadyBound(format!("{id:?}")));
        }
        *slot = Arc::new(TypeData::Bound(target));
        Ok(())
    }

    // =========================================================================
    // Constructors
    // =========================================================================

    /// `ty | nil`. Types that already admit nil are returned unchanged.
    pub fn make_option(&self, ty: TypeId<R>) -> TypeId<R> {
        let followed = self.follow(ty);
        if followed == TypeId::NIL {
            return ty;
        }
        if let Some(data) = self.get(followed) {
            if let TypeData::Union(members) = &*data {
                if members.contains(&TypeId::NIL) {
                    return ty;
                }
            }
        }
        self.add_type(TypeData::Union(smallvec::smallvec![ty, TypeId::NIL]))
    }

    pub fn union(&self, members: impl IntoIterator<Item = TypeId<R>>) -> TypeId<R> {
        let mut flat: SmallVec<[TypeId<R>; 2]> = SmallVec::new();
        for member in members {
            if !flat.contains(&member) {
                flat.push(member);
            }
        }
        match flat.len() {
            0 => TypeId::NEVER,
            1 => flat[0],
            _ => self.add_type(TypeData::Union(flat)),
        }
    }

    // =========================================================================
    // Cross-region copies
    // =========================================================================

    /// Deep-copies `id` from `source` into this arena.
    ///
    /// Bound and lazy types are followed before copying; free types become
    /// fresh free types here. Magic handlers and tags are shared with the
    /// source function.
    pub fn import<S: Region>(&self, source: &TypeArena<S>, id: TypeId<S>) -> TypeId<R> {
        let mut copier = Importer {
            source,
            target: self,
            types: FxHashMap::default(),
            packs: FxHashMap::default(),
        };
        copier.copy_type(id, 0)
    }

    pub fn import_pack<S: Region>(
        &self,
        source: &TypeArena<S>,
        id: TypePackId<S>,
    ) -> TypePackId<R> {
        let mut copier = Importer {
            source,
            target: self,
            types: FxHashMap::default(),
            packs: FxHashMap::default(),
        };
        copier.copy_pack(id, 0)
    }
}

struct Importer<'a, S: Region, R: Region> {
    source: &'a TypeArena<S>,
    target: &'a TypeArena<R>,
    types: FxHashMap<TypeId<S>, TypeId<R>>,
    packs: FxHashMap<TypePackId<S>, TypePackId<R>>,
}

impl<S: Region, R: Region> Importer<'_, S, R> {
    fn copy_type(&mut self, id: TypeId<S>, depth: u32) -> TypeId<R> {
        let id = self.source.follow(id);
        if let Some(kind) = id.intrinsic_kind() {
            return intrinsic_id(kind);
        }
        if let Some(&copied) = self.types.get(&id) {
            return copied;
        }
        if depth >= MAX_IMPORT_DEPTH {
            warn!(from = S::NAME, to = R::NAME, "import depth limit reached");
            return TypeId::ERROR;
        }
        let Some(data) = self.source.get(id) else {
            return TypeId::ERROR;
        };
        let copied = match &*data {
            TypeData::Intrinsic(kind) => intrinsic_id(*kind),
            TypeData::Union(members) => {
                let members = members
                    .iter()
                    .map(|member| self.copy_type(*member, depth + 1))
                    .collect();
                self.target.add_type(TypeData::Union(members))
            }
            TypeData::Function(function) => {
                let params = self.copy_pack(function.params, depth + 1);
                let ret = self.copy_pack(function.ret, depth + 1);
                self.target.add_function(FunctionType {
                    params,
                    ret,
                    magic: function.magic.clone(),
                    tags: function.tags.clone(),
                })
            }
            TypeData::Module { virtual_path } => self.target.add_type(TypeData::Module {
                virtual_path: virtual_path.clone(),
            }),
            // `follow` already resolved these.
            TypeData::Lazy(_) | TypeData::Bound(_) => TypeId::ERROR,
            TypeData::Free => self.target.fresh_type(),
        };
        self.types.insert(id, copied);
        copied
    }

    fn copy_pack(&mut self, id: TypePackId<S>, depth: u32) -> TypePackId<R> {
        let id = self.source.follow_pack(id);
        if let Some(&copied) = self.packs.get(&id) {
            return copied;
        }
        let copied = match self.source.get_pack(id) {
            Some(TypePackData::List(types)) => {
                let types: SmallVec<[TypeId<R>; 2]> = types
                    .iter()
                    .map(|ty| self.copy_type(*ty, depth + 1))
                    .collect();
                self.target.add_pack(types)
            }
            Some(TypePackData::Free) => self.target.fresh_pack(),
            Some(TypePackData::Bound(_)) | None => self.target.add_pack([TypeId::ERROR]),
        };
        self.packs.insert(id, copied);
        copied
    }
}

fn intrinsic_id<R: Region>(kind: IntrinsicKind) -> TypeId<R> {
    match kind {
        IntrinsicKind::Any => TypeId::ANY,
        IntrinsicKind::Unknown => TypeId::UNKNOWN,
        IntrinsicKind::Nil => TypeId::NIL,
        IntrinsicKind::Boolean => TypeId::BOOLEAN,
        IntrinsicKind::String => TypeId::STRING,
        IntrinsicKind::Never => TypeId::NEVER,
        IntrinsicKind::Error => TypeId::ERROR,
    }
}

#[cfg(test)]
#[path = "../tests/arena_tests.rs"]
mod tests;
