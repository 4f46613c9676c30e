//! Type handles and type data.

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use once_cell::sync::OnceCell;
use smallvec::SmallVec;

use crate::arena::TypeArena;
use crate::magic::MagicFunction;
use crate::region::Region;

// =============================================================================
// Arena identity
// =============================================================================

/// Global counter for assigning unique ids to arenas.
/// Id 0 is reserved for the intrinsic types shared by every arena.
static NEXT_ARENA_ID: AtomicU32 = AtomicU32::new(1);

/// Identity of one arena generation. A cleared arena gets a fresh id, so
/// handles allocated before the clear stop resolving.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ArenaId(pub(crate) u32);

impl ArenaId {
    pub const INTRINSIC: ArenaId = ArenaId(0);

    pub(crate) fn fresh() -> ArenaId {
        ArenaId(NEXT_ARENA_ID.fetch_add(1, Ordering::Relaxed))
    }
}

// =============================================================================
// TypeId / TypePackId
// =============================================================================

/// Handle to a type in a [`TypeArena`] of region `R`.
///
/// Intrinsic types (`any`, `nil`, ...) are the same handle in every arena of
/// a region; everything else is only meaningful to the arena that
/// allocated it.
#[derive(Copy, Clone, PartialEq, Eq, Hash)]
pub struct TypeId<R: Region> {
    pub(crate) index: u32,
    pub(crate) arena: ArenaId,
    _region: PhantomData<fn() -> R>,
}

/// Handle to a type pack in a [`TypeArena`] of region `R`.
#[derive(Copy, Clone, PartialEq, Eq, Hash)]
pub struct TypePackId<R: Region> {
    pub(crate) index: u32,
    pub(crate) arena: ArenaId,
    _region: PhantomData<fn() -> R>,
}

/// Builtin types available in every arena.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum IntrinsicKind {
    Any,
    Unknown,
    Nil,
    Boolean,
    String,
    Never,
    Error,
}

impl IntrinsicKind {
    pub(crate) const ALL: [IntrinsicKind; 7] = [
        IntrinsicKind::Any,
        IntrinsicKind::Unknown,
        IntrinsicKind::Nil,
        IntrinsicKind::Boolean,
        IntrinsicKind::String,
        IntrinsicKind::Never,
        IntrinsicKind::Error,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            IntrinsicKind::Any => "any",
            IntrinsicKind::Unknown => "unknown",
            IntrinsicKind::Nil => "nil",
            IntrinsicKind::Boolean => "boolean",
            IntrinsicKind::String => "string",
            IntrinsicKind::Never => "never",
            IntrinsicKind::Error => "*error-type*",
        }
    }
}

/// Number of reserved intrinsic slots at the start of every arena.
pub(crate) const INTRINSIC_COUNT: u32 = IntrinsicKind::ALL.len() as u32;

impl<R: Region> TypeId<R> {
    pub const ANY: TypeId<R> = TypeId::intrinsic(0);
    pub const UNKNOWN: TypeId<R> = TypeId::intrinsic(1);
    pub const NIL: TypeId<R> = TypeId::intrinsic(2);
    pub const BOOLEAN: TypeId<R> = TypeId::intrinsic(3);
    pub const STRING: TypeId<R> = TypeId::intrinsic(4);
    pub const NEVER: TypeId<R> = TypeId::intrinsic(5);
    pub const ERROR: TypeId<R> = TypeId::intrinsic(6);

    const fn intrinsic(index: u32) -> TypeId<R> {
        TypeId {
            index,
            arena: ArenaId::INTRINSIC,
            _region: PhantomData,
        }
    }

    pub(crate) const fn new(index: u32, arena: ArenaId) -> TypeId<R> {
        TypeId {
            index,
            arena,
            _region: PhantomData,
        }
    }

    #[inline]
    pub const fn is_intrinsic(self) -> bool {
        self.arena.0 == ArenaId::INTRINSIC.0
    }

    pub fn intrinsic_kind(self) -> Option<IntrinsicKind> {
        if self.is_intrinsic() {
            IntrinsicKind::ALL.get(self.index as usize).copied()
        } else {
            None
        }
    }

    pub const fn arena_id(self) -> ArenaId {
        self.arena
    }
}

impl<R: Region> TypePackId<R> {
    pub(crate) const fn new(index: u32, arena: ArenaId) -> TypePackId<R> {
        TypePackId {
            index,
            arena,
            _region: PhantomData,
        }
    }

    pub const fn arena_id(self) -> ArenaId {
        self.arena
    }
}

impl<R: Region> fmt::Debug for TypeId<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.intrinsic_kind() {
            Some(kind) => write!(f, "TypeId<{}>({})", R::NAME, kind.name()),
            None => write!(f, "TypeId<{}>({}@{})", R::NAME, self.index, self.arena.0),
        }
    }
}

impl<R: Region> fmt::Debug for TypePackId<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypePackId<{}>({}@{})", R::NAME, self.index, self.arena.0)
    }
}

// =============================================================================
// TypeData
// =============================================================================

#[derive(Clone, Debug)]
pub enum TypeData<R: Region> {
    Intrinsic(IntrinsicKind),
    Union(SmallVec<[TypeId<R>; 2]>),
    Function(FunctionType<R>),
    /// The opaque result type of a resolved module, keyed by virtual path.
    Module { virtual_path: String },
    /// A type built on first use. See [`LazyType`].
    Lazy(Arc<LazyType<R>>),
    Free,
    Bound(TypeId<R>),
}

/// A function type. Tags and the magic handler are part of the type so that
/// tooling can discover how calls through it resolve.
#[derive(Clone)]
pub struct FunctionType<R: Region> {
    pub params: TypePackId<R>,
    pub ret: TypePackId<R>,
    pub magic: Option<Arc<dyn MagicFunction>>,
    pub tags: SmallVec<[&'static str; 4]>,
}

impl<R: Region> FunctionType<R> {
    pub fn new(params: TypePackId<R>, ret: TypePackId<R>) -> FunctionType<R> {
        FunctionType {
            params,
            ret,
            magic: None,
            tags: SmallVec::new(),
        }
    }

    #[must_use]
    pub fn with_magic(mut self, magic: Arc<dyn MagicFunction>) -> FunctionType<R> {
        self.magic = Some(magic);
        self
    }

    #[must_use]
    pub fn with_tag(mut self, tag: &'static str) -> FunctionType<R> {
        if !self.tags.contains(&tag) {
            self.tags.push(tag);
        }
        self
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| *t == tag)
    }
}

impl<R: Region> fmt::Debug for FunctionType<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionType")
            .field("params", &self.params)
            .field("ret", &self.ret)
            .field("magic", &self.magic.as_ref().map(|m| m.name()))
            .field("tags", &self.tags)
            .finish()
    }
}

type LazyThunk<R> = Box<dyn Fn(&TypeArena<R>) -> TypeId<R> + Send + Sync>;

/// A publish-once type.
///
/// The thunk runs at most once, on the first [`TypeArena::follow`] that
/// reaches this type; concurrent first accesses block on the cell and all
/// observe the same result.
pub struct LazyType<R: Region> {
    cell: OnceCell<TypeId<R>>,
    thunk: LazyThunk<R>,
}

impl<R: Region> LazyType<R> {
    pub fn new(thunk: impl Fn(&TypeArena<R>) -> TypeId<R> + Send + Sync + 'static) -> LazyType<R> {
        LazyType {
            cell: OnceCell::new(),
            thunk: Box::new(thunk),
        }
    }

    /// The published type, if the thunk already ran.
    pub fn get(&self) -> Option<TypeId<R>> {
        self.cell.get().copied()
    }

    pub(crate) fn force(&self, arena: &TypeArena<R>) -> TypeId<R> {
        *self.cell.get_or_init(|| (self.thunk)(arena))
    }
}

impl<R: Region> fmt::Debug for LazyType<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LazyType").field("published", &self.get()).finish()
    }
}

// =============================================================================
// Type packs
// =============================================================================

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TypePackData<R: Region> {
    List(SmallVec<[TypeId<R>; 2]>),
    /// A placeholder reserved by the incremental solver for a call result.
    Free,
    Bound(TypePackId<R>),
}

/// A call result. The eager backend's signature carries a predicate set
/// alongside the pack; refinements are not tracked here, so only the pack
/// remains.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct WithPredicate<T> {
    pub value: T,
}

impl<T> WithPredicate<T> {
    pub const fn new(value: T) -> WithPredicate<T> {
        WithPredicate { value }
    }
}
