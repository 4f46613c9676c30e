//! Type arenas and the magic-function contract shared by the checking
//! backends.
//!
//! - **Regions**: every arena and handle is tagged with the region that owns
//!   it ([`GlobalRegion`], [`ModuleRegion`], [`InstanceRegion`]), so results
//!   can only be allocated where they outlive their use.
//! - **Lazy types**: publish-once types built on first [`TypeArena::follow`].
//! - **Magic functions**: trait objects attached to function types that take
//!   over call resolution in both the eager and the incremental backend.
//!
//! ```
//! use modreq_solver::{ModuleRegion, TypeArena, TypeFormatter, TypeId};
//!
//! let arena = TypeArena::<ModuleRegion>::new();
//! let params = arena.add_pack([TypeId::STRING, arena.make_option(TypeId::BOOLEAN)]);
//! let ret = arena.add_pack([TypeId::ANY]);
//! let function = arena.add_function(modreq_solver::FunctionType::new(params, ret));
//! assert_eq!(TypeFormatter::new(&arena).format(function), "(string, boolean?) -> any");
//! ```

pub mod arena;
pub mod context;
pub mod errors;
mod format;
pub mod magic;
pub mod region;
pub mod types;

pub use arena::{BindError, TypeArena};
pub use context::ContextId;
pub use errors::{TypeError, TypeErrorKind};
pub use format::TypeFormatter;
pub use magic::{
    ArgShape, CallArg, CallSite, EagerBackend, IncrementalBackend, MagicCallContext,
    MagicFunction, ModuleInfo,
};
pub use region::{GlobalRegion, InstanceRegion, ModuleRegion, Region};
pub use types::{
    ArenaId, FunctionType, IntrinsicKind, LazyType, TypeData, TypeId, TypePackData, TypePackId,
    WithPredicate,
};

/// Tag carried by every type published for a sourcemap.
pub const SOURCEMAP_GENERATED_TAG: &str = "SourcemapGenerated";
/// Tag carried by the string-keyed require function.
pub const STRING_REQUIRES_TAG: &str = "StringRequires";
/// Tag marking a function whose calls resolve to another module.
/// Document links look for callees carrying it.
pub const REQUIRE_TAG: &str = "require";

#[cfg(test)]
#[path = "../tests/lazy_tests.rs"]
mod lazy_tests;

#[cfg(test)]
#[path = "../tests/format_tests.rs"]
mod format_tests;
