//! Sourcemap trees for modreq.
//!
//! A sourcemap describes the instance hierarchy of a project (`name`,
//! `className`, `filePaths`, `children`). Loading one produces an immutable
//! [`SourceTree`]: a node arena with canonical virtual paths, the
//! [`ModuleNameRegistry`] for string-keyed requires, and per-node type
//! caches. A [`SourcemapHandle`] owns the current tree and swaps it as a
//! unit on reload.

mod description;
mod error;
mod handle;
mod registry;
mod tree;

pub use description::SourcemapNode;
pub use error::SourcemapError;
pub use handle::{SourcemapHandle, WeakNodeRef};
pub use registry::ModuleNameRegistry;
pub use tree::{NodeId, SourceNode, SourceTree, TypeCache};

/// Class name of nodes that can be required.
pub const MODULE_SCRIPT_CLASS: &str = "ModuleScript";
/// Class name of the root of a full game tree.
pub const DATA_MODEL_CLASS: &str = "DataModel";
