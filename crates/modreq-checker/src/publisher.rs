//! Publication of the require function types.
//!
//! Each (checking context, source node) pair gets one function type
//! `(string, boolean?) -> any` carrying a [`MagicStringRequire`] bound to
//! that node. The handle is cached in the node's type cache under the
//! context id, so repeated lookups return the identical handle for as long
//! as the tree and the context live.
//!
//! With [`PublishingStrategy::Lazy`] the cache holds a lazy type instead;
//! the function is built on first [`follow`](modreq_solver::TypeArena::follow).
//! If the tree was replaced before that, the lazy type publishes `any`.
//!
//! The structural `require` is published the same way, once per
//! (context, tree), in the tree-level cache.
//!
//! Published types live in the context's global arena, which only grows.
//! Each reload therefore leaves behind one function type and its packs per
//! (context, node) that was looked up under the old tree. Reloads are rare
//! and a context is rebuilt with its workspace, so nothing reclaims them.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use dashmap::mapref::entry::Entry;
use modreq_solver::{
    FunctionType, GlobalRegion, REQUIRE_TAG, SOURCEMAP_GENERATED_TAG, STRING_REQUIRES_TAG,
    TypeArena, TypeId,
};
use modreq_sourcemap::{NodeId, SourceTree, WeakNodeRef};
use serde::Serialize;
use tracing::{debug, trace, warn};

use crate::config::PublishingStrategy;
use crate::globals::GlobalTypes;
use crate::platform::Platform;
use crate::require::MagicRequire;
use crate::string_require::MagicStringRequire;

/// Counters for publisher activity.
#[derive(Debug, Default)]
pub struct PublisherStats {
    constructions: AtomicUsize,
    cache_hits: AtomicUsize,
    invalidated: AtomicUsize,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct PublisherSnapshot {
    /// Function types actually built.
    pub constructions: usize,
    /// Lookups answered from a node cache.
    pub cache_hits: usize,
    /// Lazy types that published the fallback because their tree was replaced.
    pub invalidated: usize,
}

impl PublisherStats {
    pub fn snapshot(&self) -> PublisherSnapshot {
        PublisherSnapshot {
            constructions: self.constructions.load(Ordering::SeqCst),
            cache_hits: self.cache_hits.load(Ordering::SeqCst),
            invalidated: self.invalidated.load(Ordering::SeqCst),
        }
    }
}

pub(crate) fn string_require_type(
    platform: &Platform,
    globals: &GlobalTypes,
    tree: &Arc<SourceTree>,
    caller: Option<NodeId>,
) -> TypeId<GlobalRegion> {
    let Some(cache) = tree.string_require_cache(caller) else {
        warn!(?caller, generation = tree.generation(), "caller is not part of the tree");
        return TypeId::ANY;
    };

    match cache.entry(globals.id()) {
        Entry::Occupied(entry) => {
            platform.stats().cache_hits.fetch_add(1, Ordering::Relaxed);
            trace!(context = %globals.id(), ?caller, "string require type cache hit");
            *entry.get()
        }
        Entry::Vacant(entry) => {
            // The entry keeps this key locked until the handle is inserted,
            // so concurrent first lookups wait for this one.
            let ty = match platform.config().string_require.publishing {
                PublishingStrategy::Eager => {
                    build_string_require(globals.arena(), tree, caller, platform.stats())
                }
                PublishingStrategy::Lazy => publish_lazy(platform, globals, tree, caller),
            };
            debug!(
                context = %globals.id(),
                ?caller,
                strategy = ?platform.config().string_require.publishing,
                "published string require type"
            );
            entry.insert(ty);
            ty
        }
    }
}

fn publish_lazy(
    platform: &Platform,
    globals: &GlobalTypes,
    tree: &Arc<SourceTree>,
    caller: Option<NodeId>,
) -> TypeId<GlobalRegion> {
    let weak = WeakNodeRef::new(tree, caller);
    let sourcemap = Arc::clone(platform.sourcemap());
    let stats = Arc::clone(platform.stats());
    let context = globals.id();

    globals.arena().add_lazy(move |arena| {
        match weak.upgrade_current(&sourcemap) {
            Some(tree) => build_string_require(arena, &tree, weak.node_id(), &stats),
            None => {
                stats.invalidated.fetch_add(1, Ordering::Relaxed);
                debug!(
                    %context,
                    generation = weak.generation(),
                    "source tree replaced before first use, publishing any"
                );
                TypeId::ANY
            }
        }
    })
}

fn build_string_require(
    arena: &TypeArena<GlobalRegion>,
    tree: &Arc<SourceTree>,
    caller: Option<NodeId>,
    stats: &PublisherStats,
) -> TypeId<GlobalRegion> {
    stats.constructions.fetch_add(1, Ordering::Relaxed);
    let caller_name = caller.and_then(|id| tree.node(id)).map(|node| node.name.clone());
    let optional_bool = arena.make_option(TypeId::BOOLEAN);
    let params = arena.add_pack([TypeId::STRING, optional_bool]);
    // Overridden by the magic function.
    let ret = arena.add_pack([TypeId::ANY]);
    let magic = Arc::new(MagicStringRequire::new(tree, caller_name));
    arena.add_function(
        FunctionType::new(params, ret)
            .with_magic(magic)
            .with_tag(SOURCEMAP_GENERATED_TAG)
            .with_tag(STRING_REQUIRES_TAG)
            .with_tag(REQUIRE_TAG),
    )
}

pub(crate) fn require_type(globals: &GlobalTypes, tree: &Arc<SourceTree>) -> TypeId<GlobalRegion> {
    *tree.require_cache().entry(globals.id()).or_insert_with(|| {
        let arena = globals.arena();
        let params = arena.add_pack([TypeId::ANY]);
        let ret = arena.add_pack([TypeId::ANY]);
        debug!(context = %globals.id(), generation = tree.generation(), "published require type");
        arena.add_function(
            FunctionType::new(params, ret)
                .with_magic(Arc::new(MagicRequire::new(tree)))
                .with_tag(REQUIRE_TAG),
        )
    })
}

#[cfg(test)]
#[path = "../tests/publisher_tests.rs"]
mod tests;
