//! The platform: configuration, the sourcemap and the global environment
//! scripts are checked against.

use std::sync::Arc;

use modreq_solver::{GlobalRegion, TypeId};
use modreq_sourcemap::{NodeId, SourceTree, SourcemapHandle};
use tracing::trace;

use crate::config::PlatformConfig;
use crate::globals::GlobalTypes;
use crate::publisher::{self, PublisherStats};

#[derive(Debug)]
pub struct Platform {
    config: PlatformConfig,
    sourcemap: Arc<SourcemapHandle>,
    stats: Arc<PublisherStats>,
}

impl Platform {
    pub fn new(config: PlatformConfig) -> Platform {
        Platform::with_sourcemap(config, Arc::new(SourcemapHandle::new()))
    }

    pub fn with_sourcemap(config: PlatformConfig, sourcemap: Arc<SourcemapHandle>) -> Platform {
        Platform {
            config,
            sourcemap,
            stats: Arc::new(PublisherStats::default()),
        }
    }

    pub fn config(&self) -> &PlatformConfig {
        &self.config
    }

    pub fn sourcemap(&self) -> &Arc<SourcemapHandle> {
        &self.sourcemap
    }

    pub fn stats(&self) -> &Arc<PublisherStats> {
        &self.stats
    }

    /// The string-require function type for scripts at `caller` (`None` for
    /// scripts outside the tree) in the context `globals`.
    pub fn string_require_type(
        &self,
        globals: &GlobalTypes,
        tree: &Arc<SourceTree>,
        caller: Option<NodeId>,
    ) -> TypeId<GlobalRegion> {
        publisher::string_require_type(self, globals, tree, caller)
    }

    /// Resolves a global name that is not shadowed by a local.
    pub fn lookup_global(
        &self,
        globals: &GlobalTypes,
        tree: &Arc<SourceTree>,
        caller: Option<NodeId>,
        name: &str,
    ) -> Option<TypeId<GlobalRegion>> {
        let string_require = &self.config.string_require;
        let ty = match name {
            "require" => globals.require_type(tree),
            "game" | "script" => TypeId::ANY,
            _ if string_require.enabled && name == string_require.global_name => {
                self.string_require_type(globals, tree, caller)
            }
            _ => return None,
        };
        trace!(name, context = %globals.id(), "global lookup");
        Some(ty)
    }
}
