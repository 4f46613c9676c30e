//! Structural requires: `require(game.ReplicatedStorage.Module)`.

use std::sync::{Arc, Weak};

use modreq_solver::{
    CallSite, EagerBackend, InstanceRegion, MagicCallContext, MagicFunction, ModuleInfo,
    ModuleRegion, TypeError, TypeErrorKind, TypePackId, WithPredicate,
};
use modreq_sourcemap::SourceTree;
use tracing::{debug, warn};

/// The magic behind the structural `require` of one context, bound to the
/// tree it was published for.
#[derive(Debug)]
pub struct MagicRequire {
    tree: Weak<SourceTree>,
    generation: u64,
}

impl MagicRequire {
    pub fn new(tree: &Arc<SourceTree>) -> Self {
        MagicRequire {
            tree: Arc::downgrade(tree),
            generation: tree.generation(),
        }
    }

    /// The virtual path a `require` call points at. `module_name` is the
    /// requiring script, used to anchor `script`-relative paths.
    pub fn resolve(&self, call: &CallSite, module_name: &str) -> Result<String, TypeErrorKind> {
        let Some(segments) = call.path_arg(0) else {
            return Err(TypeErrorKind::UnknownRequire { module_name: None });
        };
        let path = || segments.join(".");
        let Some(tree) = self.tree.upgrade() else {
            debug!(generation = self.generation, "source tree dropped, require unresolved");
            return Err(TypeErrorKind::UnknownRequire {
                module_name: Some(path()),
            });
        };
        let caller = tree.find_by_virtual_path(module_name).map(|node| node.id);
        match tree.resolve_path(caller, segments) {
            Some(node) => Ok(node.virtual_path.clone()),
            None => {
                let path = path();
                debug!(%path, module_name, "require path did not resolve");
                Err(TypeErrorKind::UnknownRequire {
                    module_name: Some(path),
                })
            }
        }
    }
}

impl MagicFunction for MagicRequire {
    fn name(&self) -> &'static str {
        "require"
    }

    fn handle_eager(
        &self,
        backend: &mut dyn EagerBackend,
        call: &CallSite,
        _provisional: WithPredicate<TypePackId<InstanceRegion>>,
    ) -> Option<WithPredicate<TypePackId<ModuleRegion>>> {
        let location = call.arg_location(0);
        match self.resolve(call, backend.module_name()) {
            Ok(virtual_path) => {
                let ty = backend.check_require(&ModuleInfo::new(virtual_path), location);
                Some(WithPredicate::new(backend.module_arena().add_pack([ty])))
            }
            Err(kind) => {
                backend.report_error(TypeError::new(location, kind));
                None
            }
        }
    }

    fn infer(&self, context: MagicCallContext<'_>) -> bool {
        let location = context.call_site.arg_location(0);
        match self.resolve(context.call_site, context.solver.module_name()) {
            Ok(virtual_path) => {
                let ty = context
                    .solver
                    .resolve_module(&ModuleInfo::new(virtual_path), location);
                let pack = context.solver.arena().add_pack([ty]);
                match context.solver.arena().bind_pack(context.result, pack) {
                    Ok(()) => true,
                    Err(error) => {
                        warn!(%error, "require result already bound");
                        false
                    }
                }
            }
            Err(kind) => {
                context.solver.report_error(kind, location);
                false
            }
        }
    }

    fn resolve_target(&self, call: &CallSite, module_name: &str) -> Option<String> {
        self.resolve(call, module_name).ok()
    }
}
