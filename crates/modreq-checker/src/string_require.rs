//! String-keyed requires: `shared("ModuleName", nilable?)`.

use std::sync::{Arc, Weak};

use modreq_solver::{
    CallSite, EagerBackend, InstanceRegion, MagicCallContext, MagicFunction, ModuleInfo,
    ModuleRegion, TypeError, TypeErrorKind, TypeId, TypePackId, WithPredicate,
};
use modreq_sourcemap::SourceTree;
use tracing::{debug, trace, warn};

/// Why a string require could not be resolved.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    #[error("module `{0}` cannot require itself")]
    SelfReference(String),
    #[error("unknown module {}", .0.as_deref().unwrap_or("<non-literal>"))]
    UnknownModule(Option<String>),
}

impl ResolveError {
    /// Both failures surface as an unknown require.
    pub fn to_kind(&self) -> TypeErrorKind {
        let module_name = match self {
            ResolveError::SelfReference(name) => Some(name.clone()),
            ResolveError::UnknownModule(name) => name.clone(),
        };
        TypeErrorKind::UnknownRequire { module_name }
    }
}

/// A successful resolution.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Resolution {
    /// The registered module at `virtual_path`; `nilable` asks for `T?`.
    Module { virtual_path: String, nilable: bool },
    /// An unregistered name under the nilable flag.
    Nil,
}

/// True when the second argument is the literal `true`. Any other shape,
/// including a missing argument, means "not nilable".
pub fn is_nilable_call(call: &CallSite) -> bool {
    call.bool_arg(1) == Some(true)
}

/// The magic behind a published string-require function. One instance is
/// bound to the script node and the tree it was published for.
#[derive(Debug)]
pub struct MagicStringRequire {
    tree: Weak<SourceTree>,
    generation: u64,
    /// Name of the node the function was published for; `None` for scripts
    /// outside the tree.
    caller_name: Option<String>,
}

impl MagicStringRequire {
    pub fn new(tree: &Arc<SourceTree>, caller_name: Option<String>) -> Self {
        MagicStringRequire {
            tree: Arc::downgrade(tree),
            generation: tree.generation(),
            caller_name,
        }
    }

    /// Generation of the tree this function resolves against.
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// Resolves a call against the registry of the tree the function was
    /// published for. Once that tree is dropped every name is unknown.
    pub fn resolve(&self, call: &CallSite) -> Result<Resolution, ResolveError> {
        let Some(name) = call.string_arg(0) else {
            return Err(ResolveError::UnknownModule(None));
        };
        let nilable = is_nilable_call(call);

        if self.caller_name.as_deref() == Some(name) {
            return Err(ResolveError::SelfReference(name.to_string()));
        }

        let Some(tree) = self.tree.upgrade() else {
            debug!(generation = self.generation, module = name, "source tree dropped");
            return if nilable {
                Ok(Resolution::Nil)
            } else {
                Err(ResolveError::UnknownModule(Some(name.to_string())))
            };
        };
        match tree.find_module(name) {
            Some(node) => Ok(Resolution::Module {
                virtual_path: node.virtual_path.clone(),
                nilable,
            }),
            None if nilable => Ok(Resolution::Nil),
            None => Err(ResolveError::UnknownModule(Some(name.to_string()))),
        }
    }

    fn resolve_logged(&self, call: &CallSite) -> Result<Resolution, ResolveError> {
        let outcome = self.resolve(call);
        match &outcome {
            Ok(resolution) => trace!(?resolution, "string require resolved"),
            Err(error) => debug!(%error, caller = ?self.caller_name, "string require failed"),
        }
        outcome
    }
}

impl MagicFunction for MagicStringRequire {
    fn name(&self) -> &'static str {
        "string_require"
    }

    fn handle_eager(
        &self,
        backend: &mut dyn EagerBackend,
        call: &CallSite,
        _provisional: WithPredicate<TypePackId<InstanceRegion>>,
    ) -> Option<WithPredicate<TypePackId<ModuleRegion>>> {
        let location = call.arg_location(0);
        let result = match self.resolve_logged(call) {
            Err(error) => {
                backend.report_error(TypeError::new(location, error.to_kind()));
                return None;
            }
            Ok(Resolution::Nil) => TypeId::NIL,
            Ok(Resolution::Module {
                virtual_path,
                nilable,
            }) => {
                let ty = backend.check_require(&ModuleInfo::new(virtual_path), location);
                if nilable {
                    backend.module_arena().make_option(ty)
                } else {
                    ty
                }
            }
        };
        Some(WithPredicate::new(backend.module_arena().add_pack([result])))
    }

    fn infer(&self, context: MagicCallContext<'_>) -> bool {
        let MagicCallContext {
            solver,
            call_site,
            result,
        } = context;
        let location = call_site.arg_location(0);
        let ty = match self.resolve_logged(call_site) {
            Err(error) => {
                solver.report_error(error.to_kind(), location);
                return false;
            }
            Ok(Resolution::Nil) => TypeId::NIL,
            Ok(Resolution::Module {
                virtual_path,
                nilable,
            }) => {
                let ty = solver.resolve_module(&ModuleInfo::new(virtual_path), location);
                if nilable {
                    solver.arena().make_option(ty)
                } else {
                    ty
                }
            }
        };
        let pack = solver.arena().add_pack([ty]);
        match solver.arena().bind_pack(result, pack) {
            Ok(()) => true,
            Err(error) => {
                warn!(%error, "string require result already bound");
                false
            }
        }
    }

    /// The caller was fixed at publication, so `module_name` is not consulted.
    fn resolve_target(&self, call: &CallSite, _module_name: &str) -> Option<String> {
        match self.resolve(call).ok()? {
            Resolution::Module { virtual_path, .. } => Some(virtual_path),
            Resolution::Nil => None,
        }
    }
}

#[cfg(test)]
#[path = "../tests/string_require_tests.rs"]
mod tests;
