//! The eager backend: resolves every call as soon as it is reached.

use std::sync::Arc;

use modreq_common::Span;
use modreq_parser::{NodeArena, NodeIndex};
use modreq_solver::{
    CallSite, EagerBackend, InstanceRegion, ModuleInfo, ModuleRegion, TypeArena, TypeError,
    TypeId, TypePackId, WithPredicate,
};
use modreq_sourcemap::SourceTree;
use tracing::{debug, trace};

use crate::config::SolverKind;
use crate::globals::GlobalTypes;
use crate::module::{CallRecord, CheckedModule, ScriptInfo, TypeRef};
use crate::platform::Platform;
use crate::scope::Environment;
use crate::walk::ScriptWalker;

pub struct TypeChecker<'a> {
    env: Environment<'a>,
    nodes: &'a NodeArena,
    /// Provisional call results. Cleared after every top-level statement,
    /// so nothing that outlives a statement may point into it.
    instance: TypeArena<InstanceRegion>,
    module: CheckedModule,
}

impl<'a> TypeChecker<'a> {
    pub fn new(
        platform: &'a Platform,
        globals: &'a GlobalTypes,
        tree: &Arc<SourceTree>,
        script: ScriptInfo,
        nodes: &'a NodeArena,
    ) -> Self {
        let script = script.anchored(tree);
        TypeChecker {
            env: Environment::new(platform, globals, Arc::clone(tree), script.node),
            nodes,
            instance: TypeArena::new(),
            module: CheckedModule::new(script, globals.id(), SolverKind::Eager),
        }
    }

    pub fn check(mut self, root: NodeIndex) -> CheckedModule {
        debug!(
            module = %self.module.script.module_name,
            context = %self.module.context,
            "eager check"
        );
        self.walk_chunk(root);
        self.module
    }

    fn any_pack(&self) -> TypePackId<ModuleRegion> {
        self.module.arena.add_pack([TypeId::ANY])
    }

    fn dispatch_call(&mut self, callee: TypeRef, call_site: &CallSite) -> TypePackId<ModuleRegion> {
        let globals = self.env.globals;
        let (provisional, magic) = match callee {
            TypeRef::Global(id) => match globals.arena().get_function(id) {
                Some(function) => (
                    self.instance.import_pack(globals.arena(), function.ret),
                    function.magic,
                ),
                None => return self.any_pack(),
            },
            TypeRef::Module(id) => match self.module.arena.get_function(id) {
                Some(function) => (
                    self.instance.import_pack(&self.module.arena, function.ret),
                    function.magic,
                ),
                None => return self.any_pack(),
            },
        };

        if let Some(magic) = magic {
            trace!(magic = magic.name(), "eager magic call");
            if let Some(result) = magic.handle_eager(self, call_site, WithPredicate::new(provisional)) {
                return result.value;
            }
        }
        // Keep the provisional result, moved out of the instance arena.
        self.module.arena.import_pack(&self.instance, provisional)
    }
}

impl<'a> ScriptWalker<'a> for TypeChecker<'a> {
    fn nodes(&self) -> &'a NodeArena {
        self.nodes
    }

    fn env(&mut self) -> &mut Environment<'a> {
        &mut self.env
    }

    fn module(&mut self) -> &mut CheckedModule {
        &mut self.module
    }

    fn type_call(&mut self, call: NodeIndex, callee: TypeRef, call_site: CallSite) -> TypeRef {
        let result = self.dispatch_call(callee, &call_site);
        self.module.calls.push(CallRecord {
            node: call,
            callee,
            call_site,
            result,
        });
        TypeRef::Module(self.module.arena.first(result).unwrap_or(TypeId::ANY))
    }

    fn end_statement(&mut self) {
        self.instance.clear();
    }
}

impl EagerBackend for TypeChecker<'_> {
    fn module_name(&self) -> &str {
        &self.module.script.module_name
    }

    fn module_arena(&self) -> &TypeArena<ModuleRegion> {
        &self.module.arena
    }

    fn check_require(&mut self, module: &ModuleInfo, location: Span) -> TypeId<ModuleRegion> {
        trace!(target_module = %module.name, start = location.start, "check require");
        self.module.require_type(&module.name)
    }

    fn report_error(&mut self, error: TypeError) {
        debug!(?error, module = %self.module.script.module_name, "type error");
        self.module.errors.push(error);
    }
}

#[cfg(test)]
#[path = "../tests/eager_tests.rs"]
mod tests;
