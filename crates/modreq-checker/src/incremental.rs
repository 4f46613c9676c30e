//! The incremental backend: constraint generation, then solving.
//!
//! The generator walks the script once, reserving a free result pack for
//! every call and emitting constraints instead of resolving anything. The
//! solver then discharges the constraints in order; calls through a
//! function type with a magic handler are dispatched to
//! [`MagicFunction::infer`](modreq_solver::MagicFunction::infer).

use std::sync::Arc;

use modreq_common::Span;
use modreq_parser::{NodeArena, NodeIndex};
use modreq_solver::{
    CallSite, IncrementalBackend, MagicCallContext, ModuleInfo, ModuleRegion, TypeArena, TypeError,
    TypeErrorKind, TypeId, TypePackId,
};
use modreq_sourcemap::SourceTree;
use tracing::{debug, trace, warn};

use crate::config::SolverKind;
use crate::globals::GlobalTypes;
use crate::module::{CallRecord, CheckedModule, ScriptInfo, TypeRef};
use crate::platform::Platform;
use crate::scope::Environment;
use crate::walk::ScriptWalker;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Constraint {
    /// Resolve `CheckedModule::calls[call]`, binding its result pack.
    FunctionCall { call: usize },
    /// Bind `target` to the first type of `pack`.
    Unpack {
        pack: TypePackId<ModuleRegion>,
        target: TypeId<ModuleRegion>,
    },
}

pub struct ConstraintGenerator<'a> {
    env: Environment<'a>,
    nodes: &'a NodeArena,
    module: CheckedModule,
    constraints: Vec<Constraint>,
}

impl<'a> ConstraintGenerator<'a> {
    pub fn new(
        platform: &'a Platform,
        globals: &'a GlobalTypes,
        tree: &Arc<SourceTree>,
        script: ScriptInfo,
        nodes: &'a NodeArena,
    ) -> Self {
        let script = script.anchored(tree);
        ConstraintGenerator {
            env: Environment::new(platform, globals, Arc::clone(tree), script.node),
            nodes,
            module: CheckedModule::new(script, globals.id(), SolverKind::Incremental),
            constraints: Vec::new(),
        }
    }

    pub fn generate(mut self, root: NodeIndex) -> (CheckedModule, Vec<Constraint>) {
        self.walk_chunk(root);
        debug!(
            module = %self.module.script.module_name,
            constraints = self.constraints.len(),
            "generated constraints"
        );
        (self.module, self.constraints)
    }
}

impl<'a> ScriptWalker<'a> for ConstraintGenerator<'a> {
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
        let result = self.module.arena.fresh_pack();
        let target = self.module.arena.fresh_type();
        self.constraints.push(Constraint::FunctionCall {
            call: self.module.calls.len(),
        });
        self.constraints.push(Constraint::Unpack {
            pack: result,
            target,
        });
        self.module.calls.push(CallRecord {
            node: call,
            callee,
            call_site,
            result,
        });
        TypeRef::Module(target)
    }
}

pub struct ConstraintSolver<'a> {
    globals: &'a GlobalTypes,
    module: CheckedModule,
}

impl<'a> ConstraintSolver<'a> {
    pub fn new(globals: &'a GlobalTypes, module: CheckedModule) -> Self {
        ConstraintSolver { globals, module }
    }

    pub fn solve(mut self, constraints: Vec<Constraint>) -> CheckedModule {
        for constraint in constraints {
            match constraint {
                Constraint::FunctionCall { call } => self.solve_call(call),
                Constraint::Unpack { pack, target } => self.solve_unpack(pack, target),
            }
        }
        self.module
    }

    fn solve_call(&mut self, call: usize) {
        let Some(record) = self.module.calls.get(call).cloned() else {
            return;
        };
        let declared = match record.callee {
            TypeRef::Global(id) => self.globals.arena().get_function(id).map(|function| {
                let ret = self.module.arena.import_pack(self.globals.arena(), function.ret);
                (ret, function.magic)
            }),
            TypeRef::Module(id) => self
                .module
                .arena
                .get_function(id)
                .map(|function| (function.ret, function.magic)),
        };

        let fallback = match declared {
            Some((ret, Some(magic))) => {
                trace!(magic = magic.name(), "incremental magic call");
                let fulfilled = magic.infer(MagicCallContext {
                    solver: &mut *self,
                    call_site: &record.call_site,
                    result: record.result,
                });
                if fulfilled {
                    return;
                }
                ret
            }
            Some((ret, None)) => ret,
            None => self.module.arena.add_pack([TypeId::ANY]),
        };

        if self.module.arena.pack_types(record.result).is_none() {
            if let Err(error) = self.module.arena.bind_pack(record.result, fallback) {
                warn!(%error, "failed to bind call result");
            }
        }
    }

    fn solve_unpack(&mut self, pack: TypePackId<ModuleRegion>, target: TypeId<ModuleRegion>) {
        let ty = self.module.arena.first(pack).unwrap_or(TypeId::ANY);
        if let Err(error) = self.module.arena.bind_type(target, ty) {
            trace!(%error, "unpack target already resolved");
        }
    }
}

impl IncrementalBackend for ConstraintSolver<'_> {
    fn module_name(&self) -> &str {
        &self.module.script.module_name
    }

    fn arena(&self) -> &TypeArena<ModuleRegion> {
        &self.module.arena
    }

    fn resolve_module(&mut self, module: &ModuleInfo, location: Span) -> TypeId<ModuleRegion> {
        trace!(target_module = %module.name, start = location.start, "resolve module");
        self.module.require_type(&module.name)
    }

    fn report_error(&mut self, kind: TypeErrorKind, location: Span) {
        debug!(?kind, module = %self.module.script.module_name, "type error");
        self.module.errors.push(TypeError::new(location, kind));
    }
}

#[cfg(test)]
#[path = "../tests/incremental_tests.rs"]
mod tests;
