//! Results of checking one script.

use std::path::Path;
use std::sync::Arc;

use modreq_common::Diagnostic;
use modreq_parser::{NodeArena, NodeIndex, NodeKind};
use modreq_solver::{
    ArgShape, CallArg, CallSite, ContextId, GlobalRegion, MagicFunction, ModuleRegion, TypeArena,
    TypeData, TypeError, TypeFormatter, TypeId, TypePackId,
};
use modreq_sourcemap::{NodeId, SourceTree};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use tracing::debug;

use crate::config::SolverKind;
use crate::globals::GlobalTypes;

/// A type handle from either arena a checked module can refer to.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum TypeRef {
    Global(TypeId<GlobalRegion>),
    Module(TypeId<ModuleRegion>),
}

impl TypeRef {
    pub const ANY: TypeRef = TypeRef::Module(TypeId::ANY);
}

/// Where a script sits relative to the source tree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScriptInfo {
    /// File name used in diagnostics.
    pub file_name: String,
    /// Virtual path of the script's node, or its file name when it is not
    /// part of the tree.
    pub module_name: String,
    pub node: Option<NodeId>,
}

impl ScriptInfo {
    pub fn detached(file_name: impl Into<String>) -> ScriptInfo {
        let file_name = file_name.into();
        ScriptInfo {
            module_name: file_name.clone(),
            file_name,
            node: None,
        }
    }

    /// Looks `relative_path` up in `tree` by its sourcemap file path.
    pub fn for_file(tree: &SourceTree, file_name: impl Into<String>, relative_path: &Path) -> ScriptInfo {
        let file_name = file_name.into();
        match tree.find_by_file_path(relative_path) {
            Some(node) => ScriptInfo {
                file_name,
                module_name: node.virtual_path.clone(),
                node: Some(node.id),
            },
            None => ScriptInfo::detached(file_name),
        }
    }

    /// The same script located in `tree`. A node id taken from another tree
    /// is looked up again by virtual path; scripts missing from `tree` become
    /// detached.
    pub fn anchored(mut self, tree: &SourceTree) -> ScriptInfo {
        let Some(id) = self.node else {
            return self;
        };
        if tree
            .node(id)
            .is_some_and(|node| node.virtual_path == self.module_name)
        {
            return self;
        }
        self.node = tree.find_by_virtual_path(&self.module_name).map(|node| node.id);
        debug!(
            module = %self.module_name,
            generation = tree.generation(),
            found = self.node.is_some(),
            "script re-anchored in a newer tree"
        );
        self
    }
}

/// One call expression and how it was typed.
#[derive(Clone, Debug)]
pub struct CallRecord {
    pub node: NodeIndex,
    pub callee: TypeRef,
    pub call_site: CallSite,
    pub result: TypePackId<ModuleRegion>,
}

/// The parts of a callee function type tooling cares about.
#[derive(Clone, Debug)]
pub struct CalleeInfo {
    pub tags: SmallVec<[&'static str; 4]>,
    pub magic: Option<Arc<dyn MagicFunction>>,
}

impl CalleeInfo {
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| *t == tag)
    }
}

#[derive(Debug)]
pub struct CheckedModule {
    pub script: ScriptInfo,
    pub context: ContextId,
    pub solver: SolverKind,
    /// Long-lived arena for everything this module's results refer to.
    pub arena: TypeArena<ModuleRegion>,
    pub expr_types: FxHashMap<NodeIndex, TypeRef>,
    pub calls: Vec<CallRecord>,
    pub errors: Vec<TypeError>,
    required: FxHashMap<String, TypeId<ModuleRegion>>,
}

impl CheckedModule {
    pub(crate) fn new(script: ScriptInfo, context: ContextId, solver: SolverKind) -> CheckedModule {
        CheckedModule {
            script,
            context,
            solver,
            arena: TypeArena::new(),
            expr_types: FxHashMap::default(),
            calls: Vec::new(),
            errors: Vec::new(),
            required: FxHashMap::default(),
        }
    }

    /// The result type of requiring `virtual_path`. Repeated requires of one
    /// path yield the same handle.
    pub(crate) fn require_type(&mut self, virtual_path: &str) -> TypeId<ModuleRegion> {
        if let Some(ty) = self.required.get(virtual_path) {
            return *ty;
        }
        let ty = self.arena.add_type(TypeData::Module {
            virtual_path: virtual_path.to_string(),
        });
        self.required.insert(virtual_path.to_string(), ty);
        ty
    }

    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        let mut diagnostics: Vec<_> = self
            .errors
            .iter()
            .map(|error| error.to_diagnostic(&self.script.file_name))
            .collect();
        diagnostics.sort_by_key(|d| d.start);
        diagnostics
    }

    pub fn type_of(&self, node: NodeIndex) -> Option<TypeRef> {
        self.expr_types.get(&node).copied()
    }

    pub fn call(&self, node: NodeIndex) -> Option<&CallRecord> {
        self.calls.iter().find(|record| record.node == node)
    }

    /// The first result of the call at `node`.
    pub fn call_result(&self, node: NodeIndex) -> Option<TypeId<ModuleRegion>> {
        self.arena.first(self.call(node)?.result)
    }

    /// Tags and magic of a callee, following lazy and bound types.
    pub fn callee_info(&self, globals: &GlobalTypes, callee: TypeRef) -> Option<CalleeInfo> {
        let (tags, magic) = match callee {
            TypeRef::Global(id) => {
                let function = globals.arena().get_function(id)?;
                (function.tags, function.magic)
            }
            TypeRef::Module(id) => {
                let function = self.arena.get_function(id)?;
                (function.tags, function.magic)
            }
        };
        Some(CalleeInfo { tags, magic })
    }

    pub fn format_type(&self, globals: &GlobalTypes, ty: TypeRef) -> String {
        match ty {
            TypeRef::Global(id) => TypeFormatter::new(globals.arena()).format(id),
            TypeRef::Module(id) => TypeFormatter::new(&self.arena).format(id),
        }
    }
}

/// Builds the [`CallSite`] for a call expression.
pub(crate) fn call_site_for(nodes: &NodeArena, call: NodeIndex, args: &[NodeIndex]) -> CallSite {
    CallSite::new(
        nodes.span(call),
        args.iter().map(|&arg| CallArg {
            location: nodes.span(arg),
            shape: arg_shape(nodes, arg),
        }),
    )
}

fn arg_shape(nodes: &NodeArena, arg: NodeIndex) -> ArgShape {
    match nodes.kind(arg) {
        Some(NodeKind::StringLiteral { value }) => ArgShape::String(value.clone()),
        Some(NodeKind::BooleanLiteral { value }) => ArgShape::Bool(*value),
        _ => match member_path(nodes, arg) {
            Some(segments) => ArgShape::Path(segments),
            None => ArgShape::Other,
        },
    }
}

/// `a.b.c` as `["a", "b", "c"]`.
fn member_path(nodes: &NodeArena, mut expr: NodeIndex) -> Option<Vec<String>> {
    let mut segments = Vec::new();
    loop {
        match nodes.kind(expr)? {
            NodeKind::Member { object, name } => {
                segments.push(name.clone());
                expr = *object;
            }
            NodeKind::Identifier { name } => {
                segments.push(name.clone());
                segments.reverse();
                return Some(segments);
            }
            _ => return None,
        }
    }
}
