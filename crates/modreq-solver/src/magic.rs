//! Magic functions: custom call resolution attached to function types.
//!
//! A backend that reaches a call whose callee is a function type carrying a
//! [`MagicFunction`] hands the call to it instead of using the declared
//! return type. The two backends call different entry points:
//!
//! - the eager checker calls [`MagicFunction::handle_eager`] and gets the
//!   result pack back synchronously;
//! - the incremental solver calls [`MagicFunction::infer`], which binds the
//!   placeholder pack the solver reserved for the call.
//!
//! Backends only expose the narrow contracts below, so magic functions never
//! see checker internals.

use std::fmt;

use modreq_common::Span;
use smallvec::SmallVec;

use crate::arena::TypeArena;
use crate::errors::{TypeError, TypeErrorKind};
use crate::region::{InstanceRegion, ModuleRegion};
use crate::types::{TypeId, TypePackId, WithPredicate};

// =============================================================================
// Call sites
// =============================================================================

/// The syntactic shape of one call argument, as far as resolution cares.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ArgShape {
    /// A string literal, unescaped.
    String(String),
    /// A `true` / `false` literal.
    Bool(bool),
    /// A name followed by member accesses: `game.ReplicatedStorage.Test`.
    Path(Vec<String>),
    Other,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CallArg {
    pub location: Span,
    pub shape: ArgShape,
}

/// A call expression as seen by a magic function.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CallSite {
    pub location: Span,
    pub args: SmallVec<[CallArg; 2]>,
}

impl CallSite {
    pub fn new(location: Span, args: impl IntoIterator<Item = CallArg>) -> CallSite {
        CallSite {
            location,
            args: args.into_iter().collect(),
        }
    }

    pub fn arg(&self, index: usize) -> Option<&CallArg> {
        self.args.get(index)
    }

    /// The string literal at `index`, if that argument is one.
    pub fn string_arg(&self, index: usize) -> Option<&str> {
        match &self.arg(index)?.shape {
            ArgShape::String(value) => Some(value),
            _ => None,
        }
    }

    pub fn bool_arg(&self, index: usize) -> Option<bool> {
        match self.arg(index)?.shape {
            ArgShape::Bool(value) => Some(value),
            _ => None,
        }
    }

    pub fn path_arg(&self, index: usize) -> Option<&[String]> {
        match &self.arg(index)?.shape {
            ArgShape::Path(segments) => Some(segments),
            _ => None,
        }
    }

    /// Where to report a problem with argument `index`: the argument itself,
    /// or the whole call when it is missing.
    pub fn arg_location(&self, index: usize) -> Span {
        self.arg(index).map_or(self.location, |arg| arg.location)
    }
}

/// Identity of a module the backend should resolve.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ModuleInfo {
    /// Virtual path of the target, e.g. `game/ReplicatedStorage/Test`.
    pub name: String,
}

impl ModuleInfo {
    pub fn new(name: impl Into<String>) -> ModuleInfo {
        ModuleInfo { name: name.into() }
    }
}

// =============================================================================
// Backend contracts
// =============================================================================

/// What the eager checker exposes to magic functions.
pub trait EagerBackend {
    /// Name of the module being checked (its virtual path, or its file path
    /// when the script is not part of the source tree).
    fn module_name(&self) -> &str;

    /// The long-lived arena of the module being checked.
    fn module_arena(&self) -> &TypeArena<ModuleRegion>;

    /// Resolves the result type of requiring `module`.
    fn check_require(&mut self, module: &ModuleInfo, location: Span) -> TypeId<ModuleRegion>;

    fn report_error(&mut self, error: TypeError);
}

/// What the incremental solver exposes to magic functions.
pub trait IncrementalBackend {
    fn module_name(&self) -> &str;

    fn arena(&self) -> &TypeArena<ModuleRegion>;

    /// Resolves the result type of requiring `module`.
    fn resolve_module(&mut self, module: &ModuleInfo, location: Span) -> TypeId<ModuleRegion>;

    fn report_error(&mut self, kind: TypeErrorKind, location: Span);
}

/// Arguments to [`MagicFunction::infer`].
pub struct MagicCallContext<'a> {
    pub solver: &'a mut dyn IncrementalBackend,
    pub call_site: &'a CallSite,
    /// The placeholder pack reserved for the call's result.
    pub result: TypePackId<ModuleRegion>,
}

// =============================================================================
// MagicFunction
// =============================================================================

pub trait MagicFunction: Send + Sync {
    /// Short name used in logs and debug output.
    fn name(&self) -> &'static str;

    /// Eager entry point. Returns the call's result pack, allocated in the
    /// module arena, or `None` (after reporting) to keep the provisional
    /// result.
    fn handle_eager(
        &self,
        backend: &mut dyn EagerBackend,
        call: &CallSite,
        provisional: WithPredicate<TypePackId<InstanceRegion>>,
    ) -> Option<WithPredicate<TypePackId<ModuleRegion>>>;

    /// Incremental entry point. Returns `true` once `context.result` is bound.
    fn infer(&self, context: MagicCallContext<'_>) -> bool;

    /// The virtual path a call resolves to, without reporting anything.
    ///
    /// `module_name` is the virtual path of the calling script. Handlers that
    /// resolve relative to the caller (`script.Parent.X`) anchor on it;
    /// handlers already bound to their caller when they were published may
    /// ignore it.
    fn resolve_target(&self, _call: &CallSite, _module_name: &str) -> Option<String> {
        None
    }
}

impl fmt::Debug for dyn MagicFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MagicFunction({})", self.name())
    }
}
