//! Module resolution for Luau sourcemap projects.
//!
//! This crate connects the sourcemap to the checking backends:
//!
//! - [`Platform`]: configuration, the current sourcemap and the globals
//!   scripts see (`require`, the string-require global, `game`, `script`).
//! - [`GlobalTypes`]: one checking context (full or autocomplete).
//! - [`MagicStringRequire`] / [`MagicRequire`]: the magic functions behind
//!   `shared("Name")` and `require(game.Path)`.
//! - The publisher caching string-require function types per
//!   (context, node).
//! - Two backends: the eager [`TypeChecker`] and the incremental
//!   [`ConstraintGenerator`] + [`ConstraintSolver`].

pub mod config;
mod eager;
mod globals;
mod incremental;
mod module;
mod platform;
mod publisher;
mod require;
mod scope;
mod string_require;
mod walk;

pub use config::{ConfigError, PlatformConfig, PublishingStrategy, SolverKind, StringRequireConfig};
pub use eager::TypeChecker;
pub use globals::{ContextKind, GlobalTypes};
pub use incremental::{Constraint, ConstraintGenerator, ConstraintSolver};
pub use module::{CallRecord, CalleeInfo, CheckedModule, ScriptInfo, TypeRef};
pub use platform::Platform;
pub use publisher::{PublisherSnapshot, PublisherStats};
pub use require::MagicRequire;
pub use string_require::{MagicStringRequire, Resolution, ResolveError, is_nilable_call};

use std::sync::Arc;

use modreq_parser::ParseResult;
use modreq_sourcemap::SourceTree;
use tracing::info_span;

/// Checks a parsed script with the given backend.
///
/// Every lookup and require in the check resolves against `tree`, whatever
/// reloads happen meanwhile. A `script` located in an older tree is looked up
/// again in `tree`.
pub fn check_module(
    platform: &Platform,
    globals: &GlobalTypes,
    tree: &Arc<SourceTree>,
    script: ScriptInfo,
    parsed: &ParseResult,
    solver: SolverKind,
) -> CheckedModule {
    let _span = info_span!(
        "check_module",
        module = %script.module_name,
        context = %globals.id(),
        ?solver
    )
    .entered();
    match solver {
        SolverKind::Eager => TypeChecker::new(platform, globals, tree, script, &parsed.arena).check(parsed.root),
        SolverKind::Incremental => {
            let (module, constraints) =
                ConstraintGenerator::new(platform, globals, tree, script, &parsed.arena).generate(parsed.root);
            ConstraintSolver::new(globals, module).solve(constraints)
        }
    }
}
