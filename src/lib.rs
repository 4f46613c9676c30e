//! String-keyed and structural module resolution for Luau sourcemap
//! projects.
//!
//! The workspace crates, re-exported:
//! - [`common`]: spans, positions, diagnostics, limits
//! - [`parser`]: the script scanner and parser
//! - [`solver`]: region-tagged type arenas and magic functions
//! - [`sourcemap`]: the source tree, module name registry and reload handle
//! - [`checker`]: the platform, type publisher and both checking backends
//! - [`lsp`]: workspace, diagnostics and document links

pub use modreq_checker as checker;
pub use modreq_common as common;
pub use modreq_lsp as lsp;
pub use modreq_parser as parser;
pub use modreq_solver as solver;
pub use modreq_sourcemap as sourcemap;

pub mod cli;
pub mod tracing_config;
