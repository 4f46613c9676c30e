//! Language-server features for modreq.
//!
//! This crate provides:
//! - A [`Workspace`] of open documents checked against one sourcemap
//! - Diagnostics in LSP shape
//! - Document links for `require` and string-require calls

pub mod diagnostics;
pub mod document_links;
pub mod uri;
mod workspace;

pub use diagnostics::{DiagnosticSeverity, LspDiagnostic, convert_diagnostic};
pub use document_links::{DocumentLink, DocumentLinkProvider};
pub use uri::{file_uri, resolve_uri};
pub use workspace::{Document, Workspace};
