//! Open documents checked against one sourcemap.
//!
//! A [`Workspace`] owns the platform, one global context per
//! [`ContextKind`] and the open documents. Checks are cached per document
//! and context, and redone when the document changes or a new sourcemap
//! generation becomes current.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use modreq_checker::{
    CheckedModule, ContextKind, GlobalTypes, Platform, PlatformConfig, ScriptInfo, check_module,
};
use modreq_common::LineMap;
use modreq_parser::{ParseResult, parse_source};
use modreq_sourcemap::{SourceTree, SourcemapError};
use rustc_hash::FxHashMap;
use tracing::{debug, info};

use crate::diagnostics::{LspDiagnostic, convert_diagnostic};
use crate::document_links::{DocumentLink, DocumentLinkProvider};
use crate::uri;

/// A check and the tree it was computed against.
struct CachedCheck {
    tree: Arc<SourceTree>,
    module: CheckedModule,
}

/// Parsed document state.
pub struct Document {
    file_name: String,
    source_text: String,
    line_map: LineMap,
    parsed: ParseResult,
    checks: FxHashMap<ContextKind, CachedCheck>,
}

impl Document {
    fn new(file_name: String, source_text: String) -> Document {
        let parsed = parse_source(&file_name, &source_text);
        Document {
            line_map: LineMap::build(&source_text),
            file_name,
            source_text,
            parsed,
            checks: FxHashMap::default(),
        }
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn source_text(&self) -> &str {
        &self.source_text
    }

    pub fn line_map(&self) -> &LineMap {
        &self.line_map
    }

    pub fn parsed(&self) -> &ParseResult {
        &self.parsed
    }
}

pub struct Workspace {
    root: PathBuf,
    platform: Platform,
    full: GlobalTypes,
    autocomplete: GlobalTypes,
    documents: FxHashMap<String, Document>,
}

impl Workspace {
    pub fn new(root: impl Into<PathBuf>, config: PlatformConfig) -> Workspace {
        let platform = Platform::new(config);
        let full = GlobalTypes::new(ContextKind::Full);
        let autocomplete = GlobalTypes::new(ContextKind::Autocomplete);
        Workspace {
            root: root.into(),
            platform,
            full,
            autocomplete,
            documents: FxHashMap::default(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn platform(&self) -> &Platform {
        &self.platform
    }

    pub fn globals(&self, kind: ContextKind) -> &GlobalTypes {
        match kind {
            ContextKind::Full => &self.full,
            ContextKind::Autocomplete => &self.autocomplete,
        }
    }

    /// Replaces the sourcemap. Open documents are rechecked on next use.
    pub fn load_sourcemap(&self, json: &str) -> Result<Arc<SourceTree>, SourcemapError> {
        let tree = self.platform.sourcemap().load_json(json)?;
        info!(
            root = %self.root.display(),
            generation = tree.generation(),
            "workspace sourcemap loaded"
        );
        Ok(tree)
    }

    pub fn load_sourcemap_file(&self, path: &Path) -> Result<Arc<SourceTree>, SourcemapError> {
        self.platform.sourcemap().load_file(path)
    }

    /// The URI of a path relative to the workspace root.
    pub fn resolve_uri(&self, relative: impl AsRef<Path>) -> String {
        uri::resolve_uri(&self.root, relative.as_ref())
    }

    /// Adds or replaces a document. `file_name` is relative to the root.
    pub fn open_document(&mut self, file_name: impl Into<String>, source_text: impl Into<String>) {
        let file_name = file_name.into();
        let document = Document::new(file_name.clone(), source_text.into());
        debug!(
            file = %file_name,
            parse_errors = document.parsed.diagnostics.len(),
            "document opened"
        );
        self.documents.insert(file_name, document);
    }

    pub fn close_document(&mut self, file_name: &str) -> bool {
        self.documents.remove(file_name).is_some()
    }

    pub fn document(&self, file_name: &str) -> Option<&Document> {
        self.documents.get(file_name)
    }

    pub fn document_count(&self) -> usize {
        self.documents.len()
    }

    /// Checks a document in the given context, reusing the last result while
    /// the current tree is the one it was checked against.
    pub fn check_document(&mut self, file_name: &str, kind: ContextKind) -> Option<&CheckedModule> {
        let tree = self.platform.sourcemap().current();
        let document = self.documents.get_mut(file_name)?;
        let stale = document
            .checks
            .get(&kind)
            .is_none_or(|check| !Arc::ptr_eq(&check.tree, &tree));

        if stale {
            let path = Path::new(file_name);
            let relative = path.strip_prefix(&self.root).unwrap_or(path);
            let script = ScriptInfo::for_file(&tree, file_name, relative);
            let globals = match kind {
                ContextKind::Full => &self.full,
                ContextKind::Autocomplete => &self.autocomplete,
            };
            let module = check_module(
                &self.platform,
                globals,
                &tree,
                script,
                &document.parsed,
                self.platform.config().solver,
            );
            debug!(
                file = file_name,
                ?kind,
                generation = tree.generation(),
                errors = module.errors.len(),
                "document checked"
            );
            document.checks.insert(
                kind,
                CachedCheck { tree, module },
            );
        }
        document.checks.get(&kind).map(|check| &check.module)
    }

    /// Parse and check diagnostics of a document, in source order.
    pub fn diagnostics(&mut self, file_name: &str) -> Vec<LspDiagnostic> {
        self.diagnostics_in(file_name, ContextKind::Full)
    }

    pub fn diagnostics_in(&mut self, file_name: &str, kind: ContextKind) -> Vec<LspDiagnostic> {
        if self.check_document(file_name, kind).is_none() {
            return Vec::new();
        }
        let Some(document) = self.documents.get(file_name) else {
            return Vec::new();
        };
        let Some(check) = document.checks.get(&kind) else {
            return Vec::new();
        };

        let mut diagnostics = document.parsed.diagnostics.clone();
        diagnostics.extend(check.module.diagnostics());
        diagnostics.sort_by_key(|d| d.start);
        diagnostics
            .iter()
            .map(|d| convert_diagnostic(d, &document.line_map, &document.source_text))
            .collect()
    }

    /// Links for every resolved require in a document.
    pub fn document_link(&mut self, file_name: &str) -> Vec<DocumentLink> {
        if self.check_document(file_name, ContextKind::Full).is_none() {
            return Vec::new();
        }
        let Some(document) = self.documents.get(file_name) else {
            return Vec::new();
        };
        let Some(check) = document.checks.get(&ContextKind::Full) else {
            return Vec::new();
        };

        // Targets are looked up in the tree the check resolved against.
        DocumentLinkProvider::new(
            &self.full,
            &check.module,
            &check.tree,
            &self.root,
            &document.line_map,
            &document.source_text,
        )
        .provide_document_links()
    }
}

#[cfg(test)]
#[path = "../tests/workspace_tests.rs"]
mod tests;
