//! Document Links implementation for LSP.
//!
//! Provides clickable links for module requires. Links come from the calls
//! a checked module recorded: every call whose callee function type carries
//! the `require` tag is asked for its target through
//! [`MagicFunction::resolve_target`](modreq_solver::MagicFunction::resolve_target),
//! so a link exists exactly when checking resolved the call to a module.
//! The link targets the module's backing file, resolved against the
//! workspace root.

use std::path::Path;

use modreq_checker::{CallRecord, CheckedModule, GlobalTypes};
use modreq_common::position::{LineMap, Range};
use modreq_solver::{MagicFunction, REQUIRE_TAG};
use modreq_sourcemap::SourceTree;
use serde::Serialize;
use tracing::trace;

use crate::uri::resolve_uri;

/// A document link representing a clickable require argument.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentLink {
    /// The range of the call's first argument.
    pub range: Range,
    /// The target URI.
    pub target: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tooltip: Option<String>,
}

impl DocumentLink {
    pub fn new(range: Range, target: String, tooltip: Option<String>) -> Self {
        Self {
            range,
            target,
            tooltip,
        }
    }
}

/// Provider for document links.
pub struct DocumentLinkProvider<'a> {
    globals: &'a GlobalTypes,
    module: &'a CheckedModule,
    tree: &'a SourceTree,
    root: &'a Path,
    line_map: &'a LineMap,
    source_text: &'a str,
}

impl<'a> DocumentLinkProvider<'a> {
    pub fn new(
        globals: &'a GlobalTypes,
        module: &'a CheckedModule,
        tree: &'a SourceTree,
        root: &'a Path,
        line_map: &'a LineMap,
        source_text: &'a str,
    ) -> Self {
        Self {
            globals,
            module,
            tree,
            root,
            line_map,
            source_text,
        }
    }

    /// Provide all document links in the module, in call order.
    pub fn provide_document_links(&self) -> Vec<DocumentLink> {
        self.module
            .calls
            .iter()
            .filter_map(|record| self.link_for_call(record))
            .collect()
    }

    fn link_for_call(&self, record: &CallRecord) -> Option<DocumentLink> {
        let callee = self.module.callee_info(self.globals, record.callee)?;
        if !callee.has_tag(REQUIRE_TAG) {
            return None;
        }
        let magic = callee.magic?;
        let virtual_path =
            magic.resolve_target(&record.call_site, &self.module.script.module_name)?;

        // Modules without a backing file (folders, services) get no link.
        let node = self.tree.find_by_virtual_path(&virtual_path)?;
        let real_path = node.real_path()?;
        let target = resolve_uri(self.root, real_path);
        trace!(%virtual_path, %target, "document link");

        let range = self
            .line_map
            .span_to_range(record.call_site.arg_location(0), self.source_text);
        let tooltip = Some(format!("Open module '{}'", node.name));
        Some(DocumentLink::new(range, target, tooltip))
    }
}
