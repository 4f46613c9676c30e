use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// One node of a sourcemap file, as written by sourcemap generators.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourcemapNode {
    pub name: String,
    pub class_name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub file_paths: Vec<PathBuf>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<SourcemapNode>,
}

impl SourcemapNode {
    pub fn new(name: impl Into<String>, class_name: impl Into<String>) -> SourcemapNode {
        SourcemapNode {
            name: name.into(),
            class_name: class_name.into(),
            file_paths: Vec::new(),
            children: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_file(mut self, path: impl Into<PathBuf>) -> SourcemapNode {
        self.file_paths.push(path.into());
        self
    }

    #[must_use]
    pub fn with_child(mut self, child: SourcemapNode) -> SourcemapNode {
        self.children.push(child);
        self
    }
}
