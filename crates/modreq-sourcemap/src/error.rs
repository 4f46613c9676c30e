use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum SourcemapError {
    #[error("invalid sourcemap: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to read sourcemap {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("sourcemap nesting exceeds {limit} levels at `{path}`")]
    TooDeep { path: String, limit: u32 },
}
