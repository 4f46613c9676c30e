//! `file://` URIs for workspace paths.

use std::path::Path;

/// Characters that cannot appear unescaped in a URI path.
const RESERVED: &[char] = &[' ', '%', '#', '?', '[', ']'];

/// The `file://` URI of an absolute path.
pub fn file_uri(path: &Path) -> String {
    let raw = path.to_string_lossy().replace('\\', "/");
    let mut uri = String::with_capacity(raw.len() + 8);
    uri.push_str("file://");
    if !raw.starts_with('/') {
        // Drive-letter paths: file:///C:/...
        uri.push('/');
    }
    for ch in raw.chars() {
        if RESERVED.contains(&ch) {
            let mut buf = [0u8; 4];
            for byte in ch.encode_utf8(&mut buf).bytes() {
                uri.push_str(&format!("%{byte:02X}"));
            }
        } else {
            uri.push(ch);
        }
    }
    uri
}

/// Resolves `relative` against the workspace `root` and returns its URI.
pub fn resolve_uri(root: &Path, relative: &Path) -> String {
    file_uri(&root.join(relative))
}

#[cfg(test)]
#[path = "../tests/uri_tests.rs"]
mod tests;
