//! Centralized limits and thresholds.
//!
//! Shared constants for recursion depths used by the sourcemap loader, the
//! script parser and the type arenas. Keeping them in one place prevents
//! crates from drifting to inconsistent values.

/// Maximum nesting depth of a sourcemap description.
///
/// Sourcemaps are generated by external tools; deeper descriptions are
/// rejected with a load error instead of building an unbounded tree. The
/// value stays below what `serde_json` accepts (every level is an object
/// plus a `children` array) so the loader reports the depth itself.
pub const MAX_SOURCEMAP_DEPTH: u32 = 48;

/// Maximum nesting depth of script expressions accepted by the parser.
///
/// ```lua
/// local x = f(f(f(f(f(f(f(f(f(f(f(f( --[[ ... ]] ))))))))))))
/// ```
pub const MAX_EXPR_PARSE_DEPTH: u32 = 200;

/// Maximum number of `Bound`/`Lazy` indirections `follow` walks before
/// giving up and returning the error type.
pub const MAX_FOLLOW_DEPTH: u32 = 64;

/// Maximum structural depth when deep-copying a type between arenas.
pub const MAX_IMPORT_DEPTH: u32 = 64;
