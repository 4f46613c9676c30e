//! Common types and utilities shared by the modreq crates.
//!
//! This crate provides foundational types used across all modreq crates:
//! - Source spans (`Span`)
//! - Position/Range types and the `LineMap` for line/column conversion
//! - Diagnostic types, codes and message templates
//! - Centralized limits and thresholds

// Span - Source location tracking (byte offsets)
pub mod span;
pub use span::Span;

// Position/Range types for line/column source locations
pub mod position;
pub use position::{LineMap, Position, Range};

// Diagnostics shared by the parser and both checking backends
pub mod diagnostics;
pub use diagnostics::{Diagnostic, DiagnosticCategory};

// Centralized limits and thresholds
pub mod limits;
