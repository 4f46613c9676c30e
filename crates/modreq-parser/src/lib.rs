//! Script syntax for modreq.
//!
//! A scanner and an arena-based recursive-descent parser for the subset of
//! Luau needed to find and analyze require-like call expressions:
//! declarations, assignments, control flow blocks, function bodies, calls,
//! method calls, member/index access and literals.
//!
//! Nodes are addressed by [`NodeIndex`] into a [`NodeArena`]; parse errors
//! are recovered from and reported as [`modreq_common::Diagnostic`]s.

pub mod node;
pub mod parser;
pub mod scanner;

pub use node::{BinaryOp, Node, NodeArena, NodeIndex, NodeKind, UnaryOp};
pub use parser::{ParseResult, ParserState, parse_source};
pub use scanner::{Scanner, SyntaxKind, Token};
