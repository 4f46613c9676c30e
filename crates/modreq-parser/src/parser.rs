//! Recursive-descent parser producing a [`NodeArena`].
//!
//! The parser never fails: unexpected tokens are reported as diagnostics and
//! replaced by [`NodeKind::Error`] nodes, so downstream passes always get a
//! complete chunk to walk.

use modreq_common::diagnostics::{Diagnostic, diagnostic_codes};
use modreq_common::limits::MAX_EXPR_PARSE_DEPTH;
use modreq_common::Span;
use tracing::{debug, trace};

use crate::node::{BinaryOp, NodeArena, NodeIndex, NodeKind, UnaryOp};
use crate::scanner::{Scanner, SyntaxKind, Token};

/// Output of [`parse_source`].
#[derive(Debug)]
pub struct ParseResult {
    pub arena: NodeArena,
    pub root: NodeIndex,
    pub diagnostics: Vec<Diagnostic>,
}

/// Binding power of a binary operator: `(left, right)`.
///
/// Right-associative operators (`..` and `^`) bind tighter on the right.
fn binary_precedence(kind: SyntaxKind) -> Option<(BinaryOp, u8, u8)> {
    Some(match kind {
        SyntaxKind::OrKeyword => (BinaryOp::Or, 1, 1),
        SyntaxKind::AndKeyword => (BinaryOp::And, 2, 2),
        SyntaxKind::EqualsEquals => (BinaryOp::Equal, 3, 3),
        SyntaxKind::NotEquals => (BinaryOp::NotEqual, 3, 3),
        SyntaxKind::LessThan => (BinaryOp::Less, 3, 3),
        SyntaxKind::LessThanEquals => (BinaryOp::LessEqual, 3, 3),
        SyntaxKind::GreaterThan => (BinaryOp::Greater, 3, 3),
        SyntaxKind::GreaterThanEquals => (BinaryOp::GreaterEqual, 3, 3),
        SyntaxKind::DotDot => (BinaryOp::Concat, 5, 4),
        SyntaxKind::Plus => (BinaryOp::Add, 6, 6),
        SyntaxKind::Minus => (BinaryOp::Sub, 6, 6),
        SyntaxKind::Star => (BinaryOp::Mul, 7, 7),
        SyntaxKind::Slash => (BinaryOp::Div, 7, 7),
        SyntaxKind::Percent => (BinaryOp::Mod, 7, 7),
        SyntaxKind::Caret => (BinaryOp::Pow, 10, 9),
        _ => return None,
    })
}

const UNARY_PRECEDENCE: u8 = 8;

pub struct ParserState {
    file_name: String,
    tokens: Vec<Token>,
    pos: usize,
    arena: NodeArena,
    diagnostics: Vec<Diagnostic>,
    expr_depth: u32,
}

impl ParserState {
    pub fn new(file_name: impl Into<String>, source: &str) -> ParserState {
        let file_name = file_name.into();
        let (tokens, scan_errors) = Scanner::new(source).scan_all();
        let diagnostics = scan_errors
            .into_iter()
            .map(|error| {
                let args: Vec<&str> = error.args.iter().map(String::as_str).collect();
                Diagnostic::from_code(file_name.clone(), error.span, error.code, &args)
            })
            .collect();
        ParserState {
            file_name,
            tokens,
            pos: 0,
            arena: NodeArena::new(),
            diagnostics,
            expr_depth: 0,
        }
    }

    pub fn get_arena(&self) -> &NodeArena {
        &self.arena
    }

    pub fn get_diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn into_result(mut self, root: NodeIndex) -> ParseResult {
        self.diagnostics.sort_by_key(|d| d.start);
        ParseResult {
            arena: self.arena,
            root,
            diagnostics: self.diagnostics,
        }
    }

    // =========================================================================
    // Token helpers
    // =========================================================================

    fn current(&self) -> &Token {
        // scan_all always ends with EndOfFile and we never step past it.
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    #[inline]
    fn token(&self) -> SyntaxKind {
        self.current().kind
    }

    fn peek(&self, offset: usize) -> SyntaxKind {
        self.tokens
            .get(self.pos + offset)
            .map_or(SyntaxKind::EndOfFile, |t| t.kind)
    }

    #[inline]
    fn is_token(&self, kind: SyntaxKind) -> bool {
        self.token() == kind
    }

    fn next_token(&mut self) -> Token {
        let token = self.current().clone();
        if token.kind != SyntaxKind::EndOfFile {
            self.pos += 1;
        }
        token
    }

    fn parse_optional(&mut self, kind: SyntaxKind) -> bool {
        if self.is_token(kind) {
            self.next_token();
            true
        } else {
            false
        }
    }

    fn prev_end(&self) -> u32 {
        match self.pos.checked_sub(1).and_then(|i| self.tokens.get(i)) {
            Some(token) => token.span.end,
            None => 0,
        }
    }

    fn parse_error_at_current_token(&mut self, expected: &str) {
        let token = self.current();
        let got = if token.kind == SyntaxKind::EndOfFile {
            "<eof>".to_string()
        } else {
            token.value.clone()
        };
        let span = token.span;
        trace!(expected, got = %got, pos = span.start, "parse error");
        // One diagnostic per position keeps cascades quiet.
        if self.diagnostics.last().is_some_and(|d| d.start == span.start) {
            return;
        }
        self.diagnostics.push(Diagnostic::from_code(
            self.file_name.clone(),
            span,
            diagnostic_codes::UNEXPECTED_TOKEN,
            &[expected, got.as_str()],
        ));
    }

    fn parse_expected(&mut self, kind: SyntaxKind, text: &str) -> bool {
        if self.parse_optional(kind) {
            return true;
        }
        self.parse_error_at_current_token(&format!("'{text}'"));
        false
    }

    fn parse_identifier_name(&mut self) -> String {
        if self.is_token(SyntaxKind::Identifier) {
            return self.next_token().value;
        }
        self.parse_error_at_current_token("identifier");
        String::new()
    }

    fn error_node(&mut self) -> NodeIndex {
        let span = self.current().span;
        self.arena.add(NodeKind::Error, span)
    }

    // =========================================================================
    // Statements
    // =========================================================================

    /// Parse the whole token stream as a chunk.
    pub fn parse_chunk(&mut self) -> NodeIndex {
        let mut statements = self.parse_statement_list();
        while !self.is_token(SyntaxKind::EndOfFile) {
            // A stray block terminator at top level.
            self.parse_error_at_current_token("statement");
            self.next_token();
            statements.extend(self.parse_statement_list());
        }
        let end = self.current().span.end;
        debug!(
            file = %self.file_name,
            nodes = self.arena.len(),
            diagnostics = self.diagnostics.len(),
            "parsed chunk"
        );
        self.arena
            .add(NodeKind::Chunk { statements }, Span::new(0, end))
    }

    fn is_block_end(&self) -> bool {
        matches!(
            self.token(),
            SyntaxKind::EndKeyword
                | SyntaxKind::ElseKeyword
                | SyntaxKind::ElseifKeyword
                | SyntaxKind::UntilKeyword
                | SyntaxKind::EndOfFile
        )
    }

    fn parse_statement_list(&mut self) -> Vec<NodeIndex> {
        let mut statements = Vec::new();
        while !self.is_block_end() {
            if self.parse_optional(SyntaxKind::Semicolon) {
                continue;
            }
            let before = self.pos;
            let statement = self.parse_statement();
            statements.push(statement);
            if self.pos == before {
                // Guarantee progress on unrecognized input.
                self.next_token();
            }
        }
        statements
    }

    fn parse_block(&mut self) -> NodeIndex {
        let start = self.current().span.start;
        let statements = self.parse_statement_list();
        let end = self.prev_end().max(start);
        self.arena
            .add(NodeKind::Block { statements }, Span::new(start, end))
    }

    fn parse_statement(&mut self) -> NodeIndex {
        let start = self.current().span.start;
        let kind = match self.token() {
            SyntaxKind::LocalKeyword => return self.parse_local(start),
            SyntaxKind::FunctionKeyword => return self.parse_function_statement(start),
            SyntaxKind::ReturnKeyword => {
                self.next_token();
                let values = if self.is_block_end() || self.is_token(SyntaxKind::Semicolon) {
                    Vec::new()
                } else {
                    self.parse_expression_list()
                };
                NodeKind::Return { values }
            }
            SyntaxKind::IfKeyword => self.parse_if(),
            SyntaxKind::WhileKeyword => {
                self.next_token();
                let condition = self.parse_expression();
                self.parse_expected(SyntaxKind::DoKeyword, "do");
                let body = self.parse_block();
                self.parse_expected(SyntaxKind::EndKeyword, "end");
                NodeKind::While { condition, body }
            }
            SyntaxKind::DoKeyword => {
                self.next_token();
                let block = self.parse_block();
                self.parse_expected(SyntaxKind::EndKeyword, "end");
                return block;
            }
            SyntaxKind::RepeatKeyword => {
                self.next_token();
                let body = self.parse_block();
                self.parse_expected(SyntaxKind::UntilKeyword, "until");
                let condition = self.parse_expression();
                NodeKind::Repeat { body, condition }
            }
            SyntaxKind::ForKeyword => self.parse_for(),
            SyntaxKind::BreakKeyword => {
                self.next_token();
                NodeKind::Break
            }
            SyntaxKind::ContinueKeyword => {
                self.next_token();
                NodeKind::Continue
            }
            _ => return self.parse_expression_or_assignment(start),
        };
        let end = self.prev_end();
        self.arena.add(kind, Span::new(start, end))
    }

    fn parse_local(&mut self, start: u32) -> NodeIndex {
        self.next_token();
        if self.parse_optional(SyntaxKind::FunctionKeyword) {
            let name = self.parse_identifier_name();
            let function = self.parse_function_body(start, false);
            let end = self.prev_end();
            return self
                .arena
                .add(NodeKind::LocalFunction { name, function }, Span::new(start, end));
        }

        let mut names = vec![self.parse_binding_name()];
        while self.parse_optional(SyntaxKind::Comma) {
            names.push(self.parse_binding_name());
        }
        let values = if self.parse_optional(SyntaxKind::Equals) {
            self.parse_expression_list()
        } else {
            Vec::new()
        };
        let end = self.prev_end();
        self.arena
            .add(NodeKind::Local { names, values }, Span::new(start, end))
    }

    /// A declared name, skipping an optional `: Type` annotation.
    fn parse_binding_name(&mut self) -> String {
        let name = self.parse_identifier_name();
        if self.parse_optional(SyntaxKind::Colon) {
            self.skip_type_annotation();
        }
        name
    }

    /// Skips a simple type annotation: dotted names, unions, `?` and
    /// bracketed groups.
    fn skip_type_annotation(&mut self) {
        let mut depth = 0usize;
        loop {
            let token = self.current().clone();
            match token.kind {
                SyntaxKind::OpenParen | SyntaxKind::OpenBrace | SyntaxKind::OpenBracket => {
                    depth += 1;
                }
                SyntaxKind::CloseParen | SyntaxKind::CloseBrace | SyntaxKind::CloseBracket => {
                    if depth == 0 {
                        return;
                    }
                    depth -= 1;
                }
                SyntaxKind::EndOfFile => return,
                _ if depth > 0 => {}
                SyntaxKind::Identifier
                | SyntaxKind::NilKeyword
                | SyntaxKind::Dot
                | SyntaxKind::Unknown => {}
                _ => return,
            }
            self.next_token();
            if depth > 0 {
                continue;
            }
            let expects_more =
                token.kind == SyntaxKind::Dot || matches!(token.value.as_str(), "|" | "&");
            if !expects_more && !matches!(self.token(), SyntaxKind::Dot | SyntaxKind::Unknown) {
                return;
            }
        }
    }

    fn parse_function_statement(&mut self, start: u32) -> NodeIndex {
        self.next_token();
        let name_start = self.current().span.start;
        let name = self.parse_identifier_name();
        let mut target = self
            .arena
            .add(NodeKind::Identifier { name }, Span::new(name_start, self.prev_end()));
        let mut is_method = false;
        loop {
            if self.parse_optional(SyntaxKind::Dot) {
                let name = self.parse_identifier_name();
                target = self
                    .arena
                    .add(NodeKind::Member { object: target, name }, Span::new(name_start, self.prev_end()));
            } else if self.parse_optional(SyntaxKind::Colon) {
                let name = self.parse_identifier_name();
                target = self
                    .arena
                    .add(NodeKind::Member { object: target, name }, Span::new(name_start, self.prev_end()));
                is_method = true;
                break;
            } else {
                break;
            }
        }
        let function = self.parse_function_body(start, is_method);
        let end = self.prev_end();
        self.arena
            .add(NodeKind::FunctionStatement { target, function }, Span::new(start, end))
    }

    /// Parses `(params) block end`, returning a `Function` node.
    fn parse_function_body(&mut self, start: u32, is_method: bool) -> NodeIndex {
        let mut params = Vec::new();
        if is_method {
            params.push("self".to_string());
        }
        if self.parse_expected(SyntaxKind::OpenParen, "(") {
            while !self.is_token(SyntaxKind::CloseParen) && !self.is_token(SyntaxKind::EndOfFile) {
                if self.parse_optional(SyntaxKind::DotDotDot) {
                    params.push("...".to_string());
                    if self.parse_optional(SyntaxKind::Colon) {
                        self.skip_type_annotation();
                    }
                } else {
                    let before = self.pos;
                    params.push(self.parse_binding_name());
                    if self.pos == before {
                        self.next_token();
                    }
                }
                if !self.parse_optional(SyntaxKind::Comma) {
                    break;
                }
            }
            self.parse_expected(SyntaxKind::CloseParen, ")");
        }
        if self.parse_optional(SyntaxKind::Colon) {
            self.skip_type_annotation();
        }
        let body = self.parse_block();
        self.parse_expected(SyntaxKind::EndKeyword, "end");
        let end = self.prev_end();
        self.arena
            .add(NodeKind::Function { params, body }, Span::new(start, end))
    }

    fn parse_if(&mut self) -> NodeKind {
        self.next_token();
        let mut clauses = Vec::new();
        let condition = self.parse_expression();
        self.parse_expected(SyntaxKind::ThenKeyword, "then");
        let block = self.parse_block();
        clauses.push((condition, block));

        let mut else_block = NodeIndex::NONE;
        loop {
            if self.parse_optional(SyntaxKind::ElseifKeyword) {
                let condition = self.parse_expression();
                self.parse_expected(SyntaxKind::ThenKeyword, "then");
                let block = self.parse_block();
                clauses.push((condition, block));
            } else if self.parse_optional(SyntaxKind::ElseKeyword) {
                else_block = self.parse_block();
                break;
            } else {
                break;
            }
        }
        self.parse_expected(SyntaxKind::EndKeyword, "end");
        NodeKind::If {
            clauses,
            else_block,
        }
    }

    fn parse_for(&mut self) -> NodeKind {
        self.next_token();
        let mut names = vec![self.parse_binding_name()];
        let header = if self.parse_optional(SyntaxKind::Equals) {
            self.parse_expression_list()
        } else {
            while self.parse_optional(SyntaxKind::Comma) {
                names.push(self.parse_binding_name());
            }
            self.parse_expected(SyntaxKind::InKeyword, "in");
            self.parse_expression_list()
        };
        self.parse_expected(SyntaxKind::DoKeyword, "do");
        let body = self.parse_block();
        self.parse_expected(SyntaxKind::EndKeyword, "end");
        NodeKind::For {
            names,
            header,
            body,
        }
    }

    fn parse_expression_or_assignment(&mut self, start: u32) -> NodeIndex {
        let first = self.parse_suffixed_expression();
        if matches!(
            self.token(),
            SyntaxKind::Equals | SyntaxKind::CompoundAssign | SyntaxKind::Comma
        ) {
            let mut targets = vec![first];
            while self.parse_optional(SyntaxKind::Comma) {
                targets.push(self.parse_suffixed_expression());
            }
            if !self.parse_optional(SyntaxKind::CompoundAssign) {
                self.parse_expected(SyntaxKind::Equals, "=");
            }
            let values = self.parse_expression_list();
            let end = self.prev_end();
            return self
                .arena
                .add(NodeKind::Assign { targets, values }, Span::new(start, end));
        }

        let is_call = matches!(self.arena.kind(first), Some(NodeKind::Call { .. }));
        if !is_call && !matches!(self.arena.kind(first), Some(NodeKind::Error)) {
            self.parse_error_at_current_token("'='");
        }
        let end = self.prev_end();
        self.arena
            .add(NodeKind::ExpressionStatement { expression: first }, Span::new(start, end))
    }

    // =========================================================================
    // Expressions
    // =========================================================================

    fn parse_expression_list(&mut self) -> Vec<NodeIndex> {
        let mut values = vec![self.parse_expression()];
        while self.parse_optional(SyntaxKind::Comma) {
            values.push(self.parse_expression());
        }
        values
    }

    pub fn parse_expression(&mut self) -> NodeIndex {
        self.parse_binary_expression(0)
    }

    fn parse_binary_expression(&mut self, min_precedence: u8) -> NodeIndex {
        if self.expr_depth >= MAX_EXPR_PARSE_DEPTH {
            self.parse_error_at_current_token("shallower expression");
            let error = self.error_node();
            self.next_token();
            return error;
        }
        self.expr_depth += 1;

        let start = self.current().span.start;
        let mut left = match self.token() {
            SyntaxKind::NotKeyword | SyntaxKind::Minus | SyntaxKind::Hash => {
                let op = match self.next_token().kind {
                    SyntaxKind::NotKeyword => UnaryOp::Not,
                    SyntaxKind::Minus => UnaryOp::Minus,
                    _ => UnaryOp::Len,
                };
                let operand = self.parse_binary_expression(UNARY_PRECEDENCE);
                let end = self.prev_end();
                self.arena
                    .add(NodeKind::Unary { op, operand }, Span::new(start, end))
            }
            _ => self.parse_simple_expression(),
        };

        while let Some((op, left_power, right_power)) = binary_precedence(self.token()) {
            if left_power <= min_precedence {
                break;
            }
            self.next_token();
            let right = self.parse_binary_expression(right_power);
            let end = self.prev_end();
            left = self
                .arena
                .add(NodeKind::Binary { op, left, right }, Span::new(start, end));
        }

        self.expr_depth -= 1;
        left
    }

    fn parse_simple_expression(&mut self) -> NodeIndex {
        let token = self.current().clone();
        let kind = match token.kind {
            SyntaxKind::NilKeyword => NodeKind::NilLiteral,
            SyntaxKind::TrueKeyword => NodeKind::BooleanLiteral { value: true },
            SyntaxKind::FalseKeyword => NodeKind::BooleanLiteral { value: false },
            SyntaxKind::NumberLiteral => NodeKind::NumberLiteral { text: token.value },
            SyntaxKind::StringLiteral => NodeKind::StringLiteral { value: token.value },
            SyntaxKind::DotDotDot => NodeKind::Vararg,
            SyntaxKind::OpenBrace => return self.parse_table(),
            SyntaxKind::FunctionKeyword => {
                self.next_token();
                return self.parse_function_body(token.span.start, false);
            }
            _ => return self.parse_suffixed_expression(),
        };
        self.next_token();
        self.arena.add(kind, token.span)
    }

    fn parse_primary_expression(&mut self) -> NodeIndex {
        let token = self.current().clone();
        match token.kind {
            SyntaxKind::Identifier => {
                self.next_token();
                self.arena
                    .add(NodeKind::Identifier { name: token.value }, token.span)
            }
            SyntaxKind::OpenParen => {
                self.next_token();
                let expression = self.parse_expression();
                self.parse_expected(SyntaxKind::CloseParen, ")");
                let end = self.prev_end();
                self.arena
                    .add(NodeKind::Paren { expression }, Span::new(token.span.start, end))
            }
            _ => {
                self.parse_error_at_current_token("expression");
                let error = self.error_node();
                if !self.is_block_end() {
                    self.next_token();
                }
                error
            }
        }
    }

    fn parse_suffixed_expression(&mut self) -> NodeIndex {
        let start = self.current().span.start;
        let mut expr = self.parse_primary_expression();
        loop {
            let kind = match self.token() {
                SyntaxKind::Dot => {
                    self.next_token();
                    let name = self.parse_identifier_name();
                    NodeKind::Member { object: expr, name }
                }
                SyntaxKind::OpenBracket => {
                    self.next_token();
                    let key = self.parse_expression();
                    self.parse_expected(SyntaxKind::CloseBracket, "]");
                    NodeKind::Index { object: expr, key }
                }
                SyntaxKind::Colon => {
                    self.next_token();
                    let method = self.parse_identifier_name();
                    let args = self.parse_call_arguments();
                    NodeKind::Call {
                        callee: expr,
                        method: Some(method),
                        args,
                    }
                }
                SyntaxKind::OpenParen | SyntaxKind::StringLiteral | SyntaxKind::OpenBrace => {
                    let args = self.parse_call_arguments();
                    NodeKind::Call {
                        callee: expr,
                        method: None,
                        args,
                    }
                }
                _ => return expr,
            };
            let end = self.prev_end();
            expr = self.arena.add(kind, Span::new(start, end));
        }
    }

    /// `(exprs)`, a single string literal, or a single table constructor.
    fn parse_call_arguments(&mut self) -> Vec<NodeIndex> {
        match self.token() {
            SyntaxKind::StringLiteral => {
                let token = self.next_token();
                vec![self
                    .arena
                    .add(NodeKind::StringLiteral { value: token.value }, token.span)]
            }
            SyntaxKind::OpenBrace => vec![self.parse_table()],
            _ => {
                if !self.parse_expected(SyntaxKind::OpenParen, "(") {
                    return Vec::new();
                }
                let args = if self.is_token(SyntaxKind::CloseParen) {
                    Vec::new()
                } else {
                    self.parse_expression_list()
                };
                self.parse_expected(SyntaxKind::CloseParen, ")");
                args
            }
        }
    }

    fn parse_table(&mut self) -> NodeIndex {
        let start = self.current().span.start;
        self.parse_expected(SyntaxKind::OpenBrace, "{");
        let mut items = Vec::new();
        while !self.is_token(SyntaxKind::CloseBrace) && !self.is_token(SyntaxKind::EndOfFile) {
            let before = self.pos;
            if self.parse_optional(SyntaxKind::OpenBracket) {
                let _key = self.parse_expression();
                self.parse_expected(SyntaxKind::CloseBracket, "]");
                self.parse_expected(SyntaxKind::Equals, "=");
            } else if self.is_token(SyntaxKind::Identifier) && self.peek(1) == SyntaxKind::Equals {
                self.next_token();
                self.next_token();
            }
            items.push(self.parse_expression());
            if !self.parse_optional(SyntaxKind::Comma) && !self.parse_optional(SyntaxKind::Semicolon) {
                break;
            }
            if self.pos == before {
                self.next_token();
            }
        }
        self.parse_expected(SyntaxKind::CloseBrace, "}");
        let end = self.prev_end();
        self.arena.add(NodeKind::Table { items }, Span::new(start, end))
    }
}

/// Parse a script into an arena.
pub fn parse_source(file_name: &str, source: &str) -> ParseResult {
    let mut parser = ParserState::new(file_name, source);
    let root = parser.parse_chunk();
    parser.into_result(root)
}

#[cfg(test)]
#[path = "../tests/parser_tests.rs"]
mod tests;
