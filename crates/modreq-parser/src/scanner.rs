//! Tokenizer for the Luau script subset.

use modreq_common::Span;
use modreq_common::diagnostics::diagnostic_codes;

/// Token kinds produced by the [`Scanner`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SyntaxKind {
    Identifier,
    StringLiteral,
    NumberLiteral,

    // Keywords
    AndKeyword,
    BreakKeyword,
    ContinueKeyword,
    DoKeyword,
    ElseKeyword,
    ElseifKeyword,
    EndKeyword,
    FalseKeyword,
    ForKeyword,
    FunctionKeyword,
    IfKeyword,
    InKeyword,
    LocalKeyword,
    NilKeyword,
    NotKeyword,
    OrKeyword,
    RepeatKeyword,
    ReturnKeyword,
    ThenKeyword,
    TrueKeyword,
    UntilKeyword,
    WhileKeyword,

    // Punctuation
    Dot,
    DotDot,
    DotDotDot,
    Colon,
    Comma,
    Semicolon,
    OpenParen,
    CloseParen,
    OpenBracket,
    CloseBracket,
    OpenBrace,
    CloseBrace,
    Equals,
    EqualsEquals,
    NotEquals,
    LessThan,
    LessThanEquals,
    GreaterThan,
    GreaterThanEquals,
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Caret,
    Hash,
    /// Compound assignment (`+=`, `..=`, ...); treated like `=` by the parser.
    CompoundAssign,

    Unknown,
    EndOfFile,
}

impl SyntaxKind {
    fn keyword(text: &str) -> Option<SyntaxKind> {
        Some(match text {
            "and" => SyntaxKind::AndKeyword,
            "break" => SyntaxKind::BreakKeyword,
            "continue" => SyntaxKind::ContinueKeyword,
            "do" => SyntaxKind::DoKeyword,
            "else" => SyntaxKind::ElseKeyword,
            "elseif" => SyntaxKind::ElseifKeyword,
            "end" => SyntaxKind::EndKeyword,
            "false" => SyntaxKind::FalseKeyword,
            "for" => SyntaxKind::ForKeyword,
            "function" => SyntaxKind::FunctionKeyword,
            "if" => SyntaxKind::IfKeyword,
            "in" => SyntaxKind::InKeyword,
            "local" => SyntaxKind::LocalKeyword,
            "nil" => SyntaxKind::NilKeyword,
            "not" => SyntaxKind::NotKeyword,
            "or" => SyntaxKind::OrKeyword,
            "repeat" => SyntaxKind::RepeatKeyword,
            "return" => SyntaxKind::ReturnKeyword,
            "then" => SyntaxKind::ThenKeyword,
            "true" => SyntaxKind::TrueKeyword,
            "until" => SyntaxKind::UntilKeyword,
            "while" => SyntaxKind::WhileKeyword,
            _ => return None,
        })
    }
}

/// A scanned token. `value` holds identifier text, the unescaped contents of
/// string literals, the raw text of numbers and the source text otherwise.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Token {
    pub kind: SyntaxKind,
    pub span: Span,
    pub value: String,
}

/// A scanner-level error: span, diagnostic code and message arguments.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScanError {
    pub span: Span,
    pub code: u32,
    pub args: Vec<String>,
}

pub struct Scanner<'a> {
    source: &'a str,
    bytes: &'a [u8],
    pos: usize,
    errors: Vec<ScanError>,
}

impl<'a> Scanner<'a> {
    pub fn new(source: &'a str) -> Self {
        Scanner {
            source,
            bytes: source.as_bytes(),
            pos: 0,
            errors: Vec::new(),
        }
    }

    /// Scan the whole source. The last token is always `EndOfFile`.
    pub fn scan_all(mut self) -> (Vec<Token>, Vec<ScanError>) {
        let mut tokens = Vec::new();
        loop {
            let token = self.scan();
            let done = token.kind == SyntaxKind::EndOfFile;
            tokens.push(token);
            if done {
                break;
            }
        }
        (tokens, self.errors)
    }

    fn peek_at(&self, offset: usize) -> u8 {
        self.bytes.get(self.pos + offset).copied().unwrap_or(0)
    }

    fn token(&self, kind: SyntaxKind, start: usize) -> Token {
        Token {
            kind,
            span: Span::new(start as u32, self.pos as u32),
            value: self.source[start..self.pos].to_string(),
        }
    }

    fn skip_trivia(&mut self) {
        loop {
            match self.peek_at(0) {
                b' ' | b'\t' | b'\r' | b'\n' => self.pos += 1,
                b'-' if self.peek_at(1) == b'-' => {
                    self.pos += 2;
                    if let Some(level) = self.long_bracket_level() {
                        self.skip_long_bracket(level);
                    } else {
                        while !matches!(self.peek_at(0), b'\n' | 0) {
                            self.pos += 1;
                        }
                    }
                }
                _ => return,
            }
        }
    }

    /// If positioned at `[` `=`* `[`, returns the number of `=` signs.
    fn long_bracket_level(&self) -> Option<usize> {
        if self.peek_at(0) != b'[' {
            return None;
        }
        let mut level = 0;
        while self.peek_at(1 + level) == b'=' {
            level += 1;
        }
        (self.peek_at(1 + level) == b'[').then_some(level)
    }

    /// Skips a long bracket starting at the opening `[`, returning its contents.
    fn skip_long_bracket(&mut self, level: usize) -> Option<String> {
        let start = self.pos;
        self.pos += level + 2;
        let content_start = self.pos;
        while self.pos < self.bytes.len() {
            if self.peek_at(0) == b']'
                && (0..level).all(|i| self.peek_at(1 + i) == b'=')
                && self.peek_at(1 + level) == b']'
            {
                let content = self.source[content_start..self.pos].to_string();
                self.pos += level + 2;
                return Some(content);
            }
            self.pos += 1;
        }
        self.errors.push(ScanError {
            span: Span::new(start as u32, self.pos as u32),
            code: diagnostic_codes::UNTERMINATED_STRING,
            args: Vec::new(),
        });
        None
    }

    pub fn scan(&mut self) -> Token {
        self.skip_trivia();
        let start = self.pos;
        let Some(&byte) = self.bytes.get(self.pos) else {
            return self.token(SyntaxKind::EndOfFile, start);
        };

        if byte == b'_' || byte.is_ascii_alphabetic() {
            while self.peek_at(0) == b'_' || self.peek_at(0).is_ascii_alphanumeric() {
                self.pos += 1;
            }
            let text = &self.source[start..self.pos];
            let kind = SyntaxKind::keyword(text).unwrap_or(SyntaxKind::Identifier);
            return self.token(kind, start);
        }

        if byte.is_ascii_digit() || (byte == b'.' && self.peek_at(1).is_ascii_digit()) {
            return self.scan_number(start);
        }

        if byte == b'"' || byte == b'\'' {
            return self.scan_quoted_string(start, byte);
        }

        if let Some(level) = self.long_bracket_level() {
            let content = self.skip_long_bracket(level).unwrap_or_default();
            return Token {
                kind: SyntaxKind::StringLiteral,
                span: Span::new(start as u32, self.pos as u32),
                value: content,
            };
        }

        let (kind, width) = match (byte, self.peek_at(1), self.peek_at(2)) {
            (b'.', b'.', b'.') => (SyntaxKind::DotDotDot, 3),
            (b'.', b'.', b'=') => (SyntaxKind::CompoundAssign, 3),
            (b'.', b'.', _) => (SyntaxKind::DotDot, 2),
            (b'.', _, _) => (SyntaxKind::Dot, 1),
            (b'=', b'=', _) => (SyntaxKind::EqualsEquals, 2),
            (b'=', _, _) => (SyntaxKind::Equals, 1),
            (b'~', b'=', _) => (SyntaxKind::NotEquals, 2),
            (b'<', b'=', _) => (SyntaxKind::LessThanEquals, 2),
            (b'<', _, _) => (SyntaxKind::LessThan, 1),
            (b'>', b'=', _) => (SyntaxKind::GreaterThanEquals, 2),
            (b'>', _, _) => (SyntaxKind::GreaterThan, 1),
            (b'+' | b'-' | b'*' | b'/' | b'%' | b'^', b'=', _) => (SyntaxKind::CompoundAssign, 2),
            (b'+', _, _) => (SyntaxKind::Plus, 1),
            (b'-', _, _) => (SyntaxKind::Minus, 1),
            (b'*', _, _) => (SyntaxKind::Star, 1),
            (b'/', _, _) => (SyntaxKind::Slash, 1),
            (b'%', _, _) => (SyntaxKind::Percent, 1),
            (b'^', _, _) => (SyntaxKind::Caret, 1),
            (b'#', _, _) => (SyntaxKind::Hash, 1),
            (b':', _, _) => (SyntaxKind::Colon, 1),
            (b',', _, _) => (SyntaxKind::Comma, 1),
            (b';', _, _) => (SyntaxKind::Semicolon, 1),
            (b'(', _, _) => (SyntaxKind::OpenParen, 1),
            (b')', _, _) => (SyntaxKind::CloseParen, 1),
            (b'[', _, _) => (SyntaxKind::OpenBracket, 1),
            (b']', _, _) => (SyntaxKind::CloseBracket, 1),
            (b'{', _, _) => (SyntaxKind::OpenBrace, 1),
            (b'}', _, _) => (SyntaxKind::CloseBrace, 1),
            _ => {
                // Consume a whole UTF-8 character so spans stay on boundaries.
                let width = self.source[start..].chars().next().map_or(1, char::len_utf8);
                (SyntaxKind::Unknown, width)
            }
        };
        self.pos += width;
        self.token(kind, start)
    }

    fn scan_number(&mut self, start: usize) -> Token {
        if self.peek_at(0) == b'0' && matches!(self.peek_at(1), b'x' | b'X' | b'b' | b'B') {
            self.pos += 2;
            while self.peek_at(0).is_ascii_hexdigit() || self.peek_at(0) == b'_' {
                self.pos += 1;
            }
            return self.token(SyntaxKind::NumberLiteral, start);
        }
        while matches!(self.peek_at(0), b'0'..=b'9' | b'.' | b'_') {
            self.pos += 1;
        }
        if matches!(self.peek_at(0), b'e' | b'E') {
            self.pos += 1;
            if matches!(self.peek_at(0), b'+' | b'-') {
                self.pos += 1;
            }
            while self.peek_at(0).is_ascii_digit() {
                self.pos += 1;
            }
        }
        self.token(SyntaxKind::NumberLiteral, start)
    }

    fn scan_quoted_string(&mut self, start: usize, quote: u8) -> Token {
        self.pos += 1;
        let mut value = String::new();
        loop {
            match self.bytes.get(self.pos).copied() {
                None | Some(b'\n') => {
                    self.errors.push(ScanError {
                        span: Span::new(start as u32, self.pos as u32),
                        code: diagnostic_codes::UNTERMINATED_STRING,
                        args: Vec::new(),
                    });
                    break;
                }
                Some(b'\\') => {
                    self.pos += 1;
                    let escaped = match self.peek_at(0) {
                        b'n' => '\n',
                        b't' => '\t',
                        b'r' => '\r',
                        b'0' => '\0',
                        b'\\' => '\\',
                        b'"' => '"',
                        b'\'' => '\'',
                        b'\n' => '\n',
                        _ => {
                            // Unknown escape: keep the character as written.
                            let Some(ch) = self.source[self.pos..].chars().next() else {
                                continue;
                            };
                            self.pos += ch.len_utf8();
                            value.push(ch);
                            continue;
                        }
                    };
                    self.pos += 1;
                    value.push(escaped);
                }
                Some(b) if b == quote => {
                    self.pos += 1;
                    break;
                }
                Some(_) => {
                    let ch = self.source[self.pos..].chars().next().unwrap_or('\0');
                    self.pos += ch.len_utf8();
                    value.push(ch);
                }
            }
        }
        Token {
            kind: SyntaxKind::StringLiteral,
            span: Span::new(start as u32, self.pos as u32),
            value,
        }
    }
}

#[cfg(test)]
#[path = "../tests/scanner_tests.rs"]
mod tests;
