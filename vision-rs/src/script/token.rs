//! Tokens produced by the lexer.

use std::fmt;

// ── Position ──────────────────────────────────────────────────────────────────

/// A 1-based line/column pair.  `0:0` marks synthesized nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub const fn new(line: usize, column: usize) -> Self {
        Position { line, column }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

// ── TokenKind ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Identifier,
    /// `"content"`, `'content'`, or a heredoc.
    Content,
    /// `1`, `2.0`
    Data,
    LeftBracket,
    RightBracket,
    LeftParen,
    RightParen,
    LeftBrace,
    RightBrace,
    Semicolon,
    Indent,
    Dedent,
}

impl TokenKind {
    /// The closer that balances this opener, if it is one.
    pub fn closer(self) -> Option<TokenKind> {
        match self {
            TokenKind::LeftBracket => Some(TokenKind::RightBracket),
            TokenKind::LeftParen => Some(TokenKind::RightParen),
            TokenKind::LeftBrace => Some(TokenKind::RightBrace),
            TokenKind::Indent => Some(TokenKind::Dedent),
            _ => None,
        }
    }

    pub fn is_closer(self) -> bool {
        matches!(
            self,
            TokenKind::RightBracket | TokenKind::RightParen | TokenKind::RightBrace | TokenKind::Dedent
        )
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TokenKind::Identifier => "identifier",
            TokenKind::Content => "content",
            TokenKind::Data => "data",
            TokenKind::LeftBracket => "\"[\"",
            TokenKind::RightBracket => "\"]\"",
            TokenKind::LeftParen => "\"(\"",
            TokenKind::RightParen => "\")\"",
            TokenKind::LeftBrace => "\"{\"",
            TokenKind::RightBrace => "\"}\"",
            TokenKind::Semicolon => "\";\"",
            TokenKind::Indent => "indent",
            TokenKind::Dedent => "dedent",
        };
        f.write_str(s)
    }
}

// ── Token ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    /// Literal text for identifiers, content and data; empty for delimiters.
    pub text: String,
    pub pos: Position,
}

impl Token {
    pub fn new(kind: TokenKind, pos: Position) -> Self {
        Token { kind, text: String::new(), pos }
    }

    pub fn with_text(kind: TokenKind, text: impl Into<String>, pos: Position) -> Self {
        Token { kind, text: text.into(), pos }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positions_display_one_based_wording() {
        assert_eq!(Position::new(3, 7).to_string(), "line 3, column 7");
        assert_eq!(Position::default(), Position::new(0, 0));
    }

    #[test]
    fn kind_display_matches_error_wording() {
        assert_eq!(TokenKind::LeftParen.to_string(), "\"(\"");
        assert_eq!(TokenKind::Dedent.to_string(), "dedent");
        assert_eq!(TokenKind::Identifier.to_string(), "identifier");
    }

    #[test]
    fn openers_know_their_closers() {
        assert_eq!(TokenKind::Indent.closer(), Some(TokenKind::Dedent));
        assert_eq!(TokenKind::Semicolon.closer(), None);
        assert!(TokenKind::RightBrace.is_closer());
    }
}
