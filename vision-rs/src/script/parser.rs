//! Recursive-descent parser.
//!
//! ```text
//! expression := DATA ';'?
//!             | primary suffix? ';'?
//! primary    := IDENTIFIER | CONTENT | '[' expression* ']' | '{' expression* '}'
//!             | '(' expression* ')'
//! suffix     := ('[' IDENTIFIER ']')? ('(' expression* ')')* ('{' expression* '}')*
//! ```
//!
//! A primary followed directly by `[`, `(` or `{` becomes the determiner of a
//! [`Compound`].  Empty parentheses mark a call without adding a data section.

use std::rc::Rc;

use crate::error::{Error, Location, Result};

use super::balance::check_balance;
use super::compound::Compound;
use super::expr::Expr;
use super::token::{Position, Token, TokenKind};
use super::value::parse_number_prefix;

/// Parse a token list into the program's root block (position `0:0`).
///
/// In `indent_mode` INDENT/DEDENT act as `{`/`}`; otherwise they are dropped.
pub fn parse(tokens: Vec<Token>, indent_mode: bool) -> Result<Rc<Expr>> {
    let tokens: Vec<Token> = if indent_mode {
        check_balance(&tokens)?;
        tokens
            .into_iter()
            .map(|mut t| {
                t.kind = match t.kind {
                    TokenKind::Indent => TokenKind::LeftBrace,
                    TokenKind::Dedent => TokenKind::RightBrace,
                    kind => kind,
                };
                t
            })
            .collect()
    } else {
        let tokens: Vec<Token> = tokens
            .into_iter()
            .filter(|t| !matches!(t.kind, TokenKind::Indent | TokenKind::Dedent))
            .collect();
        check_balance(&tokens)?;
        tokens
    };

    let mut parser = Parser::new(tokens);
    match parser.program() {
        Ok(items) => Ok(Expr::block(items, Position::default())),
        Err(e) => Err(e.at(parser.location())),
    }
}

/// Deepest bracket nesting the parser accepts.
pub const MAX_NESTING: usize = 256;

// ── Parser ────────────────────────────────────────────────────────────────────

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    /// Brackets currently open.
    depth: usize,
}

impl Parser {
    fn new(tokens: Vec<Token>) -> Self {
        Parser { tokens, pos: 0, depth: 0 }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    /// Where the parser currently stands, for error reports.
    fn location(&self) -> Location {
        match self.peek() {
            Some(t) => Location::At(t.pos),
            None => Location::EndOfFile,
        }
    }

    fn accept(&mut self, kind: TokenKind) -> Option<Token> {
        match self.peek() {
            Some(t) if t.kind == kind => {
                let t = t.clone();
                self.pos += 1;
                Some(t)
            }
            _ => None,
        }
    }

    fn expect(&mut self, kind: TokenKind) -> Result<Token> {
        if let Some(t) = self.accept(kind) {
            return Ok(t);
        }
        Err(Error::msg(match self.peek() {
            Some(t) => format!("Expected {kind} before {}.", t.kind),
            None => format!("Expected {kind}."),
        }))
    }

    // ── Grammar ───────────────────────────────────────────────────────────────

    fn program(&mut self) -> Result<Vec<Rc<Expr>>> {
        let mut items = Vec::new();
        while !self.at_end() {
            items.push(self.expect_expression()?);
        }
        Ok(items)
    }

    fn expect_expression(&mut self) -> Result<Rc<Expr>> {
        if let Some(e) = self.accept_expression()? {
            return Ok(e);
        }
        Err(Error::msg(match self.peek() {
            Some(t) => format!("Expected expression before {}.", t.kind),
            None => "Expected expression before end of file.".to_string(),
        }))
    }

    /// Expressions up to `closer`, which is consumed.
    fn sequence(&mut self, closer: TokenKind, what: &str, open: &Token) -> Result<Vec<Rc<Expr>>> {
        if self.depth >= MAX_NESTING {
            return Err(Error::msg(format!("Nesting too deep in {what} beginning at {}.", open.pos)));
        }
        self.depth += 1;
        let items = self.sequence_items(closer, what, open);
        self.depth -= 1;
        items
    }

    fn sequence_items(&mut self, closer: TokenKind, what: &str, open: &Token) -> Result<Vec<Rc<Expr>>> {
        let mut items = Vec::new();
        loop {
            if self.accept(closer).is_some() {
                return Ok(items);
            }
            if self.at_end() {
                return Err(Error::msg(format!(
                    "Unexpected end of file in {what} beginning at {}.",
                    open.pos
                )));
            }
            items.push(self.expect_expression()?);
        }
    }

    fn accept_expression(&mut self) -> Result<Option<Rc<Expr>>> {
        // Numbers never take sections.
        if let Some(t) = self.accept(TokenKind::Data) {
            self.accept(TokenKind::Semicolon);
            return Ok(Some(Expr::data(parse_number_prefix(&t.text), t.pos)));
        }

        let primary = if let Some(t) = self.accept(TokenKind::Identifier) {
            Expr::identifier(t.text, t.pos)
        } else if let Some(t) = self.accept(TokenKind::Content) {
            Expr::content(t.text, t.pos)
        } else if let Some(open) = self.accept(TokenKind::LeftBracket) {
            let items = self.sequence(TokenKind::RightBracket, "block", &open)?;
            Expr::block(items, open.pos)
        } else if let Some(open) = self.accept(TokenKind::LeftBrace) {
            let items = self.sequence(TokenKind::RightBrace, "block", &open)?;
            Expr::block(items, open.pos)
        } else if let Some(open) = self.accept(TokenKind::LeftParen) {
            let items = self.sequence(TokenKind::RightParen, "group", &open)?;
            Rc::new(Expr::Group { items, pos: open.pos })
        } else {
            return Ok(None);
        };

        let starts_suffix = matches!(
            self.peek().map(|t| t.kind),
            Some(TokenKind::LeftBracket | TokenKind::LeftParen | TokenKind::LeftBrace)
        );
        if !starts_suffix {
            self.accept(TokenKind::Semicolon);
            return Ok(Some(primary));
        }

        let pos = primary.position();
        let mut compound = Compound::new(primary, pos);

        if self.accept(TokenKind::LeftBracket).is_some() {
            compound.tag = Some(self.expect(TokenKind::Identifier)?.text);
            self.expect(TokenKind::RightBracket)?;
        }

        while let Some(open) = self.accept(TokenKind::LeftParen) {
            let items = self.sequence(TokenKind::RightParen, "data block", &open)?;
            if !items.is_empty() {
                compound.data.push(items);
            }
        }

        while let Some(open) = self.accept(TokenKind::LeftBrace) {
            let items = self.sequence(TokenKind::RightBrace, "content block", &open)?;
            compound.content.push(items);
        }

        self.accept(TokenKind::Semicolon);
        Ok(Some(Rc::new(Expr::Compound(compound))))
    }
}
