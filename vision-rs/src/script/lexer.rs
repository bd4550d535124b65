//! Vision lexer.
//!
//! A character-at-a-time state machine that turns source text into a flat
//! [`Token`] list.  Besides the usual literals and delimiters it tracks the
//! indentation of each line, emitting `Indent`/`Dedent` tokens that the parser
//! either treats as braces or discards.
//!
//! Literal forms:
//!
//! | Form | Token |
//! |------|-------|
//! | `"text"`, `'text'` | content (`\` escapes the quote or a backslash) |
//! | `<tag` newline … newline `tag>` | content (heredoc; the closing line's indent is dropped) |
//! | `<` newline … newline `>` | content (anonymous heredoc) |
//! | `12`, `3.25` | data |
//! | `# …` | line comment |
//! | `#: … :#` | block comment |

use crate::error::{Error, Location, Result};

use super::token::{Position, Token, TokenKind};

/// Characters that end an identifier (besides whitespace).
const IDENTIFIER_STOPS: &str = "'\"<[](){};#";

/// Scan `src` into tokens, expanding tabs to `tab_width` columns.
pub fn tokenize(src: &str, tab_width: usize) -> Result<Vec<Token>> {
    Lexer::new(src, tab_width).run()
}

// ── State ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Normal,
    Identifier,
    Double,
    Single,
    /// Just after `<`: reading the heredoc tag.
    HeredocBegin,
    Heredoc,
    /// Leading whitespace of a heredoc line that may close the heredoc.
    HeredocIndent,
    /// Reading what may be the closing tag.
    HeredocEnd,
    Integer,
    Fraction,
    CommentBegin,
    Comment,
    CommentBlock,
}

impl State {
    /// Whether a newline read in this state starts a line whose indentation
    /// counts.  Lines continuing a string, heredoc or block comment do not.
    fn measures_indent(self) -> bool {
        matches!(
            self,
            State::Normal
                | State::Identifier
                | State::Integer
                | State::Fraction
                | State::CommentBegin
                | State::Comment
        )
    }
}

// ── Lexer ─────────────────────────────────────────────────────────────────────

struct Lexer<'a> {
    chars: std::str::Chars<'a>,
    tab_width: usize,
    line: usize,
    column: usize,
    current: char,
    previous: char,
    at_eof: bool,
    state: State,
    /// Start position of the token being built.
    token_pos: Position,
    /// Width of the current line's leading whitespace so far.
    indent: usize,
    in_indent: bool,
    indents: Vec<usize>,
    /// Pending backslash inside a quoted string.
    escaped: bool,
    text: String,
    heredoc_begin: String,
    heredoc_indent: String,
    heredoc_end: String,
    tokens: Vec<Token>,
}

impl<'a> Lexer<'a> {
    fn new(src: &'a str, tab_width: usize) -> Self {
        Lexer {
            chars: src.chars(),
            tab_width: tab_width.max(1),
            line: 1,
            column: 0,
            current: '\0',
            previous: '\0',
            at_eof: false,
            state: State::Normal,
            token_pos: Position::new(1, 1),
            indent: 0,
            in_indent: true,
            indents: vec![0],
            escaped: false,
            text: String::new(),
            heredoc_begin: String::new(),
            heredoc_indent: String::new(),
            heredoc_end: String::new(),
            tokens: Vec::new(),
        }
    }

    fn run(mut self) -> Result<Vec<Token>> {
        match self.scan() {
            Ok(()) => Ok(self.tokens),
            Err(e) => {
                let location = if self.at_eof {
                    Location::EndOfFile
                } else {
                    Location::At(Position::new(self.line, self.column))
                };
                Err(e.at(location))
            }
        }
    }

    /// Read the next character, updating position and indentation.
    /// At end of input a synthetic newline is produced and `false` returned.
    fn advance(&mut self) -> bool {
        self.previous = self.current;
        let Some(c) = self.chars.next() else {
            self.at_eof = true;
            self.current = '\n';
            return false;
        };
        self.current = c;
        if c == '\n' {
            self.line += 1;
            self.column = 0;
            if self.state.measures_indent() {
                self.in_indent = true;
                self.indent = 0;
            }
        } else if c == '\t' {
            self.column += self.tab_width - self.column % self.tab_width;
            if self.in_indent {
                self.indent += self.tab_width;
            }
        } else {
            self.column += 1;
            if self.in_indent && c.is_whitespace() {
                self.indent += 1;
            }
        }
        true
    }

    fn scan(&mut self) -> Result<()> {
        let mut need = true;
        let mut done = false;
        while !done {
            if need && !self.advance() {
                done = true;
            }
            need = self.step()?;
        }

        match self.state {
            State::Double => {
                return Err(Error::msg("Unexpected end of file in double-quoted string."))
            }
            State::Single => {
                return Err(Error::msg("Unexpected end of file in single-quoted string."))
            }
            State::HeredocBegin | State::Heredoc | State::HeredocIndent | State::HeredocEnd => {
                return Err(Error::msg("Unexpected end of file in heredoc."))
            }
            _ => {}
        }

        let end = Position::new(self.line, self.column);
        for _ in 1..self.indents.len() {
            self.tokens.push(Token::new(TokenKind::Dedent, end));
        }
        Ok(())
    }

    fn emit(&mut self, kind: TokenKind) {
        let text = std::mem::take(&mut self.text);
        self.tokens.push(Token::with_text(kind, text, self.token_pos));
    }

    fn punct(&mut self, kind: TokenKind) {
        self.tokens.push(Token::new(kind, self.token_pos));
    }

    /// Compare the finished indent of this line against the level stack.
    fn measure_indent(&mut self) -> Result<()> {
        let top = self.indents.last().copied().unwrap_or(0);
        if self.indent > top {
            self.indents.push(self.indent);
            self.punct(TokenKind::Indent);
            return Ok(());
        }
        while let Some(&level) = self.indents.last() {
            if level == self.indent {
                break;
            }
            self.indents.pop();
            self.punct(TokenKind::Dedent);
        }
        if self.indents.is_empty() {
            return Err(Error::msg("Invalid indentation level."));
        }
        Ok(())
    }

    /// Process `self.current`.  Returns whether the next character is needed
    /// (`false` re-dispatches the same character in the new state).
    fn step(&mut self) -> Result<bool> {
        let c = self.current;
        match self.state {
            State::Normal => {
                self.token_pos = Position::new(self.line, self.column);

                if self.in_indent && !c.is_whitespace() {
                    self.in_indent = false;
                    // Comment lines don't move the indentation level.
                    if c != '#' {
                        self.measure_indent()?;
                    }
                }

                match c {
                    '[' => self.punct(TokenKind::LeftBracket),
                    ']' => self.punct(TokenKind::RightBracket),
                    '(' => self.punct(TokenKind::LeftParen),
                    ')' => self.punct(TokenKind::RightParen),
                    '{' => self.punct(TokenKind::LeftBrace),
                    '}' => self.punct(TokenKind::RightBrace),
                    ';' => self.punct(TokenKind::Semicolon),
                    '"' => {
                        self.escaped = false;
                        self.state = State::Double;
                    }
                    '\'' => {
                        self.escaped = false;
                        self.state = State::Single;
                    }
                    '<' => {
                        self.heredoc_begin.clear();
                        self.state = State::HeredocBegin;
                    }
                    '#' => self.state = State::CommentBegin,
                    c if c.is_whitespace() => {}
                    c if c.is_ascii_digit() => {
                        self.text.push(c);
                        self.state = State::Integer;
                    }
                    c => {
                        self.text.push(c);
                        self.state = State::Identifier;
                    }
                }
            }

            State::CommentBegin => {
                self.state = match c {
                    '\n' => State::Normal,
                    ':' => State::CommentBlock,
                    _ => State::Comment,
                };
            }

            State::Comment => {
                if c == '\n' {
                    self.state = State::Normal;
                }
            }

            State::CommentBlock => {
                if c == '#' && self.previous == ':' {
                    self.state = State::Normal;
                }
            }

            State::Identifier => {
                if c.is_whitespace() || IDENTIFIER_STOPS.contains(c) {
                    self.emit(TokenKind::Identifier);
                    self.state = State::Normal;
                    return Ok(false);
                }
                self.text.push(c);
            }

            State::Double | State::Single => {
                let quote = if self.state == State::Double { '"' } else { '\'' };
                if self.escaped {
                    self.escaped = false;
                    self.text.push(c);
                } else if c == '\\' {
                    self.escaped = true;
                } else if c == quote {
                    self.emit(TokenKind::Content);
                    self.state = State::Normal;
                } else {
                    self.text.push(c);
                }
            }

            State::HeredocBegin => {
                if c.is_alphabetic() {
                    self.heredoc_begin.push(c);
                } else if c == '\n' {
                    self.state = State::Heredoc;
                } else if c == '\r' {
                    // Tolerate CRLF after the tag.
                } else if self.heredoc_begin.is_empty() {
                    // `<`, `<=`, `<>`: an operator name, not a heredoc.
                    self.text.push('<');
                    self.state = State::Identifier;
                    return Ok(false);
                } else {
                    return Err(Error::msg("Invalid heredoc identifier."));
                }
            }

            State::Heredoc => {
                if c == '\n' {
                    self.heredoc_indent.clear();
                    self.state = State::HeredocIndent;
                } else {
                    self.text.push(c);
                }
            }

            State::HeredocIndent => {
                if c == '\n' {
                    // Blank line inside the heredoc.
                    self.text.push('\n');
                    self.text.push_str(&self.heredoc_indent);
                    self.heredoc_indent.clear();
                } else if c.is_whitespace() {
                    self.heredoc_indent.push(c);
                } else if c.is_alphabetic() {
                    self.heredoc_end.clear();
                    self.state = State::HeredocEnd;
                    return Ok(false);
                } else if c == '>' && self.heredoc_begin.is_empty() {
                    self.emit(TokenKind::Content);
                    self.state = State::Normal;
                } else {
                    self.text.push('\n');
                    self.text.push_str(&self.heredoc_indent);
                    self.text.push(c);
                    self.state = State::Heredoc;
                }
            }

            State::HeredocEnd => {
                if c == '>' && self.heredoc_end == self.heredoc_begin {
                    self.emit(TokenKind::Content);
                    self.state = State::Normal;
                } else if c.is_alphabetic() {
                    self.heredoc_end.push(c);
                } else {
                    // Not the closing tag after all: restore what was held back.
                    self.text.push('\n');
                    self.text.push_str(&self.heredoc_indent);
                    self.text.push_str(&self.heredoc_end);
                    if c == '\n' {
                        self.heredoc_indent.clear();
                        self.state = State::HeredocIndent;
                    } else {
                        self.text.push(c);
                        self.state = State::Heredoc;
                    }
                }
            }

            State::Integer => {
                if c.is_ascii_digit() {
                    self.text.push(c);
                } else if c == '.' {
                    self.text.push(c);
                    self.state = State::Fraction;
                } else {
                    self.emit(TokenKind::Data);
                    self.state = State::Normal;
                    return Ok(false);
                }
            }

            State::Fraction => {
                if c.is_ascii_digit() {
                    self.text.push(c);
                } else if self.text.ends_with('.') {
                    return Err(Error::msg("Invalid floating-point number."));
                } else {
                    self.emit(TokenKind::Data);
                    self.state = State::Normal;
                    return Ok(false);
                }
            }
        }
        Ok(true)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
