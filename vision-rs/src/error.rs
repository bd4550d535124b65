//! Error type shared by the scanner, parser, evaluator and frontend.
//!
//! Fatal errors accumulate context as they propagate: the scanner and parser
//! wrap with the source position, each enclosing compound wraps with its own
//! position, and the frontend wraps with the file name.  The rendered message
//! therefore reads outermost-first, innermost-last.

use std::fmt;

use thiserror::Error;

use crate::script::token::Position;

/// Where in the source a scanner or parser error was detected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Location {
    At(Position),
    EndOfFile,
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::At(pos) => write!(f, "{pos}"),
            Location::EndOfFile => write!(f, "end of file"),
        }
    }
}

/// Errors raised while scanning, parsing or evaluating a Vision program.
#[derive(Debug, Error)]
pub enum Error {
    /// A plain fatal condition, e.g. a lexer or parser diagnostic.
    #[error("{0}")]
    Message(String),

    /// Raised by the `error` builtin.
    #[error("Error: {0}")]
    User(String),

    #[error("Division by zero.")]
    DivisionByZero,

    /// A keyword compound with the wrong section shape.
    #[error("Invalid use of \"{0}\".")]
    InvalidUse(String),

    #[error("Unable to find library \"{0}\".")]
    ModuleNotFound(String),

    #[error("Module import depth exceeded while loading \"{0}\".")]
    ImportDepth(String),

    #[error("Template recursion depth exceeded in \"{0}\".")]
    CallDepth(String),

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    /// An engine bug: a container node was coerced outside evaluation.
    #[error("{0}")]
    Internal(String),

    #[error("At {location}:\n{inner}")]
    At {
        location: Location,
        #[source]
        inner: Box<Error>,
    },

    #[error("In {what} expression at {position}:\n{inner}")]
    InCompound {
        what: String,
        position: Position,
        #[source]
        inner: Box<Error>,
    },

    /// Frontend context: `In <file>` or `On standard input`.
    #[error("{origin}:\n{inner}")]
    InSource {
        origin: String,
        #[source]
        inner: Box<Error>,
    },
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn msg(message: impl Into<String>) -> Self {
        Error::Message(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Error::Internal(message.into())
    }

    pub fn at(self, location: Location) -> Self {
        Error::At { location, inner: Box::new(self) }
    }

    pub fn in_compound(self, what: impl Into<String>, position: Position) -> Self {
        Error::InCompound { what: what.into(), position, inner: Box::new(self) }
    }

    pub fn in_source(self, origin: impl Into<String>) -> Self {
        Error::InSource { origin: origin.into(), inner: Box::new(self) }
    }

    /// The error at the bottom of the wrapping chain.
    pub fn innermost(&self) -> &Error {
        match self {
            Error::At { inner, .. }
            | Error::InCompound { inner, .. }
            | Error::InSource { inner, .. } => inner.innermost(),
            other => other,
        }
    }

    /// `true` when the root cause is an engine bug rather than bad input.
    pub fn is_internal(&self) -> bool {
        matches!(self.innermost(), Error::Internal(_))
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
