//! The Vision template language.
//!
//! A program is a sequence of expressions evaluated left to right; each one
//! contributes text (or numbers) to the output.  Pipeline:
//!
//! | Stage | Module |
//! |---|---|
//! | characters → tokens | [`lexer`] |
//! | bracket checking | [`balance`] |
//! | tokens → tree | [`parser`] |
//! | evaluation | [`expr`], [`compound`], [`context`] |
//! | whole programs, modules | [`interp`] |
//!
//! # Quick start
//!
//! ```rust
//! use vision::config::Options;
//! use vision::script::Interpreter;
//!
//! let mut interp = Interpreter::new(Options::default());
//! let page = interp.run(r#"def[twice]{x}{x x} twice{"ab"} +(2)(3)"#).unwrap();
//! assert_eq!(page.body, "abab5");
//! ```

pub mod balance;
pub mod builtins;
pub mod compound;
pub mod context;
pub mod expr;
pub mod interp;
pub mod lexer;
pub mod parser;
pub mod signature;
pub mod token;
pub mod value;

pub use context::Context;
pub use expr::Expr;
pub use interp::{Interpreter, Rendered};
pub use lexer::tokenize;
pub use parser::parse;
pub use signature::Signature;
pub use value::{List, Value};
