//! Vision: a template language for generating text, with a CGI frontend.
//!
//! See [`script`] for the language itself.

pub mod cgi;
pub mod cli;
pub mod config;
pub mod error;
pub mod host;
pub mod script;

pub use error::{Error, Result};
