//! Command-line argument parsing.
//!
//! Usage:
//!   vision [-h] [-i] [-p] [-s] [-t SIZE] [-I DIR]... (FILENAME | -)
//!
//! `-h` selects head-only output, so clap's short help flag is disabled and
//! help is available as `--help` only.

use std::fmt;
use std::path::PathBuf;

use clap::{ArgAction, Parser};

use crate::config::{Options, RunMode};

#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(name = "vision", version, about = "Render a Vision template", disable_help_flag = true)]
pub struct CliArgs {
    /// Output only the header buffer
    #[arg(short = 'h', long = "head")]
    pub head: bool,

    /// Treat indentation as equivalent to braces
    #[arg(short, long)]
    pub indent: bool,

    /// Make warnings fatal
    #[arg(short, long)]
    pub pedantic: bool,

    /// Suppress warnings (overrides --pedantic)
    #[arg(short, long)]
    pub silent: bool,

    /// Tab width used for columns and indentation
    #[arg(
        short = 't',
        long = "tab-size",
        value_name = "SIZE",
        default_value_t = 4,
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    pub tab_size: u32,

    /// Extra directory searched by `use` (repeatable)
    #[arg(short = 'I', long = "include", value_name = "DIR")]
    pub include: Vec<PathBuf>,

    /// Print help
    #[arg(long, action = ArgAction::Help)]
    help: Option<bool>,

    /// Template file, or `-` for standard input
    #[arg(value_name = "FILENAME")]
    pub input: String,
}

/// Where the template comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Stdin,
    File(PathBuf),
}

impl fmt::Display for Input {
    /// The prefix used when reporting errors for this input.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Input::Stdin => f.write_str("On standard input"),
            Input::File(path) => write!(f, "In {}", path.display()),
        }
    }
}

impl CliArgs {
    pub fn source(&self) -> Input {
        if self.input == "-" {
            Input::Stdin
        } else {
            Input::File(PathBuf::from(&self.input))
        }
    }

    /// Run options from the flags, before the environment is applied.
    pub fn options(&self) -> Options {
        Options {
            tab_width: self.tab_size as usize,
            indent_mode: self.indent,
            mode: RunMode { head: self.head, silent: self.silent, pedantic: self.pedantic }.normalized(),
            search_path: self.include.clone(),
            ..Options::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> CliArgs {
        CliArgs::try_parse_from(std::iter::once("vision").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn filename_only() {
        let a = parse(&["page.vn"]);
        assert_eq!(a.source(), Input::File(PathBuf::from("page.vn")));
        let o = a.options();
        assert_eq!(o.tab_width, 4);
        assert_eq!(o.mode, RunMode::default());
    }

    #[test]
    fn dash_is_stdin() {
        assert_eq!(parse(&["-"]).source(), Input::Stdin);
    }

    #[test]
    fn all_flags() {
        let a = parse(&["-h", "-i", "-p", "-t", "8", "-I", "lib", "-I", "more", "x.vn"]);
        let o = a.options();
        assert!(o.mode.head && o.mode.pedantic && !o.mode.silent);
        assert!(o.indent_mode);
        assert_eq!(o.tab_width, 8);
        assert_eq!(o.search_path, vec![PathBuf::from("lib"), PathBuf::from("more")]);
    }

    #[test]
    fn silent_overrides_pedantic() {
        let o = parse(&["-p", "-s", "x"]).options();
        assert!(o.mode.silent);
        assert!(!o.mode.pedantic);
    }

    #[test]
    fn long_forms() {
        let a = parse(&["--head", "--tab-size", "2", "--include", "d", "f"]);
        assert!(a.head);
        assert_eq!(a.tab_size, 2);
        assert_eq!(a.include, vec![PathBuf::from("d")]);
    }

    #[test]
    fn missing_filename_is_an_error() {
        assert!(CliArgs::try_parse_from(["vision", "-i"]).is_err());
    }

    #[test]
    fn zero_tab_size_is_rejected() {
        assert!(CliArgs::try_parse_from(["vision", "-t", "0", "x"]).is_err());
        assert!(CliArgs::try_parse_from(["vision", "-t", "wide", "x"]).is_err());
    }

    #[test]
    fn origin_prefixes() {
        assert_eq!(Input::Stdin.to_string(), "On standard input");
        assert_eq!(Input::File(PathBuf::from("a.vn")).to_string(), "In a.vn");
    }
}
