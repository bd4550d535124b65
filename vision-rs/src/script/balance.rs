//! Delimiter balance check.
//!
//! Run before parsing so mismatched brackets are reported where they occur
//! rather than wherever the recursive descent happens to give up.

use crate::error::{Error, Result};

use super::token::{Token, TokenKind};

/// Verify that every `(`, `[`, `{` and INDENT is closed by its own closer,
/// innermost first.  Reports the first problem found.
pub fn check_balance(tokens: &[Token]) -> Result<()> {
    let mut open: Vec<&Token> = Vec::new();

    for token in tokens {
        if token.kind.closer().is_some() {
            open.push(token);
        } else if token.kind.is_closer() {
            let Some(opener) = open.pop() else {
                return Err(Error::msg(format!(
                    "{} at {} has no match.",
                    token.kind, token.pos
                )));
            };
            if opener.kind.closer() != Some(token.kind) {
                return Err(Error::msg(format!(
                    "{} at {} does not match {} at {}.",
                    token.kind, token.pos, opener.kind, opener.pos
                )));
            }
        }
    }

    match open.pop() {
        Some(opener) => Err(Error::msg(format!(
            "{} at {} has no match.",
            opener.kind, opener.pos
        ))),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::script::lexer::tokenize;

    fn check(src: &str) -> Result<()> {
        check_balance(&tokenize(src, 4).unwrap())
    }

    #[test]
    fn balanced_sources_pass() {
        assert!(check("f[t](1){x [y] (z)}").is_ok());
        assert!(check("a\n    b\n        c\nd").is_ok());
        assert!(check("").is_ok());
    }

    #[test]
    fn stray_closer() {
        assert_eq!(
            check("a)").unwrap_err().to_string(),
            "\")\" at line 1, column 2 has no match."
        );
    }

    #[test]
    fn wrong_closer() {
        assert_eq!(
            check("f(1}").unwrap_err().to_string(),
            "\"}\" at line 1, column 4 does not match \"(\" at line 1, column 2."
        );
    }

    #[test]
    fn unclosed_opener() {
        assert_eq!(
            check("x [y").unwrap_err().to_string(),
            "\"[\" at line 1, column 3 has no match."
        );
    }

    #[test]
    fn first_mismatch_wins() {
        let err = check("(] }").unwrap_err().to_string();
        assert!(err.starts_with("\"]\" at line 1, column 2"), "{err}");
    }

    #[test]
    fn indent_closed_by_brace_is_a_mismatch() {
        let err = check("a\n    b }").unwrap_err().to_string();
        assert!(err.contains("does not match indent"), "{err}");
    }
}
