//! Expression tree.
//!
//! The parser produces an immutable tree of [`Expr`] nodes shared through
//! `Rc`, so template bodies can be stored in the context and evaluated any
//! number of times.  Every node evaluates to a flat [`List`].

use std::fmt;
use std::rc::Rc;

use crate::error::{Error, Result};

use super::compound::Compound;
use super::context::Context;
use super::token::Position;
use super::value::{format_number, List, Value};

/// A node of the expression tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Number literal.
    Data { value: f64, pos: Position },
    /// Text literal.
    Content { value: String, pos: Position },
    /// Bare name, resolved against the context when evaluated.
    Identifier { name: String, pos: Position },
    /// Literal list, used for bound rest parameters.
    List(List),
    /// `( … )`: the concatenated text of its children.
    Group { items: Vec<Rc<Expr>>, pos: Position },
    /// `[ … ]` / `{ … }`: its children's results spliced together.
    Block { items: Vec<Rc<Expr>>, pos: Position },
    /// A call with sections.
    Compound(Compound),
}

impl Expr {
    pub fn data(value: f64, pos: Position) -> Rc<Expr> {
        Rc::new(Expr::Data { value, pos })
    }

    pub fn content(value: impl Into<String>, pos: Position) -> Rc<Expr> {
        Rc::new(Expr::Content { value: value.into(), pos })
    }

    pub fn identifier(name: impl Into<String>, pos: Position) -> Rc<Expr> {
        Rc::new(Expr::Identifier { name: name.into(), pos })
    }

    pub fn block(items: Vec<Rc<Expr>>, pos: Position) -> Rc<Expr> {
        Rc::new(Expr::Block { items, pos })
    }

    pub fn position(&self) -> Position {
        match self {
            Expr::Data { pos, .. }
            | Expr::Content { pos, .. }
            | Expr::Identifier { pos, .. }
            | Expr::Group { pos, .. }
            | Expr::Block { pos, .. } => *pos,
            Expr::List(_) => Position::default(),
            Expr::Compound(c) => c.pos,
        }
    }

    /// The name carried by an identifier node.
    pub fn as_identifier(&self) -> Option<&str> {
        match self {
            Expr::Identifier { name, .. } => Some(name),
            _ => None,
        }
    }

    pub fn evaluate(&self, ctx: &mut Context) -> Result<List> {
        match self {
            Expr::Data { value, .. } => Ok(Value::Data(*value).into()),
            Expr::Content { value, .. } => Ok(Value::Content(value.clone()).into()),
            Expr::Identifier { name, .. } => ctx.evaluate(name, &[], &[]),
            Expr::List(list) => Ok(list.clone()),
            Expr::Group { items, .. } => {
                let mut text = String::new();
                for item in items {
                    text.push_str(&item.evaluate(ctx)?.to_text());
                }
                Ok(Value::Content(text).into())
            }
            Expr::Block { items, .. } => evaluate_sequence(items, ctx),
            Expr::Compound(compound) => compound.evaluate(ctx),
        }
    }

    /// Text of a literal node.  Nodes that need a context to produce a value
    /// report an internal error.
    pub fn to_text(&self) -> Result<String> {
        match self {
            Expr::Data { value, .. } => Ok(format_number(*value)),
            Expr::Content { value, .. } => Ok(value.clone()),
            Expr::List(list) => Ok(list.to_text()),
            other => Err(Error::internal(format!(
                "Attempt to get content from {} without context.",
                other.kind_name()
            ))),
        }
    }

    /// Numeric value of a literal node; see [`Expr::to_text`].
    pub fn to_number(&self) -> Result<f64> {
        match self {
            Expr::Data { value, .. } => Ok(*value),
            Expr::Content { value, .. } => Ok(Value::content(value.as_str()).to_number()),
            Expr::List(list) => Ok(list.to_number()),
            other => Err(Error::internal(format!(
                "Attempt to get data from {} without context.",
                other.kind_name()
            ))),
        }
    }

    fn kind_name(&self) -> &'static str {
        match self {
            Expr::Data { .. } => "data",
            Expr::Content { .. } => "content",
            Expr::Identifier { .. } => "identifier",
            Expr::List(_) => "list",
            Expr::Group { .. } => "group",
            Expr::Block { .. } => "block",
            Expr::Compound(_) => "compound expression",
        }
    }
}

/// Evaluate each expression in turn, splicing the results.
pub fn evaluate_sequence(items: &[Rc<Expr>], ctx: &mut Context) -> Result<List> {
    let mut result = List::new();
    for item in items {
        result.append(item.evaluate(ctx)?);
    }
    Ok(result)
}

// ── Canonical rendering ───────────────────────────────────────────────────────

fn write_literal(f: &mut fmt::Formatter<'_>, value: &Value) -> fmt::Result {
    match value {
        Value::Data(x) => f.write_str(&format_number(*x)),
        Value::Content(s) => write_quoted(f, s),
    }
}

fn write_quoted(f: &mut fmt::Formatter<'_>, s: &str) -> fmt::Result {
    f.write_str("\"")?;
    for c in s.chars() {
        if c == '"' || c == '\\' {
            f.write_str("\\")?;
        }
        write!(f, "{c}")?;
    }
    f.write_str("\"")
}

/// Write a sequence of expressions, separating with `;` where a following
/// delimiter would otherwise attach to the previous expression as a section.
pub(crate) fn write_sequence(f: &mut fmt::Formatter<'_>, items: &[Rc<Expr>]) -> fmt::Result {
    let mut previous: Option<&Expr> = None;
    for item in items {
        if let Some(prev) = previous {
            let rendered = item.to_string();
            let attaches = !matches!(prev, Expr::Data { .. })
                && rendered.starts_with(['[', '(', '{']);
            f.write_str(if attaches { "; " } else { " " })?;
            f.write_str(&rendered)?;
        } else {
            write!(f, "{item}")?;
        }
        previous = Some(item);
    }
    Ok(())
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Data { value, .. } => f.write_str(&format_number(*value)),
            Expr::Content { value, .. } => write_quoted(f, value),
            Expr::Identifier { name, .. } => f.write_str(name),
            Expr::List(list) => {
                f.write_str("[")?;
                for (i, value) in list.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write_literal(f, value)?;
                }
                f.write_str("]")
            }
            Expr::Group { items, .. } => {
                f.write_str("(")?;
                write_sequence(f, items)?;
                f.write_str(")")
            }
            Expr::Block { items, .. } => {
                f.write_str("{")?;
                write_sequence(f, items)?;
                f.write_str("}")
            }
            Expr::Compound(compound) => write!(f, "{compound}"),
        }
    }
}
