//! Template signatures.
//!
//! A signature is a name plus the parameter names of each data and content
//! section.  Two signatures are the same definition when their canonical
//! forms agree: `f(2){1+}` is `f` with one two-parameter data section and one
//! content section ending in a rest parameter.

use std::cmp::Ordering;
use std::fmt;
use std::rc::Rc;

use crate::error::Result;

use super::context::Context;
use super::expr::Expr;
use super::token::Position;
use super::value::{List, Value};

/// Parameter names of one section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub names: Vec<String>,
    /// The last name absorbs any excess values.
    pub rest: bool,
}

impl Section {
    fn new(names: Vec<String>) -> Self {
        let rest = names.last().is_some_and(|n| is_rest_name(n));
        Section { names, rest }
    }

    /// Whether `given` values can be bound to this section.
    fn accepts(&self, given: usize) -> bool {
        if self.rest {
            given + 1 >= self.names.len()
        } else {
            given == self.names.len()
        }
    }

    fn write_arity(&self, f: &mut String, open: char, close: char) {
        f.push(open);
        f.push_str(&self.names.len().to_string());
        if self.rest {
            f.push('+');
        }
        f.push(close);
    }
}

/// `args...` style names: longer than the marker itself.
fn is_rest_name(name: &str) -> bool {
    name.len() > 3 && name.ends_with("...")
}

#[derive(Debug, Clone)]
pub struct Signature {
    name: String,
    data: Vec<Section>,
    content: Vec<Section>,
    canonical: String,
}

impl Signature {
    /// A signature with no sections, as used for plain values.
    pub fn simple(name: impl Into<String>) -> Self {
        let name = name.into();
        Signature { canonical: name.clone(), name, data: Vec::new(), content: Vec::new() }
    }

    pub fn from_params(
        name: impl Into<String>,
        data: Vec<Vec<String>>,
        content: Vec<Vec<String>>,
    ) -> Self {
        Self::build(
            name.into(),
            data.into_iter().map(Section::new).collect(),
            content.into_iter().map(Section::new).collect(),
        )
    }

    /// The same sections under another name.
    pub fn renamed(&self, name: impl Into<String>) -> Self {
        Self::build(name.into(), self.data.clone(), self.content.clone())
    }

    fn build(name: String, data: Vec<Section>, content: Vec<Section>) -> Self {
        let mut canonical = name.clone();
        for s in &data {
            s.write_arity(&mut canonical, '(', ')');
        }
        for s in &content {
            s.write_arity(&mut canonical, '{', '}');
        }
        Signature { name, data, content, canonical }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn canonical(&self) -> &str {
        &self.canonical
    }

    pub fn matches(&self, name: &str, data: &[Vec<f64>], content: &[Vec<String>]) -> bool {
        name == self.name
            && data.len() == self.data.len()
            && content.len() == self.content.len()
            && self.data.iter().zip(data).all(|(s, given)| s.accepts(given.len()))
            && self.content.iter().zip(content).all(|(s, given)| s.accepts(given.len()))
    }

    /// Define each parameter in the innermost scope of `ctx`.  Plain
    /// parameters become literals; a rest parameter becomes a list of the
    /// remaining values.
    pub fn bind(&self, ctx: &mut Context, data: &[Vec<f64>], content: &[Vec<String>]) -> Result<()> {
        for (section, given) in self.data.iter().zip(data) {
            bind_section(ctx, section, given.iter().map(|x| Value::Data(*x)))?;
        }
        for (section, given) in self.content.iter().zip(content) {
            bind_section(ctx, section, given.iter().map(|s| Value::content(s.as_str())))?;
        }
        Ok(())
    }
}

fn bind_section(
    ctx: &mut Context,
    section: &Section,
    mut values: impl Iterator<Item = Value>,
) -> Result<()> {
    let plain = section.names.len() - usize::from(section.rest);
    for name in &section.names[..plain] {
        let expr = match values.next() {
            Some(Value::Data(x)) => Expr::data(x, Position::default()),
            Some(Value::Content(s)) => Expr::content(s, Position::default()),
            None => break,
        };
        ctx.define(Signature::simple(name.as_str()), expr, false)?;
    }
    if section.rest {
        let rest: List = values.collect();
        let name = &section.names[plain];
        ctx.define(Signature::simple(name.as_str()), Rc::new(Expr::List(rest)), false)?;
    }
    Ok(())
}

impl PartialEq for Signature {
    fn eq(&self, other: &Self) -> bool {
        self.canonical == other.canonical
    }
}

impl Eq for Signature {}

impl PartialOrd for Signature {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Signature {
    fn cmp(&self, other: &Self) -> Ordering {
        self.canonical.cmp(&other.canonical)
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn canonical_form() {
        let sig = Signature::from_params(
            "f",
            vec![names(&["a", "b"])],
            vec![names(&["body"]), names(&["items..."])],
        );
        assert_eq!(sig.canonical(), "f(2){1}{1+}");
        assert_eq!(sig.renamed("ns::f").canonical(), "ns::f(2){1}{1+}");
        assert_eq!(Signature::simple("x").canonical(), "x");
    }

    #[test]
    fn rest_marker_needs_a_name() {
        let sig = Signature::from_params("f", vec![names(&["..."])], vec![]);
        assert_eq!(sig.canonical(), "f(1)");
        let sig = Signature::from_params("f", vec![names(&["x..."])], vec![]);
        assert_eq!(sig.canonical(), "f(1+)");
    }

    #[test]
    fn empty_section_is_not_rest() {
        let sig = Signature::from_params("f", vec![], vec![vec![]]);
        assert_eq!(sig.canonical(), "f{0}");
        assert!(sig.matches("f", &[], &[vec![]]));
    }

    #[test]
    fn exact_arity() {
        let sig = Signature::from_params("f", vec![names(&["a", "b"])], vec![]);
        assert!(sig.matches("f", &[vec![1.0, 2.0]], &[]));
        assert!(!sig.matches("f", &[vec![1.0]], &[]));
        assert!(!sig.matches("g", &[vec![1.0, 2.0]], &[]));
        assert!(!sig.matches("f", &[vec![1.0, 2.0]], &[vec![]]));
    }

    #[test]
    fn rest_arity_is_at_least_declared_minus_one() {
        let sig = Signature::from_params("f", vec![names(&["a", "more..."])], vec![]);
        assert!(sig.matches("f", &[vec![1.0]], &[]));
        assert!(sig.matches("f", &[vec![1.0, 2.0, 3.0, 4.0]], &[]));
        assert!(!sig.matches("f", &[vec![]], &[]));
    }

    #[test]
    fn ordering_uses_canonical_only() {
        let a = Signature::from_params("f", vec![names(&["x"])], vec![]);
        let b = Signature::from_params("f", vec![names(&["y"])], vec![]);
        assert_eq!(a, b);
        assert!(Signature::simple("a") < Signature::simple("b"));
    }
}
