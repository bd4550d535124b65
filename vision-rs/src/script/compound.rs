//! Compound expressions: template calls and keywords.
//!
//! A compound's name comes from its determiner.  Keywords have dedicated
//! evaluators; any other name is a template call whose data sections are
//! flattened to numbers and content sections to text before lookup.
//!
//! | Keyword | Shape | Result |
//! |---------|-------|--------|
//! | `def[name](params…){params…}{body}` | tag, ≥1 content | defines a template |
//! | `error{msg}` | 1 content | fatal error |
//! | `warn{msg}` | 1 content | warning (fatal when pedantic) |
//! | `if(cond){body}` | 1 data, 1 content | body when cond ≠ 0 |
//! | `local{body}` | 1 content | body in an anonymous scope |
//! | `namespace[ns]{body}` | tag, 1 content | body in scope `ns` |
//! | `using[ns]` | tag | imports prefix `ns` |
//! | `use{path}` / `use[path]` | 1 content or tag | imports a module |
//! | `header{…}…` | content only | appends to the header buffer |
//! | `file{path}` | 1 content | the file's text |
//! | `extern[cmd]{input}` / `extern{cmd}{input}` | | a command's output |
//! | `+ - * / % & \| ! < >= = <> > <=` | 1–2 data | a number |

use std::fmt;
use std::path::Path;
use std::rc::Rc;

use tracing::debug;

use crate::error::{Error, Result};

use super::builtins::{call_math, math_arity};
use super::context::Context;
use super::expr::{evaluate_sequence, write_sequence, Expr};
use super::interp::import_module;
use super::signature::Signature;
use super::token::Position;
use super::value::{List, Value};

/// Keyword names other than the math operators.
const KEYWORDS: &[&str] = &[
    "def", "error", "extern", "file", "header", "if", "local", "namespace", "use", "using", "warn",
];

/// Whether `name` is reserved and cannot name a template.
pub fn is_keyword(name: &str) -> bool {
    KEYWORDS.contains(&name) || math_arity(name).is_some()
}

#[derive(Debug, Clone, PartialEq)]
pub struct Compound {
    pub determiner: Rc<Expr>,
    /// `[identifier]` directly after the determiner.
    pub tag: Option<String>,
    pub data: Vec<Vec<Rc<Expr>>>,
    pub content: Vec<Vec<Rc<Expr>>>,
    pub pos: Position,
}

impl Compound {
    pub fn new(determiner: Rc<Expr>, pos: Position) -> Self {
        Compound { determiner, tag: None, data: Vec::new(), content: Vec::new(), pos }
    }

    pub fn evaluate(&self, ctx: &mut Context) -> Result<List> {
        let name = match self.determiner.as_identifier() {
            Some(name) => name.to_string(),
            None => self.determiner.evaluate(ctx)?.to_text(),
        };

        let keyword = is_keyword(&name);
        let result = if keyword {
            self.evaluate_keyword(&name, ctx)
        } else {
            self.evaluate_template(&name, ctx)
        };
        result.map_err(|e| e.in_compound(if keyword { name.as_str() } else { "template" }, self.pos))
    }

    fn evaluate_template(&self, name: &str, ctx: &mut Context) -> Result<List> {
        let mut data = Vec::with_capacity(self.data.len());
        for section in &self.data {
            let values = evaluate_sequence(section, ctx)?;
            data.push(values.iter().map(Value::to_number).collect::<Vec<f64>>());
        }
        let mut content = Vec::with_capacity(self.content.len());
        for section in &self.content {
            let values = evaluate_sequence(section, ctx)?;
            content.push(values.iter().map(Value::to_text).collect::<Vec<String>>());
        }
        ctx.evaluate(name, &data, &content)
    }

    fn evaluate_keyword(&self, name: &str, ctx: &mut Context) -> Result<List> {
        match name {
            "def" => self.eval_def(ctx),
            "error" => self.eval_error(ctx),
            "extern" => self.eval_extern(ctx),
            "file" => self.eval_file(ctx),
            "header" => self.eval_header(ctx),
            "if" => self.eval_if(ctx),
            "local" => self.eval_local(ctx),
            "namespace" => self.eval_namespace(ctx),
            "use" => self.eval_use(ctx),
            "using" => self.eval_using(ctx),
            "warn" => self.eval_warn(ctx),
            op => self.eval_math(op, ctx),
        }
    }

    /// `true` when this compound has exactly `data` data sections and
    /// `content` content sections.
    fn shaped(&self, data: usize, content: usize) -> bool {
        self.data.len() == data && self.content.len() == content
    }

    fn section_text(section: &[Rc<Expr>], ctx: &mut Context) -> Result<String> {
        Ok(evaluate_sequence(section, ctx)?.to_text())
    }

    // ── Definitions and scopes ────────────────────────────────────────────────

    fn eval_def(&self, ctx: &mut Context) -> Result<List> {
        let (Some(name), Some((body, params))) = (&self.tag, self.content.split_last()) else {
            return Err(Error::InvalidUse("def".into()));
        };
        if is_keyword(name) {
            return Err(Error::msg(format!(
                "Attempt to define template with reserved name \"{name}\"."
            )));
        }

        let data = parameter_names(&self.data).ok_or_else(|| {
            Error::msg(format!("Attempt to define template \"{name}\" with invalid data signature."))
        })?;
        let content = parameter_names(params).ok_or_else(|| {
            Error::msg(format!("Attempt to define template \"{name}\" with invalid content signature."))
        })?;

        let signature = Signature::from_params(name.as_str(), data, content);
        ctx.define(signature, Expr::block(body.clone(), self.pos), false)?;
        Ok(List::new())
    }

    fn eval_local(&self, ctx: &mut Context) -> Result<List> {
        if !self.shaped(0, 1) {
            return Err(Error::InvalidUse("local".into()));
        }
        ctx.enter_scope("");
        let result = evaluate_sequence(&self.content[0], ctx);
        ctx.exit_scope();
        result
    }

    fn eval_namespace(&self, ctx: &mut Context) -> Result<List> {
        let Some(ns) = self.tag.as_deref().filter(|_| self.shaped(0, 1)) else {
            return Err(Error::InvalidUse("namespace".into()));
        };
        ctx.enter_scope(ns);
        let result = evaluate_sequence(&self.content[0], ctx);
        ctx.exit_scope();
        result
    }

    fn eval_using(&self, ctx: &mut Context) -> Result<List> {
        let Some(prefix) = self.tag.as_deref().filter(|_| self.shaped(0, 0)) else {
            return Err(Error::InvalidUse("using".into()));
        };
        ctx.use_prefix(prefix);
        Ok(List::new())
    }

    fn eval_use(&self, ctx: &mut Context) -> Result<List> {
        let name = match &self.tag {
            None if self.shaped(0, 1) => Self::section_text(&self.content[0], ctx)?,
            Some(tag) if self.shaped(0, 0) => tag.clone(),
            _ => return Err(Error::InvalidUse("use".into())),
        };
        let body = import_module(ctx, &name)?;
        Ok(Value::Content(body).into())
    }

    // ── Diagnostics ───────────────────────────────────────────────────────────

    fn eval_error(&self, ctx: &mut Context) -> Result<List> {
        if !self.shaped(0, 1) {
            return Err(Error::InvalidUse("error".into()));
        }
        Err(Error::User(Self::section_text(&self.content[0], ctx)?))
    }

    fn eval_warn(&self, ctx: &mut Context) -> Result<List> {
        if !self.shaped(0, 1) {
            return Err(Error::InvalidUse("warn".into()));
        }
        let message = Self::section_text(&self.content[0], ctx)?;
        if ctx.mode.pedantic && !ctx.mode.silent {
            return Err(Error::msg(message));
        }
        ctx.diagnose(format!("Warning: {message}"));
        Ok(List::new())
    }

    // ── Control ───────────────────────────────────────────────────────────────

    fn eval_if(&self, ctx: &mut Context) -> Result<List> {
        if !self.shaped(1, 1) {
            return Err(Error::InvalidUse("if".into()));
        }
        let condition = evaluate_sequence(&self.data[0], ctx)?.to_number();
        if condition != 0.0 {
            evaluate_sequence(&self.content[0], ctx)
        } else {
            Ok(List::new())
        }
    }

    fn eval_math(&self, op: &str, ctx: &mut Context) -> Result<List> {
        let arity = math_arity(op).ok_or_else(|| Error::internal(format!("Unknown operator \"{op}\".")))?;
        if self.data.len() != arity || !self.content.is_empty() {
            return Err(Error::InvalidUse(op.into()));
        }
        let mut operands = Vec::with_capacity(arity);
        for section in &self.data {
            operands.push(evaluate_sequence(section, ctx)?.to_number());
        }
        let value = call_math(op, &operands)
            .ok_or_else(|| Error::internal(format!("Unknown operator \"{op}\".")))??;
        Ok(Value::Data(value).into())
    }

    // ── Environment ───────────────────────────────────────────────────────────

    fn eval_header(&self, ctx: &mut Context) -> Result<List> {
        if !self.data.is_empty() {
            return Err(Error::InvalidUse("header".into()));
        }
        for section in &self.content {
            let mut text = Self::section_text(section, ctx)?;
            text.push('\n');
            ctx.append_header(&text);
        }
        Ok(List::new())
    }

    fn eval_file(&self, ctx: &mut Context) -> Result<List> {
        if !self.shaped(0, 1) {
            return Err(Error::InvalidUse("file".into()));
        }
        let path = Self::section_text(&self.content[0], ctx)?;
        match ctx.host().read_file(Path::new(&path)) {
            Ok(bytes) => Ok(Value::Content(String::from_utf8_lossy(&bytes).into_owned()).into()),
            Err(e) => {
                debug!(path, error = %e, "file not readable");
                Ok(List::new())
            }
        }
    }

    fn eval_extern(&self, ctx: &mut Context) -> Result<List> {
        let closed = self.tag.is_some();
        let valid = self.data.is_empty()
            && if closed { self.content.len() <= 1 } else { (1..=2).contains(&self.content.len()) };
        if !valid {
            return Err(Error::InvalidUse("extern".into()));
        }

        // Evaluate everything before the command runs: the input may itself
        // contain `extern` calls.
        let (command, input_section) = match &self.tag {
            Some(tag) => (tag.clone(), self.content.first()),
            None => (Self::section_text(&self.content[0], ctx)?, self.content.get(1)),
        };
        let input = match input_section {
            Some(section) => Some(Self::section_text(section, ctx)?),
            None => None,
        };

        let output = ctx
            .host()
            .run_command(&command, input.as_deref())
            .map_err(|source| Error::Io { context: format!("Unable to run \"{command}\""), source })?;
        Ok(Value::Content(String::from_utf8_lossy(&output).into_owned()).into())
    }
}

/// Names of parameter sections, or `None` if any element is not a bare
/// identifier.
fn parameter_names(sections: &[Vec<Rc<Expr>>]) -> Option<Vec<Vec<String>>> {
    sections
        .iter()
        .map(|section| {
            section
                .iter()
                .map(|e| e.as_identifier().map(str::to_string))
                .collect::<Option<Vec<String>>>()
        })
        .collect()
}

impl fmt::Display for Compound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.determiner)?;
        if let Some(tag) = &self.tag {
            write!(f, "[{tag}]")?;
        }
        for section in &self.data {
            f.write_str("(")?;
            write_sequence(f, section)?;
            f.write_str(")")?;
        }
        for section in &self.content {
            f.write_str("{")?;
            write_sequence(f, section)?;
            f.write_str("}")?;
        }
        Ok(())
    }
}
