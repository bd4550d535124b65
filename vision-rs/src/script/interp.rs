//! Vision interpreter.
//!
//! The [`Interpreter`] owns a [`Context`] and runs whole programs: scan,
//! parse, evaluate the root block, and hand back the header buffer and body
//! text as a [`Rendered`] page.  It also implements module import for the
//! `use` keyword, which runs the module in a nested interpreter and merges
//! its definitions into the caller.

use std::path::PathBuf;
use std::rc::Rc;

use tracing::debug;

use crate::config::Options;
use crate::error::{Error, Result};
use crate::host::{Host, NativeHost};

use super::context::Context;
use super::expr::Expr;
use super::lexer::tokenize;
use super::parser::parse;
use super::signature::Signature;
use super::token::Position;
use super::value::Value;

// ── Rendered ──────────────────────────────────────────────────────────────────

/// The result of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Rendered {
    pub header: String,
    pub body: String,
}

impl Rendered {
    /// Header, a blank separator line, then the body unless `head_only`.
    pub fn render(&self, head_only: bool) -> String {
        let mut out = String::with_capacity(self.header.len() + 1 + self.body.len());
        out.push_str(&self.header);
        out.push('\n');
        if !head_only {
            out.push_str(&self.body);
        }
        out
    }
}

// ── Interpreter ───────────────────────────────────────────────────────────────

pub struct Interpreter {
    pub context: Context,
}

impl Interpreter {
    /// An interpreter on the real file system.
    pub fn new(options: Options) -> Self {
        Self::with_host(options, Rc::new(NativeHost))
    }

    pub fn with_host(options: Options, host: Rc<dyn Host>) -> Self {
        Interpreter { context: Context::new(options, host) }
    }

    fn nested(options: Options, host: Rc<dyn Host>, import_depth: usize, call_depth: usize) -> Self {
        Interpreter { context: Context::new(options, host).nested(import_depth, call_depth) }
    }

    pub fn options(&self) -> &Options {
        self.context.options()
    }

    pub fn diagnostics(&self) -> &[String] {
        &self.context.diagnostics
    }

    /// Define each `(name, value)` inside a scope called `scope`, making
    /// them visible as `scope::name`.  Later pairs replace earlier ones.
    pub fn define_input<I, K, V>(&mut self, scope: &str, pairs: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        self.context.enter_scope(scope);
        for (name, value) in pairs {
            let body = match value.into() {
                Value::Data(x) => Expr::data(x, Position::default()),
                Value::Content(s) => Expr::content(s, Position::default()),
            };
            self.context.redefine(Signature::simple(name), body);
        }
        self.context.exit_scope();
    }

    /// Scan and parse `source` with this interpreter's options.
    pub fn parse(&self, source: &str) -> Result<Rc<Expr>> {
        let options = self.options();
        let tokens = tokenize(source, options.tab_width)?;
        parse(tokens, options.indent_mode)
    }

    pub fn run(&mut self, source: &str) -> Result<Rendered> {
        let tree = self.parse(source)?;
        let body = tree.evaluate(&mut self.context)?.to_text();
        Ok(Rendered { header: self.context.header.clone(), body })
    }

    /// `run`, then render according to the context's head mode.
    pub fn run_to_string(&mut self, source: &str) -> Result<String> {
        let rendered = self.run(source)?;
        Ok(rendered.render(self.context.mode.head))
    }
}

// ── Modules ───────────────────────────────────────────────────────────────────

/// Find `name` as given, then in each search directory.
fn resolve_module(host: &dyn Host, search_path: &[PathBuf], name: &str) -> Option<(PathBuf, Vec<u8>)> {
    std::iter::once(PathBuf::from(name))
        .chain(search_path.iter().map(|dir| dir.join(name)))
        .find_map(|path| host.read_file(&path).ok().map(|bytes| (path, bytes)))
}

/// Run module `name` in a nested interpreter and merge its definitions,
/// header and diagnostics into `ctx`.  Returns the module's body text.
pub(crate) fn import_module(ctx: &mut Context, name: &str) -> Result<String> {
    let options = ctx.options().clone();
    let depth = ctx.import_depth() + 1;
    if depth > options.max_import_depth {
        return Err(Error::ImportDepth(name.to_string()));
    }

    let host = ctx.host();
    let (path, bytes) = resolve_module(host.as_ref(), &options.search_path, name)
        .ok_or_else(|| Error::ModuleNotFound(name.to_string()))?;
    debug!(module = name, path = %path.display(), depth, "loading module");

    let source = String::from_utf8_lossy(&bytes);
    let mut sub = Interpreter::nested(options, host, depth, ctx.call_depth());
    sub.context.mode = ctx.mode;
    let rendered = sub
        .run(&source)
        .map_err(|e| e.in_source(format!("In {}", path.display())))?;

    ctx.inject(&sub.context);
    ctx.append_header(&rendered.header);
    ctx.diagnostics.extend(sub.context.diagnostics);
    Ok(rendered.body)
}
