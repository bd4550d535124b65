//! Execution context: the scope stack and template lookup.
//!
//! The stack starts with a single scope named `global`.  Templates are
//! defined in the innermost scope; when that scope (and the ones around it)
//! are named namespaces, the definition is also published outward under its
//! qualified name, so `namespace[html]{ def[p]{…} }` makes `html::p`
//! available globally.
//!
//! Lookup walks the stack from the innermost scope outward.  In each scope it
//! tries every imported prefix (the empty prefix first) and takes the first
//! symbol, in canonical order, whose name and section arities fit the call.

use std::collections::{BTreeMap, BTreeSet};
use std::rc::Rc;

use tracing::{debug, warn};

use crate::config::{Options, RunMode};
use crate::error::{Error, Result};
use crate::host::Host;

use super::expr::Expr;
use super::signature::Signature;
use super::value::List;

/// Name of the base scope.
pub const GLOBAL_SCOPE: &str = "global";

// ── Scope ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct Scope {
    pub name: String,
    symbols: BTreeMap<Signature, Rc<Expr>>,
    /// Prefixes tried during lookup; always holds `""`.
    imports: BTreeSet<String>,
}

impl Scope {
    pub fn new(name: impl Into<String>) -> Self {
        Scope {
            name: name.into(),
            symbols: BTreeMap::new(),
            imports: BTreeSet::from([String::new()]),
        }
    }

    pub fn symbols(&self) -> impl Iterator<Item = (&Signature, &Rc<Expr>)> {
        self.symbols.iter()
    }

    /// Insert, replacing both key and body of an equal signature so the new
    /// parameter names are the ones bound.
    fn insert(&mut self, signature: Signature, body: Rc<Expr>) {
        self.symbols.remove(&signature);
        self.symbols.insert(signature, body);
    }

    fn lookup(&self, name: &str, data: &[Vec<f64>], content: &[Vec<String>]) -> Option<(Signature, Rc<Expr>)> {
        self.imports.iter().find_map(|prefix| {
            let qualified = if prefix.is_empty() {
                name.to_string()
            } else {
                format!("{prefix}::{name}")
            };
            self.symbols
                .iter()
                .find(|(sig, _)| sig.matches(&qualified, data, content))
                .map(|(sig, body)| (sig.clone(), Rc::clone(body)))
        })
    }
}

// ── Context ───────────────────────────────────────────────────────────────────

pub struct Context {
    /// Innermost scope last.
    stack: Vec<Scope>,
    pub mode: RunMode,
    /// Out-of-band text rendered before the body.
    pub header: String,
    /// Warnings recorded during the run, in order.
    pub diagnostics: Vec<String>,
    options: Options,
    host: Rc<dyn Host>,
    /// How many `use` levels deep this run is.
    import_depth: usize,
    /// Template calls currently in progress, including those of importing runs.
    call_depth: usize,
}

impl Context {
    pub fn new(options: Options, host: Rc<dyn Host>) -> Self {
        Context {
            stack: vec![Scope::new(GLOBAL_SCOPE)],
            mode: options.mode.normalized(),
            header: String::new(),
            diagnostics: Vec::new(),
            options,
            host,
            import_depth: 0,
            call_depth: 0,
        }
    }

    /// A context for a module imported `import_depth` levels deep from inside
    /// `call_depth` template calls.
    pub(crate) fn nested(mut self, import_depth: usize, call_depth: usize) -> Self {
        self.import_depth = import_depth;
        self.call_depth = call_depth;
        self
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn host(&self) -> Rc<dyn Host> {
        Rc::clone(&self.host)
    }

    pub fn import_depth(&self) -> usize {
        self.import_depth
    }

    pub fn call_depth(&self) -> usize {
        self.call_depth
    }

    /// Number of scopes on the stack, the global scope included.
    pub fn scope_depth(&self) -> usize {
        self.stack.len()
    }

    pub fn global_scope(&self) -> &Scope {
        &self.stack[0]
    }

    fn innermost(&mut self) -> &mut Scope {
        let last = self.stack.len() - 1;
        &mut self.stack[last]
    }

    // ── Definitions ───────────────────────────────────────────────────────────

    /// Define `signature` in the innermost scope and publish it outward under
    /// its qualified name through each enclosing named scope.
    pub fn define(&mut self, signature: Signature, body: Rc<Expr>, allow_redefinition: bool) -> Result<()> {
        if !allow_redefinition {
            let scope = self.innermost();
            if let Some((existing, _)) = scope.symbols.get_key_value(&signature) {
                let mut message = format!("Redefinition of \"{}\"", signature.name());
                if !scope.name.is_empty() {
                    message.push_str(&format!(" in namespace \"{}\"", scope.name));
                }
                message.push_str(&format!(" already defined as \"{}\".", existing.canonical()));
                return Err(Error::msg(message));
            }
        }
        self.redefine(signature, body);
        Ok(())
    }

    /// Define without the collision check.
    pub fn redefine(&mut self, signature: Signature, body: Rc<Expr>) {
        let top = self.stack.len() - 1;
        debug!(signature = %signature, scope = %self.stack[top].name, "define");

        let mut qualified = signature.name().to_string();
        for i in (0..top).rev() {
            let inner = &self.stack[i + 1].name;
            if inner.is_empty() {
                break;
            }
            qualified = format!("{inner}::{qualified}");
            self.stack[i].insert(signature.renamed(qualified.as_str()), Rc::clone(&body));
        }
        self.stack[top].insert(signature, body);
    }

    /// Merge another run's global definitions into the innermost scope.
    /// Later definitions win.
    pub fn inject(&mut self, other: &Context) {
        let scope = self.innermost();
        for (signature, body) in other.global_scope().symbols() {
            scope.insert(signature.clone(), Rc::clone(body));
        }
    }

    // ── Scopes ────────────────────────────────────────────────────────────────

    pub fn enter_scope(&mut self, name: impl Into<String>) {
        let scope = Scope::new(name);
        debug!(scope = %scope.name, depth = self.stack.len(), "enter scope");
        self.stack.push(scope);
    }

    /// Leave the innermost scope.  The global scope is never popped.
    pub fn exit_scope(&mut self) {
        if self.stack.len() > 1 {
            if let Some(scope) = self.stack.pop() {
                debug!(scope = %scope.name, "exit scope");
            }
        }
    }

    /// Import `prefix` into the innermost scope.
    pub fn use_prefix(&mut self, prefix: impl Into<String>) {
        self.innermost().imports.insert(prefix.into());
    }

    // ── Lookup ────────────────────────────────────────────────────────────────

    /// Find the template `name` that accepts these arguments and evaluate it
    /// in a fresh anonymous scope.  No match is a warning and an empty list.
    pub fn evaluate(&mut self, name: &str, data: &[Vec<f64>], content: &[Vec<String>]) -> Result<List> {
        let found = self
            .stack
            .iter()
            .rev()
            .find_map(|scope| scope.lookup(name, data, content));

        let Some((signature, body)) = found else {
            let mut shape = name.to_string();
            for d in data {
                shape.push_str(&format!("({})", d.len()));
            }
            for c in content {
                shape.push_str(&format!("{{{}}}", c.len()));
            }
            self.diagnose(format!("Warning: No match for template \"{shape}\"."));
            return Ok(List::new());
        };

        if self.call_depth >= self.options.max_call_depth {
            return Err(Error::CallDepth(name.to_string()));
        }

        debug!(template = %signature, depth = self.call_depth, "dispatch");
        self.call_depth += 1;
        self.enter_scope("");
        let result = signature
            .bind(self, data, content)
            .and_then(|()| body.evaluate(self));
        self.exit_scope();
        self.call_depth -= 1;
        result
    }

    // ── Output ────────────────────────────────────────────────────────────────

    /// Record a warning unless running silent.
    pub fn diagnose(&mut self, message: impl Into<String>) {
        if self.mode.silent {
            return;
        }
        let message = message.into();
        warn!("{message}");
        self.diagnostics.push(message);
    }

    pub fn append_header(&mut self, text: &str) {
        self.header.push_str(text);
    }
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("stack", &self.stack)
            .field("mode", &self.mode)
            .field("header", &self.header)
            .field("diagnostics", &self.diagnostics)
            .field("import_depth", &self.import_depth)
            .finish_non_exhaustive()
    }
}
