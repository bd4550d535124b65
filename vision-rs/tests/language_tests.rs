//! End-to-end language behaviour through the public API.

use std::rc::Rc;

use pretty_assertions::assert_eq;

use vision::config::Options;
use vision::host::MemoryHost;
use vision::script::{Interpreter, Rendered};
use vision::Error;

fn interpreter(options: Options) -> Interpreter {
    Interpreter::with_host(options, Rc::new(MemoryHost::new()))
}

fn render(src: &str) -> String {
    interpreter(Options::default()).run(src).expect("run failed").body
}

fn run_full(src: &str) -> (Result<Rendered, Error>, Vec<String>) {
    let mut interp = interpreter(Options::default());
    let out = interp.run(src);
    (out, interp.diagnostics().to_vec())
}

fn canonical(src: &str, indent_mode: bool) -> String {
    let options = Options { indent_mode, ..Options::default() };
    interpreter(options).parse(src).expect("parse failed").to_string()
}

// ── Structure ────────────────────────────────────────────────────────────────

#[test]
fn indentation_matches_braces() {
    let indented = "\
def[item]{text}
    \"<li>\" text \"</li>\"
def[list]{a}{b}
    \"<ul>\"
    local
        item{a}
        item{b}
    \"</ul>\"
list{\"x\"}{\"y\"}
";
    let braced = r#"def[item]{text}{"<li>" text "</li>"}
def[list]{a}{b}{"<ul>" local{item{a} item{b}} "</ul>"}
list{"x"}{"y"}"#;
    assert_eq!(canonical(indented, true), canonical(braced, true));
    assert_eq!(canonical(braced, true), canonical(braced, false));

    let options = Options { indent_mode: true, ..Options::default() };
    let body = interpreter(options).run(indented).unwrap().body;
    assert_eq!(body, "<ul><li>x</li><li>y</li></ul>");
}

// ── Templates ────────────────────────────────────────────────────────────────

#[test]
fn overloads_are_selected_by_shape() {
    let src = r#"
def[show]{"empty"}
def[show](n){"number " n}
def[show]{s}{"text " s}
def[show](n){s}{"both"}
show " / " show(4) " / " show{"hi"} " / " show(1){"x"}
"#;
    assert_eq!(render(src), "empty / number 4 / text hi / both");
}

#[test]
fn innermost_scope_wins() {
    let src = r#"def[who]{"outer"} local{def[who]{"inner"} who} " " who"#;
    assert_eq!(render(src), "inner outer");
}

#[test]
fn rest_parameters() {
    let src = r#"def[tail](head rest...){"[" rest... "]"} tail(1) tail(1 2) tail(1 2 3)"#;
    assert_eq!(render(src), "[][2][23]");

    let (out, diagnostics) = run_full(r#"def[tail](head rest...){"x"} tail()"#);
    assert_eq!(out.unwrap().body, "");
    assert_eq!(diagnostics, vec!["Warning: No match for template \"tail\".".to_string()]);
}

#[test]
fn templates_see_their_arguments_only_while_running() {
    let (out, diagnostics) = run_full(r#"def[f]{x}{x} f{"in"} x"#);
    assert_eq!(out.unwrap().body, "in");
    assert_eq!(diagnostics.len(), 1);
}

// ── Math ─────────────────────────────────────────────────────────────────────

#[test]
fn arithmetic_and_comparison() {
    assert_eq!(render("+(2)(3)"), "5");
    assert_eq!(render("<(1)(2)"), "1");
    assert_eq!(render(">=(1)(2)"), "0");
    assert_eq!(render("/(1)(8)"), "0.125");
    assert_eq!(render("*(10000000000)(10000000000)"), "1e+20");
}

#[test]
fn division_by_zero_is_fatal() {
    let (out, _) = run_full("/(4)(0)");
    let err = out.unwrap_err();
    assert!(matches!(err.innermost(), Error::DivisionByZero));
    assert_eq!(err.to_string(), "In / expression at line 1, column 1:\nDivision by zero.");
}

#[test]
fn nested_failure_reports_every_level() {
    let (out, _) = run_full("+(1)(-(2)(/(4)(0)))");
    assert_eq!(
        out.unwrap_err().to_string(),
        "In + expression at line 1, column 1:\n\
         In - expression at line 1, column 6:\n\
         In / expression at line 1, column 11:\n\
         Division by zero."
    );
}

#[test]
fn failure_inside_a_template_names_the_call_site() {
    let src = "def[boom]{%(1)(0)}\nboom()";
    let (out, _) = run_full(src);
    let message = out.unwrap_err().to_string();
    assert!(message.starts_with("In template expression at line 2, column 1:\n"), "{message}");
    assert!(message.ends_with("In % expression at line 1, column 11:\nDivision by zero."), "{message}");
}

#[test]
fn runaway_recursion_is_a_positioned_error() {
    // The binary runs on a main thread of this size.
    let worker = std::thread::Builder::new()
        .stack_size(8 << 20)
        .spawn(|| {
            let (out, _) = run_full("def[f](n){f(+(n)(1))} f(0)");
            let err = out.unwrap_err();
            let limit_hit = matches!(err.innermost(), Error::CallDepth(name) if name == "f");
            (err.to_string(), limit_hit)
        })
        .unwrap();
    let (message, limit_hit) = worker.join().unwrap();

    assert!(limit_hit, "{message}");
    assert!(message.starts_with("In template expression at line 1, column 23:\n"));
    assert!(message.ends_with(
        "In template expression at line 1, column 11:\nTemplate recursion depth exceeded in \"f\"."
    ));
    let limit = Options::default().max_call_depth;
    assert_eq!(message.matches("In template expression").count(), limit + 1);
}

#[test]
fn recursion_up_to_the_limit_is_allowed() {
    let src = "def[down](n){if(>(n)(0)){down(-(n)(1))} n}";
    let options = Options { max_call_depth: 3, ..Options::default() };
    let mut interp = interpreter(options.clone());
    assert_eq!(interp.run(&format!("{src} down(2)")).unwrap().body, "012");

    let mut interp = interpreter(options);
    let err = interp.run(&format!("{src} down(3)")).unwrap_err();
    assert!(matches!(err.innermost(), Error::CallDepth(name) if name == "down"));
}

// ── Namespaces ───────────────────────────────────────────────────────────────

#[test]
fn using_brings_a_namespace_into_scope() {
    let src = r#"namespace[ns]{ def[f]{"found"} } using[ns]; f()"#;
    assert_eq!(render(src), "found");
}

#[test]
fn namespace_members_are_hidden_without_using() {
    let (out, diagnostics) = run_full(r#"namespace[ns]{ def[f]{"found"} } f()"#);
    assert_eq!(out.unwrap().body, "");
    assert_eq!(diagnostics, vec!["Warning: No match for template \"f\".".to_string()]);
}

#[test]
fn silent_mode_drops_warnings() {
    let mut options = Options::default();
    options.mode.silent = true;
    let mut interp = interpreter(options);
    assert_eq!(interp.run(r#"missing warn{"x"} "ok""#).unwrap().body, "ok");
    assert!(interp.diagnostics().is_empty());
}

// ── Output ───────────────────────────────────────────────────────────────────

#[test]
fn header_and_body_render_separately() {
    let mut interp = interpreter(Options::default());
    let page = interp
        .run(r#"header{"Content-Type: text/plain"} "hello""#)
        .unwrap();
    assert_eq!(page.render(false), "Content-Type: text/plain\n\nhello");
    assert_eq!(page.render(true), "Content-Type: text/plain\n\n");
}

#[test]
fn rendering_is_deterministic() {
    let src = r#"
def[row](n){"<tr>" n "</tr>"}
def[rows](n){if(>(n)(0)){rows(-(n)(1)) row(n)}}
rows(5) " " /(2)(3)
"#;
    let first = render(src);
    assert_eq!(first, "<tr>1</tr><tr>2</tr><tr>3</tr><tr>4</tr><tr>5</tr> 0.666666666666667");
    for _ in 0..3 {
        assert_eq!(render(src), first);
    }
}
