use std::rc::Rc;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use vision::config::Options;
use vision::host::MemoryHost;
use vision::script::{tokenize, Interpreter};

const PRELUDE: &str = r#"
def[cell]{t}{"<td>" t "</td>"}
def[row](n){"<tr>" cell{"#"} cell{n} cell{*(n)(n)} "</tr>"}
def[rows](n){if(>(n)(0)){rows(-(n)(1)) row(n)}}
"#;

fn page(rows: usize) -> String {
    format!("{PRELUDE}\"<table>\" rows({rows}) \"</table>\"")
}

fn fresh() -> Interpreter {
    Interpreter::with_host(Options::default(), Rc::new(MemoryHost::new()))
}

fn bench_render(c: &mut Criterion) {
    let small = page(10);
    let large = page(200);

    let mut g = c.benchmark_group("render");

    g.bench_function("tokenize_large", |b| {
        b.iter(|| tokenize(black_box(&large), 4))
    });
    g.bench_function("parse_large", |b| {
        let interp = fresh();
        b.iter(|| interp.parse(black_box(&large)))
    });
    g.bench_function("run_small", |b| {
        b.iter(|| fresh().run(black_box(&small)))
    });
    g.bench_function("run_large", |b| {
        b.iter(|| fresh().run(black_box(&large)))
    });

    g.finish();
}

criterion_group!(benches, bench_render);
criterion_main!(benches);
