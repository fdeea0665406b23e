//! Benchmarks for indexing and call graph construction.
//!
//! Run with: `cargo bench`

use std::path::PathBuf;

use callgraph_dot::domain::unit::{CompilationUnit, Program};
use callgraph_dot::infrastructure::SynCallGraphBuilder;
use callgraph_dot::ports::dot_exporter::DotExporter;
use callgraph_dot::ports::CallGraphBuilder;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

// ═══════════════════════════════════════════════════════════════════════════
// Synthetic Source Generators
// ═══════════════════════════════════════════════════════════════════════════

/// One module per file; every function calls its neighbour, a function in
/// the next module, and a method on a local struct.
fn synthetic_units(num_modules: usize, fns_per_module: usize) -> Vec<CompilationUnit> {
    let mut root = String::new();
    for m in 0..num_modules {
        root.push_str(&format!("pub mod m{m};\n"));
    }
    let mut units = vec![CompilationUnit::parse(
        "bench",
        vec!["bench".to_string()],
        &PathBuf::from("src/lib.rs"),
        &root,
    )
    .unwrap()];

    for m in 0..num_modules {
        let next = (m + 1) % num_modules;
        let mut src = String::from("pub struct S;\nimpl S {\n    pub fn step(&self) {}\n}\n");
        for f in 0..fns_per_module {
            let callee = (f + 1) % fns_per_module;
            src.push_str(&format!(
                "pub fn f{f}(s: &S) {{\n    f{callee}(s);\n    crate::m{next}::f0(&crate::m{next}::S);\n    s.step();\n    println!(\"{{}}\", helper{f}());\n}}\n\
                 fn helper{f}() -> u32 {{ u32::from(1u8) }}\n"
            ));
        }
        units.push(
            CompilationUnit::parse(
                "bench",
                vec!["bench".to_string(), format!("m{m}")],
                &PathBuf::from(format!("src/m{m}.rs")),
                &src,
            )
            .unwrap(),
        );
    }
    units
}

// ═══════════════════════════════════════════════════════════════════════════
// Benchmarks
// ═══════════════════════════════════════════════════════════════════════════

fn bench_index(c: &mut Criterion) {
    let mut group = c.benchmark_group("callgraph/index");

    for num_modules in [10, 50, 200].iter() {
        let units = synthetic_units(*num_modules, 20);
        group.throughput(Throughput::Elements((*num_modules * 20) as u64));
        group.bench_with_input(BenchmarkId::new("modules", num_modules), &units, |b, units| {
            b.iter(|| Program::new(black_box(units.clone()), &[]))
        });
    }

    group.finish();
}

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("callgraph/build");
    group.sample_size(30);

    for num_modules in [10, 50, 200].iter() {
        let program = Program::new(synthetic_units(*num_modules, 20), &[]);
        group.throughput(Throughput::Elements((*num_modules * 20) as u64));
        group.bench_with_input(BenchmarkId::new("modules", num_modules), &program, |b, program| {
            b.iter(|| SynCallGraphBuilder::new().build_call_graph(black_box(program)))
        });
    }

    group.finish();
}

fn bench_dot(c: &mut Criterion) {
    let program = Program::new(synthetic_units(100, 20), &[]);
    let cg = SynCallGraphBuilder::new().build_call_graph(&program);
    c.bench_function("callgraph/dot", |b| b.iter(|| DotExporter::to_dot(black_box(&cg))));
}

criterion_group!(benches, bench_index, bench_build, bench_dot);
criterion_main!(benches);
