//! # Sylva 性能基准测试
//!
//! 使用 Criterion.rs 进行性能基准测试。
//!
//! ## 基准测试分组
//! - `scan`: 参考扫描器
//! - `frontend`: 预扫描 + 解析 + 解析/折叠
//!
//! ## 使用方法
//! ```bash
//! cargo bench           # 运行所有
//! cargo bench frontend  # 只运行前端测试
//! ```

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use std::hint::black_box;
use sylva::frontend::lexer::scan;
use sylva::Compiler;

fn nested_expression(depth: usize) -> String {
    format!(
        "function f(int a) : int {{ return {}a{}; }}",
        "(".repeat(depth),
        " + 1)".repeat(depth)
    )
}

fn program(functions: usize) -> String {
    (0..functions)
        .map(|i| {
            format!(
                "function f{i}(int a, real b) : real {{
                     int c = a * {i} + 2 ** 3;
                     for (int k = 0; k < c; k++) {{ b += k / 2.0; }}
                     return b;
                 }}"
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn bench_scan(c: &mut Criterion) {
    let source = program(50);
    c.bench_function("scan/program_50", |b| b.iter(|| scan(black_box(&source))));
}

fn bench_frontend(c: &mut Criterion) {
    let compiler = Compiler::new();
    let mut group = c.benchmark_group("frontend");
    for depth in [10usize, 100, 1000] {
        let source = nested_expression(depth);
        group.bench_with_input(BenchmarkId::new("nested", depth), &source, |b, source| {
            b.iter(|| compiler.compile(black_box(source)))
        });
    }
    let source = program(50);
    group.bench_function("program_50", |b| b.iter(|| compiler.compile(black_box(&source))));
    group.finish();
}

fn bench_batch(c: &mut Criterion) {
    let compiler = Compiler::new();
    let sources: Vec<String> = (0..16).map(|_| program(10)).collect();
    c.bench_function("frontend/compile_many_16", |b| {
        b.iter(|| compiler.compile_many(black_box(&sources)))
    });
}

criterion_group!(benches, bench_scan, bench_frontend, bench_batch);
criterion_main!(benches);
