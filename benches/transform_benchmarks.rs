//! Performance benchmarks for the transformer.
//!
//! Workloads are built with `AstBuilder` and stress the parts of the pipeline
//! that grow with program size:
//! - generic instantiation and the instance cache
//! - class hierarchies and vtable construction
//! - overload resolution at call sites
//!
//! ## Profiling with Puffin
//!
//! ```bash
//! cargo bench --features profile-with-puffin -- --profile-time 5
//! ```

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use std::hint::black_box;
use tern::syntax::ast::{Item, Stmt, TypeExpr};
use tern::{AstBuilder, Bump, Compiler};

#[cfg(feature = "profile-with-puffin")]
static FRAME_VIEW: std::sync::OnceLock<puffin::GlobalFrameView> = std::sync::OnceLock::new();

#[cfg(feature = "profile-with-puffin")]
fn setup_profiler() {
    puffin::set_scopes_on(true);
    FRAME_VIEW.get_or_init(puffin::GlobalFrameView::default);
}

#[cfg(not(feature = "profile-with-puffin"))]
fn setup_profiler() {}

#[cfg(feature = "profile-with-puffin")]
fn end_profiling_frame() {
    puffin::GlobalProfiler::lock().new_frame();
}

#[cfg(not(feature = "profile-with-puffin"))]
fn end_profiling_frame() {}

// =============================================================================
// Workloads
// =============================================================================

/// `Box<T>` plus one global per nesting level: `Box<i32>`, `Box<Box<i32>>`, ...
fn nested_generics<'ast>(ast: &AstBuilder<'ast>, levels: usize) -> Vec<Item<'ast>> {
    let get = ast
        .function("get")
        .returns(ast.ty("T"))
        .body(&[ast.ret(Some(ast.member(ast.name("self"), "value")))])
        .build();
    let mut items = vec![
        ast.class("Box")
            .generic("T")
            .field("value", ast.ty("T"))
            .method(get)
            .item(),
    ];

    let mut ty: TypeExpr<'ast> = ast.ty("i32");
    for level in 0..levels {
        ty = ast.generic_ty("Box", &[ty]);
        items.push(Item::Var(ast.global(&format!("g{}", level), Some(ty), None)));
    }
    items
}

/// A chain of classes, each overriding the root's virtual method and adding
/// one of its own.
fn deep_hierarchy<'ast>(ast: &AstBuilder<'ast>, depth: usize) -> Vec<Item<'ast>> {
    let mut items = vec![
        ast.class("C0")
            .method(ast.function("area").virtual_().returns(ast.ty("f64")).build())
            .item(),
    ];
    for level in 1..depth {
        let parent = format!("C{}", level - 1);
        let own = format!("extra{}", level);
        items.push(
            ast.class(&format!("C{}", level))
                .parent(ast.ty(&parent))
                .field(&format!("f{}", level), ast.ty("i32"))
                .method(ast.function("area").returns(ast.ty("f64")).build())
                .method(ast.function(&own).virtual_().build())
                .item(),
        );
    }
    items
}

/// Overloaded `show` and a function calling it with mixed argument types.
fn overloaded_calls<'ast>(ast: &AstBuilder<'ast>, calls: usize) -> Vec<Item<'ast>> {
    let mut items = vec![
        ast.function("show").param("x", ast.ty("i32")).item(),
        ast.function("show").param("x", ast.ty("f64")).item(),
        ast.function("show")
            .param("x", ast.ty("i64"))
            .param_with_default("y", ast.ty("i32"), ast.int(0))
            .item(),
    ];
    let stmts: Vec<Stmt<'ast>> = (0..calls)
        .map(|index| {
            let arg = if index % 2 == 0 {
                ast.int(index as i64)
            } else {
                ast.float(index as f64)
            };
            ast.expr_stmt(ast.call(ast.name("show"), &[arg]))
        })
        .collect();
    items.push(ast.function("run").body(&stmts).item());
    items
}

// =============================================================================
// Benchmarks
// =============================================================================

fn run_workload<'ast>(ast: &AstBuilder<'ast>, items: &[Item<'ast>]) -> usize {
    let mut compiler = Compiler::new().unwrap();
    let ir = compiler.compile(&ast.unit("main", items)).unwrap();
    end_profiling_frame();
    ir.functions.len() + ir.types.len()
}

fn generic_benchmarks(c: &mut Criterion) {
    setup_profiler();
    let mut group = c.benchmark_group("transform/generics");

    for levels in [4usize, 16, 48] {
        let arena = Bump::new();
        let ast = AstBuilder::new(&arena);
        let items = nested_generics(&ast, levels);
        group.throughput(Throughput::Elements(levels as u64));
        group.bench_with_input(BenchmarkId::new("nested_box", levels), &items, |b, items| {
            b.iter(|| black_box(run_workload(&ast, black_box(items))));
        });
    }
    group.finish();
}

fn class_benchmarks(c: &mut Criterion) {
    setup_profiler();
    let mut group = c.benchmark_group("transform/classes");

    for depth in [8usize, 64, 256] {
        let arena = Bump::new();
        let ast = AstBuilder::new(&arena);
        let items = deep_hierarchy(&ast, depth);
        group.throughput(Throughput::Elements(depth as u64));
        group.bench_with_input(BenchmarkId::new("hierarchy", depth), &items, |b, items| {
            b.iter(|| black_box(run_workload(&ast, black_box(items))));
        });
    }
    group.finish();
}

fn call_benchmarks(c: &mut Criterion) {
    setup_profiler();
    let mut group = c.benchmark_group("transform/calls");

    for calls in [16usize, 256, 2048] {
        let arena = Bump::new();
        let ast = AstBuilder::new(&arena);
        let items = overloaded_calls(&ast, calls);
        group.throughput(Throughput::Elements(calls as u64));
        group.bench_with_input(BenchmarkId::new("overloads", calls), &items, |b, items| {
            b.iter(|| black_box(run_workload(&ast, black_box(items))));
        });
    }
    group.finish();
}

criterion_group!(benches, generic_benchmarks, class_benchmarks, call_benchmarks);
criterion_main!(benches);
