//! End-to-end tests of the semantic core through the `Compiler` facade.
//!
//! Each test builds a small program with `AstBuilder`, compiles it and
//! checks the registry or the typed IR.

use tern::core::{NumericKind, VTABLE_RESERVED_SLOTS};
use tern::registry::ir::{Constant, Stmt, Value, ValueKind};
use tern::syntax::ast::Item;
use tern::{AstBuilder, Bump, CompilationError, Compiler, CompilerOptions, ErrorKind, IrModule, Result, Type};

/// Route `tracing` output to the test harness; set `RUST_LOG=debug` to see it.
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn compile<'ast>(ast: &AstBuilder<'ast>, items: &[Item<'ast>]) -> (Compiler<'ast>, Result<IrModule>) {
    init_tracing();
    let mut compiler = Compiler::new().unwrap();
    let result = compiler.compile(&ast.unit("main", items));
    (compiler, result)
}

fn funcs_named(compiler: &Compiler<'_>, name: &str) -> Vec<tern::core::FuncId> {
    compiler
        .registry()
        .funcs()
        .filter(|(_, func)| func.name == name)
        .map(|(id, _)| id)
        .collect()
}

fn types_named(compiler: &Compiler<'_>, name: &str) -> Vec<tern::core::TypeId> {
    compiler
        .registry()
        .types()
        .filter(|(_, ty)| ty.name == name)
        .map(|(id, _)| id)
        .collect()
}

/// The value of the first statement of `sample`.
fn sample_value(compiler: &Compiler<'_>) -> Value {
    let sample = funcs_named(compiler, "sample")[0];
    match &compiler.registry().func(sample).body.as_ref().unwrap().stmts[0] {
        Stmt::Expr(value) => value.clone(),
        other => panic!("unexpected statement {:?}", other),
    }
}

// =============================================================================
// Type model
// =============================================================================

#[test]
fn identity_is_reflexive_and_structural() {
    let i64 = Type::numeric(NumericKind::I64);
    assert!(i64.is(&i64));
    assert!(!i64.is(&Type::i32()));

    let f = Type::function(vec![Type::i32()], Type::f64(), false);
    assert!(f.is(&Type::function(vec![Type::i32()], Type::f64(), false)));
    assert!(!f.is(&Type::function(vec![Type::i32()], Type::f64(), true)));
    assert!(Type::reference(f.clone()).is(&Type::reference(f)));
}

#[test]
fn casts_follow_the_hierarchy_upward_only() {
    let arena = Bump::new();
    let ast = AstBuilder::new(&arena);
    let animal = ast.class("Animal").item();
    let dog = ast.class("Dog").parent(ast.ty("Animal")).item();
    let puppy = ast.class("Puppy").parent(ast.ty("Dog")).item();
    let (compiler, result) = compile(&ast, &[animal, dog, puppy]);
    result.unwrap();

    let registry = compiler.registry();
    let animal = registry.type_of(types_named(&compiler, "Animal")[0]);
    let dog = registry.type_of(types_named(&compiler, "Dog")[0]);
    let puppy = registry.type_of(types_named(&compiler, "Puppy")[0]);

    assert!(registry.can_cast(&dog, &animal));
    assert!(!registry.can_cast(&animal, &dog));
    assert!(!registry.can_cast(&puppy, &animal));
    assert_eq!(registry.cast_chain(&puppy, &animal), Some(2));
    assert_eq!(registry.cast_chain(&animal, &puppy), None);
    assert!(!registry.can_cast(&Type::bool(), &Type::i32()));
}

// =============================================================================
// Calls
// =============================================================================

#[test]
fn default_arguments_fill_missing_parameters() {
    let arena = Bump::new();
    let ast = AstBuilder::new(&arena);
    let f = ast
        .function("f")
        .param("a", ast.ty("i32"))
        .param_with_default("b", ast.ty("i32"), ast.int(5))
        .body(&[])
        .item();
    let call = ast.call(ast.name("f"), &[ast.int(3)]);
    let sample = ast.function("sample").body(&[ast.expr_stmt(call)]).item();
    let (compiler, result) = compile(&ast, &[f, sample]);
    result.unwrap();

    let value = sample_value(&compiler);
    let args: Vec<_> = value
        .as_call()
        .unwrap()
        .args
        .iter()
        .map(|arg| arg.as_constant().cloned())
        .collect();
    assert_eq!(args, vec![Some(Constant::Int(3)), Some(Constant::Int(5))]);
}

#[test]
fn defaults_resolve_names_where_the_function_is_declared() {
    let arena = Bump::new();
    let ast = AstBuilder::new(&arena);
    let five = Item::Var(ast.global("five", None, Some(ast.int(5))));
    let f = ast
        .function("f")
        .param("a", ast.ty("i32"))
        .param_with_default("b", ast.ty("i32"), ast.name("five"))
        .body(&[])
        .item();
    let lib = ast.unit("lib", &[five, f]);

    // `five` in main is a different value of a different type.
    let import = Item::Import(ast.import(&["lib"]));
    let shadow = Item::Var(ast.global("five", None, Some(ast.float(5.0))));
    let call = ast.call(ast.path(ast.name("lib"), "f"), &[ast.int(3)]);
    let sample = ast.function("sample").body(&[ast.expr_stmt(call)]).item();
    let main = ast.unit("main", &[import, shadow, sample]);

    let mut compiler = Compiler::new().unwrap();
    compiler.compile_all(&[lib, main]).unwrap();

    let value = sample_value(&compiler);
    let default = &value.as_call().unwrap().args[1];
    assert!(matches!(&default.kind, ValueKind::Global { name, .. } if name == "five"));
    assert!(default.ty.is(&Type::i32()));
}

#[test]
fn variadic_functions_need_their_fixed_parameters() {
    let arena = Bump::new();
    let ast = AstBuilder::new(&arena);
    let log = ast.function("log").param("level", ast.ty("i32")).variadic().item();

    let call = ast.call(ast.name("log"), &[ast.int(1), ast.boolean(true), ast.float(2.0)]);
    let sample = ast.function("sample").body(&[ast.expr_stmt(call)]).item();
    let (compiler, result) = compile(&ast, &[log, sample]);
    result.unwrap();
    assert_eq!(sample_value(&compiler).as_call().unwrap().args.len(), 3);

    let call = ast.call(ast.name("log"), &[]);
    let sample = ast.function("sample").body(&[ast.expr_stmt(call)]).item();
    let (_, result) = compile(&ast, &[log, sample]);
    let err = result.unwrap_err();
    assert!(matches!(err, CompilationError::MissingArgument { ref param, .. } if param == "level"));
}

#[test]
fn overloads_pick_the_fewest_casts() {
    let arena = Bump::new();
    let ast = AstBuilder::new(&arena);
    let by_int = ast.function("show").param("x", ast.ty("i32")).item();
    let by_float = ast.function("show").param("x", ast.ty("f64")).item();
    let call = ast.call(ast.name("show"), &[ast.float(1.0)]);
    let sample = ast.function("sample").body(&[ast.expr_stmt(call)]).item();
    let (compiler, result) = compile(&ast, &[by_int, by_float, sample]);
    result.unwrap();

    let value = sample_value(&compiler);
    let call = value.as_call().unwrap();
    let tern::registry::ir::Callee::Function(func) = call.callee else {
        panic!("expected a direct call");
    };
    assert!(compiler.registry().func(func).params[0].ty.is(&Type::f64()));
    assert!(!call.args[0].is_cast());
}

// =============================================================================
// Classes
// =============================================================================

#[test]
fn overrides_reuse_slots_and_new_virtuals_append() {
    let arena = Bump::new();
    let ast = AstBuilder::new(&arena);
    let shape = ast
        .class("Shape")
        .method(ast.function("area").virtual_().returns(ast.ty("f64")).build())
        .method(ast.function("describe").virtual_().build())
        .item();
    let circle = ast
        .class("Circle")
        .parent(ast.ty("Shape"))
        .method(ast.function("area").returns(ast.ty("f64")).build())
        .method(ast.function("radius").virtual_().returns(ast.ty("f64")).build())
        .item();
    let (compiler, result) = compile(&ast, &[shape, circle]);
    result.unwrap();

    let registry = compiler.registry();
    let shape = registry.defined(types_named(&compiler, "Shape")[0]);
    let circle = registry.defined(types_named(&compiler, "Circle")[0]);
    assert_eq!(circle.vtable.len(), shape.vtable.len() + 1);

    let base_area = registry.func(shape.vtable[0]);
    let area = registry.func(circle.vtable[0]);
    assert_ne!(shape.vtable[0], circle.vtable[0]);
    assert_eq!(area.virtual_slot, base_area.virtual_slot);
    assert_eq!(circle.vtable[1], shape.vtable[1]);

    let radius = registry.func(circle.vtable[2]);
    assert_eq!(radius.virtual_slot, Some(shape.vtable.len() as u32));
    assert_eq!(
        radius.dispatch_offset(),
        Some(VTABLE_RESERVED_SLOTS + shape.vtable.len() as u32)
    );
}

#[test]
fn extending_classes_cannot_change_layout() {
    let arena = Bump::new();
    let ast = AstBuilder::new(&arena);
    let base = ast.class("Base").field("x", ast.ty("i32")).item();
    let extension = ast
        .class("Extra")
        .parent(ast.ty("Base"))
        .extends()
        .field("y", ast.ty("i32"))
        .item();
    let (_, result) = compile(&ast, &[base, extension]);
    let err = result.unwrap_err();
    assert!(matches!(err, CompilationError::ExtendsViolation { what: "new fields", .. }));
    assert_eq!(err.kind(), ErrorKind::TypeError);

    let helpers = ast
        .class("Helpers")
        .parent(ast.ty("Base"))
        .extends()
        .method(ast.function("twice").returns(ast.ty("i32")).build())
        .item();
    let (_, result) = compile(&ast, &[base, helpers]);
    result.unwrap();
}

#[test]
fn private_types_stay_inside_their_module() {
    let arena = Bump::new();
    let ast = AstBuilder::new(&arena);
    let secret = ast.class("Secret").private().item();
    let keeper = Item::Var(ast.global("kept", Some(ast.ty("Secret")), None));
    let lib = ast.unit("lib", &[secret, keeper]);

    let import = Item::Import(ast.import(&["lib"]));
    let leak = Item::Var(ast.global(
        "leak",
        Some(ast.path_ty(&[("lib", &[]), ("Secret", &[])])),
        None,
    ));
    let main = ast.unit("main", &[import, leak]);

    let mut compiler = Compiler::new().unwrap();
    compiler.compile(&lib).unwrap();
    let err = compiler.compile(&main).unwrap_err();
    assert!(matches!(err, CompilationError::PrivateType { ref name, .. } if name == "Secret"));

    let report = Compiler::report(err, "global leak: lib::Secret;");
    assert!(report.contains("help:"));
}

// =============================================================================
// Mangling
// =============================================================================

#[test]
fn mangled_names_are_deterministic() {
    let build = || {
        let arena = Bump::new();
        let ast = AstBuilder::new(&arena);
        let point = ast
            .class("Point")
            .method(ast.function("len").returns(ast.ty("f64")).build())
            .item();
        let (compiler, result) = compile(&ast, &[point]);
        result.unwrap();
        let len = funcs_named(&compiler, "len")[0];
        let point = types_named(&compiler, "Point")[0];
        (
            compiler.registry().mangled_func_name(len),
            compiler.registry().mangled_type_name(point),
        )
    };
    assert_eq!(build(), build());
}

#[test]
fn mangled_names_do_not_collide() {
    let arena = Bump::new();
    let ast = AstBuilder::new(&arena);
    let a = Item::Module(ast.module("a", &[ast.class("Node").item()]));
    let b = Item::Module(ast.module("b", &[ast.class("Node").item()]));
    let by_int = ast.function("show").param("x", ast.ty("i32")).item();
    let by_float = ast.function("show").param("x", ast.ty("f64")).item();
    let (compiler, result) = compile(&ast, &[a, b, by_int, by_float]);
    result.unwrap();

    let registry = compiler.registry();
    let nodes = types_named(&compiler, "Node");
    assert_eq!(nodes.len(), 2);
    assert_ne!(registry.mangled_type_name(nodes[0]), registry.mangled_type_name(nodes[1]));

    let shows = funcs_named(&compiler, "show");
    assert_ne!(registry.mangled_func_name(shows[0]), registry.mangled_func_name(shows[1]));
}

#[test]
fn options_are_applied() {
    let compiler = Compiler::with_options(CompilerOptions::new().with_prelude(false)).unwrap();
    assert!(!compiler.options().with_prelude);
    assert!(types_named(&compiler, "String").is_empty());

    let compiler = Compiler::new().unwrap();
    assert_eq!(types_named(&compiler, "String").len(), 1);
}
