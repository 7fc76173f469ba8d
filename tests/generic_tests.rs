//! Generic classes, functions and methods through the `Compiler` facade.

use tern::registry::ir::{Callee, Stmt};
use tern::syntax::ast::Item;
use tern::{AstBuilder, Bump, CompilationError, Compiler, CompilerOptions, Type};

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

/// `class Box<T> { value: T; get() -> T { return self.value; } }`
fn boxed<'ast>(ast: &AstBuilder<'ast>) -> Item<'ast> {
    let get = ast
        .function("get")
        .returns(ast.ty("T"))
        .body(&[ast.ret(Some(ast.member(ast.name("self"), "value")))])
        .build();
    ast.class("Box")
        .generic("T")
        .field("value", ast.ty("T"))
        .method(get)
        .item()
}

#[test]
fn box_end_to_end() {
    let arena = Bump::new();
    let ast = AstBuilder::new(&arena);
    let box_i32 = || ast.generic_ty("Box", &[ast.ty("i32")]);
    let a = Item::Var(ast.global("a", Some(box_i32()), None));
    let b = Item::Var(ast.global("b", Some(box_i32()), None));
    let c = Item::Var(ast.global("c", Some(ast.generic_ty("Box", &[ast.ty("f64")])), None));
    let read = ast.call(ast.member(ast.name("a"), "get"), &[]);
    let sample = ast
        .function("sample")
        .returns(ast.ty("i32"))
        .body(&[ast.ret(Some(read))])
        .item();

    let mut compiler = Compiler::new().unwrap();
    let ir = compiler
        .compile(&ast.unit("main", &[boxed(&ast), a, b, c, sample]))
        .unwrap();
    let registry = compiler.registry();

    // Two instances, shared by the globals that name the same arguments.
    let boxes = types_named(&compiler, "Box");
    assert_eq!(boxes.len(), 2);
    assert!(ir.globals[0].ty.is(&ir.globals[1].ty));
    assert!(!ir.globals[0].ty.is(&ir.globals[2].ty));
    let uuid = registry.defined(boxes[0]).uuid;
    assert_eq!(compiler.context().cache().type_instances(uuid).len(), 2);
    assert_eq!(registry.defined(boxes[1]).uuid, uuid);

    // One `get` per instance, with distinct linkage names and bound types.
    let gets = funcs_named(&compiler, "get");
    assert_eq!(gets.len(), 2);
    assert_ne!(registry.mangled_func_name(gets[0]), registry.mangled_func_name(gets[1]));
    assert!(registry.func(gets[0]).ret.is(&Type::i32()));
    assert!(registry.func(gets[1]).ret.is(&Type::f64()));
    assert_ne!(registry.mangled_type_name(boxes[0]), registry.mangled_type_name(boxes[1]));

    let sample = registry.func(funcs_named(&compiler, "sample")[0]);
    let Stmt::Return(Some(value)) = &sample.body.as_ref().unwrap().stmts[0] else {
        panic!("expected a return");
    };
    assert_eq!(value.as_call().unwrap().callee, Callee::Function(gets[0]));
}

#[test]
fn instances_are_shared_across_units() {
    let arena = Bump::new();
    let ast = AstBuilder::new(&arena);
    let lib = ast.unit("lib", &[boxed(&ast)]);

    let import = Item::Import(ast.import(&["lib"]));
    let ty = || ast.path_ty(&[("lib", &[]), ("Box", &[ast.ty("i32")])]);
    let x = Item::Var(ast.global("x", Some(ty()), None));
    let y = Item::Var(ast.global("y", Some(ty()), None));
    let main = ast.unit("main", &[import, x, y]);

    let mut compiler = Compiler::new().unwrap();
    let modules = compiler.compile_all(&[lib, main]).unwrap();
    assert!(modules[0].types.is_empty());
    assert_eq!(modules[1].types.len(), 1);
    assert_eq!(types_named(&compiler, "Box").len(), 1);

    // The instance lives in the declaring module.
    let instance = compiler.registry().defined(types_named(&compiler, "Box")[0]);
    assert_eq!(compiler.registry().module_path(instance.module), "lib");
}

#[test]
fn generic_functions_are_instantiated_on_demand() {
    let arena = Bump::new();
    let ast = AstBuilder::new(&arena);
    let pick = ast
        .function("pick")
        .generic("T")
        .param("a", ast.ty("T"))
        .param("b", ast.ty("T"))
        .returns(ast.ty("T"))
        .body(&[ast.ret(Some(ast.name("a")))])
        .item();
    let calls = [
        ast.expr_stmt(ast.call(ast.generic_name("pick", &[ast.ty("i32")]), &[ast.int(1), ast.int(2)])),
        ast.expr_stmt(ast.call(ast.generic_name("pick", &[ast.ty("i32")]), &[ast.int(3), ast.int(4)])),
        ast.expr_stmt(ast.call(ast.generic_name("pick", &[ast.ty("f64")]), &[ast.int(5), ast.float(6.0)])),
    ];
    let sample = ast.function("sample").body(&calls).item();

    let mut compiler = Compiler::new().unwrap();
    compiler.compile(&ast.unit("main", &[pick, sample])).unwrap();

    let picks = funcs_named(&compiler, "pick");
    assert_eq!(picks.len(), 2);
    assert_eq!(compiler.context().cache().function_instance_count(), 2);
    let registry = compiler.registry();
    assert_ne!(registry.mangled_func_name(picks[0]), registry.mangled_func_name(picks[1]));
}

#[test]
fn wrong_generic_arity_is_reported() {
    let arena = Bump::new();
    let ast = AstBuilder::new(&arena);
    let pair = Item::Var(ast.global(
        "p",
        Some(ast.generic_ty("Box", &[ast.ty("i32"), ast.ty("f64")])),
        None,
    ));
    let mut compiler = Compiler::new().unwrap();
    let err = compiler
        .compile(&ast.unit("main", &[boxed(&ast), pair]))
        .unwrap_err();
    assert!(matches!(err, CompilationError::GenericArity { expected: 1, got: 2, .. }));
}

#[test]
fn runaway_instantiation_is_bounded() {
    let arena = Bump::new();
    let ast = AstBuilder::new(&arena);
    let grow = ast.generic_ty("Grow", &[ast.generic_ty("Grow", &[ast.ty("T")])]);
    let class = ast.class("Grow").generic("T").field("next", ast.ref_ty(grow)).item();
    let root = Item::Var(ast.global("g", Some(ast.generic_ty("Grow", &[ast.ty("i32")])), None));

    let options = CompilerOptions::new().max_instantiation_depth(4);
    let mut compiler = Compiler::with_options(options).unwrap();
    let err = compiler.compile(&ast.unit("main", &[class, root])).unwrap_err();
    assert!(matches!(err, CompilationError::InstantiationDepth { limit: 4, .. }));
}
