//! End-to-end tests for the six scenarios in SPEC_FULL.md §8's
//! testable-properties section: scalar overload resolution (3, 4), pointer
//! mutation (5), array element types via the array extension (1, 2), and
//! host-bound external symbols (6).

use inkwell::context::Context as LlvmContext;
use mlvm_backend::{mangle, ArrayExtension, Backend};
use mlvm_builder::{BuildError, Builder};
use mlvm_ir::Context;
use mlvm_jit::{HostValue, Jit};
use mlvm_llvm::{BackendConfig, LlvmBackend};

fn new_backend(llvm_context: &LlvmContext) -> LlvmBackend<'_> {
    LlvmBackend::new(llvm_context, "execution_scenarios", BackendConfig::native()).unwrap_or_else(|err| panic!("backend construction failed: {err}"))
}

/// Builds a wrapper IR function `name(array_<elem>, array_<elem>,
/// array_<elem>, address) -> void` whose body just forwards its arguments
/// to the `array_add` intrinsic, the way `array_add` would be reached in
/// practice: callers never invoke an intrinsic directly from the host, they
/// compile a function that calls it.
fn define_vector_add(ctx: &mut Context, name: &str, elem: &str) {
    let array_ty = format!("array_{elem}");
    let arg_types = vec![array_ty.clone(), array_ty.clone(), array_ty, "address".to_string()];

    ctx.get_or_insert_function(name)
        .unwrap_or_else(|err| panic!("{err}"))
        .add_definition("void", arg_types.clone())
        .unwrap_or_else(|err| panic!("{err}"));

    let mut imp = ctx
        .get_function(name)
        .unwrap_or_else(|| unreachable!("just inserted"))
        .definition(&arg_types)
        .unwrap_or_else(|| unreachable!("just inserted"))
        .begin_implementation()
        .unwrap_or_else(|err| panic!("{err}"));

    let lary = imp.alloc_argument(arg_types[0].as_str());
    let rary = imp.alloc_argument(arg_types[1].as_str());
    let dary = imp.alloc_argument(arg_types[2].as_str());
    let n = imp.alloc_argument("address");
    let entry = imp.alloc_block();
    let mut builder = Builder::new(ctx, &mut imp, entry);
    builder
        .call("array_add", &[lary.into(), rary.into(), dary.into(), n.into()])
        .unwrap_or_else(|err| panic!("{err}"));
    builder.ret(None).unwrap_or_else(|err| panic!("{err}"));

    ctx.get_function_mut(name)
        .unwrap_or_else(|| unreachable!("just inserted"))
        .definition_mut(&arg_types)
        .unwrap_or_else(|| unreachable!("just inserted"))
        .finish_implementation(imp)
        .unwrap_or_else(|err| panic!("{err}"));
}

/// Scenario 1: `array_add` over `array_float` writes the element-wise sum
/// of two flat `f32` buffers into a third, through the array extension's
/// pointer-shaped backend representation and counting loop.
#[test]
fn scenario_1_vector_add_float() {
    let mut ctx = Context::new();
    ctx.install(vec![Box::new(ArrayExtension)]).unwrap_or_else(|err| panic!("{err}"));
    define_vector_add(&mut ctx, "vector_add_float", "float");

    let llvm_context = LlvmContext::create();
    let mut backend = new_backend(&llvm_context);
    backend.install(vec![Box::new(ArrayExtension)]);
    let mut jit = Jit::new();
    jit.register_backend("", backend).unwrap_or_else(|err| panic!("{err}"));

    let arg_types = vec!["array_float".to_string(), "array_float".to_string(), "array_float".to_string(), "address".to_string()];
    let handle = jit.compile_default(&ctx, "vector_add_float", &arg_types).unwrap_or_else(|err| panic!("{err}"));

    let lary: Vec<f32> = vec![1.0, 2.0, 3.0, 4.0];
    let rary: Vec<f32> = vec![10.0, 20.0, 30.0, 40.0];
    let mut dary: Vec<f32> = vec![0.0; 4];

    handle
        .call(&[
            HostValue::Ptr(lary.as_ptr().cast_mut().cast::<u8>()),
            HostValue::Ptr(rary.as_ptr().cast_mut().cast::<u8>()),
            HostValue::Ptr(dary.as_mut_ptr().cast::<u8>()),
            HostValue::Int(lary.len() as i64),
        ])
        .unwrap_or_else(|err| panic!("{err}"));

    assert_eq!(dary, vec![11.0, 22.0, 33.0, 44.0]);
}

/// Scenario 2: the same `array_add` intrinsic, instantiated over
/// `array_int32` instead of `array_float`, exercising the integer-arithmetic
/// branch of the same generic intrinsic body.
#[test]
fn scenario_2_vector_add_int32() {
    let mut ctx = Context::new();
    ctx.install(vec![Box::new(ArrayExtension)]).unwrap_or_else(|err| panic!("{err}"));
    define_vector_add(&mut ctx, "vector_add_int32", "int32");

    let llvm_context = LlvmContext::create();
    let mut backend = new_backend(&llvm_context);
    backend.install(vec![Box::new(ArrayExtension)]);
    let mut jit = Jit::new();
    jit.register_backend("", backend).unwrap_or_else(|err| panic!("{err}"));

    let arg_types = vec!["array_int32".to_string(), "array_int32".to_string(), "array_int32".to_string(), "address".to_string()];
    let handle = jit.compile_default(&ctx, "vector_add_int32", &arg_types).unwrap_or_else(|err| panic!("{err}"));

    let lary: Vec<i32> = vec![1, 2, 3, 4, 5];
    let rary: Vec<i32> = vec![100, 200, 300, 400, 500];
    let mut dary: Vec<i32> = vec![0; 5];

    handle
        .call(&[
            HostValue::Ptr(lary.as_ptr().cast_mut().cast::<u8>()),
            HostValue::Ptr(rary.as_ptr().cast_mut().cast::<u8>()),
            HostValue::Ptr(dary.as_mut_ptr().cast::<u8>()),
            HostValue::Int(lary.len() as i64),
        ])
        .unwrap_or_else(|err| panic!("{err}"));

    assert_eq!(dary, vec![101, 202, 303, 404, 505]);
}

/// Scenario 6: a function calls `host_square`, which is declared in the
/// `Context` (so overload resolution has a signature to check against) but
/// never compiled. The translator auto-declares it as an external symbol;
/// binding its runtime address through
/// [`mlvm_jit::Jit::link_external_symbol`] before the caller runs lets a
/// host-defined routine stand in for an "extra library".
#[test]
fn scenario_6_external_symbol_via_extra_library() {
    extern "C" fn host_square(x: i32) -> i32 {
        x * x
    }

    let mut ctx = Context::new();
    ctx.get_or_insert_function("host_square")
        .unwrap_or_else(|err| panic!("{err}"))
        .add_definition("int32", vec!["int32".to_string()])
        .unwrap_or_else(|err| panic!("{err}"));

    ctx.get_or_insert_function("call_host_square")
        .unwrap_or_else(|err| panic!("{err}"))
        .add_definition("int32", vec!["int32".to_string()])
        .unwrap_or_else(|err| panic!("{err}"));
    {
        let mut imp = ctx
            .get_function("call_host_square")
            .unwrap_or_else(|| unreachable!("just inserted"))
            .definition(&["int32".to_string()])
            .unwrap_or_else(|| unreachable!("just inserted"))
            .begin_implementation()
            .unwrap_or_else(|err| panic!("{err}"));
        let x = imp.alloc_argument("int32");
        let entry = imp.alloc_block();
        let mut builder = Builder::new(&ctx, &mut imp, entry);
        let result = builder.call("host_square", &[x.into()]).unwrap_or_else(|err| panic!("{err}"));
        builder.ret(Some(result)).unwrap_or_else(|err| panic!("{err}"));
        ctx.get_function_mut("call_host_square")
            .unwrap_or_else(|| unreachable!("just inserted"))
            .definition_mut(&["int32".to_string()])
            .unwrap_or_else(|| unreachable!("just inserted"))
            .finish_implementation(imp)
            .unwrap_or_else(|err| panic!("{err}"));
    }

    let llvm_context = LlvmContext::create();
    let backend = new_backend(&llvm_context);
    let mut jit = Jit::new();
    jit.register_backend("", backend).unwrap_or_else(|err| panic!("{err}"));

    let handle = jit
        .compile_default(&ctx, "call_host_square", &["int32".to_string()])
        .unwrap_or_else(|err| panic!("{err}"));

    let mangled_host_square = mangle("host_square", &["int32".to_string()]);
    jit.link_external_symbol("", &mangled_host_square, host_square as usize)
        .unwrap_or_else(|err| panic!("{err}"));

    let result = handle.call(&[HostValue::Int(6)]).unwrap_or_else(|err| panic!("{err}"));
    assert_eq!(result, Some(HostValue::Int(36)));
}

/// Scenario 3: an overload `scale(double) -> double` is called with a
/// `float` actual. Overload resolution must find the single candidate via
/// an implicit cast and insert `cast.float.double` ahead of the call, and
/// the compiled, JIT-executed function must reflect the cast value.
#[test]
fn scenario_3_implicit_cast_is_inserted_at_an_overloaded_call_site() {
    let mut ctx = Context::new();

    ctx.get_or_insert_function("scale")
        .unwrap_or_else(|err| panic!("{err}"))
        .add_definition("double", vec!["double".to_string()])
        .unwrap_or_else(|err| panic!("{err}"));
    {
        let mut imp = ctx
            .get_function("scale")
            .unwrap_or_else(|| unreachable!("just inserted"))
            .definition(&["double".to_string()])
            .unwrap_or_else(|| unreachable!("just inserted"))
            .begin_implementation()
            .unwrap_or_else(|err| panic!("{err}"));
        let x = imp.alloc_argument("double");
        let entry = imp.alloc_block();
        let mut builder = Builder::new(&ctx, &mut imp, entry);
        let two = builder.const_value("double", mlvm_ir::ConstantValue::Float(2.0));
        let doubled = builder.mul(x.into(), two).unwrap_or_else(|err| panic!("{err}"));
        builder.ret(Some(doubled)).unwrap_or_else(|err| panic!("{err}"));
        ctx.get_function_mut("scale")
            .unwrap_or_else(|| unreachable!("just inserted"))
            .definition_mut(&["double".to_string()])
            .unwrap_or_else(|| unreachable!("just inserted"))
            .finish_implementation(imp)
            .unwrap_or_else(|err| panic!("{err}"));
    }

    ctx.get_or_insert_function("call_scale_with_float")
        .unwrap_or_else(|err| panic!("{err}"))
        .add_definition("double", vec![])
        .unwrap_or_else(|err| panic!("{err}"));
    {
        let mut imp = ctx
            .get_function("call_scale_with_float")
            .unwrap_or_else(|| unreachable!("just inserted"))
            .definition(&[])
            .unwrap_or_else(|| unreachable!("just inserted"))
            .begin_implementation()
            .unwrap_or_else(|err| panic!("{err}"));
        let entry = imp.alloc_block();
        let mut builder = Builder::new(&ctx, &mut imp, entry);
        // A `float`-typed actual against a `double`-only overload: resolution
        // must pick `scale(double)` via an inserted `cast.float.double`.
        let arg = builder.const_value("float", mlvm_ir::ConstantValue::Float(3.5));
        let result = builder.call("scale", &[arg]).unwrap_or_else(|err| panic!("{err}"));
        builder.ret(Some(result)).unwrap_or_else(|err| panic!("{err}"));
        ctx.get_function_mut("call_scale_with_float")
            .unwrap_or_else(|| unreachable!("just inserted"))
            .definition_mut(&[])
            .unwrap_or_else(|| unreachable!("just inserted"))
            .finish_implementation(imp)
            .unwrap_or_else(|err| panic!("{err}"));
    }

    let llvm_context = LlvmContext::create();
    let backend = new_backend(&llvm_context);
    let mut jit = Jit::new();
    jit.register_backend("", backend).unwrap_or_else(|err| panic!("{err}"));

    // `scale` must be compiled into the shared module before the caller
    // references it, since the Backend resolves calls against functions
    // already declared in the module.
    jit.compile_default(&ctx, "scale", &["double".to_string()]).unwrap_or_else(|err| panic!("{err}"));
    let handle = jit.compile_default(&ctx, "call_scale_with_float", &[]).unwrap_or_else(|err| panic!("{err}"));

    let result = handle.call(&[]).unwrap_or_else(|err| panic!("{err}"));
    assert_eq!(result, Some(HostValue::Float(7.0)));
}

/// Scenario 4: overloads `foo(int32)` and `foo(int64)` both accept a
/// `uint16` actual via one implicit cast each, tying at the minimum rank.
/// `Builder::call` must fail with `MultiplePossibleDefinition` rather than
/// pick either arbitrarily.
#[test]
fn scenario_4_tied_overloads_fail_with_multiple_possible_definition() {
    let mut ctx = Context::new();
    let foo = ctx.get_or_insert_function("foo").unwrap_or_else(|err| panic!("{err}"));
    foo.add_definition("int32", vec!["int32".to_string()]).unwrap_or_else(|err| panic!("{err}"));
    foo.add_definition("int32", vec!["int64".to_string()]).unwrap_or_else(|err| panic!("{err}"));

    let mut imp = ctx
        .get_function("foo")
        .unwrap_or_else(|| unreachable!("just inserted"))
        .definition(&["int32".to_string()])
        .unwrap_or_else(|| unreachable!("just inserted"))
        .begin_implementation()
        .unwrap_or_else(|err| panic!("{err}"));

    let entry = imp.alloc_block();
    let mut builder = Builder::new(&ctx, &mut imp, entry);
    let ambiguous_arg = builder.const_value("uint16", mlvm_ir::ConstantValue::Int(7));
    let err = builder.call("foo", &[ambiguous_arg]).unwrap_err();
    assert!(matches!(err, BuildError::MultiplePossibleDefinition(name) if name == "foo"));
}

/// Scenario 5: `foo(int32* p, int32 v)` reads `*p`, stores `v` into `*p`,
/// and returns the value `*p` held before the store. Given `a = 321` and
/// `foo(&a, 123)`, the call must return `321` and leave `a == 123`.
#[test]
fn scenario_5_pointer_swap_returns_the_prior_value_and_mutates_in_place() {
    let mut ctx = Context::new();
    ctx.get_or_insert_function("foo")
        .unwrap_or_else(|err| panic!("{err}"))
        .add_definition("int32", vec!["int32*".to_string(), "int32".to_string()])
        .unwrap_or_else(|err| panic!("{err}"));

    let mut imp = ctx
        .get_function("foo")
        .unwrap_or_else(|| unreachable!("just inserted"))
        .definition(&["int32*".to_string(), "int32".to_string()])
        .unwrap_or_else(|| unreachable!("just inserted"))
        .begin_implementation()
        .unwrap_or_else(|err| panic!("{err}"));
    let p = imp.alloc_argument("int32*");
    let v = imp.alloc_argument("int32");
    let entry = imp.alloc_block();
    let mut builder = Builder::new(&ctx, &mut imp, entry);
    let old = builder.load(p.into());
    builder.store(v.into(), p.into());
    builder.ret(Some(old)).unwrap_or_else(|err| panic!("{err}"));
    ctx.get_function_mut("foo")
        .unwrap_or_else(|| unreachable!("just inserted"))
        .definition_mut(&["int32*".to_string(), "int32".to_string()])
        .unwrap_or_else(|| unreachable!("just inserted"))
        .finish_implementation(imp)
        .unwrap_or_else(|err| panic!("{err}"));

    let llvm_context = LlvmContext::create();
    let backend = new_backend(&llvm_context);
    let mut jit = Jit::new();
    jit.register_backend("", backend).unwrap_or_else(|err| panic!("{err}"));

    let handle = jit
        .compile_default(&ctx, "foo", &["int32*".to_string(), "int32".to_string()])
        .unwrap_or_else(|err| panic!("{err}"));

    let mut a: i32 = 321;
    let a_ptr = std::ptr::addr_of_mut!(a).cast::<u8>();
    let result = handle
        .call(&[HostValue::Ptr(a_ptr), HostValue::Int(123)])
        .unwrap_or_else(|err| panic!("{err}"));

    assert_eq!(result, Some(HostValue::Int(321)));
    assert_eq!(a, 123);
}
