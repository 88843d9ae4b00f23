//! The same `array_add` intrinsic, instantiated over `array_int32` instead
//! of `array_float`, exercising the integer-arithmetic branch of the same
//! generic intrinsic body.

use inkwell::context::Context as LlvmContext;
use mlvm::backend::{ArrayExtension, Backend};
use mlvm::builder::Builder;
use mlvm::ir::Context;
use mlvm::jit::{HostValue, Jit};
use mlvm::llvm::{BackendConfig, LlvmBackend};

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

fn main() {
    let mut ctx = Context::new();
    ctx.install(vec![Box::new(ArrayExtension)]).unwrap_or_else(|err| panic!("{err}"));
    define_vector_add(&mut ctx, "vector_add_int32", "int32");

    let llvm_context = LlvmContext::create();
    let mut backend = LlvmBackend::new(&llvm_context, "scenario_2", BackendConfig::native()).unwrap_or_else(|err| panic!("{err}"));
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

    println!("vector_add_int32({lary:?}, {rary:?}) -> {dary:?} (expected [101, 202, 303, 404, 505])");
}
