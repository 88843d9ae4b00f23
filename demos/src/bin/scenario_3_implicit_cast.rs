//! `scale(double) -> double` called with a `float` actual: overload
//! resolution inserts `cast.float.double` ahead of the call, and the
//! JIT-executed result reflects the cast value.

use inkwell::context::Context as LlvmContext;
use mlvm::builder::Builder;
use mlvm::ir::{Context, ConstantValue};
use mlvm::jit::Jit;
use mlvm::llvm::{BackendConfig, LlvmBackend};

fn main() {
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
        let two = builder.const_value("double", ConstantValue::Float(2.0));
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
        let arg = builder.const_value("float", ConstantValue::Float(3.5));
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
    let backend = LlvmBackend::new(&llvm_context, "scenario_3", BackendConfig::native()).unwrap_or_else(|err| panic!("{err}"));
    let mut jit = Jit::new();
    jit.register_backend("", backend).unwrap_or_else(|err| panic!("{err}"));

    jit.compile_default(&ctx, "scale", &["double".to_string()]).unwrap_or_else(|err| panic!("{err}"));
    let handle = jit.compile_default(&ctx, "call_scale_with_float", &[]).unwrap_or_else(|err| panic!("{err}"));

    let result = handle.call(&[]).unwrap_or_else(|err| panic!("{err}"));
    println!("call_scale_with_float() = {result:?} (expected Some(Float(7.0)))");
}
