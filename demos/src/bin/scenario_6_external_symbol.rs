//! `call_host_square` calls `host_square`, which is declared in the
//! `Context` (so overload resolution has a signature to check against) but
//! never compiled. The translator auto-declares it as an external symbol;
//! binding its runtime address through `Jit::link_external_symbol` before
//! the caller runs lets a host-defined routine stand in for an "extra
//! library".

use inkwell::context::Context as LlvmContext;
use mlvm::backend::mangle;
use mlvm::builder::Builder;
use mlvm::ir::Context;
use mlvm::jit::{HostValue, Jit};
use mlvm::llvm::{BackendConfig, LlvmBackend};

extern "C" fn host_square(x: i32) -> i32 {
    x * x
}

fn main() {
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
    let backend = LlvmBackend::new(&llvm_context, "scenario_6", BackendConfig::native()).unwrap_or_else(|err| panic!("{err}"));
    let mut jit = Jit::new();
    jit.register_backend("", backend).unwrap_or_else(|err| panic!("{err}"));

    let handle = jit
        .compile_default(&ctx, "call_host_square", &["int32".to_string()])
        .unwrap_or_else(|err| panic!("{err}"));

    let mangled_host_square = mangle("host_square", &["int32".to_string()]);
    jit.link_external_symbol("", &mangled_host_square, host_square as usize)
        .unwrap_or_else(|err| panic!("{err}"));

    let result = handle.call(&[HostValue::Int(6)]).unwrap_or_else(|err| panic!("{err}"));
    println!("call_host_square(6) = {result:?} (expected Some(Int(36)))");
}
