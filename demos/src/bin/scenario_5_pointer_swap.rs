//! `foo(int32* p, int32 v)` reads `*p`, stores `v` into `*p`, and returns
//! the value `*p` held before the store. Given `a = 321`, `foo(&a, 123)`
//! returns `321` and leaves `a == 123`.

use inkwell::context::Context as LlvmContext;
use mlvm::builder::Builder;
use mlvm::ir::Context;
use mlvm::jit::{HostValue, Jit};
use mlvm::llvm::{BackendConfig, LlvmBackend};

fn main() {
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
    let backend = LlvmBackend::new(&llvm_context, "scenario_5", BackendConfig::native()).unwrap_or_else(|err| panic!("{err}"));
    let mut jit = Jit::new();
    jit.register_backend("", backend).unwrap_or_else(|err| panic!("{err}"));

    let handle = jit
        .compile_default(&ctx, "foo", &["int32*".to_string(), "int32".to_string()])
        .unwrap_or_else(|err| panic!("{err}"));

    let mut a: i32 = 321;
    let a_ptr = std::ptr::addr_of_mut!(a).cast::<u8>();
    let result = handle.call(&[HostValue::Ptr(a_ptr), HostValue::Int(123)]).unwrap_or_else(|err| panic!("{err}"));

    println!("foo(&a, 123) = {result:?} (expected Some(Int(321))), a is now {a} (expected 123)");
}
