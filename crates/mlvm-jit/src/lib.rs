//! Execution Manager (C8) and JIT façade (C9) for the MLVM compiler
//! framework: binds `mlvm-llvm`-compiled functions into a process-resident
//! execution engine and exposes them as memoized, host-callable handles.
//!
//! Grounded on `ori_llvm::module::ModuleCompiler::run_test` and
//! `ori_llvm::evaluator::LLVMEvaluator` — see `DESIGN.md` for the
//! per-module grounding ledger.

mod abi;
mod error;
mod handle;
mod jit;
mod manager;

pub use abi::{HostValue, ParamClass};
pub use error::JitError;
pub use handle::FunctionHandle;
pub use jit::Jit;
pub use manager::ExecutionManager;

#[cfg(test)]
mod tests {
    use inkwell::context::Context as LlvmContext;
    use mlvm_builder::Builder;
    use mlvm_ir::{Context, ConstantValue};
    use mlvm_llvm::{BackendConfig, LlvmBackend};
    use pretty_assertions::assert_eq;

    use super::*;

    fn define_add_two(ctx: &mut Context) {
        ctx.get_or_insert_function("add_two")
            .unwrap_or_else(|err| panic!("{err}"))
            .add_definition("int32", vec!["int32".to_string(), "int32".to_string()])
            .unwrap_or_else(|err| panic!("{err}"));

        let mut imp = ctx
            .get_function("add_two")
            .unwrap_or_else(|| unreachable!("just inserted"))
            .definition(&["int32".to_string(), "int32".to_string()])
            .unwrap_or_else(|| unreachable!("just inserted"))
            .begin_implementation()
            .unwrap_or_else(|err| panic!("{err}"));
        let a = imp.alloc_argument("int32");
        let b = imp.alloc_argument("int32");
        {
            let entry = imp.alloc_block();
            let mut builder = Builder::new(ctx, &mut imp, entry);
            let sum = builder.add(a.into(), b.into()).unwrap_or_else(|err| panic!("{err}"));
            builder.ret(Some(sum)).unwrap_or_else(|err| panic!("{err}"));
        }
        ctx.get_function_mut("add_two")
            .unwrap_or_else(|| unreachable!("just inserted"))
            .definition_mut(&["int32".to_string(), "int32".to_string()])
            .unwrap_or_else(|| unreachable!("just inserted"))
            .finish_implementation(imp)
            .unwrap_or_else(|err| panic!("{err}"));
    }

    #[test]
    fn compile_then_compile_again_returns_an_identity_equal_handle() {
        let mut ctx = Context::new();
        define_add_two(&mut ctx);

        let llvm_context = LlvmContext::create();
        let backend = LlvmBackend::new(&llvm_context, "test_module", BackendConfig::native()).unwrap_or_else(|err| panic!("{err}"));

        let mut jit = Jit::new();
        jit.register_backend("", backend).unwrap_or_else(|err| panic!("{err}"));

        let arg_types = vec!["int32".to_string(), "int32".to_string()];
        let first = jit.compile_default(&ctx, "add_two", &arg_types).unwrap_or_else(|err| panic!("{err}"));
        let second = jit.compile_default(&ctx, "add_two", &arg_types).unwrap_or_else(|err| panic!("{err}"));
        assert_eq!(first, second);
    }

    #[test]
    fn compile_against_an_unregistered_backend_fails_cleanly() {
        let ctx = Context::new();
        let mut jit = Jit::<'_>::new();
        let err = jit.compile(&ctx, "add_two", &[], "nonexistent").unwrap_err();
        assert!(matches!(err, JitError::UnknownBackend(name) if name == "nonexistent"));
    }
}
