//! Concrete LLVM binding for the MLVM compiler framework.
//!
//! [`LlvmBackend`] implements [`mlvm_backend::Backend`] over `inkwell`,
//! registering the built-in scalar type and arithmetic/comparison/cast
//! operation implementations every backend is expected to carry
//! (SPEC_FULL.md §4.5). Grounded on `ori_llvm::context`, `ori_llvm::declare`,
//! `ori_llvm::builder`, and `ori_llvm::aot::target` — see `DESIGN.md` for the
//! per-module grounding ledger.

mod backend;
mod config;
mod error;
mod ops;
mod types;
mod unit;

pub use backend::LlvmBackend;
pub use config::{BackendConfig, OptimizationLevel};
pub use error::LlvmError;
pub use unit::LlvmUnit;

#[cfg(test)]
mod tests {
    use inkwell::context::Context as LlvmContext;
    use mlvm_backend::Backend;
    use mlvm_builder::Builder;
    use mlvm_ir::{Context, ConstantValue};
    use pretty_assertions::assert_eq;

    use super::*;

    fn backend<'ctx>(llvm_context: &'ctx LlvmContext) -> LlvmBackend<'ctx> {
        LlvmBackend::new(llvm_context, "test_module", BackendConfig::native()).unwrap_or_else(|err| panic!("backend construction failed: {err}"))
    }

    #[test]
    fn constructs_with_the_native_target_and_registers_builtin_types() {
        let llvm_context = LlvmContext::create();
        let be = backend(&llvm_context);
        assert!(be.get_type_implementation("int32").is_ok());
        assert!(be.get_type_implementation("uint64").is_ok());
        assert!(be.get_type_implementation("pred").is_ok());
        assert!(be.get_type_implementation("address").is_ok());
        assert!(be.get_type_implementation("double").is_ok());
        assert!(be.address_width() == 32 || be.address_width() == 64);
    }

    #[test]
    fn get_type_implementation_synthesizes_int32_pointer() {
        let llvm_context = LlvmContext::create();
        let be = backend(&llvm_context);
        let ptr_impl = be.get_type_implementation("int32*").unwrap_or_else(|err| panic!("{err}"));
        assert!(matches!(ptr_impl.value(&be), inkwell::types::BasicTypeEnum::PointerType(_)));
    }

    #[test]
    fn comparison_is_registered_separately_per_signedness() {
        let llvm_context = LlvmContext::create();
        let be = backend(&llvm_context);
        assert!(be.get_operation_implementation("cmp.lt", &["int32".to_string(), "int32".to_string()]).is_some());
        assert!(be.get_operation_implementation("cmp.lt", &["uint32".to_string(), "uint32".to_string()]).is_some());
        assert!(be.get_operation_implementation("cmp.lt", &["float".to_string(), "float".to_string()]).is_some());
    }

    #[test]
    fn cast_grid_has_no_identity_entries() {
        let llvm_context = LlvmContext::create();
        let be = backend(&llvm_context);
        assert!(be.get_operation_implementation("cast.int32.int32", &["int32".to_string()]).is_none());
        assert!(be.get_operation_implementation("cast.int32.int64", &["int32".to_string()]).is_some());
        assert!(be.get_operation_implementation("cast.float.double", &["float".to_string()]).is_some());
        assert!(be.get_operation_implementation("cast.int32.address", &["int32".to_string()]).is_some());
    }

    #[test]
    fn compiles_and_verifies_a_two_argument_add_function() {
        let mut ctx = Context::new();
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
        {
            let entry = imp.alloc_block();
            let mut builder = Builder::new(&ctx, &mut imp, entry);
            let a = builder.const_value("int32", ConstantValue::Int(1));
            let b = builder.const_value("int32", ConstantValue::Int(2));
            let sum = builder.add(a, b).unwrap_or_else(|err| panic!("{err}"));
            builder.ret(Some(sum)).unwrap_or_else(|err| panic!("{err}"));
        }
        ctx.get_function_mut("add_two")
            .unwrap_or_else(|| unreachable!("just inserted"))
            .definition_mut(&["int32".to_string(), "int32".to_string()])
            .unwrap_or_else(|| unreachable!("just inserted"))
            .finish_implementation(imp)
            .unwrap_or_else(|err| panic!("{err}"));

        let llvm_context = LlvmContext::create();
        let mut be = backend(&llvm_context);
        let def = ctx.get_function("add_two").unwrap_or_else(|| unreachable!()).definition(&["int32".to_string(), "int32".to_string()]).unwrap_or_else(|| unreachable!());
        let imp = def.implementation().unwrap_or_else(|err| panic!("{err}"));
        let unit = be.compile(imp, "add_two").unwrap_or_else(|err| panic!("compile failed: {err}"));
        assert_eq!(unit.function().get_name().to_string_lossy(), "add_two");
    }
}
