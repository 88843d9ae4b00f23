//! Backend contract for the MLVM compiler framework: the capability traits
//! (types, operations, intrinsics) a code generator implements, the
//! registries that back them, pointer-type synthesis, symbol mangling, and
//! the Translator that lowers an [`mlvm_ir::Implementation`] through them.

mod array;
mod backend;
mod error;
mod extension;
mod mangle;
mod operation_impl;
mod pointer;
mod registry;
mod translator;
mod type_impl;

pub use array::ArrayExtension;
pub use backend::Backend;
pub use error::BackendError;
pub use extension::Extension;
pub use mangle::{mangle, mangle_intrinsic};
pub use operation_impl::{IntrinsicBody, OperationImplementation};
pub use pointer::PointerTypeImplementation;
pub use registry::{IntrinsicEntry, IntrinsicRegistry, OperationRegistry, TypeRegistry};
pub use translator::translate;
pub use type_impl::TypeImplementation;

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests {
    use std::sync::Arc;

    use mlvm_builder::Builder;
    use mlvm_ir::{Context, ConstantValue};
    use pretty_assertions::assert_eq;
    use rustc_hash::FxHashMap;

    use super::*;

    #[derive(Debug, Default)]
    struct TestUnit {
        next_value: u64,
        block_count: usize,
        trace: Vec<String>,
        declared_names: Vec<String>,
        declared_lookup: FxHashMap<String, u32>,
    }

    fn fresh(unit: &mut TestUnit) -> u64 {
        unit.next_value += 1;
        unit.next_value
    }

    #[derive(Default)]
    struct TestBackend {
        types: TypeRegistry<Self>,
        operations: OperationRegistry<Self>,
        intrinsics: IntrinsicRegistry<Self>,
    }

    impl TestBackend {
        fn new() -> Self {
            Self::default()
        }
    }

    impl Backend for TestBackend {
        type Value = u64;
        type Type = &'static str;
        type Function = u32;
        type BasicBlock = usize;
        type Unit = TestUnit;

        fn address_width(&self) -> u32 {
            64
        }

        fn pointer_type(&self) -> Self::Type {
            "ptr"
        }

        fn type_registry(&self) -> &TypeRegistry<Self> {
            &self.types
        }
        fn type_registry_mut(&mut self) -> &mut TypeRegistry<Self> {
            &mut self.types
        }
        fn operation_registry(&self) -> &OperationRegistry<Self> {
            &self.operations
        }
        fn operation_registry_mut(&mut self) -> &mut OperationRegistry<Self> {
            &mut self.operations
        }
        fn intrinsic_registry(&self) -> &IntrinsicRegistry<Self> {
            &self.intrinsics
        }
        fn intrinsic_registry_mut(&mut self) -> &mut IntrinsicRegistry<Self> {
            &mut self.intrinsics
        }

        fn new_unit(&mut self, name: &str) -> Self::Unit {
            TestUnit {
                trace: vec![format!("unit {name}")],
                ..TestUnit::default()
            }
        }

        fn declare_function(&mut self, unit: &mut Self::Unit, name: &str, params: &[Self::Type], ret: Option<Self::Type>) {
            unit.trace.push(format!("declare {name} {params:?} -> {ret:?}"));
        }

        fn append_block(&mut self, unit: &mut Self::Unit, name: &str) -> Self::BasicBlock {
            let id = unit.block_count;
            unit.block_count += 1;
            unit.trace.push(format!("block{id} {name}"));
            id
        }

        fn position_at_end(&mut self, unit: &mut Self::Unit, block: Self::BasicBlock) {
            unit.trace.push(format!("position block{block}"));
        }

        fn param_value(&self, _unit: &Self::Unit, index: usize) -> Self::Value {
            1000 + index as u64
        }

        fn br(&mut self, unit: &mut Self::Unit, target: Self::BasicBlock) {
            unit.trace.push(format!("br block{target}"));
        }

        fn cond_br(&mut self, unit: &mut Self::Unit, cond: Self::Value, if_true: Self::BasicBlock, if_false: Self::BasicBlock) {
            unit.trace.push(format!("condbr v{cond} block{if_true} block{if_false}"));
        }

        fn ret(&mut self, unit: &mut Self::Unit, value: Option<Self::Value>) {
            unit.trace.push(format!("ret {value:?}"));
        }

        fn declared_function(&self, unit: &Self::Unit, mangled_name: &str) -> Option<Self::Function> {
            unit.declared_lookup.get(mangled_name).copied()
        }

        fn declare_external_function(
            &mut self,
            unit: &mut Self::Unit,
            mangled_name: &str,
            params: &[Self::Type],
            ret: Option<Self::Type>,
        ) -> Self::Function {
            if let Some(id) = unit.declared_lookup.get(mangled_name) {
                return *id;
            }
            let id = u32::try_from(unit.declared_names.len()).unwrap_or_else(|_| unreachable!("test function table stays small"));
            unit.declared_names.push(mangled_name.to_string());
            unit.declared_lookup.insert(mangled_name.to_string(), id);
            unit.trace.push(format!("declare_extern {mangled_name} {params:?} -> {ret:?}"));
            id
        }

        fn call_function(&mut self, unit: &mut Self::Unit, function: Self::Function, args: &[Self::Value]) -> Option<Self::Value> {
            let name = unit.declared_names[function as usize].clone();
            unit.trace.push(format!("call {name} {args:?}"));
            Some(fresh(unit))
        }

        fn scalar_constant(&mut self, unit: &mut Self::Unit, ty: Self::Type, value: ConstantValue) -> Self::Value {
            unit.trace.push(format!("const {ty} {value:?}"));
            fresh(unit)
        }

        fn alloc_value(&mut self, unit: &mut Self::Unit, ty: Self::Type) -> Self::Value {
            unit.trace.push(format!("alloc {ty}"));
            fresh(unit)
        }

        fn load_value(&mut self, unit: &mut Self::Unit, ptr: Self::Value, ty: Self::Type) -> Self::Value {
            unit.trace.push(format!("load {ty} v{ptr}"));
            fresh(unit)
        }

        fn store_value(&mut self, unit: &mut Self::Unit, value: Self::Value, ptr: Self::Value) {
            unit.trace.push(format!("store v{value} v{ptr}"));
        }

        fn address_of(&mut self, unit: &mut Self::Unit, storage: Self::Value) -> Self::Value {
            unit.trace.push(format!("addr_of v{storage}"));
            fresh(unit)
        }

        fn bitcast_pointer(&mut self, unit: &mut Self::Unit, value: Self::Value, to: Self::Type) -> Self::Value {
            unit.trace.push(format!("bitcast v{value} {to}"));
            fresh(unit)
        }

        fn gep(&mut self, unit: &mut Self::Unit, base: Self::Value, elem_ty: Self::Type, index: Self::Value) -> Self::Value {
            unit.trace.push(format!("gep {elem_ty} v{base}[v{index}]"));
            fresh(unit)
        }

        fn verify(&self, _unit: &Self::Unit) -> Result<(), BackendError> {
            Ok(())
        }

        fn optimize_function(&mut self, unit: &mut Self::Unit) {
            unit.trace.push("optimize_function".to_string());
        }

        fn optimize_module(&mut self, unit: &mut Self::Unit) {
            unit.trace.push("optimize_module".to_string());
        }
    }

    struct Int32Type;

    impl TypeImplementation<TestBackend> for Int32Type {
        fn value(&self, _backend: &TestBackend) -> &'static str {
            "i32"
        }
        fn allocate(&self, backend: &mut TestBackend, unit: &mut TestUnit) -> u64 {
            backend.alloc_value(unit, "i32")
        }
        fn use_value(&self, backend: &mut TestBackend, unit: &mut TestUnit, storage: u64) -> u64 {
            backend.load_value(unit, storage, "i32")
        }
        fn assign(&self, backend: &mut TestBackend, unit: &mut TestUnit, storage: u64, value: u64) {
            backend.store_value(unit, value, storage);
        }
        fn constant(&self, backend: &mut TestBackend, unit: &mut TestUnit, value: &ConstantValue) -> u64 {
            backend.scalar_constant(unit, "i32", *value)
        }
        fn load(&self, backend: &mut TestBackend, unit: &mut TestUnit, ptr: u64) -> u64 {
            backend.load_value(unit, ptr, "i32")
        }
        fn store(&self, backend: &mut TestBackend, unit: &mut TestUnit, value: u64, ptr: u64) {
            backend.store_value(unit, value, ptr);
        }
        fn reference(&self, backend: &mut TestBackend, unit: &mut TestUnit, storage: u64) -> u64 {
            backend.address_of(unit, storage)
        }
    }

    struct AddOp;
    impl OperationImplementation<TestBackend> for AddOp {
        fn emit(&self, _backend: &mut TestBackend, unit: &mut TestUnit, operands: &[u64]) -> Option<u64> {
            unit.trace.push(format!("add {operands:?}"));
            Some(fresh(unit))
        }
    }

    fn backend_with_int32() -> TestBackend {
        let mut backend = TestBackend::new();
        backend.implement_type("i32", Arc::new(Int32Type));
        backend.implement_operation("add", vec!["i32".to_string(), "i32".to_string()], Arc::new(AddOp));
        backend
    }

    #[test]
    fn get_type_implementation_misses_cleanly() {
        let backend = TestBackend::new();
        let err = backend.get_type_implementation("i32").unwrap_err();
        assert_eq!(err, BackendError::TypeUnimplementedError("i32".to_string()));
    }

    #[test]
    fn get_type_implementation_synthesizes_pointers_recursively() {
        let backend = backend_with_int32();
        let ptr = backend.get_type_implementation("i32*").unwrap();
        assert_eq!(ptr.value(&backend), "ptr");
        let double_ptr = backend.get_type_implementation("i32**").unwrap();
        assert_eq!(double_ptr.value(&backend), "ptr");
    }

    #[test]
    fn translate_lowers_add_and_return() {
        let mut ctx = Context::new();
        ctx.get_or_insert_function("add_two")
            .unwrap()
            .add_definition("i32", vec![])
            .unwrap();

        let mut imp = ctx
            .get_function("add_two")
            .unwrap()
            .definition(&[])
            .unwrap()
            .begin_implementation()
            .unwrap();
        {
            let entry = imp.alloc_block();
            let mut builder = Builder::new(&ctx, &mut imp, entry);
            let a = builder.const_value("i32", ConstantValue::Int(1));
            let b = builder.const_value("i32", ConstantValue::Int(2));
            let sum = builder.add(a, b).unwrap();
            builder.ret(Some(sum)).unwrap();
        }
        ctx.get_function_mut("add_two")
            .unwrap()
            .definition_mut(&[])
            .unwrap()
            .finish_implementation(imp)
            .unwrap();

        let mut backend = backend_with_int32();
        let def = ctx.get_function("add_two").unwrap().definition(&[]).unwrap();
        let imp = def.implementation().unwrap();
        let unit = translate(&mut backend, imp, "add_two").unwrap();

        assert!(unit.trace.iter().any(|line| line.starts_with("declare add_two")));
        assert!(unit.trace.iter().any(|line| line.starts_with("add ")));
        assert!(unit.trace.iter().any(|line| line.starts_with("ret ")));
    }

    #[test]
    fn translate_reports_missing_return_on_a_dangling_block() {
        let mut ctx = Context::new();
        let def = ctx
            .get_or_insert_function("dangling")
            .unwrap()
            .add_definition("void", vec![])
            .unwrap();
        let mut imp = def.begin_implementation().unwrap();
        imp.alloc_block();
        def.finish_implementation(imp).unwrap();

        let mut backend = TestBackend::new();
        let imp = def.implementation().unwrap();
        let err = translate(&mut backend, imp, "dangling").unwrap_err();
        assert_eq!(err, BackendError::MissingReturn("dangling".to_string()));
    }

    #[test]
    fn implement_intrinsic_rejects_duplicate_signature() {
        struct NoopIntrinsic;
        impl IntrinsicBody<TestBackend> for NoopIntrinsic {
            fn emit(&self, _backend: &mut TestBackend, _unit: &mut TestUnit, _operands: &[u64]) -> Option<u64> {
                None
            }
        }

        let mut backend = backend_with_int32();
        backend
            .implement_intrinsic("sin", "i32", vec!["i32".to_string()], Arc::new(NoopIntrinsic))
            .unwrap();
        let err = backend
            .implement_intrinsic("sin", "i32", vec!["i32".to_string()], Arc::new(NoopIntrinsic))
            .unwrap_err();
        assert_eq!(err, BackendError::DuplicateIntrinsic("sin".to_string()));
    }

    #[test]
    fn mangling_is_reexported_at_the_crate_root() {
        assert_eq!(mangle("foo", &["i32".to_string()]), "foo_2E_i32");
        assert_eq!(mangle_intrinsic("sin", &["f64".to_string()]), mangle("mlvm.intrinsic.sin", &["f64".to_string()]));
    }
}
