//! The concrete LLVM binding: `LlvmBackend<'ctx>` implements
//! `mlvm_backend::Backend` over `inkwell`. Grounded on
//! `ori_llvm::context::SimpleCx` (owns the context reference, the module,
//! and the commonly reused pointer type) plus `ori_llvm::declare`'s
//! get-or-add declaration pattern for `declare_function`/
//! `declare_external_function`.
//!
//! One `LlvmBackend` is built per compiled program: its module accumulates
//! every function compiled into it, so `declared_function` can resolve calls
//! across functions already compiled earlier in the same program. One
//! [`LlvmUnit`] is built per [`mlvm_backend::Backend::compile`] call.

use inkwell::attributes::{Attribute, AttributeLoc};
use inkwell::context::Context;
use inkwell::module::{Linkage, Module};
use inkwell::passes::PassManager;
use inkwell::targets::TargetMachine;
use inkwell::types::{BasicMetadataTypeEnum, BasicType, BasicTypeEnum, FunctionType, IntType};
use inkwell::values::{BasicMetadataValueEnum, BasicValue, BasicValueEnum, FunctionValue};
use inkwell::AddressSpace;
use mlvm_backend::{Backend, BackendError, IntrinsicRegistry, OperationRegistry, TypeRegistry};
use mlvm_ir::ConstantValue;

use crate::config::BackendConfig;
use crate::error::LlvmError;
use crate::ops::register_builtin_operations;
use crate::types::register_builtin_types;
use crate::unit::LlvmUnit;

pub struct LlvmBackend<'ctx> {
    context: &'ctx Context,
    module: Module<'ctx>,
    target_machine: TargetMachine,
    config: BackendConfig,
    address_width: u32,
    ptr_type: inkwell::types::PointerType<'ctx>,
    types: TypeRegistry<Self>,
    operations: OperationRegistry<Self>,
    intrinsics: IntrinsicRegistry<Self>,
}

impl<'ctx> LlvmBackend<'ctx> {
    /// Builds a backend targeting `config`, with its module named
    /// `module_name`, and registers the built-in scalar types and
    /// arithmetic/comparison/cast operations.
    ///
    /// # Errors
    /// Propagates [`LlvmError`] if `config`'s triple cannot be resolved or a
    /// target machine cannot be constructed for it.
    pub fn new(context: &'ctx Context, module_name: &str, config: BackendConfig) -> Result<Self, LlvmError> {
        let target_machine = config.create_target_machine()?;
        let module = context.create_module(module_name);
        module.set_triple(&target_machine.get_triple());
        module.set_data_layout(&target_machine.get_target_data().get_data_layout());

        let address_width = config.pointer_size() * 8;
        let ptr_type = context.ptr_type(AddressSpace::default());

        let mut backend = Self {
            context,
            module,
            target_machine,
            config,
            address_width,
            ptr_type,
            types: TypeRegistry::new(),
            operations: OperationRegistry::new(),
            intrinsics: IntrinsicRegistry::new(),
        };
        register_builtin_types(&mut backend);
        register_builtin_operations(&mut backend);
        Ok(backend)
    }

    pub(crate) fn context(&self) -> &'ctx Context {
        self.context
    }

    #[must_use]
    pub fn module(&self) -> &Module<'ctx> {
        &self.module
    }

    /// The resolved target machine, kept around for its data layout and for
    /// a future static-compilation driver's `write_object`/`write_assembly`
    /// (SPEC_FULL.md §4.7: "modeled but not required to be fully
    /// implemented").
    #[must_use]
    pub fn target_machine(&self) -> &TargetMachine {
        &self.target_machine
    }

    #[must_use]
    pub fn config(&self) -> &BackendConfig {
        &self.config
    }

    /// The integer type for a given bit width; the four standard widths use
    /// their dedicated constructors, anything else (only ever `address`
    /// outside the four builtins) falls back to `custom_width_int_type`.
    pub(crate) fn int_type(&self, bits: u32) -> IntType<'ctx> {
        match bits {
            8 => self.context.i8_type(),
            16 => self.context.i16_type(),
            32 => self.context.i32_type(),
            64 => self.context.i64_type(),
            1 => self.context.bool_type(),
            other => self.context.custom_width_int_type(other),
        }
    }

    fn fn_type(&self, params: &[BasicTypeEnum<'ctx>], ret: Option<BasicTypeEnum<'ctx>>) -> FunctionType<'ctx> {
        let metadata_params: Vec<BasicMetadataTypeEnum<'ctx>> = params.iter().map(|ty| (*ty).into()).collect();
        match ret {
            Some(ret_ty) => ret_ty.fn_type(&metadata_params, false),
            None => self.context.void_type().fn_type(&metadata_params, false),
        }
    }
}

impl<'ctx> Backend for LlvmBackend<'ctx> {
    type Value = BasicValueEnum<'ctx>;
    type Type = BasicTypeEnum<'ctx>;
    type Function = FunctionValue<'ctx>;
    type BasicBlock = inkwell::basic_block::BasicBlock<'ctx>;
    type Unit = LlvmUnit<'ctx>;

    fn address_width(&self) -> u32 {
        self.address_width
    }

    fn pointer_type(&self) -> Self::Type {
        self.ptr_type.into()
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

    fn new_unit(&mut self, _name: &str) -> Self::Unit {
        LlvmUnit::new(self.context.create_builder())
    }

    fn declare_function(&mut self, unit: &mut Self::Unit, name: &str, params: &[Self::Type], ret: Option<Self::Type>) {
        let fn_type = self.fn_type(params, ret);
        unit.function = Some(self.module.add_function(name, fn_type, None));
    }

    fn append_block(&mut self, unit: &mut Self::Unit, name: &str) -> Self::BasicBlock {
        self.context.append_basic_block(unit.function(), name)
    }

    fn position_at_end(&mut self, unit: &mut Self::Unit, block: Self::BasicBlock) {
        unit.builder.position_at_end(block);
    }

    fn param_value(&self, unit: &Self::Unit, index: usize) -> Self::Value {
        let index = u32::try_from(index).unwrap_or_else(|_| unreachable!("a function has far fewer than u32::MAX parameters"));
        unit.function()
            .get_nth_param(index)
            .unwrap_or_else(|| unreachable!("param_value index out of range: the Translator only queries declared argument indices"))
    }

    fn br(&mut self, unit: &mut Self::Unit, target: Self::BasicBlock) {
        unit.builder.build_unconditional_branch(target).unwrap_or_else(|err| panic!("branch builder call failed: {err}"));
    }

    fn cond_br(&mut self, unit: &mut Self::Unit, cond: Self::Value, if_true: Self::BasicBlock, if_false: Self::BasicBlock) {
        unit.builder
            .build_conditional_branch(cond.into_int_value(), if_true, if_false)
            .unwrap_or_else(|err| panic!("conditional branch builder call failed: {err}"));
    }

    fn ret(&mut self, unit: &mut Self::Unit, value: Option<Self::Value>) {
        let result = match &value {
            Some(v) => unit.builder.build_return(Some(v as &dyn BasicValue<'ctx>)),
            None => unit.builder.build_return(None),
        };
        result.unwrap_or_else(|err| panic!("return builder call failed: {err}"));
    }

    fn declared_function(&self, _unit: &Self::Unit, mangled_name: &str) -> Option<Self::Function> {
        self.module.get_function(mangled_name)
    }

    fn declare_external_function(
        &mut self,
        _unit: &mut Self::Unit,
        mangled_name: &str,
        params: &[Self::Type],
        ret: Option<Self::Type>,
    ) -> Self::Function {
        if let Some(existing) = self.module.get_function(mangled_name) {
            return existing;
        }
        let fn_type = self.fn_type(params, ret);
        self.module.add_function(mangled_name, fn_type, Some(Linkage::External))
    }

    fn call_function(&mut self, unit: &mut Self::Unit, function: Self::Function, args: &[Self::Value]) -> Option<Self::Value> {
        let arg_values: Vec<BasicMetadataValueEnum<'ctx>> = args.iter().map(|value| (*value).into()).collect();
        let call_site = unit.builder.build_call(function, &arg_values, "call").unwrap_or_else(|err| panic!("call builder call failed: {err}"));
        call_site.try_as_basic_value().left()
    }

    fn scalar_constant(&mut self, unit: &mut Self::Unit, ty: Self::Type, value: ConstantValue) -> Self::Value {
        let _ = unit;
        match (ty, value) {
            #[expect(clippy::cast_sign_loss, reason = "reinterpreting i64's bit pattern as u64, not a lossy narrowing")]
            (BasicTypeEnum::IntType(int_ty), ConstantValue::Int(i)) => int_ty.const_int(i as u64, true).into(),
            (BasicTypeEnum::IntType(int_ty), ConstantValue::Bool(b)) => int_ty.const_int(u64::from(b), false).into(),
            (BasicTypeEnum::FloatType(float_ty), ConstantValue::Float(f)) => float_ty.const_float(f).into(),
            (BasicTypeEnum::FloatType(float_ty), ConstantValue::Int(i)) => float_ty.const_float(i as f64).into(),
            (ty, value) => unreachable!("no registered ScalarType produces this type/constant combination: {ty:?}, {value:?}"),
        }
    }

    fn alloc_value(&mut self, unit: &mut Self::Unit, ty: Self::Type) -> Self::Value {
        unit.builder.build_alloca(ty, "alloca").unwrap_or_else(|err| panic!("alloca builder call failed: {err}")).into()
    }

    fn load_value(&mut self, unit: &mut Self::Unit, ptr: Self::Value, ty: Self::Type) -> Self::Value {
        unit.builder
            .build_load(ty, ptr.into_pointer_value(), "load")
            .unwrap_or_else(|err| panic!("load builder call failed: {err}"))
    }

    fn store_value(&mut self, unit: &mut Self::Unit, value: Self::Value, ptr: Self::Value) {
        unit.builder
            .build_store(ptr.into_pointer_value(), value)
            .unwrap_or_else(|err| panic!("store builder call failed: {err}"));
    }

    fn address_of(&mut self, unit: &mut Self::Unit, storage: Self::Value) -> Self::Value {
        let _ = unit;
        storage
    }

    /// A no-op: every pointer type shares one opaque LLVM pointer type
    /// (`ptr_type`, set up once in [`LlvmBackend::new`]), so there is no
    /// LLVM-level type distinction between `T*` and `U*` to bitcast across.
    fn bitcast_pointer(&mut self, unit: &mut Self::Unit, value: Self::Value, to: Self::Type) -> Self::Value {
        let (_, _) = (unit, to);
        value
    }

    /// Steps through `elem_ty`-sized elements of `base` via LLVM's
    /// `getelementptr`, the one LLVM-level type distinction
    /// [`LlvmBackend::bitcast_pointer`]'s shared opaque pointer type can't
    /// express: the stride used to index comes entirely from `elem_ty`.
    fn gep(&mut self, unit: &mut Self::Unit, base: Self::Value, elem_ty: Self::Type, index: Self::Value) -> Self::Value {
        unsafe { unit.builder.build_gep(elem_ty, base.into_pointer_value(), &[index.into_int_value()], "gep") }
            .unwrap_or_else(|err| panic!("gep builder call failed: {err}"))
            .into()
    }

    /// Sets link-once, always-inline visibility on the unit's just-declared
    /// function: `LinkOnceODR` linkage (so multiple compiled programs that
    /// each materialize the same intrinsic don't collide) plus LLVM's
    /// `alwaysinline` function attribute.
    fn mark_always_inline(&mut self, unit: &mut Self::Unit) {
        let function = unit.function();
        function.set_linkage(Linkage::LinkOnceODR);
        let kind_id = Attribute::get_named_enum_kind_id("alwaysinline");
        let attribute = self.context.create_enum_attribute(kind_id, 0);
        function.add_attribute(AttributeLoc::Function, attribute);
    }

    fn verify(&self, unit: &Self::Unit) -> Result<(), BackendError> {
        let function = unit.function();
        if function.verify(true) {
            Ok(())
        } else {
            let name = function.get_name().to_string_lossy().into_owned();
            Err(BackendError::VerificationFailed(name, "LLVM's module verifier rejected this function".to_string()))
        }
    }

    fn optimize_function(&mut self, unit: &mut Self::Unit) {
        if !self.config.opt_level().is_enabled() {
            return;
        }
        let fpm = PassManager::create(&self.module);
        fpm.add_promote_memory_to_register_pass();
        fpm.add_instruction_combining_pass();
        fpm.add_reassociate_pass();
        fpm.add_cfg_simplification_pass();
        fpm.add_gvn_pass();
        fpm.initialize();
        fpm.run_on(&unit.function());
    }

    fn optimize_module(&mut self, unit: &mut Self::Unit) {
        let _ = unit;
        if !self.config.opt_level().is_enabled() {
            return;
        }
        let mpm = PassManager::create(());
        mpm.add_function_inlining_pass();
        mpm.add_global_dce_pass();
        mpm.add_ipsccp_pass();
        mpm.run_on(&self.module);
    }
}
