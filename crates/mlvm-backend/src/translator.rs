//! Lowers one [`Implementation`] into a backend's target IR.
//!
//! The pipeline: declare the function and one target block per IR block,
//! allocate storage for every argument and local variable, run `prolog` on
//! each incoming argument, walk every block's operations in program order
//! emitting target instructions, run `epilog` on function exit, close each
//! block with its terminator.

use std::sync::Arc;

use mlvm_ir::{Implementation, Terminator, ValueId};
use tracing::instrument;

use crate::backend::Backend;
use crate::error::BackendError;
use crate::mangle::{mangle, mangle_intrinsic};
use crate::type_impl::TypeImplementation;

/// Runs the lowering pipeline for one function body.
///
/// # Errors
/// Returns [`BackendError::TypeUnimplementedError`] if an operand, local, or
/// declared type has no registered implementation and cannot be synthesized,
/// or [`BackendError::MissingReturn`] if a block falls off its end without a
/// terminator.
#[instrument(skip(backend, imp))]
pub fn translate<B: Backend>(backend: &mut B, imp: &Implementation, mangled_name: &str) -> Result<B::Unit, BackendError> {
    let mut lowering = Lowering::new(backend, imp, mangled_name)?;
    lowering.declare_and_allocate(mangled_name)?;
    lowering.emit_blocks(mangled_name)?;
    Ok(lowering.into_unit())
}

struct Lowering<'a, B: Backend> {
    backend: &'a mut B,
    imp: &'a Implementation,
    unit: B::Unit,
    return_impl: Option<Arc<dyn TypeImplementation<B>>>,
    arg_impls: Vec<Arc<dyn TypeImplementation<B>>>,
    var_impls: Vec<Arc<dyn TypeImplementation<B>>>,
    arg_storage: Vec<B::Value>,
    var_storage: Vec<B::Value>,
    blocks: Vec<B::BasicBlock>,
    op_values: Vec<Option<B::Value>>,
}

impl<'a, B: Backend> Lowering<'a, B> {
    fn new(backend: &'a mut B, imp: &'a Implementation, mangled_name: &str) -> Result<Self, BackendError> {
        let return_impl = if imp.return_type() == "void" {
            None
        } else {
            Some(backend.get_type_implementation(imp.return_type())?)
        };

        let mut arg_impls = Vec::with_capacity(imp.arguments().len());
        for argument in imp.arguments() {
            arg_impls.push(backend.get_type_implementation(&argument.type_name)?);
        }

        let mut var_impls = Vec::with_capacity(imp.variables().len());
        for variable in imp.variables() {
            var_impls.push(backend.get_type_implementation(&variable.type_name)?);
        }

        let unit = backend.new_unit(mangled_name);
        let op_values = vec![None; imp.operations().len()];

        Ok(Self {
            backend,
            imp,
            unit,
            return_impl,
            arg_impls,
            var_impls,
            arg_storage: Vec::new(),
            var_storage: Vec::new(),
            blocks: Vec::new(),
            op_values,
        })
    }

    fn into_unit(self) -> B::Unit {
        self.unit
    }

    fn declare_and_allocate(&mut self, mangled_name: &str) -> Result<(), BackendError> {
        let param_types: Vec<B::Type> = self.arg_impls.iter().map(|t| t.argument(self.backend)).collect();
        let ret_type = self.return_impl.as_ref().map(|t| t.return_type(self.backend));
        self.backend.declare_function(&mut self.unit, mangled_name, &param_types, ret_type);

        self.blocks = (0..self.imp.blocks().len())
            .map(|i| self.backend.append_block(&mut self.unit, &format!("block{i}")))
            .collect();

        let entry = self.blocks[0];
        self.backend.position_at_end(&mut self.unit, entry);

        self.arg_storage.reserve(self.arg_impls.len());
        for (index, type_impl) in self.arg_impls.iter().enumerate() {
            let storage = type_impl.allocate(self.backend, &mut self.unit);
            let raw = self.backend.param_value(&self.unit, index);
            let attrs = &self.imp.arguments()[index].attributes;
            let converted = type_impl.prolog(self.backend, &mut self.unit, raw, attrs);
            type_impl.assign(self.backend, &mut self.unit, storage, converted);
            self.arg_storage.push(storage);
        }

        self.var_storage.reserve(self.var_impls.len());
        for (index, type_impl) in self.var_impls.iter().enumerate() {
            let storage = type_impl.allocate(self.backend, &mut self.unit);
            if let Some(constant_id) = self.imp.variables()[index].initializer {
                let constant = self.imp.constant(constant_id);
                let value = type_impl.constant(self.backend, &mut self.unit, &constant.value);
                type_impl.assign(self.backend, &mut self.unit, storage, value);
            }
            self.var_storage.push(storage);
        }

        Ok(())
    }

    fn emit_blocks(&mut self, mangled_name: &str) -> Result<(), BackendError> {
        for block_index in 0..self.imp.blocks().len() {
            let op_ids = self.imp.blocks()[block_index].operations().to_vec();
            self.backend.position_at_end(&mut self.unit, self.blocks[block_index]);

            for op_id in op_ids {
                let result = self.emit_operation(op_id)?;
                self.op_values[op_id.index()] = result;
            }

            let terminator = *self.imp.blocks()[block_index]
                .terminator()
                .ok_or_else(|| BackendError::MissingReturn(mangled_name.to_string()))?;
            match terminator {
                Terminator::Return(value) => {
                    let raw = value.map(|value_id| self.resolve_value(value_id));
                    for (index, type_impl) in self.arg_impls.iter().enumerate() {
                        let attrs = &self.imp.arguments()[index].attributes;
                        type_impl.epilog(self.backend, &mut self.unit, self.arg_storage[index], attrs);
                    }
                    self.backend.ret(&mut self.unit, raw);
                }
                Terminator::Branch(target) => {
                    self.backend.br(&mut self.unit, self.blocks[target.index()]);
                }
                Terminator::ConditionBranch { predicate, if_true, if_false } => {
                    let cond = self.resolve_value(predicate);
                    self.backend
                        .cond_br(&mut self.unit, cond, self.blocks[if_true.index()], self.blocks[if_false.index()]);
                }
            }
        }
        Ok(())
    }

    fn value_type_name(&self, value: ValueId) -> String {
        self.imp.value_type(value).unwrap_or("void").to_string()
    }

    fn type_impl_for(&self, value: ValueId) -> Result<Arc<dyn TypeImplementation<B>>, BackendError> {
        self.backend.get_type_implementation(&self.value_type_name(value))
    }

    /// Reads the current value referenced by `value`.
    fn resolve_value(&mut self, value: ValueId) -> B::Value {
        match value {
            ValueId::Argument(id) => {
                let storage = self.arg_storage[id.index()];
                self.arg_impls[id.index()].use_value(self.backend, &mut self.unit, storage)
            }
            ValueId::Variable(id) => {
                let storage = self.var_storage[id.index()];
                self.var_impls[id.index()].use_value(self.backend, &mut self.unit, storage)
            }
            ValueId::Constant(id) => {
                let constant = self.imp.constant(id);
                let type_impl = self
                    .backend
                    .get_type_implementation(&constant.type_name)
                    .unwrap_or_else(|err| panic!("constant of unregistered type: {err}"));
                type_impl.constant(self.backend, &mut self.unit, &constant.value)
            }
            ValueId::Operation(id) => self.op_values[id.index()].unwrap_or_else(|| {
                unreachable!("operation referenced before its value was computed: IR blocks must be in definition order")
            }),
        }
    }

    /// The backing storage slot for an addressable operand (`assign`'s
    /// target, `ref`'s operand). Only arguments and variables have storage;
    /// referencing anything else is a malformed-IR bug, not a runtime error.
    fn resolve_storage(&self, value: ValueId) -> B::Value {
        match value {
            ValueId::Argument(id) => self.arg_storage[id.index()],
            ValueId::Variable(id) => self.var_storage[id.index()],
            other => unreachable!("{other:?} has no backing storage to take the address of"),
        }
    }

    fn emit_operation(&mut self, op_id: mlvm_ir::OperationId) -> Result<Option<B::Value>, BackendError> {
        let operation = self.imp.operation(op_id).clone();
        match operation.name.as_str() {
            "assign" => {
                let value = self.resolve_value(operation.operands[0]);
                let storage = self.resolve_storage(operation.operands[1]);
                let type_impl = self.type_impl_for(operation.operands[1])?;
                type_impl.assign(self.backend, &mut self.unit, storage, value);
                Ok(None)
            }
            "ref" => {
                let storage = self.resolve_storage(operation.operands[0]);
                let type_impl = self.type_impl_for(operation.operands[0])?;
                Ok(Some(type_impl.reference(self.backend, &mut self.unit, storage)))
            }
            "load" => {
                let ptr = self.resolve_value(operation.operands[0]);
                let result_type = operation.result_type.as_deref().unwrap_or("void");
                let type_impl = self.backend.get_type_implementation(result_type)?;
                Ok(Some(type_impl.load(self.backend, &mut self.unit, ptr)))
            }
            "store" => {
                let value = self.resolve_value(operation.operands[0]);
                let ptr = self.resolve_value(operation.operands[1]);
                let type_impl = self.type_impl_for(operation.operands[0])?;
                type_impl.store(self.backend, &mut self.unit, value, ptr);
                Ok(None)
            }
            "call.func" => self.emit_call(&operation, false),
            "call.intr" => self.emit_call(&operation, true),
            name if name.starts_with("cast.") => self.emit_cast(&operation, name),
            name => self.emit_generic(&operation, name),
        }
    }

    fn emit_cast(&mut self, operation: &mlvm_ir::Operation, name: &str) -> Result<Option<B::Value>, BackendError> {
        let from_type = self.value_type_name(operation.operands[0]);
        let to_type = operation.result_type.clone().unwrap_or_default();
        if from_type.ends_with('*') && to_type.ends_with('*') {
            let value = self.resolve_value(operation.operands[0]);
            let to_impl = self.backend.get_type_implementation(&to_type)?;
            let to_ty = to_impl.value(self.backend);
            return Ok(Some(self.backend.bitcast_pointer(&mut self.unit, value, to_ty)));
        }
        self.emit_generic(operation, name)
    }

    fn emit_generic(&mut self, operation: &mlvm_ir::Operation, name: &str) -> Result<Option<B::Value>, BackendError> {
        let operand_types: Vec<String> = operation.operands.iter().map(|v| self.value_type_name(*v)).collect();
        let emitter = self
            .backend
            .get_operation_implementation(name, &operand_types)
            .ok_or_else(|| BackendError::TypeUnimplementedError(name.to_string()))?;
        let operands: Vec<B::Value> = operation.operands.iter().map(|v| self.resolve_value(*v)).collect();
        Ok(emitter.emit(self.backend, &mut self.unit, &operands))
    }

    fn emit_call(&mut self, operation: &mlvm_ir::Operation, is_intrinsic: bool) -> Result<Option<B::Value>, BackendError> {
        let callee = operation.callee.as_deref().unwrap_or_else(|| unreachable!("call operations always carry a callee name"));
        let arg_types: Vec<String> = operation.operands.iter().map(|v| self.value_type_name(*v)).collect();
        let args: Vec<B::Value> = operation.operands.iter().map(|v| self.resolve_value(*v)).collect();

        if is_intrinsic {
            // The intrinsic's body was already materialized into a
            // standalone function at `implement_intrinsic` time; the call
            // site only needs to find and call it.
            let mangled = mangle_intrinsic(callee, &arg_types);
            let function = self
                .backend
                .declared_function(&self.unit, &mangled)
                .ok_or_else(|| BackendError::TypeUnimplementedError(mangled))?;
            return Ok(self.backend.call_function(&mut self.unit, function, &args));
        }

        let mangled = mangle(callee, &arg_types);
        let function = match self.backend.declared_function(&self.unit, &mangled) {
            Some(function) => function,
            None => {
                let param_types: Vec<B::Type> = operation
                    .operands
                    .iter()
                    .map(|v| self.type_impl_for(*v).map(|t| t.argument(self.backend)))
                    .collect::<Result<_, _>>()?;
                let ret_type = match &operation.result_type {
                    Some(type_name) => Some(self.backend.get_type_implementation(type_name)?.return_type(self.backend)),
                    None => None,
                };
                self.backend
                    .declare_external_function(&mut self.unit, &mangled, &param_types, ret_type)
            }
        };

        Ok(self.backend.call_function(&mut self.unit, function, &args))
    }
}
