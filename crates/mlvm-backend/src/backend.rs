//! The code-generator abstraction the [`crate::Translator`] lowers IR
//! through. Follows the `rustc_codegen_ssa`-style trait-hierarchy pattern:
//! associated types stand in for a concrete low-level IR's value/type/block
//! handles, and a single concrete implementation (the `mlvm-llvm` crate)
//! fills them in with `inkwell` types. This abstraction exists so a future
//! Cranelift or other backend could implement the same trait without
//! touching the Translator.

use std::sync::Arc;

use mlvm_ir::Implementation;

use crate::error::BackendError;
use crate::extension::Extension;
use crate::mangle::mangle_intrinsic;
use crate::operation_impl::{IntrinsicBody, OperationImplementation};
use crate::pointer::PointerTypeImplementation;
use crate::registry::{IntrinsicRegistry, OperationRegistry, TypeRegistry};
use crate::translator;
use crate::type_impl::TypeImplementation;

/// A code-generator binding plus its registries of type, operation, and
/// intrinsic implementations.
///
/// **Duplicate-registration policy:** [`Backend::implement_operation`]
/// overwrites an existing `(op_name, operand_types)` registration silently;
/// [`Backend::implement_intrinsic`] rejects a second body for the same
/// `(name, arg_types)` with [`BackendError::DuplicateIntrinsic`]. This
/// asymmetry is deliberate: operation lowering is expected to be overridden
/// by extensions layering richer types over built-ins, while two distinct
/// intrinsic bodies for one signature is almost always a caller mistake.
///
/// Not `Sync`: a `Backend` is meant to be driven by one caller at a time,
/// the same single-threaded, cooperative model the rest of the core assumes.
pub trait Backend: Sized {
    /// An SSA-style value in the target IR.
    type Value: Copy;
    /// A type in the target IR.
    type Type: Copy;
    /// A declared target function (used to resolve direct calls).
    type Function: Copy;
    /// A basic block in the target IR.
    type BasicBlock: Copy;
    /// A fresh, not-yet-linked compilation unit (one target module plus its
    /// in-progress function).
    type Unit;

    /// The machine word width this backend was constructed for, in bits (32
    /// or 64). Fixed once at construction; the `address` type binds to the
    /// corresponding integer width.
    fn address_width(&self) -> u32;

    /// The target's generic pointer type, used to synthesize pointer type
    /// implementations.
    fn pointer_type(&self) -> Self::Type;

    fn type_registry(&self) -> &TypeRegistry<Self>;
    fn type_registry_mut(&mut self) -> &mut TypeRegistry<Self>;
    fn operation_registry(&self) -> &OperationRegistry<Self>;
    fn operation_registry_mut(&mut self) -> &mut OperationRegistry<Self>;
    fn intrinsic_registry(&self) -> &IntrinsicRegistry<Self>;
    fn intrinsic_registry_mut(&mut self) -> &mut IntrinsicRegistry<Self>;

    /// Registers the implementation for a non-pointer type name. Overwrites
    /// any existing registration for `type_name`.
    fn implement_type(&mut self, type_name: impl Into<String>, implementation: Arc<dyn TypeImplementation<Self>>) {
        self.type_registry_mut().insert(type_name, implementation);
    }

    /// Registers an operation lowering under `(op_name, operand_types)`.
    /// Overwrites any existing registration for the same key.
    fn implement_operation(
        &mut self,
        op_name: impl Into<String>,
        operand_types: Vec<String>,
        emitter: Arc<dyn OperationImplementation<Self>>,
    ) {
        self.operation_registry_mut().insert(op_name.into(), operand_types, emitter);
    }

    /// Registers an intrinsic's body under `(name, arg_types)` and
    /// immediately materializes it into the backend's intrinsic library: a
    /// standalone function, mangled via [`mangle_intrinsic`], compiled,
    /// verified, optimized, and marked for link-once, always-inline
    /// visibility ([`Backend::mark_always_inline`]) so later call sites pay
    /// no call overhead once the target IR inlines it.
    ///
    /// # Errors
    /// Returns [`BackendError::DuplicateIntrinsic`] if this signature
    /// already has a registered body (checked before any materialization, so
    /// a duplicate call never declares a second function under the same
    /// mangled name). Propagates [`BackendError::TypeUnimplementedError`] if
    /// an argument or return type has no registered implementation.
    fn implement_intrinsic(
        &mut self,
        name: impl Into<String>,
        return_type: impl Into<String>,
        arg_types: Vec<String>,
        body: Arc<dyn IntrinsicBody<Self>>,
    ) -> Result<(), BackendError> {
        let name = name.into();
        let return_type = return_type.into();
        self.intrinsic_registry_mut()
            .insert(name.clone(), return_type.clone(), arg_types.clone(), Arc::clone(&body))?;
        self.materialize_intrinsic(&name, &return_type, &arg_types, &body)
    }

    /// Builds the standalone function an intrinsic's body is materialized
    /// into. Not part of the duplicate-registration check; callers go
    /// through [`Backend::implement_intrinsic`].
    fn materialize_intrinsic(
        &mut self,
        name: &str,
        return_type: &str,
        arg_types: &[String],
        body: &Arc<dyn IntrinsicBody<Self>>,
    ) -> Result<(), BackendError> {
        let mangled = mangle_intrinsic(name, arg_types);

        let mut param_types = Vec::with_capacity(arg_types.len());
        for arg_type in arg_types {
            param_types.push(self.get_type_implementation(arg_type)?.argument(self));
        }
        let ret_type = if return_type == "void" {
            None
        } else {
            Some(self.get_type_implementation(return_type)?.return_type(self))
        };

        let mut unit = self.new_unit(&mangled);
        self.declare_function(&mut unit, &mangled, &param_types, ret_type);
        let entry = self.append_block(&mut unit, "entry");
        self.position_at_end(&mut unit, entry);

        let args: Vec<Self::Value> = (0..arg_types.len()).map(|index| self.param_value(&unit, index)).collect();
        let result = body.emit(self, &mut unit, &args);
        self.ret(&mut unit, result);

        self.verify(&unit)?;
        self.optimize_function(&mut unit);
        self.mark_always_inline(&mut unit);
        Ok(())
    }

    /// Marks the unit's just-declared function for link-once, always-inline
    /// visibility. Called once, right after an intrinsic body is
    /// materialized. Defaults to a no-op; backends whose target IR has a
    /// linkage/attribute model (e.g. LLVM's `LinkOnceODR` + `alwaysinline`)
    /// override this.
    fn mark_always_inline(&mut self, _unit: &mut Self::Unit) {}

    /// Installs `extensions` in order (the insertion order of the `Vec` the
    /// caller supplies), registering each one's types, operations, and
    /// intrinsics on this backend.
    fn install(&mut self, extensions: Vec<Box<dyn Extension<Self>>>) {
        for extension in extensions {
            extension.install_to_backend(self);
        }
    }

    /// Looks up a type's implementation. If `type_name` ends in `*` and has
    /// no direct registration, synthesizes a pointer type implementation
    /// over the pointee (recursively, so `T**` resolves through `T*`).
    ///
    /// # Errors
    /// Returns [`BackendError::TypeUnimplementedError`] if neither a direct
    /// registration nor pointer synthesis can produce an implementation.
    fn get_type_implementation(&self, type_name: &str) -> Result<Arc<dyn TypeImplementation<Self>>, BackendError> {
        if let Some(found) = self.type_registry().get(type_name) {
            return Ok(found);
        }
        if let Some(pointee_name) = type_name.strip_suffix('*') {
            let pointee = self.get_type_implementation(pointee_name)?;
            return Ok(Arc::new(PointerTypeImplementation::new(pointee)));
        }
        Err(BackendError::TypeUnimplementedError(type_name.to_string()))
    }

    /// Looks up a registered operation emitter. Only used for the
    /// "catch-all" operations (arithmetic, comparison, non-pointer casts);
    /// calls and pointer bitcasts are special forms the Translator lowers
    /// directly.
    fn get_operation_implementation(
        &self,
        op_name: &str,
        operand_types: &[String],
    ) -> Option<Arc<dyn OperationImplementation<Self>>> {
        self.operation_registry().get(op_name, operand_types)
    }

    // -- Module/function/block primitives the Translator drives directly --

    /// Creates a fresh, empty compilation unit named `name` (already the
    /// mangled symbol name).
    fn new_unit(&mut self, name: &str) -> Self::Unit;

    /// Declares the unit's one function with the given parameter and return
    /// types (`None` return type means void).
    fn declare_function(&mut self, unit: &mut Self::Unit, name: &str, params: &[Self::Type], ret: Option<Self::Type>);

    fn append_block(&mut self, unit: &mut Self::Unit, name: &str) -> Self::BasicBlock;
    fn position_at_end(&mut self, unit: &mut Self::Unit, block: Self::BasicBlock);

    /// The raw value of the unit's declared function's `index`-th parameter.
    fn param_value(&self, unit: &Self::Unit, index: usize) -> Self::Value;

    fn br(&mut self, unit: &mut Self::Unit, target: Self::BasicBlock);
    fn cond_br(&mut self, unit: &mut Self::Unit, cond: Self::Value, if_true: Self::BasicBlock, if_false: Self::BasicBlock);
    fn ret(&mut self, unit: &mut Self::Unit, value: Option<Self::Value>);

    /// Looks up a function declared in another unit already linked into
    /// this backend's shared module state (used to resolve `call.func` to
    /// callables with no body in this unit).
    fn declared_function(&self, unit: &Self::Unit, mangled_name: &str) -> Option<Self::Function>;

    /// Declares an external function signature if not already present, for
    /// calling a callee compiled elsewhere.
    fn declare_external_function(
        &mut self,
        unit: &mut Self::Unit,
        mangled_name: &str,
        params: &[Self::Type],
        ret: Option<Self::Type>,
    ) -> Self::Function;

    fn call_function(&mut self, unit: &mut Self::Unit, function: Self::Function, args: &[Self::Value]) -> Option<Self::Value>;

    /// Materializes a literal as a value of target type `ty`, dispatching on
    /// the [`mlvm_ir::ConstantValue`] variant (integer/float/bool) the way a
    /// `TypeImplementation::constant` body would otherwise have to per target
    /// backend; kept generic here since most scalar types share it.
    fn scalar_constant(&mut self, unit: &mut Self::Unit, ty: Self::Type, value: mlvm_ir::ConstantValue) -> Self::Value;

    /// Generic stack allocation, used by [`crate::pointer::PointerTypeImplementation`].
    fn alloc_value(&mut self, unit: &mut Self::Unit, ty: Self::Type) -> Self::Value;
    fn load_value(&mut self, unit: &mut Self::Unit, ptr: Self::Value, ty: Self::Type) -> Self::Value;
    fn store_value(&mut self, unit: &mut Self::Unit, value: Self::Value, ptr: Self::Value);
    fn address_of(&mut self, unit: &mut Self::Unit, storage: Self::Value) -> Self::Value;

    /// Pointer-to-pointer bitcast, for `cast.T*.U*` operations.
    fn bitcast_pointer(&mut self, unit: &mut Self::Unit, value: Self::Value, to: Self::Type) -> Self::Value;

    /// Indexes `elem_ty`-typed elements through pointer `base`, the way a C
    /// array subscript does: `base + index * sizeof(elem_ty)`. Used by
    /// extensions that lay out a flat element buffer behind a pointer value
    /// (e.g. an array type's `load`/`store`/elementwise-arithmetic
    /// intrinsics), which otherwise have no primitive for stepping through
    /// more than one element.
    fn gep(&mut self, unit: &mut Self::Unit, base: Self::Value, elem_ty: Self::Type, index: Self::Value) -> Self::Value;

    /// Verifies the unit's function is well-formed at the target-IR level.
    ///
    /// # Errors
    /// Backend-specific; surfaced to the caller as a [`BackendError`].
    fn verify(&self, unit: &Self::Unit) -> Result<(), BackendError>;

    /// Runs per-function optimization passes on `unit`.
    fn optimize_function(&mut self, unit: &mut Self::Unit);

    /// Runs module-level optimization passes, invoked from [`Backend::link`].
    fn optimize_module(&mut self, unit: &mut Self::Unit);

    /// Compiles one function body into a fresh target unit: runs the
    /// Translator's six-step lowering pipeline, verifies the result, and
    /// runs per-function optimization.
    ///
    /// # Errors
    /// Propagates any [`BackendError`] raised while lowering or verifying.
    fn compile(&mut self, imp: &Implementation, mangled_name: &str) -> Result<Self::Unit, BackendError> {
        let mut unit = translator::translate(self, imp, mangled_name)?;
        self.verify(&unit)?;
        self.optimize_function(&mut unit);
        Ok(unit)
    }

    /// Links the intrinsic library and any extra libraries into `unit`, then
    /// runs module-level optimization.
    ///
    /// The intrinsic library is already resident by the time this runs:
    /// [`Backend::implement_intrinsic`] materializes each intrinsic's body
    /// into the shared module at registration time, not here, so every call
    /// site already resolves against a function already declared in the
    /// module. Extra (host) libraries are not linked into the target IR at
    /// all; a caller binds an external symbol's runtime address after
    /// compilation, at the Execution Manager layer
    /// (`mlvm_jit::ExecutionManager::link_external_symbol`), once the symbol
    /// has been auto-declared as an external function by an unresolved call
    /// site. This default body's only remaining responsibility is
    /// module-level optimization.
    fn link(&mut self, mut unit: Self::Unit) -> Self::Unit {
        self.optimize_module(&mut unit);
        unit
    }
}
