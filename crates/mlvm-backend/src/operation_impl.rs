//! Operation and intrinsic-body emitters registered on a [`crate::Backend`].

use crate::backend::Backend;

/// Lowers one arithmetic, comparison, or non-pointer cast operation into
/// target-level instructions. Registered under `(op_name, operand_types)` in
/// the backend's operation registry and retrieved via
/// [`Backend::get_operation_implementation`](crate::Backend::get_operation_implementation).
///
/// Call operations (`call.func`/`call.intr`), `assign`, `return`, and the
/// pointer operations (`ref`/`load`/`store`) are "special forms" the
/// [`crate::Translator`] lowers directly through [`crate::TypeImplementation`]
/// and the core [`Backend`] methods; they never go through this trait.
pub trait OperationImplementation<B: Backend> {
    /// Emits the operation given its already-lowered operand values.
    /// Returns `None` for a void-result operation.
    fn emit(&self, backend: &mut B, unit: &mut B::Unit, operands: &[B::Value]) -> Option<B::Value>;
}

/// An intrinsic's body: the same shape as an operation emitter, registered
/// under `(name, arg_types)` in the backend's intrinsic registry and
/// materialized into the intrinsic library at registration time.
pub trait IntrinsicBody<B: Backend> {
    fn emit(&self, backend: &mut B, unit: &mut B::Unit, operands: &[B::Value]) -> Option<B::Value>;
}
