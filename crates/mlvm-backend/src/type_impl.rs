//! The capability set a registered type must supply so the [`crate::Translator`]
//! can allocate, convert, and marshal values of that type.

use mlvm_ir::{AttributeSet, ConstantValue};

use crate::backend::Backend;

/// Maps one IR type name to its target-level views and the operations the
/// translator needs to allocate, read, write, and marshal values of that
/// type.
///
/// Every method that is not part of the core value/storage contract
/// (`value`, `allocate`, `use_value`, `assign`, `constant`, `load`, `store`,
/// `reference`) has a default identity/no-op implementation, matching the
/// defaults named in the component design: `precall`/`postcall`/`prolog`/
/// `epilog`/`deallocate` are identities or no-ops, `ctype_argument`/
/// `ctype_return` pass the value through unchanged.
pub trait TypeImplementation<B: Backend> {
    /// The type used for ordinary in-body values (the "value view").
    fn value(&self, backend: &B) -> B::Type;

    /// The type used for this type as a function's declared return type.
    /// Defaults to the value view.
    fn return_type(&self, backend: &B) -> B::Type {
        self.value(backend)
    }

    /// The type used for this type as an incoming parameter, before
    /// `prolog` converts it. Defaults to the value view.
    fn argument(&self, backend: &B) -> B::Type {
        self.value(backend)
    }

    /// The type used at the host-callable ABI boundary. Defaults to the
    /// value view.
    fn ctype(&self, backend: &B) -> B::Type {
        self.value(backend)
    }

    /// Allocates backing storage for one local variable or argument slot.
    fn allocate(&self, backend: &mut B, unit: &mut B::Unit) -> B::Value;

    /// Releases storage allocated by [`TypeImplementation::allocate`].
    /// Defaults to a no-op (stack-allocated storage needs no explicit
    /// teardown).
    fn deallocate(&self, _backend: &mut B, _unit: &mut B::Unit, _storage: B::Value) {}

    /// Reads the current value out of `storage`.
    fn use_value(&self, backend: &mut B, unit: &mut B::Unit, storage: B::Value) -> B::Value;

    /// Writes `value` into `storage`.
    fn assign(&self, backend: &mut B, unit: &mut B::Unit, storage: B::Value, value: B::Value);

    /// Materializes an IR constant as a target-level value.
    fn constant(&self, backend: &mut B, unit: &mut B::Unit, value: &ConstantValue) -> B::Value;

    /// Converts a raw incoming parameter (in the `argument` view) into a
    /// value ready to store into the parameter's local slot. `attrs` are the
    /// IR argument's attribute tags, forwarded verbatim so an extension can,
    /// for instance, reinterpret a flat pointer parameter as a vector
    /// pointer. Defaults to the identity conversion.
    fn prolog(&self, _backend: &mut B, _unit: &mut B::Unit, raw: B::Value, _attrs: &AttributeSet) -> B::Value {
        raw
    }

    /// Runs on function exit for every argument, in declaration order.
    /// `out`-flagged arguments may use this to copy a result back through a
    /// pointer parameter. Defaults to a no-op.
    fn epilog(&self, _backend: &mut B, _unit: &mut B::Unit, _storage: B::Value, _attrs: &AttributeSet) {}

    /// Converts an operand immediately before it is passed to a `call`.
    /// Defaults to the identity conversion.
    fn precall(&self, _backend: &mut B, _unit: &mut B::Unit, value: B::Value) -> B::Value {
        value
    }

    /// Converts a `call` operand's value immediately after the call
    /// returns. Defaults to the identity conversion.
    fn postcall(&self, _backend: &mut B, _unit: &mut B::Unit, value: B::Value) -> B::Value {
        value
    }

    /// Loads through a pointer value of this type.
    fn load(&self, backend: &mut B, unit: &mut B::Unit, ptr: B::Value) -> B::Value;

    /// Stores `value` through a pointer value of this type.
    fn store(&self, backend: &mut B, unit: &mut B::Unit, value: B::Value, ptr: B::Value);

    /// Takes the address of `storage`, producing a pointer value.
    fn reference(&self, backend: &mut B, unit: &mut B::Unit, storage: B::Value) -> B::Value;

    /// Converts a host-callable argument into this type's `ctype` view.
    /// Defaults to the identity conversion.
    fn ctype_argument(&self, _backend: &mut B, _unit: &mut B::Unit, value: B::Value) -> B::Value {
        value
    }

    /// Converts this type's `ctype` view back to a host-callable return
    /// value. Defaults to the identity conversion.
    fn ctype_return(&self, _backend: &mut B, _unit: &mut B::Unit, value: B::Value) -> B::Value {
        value
    }
}
