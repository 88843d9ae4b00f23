//! Synthesized pointer type implementation: `get_type_implementation("T*")`
//! recursively wraps the pointee's implementation rather than requiring
//! every pointer form to be registered explicitly (I8).

use std::sync::Arc;

use mlvm_ir::{AttributeSet, ConstantValue};

use crate::backend::Backend;
use crate::type_impl::TypeImplementation;

pub struct PointerTypeImplementation<B: Backend> {
    pointee: Arc<dyn TypeImplementation<B>>,
}

impl<B: Backend> PointerTypeImplementation<B> {
    #[must_use]
    pub fn new(pointee: Arc<dyn TypeImplementation<B>>) -> Self {
        Self { pointee }
    }

    /// The pointee's implementation, so a `T**` can recurse through a `T*`.
    #[must_use]
    pub fn pointee(&self) -> &Arc<dyn TypeImplementation<B>> {
        &self.pointee
    }
}

impl<B: Backend> TypeImplementation<B> for PointerTypeImplementation<B> {
    fn value(&self, backend: &B) -> B::Type {
        backend.pointer_type()
    }

    fn allocate(&self, backend: &mut B, unit: &mut B::Unit) -> B::Value {
        let ty = backend.pointer_type();
        backend.alloc_value(unit, ty)
    }

    fn use_value(&self, backend: &mut B, unit: &mut B::Unit, storage: B::Value) -> B::Value {
        let ty = backend.pointer_type();
        backend.load_value(unit, storage, ty)
    }

    fn assign(&self, backend: &mut B, unit: &mut B::Unit, storage: B::Value, value: B::Value) {
        backend.store_value(unit, value, storage);
    }

    fn constant(&self, _backend: &mut B, _unit: &mut B::Unit, value: &ConstantValue) -> B::Value {
        unreachable!("pointer constants are not part of the IR value model: {value:?}")
    }

    fn load(&self, backend: &mut B, unit: &mut B::Unit, ptr: B::Value) -> B::Value {
        let ty = backend.pointer_type();
        backend.load_value(unit, ptr, ty)
    }

    fn store(&self, backend: &mut B, unit: &mut B::Unit, value: B::Value, ptr: B::Value) {
        backend.store_value(unit, value, ptr);
    }

    fn reference(&self, backend: &mut B, unit: &mut B::Unit, storage: B::Value) -> B::Value {
        backend.address_of(unit, storage)
    }

    fn prolog(&self, _backend: &mut B, _unit: &mut B::Unit, raw: B::Value, _attrs: &AttributeSet) -> B::Value {
        raw
    }
}
