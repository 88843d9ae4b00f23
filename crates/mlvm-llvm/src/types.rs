//! Scalar type implementations. One `ScalarType` struct parameterized by
//! [`ScalarKind`] covers every built-in numeric type (`int{8,16,32,64}`,
//! `uint{8,16,32,64}`, `float`, `double`, `pred`, `address`) instead of
//! eleven near-identical structs, grounded on `ori_llvm::context::SimpleCx`'s
//! type-constructor methods for the `value()` view and
//! `ori_llvm::builder::Builder`'s alloca/load/store family for the
//! allocate/load/store/use_value/assign methods — which here are just calls
//! into the backend's own generic scalar primitives, since every built-in
//! scalar shares exactly the same storage shape (one alloca, one load, one
//! store).

use inkwell::types::BasicTypeEnum;
use inkwell::values::BasicValueEnum;
use mlvm_backend::TypeImplementation;
use mlvm_ir::{AttributeSet, ConstantValue};

use crate::backend::LlvmBackend;
use crate::unit::LlvmUnit;

/// The LLVM-level shape and signedness of a built-in scalar type. Signedness
/// does not affect the LLVM type itself (LLVM integers carry no sign), only
/// which instructions operations on that type select — see `ops.rs`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ScalarKind {
    Int { bits: u32, signed: bool },
    Float32,
    Float64,
}

impl ScalarKind {
    pub(crate) fn is_float(self) -> bool {
        matches!(self, Self::Float32 | Self::Float64)
    }

    pub(crate) fn is_signed(self) -> bool {
        matches!(self, Self::Int { signed: true, .. })
    }

    pub(crate) fn bit_width(self) -> u32 {
        match self {
            Self::Int { bits, .. } => bits,
            Self::Float32 => 32,
            Self::Float64 => 64,
        }
    }
}

/// One built-in scalar type's capability set. Delegates storage/conversion
/// to [`crate::backend::LlvmBackend`]'s generic primitives rather than
/// re-implementing alloca/load/store per type.
pub(crate) struct ScalarType {
    kind: ScalarKind,
}

impl ScalarType {
    pub(crate) fn new(kind: ScalarKind) -> Self {
        Self { kind }
    }

    fn llvm_type<'ctx>(&self, backend: &LlvmBackend<'ctx>) -> BasicTypeEnum<'ctx> {
        scalar_llvm_type(backend, self.kind)
    }
}

/// The LLVM type a [`ScalarKind`] maps to. Shared by [`ScalarType`] (for the
/// `TypeImplementation::value` view) and `ops.rs` (whose operation emitters
/// need the same mapping to build casts and select target types).
pub(crate) fn scalar_llvm_type<'ctx>(backend: &LlvmBackend<'ctx>, kind: ScalarKind) -> BasicTypeEnum<'ctx> {
    match kind {
        ScalarKind::Int { bits, .. } => backend.int_type(bits).into(),
        ScalarKind::Float32 => backend.context().f32_type().into(),
        ScalarKind::Float64 => backend.context().f64_type().into(),
    }
}

impl<'ctx> TypeImplementation<LlvmBackend<'ctx>> for ScalarType {
    fn value(&self, backend: &LlvmBackend<'ctx>) -> BasicTypeEnum<'ctx> {
        self.llvm_type(backend)
    }

    fn allocate(&self, backend: &mut LlvmBackend<'ctx>, unit: &mut LlvmUnit<'ctx>) -> BasicValueEnum<'ctx> {
        let ty = self.llvm_type(backend);
        backend.alloc_value(unit, ty)
    }

    fn use_value(&self, backend: &mut LlvmBackend<'ctx>, unit: &mut LlvmUnit<'ctx>, storage: BasicValueEnum<'ctx>) -> BasicValueEnum<'ctx> {
        let ty = self.llvm_type(backend);
        backend.load_value(unit, storage, ty)
    }

    fn assign(&self, backend: &mut LlvmBackend<'ctx>, unit: &mut LlvmUnit<'ctx>, storage: BasicValueEnum<'ctx>, value: BasicValueEnum<'ctx>) {
        backend.store_value(unit, value, storage);
    }

    fn constant(&self, backend: &mut LlvmBackend<'ctx>, unit: &mut LlvmUnit<'ctx>, value: &ConstantValue) -> BasicValueEnum<'ctx> {
        let ty = self.llvm_type(backend);
        backend.scalar_constant(unit, ty, *value)
    }

    fn load(&self, backend: &mut LlvmBackend<'ctx>, unit: &mut LlvmUnit<'ctx>, ptr: BasicValueEnum<'ctx>) -> BasicValueEnum<'ctx> {
        let ty = self.llvm_type(backend);
        backend.load_value(unit, ptr, ty)
    }

    fn store(&self, backend: &mut LlvmBackend<'ctx>, unit: &mut LlvmUnit<'ctx>, value: BasicValueEnum<'ctx>, ptr: BasicValueEnum<'ctx>) {
        backend.store_value(unit, value, ptr);
    }

    fn reference(&self, backend: &mut LlvmBackend<'ctx>, unit: &mut LlvmUnit<'ctx>, storage: BasicValueEnum<'ctx>) -> BasicValueEnum<'ctx> {
        backend.address_of(unit, storage)
    }

    fn prolog(
        &self,
        _backend: &mut LlvmBackend<'ctx>,
        _unit: &mut LlvmUnit<'ctx>,
        raw: BasicValueEnum<'ctx>,
        _attrs: &AttributeSet,
    ) -> BasicValueEnum<'ctx> {
        raw
    }
}

/// `(type name, kind)` pairs for every built-in scalar SPEC_FULL.md §3 names,
/// excluding `void` (which has no value representation; a `void`-returning
/// function's [`mlvm_ir::Implementation::return_type`] is checked before any
/// type lookup happens) and excluding `address`, which is registered
/// separately since its bit width depends on the backend's address width.
pub(crate) const NUMERIC_TYPES: &[(&str, ScalarKind)] = &[
    ("int8", ScalarKind::Int { bits: 8, signed: true }),
    ("int16", ScalarKind::Int { bits: 16, signed: true }),
    ("int32", ScalarKind::Int { bits: 32, signed: true }),
    ("int64", ScalarKind::Int { bits: 64, signed: true }),
    ("uint8", ScalarKind::Int { bits: 8, signed: false }),
    ("uint16", ScalarKind::Int { bits: 16, signed: false }),
    ("uint32", ScalarKind::Int { bits: 32, signed: false }),
    ("uint64", ScalarKind::Int { bits: 64, signed: false }),
    ("float", ScalarKind::Float32),
    ("double", ScalarKind::Float64),
];

/// Registers every built-in scalar type's implementation: the ten numeric
/// types above, `pred` (a one-bit unsigned integer), and `address` (an
/// unsigned integer sized to `backend.address_width()`).
pub(crate) fn register_builtin_types(backend: &mut LlvmBackend<'_>) {
    for (name, kind) in NUMERIC_TYPES {
        backend.implement_type(*name, std::sync::Arc::new(ScalarType::new(*kind)));
    }
    backend.implement_type("pred", std::sync::Arc::new(ScalarType::new(ScalarKind::Int { bits: 1, signed: false })));
    let address_kind = ScalarKind::Int {
        bits: backend.address_width(),
        signed: false,
    };
    backend.implement_type("address", std::sync::Arc::new(ScalarType::new(address_kind)));
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn numeric_types_cover_every_builtin_except_void_and_address() {
        let names: Vec<&str> = NUMERIC_TYPES.iter().map(|(name, _)| *name).collect();
        assert_eq!(names, vec!["int8", "int16", "int32", "int64", "uint8", "uint16", "uint32", "uint64", "float", "double"]);
    }

    #[test]
    fn float_kinds_are_not_signed_integers() {
        assert!(!ScalarKind::Float32.is_signed());
        assert!(ScalarKind::Float32.is_float());
    }

    #[test]
    fn int_kind_bit_width_round_trips() {
        let kind = ScalarKind::Int { bits: 32, signed: true };
        assert_eq!(kind.bit_width(), 32);
        assert!(kind.is_signed());
        assert!(!kind.is_float());
    }
}
