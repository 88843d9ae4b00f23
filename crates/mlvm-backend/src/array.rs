//! Flat C-array element type: one `array_<elem>` type per element type,
//! backed by the same pointer representation `T*` already has, plus
//! `array_load`/`array_store`/`array_add` intrinsics. Does no bounds
//! checking, matching a raw C array.
//!
//! Grounded on `mlvm.llvm.ext.arraytype`'s `install_to_context`/
//! `install_to_backend` pair: array types are never pre-registered as
//! pointer forms (the type system rejects trailing `*` on
//! `TypeSystem::add_type`), so each element type gets its own nominal
//! `array_<elem>` type, distinct from a raw `<elem>*`, so overload
//! resolution can tell the two apart. `array_add`'s body is a counting loop
//! assembled from `Backend` primitives directly (storage-backed, not a phi
//! node — this crate's functions never use SSA phi nodes, see
//! `mlvm_builder::control_flow`), stepping through `elemct` elements with
//! [`Backend::gep`].

use std::sync::Arc;

use mlvm_ir::{ConstantValue, Context, Extension as IrExtension, IrError};

use crate::backend::Backend;
use crate::extension::Extension;
use crate::operation_impl::IntrinsicBody;
use crate::pointer::PointerTypeImplementation;
use crate::type_impl::TypeImplementation;

const INTEGER_TYPES: &[&str] = &["int8", "int16", "int32", "int64", "uint8", "uint16", "uint32", "uint64", "address"];
const REAL_TYPES: &[&str] = &["float", "double"];

fn element_types() -> impl Iterator<Item = &'static str> {
    INTEGER_TYPES.iter().copied().chain(REAL_TYPES.iter().copied())
}

/// Installable array-type extension: `array_load(array_T, address) -> T`,
/// `array_store(array_T, T, address) -> void`, and `array_add(array_T,
/// array_T, array_T, address) -> void` (element-wise, writing into the
/// third array) for every built-in numeric element type `T`.
pub struct ArrayExtension;

impl IrExtension for ArrayExtension {
    fn name(&self) -> &'static str {
        "array"
    }

    fn install_to_context(&self, ctx: &mut Context) -> Result<(), IrError> {
        for elem in element_types() {
            ctx.types_mut().add_type(&format!("array_{elem}"))?;
        }

        let array_load = ctx.get_or_insert_intrinsic("array_load")?;
        for elem in element_types() {
            array_load.add_definition(elem, vec![format!("array_{elem}"), "address".to_string()])?;
        }

        let array_store = ctx.get_or_insert_intrinsic("array_store")?;
        for elem in element_types() {
            array_store.add_definition("void", vec![format!("array_{elem}"), elem.to_string(), "address".to_string()])?;
        }

        let array_add = ctx.get_or_insert_intrinsic("array_add")?;
        for elem in element_types() {
            let arraytype = format!("array_{elem}");
            array_add.add_definition("void", vec![arraytype.clone(), arraytype.clone(), arraytype, "address".to_string()])?;
        }

        Ok(())
    }
}

impl<B: Backend> Extension<B> for ArrayExtension {
    fn name(&self) -> &'static str {
        "array"
    }

    fn install_to_backend(&self, backend: &mut B) {
        for elem in element_types() {
            let arraytype = format!("array_{elem}");
            let elem_impl = backend.get_type_implementation(elem).unwrap_or_else(|err| panic!("{err}"));
            backend.implement_type(arraytype.clone(), Arc::new(PointerTypeImplementation::new(elem_impl)));

            backend
                .implement_intrinsic(
                    "array_load",
                    elem,
                    vec![arraytype.clone(), "address".to_string()],
                    Arc::new(ArrayLoad { elem_type: elem.to_string() }),
                )
                .unwrap_or_else(|err| panic!("{err}"));

            backend
                .implement_intrinsic(
                    "array_store",
                    "void",
                    vec![arraytype.clone(), elem.to_string(), "address".to_string()],
                    Arc::new(ArrayStore { elem_type: elem.to_string() }),
                )
                .unwrap_or_else(|err| panic!("{err}"));

            backend
                .implement_intrinsic(
                    "array_add",
                    "void",
                    vec![arraytype.clone(), arraytype.clone(), arraytype.clone(), "address".to_string()],
                    Arc::new(ArrayAdd { elem_type: elem.to_string() }),
                )
                .unwrap_or_else(|err| panic!("{err}"));
        }
    }
}

struct ArrayLoad {
    elem_type: String,
}

impl<B: Backend> IntrinsicBody<B> for ArrayLoad {
    fn emit(&self, backend: &mut B, unit: &mut B::Unit, operands: &[B::Value]) -> Option<B::Value> {
        let array = operands[0];
        let idx = operands[1];
        let elem_ty = backend.get_type_implementation(&self.elem_type).unwrap_or_else(|err| panic!("{err}")).value(backend);
        let elem_ptr = backend.gep(unit, array, elem_ty, idx);
        Some(backend.load_value(unit, elem_ptr, elem_ty))
    }
}

struct ArrayStore {
    elem_type: String,
}

impl<B: Backend> IntrinsicBody<B> for ArrayStore {
    fn emit(&self, backend: &mut B, unit: &mut B::Unit, operands: &[B::Value]) -> Option<B::Value> {
        let array = operands[0];
        let value = operands[1];
        let idx = operands[2];
        let elem_ty = backend.get_type_implementation(&self.elem_type).unwrap_or_else(|err| panic!("{err}")).value(backend);
        let elem_ptr = backend.gep(unit, array, elem_ty, idx);
        backend.store_value(unit, value, elem_ptr);
        None
    }
}

/// `dary[i] = lary[i] + rary[i]` for `i` in `0..elemct`, assembled directly
/// from [`Backend`] primitives: an alloca-backed index variable and a
/// single conditional-branch loop, the same storage-backed shape
/// `mlvm_builder::control_flow` uses for IR-level loops, but built here at
/// the `Backend` level since an intrinsic body has no [`mlvm_builder::Builder`]
/// to drive.
struct ArrayAdd {
    elem_type: String,
}

impl<B: Backend> IntrinsicBody<B> for ArrayAdd {
    fn emit(&self, backend: &mut B, unit: &mut B::Unit, operands: &[B::Value]) -> Option<B::Value> {
        let lary = operands[0];
        let rary = operands[1];
        let dary = operands[2];
        let elemct = operands[3];

        let elem_ty = backend.get_type_implementation(&self.elem_type).unwrap_or_else(|err| panic!("{err}")).value(backend);
        let address_ty = backend.get_type_implementation("address").unwrap_or_else(|err| panic!("{err}")).value(backend);

        let add_elem = backend
            .get_operation_implementation("add", &[self.elem_type.clone(), self.elem_type.clone()])
            .unwrap_or_else(|| unreachable!("every element type has a registered `add`"));
        let add_address = backend
            .get_operation_implementation("add", &["address".to_string(), "address".to_string()])
            .unwrap_or_else(|| unreachable!("`address` has a registered `add`"));
        let cmp_lt = backend
            .get_operation_implementation("cmp.lt", &["address".to_string(), "address".to_string()])
            .unwrap_or_else(|| unreachable!("`address` has a registered `cmp.lt`"));

        let idx_storage = backend.alloc_value(unit, address_ty);
        let zero = backend.scalar_constant(unit, address_ty, ConstantValue::Int(0));
        backend.store_value(unit, zero, idx_storage);

        let body = backend.append_block(unit, "array_add.body");
        let exit = backend.append_block(unit, "array_add.exit");
        backend.br(unit, body);

        backend.position_at_end(unit, body);
        let idx = backend.load_value(unit, idx_storage, address_ty);

        let lptr = backend.gep(unit, lary, elem_ty, idx);
        let rptr = backend.gep(unit, rary, elem_ty, idx);
        let dptr = backend.gep(unit, dary, elem_ty, idx);
        let lval = backend.load_value(unit, lptr, elem_ty);
        let rval = backend.load_value(unit, rptr, elem_ty);
        let sum = add_elem.emit(backend, unit, &[lval, rval]).unwrap_or_else(|| unreachable!("`add` always produces a value"));
        backend.store_value(unit, sum, dptr);

        let one = backend.scalar_constant(unit, address_ty, ConstantValue::Int(1));
        let idx_next = add_address.emit(backend, unit, &[idx, one]).unwrap_or_else(|| unreachable!("`add` always produces a value"));
        backend.store_value(unit, idx_next, idx_storage);

        let cond = cmp_lt.emit(backend, unit, &[idx_next, elemct]).unwrap_or_else(|| unreachable!("`cmp.lt` always produces a value"));
        backend.cond_br(unit, cond, body, exit);

        backend.position_at_end(unit, exit);
        None
    }
}
