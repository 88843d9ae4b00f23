//! The host-callable calling convention: classifies IR type names into
//! register classes and, given a raw function address, transmutes and
//! invokes it.
//!
//! Grounded on the `extern "C" fn` transmute-from-address pattern used
//! throughout `ori_llvm::module::ModuleCompiler::run_test` (`ee.get_function
//! ::<unsafe extern "C" fn()>(name)` then `.call()`), generalized from a
//! single fixed signature to a small table of signatures dispatched on
//! arity and register class. Real C ABIs place integer and pointer
//! arguments in one register class and `f64` arguments in another
//! (floating-point registers); this wrapper supports either an
//! all-integer-class or an all-floating-point-class signature, which is
//! every shape SPEC_FULL.md §8's scenarios 3 and 5 exercise. A true
//! arbitrary mixed-class marshaller would need a full ABI classifier
//! (libffi); out of scope here, see `JitError::UnsupportedSignature`.

use std::mem::transmute;

use crate::error::JitError;

/// A host-side argument or return value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HostValue {
    Int(i64),
    Float(f64),
    Bool(bool),
    /// A raw pointer into host- or JIT-managed memory (e.g. the address of
    /// a stack local taken with `Builder::reference`).
    Ptr(*mut u8),
}

/// The register class an argument or return value occupies in the target
/// calling convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamClass {
    /// Integers, booleans, and pointers: all passed in general-purpose
    /// registers and all safely representable as `i64` bit patterns on
    /// every target this JIT supports.
    Int,
    /// `double` only. `float` (32-bit) is not supported by this wrapper;
    /// see the module doc comment.
    Float,
}

/// Classifies an IR type name into its calling-convention register class.
/// Pointer types (`T*`) are integer-class, matching every target ABI this
/// JIT runs on.
#[must_use]
pub fn classify(type_name: &str) -> ParamClass {
    if type_name == "double" {
        ParamClass::Float
    } else {
        ParamClass::Int
    }
}

fn to_int_register(value: HostValue, index: usize) -> Result<i64, JitError> {
    match value {
        HostValue::Int(i) => Ok(i),
        HostValue::Bool(b) => Ok(i64::from(b)),
        HostValue::Ptr(p) => Ok(p as i64),
        HostValue::Float(_) => Err(JitError::ArgumentTypeMismatch { index }),
    }
}

fn to_float_register(value: HostValue, index: usize) -> Result<f64, JitError> {
    match value {
        HostValue::Float(f) => Ok(f),
        _ => Err(JitError::ArgumentTypeMismatch { index }),
    }
}

/// Invokes the function at `address` with `args`, classified by
/// `param_classes`/`return_class` (`None` return class means void).
///
/// # Safety
/// `address` must be the address of a function whose real signature
/// matches `param_classes`/`return_class` under this module's register-class
/// convention; callers only ever pass addresses obtained from
/// [`crate::manager::ExecutionManager::build_function`], which the Backend
/// declared with exactly the types `param_classes`/`return_class` were
/// derived from.
pub unsafe fn invoke(
    address: usize,
    param_classes: &[ParamClass],
    return_class: Option<ParamClass>,
    args: &[HostValue],
) -> Result<Option<HostValue>, JitError> {
    if args.len() != param_classes.len() {
        return Err(JitError::ArityMismatch {
            expected: param_classes.len(),
            actual: args.len(),
        });
    }

    let uniform = param_classes.first().copied();
    if param_classes.iter().any(|c| Some(*c) != uniform) {
        return Err(JitError::UnsupportedSignature);
    }

    match uniform {
        None | Some(ParamClass::Int) => {
            let mut ints = Vec::with_capacity(args.len());
            for (index, arg) in args.iter().enumerate() {
                ints.push(to_int_register(*arg, index)?);
            }
            call_int(address, &ints, return_class)
        }
        Some(ParamClass::Float) => {
            let mut floats = Vec::with_capacity(args.len());
            for (index, arg) in args.iter().enumerate() {
                floats.push(to_float_register(*arg, index)?);
            }
            call_float(address, &floats, return_class)
        }
    }
}

unsafe fn call_int(address: usize, args: &[i64], return_class: Option<ParamClass>) -> Result<Option<HostValue>, JitError> {
    if return_class == Some(ParamClass::Float) {
        return Err(JitError::UnsupportedSignature);
    }
    let returns_value = return_class.is_some();
    match (args.len(), returns_value) {
        (0, false) => {
            let f: extern "C" fn() = transmute(address);
            f();
            Ok(None)
        }
        (0, true) => {
            let f: extern "C" fn() -> i64 = transmute(address);
            Ok(Some(HostValue::Int(f())))
        }
        (1, false) => {
            let f: extern "C" fn(i64) = transmute(address);
            f(args[0]);
            Ok(None)
        }
        (1, true) => {
            let f: extern "C" fn(i64) -> i64 = transmute(address);
            Ok(Some(HostValue::Int(f(args[0]))))
        }
        (2, false) => {
            let f: extern "C" fn(i64, i64) = transmute(address);
            f(args[0], args[1]);
            Ok(None)
        }
        (2, true) => {
            let f: extern "C" fn(i64, i64) -> i64 = transmute(address);
            Ok(Some(HostValue::Int(f(args[0], args[1]))))
        }
        (3, false) => {
            let f: extern "C" fn(i64, i64, i64) = transmute(address);
            f(args[0], args[1], args[2]);
            Ok(None)
        }
        (3, true) => {
            let f: extern "C" fn(i64, i64, i64) -> i64 = transmute(address);
            Ok(Some(HostValue::Int(f(args[0], args[1], args[2]))))
        }
        (4, false) => {
            let f: extern "C" fn(i64, i64, i64, i64) = transmute(address);
            f(args[0], args[1], args[2], args[3]);
            Ok(None)
        }
        (4, true) => {
            let f: extern "C" fn(i64, i64, i64, i64) -> i64 = transmute(address);
            Ok(Some(HostValue::Int(f(args[0], args[1], args[2], args[3]))))
        }
        _ => Err(JitError::UnsupportedSignature),
    }
}

unsafe fn call_float(address: usize, args: &[f64], return_class: Option<ParamClass>) -> Result<Option<HostValue>, JitError> {
    if return_class == Some(ParamClass::Int) {
        return Err(JitError::UnsupportedSignature);
    }
    let returns_value = return_class.is_some();
    match (args.len(), returns_value) {
        (0, false) => {
            let f: extern "C" fn() = transmute(address);
            f();
            Ok(None)
        }
        (0, true) => {
            let f: extern "C" fn() -> f64 = transmute(address);
            Ok(Some(HostValue::Float(f())))
        }
        (1, false) => {
            let f: extern "C" fn(f64) = transmute(address);
            f(args[0]);
            Ok(None)
        }
        (1, true) => {
            let f: extern "C" fn(f64) -> f64 = transmute(address);
            Ok(Some(HostValue::Float(f(args[0]))))
        }
        (2, false) => {
            let f: extern "C" fn(f64, f64) = transmute(address);
            f(args[0], args[1]);
            Ok(None)
        }
        (2, true) => {
            let f: extern "C" fn(f64, f64) -> f64 = transmute(address);
            Ok(Some(HostValue::Float(f(args[0], args[1]))))
        }
        _ => Err(JitError::UnsupportedSignature),
    }
}
