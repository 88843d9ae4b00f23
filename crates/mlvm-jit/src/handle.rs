//! The host-callable handle returned by [`crate::jit::Jit::compile`].

use std::sync::Arc;

use crate::abi::{self, HostValue, ParamClass};
use crate::error::JitError;

#[derive(Debug)]
struct FunctionHandleInner {
    mangled_name: String,
    address: usize,
    param_classes: Vec<ParamClass>,
    return_class: Option<ParamClass>,
}

/// A memoized, callable wrapper around a JIT-compiled function.
///
/// Equality is by identity over the underlying compiled entry (SPEC_FULL.md
/// §8 I6: a second `Jit::compile` of the same `(name, arg_types)` returns a
/// handle `==` to the first), not by comparing names or addresses — two
/// handles wrapping numerically identical addresses are still only equal if
/// they share the same memo-table entry.
#[derive(Debug, Clone)]
pub struct FunctionHandle {
    inner: Arc<FunctionHandleInner>,
}

impl FunctionHandle {
    pub(crate) fn new(mangled_name: String, address: usize, param_classes: Vec<ParamClass>, return_class: Option<ParamClass>) -> Self {
        Self {
            inner: Arc::new(FunctionHandleInner {
                mangled_name,
                address,
                param_classes,
                return_class,
            }),
        }
    }

    #[must_use]
    pub fn mangled_name(&self) -> &str {
        &self.inner.mangled_name
    }

    #[must_use]
    pub fn address(&self) -> usize {
        self.inner.address
    }

    /// Invokes the wrapped function with `args`, converting each to its
    /// target register class and the result back to a [`HostValue`].
    ///
    /// # Errors
    /// See [`JitError::ArityMismatch`], [`JitError::ArgumentTypeMismatch`],
    /// and [`JitError::UnsupportedSignature`].
    pub fn call(&self, args: &[HostValue]) -> Result<Option<HostValue>, JitError> {
        // SAFETY: `self.inner.address` was produced by
        // `ExecutionManager::build_function` declaring exactly the signature
        // `param_classes`/`return_class` describe.
        unsafe { abi::invoke(self.inner.address, &self.inner.param_classes, self.inner.return_class, args) }
    }
}

impl PartialEq for FunctionHandle {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for FunctionHandle {}
