//! Operational errors raised while building or invoking a JIT-compiled
//! function. Not part of SPEC_FULL.md §7's ten-kind core taxonomy (those
//! stay on [`mlvm_ir::IrError`], [`mlvm_builder::BuildError`], and
//! [`mlvm_backend::BackendError`]) — this enum covers failures specific to
//! the Execution Manager and the host-callable wrapper.

use mlvm_backend::BackendError;
use mlvm_ir::IrError;
use mlvm_llvm::LlvmError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum JitError {
    #[error("backend `{0}` is not registered with this JIT")]
    UnknownBackend(String),

    #[error("no callable named `{0}` with a definition matching the given argument types")]
    UnknownFunction(String),

    #[error(transparent)]
    Ir(#[from] IrError),

    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error(transparent)]
    Llvm(#[from] LlvmError),

    #[error("failed to resolve compiled symbol `{0}` in the execution engine: {1}")]
    SymbolResolutionFailed(String, String),

    #[error("calling convention mismatch: expected {expected} arguments, got {actual}")]
    ArityMismatch { expected: usize, actual: usize },

    #[error("argument {index} does not match this function's host-callable parameter type")]
    ArgumentTypeMismatch { index: usize },

    #[error(
        "this signature mixes integer- and floating-point-class parameters or return types the \
         host-callable wrapper does not support (int-class arity up to 4, float64-class arity up to 2)"
    )]
    UnsupportedSignature,
}
