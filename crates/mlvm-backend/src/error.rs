use thiserror::Error;

/// Errors raised by the [`crate::Backend`] contract and [`crate::Translator`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
    /// A type has no registered implementation and cannot be synthesized
    /// (only trailing-`*` pointer forms synthesize over a registered
    /// pointee; everything else must be registered explicitly).
    #[error("type `{0}` has no registered implementation")]
    TypeUnimplementedError(String),

    /// A non-void function's last basic block has no terminator.
    #[error("function `{0}` falls off the end of its last block without returning")]
    MissingReturn(String),

    /// `Backend::implement_intrinsic` called twice for the same
    /// `(name, arg_types)` pair. Operation overrides are allowed; intrinsic
    /// bodies are not, per the backend's duplicate-registration policy.
    #[error("intrinsic `{0}` already has a registered body for these argument types")]
    DuplicateIntrinsic(String),

    /// `Backend::verify` rejected a compiled unit at the target-IR level
    /// (e.g. LLVM's module verifier).
    #[error("verification failed for `{0}`: {1}")]
    VerificationFailed(String, String),
}
