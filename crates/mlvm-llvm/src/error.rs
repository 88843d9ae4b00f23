use thiserror::Error;

/// Errors raised while constructing an [`crate::LlvmBackend`]: resolving a
/// target triple, initializing LLVM's target backends, and creating a
/// target machine. Once a `LlvmBackend` exists, lowering failures go through
/// [`mlvm_backend::BackendError`] instead.
#[derive(Debug, Error)]
pub enum LlvmError {
    /// The requested triple is not one `mlvm-llvm` initializes a target for.
    #[error("unsupported target triple `{triple}` (supported: {supported})")]
    UnsupportedTarget { triple: String, supported: &'static str },

    /// `Target::from_triple` failed.
    #[error("failed to resolve target for `{0}`: {1}")]
    TargetResolutionFailed(String, String),

    /// `Target::create_target_machine` returned `None`.
    #[error("failed to create a target machine for `{0}`")]
    TargetMachineCreationFailed(String),
}
