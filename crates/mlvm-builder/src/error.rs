use mlvm_ir::IrError;
use thiserror::Error;

/// Errors raised by [`crate::Builder`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    /// `Builder::call` found no callable overload accepting the supplied
    /// argument types.
    #[error("no definition of `{0}` accepts these argument types")]
    MissingDefinition(String),

    /// `Builder::call` found two or more overloads tied at the minimum
    /// implicit-cast rank.
    #[error("call to `{0}` is ambiguous between two equally-ranked overloads")]
    MultiplePossibleDefinition(String),

    /// `Builder::ret`'s value type is not implicitly castable to the
    /// implementation's declared return type.
    #[error("cannot return a value of type `{from}` from a function declared to return `{to}`")]
    InvalidCast { from: String, to: String },

    /// A binary operation's operand types share no common implicit-cast
    /// target.
    #[error("cannot coerce `{lhs}` and `{rhs}` to a common type")]
    CannotCoerce { lhs: String, rhs: String },

    /// Propagated from the underlying [`Implementation`](mlvm_ir::Implementation)
    /// (e.g. setting a second terminator on the same block).
    #[error(transparent)]
    Ir(#[from] IrError),
}
