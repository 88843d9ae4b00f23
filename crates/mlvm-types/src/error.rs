use thiserror::Error;

/// Errors raised by the [`crate::TypeSystem`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypeError {
    /// A type name used in a cast edge or query is not registered and is not
    /// a pointer chain over a registered pointee.
    #[error("invalid type name: `{0}`")]
    InvalidTypeName(String),
}
