use thiserror::Error;

/// Errors raised by [`crate::Context`], [`crate::Callable`],
/// [`crate::Definition`], and [`crate::Implementation`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IrError {
    /// Raised by [`crate::Context::get_or_insert_function`] /
    /// `get_or_insert_intrinsic` when the name is already bound to a
    /// callable of the other kind, and by [`crate::Callable::add_definition`]
    /// when the argument-type tuple is already registered.
    #[error("`{0}` is already defined")]
    AlreadyDefined(String),

    /// [`crate::Definition::implement`] called a second time.
    #[error("implementation already assigned to this definition")]
    ReimplementationError,

    /// [`crate::Definition::implementation`] queried while the definition is
    /// still a bare declaration.
    #[error("definition has no implementation yet")]
    MissingImplementation,

    /// A second terminator was set on a basic block that already has one.
    #[error("basic block already has a terminator")]
    BlockTerminatorAlreadyExist,

    /// Raised by [`crate::Extension::install_to_context`] implementations
    /// that register a type name the type system rejects.
    #[error(transparent)]
    Type(#[from] mlvm_types::TypeError),
}
