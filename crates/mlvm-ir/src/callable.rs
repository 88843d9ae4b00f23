use crate::error::IrError;
use crate::implementation::Implementation;

/// Whether a [`Callable`] is a plain function (IR-level body, optional) or
/// an intrinsic (body lives on the backend, never at the IR level).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CallableKind {
    Function,
    Intrinsic,
}

/// An immutable `(return_type, arg_types)` pair. A function definition may
/// carry exactly one [`Implementation`]; an intrinsic definition never does,
/// since its body is registered separately on a backend.
#[derive(Debug, Clone)]
pub struct Definition {
    return_type: String,
    arg_types: Vec<String>,
    kind: CallableKind,
    implementation: Option<Implementation>,
}

impl Definition {
    fn new(return_type: String, arg_types: Vec<String>, kind: CallableKind) -> Self {
        Self {
            return_type,
            arg_types,
            kind,
            implementation: None,
        }
    }

    #[must_use]
    pub fn return_type(&self) -> &str {
        &self.return_type
    }

    #[must_use]
    pub fn arg_types(&self) -> &[String] {
        &self.arg_types
    }

    #[must_use]
    pub fn kind(&self) -> CallableKind {
        self.kind
    }

    #[must_use]
    pub fn is_implemented(&self) -> bool {
        self.implementation.is_some()
    }

    /// Hands back a fresh, empty [`Implementation`] for a Builder to
    /// populate, owned by the caller rather than borrowed from this
    /// definition: a Builder needs to read other callables' signatures from
    /// the same [`crate::Context`] while mutating the body it is building,
    /// and those two borrows cannot alias the same definition at once. Pair
    /// with [`Definition::finish_implementation`] once the body is complete.
    ///
    /// # Errors
    /// Returns [`IrError::ReimplementationError`] if this definition already
    /// has an implementation.
    pub fn begin_implementation(&self) -> Result<Implementation, IrError> {
        if self.implementation.is_some() {
            return Err(IrError::ReimplementationError);
        }
        Ok(Implementation::new(
            self.return_type.clone(),
            self.arg_types.clone(),
        ))
    }

    /// Commits a body built via [`Definition::begin_implementation`].
    ///
    /// # Errors
    /// Returns [`IrError::ReimplementationError`] if this definition already
    /// has an implementation.
    pub fn finish_implementation(&mut self, imp: Implementation) -> Result<(), IrError> {
        if self.implementation.is_some() {
            return Err(IrError::ReimplementationError);
        }
        self.implementation = Some(imp);
        Ok(())
    }

    /// # Errors
    /// Returns [`IrError::MissingImplementation`] if still a bare
    /// declaration.
    pub fn implementation(&self) -> Result<&Implementation, IrError> {
        self.implementation.as_ref().ok_or(IrError::MissingImplementation)
    }

    /// # Errors
    /// Returns [`IrError::MissingImplementation`] if still a bare
    /// declaration.
    pub fn implementation_mut(&mut self) -> Result<&mut Implementation, IrError> {
        self.implementation.as_mut().ok_or(IrError::MissingImplementation)
    }
}

/// A `Function` or `Intrinsic`: an insertion-ordered mapping from argument-
/// type tuple to [`Definition`]. Overloading is keyed by argument-type
/// tuple.
#[derive(Debug, Clone)]
pub struct Callable {
    name: String,
    kind: CallableKind,
    definitions: Vec<(Vec<String>, Definition)>,
}

impl Callable {
    pub(crate) fn new(name: String, kind: CallableKind) -> Self {
        Self {
            name,
            kind,
            definitions: Vec::new(),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn kind(&self) -> CallableKind {
        self.kind
    }

    /// Definitions in insertion order.
    pub fn definitions(&self) -> impl Iterator<Item = &Definition> {
        self.definitions.iter().map(|(_, def)| def)
    }

    #[must_use]
    pub fn definition(&self, arg_types: &[String]) -> Option<&Definition> {
        self.definitions
            .iter()
            .find(|(tys, _)| tys.as_slice() == arg_types)
            .map(|(_, def)| def)
    }

    pub fn definition_mut(&mut self, arg_types: &[String]) -> Option<&mut Definition> {
        self.definitions
            .iter_mut()
            .find(|(tys, _)| tys.as_slice() == arg_types)
            .map(|(_, def)| def)
    }

    /// Registers a new overload for this callable.
    ///
    /// # Errors
    /// Returns [`IrError::AlreadyDefined`] if `arg_types` is already
    /// registered.
    pub fn add_definition(
        &mut self,
        return_type: impl Into<String>,
        arg_types: Vec<String>,
    ) -> Result<&mut Definition, IrError> {
        if self.definition(&arg_types).is_some() {
            return Err(IrError::AlreadyDefined(format!(
                "{}({})",
                self.name,
                arg_types.join(", ")
            )));
        }
        let definition = Definition::new(return_type.into(), arg_types.clone(), self.kind);
        self.definitions.push((arg_types, definition));
        let (_, def) = self
            .definitions
            .last_mut()
            .ok_or_else(|| IrError::AlreadyDefined(self.name.clone()))?;
        Ok(def)
    }
}
