use rustc_hash::FxHashMap;
use std::collections::hash_map::Entry;

use crate::callable::{Callable, CallableKind};
use crate::error::IrError;
use mlvm_types::TypeSystem;

/// Owns the Type System plus name-keyed tables of functions and intrinsics.
///
/// Single-threaded cooperative core (see the crate's top-level concurrency
/// note): callers are expected to hold exclusive access for the duration of
/// any sequence of mutating calls. Not enforced via `Send`/`Sync` bounds.
#[derive(Debug, Clone)]
pub struct Context {
    types: TypeSystem,
    callables: FxHashMap<String, Callable>,
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

impl Context {
    #[must_use]
    pub fn new() -> Self {
        Self {
            types: TypeSystem::new(),
            callables: FxHashMap::default(),
        }
    }

    #[must_use]
    pub fn types(&self) -> &TypeSystem {
        &self.types
    }

    pub fn types_mut(&mut self) -> &mut TypeSystem {
        &mut self.types
    }

    /// Returns the existing `Function` callable named `name`, or creates one.
    ///
    /// # Errors
    /// Returns [`IrError::AlreadyDefined`] if `name` is already bound to an
    /// `Intrinsic`.
    pub fn get_or_insert_function(&mut self, name: impl Into<String>) -> Result<&mut Callable, IrError> {
        self.get_or_insert_callable(name, CallableKind::Function)
    }

    /// Returns the existing `Intrinsic` callable named `name`, or creates one.
    ///
    /// # Errors
    /// Returns [`IrError::AlreadyDefined`] if `name` is already bound to a
    /// `Function`.
    pub fn get_or_insert_intrinsic(&mut self, name: impl Into<String>) -> Result<&mut Callable, IrError> {
        self.get_or_insert_callable(name, CallableKind::Intrinsic)
    }

    fn get_or_insert_callable(
        &mut self,
        name: impl Into<String>,
        kind: CallableKind,
    ) -> Result<&mut Callable, IrError> {
        let name = name.into();
        match self.callables.entry(name.clone()) {
            Entry::Occupied(entry) => {
                if entry.get().kind() == kind {
                    Ok(entry.into_mut())
                } else {
                    Err(IrError::AlreadyDefined(name))
                }
            }
            Entry::Vacant(entry) => Ok(entry.insert(Callable::new(name, kind))),
        }
    }

    #[must_use]
    pub fn get_function(&self, name: &str) -> Option<&Callable> {
        self.callables
            .get(name)
            .filter(|c| c.kind() == CallableKind::Function)
    }

    #[must_use]
    pub fn get_intrinsic(&self, name: &str) -> Option<&Callable> {
        self.callables
            .get(name)
            .filter(|c| c.kind() == CallableKind::Intrinsic)
    }

    pub fn get_function_mut(&mut self, name: &str) -> Option<&mut Callable> {
        self.callables
            .get_mut(name)
            .filter(|c| c.kind() == CallableKind::Function)
    }

    pub fn get_intrinsic_mut(&mut self, name: &str) -> Option<&mut Callable> {
        self.callables
            .get_mut(name)
            .filter(|c| c.kind() == CallableKind::Intrinsic)
    }

    /// All callables in arbitrary (hash-map) order. Use
    /// [`Context::get_function`]/[`Context::get_intrinsic`] when order
    /// matters for a specific name.
    pub fn callables(&self) -> impl Iterator<Item = &Callable> {
        self.callables.values()
    }
}
