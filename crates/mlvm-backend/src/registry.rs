//! Storage for the three registries a [`crate::Backend`] owns: types,
//! operations, and intrinsics. Kept as plain data structures so a concrete
//! backend can embed them as fields and implement the accessor methods
//! [`crate::Backend`] needs to provide its default registration/lookup
//! bodies.

use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::backend::Backend;
use crate::error::BackendError;
use crate::operation_impl::{IntrinsicBody, OperationImplementation};
use crate::type_impl::TypeImplementation;

/// Name-keyed table of registered type implementations.
pub struct TypeRegistry<B: Backend> {
    types: FxHashMap<String, Arc<dyn TypeImplementation<B>>>,
}

impl<B: Backend> TypeRegistry<B> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            types: FxHashMap::default(),
        }
    }

    /// Registers (or overwrites) the implementation for `type_name`.
    pub fn insert(&mut self, type_name: impl Into<String>, implementation: Arc<dyn TypeImplementation<B>>) {
        self.types.insert(type_name.into(), implementation);
    }

    #[must_use]
    pub fn get(&self, type_name: &str) -> Option<Arc<dyn TypeImplementation<B>>> {
        self.types.get(type_name).cloned()
    }
}

impl<B: Backend> Default for TypeRegistry<B> {
    fn default() -> Self {
        Self::new()
    }
}

/// `(op_name, operand_types)`-keyed table of operation emitters. Overriding
/// an existing registration is allowed (per the documented duplicate-
/// registration policy).
pub struct OperationRegistry<B: Backend> {
    operations: FxHashMap<(String, Vec<String>), Arc<dyn OperationImplementation<B>>>,
}

impl<B: Backend> OperationRegistry<B> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            operations: FxHashMap::default(),
        }
    }

    pub fn insert(&mut self, op_name: String, operand_types: Vec<String>, emitter: Arc<dyn OperationImplementation<B>>) {
        self.operations.insert((op_name, operand_types), emitter);
    }

    #[must_use]
    pub fn get(&self, op_name: &str, operand_types: &[String]) -> Option<Arc<dyn OperationImplementation<B>>> {
        self.operations.get(&(op_name.to_string(), operand_types.to_vec())).cloned()
    }
}

impl<B: Backend> Default for OperationRegistry<B> {
    fn default() -> Self {
        Self::new()
    }
}

/// One registered intrinsic body: its declared signature plus the emitter
/// materialized into the intrinsic library.
pub struct IntrinsicEntry<B: Backend> {
    pub return_type: String,
    pub arg_types: Vec<String>,
    pub body: Arc<dyn IntrinsicBody<B>>,
}

/// `(name, arg_types)`-keyed table of intrinsic bodies. Unlike
/// [`OperationRegistry`], registering the same key twice is an error: a
/// second body for the same signature is almost always a caller mistake
/// rather than an intentional override. The entry recorded here is
/// bookkeeping for that duplicate check and for introspection
/// ([`IntrinsicEntry`]); the body itself is materialized into a standalone,
/// link-once, always-inline function in the backend's module at
/// registration time (see [`crate::Backend::implement_intrinsic`]), and call
/// sites resolve against that function rather than against this registry.
pub struct IntrinsicRegistry<B: Backend> {
    intrinsics: FxHashMap<(String, Vec<String>), IntrinsicEntry<B>>,
}

impl<B: Backend> IntrinsicRegistry<B> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            intrinsics: FxHashMap::default(),
        }
    }

    /// # Errors
    /// Returns [`BackendError::DuplicateIntrinsic`] if `(name, arg_types)`
    /// already has a registered body.
    pub fn insert(
        &mut self,
        name: String,
        return_type: String,
        arg_types: Vec<String>,
        body: Arc<dyn IntrinsicBody<B>>,
    ) -> Result<(), BackendError> {
        let key = (name.clone(), arg_types.clone());
        if self.intrinsics.contains_key(&key) {
            return Err(BackendError::DuplicateIntrinsic(name));
        }
        self.intrinsics.insert(
            key,
            IntrinsicEntry {
                return_type,
                arg_types,
                body,
            },
        );
        Ok(())
    }

    #[must_use]
    pub fn get(&self, name: &str, arg_types: &[String]) -> Option<&IntrinsicEntry<B>> {
        self.intrinsics.get(&(name.to_string(), arg_types.to_vec()))
    }
}

impl<B: Backend> Default for IntrinsicRegistry<B> {
    fn default() -> Self {
        Self::new()
    }
}
