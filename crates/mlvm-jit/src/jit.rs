//! The JIT façade (C9): a memoizing `compile` entry point over a table of
//! named [`ExecutionManager`]s.

use mlvm_ir::{CallableKind, Context};
use mlvm_llvm::LlvmBackend;
use rustc_hash::FxHashMap;
use tracing::instrument;

use crate::error::JitError;
use crate::handle::FunctionHandle;
use crate::manager::ExecutionManager;

const DEFAULT_BACKEND: &str = "";

/// Owns a table of named [`ExecutionManager`]s (SPEC_FULL.md §5: "A JIT owns
/// its Execution Manager and its backend table") and memoizes compiled
/// functions per backend.
pub struct Jit<'ctx> {
    backends: FxHashMap<String, ExecutionManager<'ctx>>,
}

impl<'ctx> Jit<'ctx> {
    #[must_use]
    pub fn new() -> Self {
        Self { backends: FxHashMap::default() }
    }

    /// Registers `backend` under `name` (the empty string names the default
    /// backend `compile` uses when none is given).
    ///
    /// # Errors
    /// Returns [`JitError::Llvm`]-shaped failure text if an execution engine
    /// cannot be bound to `backend`'s module.
    pub fn register_backend(&mut self, name: impl Into<String>, backend: LlvmBackend<'ctx>) -> Result<(), JitError> {
        let manager = ExecutionManager::new(backend)?;
        self.backends.insert(name.into(), manager);
        Ok(())
    }

    #[must_use]
    pub fn backend(&self, name: &str) -> Option<&LlvmBackend<'ctx>> {
        self.backends.get(name).map(ExecutionManager::backend)
    }

    pub fn backend_mut(&mut self, name: &str) -> Option<&mut LlvmBackend<'ctx>> {
        self.backends.get_mut(name).map(ExecutionManager::backend_mut)
    }

    /// Compiles `(name, arg_types)` against `ctx`, picking the named backend
    /// (empty string = default). If already memoized, returns the
    /// remembered handle (SPEC_FULL.md §8 I6).
    ///
    /// # Errors
    /// Returns [`JitError::UnknownBackend`] if `backend_name` has not been
    /// registered, [`JitError::Ir`] if the callable/definition/
    /// implementation cannot be found, or propagates compilation/linking
    /// failures.
    #[instrument(skip(self, ctx))]
    pub fn compile(&mut self, ctx: &Context, name: &str, arg_types: &[String], backend_name: &str) -> Result<FunctionHandle, JitError> {
        let manager = self
            .backends
            .get_mut(backend_name)
            .ok_or_else(|| JitError::UnknownBackend(backend_name.to_string()))?;

        if let Some(existing) = manager.memoized(name, arg_types) {
            return Ok(existing);
        }

        let callable = ctx
            .get_function(name)
            .or_else(|| ctx.get_intrinsic(name))
            .ok_or_else(|| JitError::UnknownFunction(name.to_string()))?;
        debug_assert!(matches!(callable.kind(), CallableKind::Function | CallableKind::Intrinsic));

        let definition = callable.definition(arg_types).ok_or_else(|| JitError::UnknownFunction(name.to_string()))?;
        let return_type = definition.return_type().to_string();
        let imp = definition.implementation()?;

        manager.build_function(imp, name, arg_types, &return_type)
    }

    /// Convenience for the common case of one registered default backend.
    ///
    /// # Errors
    /// See [`Jit::compile`].
    pub fn compile_default(&mut self, ctx: &Context, name: &str, arg_types: &[String]) -> Result<FunctionHandle, JitError> {
        self.compile(ctx, name, arg_types, DEFAULT_BACKEND)
    }

    /// Binds `address` as the runtime implementation of an external symbol
    /// declared (but never defined) under `mangled_name` in the named
    /// backend's module (empty string = default backend).
    ///
    /// # Errors
    /// Returns [`JitError::UnknownBackend`] if `backend_name` has not been
    /// registered, or propagates [`ExecutionManager::link_external_symbol`]'s
    /// failure if no such symbol was declared.
    pub fn link_external_symbol(&mut self, backend_name: &str, mangled_name: &str, address: usize) -> Result<(), JitError> {
        let manager = self
            .backends
            .get_mut(backend_name)
            .ok_or_else(|| JitError::UnknownBackend(backend_name.to_string()))?;
        manager.link_external_symbol(mangled_name, address)
    }
}

impl Default for Jit<'_> {
    fn default() -> Self {
        Self::new()
    }
}
