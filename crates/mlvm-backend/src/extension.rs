//! Extension points: third-party crates that add types, operations, and
//! intrinsics to a [`Backend`] without forking it.
//!
//! [`Backend`] is generic rather than object-safe (it carries associated
//! types for the target IR), so `Extension` is parameterized over the same
//! concrete backend type it installs into. That keeps a heterogeneous
//! collection of extensions (`Vec<Box<dyn Extension<ConcreteBackend>>>`)
//! object-safe: the backend type is fixed once, at the trait-level
//! parameter, rather than re-introduced per method.

use crate::backend::Backend;

/// A bundle of registrations applied to a [`Backend`] in one call, e.g. a
/// vector-math library registering a `vec4` type plus its arithmetic
/// operations and intrinsics.
pub trait Extension<B: Backend> {
    /// A short identifier for diagnostics, not used for lookup.
    fn name(&self) -> &'static str;

    /// Registers this extension's types, operations, and intrinsics on
    /// `backend`.
    fn install_to_backend(&self, backend: &mut B);
}
