use crate::context::Context;
use crate::error::IrError;

/// An installable IR-side extension: registers types and callable signatures
/// on a [`Context`] without the context needing to know about the extension
/// in advance.
///
/// Pairs with `mlvm_backend::Extension`, which installs the matching backend
/// implementations (type representations, operation/intrinsic bodies) for
/// the same feature. The two halves are installed separately — one against
/// the `Context`, one against the `Backend` — since a `Context` is
/// backend-agnostic.
pub trait Extension {
    /// A short, human-readable name for diagnostics.
    fn name(&self) -> &'static str;

    /// Registers this extension's types and callable signatures on `ctx`.
    ///
    /// # Errors
    /// Propagates [`IrError`] from any failed type or callable registration.
    fn install_to_context(&self, ctx: &mut Context) -> Result<(), IrError>;
}

impl Context {
    /// Installs `extensions` in order, failing fast on the first error.
    ///
    /// Installation order is deterministic: the insertion order of the
    /// `Vec` the caller supplies.
    ///
    /// # Errors
    /// Returns the first [`IrError`] any extension's
    /// [`Extension::install_to_context`] raises; extensions after the
    /// failing one are not installed.
    pub fn install(&mut self, extensions: Vec<Box<dyn Extension>>) -> Result<(), IrError> {
        for extension in extensions {
            extension.install_to_context(self)?;
        }
        Ok(())
    }
}
