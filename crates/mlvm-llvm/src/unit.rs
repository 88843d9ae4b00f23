//! One fresh, not-yet-linked compilation unit: an LLVM builder positioned
//! somewhere inside the function it is filling in. Mirrors
//! `ori_llvm::context::SimpleCx` plus its builder combined into one struct,
//! per SPEC_FULL.md's "C6 Backend contract" framing of `Backend::Unit`.

use inkwell::builder::Builder;
use inkwell::values::FunctionValue;

/// Implements [`mlvm_backend::Backend::Unit`] for [`crate::LlvmBackend`].
///
/// `function` starts `None` (set by `new_unit`) and is filled in by
/// `declare_function`; every other primitive on `LlvmBackend` that needs the
/// function being built (`append_block`, `param_value`, `ret`, ...) is only
/// ever called after `declare_function`, per the Translator's six-step
/// pipeline.
pub struct LlvmUnit<'ctx> {
    pub(crate) builder: Builder<'ctx>,
    pub(crate) function: Option<FunctionValue<'ctx>>,
}

impl<'ctx> LlvmUnit<'ctx> {
    pub(crate) fn new(builder: Builder<'ctx>) -> Self {
        Self { builder, function: None }
    }

    pub(crate) fn function(&self) -> FunctionValue<'ctx> {
        self.function
            .unwrap_or_else(|| unreachable!("declare_function must run before any other Backend primitive touches the unit"))
    }
}
