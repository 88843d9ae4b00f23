//! Target/optimization configuration, modeled directly on
//! `ori_llvm::aot::target::TargetConfig` and `ori_llvm::aot::passes::OptimizationConfig`,
//! trimmed to what [`crate::LlvmBackend::new`] actually needs: a triple, a
//! CPU/feature pair, and an optimization level.

use inkwell::targets::{CodeModel, InitializationConfig, RelocMode, Target, TargetMachine, TargetTriple};

use crate::error::LlvmError;

/// Mirrors the teacher's `OptimizationLevel` (`O0`..`O3`/`Os`/`Oz`) rather
/// than using `inkwell::OptimizationLevel` directly, which only distinguishes
/// four tiers; this one additionally drives which legacy pass-manager passes
/// `LlvmBackend::optimize_function`/`optimize_module` add.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OptimizationLevel {
    #[default]
    O0,
    O1,
    O2,
    O3,
    Os,
    Oz,
}

impl OptimizationLevel {
    #[must_use]
    pub fn to_inkwell(self) -> inkwell::OptimizationLevel {
        match self {
            Self::O0 => inkwell::OptimizationLevel::None,
            Self::O1 => inkwell::OptimizationLevel::Less,
            Self::O2 | Self::Os | Self::Oz => inkwell::OptimizationLevel::Default,
            Self::O3 => inkwell::OptimizationLevel::Aggressive,
        }
    }

    #[must_use]
    pub fn is_enabled(self) -> bool {
        !matches!(self, Self::O0)
    }
}

/// Target triple, CPU, feature string, and optimization level a
/// [`crate::LlvmBackend`] is constructed against. Resolved once at
/// construction; nothing here is mutable afterward (SPEC_FULL.md §2,
/// "address width... fixed once at backend construction").
#[derive(Debug, Clone)]
pub struct BackendConfig {
    triple: String,
    cpu: String,
    features: String,
    opt_level: OptimizationLevel,
    reloc_mode: RelocMode,
    code_model: CodeModel,
}

impl BackendConfig {
    /// A config targeting the host machine running the current process.
    #[must_use]
    pub fn native() -> Self {
        Self {
            triple: TargetMachine::get_default_triple().as_str().to_string_lossy().into_owned(),
            cpu: TargetMachine::get_host_cpu_name().to_string(),
            features: TargetMachine::get_host_cpu_features().to_string(),
            opt_level: OptimizationLevel::default(),
            reloc_mode: RelocMode::Default,
            code_model: CodeModel::Default,
        }
    }

    /// A config targeting an explicit triple, with generic CPU/features.
    #[must_use]
    pub fn from_triple(triple: impl Into<String>) -> Self {
        Self {
            triple: triple.into(),
            cpu: String::new(),
            features: String::new(),
            opt_level: OptimizationLevel::default(),
            reloc_mode: RelocMode::Default,
            code_model: CodeModel::Default,
        }
    }

    #[must_use]
    pub fn with_opt_level(mut self, opt_level: OptimizationLevel) -> Self {
        self.opt_level = opt_level;
        self
    }

    #[must_use]
    pub fn with_cpu(mut self, cpu: impl Into<String>) -> Self {
        self.cpu = cpu.into();
        self
    }

    #[must_use]
    pub fn with_features(mut self, features: impl Into<String>) -> Self {
        self.features = features.into();
        self
    }

    #[must_use]
    pub fn triple(&self) -> &str {
        &self.triple
    }

    #[must_use]
    pub fn opt_level(&self) -> OptimizationLevel {
        self.opt_level
    }

    /// Pointer width in bytes for this config's triple. Mirrors
    /// `TargetConfig::pointer_size`: wasm32/i686/i386/arm are 32-bit, every
    /// other supported triple is 64-bit.
    #[must_use]
    pub fn pointer_size(&self) -> u32 {
        let triple = self.triple.as_str();
        if triple.starts_with("wasm32") || triple.starts_with("i686") || triple.starts_with("i386") || triple.starts_with("arm") {
            4
        } else {
            8
        }
    }

    /// Initializes LLVM's native target backend and creates a target
    /// machine for this config.
    ///
    /// # Errors
    /// Returns [`LlvmError::TargetResolutionFailed`] if the triple cannot be
    /// resolved to a registered target, or
    /// [`LlvmError::TargetMachineCreationFailed`] if LLVM refuses to build a
    /// machine for the resolved target with this config's CPU/features.
    pub fn create_target_machine(&self) -> Result<TargetMachine, LlvmError> {
        Target::initialize_native(&InitializationConfig::default())
            .map_err(|err| LlvmError::TargetResolutionFailed(self.triple.clone(), err))?;
        let triple = TargetTriple::create(&self.triple);
        let target = Target::from_triple(&triple).map_err(|err| LlvmError::TargetResolutionFailed(self.triple.clone(), err.to_string()))?;
        target
            .create_target_machine(
                &triple,
                &self.cpu,
                &self.features,
                self.opt_level.to_inkwell(),
                self.reloc_mode,
                self.code_model,
            )
            .ok_or_else(|| LlvmError::TargetMachineCreationFailed(self.triple.clone()))
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self::native()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn pointer_size_defaults_to_64_bits_for_an_unrecognized_triple() {
        let config = BackendConfig::from_triple("x86_64-unknown-linux-gnu");
        assert_eq!(config.pointer_size(), 8);
    }

    #[test]
    fn pointer_size_is_32_bits_for_wasm32() {
        let config = BackendConfig::from_triple("wasm32-unknown-unknown");
        assert_eq!(config.pointer_size(), 4);
    }

    #[test]
    fn opt_level_defaults_to_o0_and_is_not_enabled() {
        let config = BackendConfig::from_triple("x86_64-unknown-linux-gnu");
        assert_eq!(config.opt_level(), OptimizationLevel::O0);
        assert!(!config.opt_level().is_enabled());
    }

    #[test]
    fn with_opt_level_overrides_the_default() {
        let config = BackendConfig::from_triple("x86_64-unknown-linux-gnu").with_opt_level(OptimizationLevel::O2);
        assert_eq!(config.opt_level(), OptimizationLevel::O2);
        assert!(config.opt_level().is_enabled());
    }
}
