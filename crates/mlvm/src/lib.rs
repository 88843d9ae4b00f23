//! MLVM: a retargetable mid-level compiler framework.
//!
//! This crate re-exports the subsystem crates so a caller can depend on
//! `mlvm` alone instead of wiring up `mlvm-types`, `mlvm-ir`,
//! `mlvm-builder`, `mlvm-backend`, `mlvm-llvm`, and `mlvm-jit` by hand.
//!
//! # Architecture
//!
//! - **Type system** ([`types`]): [`TypeSystem`](types::TypeSystem), the
//!   type-validity and implicit-cast graph every other crate consults.
//! - **IR** ([`ir`]): [`Context`](ir::Context), [`Callable`](ir::Callable),
//!   [`Implementation`](ir::Implementation) — the in-memory program model.
//! - **Builder** ([`builder`]): [`Builder`](builder::Builder), the
//!   instruction-construction API over an `Implementation`.
//! - **Backend contract** ([`backend`]): the [`Backend`](backend::Backend)
//!   trait and translator any concrete backend implements against.
//! - **LLVM backend** ([`llvm`]): [`LlvmBackend`](llvm::LlvmBackend), the
//!   concrete `inkwell`-based implementation of the backend contract.
//! - **JIT** ([`jit`]): [`Jit`](jit::Jit), the memoizing execution façade
//!   over a compiled program.
//!
//! # Example
//!
//!     use mlvm::ir::{Context, ConstantValue};
//!     use mlvm::builder::Builder;
//!
//!     let mut ctx = Context::new();
//!     ctx.get_or_insert_function("add_one")
//!         .expect("fresh name")
//!         .add_definition("int32", vec!["int32".to_string()])
//!         .expect("fresh overload");
//!     let mut imp = ctx
//!         .get_function("add_one")
//!         .expect("just inserted")
//!         .definition(&["int32".to_string()])
//!         .expect("just inserted")
//!         .begin_implementation()
//!         .expect("not yet implemented");
//!     let x = imp.alloc_argument("int32");
//!     let entry = imp.alloc_block();
//!     let mut builder = Builder::new(&ctx, &mut imp, entry);
//!     let one = builder.const_value("int32", ConstantValue::Int(1));
//!     let sum = builder.add(x.into(), one).expect("int32 + int32 coerces");
//!     builder.ret(Some(sum)).expect("int32 matches the declared return type");

pub use mlvm_types as types;
pub use mlvm_ir as ir;
pub use mlvm_builder as builder;
pub use mlvm_backend as backend;
pub use mlvm_llvm as llvm;
pub use mlvm_jit as jit;

use std::sync::Once;

static TRACING_INIT: Once = Once::new();

/// Initializes a `tracing` subscriber from `RUST_LOG`, if set. Safe to call
/// more than once; only the first call takes effect.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            tracing_subscriber::registry().with(fmt::layer().with_target(true).with_level(true)).with(filter).init();
        }
    });
}
