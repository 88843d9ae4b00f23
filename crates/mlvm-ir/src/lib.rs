//! Value/IR model and Context for the MLVM compiler framework.
//!
//! Ownership follows an arena/handle scheme: every [`Implementation`] owns a
//! flat `Vec` per entity kind (arguments, constants, variables, blocks,
//! operations); everything else refers to entities by `Copy` newtype index
//! handles from the [`handle`] module, never by pointer or `Rc`. This avoids
//! the weak back-references (block &harr; implementation, definition &harr;
//! callable) that a reference-counted source would need to break cycles.

mod attributes;
mod callable;
mod context;
mod error;
mod extension;
mod handle;
mod implementation;
mod operation;
mod printer;
mod value;

pub use attributes::AttributeSet;
pub use callable::{Callable, CallableKind, Definition};
pub use context::Context;
pub use error::IrError;
pub use extension::Extension;
pub use handle::{ArgumentId, BlockId, ConstantId, OperationId, VariableId};
pub use implementation::{Argument, BasicBlock, Constant, Implementation, Variable};
pub use operation::{Operation, Terminator};
pub use printer::print_implementation;
pub use value::{ConstantValue, ValueId};
