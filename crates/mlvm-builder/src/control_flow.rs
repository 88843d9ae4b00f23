//! Structured control-flow helpers that build the basic-block shapes
//! described for loops and conditionals, leaving the builder's cursor at the
//! exit/merge block once done. `break`/`continue` are not dedicated
//! methods: the body closure receives the step and exit blocks directly and
//! emits a direct `branch` to whichever it needs.

use mlvm_ir::{BlockId, ConstantValue, ValueId, VariableId};

use crate::builder::{Builder, CompareOp};
use crate::error::BuildError;

/// Builds a header/body/step/exit quartet: the current block falls through
/// to `header`, which evaluates `predicate` and branches to `body` or
/// `exit`; `body` runs and (unless it already set a terminator, e.g. via a
/// `break`) falls through to `step`; `step` runs and branches back to
/// `header`. Leaves the cursor at `exit`.
///
/// # Errors
/// Propagates any [`BuildError`] raised while building the predicate, body,
/// or step blocks.
pub fn for_loop<P, B, S>(
    builder: &mut Builder<'_>,
    mut predicate: P,
    body: B,
    mut step: S,
) -> Result<(), BuildError>
where
    P: FnMut(&mut Builder<'_>) -> Result<ValueId, BuildError>,
    B: FnOnce(&mut Builder<'_>, BlockId, BlockId),
    S: FnMut(&mut Builder<'_>) -> Result<(), BuildError>,
{
    let header = builder.alloc_block();
    let body_block = builder.alloc_block();
    let step_block = builder.alloc_block();
    let exit = builder.alloc_block();

    builder.branch(header)?;

    builder.set_basic_block(header);
    let predicate_value = predicate(builder)?;
    builder.condition_branch(predicate_value, body_block, exit)?;

    builder.set_basic_block(body_block);
    body(builder, step_block, exit);
    if !builder.has_terminator() {
        builder.branch(step_block)?;
    }

    builder.set_basic_block(step_block);
    step(builder)?;
    if !builder.has_terminator() {
        builder.branch(header)?;
    }

    builder.set_basic_block(exit);
    Ok(())
}

/// Convenience over [`for_loop`] for the common counting-loop shape:
/// `index_var < stop`, stepping by `step_amount` (default `1`) each
/// iteration.
///
/// # Errors
/// Propagates any [`BuildError`] raised while building the loop.
pub fn for_range<B>(
    builder: &mut Builder<'_>,
    index_var: VariableId,
    stop: ValueId,
    step_amount: Option<ValueId>,
    body: B,
) -> Result<(), BuildError>
where
    B: FnOnce(&mut Builder<'_>, BlockId, BlockId),
{
    let index_type = builder
        .implementation()
        .value_type(index_var.into())
        .unwrap_or("int32")
        .to_string();

    for_loop(
        builder,
        |b| b.compare(CompareOp::Lt, index_var.into(), stop),
        body,
        |b| {
            let amount =
                step_amount.unwrap_or_else(|| b.const_value(index_type.clone(), ConstantValue::Int(1)));
            let next = b.add(index_var.into(), amount)?;
            b.assign(next, index_var);
            Ok(())
        },
    )
}

/// Builds true/false arms joined at a merge block: branches on `predicate`
/// to `then_branch` or `else_branch`, each falling through to `merge` unless
/// it already set a terminator. Leaves the cursor at `merge`.
///
/// # Errors
/// Propagates any [`BuildError`] raised while building either arm.
pub fn if_else<T, F>(
    builder: &mut Builder<'_>,
    predicate: ValueId,
    then_branch: T,
    else_branch: F,
) -> Result<(), BuildError>
where
    T: FnOnce(&mut Builder<'_>),
    F: FnOnce(&mut Builder<'_>),
{
    let then_block = builder.alloc_block();
    let else_block = builder.alloc_block();
    let merge = builder.alloc_block();

    builder.condition_branch(predicate, then_block, else_block)?;

    builder.set_basic_block(then_block);
    then_branch(builder);
    if !builder.has_terminator() {
        builder.branch(merge)?;
    }

    builder.set_basic_block(else_block);
    else_branch(builder);
    if !builder.has_terminator() {
        builder.branch(merge)?;
    }

    builder.set_basic_block(merge);
    Ok(())
}
