//! Builder facade and structured control-flow helpers for the MLVM compiler
//! framework: a cursor-based instruction emitter over an
//! [`mlvm_ir::Implementation`], plus `for_range`/`for_loop`/`if_else`
//! helpers that assemble the basic-block shapes loops and conditionals
//! need.

mod builder;
mod control_flow;
mod error;

pub use builder::{Builder, BuilderCursorGuard, CompareOp};
pub use control_flow::{for_loop, for_range, if_else};
pub use error::BuildError;

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests {
    use super::*;
    use mlvm_ir::{CallableKind, ConstantValue, Context, Implementation};
    use pretty_assertions::assert_eq;

    /// Registers a function named `name` with the given signature and hands
    /// back a fresh [`Implementation`] for it, obtained the same way a real
    /// caller would: through `Definition::begin_implementation`.
    fn declare(ctx: &mut Context, name: &str, return_type: &str, arg_types: &[&str]) -> Implementation {
        let def = ctx
            .get_or_insert_function(name)
            .unwrap()
            .add_definition(
                return_type,
                arg_types.iter().map(|s| (*s).to_string()).collect(),
            )
            .unwrap();
        def.begin_implementation().unwrap()
    }

    fn build<F>(ctx: &Context, imp: &mut Implementation, f: F)
    where
        F: FnOnce(&mut Builder<'_>),
    {
        let entry = imp.alloc_block();
        let mut builder = Builder::new(ctx, imp, entry);
        f(&mut builder);
    }

    #[test]
    fn coerce_casts_the_narrower_side() {
        let mut ctx = Context::new();
        let mut imp = declare(&mut ctx, "f", "int64", &[]);
        build(&ctx, &mut imp, |b| {
            let a = b.const_value("int8", ConstantValue::Int(1));
            let c = b.const_value("int64", ConstantValue::Int(2));
            let sum = b.add(a, c).unwrap();
            b.ret(Some(sum)).unwrap();
        });
        // a gets cast.int8.int64, then add, for a total of 2 operations.
        assert_eq!(imp.operations().len(), 2);
        assert_eq!(imp.operations()[0].name, "cast.int8.int64");
        assert_eq!(imp.operations()[1].name, "add");
        assert_eq!(imp.operations()[1].result_type.as_deref(), Some("int64"));
    }

    #[test]
    fn coerce_fails_across_sign() {
        let mut ctx = Context::new();
        let mut imp = declare(&mut ctx, "f", "int32", &[]);
        build(&ctx, &mut imp, |b| {
            let a = b.const_value("int32", ConstantValue::Int(1));
            let c = b.const_value("uint32", ConstantValue::Int(2));
            let err = b.add(a, c).unwrap_err();
            assert!(matches!(err, BuildError::CannotCoerce { .. }));
        });
    }

    #[test]
    fn ret_inserts_implicit_cast() {
        let mut ctx = Context::new();
        let mut imp = declare(&mut ctx, "f", "int64", &[]);
        build(&ctx, &mut imp, |b| {
            let v = b.const_value("int32", ConstantValue::Int(5));
            b.ret(Some(v)).unwrap();
        });
        assert_eq!(imp.operations().len(), 1);
        assert_eq!(imp.operations()[0].name, "cast.int32.int64");
    }

    #[test]
    fn ret_rejects_uncastable_type() {
        let mut ctx = Context::new();
        let mut imp = declare(&mut ctx, "f", "int32", &[]);
        build(&ctx, &mut imp, |b| {
            let v = b.const_value("uint32", ConstantValue::Int(5));
            let err = b.ret(Some(v)).unwrap_err();
            assert_eq!(
                err,
                BuildError::InvalidCast {
                    from: "uint32".to_string(),
                    to: "int32".to_string(),
                }
            );
        });
    }

    #[test]
    fn block_already_terminated_is_an_ir_error() {
        let mut ctx = Context::new();
        let mut imp = declare(&mut ctx, "f", "void", &[]);
        build(&ctx, &mut imp, |b| {
            b.ret(None).unwrap();
            let err = b.ret(None).unwrap_err();
            assert!(matches!(
                err,
                BuildError::Ir(mlvm_ir::IrError::BlockTerminatorAlreadyExist)
            ));
        });
    }

    #[test]
    fn call_picks_exact_match_over_implicit_cast() {
        let mut ctx = Context::new();
        {
            let foo = ctx.get_or_insert_function("foo").unwrap();
            foo.add_definition("int32", vec!["int32".to_string()]).unwrap();
            foo.add_definition("int64", vec!["int64".to_string()]).unwrap();
        }
        let mut imp = declare(&mut ctx, "f", "int32", &[]);
        build(&ctx, &mut imp, |b| {
            let arg = b.const_value("int32", ConstantValue::Int(1));
            let result = b.call("foo", &[arg]).unwrap();
            b.ret(Some(result)).unwrap();
        });
        let call_op = imp.operations().iter().find(|op| op.name == "call.func").unwrap();
        assert_eq!(call_op.result_type.as_deref(), Some("int32"));
    }

    #[test]
    fn call_inserts_implicit_cast_into_mismatched_argument() {
        let mut ctx = Context::new();
        ctx.get_or_insert_function("foo")
            .unwrap()
            .add_definition("double", vec!["double".to_string()])
            .unwrap();
        let mut imp = declare(&mut ctx, "f", "double", &[]);
        build(&ctx, &mut imp, |b| {
            let arg = b.const_value("float", ConstantValue::Float(1.0));
            let result = b.call("foo", &[arg]).unwrap();
            b.ret(Some(result)).unwrap();
        });
        assert!(imp.operations().iter().any(|op| op.name == "cast.float.double"));
    }

    #[test]
    fn call_is_ambiguous_when_two_ranks_tie() {
        let mut ctx = Context::new();
        {
            let foo = ctx.get_or_insert_function("foo").unwrap();
            foo.add_definition("int32", vec!["int32".to_string()]).unwrap();
            foo.add_definition("int64", vec!["int64".to_string()]).unwrap();
        }
        let mut imp = declare(&mut ctx, "f", "void", &[]);
        build(&ctx, &mut imp, |b| {
            let arg = b.const_value("uint16", ConstantValue::Int(1));
            let err = b.call("foo", &[arg]).unwrap_err();
            assert_eq!(err, BuildError::MultiplePossibleDefinition("foo".to_string()));
        });
    }

    #[test]
    fn call_fails_when_no_candidate_exists() {
        let mut ctx = Context::new();
        let mut imp = declare(&mut ctx, "f", "void", &[]);
        build(&ctx, &mut imp, |b| {
            let err = b.call("bogus", &[]).unwrap_err();
            assert_eq!(err, BuildError::MissingDefinition("bogus".to_string()));
        });
    }

    #[test]
    fn pointer_ref_load_store_roundtrip() {
        let mut ctx = Context::new();
        let mut imp = declare(&mut ctx, "f", "int32", &[]);
        build(&ctx, &mut imp, |b| {
            let var = b.var("int32");
            let init = b.const_value("int32", ConstantValue::Int(0));
            b.assign(init, var);
            let ptr = b.reference(var.into());
            let new_val = b.const_value("int32", ConstantValue::Int(9));
            b.store(new_val, ptr);
            let loaded = b.load(ptr);
            b.ret(Some(loaded)).unwrap();
        });
        let ref_op = imp.operations().iter().find(|op| op.name == "ref").unwrap();
        assert_eq!(ref_op.result_type.as_deref(), Some("int32*"));
        let load_op = imp.operations().iter().find(|op| op.name == "load").unwrap();
        assert_eq!(load_op.result_type.as_deref(), Some("int32"));
    }

    #[test]
    fn for_range_builds_five_blocks_and_leaves_cursor_terminated() {
        let mut ctx = Context::new();
        let mut imp = declare(&mut ctx, "f", "void", &[]);
        build(&ctx, &mut imp, |b| {
            let index = b.var("int32");
            let zero = b.const_value("int32", ConstantValue::Int(0));
            b.assign(zero, index);
            let stop = b.const_value("int32", ConstantValue::Int(10));

            for_range(b, index, stop, None, |_b, _step, _exit| {}).unwrap();
            b.ret(None).unwrap();
            assert!(b.has_terminator());
        });
        // entry + header + body + step + exit = 5 blocks total.
        assert_eq!(imp.blocks().len(), 5);
    }

    #[test]
    fn if_else_joins_at_merge_block() {
        let mut ctx = Context::new();
        let mut imp = declare(&mut ctx, "f", "int32", &[]);
        build(&ctx, &mut imp, |b| {
            let pred = b.const_value("pred", ConstantValue::Bool(true));

            if_else(
                b,
                pred,
                |b| {
                    let one = b.const_value("int32", ConstantValue::Int(1));
                    b.ret(Some(one)).unwrap();
                },
                |b| {
                    let two = b.const_value("int32", ConstantValue::Int(2));
                    b.ret(Some(two)).unwrap();
                },
            )
            .unwrap();

            // entry + then + else + merge = 4 blocks; merge has no terminator
            // since both arms returned directly instead of falling through.
            assert!(!b.has_terminator());
        });
        assert_eq!(imp.blocks().len(), 4);
    }

    #[test]
    fn scoped_at_restores_prior_cursor_on_drop() {
        let mut ctx = Context::new();
        let mut imp = declare(&mut ctx, "f", "void", &[]);
        build(&ctx, &mut imp, |b| {
            let entry = b.current_block();
            let other = b.alloc_block();
            {
                let guard = b.scoped_at(other);
                assert_eq!(guard.current_block(), other);
            }
            assert_eq!(b.current_block(), entry);
        });
    }

    #[test]
    fn intrinsic_definitions_are_callable_too() {
        let mut ctx = Context::new();
        ctx.get_or_insert_intrinsic("sqrt")
            .unwrap()
            .add_definition("double", vec!["double".to_string()])
            .unwrap();
        assert_eq!(
            ctx.get_intrinsic("sqrt").unwrap().kind(),
            CallableKind::Intrinsic
        );
        let mut imp = declare(&mut ctx, "f", "double", &[]);
        build(&ctx, &mut imp, |b| {
            let arg = b.const_value("double", ConstantValue::Float(2.0));
            let result = b.call("sqrt", &[arg]).unwrap();
            b.ret(Some(result)).unwrap();
        });
        assert!(imp.operations().iter().any(|op| op.name == "call.intr"));
    }
}
