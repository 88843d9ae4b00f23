//! `foo(int32)` and `foo(int64)` both accept a `uint16` actual via one
//! implicit cast each, tying at the minimum rank. `Builder::call` must
//! fail with `MultiplePossibleDefinition` instead of picking either
//! overload arbitrarily.

use mlvm::builder::Builder;
use mlvm::ir::{Context, ConstantValue};

fn main() {
    let mut ctx = Context::new();
    let foo = ctx.get_or_insert_function("foo").unwrap_or_else(|err| panic!("{err}"));
    foo.add_definition("int32", vec!["int32".to_string()]).unwrap_or_else(|err| panic!("{err}"));
    foo.add_definition("int32", vec!["int64".to_string()]).unwrap_or_else(|err| panic!("{err}"));

    let mut imp = ctx
        .get_function("foo")
        .unwrap_or_else(|| unreachable!("just inserted"))
        .definition(&["int32".to_string()])
        .unwrap_or_else(|| unreachable!("just inserted"))
        .begin_implementation()
        .unwrap_or_else(|err| panic!("{err}"));

    let entry = imp.alloc_block();
    let mut builder = Builder::new(&ctx, &mut imp, entry);
    let ambiguous_arg = builder.const_value("uint16", ConstantValue::Int(7));

    match builder.call("foo", &[ambiguous_arg]) {
        Ok(_) => panic!("expected MultiplePossibleDefinition, call unexpectedly succeeded"),
        Err(err) => println!("builder.call(\"foo\", [uint16]) failed as expected: {err}"),
    }
}
