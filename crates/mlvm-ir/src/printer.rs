//! LLVM-like pretty-printer: a `define` header with per-argument attribute
//! tags, a body listing constants and variables with their initializers,
//! then one labeled block per basic block with each operation rendered as
//! `%n = opname operands ; result_type` and a terminator line. Required for
//! equality-by-print tests (I3/I4-adjacent IR-shape assertions).

use std::fmt::Write as _;

use crate::implementation::Implementation;
use crate::operation::Terminator;
use crate::value::{ConstantValue, ValueId};

fn value_name(v: ValueId) -> String {
    match v {
        ValueId::Argument(id) => format!("%arg{}", id.index()),
        ValueId::Constant(id) => format!("%c{}", id.index()),
        ValueId::Variable(id) => format!("%v{}", id.index()),
        ValueId::Operation(id) => format!("%op{}", id.index()),
    }
}

fn constant_literal(value: ConstantValue) -> String {
    match value {
        ConstantValue::Int(i) => i.to_string(),
        ConstantValue::Float(f) => f.to_string(),
        ConstantValue::Bool(b) => b.to_string(),
    }
}

/// Renders `imp` as a `define` block named `name`.
#[must_use]
pub fn print_implementation(name: &str, imp: &Implementation) -> String {
    let mut out = String::new();

    let args_rendered: Vec<String> = imp
        .arguments()
        .iter()
        .enumerate()
        .map(|(i, arg)| {
            let mut s = format!("{} %arg{}", arg.type_name, i);
            if !arg.attributes.is_empty() {
                let tags: Vec<&str> = arg.attributes.iter().collect();
                let _ = write!(s, " [{}]", tags.join(" "));
            }
            s
        })
        .collect();
    let _ = writeln!(
        out,
        "define {} @{}({}) {{",
        imp.return_type(),
        name,
        args_rendered.join(", ")
    );

    if !imp.constants().is_empty() {
        let _ = writeln!(out, "constants:");
        for (i, c) in imp.constants().iter().enumerate() {
            let _ = writeln!(
                out,
                "  %c{} : {} = {}",
                i,
                c.type_name,
                constant_literal(c.value)
            );
        }
    }

    if !imp.variables().is_empty() {
        let _ = writeln!(out, "variables:");
        for (i, v) in imp.variables().iter().enumerate() {
            match v.initializer {
                Some(init) => {
                    let _ = writeln!(out, "  %v{} : {} = init %c{}", i, v.type_name, init.index());
                }
                None => {
                    let _ = writeln!(out, "  %v{} : {} = uninit", i, v.type_name);
                }
            }
        }
    }

    for (block_idx, block) in imp.blocks().iter().enumerate() {
        let _ = writeln!(out, "block{}:", block_idx);
        for op_id in block.operations() {
            let op = imp.operation(*op_id);
            let operands: Vec<String> = op.operands.iter().copied().map(value_name).collect();
            let mut line = String::from("  ");
            if let Some(result_type) = &op.result_type {
                let _ = write!(line, "{} = ", value_name(ValueId::Operation(*op_id)));
                let _ = write!(line, "{} {}", op.name, operands.join(", "));
                let _ = write!(line, " ; {result_type}");
            } else {
                let _ = write!(line, "{} {}", op.name, operands.join(", "));
            }
            let _ = writeln!(out, "{line}");
        }
        match block.terminator() {
            Some(Terminator::Branch(target)) => {
                let _ = writeln!(out, "  br block{}", target.index());
            }
            Some(Terminator::ConditionBranch {
                predicate,
                if_true,
                if_false,
            }) => {
                let _ = writeln!(
                    out,
                    "  br.cond {}, block{}, block{}",
                    value_name(*predicate),
                    if_true.index(),
                    if_false.index()
                );
            }
            Some(Terminator::Return(Some(value))) => {
                let _ = writeln!(out, "  ret {}", value_name(*value));
            }
            Some(Terminator::Return(None)) => {
                let _ = writeln!(out, "  ret void");
            }
            None => {
                let _ = writeln!(out, "  ; no terminator");
            }
        }
    }

    out.push('}');
    out.push('\n');
    out
}
