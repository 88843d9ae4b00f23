//! Arithmetic, comparison, and cast operation implementations, registered
//! for every built-in numeric pair SPEC_FULL.md §4.5 calls for.
//!
//! Grounded directly on `ori_llvm::operators::LLVMCodegen::compile_binary_op`'s
//! float/int branch-on-`BasicValueEnum` structure and
//! `ori_llvm::builtin_methods::ordering`'s predicate dispatch table, carried
//! one step further than the teacher does: Ori's IR has no unsigned integer
//! type, so its comparison lowering only ever chooses between a float
//! predicate and a *signed* int predicate. MLVM's type system has both
//! `int*` and `uint*` families, so the table here is keyed on the operand
//! type's signedness as well as its floatness — this is the fix for the
//! "always-`SLT`" comparison bug SPEC_FULL.md §9 calls out.

use std::sync::Arc;

use inkwell::{FloatPredicate, IntPredicate};
use mlvm_backend::OperationImplementation;

use crate::backend::LlvmBackend;
use crate::types::{scalar_llvm_type, ScalarKind, NUMERIC_TYPES};
use crate::unit::LlvmUnit;

#[derive(Debug, Clone, Copy)]
enum ArithOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
}

impl ArithOp {
    const ALL: [(&'static str, Self); 5] = [("add", Self::Add), ("sub", Self::Sub), ("mul", Self::Mul), ("div", Self::Div), ("rem", Self::Rem)];
}

struct ArithmeticOp {
    kind: ScalarKind,
    op: ArithOp,
}

impl<'ctx> OperationImplementation<LlvmBackend<'ctx>> for ArithmeticOp {
    fn emit(
        &self,
        _backend: &mut LlvmBackend<'ctx>,
        unit: &mut LlvmUnit<'ctx>,
        operands: &[inkwell::values::BasicValueEnum<'ctx>],
    ) -> Option<inkwell::values::BasicValueEnum<'ctx>> {
        let builder = &unit.builder;
        if self.kind.is_float() {
            let lhs = operands[0].into_float_value();
            let rhs = operands[1].into_float_value();
            let result = match self.op {
                ArithOp::Add => builder.build_float_add(lhs, rhs, "fadd"),
                ArithOp::Sub => builder.build_float_sub(lhs, rhs, "fsub"),
                ArithOp::Mul => builder.build_float_mul(lhs, rhs, "fmul"),
                ArithOp::Div => builder.build_float_div(lhs, rhs, "fdiv"),
                ArithOp::Rem => builder.build_float_rem(lhs, rhs, "frem"),
            };
            return Some(result.unwrap_or_else(|err| panic!("float arithmetic builder call failed: {err}")).into());
        }

        let lhs = operands[0].into_int_value();
        let rhs = operands[1].into_int_value();
        let signed = self.kind.is_signed();
        let result = match self.op {
            ArithOp::Add => builder.build_int_add(lhs, rhs, "iadd"),
            ArithOp::Sub => builder.build_int_sub(lhs, rhs, "isub"),
            ArithOp::Mul => builder.build_int_mul(lhs, rhs, "imul"),
            ArithOp::Div if signed => builder.build_int_signed_div(lhs, rhs, "sdiv"),
            ArithOp::Div => builder.build_int_unsigned_div(lhs, rhs, "udiv"),
            ArithOp::Rem if signed => builder.build_int_signed_rem(lhs, rhs, "srem"),
            ArithOp::Rem => builder.build_int_unsigned_rem(lhs, rhs, "urem"),
        };
        Some(result.unwrap_or_else(|err| panic!("integer arithmetic builder call failed: {err}")).into())
    }
}

#[derive(Debug, Clone, Copy)]
enum CmpOp {
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
}

impl CmpOp {
    const ALL: [(&'static str, Self); 6] =
        [("lt", Self::Lt), ("le", Self::Le), ("gt", Self::Gt), ("ge", Self::Ge), ("eq", Self::Eq), ("ne", Self::Ne)];

    /// The predicate pair for this logical comparison: `(float, signed int,
    /// unsigned int)`. `Eq`/`Ne` do not distinguish sign.
    fn predicates(self) -> (FloatPredicate, IntPredicate, IntPredicate) {
        match self {
            Self::Lt => (FloatPredicate::OLT, IntPredicate::SLT, IntPredicate::ULT),
            Self::Le => (FloatPredicate::OLE, IntPredicate::SLE, IntPredicate::ULE),
            Self::Gt => (FloatPredicate::OGT, IntPredicate::SGT, IntPredicate::UGT),
            Self::Ge => (FloatPredicate::OGE, IntPredicate::SGE, IntPredicate::UGE),
            Self::Eq => (FloatPredicate::OEQ, IntPredicate::EQ, IntPredicate::EQ),
            Self::Ne => (FloatPredicate::ONE, IntPredicate::NE, IntPredicate::NE),
        }
    }
}

struct ComparisonOp {
    kind: ScalarKind,
    op: CmpOp,
}

impl<'ctx> OperationImplementation<LlvmBackend<'ctx>> for ComparisonOp {
    fn emit(
        &self,
        _backend: &mut LlvmBackend<'ctx>,
        unit: &mut LlvmUnit<'ctx>,
        operands: &[inkwell::values::BasicValueEnum<'ctx>],
    ) -> Option<inkwell::values::BasicValueEnum<'ctx>> {
        let builder = &unit.builder;
        let (float_pred, signed_pred, unsigned_pred) = self.op.predicates();
        let result = if self.kind.is_float() {
            let lhs = operands[0].into_float_value();
            let rhs = operands[1].into_float_value();
            builder.build_float_compare(float_pred, lhs, rhs, "fcmp")
        } else {
            let lhs = operands[0].into_int_value();
            let rhs = operands[1].into_int_value();
            let predicate = if self.kind.is_signed() { signed_pred } else { unsigned_pred };
            builder.build_int_compare(predicate, lhs, rhs, "icmp")
        };
        Some(result.unwrap_or_else(|err| panic!("comparison builder call failed: {err}")).into())
    }
}

struct CastOp {
    from: ScalarKind,
    to: ScalarKind,
}

impl<'ctx> OperationImplementation<LlvmBackend<'ctx>> for CastOp {
    fn emit(
        &self,
        backend: &mut LlvmBackend<'ctx>,
        unit: &mut LlvmUnit<'ctx>,
        operands: &[inkwell::values::BasicValueEnum<'ctx>],
    ) -> Option<inkwell::values::BasicValueEnum<'ctx>> {
        let value = operands[0];
        let to_type = scalar_llvm_type(backend, self.to);
        let builder = &unit.builder;

        let result = match (self.from.is_float(), self.to.is_float()) {
            (false, false) => {
                let int_value = value.into_int_value();
                let to_int = to_type.into_int_type();
                match self.from.bit_width().cmp(&self.to.bit_width()) {
                    std::cmp::Ordering::Equal => return Some(value),
                    std::cmp::Ordering::Less if self.from.is_signed() => builder.build_int_s_extend(int_value, to_int, "sext"),
                    std::cmp::Ordering::Less => builder.build_int_z_extend(int_value, to_int, "zext"),
                    std::cmp::Ordering::Greater => builder.build_int_truncate(int_value, to_int, "trunc"),
                }
                .map(Into::into)
            }
            (false, true) => {
                let int_value = value.into_int_value();
                let to_float = to_type.into_float_type();
                if self.from.is_signed() {
                    builder.build_signed_int_to_float(int_value, to_float, "sitofp")
                } else {
                    builder.build_unsigned_int_to_float(int_value, to_float, "uitofp")
                }
                .map(Into::into)
            }
            (true, false) => {
                let float_value = value.into_float_value();
                let to_int = to_type.into_int_type();
                if self.to.is_signed() {
                    builder.build_float_to_signed_int(float_value, to_int, "fptosi")
                } else {
                    builder.build_float_to_unsigned_int(float_value, to_int, "fptoui")
                }
                .map(Into::into)
            }
            (true, true) => {
                let float_value = value.into_float_value();
                let to_float = to_type.into_float_type();
                builder.build_float_cast(float_value, to_float, "fcast").map(Into::into)
            }
        };
        Some(result.unwrap_or_else(|err| panic!("cast builder call failed: {err}")))
    }
}

/// Registers `add|sub|mul|div|rem`, `cmp.{lt,le,gt,ge,eq,ne}`, and every
/// `cast.<from>.<to>` pair over the built-in numeric types (`int*`, `uint*`,
/// `float`, `double`) plus `pred` and `address`. `pred` is excluded from
/// arithmetic (it is a one-bit branch condition, not a numeric value).
/// `address` gets arithmetic and comparison ops too (an induction variable
/// counting over an `address`-typed index needs `add`/`cmp.lt` like any
/// other integer), in addition to the casts the default lattice's "any
/// built-in integer to and from `address`" edges call for.
pub(crate) fn register_builtin_operations(backend: &mut LlvmBackend<'_>) {
    let address_kind = ScalarKind::Int {
        bits: backend.address_width(),
        signed: false,
    };
    let mut castable: Vec<(&str, ScalarKind)> = NUMERIC_TYPES.to_vec();
    castable.push(("pred", ScalarKind::Int { bits: 1, signed: false }));
    castable.push(("address", address_kind));

    let mut arithmetic: Vec<(&str, ScalarKind)> = NUMERIC_TYPES.to_vec();
    arithmetic.push(("address", address_kind));

    for (name, kind) in &arithmetic {
        for (op_name, op) in ArithOp::ALL {
            backend.implement_operation(op_name, vec![(*name).to_string(), (*name).to_string()], Arc::new(ArithmeticOp { kind: *kind, op }));
        }
        for (op_name, op) in CmpOp::ALL {
            let full_name = format!("cmp.{op_name}");
            backend.implement_operation(full_name, vec![(*name).to_string(), (*name).to_string()], Arc::new(ComparisonOp { kind: *kind, op }));
        }
    }

    for (from_name, from_kind) in &castable {
        for (to_name, to_kind) in &castable {
            if from_name == to_name {
                continue;
            }
            let op_name = format!("cast.{from_name}.{to_name}");
            backend.implement_operation(op_name, vec![(*from_name).to_string()], Arc::new(CastOp { from: *from_kind, to: *to_kind }));
        }
    }
}
