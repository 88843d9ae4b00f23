use mlvm_ir::{BlockId, Callable, ConstantValue, Context, Implementation, Terminator, ValueId, VariableId};

use crate::error::BuildError;

/// The six comparison predicates a `Builder::compare` call may request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompareOp {
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
}

impl CompareOp {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Lt => "lt",
            Self::Le => "le",
            Self::Gt => "gt",
            Self::Ge => "ge",
            Self::Eq => "eq",
            Self::Ne => "ne",
        }
    }
}

/// Builds one function body by appending operations at a cursor (the
/// current basic block).
///
/// Holds the [`Context`] (read-only: type system and other callables'
/// signatures for overload resolution) and the [`Implementation`] under
/// construction (exclusive) as two independent borrows — the implementation
/// is obtained from its `Definition` via
/// [`mlvm_ir::Definition::begin_implementation`] and handed back via
/// [`mlvm_ir::Definition::finish_implementation`] once built, rather than
/// borrowed out of the context, so the two borrows never alias.
pub struct Builder<'a> {
    ctx: &'a Context,
    imp: &'a mut Implementation,
    cursor: BlockId,
}

impl<'a> Builder<'a> {
    pub fn new(ctx: &'a Context, imp: &'a mut Implementation, cursor: BlockId) -> Self {
        Self { ctx, imp, cursor }
    }

    #[must_use]
    pub fn implementation(&self) -> &Implementation {
        self.imp
    }

    #[must_use]
    pub fn current_block(&self) -> BlockId {
        self.cursor
    }

    pub fn set_basic_block(&mut self, bb: BlockId) {
        self.cursor = bb;
    }

    pub fn alloc_block(&mut self) -> BlockId {
        self.imp.alloc_block()
    }

    #[must_use]
    pub fn has_terminator(&self) -> bool {
        self.imp.block(self.cursor).has_terminator()
    }

    /// Temporarily repositions the cursor at `bb`, restoring the prior
    /// cursor when the returned guard drops. Modeled on a position-
    /// restoring builder guard: use this when emitting something out of the
    /// current block's line (e.g. a helper sequence materialized elsewhere)
    /// and then resuming exactly where you left off.
    pub fn scoped_at(&mut self, bb: BlockId) -> BuilderCursorGuard<'_, 'a> {
        let restore_to = self.cursor;
        self.cursor = bb;
        BuilderCursorGuard {
            builder: self,
            restore_to,
        }
    }

    fn value_type(&self, value: ValueId) -> String {
        self.imp.value_type(value).unwrap_or("void").to_string()
    }

    pub fn const_value(&mut self, type_name: impl Into<String>, value: ConstantValue) -> ValueId {
        self.imp.alloc_constant(type_name, value).into()
    }

    pub fn var(&mut self, type_name: impl Into<String>) -> VariableId {
        self.imp.alloc_variable(type_name, None)
    }

    /// Appends an `assign` operation (result void).
    pub fn assign(&mut self, value: ValueId, variable: VariableId) {
        self.imp
            .alloc_operation(self.cursor, "assign", None, vec![value, variable.into()]);
    }

    /// Coerces two operand types: equal types pass through unchanged;
    /// otherwise the side with an implicit cast toward the other is cast;
    /// if neither direction casts, fails [`BuildError::CannotCoerce`].
    ///
    /// # Errors
    /// See [`BuildError::CannotCoerce`].
    pub fn coerce(&mut self, lhs: ValueId, rhs: ValueId) -> Result<(ValueId, ValueId, String), BuildError> {
        let lty = self.value_type(lhs);
        let rty = self.value_type(rhs);
        if lty == rty {
            return Ok((lhs, rhs, lty));
        }
        let types = self.ctx.types();
        if types.can_implicit_cast(&lty, &rty) {
            let casted = self.cast(lhs, rty.clone());
            Ok((casted, rhs, rty))
        } else if types.can_implicit_cast(&rty, &lty) {
            let casted = self.cast(rhs, lty.clone());
            Ok((lhs, casted, lty))
        } else {
            Err(BuildError::CannotCoerce { lhs: lty, rhs: rty })
        }
    }

    fn binary_arith(&mut self, op: &str, lhs: ValueId, rhs: ValueId) -> Result<ValueId, BuildError> {
        let (l, r, ty) = self.coerce(lhs, rhs)?;
        let id = self.imp.alloc_operation(self.cursor, op, Some(ty), vec![l, r]);
        Ok(id.into())
    }

    pub fn add(&mut self, lhs: ValueId, rhs: ValueId) -> Result<ValueId, BuildError> {
        self.binary_arith("add", lhs, rhs)
    }

    pub fn sub(&mut self, lhs: ValueId, rhs: ValueId) -> Result<ValueId, BuildError> {
        self.binary_arith("sub", lhs, rhs)
    }

    pub fn mul(&mut self, lhs: ValueId, rhs: ValueId) -> Result<ValueId, BuildError> {
        self.binary_arith("mul", lhs, rhs)
    }

    pub fn div(&mut self, lhs: ValueId, rhs: ValueId) -> Result<ValueId, BuildError> {
        self.binary_arith("div", lhs, rhs)
    }

    pub fn rem(&mut self, lhs: ValueId, rhs: ValueId) -> Result<ValueId, BuildError> {
        self.binary_arith("rem", lhs, rhs)
    }

    pub fn compare(&mut self, op: CompareOp, lhs: ValueId, rhs: ValueId) -> Result<ValueId, BuildError> {
        let (l, r, _common_type) = self.coerce(lhs, rhs)?;
        let name = format!("cmp.{}", op.as_str());
        let id = self
            .imp
            .alloc_operation(self.cursor, name, Some("pred".to_string()), vec![l, r]);
        Ok(id.into())
    }

    /// No-op when `value`'s type already equals `to_type`; otherwise appends
    /// a `cast.<from>.<to>` operation. Explicit casts are trusted: no
    /// validation against the implicit-cast lattice is performed.
    pub fn cast(&mut self, value: ValueId, to_type: impl Into<String>) -> ValueId {
        let to_type = to_type.into();
        let from_type = self.value_type(value);
        if from_type == to_type {
            return value;
        }
        let name = format!("cast.{from_type}.{to_type}");
        let id = self
            .imp
            .alloc_operation(self.cursor, name, Some(to_type), vec![value]);
        id.into()
    }

    /// Sets the current block's terminator to `Return(value)`. If `value`'s
    /// type differs from the implementation's declared return type, an
    /// implicit cast is inserted when possible.
    ///
    /// # Errors
    /// Returns [`BuildError::InvalidCast`] if the value's type cannot be
    /// implicitly cast to the declared return type, or if `value` is `None`
    /// while the return type is not `void`.
    pub fn ret(&mut self, value: Option<ValueId>) -> Result<(), BuildError> {
        let return_type = self.imp.return_type().to_string();
        let value = match value {
            None => {
                if return_type != "void" {
                    return Err(BuildError::InvalidCast {
                        from: "void".to_string(),
                        to: return_type,
                    });
                }
                None
            }
            Some(v) => {
                let vty = self.value_type(v);
                if vty == return_type {
                    Some(v)
                } else if self.ctx.types().can_implicit_cast(&vty, &return_type) {
                    Some(self.cast(v, return_type.clone()))
                } else {
                    return Err(BuildError::InvalidCast {
                        from: vty,
                        to: return_type,
                    });
                }
            }
        };
        self.imp
            .set_terminator(self.cursor, Terminator::Return(value))
            .map_err(BuildError::from)
    }

    /// # Errors
    /// Returns [`BuildError::Ir`] if the current block already has a
    /// terminator.
    pub fn branch(&mut self, target: BlockId) -> Result<(), BuildError> {
        self.imp
            .set_terminator(self.cursor, Terminator::Branch(target))
            .map_err(BuildError::from)
    }

    /// # Errors
    /// Returns [`BuildError::Ir`] if the current block already has a
    /// terminator.
    pub fn condition_branch(
        &mut self,
        predicate: ValueId,
        if_true: BlockId,
        if_false: BlockId,
    ) -> Result<(), BuildError> {
        self.imp
            .set_terminator(
                self.cursor,
                Terminator::ConditionBranch {
                    predicate,
                    if_true,
                    if_false,
                },
            )
            .map_err(BuildError::from)
    }

    /// `load`'s result type is the pointee (trailing `*` stripped).
    pub fn load(&mut self, ptr: ValueId) -> ValueId {
        let ptr_ty = self.value_type(ptr);
        let pointee = ptr_ty.strip_suffix('*').unwrap_or(&ptr_ty).to_string();
        let id = self.imp.alloc_operation(self.cursor, "load", Some(pointee), vec![ptr]);
        id.into()
    }

    pub fn store(&mut self, value: ValueId, ptr: ValueId) {
        self.imp.alloc_operation(self.cursor, "store", None, vec![value, ptr]);
    }

    /// `ref`'s result type appends `*` to the operand's type. Named
    /// `reference` since `ref` is a reserved word.
    pub fn reference(&mut self, value: ValueId) -> ValueId {
        let ty = self.value_type(value);
        let ptr_ty = format!("{ty}*");
        let id = self.imp.alloc_operation(self.cursor, "ref", Some(ptr_ty), vec![value]);
        id.into()
    }

    /// Overload resolution: exact argument-type match wins immediately;
    /// otherwise candidates are ranked by implicit-cast count (lower is
    /// better) among those where every argument is exactly equal or
    /// implicitly castable. Fails [`BuildError::MissingDefinition`] if no
    /// candidate survives, [`BuildError::MultiplePossibleDefinition`] if the
    /// two lowest ranks tie. Implicit casts are inserted into mismatched
    /// arguments before the `call` operation is appended.
    ///
    /// # Errors
    /// See [`BuildError::MissingDefinition`] and
    /// [`BuildError::MultiplePossibleDefinition`].
    pub fn call(&mut self, callee: &str, args: &[ValueId]) -> Result<ValueId, BuildError> {
        let calltys: Vec<String> = args.iter().map(|v| self.value_type(*v)).collect();
        let (kind_prefix, chosen_argtys, return_type) = self.resolve_overload(callee, &calltys)?;

        let mut operands = Vec::with_capacity(args.len());
        for (arg, argty) in args.iter().zip(chosen_argtys.iter()) {
            let actual = self.value_type(*arg);
            if actual == *argty {
                operands.push(*arg);
            } else {
                operands.push(self.cast(*arg, argty.clone()));
            }
        }

        let op_name = format!("call.{kind_prefix}");
        let result_type = (return_type != "void").then_some(return_type);
        let id = self.imp.alloc_operation_with_callee(
            self.cursor,
            op_name,
            result_type,
            operands,
            Some(callee.to_string()),
        );
        Ok(id.into())
    }

    fn resolve_overload(
        &self,
        callee: &str,
        calltys: &[String],
    ) -> Result<(&'static str, Vec<String>, String), BuildError> {
        let (kind_prefix, candidates) = self.candidate_definitions(callee)?;

        let same_arity: Vec<&(Vec<String>, String)> = candidates
            .iter()
            .filter(|(argtys, _)| argtys.len() == calltys.len())
            .collect();

        if let Some((argtys, retty)) = same_arity.iter().find(|(argtys, _)| argtys.as_slice() == calltys) {
            return Ok((kind_prefix, argtys.clone(), retty.clone()));
        }

        let types = self.ctx.types();
        let mut ranked: Vec<(usize, &(Vec<String>, String))> = Vec::new();
        for candidate in &same_arity {
            let (argtys, _) = candidate;
            let mut rank = 0usize;
            let mut possible = true;
            for (calltype, argtype) in calltys.iter().zip(argtys.iter()) {
                if calltype == argtype {
                    // exact operand, +0
                } else if types.can_implicit_cast(calltype, argtype) {
                    rank += 1;
                } else {
                    possible = false;
                    break;
                }
            }
            if possible {
                ranked.push((rank, candidate));
            }
        }

        if ranked.is_empty() {
            return Err(BuildError::MissingDefinition(callee.to_string()));
        }

        ranked.sort_by_key(|(rank, _)| *rank);
        let best_rank = ranked[0].0;
        if ranked.iter().filter(|(rank, _)| *rank == best_rank).count() > 1 {
            return Err(BuildError::MultiplePossibleDefinition(callee.to_string()));
        }

        let (argtys, retty) = ranked[0].1;
        Ok((kind_prefix, argtys.clone(), retty.clone()))
    }

    fn candidate_definitions(
        &self,
        callee: &str,
    ) -> Result<(&'static str, Vec<(Vec<String>, String)>), BuildError> {
        let snapshot = |c: &Callable| {
            c.definitions()
                .map(|d| (d.arg_types().to_vec(), d.return_type().to_string()))
                .collect()
        };
        if let Some(func) = self.ctx.get_function(callee) {
            Ok(("func", snapshot(func)))
        } else if let Some(intr) = self.ctx.get_intrinsic(callee) {
            Ok(("intr", snapshot(intr)))
        } else {
            Err(BuildError::MissingDefinition(callee.to_string()))
        }
    }
}

/// A position-restoring guard returned by [`Builder::scoped_at`]: on drop,
/// the builder's cursor reverts to whatever it was before the guard moved
/// it.
pub struct BuilderCursorGuard<'g, 'a> {
    builder: &'g mut Builder<'a>,
    restore_to: BlockId,
}

impl<'a> std::ops::Deref for BuilderCursorGuard<'_, 'a> {
    type Target = Builder<'a>;

    fn deref(&self) -> &Self::Target {
        self.builder
    }
}

impl<'a> std::ops::DerefMut for BuilderCursorGuard<'_, 'a> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.builder
    }
}

impl Drop for BuilderCursorGuard<'_, '_> {
    fn drop(&mut self) {
        self.builder.cursor = self.restore_to;
    }
}
