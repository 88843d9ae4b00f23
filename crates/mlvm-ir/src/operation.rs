use crate::handle::BlockId;
use crate::value::ValueId;

/// A tagged operation record: `(name, result_type_or_void, operand tuple)`.
/// `name` spans every Builder-emitted variant: arithmetic (`add`, `sub`,
/// `mul`, `div`, `rem`), comparison (`cmp.lt`, ...), cast
/// (`cast.<from>.<to>`), `ref`, `load`, `store`, `assign`, and call
/// (`call.func <name>` / `call.intr <name>`, with the callee name carried in
/// [`Operation::callee`]).
#[derive(Debug, Clone)]
pub struct Operation {
    pub name: String,
    pub result_type: Option<String>,
    pub operands: Vec<ValueId>,
    pub callee: Option<String>,
}

impl Operation {
    #[must_use]
    pub fn is_void(&self) -> bool {
        self.result_type.is_none()
    }
}

/// The terminator closing a basic block. Legal terminators: `Branch`,
/// `ConditionBranch`, `Return`; a block holds at most one.
#[derive(Debug, Clone, Copy)]
pub enum Terminator {
    Branch(BlockId),
    ConditionBranch {
        predicate: ValueId,
        if_true: BlockId,
        if_false: BlockId,
    },
    Return(Option<ValueId>),
}
