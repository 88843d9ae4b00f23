use crate::attributes::AttributeSet;
use crate::error::IrError;
use crate::handle::{ArgumentId, BlockId, ConstantId, OperationId, VariableId};
use crate::operation::{Operation, Terminator};
use crate::value::{ConstantValue, ValueId};

#[derive(Debug, Clone)]
pub struct Argument {
    pub type_name: String,
    pub attributes: AttributeSet,
}

#[derive(Debug, Clone)]
pub struct Constant {
    pub type_name: String,
    pub value: ConstantValue,
}

#[derive(Debug, Clone)]
pub struct Variable {
    pub type_name: String,
    pub initializer: Option<ConstantId>,
}

/// An ordered list of operations plus at most one terminator.
#[derive(Debug, Clone, Default)]
pub struct BasicBlock {
    operations: Vec<OperationId>,
    terminator: Option<Terminator>,
}

impl BasicBlock {
    #[must_use]
    pub fn operations(&self) -> &[OperationId] {
        &self.operations
    }

    #[must_use]
    pub fn terminator(&self) -> Option<&Terminator> {
        self.terminator.as_ref()
    }

    #[must_use]
    pub fn has_terminator(&self) -> bool {
        self.terminator.is_some()
    }

    fn set_terminator(&mut self, terminator: Terminator) -> Result<(), IrError> {
        if self.terminator.is_some() {
            return Err(IrError::BlockTerminatorAlreadyExist);
        }
        self.terminator = Some(terminator);
        Ok(())
    }
}

/// Owns every argument, constant, local variable, and basic block belonging
/// to one function body. Entities are referenced by [`crate::handle`] index,
/// never by pointer: the arena is the sole owner and nothing aliases it.
#[derive(Debug, Clone)]
pub struct Implementation {
    return_type: String,
    declared_arg_types: Vec<String>,
    arguments: Vec<Argument>,
    constants: Vec<Constant>,
    variables: Vec<Variable>,
    blocks: Vec<BasicBlock>,
    operations: Vec<Operation>,
}

impl Implementation {
    pub(crate) fn new(return_type: String, declared_arg_types: Vec<String>) -> Self {
        Self {
            return_type,
            declared_arg_types,
            arguments: Vec::new(),
            constants: Vec::new(),
            variables: Vec::new(),
            blocks: Vec::new(),
            operations: Vec::new(),
        }
    }

    #[must_use]
    pub fn return_type(&self) -> &str {
        &self.return_type
    }

    #[must_use]
    pub fn declared_arg_types(&self) -> &[String] {
        &self.declared_arg_types
    }

    pub fn alloc_argument(&mut self, type_name: impl Into<String>) -> ArgumentId {
        let id = ArgumentId::from_len(self.arguments.len());
        self.arguments.push(Argument {
            type_name: type_name.into(),
            attributes: AttributeSet::new(),
        });
        id
    }

    #[must_use]
    pub fn argument(&self, id: ArgumentId) -> &Argument {
        &self.arguments[id.index()]
    }

    pub fn argument_mut(&mut self, id: ArgumentId) -> &mut Argument {
        &mut self.arguments[id.index()]
    }

    #[must_use]
    pub fn arguments(&self) -> &[Argument] {
        &self.arguments
    }

    pub fn alloc_constant(&mut self, type_name: impl Into<String>, value: ConstantValue) -> ConstantId {
        let id = ConstantId::from_len(self.constants.len());
        self.constants.push(Constant {
            type_name: type_name.into(),
            value,
        });
        id
    }

    #[must_use]
    pub fn constant(&self, id: ConstantId) -> &Constant {
        &self.constants[id.index()]
    }

    #[must_use]
    pub fn constants(&self) -> &[Constant] {
        &self.constants
    }

    pub fn alloc_variable(
        &mut self,
        type_name: impl Into<String>,
        initializer: Option<ConstantId>,
    ) -> VariableId {
        let id = VariableId::from_len(self.variables.len());
        self.variables.push(Variable {
            type_name: type_name.into(),
            initializer,
        });
        id
    }

    #[must_use]
    pub fn variable(&self, id: VariableId) -> &Variable {
        &self.variables[id.index()]
    }

    #[must_use]
    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    pub fn alloc_block(&mut self) -> BlockId {
        let id = BlockId::from_len(self.blocks.len());
        self.blocks.push(BasicBlock::default());
        id
    }

    #[must_use]
    pub fn block(&self, id: BlockId) -> &BasicBlock {
        &self.blocks[id.index()]
    }

    #[must_use]
    pub fn blocks(&self) -> &[BasicBlock] {
        &self.blocks
    }

    pub fn alloc_operation(
        &mut self,
        block: BlockId,
        name: impl Into<String>,
        result_type: Option<String>,
        operands: Vec<ValueId>,
    ) -> OperationId {
        self.alloc_operation_with_callee(block, name, result_type, operands, None)
    }

    pub fn alloc_operation_with_callee(
        &mut self,
        block: BlockId,
        name: impl Into<String>,
        result_type: Option<String>,
        operands: Vec<ValueId>,
        callee: Option<String>,
    ) -> OperationId {
        let id = OperationId::from_len(self.operations.len());
        self.operations.push(Operation {
            name: name.into(),
            result_type,
            operands,
            callee,
        });
        self.blocks[block.index()].operations.push(id);
        id
    }

    #[must_use]
    pub fn operation(&self, id: OperationId) -> &Operation {
        &self.operations[id.index()]
    }

    #[must_use]
    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    /// Sets `block`'s terminator.
    ///
    /// # Errors
    /// Returns [`IrError::BlockTerminatorAlreadyExist`] if the block already
    /// has one.
    pub fn set_terminator(&mut self, block: BlockId, terminator: Terminator) -> Result<(), IrError> {
        self.blocks[block.index()].set_terminator(terminator)
    }

    /// The declared type of a value, or `None` for the void result of a
    /// store/assign/void-call operation.
    #[must_use]
    pub fn value_type(&self, value: ValueId) -> Option<&str> {
        match value {
            ValueId::Argument(id) => Some(self.argument(id).type_name.as_str()),
            ValueId::Constant(id) => Some(self.constant(id).type_name.as_str()),
            ValueId::Variable(id) => Some(self.variable(id).type_name.as_str()),
            ValueId::Operation(id) => self.operation(id).result_type.as_deref(),
        }
    }
}
