//! Method bodies and instructions.
//!
//! The body abstraction is minimal: an ordered instruction
//! sequence where every instruction knows how it affects control flow
//! ([`FlowType`]), which instruction indices it may branch to, and which
//! method it invokes (if any). That is exactly the information the block
//! extractor and the call-site analyzer consume; operand modeling, type
//! information, and register contents are the frontend's concern.

use strum::{AsRefStr, Display};

use crate::model::MethodId;

/// How an instruction affects intraprocedural control flow.
///
/// Invocations are *not* a flow type: a call transfers control
/// interprocedurally but execution continues at the next instruction, so for
/// block formation a call behaves like any sequential statement. Whether an
/// instruction is a call is carried separately ([`Instruction::invoked`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, AsRefStr)]
pub enum FlowType {
    /// Execution falls through to the next instruction.
    Sequential,
    /// Conditional branch: either a recorded target or fall-through.
    Branch,
    /// Unconditional jump to a recorded target.
    Goto,
    /// Normal method exit.
    Return,
    /// Abrupt method exit by raising an exception.
    Throw,
}

impl FlowType {
    /// Returns `true` if an instruction with this flow type always ends a
    /// basic block.
    #[must_use]
    pub const fn is_block_terminator(&self) -> bool {
        matches!(
            self,
            FlowType::Branch | FlowType::Goto | FlowType::Return | FlowType::Throw
        )
    }

    /// Returns `true` if control cannot fall through to the next instruction.
    #[must_use]
    pub const fn is_method_exit(&self) -> bool {
        matches!(self, FlowType::Return | FlowType::Throw)
    }
}

/// A single instruction within a method body.
///
/// Instructions are identified by their position (offset) in the body's
/// instruction sequence; branch targets are such positions. The `text` field
/// carries a human-readable rendering used in summaries and DOT output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    /// Human-readable statement text.
    pub text: String,
    /// Control-flow classification.
    pub flow: FlowType,
    /// Explicit branch targets (instruction indices within the body).
    pub targets: Vec<usize>,
    /// Invoked method, when this instruction is a call site.
    pub invoked: Option<MethodId>,
}

impl Instruction {
    /// Creates a plain sequential statement.
    #[must_use]
    pub fn stmt(text: impl Into<String>) -> Self {
        Instruction {
            text: text.into(),
            flow: FlowType::Sequential,
            targets: Vec::new(),
            invoked: None,
        }
    }

    /// Creates an invocation of `target`.
    ///
    /// Call instructions are sequential for block formation; the invoked
    /// method is what the call-site analyzer keys on.
    #[must_use]
    pub fn invoke(text: impl Into<String>, target: MethodId) -> Self {
        Instruction {
            text: text.into(),
            flow: FlowType::Sequential,
            targets: Vec::new(),
            invoked: Some(target),
        }
    }

    /// Creates a conditional branch to `target` with fall-through.
    #[must_use]
    pub fn branch(text: impl Into<String>, target: usize) -> Self {
        Instruction {
            text: text.into(),
            flow: FlowType::Branch,
            targets: vec![target],
            invoked: None,
        }
    }

    /// Creates an unconditional jump to `target`.
    #[must_use]
    pub fn goto(target: usize) -> Self {
        Instruction {
            text: format!("goto {target}"),
            flow: FlowType::Goto,
            targets: vec![target],
            invoked: None,
        }
    }

    /// Creates a method return.
    #[must_use]
    pub fn ret() -> Self {
        Instruction {
            text: "return".to_string(),
            flow: FlowType::Return,
            targets: Vec::new(),
            invoked: None,
        }
    }

    /// Creates a throw statement.
    #[must_use]
    pub fn throw(text: impl Into<String>) -> Self {
        Instruction {
            text: text.into(),
            flow: FlowType::Throw,
            targets: Vec::new(),
            invoked: None,
        }
    }

    /// Returns `true` if this instruction is a call site.
    #[must_use]
    pub const fn is_call(&self) -> bool {
        self.invoked.is_some()
    }
}

/// An exception handler range within a method body.
///
/// Instructions in `try_start..try_end` are protected; when they raise,
/// control may transfer to `handler_start`. The exception-aware CFG mode
/// turns each such range into edges from the covered blocks to the handler
/// block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExceptionHandler {
    /// First protected instruction (inclusive).
    pub try_start: usize,
    /// End of the protected range (exclusive).
    pub try_end: usize,
    /// First instruction of the handler.
    pub handler_start: usize,
}

impl ExceptionHandler {
    /// Creates a new handler range.
    #[must_use]
    pub const fn new(try_start: usize, try_end: usize, handler_start: usize) -> Self {
        ExceptionHandler {
            try_start,
            try_end,
            handler_start,
        }
    }
}

/// An analyzable method body: ordered instructions plus exception ranges.
///
/// Bodies are immutable once attached to a [`MethodDesc`](crate::model::MethodDesc).
#[derive(Debug, Clone, Default)]
pub struct MethodBody {
    /// Ordered instruction sequence.
    instructions: Vec<Instruction>,
    /// Exception handler ranges, in declaration order.
    handlers: Vec<ExceptionHandler>,
}

impl MethodBody {
    /// Creates a body from an instruction sequence without exception ranges.
    #[must_use]
    pub fn new(instructions: Vec<Instruction>) -> Self {
        MethodBody {
            instructions,
            handlers: Vec::new(),
        }
    }

    /// Adds exception handler ranges, consuming and returning the body.
    #[must_use]
    pub fn with_handlers(mut self, handlers: Vec<ExceptionHandler>) -> Self {
        self.handlers = handlers;
        self
    }

    /// Returns the number of instructions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    /// Returns `true` if the body has no instructions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// Returns the instruction at the given offset, if any.
    #[must_use]
    pub fn instruction(&self, offset: usize) -> Option<&Instruction> {
        self.instructions.get(offset)
    }

    /// Returns the full instruction sequence.
    #[must_use]
    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    /// Returns the exception handler ranges.
    #[must_use]
    pub fn handlers(&self) -> &[ExceptionHandler] {
        &self.handlers
    }
}
