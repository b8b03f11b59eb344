use thiserror::Error;

/// Fatal conditions raised while executing assembly text. Any of them aborts the run.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RuntimeError {
    #[error("Division by zero")]
    DivisionByZero,

    #[error("Modulo by zero")]
    ModuloByZero,

    #[error("Unresolved label '{0}'")]
    UnresolvedLabel(String),

    #[error("Unknown instruction '{0}'")]
    UnknownInstruction(String),

    #[error("Step budget of {0} instructions exceeded")]
    StepBudgetExceeded(usize),

    #[error("Non-numeric operand '{value}' for {op}")]
    NonNumeric { op: String, value: String },

    #[error("Missing operand for {0}")]
    MissingOperand(String),
}
