//! Error taxonomy shared by every crate in the workspace.
//!
//! One variant per distinct failure condition named in the specification;
//! callers branch on variant, not on message text. No variant here is ever
//! caught and retried inside the core (spec §7: "Failures are never caught
//! inside the core; they surface to the caller").

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CalcError {
    #[error("syntax error: {0}")]
    Syntax(String),

    #[error("divide by zero")]
    DivideByZero,

    #[error("overflow")]
    Overflow,

    #[error("domain error: {0}")]
    Domain(String),

    #[error("data type error: {0}")]
    DataType(String),

    #[error("wrong number of arguments: {0}")]
    Argument(String),

    #[error("dimension mismatch")]
    DimMismatch,

    #[error("singular matrix")]
    Singular,

    #[error("undefined: {0}")]
    Undefined(String),

    #[error("invalid dimension")]
    InvalidDim,

    #[error("stat error: {0}")]
    Stat(String),

    #[error("non-real result")]
    NonReal,

    #[error("no sign change in interval")]
    NoSignChange,

    #[error("label not found: {0}")]
    LabelNotFound(String),

    #[error("cancelled")]
    Break,

    #[error("iteration budget exceeded")]
    Iterations,
}

pub type CalcResult<T> = Result<T, CalcError>;
