//! Abstract syntax tree (spec §3 "AST node").

use calc_lex::Builtin;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
    NPr,
    NCr,
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
    And,
    Or,
    Xor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PrefixOp {
    Negate,
    Not,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PostfixOp {
    Factorial,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    Number(f64),
    Str(String),
    Pi,
    EulerE,
    ImaginaryI,
    Ans,

    Variable(String),
    ListVar(String),
    MatrixVar(String),
    StringVar(u8),
    FunctionSlot(u8),

    Binary(BinOp, Box<Expr>, Box<Expr>),
    UnaryPrefix(PrefixOp, Box<Expr>),
    UnaryPostfix(Box<Expr>, PostfixOp),

    FunctionCall(Builtin, Vec<Expr>),
    ListLiteral(Vec<Expr>),
    MatrixLiteral(Vec<Vec<Expr>>),

    ElementAccess(Box<Expr>, Vec<Expr>),
    /// `Store(value, target)`. `target` is parsed as an ordinary expression;
    /// the evaluator validates that its shape is one of Variable, ListVar,
    /// MatrixVar, StringVar, or ElementAccess (spec §4.5 "Store").
    Store(Box<Expr>, Box<Expr>),
    ImplicitMul(Box<Expr>, Box<Expr>),
}
