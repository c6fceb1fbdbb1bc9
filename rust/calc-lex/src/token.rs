//! Token kinds and source spans (spec §3 "Token", §4.2).

use serde::{Deserialize, Serialize};
use std::fmt;

/// Byte-offset span of a token in the source it was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn dummy() -> Self {
        Self { start: 0, end: 0 }
    }

    pub fn merge(self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }
}

/// Built-in functions recognized by name during tokenization (spec §4.5
/// "FunctionCall: dispatch by function id"). Infix operators that happen to
/// read like function calls in other languages (`nPr`, `nCr`) are NOT here —
/// spec §3 lists them as dedicated operator tokens at Multiplication
/// precedence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Builtin {
    Sin,
    Cos,
    Tan,
    Asin,
    Acos,
    Atan,
    Sinh,
    Cosh,
    Tanh,
    Asinh,
    Acosh,
    Atanh,
    Ln,
    Log,
    Sqrt,
    Abs,
    Round,
    IPart,
    FPart,
    Sign,
    Dim,
    Sum,
    Prod,
    Mean,
    Median,
    CumSum,
    Augment,
    Min,
    Max,
    Length,
    Sub,
    InString,
    Det,
    Identity,
    Ref,
    Rref,
    Inverse,
    RandInt,
    RandNorm,
    Rand,
    RandM,
    NDeriv,
    FnInt,
    Seq,
}

impl Builtin {
    /// Maps a lowercase-normalized identifier word to its builtin, if any.
    /// The tokenizer calls this after reading a maximal identifier run.
    pub fn from_word(word: &str) -> Option<Builtin> {
        Some(match word {
            "sin" => Builtin::Sin,
            "cos" => Builtin::Cos,
            "tan" => Builtin::Tan,
            "sin-1" | "asin" => Builtin::Asin,
            "cos-1" | "acos" => Builtin::Acos,
            "tan-1" | "atan" => Builtin::Atan,
            "sinh" => Builtin::Sinh,
            "cosh" => Builtin::Cosh,
            "tanh" => Builtin::Tanh,
            "sinh-1" | "asinh" => Builtin::Asinh,
            "cosh-1" | "acosh" => Builtin::Acosh,
            "tanh-1" | "atanh" => Builtin::Atanh,
            "ln" => Builtin::Ln,
            "log" => Builtin::Log,
            "sqrt" => Builtin::Sqrt,
            "abs" => Builtin::Abs,
            "round" => Builtin::Round,
            "ipart" => Builtin::IPart,
            "fpart" => Builtin::FPart,
            "sign" => Builtin::Sign,
            "dim" => Builtin::Dim,
            "sum" => Builtin::Sum,
            "prod" => Builtin::Prod,
            "mean" => Builtin::Mean,
            "median" => Builtin::Median,
            "cumsum" => Builtin::CumSum,
            "augment" => Builtin::Augment,
            "min" => Builtin::Min,
            "max" => Builtin::Max,
            "length" => Builtin::Length,
            "sub" => Builtin::Sub,
            "instring" => Builtin::InString,
            "det" => Builtin::Det,
            "identity" => Builtin::Identity,
            "ref" => Builtin::Ref,
            "rref" => Builtin::Rref,
            "inverse" => Builtin::Inverse,
            "randint" => Builtin::RandInt,
            "randnorm" => Builtin::RandNorm,
            "rand" => Builtin::Rand,
            "randm" => Builtin::RandM,
            "nderiv" => Builtin::NDeriv,
            "fnint" => Builtin::FnInt,
            "seq" => Builtin::Seq,
            _ => return None,
        })
    }

    /// Zero-argument builtins that the parser allows to appear with an
    /// immediately-closed or missing argument list (spec §4.3.2).
    pub fn is_zero_arg(self) -> bool {
        matches!(self, Builtin::Rand)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TokenKind {
    Number(f64),
    Str(String),
    Variable(String),
    ListName(String),
    MatrixName(String),
    StringVar(u8),
    FunctionSlot(u8),

    Plus,
    Minus,
    Multiply,
    Divide,
    Power,
    Negate,
    Factorial,
    NPr,
    NCr,
    Store,

    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,

    And,
    Or,
    Xor,
    Not,

    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    Comma,

    Function(Builtin),

    Pi,
    EulerE,
    ImaginaryI,
    Ans,

    ImplicitMultiply,
    Eof,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// Whether this token could end an expression on its own — i.e. could be
    /// followed by an implicit multiplication or reclassify a following
    /// `Minus` as subtraction rather than negation (spec §4.2).
    pub fn starts_value_tail(&self) -> bool {
        matches!(
            self.kind,
            TokenKind::Number(_)
                | TokenKind::Pi
                | TokenKind::EulerE
                | TokenKind::ImaginaryI
                | TokenKind::Ans
                | TokenKind::RParen
                | TokenKind::RBracket
                | TokenKind::RBrace
                | TokenKind::Factorial
                | TokenKind::Variable(_)
                | TokenKind::ListName(_)
                | TokenKind::MatrixName(_)
                | TokenKind::StringVar(_)
                | TokenKind::FunctionSlot(_)
        )
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Number(n) => write!(f, "{}", n),
            TokenKind::Str(s) => write!(f, "\"{}\"", s),
            TokenKind::Variable(s) => write!(f, "{}", s),
            TokenKind::ListName(s) => write!(f, "L{}", s),
            TokenKind::MatrixName(s) => write!(f, "[{}]", s),
            TokenKind::StringVar(i) => write!(f, "Str{}", i),
            TokenKind::FunctionSlot(i) => write!(f, "Y{}", i),
            TokenKind::Plus => write!(f, "+"),
            TokenKind::Minus => write!(f, "-"),
            TokenKind::Multiply => write!(f, "*"),
            TokenKind::Divide => write!(f, "/"),
            TokenKind::Power => write!(f, "^"),
            TokenKind::Negate => write!(f, "(-)"),
            TokenKind::Factorial => write!(f, "!"),
            TokenKind::NPr => write!(f, "nPr"),
            TokenKind::NCr => write!(f, "nCr"),
            TokenKind::Store => write!(f, "->"),
            TokenKind::Eq => write!(f, "="),
            TokenKind::Ne => write!(f, "!="),
            TokenKind::Lt => write!(f, "<"),
            TokenKind::Gt => write!(f, ">"),
            TokenKind::Le => write!(f, "<="),
            TokenKind::Ge => write!(f, ">="),
            TokenKind::And => write!(f, "and"),
            TokenKind::Or => write!(f, "or"),
            TokenKind::Xor => write!(f, "xor"),
            TokenKind::Not => write!(f, "not"),
            TokenKind::LParen => write!(f, "("),
            TokenKind::RParen => write!(f, ")"),
            TokenKind::LBracket => write!(f, "["),
            TokenKind::RBracket => write!(f, "]"),
            TokenKind::LBrace => write!(f, "{{"),
            TokenKind::RBrace => write!(f, "}}"),
            TokenKind::Comma => write!(f, ","),
            TokenKind::Function(b) => write!(f, "{:?}", b),
            TokenKind::Pi => write!(f, "pi"),
            TokenKind::EulerE => write!(f, "e"),
            TokenKind::ImaginaryI => write!(f, "i"),
            TokenKind::Ans => write!(f, "Ans"),
            TokenKind::ImplicitMultiply => write!(f, "*(implicit)"),
            TokenKind::Eof => write!(f, "EOF"),
        }
    }
}
