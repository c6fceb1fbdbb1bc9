//! Tokenizer crate: turns calculator source text into a `Vec<Token>` ready
//! for the parser.

pub mod lexer;
pub mod token;

pub use lexer::{tokenize, LexError};
pub use token::{Builtin, Span, Token, TokenKind};
