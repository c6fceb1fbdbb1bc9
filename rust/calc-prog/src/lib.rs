//! Program parser and interpreter crate: the procedural sub-language layered
//! on top of the expression evaluator (spec §4.7/§4.8).

pub mod interpreter;
pub mod io;
pub mod statement;

pub use interpreter::{execute, run_program};
pub use io::{IoCollaborator, NullIo};
pub use statement::{parse_program, Program, Statement};
