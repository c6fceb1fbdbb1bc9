//! Shared foundation for the calculator core: the tagged `Value`, the
//! `CalcError` taxonomy every crate's fallible surface returns, mode
//! settings, and the `State` façade the evaluator and interpreter operate
//! against.

pub mod error;
pub mod modes;
pub mod state;
pub mod value;

pub use error::{CalcError, CalcResult};
pub use modes::{AngleUnit, ComplexFormat, GraphWindow, Modes, NumberFormat};
pub use state::{FunctionSlot, HistoryEntry, Snapshot, State, LIST_NAMES, MATRIX_NAMES, SLOT_COUNT};
pub use value::{Matrix, Value};
