//! Renders a `CalcError` the way a person typing at the REPL expects: a
//! short category label, then the message, in color on a terminal.

use crate::colors::{bold, gray, red};
use calc_core::CalcError;

fn category(err: &CalcError) -> &'static str {
    match err {
        CalcError::Syntax(_) => "SYNTAX ERROR",
        CalcError::DivideByZero => "DIVIDE BY ZERO",
        CalcError::Overflow => "OVERFLOW",
        CalcError::Domain(_) => "DOMAIN ERROR",
        CalcError::DataType(_) => "DATA TYPE ERROR",
        CalcError::Argument(_) => "ARGUMENT ERROR",
        CalcError::DimMismatch => "DIMENSION MISMATCH",
        CalcError::Singular => "SINGULAR MATRIX",
        CalcError::Undefined(_) => "UNDEFINED",
        CalcError::InvalidDim => "INVALID DIMENSION",
        CalcError::Stat(_) => "STAT ERROR",
        CalcError::NonReal => "NONREAL ANSWER",
        CalcError::NoSignChange => "NO SIGN CHANGE",
        CalcError::LabelNotFound(_) => "LABEL NOT FOUND",
        CalcError::Break => "BREAK",
        CalcError::Iterations => "ITERATION LIMIT",
    }
}

/// Renders with ANSI color for an interactive terminal.
pub fn render_ansi(err: &CalcError) -> String {
    format!("{} {}", red(&bold(category(err))), gray(&err.to_string()))
}

/// Renders without color, for piping to a file or a non-terminal.
pub fn render_plain(err: &CalcError) -> String {
    format!("{}: {}", category(err), err)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_render_includes_category_and_message() {
        let rendered = render_plain(&CalcError::DivideByZero);
        assert_eq!(rendered, "DIVIDE BY ZERO: divide by zero");
    }
}
