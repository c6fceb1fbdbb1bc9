//! Function-slot evaluation: `Y1`..`Y9`, `Y0` (spec §4.5.1).
//!
//! Evaluating a slot means re-parsing its stored text and walking it with
//! `X` temporarily rebound. Whatever `X` held before the call is restored
//! on every exit path, including an error return, by an RAII guard.

use crate::eval::eval;
use calc_core::{CalcError, CalcResult, State};

pub fn evaluate_slot(index: usize, x: f64, state: &mut State) -> CalcResult<f64> {
    if !state.slot_enabled(index) {
        return Err(CalcError::Undefined(format!("Y{index}")));
    }
    let text = state
        .slot_text(index)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| CalcError::Undefined(format!("Y{index}")))?
        .to_string();

    let tokens = calc_lex::tokenize(&text)?;
    let expr = calc_parse::parse(&tokens)?;

    let mut guard = XGuard::new(state);
    guard.state.set_var("X", x);
    let value = eval(&expr, guard.state)?;
    value
        .as_real()
        .ok_or_else(|| CalcError::DataType(format!("Y{index} did not evaluate to a real number")))
}

/// Restores the caller's `X` binding when dropped, regardless of how the
/// evaluation inside the guard's scope returns.
struct XGuard<'a> {
    state: &'a mut State,
    previous: f64,
}

impl<'a> XGuard<'a> {
    fn new(state: &'a mut State) -> Self {
        let previous = state.get_var("X");
        Self { state, previous }
    }
}

impl Drop for XGuard<'_> {
    fn drop(&mut self) {
        self.state.set_var("X", self.previous);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn evaluates_stored_expression_at_x() {
        let mut state = State::new();
        state.set_slot_text(1, "X^2".to_string());
        let v = evaluate_slot(1, 3.0, &mut state).unwrap();
        assert_eq!(v, 9.0);
    }

    #[test]
    fn restores_x_after_call_even_on_error() {
        let mut state = State::new();
        state.set_var("X", 7.0);
        state.set_slot_text(2, "1/0".to_string());
        assert!(evaluate_slot(2, 3.0, &mut state).is_err());
        assert_eq!(state.get_var("X"), 7.0);
    }

    #[test]
    fn disabled_slot_is_undefined() {
        let mut state = State::new();
        state.set_slot_text(3, "X".to_string());
        state.set_slot_enabled(3, false);
        assert_eq!(evaluate_slot(3, 1.0, &mut state), Err(CalcError::Undefined("Y3".to_string())));
    }
}
