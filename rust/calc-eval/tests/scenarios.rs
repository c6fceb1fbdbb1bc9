//! Cross-crate expression scenarios, named for the spec's scenario table.
//! Programs (S12, S13) live in calc-prog's own `tests/scenarios.rs`.

use calc_core::{CalcError, State, Value};

fn run(src: &str) -> Result<Value, CalcError> {
    let mut state = State::new();
    let tokens = calc_lex::tokenize(src)?;
    let expr = calc_parse::parse(&tokens)?;
    calc_eval::eval(&expr, &mut state)
}

#[test]
fn s1_precedence() {
    assert_eq!(run("2+3*4").unwrap(), Value::Real(14.0));
}

#[test]
fn s2_unary_minus_binds_looser_than_exponent() {
    assert_eq!(run("-3^2").unwrap(), Value::Real(-9.0));
}

#[test]
fn s3_exponent_is_right_associative() {
    let expected = 2f64.powf(81.0);
    match run("2^3^4").unwrap() {
        Value::Real(r) => assert!((r - expected).abs() < expected * 1e-9),
        other => panic!("expected Real, got {other:?}"),
    }
}

#[test]
fn s4_implicit_multiply_before_parenthesis() {
    assert_eq!(run("6/2(1+2)").unwrap(), Value::Real(9.0));
}

#[test]
fn s5_list_plus_list_elementwise() {
    assert_eq!(run("{1,2,3}+{10,20,30}").unwrap(), Value::List(vec![11.0, 22.0, 33.0]));
}

#[test]
fn s6_mismatched_list_lengths_fail() {
    assert_eq!(run("{1,2,3}+{1,2}"), Err(CalcError::DimMismatch));
}

#[test]
fn s7_store_then_read_by_name() {
    let mut state = State::new();
    // `:` only separates statements at the program layer (calc-prog), so
    // this scenario is exercised here as two separate expressions.
    let first = calc_lex::tokenize("42\u{2192}A").unwrap();
    let expr = calc_parse::parse(&first).unwrap();
    let result = calc_eval::eval(&expr, &mut state).unwrap();
    assert_eq!(result, Value::Real(42.0));
    assert_eq!(state.get_var("A"), 42.0);

    let second = calc_lex::tokenize("A+8").unwrap();
    let expr2 = calc_parse::parse(&second).unwrap();
    assert_eq!(calc_eval::eval(&expr2, &mut state).unwrap(), Value::Real(50.0));
    assert_eq!(state.get_var("A"), 42.0);
}

#[test]
fn s8_factorial() {
    assert_eq!(run("5!").unwrap(), Value::Real(120.0));
}

#[test]
fn s9_sin_in_degree_mode() {
    let mut state = State::new();
    state.modes_mut().angle = calc_core::AngleUnit::Degree;
    let tokens = calc_lex::tokenize("sin(0)").unwrap();
    let expr = calc_parse::parse(&tokens).unwrap();
    assert_eq!(calc_eval::eval(&expr, &mut state).unwrap(), Value::Real(0.0));
}

#[test]
fn s10_zero_to_the_zero_is_one() {
    assert_eq!(run("0^0").unwrap(), Value::Real(1.0));
}

#[test]
fn s11_divide_by_zero_fails() {
    assert_eq!(run("1/0"), Err(CalcError::DivideByZero));
}
