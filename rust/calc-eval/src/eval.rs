//! Tree-walking evaluator (spec §4.5 "Evaluator").
//!
//! `eval` recurses over the AST once per call; there is no bytecode and no
//! cached intermediate form. `State` is threaded through by `&mut` reference
//! rather than owned, so the same evaluation can be driven by a REPL, a
//! running program, or a test, without the evaluator caring which.

use crate::{broadcast, functions, slot};
use calc_core::{CalcError, CalcResult, Matrix, State, Value};
use calc_lex::Builtin;
use calc_parse::{BinOp, Expr, PostfixOp, PrefixOp};

pub fn eval(expr: &Expr, state: &mut State) -> CalcResult<Value> {
    match expr {
        Expr::Number(n) => Ok(Value::Real(*n)),
        Expr::Str(s) => Ok(Value::Str(s.clone())),
        Expr::Pi => Ok(Value::Real(std::f64::consts::PI)),
        Expr::EulerE => Ok(Value::Real(std::f64::consts::E)),
        Expr::ImaginaryI => Ok(Value::Complex(0.0, 1.0)),
        Expr::Ans => Ok(state.ans()),

        Expr::Variable(name) => {
            let (re, im) = state.get_complex_var(name);
            Ok(if im == 0.0 { Value::Real(re) } else { Value::Complex(re, im) })
        }
        Expr::ListVar(name) => Ok(Value::List(state.get_list(name)?)),
        Expr::MatrixVar(name) => Ok(Value::Matrix(state.get_matrix(name)?)),
        Expr::StringVar(idx) => Ok(Value::Str(state.get_string(&string_var_name(*idx))?)),
        Expr::FunctionSlot(idx) => {
            let x = state.get_var("X");
            Ok(Value::Real(slot::evaluate_slot(*idx as usize, x, state)?))
        }

        Expr::Binary(op, l, r) => {
            let lv = eval(l, state)?;
            let rv = eval(r, state)?;
            broadcast::binary(*op, lv, rv)
        }
        Expr::UnaryPrefix(PrefixOp::Negate, e) => negate(eval(e, state)?),
        Expr::UnaryPrefix(PrefixOp::Not, e) => logical_not(eval(e, state)?),
        Expr::UnaryPostfix(e, PostfixOp::Factorial) => factorial(eval(e, state)?),

        Expr::FunctionCall(builtin, args) => eval_function_call(*builtin, args, state),

        Expr::ListLiteral(items) => {
            let reals = items
                .iter()
                .map(|e| require_real(eval(e, state)?))
                .collect::<CalcResult<Vec<_>>>()?;
            Ok(Value::List(reals))
        }
        Expr::MatrixLiteral(rows) => {
            let mut out = Vec::with_capacity(rows.len());
            for row in rows {
                let reals = row
                    .iter()
                    .map(|e| require_real(eval(e, state)?))
                    .collect::<CalcResult<Vec<_>>>()?;
                out.push(reals);
            }
            Matrix::try_new(out).map(Value::Matrix).ok_or(CalcError::DimMismatch)
        }

        Expr::ElementAccess(base, indices) => eval_element_access(base, indices, state),
        Expr::Store(value_expr, target) => eval_store(value_expr, target, state),

        Expr::ImplicitMul(l, r) => {
            let lv = eval(l, state)?;
            let rv = eval(r, state)?;
            broadcast::binary(BinOp::Mul, lv, rv)
        }
    }
}

fn string_var_name(idx: u8) -> String {
    format!("Str{idx}")
}

fn require_real(v: Value) -> CalcResult<f64> {
    v.as_real().ok_or_else(|| CalcError::DataType(format!("expected a real number, got {}", v.type_name())))
}

fn negate(v: Value) -> CalcResult<Value> {
    match v {
        Value::Real(r) => Ok(Value::Real(-r)),
        Value::Complex(re, im) => Ok(Value::Complex(-re, -im)),
        Value::List(l) => Ok(Value::List(l.into_iter().map(|x| -x).collect())),
        Value::Matrix(m) => Ok(Value::Matrix(Matrix::new(
            m.rows.iter().map(|r| r.iter().map(|x| -x).collect()).collect(),
        ))),
        other => Err(CalcError::DataType(format!("cannot negate {}", other.type_name()))),
    }
}

fn logical_not(v: Value) -> CalcResult<Value> {
    let r = require_real(v)?;
    Ok(Value::Real(if r == 0.0 { 1.0 } else { 0.0 }))
}

fn factorial(v: Value) -> CalcResult<Value> {
    let n = v
        .as_int()
        .ok_or_else(|| CalcError::DataType(format!("cannot apply factorial to {}", v.type_name())))?;
    Ok(Value::Real(calc_kernels::combinatorics::factorial(n)?))
}

fn eval_function_call(builtin: Builtin, args: &[Expr], state: &mut State) -> CalcResult<Value> {
    match builtin {
        Builtin::NDeriv => eval_nderiv(args, state),
        Builtin::FnInt => eval_fnint(args, state),
        Builtin::Seq => eval_seq(args, state),
        _ => {
            let values = args.iter().map(|e| eval(e, state)).collect::<CalcResult<Vec<_>>>()?;
            functions::call(builtin, values, state)
        }
    }
}

fn variable_name(e: &Expr) -> CalcResult<&str> {
    match e {
        Expr::Variable(name) => Ok(name),
        _ => Err(CalcError::Syntax("expected a bare variable name".to_string())),
    }
}

/// `nDeriv(expr, var, x[, h])`: symmetric-difference derivative of `expr`
/// with respect to `var`, evaluated at `x`.
fn eval_nderiv(args: &[Expr], state: &mut State) -> CalcResult<Value> {
    if args.len() < 3 || args.len() > 4 {
        return Err(CalcError::Argument("nDeriv requires 3 or 4 arguments".to_string()));
    }
    let var = variable_name(&args[1])?.to_string();
    let x = require_real(eval(&args[2], state)?)?;
    let h = match args.get(3) {
        Some(e) => require_real(eval(e, state)?)?,
        None => 0.0,
    };

    let previous = state.get_var(&var);
    let mut err = None;
    let result = calc_kernels::calculus::symmetric_difference(
        |v| {
            if err.is_some() {
                return f64::NAN;
            }
            state.set_var(&var, v);
            match eval(&args[0], state) {
                Ok(val) => val.as_real().unwrap_or(f64::NAN),
                Err(e) => {
                    err = Some(e);
                    f64::NAN
                }
            }
        },
        x,
        h,
    );
    state.set_var(&var, previous);
    if let Some(e) = err {
        return Err(e);
    }
    Ok(Value::Real(result))
}

/// `fnInt(expr, var, lower, upper)`: composite Simpson integral of `expr`
/// over `[lower, upper]`.
fn eval_fnint(args: &[Expr], state: &mut State) -> CalcResult<Value> {
    if args.len() != 4 {
        return Err(CalcError::Argument("fnInt requires 4 arguments".to_string()));
    }
    let var = variable_name(&args[1])?.to_string();
    let a = require_real(eval(&args[2], state)?)?;
    let b = require_real(eval(&args[3], state)?)?;

    let previous = state.get_var(&var);
    let mut err = None;
    let result = calc_kernels::integrate::simpson(
        |v| {
            if err.is_some() {
                return f64::NAN;
            }
            state.set_var(&var, v);
            match eval(&args[0], state) {
                Ok(val) => val.as_real().unwrap_or(f64::NAN),
                Err(e) => {
                    err = Some(e);
                    f64::NAN
                }
            }
        },
        a,
        b,
        calc_kernels::integrate::DEFAULT_SUBDIVISIONS,
    );
    state.set_var(&var, previous);
    if let Some(e) = err {
        return Err(e);
    }
    Ok(Value::Real(result))
}

/// `seq(expr, var, start, end[, step])`. When `expr` is literally the loop
/// variable, the closed-form `arithmetic_progression` avoids re-entering the
/// evaluator at every point; otherwise `expr` is re-evaluated once per step.
fn eval_seq(args: &[Expr], state: &mut State) -> CalcResult<Value> {
    if args.len() < 4 || args.len() > 5 {
        return Err(CalcError::Argument("seq requires 4 or 5 arguments".to_string()));
    }
    let var = variable_name(&args[1])?.to_string();
    let start = require_real(eval(&args[2], state)?)?;
    let end = require_real(eval(&args[3], state)?)?;
    let step = match args.get(4) {
        Some(e) => require_real(eval(e, state)?)?,
        None if end >= start => 1.0,
        None => -1.0,
    };

    let points = calc_kernels::plot::arithmetic_progression(start, end, step);

    if matches!(&args[0], Expr::Variable(name) if name == &var) {
        return Ok(Value::List(points));
    }

    let previous = state.get_var(&var);
    let mut out = Vec::with_capacity(points.len());
    for v in points {
        state.set_var(&var, v);
        match eval(&args[0], state).and_then(require_real) {
            Ok(r) => out.push(r),
            Err(e) => {
                state.set_var(&var, previous);
                return Err(e);
            }
        }
    }
    state.set_var(&var, previous);
    Ok(Value::List(out))
}

fn eval_element_access(base: &Expr, indices: &[Expr], state: &mut State) -> CalcResult<Value> {
    if let Expr::FunctionSlot(idx) = base {
        if indices.len() != 1 {
            return Err(CalcError::Argument("a function slot takes exactly 1 argument".to_string()));
        }
        let x = require_real(eval(&indices[0], state)?)?;
        return Ok(Value::Real(slot::evaluate_slot(*idx as usize, x, state)?));
    }

    let base_value = eval(base, state)?;
    match (&base_value, indices.len()) {
        (Value::List(l), 1) => {
            let i = index_arg(&indices[0], state)?;
            l.get(i - 1).copied().map(Value::Real).ok_or(CalcError::InvalidDim)
        }
        (Value::Matrix(m), 2) => {
            let i = index_arg(&indices[0], state)?;
            let j = index_arg(&indices[1], state)?;
            m.get(i - 1, j - 1).map(Value::Real).ok_or(CalcError::InvalidDim)
        }
        (Value::Str(s), 1) => {
            let i = index_arg(&indices[0], state)?;
            s.chars().nth(i - 1).map(|c| Value::Str(c.to_string())).ok_or(CalcError::InvalidDim)
        }
        _ => Err(CalcError::DataType(format!(
            "cannot index into {} with {} index/indices",
            base_value.type_name(),
            indices.len()
        ))),
    }
}

/// Evaluates a 1-based index expression, rejecting anything less than 1.
fn index_arg(e: &Expr, state: &mut State) -> CalcResult<usize> {
    let i = eval(e, state)?
        .as_int()
        .ok_or_else(|| CalcError::DataType("index must be an integer".to_string()))?;
    if i < 1 {
        return Err(CalcError::InvalidDim);
    }
    Ok(i as usize)
}

fn eval_store(value_expr: &Expr, target: &Expr, state: &mut State) -> CalcResult<Value> {
    let value = eval(value_expr, state)?;
    match target {
        Expr::Variable(name) => {
            match &value {
                Value::Real(r) => state.set_var(name, *r),
                Value::Complex(re, im) => state.set_complex_var(name, *re, *im),
                other => return Err(CalcError::DataType(format!("cannot store {} into a scalar variable", other.type_name()))),
            }
            Ok(value)
        }
        Expr::ListVar(name) => {
            let list = value
                .as_list()
                .ok_or_else(|| CalcError::DataType(format!("cannot store {} into a list", value.type_name())))?;
            state.set_list(name, list);
            Ok(value)
        }
        Expr::MatrixVar(name) => match &value {
            Value::Matrix(m) => {
                state.set_matrix(name, m.clone());
                Ok(value)
            }
            other => Err(CalcError::DataType(format!("cannot store {} into a matrix", other.type_name()))),
        },
        Expr::StringVar(idx) => match &value {
            Value::Str(s) => {
                state.set_string(&string_var_name(*idx), s.clone());
                Ok(value)
            }
            other => Err(CalcError::DataType(format!("cannot store {} into a string variable", other.type_name()))),
        },
        Expr::ElementAccess(base, indices) => {
            let r = value
                .as_real()
                .ok_or_else(|| CalcError::DataType("can only store a real number into an element".to_string()))?;
            match (base.as_ref(), indices.len()) {
                (Expr::ListVar(name), 1) => {
                    let i = index_arg(&indices[0], state)?;
                    state.set_list_element(name, i, r)?;
                }
                (Expr::MatrixVar(name), 2) => {
                    let i = index_arg(&indices[0], state)?;
                    let j = index_arg(&indices[1], state)?;
                    state.set_matrix_element(name, i, j, r)?;
                }
                _ => return Err(CalcError::Syntax("invalid store target".to_string())),
            }
            Ok(value)
        }
        _ => Err(CalcError::Syntax("invalid store target".to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(src: &str, state: &mut State) -> CalcResult<Value> {
        let tokens = calc_lex::tokenize(src).unwrap();
        let expr = calc_parse::parse(&tokens).unwrap();
        eval(&expr, state)
    }

    #[test]
    fn arithmetic_precedence() {
        let mut state = State::new();
        assert_eq!(run("2+3*4", &mut state).unwrap(), Value::Real(14.0));
    }

    #[test]
    fn store_into_variable_then_read_back() {
        let mut state = State::new();
        run("5\u{2192}A", &mut state).unwrap();
        assert_eq!(run("A*2", &mut state).unwrap(), Value::Real(10.0));
    }

    #[test]
    fn list_literal_and_element_access() {
        let mut state = State::new();
        let v = run("{1,2,3}", &mut state).unwrap();
        assert_eq!(v, Value::List(vec![1.0, 2.0, 3.0]));
        run("{10,20,30}\u{2192}L1", &mut state).unwrap();
        assert_eq!(run("L1(2)", &mut state).unwrap(), Value::Real(20.0));
    }

    #[test]
    fn matrix_literal_is_rectangular() {
        let mut state = State::new();
        let v = run("[[1,2][3,4]]", &mut state).unwrap();
        assert_eq!(v, Value::Matrix(Matrix::new(vec![vec![1.0, 2.0], vec![3.0, 4.0]])));
    }

    #[test]
    fn function_slot_restores_x() {
        let mut state = State::new();
        state.set_var("X", 99.0);
        state.set_slot_text(1, "2*X".to_string());
        let v = run("Y1(5)", &mut state).unwrap();
        assert_eq!(v, Value::Real(10.0));
        assert_eq!(state.get_var("X"), 99.0);
    }

    #[test]
    fn nderiv_of_square_matches_2x() {
        let mut state = State::new();
        let v = run("nDeriv(X^2,X,3)", &mut state).unwrap();
        assert!((v.as_real().unwrap() - 6.0).abs() < 1e-3);
    }

    #[test]
    fn fnint_of_x_squared() {
        let mut state = State::new();
        let v = run("fnInt(X^2,X,0,3)", &mut state).unwrap();
        assert!((v.as_real().unwrap() - 9.0).abs() < 1e-6);
    }

    #[test]
    fn seq_squares_its_expression() {
        let mut state = State::new();
        let v = run("seq(X^2,X,1,4,1)", &mut state).unwrap();
        assert_eq!(v, Value::List(vec![1.0, 4.0, 9.0, 16.0]));
    }

    #[test]
    fn factorial_of_negative_is_domain_error() {
        let mut state = State::new();
        assert!(run("(-1)!", &mut state).is_err());
    }

    #[test]
    fn invalid_store_target_is_syntax_error() {
        let mut state = State::new();
        assert_eq!(run("5\u{2192}(1+1)", &mut state), Err(CalcError::Syntax("invalid store target".to_string())));
    }
}
