//! Built-in function dispatch (spec §4.5 "FunctionCall").
//!
//! `NDeriv`, `FnInt`, and `Seq` are not dispatched here: they need to
//! re-evaluate a sub-expression at many points, so `eval.rs` intercepts them
//! before arguments are reduced to `Value`s (see `eval::eval_function_call`).

use calc_core::{AngleUnit, CalcError, CalcResult, Matrix, State, Value};
use calc_kernels::{matrix as matrix_kernel, norm, stats};
use calc_lex::Builtin;

pub fn call(builtin: Builtin, args: Vec<Value>, state: &mut State) -> CalcResult<Value> {
    use Builtin::*;
    match builtin {
        Sin | Cos | Tan | Asin | Acos | Atan => angle_trig(builtin, one_arg(&args)?, state.modes().angle),
        Sinh => broadcast_unary(one_arg(&args)?, |x| Ok(x.sinh())),
        Cosh => broadcast_unary(one_arg(&args)?, |x| Ok(x.cosh())),
        Tanh => broadcast_unary(one_arg(&args)?, |x| Ok(x.tanh())),
        Asinh => broadcast_unary(one_arg(&args)?, |x| Ok(x.asinh())),
        Acosh => broadcast_unary(one_arg(&args)?, |x| Ok(x.acosh())),
        Atanh => broadcast_unary(one_arg(&args)?, |x| Ok(x.atanh())),
        Ln => broadcast_unary(one_arg(&args)?, |x| {
            if x <= 0.0 {
                Err(CalcError::Domain("ln requires a positive argument".to_string()))
            } else {
                Ok(x.ln())
            }
        }),
        Log => log(&args),
        Sqrt => broadcast_unary(one_arg(&args)?, |x| {
            if x < 0.0 {
                Err(CalcError::NonReal)
            } else {
                Ok(x.sqrt())
            }
        }),
        Abs => abs(one_arg(&args)?),
        Round => broadcast_unary(one_arg(&args)?, |x| Ok(x.round())),
        IPart => broadcast_unary(one_arg(&args)?, |x| Ok(x.trunc())),
        FPart => broadcast_unary(one_arg(&args)?, |x| Ok(x - x.trunc())),
        Sign => broadcast_unary(one_arg(&args)?, |x| Ok(if x == 0.0 { 0.0 } else { x.signum() })),

        Dim => dim(one_arg(&args)?),
        Sum => Ok(Value::Real(require_list(&one_arg(&args)?)?.iter().sum())),
        Prod => Ok(Value::Real(require_list(&one_arg(&args)?)?.iter().product())),
        Mean => {
            let list = require_list(&one_arg(&args)?)?;
            if list.is_empty() {
                return Err(CalcError::Stat("mean of an empty list".to_string()));
            }
            Ok(Value::Real(list.iter().sum::<f64>() / list.len() as f64))
        }
        Median => Ok(Value::Real(stats::one_var(&require_list(&one_arg(&args)?)?)?.median)),
        CumSum => {
            let list = require_list(&one_arg(&args)?)?;
            let mut running = 0.0;
            let out = list
                .into_iter()
                .map(|v| {
                    running += v;
                    running
                })
                .collect();
            Ok(Value::List(out))
        }
        Augment => augment(&args),
        Min => min_max(&args, true),
        Max => min_max(&args, false),
        Length => length(one_arg(&args)?),
        Sub => substring(&args),
        InString => in_string(&args),

        Det => Ok(Value::Real(matrix_kernel::determinant(require_matrix(&one_arg(&args)?)?)?)),
        Identity => {
            let n = one_arg(&args)?
                .as_int()
                .filter(|n| *n > 0)
                .ok_or_else(|| CalcError::Domain("identity requires a positive integer".to_string()))?;
            Ok(Value::Matrix(Matrix::identity(n as usize)))
        }
        Ref => Ok(Value::Matrix(matrix_kernel::ref_form(require_matrix(&one_arg(&args)?)?))),
        Rref => Ok(Value::Matrix(matrix_kernel::rref_form(require_matrix(&one_arg(&args)?)?))),
        Inverse => Ok(Value::Matrix(matrix_kernel::inverse(require_matrix(&one_arg(&args)?)?)?)),

        RandInt => rand_int(&args, state),
        RandNorm => rand_norm(&args, state),
        Rand => rand(&args, state),
        RandM => rand_m(&args, state),

        NDeriv | FnInt | Seq => unreachable!("intercepted before argument reduction in eval::eval_function_call"),
    }
}

fn one_arg(args: &[Value]) -> CalcResult<Value> {
    args.first()
        .cloned()
        .ok_or_else(|| CalcError::Argument("expected at least one argument".to_string()))
}

fn require_list(v: &Value) -> CalcResult<Vec<f64>> {
    v.as_list().ok_or_else(|| CalcError::DataType(format!("expected a list, got {}", v.type_name())))
}

fn require_matrix(v: &Value) -> CalcResult<&Matrix> {
    v.as_matrix().ok_or_else(|| CalcError::DataType(format!("expected a matrix, got {}", v.type_name())))
}

fn require_real(v: &Value) -> CalcResult<f64> {
    v.as_real().ok_or_else(|| CalcError::DataType(format!("expected a number, got {}", v.type_name())))
}

/// Applies `f` to a `Real`, or element-wise to a `List` (spec §4.5:
/// "Single-argument real functions broadcast over Lists automatically").
fn broadcast_unary(v: Value, f: impl Fn(f64) -> CalcResult<f64>) -> CalcResult<Value> {
    match v {
        Value::Real(r) => Ok(Value::Real(f(r)?)),
        Value::List(l) => Ok(Value::List(l.into_iter().map(f).collect::<CalcResult<Vec<_>>>()?)),
        other => Err(CalcError::DataType(format!("expected a number or list, got {}", other.type_name()))),
    }
}

fn angle_trig(builtin: Builtin, v: Value, angle: AngleUnit) -> CalcResult<Value> {
    use Builtin::*;
    match builtin {
        Sin => broadcast_unary(v, |x| Ok(angle.to_radians(x).sin())),
        Cos => broadcast_unary(v, |x| Ok(angle.to_radians(x).cos())),
        Tan => broadcast_unary(v, |x| {
            let rad = angle.to_radians(x);
            if rad.cos().abs() < 1e-14 {
                return Err(CalcError::Domain("tan is undefined at this angle".to_string()));
            }
            Ok(rad.tan())
        }),
        Asin => broadcast_unary(v, |x| {
            if !(-1.0..=1.0).contains(&x) {
                return Err(CalcError::Domain("asin requires an argument in [-1, 1]".to_string()));
            }
            Ok(angle.from_radians(x.asin()))
        }),
        Acos => broadcast_unary(v, |x| {
            if !(-1.0..=1.0).contains(&x) {
                return Err(CalcError::Domain("acos requires an argument in [-1, 1]".to_string()));
            }
            Ok(angle.from_radians(x.acos()))
        }),
        Atan => broadcast_unary(v, |x| Ok(angle.from_radians(x.atan()))),
        _ => unreachable!(),
    }
}

fn log(args: &[Value]) -> CalcResult<Value> {
    let x = require_real(args.first().ok_or_else(|| CalcError::Argument("log requires at least 1 argument".to_string()))?)?;
    if x <= 0.0 {
        return Err(CalcError::Domain("log requires a positive argument".to_string()));
    }
    match args.get(1) {
        None => Ok(Value::Real(x.log10())),
        Some(base_v) => {
            let base = require_real(base_v)?;
            if base <= 0.0 || base == 1.0 {
                return Err(CalcError::Domain("log base must be positive and not equal to 1".to_string()));
            }
            Ok(Value::Real(x.log(base)))
        }
    }
}

fn abs(v: Value) -> CalcResult<Value> {
    match v {
        Value::Real(r) => Ok(Value::Real(r.abs())),
        Value::Complex(re, im) => Ok(Value::Real((re * re + im * im).sqrt())),
        Value::List(l) => Ok(Value::List(l.into_iter().map(f64::abs).collect())),
        other => Err(CalcError::DataType(format!("expected a number or list, got {}", other.type_name()))),
    }
}

fn dim(v: Value) -> CalcResult<Value> {
    match v {
        Value::List(l) => Ok(Value::Real(l.len() as f64)),
        Value::Matrix(m) => Ok(Value::List(vec![m.nrows() as f64, m.ncols() as f64])),
        other => Err(CalcError::DataType(format!("expected a list or matrix, got {}", other.type_name()))),
    }
}

fn augment(args: &[Value]) -> CalcResult<Value> {
    let (a, b) = two_args(args)?;
    match (a, b) {
        (Value::List(mut a), Value::List(b)) => {
            a.extend(b);
            Ok(Value::List(a))
        }
        (Value::Matrix(a), Value::Matrix(b)) => {
            if a.nrows() != b.nrows() {
                return Err(CalcError::DimMismatch);
            }
            let rows = a
                .rows
                .iter()
                .zip(&b.rows)
                .map(|(ra, rb)| ra.iter().chain(rb).copied().collect())
                .collect();
            Ok(Value::Matrix(Matrix::new(rows)))
        }
        (a, b) => Err(CalcError::DataType(format!("cannot augment {} with {}", a.type_name(), b.type_name()))),
    }
}

fn min_max(args: &[Value], is_min: bool) -> CalcResult<Value> {
    let pick = |a: f64, b: f64| if is_min { a.min(b) } else { a.max(b) };
    match args.len() {
        1 => {
            let list = require_list(&args[0])?;
            list.into_iter()
                .reduce(pick)
                .map(Value::Real)
                .ok_or_else(|| CalcError::Stat("min/max of an empty list".to_string()))
        }
        2 => match (&args[0], &args[1]) {
            (Value::List(a), Value::List(b)) => {
                if a.len() != b.len() {
                    return Err(CalcError::DimMismatch);
                }
                Ok(Value::List(a.iter().zip(b).map(|(x, y)| pick(*x, *y)).collect()))
            }
            (Value::List(a), b) => {
                let scalar = require_real(b)?;
                Ok(Value::List(a.iter().map(|x| pick(*x, scalar)).collect()))
            }
            (a, Value::List(b)) => {
                let scalar = require_real(a)?;
                Ok(Value::List(b.iter().map(|y| pick(scalar, *y)).collect()))
            }
            (a, b) => Ok(Value::Real(pick(require_real(a)?, require_real(b)?))),
        },
        _ => Err(CalcError::Argument("min/max takes 1 or 2 arguments".to_string())),
    }
}

fn length(v: Value) -> CalcResult<Value> {
    match v {
        Value::List(l) => Ok(Value::Real(l.len() as f64)),
        Value::Str(s) => Ok(Value::Real(s.chars().count() as f64)),
        other => Err(CalcError::DataType(format!("expected a list or string, got {}", other.type_name()))),
    }
}

fn substring(args: &[Value]) -> CalcResult<Value> {
    if args.len() != 3 {
        return Err(CalcError::Argument("sub requires 3 arguments".to_string()));
    }
    let s = args[0].as_string().ok_or_else(|| CalcError::DataType("sub requires a string".to_string()))?;
    let start = require_real(&args[1])? as i64;
    let len = require_real(&args[2])? as i64;
    let chars: Vec<char> = s.chars().collect();
    if start < 1 || len < 0 || (start - 1 + len) as usize > chars.len() {
        return Err(CalcError::InvalidDim);
    }
    let slice: String = chars[(start - 1) as usize..(start - 1 + len) as usize].iter().collect();
    Ok(Value::Str(slice))
}

fn in_string(args: &[Value]) -> CalcResult<Value> {
    if args.len() < 2 || args.len() > 3 {
        return Err(CalcError::Argument("inString requires 2 or 3 arguments".to_string()));
    }
    let haystack = args[0].as_string().ok_or_else(|| CalcError::DataType("inString requires a string".to_string()))?;
    let needle = args[1].as_string().ok_or_else(|| CalcError::DataType("inString requires a string".to_string()))?;
    let start = match args.get(2) {
        Some(v) => (require_real(v)? as usize).max(1),
        None => 1,
    };
    let chars: Vec<char> = haystack.chars().collect();
    if start > chars.len() + 1 {
        return Ok(Value::Real(0.0));
    }
    let haystack_tail: String = chars[(start - 1)..].iter().collect();
    match haystack_tail.find(needle) {
        Some(byte_idx) => {
            let char_idx = haystack_tail[..byte_idx].chars().count();
            Ok(Value::Real((start + char_idx) as f64))
        }
        None => Ok(Value::Real(0.0)),
    }
}

fn two_args(args: &[Value]) -> CalcResult<(Value, Value)> {
    if args.len() != 2 {
        return Err(CalcError::Argument("expected exactly 2 arguments".to_string()));
    }
    Ok((args[0].clone(), args[1].clone()))
}

fn rand_int(args: &[Value], state: &mut State) -> CalcResult<Value> {
    if args.len() < 2 || args.len() > 3 {
        return Err(CalcError::Argument("randInt requires 2 or 3 arguments".to_string()));
    }
    let lo = require_real(&args[0])? as i64;
    let hi = require_real(&args[1])? as i64;
    if hi < lo {
        return Err(CalcError::Domain("randInt requires lo <= hi".to_string()));
    }
    match args.get(2) {
        None => Ok(Value::Real(state.random_int(lo, hi) as f64)),
        Some(count_v) => {
            let count = require_real(count_v)?.max(0.0) as usize;
            Ok(Value::List((0..count).map(|_| state.random_int(lo, hi) as f64).collect()))
        }
    }
}

fn rand_norm(args: &[Value], state: &mut State) -> CalcResult<Value> {
    if args.len() < 2 || args.len() > 3 {
        return Err(CalcError::Argument("randNorm requires 2 or 3 arguments".to_string()));
    }
    let mu = require_real(&args[0])?;
    let sigma = require_real(&args[1])?;
    let draw = |state: &mut State| mu + sigma * norm::inverse_normal_cdf(state.random_uniform());
    match args.get(2) {
        None => Ok(Value::Real(draw(state))),
        Some(count_v) => {
            let count = require_real(count_v)?.max(0.0) as usize;
            Ok(Value::List((0..count).map(|_| draw(state)).collect()))
        }
    }
}

fn rand(args: &[Value], state: &mut State) -> CalcResult<Value> {
    match args.first() {
        None => Ok(Value::Real(state.random_uniform())),
        Some(count_v) => {
            let count = require_real(count_v)?.max(0.0) as usize;
            Ok(Value::List((0..count).map(|_| state.random_uniform()).collect()))
        }
    }
}

fn rand_m(args: &[Value], state: &mut State) -> CalcResult<Value> {
    if args.len() != 2 {
        return Err(CalcError::Argument("randM requires 2 arguments".to_string()));
    }
    let rows = require_real(&args[0])?.max(1.0) as usize;
    let cols = require_real(&args[1])?.max(1.0) as usize;
    let data = (0..rows).map(|_| (0..cols).map(|_| state.random_int(0, 9) as f64).collect()).collect();
    Ok(Value::Matrix(Matrix::new(data)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use calc_core::State;

    #[test]
    fn sin_respects_degree_mode() {
        let mut state = State::new();
        state.modes_mut().angle = AngleUnit::Degree;
        let v = call(Builtin::Sin, vec![Value::Real(90.0)], &mut state).unwrap();
        assert!((v.as_real().unwrap() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn tan_at_pole_is_domain_error() {
        let mut state = State::new();
        state.modes_mut().angle = AngleUnit::Degree;
        assert_eq!(
            call(Builtin::Tan, vec![Value::Real(90.0)], &mut state),
            Err(CalcError::Domain("tan is undefined at this angle".to_string()))
        );
    }

    #[test]
    fn sqrt_of_negative_is_non_real() {
        let mut state = State::new();
        assert_eq!(call(Builtin::Sqrt, vec![Value::Real(-4.0)], &mut state), Err(CalcError::NonReal));
    }

    #[test]
    fn broadcasts_over_list() {
        let mut state = State::new();
        let v = call(Builtin::Abs, vec![Value::List(vec![-1.0, 2.0, -3.0])], &mut state).unwrap();
        assert_eq!(v, Value::List(vec![1.0, 2.0, 3.0]));
    }

    #[test]
    fn dim_of_matrix_returns_rows_cols() {
        let mut state = State::new();
        let m = Matrix::new(vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]]);
        let v = call(Builtin::Dim, vec![Value::Matrix(m)], &mut state).unwrap();
        assert_eq!(v, Value::List(vec![2.0, 3.0]));
    }

    #[test]
    fn sub_extracts_substring() {
        let mut state = State::new();
        let v = call(
            Builtin::Sub,
            vec![Value::Str("hello".into()), Value::Real(2.0), Value::Real(3.0)],
            &mut state,
        )
        .unwrap();
        assert_eq!(v, Value::Str("ell".into()));
    }

    #[test]
    fn rand_int_is_in_range() {
        let mut state = State::new();
        for _ in 0..20 {
            let v = call(Builtin::RandInt, vec![Value::Real(1.0), Value::Real(6.0)], &mut state).unwrap();
            let n = v.as_int().unwrap();
            assert!((1..=6).contains(&n));
        }
    }
}
