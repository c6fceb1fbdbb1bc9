//! Binary-operator broadcasting over scalars, lists, and matrices
//! (spec §4.5 "Broadcasting").

use calc_core::{CalcError, CalcResult, Matrix, Value};
use calc_kernels::{combinatorics, matrix as matrix_kernel};
use calc_parse::BinOp;

pub fn binary(op: BinOp, left: Value, right: Value) -> CalcResult<Value> {
    match (&left, &right) {
        (Value::List(a), Value::List(b)) => {
            if a.len() != b.len() {
                return Err(CalcError::DimMismatch);
            }
            let mut out = Vec::with_capacity(a.len());
            for (x, y) in a.iter().zip(b) {
                out.push(scalar_real(op, *x, *y)?);
            }
            Ok(Value::List(out))
        }
        (Value::List(a), Value::Real(b)) => {
            let out = a.iter().map(|x| scalar_real(op, *x, *b)).collect::<CalcResult<Vec<_>>>()?;
            Ok(Value::List(out))
        }
        (Value::Real(a), Value::List(b)) => {
            let out = b.iter().map(|y| scalar_real(op, *a, *y)).collect::<CalcResult<Vec<_>>>()?;
            Ok(Value::List(out))
        }
        (Value::Matrix(a), Value::Matrix(b)) => matrix_matrix(op, a, b),
        (Value::Matrix(a), Value::Real(b)) => matrix_scalar(op, a, *b),
        (Value::Real(a), Value::Matrix(b)) => scalar_matrix(op, *a, b),
        (Value::Str(a), Value::Str(b)) => match op {
            BinOp::Add => Ok(Value::Str(format!("{a}{b}"))),
            _ => Err(CalcError::DataType(format!("cannot apply {op:?} to two strings"))),
        },
        _ => scalar_value_binary(op, &left, &right),
    }
}

fn matrix_matrix(op: BinOp, a: &Matrix, b: &Matrix) -> CalcResult<Value> {
    match op {
        BinOp::Add | BinOp::Sub => {
            if a.nrows() != b.nrows() || a.ncols() != b.ncols() {
                return Err(CalcError::DimMismatch);
            }
            let rows = a
                .rows
                .iter()
                .zip(&b.rows)
                .map(|(ra, rb)| {
                    ra.iter()
                        .zip(rb)
                        .map(|(x, y)| if op == BinOp::Add { x + y } else { x - y })
                        .collect()
                })
                .collect();
            Ok(Value::Matrix(Matrix::new(rows)))
        }
        BinOp::Mul => matrix_kernel::multiply(a, b).map(Value::Matrix),
        _ => Err(CalcError::DataType(format!("cannot apply {op:?} between two matrices"))),
    }
}

fn matrix_scalar(op: BinOp, a: &Matrix, b: f64) -> CalcResult<Value> {
    match op {
        BinOp::Mul => Ok(Value::Matrix(Matrix::new(
            a.rows.iter().map(|r| r.iter().map(|v| v * b).collect()).collect(),
        ))),
        BinOp::Div => {
            if b == 0.0 {
                return Err(CalcError::DivideByZero);
            }
            Ok(Value::Matrix(Matrix::new(
                a.rows.iter().map(|r| r.iter().map(|v| v / b).collect()).collect(),
            )))
        }
        BinOp::Pow => {
            if a.nrows() != a.ncols() {
                return Err(CalcError::DimMismatch);
            }
            let exponent = Value::Real(b)
                .as_int()
                .filter(|n| *n >= 0)
                .ok_or_else(|| CalcError::Domain("matrix exponent must be a non-negative integer".to_string()))?;
            matrix_kernel::power(a, exponent as u32).map(Value::Matrix)
        }
        _ => Err(CalcError::DataType(format!("cannot apply {op:?} between a matrix and a scalar"))),
    }
}

fn scalar_matrix(op: BinOp, a: f64, b: &Matrix) -> CalcResult<Value> {
    match op {
        BinOp::Mul => Ok(Value::Matrix(Matrix::new(
            b.rows.iter().map(|r| r.iter().map(|v| v * a).collect()).collect(),
        ))),
        _ => Err(CalcError::DataType(format!("cannot apply {op:?} between a scalar and a matrix"))),
    }
}

fn scalar_value_binary(op: BinOp, left: &Value, right: &Value) -> CalcResult<Value> {
    if matches!(op, BinOp::NPr | BinOp::NCr) {
        let a = left
            .as_int()
            .ok_or_else(|| CalcError::DataType(format!("expected an integer, got {}", left.type_name())))?;
        let b = right
            .as_int()
            .ok_or_else(|| CalcError::DataType(format!("expected an integer, got {}", right.type_name())))?;
        let v = match op {
            BinOp::NPr => combinatorics::permutation(a, b)?,
            BinOp::NCr => combinatorics::combination(a, b)?,
            _ => unreachable!(),
        };
        return Ok(Value::Real(v));
    }

    if let (Some(a), Some(b)) = (left.as_real(), right.as_real()) {
        return real_scalar(op, a, b).map(Value::Real);
    }

    if matches!(op, BinOp::Add | BinOp::Sub | BinOp::Mul | BinOp::Div | BinOp::Pow) {
        let (ar, ai) = left
            .as_complex()
            .ok_or_else(|| CalcError::DataType(format!("expected a number, got {}", left.type_name())))?;
        let (br, bi) = right
            .as_complex()
            .ok_or_else(|| CalcError::DataType(format!("expected a number, got {}", right.type_name())))?;
        let (re, im) = complex_arith(op, ar, ai, br, bi)?;
        return Ok(if im.abs() < 1e-12 { Value::Real(re) } else { Value::Complex(re, im) });
    }

    Err(CalcError::DataType(format!(
        "cannot apply {op:?} to {} and {}",
        left.type_name(),
        right.type_name()
    )))
}

fn real_scalar(op: BinOp, a: f64, b: f64) -> CalcResult<f64> {
    use BinOp::*;
    Ok(match op {
        Add => a + b,
        Sub => a - b,
        Mul => a * b,
        Div => {
            if b == 0.0 {
                return Err(CalcError::DivideByZero);
            }
            a / b
        }
        Pow => {
            let r = a.powf(b);
            if !r.is_finite() && a.is_finite() && b.is_finite() {
                return Err(CalcError::Overflow);
            }
            r
        }
        Eq => bool_to_f64(a == b),
        Ne => bool_to_f64(a != b),
        Lt => bool_to_f64(a < b),
        Gt => bool_to_f64(a > b),
        Le => bool_to_f64(a <= b),
        Ge => bool_to_f64(a >= b),
        And => bool_to_f64(a != 0.0 && b != 0.0),
        Or => bool_to_f64(a != 0.0 || b != 0.0),
        Xor => bool_to_f64((a != 0.0) != (b != 0.0)),
        NPr | NCr => unreachable!("handled before reaching real_scalar"),
    })
}

fn complex_arith(op: BinOp, ar: f64, ai: f64, br: f64, bi: f64) -> CalcResult<(f64, f64)> {
    Ok(match op {
        BinOp::Add => (ar + br, ai + bi),
        BinOp::Sub => (ar - br, ai - bi),
        BinOp::Mul => (ar * br - ai * bi, ar * bi + ai * br),
        BinOp::Div => {
            let denom = br * br + bi * bi;
            if denom == 0.0 {
                return Err(CalcError::DivideByZero);
            }
            ((ar * br + ai * bi) / denom, (ai * br - ar * bi) / denom)
        }
        BinOp::Pow => {
            let r = (ar * ar + ai * ai).sqrt();
            if r == 0.0 {
                return Ok((0.0, 0.0));
            }
            let theta = ai.atan2(ar);
            let log_re = r.ln();
            let exp_re = log_re * br - theta * bi;
            let exp_im = log_re * bi + theta * br;
            let mag = exp_re.exp();
            (mag * exp_im.cos(), mag * exp_im.sin())
        }
        _ => return Err(CalcError::DataType("comparison and logical operators are not defined for complex values".to_string())),
    })
}

fn bool_to_f64(b: bool) -> f64 {
    if b {
        1.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_list_elementwise() {
        let v = binary(BinOp::Add, Value::List(vec![1.0, 2.0]), Value::List(vec![10.0, 20.0])).unwrap();
        assert_eq!(v, Value::List(vec![11.0, 22.0]));
    }

    #[test]
    fn list_list_length_mismatch_is_dim_mismatch() {
        assert_eq!(
            binary(BinOp::Add, Value::List(vec![1.0]), Value::List(vec![1.0, 2.0])),
            Err(CalcError::DimMismatch)
        );
    }

    #[test]
    fn scalar_broadcasts_over_list() {
        let v = binary(BinOp::Mul, Value::Real(2.0), Value::List(vec![1.0, 2.0, 3.0])).unwrap();
        assert_eq!(v, Value::List(vec![2.0, 4.0, 6.0]));
    }

    #[test]
    fn matrix_multiply_dimension_mismatch() {
        let a = Matrix::new(vec![vec![1.0, 2.0]]);
        let b = Matrix::new(vec![vec![1.0, 2.0]]);
        assert_eq!(binary(BinOp::Mul, Value::Matrix(a), Value::Matrix(b)), Err(CalcError::DimMismatch));
    }

    #[test]
    fn divide_by_zero() {
        assert_eq!(binary(BinOp::Div, Value::Real(1.0), Value::Real(0.0)), Err(CalcError::DivideByZero));
    }

    #[test]
    fn string_concatenation() {
        let v = binary(BinOp::Add, Value::Str("a".into()), Value::Str("b".into())).unwrap();
        assert_eq!(v, Value::Str("ab".into()));
    }

    #[test]
    fn matrix_power_zero_is_identity() {
        let a = Matrix::new(vec![vec![2.0, 0.0], vec![0.0, 2.0]]);
        let v = binary(BinOp::Pow, Value::Matrix(a), Value::Real(0.0)).unwrap();
        assert_eq!(v, Value::Matrix(Matrix::identity(2)));
    }

    #[test]
    fn complex_multiplication() {
        let v = binary(BinOp::Mul, Value::Complex(0.0, 1.0), Value::Complex(0.0, 1.0)).unwrap();
        assert_eq!(v, Value::Real(-1.0));
    }
}
