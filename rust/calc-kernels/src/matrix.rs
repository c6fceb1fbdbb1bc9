//! Row reduction, inversion, determinant, multiplication, and integer power
//! (spec §4.6 "Matrix reduction").

use calc_core::{CalcError, CalcResult, Matrix};

/// Below this magnitude a pivot column is treated as structurally zero.
pub const PIVOT_THRESHOLD: f64 = 1e-14;

/// Row-echelon form via Gauss elimination with partial pivoting. Columns
/// whose best available pivot falls below [`PIVOT_THRESHOLD`] are skipped
/// rather than failing — `ref`/`rref` never error on a singular matrix.
pub fn ref_form(m: &Matrix) -> Matrix {
    let mut rows = m.rows.clone();
    let nrows = rows.len();
    let ncols = rows[0].len();
    let mut pivot_row = 0;

    for col in 0..ncols {
        if pivot_row >= nrows {
            break;
        }
        let best = (pivot_row..nrows)
            .max_by(|&a, &b| rows[a][col].abs().partial_cmp(&rows[b][col].abs()).unwrap())
            .unwrap();
        if rows[best][col].abs() < PIVOT_THRESHOLD {
            continue;
        }
        rows.swap(pivot_row, best);
        for r in (pivot_row + 1)..nrows {
            let factor = rows[r][col] / rows[pivot_row][col];
            if factor != 0.0 {
                for c in col..ncols {
                    rows[r][c] -= factor * rows[pivot_row][c];
                }
            }
        }
        pivot_row += 1;
    }
    Matrix::new(rows)
}

/// Reduced row-echelon form: forward eliminate as [`ref_form`] does, then
/// back-eliminate above each pivot and normalize pivots to 1.
pub fn rref_form(m: &Matrix) -> Matrix {
    let mut rows = ref_form(m).rows;
    let nrows = rows.len();
    let ncols = rows[0].len();
    let mut pivot_cols = Vec::new();

    let mut row = 0;
    for col in 0..ncols {
        if row >= nrows {
            break;
        }
        if rows[row][col].abs() >= PIVOT_THRESHOLD {
            pivot_cols.push((row, col));
            row += 1;
        }
    }

    for &(r, c) in &pivot_cols {
        let pivot = rows[r][c];
        for v in rows[r].iter_mut() {
            *v /= pivot;
        }
        for other in 0..nrows {
            if other == r {
                continue;
            }
            let factor = rows[other][c];
            if factor != 0.0 {
                for k in 0..ncols {
                    rows[other][k] -= factor * rows[r][k];
                }
            }
        }
    }
    Matrix::new(rows)
}

/// Matrix inverse by Gauss-Jordan elimination on `[M | I]`, failing with
/// [`CalcError::Singular`] if any pivot column falls below the threshold.
pub fn inverse(m: &Matrix) -> CalcResult<Matrix> {
    let n = m.nrows();
    if n != m.ncols() {
        return Err(CalcError::DimMismatch);
    }
    let mut aug: Vec<Vec<f64>> = m
        .rows
        .iter()
        .enumerate()
        .map(|(i, row)| {
            let mut r = row.clone();
            r.extend((0..n).map(|j| if i == j { 1.0 } else { 0.0 }));
            r
        })
        .collect();

    for col in 0..n {
        let best = (col..n)
            .max_by(|&a, &b| aug[a][col].abs().partial_cmp(&aug[b][col].abs()).unwrap())
            .unwrap();
        if aug[best][col].abs() < PIVOT_THRESHOLD {
            return Err(CalcError::Singular);
        }
        aug.swap(col, best);
        let pivot = aug[col][col];
        for v in aug[col].iter_mut() {
            *v /= pivot;
        }
        for r in 0..n {
            if r == col {
                continue;
            }
            let factor = aug[r][col];
            if factor != 0.0 {
                for k in 0..(2 * n) {
                    aug[r][k] -= factor * aug[col][k];
                }
            }
        }
    }

    let rows = aug.into_iter().map(|r| r[n..].to_vec()).collect();
    Ok(Matrix::new(rows))
}

/// Determinant via cofactor expansion along the first row. Acceptable for
/// the dimensions this core deals with; callers needing larger matrices
/// should expect `O(n!)` cost.
pub fn determinant(m: &Matrix) -> CalcResult<f64> {
    let n = m.nrows();
    if n != m.ncols() {
        return Err(CalcError::DimMismatch);
    }
    Ok(det_recursive(&m.rows))
}

fn det_recursive(rows: &[Vec<f64>]) -> f64 {
    let n = rows.len();
    if n == 1 {
        return rows[0][0];
    }
    if n == 2 {
        return rows[0][0] * rows[1][1] - rows[0][1] * rows[1][0];
    }
    let mut total = 0.0;
    for col in 0..n {
        if rows[0][col] == 0.0 {
            continue;
        }
        let minor: Vec<Vec<f64>> = rows[1..]
            .iter()
            .map(|row| {
                row.iter()
                    .enumerate()
                    .filter(|(c, _)| *c != col)
                    .map(|(_, v)| *v)
                    .collect()
            })
            .collect();
        let sign = if col % 2 == 0 { 1.0 } else { -1.0 };
        total += sign * rows[0][col] * det_recursive(&minor);
    }
    total
}

/// Standard `m×n * n×p` matrix product.
pub fn multiply(a: &Matrix, b: &Matrix) -> CalcResult<Matrix> {
    if a.ncols() != b.nrows() {
        return Err(CalcError::DimMismatch);
    }
    let (m, n, p) = (a.nrows(), a.ncols(), b.ncols());
    let mut rows = vec![vec![0.0; p]; m];
    for i in 0..m {
        for k in 0..n {
            let a_ik = a.rows[i][k];
            if a_ik == 0.0 {
                continue;
            }
            for j in 0..p {
                rows[i][j] += a_ik * b.rows[k][j];
            }
        }
    }
    Ok(Matrix::new(rows))
}

/// Repeated squaring for `Matrix ^ exponent` where `exponent` is a
/// non-negative integer; `0` yields the identity of the same size (spec
/// §4.5 "Matrix, Real").
pub fn power(m: &Matrix, exponent: u32) -> CalcResult<Matrix> {
    if m.nrows() != m.ncols() {
        return Err(CalcError::DimMismatch);
    }
    let mut result = Matrix::identity(m.nrows());
    let mut base = m.clone();
    let mut e = exponent;
    while e > 0 {
        if e & 1 == 1 {
            result = multiply(&result, &base)?;
        }
        e >>= 1;
        if e > 0 {
            base = multiply(&base, &base)?;
        }
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rref_of_identity_is_identity() {
        let m = Matrix::identity(3);
        let r = rref_form(&m);
        assert_eq!(r.rows, m.rows);
    }

    #[test]
    fn determinant_2x2() {
        let m = Matrix::new(vec![vec![1.0, 2.0], vec![3.0, 4.0]]);
        assert_eq!(determinant(&m).unwrap(), -2.0);
    }

    #[test]
    fn inverse_of_singular_fails() {
        let m = Matrix::new(vec![vec![1.0, 2.0], vec![2.0, 4.0]]);
        assert_eq!(inverse(&m), Err(CalcError::Singular));
    }

    #[test]
    fn inverse_round_trips_identity() {
        let m = Matrix::new(vec![vec![4.0, 7.0], vec![2.0, 6.0]]);
        let inv = inverse(&m).unwrap();
        let product = multiply(&m, &inv).unwrap();
        for i in 0..2 {
            for j in 0..2 {
                let expect = if i == j { 1.0 } else { 0.0 };
                assert!((product.rows[i][j] - expect).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn power_zero_is_identity() {
        let m = Matrix::new(vec![vec![2.0, 0.0], vec![0.0, 2.0]]);
        assert_eq!(power(&m, 0).unwrap().rows, Matrix::identity(2).rows);
    }

    #[test]
    fn power_matches_repeated_multiplication() {
        let m = Matrix::new(vec![vec![1.0, 1.0], vec![0.0, 1.0]]);
        let mut expected = m.clone();
        for _ in 1..5 {
            expected = multiply(&expected, &m).unwrap();
        }
        assert_eq!(power(&m, 5).unwrap().rows, expected.rows);
    }
}
