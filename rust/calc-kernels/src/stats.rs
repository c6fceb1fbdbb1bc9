//! One- and two-variable statistics plus regressions (spec §4.6
//! "Statistics").

use calc_core::{CalcError, CalcResult};

#[derive(Debug, Clone, PartialEq)]
pub struct OneVarStats {
    pub n: usize,
    pub sum: f64,
    pub sum_sq: f64,
    pub mean: f64,
    pub sample_stddev: f64,
    pub population_stddev: f64,
    pub min: f64,
    pub max: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TwoVarStats {
    pub x: OneVarStats,
    pub y: OneVarStats,
    pub sum_xy: f64,
}

/// Linearly-interpolated quantile at a fractional rank (spec §4.6: quartiles
/// sit at `0.25*(n-1)`, `0.5*(n-1)`, `0.75*(n-1)` into the sorted data).
fn interpolated(sorted: &[f64], rank: f64) -> f64 {
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    if lo == hi {
        return sorted[lo];
    }
    let frac = rank - lo as f64;
    sorted[lo] + frac * (sorted[hi] - sorted[lo])
}

pub fn one_var(data: &[f64]) -> CalcResult<OneVarStats> {
    if data.is_empty() {
        return Err(CalcError::Stat("empty data set".to_string()));
    }
    let n = data.len();
    let sum: f64 = data.iter().sum();
    let sum_sq: f64 = data.iter().map(|v| v * v).sum();
    let mean = sum / n as f64;
    let variance_sum: f64 = data.iter().map(|v| (v - mean).powi(2)).sum();
    let sample_stddev = if n > 1 { (variance_sum / (n as f64 - 1.0)).sqrt() } else { 0.0 };
    let population_stddev = (variance_sum / n as f64).sqrt();

    let mut sorted = data.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap());
    let last = n as f64 - 1.0;

    Ok(OneVarStats {
        n,
        sum,
        sum_sq,
        mean,
        sample_stddev,
        population_stddev,
        min: sorted[0],
        max: sorted[n - 1],
        q1: interpolated(&sorted, 0.25 * last),
        median: interpolated(&sorted, 0.5 * last),
        q3: interpolated(&sorted, 0.75 * last),
    })
}

pub fn two_var(xs: &[f64], ys: &[f64]) -> CalcResult<TwoVarStats> {
    if xs.len() != ys.len() {
        return Err(CalcError::DimMismatch);
    }
    let sum_xy: f64 = xs.iter().zip(ys).map(|(x, y)| x * y).sum();
    Ok(TwoVarStats {
        x: one_var(xs)?,
        y: one_var(ys)?,
        sum_xy,
    })
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Regression {
    pub coefficients: [f64; 3],
    pub r: Option<f64>,
    pub r_squared: f64,
}

fn correlation(xs: &[f64], ys: &[f64]) -> CalcResult<f64> {
    let n = xs.len() as f64;
    let mean_x = xs.iter().sum::<f64>() / n;
    let mean_y = ys.iter().sum::<f64>() / n;
    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (x, y) in xs.iter().zip(ys) {
        cov += (x - mean_x) * (y - mean_y);
        var_x += (x - mean_x).powi(2);
        var_y += (y - mean_y).powi(2);
    }
    if var_x == 0.0 || var_y == 0.0 {
        return Err(CalcError::Stat("zero variance in regression input".to_string()));
    }
    Ok(cov / (var_x.sqrt() * var_y.sqrt()))
}

/// Linear least squares: `y = a + b*x`.
pub fn linear(xs: &[f64], ys: &[f64]) -> CalcResult<Regression> {
    if xs.len() != ys.len() || xs.len() < 2 {
        return Err(CalcError::Stat("linear regression needs at least 2 points".to_string()));
    }
    let n = xs.len() as f64;
    let sum_x: f64 = xs.iter().sum();
    let sum_y: f64 = ys.iter().sum();
    let sum_xy: f64 = xs.iter().zip(ys).map(|(x, y)| x * y).sum();
    let sum_xx: f64 = xs.iter().map(|x| x * x).sum();
    let denom = n * sum_xx - sum_x * sum_x;
    if denom == 0.0 {
        return Err(CalcError::Singular);
    }
    let b = (n * sum_xy - sum_x * sum_y) / denom;
    let a = (sum_y - b * sum_x) / n;
    let r = correlation(xs, ys)?;
    Ok(Regression {
        coefficients: [a, b, 0.0],
        r: Some(r),
        r_squared: r * r,
    })
}

/// Quadratic fit `y = a + b*x + c*x^2` via the normal equations.
pub fn quadratic(xs: &[f64], ys: &[f64]) -> CalcResult<Regression> {
    if xs.len() != ys.len() || xs.len() < 3 {
        return Err(CalcError::Stat("quadratic regression needs at least 3 points".to_string()));
    }
    let n = xs.len() as f64;
    let (mut s1, mut s2, mut s3, mut s4) = (0.0, 0.0, 0.0, 0.0);
    let (mut sy, mut sxy, mut sx2y) = (0.0, 0.0, 0.0);
    for (x, y) in xs.iter().zip(ys) {
        let x2 = x * x;
        s1 += x;
        s2 += x2;
        s3 += x2 * x;
        s4 += x2 * x2;
        sy += y;
        sxy += x * y;
        sx2y += x2 * y;
    }
    // Normal equations in matrix form; solve the 3x3 system directly via
    // Cramer's rule rather than pulling in calc-kernels's own matrix solver
    // for a fixed 3x3 size.
    let m = [[n, s1, s2], [s1, s2, s3], [s2, s3, s4]];
    let v = [sy, sxy, sx2y];
    let det3 = |a: [[f64; 3]; 3]| -> f64 {
        a[0][0] * (a[1][1] * a[2][2] - a[1][2] * a[2][1])
            - a[0][1] * (a[1][0] * a[2][2] - a[1][2] * a[2][0])
            + a[0][2] * (a[1][0] * a[2][1] - a[1][1] * a[2][0])
    };
    let d = det3(m);
    if d == 0.0 {
        return Err(CalcError::Singular);
    }
    let mut coeffs = [0.0; 3];
    for (i, coeff) in coeffs.iter_mut().enumerate() {
        let mut mi = m;
        for (row, value) in mi.iter_mut().zip(v.iter()) {
            row[i] = *value;
        }
        *coeff = det3(mi) / d;
    }

    let mean_y = sy / n;
    let mut ss_res = 0.0;
    let mut ss_tot = 0.0;
    for (x, y) in xs.iter().zip(ys) {
        let pred = coeffs[0] + coeffs[1] * x + coeffs[2] * x * x;
        ss_res += (y - pred).powi(2);
        ss_tot += (y - mean_y).powi(2);
    }
    let r_squared = if ss_tot == 0.0 { 1.0 } else { 1.0 - ss_res / ss_tot };

    Ok(Regression {
        coefficients: coeffs,
        r: None,
        r_squared,
    })
}

/// Exponential fit `y = a*b^x` by linearizing `ln(y) = ln(a) + x*ln(b)`.
pub fn exponential(xs: &[f64], ys: &[f64]) -> CalcResult<Regression> {
    let ln_ys: Vec<f64> = ys
        .iter()
        .map(|y| {
            if *y <= 0.0 {
                Err(CalcError::Domain("exponential regression requires y > 0".to_string()))
            } else {
                Ok(y.ln())
            }
        })
        .collect::<CalcResult<Vec<f64>>>()?;
    let fit = linear(xs, &ln_ys)?;
    let a = fit.coefficients[0].exp();
    let b = fit.coefficients[1].exp();
    Ok(Regression {
        coefficients: [a, b, 0.0],
        r: fit.r,
        r_squared: fit.r_squared,
    })
}

/// Power fit `y = a*x^b` by linearizing both axes: `ln(y) = ln(a) + b*ln(x)`.
pub fn power(xs: &[f64], ys: &[f64]) -> CalcResult<Regression> {
    let ln_xs: Vec<f64> = xs
        .iter()
        .map(|x| {
            if *x <= 0.0 {
                Err(CalcError::Domain("power regression requires x > 0".to_string()))
            } else {
                Ok(x.ln())
            }
        })
        .collect::<CalcResult<Vec<f64>>>()?;
    let ln_ys: Vec<f64> = ys
        .iter()
        .map(|y| {
            if *y <= 0.0 {
                Err(CalcError::Domain("power regression requires y > 0".to_string()))
            } else {
                Ok(y.ln())
            }
        })
        .collect::<CalcResult<Vec<f64>>>()?;
    let fit = linear(&ln_xs, &ln_ys)?;
    let a = fit.coefficients[0].exp();
    let b = fit.coefficients[1];
    Ok(Regression {
        coefficients: [a, b, 0.0],
        r: fit.r,
        r_squared: fit.r_squared,
    })
}

/// Logarithmic fit `y = a + b*ln(x)`.
pub fn logarithmic(xs: &[f64], ys: &[f64]) -> CalcResult<Regression> {
    let ln_xs: Vec<f64> = xs
        .iter()
        .map(|x| {
            if *x <= 0.0 {
                Err(CalcError::Domain("log regression requires x > 0".to_string()))
            } else {
                Ok(x.ln())
            }
        })
        .collect::<CalcResult<Vec<f64>>>()?;
    linear(&ln_xs, ys)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_var_matches_hand_computed() {
        let s = one_var(&[1.0, 2.0, 3.0, 4.0]).unwrap();
        assert_eq!(s.n, 4);
        assert_eq!(s.mean, 2.5);
        assert_eq!(s.median, 2.5);
        assert_eq!(s.min, 1.0);
        assert_eq!(s.max, 4.0);
    }

    #[test]
    fn empty_data_is_stat_error() {
        assert!(one_var(&[]).is_err());
    }

    #[test]
    fn linear_regression_exact_fit() {
        let xs = [1.0, 2.0, 3.0, 4.0];
        let ys = [3.0, 5.0, 7.0, 9.0]; // y = 1 + 2x
        let r = linear(&xs, &ys).unwrap();
        assert!((r.coefficients[0] - 1.0).abs() < 1e-9);
        assert!((r.coefficients[1] - 2.0).abs() < 1e-9);
        assert!((r.r_squared - 1.0).abs() < 1e-9);
    }

    #[test]
    fn exponential_regression_requires_positive_y() {
        assert!(exponential(&[1.0, 2.0], &[1.0, -1.0]).is_err());
    }
}
