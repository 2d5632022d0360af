//! Generalized Savitzky–Golay smoothing and differentiation.
//!
//! Fits a least-squares polynomial over a sliding window and evaluates it (or
//! one of its derivatives) at each sample. Weights come from the Gram
//! polynomial recurrence, so any window size, degree and derivative order can
//! be used without solving a linear system. The first and last
//! `window_size / 2` samples use the off-centre rows of the weight matrix, so
//! the output has the same length as the input.

use crate::analytics::error::FilterParameterError;
use log::warn;
use serde::{Deserialize, Serialize};

/// Horizontal spacing of the samples.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum XSpacing<'a> {
    /// Every sample is this far from the previous one.
    Uniform(f64),
    /// The x value of every sample. Must be as long as the y values.
    Points(&'a [f64]),
}

/// Filter parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SavitzkyGolayOptions {
    /// Odd, at least 5, at most the series length.
    pub window_size: usize,
    /// 0 smooths; 1 gives the first derivative, and so on.
    pub derivative: usize,
    pub polynomial_degree: usize,
}

impl Default for SavitzkyGolayOptions {
    fn default() -> Self {
        Self {
            window_size: 9,
            derivative: 0,
            polynomial_degree: 3,
        }
    }
}

impl SavitzkyGolayOptions {
    /// Checks the parameters against a series of `len` samples.
    pub fn validate(&self, len: usize) -> Result<(), FilterParameterError> {
        self.validate_shape()?;
        if self.window_size > len {
            return Err(FilterParameterError::WindowLargerThanSeries {
                window: self.window_size,
                len,
            });
        }
        Ok(())
    }

    /// Checks the parameters that do not depend on the series.
    pub fn validate_shape(&self) -> Result<(), FilterParameterError> {
        if self.window_size % 2 == 0 || self.window_size < 5 {
            return Err(FilterParameterError::WindowSize(self.window_size));
        }
        if self.polynomial_degree < 1 {
            return Err(FilterParameterError::PolynomialDegree(
                self.polynomial_degree,
            ));
        }
        // The Gram recurrence divides by zero once the degree reaches the
        // number of samples in the window.
        if self.polynomial_degree >= self.window_size {
            return Err(FilterParameterError::DegreeNotBelowWindow {
                degree: self.polynomial_degree,
                window: self.window_size,
            });
        }
        Ok(())
    }
}

/// Applies the filter to `ys`.
///
/// Returns a vector of the same length as `ys`. All parameter problems are
/// reported before any computation; a polynomial degree of 6 or more is
/// accepted but logged, as high-order fits tend to oscillate.
///
/// # Examples
///
/// ```
/// use nimbus::{savitzky_golay, SavitzkyGolayOptions, XSpacing};
///
/// let ys: Vec<f64> = (0..20).map(|i| 3.0 * i as f64).collect();
/// let options = SavitzkyGolayOptions { window_size: 5, derivative: 1, polynomial_degree: 2 };
/// let slope = savitzky_golay(&ys, XSpacing::Uniform(1.0), options)?;
/// assert!(slope.iter().all(|s| (s - 3.0).abs() < 1e-9));
/// # Ok::<(), nimbus::FilterParameterError>(())
/// ```
pub fn savitzky_golay(
    ys: &[f64],
    xs: XSpacing<'_>,
    options: SavitzkyGolayOptions,
) -> Result<Vec<f64>, FilterParameterError> {
    options.validate(ys.len())?;
    if let XSpacing::Points(points) = xs {
        if points.len() != ys.len() {
            return Err(FilterParameterError::SpacingLengthMismatch {
                xs: points.len(),
                ys: ys.len(),
            });
        }
    }
    if options.polynomial_degree >= 6 {
        warn!(
            "Savitzky-Golay polynomial degree {} is above 5, the fit may oscillate",
            options.polynomial_degree
        );
    }

    let SavitzkyGolayOptions {
        window_size,
        derivative,
        polynomial_degree,
    } = options;
    let half = window_size / 2;
    let np = ys.len();
    let weights = full_weights(window_size, polynomial_degree, derivative);
    let spacing = |center: usize| match xs {
        XSpacing::Uniform(dx) => dx.powi(derivative as i32),
        XSpacing::Points(points) => local_spacing(points, center, half, derivative),
    };

    let mut ans = vec![0.0; np];

    for i in 0..half {
        let head_row = &weights[half - i - 1];
        let tail_row = &weights[half + i + 1];
        let tail = &ys[np - window_size..];

        let head: f64 = head_row.iter().zip(ys).map(|(w, y)| w * y).sum();
        let tail: f64 = tail_row.iter().zip(tail).map(|(w, y)| w * y).sum();

        ans[half - i - 1] = head / spacing(half - i - 1);
        ans[np - half + i] = tail / spacing(np - half + i);
    }

    let center_row = &weights[half];
    for (offset, window) in ys.windows(window_size).enumerate() {
        let d: f64 = center_row.iter().zip(window).map(|(w, y)| w * y).sum();
        let center = offset + half;
        ans[center] = d / spacing(center);
    }

    Ok(ans)
}

/// Mean spacing around `center`, raised to the derivative order.
fn local_spacing(xs: &[f64], center: usize, half: usize, derivative: usize) -> f64 {
    let from = center.saturating_sub(half);
    let to = (center + half).min(xs.len() - 1);
    let steps = &xs[from..=to];
    let count = steps.len() - 1;
    let span: f64 = steps.windows(2).map(|w| w[1] - w[0]).sum();
    (span / count as f64).powi(derivative as i32)
}

/// Gram polynomial of order `k` evaluated at `i`, or its `s`-th derivative.
fn gram_poly(i: f64, m: f64, k: i64, s: i64) -> f64 {
    if k > 0 {
        let kf = k as f64;
        (4.0 * kf - 2.0) / (kf * (2.0 * m - kf + 1.0))
            * (i * gram_poly(i, m, k - 1, s) + s as f64 * gram_poly(i, m, k - 1, s - 1))
            - ((kf - 1.0) * (2.0 * m + kf)) / (kf * (2.0 * m - kf + 1.0))
                * gram_poly(i, m, k - 2, s)
    } else if k == 0 && s == 0 {
        1.0
    } else {
        0.0
    }
}

/// Generalized factorial `a · (a-1) · … · (a-b+1)`.
fn gen_fact(a: usize, b: usize) -> f64 {
    if a < b {
        return 1.0;
    }
    ((a - b + 1)..=a).map(|j| j as f64).product()
}

fn weight(i: i64, t: i64, m: usize, n: usize, s: usize) -> f64 {
    (0..=n)
        .map(|k| {
            (2 * k + 1) as f64 * (gen_fact(2 * m, k) / gen_fact(2 * m + k + 1, k + 1))
                * gram_poly(i as f64, m as f64, k as i64, 0)
                * gram_poly(t as f64, m as f64, k as i64, s as i64)
        })
        .sum()
}

/// Row `t + half` holds the weights for evaluating the fit at offset `t`.
fn full_weights(window_size: usize, degree: usize, derivative: usize) -> Vec<Vec<f64>> {
    let half = (window_size / 2) as i64;
    (-half..=half)
        .map(|t| {
            (-half..=half)
                .map(|j| weight(j, t, half as usize, degree, derivative))
                .collect()
        })
        .collect()
}
