//! Reference objectives for exercising optimizers.

/// `Σ x_i²`, minimized at the origin.
pub fn sphere(x: &[f64]) -> f64 {
    x.iter().map(|value| value * value).sum()
}

/// Generalized Rosenbrock function `Σ 100 (x_{i+1} - x_i²)² + (1 - x_i)²`.
pub fn rosenbrock(x: &[f64]) -> f64 {
    x.windows(2)
        .map(|pair| 100.0 * (pair[1] - pair[0] * pair[0]).powi(2) + (1.0 - pair[0]).powi(2))
        .sum()
}

/// Analytic gradient of [`rosenbrock`].
///
/// The optimizer never calls this; it is only useful as a reference when
/// checking objectives by hand.
pub fn rosenbrock_der(x: &[f64]) -> Vec<f64> {
    let n = x.len();
    let mut gradient = vec![0.0; n];
    for i in 0..n.saturating_sub(1) {
        let residual = x[i + 1] - x[i] * x[i];
        gradient[i] += -400.0 * x[i] * residual - 2.0 * (1.0 - x[i]);
        gradient[i + 1] += 200.0 * residual;
    }
    gradient
}
