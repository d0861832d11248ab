//! Gaussian-process surrogate used to rank search candidates.
//!
//! Zero-mean GP on standardized targets with a squared-exponential kernel and
//! unit signal variance. The length scale is the median pairwise distance of
//! the training inputs; there is no hyperparameter fitting.

use ndarray::{Array1, Array2, ArrayView1};

/// Jitter levels tried in turn until the kernel matrix factorizes.
const JITTER_LADDER: [f64; 4] = [1e-8, 1e-6, 1e-4, 1e-2];
const MIN_LENGTH_SCALE: f64 = 1e-3;
const MAX_LENGTH_SCALE: f64 = 10.0;

#[derive(Debug, Clone)]
pub struct GaussianProcess {
    inputs: Array2<f64>,
    chol: Array2<f64>,
    alpha: Array1<f64>,
    y_mean: f64,
    y_scale: f64,
    length_scale: f64,
    noise: f64,
}

impl GaussianProcess {
    /// Fit to `points` (rows of equal length) and their `values`.
    ///
    /// Returns `None` with fewer than two points, on non-finite data, or when
    /// the kernel matrix cannot be factorized.
    pub fn fit(points: &[Vec<f64>], values: &[f64]) -> Option<Self> {
        let n = points.len();
        if n < 2 || values.len() != n {
            return None;
        }
        let d = points[0].len();
        if d == 0 || points.iter().any(|p| p.len() != d) {
            return None;
        }
        if values.iter().any(|v| !v.is_finite()) {
            return None;
        }

        let inputs = Array2::from_shape_fn((n, d), |(i, j)| points[i][j]);
        let y = Array1::from(values.to_vec());
        let y_mean = y.mean()?;
        let spread = y.std(0.0);
        let y_scale = if spread > 1e-12 { spread } else { 1.0 };
        let targets = y.mapv(|v| (v - y_mean) / y_scale);

        let length_scale = median_distance(&inputs)?.clamp(MIN_LENGTH_SCALE, MAX_LENGTH_SCALE);

        for noise in JITTER_LADDER {
            let mut k = Array2::zeros((n, n));
            for i in 0..n {
                for j in 0..=i {
                    let v = kernel(inputs.row(i), inputs.row(j), length_scale);
                    k[[i, j]] = v;
                    k[[j, i]] = v;
                }
                k[[i, i]] += noise;
            }
            if let Some(chol) = cholesky(&k) {
                let z = solve_lower(&chol, &targets);
                let alpha = solve_lower_transposed(&chol, &z);
                return Some(Self {
                    inputs,
                    chol,
                    alpha,
                    y_mean,
                    y_scale,
                    length_scale,
                    noise,
                });
            }
        }
        None
    }

    pub fn length_scale(&self) -> f64 {
        self.length_scale
    }

    /// Posterior mean and standard deviation at `u`.
    pub fn predict(&self, u: &[f64]) -> (f64, f64) {
        let x = ArrayView1::from(u);
        let k_star: Array1<f64> = self
            .inputs
            .rows()
            .into_iter()
            .map(|row| kernel(row, x, self.length_scale))
            .collect();
        let mean = k_star.dot(&self.alpha);
        let v = solve_lower(&self.chol, &k_star);
        let variance = (1.0 + self.noise - v.dot(&v)).max(0.0);
        (
            self.y_mean + self.y_scale * mean,
            self.y_scale * variance.sqrt(),
        )
    }

    /// Optimistic estimate `mean - kappa * std`.
    pub fn lower_confidence_bound(&self, u: &[f64], kappa: f64) -> f64 {
        let (mean, std) = self.predict(u);
        mean - kappa * std
    }
}

fn kernel(a: ArrayView1<'_, f64>, b: ArrayView1<'_, f64>, length_scale: f64) -> f64 {
    let sq: f64 = a.iter().zip(b.iter()).map(|(x, y)| (x - y) * (x - y)).sum();
    (-0.5 * sq / (length_scale * length_scale)).exp()
}

fn median_distance(inputs: &Array2<f64>) -> Option<f64> {
    let n = inputs.nrows();
    let mut distances = Vec::with_capacity(n * (n - 1) / 2);
    for i in 0..n {
        for j in (i + 1)..n {
            let diff = &inputs.row(i) - &inputs.row(j);
            distances.push(diff.dot(&diff).sqrt());
        }
    }
    distances.sort_by(|a, b| a.total_cmp(b));
    distances.get(distances.len() / 2).copied()
}

/// Lower-triangular factor `L` with `L Lᵀ = a`, or `None` if `a` is not
/// positive definite.
fn cholesky(a: &Array2<f64>) -> Option<Array2<f64>> {
    let n = a.nrows();
    let mut l = Array2::<f64>::zeros((n, n));
    for i in 0..n {
        for j in 0..=i {
            let mut sum = a[[i, j]];
            for k in 0..j {
                sum -= l[[i, k]] * l[[j, k]];
            }
            if i == j {
                if sum <= 0.0 || !sum.is_finite() {
                    return None;
                }
                l[[i, i]] = sum.sqrt();
            } else {
                l[[i, j]] = sum / l[[j, j]];
            }
        }
    }
    Some(l)
}

/// Solve `L x = b` by forward substitution.
fn solve_lower(l: &Array2<f64>, b: &Array1<f64>) -> Array1<f64> {
    let n = b.len();
    let mut x = Array1::<f64>::zeros(n);
    for i in 0..n {
        let mut sum = b[i];
        for k in 0..i {
            sum -= l[[i, k]] * x[k];
        }
        x[i] = sum / l[[i, i]];
    }
    x
}

/// Solve `Lᵀ x = b` by back substitution.
fn solve_lower_transposed(l: &Array2<f64>, b: &Array1<f64>) -> Array1<f64> {
    let n = b.len();
    let mut x = Array1::<f64>::zeros(n);
    for i in (0..n).rev() {
        let mut sum = b[i];
        for k in (i + 1)..n {
            sum -= l[[k, i]] * x[k];
        }
        x[i] = sum / l[[i, i]];
    }
    x
}
