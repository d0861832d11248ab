//! Candidate generators for the initial design, the search step and the poll step.
//!
//! All candidates live in normalized coordinates (see [`crate::Problem`]); the
//! caller projects them onto the hard bounds before evaluation.

use rand::Rng;
use rand::RngCore;

/// Common trait for all candidate generators.
pub trait SearchStrategy {
    /// Generate the next batch of candidate points.
    fn suggest(&mut self, rng: &mut dyn RngCore, count: usize) -> Vec<Vec<f64>>;

    /// Human-readable strategy name.
    fn name(&self) -> &str;
}

// ---- Plausible box sampling ----

/// Independent uniform sampling over the normalized plausible box `[-0.5, 0.5]^d`.
#[derive(Debug, Clone)]
pub struct PlausibleSampler {
    dim: usize,
}

impl PlausibleSampler {
    pub fn new(dim: usize) -> Self {
        Self { dim }
    }
}

impl SearchStrategy for PlausibleSampler {
    fn suggest(&mut self, rng: &mut dyn RngCore, count: usize) -> Vec<Vec<f64>> {
        (0..count)
            .map(|_| (0..self.dim).map(|_| rng.gen_range(-0.5..=0.5)).collect())
            .collect()
    }

    fn name(&self) -> &str {
        "plausible-uniform"
    }
}

// ---- Local perturbation ----

/// Uniform perturbations of the incumbent within `radius` along each axis.
#[derive(Debug, Clone)]
pub struct IncumbentPerturbation {
    center: Vec<f64>,
    radius: f64,
}

impl IncumbentPerturbation {
    pub fn new(center: Vec<f64>, radius: f64) -> Self {
        Self { center, radius }
    }
}

impl SearchStrategy for IncumbentPerturbation {
    fn suggest(&mut self, rng: &mut dyn RngCore, count: usize) -> Vec<Vec<f64>> {
        (0..count)
            .map(|_| {
                self.center
                    .iter()
                    .map(|c| c + rng.gen_range(-1.0..=1.0) * self.radius)
                    .collect()
            })
            .collect()
    }

    fn name(&self) -> &str {
        "incumbent-perturbation"
    }
}

/// Positive and negative coordinate directions, `+e_0, -e_0, +e_1, ...`.
pub fn poll_directions(dim: usize) -> Vec<Vec<f64>> {
    let mut directions = Vec::with_capacity(2 * dim);
    for i in 0..dim {
        for sign in [1.0, -1.0] {
            let mut d = vec![0.0; dim];
            d[i] = sign;
            directions.push(d);
        }
    }
    directions
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn plausible_sampler_stays_in_box() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let mut sampler = PlausibleSampler::new(3);
        let points = sampler.suggest(&mut rng, 50);
        assert_eq!(points.len(), 50);
        for p in &points {
            assert_eq!(p.len(), 3);
            assert!(p.iter().all(|v| (-0.5..=0.5).contains(v)));
        }
        assert_eq!(sampler.name(), "plausible-uniform");
    }

    #[test]
    fn perturbation_stays_within_radius() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let mut strategy = IncumbentPerturbation::new(vec![0.2, -0.1], 0.05);
        for p in strategy.suggest(&mut rng, 100) {
            assert!((p[0] - 0.2).abs() <= 0.05 + 1e-12);
            assert!((p[1] + 0.1).abs() <= 0.05 + 1e-12);
        }
    }

    #[test]
    fn seeded_generators_are_reproducible() {
        let mut a = ChaCha8Rng::seed_from_u64(42);
        let mut b = ChaCha8Rng::seed_from_u64(42);
        let first = PlausibleSampler::new(2).suggest(&mut a, 4);
        let second = PlausibleSampler::new(2).suggest(&mut b, 4);
        assert_eq!(first, second);
    }

    #[test]
    fn poll_directions_cover_both_signs() {
        let dirs = poll_directions(2);
        assert_eq!(
            dirs,
            vec![
                vec![1.0, 0.0],
                vec![-1.0, 0.0],
                vec![0.0, 1.0],
                vec![0.0, -1.0],
            ]
        );
    }
}
