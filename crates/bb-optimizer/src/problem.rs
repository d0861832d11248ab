//! Validated problem definition and the normalized search space.
//!
//! The optimizer works on the free coordinates only, rescaled so the plausible
//! box becomes `[-0.5, 0.5]` along every axis. Fixed coordinates (`lb == ub`)
//! keep their starting value in every requested point.

use bb_types::{invalid_bounds, BadsConfig, OptimizerError};

#[derive(Debug, Clone, PartialEq)]
pub struct Problem {
    x0: Vec<f64>,
    lower: Vec<f64>,
    upper: Vec<f64>,
    /// Indices of the coordinates the optimizer may move.
    free: Vec<usize>,
    /// Per free coordinate: centre and width of the plausible box.
    center: Vec<f64>,
    width: Vec<f64>,
}

impl Problem {
    pub fn new(
        x0: Vec<f64>,
        lower_bounds: Vec<f64>,
        upper_bounds: Vec<f64>,
        plausible_lower_bounds: Vec<f64>,
        plausible_upper_bounds: Vec<f64>,
    ) -> Result<Self, OptimizerError> {
        let dim = x0.len();
        if dim == 0 {
            return Err(OptimizerError::EmptyProblem);
        }
        for (name, values) in [
            ("lower_bounds", &lower_bounds),
            ("upper_bounds", &upper_bounds),
            ("plausible_lower_bounds", &plausible_lower_bounds),
            ("plausible_upper_bounds", &plausible_upper_bounds),
        ] {
            if values.len() != dim {
                return Err(OptimizerError::DimensionMismatch {
                    name: name.to_string(),
                    expected: dim,
                    actual: values.len(),
                });
            }
        }

        let mut free = Vec::with_capacity(dim);
        let mut center = Vec::with_capacity(dim);
        let mut width = Vec::with_capacity(dim);

        for i in 0..dim {
            let (x, lb, ub) = (x0[i], lower_bounds[i], upper_bounds[i]);
            let (plb, pub_) = (plausible_lower_bounds[i], plausible_upper_bounds[i]);

            if !x.is_finite() {
                return Err(invalid_bounds!(i, "x0 is {x}"));
            }
            if lb.is_nan() || ub.is_nan() {
                return Err(invalid_bounds!(i, "hard bounds must not be NaN"));
            }
            if lb > ub {
                return Err(invalid_bounds!(i, "lower bound {lb} exceeds upper bound {ub}"));
            }
            if lb == ub {
                if x != lb {
                    return Err(invalid_bounds!(
                        i,
                        "fixed coordinate has x0 {x} but bounds {lb}"
                    ));
                }
                continue;
            }
            if !(plb.is_finite() && pub_.is_finite()) {
                return Err(invalid_bounds!(i, "plausible bounds must be finite"));
            }
            if !(lb <= plb && plb < pub_ && pub_ <= ub) {
                return Err(invalid_bounds!(
                    i,
                    "expected lower <= plausible lower < plausible upper <= upper, got {lb}, {plb}, {pub_}, {ub}"
                ));
            }
            if x < lb || x > ub {
                return Err(invalid_bounds!(i, "x0 {x} lies outside [{lb}, {ub}]"));
            }

            free.push(i);
            center.push(0.5 * (plb + pub_));
            width.push(pub_ - plb);
        }

        if free.is_empty() {
            return Err(OptimizerError::NoFreeVariables);
        }

        Ok(Self {
            x0,
            lower: lower_bounds,
            upper: upper_bounds,
            free,
            center,
            width,
        })
    }

    pub fn from_config(config: &BadsConfig) -> Result<Self, OptimizerError> {
        Self::new(
            config.x0.clone(),
            config.lower_bounds.clone(),
            config.upper_bounds.clone(),
            config.plausible_lower_bounds.clone(),
            config.plausible_upper_bounds.clone(),
        )
    }

    /// Length of every point handed to the objective.
    pub fn dimension(&self) -> usize {
        self.x0.len()
    }

    /// Number of coordinates the optimizer moves.
    pub fn free_dimension(&self) -> usize {
        self.free.len()
    }

    pub fn x0(&self) -> &[f64] {
        &self.x0
    }

    /// Whether any hard bound is finite.
    pub fn is_bounded(&self) -> bool {
        self.lower.iter().chain(&self.upper).any(|b| b.is_finite())
    }

    /// Full point to normalized free coordinates.
    pub fn normalize(&self, x: &[f64]) -> Vec<f64> {
        self.free
            .iter()
            .enumerate()
            .map(|(j, &i)| (x[i] - self.center[j]) / self.width[j])
            .collect()
    }

    /// Normalized free coordinates to a full point inside the hard bounds.
    pub fn denormalize(&self, u: &[f64]) -> Vec<f64> {
        let mut x = self.x0.clone();
        for (j, &i) in self.free.iter().enumerate() {
            x[i] = (self.center[j] + self.width[j] * u[j]).clamp(self.lower[i], self.upper[i]);
        }
        x
    }

    /// Clamp normalized coordinates onto the hard bounds.
    pub fn project(&self, u: &mut [f64]) {
        for (j, &i) in self.free.iter().enumerate() {
            let lo = (self.lower[i] - self.center[j]) / self.width[j];
            let hi = (self.upper[i] - self.center[j]) / self.width[j];
            u[j] = u[j].clamp(lo, hi);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_problem() -> Problem {
        Problem::new(
            vec![0.0, 1.0],
            vec![-1.0, -2.0],
            vec![1.0, 4.0],
            vec![-0.5, 0.0],
            vec![0.5, 2.0],
        )
        .unwrap()
    }

    #[test]
    fn normalization_maps_plausible_box_to_unit_width() {
        let problem = unit_problem();
        assert_eq!(problem.normalize(&[-0.5, 0.0]), vec![-0.5, -0.5]);
        assert_eq!(problem.normalize(&[0.5, 2.0]), vec![0.5, 0.5]);
        assert_eq!(problem.normalize(problem.x0()), vec![0.0, 0.0]);
        assert_eq!(problem.denormalize(&[0.25, -0.25]), vec![0.25, 0.5]);
    }

    #[test]
    fn projection_respects_hard_bounds() {
        let problem = unit_problem();
        let mut u = vec![5.0, -5.0];
        problem.project(&mut u);
        assert_eq!(problem.denormalize(&u), vec![1.0, -2.0]);
    }

    #[test]
    fn fixed_coordinates_stay_put() {
        let problem = Problem::new(
            vec![0.0, 3.0],
            vec![-1.0, 3.0],
            vec![1.0, 3.0],
            vec![-0.5, 3.0],
            vec![0.5, 3.0],
        )
        .unwrap();
        assert_eq!(problem.dimension(), 2);
        assert_eq!(problem.free_dimension(), 1);
        assert_eq!(problem.denormalize(&[0.5]), vec![0.5, 3.0]);
    }

    #[test]
    fn rejects_inconsistent_lengths() {
        let err = Problem::new(vec![0.0, 0.0], vec![-1.0], vec![1.0, 1.0], vec![-0.5, -0.5], vec![0.5, 0.5])
            .unwrap_err();
        match err {
            OptimizerError::DimensionMismatch { name, expected, actual } => {
                assert_eq!(name, "lower_bounds");
                assert_eq!(expected, 2);
                assert_eq!(actual, 1);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn rejects_empty_and_fully_fixed_problems() {
        assert!(matches!(
            Problem::new(vec![], vec![], vec![], vec![], vec![]),
            Err(OptimizerError::EmptyProblem)
        ));
        assert!(matches!(
            Problem::new(vec![1.0], vec![1.0], vec![1.0], vec![1.0], vec![1.0]),
            Err(OptimizerError::NoFreeVariables)
        ));
    }

    #[test]
    fn rejects_misordered_bounds() {
        let cases = [
            // plausible box outside the hard box
            (vec![0.0], vec![-1.0], vec![1.0], vec![-2.0], vec![0.5]),
            // empty plausible box
            (vec![0.0], vec![-1.0], vec![1.0], vec![0.5], vec![0.5]),
            // x0 outside the hard box
            (vec![3.0], vec![-1.0], vec![1.0], vec![-0.5], vec![0.5]),
            // lower above upper
            (vec![0.0], vec![1.0], vec![-1.0], vec![-0.5], vec![0.5]),
        ];
        for (x0, lb, ub, plb, pub_) in cases {
            match Problem::new(x0, lb, ub, plb, pub_) {
                Err(OptimizerError::InvalidBounds { index: 0, .. }) => (),
                other => panic!("unexpected result: {other:?}"),
            }
        }
    }

    #[test]
    fn infinite_hard_bounds_are_allowed() {
        let problem = Problem::new(
            vec![0.0],
            vec![f64::NEG_INFINITY],
            vec![f64::INFINITY],
            vec![-1.0],
            vec![1.0],
        )
        .unwrap();
        assert!(!problem.is_bounded());
        let mut u = vec![1e6];
        problem.project(&mut u);
        assert_eq!(u, vec![1e6]);
    }
}
