use bb_types::BadsOptions;

/// [`BadsOptions`] with every default filled in for a given free dimension.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedOptions {
    pub max_fun_evals: usize,
    pub max_iter: usize,
    pub tol_mesh: f64,
    pub tol_fun: f64,
    pub tol_stall_iters: usize,
    pub init_points: usize,
    pub poll_size_init: f64,
    pub search_candidates: usize,
    pub random_seed: Option<u32>,
}

impl ResolvedOptions {
    pub fn resolve(options: &BadsOptions, dim: usize) -> Self {
        Self {
            max_fun_evals: options.max_fun_evals.unwrap_or(500 * dim),
            max_iter: options.max_iter.unwrap_or(200 * dim),
            tol_mesh: options.tol_mesh.unwrap_or(1e-6),
            tol_fun: options.tol_fun.unwrap_or(1e-3),
            tol_stall_iters: options.tol_stall_iters.unwrap_or(4 + dim / 2),
            init_points: options.init_points.unwrap_or(dim),
            poll_size_init: options.poll_size_init.unwrap_or(0.5),
            search_candidates: options.search_candidates.unwrap_or(32 * dim),
            random_seed: options.random_seed,
        }
    }
}
