//! Epsilon-support-vector regression with an RBF kernel over a single
//! feature, solved with SMO (second-order working-set selection).
//!
//! The dual has `2n` variables: `alpha[t]` for `t < n` and `alpha*[t - n]`
//! above that, with signs `+1`/`-1` respectively. The fitted model is
//! `f(x) = sum_i (alpha_i - alpha*_i) * K(x_i, x) - rho`.

use tracing::{debug, warn};

const TAU: f64 = 1e-12;
const MAX_ITER: usize = 10_000_000;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SvrParams {
    /// Box constraint on every dual variable.
    pub c: f64,
    pub gamma: f64,
    /// Half-width of the insensitive tube.
    pub epsilon: f64,
    /// Stopping tolerance on the maximal KKT violation.
    pub tol: f64,
}

#[derive(Debug, Clone)]
pub struct Svr {
    support: Vec<f64>,
    coef: Vec<f64>,
    rho: f64,
    gamma: f64,
    iterations: usize,
}

fn rbf(gamma: f64, a: f64, b: f64) -> f64 {
    let d = a - b;
    (-gamma * d * d).exp()
}

struct Problem {
    kernel: Vec<Vec<f64>>,
    n: usize,
    c: f64,
}

impl Problem {
    fn sign(&self, t: usize) -> f64 {
        if t < self.n {
            1.0
        } else {
            -1.0
        }
    }

    /// Signed kernel entry `y_t * y_s * K(t mod n, s mod n)`.
    fn q(&self, t: usize, s: usize) -> f64 {
        self.sign(t) * self.sign(s) * self.kernel[t % self.n][s % self.n]
    }

    fn qd(&self, t: usize) -> f64 {
        self.kernel[t % self.n][t % self.n]
    }
}

struct Solver<'a> {
    prob: &'a Problem,
    alpha: Vec<f64>,
    grad: Vec<f64>,
}

impl Solver<'_> {
    fn is_upper(&self, t: usize) -> bool {
        self.alpha[t] >= self.prob.c
    }

    fn is_lower(&self, t: usize) -> bool {
        self.alpha[t] <= 0.0
    }

    fn select_working_set(&self, tol: f64) -> Option<(usize, usize)> {
        let prob = self.prob;
        let len = self.alpha.len();

        let mut gmax = f64::NEG_INFINITY;
        let mut gmax_idx = None;
        for t in 0..len {
            if prob.sign(t) > 0.0 {
                if !self.is_upper(t) && -self.grad[t] >= gmax {
                    gmax = -self.grad[t];
                    gmax_idx = Some(t);
                }
            } else if !self.is_lower(t) && self.grad[t] >= gmax {
                gmax = self.grad[t];
                gmax_idx = Some(t);
            }
        }
        let i = gmax_idx?;
        let yi = prob.sign(i);

        let mut gmax2 = f64::NEG_INFINITY;
        let mut gmin_idx = None;
        let mut obj_diff_min = f64::INFINITY;
        for j in 0..len {
            let (grad_diff, quad_coef) = if prob.sign(j) > 0.0 {
                if self.is_lower(j) {
                    continue;
                }
                gmax2 = gmax2.max(self.grad[j]);
                (gmax + self.grad[j], prob.qd(i) + prob.qd(j) - 2.0 * yi * prob.q(i, j))
            } else {
                if self.is_upper(j) {
                    continue;
                }
                gmax2 = gmax2.max(-self.grad[j]);
                (gmax - self.grad[j], prob.qd(i) + prob.qd(j) + 2.0 * yi * prob.q(i, j))
            };
            if grad_diff > 0.0 {
                let denom = if quad_coef > 0.0 { quad_coef } else { TAU };
                let obj_diff = -(grad_diff * grad_diff) / denom;
                if obj_diff <= obj_diff_min {
                    gmin_idx = Some(j);
                    obj_diff_min = obj_diff;
                }
            }
        }

        if gmax + gmax2 < tol {
            return None;
        }
        gmin_idx.map(|j| (i, j))
    }

    fn update_pair(&mut self, i: usize, j: usize) {
        let prob = self.prob;
        let c = prob.c;
        let qij = prob.q(i, j);
        let old_ai = self.alpha[i];
        let old_aj = self.alpha[j];

        if prob.sign(i) != prob.sign(j) {
            let mut quad_coef = prob.qd(i) + prob.qd(j) + 2.0 * qij;
            if quad_coef <= 0.0 {
                quad_coef = TAU;
            }
            let delta = (-self.grad[i] - self.grad[j]) / quad_coef;
            let diff = old_ai - old_aj;
            let (mut ai, mut aj) = (old_ai + delta, old_aj + delta);
            if diff > 0.0 {
                if aj < 0.0 {
                    aj = 0.0;
                    ai = diff;
                }
            } else if ai < 0.0 {
                ai = 0.0;
                aj = -diff;
            }
            if diff > 0.0 {
                if ai > c {
                    ai = c;
                    aj = c - diff;
                }
            } else if aj > c {
                aj = c;
                ai = c + diff;
            }
            self.alpha[i] = ai;
            self.alpha[j] = aj;
        } else {
            let mut quad_coef = prob.qd(i) + prob.qd(j) - 2.0 * qij;
            if quad_coef <= 0.0 {
                quad_coef = TAU;
            }
            let delta = (self.grad[i] - self.grad[j]) / quad_coef;
            let sum = old_ai + old_aj;
            let (mut ai, mut aj) = (old_ai - delta, old_aj + delta);
            if sum > c {
                if ai > c {
                    ai = c;
                    aj = sum - c;
                }
            } else if aj < 0.0 {
                aj = 0.0;
                ai = sum;
            }
            if sum > c {
                if aj > c {
                    aj = c;
                    ai = sum - c;
                }
            } else if ai < 0.0 {
                ai = 0.0;
                aj = sum;
            }
            self.alpha[i] = ai;
            self.alpha[j] = aj;
        }

        let dai = self.alpha[i] - old_ai;
        let daj = self.alpha[j] - old_aj;
        for k in 0..self.grad.len() {
            self.grad[k] += prob.q(i, k) * dai + prob.q(j, k) * daj;
        }
    }

    fn rho(&self) -> f64 {
        let mut ub = f64::INFINITY;
        let mut lb = f64::NEG_INFINITY;
        let mut free = 0usize;
        let mut sum_free = 0.0;
        for t in 0..self.alpha.len() {
            let y = self.prob.sign(t);
            let yg = y * self.grad[t];
            if self.is_upper(t) {
                if y < 0.0 {
                    ub = ub.min(yg);
                } else {
                    lb = lb.max(yg);
                }
            } else if self.is_lower(t) {
                if y > 0.0 {
                    ub = ub.min(yg);
                } else {
                    lb = lb.max(yg);
                }
            } else {
                free += 1;
                sum_free += yg;
            }
        }
        if free > 0 {
            sum_free / free as f64
        } else {
            (ub + lb) / 2.0
        }
    }
}

impl Svr {
    /// Fit on paired samples. `x` and `y` must be the same non-zero length.
    pub fn fit(x: &[f64], y: &[f64], params: &SvrParams) -> Self {
        debug_assert_eq!(x.len(), y.len());
        let n = x.len();
        let kernel: Vec<Vec<f64>> = x
            .iter()
            .map(|&a| x.iter().map(|&b| rbf(params.gamma, a, b)).collect())
            .collect();
        let prob = Problem { kernel, n, c: params.c };

        let grad: Vec<f64> = (0..2 * n)
            .map(|t| {
                if t < n {
                    params.epsilon - y[t]
                } else {
                    params.epsilon + y[t - n]
                }
            })
            .collect();
        let mut solver = Solver {
            prob: &prob,
            alpha: vec![0.0; 2 * n],
            grad,
        };

        let max_iter = MAX_ITER.max(100 * n);
        let mut iterations = 0;
        while let Some((i, j)) = solver.select_working_set(params.tol) {
            if iterations >= max_iter {
                warn!(iterations, "SVR solver hit the iteration limit");
                break;
            }
            solver.update_pair(i, j);
            iterations += 1;
        }

        let rho = solver.rho();
        let mut support = Vec::new();
        let mut coef = Vec::new();
        for i in 0..n {
            let beta = solver.alpha[i] - solver.alpha[i + n];
            if beta != 0.0 {
                support.push(x[i]);
                coef.push(beta);
            }
        }
        debug!(iterations, support_vectors = support.len(), rho, "SVR fitted");

        Self {
            support,
            coef,
            rho,
            gamma: params.gamma,
            iterations,
        }
    }

    pub fn predict(&self, x: f64) -> f64 {
        self.support
            .iter()
            .zip(&self.coef)
            .map(|(&sv, &beta)| beta * rbf(self.gamma, sv, x))
            .sum::<f64>()
            - self.rho
    }

    pub fn n_support(&self) -> usize {
        self.support.len()
    }

    pub fn iterations(&self) -> usize {
        self.iterations
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PARAMS: SvrParams = SvrParams {
        c: 100.0,
        gamma: 0.1,
        epsilon: 0.1,
        tol: 1e-3,
    };

    #[test]
    fn test_constant_target_is_reproduced() {
        let x = [1.0, 2.0, 3.0, 4.0];
        let y = [50.0; 4];
        let model = Svr::fit(&x, &y, &PARAMS);
        assert_eq!(model.n_support(), 0);
        for &xi in &x {
            assert!((model.predict(xi) - 50.0).abs() < 1e-9);
        }
        assert!((model.predict(100.0) - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_isolated_points_fit_within_tube() {
        // Points a month apart have effectively zero kernel overlap.
        let x = [0.0, 31.0, 62.0];
        let y = [10.0, 20.0, 30.0];
        let model = Svr::fit(&x, &y, &PARAMS);
        for (&xi, &yi) in x.iter().zip(&y) {
            let err = (model.predict(xi) - yi).abs();
            assert!(err <= PARAMS.epsilon + 0.01, "residual {err} at {xi}");
        }
        // Far from every sample only the intercept remains.
        assert!((model.predict(1000.0) - 20.0).abs() < 0.05);
        assert!(model.iterations() > 0);
    }

    #[test]
    fn test_box_constraint_limits_coefficients() {
        let x = [0.0, 50.0];
        let y = [0.0, 1000.0];
        let model = Svr::fit(&x, &y, &PARAMS);
        assert!(model.coef.iter().all(|b| b.abs() <= PARAMS.c + 1e-9));
        // An unreachable gap: each side saturates at C.
        assert!((model.predict(50.0) - model.predict(0.0) - 2.0 * PARAMS.c).abs() < 1e-6);
    }

    #[test]
    fn test_close_points_are_smoothed() {
        let x = [0.0, 1.0, 2.0, 3.0, 4.0];
        let y = [10.0, 12.0, 11.0, 13.0, 12.0];
        let model = Svr::fit(&x, &y, &PARAMS);
        for &xi in &x {
            let p = model.predict(xi);
            assert!(p.is_finite());
            assert!((9.0..=14.0).contains(&p), "prediction {p} out of range");
        }
    }
}
