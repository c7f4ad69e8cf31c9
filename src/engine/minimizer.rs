use log::debug;
use nalgebra::{DMatrix, DVector};

use crate::core::domain::Tuning;
use crate::engine::evaluator::Evaluator;

/// Sufficient-decrease and curvature constants of the strong Wolfe conditions.
const WOLFE_C1: f64 = 1e-4;
const WOLFE_C2: f64 = 0.9;
/// Longest step the bracketing phase may grow to.
const MAX_STEP: f64 = 1e3;
const MAX_BRACKET_STEPS: usize = 40;
const MAX_ZOOM_STEPS: usize = 60;
/// Cube root of machine epsilon, the usual central-difference step.
const FD_STEP: f64 = 6.055_454_452_393_343e-6;

pub const MSG_CONVERGED: &str = "Optimization terminated successfully.";
pub const MSG_MAX_ITER: &str = "Maximum number of iterations has been exceeded.";
pub const MSG_PRECISION_LOSS: &str = "Desired error not necessarily achieved due to precision loss.";
pub const MSG_NON_FINITE: &str = "Objective is not finite at the current point.";

/// Outcome of one local minimization.
#[derive(Debug, Clone)]
pub struct Refinement {
    pub vector: DVector<f64>,
    pub energy: f64,
    /// When false, `vector` must not be trusted as an improvement.
    pub converged: bool,
    pub message: String,
    pub iterations: usize,
}

/// A local minimizer over a scalar objective.
pub trait LocalMinimizer: Send + Sync {
    fn minimize(&self, objective: &dyn Fn(&DVector<f64>) -> f64, start: &DVector<f64>) -> Refinement;

    fn name(&self) -> &str;
}

/// Quasi-Newton BFGS with a central-difference gradient and a strong Wolfe
/// line search. Converges when the max-norm of the gradient drops below `gtol`.
#[derive(Debug, Clone)]
pub struct Bfgs {
    gtol: f64,
    max_iterations_per_dim: usize,
    fd_step: f64,
}

impl Default for Bfgs {
    fn default() -> Self {
        Self::from_tuning(&Tuning::default())
    }
}

impl Bfgs {
    pub fn new(gtol: f64, max_iterations_per_dim: usize) -> Self {
        Self {
            gtol,
            max_iterations_per_dim,
            fd_step: FD_STEP,
        }
    }

    pub fn from_tuning(tuning: &Tuning) -> Self {
        Self::new(tuning.gtol, tuning.max_iterations_per_dim)
    }

    pub fn gtol(&self) -> f64 {
        self.gtol
    }

    fn gradient(&self, f: &dyn Fn(&DVector<f64>) -> f64, x: &DVector<f64>) -> DVector<f64> {
        let mut shifted = x.clone();
        DVector::from_fn(x.len(), |i, _| {
            let h = self.fd_step * x[i].abs().max(1.0);
            let xi = x[i];
            shifted[i] = xi + h;
            let f_plus = f(&shifted);
            shifted[i] = xi - h;
            let f_minus = f(&shifted);
            shifted[i] = xi;
            (f_plus - f_minus) / (2.0 * h)
        })
    }

    fn trial(&self, f: &dyn Fn(&DVector<f64>) -> f64, x: &DVector<f64>, p: &DVector<f64>, alpha: f64) -> Trial {
        let x_new = x + p * alpha;
        let f_new = f(&x_new);
        if !f_new.is_finite() {
            return Trial::rejected(alpha, x_new, f_new);
        }
        let g_new = self.gradient(f, &x_new);
        if !g_new.iter().all(|v| v.is_finite()) {
            return Trial::rejected(alpha, x_new, f64::INFINITY);
        }
        let slope = g_new.dot(p);
        Trial {
            alpha,
            x: x_new,
            f: f_new,
            g: g_new,
            slope,
        }
    }

    /// Finds a step along `p` satisfying the strong Wolfe conditions.
    ///
    /// The step starts at `alpha_init` and doubles while the objective keeps
    /// falling steeply, then the bracket is narrowed by `zoom`. When no Wolfe
    /// point turns up, the lowest point with sufficient decrease is returned.
    fn line_search(
        &self,
        f: &dyn Fn(&DVector<f64>) -> f64,
        x: &DVector<f64>,
        fx: f64,
        g: &DVector<f64>,
        p: &DVector<f64>,
        alpha_init: f64,
    ) -> Option<Trial> {
        let slope0 = g.dot(p);
        let mut lo = Trial {
            alpha: 0.0,
            x: x.clone(),
            f: fx,
            g: g.clone(),
            slope: slope0,
        };
        let mut alpha = alpha_init;

        for i in 0..MAX_BRACKET_STEPS {
            let t = self.trial(f, x, p, alpha);
            if !(t.f <= fx + WOLFE_C1 * alpha * slope0) || (i > 0 && t.f >= lo.f) {
                return self.zoom(f, x, fx, p, slope0, lo, (alpha, t.f));
            }
            if t.slope.abs() <= -WOLFE_C2 * slope0 {
                return Some(t);
            }
            if t.slope >= 0.0 {
                let hi = (lo.alpha, lo.f);
                return self.zoom(f, x, fx, p, slope0, t, hi);
            }
            lo = t;
            if alpha >= MAX_STEP {
                break;
            }
            alpha = (2.0 * alpha).min(MAX_STEP);
        }

        (lo.alpha > 0.0).then_some(lo)
    }

    /// Narrows `[lo, hi]` until a strong Wolfe point is found.
    /// `lo` always holds the lowest sufficient-decrease point seen so far.
    #[allow(clippy::too_many_arguments)]
    fn zoom(
        &self,
        f: &dyn Fn(&DVector<f64>) -> f64,
        x: &DVector<f64>,
        fx: f64,
        p: &DVector<f64>,
        slope0: f64,
        mut lo: Trial,
        mut hi: (f64, f64),
    ) -> Option<Trial> {
        for _ in 0..MAX_ZOOM_STEPS {
            let (alpha_hi, f_hi) = hi;
            let width = (alpha_hi - lo.alpha).abs();
            if width <= f64::EPSILON * alpha_hi.abs().max(lo.alpha.abs()) {
                break;
            }

            let alpha = interpolate(lo.alpha, lo.f, lo.slope, alpha_hi, f_hi);
            let t = self.trial(f, x, p, alpha);
            if !(t.f <= fx + WOLFE_C1 * alpha * slope0) || t.f >= lo.f {
                hi = (alpha, t.f);
                continue;
            }
            if t.slope.abs() <= -WOLFE_C2 * slope0 {
                return Some(t);
            }
            if t.slope * (alpha_hi - lo.alpha) >= 0.0 {
                hi = (lo.alpha, lo.f);
            }
            lo = t;
        }

        (lo.alpha > 0.0).then_some(lo)
    }

    fn finish(x: DVector<f64>, fx: f64, converged: bool, message: &str, iterations: usize) -> Refinement {
        Refinement {
            vector: x,
            energy: fx,
            converged,
            message: message.to_string(),
            iterations,
        }
    }
}

impl LocalMinimizer for Bfgs {
    fn minimize(&self, f: &dyn Fn(&DVector<f64>) -> f64, start: &DVector<f64>) -> Refinement {
        let n = start.len();
        let max_iterations = self.max_iterations_per_dim * n.max(1);

        let mut x = start.clone();
        let mut fx = f(&x);
        if !fx.is_finite() {
            return Self::finish(x, fx, false, MSG_NON_FINITE, 0);
        }
        let mut g = self.gradient(f, &x);
        if !g.iter().all(|v| v.is_finite()) {
            return Self::finish(x, fx, false, MSG_NON_FINITE, 0);
        }

        // Inverse Hessian approximation
        let mut h = DMatrix::<f64>::identity(n, n);
        let mut fresh = true;
        // Seeds the first step length so the opening move has unit length
        let mut f_prev = fx + g.norm() / 2.0;

        for k in 0..max_iterations {
            if g.amax() < self.gtol {
                return Self::finish(x, fx, true, MSG_CONVERGED, k);
            }

            // 1. Search direction, falling back to steepest descent
            let mut p = -(&h * &g);
            let mut slope = p.dot(&g);
            if !(slope < 0.0) {
                h.fill_with_identity();
                fresh = true;
                p = -g.clone();
                slope = p.dot(&g);
            }

            // 2. Line search, retried once along -g before giving up
            let mut step = self.line_search(f, &x, fx, &g, &p, initial_step(fx, f_prev, slope));
            if step.is_none() && !fresh {
                h.fill_with_identity();
                fresh = true;
                p = -g.clone();
                slope = p.dot(&g);
                step = self.line_search(f, &x, fx, &g, &p, initial_step(fx, f_prev, slope));
            }
            let Some(t) = step else {
                debug!("BFGS line search failed at iteration {} (|g| = {:.3e})", k, g.amax());
                return Self::finish(x, fx, false, MSG_PRECISION_LOSS, k);
            };

            // 3. Inverse Hessian update
            let s = &t.x - &x;
            let y = &t.g - &g;
            let sy = s.dot(&y);
            if sy > 1e-12 {
                if fresh {
                    h *= sy / y.norm_squared();
                }
                let rho = 1.0 / sy;
                let hy = &h * &y;
                let yhy = y.dot(&hy);
                h -= (&s * hy.transpose() + &hy * s.transpose()) * rho;
                h += (&s * s.transpose()) * (rho * rho * yhy + rho);
                fresh = false;
            }

            f_prev = fx;
            x = t.x;
            fx = t.f;
            g = t.g;
        }

        if g.amax() < self.gtol {
            Self::finish(x, fx, true, MSG_CONVERGED, max_iterations)
        } else {
            Self::finish(x, fx, false, MSG_MAX_ITER, max_iterations)
        }
    }

    fn name(&self) -> &str {
        "BFGS"
    }
}

/// A point along the search direction. `slope` is the directional derivative.
struct Trial {
    alpha: f64,
    x: DVector<f64>,
    f: f64,
    g: DVector<f64>,
    slope: f64,
}

impl Trial {
    /// A point that can never satisfy the Wolfe conditions.
    fn rejected(alpha: f64, x: DVector<f64>, f: f64) -> Self {
        let n = x.len();
        Self {
            alpha,
            x,
            f: if f.is_nan() { f64::INFINITY } else { f },
            g: DVector::zeros(n),
            slope: f64::NAN,
        }
    }
}

/// First trial step: the previous decrease extrapolated along the new slope,
/// capped at a full step.
fn initial_step(fx: f64, f_prev: f64, slope: f64) -> f64 {
    let alpha = 1.01 * 2.0 * (fx - f_prev) / slope;
    if alpha.is_finite() && alpha > 0.0 {
        alpha.min(1.0)
    } else {
        1.0
    }
}

/// Minimizer of the quadratic through `(a_lo, f_lo)` with slope `d_lo` and
/// `(a_hi, f_hi)`. Bisects when that minimizer is missing or hugs an end.
fn interpolate(a_lo: f64, f_lo: f64, d_lo: f64, a_hi: f64, f_hi: f64) -> f64 {
    let delta = a_hi - a_lo;
    let bisect = a_lo + 0.5 * delta;
    let curvature = 2.0 * (f_hi - f_lo - d_lo * delta);
    if !(curvature.is_finite() && curvature > 0.0) {
        return bisect;
    }
    let candidate = a_lo - d_lo * delta * delta / curvature;
    let margin = 0.1 * delta.abs();
    if candidate.is_finite() && candidate >= a_lo.min(a_hi) + margin && candidate <= a_lo.max(a_hi) - margin {
        candidate
    } else {
        bisect
    }
}

/// Locally minimizes `evaluator` from `start`.
///
/// The reported energy is re-evaluated at the returned vector. Callers decide
/// what a failed refinement means for their search.
pub fn refine(minimizer: &dyn LocalMinimizer, evaluator: &dyn Evaluator, start: &DVector<f64>) -> Refinement {
    let objective = |v: &DVector<f64>| evaluator.energy(v);
    let mut result = minimizer.minimize(&objective, start);
    result.energy = evaluator.energy(&result.vector);
    result
}
