//! Constrained Optimization BY Linear Approximation.
//!
//! Minimizes `f(x)` subject to `c_k(x) >= 0` without derivatives. Linear
//! models of the objective and constraints are interpolated on a simplex of
//! `n + 1` points; steps are restricted to a trust region of radius `rho`
//! which shrinks from `rhobeg` to `rhoend`.
//!
//! The radius is only reduced once the simplex is well shaped. At the final
//! radius a coordinate poll around the best vertex confirms that no
//! neighbouring point is better; when one is, the radius grows again. This
//! keeps the search going on objectives with kinks, where the linear models
//! alone can stall far from the minimum.

use nalgebra::{DMatrix, DVector};
use qaoa_core::errors::{ErrorInfo, QaoaError};
use qaoa_core::{OptimizationResult, TerminationStatus};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

/// Inequality constraint, satisfied when the returned value is `>= 0`.
pub type Constraint<'a> = &'a dyn Fn(&[f64]) -> f64;

const RESTORATION_SWEEPS: usize = 100;
const DEGENERACY_TOLERANCE: f64 = 1e-13;
const POOR_RATIO: f64 = 0.1;
const GOOD_RATIO: f64 = 0.7;
/// A simplex is acceptable when every vertex lies within `MAX_EDGE * rho` of
/// the best one and at least `MIN_HEIGHT * rho` from its opposite face.
const MAX_EDGE: f64 = 2.1;
const MIN_HEIGHT: f64 = 0.25;
const GEOMETRY_STEP: f64 = 0.5;
const FAR_FROM_TRIAL: f64 = 1.1;

/// Tuning knobs of [`minimize`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CobylaOptions {
    /// Initial trust-region radius.
    pub rhobeg: f64,
    /// Final trust-region radius.
    pub rhoend: f64,
    /// Maximum number of objective evaluations.
    pub maxfun: usize,
}

impl Default for CobylaOptions {
    fn default() -> Self {
        Self {
            rhobeg: 1.0,
            rhoend: 1e-4,
            maxfun: 1000,
        }
    }
}

impl CobylaOptions {
    /// Checks that the radii and the budget describe a runnable search.
    pub fn validate(&self) -> Result<(), QaoaError> {
        if self.maxfun == 0 {
            return Err(invalid_options("maxfun must be at least 1")
                .with_context("maxfun", self.maxfun.to_string())
                .into());
        }
        for (name, value) in [("rhobeg", self.rhobeg), ("rhoend", self.rhoend)] {
            if !(value.is_finite() && value > 0.0) {
                return Err(invalid_options("trust-region radii must be positive and finite")
                    .with_context(name, value.to_string())
                    .into());
            }
        }
        if self.rhoend > self.rhobeg {
            return Err(invalid_options("rhoend must not exceed rhobeg")
                .with_context("rhobeg", self.rhobeg.to_string())
                .with_context("rhoend", self.rhoend.to_string())
                .with_hint("lower tol or raise rhobeg")
                .into());
        }
        Ok(())
    }
}

struct InvalidOptions(ErrorInfo);

impl InvalidOptions {
    fn with_context(self, key: &str, value: String) -> Self {
        Self(self.0.with_context(key, value))
    }

    fn with_hint(self, hint: &str) -> Self {
        Self(self.0.with_hint(hint))
    }
}

impl From<InvalidOptions> for QaoaError {
    fn from(err: InvalidOptions) -> Self {
        QaoaError::Optimizer(err.0)
    }
}

fn invalid_options(message: &str) -> InvalidOptions {
    InvalidOptions(ErrorInfo::new("invalid-options", message))
}

/// Minimizes `objective` from `x0` subject to `constraints`.
///
/// The number of objective evaluations never exceeds `options.maxfun`. For an
/// empty `x0` the objective is evaluated once at the empty point.
///
/// # Errors
///
/// Returns `QaoaError::Optimizer` with code `invalid-options` for an unusable
/// [`CobylaOptions`] or a non-finite starting point, and `non-finite-value`
/// when the objective or a constraint produces NaN or an infinity.
pub fn minimize<F>(
    mut objective: F,
    x0: &[f64],
    constraints: &[Constraint<'_>],
    options: &CobylaOptions,
) -> Result<OptimizationResult, QaoaError>
where
    F: FnMut(&[f64]) -> f64,
{
    options.validate()?;
    if let Some(index) = x0.iter().position(|value| !value.is_finite()) {
        return Err(QaoaError::Optimizer(
            ErrorInfo::new("invalid-options", "starting point must be finite")
                .with_context("index", index.to_string()),
        ));
    }

    let n = x0.len();
    let mut evaluator = Evaluator {
        objective: &mut objective,
        constraints,
        nfev: 0,
        maxfun: options.maxfun,
    };
    let Some(start) = evaluator.evaluate(DVector::from_column_slice(x0))? else {
        return Err(invalid_options("maxfun must be at least 1").into());
    };
    let mut search = Search {
        simplex: Vec::with_capacity(n + 1),
        rho: options.rhobeg,
        rhobeg: options.rhobeg,
        rhoend: options.rhoend,
        mu: 0.0,
        repair_geometry: false,
        polling: false,
    };
    search.simplex.push(start);
    for axis in 0..n {
        let x = offset(&search.simplex[0].x, axis, options.rhobeg);
        match evaluator.evaluate(x)? {
            Some(vertex) => search.simplex.push(vertex),
            None => break,
        }
    }

    let status = if n == 0 {
        TerminationStatus::Converged
    } else if search.simplex.len() < n + 1 {
        TerminationStatus::MaxEvaluations
    } else {
        search.run(&mut evaluator)?
    };

    let best = search.best_index();
    let vertex = &search.simplex[best];
    debug!(
        nfev = evaluator.nfev,
        fun = vertex.f,
        rho = search.rho,
        status = ?status,
        "cobyla finished"
    );
    Ok(OptimizationResult {
        x: vertex.x.iter().copied().collect(),
        fun: vertex.f,
        nfev: evaluator.nfev,
        status,
        max_constraint_violation: violation(&vertex.c),
    })
}

struct Vertex {
    x: DVector<f64>,
    f: f64,
    c: DVector<f64>,
}

struct Evaluator<'a, F> {
    objective: &'a mut F,
    constraints: &'a [Constraint<'a>],
    nfev: usize,
    maxfun: usize,
}

impl<F> Evaluator<'_, F>
where
    F: FnMut(&[f64]) -> f64,
{
    fn exhausted(&self) -> bool {
        self.nfev >= self.maxfun
    }

    /// Evaluates the objective and constraints at `x`; `None` once the
    /// budget is spent.
    fn evaluate(&mut self, x: DVector<f64>) -> Result<Option<Vertex>, QaoaError> {
        if self.exhausted() {
            return Ok(None);
        }
        self.nfev += 1;
        let f = (self.objective)(x.as_slice());
        let c = DVector::from_iterator(
            self.constraints.len(),
            self.constraints.iter().map(|constraint| constraint(x.as_slice())),
        );
        if !f.is_finite() || c.iter().any(|value| !value.is_finite()) {
            return Err(QaoaError::Optimizer(
                ErrorInfo::new("non-finite-value", "objective or constraint is not finite")
                    .with_context("nfev", self.nfev.to_string())
                    .with_context("fun", f.to_string()),
            ));
        }
        Ok(Some(Vertex { x, f, c }))
    }
}

/// Linear interpolation of the objective and constraints on the simplex,
/// centred on the best vertex.
struct Model {
    /// Row `r` holds the displacement of the `r`-th other vertex.
    displacements: DMatrix<f64>,
    inverse: DMatrix<f64>,
    gradient: DVector<f64>,
    /// Column `k` is the gradient of constraint `k`.
    normals: DMatrix<f64>,
    /// Distance of each other vertex from the best one.
    edges: DVector<f64>,
    /// Distance of each other vertex from the face spanned by the rest.
    heights: DVector<f64>,
}

impl Model {
    /// Returns `None` when the simplex is numerically degenerate.
    fn fit(simplex: &[Vertex], best: usize, others: &[usize]) -> Option<Self> {
        let base = &simplex[best];
        let n = others.len();
        let m = base.c.len();
        let displacements =
            DMatrix::from_fn(n, n, |r, j| simplex[others[r]].x[j] - base.x[j]);
        let inverse = displacements.clone().try_inverse()?;
        let edges = DVector::from_fn(n, |r, _| displacements.row(r).norm());
        let heights = DVector::from_fn(n, |r, _| inverse.column(r).norm().recip());
        if heights.iter().any(|height| !height.is_finite())
            || heights.min() <= DEGENERACY_TOLERANCE * edges.max()
        {
            return None;
        }

        let value_changes = DVector::from_fn(n, |r, _| simplex[others[r]].f - base.f);
        let constraint_changes =
            DMatrix::from_fn(n, m, |r, k| simplex[others[r]].c[k] - base.c[k]);
        Some(Self {
            gradient: &inverse * value_changes,
            normals: &inverse * constraint_changes,
            displacements,
            inverse,
            edges,
            heights,
        })
    }

    fn acceptable(&self, rho: f64) -> bool {
        self.edges.max() <= MAX_EDGE * rho && self.heights.min() >= MIN_HEIGHT * rho
    }

    /// Picks the vertex that spoils the shape most and a step of length
    /// `GEOMETRY_STEP * rho` away from its opposite face to replace it with.
    fn geometry_step(&self, c0: &DVector<f64>, mu: f64, rho: f64) -> (usize, DVector<f64>) {
        let drop = if self.edges.max() > MAX_EDGE * rho {
            self.edges.imax()
        } else {
            self.heights.imin()
        };
        let mut step = self.inverse.column(drop) * (GEOMETRY_STEP * rho * self.heights[drop]);
        let plus = linear_violation(&self.normals, c0, &step);
        let minus = linear_violation(&self.normals, c0, &-step.clone());
        if mu * (plus - minus) > 2.0 * self.gradient.dot(&step) {
            step = -step;
        }
        (drop, step)
    }

    /// Index of the vertex the trial point `best + step` should replace.
    fn vertex_to_replace(&self, step: &DVector<f64>, actual: f64, rho: f64) -> Option<usize> {
        let weights = self.inverse.tr_mul(step).abs();
        let mut replace = None;
        let mut largest = if actual > 0.0 { 0.0 } else { 1.0 };
        for (r, &weight) in weights.iter().enumerate() {
            if weight > largest {
                largest = weight;
                replace = Some(r);
            }
        }
        // Prefer dropping a distant vertex as long as the volume survives.
        let mut farthest = FAR_FROM_TRIAL * rho;
        for (r, &weight) in weights.iter().enumerate() {
            let scaled = weight * self.heights[r];
            if scaled < MIN_HEIGHT * rho && scaled < self.heights[r] {
                continue;
            }
            let distance = if actual > 0.0 {
                (step - self.displacements.row(r).transpose()).norm()
            } else {
                self.edges[r]
            };
            if distance > farthest {
                farthest = distance;
                replace = Some(r);
            }
        }
        replace
    }
}

struct Search {
    simplex: Vec<Vertex>,
    rho: f64,
    rhobeg: f64,
    rhoend: f64,
    mu: f64,
    repair_geometry: bool,
    polling: bool,
}

impl Search {
    fn merit(&self, vertex: &Vertex) -> f64 {
        vertex.f + self.mu * violation(&vertex.c)
    }

    fn best_index(&self) -> usize {
        let mut best = 0;
        for (index, vertex) in self.simplex.iter().enumerate().skip(1) {
            if self.merit(vertex) < self.merit(&self.simplex[best]) {
                best = index;
            }
        }
        best
    }

    fn others(&self, best: usize) -> Vec<usize> {
        (0..self.simplex.len()).filter(|&index| index != best).collect()
    }

    /// Halves `rho`; returns `true` once the final radius has been used up.
    fn shrink(&mut self) -> bool {
        if self.rho <= self.rhoend {
            return true;
        }
        self.rho *= 0.5;
        if self.rho <= 1.5 * self.rhoend {
            self.rho = self.rhoend;
        }
        debug!(rho = self.rho, "trust region reduced");
        false
    }

    fn expand(&mut self) {
        self.rho = (2.0 * self.rho).min(self.rhobeg);
        trace!(rho = self.rho, "trust region enlarged");
    }

    fn run<F>(&mut self, evaluator: &mut Evaluator<'_, F>) -> Result<TerminationStatus, QaoaError>
    where
        F: FnMut(&[f64]) -> f64,
    {
        let m = evaluator.constraints.len();
        loop {
            if evaluator.exhausted() {
                return Ok(TerminationStatus::MaxEvaluations);
            }

            let best = self.best_index();
            let others = self.others(best);
            let Some(model) = Model::fit(&self.simplex, best, &others) else {
                warn!(rho = self.rho, nfev = evaluator.nfev, "degenerate simplex, rebuilding");
                if !self.rebuild(evaluator, best, &others)? {
                    return Ok(TerminationStatus::MaxEvaluations);
                }
                continue;
            };
            let base = &self.simplex[best];
            trace!(rho = self.rho, mu = self.mu, fun = base.f, nfev = evaluator.nfev, "iteration");

            let acceptable = model.acceptable(self.rho);
            if self.repair_geometry {
                if !acceptable {
                    let (drop, step) = model.geometry_step(&base.c, self.mu, self.rho);
                    let Some(vertex) = evaluator.evaluate(&base.x + step)? else {
                        return Ok(TerminationStatus::MaxEvaluations);
                    };
                    self.simplex[others[drop]] = vertex;
                    continue;
                }
                self.repair_geometry = false;
            }

            let c0 = base.c.clone();
            let step = trust_region_step(&model.gradient, &model.normals, &c0, self.rho);
            let v0 = violation(&c0);
            let vl = linear_violation(&model.normals, &c0, &step);
            let linear_change = model.gradient.dot(&step);
            if m > 0 && vl < v0 && linear_change > 0.0 {
                let needed = linear_change / (v0 - vl);
                if self.mu < 1.5 * needed {
                    self.mu = 2.0 * needed;
                    trace!(mu = self.mu, "penalty increased");
                }
            }
            let predicted = -linear_change + self.mu * (v0 - vl);

            if step.norm() < 0.5 * self.rho || predicted <= 0.0 {
                if let Some(status) = self.settle(evaluator, &model.gradient, acceptable)? {
                    return Ok(status);
                }
                continue;
            }

            let best_merit = self.merit(&self.simplex[best]);
            let Some(trial) = evaluator.evaluate(&self.simplex[best].x + &step)? else {
                return Ok(TerminationStatus::MaxEvaluations);
            };
            let actual = best_merit - self.merit(&trial);
            if let Some(replace) = model.vertex_to_replace(&step, actual, self.rho) {
                self.simplex[others[replace]] = trial;
            }

            if actual >= GOOD_RATIO * predicted {
                self.expand();
            } else if actual <= POOR_RATIO * predicted {
                if let Some(status) = self.settle(evaluator, &model.gradient, acceptable)? {
                    return Ok(status);
                }
            }
        }
    }

    /// Decides what follows an iteration that made no real progress: repair
    /// the simplex, poll around the best vertex, or shrink the radius.
    fn settle<F>(
        &mut self,
        evaluator: &mut Evaluator<'_, F>,
        gradient: &DVector<f64>,
        acceptable: bool,
    ) -> Result<Option<TerminationStatus>, QaoaError>
    where
        F: FnMut(&[f64]) -> f64,
    {
        if !acceptable {
            self.repair_geometry = true;
            return Ok(None);
        }
        if self.rho <= self.rhoend || self.polling {
            match self.poll(evaluator, gradient)? {
                None => return Ok(Some(TerminationStatus::MaxEvaluations)),
                Some(true) => {
                    self.polling = true;
                    self.expand();
                    return Ok(None);
                }
                Some(false) => self.polling = false,
            }
        }
        Ok(self.shrink().then_some(TerminationStatus::Converged))
    }

    /// Replaces every non-best vertex by the better of `best ± rho * e_i`,
    /// trying the side the model points to first. When every coordinate
    /// move ties with the best value, the sum of the tied moves is tried.
    ///
    /// Returns whether a better vertex was found, or `None` when the budget
    /// ran out.
    fn poll<F>(
        &mut self,
        evaluator: &mut Evaluator<'_, F>,
        gradient: &DVector<f64>,
    ) -> Result<Option<bool>, QaoaError>
    where
        F: FnMut(&[f64]) -> f64,
    {
        let best = self.best_index();
        let others = self.others(best);
        let base = self.simplex[best].x.clone();
        let base_merit = self.merit(&self.simplex[best]);
        let mut tied = Vec::new();
        for (axis, &index) in others.iter().enumerate() {
            let toward = if gradient[axis] > 0.0 { -self.rho } else { self.rho };
            let Some(mut vertex) = evaluator.evaluate(offset(&base, axis, toward))? else {
                return Ok(None);
            };
            if self.merit(&vertex) >= base_merit {
                let Some(opposite) = evaluator.evaluate(offset(&base, axis, -toward))? else {
                    return Ok(None);
                };
                if self.merit(&opposite) < self.merit(&vertex) {
                    vertex = opposite;
                }
            }
            if self.merit(&vertex) == base_merit {
                tied.push(index);
            }
            self.simplex[index] = vertex;
        }

        let mut improved = others
            .iter()
            .any(|&index| self.merit(&self.simplex[index]) < base_merit);
        if !improved && tied.len() >= 2 {
            let mut x = base.clone();
            for &index in &tied {
                x += &self.simplex[index].x - &base;
            }
            let Some(vertex) = evaluator.evaluate(x)? else {
                return Ok(None);
            };
            if self.merit(&vertex) < base_merit {
                self.simplex[tied[0]] = vertex;
                improved = true;
            }
        }
        trace!(rho = self.rho, improved, nfev = evaluator.nfev, "coordinate poll");
        Ok(Some(improved))
    }

    /// Replaces every non-best vertex by `best + rho * e_i`. Returns `false`
    /// when the evaluation budget ran out first.
    fn rebuild<F>(
        &mut self,
        evaluator: &mut Evaluator<'_, F>,
        best: usize,
        others: &[usize],
    ) -> Result<bool, QaoaError>
    where
        F: FnMut(&[f64]) -> f64,
    {
        for (axis, &index) in others.iter().enumerate() {
            let x = offset(&self.simplex[best].x, axis, self.rho);
            let Some(vertex) = evaluator.evaluate(x)? else {
                return Ok(false);
            };
            self.simplex[index] = vertex;
        }
        Ok(true)
    }
}

fn offset(x: &DVector<f64>, axis: usize, delta: f64) -> DVector<f64> {
    let mut moved = x.clone();
    moved[axis] += delta;
    moved
}

/// Largest violation `max(0, -min_k c_k)`.
fn violation(constraints: &DVector<f64>) -> f64 {
    constraints.iter().fold(0.0_f64, |worst, &value| worst.max(-value))
}

/// Violation of the linearized constraints `c0 + A^T step`.
fn linear_violation(normals: &DMatrix<f64>, c0: &DVector<f64>, step: &DVector<f64>) -> f64 {
    violation(&(c0 + normals.tr_mul(step)))
}

/// Step of length at most `rho` minimizing the linear objective model while
/// keeping the linearized constraints `c0 + A^T d >= 0` where possible.
fn trust_region_step(
    gradient: &DVector<f64>,
    normals: &DMatrix<f64>,
    c0: &DVector<f64>,
    rho: f64,
) -> DVector<f64> {
    let m = c0.len();
    let mut step = DVector::<f64>::zeros(gradient.len());

    // Restore linearized feasibility by cyclic projection onto the halfspaces.
    for _ in 0..RESTORATION_SWEEPS {
        let mut feasible = true;
        for (k, normal) in normals.column_iter().enumerate() {
            let linear = c0[k] + normal.dot(&step);
            let norm_sq = normal.norm_squared();
            if linear < 0.0 && norm_sq > 0.0 {
                step.axpy(-linear / norm_sq, &normal, 1.0);
                feasible = false;
            }
        }
        if feasible {
            break;
        }
    }
    let length = step.norm();
    if length >= rho {
        return step * (rho / length);
    }

    // Follow the projected descent direction, adding each constraint it runs
    // into to the active set, until the ball boundary is reached.
    let mut active = vec![false; m];
    let mut basis: Vec<DVector<f64>> = Vec::new();
    for _ in 0..=m {
        let direction = project_out(-gradient.clone(), &basis);
        let blocking = (0..m).find(|&k| {
            let normal = normals.column(k);
            !active[k]
                && c0[k] + normal.dot(&step) <= 1e-12 * (1.0 + c0[k].abs())
                && normal.dot(&direction) < 0.0
        });
        if let Some(k) = blocking {
            activate(k, normals, &mut active, &mut basis);
            continue;
        }

        let ss = direction.norm_squared();
        if ss <= 1e-300 {
            return step;
        }
        let b = step.dot(&direction);
        let dd = step.norm_squared();
        let mut t = (-b + (b * b - ss * (dd - rho * rho)).max(0.0).sqrt()) / ss;
        let mut hit = None;
        for (k, normal) in normals.column_iter().enumerate() {
            let slope = normal.dot(&direction);
            if active[k] || slope >= 0.0 {
                continue;
            }
            let limit = (c0[k] + normal.dot(&step)).max(0.0) / -slope;
            if limit < t {
                t = limit;
                hit = Some(k);
            }
        }
        step.axpy(t, &direction, 1.0);
        match hit {
            Some(k) => activate(k, normals, &mut active, &mut basis),
            None => return step,
        }
    }
    step
}

/// Adds constraint `k` to the active set and its normal to the orthonormal
/// `basis` of active normals.
fn activate(k: usize, normals: &DMatrix<f64>, active: &mut [bool], basis: &mut Vec<DVector<f64>>) {
    active[k] = true;
    let normal = project_out(normals.column(k).clone_owned(), basis);
    if let Some(unit) = normal.try_normalize(1e-12) {
        basis.push(unit);
    }
}

fn project_out(mut vector: DVector<f64>, basis: &[DVector<f64>]) -> DVector<f64> {
    for unit in basis {
        let projection = unit.dot(&vector);
        vector.axpy(-projection, unit, 1.0);
    }
    vector
}
