//! Damped Newton iteration for two real unknowns.
//!
//! Complex equations `g(z) = 0` are solved by splitting `z` into its real and
//! imaginary parts and iterating on `F(x, y) = (Re g, Im g)`. Each Newton step
//! solves the 2×2 Jacobian system with an LU factorization and is halved
//! until the residual norm decreases.

use nalgebra::{Matrix2, Vector2};

use crate::math::{CScalar, Scalar};

/// Smallest step fraction tried before the iteration is declared stalled.
const MIN_STEP_FRACTION: Scalar = 1.0 / 1_048_576.0;

/// Convergence criteria for the root finder.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConvergenceCriteria {
    /// Maximum number of Newton iterations.
    pub max_iterations: usize,
    /// Relative step tolerance: ||Δx||/||x|| < rel_tol.
    pub relative_tolerance: Scalar,
    /// Absolute residual tolerance: ||F(x)|| < abs_tol.
    pub absolute_tolerance: Scalar,
}

impl Default for ConvergenceCriteria {
    fn default() -> Self {
        Self {
            max_iterations: 100,
            relative_tolerance: 1e-12,
            absolute_tolerance: 1e-12,
        }
    }
}

impl ConvergenceCriteria {
    /// Checks the residual and (full Newton) step against the tolerances.
    fn is_converged(
        &self,
        residual_norm: Scalar,
        step_norm: Scalar,
        solution_norm: Scalar,
    ) -> bool {
        residual_norm < self.absolute_tolerance
            || step_norm < self.relative_tolerance * solution_norm.max(Scalar::MIN_POSITIVE)
    }
}

/// Reasons the root finder gave up.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConvergenceError {
    /// Iteration budget exhausted.
    #[error("no convergence after {iterations} iterations (residual {residual:.3e})")]
    MaxIterations {
        /// Iterations performed.
        iterations: usize,
        /// Residual norm at termination.
        residual: Scalar,
    },
    /// The Jacobian could not be inverted.
    #[error("singular jacobian after {iterations} iterations")]
    SingularJacobian {
        /// Iterations performed.
        iterations: usize,
    },
    /// No damped step reduced the residual.
    #[error("iteration stalled after {iterations} iterations (residual {residual:.3e})")]
    Stalled {
        /// Iterations performed.
        iterations: usize,
        /// Residual norm at termination.
        residual: Scalar,
    },
    /// The function is undefined at the initial guess.
    #[error("function undefined at initial guess")]
    Domain,
}

/// Converged root with diagnostics.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Root {
    /// Solution as `(x, y)`.
    pub x: Vector2<Scalar>,
    /// Newton iterations used.
    pub iterations: usize,
    /// Residual norm at the solution.
    pub residual: Scalar,
}

impl Root {
    /// Solution as a complex number `x + iy`.
    #[must_use]
    pub fn as_complex(&self) -> CScalar {
        CScalar::new(self.x[0], self.x[1])
    }
}

/// Finds a root of `system`, starting from `initial`.
///
/// `system` returns the residual and its Jacobian at a point, or `None`
/// where the function is undefined; such points are avoided by step damping.
pub fn newton_2d<F>(
    mut system: F,
    initial: Vector2<Scalar>,
    criteria: &ConvergenceCriteria,
) -> Result<Root, ConvergenceError>
where
    F: FnMut(&Vector2<Scalar>) -> Option<(Vector2<Scalar>, Matrix2<Scalar>)>,
{
    let mut x = initial;
    let (mut residual, mut jacobian) = system(&x).ok_or(ConvergenceError::Domain)?;

    for iteration in 0..criteria.max_iterations {
        let residual_norm = residual.norm();
        if residual_norm < criteria.absolute_tolerance {
            return Ok(Root { x, iterations: iteration, residual: residual_norm });
        }

        let step = jacobian
            .lu()
            .solve(&(-residual))
            .filter(|s| s.iter().all(|v| v.is_finite()))
            .ok_or(ConvergenceError::SingularJacobian { iterations: iteration })?;

        let mut fraction = 1.0;
        loop {
            let trial = x + step * fraction;
            if let Some((r, j)) = system(&trial) {
                if r.norm() < residual_norm {
                    x = trial;
                    residual = r;
                    jacobian = j;
                    break;
                }
            }
            fraction *= 0.5;
            if fraction < MIN_STEP_FRACTION {
                return Err(ConvergenceError::Stalled {
                    iterations: iteration,
                    residual: residual_norm,
                });
            }
        }

        if fraction == 1.0 && criteria.is_converged(residual.norm(), step.norm(), x.norm()) {
            return Ok(Root { x, iterations: iteration + 1, residual: residual.norm() });
        }
    }

    Err(ConvergenceError::MaxIterations {
        iterations: criteria.max_iterations,
        residual: residual.norm(),
    })
}

/// Newton solve of a holomorphic complex equation `g(z) = 0`.
///
/// `g` returns the value and complex derivative at `z`; the real Jacobian
/// follows from the Cauchy-Riemann equations.
pub fn newton_complex<G>(
    mut g: G,
    initial: CScalar,
    criteria: &ConvergenceCriteria,
) -> Result<Root, ConvergenceError>
where
    G: FnMut(CScalar) -> Option<(CScalar, CScalar)>,
{
    newton_2d(
        |x| {
            let (value, slope) = g(CScalar::new(x[0], x[1]))?;
            let residual = Vector2::new(value.re, value.im);
            let jacobian = Matrix2::new(slope.re, -slope.im, slope.im, slope.re);
            Some((residual, jacobian))
        },
        Vector2::new(initial.re, initial.im),
        criteria,
    )
}
