//! Complex pole model and recursive-convolution coefficients.
//!
//! Every dispersion model is reduced to poles of the form `w / (s - q)` with
//! complex weight `w` and decay `q`. The piecewise-linear recursive
//! convolution of Giannopoulos (<http://dx.doi.org/10.1109/TAP.2014.2308549>)
//! then needs, per pole and time step `dt`:
//!
//! ```text
//! eqt  = exp(q·dt)
//! eqt2 = exp(q·dt/2)
//! zt   = (w/q)·(1 − eqt)/dt
//! zt2  = (w/q)·(1 − eqt2)
//! ```
//!
//! Parameter conventions per model:
//!
//! | Model   | `w`                           | `q`                        |
//! |---------|-------------------------------|----------------------------|
//! | Debye   | `Δεr/τ`                       | `−1/τ`                     |
//! | Lorentz | `−i·wp²·Δεr / sqrt(wp² − α²)` | `−α + i·sqrt(wp² − α²)`    |
//! | Drude   | `−wp²/α`                      | `−α`                       |
//!
//! with `wp² = (2π·f)²`. The Lorentz root is taken on the principal branch
//! (see [`principal_sqrt`]), so an overdamped pole (`α² > wp²`) yields a real
//! weight and a real decay `−α − sqrt(α² − wp²)`.

use std::f64::consts::PI;

use num_complex::Complex;

use crate::errors::MaterialError;
use crate::grid::GridContext;
use crate::math::{principal_sqrt, CScalar, Scalar, J};

use super::{Dispersion, Material, PoleWatermark};

/// Pole parameters and recursive-convolution state for one pole slot.
///
/// Unused slots (beyond a material's own pole count) stay all-zero.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PoleCoefficients {
    /// Complex pole weight.
    pub w: CScalar,
    /// Complex decay constant.
    pub q: CScalar,
    /// `exp(q·dt)`.
    pub eqt: CScalar,
    /// `exp(q·dt/2)`.
    pub eqt2: CScalar,
    /// `(w/q)·(1 − eqt)/dt`.
    pub zt: CScalar,
    /// `(w/q)·(1 − eqt2)`.
    pub zt2: CScalar,
}

impl PoleCoefficients {
    fn from_pole(w: CScalar, q: CScalar, dt: Scalar) -> Self {
        let one = Complex::new(1.0, 0.0);
        let eqt = (q * dt).exp();
        let eqt2 = (q * (dt / 2.0)).exp();
        let ratio = w / q;
        Self {
            w,
            q,
            eqt,
            eqt2,
            zt: ratio * (one - eqt) / dt,
            zt2: ratio * (one - eqt2),
        }
    }

    fn is_finite(&self) -> bool {
        [self.w, self.q, self.eqt, self.eqt2, self.zt, self.zt2]
            .iter()
            .all(|c| c.is_finite())
    }
}

/// Derives the pole coefficients of `material` for the grid time step.
///
/// The returned vector always has `watermark.max_poles()` entries, with the
/// material's own poles first and zero padding after. Non-dispersive
/// materials get an all-zero vector.
pub fn calculate_poles(
    material: &Material,
    watermark: &PoleWatermark,
    grid: &GridContext,
) -> Result<Vec<PoleCoefficients>, MaterialError> {
    let poles = material.poles();
    if poles > watermark.max_poles() {
        return Err(MaterialError::WatermarkViolation {
            material: material.id().to_owned(),
            poles,
            max_poles: watermark.max_poles(),
        });
    }

    let mut out = vec![PoleCoefficients::default(); watermark.max_poles()];
    let weights_and_decays = pole_weights(material)?;
    for (x, (w, q)) in weights_and_decays.into_iter().enumerate() {
        if q.norm() == 0.0 {
            let reason = "decay constant q is zero";
            return Err(MaterialError::degenerate(material.id(), Some(x), reason));
        }
        let coeffs = PoleCoefficients::from_pole(w, q, grid.dt());
        if !coeffs.is_finite() {
            return Err(MaterialError::degenerate(
                material.id(),
                Some(x),
                "recursive convolution coefficients are not finite",
            ));
        }
        out[x] = coeffs;
    }
    Ok(out)
}

fn pole_weights(material: &Material) -> Result<Vec<(CScalar, CScalar)>, MaterialError> {
    let id = material.id();
    match material.dispersion() {
        Dispersion::None => Ok(Vec::new()),
        Dispersion::Debye(poles) => poles
            .iter()
            .enumerate()
            .map(|(x, p)| {
                if p.tau == 0.0 {
                    return Err(MaterialError::degenerate(id, Some(x), "relaxation time is zero"));
                }
                Ok((Complex::new(p.delta_er / p.tau, 0.0), Complex::new(-1.0 / p.tau, 0.0)))
            })
            .collect(),
        Dispersion::Lorentz(poles) => poles
            .iter()
            .enumerate()
            .map(|(x, p)| {
                if p.damping == 0.0 {
                    let reason = "damping coefficient is zero";
                    return Err(MaterialError::degenerate(id, Some(x), reason));
                }
                let wp2 = (2.0 * PI * p.frequency).powi(2);
                let root = principal_sqrt(wp2 - p.damping.powi(2));
                if root.norm() == 0.0 {
                    return Err(MaterialError::degenerate(
                        id,
                        Some(x),
                        "damping equals the resonant angular frequency",
                    ));
                }
                let w = -J * (wp2 * p.delta_er) / root;
                let q = Complex::new(-p.damping, 0.0) + J * root;
                Ok((w, q))
            })
            .collect(),
        Dispersion::Drude(poles) => poles
            .iter()
            .enumerate()
            .map(|(x, p)| {
                if p.inverse_relaxation == 0.0 {
                    let reason = "inverse relaxation time is zero";
                    return Err(MaterialError::degenerate(id, Some(x), reason));
                }
                let w = -(p.wp2() / p.inverse_relaxation);
                Ok((Complex::new(w, 0.0), Complex::new(-p.inverse_relaxation, 0.0)))
            })
            .collect(),
    }
}
