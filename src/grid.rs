//! Grid parameters that the coefficient formulas depend on.
//!
//! The field solver owns the grid; this crate only needs its time step and
//! cell dimensions. A [`GridContext`] can only be built from positive, finite
//! values, so holding one means the grid has been finalized.

use crate::constants::SPEED_OF_LIGHT;
use crate::math::Scalar;

/// Errors raised while describing the grid.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GridError {
    /// A spatial or temporal step is zero, negative or not finite.
    #[error("grid parameter {name} must be positive and finite, got {value}")]
    InvalidStep {
        /// Parameter name (`dt`, `dx`, `dy` or `dz`).
        name: &'static str,
        /// Offending value.
        value: Scalar,
    },
    /// The Courant factor is outside (0, 1].
    #[error("courant factor must lie in (0, 1], got {0}")]
    InvalidCourant(Scalar),
}

/// Time step and cell size of the FDTD grid.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridContext {
    dt: Scalar,
    dx: Scalar,
    dy: Scalar,
    dz: Scalar,
}

impl GridContext {
    /// Creates a grid context from cell sizes (m) and a time step (s).
    pub fn new(dx: Scalar, dy: Scalar, dz: Scalar, dt: Scalar) -> Result<Self, GridError> {
        check_step("dx", dx)?;
        check_step("dy", dy)?;
        check_step("dz", dz)?;
        check_step("dt", dt)?;
        Ok(Self { dt, dx, dy, dz })
    }

    /// Creates a grid context whose time step is `factor` times the 3D Courant limit
    /// `1 / (c·sqrt(1/dx² + 1/dy² + 1/dz²))`.
    pub fn with_courant(
        dx: Scalar,
        dy: Scalar,
        dz: Scalar,
        factor: Scalar,
    ) -> Result<Self, GridError> {
        if !(factor > 0.0 && factor <= 1.0) {
            return Err(GridError::InvalidCourant(factor));
        }
        check_step("dx", dx)?;
        check_step("dy", dy)?;
        check_step("dz", dz)?;
        let limit = 1.0 / (SPEED_OF_LIGHT * (dx.powi(-2) + dy.powi(-2) + dz.powi(-2)).sqrt());
        Self::new(dx, dy, dz, factor * limit)
    }

    /// Time step in seconds.
    #[must_use]
    pub const fn dt(&self) -> Scalar {
        self.dt
    }

    /// Cell size along x in meters.
    #[must_use]
    pub const fn dx(&self) -> Scalar {
        self.dx
    }

    /// Cell size along y in meters.
    #[must_use]
    pub const fn dy(&self) -> Scalar {
        self.dy
    }

    /// Cell size along z in meters.
    #[must_use]
    pub const fn dz(&self) -> Scalar {
        self.dz
    }
}

fn check_step(name: &'static str, value: Scalar) -> Result<(), GridError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(GridError::InvalidStep { name, value })
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn rejects_non_positive_steps() {
        let err = GridContext::new(1e-3, 0.0, 1e-3, 1e-12).unwrap_err();
        assert_eq!(err, GridError::InvalidStep { name: "dy", value: 0.0 });
        assert!(GridContext::new(1e-3, 1e-3, 1e-3, Scalar::NAN).is_err());
        assert!(GridContext::new(-1e-3, 1e-3, 1e-3, 1e-12).is_err());
    }

    #[test]
    fn courant_step_for_cubic_cells() {
        let grid = GridContext::with_courant(1e-3, 1e-3, 1e-3, 1.0).expect("valid grid");
        let expected = 1e-3 / (SPEED_OF_LIGHT * 3.0_f64.sqrt());
        assert_relative_eq!(grid.dt(), expected, max_relative = 1.0e-12);
        // 1 mm cells sit just under 2 ps
        assert!(grid.dt() < 2e-12);
    }

    #[test]
    fn courant_factor_scales_step() {
        let full = GridContext::with_courant(2e-3, 1e-3, 5e-4, 1.0).expect("valid grid");
        let half = GridContext::with_courant(2e-3, 1e-3, 5e-4, 0.5).expect("valid grid");
        assert_relative_eq!(half.dt(), 0.5 * full.dt(), max_relative = 1.0e-12);
        assert!(GridContext::with_courant(1e-3, 1e-3, 1e-3, 1.5).is_err());
    }
}
