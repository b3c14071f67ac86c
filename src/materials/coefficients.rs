//! Electric and magnetic field update coefficients.
//!
//! For a lossy material the semi-implicit Yee update reads
//! `E⁺ = CA·E + CB·curl H` with
//!
//! ```text
//! EA = ε₀·εr/dt + σ/2 − (ε₀/dt)·Σ Re(zt2)
//! EB = ε₀·εr/dt − σ/2 − (ε₀/dt)·Σ Re(zt2)
//! CA = EB/EA,  CBx = 1/(dx·EA),  srce = 1/EA
//! ```
//!
//! and the dual expressions with μ₀, μr and σ* for the magnetic field. The
//! sum runs over the material's recursive-convolution pole slots and is empty
//! for non-dispersive materials.

use crate::constants::{VACUUM_PERMEABILITY, VACUUM_PERMITTIVITY};
use crate::errors::MaterialError;
use crate::grid::GridContext;
use crate::math::Scalar;

use super::{Material, PoleCoefficients};

/// Electric-field update coefficients of one material.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ElectricCoefficients {
    /// Self coefficient `EB/EA`.
    pub ca: Scalar,
    /// Curl coefficient along x.
    pub cbx: Scalar,
    /// Curl coefficient along y.
    pub cby: Scalar,
    /// Curl coefficient along z.
    pub cbz: Scalar,
    /// Source coefficient `1/EA`.
    pub srce: Scalar,
}

impl ElectricCoefficients {
    /// Coefficients in table order `(CA, CBx, CBy, CBz, srce)`.
    #[must_use]
    pub const fn as_row(&self) -> [Scalar; 5] {
        [self.ca, self.cbx, self.cby, self.cbz, self.srce]
    }
}

/// Magnetic-field update coefficients of one material.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MagneticCoefficients {
    /// Self coefficient `HB/HA`.
    pub da: Scalar,
    /// Curl coefficient along x.
    pub dbx: Scalar,
    /// Curl coefficient along y.
    pub dby: Scalar,
    /// Curl coefficient along z.
    pub dbz: Scalar,
    /// Source coefficient `1/HA`.
    pub srcm: Scalar,
}

impl MagneticCoefficients {
    /// Coefficients in table order `(DA, DBx, DBy, DBz, srcm)`.
    #[must_use]
    pub const fn as_row(&self) -> [Scalar; 5] {
        [self.da, self.dbx, self.dby, self.dbz, self.srcm]
    }
}

/// Computes the electric update coefficients of `material`.
///
/// `poles` are the material's pole slots from
/// [`calculate_poles`](super::calculate_poles); pass an empty slice for a
/// non-dispersive material. Perfect conductors get all-zero coefficients.
pub fn calculate_update_coeffs_e(
    material: &Material,
    poles: &[PoleCoefficients],
    grid: &GridContext,
) -> Result<ElectricCoefficients, MaterialError> {
    if material.is_pec() {
        return Ok(ElectricCoefficients::default());
    }

    let dt = grid.dt();
    let zt2_sum: Scalar = poles.iter().map(|p| p.zt2.re).sum();
    let dispersive = zt2_sum * VACUUM_PERMITTIVITY / dt;
    let base = VACUUM_PERMITTIVITY * material.er() / dt;
    let ea = base + 0.5 * material.se() - dispersive;
    let eb = base - 0.5 * material.se() - dispersive;
    if ea == 0.0 || !ea.is_finite() || !eb.is_finite() {
        return Err(MaterialError::degenerate(material.id(), None, "EA is zero or not finite"));
    }

    Ok(ElectricCoefficients {
        ca: eb / ea,
        cbx: 1.0 / (grid.dx() * ea),
        cby: 1.0 / (grid.dy() * ea),
        cbz: 1.0 / (grid.dz() * ea),
        srce: 1.0 / ea,
    })
}

/// Computes the magnetic update coefficients of `material`.
pub fn calculate_update_coeffs_h(
    material: &Material,
    grid: &GridContext,
) -> Result<MagneticCoefficients, MaterialError> {
    let base = VACUUM_PERMEABILITY * material.mr() / grid.dt();
    let ha = base + 0.5 * material.sm();
    let hb = base - 0.5 * material.sm();
    if ha == 0.0 || !ha.is_finite() {
        return Err(MaterialError::degenerate(material.id(), None, "HA is zero or not finite"));
    }

    Ok(MagneticCoefficients {
        da: hb / ha,
        dbx: 1.0 / (grid.dx() * ha),
        dby: 1.0 / (grid.dy() * ha),
        dbz: 1.0 / (grid.dz() * ha),
        srcm: 1.0 / ha,
    })
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::materials::{calculate_poles, DebyePole, Dispersion, PoleWatermark};

    fn grid() -> GridContext {
        GridContext::new(1e-3, 2e-3, 4e-3, 1.0e-12).expect("valid grid")
    }

    #[test]
    fn free_space_passes_fields_unchanged() {
        let g = grid();
        let m = Material::free_space();
        let e = calculate_update_coeffs_e(&m, &[], &g).expect("finite");
        let h = calculate_update_coeffs_h(&m, &g).expect("finite");
        assert_relative_eq!(e.ca, 1.0);
        assert_relative_eq!(h.da, 1.0);
        assert_relative_eq!(e.cbx, g.dt() / (VACUUM_PERMITTIVITY * g.dx()), max_relative = 1.0e-12);
        assert_relative_eq!(e.cby, g.dt() / (VACUUM_PERMITTIVITY * g.dy()), max_relative = 1.0e-12);
        assert_relative_eq!(e.srce, g.dt() / VACUUM_PERMITTIVITY, max_relative = 1.0e-12);
        assert_relative_eq!(h.dbz, g.dt() / (VACUUM_PERMEABILITY * g.dz()), max_relative = 1.0e-12);
    }

    #[test]
    fn ca_tends_to_one_as_conductivity_vanishes() {
        let g = grid();
        let mut previous = Scalar::INFINITY;
        for se in [1.0, 1.0e-2, 1.0e-4, 1.0e-6] {
            let m = Material::new("lossy", 4.0, se, 1.0, 0.0).expect("valid material");
            let e = calculate_update_coeffs_e(&m, &[], &g).expect("finite");
            let gap = (1.0 - e.ca).abs();
            assert!(gap < previous, "CA should approach 1, gap {gap} at se={se}");
            previous = gap;
        }
        let lossless = Material::new("lossless", 4.0, 0.0, 1.0, 0.0).expect("valid material");
        assert_eq!(calculate_update_coeffs_e(&lossless, &[], &g).expect("finite").ca, 1.0);
    }

    #[test]
    fn perfect_conductor_zeroes_electric_coefficients() {
        let g = grid();
        let by_name = Material::new("pec", 7.5, 0.0, 1.0, 0.0).expect("valid material");
        let by_conductivity =
            Material::new("metal", 3.0, Scalar::INFINITY, 1.0, 0.0).expect("valid material");
        for m in [Material::pec(), by_name, by_conductivity] {
            let e = calculate_update_coeffs_e(&m, &[], &g).expect("pec is not an error");
            assert_eq!(e.as_row(), [0.0; 5]);
        }
    }

    #[test]
    fn debye_poles_lower_ea() {
        let g = grid();
        let pole = DebyePole { delta_er: 5.0, tau: 1.0e-11 };
        let m = Material::new("debye", 2.0, 0.01, 1.0, 0.0)
            .and_then(|m| m.with_dispersion(Dispersion::Debye(vec![pole])))
            .expect("valid material");
        let mut watermark = PoleWatermark::new();
        watermark.register(1);
        let poles = calculate_poles(&m, &watermark, &g).expect("finite poles");
        let e = calculate_update_coeffs_e(&m, &poles, &g).expect("finite");

        let zt2 = poles[0].zt2.re;
        let ea = VACUUM_PERMITTIVITY * 2.0 / g.dt() + 0.005 - VACUUM_PERMITTIVITY / g.dt() * zt2;
        let eb = VACUUM_PERMITTIVITY * 2.0 / g.dt() - 0.005 - VACUUM_PERMITTIVITY / g.dt() * zt2;
        assert!(zt2 < 0.0);
        assert_relative_eq!(e.ca, eb / ea, max_relative = 1.0e-12);
        assert_relative_eq!(e.srce, 1.0 / ea, max_relative = 1.0e-12);
    }

    #[test]
    fn magnetic_loss_enters_da() {
        let g = grid();
        let m = Material::new("ferrite", 1.0, 0.0, 3.0, 50.0).expect("valid material");
        let h = calculate_update_coeffs_h(&m, &g).expect("finite");
        let base = VACUUM_PERMEABILITY * 3.0 / g.dt();
        assert_relative_eq!(h.da, (base - 25.0) / (base + 25.0), max_relative = 1.0e-12);
        assert_relative_eq!(h.srcm, 1.0 / (base + 25.0), max_relative = 1.0e-12);
    }

    #[test]
    fn vanishing_denominators_are_errors() {
        let g = grid();
        let m = Material::new("void", 0.0, 0.0, 0.0, 0.0).expect("valid material");
        assert!(matches!(
            calculate_update_coeffs_e(&m, &[], &g),
            Err(MaterialError::DegenerateCoefficient { pole: None, .. })
        ));
        assert!(calculate_update_coeffs_h(&m, &g).is_err());
    }
}
