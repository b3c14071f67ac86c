//! Bruggeman effective-medium mixing of lunar soil minerals.
//!
//! The effective permittivity `ε` of a mixture with volume fractions `fᵢ` and
//! component permittivities `εᵢ` satisfies
//!
//! ```text
//! Σ fᵢ·(εᵢ − ε)/(εᵢ + 2ε) = 0
//! ```
//!
//! which has no closed form beyond two components. It is solved with a damped
//! Newton iteration on `(Re ε, Im ε)`, seeded with the first component.
//!
//! Permittivities are complex relative values `εr + iσ/(ωε₀)` at the soil's
//! centre frequency; the effective conductivity is recovered as
//! `Im ε·ω·ε₀`.

use num_complex::Complex;
use rand::Rng;

use crate::constants::{angular_frequency, VACUUM_PERMITTIVITY};
use crate::errors::MaterialError;
use crate::materials::{Material, MaterialCollection};
use crate::math::{CScalar, Scalar};

use super::solver::{newton_complex, ConvergenceCriteria, ConvergenceError, Root};
use super::{check_bins, mixture_material_id};

/// Minerals of the lunar soil model.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mineral {
    /// Iron(II) oxide.
    FeO,
    /// Titanium dioxide.
    TiO2,
    /// Aluminium oxide.
    Al2O3,
    /// Magnesium oxide.
    MgO,
    /// Silicon dioxide.
    SiO2,
    /// Calcium oxide.
    CaO,
}

/// Constitutive parameters and density of a mineral.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MineralProperties {
    /// Relative permittivity.
    pub er: Scalar,
    /// Electric conductivity in S/m.
    pub se: Scalar,
    /// Relative permeability.
    pub mr: Scalar,
    /// Magnetic loss in Ω/m.
    pub sm: Scalar,
    /// Density in g/cm³.
    pub density: Scalar,
}

impl Mineral {
    /// Every mineral, in the order used by fraction arrays.
    pub const ALL: [Self; 6] =
        [Self::FeO, Self::TiO2, Self::Al2O3, Self::MgO, Self::SiO2, Self::CaO];

    /// Tabulated properties of the mineral.
    #[must_use]
    pub const fn properties(self) -> MineralProperties {
        let (er, se, mr, density) = match self {
            Self::FeO => (14.2, 1e-2, 1.001, 5.74),
            Self::TiO2 => (86.0, 1e-4, 1.0, 4.23),
            Self::Al2O3 => (9.34, 5e-10, 1.0, 3.95),
            Self::MgO => (9.65, 1e-11, 1.0, 3.58),
            Self::SiO2 => (3.58, 1e-15, 1.0, 2.65),
            Self::CaO => (11.8, 1e-10, 1.0, 3.35),
        };
        MineralProperties { er, se, mr, sm: 0.0, density }
    }

    /// Complex relative permittivity `εr + iσ/(ωε₀)` at angular frequency `omega`.
    #[must_use]
    pub fn permittivity(self, omega: Scalar) -> CScalar {
        let p = self.properties();
        Complex::new(p.er, p.se / (omega * VACUUM_PERMITTIVITY))
    }
}

/// Lunar soil given by per-mineral weight fraction ranges.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct BruggemanSoil {
    /// Name of the soil.
    pub id: String,
    /// `(low, high)` weight fraction of each mineral, in [`Mineral::ALL`] order.
    pub weight_fractions: [(Scalar, Scalar); 6],
    /// Centre frequency of operation in Hz.
    pub centre_frequency: Scalar,
    /// Root-finder settings.
    pub criteria: ConvergenceCriteria,
}

/// One generated material.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BruggemanSample {
    /// numID of the material created for this bin.
    pub num_id: usize,
    /// Volume fractions in percent, summing to 100.
    pub volume_fractions: [Scalar; 6],
    /// Effective complex relative permittivity.
    pub permittivity: CScalar,
    /// Newton iterations used by the successful solve.
    pub iterations: usize,
}

impl BruggemanSoil {
    /// Creates a soil description with default solver settings.
    pub fn new(
        id: impl Into<String>,
        weight_fractions: [(Scalar, Scalar); 6],
        centre_frequency: Scalar,
    ) -> Result<Self, MaterialError> {
        let soil = Self {
            id: id.into(),
            weight_fractions,
            centre_frequency,
            criteria: ConvergenceCriteria::default(),
        };
        soil.validate()?;
        Ok(soil)
    }

    fn validate(&self) -> Result<(), MaterialError> {
        if !(self.centre_frequency.is_finite() && self.centre_frequency > 0.0) {
            return Err(MaterialError::InvalidFrequency(self.centre_frequency));
        }
        for (mineral, (lo, hi)) in Mineral::ALL.iter().zip(self.weight_fractions) {
            if !(lo >= 0.0 && hi >= lo && hi.is_finite()) {
                return Err(MaterialError::InvalidParameter(format!(
                    "soil '{}': {mineral:?} weight fraction range ({lo}, {hi}) \
                     must satisfy 0 <= low <= high",
                    self.id
                )));
            }
        }
        if self.weight_fractions.iter().all(|&(_, hi)| hi == 0.0) {
            return Err(MaterialError::InvalidParameter(format!(
                "soil '{}': at least one mineral needs a non-zero weight fraction",
                self.id
            )));
        }
        Ok(())
    }

    /// Volume fraction ranges, i.e. weight fraction ranges divided by density.
    #[must_use]
    pub fn volume_fraction_ranges(&self) -> [(Scalar, Scalar); 6] {
        let mut ranges = [(0.0, 0.0); 6];
        let minerals = Mineral::ALL.iter().zip(self.weight_fractions);
        for (slot, (mineral, (lo, hi))) in ranges.iter_mut().zip(minerals) {
            let density = mineral.properties().density;
            *slot = (lo / density, hi / density);
        }
        ranges
    }

    /// Draws one set of volume fractions uniformly within the ranges and
    /// renormalizes it to sum to 100.
    pub fn sample_fractions<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
    ) -> Result<[Scalar; 6], MaterialError> {
        let mut fractions = [0.0; 6];
        for (f, (lo, hi)) in fractions.iter_mut().zip(self.volume_fraction_ranges()) {
            *f = rng.gen_range(lo..=hi);
        }
        let total: Scalar = fractions.iter().sum();
        if total <= 0.0 {
            return Err(MaterialError::InvalidParameter(format!(
                "soil '{}': sampled volume fractions sum to zero",
                self.id
            )));
        }
        for f in &mut fractions {
            *f = *f / total * 100.0;
        }
        Ok(fractions)
    }

    /// Appends `nbins` non-dispersive materials with randomly sampled mineral
    /// fractions to `materials`, named after `box_name`.
    ///
    /// Randomness comes only from `rng`, so a seeded generator reproduces the
    /// batch exactly. Every bin is solved before any material is appended, so
    /// on error the collection is left unchanged.
    pub fn calculate_debye_properties<R: Rng + ?Sized>(
        &self,
        nbins: usize,
        box_name: &str,
        materials: &mut MaterialCollection,
        rng: &mut R,
    ) -> Result<Vec<BruggemanSample>, MaterialError> {
        check_bins(nbins)?;
        self.validate()?;

        let omega = angular_frequency(self.centre_frequency);
        let permittivities = Mineral::ALL.map(|m| m.permittivity(omega));

        let draws = (0..nbins)
            .map(|_| self.sample_fractions(rng))
            .collect::<Result<Vec<_>, _>>()?;

        let mut batch = Vec::with_capacity(nbins);
        let mut solved = Vec::with_capacity(nbins);
        for (index, volume_fractions) in draws.into_iter().enumerate() {
            let bin = index + 1;
            let root = bruggeman_permittivity(&volume_fractions, &permittivities, &self.criteria)
                .map_err(|source| MaterialError::MixtureBin { bin, source })?;
            let eps = root.as_complex();

            let weights: Scalar = volume_fractions.iter().sum();
            let average = |pick: fn(&MineralProperties) -> Scalar| {
                Mineral::ALL
                    .iter()
                    .zip(volume_fractions)
                    .map(|(m, f)| f * pick(&m.properties()))
                    .sum::<Scalar>()
                    / weights
            };

            let id = mixture_material_id(box_name, bin, nbins);
            let material = Material::new(
                id,
                eps.re,
                eps.im * omega * VACUUM_PERMITTIVITY,
                average(|p| p.mr),
                average(|p| p.sm),
            )?
            .with_averagable(false);
            batch.push(material);
            solved.push((volume_fractions, eps, root.iterations));
        }

        let num_ids = materials.push_all(batch)?;
        let samples: Vec<BruggemanSample> = num_ids
            .into_iter()
            .zip(solved)
            .map(|(num_id, (volume_fractions, permittivity, iterations))| BruggemanSample {
                num_id,
                volume_fractions,
                permittivity,
                iterations,
            })
            .collect();
        for sample in &samples {
            log::debug!(
                "bruggeman soil '{}': eps={:.4}{:+.4e}i in {} iterations -> numID {}",
                self.id,
                sample.permittivity.re,
                sample.permittivity.im,
                sample.iterations,
                sample.num_id
            );
        }

        log::info!("bruggeman soil '{}': created {nbins} materials for '{box_name}'", self.id);
        Ok(samples)
    }
}

/// Solves the Bruggeman equation for the effective permittivity of a mixture.
///
/// The first component's permittivity seeds the iteration. If that solve
/// fails, the fraction-weighted mean and then every other component are
/// tried as seeds before the first failure is returned.
pub fn bruggeman_permittivity(
    fractions: &[Scalar],
    permittivities: &[CScalar],
    criteria: &ConvergenceCriteria,
) -> Result<Root, ConvergenceError> {
    let total: Scalar = fractions.iter().sum();
    let equation = |eps: CScalar| -> Option<(CScalar, CScalar)> {
        let mut value = Complex::new(0.0, 0.0);
        let mut slope = Complex::new(0.0, 0.0);
        for (&f, &e) in fractions.iter().zip(permittivities) {
            let denom = e + 2.0 * eps;
            if denom.norm() == 0.0 {
                return None;
            }
            value += f * (e - eps) / denom;
            slope += -3.0 * f * e / (denom * denom);
        }
        Some((value / total, slope / total))
    };

    let Some(&first) = permittivities.first() else {
        return Err(ConvergenceError::Domain);
    };
    let first_attempt = match newton_complex(equation, first, criteria) {
        Ok(root) => return Ok(root),
        Err(err) => err,
    };

    let mean = fractions
        .iter()
        .zip(permittivities)
        .map(|(&f, &e)| f * e)
        .sum::<CScalar>()
        / total;
    for seed in std::iter::once(mean).chain(permittivities.iter().skip(1).copied()) {
        log::warn!(
            "bruggeman solve failed from {first:.4} ({first_attempt}); retrying from {seed:.4}"
        );
        if let Ok(root) = newton_complex(equation, seed, criteria) {
            return Ok(root);
        }
    }
    Err(first_attempt)
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    fn highland() -> BruggemanSoil {
        BruggemanSoil::new(
            "highland",
            [(4.0, 6.0), (0.5, 1.0), (20.0, 28.0), (5.0, 9.0), (44.0, 46.0), (12.0, 16.0)],
            100e6,
        )
        .expect("valid soil")
    }

    fn two_phase(f1: Scalar, e1: Scalar, e2: Scalar) -> Scalar {
        // 2ε² − bε − ε1ε2 = 0 with b = (3f1 − 1)ε1 + (3f2 − 1)ε2
        let f2 = 1.0 - f1;
        let b = (3.0 * f1 - 1.0) * e1 + (3.0 * f2 - 1.0) * e2;
        (b + (b * b + 8.0 * e1 * e2).sqrt()) / 4.0
    }

    #[test]
    fn two_phase_mixture_matches_closed_form() {
        let criteria = ConvergenceCriteria::default();
        for (f1, e1, e2) in [(0.3, 80.0, 4.0), (0.5, 3.58, 86.0), (0.9, 2.0, 10.0)] {
            let eps = [CScalar::new(e1, 0.0), CScalar::new(e2, 0.0)];
            let root =
                bruggeman_permittivity(&[f1, 1.0 - f1], &eps, &criteria).expect("converges");
            assert_relative_eq!(root.x[0], two_phase(f1, e1, e2), max_relative = 1.0e-10);
            assert_relative_eq!(root.x[1], 0.0, epsilon = 1.0e-10);
        }
    }

    #[test]
    fn identical_components_return_that_permittivity() {
        let eps = CScalar::new(7.0, 0.3);
        let criteria = ConvergenceCriteria::default();
        let root =
            bruggeman_permittivity(&[10.0, 30.0, 60.0], &[eps; 3], &criteria).expect("converges");
        assert_eq!(root.iterations, 0);
        assert_relative_eq!(root.x[0], 7.0);
        assert_relative_eq!(root.x[1], 0.3);
    }

    #[test]
    fn six_mineral_solution_satisfies_equation() {
        let soil = highland();
        let omega = angular_frequency(soil.centre_frequency);
        let eps = Mineral::ALL.map(|m| m.permittivity(omega));
        let fractions = [4.0, 1.0, 20.0, 8.0, 50.0, 17.0];
        let root = bruggeman_permittivity(&fractions, &eps, &soil.criteria).expect("converges");
        let e = root.as_complex();
        let residual: CScalar = fractions
            .iter()
            .zip(eps)
            .map(|(&f, ei)| f * (ei - e) / (ei + 2.0 * e))
            .sum();
        assert!(residual.norm() < 1.0e-9, "residual {residual}");
        assert!(e.re > Mineral::SiO2.properties().er && e.re < Mineral::TiO2.properties().er);
        assert!(e.im > 0.0);
    }

    #[test]
    fn batch_has_one_material_per_bin_with_normalized_fractions() {
        let soil = highland();
        let mut materials = MaterialCollection::with_builtins();
        let mut rng = StdRng::seed_from_u64(7);
        let samples = soil
            .calculate_debye_properties(8, "moon", &mut materials, &mut rng)
            .expect("valid batch");

        assert_eq!(samples.len(), 8);
        assert_eq!(materials.len(), 10);
        let ranges = soil.volume_fraction_ranges();
        for (k, sample) in samples.iter().enumerate() {
            let sum: Scalar = sample.volume_fractions.iter().sum();
            assert_relative_eq!(sum, 100.0, max_relative = 1.0e-12);

            let m = materials.by_num_id(sample.num_id).expect("appended");
            assert_eq!(m.num_id(), 2 + k);
            assert_eq!(m.id(), format!("|moon_{}|", k + 1));
            assert_eq!(m.poles(), 0);
            assert_eq!(m.dispersion().kind(), "");
            assert!(!m.averagable());
            assert_relative_eq!(m.er(), sample.permittivity.re);
            assert!(m.se() > 0.0);
            assert!(m.mr() > 1.0 - 1.0e-12 && m.mr() < 1.001 + 1.0e-12);
            assert_eq!(m.sm(), 0.0);

            // renormalized fractions keep the proportions of an in-range draw
            let ratio = |i: usize| sample.volume_fractions[i] / sample.volume_fractions[4];
            for (i, (lo, hi)) in ranges.iter().enumerate() {
                let upper = ratio(i) * ranges[4].1;
                let lower = ratio(i) * ranges[4].0;
                assert!(upper >= *lo * (1.0 - 1.0e-12), "mineral {i} below range");
                assert!(lower <= *hi * (1.0 + 1.0e-12), "mineral {i} above range");
            }
        }
    }

    #[test]
    fn unsolved_bin_is_reported_and_nothing_is_appended() {
        let mut soil = highland();
        soil.criteria.max_iterations = 0;
        let mut materials = MaterialCollection::with_builtins();
        let mut rng = StdRng::seed_from_u64(3);
        let err = soil
            .calculate_debye_properties(4, "moon", &mut materials, &mut rng)
            .unwrap_err();
        assert!(matches!(
            err,
            MaterialError::MixtureBin { bin: 1, source: ConvergenceError::MaxIterations { .. } }
        ));
        assert_eq!(materials.len(), 2);
        assert!(materials.get("|moon_1|").is_none());
    }

    #[test]
    fn name_collision_late_in_batch_appends_nothing() {
        let soil = highland();
        let mut materials = MaterialCollection::new();
        let taken = Material::new("|moon_3|", 5.0, 0.0, 1.0, 0.0).expect("valid material");
        materials.push(taken).expect("unique");
        let mut rng = StdRng::seed_from_u64(11);
        let err = soil
            .calculate_debye_properties(3, "moon", &mut materials, &mut rng)
            .unwrap_err();
        assert!(matches!(err, MaterialError::DuplicateMaterial(ref name) if name == "|moon_3|"));
        assert_eq!(materials.len(), 1);
    }

    #[test]
    fn seeded_generator_reproduces_batch() {
        let soil = highland();
        let run = |seed| {
            let mut materials = MaterialCollection::new();
            let mut rng = StdRng::seed_from_u64(seed);
            soil.calculate_debye_properties(4, "box", &mut materials, &mut rng)
                .expect("valid batch")
        };
        assert_eq!(run(42), run(42));
        assert_ne!(run(42), run(43));
    }

    #[test]
    fn weight_ranges_convert_to_volume_by_density() {
        let ranges = highland().volume_fraction_ranges();
        assert_relative_eq!(ranges[0].0, 4.0 / 5.74);
        assert_relative_eq!(ranges[4].1, 46.0 / 2.65);
    }

    #[test]
    fn conductivity_round_trips_through_imaginary_part() {
        let omega = angular_frequency(100e6);
        let eps = Mineral::FeO.permittivity(omega);
        let se = eps.im * omega * VACUUM_PERMITTIVITY;
        assert_relative_eq!(se, 1e-2, max_relative = 1.0e-12);
    }

    #[test]
    fn invalid_soils_are_rejected() {
        let mut ranges = [(1.0, 2.0); 6];
        assert!(BruggemanSoil::new("s", ranges, 0.0).is_err());
        ranges[2] = (3.0, 1.0);
        assert!(BruggemanSoil::new("s", ranges, 1e8).is_err());
        assert!(BruggemanSoil::new("s", [(0.0, 0.0); 6], 1e8).is_err());

        let soil = highland();
        let mut materials = MaterialCollection::new();
        let mut rng = StdRng::seed_from_u64(1);
        assert!(soil.calculate_debye_properties(0, "b", &mut materials, &mut rng).is_err());
    }
}
