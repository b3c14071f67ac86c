//! Peplinski semi-empirical soil model.
//!
//! Peplinski, Ulaby & Dobson, "Dielectric properties of soils in the
//! 0.3-1.3-GHz range", IEEE TGRS 33(3), 1995
//! (<http://dx.doi.org/10.1109/36.387598>).
//!
//! For a volumetric water fraction `mu` the soil is reduced to a single
//! Debye pole with the relaxation time of water: the model gives the real
//! permittivity at 1.3 GHz and an effective conductivity, and the Debye
//! increment is the part of the permittivity carried by the water.

use std::f64::consts::PI;

use crate::errors::MaterialError;
use crate::materials::{water, DebyePole, Dispersion, Material, MaterialCollection};
use crate::math::Scalar;
use crate::sweep::linspace;

use super::{check_bins, mixture_material_id};

/// Frequency (Hz) at which the water permittivity is evaluated.
const WATER_FREQUENCY: Scalar = 1.3e9;
/// Experimentally derived shape exponent α.
const ALPHA: Scalar = 0.65;

/// Soil described by its texture, densities and a water-content range.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct PeplinskiSoil {
    /// Name of the soil.
    pub id: String,
    /// Sand fraction S (0–1).
    pub sand_fraction: Scalar,
    /// Clay fraction C (0–1).
    pub clay_fraction: Scalar,
    /// Bulk density ρb in g/cm³.
    pub bulk_density: Scalar,
    /// Sand particle density ρs in g/cm³.
    pub sand_particle_density: Scalar,
    /// Volumetric water fraction range `(mu_lo, mu_hi)`.
    pub water_fraction: (Scalar, Scalar),
}

/// Derived Debye parameters of one soil sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PeplinskiProperties {
    /// Real relative permittivity at 1.3 GHz.
    pub er: Scalar,
    /// Relative permittivity at infinite frequency.
    pub eri: Scalar,
    /// Effective conductivity in S/m.
    pub conductivity: Scalar,
}

/// One generated material.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PeplinskiSample {
    /// numID of the material created for this bin.
    pub num_id: usize,
    /// Volumetric water fraction at the bin midpoint.
    pub water_fraction: Scalar,
    /// Derived Debye parameters.
    pub properties: PeplinskiProperties,
}

impl PeplinskiSoil {
    /// Creates a soil description, validating densities and ranges.
    pub fn new(
        id: impl Into<String>,
        sand_fraction: Scalar,
        clay_fraction: Scalar,
        bulk_density: Scalar,
        sand_particle_density: Scalar,
        water_fraction: (Scalar, Scalar),
    ) -> Result<Self, MaterialError> {
        let soil = Self {
            id: id.into(),
            sand_fraction,
            clay_fraction,
            bulk_density,
            sand_particle_density,
            water_fraction,
        };
        soil.validate()?;
        Ok(soil)
    }

    fn validate(&self) -> Result<(), MaterialError> {
        let invalid = |what: &str| {
            Err(MaterialError::InvalidParameter(format!("soil '{}': {what}", self.id)))
        };
        let unit = 0.0..=1.0;
        if !unit.contains(&self.sand_fraction) || !unit.contains(&self.clay_fraction) {
            return invalid("sand and clay fractions must lie in [0, 1]");
        }
        if !(self.bulk_density > 0.0 && self.sand_particle_density > 0.0) {
            return invalid("densities must be positive");
        }
        let (lo, hi) = self.water_fraction;
        if !(lo >= 0.0 && hi >= lo && hi > 0.0 && hi.is_finite()) {
            return invalid("water fraction range must satisfy 0 <= lo <= hi with hi > 0");
        }
        Ok(())
    }

    /// Midpoints of `nbins` equal-width bins spanning the water fraction range.
    #[must_use]
    pub fn water_fraction_bins(&self, nbins: usize) -> Vec<Scalar> {
        let (lo, hi) = self.water_fraction;
        let edges = linspace(lo, hi, nbins + 1);
        edges.windows(2).map(|e| 0.5 * (e[0] + e[1])).collect()
    }

    /// Debye parameters and conductivity for volumetric water fraction `mu`.
    #[must_use]
    pub fn properties(&self, mu: Scalar) -> PeplinskiProperties {
        let (s, c) = (self.sand_fraction, self.clay_fraction);
        let (rb, rs) = (self.bulk_density, self.sand_particle_density);

        let w = 2.0 * PI * WATER_FREQUENCY;
        let water_er = water::ERI + water::DELTA_ER / (1.0 + (w * water::TAU).powi(2));

        // permittivity of the sand particles
        let es = (1.01 + 0.44 * rs).powi(2) - 0.062;
        let b1 = 1.2748 - 0.519 * s - 0.152 * c;
        let b2 = 1.33797 - 0.603 * s - 0.166 * c;
        // 0.3 GHz to 1.3 GHz fit
        let sigf = 0.0467 + 0.2204 * rb - 0.411 * s + 0.6614 * c;

        // 1.4-18 GHz model with the linear correction for 0.3-1.3 GHz
        let er = (1.0 + (rb / rs) * (es.powf(ALPHA) - 1.0) + mu.powf(b1) * water_er.powf(ALPHA)
            - mu)
            .powf(1.0 / ALPHA);
        let er = 1.15 * er - 0.68;

        let water_share = mu.powf(b2 / ALPHA);
        PeplinskiProperties {
            er,
            eri: er - water_share * water::DELTA_ER,
            conductivity: water_share * (sigf * (rs - rb)) / (rs * mu),
        }
    }

    /// Appends one single-pole Debye material per water-fraction bin to
    /// `materials`, named after `box_name`.
    ///
    /// Every bin is built before any is appended, so on error the
    /// collection is left unchanged.
    pub fn calculate_debye_properties(
        &self,
        nbins: usize,
        box_name: &str,
        materials: &mut MaterialCollection,
    ) -> Result<Vec<PeplinskiSample>, MaterialError> {
        check_bins(nbins)?;
        self.validate()?;

        let mut batch = Vec::with_capacity(nbins);
        let mut bins = Vec::with_capacity(nbins);
        for (index, mu) in self.water_fraction_bins(nbins).into_iter().enumerate() {
            let properties = self.properties(mu);
            let id = mixture_material_id(box_name, index + 1, nbins);
            let material = Material::new(id, properties.eri, properties.conductivity, 1.0, 0.0)?
                .with_dispersion(Dispersion::Debye(vec![DebyePole {
                    delta_er: properties.er - properties.eri,
                    tau: water::TAU,
                }]))?
                .with_averagable(false);
            batch.push(material);
            bins.push((mu, properties));
        }

        let num_ids = materials.push_all(batch)?;
        let samples: Vec<PeplinskiSample> = num_ids
            .into_iter()
            .zip(bins)
            .map(|(num_id, (water_fraction, properties))| PeplinskiSample {
                num_id,
                water_fraction,
                properties,
            })
            .collect();
        for sample in &samples {
            let p = &sample.properties;
            log::debug!(
                "peplinski soil '{}': mu={:.4} er={:.4} eri={:.4} sig={:.4e} -> numID {}",
                self.id,
                sample.water_fraction,
                p.er,
                p.eri,
                p.conductivity,
                sample.num_id
            );
        }

        log::info!("peplinski soil '{}': created {nbins} materials for '{box_name}'", self.id);
        Ok(samples)
    }
}
