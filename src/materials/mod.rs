//! Material records and the shared, ordered material collection.
//!
//! A [`Material`] is immutable constitutive data: bulk parameters plus an
//! optional [`Dispersion`] model. Everything the solver needs per time step
//! is derived from it by pure functions in [`coefficients`] and [`poles`],
//! and evaluated in the frequency domain by [`frequency`].
//!
//! Materials are appended to a [`MaterialCollection`], which assigns dense
//! numeric identifiers and keeps the global pole-count watermark.

use std::f64::consts::PI;

use crate::errors::MaterialError;
use crate::math::Scalar;

/// Update coefficient engine for E and H fields.
pub mod coefficients;
/// Complex-frequency evaluation of relative permittivity.
pub mod frequency;
/// Pole parameters and recursive-convolution coefficients.
pub mod poles;

pub use coefficients::{
    calculate_update_coeffs_e, calculate_update_coeffs_h, ElectricCoefficients,
    MagneticCoefficients,
};
pub use frequency::{calculate_er, PermittivityModel};
pub use poles::{calculate_poles, PoleCoefficients};

/// Reserved display name of the perfect electric conductor.
pub const PEC_ID: &str = "pec";
/// Reserved display name of free space.
pub const FREE_SPACE_ID: &str = "free_space";

/// Debye parameters of water (<http://dx.doi.org/10.1109/TGRS.2006.873208>).
pub mod water {
    use crate::math::Scalar;

    /// Static relative permittivity.
    pub const ER: Scalar = 80.1;
    /// Relative permittivity at infinite frequency.
    pub const ERI: Scalar = 4.9;
    /// Permittivity increment of the single Debye pole.
    pub const DELTA_ER: Scalar = ER - ERI;
    /// Relaxation time in seconds.
    pub const TAU: Scalar = 9.231e-12;
}

/// Debye parameters of grass (<http://dx.doi.org/10.1007/BF00902994>).
pub mod grass {
    use crate::math::Scalar;

    /// Static relative permittivity.
    pub const ER: Scalar = 18.5087;
    /// Relative permittivity at infinite frequency.
    pub const ERI: Scalar = 12.7174;
    /// Permittivity increment of the single Debye pole.
    pub const DELTA_ER: Scalar = ER - ERI;
    /// Relaxation time in seconds.
    pub const TAU: Scalar = 1.0793e-11;
}

/// One Debye relaxation term.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DebyePole {
    /// Permittivity increment Δεr.
    pub delta_er: Scalar,
    /// Relaxation time τ in seconds.
    pub tau: Scalar,
}

/// One Lorentz resonance term.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LorentzPole {
    /// Permittivity increment Δεr.
    pub delta_er: Scalar,
    /// Pole (resonant) frequency in Hz.
    pub frequency: Scalar,
    /// Damping coefficient in s⁻¹.
    pub damping: Scalar,
}

/// One Drude term.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrudePole {
    /// Pole frequency in Hz.
    pub frequency: Scalar,
    /// Inverse relaxation time in s⁻¹.
    pub inverse_relaxation: Scalar,
}

impl DrudePole {
    /// Squared angular pole frequency `(2π·f)²`.
    #[must_use]
    pub fn wp2(&self) -> Scalar {
        (2.0 * PI * self.frequency).powi(2)
    }
}

/// Dispersion model of a material with its per-pole payload.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Dispersion {
    /// Frequency-independent material.
    #[default]
    None,
    /// Sum of Debye relaxations.
    Debye(Vec<DebyePole>),
    /// Sum of Lorentz resonances.
    Lorentz(Vec<LorentzPole>),
    /// Sum of Drude terms.
    Drude(Vec<DrudePole>),
}

impl Dispersion {
    /// Number of poles carried by the model.
    #[must_use]
    pub fn poles(&self) -> usize {
        match self {
            Self::None => 0,
            Self::Debye(p) => p.len(),
            Self::Lorentz(p) => p.len(),
            Self::Drude(p) => p.len(),
        }
    }

    /// Short lowercase name of the model, empty for non-dispersive materials.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::None => "",
            Self::Debye(_) => "debye",
            Self::Lorentz(_) => "lorentz",
            Self::Drude(_) => "drude",
        }
    }

    /// True for Debye, Lorentz and Drude models with at least one pole.
    #[must_use]
    pub fn is_dispersive(&self) -> bool {
        self.poles() > 0
    }
}

/// Linear, isotropic material as seen by the FDTD solver.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    num_id: usize,
    id: String,
    er: Scalar,
    se: Scalar,
    se_bulk: Scalar,
    mr: Scalar,
    sm: Scalar,
    dispersion: Dispersion,
    averagable: bool,
}

impl Material {
    /// Creates a non-dispersive material.
    ///
    /// `se` may be `f64::INFINITY` to mark a perfect conductor. The numeric
    /// identifier is assigned when the material is pushed into a
    /// [`MaterialCollection`].
    pub fn new(
        id: impl Into<String>,
        er: Scalar,
        se: Scalar,
        mr: Scalar,
        sm: Scalar,
    ) -> Result<Self, MaterialError> {
        let id = id.into();
        for (name, value) in [("er", er), ("mr", mr), ("sm", sm)] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(MaterialError::InvalidParameter(format!(
                    "{name} of material '{id}' must be finite and non-negative, got {value}"
                )));
            }
        }
        if se.is_nan() || se < 0.0 {
            return Err(MaterialError::InvalidParameter(format!(
                "se of material '{id}' must be non-negative, got {se}"
            )));
        }
        Ok(Self {
            num_id: 0,
            id,
            er,
            se,
            se_bulk: se,
            mr,
            sm,
            dispersion: Dispersion::None,
            averagable: true,
        })
    }

    /// Free space: `er = mr = 1`, lossless.
    #[must_use]
    pub fn free_space() -> Self {
        Self {
            num_id: 0,
            id: FREE_SPACE_ID.to_owned(),
            er: 1.0,
            se: 0.0,
            se_bulk: 0.0,
            mr: 1.0,
            sm: 0.0,
            dispersion: Dispersion::None,
            averagable: true,
        }
    }

    /// Perfect electric conductor.
    #[must_use]
    pub fn pec() -> Self {
        Self {
            id: PEC_ID.to_owned(),
            se: Scalar::INFINITY,
            se_bulk: Scalar::INFINITY,
            averagable: false,
            ..Self::free_space()
        }
    }

    /// Single-pole Debye model of water.
    #[must_use]
    pub fn water() -> Self {
        Self {
            id: "water".to_owned(),
            er: water::ERI,
            dispersion: Dispersion::Debye(vec![DebyePole {
                delta_er: water::DELTA_ER,
                tau: water::TAU,
            }]),
            averagable: false,
            ..Self::free_space()
        }
    }

    /// Single-pole Debye model of grass.
    #[must_use]
    pub fn grass() -> Self {
        Self {
            id: "grass".to_owned(),
            er: grass::ERI,
            dispersion: Dispersion::Debye(vec![DebyePole {
                delta_er: grass::DELTA_ER,
                tau: grass::TAU,
            }]),
            averagable: false,
            ..Self::free_space()
        }
    }

    /// Attaches a dispersion model, replacing any previous one.
    ///
    /// `se` is recomputed from the conductivity given at construction: for
    /// Drude models it becomes that value plus `wp2/alpha` for every pole,
    /// otherwise it is that value alone. Zero relaxation times, damping or
    /// inverse relaxation times and non-finite pole parameters are rejected
    /// here.
    pub fn with_dispersion(mut self, dispersion: Dispersion) -> Result<Self, MaterialError> {
        let degenerate = |x, reason| Err(MaterialError::degenerate(&self.id, Some(x), reason));
        let mut se = self.se_bulk;
        match &dispersion {
            Dispersion::None => {}
            Dispersion::Debye(poles) => {
                for (x, p) in poles.iter().enumerate() {
                    if p.tau == 0.0 || !p.tau.is_finite() {
                        return degenerate(x, "relaxation time is zero or not finite");
                    }
                }
            }
            Dispersion::Lorentz(poles) => {
                for (x, p) in poles.iter().enumerate() {
                    if !p.frequency.is_finite() || !p.damping.is_finite() {
                        return degenerate(x, "pole parameters are not finite");
                    }
                    if p.damping == 0.0 {
                        return degenerate(x, "damping coefficient is zero");
                    }
                }
            }
            Dispersion::Drude(poles) => {
                for (x, p) in poles.iter().enumerate() {
                    if !p.frequency.is_finite() {
                        return degenerate(x, "pole frequency is not finite");
                    }
                    if p.inverse_relaxation == 0.0 || !p.inverse_relaxation.is_finite() {
                        return degenerate(x, "inverse relaxation time is zero or not finite");
                    }
                    se += p.wp2() / p.inverse_relaxation;
                }
            }
        }
        self.se = se;
        self.dispersion = dispersion;
        Ok(self)
    }

    /// Sets whether the material takes part in dielectric smoothing.
    #[must_use]
    pub fn with_averagable(mut self, averagable: bool) -> Self {
        self.averagable = averagable;
        self
    }

    /// Dense numeric identifier, equal to the position in the collection.
    #[must_use]
    pub const fn num_id(&self) -> usize {
        self.num_id
    }

    /// Display name.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Relative permittivity (high-frequency limit for dispersive materials).
    #[must_use]
    pub const fn er(&self) -> Scalar {
        self.er
    }

    /// Electric conductivity in S/m. `INFINITY` marks a perfect conductor.
    #[must_use]
    pub const fn se(&self) -> Scalar {
        self.se
    }

    /// Relative permeability.
    #[must_use]
    pub const fn mr(&self) -> Scalar {
        self.mr
    }

    /// Magnetic loss in Ω/m.
    #[must_use]
    pub const fn sm(&self) -> Scalar {
        self.sm
    }

    /// Dispersion model.
    #[must_use]
    pub const fn dispersion(&self) -> &Dispersion {
        &self.dispersion
    }

    /// Number of dispersion poles.
    #[must_use]
    pub fn poles(&self) -> usize {
        self.dispersion.poles()
    }

    /// Whether dielectric smoothing may use this material.
    #[must_use]
    pub const fn averagable(&self) -> bool {
        self.averagable
    }

    /// True when the update coefficients take the perfect-conductor shortcut.
    #[must_use]
    pub fn is_pec(&self) -> bool {
        self.id == PEC_ID || self.se == Scalar::INFINITY
    }
}

/// Largest pole count registered across all materials of a model.
///
/// Every per-material pole array is padded to this width.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PoleWatermark {
    max_poles: usize,
}

impl PoleWatermark {
    /// Empty watermark (no dispersive materials).
    #[must_use]
    pub const fn new() -> Self {
        Self { max_poles: 0 }
    }

    /// Raises the watermark to `poles` if needed and returns the new value.
    pub fn register(&mut self, poles: usize) -> usize {
        self.max_poles = self.max_poles.max(poles);
        self.max_poles
    }

    /// Current maximum pole count.
    #[must_use]
    pub const fn max_poles(&self) -> usize {
        self.max_poles
    }

    /// True once any dispersive material has been registered.
    #[must_use]
    pub const fn has_dispersion(&self) -> bool {
        self.max_poles > 0
    }
}

/// Ordered, append-only list of materials for one model.
#[derive(Debug, Clone, Default)]
pub struct MaterialCollection {
    materials: Vec<Material>,
    watermark: PoleWatermark,
}

impl MaterialCollection {
    /// Creates an empty collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a collection seeded with `pec` (numID 0) and `free_space` (numID 1).
    #[must_use]
    pub fn with_builtins() -> Self {
        let mut materials = Self::new();
        for builtin in [Material::pec(), Material::free_space()] {
            materials.append(builtin);
        }
        materials
    }

    /// Appends `material`, assigning the next numeric identifier and
    /// registering its pole count. Returns the assigned identifier.
    pub fn push(&mut self, material: Material) -> Result<usize, MaterialError> {
        if self.get(&material.id).is_some() {
            return Err(MaterialError::DuplicateMaterial(material.id));
        }
        Ok(self.append(material))
    }

    /// Appends every material of `batch` in order, or none of them if any
    /// name is already taken or repeated within the batch. Returns the
    /// assigned identifiers.
    pub fn push_all(&mut self, batch: Vec<Material>) -> Result<Vec<usize>, MaterialError> {
        for (k, material) in batch.iter().enumerate() {
            if self.get(&material.id).is_some() || batch[..k].iter().any(|m| m.id == material.id) {
                return Err(MaterialError::DuplicateMaterial(material.id.clone()));
            }
        }
        Ok(batch.into_iter().map(|m| self.append(m)).collect())
    }

    fn append(&mut self, mut material: Material) -> usize {
        let num_id = self.materials.len();
        material.num_id = num_id;
        self.watermark.register(material.poles());
        self.materials.push(material);
        num_id
    }

    /// Looks up a material by display name.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Material> {
        self.materials.iter().find(|m| m.id == id)
    }

    /// Looks up a material by numeric identifier.
    #[must_use]
    pub fn by_num_id(&self, num_id: usize) -> Option<&Material> {
        self.materials.get(num_id)
    }

    /// Iterates materials in ascending numID order.
    pub fn iter(&self) -> std::slice::Iter<'_, Material> {
        self.materials.iter()
    }

    /// Pole watermark shared by every material of the collection.
    #[must_use]
    pub const fn watermark(&self) -> &PoleWatermark {
        &self.watermark
    }

    /// Number of materials.
    #[must_use]
    pub fn len(&self) -> usize {
        self.materials.len()
    }

    /// True when no materials are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }
}

impl<'a> IntoIterator for &'a MaterialCollection {
    type Item = &'a Material;
    type IntoIter = std::slice::Iter<'a, Material>;

    fn into_iter(self) -> Self::IntoIter {
        self.materials.iter()
    }
}
