//! Shared error types used across submodules.

use thiserror::Error;

use crate::grid::GridError;
use crate::math::Scalar;
use crate::mixing::solver::ConvergenceError;

/// Top-level error type for the crate.
#[derive(Debug, Error)]
pub enum MaterialError {
    /// Wraps grid configuration errors.
    #[error(transparent)]
    Grid(#[from] GridError),
    /// A coefficient formula hit a zero or non-finite denominator.
    #[error("configuration error in material '{material}'{}: {reason}", pole_suffix(.pole))]
    DegenerateCoefficient {
        /// Display name of the offending material.
        material: String,
        /// Pole index, when the failure is pole specific.
        pole: Option<usize>,
        /// Which denominator degenerated.
        reason: &'static str,
    },
    /// Frequency-domain evaluation requested at a non-positive frequency.
    #[error("frequency must be positive and finite, got {0} Hz")]
    InvalidFrequency(Scalar),
    /// Raised when material or mixture parameters are invalid.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
    /// A material name is already present in the collection.
    #[error("material '{0}' already exists")]
    DuplicateMaterial(String),
    /// A material carries more poles than the registered watermark.
    #[error("material '{material}' has {poles} poles but the watermark is {max_poles}")]
    WatermarkViolation {
        /// Display name of the offending material.
        material: String,
        /// Pole count of the material.
        poles: usize,
        /// Registered global maximum.
        max_poles: usize,
    },
    /// A mixture bin could not be solved.
    #[error("mixture bin {bin} failed: {source}")]
    MixtureBin {
        /// One-based bin index, as used in the material name.
        bin: usize,
        /// Underlying root-finder failure.
        source: ConvergenceError,
    },
}

fn pole_suffix(pole: &Option<usize>) -> String {
    pole.map(|p| format!(" (pole {p})")).unwrap_or_default()
}

impl MaterialError {
    pub(crate) fn degenerate(material: &str, pole: Option<usize>, reason: &'static str) -> Self {
        Self::DegenerateCoefficient { material: material.to_owned(), pole, reason }
    }
}
