//! Mixture models that synthesize batches of discrete soil materials.
//!
//! Both synthesizers turn a range of physical compositions into `nbins`
//! samples, derive `(εr, σ, μr, σ*)` for each sample and append one material
//! per sample to a [`MaterialCollection`](crate::materials::MaterialCollection).
//! Generated materials are named `|{box}_{index}|`, with the one-based index
//! zero-padded to the digit count of `nbins`, so fractal-box voxel assignment
//! can refer to them by bin.

/// Bruggeman effective-medium mixing of lunar soil minerals.
pub mod bruggeman;
/// Peplinski semi-empirical soil model.
pub mod peplinski;
/// Newton root finder used by the effective-medium solve.
pub mod solver;

pub use bruggeman::{bruggeman_permittivity, BruggemanSample, BruggemanSoil, Mineral};
pub use peplinski::{PeplinskiSample, PeplinskiSoil};
pub use solver::{ConvergenceCriteria, ConvergenceError};

use crate::errors::MaterialError;

/// Name of the one-based bin `index` in a batch of `nbins` materials for `box_name`.
#[must_use]
pub fn mixture_material_id(box_name: &str, index: usize, nbins: usize) -> String {
    let width = nbins.to_string().len();
    format!("|{box_name}_{index:0width$}|")
}

fn check_bins(nbins: usize) -> Result<(), MaterialError> {
    if nbins == 0 {
        Err(MaterialError::InvalidParameter("number of bins must be at least 1".into()))
    } else {
        Ok(())
    }
}
