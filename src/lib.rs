#![cfg_attr(docsrs, feature(doc_auto_cfg))]
#![warn(clippy::all, clippy::cargo, clippy::nursery, missing_docs)]
#![doc = include_str!("../README.md")]

/// Fundamental physical constants used throughout the library.
pub mod constants;
/// Shared numerical primitives (scalar aliases, complex helpers).
pub mod math;
/// Grid parameters consumed by the coefficient formulas.
pub mod grid;
/// Material records, dispersion models and coefficient derivation.
pub mod materials;
/// Dense coefficient tables and the printable material summary.
pub mod catalog;
/// Mixture models that synthesize batches of soil materials.
pub mod mixing;
/// Frequency grids and permittivity sweeps.
pub mod sweep;
/// Error types shared between submodules.
pub mod errors;

/// Common exports for downstream crates.
pub mod prelude;
