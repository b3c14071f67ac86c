//! Convenience re-exports for building material catalogs.

pub use crate::catalog::{format_general, process_materials, MaterialCatalog, MaterialSummary};
pub use crate::constants::*;
pub use crate::errors::MaterialError;
pub use crate::grid::{GridContext, GridError};
pub use crate::materials::{
    calculate_er, calculate_poles, calculate_update_coeffs_e, calculate_update_coeffs_h, DebyePole,
    Dispersion, DrudePole, ElectricCoefficients, LorentzPole, MagneticCoefficients, Material,
    MaterialCollection, PermittivityModel, PoleCoefficients, PoleWatermark,
};
pub use crate::math::{CScalar, Scalar};
pub use crate::mixing::{
    bruggeman_permittivity, mixture_material_id, BruggemanSample, BruggemanSoil,
    ConvergenceCriteria, ConvergenceError, Mineral, PeplinskiSample, PeplinskiSoil,
};
pub use crate::sweep::{
    linspace, logspace_hz, permittivity_sweep, write_permittivity_csv, PermittivityPoint,
};
