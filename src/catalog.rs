//! Dense coefficient tables consumed by the field solver.
//!
//! [`process_materials`] visits every material of a [`MaterialCollection`] in
//! numID order and packs its coefficients into row `numID` of
//!
//! - `update_coeffs_e`: `(CA, CBx, CBy, CBz, srce)`,
//! - `update_coeffs_h`: `(DA, DBx, DBy, DBz, srcm)`,
//! - `update_coeffs_dispersive` (only when the model has dispersive
//!   materials): `(ε₀·eqt2, eqt, zt)` for each pole slot, `3·max_poles` wide.
//!
//! It also builds a [`MaterialSummary`] for printing.

use std::fmt;

use nalgebra::DMatrix;
use num_complex::Complex;

use crate::constants::VACUUM_PERMITTIVITY;
use crate::errors::MaterialError;
use crate::grid::GridContext;
use crate::materials::{
    calculate_poles, calculate_update_coeffs_e, calculate_update_coeffs_h, Dispersion, Material,
    MaterialCollection,
};
use crate::math::{CScalar, Scalar};

/// Number of columns in the E and H coefficient tables.
pub const COEFFS_PER_MATERIAL: usize = 5;
/// Number of columns per pole slot in the dispersive table.
pub const COEFFS_PER_POLE: usize = 3;
/// Longest material name shown in the summary table.
pub const MAX_NAME_LEN: usize = 50;

/// Coefficient tables indexed by material numID.
#[derive(Debug, Clone)]
pub struct MaterialCatalog {
    /// Electric update coefficients, `n × 5`.
    pub update_coeffs_e: DMatrix<Scalar>,
    /// Magnetic update coefficients, `n × 5`.
    pub update_coeffs_h: DMatrix<Scalar>,
    /// Dispersive coefficients, `n × 3·max_poles`, present only when
    /// the model contains dispersive materials.
    pub update_coeffs_dispersive: Option<DMatrix<CScalar>>,
    /// Printable description of every material.
    pub summary: MaterialSummary,
}

impl MaterialCatalog {
    /// Number of materials (table rows).
    #[must_use]
    pub fn len(&self) -> usize {
        self.update_coeffs_e.nrows()
    }

    /// True when the catalog holds no materials.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Pole slots per material in the dispersive table.
    #[must_use]
    pub fn max_poles(&self) -> usize {
        self.update_coeffs_dispersive
            .as_ref()
            .map_or(0, |t| t.ncols() / COEFFS_PER_POLE)
    }
}

/// Computes the update coefficients of every material and packs them into tables.
pub fn process_materials(
    materials: &MaterialCollection,
    grid: &GridContext,
) -> Result<MaterialCatalog, MaterialError> {
    let watermark = *materials.watermark();
    let max_poles = watermark.max_poles();
    let n = materials.len();

    let mut update_coeffs_e = DMatrix::zeros(n, COEFFS_PER_MATERIAL);
    let mut update_coeffs_h = DMatrix::zeros(n, COEFFS_PER_MATERIAL);
    let mut update_coeffs_dispersive = watermark
        .has_dispersion()
        .then(|| DMatrix::from_element(n, COEFFS_PER_POLE * max_poles, Complex::new(0.0, 0.0)));
    let mut summary = MaterialSummary::new(watermark.has_dispersion());

    for (row, material) in materials.iter().enumerate() {
        if material.num_id() != row {
            return Err(MaterialError::InvalidParameter(format!(
                "material '{}' has numID {} but sits at position {row}",
                material.id(),
                material.num_id()
            )));
        }

        let poles = calculate_poles(material, &watermark, grid)?;
        let e = calculate_update_coeffs_e(material, &poles, grid)?;
        let h = calculate_update_coeffs_h(material, grid)?;

        for (col, value) in e.as_row().into_iter().enumerate() {
            update_coeffs_e[(row, col)] = value;
        }
        for (col, value) in h.as_row().into_iter().enumerate() {
            update_coeffs_h[(row, col)] = value;
        }
        if let Some(table) = update_coeffs_dispersive.as_mut() {
            for (slot, pole) in poles.iter().enumerate() {
                let z = slot * COEFFS_PER_POLE;
                table[(row, z)] = pole.eqt2 * VACUUM_PERMITTIVITY;
                table[(row, z + 1)] = pole.eqt;
                table[(row, z + 2)] = pole.zt;
            }
        }

        summary.push(material);
    }

    log::debug!("processed {n} materials, {max_poles} pole slots per material");

    Ok(MaterialCatalog {
        update_coeffs_e,
        update_coeffs_h,
        update_coeffs_dispersive,
        summary,
    })
}

/// Table of display strings, one row per material.
///
/// The header gains five dispersion columns when the model contains any
/// dispersive material. Cells may span several lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaterialSummary {
    /// Column titles.
    pub header: Vec<String>,
    /// One row of cells per material.
    pub rows: Vec<Vec<String>>,
    dispersive: bool,
}

impl MaterialSummary {
    fn new(dispersive: bool) -> Self {
        let mut header = vec!["\nID", "\nName", "\nType", "\neps_r", "sigma\n[S/m]"];
        if dispersive {
            header.extend([
                "Delta\neps_r",
                "tau\n[s]",
                "omega\n[Hz]",
                "delta\n[Hz]",
                "gamma\n[Hz]",
            ]);
        }
        header.extend(["\nmu_r", "sigma*\n[Ohm/m]", "Dielectric\nsmoothable"]);
        Self {
            header: header.into_iter().map(str::to_owned).collect(),
            rows: Vec::new(),
            dispersive,
        }
    }

    fn push(&mut self, material: &Material) {
        let mut row = vec![
            material.num_id().to_string(),
            material.id().chars().take(MAX_NAME_LEN).collect(),
            material.dispersion().kind().to_owned(),
            format_general(material.er()),
            format_general(material.se()),
        ];
        if self.dispersive {
            row.extend(dispersion_cells(material.dispersion()));
        }
        row.extend([
            format_general(material.mr()),
            format_general(material.sm()),
            material.averagable().to_string(),
        ]);
        self.rows.push(row);
    }
}

/// Cells for `Delta eps_r, tau, omega, delta, gamma`.
fn dispersion_cells(dispersion: &Dispersion) -> [String; 5] {
    fn joined(values: impl Iterator<Item = Scalar>, sep: &str) -> String {
        values.map(format_general).collect::<Vec<_>>().join(sep)
    }

    match dispersion {
        Dispersion::None => Default::default(),
        Dispersion::Debye(poles) => [
            joined(poles.iter().map(|p| p.delta_er), "\n"),
            joined(poles.iter().map(|p| p.tau), "\n"),
            String::new(),
            String::new(),
            String::new(),
        ],
        Dispersion::Lorentz(poles) => [
            joined(poles.iter().map(|p| p.delta_er), ", "),
            String::new(),
            joined(poles.iter().map(|p| p.frequency), ", "),
            joined(poles.iter().map(|p| p.damping), ", "),
            String::new(),
        ],
        Dispersion::Drude(poles) => [
            String::new(),
            String::new(),
            joined(poles.iter().map(|p| p.frequency), ", "),
            String::new(),
            joined(poles.iter().map(|p| p.inverse_relaxation), ", "),
        ],
    }
}

impl fmt::Display for MaterialSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let lines = |cell: &String| cell.lines().map(str::to_owned).collect::<Vec<_>>();
        let table: Vec<Vec<Vec<String>>> = std::iter::once(&self.header)
            .chain(self.rows.iter())
            .map(|row| row.iter().map(lines).collect())
            .collect();

        let mut widths = vec![0; self.header.len()];
        for row in &table {
            for (col, cell) in row.iter().enumerate() {
                let w = cell.iter().map(|l| l.chars().count()).max().unwrap_or(0);
                widths[col] = widths[col].max(w);
            }
        }

        for row in &table {
            let height = row.iter().map(Vec::len).max().unwrap_or(0).max(1);
            // header cells sit on their last line, body cells on their first
            let bottom_align = std::ptr::eq(row, &table[0]);
            for line in 0..height {
                let mut text = String::new();
                for (col, cell) in row.iter().enumerate() {
                    let offset = if bottom_align { height - cell.len() } else { 0 };
                    let content = line
                        .checked_sub(offset)
                        .and_then(|i| cell.get(i))
                        .map_or("", String::as_str);
                    if col > 0 {
                        text.push_str(" | ");
                    }
                    text.push_str(&format!("{content:<width$}", width = widths[col]));
                }
                writeln!(f, "{}", text.trim_end())?;
            }
        }
        Ok(())
    }
}

/// Formats `x` with six significant digits, switching to exponent notation
/// for very large or small magnitudes and dropping trailing zeros.
///
/// Matches the C `%g` conversion: `80.1`, `9.231e-12`, `1.23457e+08`.
#[must_use]
pub fn format_general(x: Scalar) -> String {
    const PRECISION: i32 = 6;
    if x.is_nan() {
        return "nan".to_owned();
    }
    if x.is_infinite() {
        return if x > 0.0 { "inf" } else { "-inf" }.to_owned();
    }

    let sci = format!("{:.*e}", (PRECISION - 1) as usize, x);
    let (mantissa, exponent) = sci.split_once('e').unwrap_or((sci.as_str(), "0"));
    let exponent: i32 = exponent.parse().unwrap_or(0);

    if (-4..PRECISION).contains(&exponent) {
        let decimals = (PRECISION - 1 - exponent) as usize;
        strip_zeros(&format!("{x:.decimals$}"))
    } else {
        let sign = if exponent < 0 { '-' } else { '+' };
        format!("{}e{sign}{:02}", strip_zeros(mantissa), exponent.abs())
    }
}

fn strip_zeros(number: &str) -> String {
    if number.contains('.') {
        number.trim_end_matches('0').trim_end_matches('.').to_owned()
    } else {
        number.to_owned()
    }
}
