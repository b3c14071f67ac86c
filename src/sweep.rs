//! Frequency grids and permittivity sweeps.

use std::io::{self, Write};

use crate::errors::MaterialError;
use crate::materials::PermittivityModel;
use crate::math::{CScalar, Scalar};

/// Generates `n` linearly spaced samples in [start, stop].
#[must_use]
pub fn linspace(start: Scalar, stop: Scalar, n: usize) -> Vec<Scalar> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (stop - start) / (n as Scalar - 1.0);
            (0..n).map(|i| start + step * i as Scalar).collect()
        }
    }
}

/// Generates `n` logarithmically spaced frequencies between `start_hz` and
/// `stop_hz`.
pub fn logspace_hz(
    start_hz: Scalar,
    stop_hz: Scalar,
    n: usize,
) -> Result<Vec<Scalar>, MaterialError> {
    for f in [start_hz, stop_hz] {
        if !(f.is_finite() && f > 0.0) {
            return Err(MaterialError::InvalidFrequency(f));
        }
    }
    Ok(linspace(start_hz.log10(), stop_hz.log10(), n)
        .into_iter()
        .map(|e| 10f64.powf(e))
        .collect())
}

/// Relative permittivity evaluated at one frequency.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PermittivityPoint {
    /// Frequency in Hz.
    pub freq: Scalar,
    /// Complex relative permittivity.
    pub er: CScalar,
}

/// Evaluates `model` at every frequency in `freqs`.
///
/// Stops at the first frequency the model rejects.
pub fn permittivity_sweep<M, I>(
    model: &M,
    freqs: I,
) -> Result<Vec<PermittivityPoint>, MaterialError>
where
    M: PermittivityModel + ?Sized,
    I: IntoIterator<Item = Scalar>,
{
    freqs
        .into_iter()
        .map(|freq| Ok(PermittivityPoint { freq, er: model.relative_permittivity(freq)? }))
        .collect()
}

/// Writes a permittivity sweep as CSV.
pub fn write_permittivity_csv<W: Write>(mut w: W, points: &[PermittivityPoint]) -> io::Result<()> {
    writeln!(w, "freq,ReEr,ImEr")?;
    for p in points {
        writeln!(w, "{:.16e},{:.16e},{:.16e}", p.freq, p.er.re, p.er.im)?;
    }
    Ok(())
}
