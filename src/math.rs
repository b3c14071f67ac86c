//! Shared numerical primitives anchored on `num-complex`.

use num_complex::Complex;

/// Primary scalar type used across the crate.
pub type Scalar = f64;
/// Primary complex scalar type used for poles and permittivities.
pub type CScalar = Complex<Scalar>;

/// Imaginary unit `i`.
pub const J: CScalar = Complex::new(0.0, 1.0);

/// Square root of a real number on the principal branch of the complex root.
///
/// Non-negative arguments give a real root. Negative arguments give `i·sqrt(|x|)`,
/// i.e. the root with non-negative imaginary part.
#[must_use]
pub fn principal_sqrt(x: Scalar) -> CScalar {
    Complex::new(x, 0.0).sqrt()
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn principal_sqrt_of_positive_is_real() {
        let r = principal_sqrt(9.0);
        assert_relative_eq!(r.re, 3.0, epsilon = 1.0e-12);
        assert_relative_eq!(r.im, 0.0);
    }

    #[test]
    fn principal_sqrt_of_negative_is_positive_imaginary() {
        let r = principal_sqrt(-4.0);
        assert_relative_eq!(r.re, 0.0, epsilon = 1.0e-12);
        assert_relative_eq!(r.im, 2.0, epsilon = 1.0e-12);
    }
}
