//! C-style scientific notation for the Tecplot writers.

use std::fmt;

/// Formats like printf's `%e`: signed exponent with at least two digits.
///
/// Precision defaults to six mantissa digits, `{:.3}` overrides it.
#[derive(Clone, Copy, Debug)]
pub struct Sci(pub f64);

impl fmt::Display for Sci {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let precision = f.precision().unwrap_or(6);
        let rust = format!("{:.*e}", precision, self.0);
        // inf and NaN carry no exponent
        let Some((mantissa, exponent)) = rust.split_once('e') else {
            return f.write_str(&rust);
        };
        let (sign, digits) = match exponent.strip_prefix('-') {
            Some(digits) => ('-', digits),
            None => ('+', exponent),
        };
        write!(f, "{mantissa}e{sign}{digits:0>2}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_printf_exponent_layout() {
        assert_eq!(Sci(0.5).to_string(), "5.000000e-01");
        assert_eq!(Sci(1.0).to_string(), "1.000000e+00");
        assert_eq!(Sci(0.0).to_string(), "0.000000e+00");
        assert_eq!(Sci(-3.0e-5).to_string(), "-3.000000e-05");
        assert_eq!(Sci(1.25e123).to_string(), "1.250000e+123");
        assert_eq!(Sci(6.02214076e23).to_string(), "6.022141e+23");
        assert_eq!(format!("{:.2}", Sci(12.5)), "1.25e+01");
    }

    #[test]
    fn non_finite_values_pass_through() {
        assert_eq!(Sci(f64::INFINITY).to_string(), "inf");
        assert_eq!(Sci(f64::NAN).to_string(), "NaN");
    }
}
