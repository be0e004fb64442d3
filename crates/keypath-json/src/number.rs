//! Hand-written decimal conversions for JSON numbers.
//!
//! Neither direction relies on the standard library's float formatting or
//! float parsing, so the behaviour is the same on every target.
//!
//! # Parsing
//!
//! Up to 19 significant digits are accumulated into a `u64` mantissa and
//! scaled by a power of ten. When the mantissa fits in 53 bits and the
//! exponent is within ±22 the result is exact-then-rounded-once, i.e.
//! correctly rounded. Outside that range the scaling is repeated and the
//! last digit or two may differ from a shortest-round-trip parser.
//!
//! # Formatting
//!
//! - integral values below 2^53 in magnitude: plain integer digits;
//! - other values below 1e15: fixed point, `precision` fractional digits,
//!   rounded half away from zero, trailing zeros trimmed;
//! - larger values: `d.ddde15` style scientific notation;
//! - NaN and infinities: `null`.

/// Exact powers of ten representable in an `f64`.
const POW10: [f64; 23] = [
    1e0, 1e1, 1e2, 1e3, 1e4, 1e5, 1e6, 1e7, 1e8, 1e9, 1e10, 1e11, 1e12, 1e13, 1e14, 1e15, 1e16,
    1e17, 1e18, 1e19, 1e20, 1e21, 1e22,
];

/// Largest integer below which every integer is exactly representable.
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_992.0;

/// Largest supported number of fractional digits when formatting.
pub const MAX_PRECISION: usize = 17;

const MAX_MANTISSA_DIGITS: u32 = 19;

/// Parse a JSON number literal (`-?digits(.digits)?([eE][+-]?digits)?`).
///
/// Returns `None` when the text does not follow the grammar or the value is
/// too large to be finite. Leading zeros in the integer part are accepted.
pub fn parse_decimal(text: &str) -> Option<f64> {
    let bytes = text.as_bytes();
    let mut i = 0;

    let negative = bytes.first() == Some(&b'-');
    if negative {
        i += 1;
    }

    let mut mantissa: u64 = 0;
    let mut significant: u32 = 0;
    let mut exp10: i64 = 0;

    let int_start = i;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        let digit = u64::from(bytes[i] - b'0');
        if significant < MAX_MANTISSA_DIGITS {
            if mantissa != 0 || digit != 0 {
                mantissa = mantissa * 10 + digit;
                significant += 1;
            }
        } else {
            // digit dropped, value scaled instead
            exp10 += 1;
        }
        i += 1;
    }
    if i == int_start {
        return None;
    }

    if i < bytes.len() && bytes[i] == b'.' {
        i += 1;
        let frac_start = i;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            let digit = u64::from(bytes[i] - b'0');
            if significant < MAX_MANTISSA_DIGITS {
                if mantissa != 0 || digit != 0 {
                    mantissa = mantissa * 10 + digit;
                    significant += 1;
                }
                exp10 -= 1;
            }
            i += 1;
        }
        if i == frac_start {
            return None;
        }
    }

    if i < bytes.len() && (bytes[i] == b'e' || bytes[i] == b'E') {
        i += 1;
        let mut exp_negative = false;
        if i < bytes.len() && (bytes[i] == b'+' || bytes[i] == b'-') {
            exp_negative = bytes[i] == b'-';
            i += 1;
        }
        let exp_start = i;
        let mut exp: i64 = 0;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            // saturate: anything this large is zero or infinite anyway
            if exp < 100_000 {
                exp = exp * 10 + i64::from(bytes[i] - b'0');
            }
            i += 1;
        }
        if i == exp_start {
            return None;
        }
        exp10 += if exp_negative { -exp } else { exp };
    }

    if i != bytes.len() {
        return None;
    }

    let magnitude = scale(mantissa, exp10);
    if !magnitude.is_finite() {
        return None;
    }
    Some(if negative { -magnitude } else { magnitude })
}

fn scale(mantissa: u64, mut exp10: i64) -> f64 {
    if mantissa == 0 {
        return 0.0;
    }
    let mut value = mantissa as f64;
    let exact = (mantissa as f64) < MAX_SAFE_INTEGER;
    if exact && (0..=22).contains(&exp10) {
        return value * POW10[exp10 as usize];
    }
    if exact && (-22..0).contains(&exp10) {
        return value / POW10[(-exp10) as usize];
    }
    while exp10 > 22 {
        value *= POW10[22];
        exp10 -= 22;
        if !value.is_finite() {
            return value;
        }
    }
    while exp10 < -22 {
        value /= POW10[22];
        exp10 += 22;
        if value == 0.0 {
            return value;
        }
    }
    if exp10 >= 0 {
        value * POW10[exp10 as usize]
    } else {
        value / POW10[(-exp10) as usize]
    }
}

/// Append the textual form of `value` to `out`.
///
/// `precision` is clamped to [`MAX_PRECISION`].
pub fn write_number(value: f64, precision: usize, out: &mut String) {
    if !value.is_finite() {
        out.push_str("null");
        return;
    }
    let precision = precision.min(MAX_PRECISION);
    let negative = value < 0.0;
    let magnitude = value.abs();

    if magnitude.fract() == 0.0 && magnitude < MAX_SAFE_INTEGER {
        let int = magnitude as u64;
        if negative && int != 0 {
            out.push('-');
        }
        write_u64(int, out);
        return;
    }

    if magnitude >= POW10[15] {
        if negative {
            out.push('-');
        }
        write_scientific(magnitude, precision, out);
        return;
    }

    let (int_part, frac_part) = split_fixed(magnitude, precision);
    if negative && (int_part != 0 || frac_part != 0) {
        out.push('-');
    }
    write_u64(int_part, out);
    write_fraction(frac_part, precision, out);
}

/// Split `magnitude` (< 1e15) into its integer part and its fractional part
/// rounded to `precision` digits, carrying into the integer part if the
/// fraction rounds up to one.
fn split_fixed(magnitude: f64, precision: usize) -> (u64, u64) {
    let mut int_part = magnitude.trunc() as u64;
    let scale = POW10[precision];
    let mut frac_part = ((magnitude - int_part as f64) * scale).round() as u64;
    if frac_part as f64 >= scale {
        int_part += 1;
        frac_part = 0;
    }
    (int_part, frac_part)
}

fn write_scientific(magnitude: f64, precision: usize, out: &mut String) {
    let mut exponent: i32 = 0;
    let mut mantissa = magnitude;
    while mantissa >= 10.0 {
        mantissa /= 10.0;
        exponent += 1;
    }
    let (mut int_part, frac_part) = split_fixed(mantissa, precision);
    if int_part >= 10 {
        int_part = 1;
        exponent += 1;
    }
    write_u64(int_part, out);
    write_fraction(frac_part, precision, out);
    out.push('e');
    write_u64(exponent as u64, out);
}

/// Write `.ddd` for a fraction scaled by 10^precision, zero-padded on the left
/// and trimmed of trailing zeros. Writes nothing for a zero fraction.
fn write_fraction(frac_part: u64, precision: usize, out: &mut String) {
    if frac_part == 0 || precision == 0 {
        return;
    }
    let mut digits = [b'0'; MAX_PRECISION];
    let mut rest = frac_part;
    for slot in digits[..precision].iter_mut().rev() {
        *slot = b'0' + (rest % 10) as u8;
        rest /= 10;
    }
    let mut len = precision;
    while len > 0 && digits[len - 1] == b'0' {
        len -= 1;
    }
    out.push('.');
    for &d in &digits[..len] {
        out.push(char::from(d));
    }
}

fn write_u64(mut n: u64, out: &mut String) {
    let mut buf = [0u8; 20];
    let mut pos = buf.len();
    loop {
        pos -= 1;
        buf[pos] = b'0' + (n % 10) as u8;
        n /= 10;
        if n == 0 {
            break;
        }
    }
    for &d in &buf[pos..] {
        out.push(char::from(d));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fmt(value: f64, precision: usize) -> String {
        let mut out = String::new();
        write_number(value, precision, &mut out);
        out
    }

    #[test]
    fn parses_integers_and_fractions() {
        assert_eq!(parse_decimal("0"), Some(0.0));
        assert_eq!(parse_decimal("42"), Some(42.0));
        assert_eq!(parse_decimal("-7"), Some(-7.0));
        assert_eq!(parse_decimal("3.14"), Some(3.14));
        assert_eq!(parse_decimal("-0.001"), Some(-0.001));
        assert_eq!(parse_decimal("123456.789"), Some(123456.789));
    }

    #[test]
    fn parses_exponents() {
        assert_eq!(parse_decimal("1e3"), Some(1000.0));
        assert_eq!(parse_decimal("2.5E-2"), Some(0.025));
        assert_eq!(parse_decimal("1E+2"), Some(100.0));
        assert_eq!(parse_decimal("1e-400"), Some(0.0));
    }

    #[test]
    fn parses_long_mantissas() {
        let parsed = parse_decimal("12345678901234567890123").unwrap();
        assert!((parsed - 1.2345678901234568e22).abs() / parsed < 1e-15);
    }

    #[test]
    fn rejects_malformed() {
        for bad in ["", "-", "1.", ".5", "1e", "1e+", "1.2.3", "0x10", "1e400", "--1"] {
            assert_eq!(parse_decimal(bad), None, "{bad:?} should be rejected");
        }
    }

    #[test]
    fn formats_integral_values_without_point() {
        assert_eq!(fmt(3.0, 6), "3");
        assert_eq!(fmt(-12.0, 6), "-12");
        assert_eq!(fmt(0.0, 6), "0");
        assert_eq!(fmt(-0.0, 6), "0");
        assert_eq!(fmt(9_007_199_254_740_991.0, 6), "9007199254740991");
    }

    #[test]
    fn formats_fractions_with_trimmed_precision() {
        assert_eq!(fmt(2.5, 6), "2.5");
        assert_eq!(fmt(1.0 / 3.0, 6), "0.333333");
        assert_eq!(fmt(2.0 / 3.0, 3), "0.667");
        assert_eq!(fmt(-0.05, 6), "-0.05");
        assert_eq!(fmt(0.9999999, 3), "1");
        assert_eq!(fmt(0.0000001, 6), "0");
        assert_eq!(fmt(-0.0000001, 6), "0");
    }

    #[test]
    fn formats_large_values_in_scientific_notation() {
        assert_eq!(fmt(1.5e20, 6), "1.5e20");
        assert_eq!(fmt(-2.0e300, 3), "-2e300");
    }

    #[test]
    fn formats_non_finite_as_null() {
        assert_eq!(fmt(f64::NAN, 6), "null");
        assert_eq!(fmt(f64::INFINITY, 6), "null");
    }
}
