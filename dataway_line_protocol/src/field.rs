//! Field values and their line protocol rendering.
use crate::escape::escaped;
use std::fmt;

/// The value of a single field of a [`Point`](crate::Point).
///
/// Each variant renders as follows:
///
/// - integers: decimal followed by `i` (`42i`)
/// - floats: shortest digits that round-trip, no suffix (`3.5`), switching to
///   `d.ddde±XX` for exponents below -4 or from 6 up (`1e+06`, `1e-05`)
/// - strings and bytes: escaped and wrapped in double quotes (`"a\ b"`)
/// - anything else: its display form, escaped and quoted like a string
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Integer(i64),
    /// Rendered after narrowing to `i64`, so values above `i64::MAX` come
    /// out negative: `u64::MAX` is written as `-1i`.
    Unsigned(u64),
    Float(f64),
    Float32(f32),
    String(String),
    /// Decoded as UTF-8, invalid sequences are replaced with U+FFFD.
    Bytes(Vec<u8>),
    /// Pre-rendered text of a value with no dedicated encoding.
    Other(String),
}

impl FieldValue {
    /// Builds the fallback variant from any displayable value.
    pub fn other(value: impl fmt::Display) -> Self {
        Self::Other(value.to_string())
    }
}

/// Renders a field value the way it appears on the wire.
pub fn format_field(value: &FieldValue) -> String {
    value.to_string()
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(v) => write!(f, "{v}i"),
            Self::Unsigned(v) => write!(f, "{}i", *v as i64),
            Self::Float(v) => write_float(f, *v),
            Self::Float32(v) => write_float(f, *v),
            Self::String(v) | Self::Other(v) => write!(f, "\"{}\"", escaped(v)),
            Self::Bytes(v) => write!(f, "\"{}\"", escaped(&String::from_utf8_lossy(v))),
        }
    }
}

/// Exponents in `MIN_PLAIN_EXPONENT..MAX_PLAIN_EXPONENT` are written as plain
/// decimals, everything else in exponent form.
const MIN_PLAIN_EXPONENT: i32 = -4;
const MAX_PLAIN_EXPONENT: i32 = 6;

/// Writes `v` with the fewest digits that round-trip at its own width.
///
/// The exponent carries an explicit sign and at least two digits, and the
/// non-finite values are `+Inf`, `-Inf` and `NaN`.
fn write_float<T>(f: &mut fmt::Formatter<'_>, v: T) -> fmt::Result
where
    T: fmt::Display + fmt::LowerExp,
{
    let sci = format!("{v:e}");
    let Some((mantissa, exp)) = sci.split_once('e') else {
        // non-finite values have no exponent
        return match sci.as_str() {
            "inf" => f.write_str("+Inf"),
            "-inf" => f.write_str("-Inf"),
            other => f.write_str(other),
        };
    };
    let Ok(exp) = exp.parse::<i32>() else {
        return f.write_str(&sci);
    };

    if (MIN_PLAIN_EXPONENT..MAX_PLAIN_EXPONENT).contains(&exp) {
        write!(f, "{v}")
    } else {
        let sign = if exp < 0 { '-' } else { '+' };
        write!(f, "{mantissa}e{sign}{:02}", exp.unsigned_abs())
    }
}

macro_rules! from_lossless_integer {
    ($($t:ty),*) => {
        $(
            impl From<$t> for FieldValue {
                fn from(v: $t) -> Self {
                    Self::Integer(i64::from(v))
                }
            }
        )*
    };
}

from_lossless_integer!(i8, i16, i32, i64, u8, u16, u32);

impl From<isize> for FieldValue {
    fn from(v: isize) -> Self {
        Self::Integer(v as i64)
    }
}

impl From<u64> for FieldValue {
    fn from(v: u64) -> Self {
        Self::Unsigned(v)
    }
}

impl From<usize> for FieldValue {
    fn from(v: usize) -> Self {
        Self::Unsigned(v as u64)
    }
}

impl From<f64> for FieldValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<f32> for FieldValue {
    fn from(v: f32) -> Self {
        Self::Float32(v)
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        Self::String(v.to_owned())
    }
}

impl From<String> for FieldValue {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<&[u8]> for FieldValue {
    fn from(v: &[u8]) -> Self {
        Self::Bytes(v.to_vec())
    }
}

impl From<Vec<u8>> for FieldValue {
    fn from(v: Vec<u8>) -> Self {
        Self::Bytes(v)
    }
}

// No native boolean type on the wire, so it is sent as quoted text.
impl From<bool> for FieldValue {
    fn from(v: bool) -> Self {
        Self::other(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn integers_have_suffix() {
        assert_eq!(format_field(&7_i32.into()), "7i");
        assert_eq!(format_field(&(-42_i64).into()), "-42i");
        assert_eq!(format_field(&i8::MIN.into()), "-128i");
        assert_eq!(format_field(&u32::MAX.into()), "4294967295i");
        assert_eq!(format_field(&(-3_isize).into()), "-3i");
        assert_eq!(format_field(&123_456_usize.into()), "123456i");
    }

    #[test]
    fn unsigned_is_narrowed_through_signed() {
        // known defect: wide unsigned values wrap when narrowed to i64
        assert_eq!(format_field(&(i64::MAX as u64).into()), "9223372036854775807i");
        assert_eq!(format_field(&(i64::MAX as u64 + 1).into()), "-9223372036854775808i");
        assert_eq!(format_field(&u64::MAX.into()), "-1i");
    }

    #[test]
    fn floats_are_shortest_round_trip() {
        assert_eq!(format_field(&3.5_f64.into()), "3.5");
        assert_eq!(format_field(&22.33_f64.into()), "22.33");
        assert_eq!(format_field(&3.0_f64.into()), "3");
        assert_eq!(format_field(&(-0.25_f64).into()), "-0.25");
        assert_eq!(format_field(&0.0001_f64.into()), "0.0001");
        assert_eq!(format_field(&123_456.0_f64.into()), "123456");
        assert_eq!(format_field(&(-0.0_f64).into()), "-0");

        assert_eq!(format_field(&1e6_f64.into()), "1e+06");
        assert_eq!(format_field(&1_234_567.0_f64.into()), "1.234567e+06");
        assert_eq!(format_field(&1e21_f64.into()), "1e+21");
        assert_eq!(format_field(&1e-5_f64.into()), "1e-05");
        assert_eq!(format_field(&(-2.5e-7_f64).into()), "-2.5e-07");
        assert_eq!(format_field(&1.5e300_f64.into()), "1.5e+300");
        assert_eq!(format_field(&5e-324_f64.into()), "5e-324");
    }

    #[test]
    fn non_finite_floats() {
        assert_eq!(format_field(&f64::INFINITY.into()), "+Inf");
        assert_eq!(format_field(&f64::NEG_INFINITY.into()), "-Inf");
        assert_eq!(format_field(&f64::NAN.into()), "NaN");
        assert_eq!(format_field(&f32::INFINITY.into()), "+Inf");
        assert_eq!(format_field(&f32::NEG_INFINITY.into()), "-Inf");
        assert_eq!(format_field(&f32::NAN.into()), "NaN");
    }

    #[test]
    fn float32_uses_its_own_shortest_digits() {
        assert_eq!(format_field(&0.1_f32.into()), "0.1");
        assert_eq!(format_field(&22.33_f32.into()), "22.33");
        assert_eq!(format_field(&16_777_216.0_f32.into()), "1.6777216e+07");
        assert_eq!(format_field(&1e21_f32.into()), "1e+21");
        assert_eq!(format_field(&1e-5_f32.into()), "1e-05");
        assert_eq!(format_field(&f32::MAX.into()), "3.4028235e+38");
    }

    #[test]
    fn strings_are_escaped_and_quoted() {
        assert_eq!(format_field(&"hello,world".into()), r#""hello\,world""#);
        assert_eq!(format_field(&String::from("say \"hi\"").into()), r#""say\ \"hi\"""#);
        assert_eq!(format_field(&"".into()), r#""""#);
    }

    #[test]
    fn bytes_are_rendered_as_text() {
        assert_eq!(format_field(&b"ABCD".as_slice().into()), r#""ABCD""#);
        assert_eq!(format_field(&vec![41_u8, 42, 43, 44].into()), r#"")*+\,""#);
        assert_eq!(format_field(&vec![0x66_u8, 0xff].into()), "\"f\u{fffd}\"");
    }

    #[test]
    fn other_values_fall_back_to_display() {
        assert_eq!(format_field(&true.into()), r#""true""#);
        assert_eq!(
            format_field(&FieldValue::other("{struct_n 666666}")),
            r#""{struct_n\ 666666}""#
        );
        assert_eq!(
            format_field(&FieldValue::other(std::net::Ipv4Addr::LOCALHOST)),
            r#""127.0.0.1""#
        );
    }
}
