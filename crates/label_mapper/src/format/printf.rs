//! printf-style templates
//!
//! A template is compiled once into literal and conversion segments. Each
//! conversion in the template receives the same value, so `"(%d)"` wraps one
//! component and `"%d/%x"` prints it twice in two bases.
//!
//! Supported: flags `- + space # 0`, decimal width and precision, the length
//! modifiers `hh h l ll L q j z t` (accepted and ignored), and the conversions
//! `d i u o x X f F e E g G c s %`. Values are coerced to the conversion the
//! way a label reader expects: floats under `%d` are truncated toward zero,
//! integers under `%f` are widened, and text under a numeric conversion is
//! printed as `%s`.

use super::{FormatError, MAX_FIELD_WIDTH};
use crate::data::LabelValue;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Flags {
    left: bool,
    plus: bool,
    space: bool,
    alternate: bool,
    zero: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Conversion {
    Signed,
    Unsigned,
    Octal,
    Hex { upper: bool },
    Fixed { upper: bool },
    Exponent { upper: bool },
    General { upper: bool },
    Char,
    Str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Spec {
    flags: Flags,
    width: Option<usize>,
    precision: Option<usize>,
    conversion: Conversion,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Conversion(Spec),
}

/// Compiled printf-style template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelFormat {
    template: String,
    segments: Vec<Segment>,
}

impl LabelFormat {
    /// Compile a template
    pub fn parse(template: &str) -> Result<Self, FormatError> {
        Parser::new(template).run()
    }

    /// The source template
    pub fn template(&self) -> &str {
        &self.template
    }

    /// Number of conversions in the template
    pub fn conversion_count(&self) -> usize {
        self.segments
            .iter()
            .filter(|segment| matches!(segment, Segment::Conversion(_)))
            .count()
    }

    /// Append the formatted value to `out`
    pub fn format_into(&self, value: LabelValue<'_>, out: &mut String) {
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Conversion(spec) => write_conversion(spec, value, out),
            }
        }
    }

    /// Format one value into a new string
    pub fn format(&self, value: LabelValue<'_>) -> String {
        let mut out = String::new();
        self.format_into(value, &mut out);
        out
    }
}

impl FromStr for LabelFormat {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for LabelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.template)
    }
}

struct Parser<'a> {
    template: &'a str,
    chars: std::iter::Peekable<std::str::Chars<'a>>,
    segments: Vec<Segment>,
    literal: String,
}

impl<'a> Parser<'a> {
    fn new(template: &'a str) -> Self {
        Self {
            template,
            chars: template.chars().peekable(),
            segments: Vec::new(),
            literal: String::new(),
        }
    }

    fn run(mut self) -> Result<LabelFormat, FormatError> {
        while let Some(c) = self.chars.next() {
            if c != '%' {
                self.literal.push(c);
                continue;
            }
            if self.chars.peek() == Some(&'%') {
                self.chars.next();
                self.literal.push('%');
                continue;
            }
            let spec = self.conversion()?;
            if !self.literal.is_empty() {
                self.segments.push(Segment::Literal(std::mem::take(&mut self.literal)));
            }
            self.segments.push(Segment::Conversion(spec));
        }
        if !self.literal.is_empty() {
            self.segments.push(Segment::Literal(self.literal));
        }
        Ok(LabelFormat {
            template: self.template.to_string(),
            segments: self.segments,
        })
    }

    fn conversion(&mut self) -> Result<Spec, FormatError> {
        let mut flags = Flags::default();
        while let Some(&c) = self.chars.peek() {
            match c {
                '-' => flags.left = true,
                '+' => flags.plus = true,
                ' ' => flags.space = true,
                '#' => flags.alternate = true,
                '0' => flags.zero = true,
                _ => break,
            }
            self.chars.next();
        }

        let width = self.number()?;
        let precision = if self.chars.peek() == Some(&'.') {
            self.chars.next();
            Some(self.number()?.unwrap_or(0))
        } else {
            None
        };

        let mut length_chars = 0;
        while let Some(&('h' | 'l' | 'L' | 'q' | 'j' | 'z' | 't')) = self.chars.peek() {
            self.chars.next();
            length_chars += 1;
            if length_chars == 2 {
                break;
            }
        }

        let conversion = match self.chars.next() {
            Some('d' | 'i') => Conversion::Signed,
            Some('u') => Conversion::Unsigned,
            Some('o') => Conversion::Octal,
            Some('x') => Conversion::Hex { upper: false },
            Some('X') => Conversion::Hex { upper: true },
            Some('f') => Conversion::Fixed { upper: false },
            Some('F') => Conversion::Fixed { upper: true },
            Some('e') => Conversion::Exponent { upper: false },
            Some('E') => Conversion::Exponent { upper: true },
            Some('g') => Conversion::General { upper: false },
            Some('G') => Conversion::General { upper: true },
            Some('c') => Conversion::Char,
            Some('s') => Conversion::Str,
            Some(other) => {
                return Err(FormatError::UnknownConversion {
                    template: self.template.to_string(),
                    conversion: other,
                })
            }
            None => {
                return Err(FormatError::Truncated {
                    template: self.template.to_string(),
                })
            }
        };

        Ok(Spec { flags, width, precision, conversion })
    }

    fn number(&mut self) -> Result<Option<usize>, FormatError> {
        if self.chars.peek() == Some(&'*') {
            return Err(FormatError::StarArgument {
                template: self.template.to_string(),
            });
        }
        let mut value: Option<usize> = None;
        while let Some(digit) = self.chars.peek().and_then(|c| c.to_digit(10)) {
            self.chars.next();
            let next = value.unwrap_or(0) * 10 + digit as usize;
            if next > MAX_FIELD_WIDTH {
                return Err(FormatError::FieldTooWide {
                    template: self.template.to_string(),
                });
            }
            value = Some(next);
        }
        Ok(value)
    }
}

fn write_conversion(spec: &Spec, value: LabelValue<'_>, out: &mut String) {
    if let LabelValue::Text(text) = value {
        if !matches!(spec.conversion, Conversion::Char) {
            write_text(spec, text, out);
            return;
        }
    }
    match spec.conversion {
        Conversion::Signed => write_signed(spec, value, out),
        Conversion::Unsigned => write_unsigned(spec, value, 10, false, out),
        Conversion::Octal => write_unsigned(spec, value, 8, false, out),
        Conversion::Hex { upper } => write_unsigned(spec, value, 16, upper, out),
        Conversion::Fixed { .. } | Conversion::Exponent { .. } | Conversion::General { .. } => {
            write_float(spec, as_float(value), out);
        }
        Conversion::Char => write_char(spec, value, out),
        Conversion::Str => {
            let text = match value {
                LabelValue::Int(v) => v.to_string(),
                LabelValue::UInt(v) => v.to_string(),
                LabelValue::Float(v) => general_body(v, None, false, false),
                LabelValue::Text(text) => text.to_string(),
            };
            write_text(spec, &text, out);
        }
    }
}

#[allow(clippy::cast_precision_loss)]
fn as_float(value: LabelValue<'_>) -> f64 {
    match value {
        LabelValue::Int(v) => v as f64,
        LabelValue::UInt(v) => v as f64,
        LabelValue::Float(v) => v,
        LabelValue::Text(_) => 0.0,
    }
}

fn sign_for(spec: &Spec, negative: bool) -> &'static str {
    if negative {
        "-"
    } else if spec.flags.plus {
        "+"
    } else if spec.flags.space {
        " "
    } else {
        ""
    }
}

fn pad(spec: &Spec, prefix: &str, body: &str, zero_pad: bool, out: &mut String) {
    let len = prefix.chars().count() + body.chars().count();
    let fill = spec.width.map_or(0, |width| width.saturating_sub(len));
    if spec.flags.left {
        out.push_str(prefix);
        out.push_str(body);
        out.extend(std::iter::repeat(' ').take(fill));
    } else if spec.flags.zero && zero_pad {
        out.push_str(prefix);
        out.extend(std::iter::repeat('0').take(fill));
        out.push_str(body);
    } else {
        out.extend(std::iter::repeat(' ').take(fill));
        out.push_str(prefix);
        out.push_str(body);
    }
}

fn apply_precision(digits: String, precision: Option<usize>, is_zero: bool) -> String {
    match precision {
        Some(0) if is_zero => String::new(),
        Some(p) if digits.len() < p => format!("{}{digits}", "0".repeat(p - digits.len())),
        _ => digits,
    }
}

#[allow(clippy::cast_possible_truncation)]
fn write_signed(spec: &Spec, value: LabelValue<'_>, out: &mut String) {
    let v: i128 = match value {
        LabelValue::Int(v) => i128::from(v),
        LabelValue::UInt(v) => i128::from(v),
        LabelValue::Float(v) => v.trunc() as i128,
        LabelValue::Text(_) => 0,
    };
    let digits = apply_precision(v.unsigned_abs().to_string(), spec.precision, v == 0);
    pad(spec, sign_for(spec, v < 0), &digits, spec.precision.is_none(), out);
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn write_unsigned(spec: &Spec, value: LabelValue<'_>, radix: u32, upper: bool, out: &mut String) {
    let v: u64 = match value {
        LabelValue::Int(v) => v as u64,
        LabelValue::UInt(v) => v,
        LabelValue::Float(v) if v < 0.0 => v.trunc() as i64 as u64,
        LabelValue::Float(v) => v.trunc() as u64,
        LabelValue::Text(_) => 0,
    };
    let raw = match (radix, upper) {
        (8, _) => format!("{v:o}"),
        (16, false) => format!("{v:x}"),
        (16, true) => format!("{v:X}"),
        _ => v.to_string(),
    };
    let mut digits = apply_precision(raw, spec.precision, v == 0);
    let mut prefix = "";
    if spec.flags.alternate {
        match radix {
            8 if !digits.starts_with('0') => digits.insert(0, '0'),
            16 if v != 0 => prefix = if upper { "0X" } else { "0x" },
            _ => {}
        }
    }
    pad(spec, prefix, &digits, spec.precision.is_none(), out);
}

fn write_float(spec: &Spec, v: f64, out: &mut String) {
    let upper = matches!(
        spec.conversion,
        Conversion::Fixed { upper: true }
            | Conversion::Exponent { upper: true }
            | Conversion::General { upper: true }
    );
    if !v.is_finite() {
        let body = match (v.is_nan(), upper) {
            (true, false) => "nan",
            (true, true) => "NAN",
            (false, false) => "inf",
            (false, true) => "INF",
        };
        let negative = v.is_infinite() && v.is_sign_negative();
        pad(spec, sign_for(spec, negative), body, false, out);
        return;
    }

    let abs = v.abs();
    let alternate = spec.flags.alternate;
    let body = match spec.conversion {
        Conversion::Fixed { .. } => fixed_body(abs, spec.precision.unwrap_or(6), alternate),
        Conversion::Exponent { .. } => {
            exponent_body(abs, spec.precision.unwrap_or(6), upper, alternate)
        }
        _ => general_body(abs, spec.precision, upper, alternate),
    };
    pad(spec, sign_for(spec, v.is_sign_negative()), &body, true, out);
}

fn fixed_body(abs: f64, precision: usize, alternate: bool) -> String {
    let mut body = format!("{abs:.precision$}");
    if alternate && precision == 0 {
        body.push('.');
    }
    body
}

/// Split Rust's `1.5e3` exponent notation into mantissa and exponent
fn split_exponent(abs: f64, precision: usize) -> (String, i32) {
    let formatted = format!("{abs:.precision$e}");
    match formatted.split_once('e') {
        Some((mantissa, exponent)) => (mantissa.to_string(), exponent.parse().unwrap_or(0)),
        None => (formatted, 0),
    }
}

fn exponent_body(abs: f64, precision: usize, upper: bool, alternate: bool) -> String {
    let (mut mantissa, exponent) = split_exponent(abs, precision);
    if alternate && precision == 0 {
        mantissa.push('.');
    }
    join_exponent(&mantissa, exponent, upper)
}

fn join_exponent(mantissa: &str, exponent: i32, upper: bool) -> String {
    let marker = if upper { 'E' } else { 'e' };
    let sign = if exponent < 0 { '-' } else { '+' };
    format!("{mantissa}{marker}{sign}{:02}", exponent.unsigned_abs())
}

fn strip_fraction_zeros(text: &str) -> &str {
    if text.contains('.') {
        text.trim_end_matches('0').trim_end_matches('.')
    } else {
        text
    }
}

#[allow(clippy::cast_possible_wrap, clippy::cast_sign_loss, clippy::cast_possible_truncation)]
fn general_body(abs: f64, precision: Option<usize>, upper: bool, alternate: bool) -> String {
    let significant = match precision {
        None => 6,
        Some(0) => 1,
        Some(p) => p,
    };
    let exponent = if abs == 0.0 { 0 } else { split_exponent(abs, significant - 1).1 };

    if exponent >= -4 && exponent < significant as i32 {
        let decimals = (significant as i32 - 1 - exponent) as usize;
        let body = fixed_body(abs, decimals, alternate);
        if alternate {
            body
        } else {
            strip_fraction_zeros(&body).to_string()
        }
    } else {
        let (mantissa, exponent) = split_exponent(abs, significant - 1);
        let mantissa = if alternate {
            if mantissa.contains('.') { mantissa } else { format!("{mantissa}.") }
        } else {
            strip_fraction_zeros(&mantissa).to_string()
        };
        join_exponent(&mantissa, exponent, upper)
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn write_char(spec: &Spec, value: LabelValue<'_>, out: &mut String) {
    let c = match value {
        LabelValue::Int(v) => u32::try_from(v).ok().and_then(char::from_u32),
        LabelValue::UInt(v) => u32::try_from(v).ok().and_then(char::from_u32),
        LabelValue::Float(v) if v >= 0.0 => char::from_u32(v as u32),
        LabelValue::Float(_) => None,
        LabelValue::Text(text) => text.chars().next(),
    };
    let body = c.map(String::from).unwrap_or_default();
    pad(spec, "", &body, false, out);
}

fn write_text(spec: &Spec, text: &str, out: &mut String) {
    let body = match spec.precision {
        Some(limit) => text.char_indices().nth(limit).map_or(text, |(end, _)| &text[..end]),
        None => text,
    };
    pad(spec, "", body, false, out);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fmt(template: &str, value: LabelValue<'_>) -> String {
        LabelFormat::parse(template).unwrap().format(value)
    }

    #[test]
    fn test_fixed_width_and_precision() {
        assert_eq!(fmt("%6.2f", LabelValue::Float(2.0)), "  2.00");
        assert_eq!(fmt("%-8.3f|", LabelValue::Float(-1.5)), "-1.500  |");
        assert_eq!(fmt("%08.2f", LabelValue::Float(-3.14159)), "-0003.14");
        assert_eq!(fmt("%+.1f", LabelValue::Float(2.26)), "+2.3");
        assert_eq!(fmt("%f", LabelValue::Int(3)), "3.000000");
        assert_eq!(fmt("%#.0f", LabelValue::Float(7.0)), "7.");
    }

    #[test]
    fn test_integer_conversions() {
        assert_eq!(fmt("%d", LabelValue::Int(10)), "10");
        assert_eq!(fmt("%lld", LabelValue::Int(-42)), "-42");
        assert_eq!(fmt("%5d", LabelValue::Int(42)), "   42");
        assert_eq!(fmt("%-5d|", LabelValue::Int(42)), "42   |");
        assert_eq!(fmt("%05d", LabelValue::Int(-42)), "-0042");
        assert_eq!(fmt("%.3d", LabelValue::Int(7)), "007");
        assert_eq!(fmt("%.0d", LabelValue::Int(0)), "");
        assert_eq!(fmt("% d", LabelValue::Int(5)), " 5");
        assert_eq!(fmt("%d", LabelValue::Float(-2.9)), "-2");
        assert_eq!(fmt("%u", LabelValue::UInt(u64::MAX)), "18446744073709551615");
        assert_eq!(fmt("%x", LabelValue::Int(255)), "ff");
        assert_eq!(fmt("%#X", LabelValue::Int(255)), "0XFF");
        assert_eq!(fmt("%#o", LabelValue::Int(8)), "010");
        assert_eq!(fmt("0x%04x", LabelValue::UInt(26)), "0x001a");
    }

    #[test]
    fn test_exponent_conversions() {
        assert_eq!(fmt("%e", LabelValue::Float(1500.0)), "1.500000e+03");
        assert_eq!(fmt("%.2E", LabelValue::Float(0.000_123)), "1.23E-04");
        assert_eq!(fmt("%.0e", LabelValue::Float(0.0)), "0e+00");
        assert_eq!(fmt("%e", LabelValue::Float(1.0e100)), "1.000000e+100");
    }

    #[test]
    fn test_general_conversion_matches_c() {
        assert_eq!(fmt("%g", LabelValue::Float(10.0)), "10");
        assert_eq!(fmt("%g", LabelValue::Float(0.5)), "0.5");
        assert_eq!(fmt("%g", LabelValue::Float(0.0001)), "0.0001");
        assert_eq!(fmt("%g", LabelValue::Float(0.000_01)), "1e-05");
        assert_eq!(fmt("%g", LabelValue::Float(1_000_000.0)), "1e+06");
        assert_eq!(fmt("%g", LabelValue::Float(123_456.0)), "123456");
        assert_eq!(fmt("%g", LabelValue::Float(1_234_567.0)), "1.23457e+06");
        assert_eq!(fmt("%.3g", LabelValue::Float(3.14159)), "3.14");
        assert_eq!(fmt("%#g", LabelValue::Float(1.0)), "1.00000");
        assert_eq!(fmt("%-#6.3g|", LabelValue::Float(2.5)), "2.50  |");
        assert_eq!(fmt("%g", LabelValue::Float(0.0)), "0");
        assert_eq!(fmt("%G", LabelValue::Float(1.0e-10)), "1E-10");
    }

    #[test]
    fn test_non_finite_values() {
        assert_eq!(fmt("%f", LabelValue::Float(f64::NAN)), "nan");
        assert_eq!(fmt("%5.1F", LabelValue::Float(f64::NEG_INFINITY)), " -INF");
        assert_eq!(fmt("%+g", LabelValue::Float(f64::INFINITY)), "+inf");
    }

    #[test]
    fn test_text_and_char_conversions() {
        assert_eq!(fmt("%s", LabelValue::Text("north")), "north");
        assert_eq!(fmt("%.3s", LabelValue::Text("north")), "nor");
        assert_eq!(fmt("[%6s]", LabelValue::Text("ab")), "[    ab]");
        assert_eq!(fmt("%d", LabelValue::Text("raw")), "raw");
        assert_eq!(fmt("%s", LabelValue::Int(12)), "12");
        assert_eq!(fmt("%s", LabelValue::Float(0.25)), "0.25");
        assert_eq!(fmt("%c", LabelValue::Int(65)), "A");
        assert_eq!(fmt("%c", LabelValue::Text("xyz")), "x");
    }

    #[test]
    fn test_literals_and_repeated_conversions() {
        let format = LabelFormat::parse("v=%d (%x) 100%%").unwrap();
        assert_eq!(format.conversion_count(), 2);
        assert_eq!(format.format(LabelValue::Int(31)), "v=31 (1f) 100%");
        assert_eq!(format.to_string(), "v=%d (%x) 100%%");

        let plain = LabelFormat::parse("id").unwrap();
        assert_eq!(plain.conversion_count(), 0);
        assert_eq!(plain.format(LabelValue::Int(1)), "id");
    }

    #[test]
    fn test_invalid_templates_are_rejected() {
        assert!(matches!(LabelFormat::parse("%"), Err(FormatError::Truncated { .. })));
        assert!(matches!(LabelFormat::parse("%5.2"), Err(FormatError::Truncated { .. })));
        assert!(matches!(
            LabelFormat::parse("%k"),
            Err(FormatError::UnknownConversion { conversion: 'k', .. })
        ));
        assert!(matches!(LabelFormat::parse("%*d"), Err(FormatError::StarArgument { .. })));
        assert!(matches!(LabelFormat::parse("%99999d"), Err(FormatError::FieldTooWide { .. })));
        assert!("%6.2f".parse::<LabelFormat>().is_ok());
    }
}
