//! Label text assembly

use crate::data::LabelValue;
use crate::format::LabelFormat;

/// Append the label for `tuple` to `out`
///
/// The format is applied to each value in order and the pieces are
/// concatenated with no separator; separators belong in the format itself.
pub fn build_label_into(tuple: &[LabelValue<'_>], format: &LabelFormat, out: &mut String) {
    for value in tuple {
        format.format_into(*value, out);
    }
}

/// Build the label for `tuple`; an empty tuple gives an empty label
pub fn build_label(tuple: &[LabelValue<'_>], format: &LabelFormat) -> String {
    let mut out = String::new();
    build_label_into(tuple, format, &mut out);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_components_are_concatenated() {
        let format = LabelFormat::parse("%6.2f").unwrap();
        let tuple = [LabelValue::Float(1.0), LabelValue::Float(2.5), LabelValue::Float(-3.0)];
        assert_eq!(build_label(&tuple, &format), "  1.00  2.50 -3.00");
    }

    #[test]
    fn test_separators_come_from_the_format() {
        let format = LabelFormat::parse("%g;").unwrap();
        let tuple = [LabelValue::Int(1), LabelValue::Int(2)];
        assert_eq!(build_label(&tuple, &format), "1;2;");
    }

    #[test]
    fn test_empty_tuple_gives_empty_label() {
        let format = LabelFormat::parse("%d").unwrap();
        assert_eq!(build_label(&[], &format), "");
    }

    #[test]
    fn test_build_is_deterministic() {
        let format = LabelFormat::parse("%.3e").unwrap();
        let tuple = [LabelValue::Float(0.1), LabelValue::Float(1.0 / 3.0)];
        assert_eq!(build_label(&tuple, &format), build_label(&tuple, &format));
    }
}
