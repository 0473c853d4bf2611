//! Normalization of loosely-typed caller input

use compact_str::CompactString;

/// Color used when a label is created without a usable color.
pub const DEFAULT_LABEL_COLOR: &str = "#000000";

/// A value after normalization, with a flag telling whether the input was
/// replaced on the way.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Normalized<T> {
    pub value: T,
    pub adjusted: bool,
}

impl<T> Normalized<T> {
    pub fn kept(value: T) -> Self {
        Self { value, adjusted: false }
    }

    pub fn replaced(value: T) -> Self {
        Self { value, adjusted: true }
    }
}

/// `#` followed by exactly 3 or 6 hex digits.
pub fn is_hex_color(color: &str) -> bool {
    match color.strip_prefix('#') {
        Some(digits) => {
            matches!(digits.len(), 3 | 6) && digits.chars().all(|c| c.is_ascii_hexdigit())
        },
        None => false,
    }
}

/// Color to send when creating a label: the input if valid, black otherwise.
pub fn normalize_label_color(color: Option<&str>) -> Normalized<CompactString> {
    match color {
        Some(color) if is_hex_color(color) => Normalized::kept(color.into()),
        _ => Normalized::replaced(DEFAULT_LABEL_COLOR.into()),
    }
}

/// Color to send when editing a label: invalid input is dropped so the
/// label keeps its current color.
pub fn normalize_label_color_update(color: Option<&str>) -> Normalized<Option<CompactString>> {
    match color {
        None => Normalized::kept(None),
        Some(color) if is_hex_color(color) => Normalized::kept(Some(color.into())),
        Some(_) => Normalized::replaced(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_colors() {
        for valid in ["#fff", "#FFF", "#a1B2c3", "#000000"] {
            assert!(is_hex_color(valid), "{valid}");
        }
        for invalid in ["red", "fff", "#ff", "#ffff", "#fffff", "#1234567", "#ggg", ""] {
            assert!(!is_hex_color(invalid), "{invalid}");
        }
    }

    #[test]
    fn create_falls_back_to_black() {
        assert_eq!(
            normalize_label_color(Some("red")),
            Normalized::replaced(CompactString::from("#000000"))
        );
        assert_eq!(
            normalize_label_color(None),
            Normalized::replaced(CompactString::from("#000000"))
        );
        assert_eq!(
            normalize_label_color(Some("#ff0000")),
            Normalized::kept(CompactString::from("#ff0000"))
        );
    }

    #[test]
    fn edit_drops_invalid_color() {
        assert_eq!(normalize_label_color_update(Some("red")), Normalized::replaced(None));
        assert_eq!(normalize_label_color_update(None), Normalized::kept(None));
        assert_eq!(
            normalize_label_color_update(Some("#abc")),
            Normalized::kept(Some(CompactString::from("#abc")))
        );
    }
}
