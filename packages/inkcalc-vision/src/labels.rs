//! The classifier's label alphabet and the glyphs each label stands for.

/// Class labels in the model's output order.
pub const CLASSES: [&str; 14] = [
    "0", "1", "2", "3", "4", "5", "6", "7", "8", "9", "add", "div", "mul", "sub",
];

pub fn class_label(index: usize) -> Option<&'static str> {
    CLASSES.get(index).copied()
}

/// Display glyph for a class label. Digits map to themselves.
pub fn glyph_for_label(label: &'static str) -> &'static str {
    match label {
        "add" => "+",
        "sub" => "-",
        "mul" => "×",
        "div" => "÷",
        other => other,
    }
}

pub fn glyph_for_class(index: usize) -> Option<&'static str> {
    class_label(index).map(glyph_for_label)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digit_classes_map_to_themselves() {
        for digit in 0..10 {
            assert_eq!(glyph_for_class(digit), Some(CLASSES[digit]));
        }
    }

    #[test]
    fn test_operator_classes() {
        assert_eq!(glyph_for_class(10), Some("+"));
        assert_eq!(glyph_for_class(11), Some("÷"));
        assert_eq!(glyph_for_class(12), Some("×"));
        assert_eq!(glyph_for_class(13), Some("-"));
    }

    #[test]
    fn test_out_of_range() {
        assert_eq!(glyph_for_class(CLASSES.len()), None);
    }
}
