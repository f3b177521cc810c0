//! Text normalization for extracted cells.

/// Normalize a text cell: strip the BOM and control characters, collapse
/// whitespace runs, trim.
pub fn normalize_text(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut last_was_space = true;

    for ch in raw.chars() {
        if ch == '\u{feff}' {
            continue;
        }
        if ch.is_whitespace() || ch.is_control() {
            if !last_was_space {
                out.push(' ');
                last_was_space = true;
            }
        } else {
            out.push(ch);
            last_was_space = false;
        }
    }

    while out.ends_with(' ') {
        out.pop();
    }
    out
}

/// Key used to detect exact-duplicate rows within one document.
pub(crate) fn dedup_key(identifier: &str, description: &str) -> (String, String) {
    (
        normalize_text(identifier).to_uppercase(),
        normalize_text(description).to_lowercase(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapses_whitespace() {
        assert_eq!(normalize_text("  10k   ohm\tresistor  "), "10k ohm resistor");
    }

    #[test]
    fn test_strips_bom_and_controls() {
        assert_eq!(normalize_text("\u{feff}R100\u{0000}"), "R100");
    }

    #[test]
    fn test_dedup_key_ignores_case() {
        assert_eq!(
            dedup_key("r100", "10K Resistor"),
            dedup_key("R100", "10k  resistor")
        );
    }
}
