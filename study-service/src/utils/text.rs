/// Collapse every run of whitespace into one ASCII space and trim both ends.
///
/// Whitespace is Unicode `White_Space` (`char::is_whitespace`) plus the
/// information separators U+001C..=U+001F, which regex `\s` classes also
/// match. Tabs, newlines and non-breaking spaces all collapse. No other
/// character is touched. The result is a fixed point:
/// `normalize(normalize(s)) == normalize(s)`.
pub fn normalize(text: &str) -> String {
    text.split(is_separator)
        .filter(|piece| !piece.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn is_separator(c: char) -> bool {
    c.is_whitespace() || ('\u{1C}'..='\u{1F}').contains(&c)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLES: &[&str] = &[
        "",
        " ",
        "\t\n\r ",
        "hello",
        "  hello   world  ",
        "line one\nline two\r\n\tline three",
        "a\u{00A0}\u{2003}b",
        "\u{3000}full-width\u{3000}",
        "already normal text",
        "x  ",
        "  y",
        "tabs\t\t\tand\n\n\nnewlines",
        "mixed \t \n \u{2028} separators",
        "fields\u{1C}\u{1D}\u{1E}\u{1F}end",
        "\u{1F}\u{1F}",
    ];

    fn has_adjacent_whitespace(s: &str) -> bool {
        s.chars()
            .zip(s.chars().skip(1))
            .any(|(a, b)| is_separator(a) && is_separator(b))
    }

    #[test]
    fn collapses_and_trims() {
        assert_eq!(normalize("  hello   world  "), "hello world");
        assert_eq!(
            normalize("line one\nline two\r\n\tline three"),
            "line one line two line three"
        );
        assert_eq!(normalize("\t\n "), "");
        assert_eq!(normalize("a\u{1F}\u{1F}b"), "a b");
        assert_eq!(normalize("\u{1C} x \u{1D}\u{1E}y\u{1F}"), "x y");
    }

    #[test]
    fn unicode_whitespace_becomes_ascii_space() {
        assert_eq!(normalize("a\u{00A0}\u{2003}b"), "a b");
    }

    #[test]
    fn other_characters_are_untouched() {
        assert_eq!(normalize("Ünïcødé: text!"), "Ünïcødé: text!");
    }

    #[test]
    fn output_has_no_adjacent_or_edge_whitespace() {
        for sample in SAMPLES {
            let out = normalize(sample);
            assert!(!has_adjacent_whitespace(&out), "{sample:?} -> {out:?}");
            assert_eq!(out.trim(), out, "{sample:?}");
            assert!(!out.starts_with(is_separator) && !out.ends_with(is_separator));
            assert!(out.chars().all(|c| c == ' ' || !is_separator(c)));
        }
    }

    #[test]
    fn is_idempotent() {
        for sample in SAMPLES {
            let once = normalize(sample);
            assert_eq!(normalize(&once), once, "{sample:?}");
        }
    }
}
