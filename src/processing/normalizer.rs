//! Text normalization into a canonical, comparable form

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;
use unicode_segmentation::UnicodeSegmentation;

/// Symbols kept by [`normalize`] besides ASCII letters, digits and whitespace.
pub const ALLOWED_SYMBOLS: &[char] = &['+', '#', '.', '-', '_', '(', ')'];

/// Lower-case, strip diacritics, drop characters outside the allow-list and
/// collapse whitespace.
///
/// The output only contains `[a-z0-9+#._()-]` and single spaces, so
/// normalizing it again is a no-op.
pub fn normalize(text: &str) -> String {
    let lowered = text.to_lowercase();

    let filtered: String = strip_diacritics(&lowered)
        .chars()
        .filter_map(|c| {
            if c.is_whitespace() {
                Some(' ')
            } else if is_allowed(c) {
                Some(c)
            } else {
                None
            }
        })
        .collect();

    filtered.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Decompose (NFD) and drop combining marks: `café` becomes `cafe`, `ñ` becomes `n`.
pub fn strip_diacritics(text: &str) -> String {
    text.nfd().filter(|c| !is_combining_mark(*c)).collect()
}

fn is_allowed(c: char) -> bool {
    c.is_ascii_lowercase() || c.is_ascii_digit() || ALLOWED_SYMBOLS.contains(&c)
}

/// Normalize a user-supplied keyword into the same alphabet as document text.
pub fn normalize_keyword(keyword: &str) -> String {
    normalize(keyword.trim())
}

/// Split a comma-separated keyword list, normalizing every entry.
///
/// Empty entries are dropped and duplicates keep their first position.
pub fn parse_keywords(input: &str) -> Vec<String> {
    let mut keywords: Vec<String> = Vec::new();

    for raw in input.split(',') {
        let keyword = normalize_keyword(raw);
        if !keyword.is_empty() && !keywords.contains(&keyword) {
            keywords.push(keyword);
        }
    }

    keywords
}

/// Word tokens of at least two characters, used as classifier features.
pub fn tokenize(text: &str) -> Vec<String> {
    text.unicode_words()
        .filter(|word| word.chars().count() >= 2)
        .map(|word| word.to_lowercase())
        .collect()
}

/// Truncate text to a maximum length with ellipsis, cutting on a word boundary
pub fn truncate_text(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }

    let cut = text
        .char_indices()
        .nth(max_chars)
        .map(|(idx, _)| idx)
        .unwrap_or(text.len());
    let truncated = &text[..cut];
    let end = truncated.rfind(' ').unwrap_or(cut);
    format!("{}...", &text[..end])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_basic() {
        assert_eq!(
            normalize("  Ingeniero   de Sistemas,\nPython & DOCKER!\t"),
            "ingeniero de sistemas python docker"
        );
    }

    #[test]
    fn test_normalize_keeps_allowed_symbols() {
        assert_eq!(
            normalize("Experiencia en .NET, C++ y C#; node_js (senior) - 5 años"),
            "experiencia en .net c++ y c# node_js (senior) - 5 anos"
        );
    }

    #[test]
    fn test_diacritics_are_stripped() {
        assert_eq!(normalize("café"), normalize("cafe"));
        assert_eq!(normalize("Inglés (Nativo) · Ñandú · pingüino"), "ingles (nativo) nandu pinguino");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let samples = [
            "",
            "   ",
            "Árbol de decisión — Ünïcödé “quotes” and emoji 🚀",
            "C++/C#/.NET/SQL-Server (avanzado)",
            "İstanbul ǅemal ﬁnance Straße",
            "línea1\r\nlínea2\ttab",
            "ends with combining e\u{301}",
        ];
        for sample in samples {
            let once = normalize(sample);
            assert_eq!(normalize(&once), once, "not idempotent for {:?}", sample);
        }
    }

    #[test]
    fn test_parse_keywords() {
        let keywords = parse_keywords("Python, docker , .NET, Inglés(Nativo), , python, SQL");
        assert_eq!(keywords, vec!["python", "docker", ".net", "ingles(nativo)", "sql"]);
    }

    #[test]
    fn test_keyword_drops_characters_outside_the_alphabet() {
        assert_eq!(normalize_keyword("  C/C++ "), "cc++");
        assert_eq!(normalize_keyword("Node.js!"), "node.js");
        assert_eq!(normalize_keyword("Inglés (nativo)"), "ingles (nativo)");
        // a keyword and the document text agree after normalization
        assert!(normalize("Programador C/C++ senior").contains(&normalize_keyword("C/C++")));
    }

    #[test]
    fn test_tokenize() {
        let tokens = tokenize("python y docker en aws c++");
        assert!(tokens.contains(&"python".to_string()));
        assert!(tokens.contains(&"docker".to_string()));
        assert!(tokens.contains(&"aws".to_string()));
        // single characters are not features
        assert!(!tokens.contains(&"y".to_string()));
        assert!(!tokens.contains(&"c".to_string()));
    }

    #[test]
    fn test_truncate_text() {
        assert_eq!(truncate_text("short", 10), "short");
        assert_eq!(truncate_text("backend engineer with python", 12), "backend...");
    }
}
