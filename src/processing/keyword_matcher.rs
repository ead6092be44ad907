//! Keyword presence scoring over normalized document text

use crate::error::{Result, RankerError};
use crate::processing::document::Document;
use crate::processing::normalizer::normalize_keyword;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// How a keyword is matched against normalized text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeywordKind {
    /// `skill(level)`: whitespace allowed before each parenthesis
    Qualified,
    /// Contains `.`, `+` or `#` (`.net`, `c++`, `c#`): plain substring match
    Literal,
    /// Bounded by word boundaries, so `sql` does not match `mysql`
    WholeWord,
}

impl KeywordKind {
    pub fn classify(keyword: &str) -> Self {
        if keyword.contains('(') && keyword.contains(')') {
            KeywordKind::Qualified
        } else if keyword.contains(&['.', '+', '#'][..]) {
            KeywordKind::Literal
        } else {
            KeywordKind::WholeWord
        }
    }
}

#[derive(Debug, Clone)]
pub struct Keyword {
    pub text: String,
    pub kind: KeywordKind,
    pattern: Regex,
}

impl Keyword {
    pub fn new(text: &str) -> Result<Self> {
        let kind = KeywordKind::classify(text);
        let source = match kind {
            KeywordKind::Qualified => text
                .chars()
                .map(|c| match c {
                    '(' => r"\s*\(".to_string(),
                    ')' => r"\s*\)".to_string(),
                    other => regex::escape(&other.to_string()),
                })
                .collect::<String>(),
            KeywordKind::Literal => regex::escape(text),
            KeywordKind::WholeWord => format!(r"\b{}\b", regex::escape(text)),
        };

        let pattern = Regex::new(&source).map_err(|e| {
            RankerError::InvalidInput(format!("Cannot build pattern for keyword '{}': {}", text, e))
        })?;

        Ok(Self {
            text: text.to_string(),
            kind,
            pattern,
        })
    }

    pub fn is_match(&self, normalized_text: &str) -> bool {
        self.pattern.is_match(normalized_text)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KeywordMatchResult {
    /// Number of distinct keywords found, each counted once
    pub score: u32,
    /// Matched keywords in keyword-list order
    pub matched: Vec<String>,
}

pub struct KeywordMatcher {
    keywords: Vec<Keyword>,
}

impl KeywordMatcher {
    /// Build a matcher from keywords that are already normalized
    pub fn new(keywords: &[String]) -> Result<Self> {
        let keywords = keywords
            .iter()
            .filter(|k| !k.is_empty())
            .map(|k| Keyword::new(k))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { keywords })
    }

    /// Build a matcher from raw user keywords, normalizing each one first
    pub fn from_raw<S: AsRef<str>>(keywords: &[S]) -> Result<Self> {
        let normalized: Vec<String> = keywords.iter().map(|k| normalize_keyword(k.as_ref())).collect();
        Self::new(&normalized)
    }

    pub fn len(&self) -> usize {
        self.keywords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty()
    }

    /// Score one normalized text
    pub fn score_text(&self, normalized_text: &str) -> KeywordMatchResult {
        let matched: Vec<String> = self
            .keywords
            .iter()
            .filter(|k| k.is_match(normalized_text))
            .map(|k| k.text.clone())
            .collect();

        KeywordMatchResult {
            score: matched.len() as u32,
            matched,
        }
    }

    /// Score every document, keyed by file name
    pub fn score_documents(&self, documents: &[Document]) -> HashMap<String, KeywordMatchResult> {
        documents
            .iter()
            .map(|doc| (doc.file_name.clone(), self.score_text(&doc.normalized_text)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processing::normalizer::{normalize, parse_keywords};

    fn matcher(keywords: &[&str]) -> KeywordMatcher {
        KeywordMatcher::from_raw(keywords).unwrap()
    }

    #[test]
    fn test_classification() {
        assert_eq!(KeywordKind::classify("ingles(nativo)"), KeywordKind::Qualified);
        assert_eq!(KeywordKind::classify(".net"), KeywordKind::Literal);
        assert_eq!(KeywordKind::classify("c++"), KeywordKind::Literal);
        assert_eq!(KeywordKind::classify("c#"), KeywordKind::Literal);
        assert_eq!(KeywordKind::classify("sql"), KeywordKind::WholeWord);
        assert_eq!(KeywordKind::classify("machine learning"), KeywordKind::WholeWord);
    }

    #[test]
    fn test_symbol_keywords_match_literally() {
        let result = matcher(&[".net", "c++"]).score_text("experiencia en .net y c++");
        assert_eq!(result.score, 2);
        assert_eq!(result.matched, vec![".net", "c++"]);
    }

    #[test]
    fn test_keyword_with_slash_matches_normalized_text() {
        let result = matcher(&["C/C++"]).score_text(&normalize("Programador C/C++ y Java"));
        assert_eq!(result.score, 1);
        assert_eq!(result.matched, vec!["cc++"]);
    }

    #[test]
    fn test_symbol_keywords_ignore_word_boundaries() {
        // "asp.net" still contains ".net" and "c#" appears glued to other text
        let result = matcher(&[".net", "c#"]).score_text("asp.net core y c#10");
        assert_eq!(result.score, 2);
    }

    #[test]
    fn test_plain_keywords_match_whole_words() {
        let result = matcher(&["sql"]).score_text("mysql experto");
        assert_eq!(result.score, 0);
        assert!(result.matched.is_empty());

        let result = matcher(&["sql"]).score_text("experto en sql server");
        assert_eq!(result.score, 1);
    }

    #[test]
    fn test_qualifier_tolerates_whitespace() {
        let m = matcher(&["ingles(nativo)"]);
        assert_eq!(m.score_text("ingles (nativo)").score, 1);
        assert_eq!(m.score_text("ingles(nativo)").score, 1);
        assert_eq!(m.score_text("ingles ( nativo )").score, 0);
        assert_eq!(m.score_text("ingles (b2)").score, 0);
    }

    #[test]
    fn test_accents_and_case_are_irrelevant() {
        let m = matcher(&["Inglés(Nativo)", "PYTHON"]);
        let text = normalize("Idiomas: INGLÉS (nativo). Lenguajes: Python 3");
        let result = m.score_text(&text);
        assert_eq!(result.score, 2);
        assert_eq!(result.matched, vec!["ingles(nativo)", "python"]);
    }

    #[test]
    fn test_repeated_occurrences_count_once() {
        let result = matcher(&["python"]).score_text("python python python");
        assert_eq!(result.score, 1);
    }

    #[test]
    fn test_score_documents() {
        let docs = vec![
            Document::from_text("a.pdf", "Python y Docker en AWS", 0),
            Document::from_text("b.pdf", "Contabilidad y finanzas", 1),
        ];
        let m = KeywordMatcher::new(&parse_keywords("python, docker")).unwrap();
        let scores = m.score_documents(&docs);

        assert_eq!(scores["a.pdf"].score, 2);
        assert_eq!(scores["b.pdf"], KeywordMatchResult::default());
    }

    #[test]
    fn test_empty_keywords_are_dropped() {
        let m = KeywordMatcher::new(&["".to_string(), "go".to_string()]).unwrap();
        assert_eq!(m.len(), 1);
    }
}
