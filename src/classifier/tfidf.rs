//! TF-IDF text vectorizer

use crate::error::{Result, RankerError};
use crate::processing::normalizer::tokenize;
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Sparse row: `(feature index, weight)` sorted by index
pub type SparseVector = Vec<(usize, f64)>;

/// Term-frequency × smoothed inverse-document-frequency features with
/// L2-normalized rows.
///
/// `idf(t) = ln((1 + n) / (1 + df(t))) + 1`, vocabulary indices follow the
/// alphabetical order of the terms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TfidfVectorizer {
    vocabulary: BTreeMap<String, usize>,
    idf: Vec<f64>,
}

impl TfidfVectorizer {
    /// Learn vocabulary and IDF weights from a corpus
    pub fn fit<S: AsRef<str>>(corpus: &[S]) -> Result<Self> {
        if corpus.is_empty() {
            return Err(RankerError::DegenerateTraining(
                "Cannot fit a vectorizer on an empty corpus".to_string(),
            ));
        }

        let mut document_frequency: BTreeMap<String, usize> = BTreeMap::new();
        for text in corpus {
            let unique: BTreeSet<String> = tokenize(text.as_ref()).into_iter().collect();
            for term in unique {
                *document_frequency.entry(term).or_insert(0) += 1;
            }
        }

        if document_frequency.is_empty() {
            return Err(RankerError::DegenerateTraining(
                "Training documents contain no usable terms".to_string(),
            ));
        }

        let n_documents = corpus.len() as f64;
        let mut vocabulary = BTreeMap::new();
        let mut idf = Vec::with_capacity(document_frequency.len());
        for (index, (term, df)) in document_frequency.into_iter().enumerate() {
            idf.push(((1.0 + n_documents) / (1.0 + df as f64)).ln() + 1.0);
            vocabulary.insert(term, index);
        }

        Ok(Self { vocabulary, idf })
    }

    pub fn vocabulary_size(&self) -> usize {
        self.idf.len()
    }

    /// Every vocabulary index must point into the IDF table
    pub fn check_consistency(&self) -> Result<()> {
        if self.vocabulary.len() != self.idf.len() {
            return Err(RankerError::ModelUnavailable(format!(
                "Vectorizer has {} terms but {} IDF weights",
                self.vocabulary.len(),
                self.idf.len()
            )));
        }
        if let Some((term, index)) = self.vocabulary.iter().find(|(_, &index)| index >= self.idf.len()) {
            return Err(RankerError::ModelUnavailable(format!(
                "Vectorizer term '{}' has out-of-range index {}",
                term, index
            )));
        }
        Ok(())
    }

    pub fn contains(&self, term: &str) -> bool {
        self.vocabulary.contains_key(term)
    }

    /// Vectorize one text; terms never seen during fitting are ignored
    pub fn transform(&self, text: &str) -> SparseVector {
        let mut counts: HashMap<usize, f64> = HashMap::new();
        for token in tokenize(text) {
            if let Some(&index) = self.vocabulary.get(&token) {
                *counts.entry(index).or_insert(0.0) += 1.0;
            }
        }

        let mut row: SparseVector = counts
            .into_iter()
            .map(|(index, tf)| (index, tf * self.idf[index]))
            .collect();
        row.sort_by_key(|(index, _)| *index);

        let norm = row.iter().map(|(_, w)| w * w).sum::<f64>().sqrt();
        if norm > 0.0 {
            row.iter_mut().for_each(|(_, w)| *w /= norm);
        }
        row
    }

    /// Dense document-term matrix for training
    pub fn transform_dense<S: AsRef<str>>(&self, corpus: &[S]) -> Array2<f64> {
        let mut matrix = Array2::zeros((corpus.len(), self.vocabulary_size()));
        for (row_index, text) in corpus.iter().enumerate() {
            for (column, weight) in self.transform(text.as_ref()) {
                matrix[[row_index, column]] = weight;
            }
        }
        matrix
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corpus() -> Vec<&'static str> {
        vec![
            "python django docker",
            "python pandas estadistica",
            "react javascript css",
        ]
    }

    #[test]
    fn test_fit_builds_sorted_vocabulary() {
        let vectorizer = TfidfVectorizer::fit(&corpus()).unwrap();
        assert_eq!(vectorizer.vocabulary_size(), 8);
        assert_eq!(vectorizer.vocabulary["css"], 0);
        assert!(vectorizer.contains("python"));
        assert!(!vectorizer.contains("rust"));
    }

    #[test]
    fn test_shared_terms_get_lower_idf() {
        let vectorizer = TfidfVectorizer::fit(&corpus()).unwrap();
        let python = vectorizer.idf[vectorizer.vocabulary["python"]];
        let react = vectorizer.idf[vectorizer.vocabulary["react"]];
        assert!(python < react);
        // react appears in one of three documents
        assert!((react - ((4.0f64 / 2.0).ln() + 1.0)).abs() < 1e-12);
    }

    #[test]
    fn test_rows_are_unit_length() {
        let vectorizer = TfidfVectorizer::fit(&corpus()).unwrap();
        let row = vectorizer.transform("python python docker");
        let norm: f64 = row.iter().map(|(_, w)| w * w).sum::<f64>().sqrt();
        assert!((norm - 1.0).abs() < 1e-12);
        assert!(row.windows(2).all(|pair| pair[0].0 < pair[1].0));
    }

    #[test]
    fn test_unseen_text_is_zero_vector() {
        let vectorizer = TfidfVectorizer::fit(&corpus()).unwrap();
        assert!(vectorizer.transform("contabilidad y finanzas").is_empty());
    }

    #[test]
    fn test_degenerate_corpus() {
        let empty: Vec<&str> = Vec::new();
        assert!(matches!(
            TfidfVectorizer::fit(&empty),
            Err(RankerError::DegenerateTraining(_))
        ));
        assert!(TfidfVectorizer::fit(&["a b", ""]).is_err());
    }

    #[test]
    fn test_dense_matrix_shape() {
        let vectorizer = TfidfVectorizer::fit(&corpus()).unwrap();
        let matrix = vectorizer.transform_dense(&corpus());
        assert_eq!(matrix.dim(), (3, 8));
    }
}
