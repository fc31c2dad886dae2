//! TF-IDF weighting
//!
//! ```text
//! tf(w, d)  = count(w, d) / tokens(d)
//! idf(w)    = ln(n_docs / df(w)) + 1
//! tfidf     = tf · idf
//! ```
//!
//! Documents are cleaned with [`tokenize`](crate::text::tokenize) before
//! counting. The token total includes words outside the vocabulary, and a
//! document without tokens maps to a zero row.

use crate::core::{Result, SVMError};
use crate::text::{tokenize, Vectorizer};
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// TF-IDF vectorizer with vocabulary in first-seen order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TfIdf {
    vocabulary: Option<Vec<String>>,
    idf: Vec<f64>,
}

impl TfIdf {
    pub fn new() -> Self {
        Self::default()
    }

    /// IDF weights in vocabulary order
    pub fn idf(&self) -> &[f64] {
        &self.idf
    }
}

impl Vectorizer for TfIdf {
    fn fit(&mut self, documents: &[String]) -> Result<()> {
        let mut vocabulary = Vec::new();
        let mut doc_freq: HashMap<String, usize> = HashMap::new();

        for doc in documents {
            let tokens = tokenize(doc)?;
            let mut seen = HashSet::new();
            for token in tokens {
                if !seen.insert(token.clone()) {
                    continue;
                }
                let count = doc_freq.entry(token).or_insert_with_key(|word| {
                    vocabulary.push(word.clone());
                    0
                });
                *count += 1;
            }
        }

        let n_docs = documents.len() as f64;
        self.idf = vocabulary
            .iter()
            .map(|word| (n_docs / doc_freq[word] as f64).ln() + 1.0)
            .collect();
        self.vocabulary = Some(vocabulary);
        Ok(())
    }

    fn transform(&self, documents: &[String]) -> Result<Array2<f64>> {
        let vocabulary = self.vocabulary.as_ref().ok_or(SVMError::UnfittedModel)?;
        let index: HashMap<&str, usize> = vocabulary
            .iter()
            .enumerate()
            .map(|(i, word)| (word.as_str(), i))
            .collect();

        let mut matrix = Array2::zeros((documents.len(), vocabulary.len()));
        for (row, doc) in documents.iter().enumerate() {
            let tokens = tokenize(doc)?;
            if tokens.is_empty() {
                continue;
            }
            let total = tokens.len() as f64;
            for token in &tokens {
                if let Some(&col) = index.get(token.as_str()) {
                    matrix[[row, col]] += 1.0;
                }
            }
            for (col, idf) in self.idf.iter().enumerate() {
                matrix[[row, col]] *= idf / total;
            }
        }
        Ok(matrix)
    }

    fn vocabulary(&self) -> &[String] {
        self.vocabulary.as_deref().unwrap_or(&[])
    }

    fn is_fitted(&self) -> bool {
        self.vocabulary.is_some()
    }
}
