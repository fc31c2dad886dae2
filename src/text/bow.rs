//! Bag-of-words counts

use crate::core::{Result, SVMError};
use crate::text::Vectorizer;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

/// Raw token counts over a sorted vocabulary.
///
/// Documents are expected to be preprocessed already; tokens are split on
/// whitespace as they are. Tokens not seen during `fit` are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BagOfWords {
    vocabulary: Option<Vec<String>>,
}

impl BagOfWords {
    pub fn new() -> Self {
        Self::default()
    }

    /// Column of `token`, if it is in the vocabulary
    pub fn index_of(&self, token: &str) -> Option<usize> {
        self.vocabulary
            .as_ref()?
            .binary_search_by(|word| word.as_str().cmp(token))
            .ok()
    }
}

impl Vectorizer for BagOfWords {
    fn fit(&mut self, documents: &[String]) -> Result<()> {
        let mut vocabulary: Vec<String> = documents
            .iter()
            .flat_map(|doc| doc.split_whitespace())
            .map(str::to_string)
            .collect();
        vocabulary.sort_unstable();
        vocabulary.dedup();
        self.vocabulary = Some(vocabulary);
        Ok(())
    }

    fn transform(&self, documents: &[String]) -> Result<Array2<f64>> {
        let vocabulary = self.vocabulary.as_ref().ok_or(SVMError::UnfittedModel)?;
        let mut counts = Array2::zeros((documents.len(), vocabulary.len()));
        for (row, doc) in documents.iter().enumerate() {
            for token in doc.split_whitespace() {
                if let Some(col) = self.index_of(token) {
                    counts[[row, col]] += 1.0;
                }
            }
        }
        Ok(counts)
    }

    fn vocabulary(&self) -> &[String] {
        self.vocabulary.as_deref().unwrap_or(&[])
    }

    fn is_fitted(&self) -> bool {
        self.vocabulary.is_some()
    }
}
