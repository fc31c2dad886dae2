//! Text preprocessing and vectorization
//!
//! Turns raw review text into the dense feature matrix the SVM trains on:
//! [`clean_text`] and [`preprocess`] normalize the text, a [`Vectorizer`]
//! maps documents onto a fixed vocabulary.

pub mod bow;
pub mod clean;
pub mod pipeline;
pub mod stopwords;
pub mod tfidf;

pub use self::bow::BagOfWords;
pub use self::clean::{clean_text, preprocess, tokenize};
pub use self::pipeline::{TextPipeline, VectorizerKind, VectorizerState};
pub use self::stopwords::Stopwords;
pub use self::tfidf::TfIdf;

use crate::core::Result;
use ndarray::Array2;

/// Maps documents onto columns of a learned vocabulary
pub trait Vectorizer {
    /// Learn the vocabulary (and any weights) from a corpus
    fn fit(&mut self, documents: &[String]) -> Result<()>;

    /// One row per document, one column per vocabulary entry.
    ///
    /// Fails with `UnfittedModel` before `fit`.
    fn transform(&self, documents: &[String]) -> Result<Array2<f64>>;

    fn fit_transform(&mut self, documents: &[String]) -> Result<Array2<f64>> {
        self.fit(documents)?;
        self.transform(documents)
    }

    /// Vocabulary in column order; empty before `fit`
    fn vocabulary(&self) -> &[String];

    fn is_fitted(&self) -> bool;
}
