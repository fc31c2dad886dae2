//! Fitted review-to-features pipeline
//!
//! Bundles stopword removal, a fitted vectorizer and the label encoder so a
//! saved model can turn raw review text into the matrix it was trained on.

use crate::core::{Result, SVMError};
use crate::data::LabelEncoder;
use crate::text::{preprocess, BagOfWords, Stopwords, TfIdf, Vectorizer};
use log::debug;
use ndarray::{Array1, Array2, ArrayView1};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which vectorizer to fit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VectorizerKind {
    #[default]
    BagOfWords,
    TfIdf,
}

impl FromStr for VectorizerKind {
    type Err = SVMError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "bow" | "bag-of-words" => Ok(VectorizerKind::BagOfWords),
            "tfidf" | "tf-idf" => Ok(VectorizerKind::TfIdf),
            other => Err(SVMError::InvalidParameter(format!(
                "unknown vectorizer '{other}', expected bow or tfidf"
            ))),
        }
    }
}

impl fmt::Display for VectorizerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VectorizerKind::BagOfWords => write!(f, "bow"),
            VectorizerKind::TfIdf => write!(f, "tfidf"),
        }
    }
}

/// A vectorizer together with its learned state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum VectorizerState {
    BagOfWords(BagOfWords),
    TfIdf(TfIdf),
}

impl VectorizerState {
    pub fn new(kind: VectorizerKind) -> Self {
        match kind {
            VectorizerKind::BagOfWords => VectorizerState::BagOfWords(BagOfWords::new()),
            VectorizerKind::TfIdf => VectorizerState::TfIdf(TfIdf::new()),
        }
    }

    pub fn kind(&self) -> VectorizerKind {
        match self {
            VectorizerState::BagOfWords(_) => VectorizerKind::BagOfWords,
            VectorizerState::TfIdf(_) => VectorizerKind::TfIdf,
        }
    }

    fn inner(&self) -> &dyn Vectorizer {
        match self {
            VectorizerState::BagOfWords(v) => v,
            VectorizerState::TfIdf(v) => v,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn Vectorizer {
        match self {
            VectorizerState::BagOfWords(v) => v,
            VectorizerState::TfIdf(v) => v,
        }
    }
}

impl Vectorizer for VectorizerState {
    fn fit(&mut self, documents: &[String]) -> Result<()> {
        self.inner_mut().fit(documents)
    }

    fn transform(&self, documents: &[String]) -> Result<Array2<f64>> {
        self.inner().transform(documents)
    }

    fn vocabulary(&self) -> &[String] {
        self.inner().vocabulary()
    }

    fn is_fitted(&self) -> bool {
        self.inner().is_fitted()
    }
}

/// Review text and string labels in, feature matrix and ±1 labels out
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextPipeline {
    vectorizer: VectorizerState,
    stopwords: Stopwords,
    labels: LabelEncoder,
}

impl TextPipeline {
    pub fn new(kind: VectorizerKind, stopwords: Stopwords) -> Self {
        Self {
            vectorizer: VectorizerState::new(kind),
            stopwords,
            labels: LabelEncoder::new(),
        }
    }

    /// Fit the vectorizer and label encoder on a labelled corpus
    pub fn fit_transform<S: AsRef<str>>(
        &mut self,
        texts: &[String],
        labels: &[S],
    ) -> Result<(Array2<f64>, Array1<f64>)> {
        if texts.len() != labels.len() {
            return Err(SVMError::InvalidShape(format!(
                "{} documents with {} labels",
                texts.len(),
                labels.len()
            )));
        }
        let y = self.labels.fit_transform_binary(labels)?;
        let documents = self.clean(texts)?;
        let x = self.vectorizer.fit_transform(&documents)?;
        debug!(
            "Fitted {} vectorizer: {} documents, {} terms",
            self.vectorizer.kind(),
            x.nrows(),
            x.ncols()
        );
        Ok((x, y))
    }

    /// Features for new documents using the fitted vocabulary
    pub fn transform(&self, texts: &[String]) -> Result<Array2<f64>> {
        let documents = self.clean(texts)?;
        self.vectorizer.transform(&documents)
    }

    /// Encode string labels with the fitted classes
    pub fn encode_labels<S: AsRef<str>>(&self, labels: &[S]) -> Result<Array1<f64>> {
        self.labels.transform_binary(labels)
    }

    /// Map ±1 predictions back to class names
    pub fn decode_labels(&self, predictions: ArrayView1<f64>) -> Result<Vec<String>> {
        self.labels.inverse_transform_binary(predictions)
    }

    pub fn vectorizer(&self) -> &VectorizerState {
        &self.vectorizer
    }

    pub fn stopwords(&self) -> &Stopwords {
        &self.stopwords
    }

    pub fn label_encoder(&self) -> &LabelEncoder {
        &self.labels
    }

    fn clean(&self, texts: &[String]) -> Result<Vec<String>> {
        texts
            .iter()
            .map(|text| preprocess(text, &self.stopwords))
            .collect()
    }
}
