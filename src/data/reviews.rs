//! Labelled review text loaded from CSV
//!
//! Review text is free-form and routinely contains commas, quotes and
//! newlines, so this loader goes through the `csv` crate instead of
//! splitting lines.

use crate::core::{Result, SVMError};
use crate::text::Stopwords;
use std::fs::File;
use std::io::Read;
use std::path::Path;

pub const DEFAULT_TEXT_COLUMN: &str = "review";
pub const DEFAULT_LABEL_COLUMN: &str = "sentiment";

/// Review texts with their string labels
#[derive(Debug, Clone, Default)]
pub struct ReviewDataset {
    texts: Vec<String>,
    labels: Vec<String>,
}

impl ReviewDataset {
    /// Load reviews from a CSV file with a header row
    pub fn from_file<P: AsRef<Path>>(
        path: P,
        text_column: &str,
        label_column: &str,
    ) -> Result<Self> {
        let file = File::open(path)?;
        Self::from_reader(file, text_column, label_column)
    }

    /// Load reviews from any reader producing CSV with a header row
    pub fn from_reader<R: Read>(reader: R, text_column: &str, label_column: &str) -> Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(reader);

        let headers = csv_reader.headers()?.clone();
        let text_idx = column_index(&headers, text_column)?;
        let label_idx = column_index(&headers, label_column)?;

        let mut texts = Vec::new();
        let mut labels = Vec::new();
        for record in csv_reader.records() {
            let record = record?;
            let (text, label) = match (record.get(text_idx), record.get(label_idx)) {
                (Some(text), Some(label)) => (text, label),
                _ => {
                    return Err(SVMError::ParseError(format!(
                        "record {} is missing the '{text_column}' or '{label_column}' field",
                        texts.len() + 1
                    )))
                }
            };
            texts.push(text.to_string());
            labels.push(label.trim().to_string());
        }

        if texts.is_empty() {
            return Err(SVMError::EmptyDataset);
        }

        Ok(Self { texts, labels })
    }

    /// Load a text column without labels, e.g. for prediction
    pub fn texts_from_file<P: AsRef<Path>>(path: P, text_column: &str) -> Result<Vec<String>> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(File::open(path)?);

        let headers = csv_reader.headers()?.clone();
        let text_idx = column_index(&headers, text_column)?;

        let mut texts = Vec::new();
        for record in csv_reader.records() {
            let record = record?;
            let text = record.get(text_idx).ok_or_else(|| {
                SVMError::ParseError(format!(
                    "record {} is missing the '{text_column}' field",
                    texts.len() + 1
                ))
            })?;
            texts.push(text.to_string());
        }
        if texts.is_empty() {
            return Err(SVMError::EmptyDataset);
        }
        Ok(texts)
    }

    pub fn len(&self) -> usize {
        self.texts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.texts.is_empty()
    }

    pub fn texts(&self) -> &[String] {
        &self.texts
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Clean every text and drop the given stopwords
    pub fn preprocess(&mut self, stopwords: &Stopwords) -> Result<()> {
        for text in &mut self.texts {
            *text = crate::text::preprocess(text, stopwords)?;
        }
        Ok(())
    }

    pub fn into_parts(self) -> (Vec<String>, Vec<String>) {
        (self.texts, self.labels)
    }
}

/// Header names of a CSV file, used to tell review files from numeric ones
pub fn csv_headers<P: AsRef<Path>>(path: P) -> Result<Vec<String>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(File::open(path)?);
    Ok(csv_reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_string())
        .collect())
}

fn column_index(headers: &csv::StringRecord, column: &str) -> Result<usize> {
    headers
        .iter()
        .position(|h| h.trim() == column)
        .ok_or_else(|| {
            SVMError::ParseError(format!(
                "column '{column}' not found, available columns: {}",
                headers.iter().collect::<Vec<_>>().join(", ")
            ))
        })
}
