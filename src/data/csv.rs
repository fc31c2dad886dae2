//! Numeric CSV dataset
//!
//! Supports loading dense feature matrices from CSV files where:
//! - The last column is the label (unless loading unlabelled data)
//! - All other columns are features
//! - First row can be headers (automatically detected)
//! - Empty lines and lines starting with `#` are skipped

use crate::core::{Result, SVMError};
use csv::{ReaderBuilder, StringRecord, Trim};
use ndarray::{Array1, Array2, ArrayView1};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Dense numeric dataset loaded from CSV
#[derive(Debug, Clone)]
pub struct FeatureDataset {
    features: Array2<f64>,
    labels: Option<Array1<f64>>,
}

impl FeatureDataset {
    /// Load a labelled dataset from a CSV file
    ///
    /// The last column is assumed to be the label.
    /// Headers are automatically detected if present.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_reader(File::open(path)?)
    }

    /// Load a dataset in which every column is a feature
    pub fn from_file_unlabeled<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_reader_with_options(File::open(path)?, true, false)
    }

    /// Load a labelled dataset from a reader
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        Self::from_reader_with_options(reader, true, true)
    }

    /// Load a dataset from a reader with explicit header and label options
    pub fn from_reader_with_options<R: Read>(
        reader: R,
        auto_detect_header: bool,
        labelled: bool,
    ) -> Result<Self> {
        let mut csv_reader = ReaderBuilder::new()
            .has_headers(false)
            .comment(Some(b'#'))
            .flexible(true)
            .trim(Trim::All)
            .from_reader(reader);

        let mut values = Vec::new();
        let mut labels = Vec::new();
        let mut width: Option<usize> = None;
        let mut first_record = true;

        for record in csv_reader.records() {
            let record = record?;
            if record.iter().all(str::is_empty) {
                continue;
            }
            let line_no = record.position().map_or(0, |p| p.line());

            if first_record {
                first_record = false;
                if auto_detect_header && Self::is_header_record(&record, labelled) {
                    continue;
                }
            }

            let (row, label) = Self::parse_record(&record, line_no, labelled)?;
            match width {
                None => width = Some(row.len()),
                Some(w) if w != row.len() => {
                    return Err(SVMError::ParseError(format!(
                        "line {line_no}: expected {w} features, found {}",
                        row.len()
                    )))
                }
                Some(_) => {}
            }
            values.extend(row);
            if let Some(label) = label {
                labels.push(label);
            }
        }

        let width = match width {
            Some(w) => w,
            None => return Err(SVMError::EmptyDataset),
        };
        // every parsed row has at least one feature
        let n_rows = values.len() / width;
        let features = Array2::from_shape_vec((n_rows, width), values)
            .map_err(|e| SVMError::ParseError(e.to_string()))?;

        Ok(Self {
            features,
            labels: labelled.then(|| Array1::from(labels)),
        })
    }

    /// Check if a record appears to be a header
    fn is_header_record(record: &StringRecord, labelled: bool) -> bool {
        let fields: Vec<&str> = record.iter().collect();
        let feature_fields = if labelled {
            // Exclude last column (label)
            &fields[..fields.len().saturating_sub(1)]
        } else {
            &fields[..]
        };
        if feature_fields.is_empty() {
            return false;
        }

        // Check if most fields are non-numeric (likely headers)
        let non_numeric_count = feature_fields
            .iter()
            .filter(|field| field.parse::<f64>().is_err())
            .count();

        non_numeric_count * 2 > feature_fields.len()
    }

    /// Parse a CSV record into a feature row and optional label
    fn parse_record(
        record: &StringRecord,
        line_no: u64,
        labelled: bool,
    ) -> Result<(Vec<f64>, Option<f64>)> {
        let fields: Vec<&str> = record.iter().collect();
        let min_fields = if labelled { 2 } else { 1 };

        if fields.len() < min_fields {
            return Err(SVMError::ParseError(format!(
                "line {line_no}: too few fields: {}",
                fields.join(",")
            )));
        }

        let (feature_fields, label) = if labelled {
            let label_str = fields[fields.len() - 1];
            let label = label_str.parse::<f64>().map_err(|_| {
                SVMError::ParseError(format!("line {line_no}: invalid label: {label_str}"))
            })?;
            (&fields[..fields.len() - 1], Some(Self::binary_label(label)))
        } else {
            (&fields[..], None)
        };

        let row = feature_fields
            .iter()
            .enumerate()
            .map(|(idx, field)| {
                field.parse::<f64>().map_err(|_| {
                    SVMError::ParseError(format!(
                        "line {line_no}: invalid feature value at column {}: {field}",
                        idx + 1
                    ))
                })
            })
            .collect::<Result<Vec<f64>>>()?;

        Ok((row, label))
    }

    /// Map a numeric label onto ±1: positive values become +1, the rest -1
    fn binary_label(label: f64) -> f64 {
        if label > 0.0 {
            1.0
        } else {
            -1.0
        }
    }

    pub fn len(&self) -> usize {
        self.features.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of feature columns
    pub fn dim(&self) -> usize {
        self.features.ncols()
    }

    pub fn features(&self) -> &Array2<f64> {
        &self.features
    }

    pub fn labels(&self) -> Option<ArrayView1<'_, f64>> {
        self.labels.as_ref().map(|l| l.view())
    }

    /// Split into the feature matrix and labels
    pub fn into_parts(self) -> (Array2<f64>, Option<Array1<f64>>) {
        (self.features, self.labels)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use std::io::Cursor;

    #[test]
    fn test_csv_basic() {
        let data = "1.0,2.0,1\n3.0,4.0,-1\n";
        let dataset = FeatureDataset::from_reader(Cursor::new(data)).unwrap();

        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.dim(), 2);
        assert_eq!(dataset.features(), &array![[1.0, 2.0], [3.0, 4.0]]);
        assert_eq!(dataset.labels().unwrap(), array![1.0, -1.0].view());
    }

    #[test]
    fn test_csv_with_headers() {
        let data = "feature1,feature2,label\n1.0,2.0,1\n3.0,4.0,-1\n";
        let dataset = FeatureDataset::from_reader(Cursor::new(data)).unwrap();

        assert_eq!(dataset.len(), 2); // Headers should be skipped
        assert_eq!(dataset.labels().unwrap(), array![1.0, -1.0].view());
    }

    #[test]
    fn test_csv_label_conversion() {
        let data = "1.0,2.0,0.5\n3.0,4.0,-0.5\n5.0,6.0,0\n";
        let dataset = FeatureDataset::from_reader(Cursor::new(data)).unwrap();

        assert_eq!(dataset.labels().unwrap(), array![1.0, -1.0, -1.0].view());
    }

    #[test]
    fn test_csv_empty_lines_and_comments() {
        let data = "# Comment\n1.0,2.0,1\n\n3.0,4.0,-1\n";
        let dataset = FeatureDataset::from_reader(Cursor::new(data)).unwrap();

        assert_eq!(dataset.len(), 2);
    }

    #[test]
    fn test_csv_unlabelled() {
        let data = "x1,x2\n1.0,2.0\n3.0,4.0\n";
        let dataset =
            FeatureDataset::from_reader_with_options(Cursor::new(data), true, false).unwrap();

        assert_eq!(dataset.dim(), 2);
        assert!(dataset.labels().is_none());
    }

    #[test]
    fn test_csv_invalid_format() {
        // Too few fields
        let result = FeatureDataset::from_reader(Cursor::new("1.0\n"));
        assert!(matches!(result, Err(SVMError::ParseError(_))));

        // Invalid number
        let result = FeatureDataset::from_reader(Cursor::new("1.0,2.0,1\n1.0,abc,-1\n"));
        assert!(matches!(result, Err(SVMError::ParseError(_))));

        // Ragged rows
        let result = FeatureDataset::from_reader(Cursor::new("1.0,2.0,1\n1.0,-1\n"));
        assert!(matches!(result, Err(SVMError::ParseError(_))));
    }

    #[test]
    fn test_csv_empty() {
        let result = FeatureDataset::from_reader(Cursor::new("# nothing here\n\n"));
        assert!(matches!(result, Err(SVMError::EmptyDataset)));
    }

    #[test]
    fn test_csv_manual_header_control() {
        let data = "1.0,2.0,1\n3.0,4.0,-1\n";
        let dataset =
            FeatureDataset::from_reader_with_options(Cursor::new(data), false, true).unwrap();
        assert_eq!(dataset.len(), 2);
    }

    #[test]
    fn test_csv_quoted_fields() {
        let data = "\"x1\",\"x2\",\"label\"\n\"1.0\",\"2.0\",1\n\"-3.0\",\"4.5\",\"-1\"\n";
        let dataset = FeatureDataset::from_reader(Cursor::new(data)).unwrap();

        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.features(), &array![[1.0, 2.0], [-3.0, 4.5]]);
        assert_eq!(dataset.labels().unwrap(), array![1.0, -1.0].view());
    }

    #[test]
    fn test_error_names_bad_field() {
        let data = "1.0,2.0,1\n1.0,oops,-1\n";
        match FeatureDataset::from_reader(Cursor::new(data)) {
            Err(SVMError::ParseError(msg)) => assert!(msg.contains("oops"), "{msg}"),
            other => panic!("expected a parse error, got {other:?}"),
        }
    }

    #[test]
    fn test_is_header_record() {
        let record = |fields: &[&str]| StringRecord::from(fields.to_vec());
        assert!(FeatureDataset::is_header_record(&record(&["feature1", "feature2", "label"]), true));
        assert!(FeatureDataset::is_header_record(&record(&["x1", "x2", "x3", "y"]), true));
        assert!(!FeatureDataset::is_header_record(&record(&["1.0", "2.0", "3.0", "1"]), true));
        assert!(!FeatureDataset::is_header_record(&record(&["1"]), true)); // Too few fields
    }
}
