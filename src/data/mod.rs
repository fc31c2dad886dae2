//! Data loading and dataset utilities
//!
//! Review CSV files feed the text pipeline, numeric CSV files go straight
//! to the SVM. Label encoding and seeded splitting sit alongside.

pub mod csv;
pub mod labels;
pub mod reviews;
pub mod split;

pub use self::csv::FeatureDataset;
pub use self::labels::LabelEncoder;
pub use self::reviews::{csv_headers, ReviewDataset, DEFAULT_LABEL_COLUMN, DEFAULT_TEXT_COLUMN};
pub use self::split::{select_items, select_labels, select_rows, train_test_split, SplitIndices};
