//! Product review documents.
//!
//! Converts the review CSV into [`Document`]s: one per row, the review text as
//! content and the product title as metadata.


use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::core::config::settings::IngestSettings;

#[derive(Debug, Error)]
pub enum DataFormatError {
    #[error("failed to open {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("missing required column {column:?} (found: {found})")]
    MissingColumn { column: String, found: String },
    #[error("malformed CSV record{}: {source}", line_suffix(.line))]
    Csv {
        line: Option<u64>,
        #[source]
        source: csv::Error,
    },
}

/// A source row as read from the CSV.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductReview {
    pub product_title: String,
    pub review: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    pub product_title: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Stable id derived from the title, the review and how many identical
    /// rows precede this one. Independent of the row position.
    pub id: String,
    pub content: String,
    pub metadata: DocumentMetadata,
}

impl Document {
    pub fn from_review(review: ProductReview) -> Self {
        Self::from_nth_review(review, 0)
    }

    /// `occurrence` counts earlier rows with the same title and review.
    pub fn from_nth_review(review: ProductReview, occurrence: usize) -> Self {
        let id = document_id(&review.product_title, &review.review, occurrence);
        Self {
            id,
            content: review.review,
            metadata: DocumentMetadata {
                product_title: review.product_title,
            },
        }
    }
}

/// Names of the CSV columns holding the title and the review text.
#[derive(Debug, Clone)]
pub struct ColumnNames {
    pub title: String,
    pub review: String,
}

impl Default for ColumnNames {
    fn default() -> Self {
        Self {
            title: crate::core::config::defaults::DEFAULT_TITLE_COLUMN.to_string(),
            review: crate::core::config::defaults::DEFAULT_REVIEW_COLUMN.to_string(),
        }
    }
}

impl From<&IngestSettings> for ColumnNames {
    fn from(settings: &IngestSettings) -> Self {
        Self {
            title: settings.title_column.clone(),
            review: settings.review_column.clone(),
        }
    }
}

pub fn load_reviews(path: &Path, columns: &ColumnNames) -> Result<Vec<Document>, DataFormatError> {
    let file = File::open(path).map_err(|source| DataFormatError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let documents = documents_from_reader(file, columns)?;
    tracing::info!(
        "Loaded {} review documents from {}",
        documents.len(),
        path.display()
    );
    Ok(documents)
}

pub fn documents_from_reader<R: Read>(
    reader: R,
    columns: &ColumnNames,
) -> Result<Vec<Document>, DataFormatError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::Headers)
        .from_reader(reader);

    let headers = csv_reader.headers().map_err(csv_error)?.clone();
    let title_idx = column_index(&headers, &columns.title)?;
    let review_idx = column_index(&headers, &columns.review)?;

    let mut documents = Vec::new();
    let mut seen: HashMap<(String, String), usize> = HashMap::new();
    for record in csv_reader.records() {
        let record = record.map_err(csv_error)?;
        let review = ProductReview {
            product_title: record.get(title_idx).unwrap_or_default().to_string(),
            review: record.get(review_idx).unwrap_or_default().to_string(),
        };
        let occurrence = seen
            .entry((review.product_title.clone(), review.review.clone()))
            .or_insert(0);
        documents.push(Document::from_nth_review(review, *occurrence));
        *occurrence += 1;
    }

    Ok(documents)
}

fn column_index(headers: &csv::StringRecord, column: &str) -> Result<usize, DataFormatError> {
    headers
        .iter()
        .position(|header| header == column)
        .ok_or_else(|| DataFormatError::MissingColumn {
            column: column.to_string(),
            found: headers.iter().collect::<Vec<_>>().join(", "),
        })
}

fn line_suffix(line: &Option<u64>) -> String {
    line.map(|l| format!(" at line {}", l)).unwrap_or_default()
}

fn csv_error(source: csv::Error) -> DataFormatError {
    let line = source.position().map(|pos| pos.line());
    DataFormatError::Csv { line, source }
}

fn document_id(title: &str, content: &str, occurrence: usize) -> String {
    let mut hasher = Sha256::new();
    hasher.update(title.as_bytes());
    hasher.update([0x1f]);
    hasher.update(content.as_bytes());
    if occurrence > 0 {
        hasher.update([0x1f]);
        hasher.update((occurrence as u64).to_le_bytes());
    }
    hex::encode(hasher.finalize())
}
