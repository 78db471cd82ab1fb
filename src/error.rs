//! All error types for the capyxliff crate.
//!
//! Only document-level operations (load, save, row addressing) fail. Markup
//! irregularities, duplicate tag ids and unresolved tag references are
//! recovered where they happen and never show up here.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("XML parse error: {0}")]
    XmlParse(#[from] quick_xml::Error),

    #[error("invalid data: {0}")]
    DataMismatch(String),

    #[error("invalid document: {0}")]
    InvalidDocument(String),

    #[error("parser limit exceeded: {0}")]
    LimitExceeded(String),

    #[error("cannot save to `{}`: {source}", path.display())]
    Save {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("row {0} is out of range")]
    RowOutOfRange(usize),

    #[error("unknown target state `{0}`")]
    UnknownState(String),
}

impl Error {
    /// Creates a new save error for the given destination.
    pub fn save_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Save {
            path: path.into(),
            source,
        }
    }

    /// Returns `true` when the error came out of an attempted document load.
    pub fn is_load_failure(&self) -> bool {
        matches!(
            self,
            Error::Io(_)
                | Error::XmlParse(_)
                | Error::DataMismatch(_)
                | Error::InvalidDocument(_)
                | Error::LimitExceeded(_)
        )
    }
}
