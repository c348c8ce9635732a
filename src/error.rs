//! Error types for the form, the file store and the settings file.
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by [`crate::form::InvoiceForm`] operations. A failed
/// operation never mutates the form.
#[derive(Debug, Error)]
pub enum FormError {
    #[error("item index {index} is out of range (invoice has {len} items)")]
    OutOfRange { index: usize, len: usize },
    #[error("an item is already being edited")]
    EditInProgress,
    #[error("no item is being edited")]
    NotEditing,
    #[error("invoice JSON could not be parsed: {0}")]
    Parse(#[source] serde_json::Error),
    #[error("{field} is not a finite number and cannot be saved")]
    NonFinite { field: String },
    #[error("invoice could not be serialized: {0}")]
    Serialize(#[source] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read invoice file '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write invoice file '{path}': {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("export file name is empty")]
    EmptyFileName,
    #[error("export file name '{0}' must not contain a path")]
    InvalidFileName(String),
    #[error(transparent)]
    Form(#[from] FormError),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to access settings file '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid settings file '{path}': {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("settings could not be serialized: {0}")]
    Serialize(#[from] toml::ser::Error),
}
