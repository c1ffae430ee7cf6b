//! Error types for the resume rendering engine.
//!
//! Most defects in the input are recovered where they occur (missing style
//! fields, unknown section identifiers, malformed markup, incomplete entries).
//! Only failures that leave a backend unable to produce any bytes surface here.

use thiserror::Error;

/// Result type alias for this library.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the library.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Document error: {0}")]
    Document(#[from] DocumentError),

    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised while reading a resume document or a style file.
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("Invalid document JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid style file: {0}")]
    StyleToml(String),
}

/// Errors raised by an output backend while serializing a document.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("PDF serialization failed: {0}")]
    Pdf(String),

    #[error("DOCX packaging failed: {0}")]
    Docx(String),

    #[error("Unreadable embedded image: {0}")]
    Image(String),

    #[error("XML write failed: {0}")]
    Xml(String),
}

impl From<lopdf::Error> for RenderError {
    fn from(e: lopdf::Error) -> Self {
        RenderError::Pdf(e.to_string())
    }
}

impl From<zip::result::ZipError> for RenderError {
    fn from(e: zip::result::ZipError) -> Self {
        RenderError::Docx(e.to_string())
    }
}

impl From<lopdf::Error> for Error {
    fn from(e: lopdf::Error) -> Self {
        Error::Render(e.into())
    }
}

impl From<zip::result::ZipError> for Error {
    fn from(e: zip::result::ZipError) -> Self {
        Error::Render(e.into())
    }
}

impl From<toml::de::Error> for DocumentError {
    fn from(e: toml::de::Error) -> Self {
        DocumentError::StyleToml(e.to_string())
    }
}
