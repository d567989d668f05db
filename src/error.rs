use std::io;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// Layout for the visual export could not be measured (no usable font
    /// face, or a block produced a non-finite height). The text export does
    /// not depend on this and is unaffected.
    #[error("layout measurement failed: {0}")]
    Measurement(String),

    /// A record store or enhancer call failed. The caller keeps its last
    /// good record.
    #[error("{operation} failed: {message}")]
    Collaborator {
        operation: &'static str,
        message: String,
    },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Only raised for text that is not JSON at all; shape problems inside
    /// valid JSON are repaired by the normalizer.
    #[error("invalid record JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
}

impl Error {
    pub fn collaborator(operation: &'static str, message: impl Into<String>) -> Self {
        Error::Collaborator {
            operation,
            message: message.into(),
        }
    }
}
