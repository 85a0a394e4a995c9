use crate::domain::metadata::MetadataError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("invalid id, an id must not be empty")]
    InvalidId,
    #[error("invalid device '{id}', {field} must not be empty")]
    InvalidDevice { id: String, field: &'static str },
    #[error("product info '{actual}' does not belong to product '{expected}'")]
    IdMismatch { expected: String, actual: String },
    #[error("malformed metadata: {0}")]
    MalformedSchema(#[from] MetadataError),
}
