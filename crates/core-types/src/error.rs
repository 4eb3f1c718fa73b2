use thiserror::Error;

/// Raised when an aggregate submitted over the wire fails boundary
/// validation. These are rejected before any store call is made.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Missing required field `{0}`.")]
    MissingField(&'static str),

    #[error("Invalid value for `{0}`: {1}")]
    InvalidValue(&'static str, String),
}
