//! Error types for nocturne-dsp

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Filter design failed: {0}")]
    Filter(String),
}

pub type Result<T> = std::result::Result<T, Error>;
