//! Error types for nocturne-synth

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Dsp(#[from] nocturne_dsp::Error),

    #[error(transparent)]
    Core(#[from] nocturne_core::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
