//! Centralized error type for the nocturne umbrella crate.
//!
//! Wraps all subsystem errors so `?` propagates naturally across crate boundaries.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Core(#[from] nocturne_core::Error),

    #[error("DSP: {0}")]
    Dsp(#[from] nocturne_dsp::Error),

    #[error("Synth: {0}")]
    Synth(#[from] nocturne_synth::Error),

    #[error(transparent)]
    Session(#[from] nocturne_session::Error),
}

impl Error {
    /// One sentence suitable for showing to the listener.
    pub fn user_message(&self) -> &'static str {
        match self {
            Error::Session(e) => e.user_message(),
            Error::Core(_) => "The audio output is not available.",
            Error::Dsp(_) | Error::Synth(_) => "This sound could not be prepared.",
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
