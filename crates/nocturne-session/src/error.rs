//! Error types for nocturne-session

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// Playback was paused for route safety and the route is still public.
    #[error("Output route is not private, refusing to resume")]
    UnsafeToResume,

    #[error("Audio session could not be activated")]
    SessionActivationFailed(#[source] nocturne_core::Error),

    #[error("Output engine failed to start")]
    EngineStartFailed(#[source] nocturne_core::Error),

    #[error("Failed to build preset")]
    Build(#[from] nocturne_synth::Error),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Settings store: {0}")]
    SettingsStore(String),

    #[error("Session runtime is not running")]
    RuntimeUnavailable,

    #[error("Failed to spawn session runtime")]
    Spawn(#[source] std::io::Error),
}

impl Error {
    /// One sentence suitable for showing to the listener.
    pub fn user_message(&self) -> &'static str {
        match self {
            Error::UnsafeToResume => {
                "Playback stays paused until headphones or a Bluetooth device are connected."
            }
            Error::SessionActivationFailed(_) => {
                "Another app is using audio right now, so playback could not start."
            }
            Error::EngineStartFailed(_) => "The audio output could not be started.",
            Error::Build(_) => "This sound could not be prepared.",
            Error::InvalidConfig(_) => "Playback is misconfigured.",
            Error::SettingsStore(_) => "Your settings could not be saved.",
            Error::RuntimeUnavailable | Error::Spawn(_) => "Playback is not available right now.",
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_messages_are_single_sentences() {
        let errors = [
            Error::UnsafeToResume,
            Error::SessionActivationFailed(nocturne_core::Error::DeviceNotRunning),
            Error::EngineStartFailed(nocturne_core::Error::DeviceNotRunning),
            Error::InvalidConfig("x".into()),
            Error::RuntimeUnavailable,
        ];
        for error in &errors {
            let message = error.user_message();
            assert!(message.ends_with('.'));
            assert_eq!(message.matches(". ").count(), 0, "{message}");
        }
    }
}
