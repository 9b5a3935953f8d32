use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum VoiceError {
    #[error("speech recognition is not supported by this host")]
    RecognitionUnsupported,

    #[error("speech synthesis is not supported by this host")]
    SynthesisUnsupported,

    #[error("a recognition session is already active")]
    AlreadyListening,

    #[error("{0}")]
    StartFailed(String),

    #[error("speech playback failed: {0}")]
    SpeakFailed(String),
}
