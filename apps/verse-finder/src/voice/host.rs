//! The speech host seam.
//!
//! Recognition and synthesis are provided by whatever environment the app
//! runs in. The adapters only see this trait; host callbacks arrive as events
//! on the channels handed out with the host.

use tokio::sync::mpsc;

use crate::voice::error::VoiceError;

/// Every recognition session and utterance is Korean.
pub const SPEECH_LOCALE: &str = "ko-KR";

/// What the host can do, negotiated once when an adapter is built.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SpeechCapabilities {
    pub recognition: bool,
    pub synthesis: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Voice {
    pub name: String,
    pub lang: String,
    /// `false` for network (server-side) voices.
    pub local_service: bool,
    pub default: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecognitionConfig {
    pub lang: &'static str,
    pub continuous: bool,
    pub interim_results: bool,
}

impl Default for RecognitionConfig {
    fn default() -> Self {
        Self {
            lang: SPEECH_LOCALE,
            continuous: false,
            interim_results: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Utterance {
    pub text: String,
    pub lang: &'static str,
    pub rate: f32,
    pub pitch: f32,
    pub voice: Option<Voice>,
}

/// Error codes a recognizer reports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecognitionErrorCode {
    NoSpeech,
    AudioCapture,
    NotAllowed,
    Network,
    Other(String),
}

impl RecognitionErrorCode {
    pub fn from_code(code: &str) -> Self {
        match code {
            "no-speech" => Self::NoSpeech,
            "audio-capture" => Self::AudioCapture,
            "not-allowed" => Self::NotAllowed,
            "network" => Self::Network,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::NoSpeech => "no-speech",
            Self::AudioCapture => "audio-capture",
            Self::NotAllowed => "not-allowed",
            Self::Network => "network",
            Self::Other(code) => code,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecognitionEvent {
    Start,
    /// Every transcript recognized so far in this session, in order.
    Result { transcripts: Vec<String> },
    Error(RecognitionErrorCode),
    End,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SynthesisEvent {
    Start,
    End,
    Error { code: String },
    VoicesChanged,
}

pub trait SpeechHost: Send + Sync {
    fn capabilities(&self) -> SpeechCapabilities;

    /// Voices currently known to the host. May be empty until the host
    /// reports `SynthesisEvent::VoicesChanged`, which it sends whenever the
    /// list becomes available or changes.
    fn voices(&self) -> Vec<Voice>;

    fn start_listening(&self, config: &RecognitionConfig) -> Result<(), VoiceError>;

    /// Ends the active session; the host still delivers `RecognitionEvent::End`.
    fn stop_listening(&self);

    fn speak(&self, utterance: &Utterance) -> Result<(), VoiceError>;

    fn cancel_speech(&self);

    fn is_speaking(&self) -> bool;
}

/// Receiving ends for host callbacks.
pub struct HostEvents {
    pub recognition: mpsc::UnboundedReceiver<RecognitionEvent>,
    pub synthesis: mpsc::UnboundedReceiver<SynthesisEvent>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_round_trip_for_known_codes() {
        for code in ["no-speech", "audio-capture", "not-allowed", "network"] {
            assert_eq!(RecognitionErrorCode::from_code(code).as_str(), code);
        }
    }

    #[test]
    fn test_unknown_error_code_is_preserved() {
        let code = RecognitionErrorCode::from_code("aborted");
        assert_eq!(code, RecognitionErrorCode::Other("aborted".to_string()));
        assert_eq!(code.as_str(), "aborted");
    }

    #[test]
    fn test_recognition_defaults() {
        let config = RecognitionConfig::default();
        assert_eq!(config.lang, "ko-KR");
        assert!(!config.continuous);
        assert!(config.interim_results);
    }
}
