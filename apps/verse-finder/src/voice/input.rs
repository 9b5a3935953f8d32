//! Voice input adapter: fills the situation description from speech.
//!
//! idle → listening → (results…) → idle, on natural end, stop, or error.
//! While listening the description holds `LISTENING_SENTINEL`; if the session
//! ends without any speech, the placeholder is removed again.

use std::sync::Arc;

use tracing::warn;

use crate::models::selections::{SelectionChange, Selections, LISTENING_SENTINEL};
use crate::voice::host::{RecognitionConfig, RecognitionErrorCode, RecognitionEvent, SpeechHost};
use crate::voice::VoiceError;

pub const UNSUPPORTED_MESSAGE: &str = "이 환경에서는 음성 인식을 지원하지 않습니다.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListeningState {
    Idle,
    Listening,
}

pub fn error_message(code: &RecognitionErrorCode) -> String {
    match code {
        RecognitionErrorCode::NoSpeech => "음성이 감지되지 않았습니다. 다시 시도해주세요.".to_string(),
        RecognitionErrorCode::AudioCapture => {
            "마이크 접근에 문제가 발생했습니다. 권한을 확인해주세요.".to_string()
        }
        RecognitionErrorCode::NotAllowed => {
            "마이크 사용이 허용되지 않았습니다. 설정을 확인해주세요.".to_string()
        }
        RecognitionErrorCode::Network => {
            "네트워크 오류로 음성 인식을 처리할 수 없습니다.".to_string()
        }
        RecognitionErrorCode::Other(code) => format!("음성 인식 오류: {code}"),
    }
}

pub struct VoiceInput {
    host: Arc<dyn SpeechHost>,
    config: RecognitionConfig,
    supported: bool,
    state: ListeningState,
    error: Option<String>,
}

impl VoiceInput {
    pub fn new(host: Arc<dyn SpeechHost>) -> Self {
        let supported = host.capabilities().recognition;
        if !supported {
            warn!("Speech recognition is not available; voice input disabled");
        }
        Self {
            host,
            config: RecognitionConfig::default(),
            supported,
            state: ListeningState::Idle,
            error: (!supported).then(|| UNSUPPORTED_MESSAGE.to_string()),
        }
    }

    pub fn is_supported(&self) -> bool {
        self.supported
    }

    pub fn is_listening(&self) -> bool {
        self.state == ListeningState::Listening
    }

    /// Inline message for the voice control, if any.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Idle → listening. The only way into a session.
    pub fn start(&mut self, selections: &mut Selections) -> Result<(), VoiceError> {
        if !self.supported {
            self.error = Some(UNSUPPORTED_MESSAGE.to_string());
            return Err(VoiceError::RecognitionUnsupported);
        }
        if self.is_listening() {
            return Err(VoiceError::AlreadyListening);
        }

        self.error = None;
        match self.host.start_listening(&self.config) {
            Ok(()) => {
                self.state = ListeningState::Listening;
                Ok(())
            }
            Err(e) => {
                self.error = Some(format!("음성 인식을 시작할 수 없습니다. ({e})"));
                self.state = ListeningState::Idle;
                clear_placeholder(selections);
                Err(e)
            }
        }
    }

    /// Asks the host to end the session. The state flips on the `End` event.
    pub fn stop(&self) {
        if self.is_listening() {
            self.host.stop_listening();
        }
    }

    /// Clears the description and ends any active session.
    pub fn clear_description(&mut self, selections: &mut Selections) {
        selections.apply(SelectionChange::SituationDescription(None));
        self.stop();
    }

    pub fn handle_event(&mut self, event: RecognitionEvent, selections: &mut Selections) {
        match event {
            RecognitionEvent::Start => {
                self.state = ListeningState::Listening;
                self.error = None;
                selections.apply(SelectionChange::SituationDescription(Some(
                    LISTENING_SENTINEL.to_string(),
                )));
            }
            RecognitionEvent::Result { transcripts } => {
                let full: String = transcripts.concat();
                let trimmed = full.trim();
                if !trimmed.is_empty() {
                    selections.apply(SelectionChange::SituationDescription(Some(
                        trimmed.to_string(),
                    )));
                }
            }
            RecognitionEvent::Error(code) => {
                warn!(code = code.as_str(), "Speech recognition error");
                self.error = Some(error_message(&code));
                clear_placeholder(selections);
                self.state = ListeningState::Idle;
            }
            RecognitionEvent::End => {
                self.state = ListeningState::Idle;
                clear_placeholder(selections);
            }
        }
    }
}

impl Drop for VoiceInput {
    fn drop(&mut self) {
        self.stop();
    }
}

fn clear_placeholder(selections: &mut Selections) {
    if selections.is_listening_placeholder() {
        selections.apply(SelectionChange::SituationDescription(None));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::voice::testing::{HostCall, MockSpeechHost};

    fn adapter() -> (VoiceInput, Arc<MockSpeechHost>) {
        let host = Arc::new(MockSpeechHost::full());
        (VoiceInput::new(host.clone()), host)
    }

    #[test]
    fn test_start_enters_listening_and_sets_sentinel() {
        let (mut input, host) = adapter();
        let mut s = Selections::default();

        input.start(&mut s).unwrap();
        input.handle_event(RecognitionEvent::Start, &mut s);

        assert!(input.is_listening());
        assert_eq!(s.situation_description.as_deref(), Some(LISTENING_SENTINEL));
        assert_eq!(host.calls(), vec![HostCall::StartListening]);
    }

    #[test]
    fn test_start_while_listening_is_rejected() {
        let (mut input, host) = adapter();
        let mut s = Selections::default();
        input.start(&mut s).unwrap();

        assert_eq!(input.start(&mut s), Err(VoiceError::AlreadyListening));
        assert_eq!(host.calls(), vec![HostCall::StartListening]);
    }

    #[test]
    fn test_result_sets_trimmed_concatenation() {
        let (mut input, _) = adapter();
        let mut s = Selections::default();
        input.start(&mut s).unwrap();
        input.handle_event(RecognitionEvent::Start, &mut s);

        input.handle_event(
            RecognitionEvent::Result {
                transcripts: vec!["  요즘 회사 일이".to_string(), " 너무 많아요  ".to_string()],
            },
            &mut s,
        );
        assert_eq!(
            s.situation_description.as_deref(),
            Some("요즘 회사 일이 너무 많아요")
        );
    }

    #[test]
    fn test_blank_result_keeps_previous_text() {
        let (mut input, _) = adapter();
        let mut s = Selections::default();
        input.handle_event(RecognitionEvent::Start, &mut s);
        input.handle_event(
            RecognitionEvent::Result {
                transcripts: vec!["  ".to_string()],
            },
            &mut s,
        );
        assert_eq!(s.situation_description.as_deref(), Some(LISTENING_SENTINEL));
    }

    #[test]
    fn test_error_with_sentinel_clears_description() {
        let (mut input, _) = adapter();
        let mut s = Selections::default();
        input.start(&mut s).unwrap();
        input.handle_event(RecognitionEvent::Start, &mut s);

        input.handle_event(RecognitionEvent::Error(RecognitionErrorCode::NoSpeech), &mut s);

        assert!(s.situation_description.is_none());
        assert!(!input.is_listening());
        assert_eq!(
            input.error(),
            Some("음성이 감지되지 않았습니다. 다시 시도해주세요.")
        );
    }

    #[test]
    fn test_error_after_speech_keeps_transcript() {
        let (mut input, _) = adapter();
        let mut s = Selections::default();
        input.handle_event(RecognitionEvent::Start, &mut s);
        input.handle_event(
            RecognitionEvent::Result {
                transcripts: vec!["불안해요".to_string()],
            },
            &mut s,
        );
        input.handle_event(RecognitionEvent::Error(RecognitionErrorCode::Network), &mut s);
        assert_eq!(s.situation_description.as_deref(), Some("불안해요"));
    }

    #[test]
    fn test_unknown_error_code_message() {
        assert_eq!(
            error_message(&RecognitionErrorCode::Other("aborted".to_string())),
            "음성 인식 오류: aborted"
        );
    }

    #[test]
    fn test_end_without_speech_clears_sentinel() {
        let (mut input, _) = adapter();
        let mut s = Selections::default();
        input.start(&mut s).unwrap();
        input.handle_event(RecognitionEvent::Start, &mut s);
        input.handle_event(RecognitionEvent::End, &mut s);

        assert!(!input.is_listening());
        assert!(s.situation_description.is_none());
    }

    #[test]
    fn test_end_after_speech_keeps_text() {
        let (mut input, _) = adapter();
        let mut s = Selections::default();
        input.handle_event(RecognitionEvent::Start, &mut s);
        input.handle_event(
            RecognitionEvent::Result {
                transcripts: vec!["감사한 하루".to_string()],
            },
            &mut s,
        );
        input.handle_event(RecognitionEvent::End, &mut s);
        assert_eq!(s.situation_description.as_deref(), Some("감사한 하루"));
    }

    #[test]
    fn test_stop_while_listening_asks_host() {
        let (mut input, host) = adapter();
        let mut s = Selections::default();
        input.stop();
        input.start(&mut s).unwrap();
        input.stop();
        assert_eq!(
            host.calls(),
            vec![HostCall::StartListening, HostCall::StopListening]
        );
    }

    #[test]
    fn test_host_refusing_to_start_reports_and_clears() {
        let host = Arc::new(MockSpeechHost::full());
        *host.start_error.lock().unwrap() = Some(VoiceError::StartFailed("device busy".to_string()));
        let mut input = VoiceInput::new(host.clone());
        let mut s = Selections::default();
        s.situation_description = Some(LISTENING_SENTINEL.to_string());

        assert!(input.start(&mut s).is_err());
        assert_eq!(input.error(), Some("음성 인식을 시작할 수 없습니다. (device busy)"));
        assert!(s.situation_description.is_none());
        assert!(!input.is_listening());
    }

    #[test]
    fn test_unsupported_host() {
        let host = Arc::new(MockSpeechHost::default());
        let mut input = VoiceInput::new(host.clone());
        let mut s = Selections::default();

        assert!(!input.is_supported());
        assert_eq!(input.error(), Some(UNSUPPORTED_MESSAGE));
        assert_eq!(input.start(&mut s), Err(VoiceError::RecognitionUnsupported));
        assert!(host.calls().is_empty());
    }

    #[test]
    fn test_clear_description_stops_active_session() {
        let (mut input, host) = adapter();
        let mut s = Selections::default();
        input.start(&mut s).unwrap();
        input.handle_event(RecognitionEvent::Start, &mut s);
        input.handle_event(
            RecognitionEvent::Result {
                transcripts: vec!["말하는 중".to_string()],
            },
            &mut s,
        );

        input.clear_description(&mut s);
        assert!(s.situation_description.is_none());
        assert!(host.calls().contains(&HostCall::StopListening));
    }
}
