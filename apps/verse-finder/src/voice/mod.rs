// Voice input (recognition → situation text) and voice output (verse
// playback). Both adapters talk to the environment only through `SpeechHost`.

pub mod command;
pub mod error;
pub mod host;
pub mod input;
pub mod output;

pub use error::VoiceError;

#[cfg(test)]
pub mod testing {
    //! In-memory speech host that records every call.

    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;

    use super::host::{RecognitionConfig, SpeechCapabilities, SpeechHost, Utterance, Voice};
    use super::VoiceError;

    #[derive(Debug, Clone, PartialEq)]
    pub enum HostCall {
        StartListening,
        StopListening,
        Speak(Utterance),
        CancelSpeech,
    }

    #[derive(Default)]
    pub struct MockSpeechHost {
        pub capabilities: SpeechCapabilities,
        pub voices: Mutex<Vec<Voice>>,
        pub start_error: Mutex<Option<VoiceError>>,
        pub speak_error: Mutex<Option<VoiceError>>,
        pub speaking: AtomicBool,
        pub calls: Mutex<Vec<HostCall>>,
    }

    impl MockSpeechHost {
        pub fn full() -> Self {
            Self {
                capabilities: SpeechCapabilities {
                    recognition: true,
                    synthesis: true,
                },
                ..Self::default()
            }
        }

        pub fn with_voices(self, voices: Vec<Voice>) -> Self {
            *self.voices.lock().unwrap() = voices;
            self
        }

        pub fn calls(&self) -> Vec<HostCall> {
            self.calls.lock().unwrap().clone()
        }

        pub fn spoken(&self) -> Vec<Utterance> {
            self.calls()
                .into_iter()
                .filter_map(|c| match c {
                    HostCall::Speak(u) => Some(u),
                    _ => None,
                })
                .collect()
        }
    }

    impl SpeechHost for MockSpeechHost {
        fn capabilities(&self) -> SpeechCapabilities {
            self.capabilities
        }

        fn voices(&self) -> Vec<Voice> {
            self.voices.lock().unwrap().clone()
        }

        fn start_listening(&self, _config: &RecognitionConfig) -> Result<(), VoiceError> {
            self.calls.lock().unwrap().push(HostCall::StartListening);
            match self.start_error.lock().unwrap().take() {
                Some(e) => Err(e),
                None => Ok(()),
            }
        }

        fn stop_listening(&self) {
            self.calls.lock().unwrap().push(HostCall::StopListening);
        }

        fn speak(&self, utterance: &Utterance) -> Result<(), VoiceError> {
            self.calls
                .lock()
                .unwrap()
                .push(HostCall::Speak(utterance.clone()));
            if let Some(e) = self.speak_error.lock().unwrap().take() {
                return Err(e);
            }
            self.speaking.store(true, Ordering::SeqCst);
            Ok(())
        }

        fn cancel_speech(&self) {
            self.calls.lock().unwrap().push(HostCall::CancelSpeech);
            self.speaking.store(false, Ordering::SeqCst);
        }

        fn is_speaking(&self) -> bool {
            self.speaking.load(Ordering::SeqCst)
        }
    }

    pub fn voice(name: &str, lang: &str, local_service: bool, default: bool) -> Voice {
        Voice {
            name: name.to_string(),
            lang: lang.to_string(),
            local_service,
            default,
        }
    }
}
