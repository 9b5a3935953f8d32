//! Voice output adapter: reads the current suggestion aloud.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::models::suggestion::Suggestion;
use crate::reference::format_reference_for_speech;
use crate::voice::host::{SpeechHost, SynthesisEvent, Utterance, Voice, SPEECH_LOCALE};
use crate::voice::VoiceError;

/// Known good Korean voices, best first.
pub const PREFERRED_VOICES: &[&str] = &[
    "Google 한국의",
    "Microsoft Heami Online (Natural) - Korean (Korea)",
    "Microsoft Heami - Korean (Korea)",
];

pub const SPEECH_RATE: f32 = 0.9;
pub const SPEECH_PITCH: f32 = 1.0;
const REFLECTION_PREAMBLE: &str = "오늘의 묵상 포인트.";

/// Picks the voice for `locale`:
/// allow-listed name → network voice → host default → any match → none.
pub fn select_voice<'a>(voices: &'a [Voice], locale: &str) -> Option<&'a Voice> {
    let in_locale = || voices.iter().filter(move |v| v.lang == locale);

    PREFERRED_VOICES
        .iter()
        .find_map(|name| in_locale().find(|v| v.name == *name))
        .or_else(|| in_locale().find(|v| !v.local_service))
        .or_else(|| in_locale().find(|v| v.default))
        .or_else(|| in_locale().next())
}

/// `"<spoken reference>. <verse>."` plus the reflection when there is one.
pub fn compose_speech_text(suggestion: &Suggestion) -> String {
    let mut text = format!(
        "{}. {}.",
        format_reference_for_speech(&suggestion.reference),
        suggestion.verse_text
    );
    if let Some(application) = suggestion.application_text.as_deref() {
        text.push_str(&format!(" {REFLECTION_PREAMBLE} {application}"));
    }
    text
}

fn content_fingerprint(suggestion: &Suggestion) -> u64 {
    let mut hasher = DefaultHasher::new();
    suggestion.content_key().hash(&mut hasher);
    hasher.finish()
}

pub struct VoiceOutput {
    host: Arc<dyn SpeechHost>,
    /// `None` when the host cannot synthesize; every call is then a no-op.
    utterance: Option<Utterance>,
    playing: bool,
    loaded: Option<u64>,
}

impl VoiceOutput {
    pub fn new(host: Arc<dyn SpeechHost>) -> Self {
        let utterance = if host.capabilities().synthesis {
            Some(Utterance {
                text: String::new(),
                lang: SPEECH_LOCALE,
                rate: SPEECH_RATE,
                pitch: SPEECH_PITCH,
                voice: None,
            })
        } else {
            warn!("Speech synthesis is not available; playback disabled");
            None
        };

        let mut output = Self {
            host,
            utterance,
            playing: false,
            loaded: None,
        };
        output.refresh_voice();
        output
    }

    pub fn is_supported(&self) -> bool {
        self.utterance.is_some()
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    #[cfg(test)]
    pub fn voice(&self) -> Option<&Voice> {
        self.utterance.as_ref().and_then(|u| u.voice.as_ref())
    }

    /// Re-runs voice selection against the host's current voice list.
    pub fn refresh_voice(&mut self) {
        let Some(utterance) = self.utterance.as_mut() else {
            return;
        };
        let voices = self.host.voices();
        if voices.is_empty() {
            return;
        }
        match select_voice(&voices, SPEECH_LOCALE) {
            Some(voice) => {
                info!(voice = %voice.name, "Selected speech voice");
                utterance.voice = Some(voice.clone());
            }
            None => warn!("No Korean voice found; using the host default voice"),
        }
    }

    /// Makes `suggestion` the current content. Different content than before
    /// cancels whatever is being spoken.
    pub fn load(&mut self, suggestion: &Suggestion) {
        if self.utterance.is_none() {
            return;
        }
        let fingerprint = content_fingerprint(suggestion);
        if self.loaded == Some(fingerprint) {
            return;
        }
        if self.host.is_speaking() {
            self.host.cancel_speech();
        }
        self.playing = false;
        self.loaded = Some(fingerprint);
    }

    /// Forgets the current content, stopping any playback of it.
    pub fn unload(&mut self) {
        if self.utterance.is_some() && self.host.is_speaking() {
            self.host.cancel_speech();
        }
        self.playing = false;
        self.loaded = None;
    }

    /// Play/stop button.
    pub fn toggle(&mut self, suggestion: &Suggestion) -> Result<(), VoiceError> {
        self.load(suggestion);
        let Some(utterance) = self.utterance.as_mut() else {
            return Ok(());
        };

        if self.playing {
            self.host.cancel_speech();
            self.playing = false;
            return Ok(());
        }

        utterance.text = compose_speech_text(suggestion);
        match self.host.speak(utterance) {
            Ok(()) => {
                self.playing = true;
                Ok(())
            }
            Err(e) => {
                error!("Speech playback failed to start: {e}");
                self.playing = false;
                Err(e)
            }
        }
    }

    pub fn handle_event(&mut self, event: SynthesisEvent) {
        match event {
            SynthesisEvent::Start => debug!("Speech playback started"),
            SynthesisEvent::End => self.playing = false,
            SynthesisEvent::Error { code } => {
                error!(code = %code, "Speech playback error");
                self.playing = false;
            }
            SynthesisEvent::VoicesChanged => self.refresh_voice(),
        }
    }
}

impl Drop for VoiceOutput {
    fn drop(&mut self) {
        if self.utterance.is_some() && self.host.is_speaking() {
            self.host.cancel_speech();
        }
    }
}
