//! Terminal speech host backed by external programs.
//!
//! Synthesis runs `TTS_COMMAND` with the utterance text on stdin.
//! Recognition runs `STT_COMMAND` and treats each non-empty stdout line as a
//! recognized segment; the session ends when the process exits. A line of the
//! form `#error <code>` (`no-speech`, `audio-capture`, `not-allowed`,
//! `network`, or any other code) reports a recognizer error and ends the
//! session.
//! Both get `SPEECH_LANG` (and synthesis `SPEECH_RATE`, `SPEECH_PITCH`,
//! `SPEECH_VOICE`) in their environment.

use std::process::{ExitStatus, Stdio};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, Command};
use tokio::runtime::Handle;
use tokio::sync::mpsc::{self, UnboundedSender};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::voice::host::{
    HostEvents, RecognitionConfig, RecognitionErrorCode, RecognitionEvent, SpeechCapabilities,
    SpeechHost, SynthesisEvent, Utterance, Voice, SPEECH_LOCALE,
};
use crate::voice::VoiceError;

/// A program plus arguments, parsed from a whitespace-separated string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
}

impl CommandSpec {
    pub fn parse(line: &str) -> Option<Self> {
        let mut parts = line.split_whitespace().map(str::to_string);
        let program = parts.next()?;
        Some(Self {
            program,
            args: parts.collect(),
        })
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .env("SPEECH_LANG", SPEECH_LOCALE)
            .stderr(Stdio::null())
            .kill_on_drop(true);
        // Keep Ctrl+C at the terminal from reaching the child.
        #[cfg(unix)]
        cmd.process_group(0);
        cmd
    }
}

const ERROR_LINE_PREFIX: &str = "#error";

/// At most one running process per slot. Starting a new one cancels the old.
#[derive(Default)]
struct ProcessSlot {
    current: Mutex<Option<(u64, CancellationToken)>>,
    next_id: AtomicU64,
}

impl ProcessSlot {
    fn begin(&self) -> (u64, CancellationToken) {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let token = CancellationToken::new();
        let previous = self
            .current
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace((id, token.clone()));
        if let Some((_, old)) = previous {
            old.cancel();
        }
        (id, token)
    }

    fn cancel(&self) {
        let current = self
            .current
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some((_, token)) = current {
            token.cancel();
        }
    }

    /// Releases the slot if `id` still owns it.
    fn finish(&self, id: u64) {
        let mut current = self.current.lock().unwrap_or_else(PoisonError::into_inner);
        if matches!(current.as_ref(), Some((owner, _)) if *owner == id) {
            *current = None;
        }
    }

    fn is_active(&self) -> bool {
        self.current
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }
}

pub struct CommandSpeechHost {
    tts: Option<CommandSpec>,
    stt: Option<CommandSpec>,
    runtime: Handle,
    recognition_tx: UnboundedSender<RecognitionEvent>,
    synthesis_tx: UnboundedSender<SynthesisEvent>,
    listening: Arc<ProcessSlot>,
    speaking: Arc<ProcessSlot>,
}

impl CommandSpeechHost {
    pub fn new(
        tts: Option<CommandSpec>,
        stt: Option<CommandSpec>,
        runtime: Handle,
    ) -> (Self, HostEvents) {
        let (recognition_tx, recognition) = mpsc::unbounded_channel();
        let (synthesis_tx, synthesis) = mpsc::unbounded_channel();
        // The voice list is fixed once the command is known.
        if tts.is_some() {
            let _ = synthesis_tx.send(SynthesisEvent::VoicesChanged);
        }
        (
            Self {
                tts,
                stt,
                runtime,
                recognition_tx,
                synthesis_tx,
                listening: Arc::new(ProcessSlot::default()),
                speaking: Arc::new(ProcessSlot::default()),
            },
            HostEvents {
                recognition,
                synthesis,
            },
        )
    }
}

impl SpeechHost for CommandSpeechHost {
    fn capabilities(&self) -> SpeechCapabilities {
        SpeechCapabilities {
            recognition: self.stt.is_some(),
            synthesis: self.tts.is_some(),
        }
    }

    /// One voice: the synthesis program itself.
    fn voices(&self) -> Vec<Voice> {
        self.tts
            .iter()
            .map(|spec| Voice {
                name: spec.program.clone(),
                lang: SPEECH_LOCALE.to_string(),
                local_service: true,
                default: true,
            })
            .collect()
    }

    fn start_listening(&self, config: &RecognitionConfig) -> Result<(), VoiceError> {
        let spec = self.stt.as_ref().ok_or(VoiceError::RecognitionUnsupported)?;
        if self.listening.is_active() {
            return Err(VoiceError::AlreadyListening);
        }

        let child = spec
            .command()
            .env("SPEECH_LANG", config.lang)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .spawn()
            .map_err(|e| VoiceError::StartFailed(e.to_string()))?;

        let (id, token) = self.listening.begin();
        let slot = self.listening.clone();
        let tx = self.recognition_tx.clone();
        let interim = config.interim_results;
        debug!(program = %spec.program, "Recognition process started");

        self.runtime.spawn(async move {
            let _ = tx.send(RecognitionEvent::Start);
            tokio::select! {
                _ = token.cancelled() => debug!("Recognition stopped"),
                _ = run_recognizer(child, interim, tx.clone()) => {}
            }
            slot.finish(id);
            let _ = tx.send(RecognitionEvent::End);
        });
        Ok(())
    }

    fn stop_listening(&self) {
        self.listening.cancel();
    }

    fn speak(&self, utterance: &Utterance) -> Result<(), VoiceError> {
        let spec = self.tts.as_ref().ok_or(VoiceError::SynthesisUnsupported)?;
        self.speaking.cancel();

        let mut cmd = spec.command();
        cmd.env("SPEECH_LANG", utterance.lang)
            .env("SPEECH_RATE", utterance.rate.to_string())
            .env("SPEECH_PITCH", utterance.pitch.to_string())
            .stdin(Stdio::piped())
            .stdout(Stdio::null());
        if let Some(voice) = &utterance.voice {
            cmd.env("SPEECH_VOICE", &voice.name);
        }
        let child = cmd
            .spawn()
            .map_err(|e| VoiceError::SpeakFailed(e.to_string()))?;

        let (id, token) = self.speaking.begin();
        let slot = self.speaking.clone();
        let tx = self.synthesis_tx.clone();
        let text = utterance.text.clone();

        self.runtime.spawn(async move {
            let _ = tx.send(SynthesisEvent::Start);
            let outcome = tokio::select! {
                _ = token.cancelled() => None,
                status = run_synthesizer(child, text) => Some(status),
            };
            slot.finish(id);
            // A cancelled utterance reports nothing; the adapter already stopped it.
            match outcome {
                None => {}
                Some(Ok(status)) if status.success() => {
                    let _ = tx.send(SynthesisEvent::End);
                }
                Some(Ok(status)) => {
                    warn!("Speech command exited with {status}");
                    let _ = tx.send(SynthesisEvent::Error {
                        code: format!("synthesis-failed ({status})"),
                    });
                }
                Some(Err(e)) => {
                    let _ = tx.send(SynthesisEvent::Error {
                        code: e.to_string(),
                    });
                }
            }
        });
        Ok(())
    }

    fn cancel_speech(&self) {
        self.speaking.cancel();
    }

    fn is_speaking(&self) -> bool {
        self.speaking.is_active()
    }
}

/// Streams transcript lines as interim results. Dropping this future kills
/// the process, as does returning early on an error line.
async fn run_recognizer(mut child: Child, interim: bool, tx: UnboundedSender<RecognitionEvent>) {
    let Some(stdout) = child.stdout.take() else {
        let _ = tx.send(RecognitionEvent::Error(RecognitionErrorCode::AudioCapture));
        return;
    };

    let mut lines = BufReader::new(stdout).lines();
    let mut transcripts: Vec<String> = Vec::new();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                if let Some(code) = line.strip_prefix(ERROR_LINE_PREFIX) {
                    let code = RecognitionErrorCode::from_code(code.trim());
                    debug!(code = code.as_str(), "Recognizer reported an error");
                    let _ = tx.send(RecognitionEvent::Error(code));
                    return;
                }
                transcripts.push(format!("{line} "));
                if interim {
                    let _ = tx.send(RecognitionEvent::Result {
                        transcripts: transcripts.clone(),
                    });
                }
            }
            Ok(None) => break,
            Err(e) => {
                warn!("Reading recognizer output failed: {e}");
                let _ = tx.send(RecognitionEvent::Error(RecognitionErrorCode::AudioCapture));
                return;
            }
        }
    }

    let code = match child.wait().await {
        Ok(status) if !status.success() => Some(RecognitionErrorCode::AudioCapture),
        Err(_) => Some(RecognitionErrorCode::AudioCapture),
        Ok(_) if transcripts.is_empty() => Some(RecognitionErrorCode::NoSpeech),
        Ok(_) => None,
    };

    match code {
        Some(code) => {
            let _ = tx.send(RecognitionEvent::Error(code));
        }
        None if !interim => {
            let _ = tx.send(RecognitionEvent::Result { transcripts });
        }
        None => {}
    }
}

async fn run_synthesizer(mut child: Child, text: String) -> std::io::Result<ExitStatus> {
    if let Some(mut stdin) = child.stdin.take() {
        stdin.write_all(text.as_bytes()).await?;
        stdin.shutdown().await?;
    }
    child.wait().await
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::time::timeout;

    use super::*;

    #[test]
    fn test_parse_command_spec() {
        let spec = CommandSpec::parse("espeak-ng -v ko  -s 150").unwrap();
        assert_eq!(spec.program, "espeak-ng");
        assert_eq!(spec.args, vec!["-v", "ko", "-s", "150"]);
        assert!(CommandSpec::parse("   ").is_none());
    }

    #[test]
    fn test_process_slot_finish_ignores_stale_owner() {
        let slot = ProcessSlot::default();
        let (first, first_token) = slot.begin();
        let (_second, _) = slot.begin();
        assert!(first_token.is_cancelled());

        slot.finish(first);
        assert!(slot.is_active());
    }

    #[tokio::test]
    async fn test_capabilities_follow_configuration() {
        let (host, _events) = CommandSpeechHost::new(
            CommandSpec::parse("say"),
            None,
            Handle::current(),
        );
        assert_eq!(
            host.capabilities(),
            SpeechCapabilities {
                recognition: false,
                synthesis: true
            }
        );
        assert_eq!(host.voices().len(), 1);
        assert_eq!(
            host.start_listening(&RecognitionConfig::default()),
            Err(VoiceError::RecognitionUnsupported)
        );
    }

    #[tokio::test]
    async fn test_voices_announced_only_with_synthesis() {
        let (_host, mut events) =
            CommandSpeechHost::new(CommandSpec::parse("say"), None, Handle::current());
        assert_eq!(events.synthesis.try_recv(), Ok(SynthesisEvent::VoicesChanged));
        assert!(events.synthesis.try_recv().is_err());

        let (_host, mut events) = CommandSpeechHost::new(None, None, Handle::current());
        assert!(events.synthesis.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_missing_program_fails_to_start() {
        let (host, _events) = CommandSpeechHost::new(
            None,
            CommandSpec::parse("definitely-not-a-real-recognizer-binary"),
            Handle::current(),
        );
        assert!(matches!(
            host.start_listening(&RecognitionConfig::default()),
            Err(VoiceError::StartFailed(_))
        ));
    }

    async fn next<T>(rx: &mut mpsc::UnboundedReceiver<T>) -> T {
        timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("timed out waiting for host event")
            .expect("host event channel closed")
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_speak_emits_start_and_end() {
        let (host, mut events) =
            CommandSpeechHost::new(CommandSpec::parse("cat"), None, Handle::current());
        host.speak(&Utterance {
            text: "요한복음 3장 16절".to_string(),
            lang: SPEECH_LOCALE,
            rate: 0.9,
            pitch: 1.0,
            voice: None,
        })
        .unwrap();

        assert_eq!(next(&mut events.synthesis).await, SynthesisEvent::VoicesChanged);
        assert_eq!(next(&mut events.synthesis).await, SynthesisEvent::Start);
        assert_eq!(next(&mut events.synthesis).await, SynthesisEvent::End);
        assert!(!host.is_speaking());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_recognizer_lines_become_results() {
        let (host, mut events) = CommandSpeechHost::new(
            None,
            CommandSpec::parse("echo 마음이 복잡해요"),
            Handle::current(),
        );
        host.start_listening(&RecognitionConfig::default()).unwrap();

        assert_eq!(next(&mut events.recognition).await, RecognitionEvent::Start);
        match next(&mut events.recognition).await {
            RecognitionEvent::Result { transcripts } => {
                assert_eq!(transcripts.concat().trim(), "마음이 복잡해요");
            }
            other => panic!("unexpected event: {other:?}"),
        }
        assert_eq!(next(&mut events.recognition).await, RecognitionEvent::End);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_silent_recognizer_reports_no_speech() {
        let (host, mut events) =
            CommandSpeechHost::new(None, CommandSpec::parse("true"), Handle::current());
        host.start_listening(&RecognitionConfig::default()).unwrap();

        assert_eq!(next(&mut events.recognition).await, RecognitionEvent::Start);
        assert_eq!(
            next(&mut events.recognition).await,
            RecognitionEvent::Error(RecognitionErrorCode::NoSpeech)
        );
        assert_eq!(next(&mut events.recognition).await, RecognitionEvent::End);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_stop_listening_ends_session() {
        let (host, mut events) =
            CommandSpeechHost::new(None, CommandSpec::parse("sleep 30"), Handle::current());
        host.start_listening(&RecognitionConfig::default()).unwrap();
        assert_eq!(next(&mut events.recognition).await, RecognitionEvent::Start);

        host.stop_listening();
        assert_eq!(next(&mut events.recognition).await, RecognitionEvent::End);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_error_line_reports_recognizer_code() {
        let (host, mut events) = CommandSpeechHost::new(
            None,
            CommandSpec::parse("echo #error not-allowed"),
            Handle::current(),
        );
        host.start_listening(&RecognitionConfig::default()).unwrap();

        assert_eq!(next(&mut events.recognition).await, RecognitionEvent::Start);
        assert_eq!(
            next(&mut events.recognition).await,
            RecognitionEvent::Error(RecognitionErrorCode::NotAllowed)
        );
        assert_eq!(next(&mut events.recognition).await, RecognitionEvent::End);
    }
}
