//! Terminal front end: draws the form and result, runs the menu, and pumps
//! speech host events into the voice adapters.

pub mod menu;
pub mod render;

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use chrono::Datelike;
use console::Term;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use crate::models::options::{AGE_OPTIONS, GENDER_OPTIONS, JOB_OPTIONS, MOOD_OPTIONS};
use crate::models::selections::SelectionChange;
use crate::session::Session;
use crate::state::AppState;
use crate::voice::host::{HostEvents, RecognitionEvent, SpeechHost};
use crate::voice::input::VoiceInput;
use crate::voice::output::VoiceOutput;
use menu::{MenuAction, MenuContext};
use render::Playback;

pub async fn run(state: AppState, events: HostEvents) -> Result<()> {
    let session = Session::new(state.requester.clone(), state.config.generate_image);
    let mut app = App::new(session, state.speech.clone(), events);
    app.run().await
}

struct App {
    session: Session,
    input: VoiceInput,
    output: VoiceOutput,
    events: HostEvents,
    term: Term,
}

impl App {
    fn new(session: Session, speech: Arc<dyn SpeechHost>, events: HostEvents) -> Self {
        Self {
            session,
            input: VoiceInput::new(speech.clone()),
            output: VoiceOutput::new(speech),
            events,
            term: Term::stdout(),
        }
    }

    async fn run(&mut self) -> Result<()> {
        loop {
            self.drain_events();
            self.draw()?;

            let items = menu::build_menu(&self.session.selections, self.menu_context());
            let Some(choice) = menu::select("무엇을 할까요?", items, 0).await? else {
                break;
            };
            // Playback may have finished while the menu was open.
            self.drain_events();

            match choice.action {
                MenuAction::Job => self.pick(MenuAction::Job).await?,
                MenuAction::Age => self.pick(MenuAction::Age).await?,
                MenuAction::Gender => self.pick(MenuAction::Gender).await?,
                MenuAction::Mood => self.pick(MenuAction::Mood).await?,
                MenuAction::Speak => self.listen().await,
                MenuAction::ClearSituation => {
                    self.input.clear_description(&mut self.session.selections)
                }
                MenuAction::ToggleImage => {
                    let flag = !self.session.selections.generate_image;
                    self.session.change(SelectionChange::GenerateImage(flag));
                }
                MenuAction::FindVerse => {
                    self.find_verse(async {
                        let _ = tokio::signal::ctrl_c().await;
                    })
                    .await
                }
                MenuAction::TogglePlayback => self.toggle_playback(),
                MenuAction::Reset => self.reset(),
                MenuAction::Quit => break,
            }
        }

        self.input.stop();
        self.output.unload();
        info!("Exiting");
        Ok(())
    }

    fn menu_context(&self) -> MenuContext {
        MenuContext {
            voice_input_supported: self.input.is_supported(),
            loading: self.session.is_loading(),
            playback: self.session.suggestion().map(|_| self.playback()),
        }
    }

    fn playback(&self) -> Playback {
        if !self.output.is_supported() {
            Playback::Unsupported
        } else if self.output.is_playing() {
            Playback::Playing
        } else {
            Playback::Stopped
        }
    }

    fn draw(&self) -> Result<()> {
        self.term.clear_screen()?;
        self.term.write_line(&render::header())?;
        self.term.write_line(&render::form(&self.session.selections))?;
        if let Some(message) = self.input.error() {
            self.term.write_line(&render::voice_error(message))?;
        }
        self.term.write_line("")?;
        self.term
            .write_line(&render::result(self.session.view(), self.playback()))?;
        self.term.write_line("")?;
        self.term
            .write_line(&render::footer(chrono::Local::now().year()))?;
        self.term.write_line("")?;
        Ok(())
    }

    async fn pick(&mut self, field: MenuAction) -> Result<()> {
        let selections = &self.session.selections;
        let (message, options, current) = match field {
            MenuAction::Job => ("직업", JOB_OPTIONS, &selections.job),
            MenuAction::Age => ("나이", AGE_OPTIONS, &selections.age),
            MenuAction::Gender => ("성별", GENDER_OPTIONS, &selections.gender),
            MenuAction::Mood => ("현재 기분/상황 (선택)", MOOD_OPTIONS, &selections.mood),
            _ => return Ok(()),
        };

        let (choices, cursor) = menu::choices(options, current);
        let current = current.clone();
        let Some(choice) = menu::select(message, choices, cursor).await? else {
            return Ok(());
        };

        if let Some(change) = menu::picked_change(field, &current, &choice) {
            self.session.change(change);
        }
        Ok(())
    }

    /// Runs one recognition session until the host reports its end.
    /// Ctrl+C asks the host to stop early.
    async fn listen(&mut self) {
        if self.input.start(&mut self.session.selections).is_err() {
            return;
        }

        let spinner = spinner("듣는 중... (Ctrl+C로 중지)");
        loop {
            tokio::select! {
                event = self.events.recognition.recv() => {
                    let Some(event) = event else { break };
                    let ended = event == RecognitionEvent::End;
                    self.input.handle_event(event, &mut self.session.selections);
                    if let Some(text) = self.session.selections.situation_description.as_deref() {
                        spinner.set_message(format!("듣는 중... {text}"));
                    }
                    if ended {
                        break;
                    }
                }
                _ = tokio::signal::ctrl_c() => {
                    debug!("Listening interrupted by user");
                    self.input.stop();
                }
            }
        }
        spinner.finish_and_clear();
    }

    /// Requests a suggestion, giving up when `cancel` resolves first.
    async fn find_verse(&mut self, cancel: impl Future<Output = ()>) {
        self.output.unload();
        let spinner = spinner("구절 찾는 중... (Ctrl+C로 취소)");
        self.session.submit(cancel).await;
        spinner.finish_and_clear();

        if let Some(suggestion) = self.session.suggestion() {
            self.output.load(suggestion);
        }
    }

    fn toggle_playback(&mut self) {
        if let Some(suggestion) = self.session.suggestion() {
            // Failures are logged by the adapter.
            let _ = self.output.toggle(suggestion);
        }
    }

    fn reset(&mut self) {
        self.input.stop();
        self.output.unload();
        self.session.reset();
    }

    fn drain_events(&mut self) {
        while let Ok(event) = self.events.recognition.try_recv() {
            self.input.handle_event(event, &mut self.session.selections);
        }
        while let Ok(event) = self.events.synthesis.try_recv() {
            self.output.handle_event(event);
        }
    }
}

fn spinner(message: &'static str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(message);
    spinner
}
