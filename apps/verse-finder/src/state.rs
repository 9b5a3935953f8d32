use std::sync::Arc;

use crate::config::Config;
use crate::suggestion::requester::SuggestionRequester;
use crate::voice::host::SpeechHost;

/// Everything the terminal front end needs, built once in `main`.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub requester: Arc<SuggestionRequester>,
    /// Recognition and synthesis. `CommandSpeechHost` unless a test swaps it.
    pub speech: Arc<dyn SpeechHost>,
}
