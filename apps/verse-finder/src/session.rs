//! One user's form session: selections in, suggestion or error out.

use std::future::Future;
use std::sync::Arc;

use tracing::{info, warn};

use crate::errors::AppError;
use crate::models::selections::{SelectionChange, Selections};
use crate::models::suggestion::Suggestion;
use crate::suggestion::requester::SuggestionRequester;

pub const IDLE_HINT: &str =
    "정보를 선택하거나 음성으로 상황을 설명하고 '구절 찾기' 버튼을 눌러주세요.";

/// Which result view applies right now.
#[derive(Debug, PartialEq, Eq)]
pub enum ResultView<'a> {
    Loading,
    Error(&'a str),
    Suggestion(&'a Suggestion),
    Idle(&'static str),
}

pub struct Session {
    requester: Arc<SuggestionRequester>,
    generate_image_default: bool,
    pub selections: Selections,
    suggestion: Option<Suggestion>,
    error: Option<String>,
    loading: bool,
}

impl Session {
    pub fn new(requester: Arc<SuggestionRequester>, generate_image_default: bool) -> Self {
        Self {
            requester,
            generate_image_default,
            selections: Selections::with_image_default(generate_image_default),
            suggestion: None,
            error: None,
            loading: false,
        }
    }

    pub fn suggestion(&self) -> Option<&Suggestion> {
        self.suggestion.as_ref()
    }

    #[cfg(test)]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn change(&mut self, change: SelectionChange) {
        self.selections.apply(change);
    }

    /// Runs one request cycle and stores its outcome. If `cancel` resolves
    /// first the request is dropped and the result shows a cancellation
    /// message.
    pub async fn submit(&mut self, cancel: impl Future<Output = ()>) {
        self.error = None;
        self.suggestion = None;
        self.loading = true;

        let outcome = tokio::select! {
            result = self.requester.fetch_verse_suggestion(&self.selections) => result,
            _ = cancel => {
                warn!("Verse request cancelled");
                Err(AppError::Cancelled)
            }
        };
        match outcome {
            Ok(suggestion) => self.suggestion = Some(suggestion),
            Err(e) => self.error = Some(e.user_message()),
        }

        self.loading = false;
    }

    pub fn reset(&mut self) {
        info!("Session reset");
        self.selections = Selections::with_image_default(self.generate_image_default);
        self.suggestion = None;
        self.error = None;
    }

    pub fn view(&self) -> ResultView<'_> {
        if self.loading {
            ResultView::Loading
        } else if let Some(error) = &self.error {
            ResultView::Error(error)
        } else if let Some(suggestion) = &self.suggestion {
            ResultView::Suggestion(suggestion)
        } else {
            ResultView::Idle(IDLE_HINT)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::mock::{ImageScript, MockImageGenerator, MockTextGenerator};
    use crate::llm_client::{LlmError, TextGenerator};
    use crate::models::options::MOOD_OPTIONS;

    const VERSE_JSON: &str = r#"{"verseText": "수고하고 무거운 짐 진 자들아 다 내게로 오라", "reference": "마태복음 11:28", "applicationText": "오늘은 잠시 쉬어가도 괜찮습니다."}"#;

    fn session(text: MockTextGenerator, image_default: bool) -> Session {
        let requester = SuggestionRequester::new(
            Arc::new(text),
            Arc::new(MockImageGenerator::new(ImageScript::Image("QUJD"))),
        );
        Session::new(Arc::new(requester), image_default)
    }

    #[test]
    fn test_new_session_shows_idle_hint() {
        let s = session(MockTextGenerator::ok(VERSE_JSON), true);
        assert_eq!(s.view(), ResultView::Idle(IDLE_HINT));
        assert!(s.selections.generate_image);
    }

    #[tokio::test]
    async fn test_submit_stores_suggestion() {
        let mut s = session(MockTextGenerator::ok(VERSE_JSON), true);
        s.submit(std::future::pending()).await;

        assert!(!s.is_loading());
        assert!(s.error().is_none());
        match s.view() {
            ResultView::Suggestion(suggestion) => {
                assert_eq!(suggestion.reference, "마태복음 11:28");
                assert!(suggestion.image_url.is_some());
            }
            other => panic!("unexpected view: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_submit_failure_stores_user_message() {
        let mut s = session(MockTextGenerator::err(LlmError::MissingApiKey), true);
        s.submit(std::future::pending()).await;

        assert!(s.suggestion().is_none());
        let message = s.error().unwrap();
        assert!(message.contains("GEMINI_API_KEY"));
        assert!(matches!(s.view(), ResultView::Error(_)));
    }

    #[tokio::test]
    async fn test_failed_submit_clears_previous_suggestion() {
        let mut s = session(MockTextGenerator::ok("not json"), true);
        s.suggestion = Some(Suggestion {
            verse_text: "이전 구절".to_string(),
            reference: "시편 1:1".to_string(),
            application_text: None,
            image_url: None,
        });

        s.submit(std::future::pending()).await;
        assert!(s.suggestion().is_none());
        assert!(s.error().is_some());
    }

    #[tokio::test]
    async fn test_reset_restores_defaults_and_clears_result() {
        let mut s = session(MockTextGenerator::ok(VERSE_JSON), false);
        s.change(SelectionChange::Mood(MOOD_OPTIONS[3].value.to_string()));
        s.change(SelectionChange::GenerateImage(true));
        s.change(SelectionChange::SituationDescription(Some(
            "이직을 고민하고 있어요".to_string(),
        )));
        s.submit(std::future::pending()).await;

        s.reset();
        assert_eq!(s.selections, Selections::with_image_default(false));
        assert_eq!(s.view(), ResultView::Idle(IDLE_HINT));
    }

    #[test]
    fn test_mood_change_clears_description() {
        let mut s = session(MockTextGenerator::ok(VERSE_JSON), true);
        s.change(SelectionChange::SituationDescription(Some("피곤해요".to_string())));
        s.change(SelectionChange::Mood(MOOD_OPTIONS[1].value.to_string()));
        assert!(s.selections.situation_description.is_none());
    }

    /// Never answers.
    struct StalledText;

    #[async_trait::async_trait]
    impl TextGenerator for StalledText {
        async fn generate_json_text(&self, _prompt: &str) -> Result<String, LlmError> {
            std::future::pending().await
        }
    }

    #[tokio::test]
    async fn test_cancel_abandons_pending_request() {
        let requester = Arc::new(SuggestionRequester::new(
            Arc::new(StalledText),
            Arc::new(MockImageGenerator::new(ImageScript::Empty)),
        ));
        let mut s = Session::new(requester.clone(), false);

        s.submit(async {}).await;

        assert!(!s.is_loading());
        assert!(s.suggestion().is_none());
        assert_eq!(s.view(), ResultView::Error("구절 찾기를 취소했습니다."));
        assert!(!requester.is_in_flight());
    }
}
