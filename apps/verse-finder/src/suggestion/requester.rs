//! Suggestion requester: one verse request cycle.
//!
//! Flow: build prompt → text generation → shape validation →
//!       (if requested) image generation, best-effort.
//!
//! The two calls are sequential. Image failures never fail the request: the
//! verse is the product, the illustration is decoration.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::Deserialize;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::llm_client::{parse_json, ImageGenerator, TextGenerator};
use crate::models::selections::Selections;
use crate::models::suggestion::Suggestion;
use crate::suggestion::classify::classify_llm_error;
use crate::suggestion::prompts::{build_image_prompt, build_verse_prompt};

const MISSING_FIELDS_MESSAGE: &str =
    "API 응답에서 verseText, reference 또는 applicationText 필드가 누락되었습니다.";

/// Exactly the object the verse prompt asks for. Fields are optional here so
/// that a missing one is reported as a malformed answer, not a parse error.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VersePayload {
    verse_text: Option<String>,
    reference: Option<String>,
    application_text: Option<String>,
}

impl VersePayload {
    fn into_suggestion(self) -> Result<Suggestion, AppError> {
        let present = |field: Option<String>| field.filter(|v| !v.trim().is_empty());

        match (
            present(self.verse_text),
            present(self.reference),
            present(self.application_text),
        ) {
            (Some(verse_text), Some(reference), Some(application_text)) => Ok(Suggestion {
                verse_text,
                reference,
                application_text: Some(application_text),
                image_url: None,
            }),
            _ => Err(AppError::MalformedResponse(MISSING_FIELDS_MESSAGE.to_string())),
        }
    }
}

/// Clears the in-flight flag when the request finishes, however it finishes.
struct InFlightGuard<'a>(&'a AtomicBool);

impl<'a> InFlightGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub struct SuggestionRequester {
    text: Arc<dyn TextGenerator>,
    image: Arc<dyn ImageGenerator>,
    in_flight: AtomicBool,
}

impl SuggestionRequester {
    pub fn new(text: Arc<dyn TextGenerator>, image: Arc<dyn ImageGenerator>) -> Self {
        Self {
            text,
            image,
            in_flight: AtomicBool::new(false),
        }
    }

    #[cfg(test)]
    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Runs one request cycle. A second call while one is pending gets
    /// `AppError::Busy`.
    #[instrument(skip_all, fields(request_id = %Uuid::new_v4()))]
    pub async fn fetch_verse_suggestion(
        &self,
        selections: &Selections,
    ) -> Result<Suggestion, AppError> {
        let _guard = InFlightGuard::acquire(&self.in_flight).ok_or(AppError::Busy)?;

        let mut suggestion = self.fetch_verse(selections).await?;
        info!(reference = %suggestion.reference, "Verse suggestion received");

        if selections.generate_image {
            suggestion.image_url = self.fetch_image(&suggestion).await;
        }

        Ok(suggestion)
    }

    async fn fetch_verse(&self, selections: &Selections) -> Result<Suggestion, AppError> {
        let prompt = build_verse_prompt(selections);

        let result = async {
            let text = self
                .text
                .generate_json_text(&prompt)
                .await
                .map_err(classify_llm_error)?;
            parse_json::<VersePayload>(&text)
                .map_err(classify_llm_error)?
                .into_suggestion()
        }
        .await;

        if let Err(e) = &result {
            error!("Verse generation failed: {e}");
        }
        result
    }

    async fn fetch_image(&self, suggestion: &Suggestion) -> Option<String> {
        let prompt = build_image_prompt(suggestion);
        match self.image.generate_image(&prompt).await {
            Ok(Some(image)) => Some(image.to_data_url()),
            Ok(None) => {
                warn!("Image generation returned no image bytes");
                None
            }
            Err(e) => {
                error!("Image generation failed, continuing without image: {e}");
                None
            }
        }
    }
}
