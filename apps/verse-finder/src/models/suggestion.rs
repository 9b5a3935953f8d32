use serde::{Deserialize, Serialize};

/// The verse bundle produced by one successful request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Suggestion {
    pub verse_text: String,
    pub reference: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub application_text: Option<String>,
    /// `data:image/jpeg;base64,...`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl Suggestion {
    /// Identity of the content a listener hears or sees. Playback is reset
    /// whenever this changes.
    pub fn content_key(&self) -> (&str, Option<&str>, Option<&str>) {
        (
            &self.verse_text,
            self.application_text.as_deref(),
            self.image_url.as_deref(),
        )
    }
}
