use serde::{Deserialize, Serialize};

use crate::models::options::{
    first_value, AGE_OPTIONS, GENDER_OPTIONS, JOB_OPTIONS, MOOD_OPTIONS,
};

/// Placeholder shown in the situation field while voice capture is running.
/// Never treated as real user content.
pub const LISTENING_SENTINEL: &str = "듣고 있어요...";

/// The user's current form inputs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Selections {
    pub job: String,
    pub age: String,
    pub gender: String,
    pub mood: String,
    pub situation_description: Option<String>,
    pub generate_image: bool,
}

/// A single field edit coming from the form or the voice input adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionChange {
    Job(String),
    Age(String),
    Gender(String),
    Mood(String),
    SituationDescription(Option<String>),
    GenerateImage(bool),
}

/// What the prompt should treat as the user's current situation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SituationSource<'a> {
    /// Free text the user spoke.
    Described(&'a str),
    /// The selected mood option value.
    Mood(&'a str),
}

impl Default for Selections {
    fn default() -> Self {
        Self::with_image_default(true)
    }
}

impl Selections {
    /// Defaults to the first option of every set.
    pub fn with_image_default(generate_image: bool) -> Self {
        Self {
            job: first_value(JOB_OPTIONS),
            age: first_value(AGE_OPTIONS),
            gender: first_value(GENDER_OPTIONS),
            mood: first_value(MOOD_OPTIONS),
            situation_description: None,
            generate_image,
        }
    }

    /// Applies one field change.
    ///
    /// Changing the mood to a different value discards any spoken
    /// description. Re-selecting the current mood is not a change.
    pub fn apply(&mut self, change: SelectionChange) {
        match change {
            SelectionChange::Job(v) => self.job = v,
            SelectionChange::Age(v) => self.age = v,
            SelectionChange::Gender(v) => self.gender = v,
            SelectionChange::Mood(v) => {
                if v != self.mood {
                    self.mood = v;
                    self.situation_description = None;
                }
            }
            SelectionChange::SituationDescription(v) => self.situation_description = v,
            SelectionChange::GenerateImage(v) => self.generate_image = v,
        }
    }

    pub fn is_listening_placeholder(&self) -> bool {
        self.situation_description.as_deref() == Some(LISTENING_SENTINEL)
    }

    /// Spoken text wins over the mood when it is present, non-blank and not
    /// the listening placeholder.
    pub fn situation(&self) -> SituationSource<'_> {
        match self.situation_description.as_deref() {
            Some(text) if !text.trim().is_empty() && text.trim() != LISTENING_SENTINEL => {
                SituationSource::Described(text)
            }
            _ => SituationSource::Mood(&self.mood),
        }
    }
}
