//! Screen sections as plain strings. Styling goes through `console`, which
//! drops the escape codes when stdout is not a terminal.

use console::Style;

use crate::models::options::{label_for, AGE_OPTIONS, GENDER_OPTIONS, JOB_OPTIONS, MOOD_OPTIONS};
use crate::models::selections::Selections;
use crate::models::suggestion::Suggestion;
use crate::session::ResultView;

pub const TITLE: &str = "성경 구절 추천기";
const TAGLINE: &str = "당신에게 힘이 되는 말씀을 찾아드립니다.";
const REFLECTION_HEADING: &str = "오늘의 묵상 포인트 ✨";
pub const PLAYBACK_UNSUPPORTED: &str = "음성 읽기 기능을 지원하지 않는 환경입니다.";

/// State of the read-aloud control under a suggestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Playback {
    Unsupported,
    Stopped,
    Playing,
}

impl Playback {
    pub fn label(self) -> Option<&'static str> {
        match self {
            Playback::Unsupported => None,
            Playback::Stopped => Some("🔊 말씀과 묵상 읽기"),
            Playback::Playing => Some("🔇 읽기 중지"),
        }
    }
}

pub fn header() -> String {
    let title = Style::new().bold().cyan().apply_to(format!("📖 {TITLE}"));
    let tagline = Style::new().dim().apply_to(TAGLINE);
    format!("{title}\n{tagline}\n")
}

pub fn footer(year: i32) -> String {
    let style = Style::new().dim();
    format!(
        "{}\n{}",
        style.apply_to(format!("© {year} {TITLE}. API 제공: Google Gemini.")),
        style.apply_to("개역개정 성경 기반"),
    )
}

/// The form as it currently stands.
pub fn form(selections: &Selections) -> String {
    let key = Style::new().bold();
    let mut lines = vec![
        format!("{} {}", key.apply_to("직업:"), label_for(JOB_OPTIONS, &selections.job)),
        format!("{} {}", key.apply_to("나이:"), label_for(AGE_OPTIONS, &selections.age)),
        format!(
            "{} {}",
            key.apply_to("성별:"),
            label_for(GENDER_OPTIONS, &selections.gender)
        ),
        format!(
            "{} {}",
            key.apply_to("현재 기분/상황:"),
            label_for(MOOD_OPTIONS, &selections.mood)
        ),
    ];
    if let Some(description) = selections.situation_description.as_deref() {
        lines.push(format!(
            "{} {}",
            key.apply_to("음성으로 설명한 상황:"),
            Style::new().italic().apply_to(description)
        ));
    }
    lines.push(format!(
        "{} {}",
        key.apply_to("말씀 이미지 함께 보기:"),
        if selections.generate_image { "예" } else { "아니오" }
    ));
    lines.join("\n")
}

/// Inline message under the voice control.
pub fn voice_error(message: &str) -> String {
    Style::new().red().apply_to(format!("🎤 {message}")).to_string()
}

pub fn result(view: ResultView<'_>, playback: Playback) -> String {
    match view {
        ResultView::Loading => Style::new().dim().apply_to("구절 찾는 중...").to_string(),
        ResultView::Error(message) => Style::new().red().bold().apply_to(message).to_string(),
        ResultView::Suggestion(suggestion) => suggestion_card(suggestion, playback),
        ResultView::Idle(hint) => Style::new().dim().italic().apply_to(hint).to_string(),
    }
}

fn suggestion_card(suggestion: &Suggestion, playback: Playback) -> String {
    let mut out = Vec::new();

    if let Some(url) = suggestion.image_url.as_deref() {
        out.push(
            Style::new()
                .dim()
                .apply_to(format!(
                    "🖼  현대 기독교 스타일의 이미지: {} 말씀 관련 ({} KB)",
                    suggestion.reference,
                    url.len() / 1024
                ))
                .to_string(),
        );
        out.push(String::new());
    }

    out.push(
        Style::new()
            .bold()
            .apply_to(format!("\"{}\"", suggestion.verse_text))
            .to_string(),
    );
    out.push(format!(
        "    {}",
        Style::new().cyan().apply_to(&suggestion.reference)
    ));

    if let Some(application) = suggestion.application_text.as_deref() {
        out.push(String::new());
        out.push(Style::new().cyan().bold().apply_to(REFLECTION_HEADING).to_string());
        out.push(application.to_string());
    }

    match playback {
        Playback::Playing => {
            out.push(String::new());
            out.push(Style::new().green().apply_to("🔊 읽는 중...").to_string());
        }
        Playback::Stopped => {}
        Playback::Unsupported => {
            out.push(String::new());
            out.push(Style::new().dim().apply_to(PLAYBACK_UNSUPPORTED).to_string());
        }
    }

    out.join("\n").trim_end().to_string()
}
