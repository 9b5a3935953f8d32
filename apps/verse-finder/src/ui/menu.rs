//! Main menu and option pickers.

use std::fmt;

use anyhow::{Context, Result};
use inquire::{InquireError, Select};

use crate::models::options::SelectOption;
use crate::models::selections::{SelectionChange, Selections};
use crate::ui::render::Playback;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    Job,
    Age,
    Gender,
    Mood,
    Speak,
    ClearSituation,
    ToggleImage,
    FindVerse,
    TogglePlayback,
    Reset,
    Quit,
}

#[derive(Debug, Clone)]
pub struct MenuItem {
    pub label: String,
    pub action: MenuAction,
}

impl fmt::Display for MenuItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label)
    }
}

/// What the menu needs to know beyond the selections.
#[derive(Debug, Clone, Copy)]
pub struct MenuContext {
    pub voice_input_supported: bool,
    pub loading: bool,
    /// `None` when there is no suggestion on screen.
    pub playback: Option<Playback>,
}

pub fn build_menu(selections: &Selections, ctx: MenuContext) -> Vec<MenuItem> {
    let item = |label: &str, action| MenuItem {
        label: label.to_string(),
        action,
    };

    let mut items = vec![item("🔍 말씀 구절 찾기", MenuAction::FindVerse)];

    if let Some(label) = ctx.playback.and_then(Playback::label) {
        items.push(item(label, MenuAction::TogglePlayback));
    }

    items.extend([
        item("직업 선택", MenuAction::Job),
        item("나이 선택", MenuAction::Age),
        item("성별 선택", MenuAction::Gender),
        item("현재 기분/상황 선택", MenuAction::Mood),
    ]);

    if ctx.voice_input_supported && !ctx.loading {
        items.push(item("🎤 내 상황 말하기", MenuAction::Speak));
    }
    let has_spoken_text =
        selections.situation_description.is_some() && !selections.is_listening_placeholder();
    if has_spoken_text {
        items.push(item("입력된 음성 내용 지우기", MenuAction::ClearSituation));
    }

    items.push(item(
        if selections.generate_image {
            "말씀 이미지 함께 보기: 끄기"
        } else {
            "말씀 이미지 함께 보기: 켜기"
        },
        MenuAction::ToggleImage,
    ));
    items.push(item("다시 선택하기", MenuAction::Reset));
    items.push(item("종료", MenuAction::Quit));
    items
}

/// An option as shown in a picker.
#[derive(Debug, Clone)]
pub struct Choice {
    pub option: SelectOption,
}

impl fmt::Display for Choice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.option.label)
    }
}

/// Choices for `options` and the cursor position of `current`.
pub fn choices(options: &[SelectOption], current: &str) -> (Vec<Choice>, usize) {
    let cursor = options
        .iter()
        .position(|o| o.value == current)
        .unwrap_or(0);
    let choices = options.iter().map(|&option| Choice { option }).collect();
    (choices, cursor)
}

/// The edit a picker answer makes, or `None` when the user kept the current
/// value or `field` is not a picker.
pub fn picked_change(field: MenuAction, current: &str, choice: &Choice) -> Option<SelectionChange> {
    let value = choice.option.value;
    if value == current {
        return None;
    }
    let value = value.to_string();
    match field {
        MenuAction::Job => Some(SelectionChange::Job(value)),
        MenuAction::Age => Some(SelectionChange::Age(value)),
        MenuAction::Gender => Some(SelectionChange::Gender(value)),
        MenuAction::Mood => Some(SelectionChange::Mood(value)),
        _ => None,
    }
}

/// Runs an inquire `Select` off the async runtime. Esc and Ctrl+C both
/// yield `None`.
pub async fn select<T>(message: &'static str, items: Vec<T>, cursor: usize) -> Result<Option<T>>
where
    T: fmt::Display + Send + 'static,
{
    let answer = tokio::task::spawn_blocking(move || {
        Select::new(message, items)
            .with_starting_cursor(cursor)
            .with_page_size(12)
            .prompt_skippable()
    })
    .await
    .context("menu prompt task failed")?;

    match answer {
        Ok(choice) => Ok(choice),
        Err(InquireError::OperationInterrupted) => Ok(None),
        Err(e) => Err(e).context("failed to read menu selection"),
    }
}
