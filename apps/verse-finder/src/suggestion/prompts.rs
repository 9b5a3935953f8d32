// Prompt templates for verse suggestion and the companion illustration.
// Placeholders are `{name}` and are filled with `str::replace` before sending.

use crate::llm_client::prompts::{BIBLE_TRANSLATION, JSON_ONLY_INSTRUCTION};
use crate::models::selections::{Selections, SituationSource};
use crate::models::suggestion::Suggestion;

/// Verse prompt. Replace: {translation}, {json_only}, {analysis_focus},
/// {job}, {age}, {gender}, {situation_context}
pub const VERSE_PROMPT_TEMPLATE: &str = r#"당신은 사용자의 다양한 삶의 맥락(직업, 나이, 성별)과 현재 감정 상태 및 구체적인 상황 설명을 깊이 이해하고, 이에 가장 적합한 맞춤형 성경 구절을 '{translation}' 성경에서 추천하며, 해당 구절을 사용자의 상황에 맞게 적용할 수 있는 따뜻한 조언을 제공하는 지혜로운 조언자입니다.

**매우 중요**: 사용자가 제공한 모든 정보(직업, 나이, 성별, 그리고 {analysis_focus})를 종합적으로 분석하여 구절을 추천하고, 그 구절에 대한 적용 내용을 작성해야 합니다.
특히, 동일한 {analysis_focus}이라도 사용자의 직업, 나이, 성별에 따라 그 경험의 의미와 필요한 위로/지혜가 다를 수 있음을 반드시 고려하여, 각 개인의 독특한 상황에 맞는 구절을 선택하고, 그에 대한 적용 내용을 개인화해주세요.

{json_only}
{
  "verseText": "여기에 성경 구절 내용을 한국어로 넣어주세요.",
  "reference": "여기에 성경책 이름, 장, 절을 정확히 넣어주세요. (예: 요한복음 3:16)",
  "applicationText": "여기에 추천된 성경 구절을 사용자의 구체적인 상황(직업, 나이, 성별, 현재 기분/상황)에 어떻게 적용할 수 있을지에 대한 1-2 문장의 따뜻하고 격려하는 조언을 한국어로 작성해주세요."
}

사용자 정보:
- 직업: {job}
- 나이대: {age}
- 성별: {gender}
- {situation_context}

위 사용자 정보를 면밀히 분석하고, 이 모든 요소가 복합적으로 어우러졌을 때 사용자에게 가장 큰 위로, 힘, 또는 지혜를 줄 수 있는 '{translation}' 성경 구절 하나를 찾아주세요.
추천하는 구절은 너무 길지 않으면서도 핵심적인 메시지를 명확히 전달해야 합니다.
'applicationText'는 구절의 메시지가 사용자의 특정 상황에 어떻게 연결될 수 있는지, 실제적인 도움이나 관점 변화를 줄 수 있는 내용으로 작성해주세요.
만약 사용자가 음성으로 "상세 상황"을 제공했다면, 그 내용을 가장 중요한 단서로 활용하되, 다른 인구학적 정보(직업, 나이, 성별)와 결합하여 그 상황에 가장 부합하는 구절과 적용 내용을 찾아야 합니다.
만약 음성 입력 없이 "기분/일반적 상황"만 선택되었다면, 해당 기분과 함께 직업, 나이, 성별 정보를 종합적으로 고려하여 가장 적절한 구절과 적용 내용을 추천해주세요."#;

/// Illustration prompt. Replace: {verse_text}, {reference}, {application_text}
pub const IMAGE_PROMPT_TEMPLATE: &str = r#"성경 구절 "{verse_text} ({reference})"과 그 적용 내용 "{application_text}"에 영감을 받은 이미지를 생성해주세요. 스타일은 현대적이고 세련된 기독교 예술 느낌으로, 희망과 평화, 영감을 주는 분위기여야 합니다. 이미지 자체에는 어떤 글자도 포함하지 마세요. 밝고 긍정적인 색감을 사용하고, 디지털 아트 또는 일러스트레이션 스타일이 좋습니다."#;

pub fn build_verse_prompt(selections: &Selections) -> String {
    let (situation_context, analysis_focus) = match selections.situation() {
        SituationSource::Described(text) => (
            format!("사용자가 음성으로 직접 설명한 현재 상황: \"{text}\""),
            "사용자가 직접 설명한 상세 상황",
        ),
        SituationSource::Mood(mood) => (
            format!("사용자가 선택한 현재 기분/일반적 상황: {mood}"),
            "사용자가 선택한 기분/일반적 상황",
        ),
    };

    VERSE_PROMPT_TEMPLATE
        .replace("{translation}", BIBLE_TRANSLATION)
        .replace("{json_only}", JSON_ONLY_INSTRUCTION)
        .replace("{analysis_focus}", analysis_focus)
        .replace("{job}", &selections.job)
        .replace("{age}", &selections.age)
        .replace("{gender}", &selections.gender)
        .replace("{situation_context}", &situation_context)
}

pub fn build_image_prompt(suggestion: &Suggestion) -> String {
    IMAGE_PROMPT_TEMPLATE
        .replace("{verse_text}", &suggestion.verse_text)
        .replace("{reference}", &suggestion.reference)
        .replace(
            "{application_text}",
            suggestion.application_text.as_deref().unwrap_or_default(),
        )
}
