// Shared prompt fragments. Each feature keeps its own prompts.rs alongside it;
// this file only holds pieces reused across prompts.

/// Appended to every prompt that expects a bare JSON object back.
pub const JSON_ONLY_INSTRUCTION: &str =
    "응답은 반드시 다음 JSON 형식이어야 합니다. 다른 설명이나 추가 텍스트 없이 JSON 객체만 반환해주세요:";

/// Translation every recommended verse must come from.
pub const BIBLE_TRANSLATION: &str = "개역개정";
