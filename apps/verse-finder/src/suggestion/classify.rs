//! Maps AI client failures onto the user-facing error taxonomy.
//!
//! Structured data (HTTP status, canonical status, `details[].reason`) is
//! checked first. Message substrings are only consulted when none of it
//! matches.

use crate::errors::AppError;
use crate::llm_client::LlmError;

const INVALID_KEY_REASONS: &[&str] = &["API_KEY_INVALID", "API_KEY_SERVICE_BLOCKED"];
const INVALID_KEY_PHRASES: &[&str] = &["api key not valid", "invalid api key"];
const RATE_LIMIT_PHRASES: &[&str] = &["quota", "rate limit"];
const JSON_MODE_PHRASES: &[&str] = &["responsemimetype: application/json"];

pub fn classify_llm_error(error: LlmError) -> AppError {
    match error {
        LlmError::MissingApiKey => AppError::MissingApiKey,
        LlmError::Parse(e) => AppError::MalformedResponse(format!("JSON 파싱 실패: {e}")),
        LlmError::EmptyContent => {
            AppError::MalformedResponse("API 응답이 비어 있습니다.".to_string())
        }
        LlmError::Api {
            status,
            code,
            reasons,
            message,
        } => classify_structured(status, code.as_deref(), &reasons)
            .unwrap_or_else(|| classify_message(&message)),
        LlmError::Http(e) => classify_message(&e.to_string()),
    }
}

fn classify_structured(status: u16, code: Option<&str>, reasons: &[String]) -> Option<AppError> {
    if reasons
        .iter()
        .any(|r| INVALID_KEY_REASONS.contains(&r.as_str()))
    {
        return Some(AppError::InvalidApiKey);
    }
    match (status, code) {
        (401 | 403, _) | (_, Some("UNAUTHENTICATED" | "PERMISSION_DENIED")) => {
            Some(AppError::InvalidApiKey)
        }
        (429, _) | (_, Some("RESOURCE_EXHAUSTED")) => Some(AppError::RateLimited),
        _ => None,
    }
}

/// Last-resort classification on the lower-cased message, in priority order.
fn classify_message(message: &str) -> AppError {
    let lower = message.to_lowercase();
    let mentions = |phrases: &[&str]| phrases.iter().any(|p| lower.contains(p));

    if mentions(INVALID_KEY_PHRASES) {
        AppError::InvalidApiKey
    } else if mentions(RATE_LIMIT_PHRASES) {
        AppError::RateLimited
    } else if mentions(JSON_MODE_PHRASES) {
        AppError::GenerationFormat
    } else {
        AppError::RequestFailed(message.to_string())
    }
}
