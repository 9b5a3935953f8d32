use thiserror::Error;

/// Failures that abort a suggestion request.
///
/// `Display` is the log form; `user_message()` is what the result area shows.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AppError {
    #[error("API key is not configured")]
    MissingApiKey,

    #[error("API key rejected by the AI service")]
    InvalidApiKey,

    #[error("Rate limited or quota exhausted")]
    RateLimited,

    #[error("Model failed to produce JSON output")]
    GenerationFormat,

    #[error("Malformed AI response: {0}")]
    MalformedResponse(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("A suggestion request is already in flight")]
    Busy,

    #[error("Request cancelled by user")]
    Cancelled,
}

impl AppError {
    pub fn user_message(&self) -> String {
        match self {
            AppError::MissingApiKey => {
                "API 키가 설정되지 않았습니다. .env 파일에 GEMINI_API_KEY를 확인해주세요.".to_string()
            }
            AppError::InvalidApiKey => {
                "제공된 API 키가 유효하지 않습니다. 설정을 확인해주세요.".to_string()
            }
            AppError::RateLimited => {
                "API 사용량 한도에 도달했거나 요청 빈도가 너무 높습니다. 잠시 후 다시 시도해주세요."
                    .to_string()
            }
            AppError::GenerationFormat => {
                "모델이 JSON 형식을 생성하는 데 어려움을 겪고 있습니다. 다시 시도해주세요."
                    .to_string()
            }
            AppError::MalformedResponse(detail) | AppError::RequestFailed(detail) => {
                format!("성경 구절 및 적용 내용을 가져오는데 실패했습니다. (오류: {detail})")
            }
            AppError::Busy => "이미 구절을 찾고 있습니다. 잠시만 기다려주세요.".to_string(),
            AppError::Cancelled => "구절 찾기를 취소했습니다.".to_string(),
        }
    }
}
