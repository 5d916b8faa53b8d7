use serde::Serialize;

use crate::infra::assessment::AssessmentError;
use crate::infra::feedback::FeedbackError;

/// アプリケーション共通エラーコード
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorCode {
    #[serde(rename = "E_INVALID_INPUT")]
    InvalidInput,
    #[serde(rename = "E_ASSESSMENT")]
    Assessment,
    #[serde(rename = "E_NO_SPEECH")]
    NoSpeech,
    #[serde(rename = "E_FEEDBACK")]
    Feedback,
    #[serde(rename = "E_TIMEOUT")]
    Timeout,
    #[serde(rename = "E_STORAGE")]
    Storage,
    #[serde(rename = "E_NOT_CONFIGURED")]
    NotConfigured,
    #[serde(rename = "E_INTERNAL")]
    Internal,
}

impl ErrorCode {
    /// シリアライズ時と同じ文字列（メトリクスのキーに使う）
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidInput => "E_INVALID_INPUT",
            Self::Assessment => "E_ASSESSMENT",
            Self::NoSpeech => "E_NO_SPEECH",
            Self::Feedback => "E_FEEDBACK",
            Self::Timeout => "E_TIMEOUT",
            Self::Storage => "E_STORAGE",
            Self::NotConfigured => "E_NOT_CONFIGURED",
            Self::Internal => "E_INTERNAL",
        }
    }
}

/// アプリケーションエラー（呼び出し元へそのまま返すペイロード兼用）
#[derive(Debug, Clone, Serialize)]
pub struct AppError {
    pub code: ErrorCode,
    pub message: String,
    pub recoverable: bool,
}

impl AppError {
    fn new(code: ErrorCode, msg: impl Into<String>, recoverable: bool) -> Self {
        Self {
            code,
            message: msg.into(),
            recoverable,
        }
    }

    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidInput, msg, true)
    }

    pub fn assessment(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::Assessment, msg, true)
    }

    pub fn no_speech(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::NoSpeech, msg, true)
    }

    pub fn feedback(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::Feedback, msg, true)
    }

    pub fn timeout(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::Timeout, msg, true)
    }

    pub fn not_configured(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotConfigured, msg, false)
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::Internal, msg, false)
    }

    pub fn storage(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::Storage, msg, false)
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for AppError {}

impl From<AssessmentError> for AppError {
    fn from(err: AssessmentError) -> Self {
        let msg = err.to_string();
        match err {
            AssessmentError::AudioFormat(_) => Self::invalid_input(msg),
            AssessmentError::NotConfigured(_) => Self::not_configured(msg),
            AssessmentError::NoSpeech => Self::no_speech(msg),
            AssessmentError::Timeout => Self::timeout(msg),
            AssessmentError::Request(_)
            | AssessmentError::Service { .. }
            | AssessmentError::Recognition(_)
            | AssessmentError::Parse(_) => Self::assessment(msg),
        }
    }
}

impl From<FeedbackError> for AppError {
    fn from(err: FeedbackError) -> Self {
        let msg = err.to_string();
        match err {
            FeedbackError::NotAvailable(_) => Self::not_configured(msg),
            FeedbackError::Timeout => Self::timeout(msg),
            FeedbackError::Failed(_) => Self::feedback(msg),
        }
    }
}
