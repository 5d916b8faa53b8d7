pub mod azure;
mod noop;

pub use azure::{AzureAssessor, AzureConfig};
pub use noop::NoopAssessor;

use async_trait::async_trait;

use crate::domain::assessment::AssessmentResult;
use crate::infra::audio::AudioClip;

/// 参照テキストが空のときに使う既定文
pub const DEFAULT_REFERENCE_TEXT: &str = "This is a test.";

/// 発音評価エラー
#[derive(Debug, thiserror::Error)]
pub enum AssessmentError {
    #[error("Audio format error: {0}")]
    AudioFormat(String),
    #[error("Assessment service not configured: {0}")]
    NotConfigured(String),
    #[error("Assessment request failed: {0}")]
    Request(String),
    #[error("Assessment service error: {status} - {body}")]
    Service { status: u16, body: String },
    #[error("Recognition failed: {0}")]
    Recognition(String),
    #[error("No speech recognized")]
    NoSpeech,
    #[error("Response parse error: {0}")]
    Parse(String),
    #[error("Assessment timeout")]
    Timeout,
}

/// 発音評価リクエスト
#[derive(Debug, Clone)]
pub struct AssessmentRequest {
    pub audio: AudioClip,
    /// 読み上げるべき文
    pub reference_text: String,
    /// 言語 (例: "en-US")
    pub language: String,
}

impl AssessmentRequest {
    pub fn new(audio: AudioClip, reference_text: &str, language: &str) -> Self {
        let reference_text = match reference_text.trim() {
            "" => DEFAULT_REFERENCE_TEXT.to_string(),
            text => text.to_string(),
        };
        Self {
            audio,
            reference_text,
            language: language.to_string(),
        }
    }
}

/// 発音評価サービスの trait（クラウドAPIやスタブが実装する）
#[async_trait]
pub trait PronunciationAssessor: Send + Sync {
    async fn assess(
        &self,
        request: &AssessmentRequest,
    ) -> Result<AssessmentResult, AssessmentError>;

    fn name(&self) -> &str;
}
