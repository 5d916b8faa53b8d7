pub mod claude;
mod noop;
pub mod prompts;

pub use claude::ClaudeFeedback;
pub use noop::NoopFeedback;

use async_trait::async_trait;

use crate::domain::phoneme::PhonemeScore;

/// フィードバック生成エラー
#[derive(Debug, thiserror::Error)]
pub enum FeedbackError {
    #[error("Feedback generator not available: {0}")]
    NotAvailable(String),
    #[error("Feedback generation failed: {0}")]
    Failed(String),
    #[error("Feedback generation timeout")]
    Timeout,
}

/// フィードバック生成に渡す練習結果の要約
#[derive(Debug, Clone)]
pub struct FeedbackContext {
    pub reference_text: String,
    pub transcription: String,
    pub overall_accuracy: f64,
    /// スコアの低い順に並んだ音素
    pub weak_phonemes: Vec<PhonemeScore>,
}

/// 練習者向けの講評を生成する（外部LLMなどが実装する）
#[async_trait]
pub trait FeedbackGenerator: Send + Sync {
    async fn generate(&self, ctx: &FeedbackContext) -> Result<String, FeedbackError>;

    fn name(&self) -> &str;
}
