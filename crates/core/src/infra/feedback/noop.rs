use async_trait::async_trait;

use super::{FeedbackContext, FeedbackError, FeedbackGenerator};
use crate::domain::score::PerformanceLevel;

/// NoopFeedback: スコア帯ごとの定型文を返す。
/// APIキーが未設定のときのフォールバック。
pub struct NoopFeedback;

#[async_trait]
impl FeedbackGenerator for NoopFeedback {
    async fn generate(&self, ctx: &FeedbackContext) -> Result<String, FeedbackError> {
        Ok(PerformanceLevel::for_score(ctx.overall_accuracy)
            .default_message()
            .to_string())
    }

    fn name(&self) -> &str {
        "noop"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(score: f64) -> FeedbackContext {
        FeedbackContext {
            reference_text: "Red car".into(),
            transcription: "Red car.".into(),
            overall_accuracy: score,
            weak_phonemes: vec![],
        }
    }

    #[tokio::test]
    async fn test_noop_feedback_by_level() {
        assert_eq!(
            NoopFeedback.generate(&ctx(95.0)).await.unwrap(),
            "Excellent pronunciation!"
        );
        assert_eq!(NoopFeedback.generate(&ctx(75.0)).await.unwrap(), "Good job!");
        assert_eq!(
            NoopFeedback.generate(&ctx(12.0)).await.unwrap(),
            "Needs improvement."
        );
    }

    #[test]
    fn test_noop_name() {
        assert_eq!(NoopFeedback.name(), "noop");
    }
}
