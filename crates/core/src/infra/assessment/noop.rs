use async_trait::async_trait;

use super::{AssessmentError, AssessmentRequest, PronunciationAssessor};
use crate::domain::assessment::{AssessedWord, AssessmentResult, OverallScores};

/// NoopAssessor: 参照テキストをそのまま書き起こし結果として返すスタブ。
/// 音素の内訳は返さないので、注釈はすべて既定値になる。
pub struct NoopAssessor;

#[async_trait]
impl PronunciationAssessor for NoopAssessor {
    async fn assess(
        &self,
        request: &AssessmentRequest,
    ) -> Result<AssessmentResult, AssessmentError> {
        let words = request
            .reference_text
            .split_whitespace()
            .map(|w| AssessedWord {
                word: w
                    .trim_matches(|c: char| !c.is_alphanumeric() && c != '\'')
                    .to_lowercase(),
                offset: None,
                duration: None,
                accuracy_score: Some(100.0),
                error_type: Some("None".to_string()),
                pronunciation_assessment: None,
                phonemes: None,
            })
            .collect();

        Ok(AssessmentResult {
            transcription: request.reference_text.clone(),
            scores: OverallScores {
                accuracy: 100.0,
                fluency: 100.0,
                completeness: 100.0,
                prosody: 100.0,
                pronunciation: 100.0,
            },
            words,
        })
    }

    fn name(&self) -> &str {
        "noop"
    }
}
