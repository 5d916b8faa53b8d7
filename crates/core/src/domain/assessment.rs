use serde::{Deserialize, Serialize};

use super::phoneme::{PhonemeScore, DEFAULT_SCORE};

// ─── 評価サービスのレスポンス（ワイヤ形式） ─────────────────────

/// 発音評価サービスの詳細レスポンス。
/// フィールド名は PascalCase。スコアは入れ子 (`PronunciationAssessment`) と
/// フラットの両方の形がありうるので、どちらも受け付ける。
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AssessmentResponse {
    #[serde(default)]
    pub recognition_status: String,
    #[serde(default)]
    pub display_text: String,
    #[serde(default, rename = "NBest")]
    pub n_best: Vec<NBestEntry>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct NBestEntry {
    #[serde(default)]
    pub display: String,
    pub accuracy_score: Option<f64>,
    pub fluency_score: Option<f64>,
    pub completeness_score: Option<f64>,
    pub pron_score: Option<f64>,
    pub pronunciation_assessment: Option<OverallAssessment>,
    #[serde(default)]
    pub words: Vec<AssessedWord>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct OverallAssessment {
    pub accuracy_score: Option<f64>,
    pub fluency_score: Option<f64>,
    pub completeness_score: Option<f64>,
    pub prosody_score: Option<f64>,
    pub pron_score: Option<f64>,
}

/// 単語単位の評価結果。音素の内訳は任意。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AssessedWord {
    #[serde(default)]
    pub word: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accuracy_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pronunciation_assessment: Option<UnitAssessment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phonemes: Option<Vec<AssessedPhoneme>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AssessedPhoneme {
    #[serde(default)]
    pub phoneme: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accuracy_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pronunciation_assessment: Option<UnitAssessment>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct UnitAssessment {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accuracy_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_type: Option<String>,
}

impl AssessedWord {
    /// 入れ子のスコアを優先する
    pub fn accuracy(&self) -> Option<f64> {
        self.pronunciation_assessment
            .as_ref()
            .and_then(|a| a.accuracy_score)
            .or(self.accuracy_score)
    }

    pub fn error_kind(&self) -> Option<&str> {
        self.pronunciation_assessment
            .as_ref()
            .and_then(|a| a.error_type.as_deref())
            .or(self.error_type.as_deref())
    }
}

impl AssessedPhoneme {
    pub fn accuracy(&self) -> Option<f64> {
        self.pronunciation_assessment
            .as_ref()
            .and_then(|a| a.accuracy_score)
            .or(self.accuracy_score)
    }
}

// ─── 整形済みの評価結果 ──────────────────────────────────────────

/// 発話全体のスコア
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct OverallScores {
    pub accuracy: f64,
    pub fluency: f64,
    pub completeness: f64,
    pub prosody: f64,
    pub pronunciation: f64,
}

/// 評価サービス呼び出しの結果（最上位候補を整形したもの）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentResult {
    pub transcription: String,
    pub scores: OverallScores,
    pub words: Vec<AssessedWord>,
}

impl AssessmentResult {
    /// レスポンスの最上位候補から結果を組み立てる。候補がなければ None。
    pub fn from_response(response: AssessmentResponse) -> Option<Self> {
        let AssessmentResponse {
            display_text,
            n_best,
            ..
        } = response;
        let best = n_best.into_iter().next()?;

        let nested = best.pronunciation_assessment.clone().unwrap_or_default();
        let scores = OverallScores {
            accuracy: nested.accuracy_score.or(best.accuracy_score).unwrap_or(0.0),
            fluency: nested.fluency_score.or(best.fluency_score).unwrap_or(0.0),
            completeness: nested
                .completeness_score
                .or(best.completeness_score)
                .unwrap_or(0.0),
            prosody: nested.prosody_score.unwrap_or(0.0),
            pronunciation: nested.pron_score.or(best.pron_score).unwrap_or(0.0),
        };

        let transcription = if display_text.trim().is_empty() {
            best.display.trim().to_string()
        } else {
            display_text.trim().to_string()
        };

        Some(Self {
            transcription,
            scores,
            words: best.words,
        })
    }

    pub fn phoneme_scores(&self) -> Vec<PhonemeScore> {
        flatten_phonemes(&self.words)
    }
}

/// 単語 → 音素の入れ子構造を、単語タグ付きのフラットな一覧へ変換する。
/// 音素を持たない単語は何も出力しない。スコア欠落は既定スコアで埋める。
pub fn flatten_phonemes(words: &[AssessedWord]) -> Vec<PhonemeScore> {
    words
        .iter()
        .flat_map(|word| {
            word.phonemes
                .iter()
                .flatten()
                .map(move |p| PhonemeScore {
                    phoneme: p.phoneme.clone(),
                    from_word: if word.word.is_empty() {
                        None
                    } else {
                        Some(word.word.clone())
                    },
                    accuracy_score: p.accuracy().unwrap_or(DEFAULT_SCORE),
                })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const NESTED_RESPONSE: &str = r#"{
        "RecognitionStatus": "Success",
        "DisplayText": "Red. ",
        "NBest": [{
            "Display": "Red.",
            "PronunciationAssessment": {
                "AccuracyScore": 81.0,
                "FluencyScore": 90.0,
                "CompletenessScore": 100.0,
                "ProsodyScore": 70.5,
                "PronScore": 84.2
            },
            "Words": [{
                "Word": "red",
                "Offset": 500000,
                "Duration": 3000000,
                "PronunciationAssessment": { "AccuracyScore": 81.0, "ErrorType": "None" },
                "Phonemes": [
                    { "Phoneme": "r", "PronunciationAssessment": { "AccuracyScore": 62.0 } },
                    { "Phoneme": "eh", "PronunciationAssessment": { "AccuracyScore": 88.0 } },
                    { "Phoneme": "d", "PronunciationAssessment": { "AccuracyScore": 95.0 } }
                ]
            }]
        }]
    }"#;

    const FLAT_RESPONSE: &str = r#"{
        "RecognitionStatus": "Success",
        "NBest": [{
            "Display": "Sun cat.",
            "AccuracyScore": 70.0,
            "FluencyScore": 60.0,
            "CompletenessScore": 50.0,
            "PronScore": 65.0,
            "Words": [
                { "Word": "sun", "AccuracyScore": 70.0, "ErrorType": "Mispronunciation",
                  "Phonemes": [ { "Phoneme": "s", "AccuracyScore": 40.0 }, { "Phoneme": "ah" }, { "Phoneme": "n", "AccuracyScore": 90.0 } ] },
                { "Word": "cat", "AccuracyScore": 30.0, "ErrorType": "Omission" }
            ]
        }]
    }"#;

    #[test]
    fn test_nested_scores() {
        let response: AssessmentResponse = serde_json::from_str(NESTED_RESPONSE).unwrap();
        let result = AssessmentResult::from_response(response).unwrap();
        assert_eq!(result.transcription, "Red.");
        assert_eq!(result.scores.accuracy, 81.0);
        assert_eq!(result.scores.prosody, 70.5);
        assert_eq!(result.scores.pronunciation, 84.2);
        assert_eq!(result.words[0].accuracy(), Some(81.0));
        assert_eq!(result.words[0].error_kind(), Some("None"));

        let flat = result.phoneme_scores();
        assert_eq!(flat.len(), 3);
        assert_eq!(flat[1], PhonemeScore::new("eh", "red", 88.0));
    }

    #[test]
    fn test_flat_scores_and_missing_phonemes() {
        let response: AssessmentResponse = serde_json::from_str(FLAT_RESPONSE).unwrap();
        let result = AssessmentResult::from_response(response).unwrap();
        // DisplayText がないので NBest の Display を使う
        assert_eq!(result.transcription, "Sun cat.");
        assert_eq!(result.scores.completeness, 50.0);
        assert_eq!(result.scores.prosody, 0.0);
        assert_eq!(result.words[1].error_kind(), Some("Omission"));

        let flat = result.phoneme_scores();
        // "cat" は音素の内訳を持たない
        assert_eq!(flat.len(), 3);
        assert!(flat.iter().all(|p| p.from_word.as_deref() == Some("sun")));
        assert_eq!(flat[1].accuracy_score, DEFAULT_SCORE);
    }

    #[test]
    fn test_no_candidates() {
        let response: AssessmentResponse =
            serde_json::from_str(r#"{"RecognitionStatus":"NoMatch"}"#).unwrap();
        assert!(AssessmentResult::from_response(response).is_none());
    }

    #[test]
    fn test_flatten_word_without_text() {
        let words = vec![AssessedWord {
            word: String::new(),
            offset: None,
            duration: None,
            accuracy_score: None,
            error_type: None,
            pronunciation_assessment: None,
            phonemes: Some(vec![AssessedPhoneme {
                phoneme: "k".into(),
                offset: None,
                duration: None,
                accuracy_score: Some(12.0),
                pronunciation_assessment: None,
            }]),
        }];
        let flat = flatten_phonemes(&words);
        assert_eq!(flat.len(), 1);
        assert!(flat[0].from_word.is_none());
        assert_eq!(flat[0].accuracy_score, 12.0);
    }
}
