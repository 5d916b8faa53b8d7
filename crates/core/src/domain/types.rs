use serde::{Deserialize, Serialize};

use super::assessment::{AssessedWord, OverallScores};
use super::phoneme::{AnnotatedChar, PhonemeScore, WordPhonemes};
use super::score::PerformanceLevel;

/// 練習1回分の保存レコード
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PracticeAttempt {
    pub attempt_id: String,
    pub reference_text: String,
    pub transcription: String,
    pub scores: OverallScores,
    pub feedback: Option<String>,
    pub created_at: String,
    /// 保存順（評価サービスが返した順）の音素スコア
    pub phonemes: Vec<PhonemeScore>,
}

/// 練習サマリー（履歴一覧用）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttemptSummary {
    pub attempt_id: String,
    pub reference_text: String,
    pub transcription: String,
    pub accuracy: f64,
    pub pronunciation: f64,
    pub created_at: String,
    pub phoneme_count: u32,
}

/// 履歴ページ（カーソルベースページネーション）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryPage {
    pub items: Vec<AttemptSummary>,
    pub next_cursor: Option<String>,
}

/// 音素ごとの上達状況（進捗チャート用）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhonemeProgress {
    pub phoneme: String,
    pub average: f64,
    pub best: f64,
    pub worst: f64,
    pub count: u32,
}

/// 解析1回分の結果（描画層へ返す）
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub attempt_id: String,
    pub reference_text: String,
    pub transcription: String,
    pub scores: OverallScores,
    pub phonemes: Vec<PhonemeScore>,
    /// 認識テキストの文字ごとの注釈
    pub annotation: Vec<AnnotatedChar>,
    pub words: Vec<WordPhonemes>,
    /// 単語ごとの評価（誤りの種類を含む）
    pub assessed_words: Vec<AssessedWord>,
    pub performance: PerformanceLevel,
    pub feedback: Option<String>,
    pub created_at: String,
}
