use serde::{Deserialize, Serialize};

/// この値未満のスコアだけが "excellent" 以外の表示クラスになる
pub const EXCELLENT_THRESHOLD: f64 = 90.0;

/// 文字・音素カードの表示クラス
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScoreClass {
    Excellent,
    Good,
    Average,
    NeedsWork,
    Poor,
}

impl ScoreClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Excellent => "excellent",
            Self::Good => "good",
            Self::Average => "average",
            Self::NeedsWork => "needs-work",
            Self::Poor => "poor",
        }
    }
}

/// スコア → 表示クラス（固定しきい値）
pub fn score_class(score: f64) -> ScoreClass {
    if score >= 90.0 {
        ScoreClass::Excellent
    } else if score >= 75.0 {
        ScoreClass::Good
    } else if score >= 60.0 {
        ScoreClass::Average
    } else if score >= 40.0 {
        ScoreClass::NeedsWork
    } else {
        ScoreClass::Poor
    }
}

/// 注釈付き文字の表示クラス。しきい値未満のときだけバケット分けする。
pub fn display_class(score: f64) -> ScoreClass {
    if score < EXCELLENT_THRESHOLD {
        score_class(score)
    } else {
        ScoreClass::Excellent
    }
}

/// 総合スコアに対する評価レベル（フィードバック表示用）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PerformanceLevel {
    Excellent,
    Good,
    Average,
    NeedsWork,
}

impl PerformanceLevel {
    pub fn for_score(score: f64) -> Self {
        if score >= 90.0 {
            Self::Excellent
        } else if score >= 75.0 {
            Self::Good
        } else if score >= 60.0 {
            Self::Average
        } else {
            Self::NeedsWork
        }
    }

    pub fn default_message(&self) -> &'static str {
        match self {
            Self::Excellent => "Excellent pronunciation!",
            Self::Good => "Good job!",
            Self::Average => "Keep practicing!",
            Self::NeedsWork => "Needs improvement.",
        }
    }
}
