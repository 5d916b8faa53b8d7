use serde::{Deserialize, Serialize};

use super::score::{display_class, ScoreClass};

/// スコア不明の文字に付与する既定スコア
pub const DEFAULT_SCORE: f64 = 100.0;

fn default_score() -> f64 {
    DEFAULT_SCORE
}

// ─── PhonemeScore ────────────────────────────────────────────────

/// 評価サービスが返す音素ごとの正確さスコア。
///
/// `from_word` は所属する単語。欠落していればどの単語の候補にもならない。
/// スコアは検証せずにそのまま運ぶ（0–100 の範囲外もありうる）。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhonemeScore {
    #[serde(default)]
    pub phoneme: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_word: Option<String>,
    #[serde(default = "default_score")]
    pub accuracy_score: f64,
}

impl PhonemeScore {
    pub fn new(phoneme: impl Into<String>, from_word: impl Into<String>, accuracy_score: f64) -> Self {
        Self {
            phoneme: phoneme.into(),
            from_word: Some(from_word.into()),
            accuracy_score,
        }
    }
}

// ─── AnnotatedChar ───────────────────────────────────────────────

/// 表示テキスト1文字分の注釈。描画層へ渡す唯一の契約。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotatedChar {
    pub character: char,
    #[serde(flatten)]
    pub kind: CharKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CharKind {
    /// 単語区切りの空白。記号もスコアも持たない。
    Space,
    /// 文字。`phoneme` が空ならスコア不明（既定スコア）。
    Letter {
        phoneme: String,
        #[serde(rename = "accuracyScore")]
        accuracy_score: f64,
    },
}

impl AnnotatedChar {
    pub fn space() -> Self {
        Self {
            character: ' ',
            kind: CharKind::Space,
        }
    }

    /// 音素の割り当てがない文字
    pub fn unscored(character: char) -> Self {
        Self {
            character,
            kind: CharKind::Letter {
                phoneme: String::new(),
                accuracy_score: DEFAULT_SCORE,
            },
        }
    }

    /// 音素記号とスコアを割り当てた文字。記号は呼び出し側で正規化済みのもの。
    pub fn scored(character: char, phoneme: impl Into<String>, accuracy_score: f64) -> Self {
        Self {
            character,
            kind: CharKind::Letter {
                phoneme: phoneme.into(),
                accuracy_score,
            },
        }
    }

    pub fn is_space(&self) -> bool {
        matches!(self.kind, CharKind::Space)
    }

    /// 割り当てられた音素記号。空白・未割り当てなら None。
    pub fn phoneme(&self) -> Option<&str> {
        match &self.kind {
            CharKind::Letter { phoneme, .. } if !phoneme.is_empty() => Some(phoneme),
            _ => None,
        }
    }

    pub fn accuracy_score(&self) -> Option<f64> {
        match &self.kind {
            CharKind::Space => None,
            CharKind::Letter { accuracy_score, .. } => Some(*accuracy_score),
        }
    }

    pub fn display_class(&self) -> Option<ScoreClass> {
        self.accuracy_score().map(display_class)
    }
}

// ─── 単語ごとのグルーピング ──────────────────────────────────────

/// 単語単位にまとめた音素スコア（音素グリッド表示用）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordPhonemes {
    pub word: String,
    pub phonemes: Vec<PhonemeScore>,
}

/// 初出順に単語ごとにまとめる。単語を持たないスコアは捨てる。
pub fn group_by_word(scores: &[PhonemeScore]) -> Vec<WordPhonemes> {
    let mut groups: Vec<WordPhonemes> = Vec::new();

    for score in scores {
        let Some(word) = score.from_word.as_deref().filter(|w| !w.is_empty()) else {
            continue;
        };
        match groups.iter_mut().find(|g| g.word == word) {
            Some(group) => group.phonemes.push(score.clone()),
            None => groups.push(WordPhonemes {
                word: word.to_string(),
                phonemes: vec![score.clone()],
            }),
        }
    }

    groups
}

/// しきい値未満のスコアをスコア昇順で返す（同点は入力順）
pub fn weak_phonemes(scores: &[PhonemeScore], threshold: f64) -> Vec<PhonemeScore> {
    let mut weak: Vec<PhonemeScore> = scores
        .iter()
        .filter(|s| !s.phoneme.is_empty() && s.accuracy_score < threshold)
        .cloned()
        .collect();
    weak.sort_by(|a, b| a.accuracy_score.total_cmp(&b.accuracy_score));
    weak
}
