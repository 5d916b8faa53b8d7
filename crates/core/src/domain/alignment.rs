use super::grapheme_table::{loose_table_match, table_match};
use super::phoneme::{AnnotatedChar, PhonemeScore};

/// 音素 → 文字アライメント。
///
/// 認識テキストと単語タグ付きの音素スコア一覧から、表示テキストの各文字に
/// どの音素のスコアを付けるかを決める。純粋関数で、共有状態は持たない。
///
/// 単語ごとに候補（`from_word` が一致するスコア）を集め、文字ごとに次の順で
/// 最初に一致したものを採用する:
///
/// 1. 記号が文字と完全一致
/// 2. 記号が対応表のキーを含み、その綴り候補に文字がある
/// 3. 記号と文字の部分一致、または対応表の綴り候補が文字を含む
/// 4. 単語の最初の候補
///
/// 出力する記号は小文字化した正規形で、入力の大文字小文字には依存しない。
///
/// 候補がない単語の文字は既定注釈（記号なし、スコア 100）になる。
/// 同順位の候補が複数あるときは常に入力順で先のものが勝つ。
pub struct AlignmentEngine;

/// 単語内の候補（正規化済みの記号と元のスコア）
struct Candidate<'a> {
    phoneme: String,
    source: &'a PhonemeScore,
}

impl AlignmentEngine {
    /// テキスト全体に注釈を付ける。出力長は常に `text.chars().count()` と等しい。
    pub fn annotate(text: &str, scores: &[PhonemeScore]) -> Vec<AnnotatedChar> {
        let mut out = Vec::with_capacity(text.chars().count());
        if text.is_empty() {
            return out;
        }

        let normalized = normalize(scores);

        let mut words = text.split(' ').peekable();
        while let Some(word) = words.next() {
            let word_lower = word.to_lowercase();
            let candidates: Vec<&Candidate<'_>> = normalized
                .iter()
                .filter(|(from_word, _)| *from_word == word_lower)
                .map(|(_, c)| c)
                .collect();

            if candidates.is_empty() && !word.is_empty() {
                log::trace!("no phoneme data for word {word:?}");
            }

            for ch in word.chars() {
                let annotated = match select(&candidates, ch) {
                    Some(c) => {
                        AnnotatedChar::scored(ch, c.phoneme.as_str(), c.source.accuracy_score)
                    }
                    None => AnnotatedChar::unscored(ch),
                };
                out.push(annotated);
            }

            if words.peek().is_some() {
                out.push(AnnotatedChar::space());
            }
        }

        out
    }

    /// 既定注釈だけの列を返す。表示テキストの切替や解析結果のクリアに使う。
    pub fn reset(text: &str) -> Vec<AnnotatedChar> {
        text.chars()
            .map(|ch| {
                if ch == ' ' {
                    AnnotatedChar::space()
                } else {
                    AnnotatedChar::unscored(ch)
                }
            })
            .collect()
    }
}

/// 記号と単語を小文字化し、照合不能なスコア（記号が空、単語なし）を除外する
fn normalize(scores: &[PhonemeScore]) -> Vec<(String, Candidate<'_>)> {
    scores
        .iter()
        .filter(|s| !s.phoneme.is_empty())
        .filter_map(|s| {
            let from_word = s.from_word.as_deref().filter(|w| !w.is_empty())?;
            Some((
                from_word.to_lowercase(),
                Candidate {
                    phoneme: s.phoneme.to_lowercase(),
                    source: s,
                },
            ))
        })
        .collect()
}

fn select<'c, 'a>(candidates: &[&'c Candidate<'a>], ch: char) -> Option<&'c Candidate<'a>> {
    let first = candidates.first()?;
    let letter: String = ch.to_lowercase().collect();
    let letter = letter.as_str();

    let exact = || candidates.iter().find(|c| c.phoneme == letter);
    let table = || candidates.iter().find(|c| table_match(&c.phoneme, letter));
    let fuzzy = || {
        candidates.iter().find(|c| {
            c.phoneme.contains(letter)
                || letter.contains(c.phoneme.as_str())
                || loose_table_match(&c.phoneme, letter)
        })
    };

    let chosen = exact().or_else(table).or_else(fuzzy).unwrap_or(first);
    Some(*chosen)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::phoneme::{CharKind, DEFAULT_SCORE};

    fn symbols(out: &[AnnotatedChar]) -> Vec<Option<&str>> {
        out.iter().map(|a| a.phoneme()).collect()
    }

    fn red_scores() -> Vec<PhonemeScore> {
        vec![
            PhonemeScore::new("r", "red", 62.0),
            PhonemeScore::new("eh", "red", 88.0),
            PhonemeScore::new("d", "red", 95.0),
        ]
    }

    #[test]
    fn test_empty_text() {
        assert!(AlignmentEngine::annotate("", &red_scores()).is_empty());
        assert!(AlignmentEngine::reset("").is_empty());
    }

    #[test]
    fn test_red_example() {
        let out = AlignmentEngine::annotate("red", &red_scores());
        assert_eq!(symbols(&out), vec![Some("r"), Some("eh"), Some("d")]);
        let scores: Vec<f64> = out.iter().filter_map(|a| a.accuracy_score()).collect();
        assert_eq!(scores, vec![62.0, 88.0, 95.0]);
    }

    #[test]
    fn test_table_tier_maps_digraph_symbol() {
        // "sh" は s/h どちらにも完全一致しないが、s は "s" キー経由で照合される
        let scores = vec![
            PhonemeScore::new("sh", "ship", 70.0),
            PhonemeScore::new("ih", "ship", 80.0),
            PhonemeScore::new("p", "ship", 90.0),
        ];
        let out = AlignmentEngine::annotate("ship", &scores);
        assert_eq!(
            symbols(&out),
            vec![Some("sh"), Some("sh"), Some("ih"), Some("p")]
        );
    }

    #[test]
    fn test_fuzzy_tier_substring() {
        // "h" は対応表に完全一致する綴り候補がないが、"th" の記号に含まれる
        let scores = vec![
            PhonemeScore::new("th", "the", 55.0),
            PhonemeScore::new("ax", "the", 85.0),
        ];
        let out = AlignmentEngine::annotate("the", &scores);
        assert_eq!(symbols(&out), vec![Some("th"), Some("th"), Some("ax")]);
    }

    #[test]
    fn test_word_fallback_uses_first_candidate() {
        let scores = vec![
            PhonemeScore::new("b", "xq", 41.0),
            PhonemeScore::new("m", "xq", 99.0),
        ];
        let out = AlignmentEngine::annotate("xq", &scores);
        assert_eq!(symbols(&out), vec![Some("b"), Some("b")]);
        assert_eq!(out[1].accuracy_score(), Some(41.0));
    }

    #[test]
    fn test_exact_beats_table() {
        // "a" は "ae" のテーブル一致より "a" の完全一致が優先される
        let scores = vec![
            PhonemeScore::new("ae", "a", 30.0),
            PhonemeScore::new("a", "a", 97.0),
        ];
        let out = AlignmentEngine::annotate("a", &scores);
        assert_eq!(out[0].phoneme(), Some("a"));
        assert_eq!(out[0].accuracy_score(), Some(97.0));
    }

    #[test]
    fn test_malformed_candidates_are_excluded() {
        let scores = vec![
            PhonemeScore::new("", "go", 10.0),
            PhonemeScore {
                phoneme: "g".into(),
                from_word: None,
                accuracy_score: 20.0,
            },
            PhonemeScore::new("ow", "go", 77.0),
        ];
        let out = AlignmentEngine::annotate("go", &scores);
        // g は有効な候補 "ow" へのフォールバックになる
        assert_eq!(symbols(&out), vec![Some("ow"), Some("ow")]);
    }

    #[test]
    fn test_emitted_symbol_is_lowercase() {
        let scores = vec![
            PhonemeScore::new("R", "RED", 62.0),
            PhonemeScore::new("EH", "Red", 88.0),
            PhonemeScore::new("D", "red", 95.0),
        ];
        let out = AlignmentEngine::annotate("Red", &scores);
        assert_eq!(symbols(&out), vec![Some("r"), Some("eh"), Some("d")]);
        assert_eq!(out[0].character, 'R');
    }

    #[test]
    fn test_scores_pass_through_unclamped() {
        let scores = vec![PhonemeScore::new("k", "k", 250.0)];
        let out = AlignmentEngine::annotate("k", &scores);
        assert_eq!(out[0].accuracy_score(), Some(250.0));
    }

    #[test]
    fn test_consecutive_spaces() {
        let out = AlignmentEngine::annotate("a  b", &[]);
        assert_eq!(out.len(), 4);
        assert!(out[1].is_space());
        assert!(out[2].is_space());
        assert!(!out[3].is_space());
    }

    #[test]
    fn test_reset_is_all_default() {
        let out = AlignmentEngine::reset("Hi there");
        assert_eq!(out.len(), 8);
        for a in &out {
            match &a.kind {
                CharKind::Space => assert_eq!(a.character, ' '),
                CharKind::Letter {
                    phoneme,
                    accuracy_score,
                } => {
                    assert!(phoneme.is_empty());
                    assert_eq!(*accuracy_score, DEFAULT_SCORE);
                }
            }
        }
    }

    #[test]
    fn test_reset_matches_annotate_without_scores() {
        let text = "Sun  and cat ";
        assert_eq!(
            AlignmentEngine::reset(text),
            AlignmentEngine::annotate(text, &[])
        );
    }
}
