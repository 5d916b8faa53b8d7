//! 発音練習フィードバック用プロンプトテンプレート

use crate::domain::phoneme::PhonemeScore;
use crate::domain::phoneme_info::{has_specific_info, phoneme_info};

/// 言語聴覚士として短い講評を書かせる
pub const SYSTEM_SPEECH_COACH: &str = "\
You are a friendly speech therapist helping a learner practice English pronunciation.
Write short feedback (at most four sentences) for the practice attempt below:
- Start with one sentence of encouragement that matches the overall score
- Name at most two sounds to focus on, taken from the weak sounds list
- Give one concrete mouth or tongue position tip for each sound you name
- Use plain language, no phonetic jargon, no markdown";

/// プロンプトに載せる弱い音素の最大数
pub const MAX_LISTED_PHONEMES: usize = 8;

/// 練習結果を説明するユーザープロンプトを構築する
pub fn build_prompt(
    reference_text: &str,
    transcription: &str,
    overall_accuracy: f64,
    weak_phonemes: &[PhonemeScore],
) -> String {
    let mut user_msg = String::new();

    user_msg.push_str("[Target sentence]\n");
    user_msg.push_str(reference_text);
    user_msg.push_str("\n\n[What was recognized]\n");
    user_msg.push_str(transcription);
    user_msg.push_str(&format!("\n\n[Overall accuracy]\n{overall_accuracy:.0}/100\n"));

    if weak_phonemes.is_empty() {
        user_msg.push_str("\n[Weak sounds]\nnone\n");
        return user_msg;
    }

    user_msg.push_str("\n[Weak sounds]\n");
    for p in weak_phonemes.iter().take(MAX_LISTED_PHONEMES) {
        let word = p.from_word.as_deref().unwrap_or("?");
        user_msg.push_str(&format!(
            "- /{}/ in \"{}\": {:.0}/100",
            p.phoneme, word, p.accuracy_score
        ));
        if has_specific_info(&p.phoneme) {
            user_msg.push_str(&format!(" (hint: {})", phoneme_info(&p.phoneme).pronunciation));
        }
        user_msg.push('\n');
    }

    user_msg
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_prompt_no_weak_phonemes() {
        let user = build_prompt("Red car", "Red car.", 96.4, &[]);
        assert!(user.contains("Red car"));
        assert!(user.contains("96/100"));
        assert!(user.contains("[Weak sounds]\nnone"));
    }

    #[test]
    fn test_build_prompt_lists_weak_phonemes() {
        let weak = vec![
            PhonemeScore::new("r", "red", 42.0),
            PhonemeScore::new("aa", "car", 70.0),
        ];
        let user = build_prompt("Red car", "Wed car", 61.0, &weak);
        assert!(user.contains("- /r/ in \"red\": 42/100 (hint: Curl your tongue"));
        // 個別ガイドのない記号にはヒントを付けない
        assert!(user.contains("- /aa/ in \"car\": 70/100\n"));
    }

    #[test]
    fn test_build_prompt_caps_list() {
        let weak: Vec<PhonemeScore> = (0..20)
            .map(|i| PhonemeScore::new("t", "cat", i as f64))
            .collect();
        let user = build_prompt("cat", "cat", 10.0, &weak);
        assert_eq!(user.matches("- /t/").count(), MAX_LISTED_PHONEMES);
    }
}
