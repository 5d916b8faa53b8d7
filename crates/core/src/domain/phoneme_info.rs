use serde::Serialize;

/// 音素ごとの発音ガイド（詳細モーダル用）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PhonemeInfo {
    pub pronunciation: &'static str,
    pub examples: &'static [&'static str],
    pub tips: &'static str,
}

const PHONEME_INFO: &[(&str, PhonemeInfo)] = &[
    (
        "r",
        PhonemeInfo {
            pronunciation: "Curl your tongue back without touching the roof of your mouth. The sides of your tongue should touch your upper back teeth.",
            examples: &["red", "car", "train", "grow"],
            tips: "Practice making the 'r' sound in isolation first, then try it at the beginning, middle, and end of words.",
        },
    ),
    (
        "th",
        PhonemeInfo {
            pronunciation: "Place the tip of your tongue between your front teeth and blow air out gently.",
            examples: &["think", "three", "bath", "with"],
            tips: "There are two 'th' sounds - one is voiceless (as in 'think') and one is voiced (as in 'this'). Practice both.",
        },
    ),
    (
        "s",
        PhonemeInfo {
            pronunciation: "Position your tongue behind your top front teeth, but not touching them. Create a narrow channel for air to flow through.",
            examples: &["sun", "bus", "cats", "smile"],
            tips: "Keep your tongue centered in your mouth and maintain a consistent airflow.",
        },
    ),
    (
        "sh",
        PhonemeInfo {
            pronunciation: "Round your lips slightly and position your tongue near the roof of your mouth, but not touching it.",
            examples: &["ship", "wish", "ocean", "nation"],
            tips: "The 'sh' sound should be smooth and continuous, without any stopping of airflow.",
        },
    ),
    (
        "l",
        PhonemeInfo {
            pronunciation: "Touch the tip of your tongue to the ridge behind your upper front teeth.",
            examples: &["light", "ball", "play", "along"],
            tips: "Practice both light 'l' sounds (at the beginning of words) and dark 'l' sounds (at the end of words).",
        },
    ),
    (
        "k",
        PhonemeInfo {
            pronunciation: "Raise the back of your tongue to touch the soft palate (back of the roof of your mouth).",
            examples: &["cat", "take", "school", "back"],
            tips: "The 'k' sound is a sharp, quick release of air. Practice controlling this release.",
        },
    ),
    (
        "g",
        PhonemeInfo {
            pronunciation: "Raise the back of your tongue to touch the soft palate, similar to 'k' but with voice.",
            examples: &["go", "big", "eagle", "dog"],
            tips: "The 'g' sound is similar to 'k', but your vocal cords vibrate when making it.",
        },
    ),
];

/// 未登録の記号に返す汎用ガイド
pub const GENERIC_PHONEME_INFO: PhonemeInfo = PhonemeInfo {
    pronunciation: "Position your mouth and tongue appropriately for the sound.",
    examples: &["Example words not available"],
    tips: "Practice this sound in different word positions (beginning, middle, end).",
};

/// 記号（大文字小文字は区別しない）に対応するガイドを返す
pub fn phoneme_info(symbol: &str) -> PhonemeInfo {
    let symbol = symbol.to_lowercase();
    PHONEME_INFO
        .iter()
        .find(|(key, _)| *key == symbol)
        .map(|(_, info)| *info)
        .unwrap_or(GENERIC_PHONEME_INFO)
}

/// 個別ガイドを持つ記号かどうか
pub fn has_specific_info(symbol: &str) -> bool {
    let symbol = symbol.to_lowercase();
    PHONEME_INFO.iter().any(|(key, _)| *key == symbol)
}
