/// 音素記号 → 綴り候補の対応表。
///
/// 順序付きスライスとして保持し、照合はこの並び順で行う。
/// 複数の記号が同じ綴りを持つことは許容する（例: "a" は多くの母音が持つ）。
/// どれを採用するかは対応表ではなくアライメント側の優先順位で決まる。
pub const PHONEME_GRAPHEMES: &[(&str, &[&str])] = &[
    // 母音
    ("iy", &["i", "y", "ee", "ea", "e"]),
    ("ih", &["i", "y", "e"]),
    ("eh", &["e", "ea", "a"]),
    ("ae", &["a", "ai"]),
    ("ah", &["u", "o", "a"]),
    ("uw", &["oo", "u", "o"]),
    ("uh", &["oo", "u", "o"]),
    ("ao", &["o", "au", "aw", "a"]),
    ("aa", &["a", "o"]),
    ("ey", &["a", "ay", "ai", "ei"]),
    ("ay", &["i", "y", "ie"]),
    ("oy", &["oi", "oy"]),
    ("ow", &["o", "ow"]),
    ("aw", &["ow", "ou", "au"]),
    ("ax", &["a", "e", "i", "o", "u"]), // schwa
    // 子音
    ("p", &["p"]),
    ("b", &["b"]),
    ("t", &["t"]),
    ("d", &["d"]),
    ("k", &["k", "c", "ck", "ch"]),
    ("g", &["g"]),
    ("ch", &["ch", "tch"]),
    ("jh", &["j", "g", "dge"]),
    ("f", &["f", "ph", "gh"]),
    ("v", &["v"]),
    ("th", &["th"]),
    ("dh", &["th"]),
    ("s", &["s", "c", "ce", "ss"]),
    ("z", &["z", "s", "ss"]),
    ("sh", &["sh", "ti", "ci"]),
    ("zh", &["s", "si"]),
    ("hh", &["h"]),
    ("m", &["m", "mm"]),
    ("n", &["n", "nn", "kn"]),
    ("ng", &["ng"]),
    ("l", &["l", "ll"]),
    ("r", &["r", "rr", "wr"]),
    ("y", &["y", "i"]),
    ("w", &["w", "wh"]),
    ("dx", &["t", "tt", "dd"]), // flap t
    ("er", &["er", "ir", "ur", "or", "ar"]),
];

/// 記号に完全一致するエントリの綴り候補を返す。
pub fn graphemes_for(symbol: &str) -> Option<&'static [&'static str]> {
    PHONEME_GRAPHEMES
        .iter()
        .find(|(key, _)| *key == symbol)
        .map(|(_, graphemes)| *graphemes)
}

/// `phoneme` が含むキーのうち、綴り候補に `letter` と等しいものを持つエントリがあるか。
pub(crate) fn table_match(phoneme: &str, letter: &str) -> bool {
    PHONEME_GRAPHEMES
        .iter()
        .any(|(key, graphemes)| {
            phoneme.contains(key) && graphemes.iter().any(|g| *g == letter)
        })
}

/// `table_match` の緩い版。綴り候補が `letter` を部分文字列として含めばよい。
pub(crate) fn loose_table_match(phoneme: &str, letter: &str) -> bool {
    PHONEME_GRAPHEMES.iter().any(|(key, graphemes)| {
        phoneme.contains(key) && graphemes.iter().any(|g| g.contains(letter))
    })
}
