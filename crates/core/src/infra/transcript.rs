/// 認識テキストの正規化。
///
/// 注釈は空白1文字ごとに単語を区切るので、描画前に空白を揃えておく。
/// 全角英数・全角空白は半角へ、改行とタブは空白へ寄せ、連続空白を圧縮して前後をトリムする。
/// 句読点はそのまま残す。
pub fn normalize_transcript(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut prev_space = true;

    for ch in text.chars() {
        let ch = match ch {
            '\u{FF01}'..='\u{FF5E}' => char::from_u32(ch as u32 - 0xFEE0).unwrap_or(ch),
            '\u{3000}' | '\t' | '\n' | '\r' => ' ',
            _ => ch,
        };

        if ch == ' ' {
            if !prev_space {
                result.push(' ');
            }
            prev_space = true;
        } else {
            result.push(ch);
            prev_space = false;
        }
    }

    if result.ends_with(' ') {
        result.pop();
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapses_and_trims() {
        assert_eq!(normalize_transcript("  Red   car. "), "Red car.");
        assert_eq!(normalize_transcript("red\tcar\r\nnow"), "red car now");
        assert_eq!(normalize_transcript(""), "");
        assert_eq!(normalize_transcript("   "), "");
    }

    #[test]
    fn test_fullwidth_to_halfwidth() {
        assert_eq!(normalize_transcript("Ｒｅｄ　ｃａｒ"), "Red car");
    }

    #[test]
    fn test_punctuation_kept() {
        assert_eq!(normalize_transcript("Hello, world!"), "Hello, world!");
    }
}
