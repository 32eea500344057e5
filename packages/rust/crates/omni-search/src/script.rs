//! Script and language classification predicates used by lexical routing.

/// Language codes that need script-aware (non-stemmed) retrieval.
const CJK_LANGUAGES: [&str; 3] = ["ja", "zh", "ko"];

/// True if `language` (trimmed, case-insensitive) is Japanese, Chinese or Korean.
#[must_use]
pub fn is_cjk_language(language: &str) -> bool {
    let lang = language.trim().to_ascii_lowercase();
    CJK_LANGUAGES.contains(&lang.as_str())
}

/// True if any character is an ASCII letter or digit.
#[must_use]
pub fn has_ascii_alphanumeric(text: &str) -> bool {
    text.chars().any(|c| c.is_ascii_alphanumeric())
}

/// True if any character belongs to the Han, Hiragana, Katakana or Hangul scripts.
#[must_use]
pub fn has_cjk_script(text: &str) -> bool {
    text.chars().any(is_cjk_char)
}

/// Han, Hiragana, Katakana and Hangul code point ranges.
#[must_use]
pub fn is_cjk_char(c: char) -> bool {
    matches!(
        u32::from(c),
        0x3040..=0x309F      // Hiragana
        | 0x30A0..=0x30FF    // Katakana
        | 0x31F0..=0x31FF    // Katakana phonetic extensions
        | 0xFF66..=0xFF9F    // Halfwidth katakana
        | 0x3400..=0x4DBF    // CJK extension A
        | 0x4E00..=0x9FFF    // CJK unified ideographs
        | 0xF900..=0xFAFF    // CJK compatibility ideographs
        | 0x20000..=0x2FA1F  // CJK extensions B..F + compatibility supplement
        | 0x3005..=0x3007    // 々 〆 〇
        | 0x1100..=0x11FF    // Hangul jamo
        | 0x3130..=0x318F    // Hangul compatibility jamo
        | 0xA960..=0xA97F    // Hangul jamo extended-A
        | 0xAC00..=0xD7AF    // Hangul syllables
        | 0xD7B0..=0xD7FF // Hangul jamo extended-B
    )
}
