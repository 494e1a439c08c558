//! Word-character classification and single-token expansion.

/// Characters that continue a word: letters of the supported scripts,
/// digits and hyphen.
pub fn is_word_char(c: char) -> bool {
    if c.is_ascii_alphanumeric() || c == '-' {
        return true;
    }
    matches!(c as u32,
        // Latin-1 Supplement letters (× and ÷ excluded)
        0x00C0..=0x00D6 | 0x00D8..=0x00F6 | 0x00F8..=0x00FF
        // Latin Extended-A and -B
        | 0x0100..=0x024F
        // Latin Extended Additional
        | 0x1E00..=0x1EFF
        // Greek and Coptic, Greek Extended
        | 0x0370..=0x03FF | 0x1F00..=0x1FFF
        // Cyrillic and Cyrillic Supplement
        | 0x0400..=0x052F
        // Hangul Jamo, Compatibility Jamo, Syllables
        | 0x1100..=0x11FF | 0x3130..=0x318F | 0xAC00..=0xD7AF
    ) && c.is_alphanumeric()
}

/// Expand outward from `hit` while characters are word characters.
///
/// Returns the half-open `(start, end)` range of the maximal run
/// containing `hit`, or `None` if the character under `hit` is not a
/// word character.
pub fn expand_word(chars: &[char], hit: usize) -> Option<(usize, usize)> {
    if !chars.get(hit).copied().is_some_and(is_word_char) {
        return None;
    }

    let mut start = hit;
    while start > 0 && is_word_char(chars[start - 1]) {
        start -= 1;
    }

    let mut end = hit + 1;
    while end < chars.len() && is_word_char(chars[end]) {
        end += 1;
    }

    Some((start, end))
}

/// Whether the trimmed text contains at least one letter or digit
pub fn has_alphanumeric(text: &str) -> bool {
    text.trim().chars().any(char::is_alphanumeric)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    #[test]
    fn test_word_chars_across_scripts() {
        for c in ['a', 'Z', '7', '-', 'é', 'ø', 'Å', 'ł', 'ẞ', 'λ', 'Ω', 'ж', 'Ё', '한', 'ㄱ'] {
            assert!(is_word_char(c), "{c:?} should be a word char");
        }
        for c in [' ', '.', ',', '!', '?', '\'', '"', '×', '÷', '。', '—', '中'] {
            assert!(!is_word_char(c), "{c:?} should not be a word char");
        }
    }

    #[test]
    fn test_expand_word_middle() {
        let text = chars("Han kan ikke tale dansk.");
        // 't' of "tale" is at 13, 'l' at 15
        assert_eq!(expand_word(&text, 15), Some((13, 17)));
        assert_eq!(expand_word(&text, 13), Some((13, 17)));
    }

    #[test]
    fn test_expand_word_keeps_hyphenated_compound() {
        let text = chars("a well-known fact");
        assert_eq!(expand_word(&text, 4), Some((2, 12)));
    }

    #[test]
    fn test_expand_word_rejects_space_and_punctuation() {
        let text = chars("tale dansk.");
        assert_eq!(expand_word(&text, 4), None);
        assert_eq!(expand_word(&text, 10), None);
        assert_eq!(expand_word(&text, 11), None);
    }

    #[test]
    fn test_has_alphanumeric() {
        assert!(has_alphanumeric(" tale "));
        assert!(has_alphanumeric("42"));
        assert!(!has_alphanumeric("--"));
        assert!(!has_alphanumeric(" ... "));
    }
}
