use whatlang::Lang;

/// Shortest review worth keeping
const MIN_CHARS: usize = 10;
/// Texts longer than this also go through the language detector
const DETECTION_THRESHOLD: usize = 50;
/// Highest tolerated share of non-ASCII characters
const MAX_NON_ASCII_RATIO: f64 = 0.3;

/// Whether a review reads as English.
///
/// Cheap character checks first, then statistical detection for longer
/// texts. A detector that cannot decide counts as non-English.
#[must_use]
pub fn is_english(text: &str) -> bool {
    let total = text.chars().count();
    if total < MIN_CHARS {
        return false;
    }

    let non_ascii = text.chars().filter(|c| !c.is_ascii()).count();
    if non_ascii as f64 / total as f64 > MAX_NON_ASCII_RATIO {
        return false;
    }

    if total > DETECTION_THRESHOLD {
        return whatlang::detect(text).is_some_and(|info| info.lang() == Lang::Eng);
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_short_text() {
        assert!(!is_english(""));
        assert!(!is_english("Great"));
        assert!(!is_english("Too short"));
    }

    #[test]
    fn test_rejects_mostly_non_latin() {
        assert!(!is_english("これは本当に素晴らしい映画でした"));
        // 4 of 13 characters are non-ASCII
        assert!(!is_english("ok ok ok éééé"));
    }

    #[test]
    fn test_short_latin_text_skips_detection() {
        assert!(is_english("Loved every minute of it"));
    }

    #[test]
    fn test_accepts_long_english() {
        let text = "This is a wonderful film and I really enjoyed watching it with my whole family tonight.";
        assert!(text.len() > 60);
        assert!(is_english(text));
    }

    #[test]
    fn test_rejects_long_non_english_latin() {
        let text = "Esta película es absolutamente maravillosa y la disfruté muchísimo con toda mi familia anoche.";
        assert!(!is_english(text));
    }
}
