//! Transcript cleanup before the catalog search.
//!
//! Whisper output arrives with punctuation, mixed case and the occasional
//! mis-heard homophone. The matcher wants a flat, lowercase utterance where
//! the `" by "` separator is reliable, so everything funnels through
//! [`normalize_utterance`] first.

/// Check whether the text contains right-to-left script (Hebrew or Arabic
/// blocks). Such transcripts are matched whole; splitting them on an English
/// `" by "` separator would cut through reordered display text.
pub fn contains_rtl(text: &str) -> bool {
    text.chars().any(|c| {
        matches!(c,
            '\u{0590}'..='\u{05FF}'   // Hebrew
            | '\u{0600}'..='\u{06FF}' // Arabic
            | '\u{0750}'..='\u{077F}' // Arabic Supplement
            | '\u{FB50}'..='\u{FDFF}' // Arabic Presentation Forms-A
            | '\u{FE70}'..='\u{FEFF}' // Arabic Presentation Forms-B
        )
    })
}

/// Normalize a raw transcript into a search utterance: strip punctuation,
/// lowercase, collapse whitespace, and repair `buy`/`bye` homophones into
/// the `by` separator.
pub fn normalize_utterance(raw: &str) -> String {
    let stripped: String = raw
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .collect();

    let words: Vec<String> = stripped
        .split_whitespace()
        .map(|w| w.to_lowercase())
        .collect();

    if contains_rtl(raw) {
        return words.join(" ");
    }

    repair_separator(words).join(" ")
}

/// Rewrite interior `buy`/`bye` tokens to `by`. Only interior tokens are
/// touched: a leading or trailing homophone is more likely part of the
/// actual title ("Bye Bye Bye").
fn repair_separator(words: Vec<String>) -> Vec<String> {
    let last = words.len().saturating_sub(1);
    words
        .into_iter()
        .enumerate()
        .map(|(i, w)| {
            if i > 0 && i < last && (w == "buy" || w == "bye") {
                "by".to_string()
            } else {
                w
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_punctuation_and_lowercases() {
        assert_eq!(
            normalize_utterance(" Play \"Yesterday\", please!  "),
            "play yesterday please"
        );
    }

    #[test]
    fn repairs_interior_homophones() {
        assert_eq!(
            normalize_utterance("Yesterday buy The Beatles"),
            "yesterday by the beatles"
        );
        assert_eq!(
            normalize_utterance("Africa bye Toto"),
            "africa by toto"
        );
    }

    #[test]
    fn leaves_edge_homophones_alone() {
        assert_eq!(normalize_utterance("bye bye bye"), "bye by bye");
        assert_eq!(normalize_utterance("buy it all"), "buy it all");
    }

    #[test]
    fn detects_rtl_scripts() {
        assert!(contains_rtl("שיר של יום"));
        assert!(contains_rtl("أغنية جميلة"));
        assert!(!contains_rtl("yesterday by the beatles"));
    }

    #[test]
    fn rtl_text_skips_separator_repair() {
        // "buy" inside an RTL transcript stays untouched.
        assert_eq!(normalize_utterance("שיר buy אמן"), "שיר buy אמן");
    }
}
