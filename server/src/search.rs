//! # Search normalization
//!
//! Obligee search ignores case and diacritics, so "kultury" finds "Ministerstvo kultúry".
//! Both the stored search key and the search term go through [`fold()`].

use unicode_normalization::{UnicodeNormalization, char::is_combining_mark};

/// Lower-cases `text` and strips diacritics.
///
/// Input is decomposed first, so precomposed and combining-mark spellings of the same
/// letter fold alike.
pub fn fold(text: &str) -> String {
    text.nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .collect()
}

/// Folds a search term and splits it into words. Punctuation separates words.
pub fn words(term: &str) -> Vec<String> {
    fold(term)
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fold() {
        assert_eq!(
            fold("Ministerstvo kultúry Slovenskej republiky"),
            "ministerstvo kultury slovenskej republiky"
        );
        assert_eq!(fold("ŽILINA, Štúrova 4"), "zilina, sturova 4");
        assert_eq!(fold("Ďumbier Ľubochňa Ťahanovce"), "dumbier lubochna tahanovce");
    }

    #[test]
    fn test_fold_decomposed_input() {
        // "kultúry" spelled with a combining acute accent
        let folded = fold("Ministerstvo kultu\u{301}ry");
        assert_eq!(folded, "ministerstvo kultury");
        assert_eq!(fold("Z\u{30c}ilina"), fold("Žilina"));
    }

    #[test]
    fn test_fold_other_latin_letters() {
        assert_eq!(fold("Ñ Ã Ś"), "n a s");
        assert_eq!(fold("Győr Kraków Dvořák"), "gyor krakow dvorak");
    }

    #[test]
    fn test_words() {
        assert_eq!(words("  Kultúry,  SR "), vec!["kultury", "sr"]);
        assert_eq!(words("kultu\u{301}ry"), vec!["kultury"]);
        assert!(words(" - ").is_empty());
        assert!(words("").is_empty());
    }
}
