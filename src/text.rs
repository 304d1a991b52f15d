//! Word normalization and folding shared by every lookup path.
//!
//! Two forms of a word are used throughout the crate:
//! - the **normalized** form: trimmed, lowercased, typographic apostrophes
//!   replaced by `'`. This is the form stored in dictionaries.
//! - the **folded** form: the normalized form with diacritics stripped
//!   (`école` → `ecole`, `cœur` → `coeur`). Fuzzy matching and swipe
//!   shapes compare folded forms.

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Accented letters accepted in French and English words.
const ACCENTED: &str = "àâäáãåçéèêëíìîïñóòôöõúùûüýÿœæ";

/// Length bounds for autocorrect lexicons and the unigram asset.
pub const LEXICON_SHAPE: WordShape = WordShape { min: 2, max: 24 };
/// Length bounds for n-gram vocabularies.
pub const NGRAM_SHAPE: WordShape = WordShape { min: 1, max: 32 };

/// Character-count bounds plus the restricted Latin charset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WordShape {
    pub min: usize,
    pub max: usize,
}

impl WordShape {
    /// Whether an already-normalized word has an acceptable shape.
    pub fn accepts(&self, word: &str) -> bool {
        let len = word.chars().count();
        if len < self.min || len > self.max {
            return false;
        }
        match word.chars().next() {
            Some(first) if is_letter(first) => {}
            _ => return false,
        }
        word.chars().all(is_word_char)
    }
}

/// Trim, lowercase and normalize apostrophes.
pub fn normalize_word(raw: &str) -> String {
    raw.trim()
        .chars()
        .flat_map(char::to_lowercase)
        .map(|c| match c {
            '\u{2019}' | '\u{2018}' | '\u{02bc}' | '`' | '\u{00b4}' => '\'',
            other => other,
        })
        .collect()
}

/// Normalize, then strip diacritics.
pub fn fold(raw: &str) -> String {
    let normalized = normalize_word(raw);
    let mut out = String::with_capacity(normalized.len());
    for c in normalized.nfd() {
        match c {
            'œ' => out.push_str("oe"),
            'æ' => out.push_str("ae"),
            c if is_combining_mark(c) => {}
            c => out.push(c),
        }
    }
    out
}

pub fn is_letter(c: char) -> bool {
    c.is_ascii_lowercase() || ACCENTED.contains(c)
}

pub fn is_word_char(c: char) -> bool {
    is_letter(c) || c == '\'' || c == '-'
}

/// Vowel test on folded characters.
pub fn is_vowel(c: char) -> bool {
    matches!(c, 'a' | 'e' | 'i' | 'o' | 'u' | 'y')
}

/// Shorten every run of identical characters to at most `max_run`.
pub fn collapse_runs(word: &str, max_run: usize) -> String {
    let mut out = String::with_capacity(word.len());
    let mut previous = None;
    let mut run = 0usize;
    for c in word.chars() {
        if Some(c) == previous {
            run += 1;
        } else {
            previous = Some(c);
            run = 1;
        }
        if run <= max_run {
            out.push(c);
        }
    }
    out
}

/// Longest run of one repeated character, as `(char, length)`.
pub fn longest_run(word: &str) -> Option<(char, usize)> {
    let mut best: Option<(char, usize)> = None;
    let mut previous = None;
    let mut run = 0usize;
    for c in word.chars() {
        if Some(c) == previous {
            run += 1;
        } else {
            previous = Some(c);
            run = 1;
        }
        if best.map_or(true, |(_, len)| run > len) {
            best = Some((c, run));
        }
    }
    best
}

/// Number of leading characters two words share.
pub fn shared_prefix_len(a: &str, b: &str) -> usize {
    a.chars().zip(b.chars()).take_while(|(x, y)| x == y).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_word() {
        assert_eq!(normalize_word("  Hello "), "hello");
        assert_eq!(normalize_word("J\u{2019}ai"), "j'ai");
    }

    #[test]
    fn test_fold_strips_diacritics() {
        assert_eq!(fold("École"), "ecole");
        assert_eq!(fold("cœur"), "coeur");
        assert_eq!(fold("garçon"), "garcon");
        assert_eq!(fold("hello"), "hello");
    }

    #[test]
    fn test_word_shape() {
        assert!(LEXICON_SHAPE.accepts("été"));
        assert!(LEXICON_SHAPE.accepts("aujourd'hui"));
        assert!(!LEXICON_SHAPE.accepts("a"));
        assert!(!LEXICON_SHAPE.accepts("abc1"));
        assert!(!LEXICON_SHAPE.accepts("'tis"));
        assert!(NGRAM_SHAPE.accepts("a"));
        assert!(!LEXICON_SHAPE.accepts(&"x".repeat(25)));
    }

    #[test]
    fn test_collapse_runs() {
        assert_eq!(collapse_runs("helllooo", 2), "helloo");
        assert_eq!(collapse_runs("helllooo", 1), "helo");
        assert_eq!(collapse_runs("", 1), "");
    }

    #[test]
    fn test_longest_run_and_prefix() {
        assert_eq!(longest_run("coooool"), Some(('o', 5)));
        assert_eq!(longest_run(""), None);
        assert_eq!(shared_prefix_len("hello", "help"), 3);
    }
}
