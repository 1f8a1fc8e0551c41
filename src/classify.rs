use serde::{Deserialize, Serialize};

use crate::script::char_to_script_tag;

/// Punctuation that turns a mismatch into a punctuation error.
const PUNCTUATION: &str = ".,!?;:-(){}[]\"'•%/\\–_";

/// Pairs that are easy to hit instead of each other. Order within a pair does not matter.
const CONFUSABLE_PAIRS: [(char, char); 6] = [
    ('.', ','),
    ('(', ')'),
    ('-', '_'),
    ('/', '\\'),
    (';', ':'),
    ('!', '?'),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum_macros::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ErrorKind {
    Language,
    Punctuation,
    Typo,
}

/// A single mismatch between the typed text and the reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorRecord {
    pub position: usize,
    pub expected: char,
    pub actual: char,
    pub kind: ErrorKind,
    /// Whether this substitution is one of the easily confused punctuation pairs.
    pub confusable: bool,
    /// Session clock reading when the record was reported; 0 until stamped.
    pub detected_at: u64,
}

/// Fresh diff of an input against a reference.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Classification {
    pub errors: Vec<ErrorRecord>,
}

impl Classification {
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn count(&self, kind: ErrorKind) -> usize {
        self.errors.iter().filter(|e| e.kind == kind).count()
    }

    pub fn positions(&self) -> impl Iterator<Item = usize> + '_ {
        self.errors.iter().map(|e| e.position)
    }

    pub fn confusable_positions(&self) -> impl Iterator<Item = usize> + '_ {
        self.errors
            .iter()
            .filter(|e| e.confusable)
            .map(|e| e.position)
    }

    /// Consume the classification, stamping every record with `now`.
    pub fn stamped(self, now: u64) -> Vec<ErrorRecord> {
        self.errors
            .into_iter()
            .map(|e| ErrorRecord { detected_at: now, ..e })
            .collect()
    }
}

/// Trim surrounding whitespace and split into characters.
pub fn normalize(text: &str) -> Vec<char> {
    text.trim().chars().collect()
}

pub fn is_punctuation(c: char) -> bool {
    PUNCTUATION.contains(c)
}

pub fn is_confusable(expected: char, actual: char) -> bool {
    CONFUSABLE_PAIRS
        .iter()
        .any(|&(a, b)| (expected == a && actual == b) || (expected == b && actual == a))
}

/// Classify a single mismatch. Callers guarantee `expected != actual`.
pub fn classify_mismatch(position: usize, expected: char, actual: char) -> ErrorRecord {
    let kind = match (char_to_script_tag(expected), char_to_script_tag(actual)) {
        (Some(e), Some(a)) if e != a => ErrorKind::Language,
        _ if is_punctuation(expected) || is_punctuation(actual) => ErrorKind::Punctuation,
        _ => ErrorKind::Typo,
    };

    ErrorRecord {
        position,
        expected,
        actual,
        kind,
        confusable: kind == ErrorKind::Punctuation && is_confusable(expected, actual),
        detected_at: 0,
    }
}

/// Diff the normalized `input` against an already-normalized `reference`.
///
/// Only the overlapping prefix is compared; characters typed past the end of
/// the reference never produce an error record.
pub fn classify_errors(reference: &[char], input: &str) -> Classification {
    let typed = normalize(input);

    let errors = reference
        .iter()
        .zip(typed.iter())
        .enumerate()
        .filter(|(_, (expected, actual))| expected != actual)
        .map(|(position, (&expected, &actual))| classify_mismatch(position, expected, actual))
        .collect();

    Classification { errors }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference(text: &str) -> Vec<char> {
        normalize(text)
    }

    #[test]
    fn test_normalize_trims_both_ends() {
        assert_eq!(normalize("  ab c\n"), vec!['a', 'b', ' ', 'c']);
        assert!(normalize("   ").is_empty());
    }

    #[test]
    fn test_exact_match_has_no_errors() {
        let c = classify_errors(&reference("hello world"), "hello world");
        assert!(c.is_empty());
    }

    #[test]
    fn test_language_error_for_script_mismatch() {
        let c = classify_errors(&reference("hello world"), "שello world");
        assert_eq!(c.len(), 1);
        assert_eq!(c.errors[0].position, 0);
        assert_eq!(c.errors[0].kind, ErrorKind::Language);
        assert_eq!(c.count(ErrorKind::Language), 1);
    }

    #[test]
    fn test_punctuation_confusion() {
        let c = classify_errors(&reference("a,b"), "a.b");
        assert_eq!(c.len(), 1);
        let err = &c.errors[0];
        assert_eq!(err.position, 1);
        assert_eq!(err.kind, ErrorKind::Punctuation);
        assert!(err.confusable);
        assert_eq!(c.confusable_positions().collect::<Vec<_>>(), vec![1]);
    }

    #[test]
    fn test_punctuation_without_confusion() {
        let c = classify_errors(&reference("a,b"), "a%b");
        assert_eq!(c.errors[0].kind, ErrorKind::Punctuation);
        assert!(!c.errors[0].confusable);
    }

    #[test]
    fn test_same_script_is_typo() {
        let c = classify_errors(&reference("cat"), "cot");
        assert_eq!(c.errors[0].kind, ErrorKind::Typo);
    }

    #[test]
    fn test_untagged_against_letter_is_typo() {
        // digits carry no script, so this is not a language error
        let c = classify_errors(&reference("a1"), "aa");
        assert_eq!(c.errors[0].kind, ErrorKind::Typo);
    }

    #[test]
    fn test_trailing_extra_input_ignored() {
        let c = classify_errors(&reference("abc"), "abcxyz");
        assert!(c.is_empty());
    }

    #[test]
    fn test_short_input_only_compares_prefix() {
        let c = classify_errors(&reference("abcdef"), "abx");
        assert_eq!(c.positions().collect::<Vec<_>>(), vec![2]);
    }

    #[test]
    fn test_input_is_normalized_before_diffing() {
        let c = classify_errors(&reference("abc"), "   abc  ");
        assert!(c.is_empty());
    }

    #[test]
    fn test_classification_is_idempotent() {
        let r = reference("Прошу срочно, (NET 30/60/90)");
        let input = "Прошу srочно. (NET 30\\60";
        assert_eq!(classify_errors(&r, input), classify_errors(&r, input));
    }

    #[test]
    fn test_confusable_is_symmetric() {
        assert!(is_confusable('/', '\\'));
        assert!(is_confusable('\\', '/'));
        assert!(is_confusable(':', ';'));
        assert!(!is_confusable('.', '!'));
    }

    #[test]
    fn test_error_kind_display() {
        assert_eq!(ErrorKind::Language.to_string(), "language");
        assert_eq!(ErrorKind::Typo.to_string(), "typo");
    }
}
