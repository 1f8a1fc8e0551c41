/// Coarse writing-system tag derived from Unicode ranges.
///
/// This is a heuristic, not a language identifier: it only answers "which
/// keyboard layout was this character most likely typed on".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum_macros::Display)]
pub enum ScriptTag {
    #[strum(serialize = "hebrew")]
    Hebrew,
    #[strum(serialize = "arabic")]
    Arabic,
    #[strum(serialize = "russian")]
    Cyrillic,
    #[strum(serialize = "hindi")]
    Devanagari,
    #[strum(serialize = "japanese")]
    Japanese,
    #[strum(serialize = "korean")]
    Hangul,
    #[strum(serialize = "french")]
    FrenchLatin,
    #[strum(serialize = "english")]
    Latin,
}

const FRENCH_ACCENTED: &str = "àâäçèéêëîïôùûü";

/// Map a single character to its script tag, or `None` for digits,
/// whitespace, punctuation and anything outside the supported set.
pub fn char_to_script_tag(c: char) -> Option<ScriptTag> {
    match c {
        'א'..='ת' => Some(ScriptTag::Hebrew),
        '\u{0600}'..='\u{06FF}' => Some(ScriptTag::Arabic),
        'а'..='я' | 'А'..='Я' => Some(ScriptTag::Cyrillic),
        '\u{0900}'..='\u{097F}' => Some(ScriptTag::Devanagari),
        '\u{3040}'..='\u{309F}' | '\u{30A0}'..='\u{30FF}' | '\u{4E00}'..='\u{9FAF}' => {
            Some(ScriptTag::Japanese)
        }
        '\u{AC00}'..='\u{D7AF}' => Some(ScriptTag::Hangul),
        c if c.to_lowercase().any(|l| FRENCH_ACCENTED.contains(l)) => Some(ScriptTag::FrenchLatin),
        c if c.is_ascii_alphabetic() => Some(ScriptTag::Latin),
        _ => None,
    }
}
