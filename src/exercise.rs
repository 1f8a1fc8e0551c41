use include_dir::{include_dir, Dir};
use serde::Deserialize;
use std::str::FromStr;

use crate::error::ExerciseError;

static EXERCISE_DIR: Dir = include_dir!("$CARGO_MANIFEST_DIR/src/exercises");

/// Language pairs that ship with bundled exercises.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum, strum_macros::Display,
)]
pub enum LanguagePair {
    #[value(name = "arabic-english")]
    #[strum(to_string = "Arabic-English")]
    ArabicEnglish,
    #[value(name = "french-english")]
    #[strum(to_string = "French-English")]
    FrenchEnglish,
    #[value(name = "hebrew-english")]
    #[strum(to_string = "Hebrew-English")]
    HebrewEnglish,
    #[value(name = "hindi-english")]
    #[strum(to_string = "Hindi-English")]
    HindiEnglish,
    #[value(name = "japanese-english")]
    #[strum(to_string = "Japanese-English")]
    JapaneseEnglish,
    #[value(name = "russian-english")]
    #[strum(to_string = "Russian-English")]
    RussianEnglish,
}

impl LanguagePair {
    pub const ALL: [LanguagePair; 6] = [
        LanguagePair::ArabicEnglish,
        LanguagePair::FrenchEnglish,
        LanguagePair::HebrewEnglish,
        LanguagePair::HindiEnglish,
        LanguagePair::JapaneseEnglish,
        LanguagePair::RussianEnglish,
    ];

    /// Identifier used on the command line, in config and in payloads.
    pub fn slug(&self) -> &'static str {
        match self {
            LanguagePair::ArabicEnglish => "arabic-english",
            LanguagePair::FrenchEnglish => "french-english",
            LanguagePair::HebrewEnglish => "hebrew-english",
            LanguagePair::HindiEnglish => "hindi-english",
            LanguagePair::JapaneseEnglish => "japanese-english",
            LanguagePair::RussianEnglish => "russian-english",
        }
    }

    fn bundle_name(&self) -> String {
        format!("{}.json", self.slug())
    }
}

impl FromStr for LanguagePair {
    type Err = ExerciseError;

    /// Accepts the slug or the display name, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        LanguagePair::ALL
            .into_iter()
            .find(|p| p.slug() == wanted || p.to_string().to_lowercase() == wanted)
            .ok_or_else(|| ExerciseError::UnknownLanguagePair(s.to_string()))
    }
}

#[derive(Deserialize, Clone, Debug, PartialEq)]
pub struct Exercise {
    pub title: String,
    pub text: String,
}

#[derive(Deserialize, Clone, Debug)]
struct ExerciseBundle {
    #[allow(dead_code)]
    name: String,
    exercises: Vec<Exercise>,
}

impl Exercise {
    /// Load the 1-based `number`th exercise of `pair`.
    pub fn load(pair: LanguagePair, number: usize) -> Result<Exercise, ExerciseError> {
        let bundle = read_bundle(&pair.bundle_name())?;
        number
            .checked_sub(1)
            .and_then(|i| bundle.exercises.get(i))
            .cloned()
            .ok_or_else(|| ExerciseError::NoSuchExercise {
                pair: pair.to_string(),
                number,
            })
    }

    pub fn count(pair: LanguagePair) -> Result<usize, ExerciseError> {
        Ok(read_bundle(&pair.bundle_name())?.exercises.len())
    }
}

fn read_bundle(file_name: &str) -> Result<ExerciseBundle, ExerciseError> {
    let contents = EXERCISE_DIR
        .get_file(file_name)
        .and_then(|f| f.contents_utf8())
        .ok_or_else(|| ExerciseError::MissingBundle(file_name.to_string()))?;
    parse_bundle(file_name, contents)
}

fn parse_bundle(file_name: &str, contents: &str) -> Result<ExerciseBundle, ExerciseError> {
    serde_json::from_str(contents)
        .map_err(|e| ExerciseError::MalformedBundle(file_name.to_string(), e))
}
