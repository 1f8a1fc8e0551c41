use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::analyzer::TypingSession;
use crate::clipboard::ClipboardAction;
use crate::config::Config;
use crate::error::ReplayError;
use crate::exercise::{Exercise, LanguagePair};
use crate::payload::ExercisePayload;
use crate::scoring::{score_with_rules, ScoreReport};

/// A recorded attempt: the input after each change, with timestamps in
/// milliseconds since the session started.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplayScript {
    #[serde(default)]
    pub language_pair: Option<String>,
    #[serde(default)]
    pub exercise: Option<usize>,
    /// Replaces the bundled exercise text when present.
    #[serde(default)]
    pub reference_text: Option<String>,
    pub events: Vec<ReplayEvent>,
    /// When the attempt is submitted. Defaults to the last event.
    #[serde(default)]
    pub complete_at: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplayEvent {
    pub at: u64,
    #[serde(default)]
    pub input: Option<String>,
    #[serde(default)]
    pub clipboard: Option<ClipboardAction>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplayOutcome {
    pub payload: ExercisePayload,
    pub score: ScoreReport,
    pub level: String,
    /// Alerts the user would have seen, in order.
    pub warnings: Vec<String>,
}

impl ReplayScript {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ReplayError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    pub fn parse(s: &str) -> Result<Self, ReplayError> {
        Ok(serde_json::from_str(s)?)
    }
}

/// Feed `script` through a fresh session and score the result.
pub fn run_replay(script: &ReplayScript, config: &Config) -> Result<ReplayOutcome, ReplayError> {
    let pair: LanguagePair = script
        .language_pair
        .as_deref()
        .unwrap_or(&config.language_pair)
        .parse()?;
    let number = script.exercise.unwrap_or(config.exercise_number);
    let text = match &script.reference_text {
        Some(text) => text.clone(),
        None => Exercise::load(pair, number)?.text,
    };

    let mut session = TypingSession::start(&text, pair.slug(), 0, config.analyzer.clone());
    let mut warnings = Vec::new();
    for event in &script.events {
        if let Some(action) = event.clipboard {
            warnings.extend(session.reject_clipboard(action));
        }
        if let Some(input) = &event.input {
            warnings.extend(session.on_input_change(input, event.at));
        }
    }

    let complete_at = script
        .complete_at
        .or_else(|| script.events.last().map(|e| e.at))
        .unwrap_or(0);
    let payload = session.complete(number, complete_at)?;
    let score = score_with_rules(&config.scoring, &payload.metrics);
    log::info!(
        "replayed {} events: score {}",
        script.events.len(),
        score.final_score
    );

    Ok(ReplayOutcome {
        level: score.level().to_string(),
        warnings: warnings.iter().map(|w| w.message().to_string()).collect(),
        payload,
        score,
    })
}
