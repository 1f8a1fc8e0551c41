use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::classify::{classify_errors, normalize, ErrorKind};
use crate::config::{AnalyzerSettings, FrustrationWeights};
use crate::error::MetricsError;
use crate::session::SessionState;
use crate::util::{mean, percent};

/// Hard ceiling on reported words per minute; absorbs paste-like bursts.
pub const WPM_LIMIT: u32 = 150;
pub const FRUSTRATION_LIMIT: u8 = 10;

/// Finalized, immutable result of one exercise attempt.
///
/// Built by the analyzer at finalize time, or read back from a stored record
/// that passes the same bounds checks. Fields are only exposed read-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "MetricsRecord")]
pub struct TypingMetrics {
    total_errors: usize,
    language_errors: usize,
    punctuation_errors: usize,
    deletions: usize,
    corrections: usize,
    language_switches: usize,
    average_delay_ms: u64,
    frustration_score: u8,
    total_mistakes_made: usize,
    final_errors: usize,
    accuracy: u32,
    wpm: u32,
}

/// Unchecked wire shape of [`TypingMetrics`]; converting it enforces the bounds.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsRecord {
    pub total_errors: usize,
    pub language_errors: usize,
    pub punctuation_errors: usize,
    pub deletions: usize,
    pub corrections: usize,
    pub language_switches: usize,
    pub average_delay_ms: u64,
    pub frustration_score: u8,
    pub total_mistakes_made: usize,
    pub final_errors: usize,
    pub accuracy: u32,
    pub wpm: u32,
}

impl TryFrom<MetricsRecord> for TypingMetrics {
    type Error = MetricsError;

    fn try_from(r: MetricsRecord) -> Result<Self, Self::Error> {
        if r.accuracy > 100 {
            return Err(MetricsError::OutOfBounds("accuracy", r.accuracy as u64));
        }
        if r.wpm > WPM_LIMIT {
            return Err(MetricsError::OutOfBounds("wpm", r.wpm as u64));
        }
        if r.frustration_score > FRUSTRATION_LIMIT {
            return Err(MetricsError::OutOfBounds(
                "frustrationScore",
                r.frustration_score as u64,
            ));
        }
        if r.final_errors != r.total_errors {
            return Err(MetricsError::Inconsistent(
                "finalErrors must equal totalErrors",
            ));
        }
        if r.final_errors > r.total_mistakes_made || r.corrections > r.total_mistakes_made {
            return Err(MetricsError::Inconsistent(
                "finalErrors and corrections cannot exceed totalMistakesMade",
            ));
        }
        if r.language_errors + r.punctuation_errors > r.total_errors {
            return Err(MetricsError::Inconsistent(
                "classified errors exceed totalErrors",
            ));
        }

        Ok(Self {
            total_errors: r.total_errors,
            language_errors: r.language_errors,
            punctuation_errors: r.punctuation_errors,
            deletions: r.deletions,
            corrections: r.corrections,
            language_switches: r.language_switches,
            average_delay_ms: r.average_delay_ms,
            frustration_score: r.frustration_score,
            total_mistakes_made: r.total_mistakes_made,
            final_errors: r.final_errors,
            accuracy: r.accuracy,
            wpm: r.wpm,
        })
    }
}

impl TypingMetrics {
    /// Derive the metrics of `state` at time `now`. Does not touch the state.
    pub(crate) fn compute(
        state: &SessionState,
        reference: &[char],
        settings: &AnalyzerSettings,
        now: u64,
    ) -> Self {
        let classification = classify_errors(reference, &state.input);
        let typed = normalize(&state.input);
        let flagged = state.cheat_flagged();

        let total_errors = classification.len();
        let current: BTreeSet<usize> = classification.positions().collect();
        let total_mistakes_made = state.mistake_positions.union(&current).count();
        let corrections = state.corrected_positions.len();
        let confusions = state
            .confusion_positions
            .iter()
            .copied()
            .chain(classification.confusable_positions())
            .collect::<BTreeSet<usize>>()
            .len();

        let typed_text: String = typed.iter().collect();
        let wpm = words_per_minute(
            typed_text.split_whitespace().count(),
            now.saturating_sub(state.started_at),
            flagged,
            settings,
        );

        let mut accuracy = percent(typed.len().saturating_sub(total_errors), typed.len()).unwrap_or(100);
        if flagged {
            accuracy = accuracy.saturating_sub(settings.cheat_accuracy_penalty);
        }

        let average_delay_ms = mean(&state.rhythm_delays(settings.max_valid_delay_ms))
            .map(|m| m.round() as u64)
            .unwrap_or(0);

        let frustration_score = frustration(
            &FrustrationInputs {
                final_errors: total_errors,
                mistakes_made: total_mistakes_made,
                deletions: state.deletion_count,
                corrections,
                language_switches: state.language_switch_count,
                punctuation_confusions: confusions,
                average_delay_ms,
                cheat_flagged: flagged,
            },
            &settings.frustration,
        );

        Self {
            total_errors,
            language_errors: classification.count(ErrorKind::Language),
            punctuation_errors: classification.count(ErrorKind::Punctuation),
            deletions: state.deletion_count,
            corrections,
            language_switches: state.language_switch_count,
            average_delay_ms,
            frustration_score,
            total_mistakes_made,
            final_errors: total_errors,
            accuracy: accuracy.min(100),
            wpm,
        }
    }

    pub fn total_errors(&self) -> usize {
        self.total_errors
    }

    pub fn language_errors(&self) -> usize {
        self.language_errors
    }

    pub fn punctuation_errors(&self) -> usize {
        self.punctuation_errors
    }

    pub fn deletions(&self) -> usize {
        self.deletions
    }

    pub fn corrections(&self) -> usize {
        self.corrections
    }

    pub fn language_switches(&self) -> usize {
        self.language_switches
    }

    pub fn average_delay_ms(&self) -> u64 {
        self.average_delay_ms
    }

    /// 0 (calm) to 10 (extremely frustrated).
    pub fn frustration_score(&self) -> u8 {
        self.frustration_score
    }

    pub fn total_mistakes_made(&self) -> usize {
        self.total_mistakes_made
    }

    pub fn final_errors(&self) -> usize {
        self.final_errors
    }

    pub fn accuracy(&self) -> u32 {
        self.accuracy
    }

    pub fn wpm(&self) -> u32 {
        self.wpm
    }
}

fn words_per_minute(words: usize, elapsed_ms: u64, flagged: bool, settings: &AnalyzerSettings) -> u32 {
    let minutes = (elapsed_ms as f64 / 60_000.0).max(settings.wpm_min_minutes);
    let mut wpm = (words as f64 / minutes).round();
    if flagged {
        wpm = (wpm * settings.cheat_wpm_factor).round();
    }
    let ceiling = settings.wpm_ceiling.min(WPM_LIMIT);
    wpm.clamp(0.0, ceiling as f64) as u32
}

pub(crate) struct FrustrationInputs {
    pub final_errors: usize,
    pub mistakes_made: usize,
    pub deletions: usize,
    pub corrections: usize,
    pub language_switches: usize,
    pub punctuation_confusions: usize,
    pub average_delay_ms: u64,
    pub cheat_flagged: bool,
}

fn capped(count: usize, (weight, cap): (f64, f64)) -> f64 {
    (count as f64 * weight).min(cap)
}

pub(crate) fn frustration(inputs: &FrustrationInputs, weights: &FrustrationWeights) -> u8 {
    let pacing = if inputs.average_delay_ms > weights.very_slow_delay_ms {
        2.0
    } else if inputs.average_delay_ms > weights.slow_delay_ms {
        1.0
    } else {
        0.0
    };

    let sum = capped(inputs.final_errors, weights.final_errors)
        + capped(inputs.mistakes_made, weights.mistakes_made)
        + capped(inputs.deletions, weights.deletions)
        + capped(inputs.corrections, weights.corrections)
        + capped(inputs.language_switches, weights.language_switches)
        + capped(inputs.punctuation_confusions, weights.punctuation_confusions)
        + pacing
        + if inputs.cheat_flagged { weights.cheat_flat } else { 0.0 };

    let ceiling = weights.ceiling.min(FRUSTRATION_LIMIT as f64);
    sum.min(ceiling).max(0.0).round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CheatThresholds;
    use crate::session::KeystrokeEntry;

    fn calm() -> FrustrationInputs {
        FrustrationInputs {
            final_errors: 0,
            mistakes_made: 0,
            deletions: 0,
            corrections: 0,
            language_switches: 0,
            punctuation_confusions: 0,
            average_delay_ms: 150,
            cheat_flagged: false,
        }
    }

    fn state_with_input(input: &str, started_at: u64) -> SessionState {
        let mut state = SessionState::new(started_at, CheatThresholds::default());
        state.input = input.to_string();
        state
    }

    #[test]
    fn test_frustration_calm_is_zero() {
        assert_eq!(frustration(&calm(), &FrustrationWeights::default()), 0);
    }

    #[test]
    fn test_frustration_each_term_is_capped() {
        let inputs = FrustrationInputs {
            final_errors: 1_000,
            mistakes_made: 1_000,
            deletions: 1_000,
            corrections: 1_000,
            language_switches: 1_000,
            punctuation_confusions: 1_000,
            average_delay_ms: 150,
            cheat_flagged: false,
        };
        // 3 + 3 + 2 + 1 + 1 + 1
        assert_eq!(frustration(&inputs, &FrustrationWeights::default()), 10);
    }

    #[test]
    fn test_frustration_total_is_capped_at_ten() {
        let inputs = FrustrationInputs {
            final_errors: 100,
            mistakes_made: 100,
            average_delay_ms: 4_000,
            cheat_flagged: true,
            ..calm()
        };
        assert_eq!(frustration(&inputs, &FrustrationWeights::default()), 10);
    }

    #[test]
    fn test_frustration_pacing_bands() {
        let w = FrustrationWeights::default();
        let slow = FrustrationInputs {
            average_delay_ms: 2_500,
            ..calm()
        };
        let very_slow = FrustrationInputs {
            average_delay_ms: 3_500,
            ..calm()
        };
        assert_eq!(frustration(&slow, &w), 1);
        assert_eq!(frustration(&very_slow, &w), 2);
    }

    #[test]
    fn test_frustration_rounds_the_sum() {
        // 4 * 0.25 + 4 * 0.15 = 1.6
        let inputs = FrustrationInputs {
            final_errors: 4,
            mistakes_made: 4,
            ..calm()
        };
        assert_eq!(frustration(&inputs, &FrustrationWeights::default()), 2);
    }

    #[test]
    fn test_wpm_uses_minimum_elapsed_floor() {
        let s = AnalyzerSettings::default();
        // 5 words in 1 second: floored to 0.1 minutes
        assert_eq!(words_per_minute(5, 1_000, false, &s), 50);
    }

    #[test]
    fn test_wpm_is_capped() {
        let s = AnalyzerSettings::default();
        assert_eq!(words_per_minute(400, 60_000, false, &s), 150);
    }

    #[test]
    fn test_wpm_cheat_penalty_applies_before_cap() {
        let s = AnalyzerSettings::default();
        // 400 -> 120 after the penalty, under the cap
        assert_eq!(words_per_minute(400, 60_000, true, &s), 120);
        assert_eq!(words_per_minute(40, 60_000, true, &s), 12);
    }

    #[test]
    fn test_compute_accuracy_and_errors() {
        let reference = normalize("abcd");
        let state = state_with_input("abxd", 0);
        let m = TypingMetrics::compute(&state, &reference, &AnalyzerSettings::default(), 60_000);
        assert_eq!(m.total_errors(), 1);
        assert_eq!(m.final_errors(), 1);
        assert_eq!(m.accuracy(), 75);
        assert_eq!(m.total_mistakes_made(), 1);
        assert_eq!(m.wpm(), 1);
    }

    #[test]
    fn test_compute_empty_input_is_fully_accurate() {
        let reference = normalize("abcd");
        let state = state_with_input("   ", 0);
        let m = TypingMetrics::compute(&state, &reference, &AnalyzerSettings::default(), 1_000);
        assert_eq!(m.accuracy(), 100);
        assert_eq!(m.wpm(), 0);
        assert_eq!(m.frustration_score(), 0);
    }

    #[test]
    fn test_compute_cheat_penalties() {
        let reference = normalize("abcd");
        let mut state = state_with_input("abcd", 0);
        state.cheat.flag(crate::cheat::CheatReason::Clipboard);
        let m = TypingMetrics::compute(&state, &reference, &AnalyzerSettings::default(), 60_000);
        assert_eq!(m.accuracy(), 70);
        assert_eq!(m.frustration_score(), 3);
    }

    #[test]
    fn test_compute_average_delay_excludes_outliers() {
        let reference = normalize("ab");
        let mut state = state_with_input("ab", 0);
        for delay_ms in [0, 100, 300, 9_000] {
            state.keystrokes.push(KeystrokeEntry {
                character: Some('a'),
                timestamp: 0,
                cursor_position: 1,
                is_deletion: false,
                delay_ms,
            });
        }
        let m = TypingMetrics::compute(&state, &reference, &AnalyzerSettings::default(), 1_000);
        assert_eq!(m.average_delay_ms(), 200);
    }

    #[test]
    fn test_serde_roundtrip_keeps_camel_case() {
        let reference = normalize("hello");
        let state = state_with_input("hellp", 0);
        let m = TypingMetrics::compute(&state, &reference, &AnalyzerSettings::default(), 30_000);
        let json = serde_json::to_value(&m).unwrap();
        assert_eq!(json["totalMistakesMade"], 1);
        assert_eq!(json["averageDelayMs"], 0);
        let back: TypingMetrics = serde_json::from_value(json).unwrap();
        assert_eq!(back, m);
    }

    #[test]
    fn test_deserialize_rejects_out_of_bounds() {
        let json = serde_json::json!({
            "totalErrors": 0, "languageErrors": 0, "punctuationErrors": 0,
            "deletions": 0, "corrections": 0, "languageSwitches": 0,
            "averageDelayMs": 0, "frustrationScore": 11, "totalMistakesMade": 0,
            "finalErrors": 0, "accuracy": 100, "wpm": 40
        });
        assert!(serde_json::from_value::<TypingMetrics>(json).is_err());
    }

    #[test]
    fn test_deserialize_rejects_more_final_errors_than_mistakes() {
        let json = serde_json::json!({
            "totalErrors": 3, "languageErrors": 0, "punctuationErrors": 0,
            "deletions": 0, "corrections": 0, "languageSwitches": 0,
            "averageDelayMs": 0, "frustrationScore": 1, "totalMistakesMade": 2,
            "finalErrors": 3, "accuracy": 90, "wpm": 40
        });
        assert!(serde_json::from_value::<TypingMetrics>(json).is_err());
    }
}
