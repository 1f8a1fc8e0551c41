use std::collections::BTreeSet;

use crate::cheat::{CheatReason, CheatWarning};
use crate::classify::{classify_errors, classify_mismatch, normalize, Classification};
use crate::clipboard::ClipboardAction;
use crate::config::AnalyzerSettings;
use crate::error::ValidationError;
use crate::metrics::TypingMetrics;
use crate::payload::ExercisePayload;
use crate::script::char_to_script_tag;
use crate::session::{KeystrokeEntry, SessionState};

/// One attempt at a typing exercise.
///
/// The session is the only writer of its input: every change goes through
/// [`TypingSession::on_input_change`], which diffs it against the last known
/// input. Timestamps are milliseconds on the host's monotonic clock.
#[derive(Debug, Clone)]
pub struct TypingSession {
    reference_text: String,
    reference: Vec<char>,
    language_pair: String,
    settings: AnalyzerSettings,
    state: SessionState,
}

impl TypingSession {
    pub fn start(
        reference_text: &str,
        language_pair: &str,
        started_at: u64,
        settings: AnalyzerSettings,
    ) -> Self {
        let reference_text = reference_text.trim().to_string();
        let reference = reference_text.chars().collect::<Vec<char>>();
        log::debug!(
            "starting {} session over {} characters",
            language_pair,
            reference.len()
        );

        Self {
            state: SessionState::new(started_at, settings.cheat.clone()),
            reference_text,
            reference,
            language_pair: language_pair.to_string(),
            settings,
        }
    }

    /// A fresh attempt over the same text; nothing carries over.
    pub fn restart(&self, now: u64) -> Self {
        Self::start(
            &self.reference_text,
            &self.language_pair,
            now,
            self.settings.clone(),
        )
    }

    pub fn reference_text(&self) -> &str {
        &self.reference_text
    }

    pub fn reference(&self) -> &[char] {
        &self.reference
    }

    pub fn language_pair(&self) -> &str {
        &self.language_pair
    }

    pub fn settings(&self) -> &AnalyzerSettings {
        &self.settings
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn input(&self) -> &str {
        &self.state.input
    }

    pub fn cheat_flagged(&self) -> bool {
        self.state.cheat_flagged()
    }

    pub fn cheat_reasons(&self) -> &[CheatReason] {
        self.state.cheat.reasons()
    }

    pub fn mistake_positions(&self) -> &BTreeSet<usize> {
        &self.state.mistake_positions
    }

    pub fn corrected_positions(&self) -> &BTreeSet<usize> {
        &self.state.corrected_positions
    }

    pub fn deletion_count(&self) -> usize {
        self.state.deletion_count
    }

    pub fn language_switch_count(&self) -> usize {
        self.state.language_switch_count
    }

    pub fn punctuation_confusion_count(&self) -> usize {
        self.state.confusion_positions.len()
    }

    pub fn keystrokes(&self) -> &[KeystrokeEntry] {
        &self.state.keystrokes
    }

    /// Current mismatches, freshly diffed.
    pub fn classify(&self) -> Classification {
        classify_errors(&self.reference, &self.state.input)
    }

    /// Length of the normalized input in characters.
    pub fn typed_len(&self) -> usize {
        normalize(&self.state.input).len()
    }

    /// Characters needed before the attempt can be completed.
    pub fn required_len(&self) -> usize {
        (self.reference.len() as f64 * self.settings.completion_ratio).ceil() as usize
    }

    pub fn can_complete(&self) -> bool {
        self.typed_len() >= self.required_len()
    }

    /// Typed share of the reference, 0 to 100.
    pub fn progress(&self) -> f64 {
        if self.reference.is_empty() {
            return 100.0;
        }
        (self.typed_len() as f64 / self.reference.len() as f64 * 100.0).min(100.0)
    }

    /// Apply the host's new input text. Returns a warning the first time the
    /// session gets flagged, and `None` otherwise.
    pub fn on_input_change(&mut self, new_input: &str, now: u64) -> Option<CheatWarning> {
        let previous = std::mem::take(&mut self.state.input);
        let previous_len = previous.chars().count();
        let new_len = new_input.chars().count();
        let is_deletion = new_len < previous_len;
        let mut warning = None;

        if is_deletion {
            self.state.deletion_count += previous_len - new_len;
        } else if new_len > previous_len {
            if let Some(c) = new_input.chars().last() {
                let elapsed = now.saturating_sub(self.state.started_at);
                warning = self.state.cheat.observe(c, new_input, elapsed);
                self.track_script(c);
                self.record_appended(&previous, new_input);
            }
        }
        // anything but a plain append may have fixed earlier mistakes
        if !new_input.starts_with(previous.as_str()) {
            self.record_corrections(&previous, new_input);
        }
        self.reconcile_positions(new_input);

        self.state.keystrokes.push(KeystrokeEntry {
            character: if is_deletion {
                None
            } else {
                new_input.chars().last()
            },
            timestamp: now,
            cursor_position: new_len,
            is_deletion,
            delay_ms: now.saturating_sub(self.state.last_event_at),
        });
        self.state.last_event_at = now;
        self.state.input = new_input.to_string();

        warning
    }

    /// A clipboard action reached the input surface. It never changes the
    /// input, but it always flags the session.
    pub fn reject_clipboard(&mut self, action: ClipboardAction) -> Option<CheatWarning> {
        log::warn!("rejected clipboard {} during exercise", action);
        self.state.cheat.flag(CheatReason::Clipboard)
    }

    /// Validate and compute the final metrics. Does not modify the session.
    pub fn finalize(&self, now: u64) -> Result<TypingMetrics, ValidationError> {
        let typed = self.typed_len();
        let required = self.required_len();
        if typed < required {
            log::debug!("finalize refused: {} of {} characters", typed, required);
            return Err(ValidationError::IncompleteInput { typed, required });
        }

        let metrics = TypingMetrics::compute(&self.state, &self.reference, &self.settings, now);
        if self.cheat_flagged() && metrics.accuracy() < self.settings.invalid_accuracy_floor {
            log::warn!(
                "finalize refused: flagged session at {}% accuracy",
                metrics.accuracy()
            );
            return Err(ValidationError::InvalidCheatSession {
                accuracy: metrics.accuracy(),
            });
        }

        log::info!(
            "{} session finalized: {} wpm, {}% accuracy, frustration {}",
            self.language_pair,
            metrics.wpm(),
            metrics.accuracy(),
            metrics.frustration_score()
        );
        Ok(metrics)
    }

    /// Finalize and package the attempt for the host.
    pub fn complete(&self, exercise_number: usize, now: u64) -> Result<ExercisePayload, ValidationError> {
        let metrics = self.finalize(now)?;

        Ok(ExercisePayload {
            exercise_number,
            language_pair: self.language_pair.clone(),
            reference_text: self.reference_text.clone(),
            user_input: self.state.input.clone(),
            elapsed_ms: now.saturating_sub(self.state.started_at),
            errors: self.classify().stamped(now),
            deletions: metrics.deletions(),
            corrections: metrics.corrections(),
            language_switches: metrics.language_switches(),
            cheat_flagged: self.cheat_flagged(),
            metrics,
        })
    }

    fn record_corrections(&mut self, previous: &str, current: &str) {
        let before = classify_errors(&self.reference, previous);
        let after: BTreeSet<usize> = classify_errors(&self.reference, current).positions().collect();

        for position in before.positions() {
            if !after.contains(&position) && self.state.mistake_positions.contains(&position) {
                if self.state.corrected_positions.insert(position) {
                    log::debug!("mistake at {} corrected", position);
                }
            }
        }
    }

    /// Edits inside the text can move a mismatch onto any position. Whatever
    /// is wrong now is a mistake and cannot count as corrected.
    fn reconcile_positions(&mut self, input: &str) {
        for position in classify_errors(&self.reference, input).positions() {
            self.state.mistake_positions.insert(position);
            if self.state.corrected_positions.remove(&position) {
                log::debug!("corrected position {} is wrong again", position);
            }
        }
    }

    fn track_script(&mut self, c: char) {
        if let Some(script) = char_to_script_tag(c) {
            if self.state.last_script.is_some_and(|last| last != script) {
                self.state.language_switch_count += 1;
            }
            self.state.last_script = Some(script);
        }
    }

    /// Check every normalized position the append revealed. Usually that is
    /// just the new character, but trailing whitespace held back by
    /// normalization surfaces together with it.
    fn record_appended(&mut self, previous: &str, input: &str) {
        let from = normalize(previous).len();
        let typed = normalize(input);

        for position in from..typed.len() {
            let Some(&expected) = self.reference.get(position) else {
                break;
            };
            let actual = typed[position];
            if actual != expected {
                self.state.mistake_positions.insert(position);
                self.state.corrected_positions.remove(&position);
                if classify_mismatch(position, expected, actual).confusable {
                    self.state.confusion_positions.insert(position);
                }
            }
        }
    }
}
