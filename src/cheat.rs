use itertools::Itertools;
use std::collections::HashMap;

use crate::config::CheatThresholds;

/// Why a session was flagged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum_macros::Display)]
pub enum CheatReason {
    #[strum(serialize = "frequency skew")]
    FrequencySkew,
    #[strum(serialize = "implausible speed")]
    ImplausibleSpeed,
    #[strum(serialize = "repetition")]
    Repetition,
    #[strum(serialize = "clipboard")]
    Clipboard,
}

/// A user-facing alert. At most one is produced per session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheatWarning {
    pub reason: CheatReason,
}

impl CheatWarning {
    pub fn message(&self) -> &'static str {
        match self.reason {
            CheatReason::FrequencySkew => {
                "Suspicious typing pattern detected! Please type the actual text, not random characters."
            }
            CheatReason::ImplausibleSpeed => {
                "Typing speed looks unrealistic. Please type the text yourself."
            }
            CheatReason::Repetition => {
                "Please type the actual text, not the same character repeatedly!"
            }
            CheatReason::Clipboard => "Copy/Paste is not allowed! Please type the text manually.",
        }
    }
}

/// Best-effort heuristics over the appended-character stream.
///
/// The flag is monotonic: once set it stays set for the life of the detector.
#[derive(Debug, Clone)]
pub struct CheatDetector {
    thresholds: CheatThresholds,
    frequency: HashMap<char, usize>,
    total: usize,
    flagged: bool,
    reasons: Vec<CheatReason>,
    warned: bool,
}

impl CheatDetector {
    pub fn new(thresholds: CheatThresholds) -> Self {
        Self {
            thresholds,
            frequency: HashMap::new(),
            total: 0,
            flagged: false,
            reasons: Vec::new(),
            warned: false,
        }
    }

    pub fn is_flagged(&self) -> bool {
        self.flagged
    }

    /// Distinct reasons in the order they first fired.
    pub fn reasons(&self) -> &[CheatReason] {
        &self.reasons
    }

    pub fn frequency(&self) -> &HashMap<char, usize> {
        &self.frequency
    }

    pub fn total_typed(&self) -> usize {
        self.total
    }

    /// Inspect a freshly appended character. `input` is the full text after
    /// the append and `elapsed_ms` the time since session start.
    pub fn observe(&mut self, c: char, input: &str, elapsed_ms: u64) -> Option<CheatWarning> {
        *self.frequency.entry(c).or_insert(0) += 1;
        self.total += 1;

        let mut warning = None;
        if self.frequency_skewed() {
            warning = warning.or(self.flag(CheatReason::FrequencySkew));
        }
        if self.speed_implausible(input, elapsed_ms) {
            warning = warning.or(self.flag(CheatReason::ImplausibleSpeed));
        }
        if self.repeated_tail(input) {
            warning = warning.or(self.flag(CheatReason::Repetition));
        }
        warning
    }

    /// Record a flag. Returns the warning to show, which happens only once per detector.
    pub fn flag(&mut self, reason: CheatReason) -> Option<CheatWarning> {
        if !self.flagged {
            log::info!("session flagged for {}", reason);
        }
        self.flagged = true;
        if !self.reasons.contains(&reason) {
            self.reasons.push(reason);
        }
        if self.warned {
            return None;
        }
        self.warned = true;
        Some(CheatWarning { reason })
    }

    fn frequency_skewed(&self) -> bool {
        if self.total <= self.thresholds.min_sample {
            return false;
        }
        let max = self.frequency.values().copied().max().unwrap_or(0);
        max as f64 / self.total as f64 > self.thresholds.max_char_share
    }

    fn speed_implausible(&self, input: &str, elapsed_ms: u64) -> bool {
        let minutes = (elapsed_ms as f64 / 60_000.0).max(self.thresholds.speed_min_minutes);
        let words = input.split_whitespace().count();
        words >= self.thresholds.min_words_for_speed
            && words as f64 / minutes > self.thresholds.max_wpm
    }

    fn repeated_tail(&self, input: &str) -> bool {
        let window = self.thresholds.repetition_window;
        if window == 0 {
            return false;
        }
        let tail: Vec<char> = input.chars().rev().take(window).collect();
        tail.len() == window && tail.iter().all_equal()
    }
}
