use serde::Serialize;
use std::collections::BTreeSet;

use crate::cheat::CheatDetector;
use crate::config::CheatThresholds;
use crate::script::ScriptTag;

/// One input-change event as seen by the analyzer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KeystrokeEntry {
    /// Last character of the new input, `None` when the change was a deletion.
    pub character: Option<char>,
    pub timestamp: u64,
    pub cursor_position: usize,
    pub is_deletion: bool,
    pub delay_ms: u64,
}

/// Mutable state of one exercise attempt. A retake always gets a fresh one.
#[derive(Debug, Clone)]
pub struct SessionState {
    pub input: String,
    pub started_at: u64,
    pub last_event_at: u64,
    pub keystrokes: Vec<KeystrokeEntry>,
    pub mistake_positions: BTreeSet<usize>,
    pub corrected_positions: BTreeSet<usize>,
    /// Positions where an easily confused punctuation pair was typed.
    pub confusion_positions: BTreeSet<usize>,
    pub deletion_count: usize,
    pub language_switch_count: usize,
    pub last_script: Option<ScriptTag>,
    pub cheat: CheatDetector,
}

impl SessionState {
    pub fn new(started_at: u64, thresholds: CheatThresholds) -> Self {
        Self {
            input: String::new(),
            started_at,
            last_event_at: started_at,
            keystrokes: Vec::new(),
            mistake_positions: BTreeSet::new(),
            corrected_positions: BTreeSet::new(),
            confusion_positions: BTreeSet::new(),
            deletion_count: 0,
            language_switch_count: 0,
            last_script: None,
            cheat: CheatDetector::new(thresholds),
        }
    }

    pub fn cheat_flagged(&self) -> bool {
        self.cheat.is_flagged()
    }

    /// Delays usable as typing rhythm samples: positive and at most `max_ms`.
    pub fn rhythm_delays(&self, max_ms: u64) -> Vec<f64> {
        self.keystrokes
            .iter()
            .map(|k| k.delay_ms)
            .filter(|&d| d > 0 && d <= max_ms)
            .map(|d| d as f64)
            .collect()
    }
}
