use serde::{Deserialize, Serialize};

use crate::classify::ErrorRecord;
use crate::metrics::TypingMetrics;

/// Everything the host hands upward once an exercise is accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExercisePayload {
    pub exercise_number: usize,
    pub language_pair: String,
    pub reference_text: String,
    pub user_input: String,
    pub elapsed_ms: u64,
    pub errors: Vec<ErrorRecord>,
    pub deletions: usize,
    pub corrections: usize,
    pub language_switches: usize,
    pub metrics: TypingMetrics,
    pub cheat_flagged: bool,
}

impl ExercisePayload {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn from_json(s: &str) -> serde_json::Result<Self> {
        serde_json::from_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::TypingSession;
    use crate::config::AnalyzerSettings;

    #[test]
    fn test_payload_json_shape() {
        let mut s = TypingSession::start("a,b c", "french-english", 0, AnalyzerSettings::default());
        s.on_input_change("a", 100);
        s.on_input_change("a.", 300);
        s.on_input_change("a.b", 500);
        let payload = s.complete(2, 1_000).unwrap();

        let json: serde_json::Value = serde_json::from_str(&payload.to_json().unwrap()).unwrap();
        assert_eq!(json["exerciseNumber"], 2);
        assert_eq!(json["languagePair"], "french-english");
        assert_eq!(json["referenceText"], "a,b c");
        assert_eq!(json["errors"][0]["kind"], "punctuation");
        assert_eq!(json["errors"][0]["expected"], ",");
        assert_eq!(json["metrics"]["punctuationErrors"], 1);
        assert_eq!(json["cheatFlagged"], false);

        let back = ExercisePayload::from_json(&payload.to_json().unwrap()).unwrap();
        assert_eq!(back, payload);
    }
}
