use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::app_dirs::AppDirs;
use crate::scoring::ScoringRules;

/// Thresholds for the typing-pattern cheat heuristics.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CheatThresholds {
    /// Characters typed before frequency skew is considered.
    pub min_sample: usize,
    /// Largest share of all typed characters a single character may take.
    pub max_char_share: f64,
    pub max_wpm: f64,
    /// Words that must be typed before the speed check applies.
    pub min_words_for_speed: usize,
    pub repetition_window: usize,
    /// Lower bound on elapsed minutes used by the live speed check.
    pub speed_min_minutes: f64,
}

impl Default for CheatThresholds {
    fn default() -> Self {
        Self {
            min_sample: 20,
            max_char_share: 0.3,
            max_wpm: 200.0,
            min_words_for_speed: 10,
            repetition_window: 5,
            speed_min_minutes: 0.01,
        }
    }
}

/// Weight and cap of each frustration contribution.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FrustrationWeights {
    pub final_errors: (f64, f64),
    pub mistakes_made: (f64, f64),
    pub deletions: (f64, f64),
    pub corrections: (f64, f64),
    pub language_switches: (f64, f64),
    pub punctuation_confusions: (f64, f64),
    pub slow_delay_ms: u64,
    pub very_slow_delay_ms: u64,
    pub cheat_flat: f64,
    pub ceiling: f64,
}

impl Default for FrustrationWeights {
    fn default() -> Self {
        Self {
            final_errors: (0.25, 3.0),
            mistakes_made: (0.15, 3.0),
            deletions: (0.15, 2.0),
            corrections: (0.05, 1.0),
            language_switches: (0.1, 1.0),
            punctuation_confusions: (0.2, 1.0),
            slow_delay_ms: 2000,
            very_slow_delay_ms: 3000,
            cheat_flat: 3.0,
            ceiling: 10.0,
        }
    }
}

/// Tunables of the typing session analyzer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AnalyzerSettings {
    pub cheat: CheatThresholds,
    pub frustration: FrustrationWeights,
    /// Fraction of the reference that must be typed before finalize succeeds.
    pub completion_ratio: f64,
    pub wpm_ceiling: u32,
    pub wpm_min_minutes: f64,
    pub cheat_wpm_factor: f64,
    pub cheat_accuracy_penalty: u32,
    /// Flagged sessions below this accuracy are rejected outright.
    pub invalid_accuracy_floor: u32,
    pub max_valid_delay_ms: u64,
}

impl Default for AnalyzerSettings {
    fn default() -> Self {
        Self {
            cheat: CheatThresholds::default(),
            frustration: FrustrationWeights::default(),
            completion_ratio: 0.5,
            wpm_ceiling: 150,
            wpm_min_minutes: 0.1,
            cheat_wpm_factor: 0.3,
            cheat_accuracy_penalty: 30,
            invalid_accuracy_floor: 50,
            max_valid_delay_ms: 5000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub language_pair: String,
    pub exercise_number: usize,
    pub analyzer: AnalyzerSettings,
    pub scoring: ScoringRules,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            language_pair: "hebrew-english".to_string(),
            exercise_number: 1,
            analyzer: AnalyzerSettings::default(),
            scoring: ScoringRules::default(),
        }
    }
}

pub trait ConfigStore {
    fn load(&self) -> Config;
    fn save(&self, cfg: &Config) -> std::io::Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    pub fn new() -> Self {
        let path = AppDirs::config_path().unwrap_or_else(|| PathBuf::from("typeswitch_config.json"));
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> Config {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(_) => return Config::default(),
        };
        match serde_json::from_slice::<Config>(&bytes) {
            Ok(cfg) => cfg,
            Err(e) => {
                log::warn!("ignoring unreadable config {}: {}", self.path.display(), e);
                Config::default()
            }
        }
    }

    fn save(&self, cfg: &Config) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cfg)?;
        fs::write(&self.path, data)
    }
}
