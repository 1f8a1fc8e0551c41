//! Gamified typing score.
//!
//! Scoring is a pure function of a [`TypingMetrics`] value: start at 100,
//! take one bounded deduction per category, and never go below 1. The tiers
//! are configuration, so revisions of the weights do not touch this code.

use serde::{Deserialize, Serialize};

use crate::metrics::TypingMetrics;

pub const STARTING_SCORE: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum_macros::Display)]
#[serde(rename_all = "snake_case")]
pub enum ScoreCategory {
    #[strum(serialize = "Typing Speed")]
    Speed,
    #[strum(serialize = "Accuracy")]
    Accuracy,
    #[strum(serialize = "Language Errors")]
    LanguageErrors,
    #[strum(serialize = "Total Mistakes")]
    TotalMistakes,
    #[strum(serialize = "Frustration Level")]
    Frustration,
}

impl ScoreCategory {
    fn value(&self, m: &TypingMetrics) -> u64 {
        match self {
            ScoreCategory::Speed => m.wpm() as u64,
            ScoreCategory::Accuracy => m.accuracy() as u64,
            ScoreCategory::LanguageErrors => m.language_errors() as u64,
            ScoreCategory::TotalMistakes => m.total_mistakes_made() as u64,
            ScoreCategory::Frustration => m.frustration_score() as u64,
        }
    }

    fn reason(&self, m: &TypingMetrics) -> String {
        match self {
            ScoreCategory::Speed => format!("{} WPM (below average)", m.wpm()),
            ScoreCategory::Accuracy => format!("{}% accuracy", m.accuracy()),
            ScoreCategory::LanguageErrors => format!("{} language errors", m.language_errors()),
            ScoreCategory::TotalMistakes => format!("{} mistakes", m.total_mistakes_made()),
            ScoreCategory::Frustration => format!("{}/10 frustration", m.frustration_score()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Comparison {
    /// Tier applies when the metric is strictly below the bound.
    Below,
    /// Tier applies when the metric is strictly above the bound.
    Above,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PenaltyTier {
    pub bound: u64,
    pub penalty: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRule {
    pub category: ScoreCategory,
    pub comparison: Comparison,
    pub tiers: Vec<PenaltyTier>,
    pub cap: u32,
}

impl CategoryRule {
    fn new(category: ScoreCategory, comparison: Comparison, tiers: &[(u64, u32)], cap: u32) -> Self {
        Self {
            category,
            comparison,
            tiers: tiers
                .iter()
                .map(|&(bound, penalty)| PenaltyTier { bound, penalty })
                .collect(),
            cap,
        }
    }

    /// Largest penalty among matching tiers, bounded by the cap.
    pub fn penalty(&self, value: u64) -> u32 {
        self.tiers
            .iter()
            .filter(|t| match self.comparison {
                Comparison::Below => value < t.bound,
                Comparison::Above => value > t.bound,
            })
            .map(|t| t.penalty)
            .max()
            .unwrap_or(0)
            .min(self.cap)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoringRules {
    pub rules: Vec<CategoryRule>,
}

impl Default for ScoringRules {
    fn default() -> Self {
        use Comparison::*;
        use ScoreCategory::*;

        Self {
            rules: vec![
                CategoryRule::new(Speed, Below, &[(15, 25), (25, 15), (35, 8)], 25),
                CategoryRule::new(Accuracy, Below, &[(70, 35), (80, 25), (90, 15), (95, 6)], 35),
                CategoryRule::new(LanguageErrors, Above, &[(20, 15), (10, 10), (5, 5)], 15),
                CategoryRule::new(TotalMistakes, Above, &[(80, 15), (60, 12), (40, 8), (20, 4)], 15),
                CategoryRule::new(Frustration, Above, &[(8, 15), (6, 12), (4, 8), (2, 4)], 15),
            ],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deduction {
    pub category: ScoreCategory,
    pub reason: String,
    pub penalty: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreReport {
    pub final_score: u32,
    pub total_penalty: u32,
    pub breakdown: Vec<Deduction>,
}

impl ScoreReport {
    pub fn level(&self) -> ScoreLevel {
        ScoreLevel::from_score(self.final_score)
    }
}

/// Score with the default rules.
pub fn score_from_metrics(metrics: &TypingMetrics) -> ScoreReport {
    score_with_rules(&ScoringRules::default(), metrics)
}

pub fn score_with_rules(rules: &ScoringRules, metrics: &TypingMetrics) -> ScoreReport {
    let breakdown: Vec<Deduction> = rules
        .rules
        .iter()
        .filter_map(|rule| {
            let penalty = rule.penalty(rule.category.value(metrics));
            (penalty > 0).then(|| Deduction {
                category: rule.category,
                reason: rule.category.reason(metrics),
                penalty,
            })
        })
        .collect();

    let total_penalty: u32 = breakdown.iter().map(|d| d.penalty).sum();
    let final_score = STARTING_SCORE.saturating_sub(total_penalty).clamp(1, STARTING_SCORE);

    ScoreReport {
        final_score,
        total_penalty,
        breakdown,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum ScoreLevel {
    #[strum(serialize = "Excellent!")]
    Excellent,
    Good,
    Average,
    #[strum(serialize = "Needs Improvement")]
    NeedsImprovement,
    #[strum(serialize = "Poor - Significant Issues")]
    Poor,
}

impl ScoreLevel {
    pub fn from_score(score: u32) -> Self {
        match score {
            85..=u32::MAX => ScoreLevel::Excellent,
            70..=84 => ScoreLevel::Good,
            55..=69 => ScoreLevel::Average,
            40..=54 => ScoreLevel::NeedsImprovement,
            _ => ScoreLevel::Poor,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum SpeedLevel {
    #[strum(serialize = "Very Slow")]
    VerySlow,
    #[strum(serialize = "Below Average")]
    BelowAverage,
    Average,
    #[strum(serialize = "Above Average")]
    AboveAverage,
    Fast,
    Professional,
}

impl SpeedLevel {
    pub fn from_wpm(wpm: u32) -> Self {
        match wpm {
            0..=24 => SpeedLevel::VerySlow,
            25..=34 => SpeedLevel::BelowAverage,
            35..=44 => SpeedLevel::Average,
            45..=59 => SpeedLevel::AboveAverage,
            60..=79 => SpeedLevel::Fast,
            _ => SpeedLevel::Professional,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum FrustrationLevel {
    #[strum(serialize = "Very Calm")]
    VeryCalm,
    Normal,
    Frustrated,
    #[strum(serialize = "Very Frustrated")]
    VeryFrustrated,
    #[strum(serialize = "Extremely Frustrated")]
    ExtremelyFrustrated,
}

impl FrustrationLevel {
    pub fn from_score(score: u8) -> Self {
        match score {
            0..=2 => FrustrationLevel::VeryCalm,
            3..=4 => FrustrationLevel::Normal,
            5..=6 => FrustrationLevel::Frustrated,
            7..=8 => FrustrationLevel::VeryFrustrated,
            _ => FrustrationLevel::ExtremelyFrustrated,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn metrics(wpm: u32, accuracy: u32, language_errors: usize, mistakes: usize, frustration: u8) -> TypingMetrics {
        serde_json::from_value(json!({
            "totalErrors": language_errors, "languageErrors": language_errors,
            "punctuationErrors": 0, "deletions": 0, "corrections": 0,
            "languageSwitches": 0, "averageDelayMs": 180,
            "frustrationScore": frustration, "totalMistakesMade": mistakes.max(language_errors),
            "finalErrors": language_errors, "accuracy": accuracy, "wpm": wpm
        }))
        .unwrap()
    }

    #[test]
    fn test_clean_run_keeps_full_score() {
        let report = score_from_metrics(&metrics(45, 96, 0, 0, 1));
        assert_eq!(report.final_score, 100);
        assert!(report.breakdown.is_empty());
        assert_eq!(report.total_penalty, 0);
        assert_eq!(report.level(), ScoreLevel::Excellent);
    }

    #[test]
    fn test_deduction_table() {
        let cases = [
            // (wpm, acc, lang, mistakes, frustration, expected score)
            (30, 100, 0, 0, 0, 92),
            (20, 100, 0, 0, 0, 85),
            (10, 100, 0, 0, 0, 75),
            (50, 94, 0, 0, 0, 94),
            (50, 85, 0, 0, 0, 85),
            (50, 75, 0, 0, 0, 75),
            (50, 60, 0, 0, 0, 65),
            (50, 100, 6, 6, 0, 95),
            (50, 100, 11, 11, 0, 90),
            (50, 100, 25, 25, 0, 81),
            (50, 100, 0, 45, 0, 92),
            (50, 100, 0, 90, 0, 85),
            (50, 100, 0, 0, 3, 96),
            (50, 100, 0, 0, 9, 85),
        ];
        for (wpm, acc, lang, mistakes, frustration, expected) in cases {
            let report = score_from_metrics(&metrics(wpm, acc, lang, mistakes, frustration));
            assert_eq!(
                report.final_score, expected,
                "wpm={wpm} acc={acc} lang={lang} mistakes={mistakes} frustration={frustration}"
            );
            assert_eq!(report.final_score + report.total_penalty, 100);
        }
    }

    #[test]
    fn test_score_never_below_one() {
        let report = score_from_metrics(&metrics(5, 10, 30, 100, 10));
        assert_eq!(report.total_penalty, 25 + 35 + 15 + 15 + 15);
        assert_eq!(report.final_score, 1);
        assert_eq!(report.breakdown.len(), 5);
        assert_eq!(report.level(), ScoreLevel::Poor);
    }

    #[test]
    fn test_breakdown_entries_name_their_cause() {
        let report = score_from_metrics(&metrics(22, 88, 0, 0, 0));
        assert_eq!(
            report.breakdown,
            vec![
                Deduction {
                    category: ScoreCategory::Speed,
                    reason: "22 WPM (below average)".into(),
                    penalty: 15,
                },
                Deduction {
                    category: ScoreCategory::Accuracy,
                    reason: "88% accuracy".into(),
                    penalty: 15,
                },
            ]
        );
        assert_eq!(ScoreCategory::Speed.to_string(), "Typing Speed");
    }

    #[test]
    fn test_cap_bounds_misconfigured_tiers() {
        let rule = CategoryRule::new(ScoreCategory::Speed, Comparison::Below, &[(100, 80)], 20);
        assert_eq!(rule.penalty(10), 20);
        assert_eq!(rule.penalty(100), 0);
    }

    #[test]
    fn test_custom_rules() {
        let rules = ScoringRules {
            rules: vec![CategoryRule::new(
                ScoreCategory::Frustration,
                Comparison::Above,
                &[(0, 50)],
                50,
            )],
        };
        let report = score_with_rules(&rules, &metrics(10, 10, 0, 0, 1));
        assert_eq!(report.final_score, 50);
    }

    #[test]
    fn test_is_deterministic() {
        let m = metrics(33, 91, 7, 30, 5);
        assert_eq!(score_from_metrics(&m), score_from_metrics(&m));
    }

    #[test]
    fn test_levels() {
        assert_eq!(ScoreLevel::from_score(85), ScoreLevel::Excellent);
        assert_eq!(ScoreLevel::from_score(70), ScoreLevel::Good);
        assert_eq!(ScoreLevel::from_score(55), ScoreLevel::Average);
        assert_eq!(ScoreLevel::from_score(40), ScoreLevel::NeedsImprovement);
        assert_eq!(ScoreLevel::from_score(39), ScoreLevel::Poor);
        assert_eq!(SpeedLevel::from_wpm(24), SpeedLevel::VerySlow);
        assert_eq!(SpeedLevel::from_wpm(80), SpeedLevel::Professional);
        assert_eq!(SpeedLevel::AboveAverage.to_string(), "Above Average");
        assert_eq!(FrustrationLevel::from_score(2), FrustrationLevel::VeryCalm);
        assert_eq!(FrustrationLevel::from_score(9), FrustrationLevel::ExtremelyFrustrated);
    }
}
