use crate::lexicon::RelevanceKeywords;
use crate::models::{RawPosting, Zone};
use crate::text::{count_hits, fold_fields};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Floors, gates and penalties of the relevance rules.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RelevanceThresholds {
    pub single_strong_floor: f64,
    pub multi_strong_floor: f64,
    pub resolved_zone_floor: f64,
    pub medium_gate: f64,
    pub medium_floor: f64,
    pub negative_gate: f64,
    pub negative_penalty: f64,
    pub negative_floor: f64,
    pub baseline: f64,
}

impl Default for RelevanceThresholds {
    fn default() -> Self {
        Self {
            single_strong_floor: 0.85,
            multi_strong_floor: 1.0,
            resolved_zone_floor: 0.9,
            medium_gate: 0.5,
            medium_floor: 0.5,
            negative_gate: 0.8,
            negative_penalty: 0.3,
            negative_floor: 0.1,
            baseline: 0.3,
        }
    }
}

/// Keyword hit counts and zone evidence for one posting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct RelevanceSignals {
    pub strong_hits: usize,
    pub medium_hits: usize,
    pub negative_hits: usize,
    pub zone_in_region: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RelevanceRule {
    StrongKeywords,
    ResolvedZone,
    MediumKeywords,
    NegativeKeywords,
    ZeroFloor,
}

/// Rules in the order they are applied.
pub const RULE_ORDER: [RelevanceRule; 5] = [
    RelevanceRule::StrongKeywords,
    RelevanceRule::ResolvedZone,
    RelevanceRule::MediumKeywords,
    RelevanceRule::NegativeKeywords,
    RelevanceRule::ZeroFloor,
];

impl RelevanceRule {
    pub fn name(self) -> &'static str {
        match self {
            RelevanceRule::StrongKeywords => "strong_keywords",
            RelevanceRule::ResolvedZone => "resolved_zone",
            RelevanceRule::MediumKeywords => "medium_keywords",
            RelevanceRule::NegativeKeywords => "negative_keywords",
            RelevanceRule::ZeroFloor => "zero_floor",
        }
    }

    /// Applies this rule to the running score. Rules only raise to a floor,
    /// except the negative rule, which only lowers scores below its gate.
    pub fn apply(
        self,
        score: f64,
        signals: &RelevanceSignals,
        thresholds: &RelevanceThresholds,
    ) -> f64 {
        match self {
            RelevanceRule::StrongKeywords => match signals.strong_hits {
                0 => score,
                1 => score.max(thresholds.single_strong_floor),
                _ => score.max(thresholds.multi_strong_floor),
            },
            RelevanceRule::ResolvedZone => {
                if signals.zone_in_region {
                    score.max(thresholds.resolved_zone_floor)
                } else {
                    score
                }
            }
            RelevanceRule::MediumKeywords => {
                if score < thresholds.medium_gate && signals.medium_hits > 0 {
                    score.max(thresholds.medium_floor)
                } else {
                    score
                }
            }
            RelevanceRule::NegativeKeywords => {
                if signals.negative_hits > 0 && score < thresholds.negative_gate {
                    let penalty = thresholds.negative_penalty * signals.negative_hits as f64;
                    (score - penalty).max(thresholds.negative_floor)
                } else {
                    score
                }
            }
            RelevanceRule::ZeroFloor => {
                if score <= 0.0 {
                    thresholds.baseline
                } else {
                    score
                }
            }
        }
    }
}

impl fmt::Display for RelevanceRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RuleOutcome {
    pub rule: RelevanceRule,
    pub before: f64,
    pub after: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RelevanceAssessment {
    pub score: f64,
    pub signals: RelevanceSignals,
    pub trace: Vec<RuleOutcome>,
}

#[derive(Debug, Clone)]
pub struct RelevanceScorer {
    keywords: RelevanceKeywords,
    thresholds: RelevanceThresholds,
    rules: Vec<RelevanceRule>,
}

impl RelevanceScorer {
    pub fn new(keywords: RelevanceKeywords, thresholds: RelevanceThresholds) -> Self {
        Self {
            keywords,
            thresholds,
            rules: RULE_ORDER.to_vec(),
        }
    }

    pub fn signals(&self, posting: &RawPosting, zone: &Zone) -> RelevanceSignals {
        let text = fold_fields(&[
            &posting.title,
            &posting.location,
            &posting.company,
            &posting.description,
        ]);

        RelevanceSignals {
            strong_hits: count_hits(&text, &self.keywords.strong),
            medium_hits: count_hits(&text, &self.keywords.medium),
            negative_hits: count_hits(&text, &self.keywords.negative),
            zone_in_region: zone.is_target_region(),
        }
    }

    pub fn score(&self, posting: &RawPosting, zone: &Zone) -> RelevanceAssessment {
        let signals = self.signals(posting, zone);
        self.score_signals(signals)
    }

    /// Runs the rules over a running score starting at zero, then clamps to
    /// `[0, 1]` and rounds to two decimals.
    pub fn score_signals(&self, signals: RelevanceSignals) -> RelevanceAssessment {
        let mut running = 0.0;
        let mut trace = Vec::with_capacity(self.rules.len());

        for rule in &self.rules {
            let after = rule.apply(running, &signals, &self.thresholds);
            trace.push(RuleOutcome {
                rule: *rule,
                before: running,
                after,
            });
            running = after;
        }

        RelevanceAssessment {
            score: round_two_decimals(running.clamp(0.0, 1.0)),
            signals,
            trace,
        }
    }
}

fn round_two_decimals(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
