// src/core/score.rs

use crate::core::config::AuditConfig;
use crate::core::error::AuditError;
use crate::core::models::{ModuleKind, ModuleResults};
use serde::{Deserialize, Serialize};
use tracing::debug;

const WEIGHT_TOLERANCE: f64 = 1e-6;

/// Per-module weights of the composite score. Must sum to 1.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Weights {
    #[serde(default)]
    pub robots: f64,
    #[serde(default)]
    pub structure: f64,
    #[serde(default)]
    pub schema: f64,
    #[serde(default)]
    pub content: f64,
    #[serde(default)]
    pub eeat: f64,
    #[serde(default)]
    pub entities: f64,
    #[serde(default)]
    pub links: f64,
}

impl Weights {
    pub fn get(&self, module: ModuleKind) -> f64 {
        match module {
            ModuleKind::Robots => self.robots,
            ModuleKind::Structure => self.structure,
            ModuleKind::Schema => self.schema,
            ModuleKind::Content => self.content,
            ModuleKind::Eeat => self.eeat,
            ModuleKind::Entities => self.entities,
            ModuleKind::Links => self.links,
        }
    }

    fn all(&self) -> [f64; 7] {
        [
            self.robots,
            self.structure,
            self.schema,
            self.content,
            self.eeat,
            self.entities,
            self.links,
        ]
    }

    pub fn validate(&self) -> Result<(), AuditError> {
        if self.all().iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(AuditError::Policy("weights must be non-negative".to_string()));
        }
        let sum: f64 = self.all().iter().sum();
        if (sum - 1.0).abs() > WEIGHT_TOLERANCE {
            return Err(AuditError::Policy(format!("weights sum to {sum}, expected 1.0")));
        }
        Ok(())
    }
}

/// Tunable cut-offs used by the analyzers and the recommendation rules.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Thresholds {
    /// Minimum text-to-markup ratio (percent) for full content marks.
    pub text_ratio_floor: f64,
    pub page_size_ceiling: usize,
    pub broken_link_penalty: f64,
    pub link_sample_size: usize,
    pub freshness_days: i64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            text_ratio_floor: 10.0,
            page_size_ceiling: 500_000,
            broken_link_penalty: 10.0,
            link_sample_size: 20,
            freshness_days: 90,
        }
    }
}

/// A named, validated weight table plus thresholds.
#[derive(Debug, Clone, PartialEq)]
pub struct ScorePolicy {
    pub version: String,
    pub weights: Weights,
    pub thresholds: Thresholds,
}

impl ScorePolicy {
    /// Validates `weights` before accepting them.
    pub fn new(version: &str, weights: Weights, thresholds: Thresholds) -> Result<Self, AuditError> {
        weights.validate()?;
        Ok(Self {
            version: version.to_string(),
            weights,
            thresholds,
        })
    }

    /// The four-module weighting of the first release.
    pub fn v1() -> Self {
        Self {
            version: "v1".to_string(),
            weights: Weights {
                robots: 0.20,
                structure: 0.25,
                schema: 0.30,
                content: 0.0,
                eeat: 0.25,
                entities: 0.0,
                links: 0.0,
            },
            thresholds: Thresholds::default(),
        }
    }

    pub fn v2() -> Self {
        Self {
            version: "v2".to_string(),
            weights: Weights {
                robots: 0.15,
                structure: 0.20,
                schema: 0.20,
                content: 0.15,
                eeat: 0.15,
                entities: 0.0,
                links: 0.15,
            },
            thresholds: Thresholds::default(),
        }
    }

    pub fn named(name: &str) -> Result<Self, AuditError> {
        match name.trim().to_ascii_lowercase().as_str() {
            "v1" => Ok(Self::v1()),
            "v2" => Ok(Self::v2()),
            other => Err(AuditError::Policy(format!("unknown score policy '{other}'"))),
        }
    }

    /// The named policy, with its weights replaced by the configured ones.
    pub fn from_config(config: &AuditConfig) -> Result<Self, AuditError> {
        let base = Self::named(&config.score_policy)?;
        match config.weights {
            Some(weights) => Self::new(&format!("{}-custom", base.version), weights, base.thresholds),
            None => Ok(base),
        }
    }
}

impl Default for ScorePolicy {
    fn default() -> Self {
        Self::v2()
    }
}

/// `Σ weight × clamp(score_part)`, rounded to one decimal.
pub fn composite_score(modules: &ModuleResults, policy: &ScorePolicy) -> f64 {
    let parts: Vec<(ModuleKind, f64)> = modules
        .outcomes()
        .iter()
        .map(|o| (o.module(), o.score_part()))
        .collect();
    weighted_sum(&parts, &policy.weights)
}

pub fn weighted_sum(parts: &[(ModuleKind, f64)], weights: &Weights) -> f64 {
    let total: f64 = parts
        .iter()
        .map(|(module, part)| weights.get(*module) * part.clamp(0.0, 100.0))
        .sum();
    let score = ((total * 10.0).round() / 10.0).clamp(0.0, 100.0);
    debug!(score, "Composite score computed.");
    score
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    fn uniform(part: f64) -> Vec<(ModuleKind, f64)> {
        ModuleKind::iter().map(|m| (m, part)).collect()
    }

    #[test]
    fn builtin_policies_are_valid() {
        ScorePolicy::v1().weights.validate().unwrap();
        ScorePolicy::v2().weights.validate().unwrap();
        assert_eq!(ScorePolicy::v2().weights.entities, 0.0);
    }

    #[test]
    fn perfect_and_zero_parts() {
        let policy = ScorePolicy::v2();
        assert_eq!(weighted_sum(&uniform(100.0), &policy.weights), 100.0);
        assert_eq!(weighted_sum(&uniform(0.0), &policy.weights), 0.0);
    }

    #[test]
    fn composite_stays_in_range_for_out_of_range_parts() {
        let policy = ScorePolicy::v1();
        for part in [-50.0, 0.0, 33.3, 99.99, 100.0, 250.0] {
            let score = weighted_sum(&uniform(part), &policy.weights);
            assert!((0.0..=100.0).contains(&score), "{part} gave {score}");
        }
    }

    #[test]
    fn v1_matches_hand_computation() {
        let parts = vec![
            (ModuleKind::Robots, 100.0),
            (ModuleKind::Structure, 60.0),
            (ModuleKind::Schema, 50.0),
            (ModuleKind::Eeat, 30.0),
            (ModuleKind::Links, 0.0),
        ];
        // 20 + 15 + 15 + 7.5
        assert_eq!(weighted_sum(&parts, &ScorePolicy::v1().weights), 57.5);
    }

    #[test]
    fn custom_weights_are_validated() {
        let mut weights = ScorePolicy::v2().weights;
        weights.links = 0.5;
        let err = ScorePolicy::new("custom", weights, Thresholds::default()).unwrap_err();
        assert!(matches!(err, AuditError::Policy(_)));

        weights.links = -0.1;
        assert!(ScorePolicy::new("custom", weights, Thresholds::default()).is_err());
    }

    #[test]
    fn config_selects_policy() {
        let mut config = AuditConfig::default();
        config.score_policy = "V1".to_string();
        assert_eq!(ScorePolicy::from_config(&config).unwrap().version, "v1");

        config.score_policy = "v9".to_string();
        assert!(ScorePolicy::from_config(&config).is_err());

        config.score_policy = "v2".to_string();
        config.weights = Some(Weights {
            robots: 0.5,
            structure: 0.5,
            schema: 0.0,
            content: 0.0,
            eeat: 0.0,
            entities: 0.0,
            links: 0.0,
        });
        let policy = ScorePolicy::from_config(&config).unwrap();
        assert_eq!(policy.version, "v2-custom");
        assert_eq!(policy.weights.robots, 0.5);
    }
}
