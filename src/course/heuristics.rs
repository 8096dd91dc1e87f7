//! Advisory text heuristics.
//!
//! Keyword counts and word-length ratios only; used to pick a fallback level
//! when the model gives none. Not a contract.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Difficulty::Beginner => f.write_str("Beginner"),
            Difficulty::Intermediate => f.write_str("Intermediate"),
            Difficulty::Advanced => f.write_str("Advanced"),
        }
    }
}

const ADVANCED_INDICATORS: &[&str] = &["advanced", "complex", "sophisticated", "expert", "master"];
const BEGINNER_INDICATORS: &[&str] = &[
    "introduction",
    "basic",
    "fundamental",
    "getting started",
    "beginner",
];
const TECHNICAL_INDICATORS: &[&str] = &[
    "algorithm",
    "analysis",
    "implementation",
    "architecture",
    "methodology",
];

fn count_indicators(text: &str, indicators: &[&str]) -> usize {
    indicators.iter().filter(|i| text.contains(*i)).count()
}

/// Keyword vote between beginner and advanced vocabulary
pub fn assess_difficulty(text: &str) -> Difficulty {
    let lower = text.to_lowercase();
    let advanced = count_indicators(&lower, ADVANCED_INDICATORS);
    let beginner = count_indicators(&lower, BEGINNER_INDICATORS);

    if advanced > beginner {
        Difficulty::Advanced
    } else if beginner > 0 {
        Difficulty::Beginner
    } else {
        Difficulty::Intermediate
    }
}

/// Score in `[0, 1]` from sentence length, long-word ratio and technical terms
pub fn estimate_complexity_score(text: &str) -> f64 {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.is_empty() {
        return 0.0;
    }

    let sentences = text.split('.').count().max(1);
    let avg_sentence_length = words.len() as f64 / sentences as f64;

    let long_words = words.iter().filter(|w| w.chars().count() > 6).count();
    let long_ratio = long_words as f64 / words.len() as f64;

    let technical = count_indicators(&text.to_lowercase(), TECHNICAL_INDICATORS) as f64;

    ((avg_sentence_length / 20.0) * 0.4 + long_ratio * 0.4 + (technical / 10.0) * 0.2).min(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assess_difficulty() {
        assert_eq!(
            assess_difficulty("An introduction to the basic syntax"),
            Difficulty::Beginner
        );
        assert_eq!(
            assess_difficulty("Advanced and complex expert techniques, with a basic recap"),
            Difficulty::Advanced
        );
        assert_eq!(assess_difficulty("Cooking pasta at home"), Difficulty::Intermediate);
    }

    #[test]
    fn test_complexity_score_bounds() {
        assert_eq!(estimate_complexity_score(""), 0.0);
        let simple = estimate_complexity_score("I can run. You can run. We run.");
        let dense = estimate_complexity_score(
            "Architecture analysis requires understanding implementation methodology \
             alongside sophisticated algorithmic considerations and distributed consensus",
        );
        assert!(simple < dense);
        assert!((0.0..=1.0).contains(&dense));
    }
}
