//! End-of-race analysis
//!
//! Rule-based strengths, limitations and improvement hints for the user's
//! deck and finishing gap.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::cards::{Card, Stat, average_stat};

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Analysis {
    pub strengths: Vec<String>,
    pub limitations: Vec<String>,
    pub improvements: Vec<String>,
}

fn lines(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Analysis {
    /// Used when the deck is empty
    pub fn missing_cards() -> Self {
        Self {
            strengths: Vec::new(),
            limitations: lines(&["Card data was missing, analysis could not be generated."]),
            improvements: lines(&["Please draw cards and try again."]),
        }
    }

    /// Used when the analyst fails on a completed race
    pub fn fallback() -> Self {
        Self {
            strengths: lines(&["Run completed"]),
            limitations: lines(&["Analysis module is temporarily unavailable"]),
            improvements: lines(&["Refine narrative rules and feedback next"]),
        }
    }

    /// Used when the race itself could not complete
    pub fn engine_failure() -> Self {
        Self {
            strengths: Vec::new(),
            limitations: lines(&["The race engine encountered an error and exited"]),
            improvements: lines(&["Check the race engine and data shapes"]),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisError {
    NonFinitePosition { user: f64, opponent: f64 },
}

impl fmt::Display for AnalysisError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NonFinitePosition { user, opponent } => {
                write!(f, "non-finite finishing position (user={user}, opponent={opponent})")
            }
        }
    }
}

impl std::error::Error for AnalysisError {}

/// Produces the end-of-race analysis
pub trait Analyst {
    fn analyze(
        &self,
        cards: &[Card],
        user_position: f64,
        opponent_position: f64,
    ) -> Result<Analysis, AnalysisError>;
}

/// Stock threshold rules
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleAnalyst;

impl Analyst for RuleAnalyst {
    fn analyze(
        &self,
        cards: &[Card],
        user_position: f64,
        opponent_position: f64,
    ) -> Result<Analysis, AnalysisError> {
        generate_analysis(cards, user_position, opponent_position)
    }
}

pub fn generate_analysis(
    cards: &[Card],
    user_position: f64,
    opponent_position: f64,
) -> Result<Analysis, AnalysisError> {
    if !user_position.is_finite() || !opponent_position.is_finite() {
        return Err(AnalysisError::NonFinitePosition {
            user: user_position,
            opponent: opponent_position,
        });
    }
    if cards.is_empty() {
        return Ok(Analysis::missing_cards());
    }

    let stability = average_stat(cards, Stat::Stability);
    let burst = average_stat(cards, Stat::Burst);
    let delay = average_stat(cards, Stat::Delay);
    let predictability = average_stat(cards, Stat::Predictability);

    let pick = |rules: &[(bool, &str)]| -> Vec<String> {
        rules
            .iter()
            .filter(|(hit, _)| *hit)
            .map(|(_, line)| line.to_string())
            .collect()
    };

    let strengths = pick(&[
        (stability > 80.0, "Your network is highly stable and keeps a steady connection."),
        (burst > 75.0, "Your network bursts fast and responds quickly."),
        (delay < 20.0, "Latency is very low and responses are snappy."),
        (predictability > 80.0, "Behavior is predictable with consistent performance."),
    ]);
    let limitations = pick(&[
        (stability < 60.0, "Stability is below average, with noticeable fluctuations."),
        (burst < 50.0, "Burst capacity is limited during spikes."),
        (delay > 50.0, "Latency is high and needs improvement."),
        (predictability < 60.0, "Performance is hard to predict and needs steadier behavior."),
    ]);
    let improvements = if user_position < opponent_position {
        pick(&[
            (true, "Consider higher-rarity cards to improve overall quality."),
            (stability < 70.0, "Prioritize configurations with higher stability."),
            (delay > 30.0, "Reduce latency by choosing a better route."),
        ])
    } else {
        pick(&[
            (true, "Keep the current setup and maintain your advantage."),
            (burst < 70.0, "Consider boosting burst performance."),
        ])
    };

    Ok(Analysis {
        strengths,
        limitations,
        improvements,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::find_card;

    fn deck(ids: &[&str]) -> Vec<Card> {
        ids.iter().filter_map(|id| find_card(id)).collect()
    }

    #[test]
    fn test_empty_deck_reports_missing_data() {
        let analysis = generate_analysis(&[], 50.0, 40.0).unwrap();
        assert_eq!(analysis, Analysis::missing_cards());
        assert!(analysis.strengths.is_empty());
    }

    #[test]
    fn test_strong_deck_leading() {
        let cards = deck(&["pl-ssr-1", "jit-ssr-1", "lat-ssr-1"]);
        let analysis = generate_analysis(&cards, 100.0, 90.0).unwrap();
        assert_eq!(analysis.strengths.len(), 4);
        assert!(analysis.limitations.is_empty());
        assert_eq!(
            analysis.improvements,
            vec!["Keep the current setup and maintain your advantage.".to_string()]
        );
    }

    #[test]
    fn test_weak_deck_trailing() {
        let cards = deck(&["pl-r-1", "lat-r-1", "jit-r-1"]);
        let analysis = generate_analysis(&cards, 80.0, 95.0).unwrap();
        assert!(analysis.strengths.is_empty());
        assert_eq!(analysis.limitations.len(), 4);
        assert_eq!(
            analysis.improvements,
            lines(&[
                "Consider higher-rarity cards to improve overall quality.",
                "Prioritize configurations with higher stability.",
                "Reduce latency by choosing a better route.",
            ])
        );
    }

    #[test]
    fn test_level_finish_counts_as_holding() {
        let cards = deck(&["bw-r-1"]);
        let analysis = generate_analysis(&cards, 70.0, 70.0).unwrap();
        assert_eq!(analysis.improvements[0], "Keep the current setup and maintain your advantage.");
        assert_eq!(analysis.improvements[1], "Consider boosting burst performance.");
    }

    #[test]
    fn test_non_finite_positions_fail() {
        let cards = deck(&["bw-ssr-1"]);
        let err = RuleAnalyst.analyze(&cards, f64::NAN, 10.0).unwrap_err();
        assert!(matches!(err, AnalysisError::NonFinitePosition { .. }));
        assert!(err.to_string().contains("non-finite"));
    }
}
