//! Comparison engine
//!
//! Combines technology profiles with the requirements-derived weight vector:
//! builds the trade-off matrix with per-dimension leader highlights, computes
//! weighted compatibility scores (with an explicit unweighted fallback path),
//! and surfaces the dimensions that materially differentiate the candidates.

use tracing::{debug, warn};

use crate::error::RefereeError;
use crate::types::{
    CompatibilityScore, Dimension, DimensionContribution, DimensionRating, DimensionScore,
    TechnologyProfile, TradeoffHighlight, TradeoffMatrix, WeightedCriteria,
};

/// Minimum score spread (on the 1-5 scale) for a dimension to count as a
/// differentiator
const MATERIALITY_THRESHOLD: f64 = 1.0;

/// Profiles with fewer scored dimensions than this are considered sparse
const MIN_SCORED_DIMENSIONS: usize = 3;

/// Weighted dimensions whose profile score is at least this read as strengths
const STRENGTH_SCORE: f64 = 4.0;

/// Weighted dimensions whose profile score is at most this read as concerns
const CONCERN_SCORE: f64 = 2.0;

/// Matrix, scores, and differentiators for one comparison run
#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
    pub matrix: TradeoffMatrix,
    pub compatibility_scores: Vec<CompatibilityScore>,
    pub key_differentiators: Vec<Dimension>,
}

/// Computes matrices and compatibility scores from profiles and weights
#[derive(Debug, Clone, Copy, Default)]
pub struct ComparisonEngine;

impl ComparisonEngine {
    pub fn new() -> Self {
        Self
    }

    /// Run the full comparison over the given profiles and dimensions
    pub fn generate(
        &self,
        profiles: &[TechnologyProfile],
        criteria: &WeightedCriteria,
        dimensions: &[Dimension],
    ) -> Result<Comparison, RefereeError> {
        self.check_data_sufficiency(profiles)?;

        let matrix = self.tradeoff_matrix(profiles, dimensions);
        let compatibility_scores = profiles
            .iter()
            .map(|p| self.compatibility(p, criteria))
            .collect();
        let key_differentiators = differentiators(&matrix);

        debug!(
            technologies = profiles.len(),
            dimensions = dimensions.len(),
            differentiators = key_differentiators.len(),
            "comparison generated"
        );
        Ok(Comparison {
            matrix,
            compatibility_scores,
            key_differentiators,
        })
    }

    /// Build the technology x dimension grid with leader highlights
    ///
    /// Cells without data stay empty; a tied top score yields no leader for
    /// that dimension.
    pub fn tradeoff_matrix(
        &self,
        profiles: &[TechnologyProfile],
        dimensions: &[Dimension],
    ) -> TradeoffMatrix {
        let technologies: Vec<String> = profiles.iter().map(|p| p.name.clone()).collect();

        let mut scores = Vec::with_capacity(profiles.len());
        let mut explanations = Vec::with_capacity(profiles.len());
        for profile in profiles {
            let mut row_scores = Vec::with_capacity(dimensions.len());
            let mut row_explanations = Vec::with_capacity(dimensions.len());
            for dim in dimensions {
                match profile.dimensions.get(dim) {
                    Some(DimensionRating::Scored(cell)) => {
                        row_scores.push(Some(cell.score));
                        row_explanations.push(cell.explanation.clone());
                    }
                    _ => {
                        row_scores.push(None);
                        row_explanations.push(format!("No data available for {}", dim));
                    }
                }
            }
            scores.push(row_scores);
            explanations.push(row_explanations);
        }

        let highlights = column_leaders(profiles, dimensions, &scores);

        TradeoffMatrix {
            technologies,
            dimensions: dimensions.to_vec(),
            scores,
            explanations,
            highlights,
        }
    }

    /// Weighted compatibility between one profile and the weight vector
    ///
    /// Sums score x weight over dimensions that are both scored and weighted,
    /// renormalized by the weight actually used so sparse profiles are not
    /// silently depressed. When no weighted dimension is scored, the explicit
    /// fallback path averages whatever scores exist, unweighted.
    pub fn compatibility(
        &self,
        profile: &TechnologyProfile,
        criteria: &WeightedCriteria,
    ) -> CompatibilityScore {
        let mut contributions = Vec::new();
        let mut weighted_sum = 0.0;
        let mut used_weight = 0.0;

        for (dim, weight) in &criteria.weights {
            if *weight <= 0.0 {
                continue;
            }
            if let Some(score) = profile.dimensions.get(dim).and_then(|r| r.score()) {
                let contribution = (score / DimensionScore::MAX) * weight;
                weighted_sum += contribution;
                used_weight += weight;
                contributions.push(DimensionContribution {
                    dimension: dim.clone(),
                    score,
                    weight: *weight,
                    contribution,
                });
            }
        }

        if used_weight > 0.0 {
            let score = weighted_sum / used_weight;
            let reasoning = reasoning_text(profile, &contributions, criteria, score, false);
            CompatibilityScore {
                technology: profile.name.clone(),
                score,
                contributions,
                used_fallback: false,
                reasoning,
            }
        } else {
            self.unweighted_fallback(profile, criteria)
        }
    }

    /// Secondary scoring path: unweighted average over whatever scored
    /// dimensions the profile has; neutral when none exist
    fn unweighted_fallback(
        &self,
        profile: &TechnologyProfile,
        criteria: &WeightedCriteria,
    ) -> CompatibilityScore {
        let scored: Vec<(&Dimension, f64)> = profile
            .dimensions
            .iter()
            .filter_map(|(d, r)| r.score().map(|s| (d, s)))
            .collect();

        warn!(
            technology = %profile.name,
            scored = scored.len(),
            "weighted scoring impossible, falling back to unweighted average"
        );

        let (score, contributions) = if scored.is_empty() {
            (0.5, Vec::new())
        } else {
            let share = 1.0 / scored.len() as f64;
            let contributions: Vec<DimensionContribution> = scored
                .iter()
                .map(|(dim, s)| DimensionContribution {
                    dimension: (*dim).clone(),
                    score: *s,
                    weight: 0.0,
                    contribution: (s / DimensionScore::MAX) * share,
                })
                .collect();
            let score = contributions.iter().map(|c| c.contribution).sum();
            (score, contributions)
        };

        let reasoning = reasoning_text(profile, &contributions, criteria, score, true);
        CompatibilityScore {
            technology: profile.name.clone(),
            score,
            contributions,
            used_fallback: true,
            reasoning,
        }
    }

    /// Abort when the compared set as a whole is too sparse to rank
    fn check_data_sufficiency(&self, profiles: &[TechnologyProfile]) -> Result<(), RefereeError> {
        let sparse = profiles
            .iter()
            .filter(|p| p.scored_count() < MIN_SCORED_DIMENSIONS)
            .count();
        if sparse * 2 > profiles.len() {
            return Err(RefereeError::InsufficientData(format!(
                "{} of {} technologies have fewer than {} scored dimensions; \
                 add knowledge-base data or compare better-known technologies",
                sparse,
                profiles.len(),
                MIN_SCORED_DIMENSIONS
            )));
        }
        Ok(())
    }
}

/// Strictly leading technology per dimension column; ties produce no entry
fn column_leaders(
    profiles: &[TechnologyProfile],
    dimensions: &[Dimension],
    scores: &[Vec<Option<f64>>],
) -> Vec<TradeoffHighlight> {
    let mut highlights = Vec::new();

    for (col, dim) in dimensions.iter().enumerate() {
        let column: Vec<(usize, f64)> = scores
            .iter()
            .enumerate()
            .filter_map(|(row, r)| r[col].map(|s| (row, s)))
            .collect();
        let Some(&(_, top)) = column
            .iter()
            .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
        else {
            continue;
        };
        let leaders: Vec<usize> = column
            .iter()
            .filter(|(_, s)| *s == top)
            .map(|(row, _)| *row)
            .collect();
        if leaders.len() != 1 {
            continue;
        }

        let leader = &profiles[leaders[0]];
        let explanation = leader
            .dimensions
            .get(dim)
            .map(|r| r.explanation().to_string())
            .unwrap_or_else(|| format!("Leads in {} with a score of {:.1}", dim, top));
        highlights.push(TradeoffHighlight {
            dimension: dim.clone(),
            leader: leader.name.clone(),
            explanation,
        });
    }

    highlights
}

/// Dimensions where the scored spread across technologies is material
fn differentiators(matrix: &TradeoffMatrix) -> Vec<Dimension> {
    let mut result = Vec::new();
    for (col, dim) in matrix.dimensions.iter().enumerate() {
        let column: Vec<f64> = matrix
            .scores
            .iter()
            .filter_map(|row| row[col])
            .collect();
        if column.len() < 2 {
            continue;
        }
        let max = column.iter().cloned().fold(f64::MIN, f64::max);
        let min = column.iter().cloned().fold(f64::MAX, f64::min);
        if max - min >= MATERIALITY_THRESHOLD {
            result.push(dim.clone());
        }
    }
    result
}

fn reasoning_text(
    profile: &TechnologyProfile,
    contributions: &[DimensionContribution],
    criteria: &WeightedCriteria,
    score: f64,
    used_fallback: bool,
) -> String {
    let mut parts = vec![format!("Overall compatibility: {:.0}%.", score * 100.0)];

    if used_fallback {
        parts.push(
            "Weighted scoring was not possible; score is an unweighted average of available data."
                .to_string(),
        );
    }

    let mut ranked = contributions.to_vec();
    ranked.sort_by(|a, b| {
        b.contribution
            .partial_cmp(&a.contribution)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.dimension.cmp(&b.dimension))
    });

    let strengths: Vec<String> = ranked
        .iter()
        .filter(|c| c.score >= STRENGTH_SCORE)
        .take(3)
        .map(|c| format!("excellent {}", c.dimension))
        .collect();
    let concerns: Vec<String> = ranked
        .iter()
        .filter(|c| c.score <= CONCERN_SCORE)
        .take(3)
        .map(|c| format!("limited {}", c.dimension))
        .collect();

    if !strengths.is_empty() {
        parts.push(format!("Key strengths: {}.", strengths.join(", ")));
    }
    if !concerns.is_empty() {
        parts.push(format!("Areas of concern: {}.", concerns.join(", ")));
    }
    if let Some(priority) = criteria.priority_factors.first() {
        parts.push(format!("Evaluated against top priority: {}.", priority));
    }
    if let Some(best) = profile.best_for.first() {
        parts.push(format!("Best suited for: {}.", best));
    }

    parts.join(" ")
}
