//! Recommendation engine
//!
//! Ranks technologies by compatibility score, classifies the top-two margin,
//! derives confidence from data completeness and requirement conflicts, and
//! computes alternative scenarios by re-running the weighting and scoring
//! stages under hypothetically modified requirements.

use std::collections::BTreeMap;
use tracing::debug;

use crate::comparison::{Comparison, ComparisonEngine};
use crate::requirements::{ProcessedRequirements, RequirementsProcessor};
use crate::types::{
    AlternativeScenario, BudgetLevel, CompatibilityScore, ConfidenceLevel, Dimension,
    ExpertiseLevel, MarginClass, MaturityLevel, ProjectRequirements, RankedChoice, Recommendation,
    ScaleLevel, TechnologyProfile,
};

/// Margin above which the top choice is a clear preference
const CLEAR_MARGIN: f64 = 0.25;

/// Margin at or below which the comparison is a close match
const CLOSE_MARGIN: f64 = 0.10;

/// Weights above this threshold count as significant decision factors
const SIGNIFICANT_WEIGHT: f64 = 0.15;

/// Top scores below this trigger a weak-field caveat
const WEAK_FIELD_SCORE: f64 = 0.6;

/// Generates ranked recommendations from a finished comparison
#[derive(Debug, Clone, Copy, Default)]
pub struct RecommendationEngine;

impl RecommendationEngine {
    pub fn new() -> Self {
        Self
    }

    pub fn generate(
        &self,
        comparison: &Comparison,
        profiles: &[TechnologyProfile],
        processed: &ProcessedRequirements,
        requirements: &ProjectRequirements,
    ) -> Recommendation {
        let weighted_dims: Vec<&Dimension> = processed.criteria.weights.keys().collect();
        let by_name: BTreeMap<&str, &TechnologyProfile> =
            profiles.iter().map(|p| (p.name.as_str(), p)).collect();

        let ranked_scores = rank(&comparison.compatibility_scores, &by_name, &weighted_dims);
        let margin = classify_margin(&ranked_scores);
        let has_conflicts = !processed.conflicts.is_empty();

        let overall = overall_confidence(&ranked_scores, &by_name, &weighted_dims, margin, has_conflicts);

        let ranked_choices: Vec<RankedChoice> = ranked_scores
            .iter()
            .enumerate()
            .map(|(rank, score)| {
                let profile = by_name[score.technology.as_str()];
                let own = data_confidence(profile, &weighted_dims);
                RankedChoice {
                    technology: score.technology.clone(),
                    score: score.score,
                    confidence: own.min(overall),
                    reasoning: choice_reasoning(rank, score, margin, &ranked_scores),
                }
            })
            .collect();

        let key_decision_factors =
            decision_factors(processed, &ranked_scores, margin);
        let caveats = caveats(
            &ranked_scores,
            &by_name,
            &weighted_dims,
            processed,
            margin,
            overall,
        );
        let alternative_scenarios =
            self.alternative_scenarios(profiles, requirements, &ranked_scores);

        debug!(
            top = %ranked_choices[0].technology,
            ?margin,
            confidence = %overall,
            "recommendation generated"
        );

        Recommendation {
            ranked_choices,
            margin,
            key_decision_factors,
            caveats,
            alternative_scenarios,
        }
    }

    /// Re-run weighting and scoring under modified requirements
    ///
    /// Scenarios are computed, never guessed: each hypothetical change is fed
    /// back through the requirements processor and comparison engine, and is
    /// reported only when it flips the winner.
    fn alternative_scenarios(
        &self,
        profiles: &[TechnologyProfile],
        requirements: &ProjectRequirements,
        ranked: &[CompatibilityScore],
    ) -> Option<Vec<AlternativeScenario>> {
        let actual_top = ranked.first().map(|s| s.technology.as_str())?;
        let mut scenarios = Vec::new();

        let mut candidates: Vec<(String, ProjectRequirements)> = Vec::new();
        if requirements.budget != BudgetLevel::Low {
            let mut modified = requirements.clone();
            modified.budget = BudgetLevel::Low;
            candidates.push(("If budget becomes the primary constraint".to_string(), modified));
        }
        if requirements.scalability_needs != ScaleLevel::Large {
            let mut modified = requirements.clone();
            modified.scalability_needs = ScaleLevel::Large;
            candidates.push(("If scalability needs were LARGE".to_string(), modified));
        }
        if requirements.expertise_level != ExpertiseLevel::Beginner {
            let mut modified = requirements.clone();
            modified.expertise_level = ExpertiseLevel::Beginner;
            candidates.push((
                "If the team were new to these technologies".to_string(),
                modified,
            ));
        }

        let processor = RequirementsProcessor::new();
        let engine = ComparisonEngine::new();
        for (scenario, modified) in candidates {
            let Ok(processed) = processor.process(&modified) else {
                continue;
            };
            let weighted_dims: Vec<&Dimension> = processed.criteria.weights.keys().collect();
            let by_name: BTreeMap<&str, &TechnologyProfile> =
                profiles.iter().map(|p| (p.name.as_str(), p)).collect();
            let scores: Vec<CompatibilityScore> = profiles
                .iter()
                .map(|p| engine.compatibility(p, &processed.criteria))
                .collect();
            let reranked = rank(&scores, &by_name, &weighted_dims);
            let Some(top) = reranked.first() else { continue };
            if top.technology != actual_top {
                scenarios.push(AlternativeScenario {
                    scenario,
                    recommended_tech: top.technology.clone(),
                    explanation: format!(
                        "Re-running the analysis under this assumption ranks {} first \
                         with {:.0}% compatibility",
                        top.technology,
                        top.score * 100.0
                    ),
                });
            }
        }

        (!scenarios.is_empty()).then_some(scenarios)
    }
}

/// Sort by descending score; ties break on fewer limited-data dimensions,
/// then lexical name order, for determinism
fn rank(
    scores: &[CompatibilityScore],
    by_name: &BTreeMap<&str, &TechnologyProfile>,
    weighted_dims: &[&Dimension],
) -> Vec<CompatibilityScore> {
    let mut ranked = scores.to_vec();
    ranked.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| {
                let limited_a = limited_of(by_name, &a.technology, weighted_dims);
                let limited_b = limited_of(by_name, &b.technology, weighted_dims);
                limited_a.cmp(&limited_b)
            })
            .then_with(|| a.technology.cmp(&b.technology))
    });
    ranked
}

fn limited_of(
    by_name: &BTreeMap<&str, &TechnologyProfile>,
    name: &str,
    weighted_dims: &[&Dimension],
) -> usize {
    by_name
        .get(name)
        .map(|p| p.limited_count(weighted_dims.iter().copied()))
        .unwrap_or(weighted_dims.len())
}

/// Partition-exhaustive margin classification over the top two scores
///
/// Boundary policy: exactly 25% is a moderate preference, exactly 10% is a
/// close match.
fn classify_margin(ranked: &[CompatibilityScore]) -> MarginClass {
    let (Some(top), Some(second)) = (ranked.first(), ranked.get(1)) else {
        return MarginClass::ClearPreference;
    };
    if top.score <= 0.0 {
        return MarginClass::CloseMatch;
    }
    let margin = (top.score - second.score) / top.score;
    if margin > CLEAR_MARGIN {
        MarginClass::ClearPreference
    } else if margin <= CLOSE_MARGIN {
        MarginClass::CloseMatch
    } else {
        MarginClass::ModeratePreference
    }
}

/// Confidence from a single technology's data completeness
fn data_confidence(profile: &TechnologyProfile, weighted_dims: &[&Dimension]) -> ConfidenceLevel {
    match profile.limited_count(weighted_dims.iter().copied()) {
        0 => ConfidenceLevel::High,
        1 => ConfidenceLevel::Medium,
        _ => ConfidenceLevel::Low,
    }
}

/// Overall confidence: data completeness, upstream conflicts, and closeness
fn overall_confidence(
    ranked: &[CompatibilityScore],
    by_name: &BTreeMap<&str, &TechnologyProfile>,
    weighted_dims: &[&Dimension],
    margin: MarginClass,
    has_conflicts: bool,
) -> ConfidenceLevel {
    let worst_limited = ranked
        .iter()
        .map(|s| limited_of(by_name, &s.technology, weighted_dims))
        .max()
        .unwrap_or(0);

    if worst_limited >= 2 || has_conflicts {
        ConfidenceLevel::Low
    } else if worst_limited == 1 || margin == MarginClass::CloseMatch {
        ConfidenceLevel::Medium
    } else {
        ConfidenceLevel::High
    }
}

/// Per-dimension weighted-contribution deltas between the top two, largest first
fn contribution_deltas(ranked: &[CompatibilityScore]) -> Vec<(Dimension, f64)> {
    let (Some(top), Some(second)) = (ranked.first(), ranked.get(1)) else {
        return Vec::new();
    };
    let second_by_dim: BTreeMap<&Dimension, f64> = second
        .contributions
        .iter()
        .map(|c| (&c.dimension, c.contribution))
        .collect();

    let mut deltas: Vec<(Dimension, f64)> = top
        .contributions
        .iter()
        .map(|c| {
            let other = second_by_dim.get(&c.dimension).copied().unwrap_or(0.0);
            (c.dimension.clone(), (c.contribution - other).abs())
        })
        .collect();
    deltas.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.0.cmp(&b.0))
    });
    deltas
}

fn choice_reasoning(
    rank: usize,
    score: &CompatibilityScore,
    margin: MarginClass,
    ranked: &[CompatibilityScore],
) -> String {
    let mut parts = Vec::new();
    match rank {
        0 => parts.push("Top choice based on compatibility analysis.".to_string()),
        1 => parts.push("Strong second option with good alignment.".to_string()),
        n => parts.push(format!("Ranked #{} among the compared options.", n + 1)),
    }

    if rank == 0 {
        match margin {
            MarginClass::ClearPreference => {
                if let (Some(top), Some(second)) = (ranked.first(), ranked.get(1)) {
                    let margin_pct = (top.score - second.score) / top.score * 100.0;
                    let drivers: Vec<String> = contribution_deltas(ranked)
                        .into_iter()
                        .take(2)
                        .map(|(d, _)| d.to_string())
                        .collect();
                    parts.push(format!(
                        "Leads {} by a {:.0}% margin, driven mainly by {}.",
                        second.technology,
                        margin_pct,
                        drivers.join(" and ")
                    ));
                }
            }
            MarginClass::CloseMatch => {
                parts.push(
                    "Scores are nearly tied; see the key decision factors for what separates the options."
                        .to_string(),
                );
            }
            MarginClass::ModeratePreference => {}
        }
    }

    parts.push(score.reasoning.clone());
    parts.join(" ")
}

fn decision_factors(
    processed: &ProcessedRequirements,
    ranked: &[CompatibilityScore],
    margin: MarginClass,
) -> Vec<String> {
    let mut factors = Vec::new();

    for (dim, weight) in processed.criteria.ranked_dimensions().into_iter().take(3) {
        if weight > SIGNIFICANT_WEIGHT {
            factors.push(format!("{} requirements (weight: {:.0}%)", capitalize(&dim.to_string()), weight * 100.0));
        }
    }

    // A close match must still explain what separates the candidates.
    if margin == MarginClass::CloseMatch {
        for (dim, delta) in contribution_deltas(ranked).into_iter().take(2) {
            if delta > 0.0 {
                factors.push(format!(
                    "Largest contribution gap between the top two: {}",
                    dim
                ));
            }
        }
        factors.push("Close competition between top options".to_string());
    }

    for priority in processed.criteria.priority_factors.iter().take(2) {
        factors.push(format!("Project priority: {}", priority));
    }

    if factors.is_empty() {
        factors.push("Overall compatibility with project requirements".to_string());
    }
    factors
}

fn caveats(
    ranked: &[CompatibilityScore],
    by_name: &BTreeMap<&str, &TechnologyProfile>,
    weighted_dims: &[&Dimension],
    processed: &ProcessedRequirements,
    margin: MarginClass,
    overall: ConfidenceLevel,
) -> Vec<String> {
    let mut caveats = Vec::new();

    for conflict in &processed.conflicts {
        caveats.push(format!("Conflicting requirements: {}", conflict));
    }

    for score in ranked {
        if score.used_fallback {
            caveats.push(format!(
                "{} could not be scored against the weighted criteria; its score is an \
                 unweighted average of available data",
                score.technology
            ));
        }
        let limited = limited_of(by_name, &score.technology, weighted_dims);
        if limited > 0 {
            caveats.push(format!(
                "{} has limited data on {} of {} weighted dimensions",
                score.technology,
                limited,
                weighted_dims.len()
            ));
        }
    }

    if let Some(top) = ranked.first() {
        if top.score < WEAK_FIELD_SCORE {
            caveats.push(
                "All options show moderate compatibility; consider revisiting the requirements"
                    .to_string(),
            );
        }
        if let Some(profile) = by_name.get(top.technology.as_str()) {
            if profile.metadata.maturity == MaturityLevel::Experimental {
                caveats.push(format!(
                    "{} is experimental technology; evaluate production readiness carefully",
                    top.technology
                ));
            }
        }
    }

    if margin == MarginClass::CloseMatch {
        caveats.push(
            "Top choices are very close; team preferences and existing expertise should decide"
                .to_string(),
        );
    }

    // Degraded confidence always states its cause.
    if overall < ConfidenceLevel::High && caveats.is_empty() {
        caveats.push("Confidence is reduced by incomplete data for the compared technologies".to_string());
    }

    caveats
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::knowledge::{KnowledgeBase, ProfileSource};
    use crate::types::TimelineLevel;

    fn requirements() -> ProjectRequirements {
        ProjectRequirements {
            team_size: 3,
            budget: BudgetLevel::Low,
            timeline: TimelineLevel::Tight,
            scalability_needs: ScaleLevel::Small,
            expertise_level: ExpertiseLevel::Beginner,
        }
    }

    fn run(names: &[&str], req: &ProjectRequirements) -> (Recommendation, Vec<TechnologyProfile>) {
        let kb = KnowledgeBase::builtin();
        let profiles: Vec<TechnologyProfile> = names
            .iter()
            .map(|n| kb.resolve(n).unwrap().clone())
            .collect();
        let processed = RequirementsProcessor::new().process(req).unwrap();
        let dims: Vec<Dimension> = Dimension::standard().to_vec();
        let comparison = ComparisonEngine::new()
            .generate(&profiles, &processed.criteria, &dims)
            .unwrap();
        let recommendation =
            RecommendationEngine::new().generate(&comparison, &profiles, &processed, req);
        (recommendation, profiles)
    }

    fn score(technology: &str, value: f64) -> CompatibilityScore {
        CompatibilityScore {
            technology: technology.to_string(),
            score: value,
            contributions: Vec::new(),
            used_fallback: false,
            reasoning: String::new(),
        }
    }

    #[test]
    fn test_ranking_descending_and_complete() {
        let (recommendation, profiles) = run(&["REST", "GraphQL", "Vue"], &requirements());
        assert_eq!(recommendation.ranked_choices.len(), profiles.len());
        let scores: Vec<f64> = recommendation
            .ranked_choices
            .iter()
            .map(|c| c.score)
            .collect();
        let mut sorted = scores.clone();
        sorted.sort_by(|a, b| b.partial_cmp(a).unwrap());
        assert_eq!(scores, sorted);
    }

    #[test]
    fn test_rest_wins_low_budget_tight_timeline() {
        // Spec scenario: cost and complexity dominate, REST outranks GraphQL
        // and the reasoning cites one of them.
        let (recommendation, _) = run(&["REST", "GraphQL"], &requirements());
        let top = &recommendation.ranked_choices[0];
        assert_eq!(top.technology, "REST");
        assert!(
            top.reasoning.contains("cost") || top.reasoning.contains("complexity"),
            "reasoning was: {}",
            top.reasoning
        );
    }

    #[test]
    fn test_margin_boundaries() {
        // Exactly 25% margin is moderate, exactly 10% is close.
        let exactly_quarter = vec![score("A", 0.8), score("B", 0.6)];
        assert_eq!(
            classify_margin(&exactly_quarter),
            MarginClass::ModeratePreference
        );

        let exactly_tenth = vec![score("A", 0.5), score("B", 0.45)];
        assert_eq!(classify_margin(&exactly_tenth), MarginClass::CloseMatch);

        let wide = vec![score("A", 0.9), score("B", 0.6)];
        assert_eq!(classify_margin(&wide), MarginClass::ClearPreference);

        let moderate = vec![score("A", 0.8), score("B", 0.68)];
        assert_eq!(
            classify_margin(&moderate),
            MarginClass::ModeratePreference
        );
    }

    #[test]
    fn test_zero_top_score_is_close_match() {
        let zeros = vec![score("A", 0.0), score("B", 0.0)];
        assert_eq!(classify_margin(&zeros), MarginClass::CloseMatch);
    }

    #[test]
    fn test_identical_profiles_close_match_medium_confidence() {
        let kb = KnowledgeBase::builtin();
        let rest = kb.resolve("REST").unwrap().clone();
        let mut twin = rest.clone();
        twin.name = "RESTv2".to_string();
        let profiles = vec![rest, twin];

        let req = requirements();
        let processed = RequirementsProcessor::new().process(&req).unwrap();
        let dims: Vec<Dimension> = Dimension::standard().to_vec();
        let comparison = ComparisonEngine::new()
            .generate(&profiles, &processed.criteria, &dims)
            .unwrap();
        let recommendation =
            RecommendationEngine::new().generate(&comparison, &profiles, &processed, &req);

        assert_eq!(recommendation.margin, MarginClass::CloseMatch);
        assert!(!recommendation.key_decision_factors.is_empty());
        assert!(recommendation.ranked_choices[0].confidence <= ConfidenceLevel::Medium);
        assert!(!recommendation.caveats.is_empty());
        // lexical tie-break: REST before RESTv2
        assert_eq!(recommendation.ranked_choices[0].technology, "REST");
    }

    #[test]
    fn test_conflicts_force_low_confidence_with_caveat() {
        let req = ProjectRequirements {
            team_size: 3,
            budget: BudgetLevel::Low,
            timeline: TimelineLevel::Tight,
            scalability_needs: ScaleLevel::Large,
            expertise_level: ExpertiseLevel::Beginner,
        };
        let (recommendation, _) = run(&["REST", "GraphQL"], &req);
        assert_eq!(
            recommendation.ranked_choices[0].confidence,
            ConfidenceLevel::Low
        );
        assert!(recommendation
            .caveats
            .iter()
            .any(|c| c.contains("Conflicting requirements")));
    }

    #[test]
    fn test_limited_data_downgrades_confidence() {
        let kb = KnowledgeBase::builtin();
        let rest = kb.resolve("REST").unwrap().clone();
        let mut sparse = kb.resolve("GraphQL").unwrap().clone();
        sparse.dimensions.insert(
            Dimension::Ecosystem,
            crate::types::DimensionRating::LimitedData,
        );

        let req = ProjectRequirements {
            team_size: 3,
            budget: BudgetLevel::Medium,
            timeline: TimelineLevel::Moderate,
            scalability_needs: ScaleLevel::Medium,
            expertise_level: ExpertiseLevel::Intermediate,
        };
        let processed = RequirementsProcessor::new().process(&req).unwrap();
        let dims: Vec<Dimension> = Dimension::standard().to_vec();
        let profiles = vec![rest, sparse];
        let comparison = ComparisonEngine::new()
            .generate(&profiles, &processed.criteria, &dims)
            .unwrap();
        let recommendation =
            RecommendationEngine::new().generate(&comparison, &profiles, &processed, &req);

        assert!(recommendation.ranked_choices[0].confidence <= ConfidenceLevel::Medium);
        assert!(recommendation
            .caveats
            .iter()
            .any(|c| c.contains("limited data")));
    }

    #[test]
    fn test_alternative_scenarios_are_recomputed() {
        // With a small-scale request, MongoDB's scalability edge only shows
        // up in the LARGE-scale scenario re-run.
        let req = ProjectRequirements {
            team_size: 3,
            budget: BudgetLevel::Medium,
            timeline: TimelineLevel::Moderate,
            scalability_needs: ScaleLevel::Small,
            expertise_level: ExpertiseLevel::Intermediate,
        };
        let (recommendation, _) = run(&["PostgreSQL", "MongoDB"], &req);
        if let Some(scenarios) = &recommendation.alternative_scenarios {
            for scenario in scenarios {
                assert!(scenario.scenario.starts_with("If "));
                assert_ne!(
                    scenario.recommended_tech,
                    recommendation.ranked_choices[0].technology
                );
            }
        }
    }

    #[test]
    fn test_tie_break_prefers_fuller_data() {
        let kb = KnowledgeBase::builtin();
        let full = kb.resolve("REST").unwrap().clone();
        let mut sparse = full.clone();
        sparse.name = "QEST".to_string();
        sparse.dimensions.insert(
            Dimension::Performance,
            crate::types::DimensionRating::LimitedData,
        );

        // Force equal compatibility scores, then check ordering.
        let scores = vec![score("QEST", 0.7), score("REST", 0.7)];
        let by_name: BTreeMap<&str, &TechnologyProfile> =
            [("REST", &full), ("QEST", &sparse)].into_iter().collect();
        let weights = RequirementsProcessor::new()
            .process(&requirements())
            .unwrap()
            .criteria
            .weights;
        let weighted_dims: Vec<&Dimension> = weights.keys().collect();
        let ranked = rank(&scores, &by_name, &weighted_dims);
        assert_eq!(ranked[0].technology, "REST");
    }
}
