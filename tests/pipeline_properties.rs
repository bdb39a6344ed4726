/// Property tests over the comparison pipeline
use proptest::prelude::*;

use referee::knowledge::{KnowledgeBase, ProfileSource};
use referee::pipeline::Referee;
use referee::requirements::RequirementsProcessor;
use referee::types::{
    BudgetLevel, ComparisonRequest, ExpertiseLevel, MarginClass, OutputPreferences,
    ProjectRequirements, ScaleLevel, TimelineLevel,
};

fn budget() -> impl Strategy<Value = BudgetLevel> {
    prop_oneof![
        Just(BudgetLevel::Low),
        Just(BudgetLevel::Medium),
        Just(BudgetLevel::High),
    ]
}

fn timeline() -> impl Strategy<Value = TimelineLevel> {
    prop_oneof![
        Just(TimelineLevel::Tight),
        Just(TimelineLevel::Moderate),
        Just(TimelineLevel::Flexible),
    ]
}

fn scale() -> impl Strategy<Value = ScaleLevel> {
    prop_oneof![
        Just(ScaleLevel::Small),
        Just(ScaleLevel::Medium),
        Just(ScaleLevel::Large),
    ]
}

fn expertise() -> impl Strategy<Value = ExpertiseLevel> {
    prop_oneof![
        Just(ExpertiseLevel::Beginner),
        Just(ExpertiseLevel::Intermediate),
        Just(ExpertiseLevel::Expert),
    ]
}

fn requirements() -> impl Strategy<Value = ProjectRequirements> {
    (1u32..=1000, budget(), timeline(), scale(), expertise()).prop_map(
        |(team_size, budget, timeline, scalability_needs, expertise_level)| ProjectRequirements {
            team_size,
            budget,
            timeline,
            scalability_needs,
            expertise_level,
        },
    )
}

fn technology_pairs() -> impl Strategy<Value = Vec<String>> {
    let kb = KnowledgeBase::builtin();
    let names: Vec<String> = kb.known_names().into_iter().map(str::to_string).collect();
    proptest::sample::subsequence(names, 2..=4)
}

proptest! {
    /// Weights always form a normalized vector with no dimension starved
    #[test]
    fn prop_weights_normalized(req in requirements()) {
        let processed = RequirementsProcessor::new().process(&req).unwrap();
        let total = processed.criteria.total_weight();
        prop_assert!((total - 1.0).abs() < 1e-9, "sum was {}", total);
        for weight in processed.criteria.weights.values() {
            prop_assert!(*weight > 0.0);
        }
    }

    /// Every pipeline run over known technologies stays in range and ranked
    #[test]
    fn prop_scores_in_range_and_ranked(req in requirements(), names in technology_pairs()) {
        let request = ComparisonRequest {
            technologies: names,
            project_requirements: req,
            custom_dimensions: Vec::new(),
            allow_unknown: false,
            output_preferences: OutputPreferences::default(),
        };
        let result = Referee::new().compare(&request).unwrap();

        for score in &result.compatibility_scores {
            prop_assert!((0.0..=1.0).contains(&score.score));
        }

        let recommendation = result.recommendation.unwrap();
        let scores: Vec<f64> = recommendation.ranked_choices.iter().map(|c| c.score).collect();
        for window in scores.windows(2) {
            prop_assert!(window[0] >= window[1]);
        }

        // Margin classification matches the top-two gap exactly.
        let top = scores[0];
        let second = scores[1];
        let margin = if top > 0.0 { (top - second) / top } else { 0.0 };
        let expected = if top <= 0.0 || margin <= 0.10 {
            MarginClass::CloseMatch
        } else if margin > 0.25 {
            MarginClass::ClearPreference
        } else {
            MarginClass::ModeratePreference
        };
        prop_assert_eq!(recommendation.margin, expected);
    }

    /// Identical requests give identical results, including serialized form
    #[test]
    fn prop_pipeline_deterministic(req in requirements(), names in technology_pairs()) {
        let request = ComparisonRequest {
            technologies: names,
            project_requirements: req,
            custom_dimensions: Vec::new(),
            allow_unknown: false,
            output_preferences: OutputPreferences::default(),
        };
        let referee = Referee::new();
        let first = referee.compare(&request).unwrap();
        let second = referee.compare(&request).unwrap();
        prop_assert_eq!(&first, &second);

        let first_json = serde_json::to_string(&first).unwrap();
        let second_json = serde_json::to_string(&second).unwrap();
        prop_assert_eq!(first_json, second_json);
    }

    /// Alternative scenarios always disagree with the actual winner
    #[test]
    fn prop_alternative_scenarios_differ(req in requirements(), names in technology_pairs()) {
        let request = ComparisonRequest {
            technologies: names,
            project_requirements: req,
            custom_dimensions: Vec::new(),
            allow_unknown: false,
            output_preferences: OutputPreferences::default(),
        };
        let result = Referee::new().compare(&request).unwrap();
        let recommendation = result.recommendation.unwrap();
        if let Some(scenarios) = &recommendation.alternative_scenarios {
            for scenario in scenarios {
                prop_assert_ne!(
                    &scenario.recommended_tech,
                    &recommendation.ranked_choices[0].technology
                );
            }
        }
    }
}
