//! Requirements processor
//!
//! Maps project constraints to a normalized weight vector over the standard
//! dimensions. Starts from a uniform base, applies additive boosts keyed by
//! constraint level, floors each weight, and renormalizes to sum to 1.

use std::collections::BTreeMap;
use tracing::debug;

use crate::error::RefereeError;
use crate::types::{
    BudgetLevel, Dimension, ExpertiseLevel, ProjectRequirements, ScaleLevel, TimelineLevel,
    WeightedCriteria,
};

/// Uniform base weight per standard dimension (1/5)
const BASE_WEIGHT: f64 = 0.2;

/// No weight drops below this floor; every dimension keeps a say
const MIN_WEIGHT: f64 = 0.05;

/// Largest team size the processor accepts as plausible
const MAX_TEAM_SIZE: u32 = 1000;

/// Weight vector plus recoverable conflict warnings
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessedRequirements {
    pub criteria: WeightedCriteria,
    /// Contradictory constraint combinations, surfaced as caveats downstream
    pub conflicts: Vec<String>,
}

/// Converts project requirements into weighted comparison criteria
#[derive(Debug, Clone, Copy, Default)]
pub struct RequirementsProcessor;

impl RequirementsProcessor {
    pub fn new() -> Self {
        Self
    }

    /// Convert requirements into weights and priority factors
    ///
    /// Conflicting combinations do not abort: they come back as warnings the
    /// recommendation stage downgrades confidence for.
    pub fn process(
        &self,
        requirements: &ProjectRequirements,
    ) -> Result<ProcessedRequirements, RefereeError> {
        validate(requirements)?;

        let weights = dimension_weights(requirements);
        let conflicts = detect_conflicts(requirements);
        let priority_factors = priority_factors(requirements);

        debug!(?weights, conflicts = conflicts.len(), "processed requirements");
        Ok(ProcessedRequirements {
            criteria: WeightedCriteria {
                weights,
                priority_factors,
            },
            conflicts,
        })
    }
}

fn validate(req: &ProjectRequirements) -> Result<(), RefereeError> {
    if req.team_size < 1 {
        return Err(RefereeError::InvalidRequirements(
            "team_size must be at least 1".to_string(),
        ));
    }
    if req.team_size > MAX_TEAM_SIZE {
        return Err(RefereeError::InvalidRequirements(format!(
            "team_size {} is unreasonably large (max {})",
            req.team_size, MAX_TEAM_SIZE
        )));
    }
    Ok(())
}

/// Additive boost on the cost dimension from budget pressure
fn cost_boost(budget: BudgetLevel) -> f64 {
    match budget {
        BudgetLevel::Low => 0.15,
        BudgetLevel::Medium => 0.05,
        BudgetLevel::High => -0.03,
    }
}

/// Additive boost on the complexity dimension from timeline and expertise
fn complexity_boost(timeline: TimelineLevel, expertise: ExpertiseLevel) -> f64 {
    let timeline_boost = match timeline {
        TimelineLevel::Tight => 0.15,
        TimelineLevel::Moderate => 0.06,
        TimelineLevel::Flexible => -0.06,
    };
    let expertise_boost = match expertise {
        ExpertiseLevel::Beginner => 0.10,
        ExpertiseLevel::Intermediate => 0.0,
        ExpertiseLevel::Expert => -0.05,
    };
    timeline_boost + expertise_boost
}

/// Additive boosts on (scalability, performance) from required scale
fn scale_boost(scale: ScaleLevel) -> (f64, f64) {
    match scale {
        ScaleLevel::Large => (0.18, 0.18),
        ScaleLevel::Medium => (0.06, 0.05),
        ScaleLevel::Small => (-0.04, -0.03),
    }
}

/// Additive boost on the ecosystem dimension from team characteristics
fn ecosystem_boost(team_size: u32, expertise: ExpertiseLevel) -> f64 {
    let size_boost = f64::from(team_size) * 0.015;
    let expertise_boost = match expertise {
        ExpertiseLevel::Beginner => 0.12,
        ExpertiseLevel::Intermediate => 0.04,
        ExpertiseLevel::Expert => -0.04,
    };
    size_boost + expertise_boost
}

fn dimension_weights(req: &ProjectRequirements) -> BTreeMap<Dimension, f64> {
    let (scalability, performance) = scale_boost(req.scalability_needs);

    let mut weights = BTreeMap::new();
    weights.insert(Dimension::Cost, BASE_WEIGHT + cost_boost(req.budget));
    weights.insert(
        Dimension::Complexity,
        BASE_WEIGHT + complexity_boost(req.timeline, req.expertise_level),
    );
    weights.insert(Dimension::Scalability, BASE_WEIGHT + scalability);
    weights.insert(Dimension::Performance, BASE_WEIGHT + performance);
    weights.insert(
        Dimension::Ecosystem,
        BASE_WEIGHT + ecosystem_boost(req.team_size, req.expertise_level),
    );

    // Floor, then renormalize so the vector sums to 1.
    for weight in weights.values_mut() {
        *weight = weight.max(MIN_WEIGHT);
    }
    let total: f64 = weights.values().sum();
    for weight in weights.values_mut() {
        *weight /= total;
    }
    weights
}

/// Explicit table of contradictory constraint combinations
///
/// Each entry names the combination and why it undermines the ranking; the
/// recommendation stage turns these into caveats and a confidence downgrade.
fn detect_conflicts(req: &ProjectRequirements) -> Vec<String> {
    let mut conflicts = Vec::new();

    if req.budget == BudgetLevel::Low
        && req.scalability_needs == ScaleLevel::Large
        && req.timeline == TimelineLevel::Tight
    {
        conflicts.push(
            "Low budget, large scalability needs, and tight timeline create competing priorities"
                .to_string(),
        );
    }

    if req.expertise_level == ExpertiseLevel::Beginner
        && req.timeline == TimelineLevel::Tight
        && req.scalability_needs == ScaleLevel::Large
    {
        conflicts.push(
            "Beginner expertise with tight timeline and large scale requirements may be unrealistic"
                .to_string(),
        );
    }

    if req.budget == BudgetLevel::Low
        && req.expertise_level == ExpertiseLevel::Expert
        && req.team_size >= 5
    {
        conflicts.push(
            "Low budget with large expert team suggests potential resource mismatch".to_string(),
        );
    }

    if req.scalability_needs == ScaleLevel::Small && req.team_size >= 8 {
        conflicts.push(
            "Small scalability needs with large team may lead to over-engineering".to_string(),
        );
    }

    if req.budget == BudgetLevel::High
        && req.timeline == TimelineLevel::Tight
        && req.expertise_level == ExpertiseLevel::Beginner
    {
        conflicts.push(
            "High budget with tight timeline and beginner team may indicate poor planning"
                .to_string(),
        );
    }

    conflicts
}

/// Human-readable priorities implied by the constraints, ordered, deduplicated
fn priority_factors(req: &ProjectRequirements) -> Vec<String> {
    let mut factors: Vec<&str> = Vec::new();

    match req.budget {
        BudgetLevel::Low => {
            factors.push("Cost optimization and budget constraints");
            factors.push("Open-source solutions preferred");
        }
        BudgetLevel::Medium => factors.push("Balanced cost considerations"),
        BudgetLevel::High => {}
    }

    match req.timeline {
        TimelineLevel::Tight => {
            factors.push("Rapid development and deployment");
            factors.push("Minimal learning curve required");
        }
        TimelineLevel::Moderate => factors.push("Reasonable learning curve acceptable"),
        TimelineLevel::Flexible => {}
    }

    match req.scalability_needs {
        ScaleLevel::Large => {
            factors.push("Horizontal scalability requirements");
            factors.push("High performance optimization");
        }
        ScaleLevel::Medium => factors.push("Moderate scalability needs"),
        ScaleLevel::Small => {}
    }

    if req.team_size >= 5 {
        factors.push("Mature tooling ecosystem");
    }

    match req.expertise_level {
        ExpertiseLevel::Beginner => {
            factors.push("Strong ecosystem and community support");
            factors.push("Gentle learning curve essential");
        }
        ExpertiseLevel::Intermediate => factors.push("Good community support helpful"),
        ExpertiseLevel::Expert => factors.push("Advanced customization capabilities"),
    }

    let mut seen = std::collections::BTreeSet::new();
    factors
        .into_iter()
        .filter(|f| seen.insert(*f))
        .map(|f| f.to_string())
        .collect()
}
