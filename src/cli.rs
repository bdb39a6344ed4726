//! CLI command logic - extracted for testability
//!
//! Pure request-building and parsing functions live here; display functions
//! stay in main.rs.

use std::path::Path;

use crate::error::RefereeError;
use crate::knowledge::KnowledgeBase;
use crate::types::{
    BudgetLevel, ComparisonRequest, ExpertiseLevel, OutputPreferences, ProjectRequirements,
    ScaleLevel, TimelineLevel, MAX_TECHNOLOGIES,
};

pub fn parse_budget(s: &str) -> Result<BudgetLevel, RefereeError> {
    match s.trim().to_lowercase().as_str() {
        "low" => Ok(BudgetLevel::Low),
        "medium" => Ok(BudgetLevel::Medium),
        "high" => Ok(BudgetLevel::High),
        other => Err(RefereeError::InvalidRequirements(format!(
            "unknown budget level '{}'; expected low, medium, or high",
            other
        ))),
    }
}

pub fn parse_timeline(s: &str) -> Result<TimelineLevel, RefereeError> {
    match s.trim().to_lowercase().as_str() {
        "tight" => Ok(TimelineLevel::Tight),
        "moderate" => Ok(TimelineLevel::Moderate),
        "flexible" => Ok(TimelineLevel::Flexible),
        other => Err(RefereeError::InvalidRequirements(format!(
            "unknown timeline '{}'; expected tight, moderate, or flexible",
            other
        ))),
    }
}

pub fn parse_scale(s: &str) -> Result<ScaleLevel, RefereeError> {
    match s.trim().to_lowercase().as_str() {
        "small" => Ok(ScaleLevel::Small),
        "medium" => Ok(ScaleLevel::Medium),
        "large" => Ok(ScaleLevel::Large),
        other => Err(RefereeError::InvalidRequirements(format!(
            "unknown scalability level '{}'; expected small, medium, or large",
            other
        ))),
    }
}

pub fn parse_expertise(s: &str) -> Result<ExpertiseLevel, RefereeError> {
    match s.trim().to_lowercase().as_str() {
        "beginner" => Ok(ExpertiseLevel::Beginner),
        "intermediate" => Ok(ExpertiseLevel::Intermediate),
        "expert" => Ok(ExpertiseLevel::Expert),
        other => Err(RefereeError::InvalidRequirements(format!(
            "unknown expertise level '{}'; expected beginner, intermediate, or expert",
            other
        ))),
    }
}

/// Options collected from CLI flags, before validation
#[derive(Debug, Clone)]
pub struct CompareOptions {
    pub technologies: Vec<String>,
    pub team_size: u32,
    pub budget: String,
    pub timeline: String,
    pub scalability: String,
    pub expertise: String,
    pub custom_dimensions: Vec<String>,
    pub allow_unknown: bool,
    pub no_matrix: bool,
    pub no_recommendation: bool,
    pub max_technologies: Option<usize>,
}

/// Build a validated comparison request from CLI flags
pub fn build_request(options: &CompareOptions) -> Result<ComparisonRequest, RefereeError> {
    let request = ComparisonRequest {
        technologies: options.technologies.clone(),
        project_requirements: ProjectRequirements {
            team_size: options.team_size,
            budget: parse_budget(&options.budget)?,
            timeline: parse_timeline(&options.timeline)?,
            scalability_needs: parse_scale(&options.scalability)?,
            expertise_level: parse_expertise(&options.expertise)?,
        },
        custom_dimensions: options.custom_dimensions.clone(),
        allow_unknown: options.allow_unknown,
        output_preferences: OutputPreferences {
            include_matrix: !options.no_matrix,
            include_recommendation: !options.no_recommendation,
            max_technologies: options.max_technologies.unwrap_or(MAX_TECHNOLOGIES),
        },
    };
    request.validate()?;
    Ok(request)
}

/// Built-in knowledge base, optionally overlaid with a user profile file
pub fn load_knowledge(overlay: Option<&Path>) -> Result<KnowledgeBase, RefereeError> {
    let mut kb = KnowledgeBase::builtin();
    if let Some(path) = overlay {
        kb.merge_from_path(path)?;
    }
    Ok(kb)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::knowledge::ProfileSource;

    fn options(technologies: &[&str]) -> CompareOptions {
        CompareOptions {
            technologies: technologies.iter().map(|s| s.to_string()).collect(),
            team_size: 3,
            budget: "low".to_string(),
            timeline: "tight".to_string(),
            scalability: "small".to_string(),
            expertise: "beginner".to_string(),
            custom_dimensions: Vec::new(),
            allow_unknown: false,
            no_matrix: false,
            no_recommendation: false,
            max_technologies: None,
        }
    }

    #[test]
    fn test_level_parsing_case_insensitive() {
        assert_eq!(parse_budget("LOW").unwrap(), BudgetLevel::Low);
        assert_eq!(parse_timeline(" Tight ").unwrap(), TimelineLevel::Tight);
        assert_eq!(parse_scale("large").unwrap(), ScaleLevel::Large);
        assert_eq!(parse_expertise("Expert").unwrap(), ExpertiseLevel::Expert);
    }

    #[test]
    fn test_level_parsing_rejects_unknown() {
        assert!(parse_budget("huge").is_err());
        assert!(parse_timeline("asap").is_err());
        assert!(parse_scale("planetary").is_err());
        assert!(parse_expertise("wizard").is_err());
    }

    #[test]
    fn test_build_request_applies_flags() {
        let mut opts = options(&["REST", "GraphQL"]);
        opts.no_matrix = true;
        opts.custom_dimensions = vec!["community".to_string()];
        let request = build_request(&opts).unwrap();
        assert!(!request.output_preferences.include_matrix);
        assert!(request.output_preferences.include_recommendation);
        assert_eq!(request.comparison_dimensions().len(), 6);
    }

    #[test]
    fn test_build_request_validates_shape() {
        let opts = options(&["REST"]);
        assert!(build_request(&opts).is_err());
    }

    #[test]
    fn test_load_knowledge_without_overlay() {
        let kb = load_knowledge(None).unwrap();
        assert!(kb.resolve("PostgreSQL").is_some());
    }
}
