//! Comparison pipeline
//!
//! Orchestrates the full analysis: validate the request, derive weights from
//! requirements, resolve technology profiles, run the comparison, and build
//! the recommendation. The pipeline is deterministic; identical requests
//! produce identical results.

use tracing::{info, warn};

use crate::analyzer::TechnologyAnalyzer;
use crate::comparison::ComparisonEngine;
use crate::error::RefereeError;
use crate::knowledge::{KnowledgeBase, ProfileSource};
use crate::recommendation::RecommendationEngine;
use crate::requirements::RequirementsProcessor;
use crate::types::{ComparisonRequest, ComparisonResult, TechnologyProfile};

/// The analysis pipeline, generic over its profile source
pub struct Referee<S: ProfileSource> {
    source: S,
}

impl Referee<KnowledgeBase> {
    /// Pipeline over the built-in knowledge base
    pub fn new() -> Self {
        Self::with_source(KnowledgeBase::builtin())
    }
}

impl Default for Referee<KnowledgeBase> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: ProfileSource> Referee<S> {
    pub fn with_source(source: S) -> Self {
        Self { source }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Run the full comparison pipeline for one request
    pub fn compare(&self, request: &ComparisonRequest) -> Result<ComparisonResult, RefereeError> {
        request.validate()?;
        let mut warnings = Vec::new();

        let names = self.truncated_names(request, &mut warnings);

        let processor = RequirementsProcessor::new();
        let processed = processor.process(&request.project_requirements)?;
        for conflict in &processed.conflicts {
            warnings.push(format!("Requirement conflict: {}", conflict));
        }

        let profiles = self.resolve_profiles(&names, request.allow_unknown, &mut warnings)?;

        let dimensions = request.comparison_dimensions();
        let engine = ComparisonEngine::new();
        let comparison = engine.generate(&profiles, &processed.criteria, &dimensions)?;
        for score in &comparison.compatibility_scores {
            if score.used_fallback {
                warnings.push(format!(
                    "{} was scored with the unweighted fallback path",
                    score.technology
                ));
            }
        }

        let recommendation = request.output_preferences.include_recommendation.then(|| {
            RecommendationEngine::new().generate(
                &comparison,
                &profiles,
                &processed,
                &request.project_requirements,
            )
        });
        let matrix = request
            .output_preferences
            .include_matrix
            .then(|| comparison.matrix.clone());

        info!(
            technologies = profiles.len(),
            warnings = warnings.len(),
            "comparison pipeline finished"
        );

        Ok(ComparisonResult {
            profiles,
            criteria: processed.criteria,
            compatibility_scores: comparison.compatibility_scores,
            matrix,
            key_differentiators: comparison.key_differentiators,
            recommendation,
            warnings,
        })
    }

    /// Apply the max_technologies cap, keeping request order
    fn truncated_names(&self, request: &ComparisonRequest, warnings: &mut Vec<String>) -> Vec<String> {
        let cap = request.output_preferences.max_technologies;
        if request.technologies.len() > cap {
            warn!(
                requested = request.technologies.len(),
                cap, "truncating technology list"
            );
            warnings.push(format!(
                "Only the first {} of {} technologies were compared",
                cap,
                request.technologies.len()
            ));
            request.technologies[..cap].to_vec()
        } else {
            request.technologies.clone()
        }
    }

    fn resolve_profiles(
        &self,
        names: &[String],
        allow_unknown: bool,
        warnings: &mut Vec<String>,
    ) -> Result<Vec<TechnologyProfile>, RefereeError> {
        let analyzer = TechnologyAnalyzer::new(&self.source);
        let mut profiles = Vec::with_capacity(names.len());
        for name in names {
            if allow_unknown {
                let (profile, caveat) = analyzer.analyze_or_placeholder(name);
                if let Some(caveat) = caveat {
                    warnings.push(caveat);
                }
                profiles.push(profile);
            } else {
                profiles.push(analyzer.analyze(name)?);
            }
        }
        Ok(profiles)
    }
}
