//! Technology analyzer
//!
//! Resolves technology names against an injected profile source and applies
//! the limited-data fallback for unknown or partially populated entries.

use std::collections::BTreeMap;
use tracing::{debug, warn};

use crate::error::RefereeError;
use crate::knowledge::ProfileSource;
use crate::types::{
    Dimension, DimensionRating, MaturityLevel, TechnologyMetadata, TechnologyProfile,
};

/// Resolves names to normalized technology profiles
pub struct TechnologyAnalyzer<'a, S: ProfileSource> {
    source: &'a S,
}

impl<'a, S: ProfileSource> TechnologyAnalyzer<'a, S> {
    pub fn new(source: &'a S) -> Self {
        Self { source }
    }

    /// Resolve a name to a profile, failing with suggestions on a miss
    ///
    /// The returned profile always carries every standard dimension; entries
    /// the knowledge base left out are marked as limited data rather than
    /// invented.
    pub fn analyze(&self, name: &str) -> Result<TechnologyProfile, RefereeError> {
        match self.source.resolve(name) {
            Some(profile) => {
                debug!(technology = %profile.name, "resolved profile");
                Ok(normalize(profile.clone()))
            }
            None => Err(RefereeError::UnknownTechnology {
                name: name.trim().to_string(),
                suggestions: self.source.suggest(name),
            }),
        }
    }

    /// Recoverable resolution: unknown names get a limited-data placeholder
    ///
    /// Returns the profile plus a caveat string when degraded.
    pub fn analyze_or_placeholder(&self, name: &str) -> (TechnologyProfile, Option<String>) {
        match self.source.resolve(name) {
            Some(profile) => (normalize(profile.clone()), None),
            None => {
                warn!(technology = name, "unknown technology, using placeholder profile");
                let caveat = format!(
                    "'{}' is not in the knowledge base; it was scored with limited data only",
                    name.trim()
                );
                (placeholder_profile(name), Some(caveat))
            }
        }
    }

    /// Evaluate a single dimension of a technology
    pub fn evaluate_dimension(
        &self,
        name: &str,
        dimension: &Dimension,
    ) -> Result<DimensionRating, RefereeError> {
        let profile = self.analyze(name)?;
        Ok(profile
            .dimensions
            .get(dimension)
            .cloned()
            .unwrap_or(DimensionRating::LimitedData))
    }
}

/// Ensure every standard dimension key is present
fn normalize(mut profile: TechnologyProfile) -> TechnologyProfile {
    for dim in Dimension::standard() {
        profile
            .dimensions
            .entry(dim)
            .or_insert(DimensionRating::LimitedData);
    }
    profile
}

/// Placeholder profile for an unknown technology: every dimension limited
fn placeholder_profile(name: &str) -> TechnologyProfile {
    let name = name.trim();
    let dimensions: BTreeMap<Dimension, DimensionRating> = Dimension::standard()
        .into_iter()
        .map(|d| (d, DimensionRating::LimitedData))
        .collect();
    TechnologyProfile {
        name: name.to_string(),
        category: guess_category(name),
        dimensions,
        pros: vec![format!("No verified advantages recorded for {}", name)],
        cons: vec![format!("No verified drawbacks recorded for {}", name)],
        best_for: vec![format!("Unknown; evaluate {} against your own criteria", name)],
        metadata: TechnologyMetadata {
            maturity: MaturityLevel::Experimental,
            license: "Unknown".to_string(),
            maintainer: "Unknown".to_string(),
        },
    }
}

/// Guess a category from common name patterns
fn guess_category(name: &str) -> String {
    let lower = name.to_lowercase();
    let matches_any = |keywords: &[&str]| keywords.iter().any(|k| lower.contains(k));

    if matches_any(&["db", "database", "sql", "mongo", "redis", "elastic"]) {
        "Database"
    } else if matches_any(&["api", "rest", "graphql", "grpc"]) {
        "API"
    } else if matches_any(&["aws", "azure", "gcp", "cloud", "lambda", "function"]) {
        "Cloud Service"
    } else if matches_any(&["react", "vue", "angular", "svelte", "frontend", "ui"]) {
        "Frontend Framework"
    } else if matches_any(&["express", "django", "flask", "spring", "fastapi"]) {
        "Backend Framework"
    } else {
        "Technology"
    }
    .to_string()
}
