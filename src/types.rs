use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::error::RefereeError;

/// Evaluation axis for technology comparison
///
/// Five standard dimensions are always present; requests may add custom
/// dimensions that must not collide with standard names.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Dimension {
    Cost,
    Scalability,
    Complexity,
    Ecosystem,
    Performance,
    /// Request-supplied dimension, stored lowercase for stable identity
    Custom(String),
}

impl Dimension {
    /// The standard dimension set, in canonical column order
    pub fn standard() -> [Dimension; 5] {
        [
            Dimension::Cost,
            Dimension::Scalability,
            Dimension::Complexity,
            Dimension::Ecosystem,
            Dimension::Performance,
        ]
    }

    /// Parse a dimension name; unknown names become custom dimensions
    pub fn parse(name: &str) -> Dimension {
        match name.trim().to_lowercase().as_str() {
            "cost" => Dimension::Cost,
            "scalability" => Dimension::Scalability,
            "complexity" => Dimension::Complexity,
            "ecosystem" => Dimension::Ecosystem,
            "performance" => Dimension::Performance,
            other => Dimension::Custom(other.to_string()),
        }
    }

    pub fn is_standard(&self) -> bool {
        !matches!(self, Dimension::Custom(_))
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dimension::Cost => write!(f, "cost"),
            Dimension::Scalability => write!(f, "scalability"),
            Dimension::Complexity => write!(f, "complexity"),
            Dimension::Ecosystem => write!(f, "ecosystem"),
            Dimension::Performance => write!(f, "performance"),
            Dimension::Custom(name) => write!(f, "{}", name),
        }
    }
}

impl Serialize for Dimension {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Dimension {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(Dimension::parse(&name))
    }
}

/// Budget constraint level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum BudgetLevel {
    Low,
    Medium,
    High,
}

/// Timeline constraint level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TimelineLevel {
    Tight,
    Moderate,
    Flexible,
}

/// Scalability requirement level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ScaleLevel {
    Small,
    Medium,
    Large,
}

/// Team expertise level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ExpertiseLevel {
    Beginner,
    Intermediate,
    Expert,
}

/// Confidence attached to a ranked recommendation, ordered Low < Medium < High
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ConfidenceLevel {
    Low,
    Medium,
    High,
}

impl fmt::Display for ConfidenceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfidenceLevel::Low => write!(f, "LOW"),
            ConfidenceLevel::Medium => write!(f, "MEDIUM"),
            ConfidenceLevel::High => write!(f, "HIGH"),
        }
    }
}

/// Technology maturity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MaturityLevel {
    Experimental,
    Stable,
    Mature,
}

impl fmt::Display for MaturityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MaturityLevel::Experimental => write!(f, "experimental"),
            MaturityLevel::Stable => write!(f, "stable"),
            MaturityLevel::Mature => write!(f, "mature"),
        }
    }
}

/// Project requirements and constraints
///
/// All five fields are required; absence is a validation error, never a
/// defaulted guess.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectRequirements {
    pub team_size: u32,
    pub budget: BudgetLevel,
    pub timeline: TimelineLevel,
    pub scalability_needs: ScaleLevel,
    pub expertise_level: ExpertiseLevel,
}

/// Numeric score on the 1-5 scale with its reasoning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimensionScore {
    pub score: f64,
    pub explanation: String,
}

impl DimensionScore {
    pub const MIN: f64 = 1.0;
    pub const MAX: f64 = 5.0;

    pub fn new(score: f64, explanation: impl Into<String>) -> Self {
        Self {
            score,
            explanation: explanation.into(),
        }
    }

    pub fn in_scale(&self) -> bool {
        (Self::MIN..=Self::MAX).contains(&self.score)
    }
}

/// A dimension cell of a profile: either scored or explicitly missing
///
/// Limited-data cells are excluded from weighted sums, never treated as zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DimensionRating {
    Scored(DimensionScore),
    LimitedData,
}

impl DimensionRating {
    pub fn score(&self) -> Option<f64> {
        match self {
            DimensionRating::Scored(s) => Some(s.score),
            DimensionRating::LimitedData => None,
        }
    }

    pub fn explanation(&self) -> &str {
        match self {
            DimensionRating::Scored(s) => &s.explanation,
            DimensionRating::LimitedData => "Limited data available",
        }
    }

    pub fn is_limited(&self) -> bool {
        matches!(self, DimensionRating::LimitedData)
    }
}

/// Metadata about a technology
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TechnologyMetadata {
    pub maturity: MaturityLevel,
    pub license: String,
    pub maintainer: String,
}

/// Complete profile of a technology
///
/// Invariant: a resolved profile carries every standard dimension key, even
/// when the value only signals limited data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TechnologyProfile {
    pub name: String,
    pub category: String,
    pub dimensions: BTreeMap<Dimension, DimensionRating>,
    pub pros: Vec<String>,
    pub cons: Vec<String>,
    pub best_for: Vec<String>,
    pub metadata: TechnologyMetadata,
}

impl TechnologyProfile {
    /// Number of limited-data cells among the given dimensions
    ///
    /// Dimensions absent from the profile entirely count as limited.
    pub fn limited_count<'a>(&self, dims: impl Iterator<Item = &'a Dimension>) -> usize {
        dims.filter(|d| {
            self.dimensions
                .get(d)
                .map(DimensionRating::is_limited)
                .unwrap_or(true)
        })
        .count()
    }

    /// Number of dimensions carrying an actual score
    pub fn scored_count(&self) -> usize {
        self.dimensions.values().filter(|r| !r.is_limited()).count()
    }
}

/// Requirements-derived weight vector over dimensions
///
/// Weights are non-negative and sum to 1 after renormalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightedCriteria {
    pub weights: BTreeMap<Dimension, f64>,
    pub priority_factors: Vec<String>,
}

impl WeightedCriteria {
    pub fn total_weight(&self) -> f64 {
        self.weights.values().sum()
    }

    /// Dimensions ordered by descending weight, name-stable on ties
    pub fn ranked_dimensions(&self) -> Vec<(&Dimension, f64)> {
        let mut ranked: Vec<_> = self.weights.iter().map(|(d, w)| (d, *w)).collect();
        ranked.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.0.cmp(b.0))
        });
        ranked
    }
}

/// Per-dimension leader in the trade-off matrix
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeoffHighlight {
    pub dimension: Dimension,
    pub leader: String,
    pub explanation: String,
}

/// Technology x dimension score grid with leader highlights
///
/// `scores[row][col]` pairs technology `row` with dimension `col`; `None`
/// marks a limited-data cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeoffMatrix {
    pub technologies: Vec<String>,
    pub dimensions: Vec<Dimension>,
    pub scores: Vec<Vec<Option<f64>>>,
    pub explanations: Vec<Vec<String>>,
    pub highlights: Vec<TradeoffHighlight>,
}

/// A single dimension's contribution to a compatibility score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimensionContribution {
    pub dimension: Dimension,
    pub score: f64,
    pub weight: f64,
    pub contribution: f64,
}

/// Weighted aggregate fit between a profile and the weight vector, 0-1 scale
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompatibilityScore {
    pub technology: String,
    pub score: f64,
    pub contributions: Vec<DimensionContribution>,
    /// True when the unweighted-average fallback path produced the score
    pub used_fallback: bool,
    pub reasoning: String,
}

/// Margin classification over the top two ranked scores
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarginClass {
    ClearPreference,
    ModeratePreference,
    CloseMatch,
}

impl fmt::Display for MarginClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MarginClass::ClearPreference => write!(f, "clear preference"),
            MarginClass::ModeratePreference => write!(f, "moderate preference"),
            MarginClass::CloseMatch => write!(f, "close match"),
        }
    }
}

/// Ranked technology choice with scoring details
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedChoice {
    pub technology: String,
    pub score: f64,
    pub confidence: ConfidenceLevel,
    pub reasoning: String,
}

/// Recommendation for a hypothetical requirements change, computed by
/// re-scoring under the modified requirements rather than guessed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlternativeScenario {
    pub scenario: String,
    pub recommended_tech: String,
    pub explanation: String,
}

/// Final recommendation with ranked choices and reasoning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub ranked_choices: Vec<RankedChoice>,
    pub margin: MarginClass,
    pub key_decision_factors: Vec<String>,
    pub caveats: Vec<String>,
    pub alternative_scenarios: Option<Vec<AlternativeScenario>>,
}

/// Output formatting preferences
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputPreferences {
    pub include_matrix: bool,
    pub include_recommendation: bool,
    pub max_technologies: usize,
}

impl Default for OutputPreferences {
    fn default() -> Self {
        Self {
            include_matrix: true,
            include_recommendation: true,
            max_technologies: MAX_TECHNOLOGIES,
        }
    }
}

/// Validated comparison request: the core's input boundary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonRequest {
    pub technologies: Vec<String>,
    pub project_requirements: ProjectRequirements,
    #[serde(default)]
    pub custom_dimensions: Vec<String>,
    /// Proceed with a limited-data placeholder on unknown technologies
    #[serde(default)]
    pub allow_unknown: bool,
    #[serde(default)]
    pub output_preferences: OutputPreferences,
}

pub const MIN_TECHNOLOGIES: usize = 2;
pub const MAX_TECHNOLOGIES: usize = 5;

impl ComparisonRequest {
    /// Fail-fast shape validation, before any scoring runs
    pub fn validate(&self) -> Result<(), RefereeError> {
        let count = self.technologies.len();
        if !(MIN_TECHNOLOGIES..=MAX_TECHNOLOGIES).contains(&count) {
            return Err(RefereeError::InvalidRequestShape(format!(
                "expected between {} and {} technologies, got {}; \
                 pass each technology name once",
                MIN_TECHNOLOGIES, MAX_TECHNOLOGIES, count
            )));
        }

        let mut seen = std::collections::BTreeSet::new();
        for name in &self.technologies {
            if !seen.insert(name.trim().to_lowercase()) {
                return Err(RefereeError::InvalidRequestShape(format!(
                    "technology '{}' listed more than once; remove the duplicate",
                    name
                )));
            }
        }

        let prefs = &self.output_preferences;
        if !(MIN_TECHNOLOGIES..=MAX_TECHNOLOGIES).contains(&prefs.max_technologies) {
            return Err(RefereeError::InvalidRequestShape(format!(
                "max_technologies must be between {} and {}, got {}",
                MIN_TECHNOLOGIES, MAX_TECHNOLOGIES, prefs.max_technologies
            )));
        }

        let mut seen_dims = std::collections::BTreeSet::new();
        for name in &self.custom_dimensions {
            let dim = Dimension::parse(name);
            if dim.is_standard() {
                return Err(RefereeError::DimensionNameConflict(format!(
                    "custom dimension '{}' collides with the standard dimension of \
                     the same name; rename it or drop it",
                    name
                )));
            }
            if !seen_dims.insert(dim) {
                return Err(RefereeError::DimensionNameConflict(format!(
                    "custom dimension '{}' listed more than once",
                    name
                )));
            }
        }

        Ok(())
    }

    /// Matrix column order: standard dimensions, then custom in request order
    pub fn comparison_dimensions(&self) -> Vec<Dimension> {
        let mut dims: Vec<Dimension> = Dimension::standard().to_vec();
        dims.extend(self.custom_dimensions.iter().map(|n| Dimension::parse(n)));
        dims
    }
}

/// The core's output boundary: everything the formatter renders
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonResult {
    pub profiles: Vec<TechnologyProfile>,
    pub criteria: WeightedCriteria,
    pub compatibility_scores: Vec<CompatibilityScore>,
    pub matrix: Option<TradeoffMatrix>,
    pub key_differentiators: Vec<Dimension>,
    pub recommendation: Option<Recommendation>,
    /// Degradations surfaced during the run (conflicts, placeholders, fallbacks)
    pub warnings: Vec<String>,
}
