// Library exports for the Referee comparison engine
pub mod analyzer;
pub mod cli;
pub mod comparison;
pub mod error;
pub mod knowledge;
pub mod pipeline;
pub mod recommendation;
pub mod report;
pub mod requirements;
pub mod types;

// Re-export key types for convenience
pub use comparison::{Comparison, ComparisonEngine};
pub use error::RefereeError;
pub use knowledge::{KnowledgeBase, ProfileSource};
pub use pipeline::Referee;
pub use recommendation::RecommendationEngine;
pub use report::ReportFormat;
pub use requirements::{ProcessedRequirements, RequirementsProcessor};
pub use types::{
    ComparisonRequest, ComparisonResult, ConfidenceLevel, Dimension, MarginClass,
    ProjectRequirements, Recommendation, TechnologyProfile,
};
