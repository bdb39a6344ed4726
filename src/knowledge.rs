//! Technology knowledge base
//!
//! Read-only registry mapping technology names to their profiles. The built-in
//! seed data covers common API, cloud, frontend, and database choices; a JSON
//! overlay file can add or override entries at startup. Lookup is exact and
//! case-insensitive; misses produce fuzzy suggestions for the error path.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, info};

use crate::error::RefereeError;
use crate::types::{
    Dimension, DimensionRating, DimensionScore, MaturityLevel, TechnologyMetadata,
    TechnologyProfile,
};

/// Maximum number of fuzzy suggestions returned for an unknown name
const MAX_SUGGESTIONS: usize = 5;

/// Minimum normalized similarity for an edit-distance suggestion
const SUGGESTION_CUTOFF: f64 = 0.4;

/// Read-only source of technology profiles
///
/// Injected into the analyzer so tests can swap the registry without touching
/// global state.
pub trait ProfileSource {
    /// Exact, case-insensitive lookup
    fn resolve(&self, name: &str) -> Option<&TechnologyProfile>;

    /// All registered technology names, sorted
    fn known_names(&self) -> Vec<&str>;

    /// Fuzzy suggestions for an unknown name, best match first
    fn suggest(&self, name: &str) -> Vec<String> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Vec::new();
        }
        let query = trimmed.to_lowercase();

        let mut ranked: Vec<(f64, &str)> = self
            .known_names()
            .into_iter()
            .filter_map(|known| {
                let candidate = known.to_lowercase();
                let similarity = name_similarity(&query, &candidate);
                (similarity >= SUGGESTION_CUTOFF).then_some((similarity, known))
            })
            .collect();
        ranked.sort_by(|a, b| {
            b.0.partial_cmp(&a.0)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.1.cmp(b.1))
        });

        let mut suggestions: Vec<String> =
            ranked.into_iter().map(|(_, n)| n.to_string()).collect();

        // Fall back to substring and abbreviation matches when edit distance
        // finds nothing close enough.
        if suggestions.is_empty() {
            suggestions = self
                .known_names()
                .into_iter()
                .filter(|known| {
                    let candidate = known.to_lowercase();
                    candidate.contains(&query)
                        || query.contains(&candidate)
                        || is_abbreviation_match(&query, &candidate)
                })
                .map(|n| n.to_string())
                .collect();
        }

        suggestions.truncate(MAX_SUGGESTIONS);
        suggestions
    }
}

/// Similarity in [0, 1] based on Levenshtein distance over the longer name
fn name_similarity(a: &str, b: &str) -> f64 {
    let longest = a.chars().count().max(b.chars().count());
    if longest == 0 {
        return 1.0;
    }
    1.0 - levenshtein(a, b) as f64 / longest as f64
}

fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let mut row: Vec<usize> = (0..=b.len()).collect();

    for (i, ca) in a.iter().enumerate() {
        let mut previous = row[0];
        row[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let substitution = previous + usize::from(ca != cb);
            previous = row[j + 1];
            row[j + 1] = substitution.min(row[j] + 1).min(previous + 1);
        }
    }
    row[b.len()]
}

/// Check whether `abbrev` plausibly abbreviates `full_name` (both lowercase)
fn is_abbreviation_match(abbrev: &str, full_name: &str) -> bool {
    if abbrev.len() < 2 {
        return false;
    }

    // First letters of multi-word names: "al" matches "aws lambda"
    let words: Vec<&str> = full_name.split_whitespace().collect();
    if words.len() >= 2 {
        let initials: String = words.iter().filter_map(|w| w.chars().next()).collect();
        if abbrev == initials {
            return true;
        }
    }

    // Common shorthand in the wild
    let shorthand = [
        ("pg", "postgresql"),
        ("postgres", "postgresql"),
        ("mongo", "mongodb"),
        ("lambda", "aws lambda"),
    ];
    shorthand
        .iter()
        .any(|(short, full)| abbrev == *short && full_name.contains(full))
}

/// Profile entry as it appears in a JSON overlay file
///
/// Only scored dimensions are listed; the analyzer fills the remaining
/// standard dimensions with limited-data markers.
#[derive(Debug, Deserialize)]
struct ProfileSeed {
    name: String,
    category: String,
    dimensions: BTreeMap<Dimension, DimensionScore>,
    pros: Vec<String>,
    cons: Vec<String>,
    best_for: Vec<String>,
    metadata: TechnologyMetadata,
}

/// In-memory knowledge base with built-in seed profiles
#[derive(Debug, Clone, Default)]
pub struct KnowledgeBase {
    /// Keyed by lowercase name for case-insensitive lookup
    profiles: BTreeMap<String, TechnologyProfile>,
}

impl KnowledgeBase {
    /// Empty knowledge base, mainly for tests
    pub fn new() -> Self {
        Self::default()
    }

    /// Knowledge base pre-populated with the built-in technology profiles
    pub fn builtin() -> Self {
        let mut kb = Self::new();
        for profile in builtin_profiles() {
            // Built-in data is known-valid; insert cannot fail here.
            kb.profiles
                .insert(profile.name.to_lowercase(), profile);
        }
        debug!(count = kb.profiles.len(), "built-in knowledge base loaded");
        kb
    }

    /// Register a profile, validating scale range and non-empty text lists
    pub fn insert(&mut self, profile: TechnologyProfile) -> Result<(), RefereeError> {
        validate_profile(&profile)?;
        self.profiles
            .insert(profile.name.to_lowercase(), profile);
        Ok(())
    }

    /// Merge additional or overriding profiles from a JSON overlay file
    ///
    /// Returns the number of profiles merged.
    pub fn merge_from_path(&mut self, path: &Path) -> Result<usize, RefereeError> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            RefereeError::KnowledgeBase(format!(
                "cannot read knowledge file {}: {}",
                path.display(),
                e
            ))
        })?;
        let seeds: Vec<ProfileSeed> = serde_json::from_str(&raw).map_err(|e| {
            RefereeError::KnowledgeBase(format!(
                "knowledge file {} is not a valid profile list: {}",
                path.display(),
                e
            ))
        })?;

        let count = seeds.len();
        for seed in seeds {
            let dimensions = seed
                .dimensions
                .into_iter()
                .map(|(dim, score)| (dim, DimensionRating::Scored(score)))
                .collect();
            self.insert(TechnologyProfile {
                name: seed.name,
                category: seed.category,
                dimensions,
                pros: seed.pros,
                cons: seed.cons,
                best_for: seed.best_for,
                metadata: seed.metadata,
            })?;
        }
        info!(count, path = %path.display(), "merged knowledge overlay");
        Ok(count)
    }
}

impl ProfileSource for KnowledgeBase {
    fn resolve(&self, name: &str) -> Option<&TechnologyProfile> {
        self.profiles.get(&name.trim().to_lowercase())
    }

    fn known_names(&self) -> Vec<&str> {
        self.profiles.values().map(|p| p.name.as_str()).collect()
    }
}

fn validate_profile(profile: &TechnologyProfile) -> Result<(), RefereeError> {
    if profile.name.trim().is_empty() {
        return Err(RefereeError::KnowledgeBase(
            "profile with empty name".to_string(),
        ));
    }
    for (dim, rating) in &profile.dimensions {
        if let DimensionRating::Scored(score) = rating {
            if !score.in_scale() {
                return Err(RefereeError::KnowledgeBase(format!(
                    "profile '{}' has {} score {} outside the {}-{} scale",
                    profile.name,
                    dim,
                    score.score,
                    DimensionScore::MIN,
                    DimensionScore::MAX
                )));
            }
        }
    }
    if profile.pros.is_empty() || profile.cons.is_empty() || profile.best_for.is_empty() {
        return Err(RefereeError::KnowledgeBase(format!(
            "profile '{}' must list at least one pro, con, and best-for entry",
            profile.name
        )));
    }
    Ok(())
}

/// Build a seed profile; scores in standard dimension order
fn seed(
    name: &str,
    category: &str,
    scores: [(f64, &str); 5],
    pros: &[&str],
    cons: &[&str],
    best_for: &[&str],
    maturity: MaturityLevel,
    license: &str,
    maintainer: &str,
) -> TechnologyProfile {
    let dimensions = Dimension::standard()
        .into_iter()
        .zip(scores)
        .map(|(dim, (value, why))| (dim, DimensionRating::Scored(DimensionScore::new(value, why))))
        .collect();
    TechnologyProfile {
        name: name.to_string(),
        category: category.to_string(),
        dimensions,
        pros: pros.iter().map(|s| s.to_string()).collect(),
        cons: cons.iter().map(|s| s.to_string()).collect(),
        best_for: best_for.iter().map(|s| s.to_string()).collect(),
        metadata: TechnologyMetadata {
            maturity,
            license: license.to_string(),
            maintainer: maintainer.to_string(),
        },
    }
}

fn builtin_profiles() -> Vec<TechnologyProfile> {
    vec![
        seed(
            "REST",
            "API",
            [
                (4.5, "Low implementation cost, uses standard HTTP infrastructure"),
                (4.0, "Scales well with caching and CDNs, stateless nature helps"),
                (4.5, "Simple to understand and implement, follows HTTP conventions"),
                (5.0, "Mature ecosystem with extensive tooling and library support"),
                (3.5, "Good performance but can be chatty with multiple round trips"),
            ],
            &[
                "Simple and intuitive HTTP-based design",
                "Excellent caching capabilities",
                "Wide tooling and client library support",
                "Stateless architecture enables easy scaling",
                "Human-readable URLs and responses",
            ],
            &[
                "Can require multiple requests for complex data",
                "Over-fetching or under-fetching of data",
                "Limited real-time capabilities without additional protocols",
                "Versioning can become complex over time",
            ],
            &[
                "CRUD operations and resource-based APIs",
                "Public APIs with broad client compatibility",
                "Simple to moderate complexity applications",
                "Teams new to API development",
                "Applications requiring strong caching",
            ],
            MaturityLevel::Mature,
            "Standard",
            "W3C/IETF Standards",
        ),
        seed(
            "GraphQL",
            "API",
            [
                (3.0, "Higher implementation complexity increases development costs"),
                (4.5, "Excellent query optimization and single endpoint scaling"),
                (2.5, "Steep learning curve, complex schema design and resolver logic"),
                (4.0, "Growing ecosystem with good tooling, but less mature than REST"),
                (4.5, "Efficient data fetching, reduces over-fetching significantly"),
            ],
            &[
                "Single endpoint for all data needs",
                "Eliminates over-fetching and under-fetching",
                "Strong type system and introspection",
                "Excellent developer tooling and debugging",
                "Real-time subscriptions built-in",
            ],
            &[
                "Complex caching strategies required",
                "Steep learning curve for teams",
                "Potential for expensive queries without proper limits",
                "Less suitable for simple CRUD operations",
            ],
            &[
                "Complex data relationships and queries",
                "Mobile applications with bandwidth constraints",
                "Rapid frontend development with changing requirements",
                "Applications requiring real-time features",
                "Teams with strong backend expertise",
            ],
            MaturityLevel::Stable,
            "MIT",
            "GraphQL Foundation",
        ),
        seed(
            "AWS Lambda",
            "Cloud Service",
            [
                (4.0, "Pay-per-execution model, cost-effective for variable workloads"),
                (5.0, "Automatic scaling to handle any load, virtually unlimited"),
                (3.0, "Serverless paradigm requires different thinking, cold start considerations"),
                (4.5, "Rich AWS ecosystem integration, extensive third-party support"),
                (3.5, "Good performance but cold starts can impact latency"),
            ],
            &[
                "No server management required",
                "Automatic scaling and high availability",
                "Pay only for actual execution time",
                "Seamless integration with AWS services",
                "Built-in monitoring and logging",
            ],
            &[
                "Cold start latency for infrequent functions",
                "15-minute maximum execution time limit",
                "Vendor lock-in to AWS ecosystem",
                "Complex debugging and local development",
                "Limited control over runtime environment",
            ],
            &[
                "Event-driven architectures",
                "Microservices with variable load",
                "Data processing and ETL pipelines",
                "API backends with unpredictable traffic",
                "Startups wanting to minimize infrastructure overhead",
            ],
            MaturityLevel::Mature,
            "Proprietary",
            "Amazon Web Services",
        ),
        seed(
            "EC2",
            "Cloud Service",
            [
                (3.0, "Predictable costs but requires capacity planning and optimization"),
                (4.0, "Good scaling with auto-scaling groups, but requires configuration"),
                (2.5, "Requires server management, security patching, and infrastructure knowledge"),
                (4.5, "Mature ecosystem with extensive AWS integration and tooling"),
                (4.5, "Excellent performance with full control over compute resources"),
            ],
            &[
                "Full control over server environment",
                "Consistent performance without cold starts",
                "Wide variety of instance types and configurations",
                "Mature tooling and deployment options",
                "No execution time limits",
            ],
            &[
                "Requires server management and maintenance",
                "Always-on costs even during idle periods",
                "Manual scaling configuration needed",
                "Security and patching responsibilities",
                "More complex deployment processes",
            ],
            &[
                "Long-running applications and services",
                "Applications requiring specific server configurations",
                "High-performance computing workloads",
                "Legacy applications with specific requirements",
                "Teams with strong DevOps capabilities",
            ],
            MaturityLevel::Mature,
            "Proprietary",
            "Amazon Web Services",
        ),
        seed(
            "React",
            "Frontend Framework",
            [
                (4.5, "Free and open-source with large talent pool reducing costs"),
                (4.0, "Scales well for large applications with proper architecture"),
                (3.5, "Moderate learning curve, requires understanding of modern JS concepts"),
                (5.0, "Largest ecosystem with extensive libraries and community support"),
                (4.0, "Good performance with virtual DOM, requires optimization for large apps"),
            ],
            &[
                "Huge community and ecosystem",
                "Excellent developer tools and debugging",
                "Component-based architecture promotes reusability",
                "Strong job market and talent availability",
                "Backed by Meta with long-term support",
            ],
            &[
                "Rapid ecosystem changes can cause fatigue",
                "JSX syntax has a learning curve",
                "Requires additional libraries for full functionality",
                "Can become complex with state management needs",
            ],
            &[
                "Large-scale single-page applications",
                "Teams with strong JavaScript expertise",
                "Projects requiring extensive third-party integrations",
                "Applications with complex user interfaces",
                "Startups needing fast development and hiring",
            ],
            MaturityLevel::Mature,
            "MIT",
            "Meta (Facebook)",
        ),
        seed(
            "Vue",
            "Frontend Framework",
            [
                (4.5, "Free and open-source with growing talent pool"),
                (4.0, "Scales well with good architecture, excellent for medium-large apps"),
                (4.5, "Gentle learning curve, intuitive template syntax"),
                (3.5, "Growing ecosystem but smaller than React, good official tooling"),
                (4.5, "Excellent performance with efficient reactivity system"),
            ],
            &[
                "Gentle learning curve and intuitive syntax",
                "Excellent official documentation and tooling",
                "Progressive adoption possible in existing projects",
                "Great performance out of the box",
                "Strong TypeScript support",
            ],
            &[
                "Smaller ecosystem compared to React",
                "Less job market demand",
                "Fewer large-scale enterprise examples",
                "Smaller community for complex problem solving",
            ],
            &[
                "Teams new to modern frontend frameworks",
                "Small to medium-sized applications",
                "Progressive enhancement of existing applications",
                "Rapid prototyping and development",
                "Projects prioritizing developer experience",
            ],
            MaturityLevel::Stable,
            "MIT",
            "Evan You / Vue Team",
        ),
        seed(
            "PostgreSQL",
            "Database",
            [
                (5.0, "Free and open-source with no licensing costs"),
                (4.0, "Good vertical scaling, horizontal scaling requires additional setup"),
                (3.0, "Rich feature set requires learning, but well-documented"),
                (4.5, "Mature ecosystem with extensive extensions and tooling"),
                (4.5, "Excellent performance for complex queries and ACID compliance"),
            ],
            &[
                "ACID compliance and strong consistency",
                "Rich data types including JSON, arrays, and custom types",
                "Powerful query capabilities and indexing",
                "Extensive extension ecosystem",
                "Strong community and enterprise support",
            ],
            &[
                "Can be overkill for simple applications",
                "Requires more memory than simpler databases",
                "Horizontal scaling requires additional complexity",
                "Steeper learning curve for advanced features",
            ],
            &[
                "Applications requiring complex queries and transactions",
                "Data integrity critical applications",
                "Applications with varied data types",
                "Analytics and reporting workloads",
                "Teams with database expertise",
            ],
            MaturityLevel::Mature,
            "PostgreSQL License",
            "PostgreSQL Global Development Group",
        ),
        seed(
            "MongoDB",
            "Database",
            [
                (3.5, "Free community version, but enterprise features require licensing"),
                (5.0, "Excellent horizontal scaling with built-in sharding"),
                (4.0, "Easy to get started, but requires understanding of NoSQL concepts"),
                (4.0, "Good ecosystem with strong driver support across languages"),
                (4.0, "Good performance for read-heavy workloads and flexible schemas"),
            ],
            &[
                "Flexible schema design and rapid development",
                "Excellent horizontal scaling capabilities",
                "Native JSON document storage",
                "Strong aggregation pipeline for analytics",
                "Good performance for read-heavy applications",
            ],
            &[
                "Eventual consistency can complicate some use cases",
                "Less mature tooling compared to relational databases",
                "Can lead to data duplication and inconsistency",
                "Memory usage can be higher than relational databases",
            ],
            &[
                "Rapid prototyping and agile development",
                "Applications with evolving data schemas",
                "Content management and catalog systems",
                "Real-time analytics and logging",
                "Microservices with independent data models",
            ],
            MaturityLevel::Mature,
            "SSPL",
            "MongoDB Inc.",
        ),
    ]
}
