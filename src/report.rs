//! Report generation for comparison results
use std::fmt;
use std::str::FromStr;

use crate::error::RefereeError;
use crate::types::{ComparisonResult, Dimension, TradeoffMatrix};

/// Output format for rendered reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportFormat {
    #[default]
    Markdown,
    Json,
}

impl FromStr for ReportFormat {
    type Err = RefereeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "markdown" | "md" => Ok(ReportFormat::Markdown),
            "json" => Ok(ReportFormat::Json),
            other => Err(RefereeError::Report(format!(
                "unknown format '{}'; expected markdown or json",
                other
            ))),
        }
    }
}

impl fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportFormat::Markdown => write!(f, "markdown"),
            ReportFormat::Json => write!(f, "json"),
        }
    }
}

/// Render a comparison result in the requested format
pub fn render(result: &ComparisonResult, format: ReportFormat) -> Result<String, RefereeError> {
    match format {
        ReportFormat::Markdown => Ok(to_markdown(result)),
        ReportFormat::Json => serde_json::to_string_pretty(result)
            .map_err(|e| RefereeError::Report(e.to_string())),
    }
}

/// Generate a Markdown report
pub fn to_markdown(result: &ComparisonResult) -> String {
    let mut md = String::new();

    let names: Vec<&str> = result.profiles.iter().map(|p| p.name.as_str()).collect();
    md.push_str(&format!(
        "# Technology Comparison: {}\n\n",
        names.join(" vs ")
    ));

    if !result.warnings.is_empty() {
        md.push_str("## Warnings\n\n");
        for warning in &result.warnings {
            md.push_str(&format!("- {}\n", warning));
        }
        md.push('\n');
    }

    md.push_str("## Weighted Criteria\n\n");
    md.push_str("| Dimension | Weight |\n");
    md.push_str("|-----------|--------|\n");
    for (dim, weight) in result.criteria.ranked_dimensions() {
        md.push_str(&format!("| {} | {:.1}% |\n", dim, weight * 100.0));
    }
    md.push('\n');
    if !result.criteria.priority_factors.is_empty() {
        md.push_str("Priorities: ");
        md.push_str(&result.criteria.priority_factors.join("; "));
        md.push_str("\n\n");
    }

    if let Some(matrix) = &result.matrix {
        md.push_str("## Trade-off Matrix\n\n");
        push_matrix(&mut md, matrix);
    }

    md.push_str("## Compatibility Scores\n\n");
    let mut ranked = result.compatibility_scores.clone();
    ranked.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.technology.cmp(&b.technology))
    });
    for score in &ranked {
        md.push_str(&format!(
            "- **{}**: {:.0}%{}\n",
            score.technology,
            score.score * 100.0,
            if score.used_fallback {
                " (unweighted fallback)"
            } else {
                ""
            }
        ));
    }
    md.push('\n');

    if !result.key_differentiators.is_empty() {
        let dims: Vec<String> = result
            .key_differentiators
            .iter()
            .map(Dimension::to_string)
            .collect();
        md.push_str(&format!("Key differentiators: {}\n\n", dims.join(", ")));
    }

    if let Some(recommendation) = &result.recommendation {
        md.push_str("## Recommendation\n\n");
        for (rank, choice) in recommendation.ranked_choices.iter().enumerate() {
            md.push_str(&format!(
                "{}. **{}** ({:.0}%, confidence {})\n",
                rank + 1,
                choice.technology,
                choice.score * 100.0,
                choice.confidence
            ));
            md.push_str(&format!("   {}\n", choice.reasoning));
        }
        md.push_str(&format!("\nMargin: {}\n\n", recommendation.margin));

        md.push_str("### Key Decision Factors\n\n");
        for factor in &recommendation.key_decision_factors {
            md.push_str(&format!("- {}\n", factor));
        }
        md.push('\n');

        if !recommendation.caveats.is_empty() {
            md.push_str("### Caveats\n\n");
            for caveat in &recommendation.caveats {
                md.push_str(&format!("- {}\n", caveat));
            }
            md.push('\n');
        }

        if let Some(scenarios) = &recommendation.alternative_scenarios {
            md.push_str("### Alternative Scenarios\n\n");
            for scenario in scenarios {
                md.push_str(&format!(
                    "- {}: **{}**. {}\n",
                    scenario.scenario, scenario.recommended_tech, scenario.explanation
                ));
            }
            md.push('\n');
        }
    }

    md.push_str("## Profiles\n\n");
    for profile in &result.profiles {
        md.push_str(&format!(
            "### {} ({}, {})\n\n",
            profile.name, profile.category, profile.metadata.maturity
        ));
        md.push_str("**Pros:**\n");
        for pro in &profile.pros {
            md.push_str(&format!("- {}\n", pro));
        }
        md.push_str("\n**Cons:**\n");
        for con in &profile.cons {
            md.push_str(&format!("- {}\n", con));
        }
        md.push_str("\n**Best for:**\n");
        for best in &profile.best_for {
            md.push_str(&format!("- {}\n", best));
        }
        md.push('\n');
    }

    md
}

fn push_matrix(md: &mut String, matrix: &TradeoffMatrix) {
    md.push_str("| Technology |");
    for dim in &matrix.dimensions {
        md.push_str(&format!(" {} |", dim));
    }
    md.push('\n');
    md.push_str("|------------|");
    for _ in &matrix.dimensions {
        md.push_str("-------|");
    }
    md.push('\n');

    for (row, tech) in matrix.technologies.iter().enumerate() {
        md.push_str(&format!("| {} |", tech));
        for (col, cell) in matrix.scores[row].iter().enumerate() {
            match cell {
                Some(score) => {
                    let leads = matrix
                        .highlights
                        .iter()
                        .any(|h| h.leader == *tech && h.dimension == matrix.dimensions[col]);
                    if leads {
                        md.push_str(&format!(" {:.1} ★ |", score));
                    } else {
                        md.push_str(&format!(" {:.1} |", score));
                    }
                }
                None => md.push_str(" N/A |"),
            }
        }
        md.push('\n');
    }
    md.push('\n');

    if !matrix.highlights.is_empty() {
        md.push_str("Leaders by dimension:\n\n");
        for highlight in &matrix.highlights {
            md.push_str(&format!(
                "- **{}**: {} ({})\n",
                highlight.dimension, highlight.leader, highlight.explanation
            ));
        }
        md.push('\n');
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::Referee;
    use crate::types::{
        BudgetLevel, ComparisonRequest, ExpertiseLevel, OutputPreferences, ProjectRequirements,
        ScaleLevel, TimelineLevel,
    };

    fn result() -> ComparisonResult {
        let referee = Referee::new();
        referee
            .compare(&ComparisonRequest {
                technologies: vec!["REST".to_string(), "GraphQL".to_string()],
                project_requirements: ProjectRequirements {
                    team_size: 3,
                    budget: BudgetLevel::Low,
                    timeline: TimelineLevel::Tight,
                    scalability_needs: ScaleLevel::Small,
                    expertise_level: ExpertiseLevel::Beginner,
                },
                custom_dimensions: Vec::new(),
                allow_unknown: false,
                output_preferences: OutputPreferences::default(),
            })
            .unwrap()
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!("md".parse::<ReportFormat>().unwrap(), ReportFormat::Markdown);
        assert_eq!("JSON".parse::<ReportFormat>().unwrap(), ReportFormat::Json);
        assert!("yaml".parse::<ReportFormat>().is_err());
    }

    #[test]
    fn test_markdown_contains_all_sections() {
        let md = to_markdown(&result());
        assert!(md.contains("# Technology Comparison: REST vs GraphQL"));
        assert!(md.contains("## Weighted Criteria"));
        assert!(md.contains("## Trade-off Matrix"));
        assert!(md.contains("## Compatibility Scores"));
        assert!(md.contains("## Recommendation"));
        assert!(md.contains("### Key Decision Factors"));
        assert!(md.contains("## Profiles"));
    }

    #[test]
    fn test_markdown_matrix_rows() {
        let md = to_markdown(&result());
        assert!(md.contains("| REST |"));
        assert!(md.contains("| GraphQL |"));
        // REST strictly leads cost, so its row carries a leader marker.
        assert!(md.contains("★"));
    }

    #[test]
    fn test_markdown_marks_missing_cells() {
        let referee = Referee::new();
        let mut request = ComparisonRequest {
            technologies: vec!["REST".to_string(), "GraphQL".to_string()],
            project_requirements: ProjectRequirements {
                team_size: 3,
                budget: BudgetLevel::Medium,
                timeline: TimelineLevel::Moderate,
                scalability_needs: ScaleLevel::Medium,
                expertise_level: ExpertiseLevel::Intermediate,
            },
            custom_dimensions: Vec::new(),
            allow_unknown: false,
            output_preferences: OutputPreferences::default(),
        };
        request.custom_dimensions = vec!["community".to_string()];
        let md = to_markdown(&referee.compare(&request).unwrap());
        assert!(md.contains("N/A"));
    }

    #[test]
    fn test_json_round_trips() {
        let rendered = render(&result(), ReportFormat::Json).unwrap();
        let parsed: ComparisonResult = serde_json::from_str(&rendered).unwrap();
        assert_eq!(parsed, result());
    }

    #[test]
    fn test_json_is_deterministic() {
        let first = render(&result(), ReportFormat::Json).unwrap();
        let second = render(&result(), ReportFormat::Json).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_markdown_skips_matrix_when_disabled() {
        let mut result = result();
        result.matrix = None;
        let md = to_markdown(&result);
        assert!(!md.contains("## Trade-off Matrix"));
    }
}
