use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use referee::cli::{build_request, load_knowledge, CompareOptions};
use referee::knowledge::ProfileSource;
use referee::pipeline::Referee;
use referee::report::{render, ReportFormat};
use referee::types::{ComparisonResult, ConfidenceLevel, MarginClass};

#[derive(Parser)]
#[command(name = "referee")]
#[command(version, about = "Technology comparison and recommendation engine", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Compare technologies against project requirements
    Compare {
        /// Technologies to compare (2 to 5 names)
        technologies: Vec<String>,

        /// Team size
        #[arg(long, default_value_t = 3)]
        team_size: u32,

        /// Budget level: low, medium, high
        #[arg(long, default_value = "medium")]
        budget: String,

        /// Timeline: tight, moderate, flexible
        #[arg(long, default_value = "moderate")]
        timeline: String,

        /// Scalability needs: small, medium, large
        #[arg(long, default_value = "medium")]
        scalability: String,

        /// Team expertise: beginner, intermediate, expert
        #[arg(long, default_value = "intermediate")]
        expertise: String,

        /// Additional comparison dimension (repeatable)
        #[arg(long = "dimension")]
        dimensions: Vec<String>,

        /// Score unknown technologies with limited-data placeholders
        #[arg(long)]
        allow_unknown: bool,

        /// Skip the trade-off matrix
        #[arg(long)]
        no_matrix: bool,

        /// Skip the recommendation section
        #[arg(long)]
        no_recommendation: bool,

        /// Compare at most this many technologies
        #[arg(long)]
        max_technologies: Option<usize>,

        /// Output format: markdown, json, or terminal display
        #[arg(long, short)]
        format: Option<String>,

        /// Extra profile definitions to overlay on the knowledge base
        #[arg(long)]
        knowledge: Option<PathBuf>,
    },

    /// List technologies in the knowledge base
    List {
        /// Extra profile definitions to overlay on the knowledge base
        #[arg(long)]
        knowledge: Option<PathBuf>,
    },

    /// Show one technology profile
    Show {
        /// Technology name
        name: String,

        /// Extra profile definitions to overlay on the knowledge base
        #[arg(long)]
        knowledge: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter_layer = if cli.debug {
        tracing_subscriber::EnvFilter::new("debug")
    } else if cli.verbose {
        tracing_subscriber::EnvFilter::new("info")
    } else {
        tracing_subscriber::EnvFilter::new("warn")
    };

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Referee v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Commands::Compare {
            technologies,
            team_size,
            budget,
            timeline,
            scalability,
            expertise,
            dimensions,
            allow_unknown,
            no_matrix,
            no_recommendation,
            max_technologies,
            format,
            knowledge,
        } => {
            let options = CompareOptions {
                technologies,
                team_size,
                budget,
                timeline,
                scalability,
                expertise,
                custom_dimensions: dimensions,
                allow_unknown,
                no_matrix,
                no_recommendation,
                max_technologies,
            };
            let request = build_request(&options)?;
            let kb = load_knowledge(knowledge.as_deref())?;
            let result = Referee::with_source(kb)
                .compare(&request)
                .context("comparison failed")?;

            match format.as_deref() {
                Some(name) => {
                    let format: ReportFormat = name.parse()?;
                    println!("{}", render(&result, format)?);
                }
                None => display_result(&result),
            }
        }
        Commands::List { knowledge } => {
            let kb = load_knowledge(knowledge.as_deref())?;
            let mut by_category: std::collections::BTreeMap<&str, Vec<&str>> =
                std::collections::BTreeMap::new();
            for name in kb.known_names() {
                if let Some(profile) = kb.resolve(name) {
                    by_category
                        .entry(profile.category.as_str())
                        .or_default()
                        .push(name);
                }
            }
            println!("{}", "Known technologies".bright_cyan().bold());
            for (category, names) in by_category {
                println!("  {}", category.bold());
                for name in names {
                    println!("    {}", name);
                }
            }
        }
        Commands::Show { name, knowledge } => {
            let kb = load_knowledge(knowledge.as_deref())?;
            let profile = kb
                .resolve(&name)
                .with_context(|| format!("'{}' is not in the knowledge base", name))?;
            display_profile(profile);
        }
    }

    Ok(())
}

/// Terminal display of a comparison result
fn display_result(result: &ComparisonResult) {
    println!();
    println!("{}", "Technology Comparison".bright_cyan().bold());
    println!("{}", "-".repeat(50).dimmed());

    for warning in &result.warnings {
        println!("  {} {}", "!".bright_yellow(), warning.yellow());
    }
    if !result.warnings.is_empty() {
        println!();
    }

    println!("{}", "Weighted criteria:".bold());
    for (dim, weight) in result.criteria.ranked_dimensions() {
        println!("  {:<14} {:>5.1}%", format!("{}", dim), weight * 100.0);
    }
    println!();

    if let Some(matrix) = &result.matrix {
        println!("{}", "Trade-off matrix (1-5):".bold());
        print!("  {:<14}", "");
        for dim in &matrix.dimensions {
            print!("{:>13}", format!("{}", dim));
        }
        println!();
        for (row, tech) in matrix.technologies.iter().enumerate() {
            print!("  {:<14}", tech);
            for cell in &matrix.scores[row] {
                match cell {
                    Some(score) => print!("{:>13.1}", score),
                    None => print!("{:>13}", "-".dimmed()),
                }
            }
            println!();
        }
        println!();
        for highlight in &matrix.highlights {
            println!(
                "  {} leads on {}",
                highlight.leader.bright_green(),
                highlight.dimension
            );
        }
        println!();
    }

    if let Some(recommendation) = &result.recommendation {
        println!("{}", "Recommendation:".bold());
        for (rank, choice) in recommendation.ranked_choices.iter().enumerate() {
            let name = if rank == 0 {
                choice.technology.bright_green().bold()
            } else {
                choice.technology.normal()
            };
            println!(
                "  {}. {} ({:.0}%, confidence {})",
                rank + 1,
                name,
                choice.score * 100.0,
                colored_confidence(choice.confidence)
            );
            println!("     {}", choice.reasoning.dimmed());
        }
        println!();
        let margin = format!("{}", recommendation.margin);
        match recommendation.margin {
            MarginClass::ClearPreference => println!("  Margin: {}", margin.bright_green()),
            MarginClass::ModeratePreference => println!("  Margin: {}", margin.yellow()),
            MarginClass::CloseMatch => println!("  Margin: {}", margin.bright_yellow()),
        }
        println!();

        println!("{}", "Key decision factors:".bold());
        for factor in &recommendation.key_decision_factors {
            println!("  - {}", factor);
        }
        if !recommendation.caveats.is_empty() {
            println!();
            println!("{}", "Caveats:".bold());
            for caveat in &recommendation.caveats {
                println!("  {} {}", "!".bright_yellow(), caveat);
            }
        }
        if let Some(scenarios) = &recommendation.alternative_scenarios {
            println!();
            println!("{}", "Alternative scenarios:".bold());
            for scenario in scenarios {
                println!(
                    "  {}: {}",
                    scenario.scenario,
                    scenario.recommended_tech.bright_cyan()
                );
            }
        }
    }
    println!();
}

fn colored_confidence(confidence: ConfidenceLevel) -> colored::ColoredString {
    match confidence {
        ConfidenceLevel::High => "HIGH".bright_green(),
        ConfidenceLevel::Medium => "MEDIUM".yellow(),
        ConfidenceLevel::Low => "LOW".bright_red(),
    }
}

/// Terminal display of a single profile
fn display_profile(profile: &referee::types::TechnologyProfile) {
    println!();
    println!(
        "{} {}",
        profile.name.bright_cyan().bold(),
        format!("({}, {})", profile.category, profile.metadata.maturity).dimmed()
    );
    println!("{}", "-".repeat(50).dimmed());

    println!("{}", "Dimensions:".bold());
    for (dim, rating) in &profile.dimensions {
        match rating.score() {
            Some(score) => println!("  {:<14} {:.1}  {}", format!("{}", dim), score, rating.explanation().dimmed()),
            None => println!("  {:<14} {}", format!("{}", dim), "limited data".dimmed()),
        }
    }

    println!();
    println!("{}", "Pros:".bold());
    for pro in &profile.pros {
        println!("  {} {}", "+".bright_green(), pro);
    }
    println!("{}", "Cons:".bold());
    for con in &profile.cons {
        println!("  {} {}", "-".bright_red(), con);
    }
    println!("{}", "Best for:".bold());
    for best in &profile.best_for {
        println!("  {} {}", "*".bright_cyan(), best);
    }
    println!();
}
