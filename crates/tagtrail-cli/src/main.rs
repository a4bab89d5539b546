//! Tagtrail CLI - practice statistics and problem recommendations

use std::sync::Arc;

use clap::{Parser, Subcommand};
use tagtrail_core::config::Config;
use tagtrail_core::domain::recommendation::{
    ExclusionMode, FilterCode, RecommendationRepository, RecommendationRepositoryTrait,
    RecommendationRequest, RecommendationService,
};
use tagtrail_core::storage::{Database, DatabaseConfig};
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "tagtrail")]
#[command(author, version, about = "Practice tracker and problem recommender", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format (text or json)
    #[arg(long, global = true, default_value = "text")]
    format: OutputFormat,

    /// Quiet mode (minimal output)
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Clone, Copy, Default, clap::ValueEnum)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Recommend problems to solve next
    Recommend {
        /// User id
        #[arg(short, long)]
        user: Uuid,
        /// How many problems to recommend (default from config)
        #[arg(short, long)]
        count: Option<usize>,
        /// Difficulty filter (easy, normal, hard, extreme); repeatable
        #[arg(short, long)]
        filter: Vec<String>,
        /// Restrict to explicit tag keys; repeatable
        #[arg(short, long)]
        tag: Vec<String>,
        /// Reject any problem touching an excluded tag
        #[arg(long)]
        strict: bool,
        /// Fixed sampling seed (reproducible runs)
        #[arg(long)]
        seed: Option<u64>,
    },

    /// List active tags
    Tags,

    /// Show per-tag solve statistics
    Stats {
        /// User id
        #[arg(short, long)]
        user: Uuid,
    },

    /// Run health check
    Doctor,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Recommend {
            user,
            count,
            filter,
            tag,
            strict,
            seed,
        } => cmd_recommend(user, count, filter, tag, strict, seed, cli.format, cli.quiet).await,
        Commands::Tags => cmd_tags(cli.format).await,
        Commands::Stats { user } => cmd_stats(user, cli.format).await,
        Commands::Doctor => cmd_doctor(cli.quiet).await,
    }
}

async fn open_database(config: &Config) -> anyhow::Result<Database> {
    let path = config.database_path()?;
    Database::new(DatabaseConfig::with_path(path)).await
}

#[allow(clippy::too_many_arguments)]
async fn cmd_recommend(
    user: Uuid,
    count: Option<usize>,
    filters: Vec<String>,
    tags: Vec<String>,
    strict: bool,
    seed: Option<u64>,
    format: OutputFormat,
    quiet: bool,
) -> anyhow::Result<()> {
    let config = Config::load()?;
    let db = open_database(&config).await?;

    let mut request =
        RecommendationRequest::new(user, count.unwrap_or(config.recommendation.default_count));
    for name in &filters {
        let code = FilterCode::from_str(name)
            .ok_or_else(|| anyhow::anyhow!("Unknown difficulty filter '{}'", name))?;
        request = request.with_filter(code);
    }
    if !tags.is_empty() {
        request = request.with_tags(tags);
    }
    if strict {
        request = request.with_exclusion_mode(ExclusionMode::Strict);
    }
    if let Some(seed) = seed {
        request = request.with_seed(seed);
    }

    let repository = RecommendationRepository::new(db.pool().clone());
    let service = RecommendationService::new(Arc::new(repository))
        .with_settings(config.recommendation.clone());
    let recommendations = service.recommend(&request).await?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&recommendations)?);
        }
        OutputFormat::Text => {
            if recommendations.is_empty() {
                if !quiet {
                    println!("No recommendations found. Try a different filter or sync first.");
                }
                return Ok(());
            }

            if !quiet {
                println!("Recommended problems:");
                println!();
            }
            for (index, recommendation) in recommendations.iter().enumerate() {
                println!(
                    "{}. [tier {:>2}] {} (#{})",
                    index + 1,
                    recommendation.problem.tier,
                    recommendation.problem.title,
                    recommendation.problem.id
                );
                println!("   tag: {}", recommendation.tag_name);
                for reason in &recommendation.reasons {
                    println!("   - {}", reason);
                }
            }
        }
    }
    Ok(())
}

async fn cmd_tags(format: OutputFormat) -> anyhow::Result<()> {
    let config = Config::load()?;
    let db = open_database(&config).await?;
    let repository = RecommendationRepository::new(db.pool().clone());
    let tags = repository.list_active_tags().await?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&tags)?);
        }
        OutputFormat::Text => {
            if tags.is_empty() {
                println!("No active tags. Run a sync first.");
                return Ok(());
            }
            println!("Active tags:");
            for tag in &tags {
                let prerequisites = if tag.parent_ids.is_empty() {
                    String::new()
                } else {
                    format!("  (requires {} parent tags)", tag.parent_ids.len())
                };
                println!(
                    "  {:<20} {} [level {}]{}",
                    tag.key, tag.display_name, tag.level, prerequisites
                );
            }
        }
    }
    Ok(())
}

async fn cmd_stats(user: Uuid, format: OutputFormat) -> anyhow::Result<()> {
    let config = Config::load()?;
    let db = open_database(&config).await?;
    let repository = RecommendationRepository::new(db.pool().clone());

    let stats = repository.list_tag_stats(user).await?;
    let tags = repository.list_active_tags().await?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
        OutputFormat::Text => {
            if stats.is_empty() {
                println!("No statistics yet. Run a sync first.");
                return Ok(());
            }
            println!("Per-tag statistics:");
            for stat in &stats {
                let name = tags
                    .iter()
                    .find(|tag| tag.id == stat.tag_id)
                    .map(|tag| tag.display_name.as_str())
                    .unwrap_or("(unknown tag)");
                let highest = stat
                    .highest_tier_achieved
                    .map(|tier| tier.to_string())
                    .unwrap_or_else(|| "-".to_string());
                let last = stat
                    .last_solved_date
                    .map(|date| date.to_string())
                    .unwrap_or_else(|| "-".to_string());
                println!(
                    "  {:<20} solved: {:>4}  highest tier: {:>3}  last solved: {}",
                    name, stat.solved_problem_count, highest, last
                );
            }
        }
    }
    Ok(())
}

async fn cmd_doctor(quiet: bool) -> anyhow::Result<()> {
    let config = Config::load()?;
    let db = open_database(&config).await?;

    db.health_check().await?;
    let status = db.migration_status().await?;

    if !quiet {
        println!("Database: {}", db.path().display());
        println!("  Health: ok");
        println!(
            "  Schema: v{} (target v{})",
            status.current_version, status.target_version
        );
        if status.needs_migration {
            println!("  [WARNING] Migrations pending");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_recommend_args_parse() {
        let cli = Cli::try_parse_from([
            "tagtrail",
            "recommend",
            "--user",
            "550e8400-e29b-41d4-a716-446655440000",
            "--count",
            "2",
            "--filter",
            "hard",
            "--strict",
        ])
        .unwrap();

        match cli.command {
            Commands::Recommend {
                count,
                filter,
                strict,
                ..
            } => {
                assert_eq!(count, Some(2));
                assert_eq!(filter, vec!["hard".to_string()]);
                assert!(strict);
            }
            _ => panic!("expected recommend command"),
        }
    }

    #[test]
    fn test_bad_user_id_is_rejected() {
        let result = Cli::try_parse_from(["tagtrail", "recommend", "--user", "not-a-uuid"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_unknown_filter_resolves_to_none() {
        assert!(FilterCode::from_str("bogus").is_none());
        assert_eq!(FilterCode::from_str("extreme"), Some(FilterCode::Extreme));
    }
}
