use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use meta_tiers::api::routes::refresh::run_periodic;
use meta_tiers::api::state::AppState;
use meta_tiers::calculate::MetaAggregator;
use meta_tiers::config::AppConfig;
use meta_tiers::models::{display_name, DeckAggregate, MatchupData, Tier};
use meta_tiers::parse_duration;
use meta_tiers::storage::{
    read_match_records, read_report, write_report, DerivedReport, LoadedDataset, StorageConfig,
};

#[derive(Parser)]
#[command(name = "meta-tiers")]
#[command(about = "Tier lists and matchup charts from deck matchup exports")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(long, default_value = "./config.toml")]
    config: PathBuf,

    /// Data directory path (overrides the config file)
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    /// Output logs as JSON
    #[arg(long)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the tier list for a matchup export
    Report {
        /// Export to read instead of the configured dataset
        #[arg(long)]
        input: Option<PathBuf>,

        /// Print the full aggregation as JSON
        #[arg(long)]
        json: bool,
    },

    /// Aggregate the export and write the derived report snapshot
    Derive {
        /// Export to read instead of the configured dataset
        #[arg(long)]
        input: Option<PathBuf>,

        /// Recompute even if the snapshot matches the export
        #[arg(long)]
        force: bool,
    },

    /// Show one deck's matchups and insights
    Matchups {
        /// Deck name or slug
        deck: String,

        /// Export to read instead of the configured dataset
        #[arg(long)]
        input: Option<PathBuf>,
    },

    /// Start the API server
    Serve {
        /// Bind address (overrides the config file)
        #[arg(long)]
        host: Option<String>,

        /// Port number (overrides the config file)
        #[arg(long)]
        port: Option<u16>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = load_config(&cli.config)?;
    if let Some(ref data_dir) = cli.data_dir {
        config.data_dir = data_dir.clone();
    }
    if let Some(ref level) = cli.log_level {
        config.log_level = level.clone();
    }

    init_tracing(&config.log_level, cli.json_logs);
    tracing::info!("Starting meta-tiers v{}", env!("CARGO_PKG_VERSION"));

    let storage = StorageConfig::new(config.data_dir.clone());

    match cli.command {
        Commands::Report { input, json } => {
            let path = dataset_path(&config, &storage, input);
            let loaded = read_match_records(&path, config.aggregation.strict)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            let report = aggregate(&config, loaded, &path)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&report.result)?);
            } else {
                print_tier_list(&report);
            }
        }
        Commands::Derive { input, force } => {
            let path = dataset_path(&config, &storage, input);
            let loaded = read_match_records(&path, config.aggregation.strict)
                .with_context(|| format!("Failed to read {}", path.display()))?;

            if !force {
                if let Some(existing) = read_report(&storage)? {
                    if existing.dataset_id == loaded.id {
                        tracing::info!(
                            "Report for dataset {} is up to date, use --force to recompute",
                            loaded.id
                        );
                        return Ok(());
                    }
                }
            }

            let report = aggregate(&config, loaded, &path)?;
            write_report(&storage, &report)?;
            println!(
                "Derived {} ranked decks from {} ({} skipped records)",
                report.result.deck_count(),
                report.source,
                report.result.skipped_records
            );
        }
        Commands::Matchups { deck, input } => {
            let path = dataset_path(&config, &storage, input);
            let loaded = read_match_records(&path, config.aggregation.strict)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            let report = aggregate(&config, loaded, &path)?;
            let result = &report.result;

            let Some(found) = result.find_deck(&deck) else {
                if result.unranked_decks.iter().any(|d| d == &deck) {
                    bail!(
                        "Deck {} has fewer than {} games and is not ranked",
                        deck,
                        config.aggregation.min_deck_games
                    );
                }
                bail!("Deck {} not found", deck);
            };

            print_deck(found);
            if let Some(insights) = result.insights.get(&found.name) {
                println!(
                    "{} tier, rank {} of {} by performance, {} by popularity",
                    insights.tier,
                    insights.performance.rank,
                    insights.total_decks,
                    insights.popularity.rank
                );
            }
            println!();
            let matchups = result.matchups.get(&found.name).map(Vec::as_slice).unwrap_or(&[]);
            print_matchups(matchups);
        }
        Commands::Serve { host, port } => {
            let config = config
                .with_server_overrides(host, port)
                .context("Invalid server options")?;
            let addr = format!("{}:{}", config.server.host, config.server.port);
            let refresh_interval = config.server.refresh_interval.clone();

            let state = AppState::new(config)?;
            match read_report(&storage) {
                Ok(Some(report)) => {
                    tracing::info!("Loaded derived report for dataset {}", report.dataset_id);
                    state.seed(report).await;
                }
                Ok(None) => {}
                Err(e) => tracing::warn!("Ignoring unreadable derived report: {}", e),
            }

            if let Some(every) = refresh_interval.as_deref().and_then(parse_duration) {
                tokio::spawn(run_periodic(state.clone(), every));
            }

            let app = meta_tiers::api::build_router(state);
            let listener = tokio::net::TcpListener::bind(&addr).await?;
            tracing::info!("Dashboard API: http://{}", addr);
            axum::serve(listener, app).await?;
        }
    }

    Ok(())
}

fn load_config(path: &PathBuf) -> Result<AppConfig> {
    if !path.exists() {
        return Ok(AppConfig::default());
    }
    AppConfig::from_file(path).with_context(|| format!("Invalid config file {}", path.display()))
}

fn init_tracing(level: &str, json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

fn dataset_path(config: &AppConfig, storage: &StorageConfig, input: Option<PathBuf>) -> PathBuf {
    input.unwrap_or_else(|| storage.dataset_path(&config.dataset))
}

fn aggregate(config: &AppConfig, loaded: LoadedDataset, path: &Path) -> Result<DerivedReport> {
    let aggregator = MetaAggregator::new(config.aggregation.clone())?;
    let result = aggregator.aggregate_dataset(&loaded.dataset)?;
    let source = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(&config.dataset)
        .to_string();
    Ok(DerivedReport::new(loaded.id, source, result))
}

fn print_tier_list(report: &DerivedReport) {
    let result = &report.result;
    println!(
        "=== Meta Tiers: {} ({} ranked decks, {} games) ===",
        report.source,
        result.deck_count(),
        result.total_games
    );

    for tier in Tier::ALL {
        let decks = result.tiers.get(tier);
        if decks.is_empty() {
            continue;
        }
        println!("\n{} tier", tier);
        for deck in decks {
            print_deck(deck);
        }
    }

    if !result.unranked_decks.is_empty() {
        println!("\nUnranked: {}", result.unranked_decks.join(", "));
    }
    if result.skipped_records > 0 {
        println!("Skipped {} malformed records", result.skipped_records);
    }
}

fn print_deck(deck: &DeckAggregate) {
    println!(
        "  {:<30} {:>5.1}% win  {:>5.1}% share  {:>6} games  {:>2} favorable  score {:.1}",
        display_name(&deck.name),
        deck.win_rate,
        deck.meta_share,
        deck.total_games,
        deck.favorable_matchup_count,
        deck.performance_score
    );
}

fn print_matchups(matchups: &[MatchupData]) {
    if matchups.is_empty() {
        println!("No qualifying matchups");
        return;
    }
    for m in matchups {
        let marker = if m.synthesized { " (inferred)" } else { "" };
        println!(
            "  vs {:<30} {:>5.1}%  {:>6} games{}",
            display_name(&m.opponent),
            m.win_rate,
            m.games,
            marker
        );
    }
}
