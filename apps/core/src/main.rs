use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::io::{self, Read};
use tracing::info;

use homebridge_core::analysis::{decode_entry, StrategyView};
use homebridge_core::{telemetry, EngineConfig, WellnessAnalyzer};

/// HomeBridge - journal entry analysis for international students.
#[derive(Parser, Debug)]
#[command(name = "homebridge")]
#[command(version)]
#[command(
    about = "Analyze a journal entry for sentiment, homesickness and coping strategies.",
    long_about = None
)]
struct Cli {
    /// Seed the strategy draw for repeatable output
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Pretty-print the JSON output
    #[arg(long, global = true)]
    pretty: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Analyze one entry. Reads stdin when no text is given.
    Analyze {
        text: Option<String>,

        /// Skip the external provider even if one is configured
        #[arg(long)]
        local_only: bool,
    },
    /// Recommend strategies for an entry with a known homesickness level
    Strategies {
        text: Option<String>,

        /// Previously computed level (1-10)
        #[arg(long)]
        level: i64,
    },
}

fn read_entry(text: Option<String>) -> Result<String> {
    match text {
        Some(text) => Ok(text),
        None => {
            let mut buffer = Vec::new();
            io::stdin()
                .read_to_end(&mut buffer)
                .context("failed to read journal entry from stdin")?;
            Ok(decode_entry(&buffer))
        }
    }
}

fn print_json<T: serde::Serialize>(value: &T, pretty: bool) -> Result<()> {
    let json = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{}", json);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = EngineConfig::load();
    telemetry::init_tracing(&config.log_level, config.log_format);

    let analyzer = WellnessAnalyzer::from_config(&config);
    let mut rng = match cli.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    match cli.command {
        Commands::Analyze { text, local_only } => {
            let entry = read_entry(text)?;
            let result = if local_only || !analyzer.has_provider() {
                analyzer.analyze_local_with_rng(&entry, &mut rng)
            } else {
                analyzer.analyze_with_rng(&entry, &mut rng).await
            };
            print_json(&result.to_response(), cli.pretty)?;
        }
        Commands::Strategies { text, level } => {
            if !(1..=10).contains(&level) {
                bail!("--level must be between 1 and 10, got {}", level);
            }
            let entry = read_entry(text)?;
            let strategies = analyzer.select_strategies_for_with_rng(&entry, level, &mut rng);
            info!(count = strategies.len(), "Selected strategies");
            let views: Vec<StrategyView> = strategies.iter().map(StrategyView::from).collect();
            print_json(&views, cli.pretty)?;
        }
    }

    Ok(())
}
