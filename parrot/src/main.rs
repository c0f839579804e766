use clap::{Parser, Subcommand, ValueEnum};
use drain::prelude::*;
use parrot::FileConfig;
use source::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "parrot")]
#[command(about = "Relay Xray test plan results to chat channels")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Collect the results of a test plan and publish them
    Report {
        /// Path to the TOML configuration file
        #[arg(short, long)]
        config: PathBuf,
        /// Test plan issue key, overrides `test_plan` from the configuration
        #[arg(short, long)]
        test_plan: Option<String>,
        /// Where to publish (defaults to teams when configured, stdout otherwise)
        #[arg(short, long, value_enum)]
        drain: Option<DrainKind>,
    },
    /// Check that Jira is reachable with the configured credentials
    Health {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Print the parsed configuration
    ShowConfig {
        #[arg(short, long)]
        config: PathBuf,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum DrainKind {
    Teams,
    Stdout,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Report {
            config,
            test_plan,
            drain,
        } => report(&config, test_plan, drain).await,
        Commands::Health { config } => health_check(&config).await,
        Commands::ShowConfig { config } => show_config(&config),
    };

    if let Err(e) = &result {
        error!("{}", e);
    }
    result
}

async fn report(
    path: &Path,
    test_plan: Option<String>,
    drain: Option<DrainKind>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = FileConfig::load(path)?;
    let test_plan_key = config.test_plan_key(test_plan)?;

    let drain = match drain {
        Some(kind) => kind,
        None if config.drain.microsoft_teams.is_some() => DrainKind::Teams,
        None => DrainKind::Stdout,
    };
    // webhook is resolved before any request is sent
    let teams = match drain {
        DrainKind::Teams => Some(config.teams_config()?.ok_or_else(|| {
            parrot::ConfigError::Invalid {
                message: "No [drain.microsoft_teams] table in the configuration".to_string(),
            }
        })?),
        DrainKind::Stdout => None,
    };

    let source = config.build_source().await?;
    info!(
        "Collecting results of {} from {}",
        test_plan_key,
        source.source_name()
    );
    let results = source.get_test_results(&test_plan_key).await?;

    match teams {
        Some(teams) => {
            let drain = MicrosoftTeamsDrain::new(teams)?;
            drain.write_test_results(&results).await?;
            let summary = results.summary();
            eprintln!(
                "✓ Posted {} results of {} ({} passed, {} failed) to Microsoft Teams",
                summary.total, results.id, summary.passed, summary.failed
            );
        }
        None => {
            JsonDrain::stdout().write_test_results(&results).await?;
        }
    }

    Ok(())
}

async fn health_check(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let config = FileConfig::load(path)?;
    let client = JiraClient::new(config.jira_config()?)?;

    println!("Performing health check against {}...", client.base_url());

    match client.health_check().await {
        Ok(()) => {
            println!("✓ Health check passed. Jira is running and accessible.");
            info!("Health check successful");
        }
        Err(e) => {
            println!("✗ Health check failed: {}", e);
            return Err(e.into());
        }
    }

    Ok(())
}

fn show_config(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let config = FileConfig::load(path)?;
    print!("{}", config.to_toml()?);
    Ok(())
}
