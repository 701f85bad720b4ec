use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{anyhow, bail, Result};
use clap::{Parser, Subcommand, ValueEnum};
use ecosafe::comparison::{
    run_comparison, validate_mock_distance, ComparisonReport, ComparisonRequest,
};
use ecosafe::config::{Config, ConfigOverrides, ProviderKind};
use ecosafe::modes::parse_mode_list;
use ecosafe::output::csv::{comparison_to_csv, progress_to_csv};
use ecosafe::output::json::render_json;
use ecosafe::output::table::{
    render_achievements_table, render_comparison_table, render_deltas_table,
    render_failures_table, render_impact_table, render_progress_table,
};
use ecosafe::progress::events::{LogListener, StdoutListener};
use ecosafe::progress::store::SqliteStateStore;
use ecosafe::progress::{local_today, ProgressSummary, ProgressTracker, RecordOutcome};
use ecosafe::provider::provider_from_config;
use ecosafe::ranking::Preference;
use ecosafe::server::run_server;
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
    Csv,
}

#[derive(Debug, Parser)]
#[command(
    name = "ecosafe",
    about = "Compare travel modes by time, CO2 and active calories"
)]
struct Cli {
    #[arg(short, long)]
    config: Option<PathBuf>,
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
    output: OutputFormat,
    #[arg(long)]
    provider: Option<ProviderKind>,
    #[arg(long = "provider-url")]
    provider_url: Option<String>,
    #[arg(long = "db")]
    db_path: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    Compare {
        #[arg(long, default_value = "")]
        from: String,
        #[arg(long, default_value = "")]
        to: String,
        /// Offline comparison over a fixed distance in km.
        #[arg(long)]
        distance: Option<f64>,
        #[arg(long)]
        modes: Option<String>,
        #[arg(long)]
        preference: Option<Preference>,
        #[arg(long = "trips-per-week")]
        trips_per_week: Option<f64>,
        #[arg(long)]
        record: bool,
    },
    Progress,
    Reset {
        #[arg(long)]
        yes: bool,
    },
    Serve {
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
        #[arg(long, default_value_t = 3000)]
        port: u16,
    },
    Config {
        #[arg(long)]
        init: bool,
        #[arg(long)]
        show: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
    let cli = Cli::parse();

    let config_path = cli.config.clone().unwrap_or_else(Config::default_path);
    let mut config = Config::load(Some(&config_path))?;
    config.apply_overrides(ConfigOverrides {
        provider_kind: cli.provider,
        provider_url: cli.provider_url.clone(),
        db_path: cli.db_path.clone(),
        ..ConfigOverrides::default()
    });

    if matches!(cli.command, Commands::Config { .. }) {
        return handle_config_command(&cli.command, &config, &config_path);
    }
    if let Commands::Serve { host, port } = &cli.command {
        let bind = format!("{host}:{port}");
        let addr: SocketAddr = bind
            .parse()
            .map_err(|e| anyhow!("invalid bind address {bind}: {e}"))?;
        return run_server(config, addr).await;
    }

    let db_path = config.resolved_db_path();
    let store = SqliteStateStore::open(&db_path)?;
    let mut tracker = ProgressTracker::new(&store);
    if config.notifications.log_progress {
        tracker.add_listener(Box::new(LogListener));
    }
    if config.notifications.enable_stdout && matches!(cli.output, OutputFormat::Table) {
        tracker.add_listener(Box::new(StdoutListener));
    }

    match &cli.command {
        Commands::Compare {
            from,
            to,
            distance,
            modes,
            preference,
            trips_per_week,
            record,
        } => {
            let modes = match modes {
                Some(raw) => parse_mode_list(raw)?,
                None => config.default_modes()?,
            };
            let (origin, destination) = match distance {
                Some(_) if from.trim().is_empty() && to.trim().is_empty() => {
                    ("Start".to_string(), "Destination".to_string())
                }
                _ => (from.clone(), to.clone()),
            };
            let request = ComparisonRequest {
                origin,
                destination,
                modes,
                preference: preference.unwrap_or(config.comparison.preference),
                trips_per_week: trips_per_week.unwrap_or(config.comparison.trips_per_week),
            };
            if let Some(km) = distance {
                validate_mock_distance(*km).map_err(|e| anyhow!(e.message().to_string()))?;
            }
            let provider = provider_from_config(&config, *distance);
            info!("comparing via {} provider", provider.name());
            let report = run_comparison(provider.as_ref(), &request)
                .await
                .map_err(|e| anyhow!(e.message().to_string()))?;
            let recorded = match (*record, &report.impact) {
                (true, Some(impact)) => Some(RecordedProgress {
                    outcome: tracker.record_today(impact)?,
                    summary: tracker.summary_today(),
                }),
                _ => None,
            };
            print_comparison(&report, recorded.as_ref(), cli.output)?;
            if *record && recorded.is_none() {
                bail!("no usable route to record");
            }
        }
        Commands::Progress => {
            print_progress(&tracker.summary_today(), cli.output)?;
        }
        Commands::Reset { yes } => {
            if !*yes {
                bail!("reset clears all saved progress; pass --yes to confirm");
            }
            let cleared = tracker.reset()?;
            if matches!(cli.output, OutputFormat::Table) {
                println!("Progress reset.");
            }
            print_progress(&ProgressSummary::as_of(&cleared, local_today()), cli.output)?;
        }
        Commands::Config { .. } => {}
        Commands::Serve { .. } => unreachable!("serve command handled before dispatch"),
    }

    Ok(())
}

fn handle_config_command(command: &Commands, config: &Config, config_path: &PathBuf) -> Result<()> {
    let Commands::Config { init, show } = command else {
        return Ok(());
    };
    if *init {
        Config::write_template(config_path)?;
        println!("Wrote config template to {}", config_path.display());
    }
    if *show || !*init {
        println!("{}", render_json(config)?);
    }
    Ok(())
}

#[derive(Debug, Serialize)]
struct RecordedProgress {
    outcome: RecordOutcome,
    summary: ProgressSummary,
}

#[derive(Debug, Serialize)]
struct RecordedComparison<'a> {
    report: &'a ComparisonReport,
    progress: &'a RecordedProgress,
}

fn print_comparison(
    report: &ComparisonReport,
    recorded: Option<&RecordedProgress>,
    format: OutputFormat,
) -> Result<()> {
    match format {
        OutputFormat::Table => {
            if let (Some(start), Some(end)) = (&report.start_address, &report.end_address) {
                println!("{start} -> {end}");
            }
            println!("{}", render_comparison_table(report));
            if !report.failures.is_empty() {
                println!("{}", render_failures_table(&report.failures));
            }
            match &report.impact {
                Some(impact) => println!("{}", render_impact_table(impact)),
                None => println!("No usable route data to rank."),
            }
            if !report.baseline_deltas.is_empty() {
                println!("{}", render_deltas_table(&report.baseline_deltas));
            }
            if let Some(recorded) = recorded {
                println!("{}", record_note(&recorded.outcome));
                print_progress(&recorded.summary, format)?;
            }
        }
        OutputFormat::Json => match recorded {
            Some(progress) => println!(
                "{}",
                render_json(&RecordedComparison { report, progress })?
            ),
            None => println!("{}", render_json(report)?),
        },
        OutputFormat::Csv => {
            print!("{}", comparison_to_csv(report)?);
            if let Some(recorded) = recorded {
                eprintln!("{}", record_note(&recorded.outcome));
            }
        }
    }
    Ok(())
}

fn record_note(outcome: &RecordOutcome) -> &'static str {
    match outcome {
        RecordOutcome::Counted(_) => "Journey recorded.",
        RecordOutcome::Duplicate(_) => "Same result as last time, not counted again.",
        RecordOutcome::Skipped(_) => "Route data unavailable, nothing recorded.",
    }
}

fn print_progress(summary: &ProgressSummary, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => {
            println!("{}", render_progress_table(summary));
            println!("{}", render_achievements_table(summary));
            println!("{}", summary.tree.stage.hint());
        }
        OutputFormat::Json => println!("{}", render_json(summary)?),
        OutputFormat::Csv => print!("{}", progress_to_csv(summary)?),
    }
    Ok(())
}
