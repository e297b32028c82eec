use std::{fs, path::Path};

use clap::{Parser, ValueEnum};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use sentinel_sim::{
    api::ApiClient,
    config::load_config,
    core::error::SentinelError,
    core::types::{LogFilter, ThreatFilter},
    report::{write_report, ReportContent, ReportFormat, ReportOptions, TimeRange},
    sim::{
        runner::{shared, SimulatorRunner},
        TelemetrySimulator,
    },
};

#[derive(Parser, Debug)]
#[command(
    name = "sentinel-sim",
    about = "Synthetic security telemetry with live-backend fallback"
)]
struct Cli {
    /// Path to config file (TOML). Default: config/sentinel.toml
    #[arg(long)]
    config: Option<String>,
    /// Skip the network entirely; serve simulated data only
    #[arg(long)]
    offline: bool,
    /// Fixed RNG seed for reproducible output
    #[arg(long)]
    seed: Option<u64>,
    /// Fetch one snapshot, print it as JSON and exit
    #[arg(long)]
    once: bool,
    /// Log entries to request in --once mode
    #[arg(long, default_value_t = 20)]
    count: usize,
    /// Write a report to this path and exit
    #[arg(long)]
    report: Option<String>,
    /// Report format
    #[arg(long, default_value = "csv", value_enum)]
    format: FormatArg,
    /// Report content
    #[arg(long, default_value = "all", value_enum)]
    content: ContentArg,
    /// Report time range
    #[arg(long, default_value = "24h", value_enum)]
    time_range: RangeArg,
    /// Include resolved threats in the report
    #[arg(long, default_value_t = true)]
    include_resolved: bool,
    /// Increase verbosity (info, debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
    /// Optional log file path
    #[arg(long, default_value = "data/sentinel.log")]
    log_file: String,
    /// Stop the live loop after this many seconds (0 = run until Ctrl-C)
    #[arg(long, default_value_t = 0)]
    duration: u64,
}

#[derive(ValueEnum, Clone, Debug)]
enum FormatArg {
    Csv,
    Md,
    Json,
}

impl From<FormatArg> for ReportFormat {
    fn from(value: FormatArg) -> Self {
        match value {
            FormatArg::Csv => ReportFormat::Csv,
            FormatArg::Md => ReportFormat::Markdown,
            FormatArg::Json => ReportFormat::Json,
        }
    }
}

#[derive(ValueEnum, Clone, Debug)]
enum ContentArg {
    Threats,
    Logs,
    All,
}

impl From<ContentArg> for ReportContent {
    fn from(value: ContentArg) -> Self {
        match value {
            ContentArg::Threats => ReportContent::Threats,
            ContentArg::Logs => ReportContent::Logs,
            ContentArg::All => ReportContent::All,
        }
    }
}

#[derive(ValueEnum, Clone, Debug)]
enum RangeArg {
    #[value(name = "1h")]
    LastHour,
    #[value(name = "24h")]
    Last24Hours,
    #[value(name = "7d")]
    Last7Days,
    #[value(name = "30d")]
    Last30Days,
    All,
}

impl From<RangeArg> for TimeRange {
    fn from(value: RangeArg) -> Self {
        match value {
            RangeArg::LastHour => TimeRange::LastHour,
            RangeArg::Last24Hours => TimeRange::Last24Hours,
            RangeArg::Last7Days => TimeRange::Last7Days,
            RangeArg::Last30Days => TimeRange::Last30Days,
            RangeArg::All => TimeRange::All,
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), SentinelError> {
    let cli = Cli::parse();

    init_tracing(&cli)?;

    let mut cfg = load_config(cli.config.as_deref())?;
    if cli.offline {
        cfg.offline = true;
    }
    if cli.seed.is_some() {
        cfg.simulator.seed = cli.seed;
    }

    let mut simulator = TelemetrySimulator::new(cfg.simulator.clone());
    simulator.seed_initial();
    let sim = shared(simulator);
    let api = ApiClient::new(&cfg, sim.clone())?;

    if let Some(report_path) = &cli.report {
        let options = ReportOptions {
            format: cli.format.into(),
            content: cli.content.into(),
            time_range: cli.time_range.into(),
            include_resolved: cli.include_resolved,
        };
        let threats = api.fetch_threats(&ThreatFilter::default()).await;
        let logs = api.fetch_logs(&LogFilter::default()).await;
        let path = Path::new(report_path);
        write_report(&threats, &logs, &options, path)
            .map_err(|e| SentinelError::Config(e.to_string()))?;
        tracing::info!("report written to {}", path.display());
        return Ok(());
    }

    if cli.once {
        let logs = api
            .fetch_logs(&LogFilter {
                limit: Some(cli.count),
                ..LogFilter::default()
            })
            .await;
        let threats = api.fetch_threats(&ThreatFilter::default()).await;
        let stats = api.fetch_stats().await;
        let snapshot = serde_json::json!({
            "stats": stats,
            "threats": threats,
            "logs": logs,
        });
        let json =
            serde_json::to_string_pretty(&snapshot).map_err(|_| SentinelError::Unknown)?;
        println!("{json}");
        return Ok(());
    }

    let mut runner = SimulatorRunner::new(sim.clone(), &cfg.simulator);
    runner.start();
    tracing::info!("live mode; press Ctrl-C to stop");

    if cli.duration > 0 {
        tokio::select! {
            _ = tokio::time::sleep(std::time::Duration::from_secs(cli.duration)) => {}
            _ = tokio::signal::ctrl_c() => {}
        }
    } else {
        let _ = tokio::signal::ctrl_c().await;
    }
    runner.stop().await;

    let stats = api.fetch_stats().await;
    let json = serde_json::to_string_pretty(&stats).map_err(|_| SentinelError::Unknown)?;
    println!("{json}");
    Ok(())
}

fn init_tracing(cli: &Cli) -> Result<(), SentinelError> {
    let level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let log_path = Path::new(&cli.log_file);
    if let Some(parent) = log_path.parent() {
        fs::create_dir_all(parent).map_err(|e| SentinelError::Config(e.to_string()))?;
    }
    if log_path.exists() {
        if let Ok(meta) = fs::metadata(log_path) {
            if meta.len() > 1_000_000 {
                let rotated = log_path.with_extension("log.1");
                let _ = fs::rename(log_path, rotated);
            }
        }
    }
    let file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)
        .map_err(|e| SentinelError::Config(e.to_string()))?;

    let file_layer = fmt::layer()
        .with_writer(file)
        .with_ansi(false)
        .with_target(false);

    // logs go to stderr so --once JSON output stays clean on stdout
    let stderr_layer = fmt::layer().with_writer(std::io::stderr).with_target(false);

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(stderr_layer)
        .try_init()
        .map_err(|e| SentinelError::Config(e.to_string()))
}
