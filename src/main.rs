//! Taixiu - Adaptive Ensemble Predictor
//!
//! Replays recorded Tai/Xiu rounds and forecasts the next one.

use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{fmt, EnvFilter};

use taixiu_oracle::adapters::cli::{self, resolve_config_path, CheckConfigCmd, Command, PredictCmd, ReplayCmd};
use taixiu_oracle::adapters::RoundFileSource;
use taixiu_oracle::application::{PredictionOrchestrator, RoundForecast};
use taixiu_oracle::config::{load_config, Config};
use taixiu_oracle::strategy::EnsembleConfig;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (TAIXIU_CONFIG / TAIXIU_HISTORY go here)
    dotenvy::dotenv().ok();

    let app = cli::init();

    let config_flag = match &app.command {
        Command::Replay(cmd) => cmd.config.clone(),
        Command::Predict(cmd) => cmd.config.clone(),
        Command::CheckConfig(cmd) => cmd.config.clone(),
    };
    let config_path = resolve_config_path(config_flag);
    let config = load(config_path.as_ref())?;
    init_logging(app.verbose, app.debug, &config.logging.level)?;

    if let Some(path) = &config_path {
        tracing::info!("Config: {}", path.display());
    }

    match app.command {
        Command::Replay(cmd) => replay_command(cmd, config).await,
        Command::Predict(cmd) => predict_command(cmd, config).await,
        Command::CheckConfig(cmd) => check_config_command(cmd, config_path, config),
    }
}

fn init_logging(verbose: bool, debug: bool, level: &str) -> Result<()> {
    let filter = if debug {
        EnvFilter::new("debug")
    } else if verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
    };

    // stdout carries forecasts, logs go to stderr
    fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
    Ok(())
}

fn load(path: Option<&PathBuf>) -> Result<Config> {
    match path {
        Some(path) => load_config(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display())),
        None => Ok(Config::default()),
    }
}

fn resolve_input(flag: Option<PathBuf>, config: &Config) -> Result<PathBuf> {
    match flag.or_else(|| config.feed.get_input_path()) {
        Some(path) => Ok(path),
        None => bail!("No round feed given: pass --input, set TAIXIU_HISTORY or [feed].input"),
    }
}

async fn build_orchestrator(input: &Path, config: &Config) -> Result<PredictionOrchestrator> {
    let source = RoundFileSource::from_path(input)
        .await
        .with_context(|| format!("Failed to load round feed {}", input.display()))?;

    let orchestrator = PredictionOrchestrator::new(EnsembleConfig::from(config), Arc::new(source))
        .context("Failed to create orchestrator")?
        .with_poll_interval(Duration::from_millis(config.feed.poll_interval_ms));
    Ok(orchestrator)
}

fn print_forecast(forecast: &RoundForecast, json: bool) {
    if json {
        match serde_json::to_string(forecast) {
            Ok(line) => println!("{}", line),
            Err(e) => tracing::error!("Failed to serialise forecast: {}", e),
        }
    } else {
        println!(
            "Round {:>8} | Next {:>8} → {:<4} {:>7} | {}",
            forecast.previous_round,
            forecast.next_round,
            forecast.prediction,
            forecast.confidence_pct,
            forecast.rationale
        );
    }
}

async fn replay_command(cmd: ReplayCmd, config: Config) -> Result<()> {
    let input = resolve_input(cmd.input, &config)?;
    let orchestrator = build_orchestrator(&input, &config).await?;

    // Setup Ctrl+C handler
    let orch = orchestrator.clone();
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        tracing::info!("Shutdown signal received");
        orch.stop().await;
    });

    let json = cmd.json;
    orchestrator.run(|forecast| print_forecast(forecast, json)).await?;

    let report = orchestrator.performance_report().await;
    if json {
        println!("{}", serde_json::to_string(&report).context("Failed to serialise report")?);
        return Ok(());
    }

    println!();
    println!("Rounds ingested: {}", report.rounds_ingested);
    match report.hit_rate {
        Some(rate) => println!(
            "Forecast hit rate: {}/{} ({:.2}%)",
            report.forecasts_correct,
            report.forecasts_scored,
            rate * 100.0
        ),
        None => println!("Forecast hit rate: n/a"),
    }
    println!("{:<16} {:>8} {:>8} {:>8} {:>7}", "model", "scored", "acc", "recent", "weight");
    for (kind, weight) in &report.weights {
        let perf = report.models.get(kind).cloned().unwrap_or_default();
        println!(
            "{:<16} {:>8} {:>7.2}% {:>7.2}% {:>7.2}",
            kind.name(),
            perf.total,
            perf.accuracy() * 100.0,
            perf.recent_accuracy() * 100.0,
            weight
        );
    }
    Ok(())
}

async fn predict_command(cmd: PredictCmd, config: Config) -> Result<()> {
    let input = resolve_input(cmd.input, &config)?;
    let orchestrator = build_orchestrator(&input, &config).await?;
    orchestrator.run(|_| {}).await?;

    let Some(forecast) = orchestrator.latest_forecast().await else {
        bail!("Round feed {} contained no usable rounds", input.display());
    };

    let output = if cmd.detailed {
        let details = orchestrator.latest_prediction().await;
        serde_json::json!({
            "forecast": forecast,
            "details": details,
        })
    } else {
        serde_json::to_value(&forecast).context("Failed to serialise forecast")?
    };
    println!("{}", serde_json::to_string_pretty(&output).context("Failed to serialise forecast")?);
    Ok(())
}

fn check_config_command(_cmd: CheckConfigCmd, path: Option<PathBuf>, config: Config) -> Result<()> {
    let ensemble = EnsembleConfig::from(&config);
    match path {
        Some(path) => println!("✓ Configuration valid: {}", path.display()),
        None => println!("✓ No configuration file found, using defaults"),
    }
    println!("  History bound:     {}", ensemble.max_history);
    println!("  Pattern lengths:   {}..={}", ensemble.min_pattern_len, ensemble.max_pattern_len);
    match ensemble.pattern_capacity {
        Some(capacity) => println!("  Pattern capacity:  {}", capacity),
        None => println!("  Pattern capacity:  unbounded"),
    }
    println!("  Weight bounds:     [{}, {}]", ensemble.min_weight, ensemble.max_weight);
    println!("  Spread threshold:  {}", ensemble.spread_threshold);
    match ensemble.break_probability {
        Some(p) => println!("  Break probability: {} (fixed)", p),
        None => println!("  Break probability: estimated from history"),
    }
    println!("  Tie break:         {:?}", ensemble.tie_break);
    Ok(())
}
