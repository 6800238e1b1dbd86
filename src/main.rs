use std::path::PathBuf;

use anyhow::Context;
use chrono::{Local, NaiveDate};
use clap::{ArgGroup, Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod advice;
mod config;
mod db;
mod models;
mod report;
mod score;
mod weather;

use crate::config::Config;
use crate::db::HealthLog;
use crate::models::DailyHealthRecord;

#[derive(Parser)]
#[command(name = "health-score-log")]
#[command(about = "Daily exercise log with health scores, coaching tips and weather suggestions", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Clone, Copy)]
struct Metrics {
    /// Step count
    #[arg(long)]
    steps: u32,
    /// Active time in minutes
    #[arg(long)]
    active_minutes: u32,
    /// Distance in kilometres
    #[arg(long, value_parser = parse_distance)]
    distance: f64,
}

#[derive(Subcommand)]
enum Commands {
    /// Create or upgrade the database schema
    InitDb,
    /// Compute the health score without saving
    Score {
        #[command(flatten)]
        metrics: Metrics,
    },
    /// Save a day's metrics, replacing any record for that date
    Save {
        #[command(flatten)]
        metrics: Metrics,
        /// Defaults to today
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Show the score trend for every saved day
    History,
    /// Write a markdown report of the full history
    Report {
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
    /// Ask for a coaching tip based on today's metrics or a saved day
    #[command(group(
        ArgGroup::new("source")
            .args(["steps", "date"])
            .required(true)
    ))]
    Advice {
        #[arg(long, requires = "active_minutes", requires = "distance")]
        steps: Option<u32>,
        #[arg(long, requires = "steps")]
        active_minutes: Option<u32>,
        #[arg(long, requires = "steps", value_parser = parse_distance)]
        distance: Option<f64>,
        #[arg(long, conflicts_with = "steps")]
        date: Option<NaiveDate>,
    },
    /// Suggest tomorrow's exercise from the weather forecast
    Weather {
        #[arg(long, default_value = "Tokyo")]
        city: String,
    },
    /// Import days from a CSV with date,steps,active_minutes,distance columns
    Import {
        #[arg(long)]
        csv: PathBuf,
    },
    /// Export every saved day to CSV
    Export {
        #[arg(long)]
        csv: PathBuf,
    },
}

fn parse_distance(raw: &str) -> Result<f64, String> {
    let value: f64 = raw.parse().map_err(|_| format!("{raw:?} is not a number"))?;
    if !value.is_finite() || value < 0.0 {
        return Err("distance must be zero or more".to_string());
    }
    Ok(value)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::from_env()?;

    let log = if cli.command.uses_store() {
        let log = HealthLog::open(&config.database_url)
            .await
            .context("failed to open the health log")?;
        Some(log)
    } else {
        None
    };

    let result = run(cli.command, &config, log.as_ref()).await;
    if let Some(log) = log {
        log.close().await;
    }
    result
}

impl Commands {
    fn uses_store(&self) -> bool {
        match self {
            Commands::Score { .. } | Commands::Weather { .. } => false,
            Commands::Advice { date, .. } => date.is_some(),
            _ => true,
        }
    }
}

fn store(log: Option<&HealthLog>) -> anyhow::Result<&HealthLog> {
    log.context("health log is not open for this command")
}

async fn run(command: Commands, config: &Config, log: Option<&HealthLog>) -> anyhow::Result<()> {
    match command {
        Commands::InitDb => {
            store(log)?.init_db().await?;
            println!("Schema ready.");
        }
        Commands::Score { metrics } => {
            let parts = score::breakdown(metrics.steps, metrics.active_minutes, metrics.distance);
            println!("Health score {}/{}", parts.total, score::MAX_SCORE);
            println!(
                "- steps {} / active {} / distance {}",
                parts.steps, parts.active, parts.distance
            );
        }
        Commands::Save { metrics, date } => {
            let record = DailyHealthRecord {
                date: date.unwrap_or_else(|| Local::now().date_naive()),
                steps: metrics.steps,
                active_minutes: metrics.active_minutes,
                distance: metrics.distance,
                score: score::calc_score(metrics.steps, metrics.active_minutes, metrics.distance),
            };
            store(log)?.save(&record).await?;
            println!(
                "Saved {} with score {}/{}.",
                record.date,
                record.score,
                score::MAX_SCORE
            );
        }
        Commands::History => {
            let records = store(log)?.load_all().await?;
            print!("{}", report::render_history(&records));
        }
        Commands::Report { out } => {
            let records = store(log)?.load_all().await?;
            std::fs::write(&out, report::build_report(&records))
                .with_context(|| format!("failed to write {}", out.display()))?;
            println!("Report written to {}.", out.display());
        }
        Commands::Advice {
            steps,
            active_minutes,
            distance,
            date,
        } => {
            let (steps, active_minutes, distance) = match (steps, active_minutes, distance, date) {
                (Some(steps), Some(active_minutes), Some(distance), _) => {
                    (steps, active_minutes, distance)
                }
                (_, _, _, Some(date)) => {
                    let record = store(log)?
                        .load_on(date)
                        .await?
                        .with_context(|| format!("no record saved for {date}"))?;
                    (record.steps, record.active_minutes, record.distance)
                }
                _ => anyhow::bail!("pass --steps, --active-minutes and --distance, or --date"),
            };

            let score = score::calc_score(steps, active_minutes, distance);
            let client = advice::AdviceClient::from_config(config)?;
            tracing::info!(score, "fetching advice");
            let text = client
                .fetch_advice(score, steps, active_minutes, distance)
                .await?;
            println!("今日のアドバイス (score {score}/{})", score::MAX_SCORE);
            println!("{text}");
        }
        Commands::Weather { city } => {
            let client = weather::WeatherClient::from_config(config)?;
            tracing::info!(city = %city, "fetching forecast");
            let suggestion = client.fetch_suggestion(&city).await?;
            println!("{}", suggestion.text);
            if let Some(video) = suggestion.video {
                println!("{}: {}", video.title, video.url);
            }
        }
        Commands::Import { csv } => {
            let written = store(log)?.import_csv(&csv).await?;
            println!("Saved {written} days from {}.", csv.display());
        }
        Commands::Export { csv } => {
            let written = store(log)?.export_csv(&csv).await?;
            println!("Exported {written} days to {}.", csv.display());
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn distance_must_be_non_negative() {
        assert_eq!(parse_distance("3.5"), Ok(3.5));
        assert!(parse_distance("-0.1").is_err());
        assert!(parse_distance("NaN").is_err());
        assert!(parse_distance("far").is_err());
    }

    #[test]
    fn advice_accepts_metrics_or_date() {
        assert!(Cli::try_parse_from([
            "health-score-log",
            "advice",
            "--steps",
            "5000",
            "--active-minutes",
            "20",
            "--distance",
            "3"
        ])
        .is_ok());
        assert!(Cli::try_parse_from(["health-score-log", "advice", "--date", "2026-04-01"]).is_ok());
        assert!(Cli::try_parse_from(["health-score-log", "advice"]).is_err());
        assert!(Cli::try_parse_from(["health-score-log", "advice", "--steps", "5000"]).is_err());
    }

    #[test]
    fn only_storage_commands_open_the_log() {
        let parse = |args: &[&str]| {
            let mut argv = vec!["health-score-log"];
            argv.extend_from_slice(args);
            Cli::try_parse_from(argv).unwrap().command
        };

        let metrics = ["--steps", "5000", "--active-minutes", "20", "--distance", "3"];
        let mut score_args = vec!["score"];
        score_args.extend_from_slice(&metrics);
        assert!(!parse(&score_args).uses_store());
        assert!(!parse(&["weather", "--city", "Osaka"]).uses_store());

        let mut advice_args = vec!["advice"];
        advice_args.extend_from_slice(&metrics);
        assert!(!parse(&advice_args).uses_store());
        assert!(parse(&["advice", "--date", "2026-04-01"]).uses_store());

        let mut save_args = vec!["save"];
        save_args.extend_from_slice(&metrics);
        assert!(parse(&save_args).uses_store());
        assert!(parse(&["history"]).uses_store());
        assert!(parse(&["init-db"]).uses_store());
    }

    #[tokio::test]
    async fn score_runs_without_a_log() {
        let config = Config::from_lookup(|_| None).unwrap();
        let command = Commands::Score {
            metrics: Metrics {
                steps: 10_000,
                active_minutes: 60,
                distance: 8.0,
            },
        };
        assert!(run(command, &config, None).await.is_ok());
        assert!(run(Commands::History, &config, None).await.is_err());
    }

    #[test]
    fn save_parses_optional_date() {
        let cli = Cli::try_parse_from([
            "health-score-log",
            "save",
            "--steps",
            "8000",
            "--active-minutes",
            "45",
            "--distance",
            "6.2",
            "--date",
            "2026-04-01",
        ])
        .unwrap();
        match cli.command {
            Commands::Save { metrics, date } => {
                assert_eq!(metrics.steps, 8_000);
                assert_eq!(date, NaiveDate::from_ymd_opt(2026, 4, 1));
            }
            _ => panic!("expected save"),
        }
    }
}
