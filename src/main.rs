use anyhow::{Context, Result};
use chrono::TimeDelta;
use citybus::{CityBus, CityBusConfig};
use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use itertools::Itertools;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::select;
use tokio::time::sleep;
use tracing::{error, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Registry};

#[derive(Parser, Debug)]
#[command(
    name = "citybus",
    about = "Look up CityBus stops, routes and live departures"
)]
struct Args {
    /// API host. Falls back to $CITYBUS_API_URL, then the public CityBus site
    #[arg(long)]
    api_url: Option<String>,

    /// Write logs to daily files in this directory instead of stderr
    #[arg(long)]
    log_dir: Option<PathBuf>,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Search stops by name (case-insensitive regex)
    Stops { pattern: String },
    /// Show a single stop by its code
    Stop { id: String },
    /// Search routes by name or short name (case-insensitive regex)
    Routes { pattern: String },
    /// Live departures at a stop
    Etas { stop_id: String },
    /// Keep printing live departures at a stop until Ctrl-C
    Watch {
        stop_id: String,
        /// Seconds between updates
        #[arg(long, default_value_t = 30)]
        every: u64,
    },
}

#[tokio::main(flavor = "multi_thread")]
async fn main() -> Result<()> {
    _ = dotenv();
    let args = Args::parse();

    let _guard = init_tracing(args.log_dir.as_deref());

    let config = load_config(&args)?;
    info!("using {}", config.api_url);

    let mut citybus = CityBus::new(config)
        .await
        .context("couldn't load stops and routes")?;

    match &args.command {
        Command::Stops { pattern } => {
            let stops: Vec<_> = citybus.search_stops(pattern)?.collect();
            if args.json {
                print_json(&stops)?;
            } else {
                stops.iter().for_each(|s| println!("{s}"));
            }
        }
        Command::Stop { id } => {
            let stop = citybus
                .get_stop(id)
                .with_context(|| format!("no such stop {id}"))?;
            if args.json {
                print_json(stop)?;
            } else {
                println!("{stop}");
                println!("{: <10} {}, {}", "", stop.lat, stop.lon);
            }
        }
        Command::Routes { pattern } => {
            let routes: Vec<_> = citybus.search_routes(pattern)?.collect();
            if args.json {
                print_json(&routes)?;
            } else {
                for route in routes {
                    println!("{route}");
                    for segment in &route.segments {
                        let inactive = if segment.is_active { "" } else { " (inactive)" };
                        println!(
                            "{: <11}-> {} [{}]{inactive}",
                            "", segment.destination, segment.direction_id
                        );
                    }
                }
            }
        }
        Command::Etas { stop_id } => print_etas(&citybus, stop_id, args.json).await?,
        Command::Watch { stop_id, every } => loop {
            match citybus.refresh_if_stale().await {
                Ok(true) => info!("refreshed stale snapshot"),
                Ok(false) => {}
                Err(e) => error!("{e}"),
            }

            if let Err(e) = print_etas(&citybus, stop_id, args.json).await {
                error!("{e:?}");
            }

            select! {
                _ = sleep(Duration::from_secs(*every)) => {}
                _ = tokio::signal::ctrl_c() => break,
            }
        },
    }

    Ok(())
}

fn load_config(args: &Args) -> Result<CityBusConfig> {
    let mut config = CityBusConfig::default();

    if let Some(api_url) = args
        .api_url
        .clone()
        .or_else(|| dotenvy::var("CITYBUS_API_URL").ok())
    {
        config = config.with_api_url(api_url);
    }

    if let Ok(minutes) = dotenvy::var("CITYBUS_REFRESH_MINUTES") {
        let minutes: i64 = minutes
            .parse()
            .context("CITYBUS_REFRESH_MINUTES isn't a number")?;
        config = config.with_refresh_interval(TimeDelta::minutes(minutes));
    }

    Ok(config)
}

async fn print_etas(citybus: &CityBus, stop_id: &str, json: bool) -> Result<()> {
    let stop_etas = citybus
        .get_etas(stop_id)
        .await?
        .with_context(|| format!("no such stop {stop_id}"))?;

    if json {
        return print_json(&stop_etas);
    }

    if let Some(stop) = citybus.get_stop(stop_id) {
        println!("{stop}");
    }

    if stop_etas.etas.is_empty() {
        println!("no live departures");
    }

    for eta in &stop_etas.etas {
        println!("{eta}");
    }

    if stop_etas.skipped() > 0 {
        println!(
            "({} departures skipped, unknown routes: {})",
            stop_etas.skipped(),
            stop_etas.unresolved.iter().unique().join(", ")
        );
    }

    Ok(())
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn init_tracing(log_dir: Option<&Path>) -> Option<WorkerGuard> {
    let env_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy();

    match log_dir {
        Some(log_dir) => {
            let appender = tracing_appender::rolling::daily(log_dir, "citybus.log");
            let (non_blocking_appender, guard) = tracing_appender::non_blocking(appender);

            // A layer that logs events to rolling files.
            let file_log = tracing_subscriber::fmt::layer()
                .with_writer(non_blocking_appender)
                .with_ansi(false)
                .pretty();

            Registry::default().with(file_log).with(env_filter).init();

            Some(guard)
        }
        None => {
            let stderr_log = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

            Registry::default().with(stderr_log).with(env_filter).init();

            None
        }
    }
}
