use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Parser, Subcommand};

use tokring::control::write_stdout_json;
use tokring::transport::{memory, process};
use tokring::{Hub, RingTopology, Station, StationConfig};

/// How long a station process may take to exit after the ring closes.
const STATION_EXIT_GRACE: Duration = Duration::from_secs(5);

#[derive(Parser)]
#[command(name = "tokring", about = "Token-ring LAN simulation")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run one station with the ring on stdin/stdout
    Station {
        /// Path to the station configuration file
        config: PathBuf,
    },
    /// Connect stations into a ring and relay it
    Hub {
        /// Seconds to keep the ring running
        #[arg(short, long, default_value_t = 15)]
        duration: u64,
        /// Run stations as tasks in this process instead of child processes
        #[arg(long)]
        in_process: bool,
        /// Station configuration files, in ring order
        #[arg(required = true)]
        configs: Vec<PathBuf>,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if std::env::var("RUST_LOG_FORMAT").as_deref() == Ok("json") {
        tokring::logging::init_json();
    } else {
        tokring::logging::init();
    }

    let result = match cli.command {
        Command::Station { config } => run_station(&config).await,
        Command::Hub {
            duration,
            in_process,
            configs,
        } => {
            let duration = Duration::from_secs(duration);
            if in_process {
                run_hub_in_process(&configs, duration).await
            } else {
                run_hub(&configs, duration).await
            }
        }
    };

    if let Err(e) = result {
        tracing::error!("{e}");
        std::process::exit(1);
    }
}

async fn run_station(path: &Path) -> tokring::Result<()> {
    let config = StationConfig::load(path)?;
    let station = Station::new(config)?;

    let report = station
        .run(tokio::io::stdin(), tokio::io::stdout())
        .await?;

    // stdout is the ring; the report goes to the log.
    let json = serde_json::to_string(&report)?;
    tracing::info!(report = %json, "Station report");
    Ok(())
}

fn load_configs(paths: &[PathBuf]) -> tokring::Result<Vec<StationConfig>> {
    paths.iter().map(|p| StationConfig::load(p)).collect()
}

async fn run_hub(paths: &[PathBuf], duration: Duration) -> tokring::Result<()> {
    let configs = load_configs(paths)?;
    let topology = RingTopology::new(configs.iter().map(|c| c.id).collect())?;
    let program = std::env::current_exe()?;

    let mut children = Vec::with_capacity(paths.len());
    let mut links = Vec::with_capacity(paths.len());
    for path in paths {
        let (child, link) = process::spawn_station(&program, path)?;
        children.push(child);
        links.push(link);
    }

    let handle = Hub::start(&topology, links).await?;
    let report = handle.run_for(duration).await;
    write_stdout_json(&report)?;

    for (id, mut child) in topology.stations().iter().zip(children) {
        match tokio::time::timeout(STATION_EXIT_GRACE, child.wait()).await {
            Ok(Ok(status)) => tracing::debug!(station = %id, %status, "Station exited"),
            Ok(Err(e)) => tracing::warn!(station = %id, "Failed to wait for station: {e}"),
            Err(_) => {
                tracing::warn!(station = %id, "Station did not exit, killing");
                if let Err(e) = child.kill().await {
                    tracing::warn!(station = %id, "Failed to kill station: {e}");
                }
            }
        }
    }

    Ok(())
}

async fn run_hub_in_process(paths: &[PathBuf], duration: Duration) -> tokring::Result<()> {
    let configs = load_configs(paths)?;
    let ring = memory::spawn_stations(configs)?;

    let handle = Hub::start(&ring.topology, ring.links).await?;
    let report = handle.run_for(duration).await;
    write_stdout_json(&report)?;

    for (id, task) in ring.topology.stations().iter().zip(ring.stations) {
        match task.await {
            Ok(Ok(report)) => write_stdout_json(&report)?,
            Ok(Err(e)) => tracing::error!(station = %id, "Station failed: {e}"),
            Err(e) => tracing::error!(station = %id, "Station task ended abnormally: {e}"),
        }
    }

    Ok(())
}
