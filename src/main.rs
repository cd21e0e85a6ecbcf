//! omega — adaptive consensus gate
//!
//! Usage:
//!   omega                                   → serve on 127.0.0.1:18789
//!   omega serve --port 9000 --bind lan      → serve on 0.0.0.0:9000
//!   omega simulate "analyze the grid" ping  → run payloads through a seeded gate
//!   omega config > omega.toml               → print the default configuration
//!   omega version                           → show version

use clap::{Parser, Subcommand};
use omega_core::{BindMode, GatewayConfig};
use omega_gate::{ConsensusGate, GateConfig};
use omega_gateway::start_gateway;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(
    name = "omega",
    about = "Adaptive consensus gate: tiered routing with weighted witness votes",
    version = env!("CARGO_PKG_VERSION")
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Path to gate config file (TOML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Write logs to a file (in addition to stderr)
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP/WebSocket gateway
    Serve {
        #[arg(short, long, default_value = "18789")]
        port: u16,
        /// Bind mode: loopback or lan
        #[arg(short, long, default_value = "loopback")]
        bind: String,
        /// Seed for the simulated witnesses (overrides config)
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Run payloads through an in-process gate and print each decision as JSON
    Simulate {
        /// Payloads; each is parsed as JSON, falling back to a plain string
        payloads: Vec<String>,
        /// Number of generated payloads when none are given
        #[arg(short = 'n', long, default_value = "10")]
        count: usize,
        /// Seed for the simulated witnesses (overrides config)
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Print the default configuration as TOML
    Config,
    /// Show version
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Serve { port, ref bind, seed }) => {
            let _guard = init_tracing(cli.log_file.as_deref())?;
            let gateway = GatewayConfig {
                port,
                bind: BindMode::parse(bind),
            };
            serve(gateway, load_config(cli.config.as_deref(), seed, None)).await?;
        }

        Some(Commands::Simulate {
            ref payloads,
            count,
            seed,
        }) => {
            let _guard = init_tracing(cli.log_file.as_deref())?;
            let config = load_config(cli.config.as_deref(), seed, Some(0));
            simulate(&config, payloads, count)?;
        }

        Some(Commands::Config) => {
            print!("{}", GateConfig::default().to_toml());
        }

        Some(Commands::Version) => {
            println!("omega v{}", env!("CARGO_PKG_VERSION"));
        }

        None => {
            let _guard = init_tracing(cli.log_file.as_deref())?;
            let config = load_config(cli.config.as_deref(), None, None);
            serve(GatewayConfig::default(), config).await?;
        }
    }

    Ok(())
}

/// stderr logging, plus an optional non-blocking file layer. The returned
/// guard must live until exit or buffered file output is lost.
fn init_tracing(log_file: Option<&Path>) -> anyhow::Result<Option<WorkerGuard>> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "omega=info,tower_http=info".into());
    let stderr = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);
    let registry = tracing_subscriber::registry().with(filter).with(stderr);

    match log_file {
        Some(path) => {
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            let file_name = path
                .file_name()
                .ok_or_else(|| anyhow::anyhow!("invalid log file path: {}", path.display()))?;
            std::fs::create_dir_all(dir)?;
            let (writer, guard) =
                tracing_appender::non_blocking(tracing_appender::rolling::never(dir, file_name));
            registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_ansi(false)
                        .with_writer(writer),
                )
                .init();
            Ok(Some(guard))
        }
        None => {
            registry.init();
            Ok(None)
        }
    }
}

fn load_config(path: Option<&Path>, seed: Option<u64>, fallback_seed: Option<u64>) -> GateConfig {
    let mut config = match path {
        Some(p) => GateConfig::load(p),
        None => GateConfig::default(),
    };
    apply_seed(&mut config, seed, fallback_seed);
    config
}

/// `--seed` wins over the config file; the fallback only fills a gap.
fn apply_seed(config: &mut GateConfig, flag: Option<u64>, fallback: Option<u64>) {
    config.panel.seed = flag.or(config.panel.seed).or(fallback);
}

async fn serve(gateway: GatewayConfig, config: GateConfig) -> anyhow::Result<()> {
    let gate = Arc::new(ConsensusGate::from_config(&config));
    tracing::info!(
        "Gate ready: witnesses {:?}, coherence ratio {}, seed {:?}",
        config.panel.witnesses,
        config.coherence.ratio,
        config.panel.seed
    );
    start_gateway(gateway, gate).await
}

fn simulate(config: &GateConfig, payloads: &[String], count: usize) -> anyhow::Result<()> {
    let gate = ConsensusGate::from_config(config);

    let inputs: Vec<serde_json::Value> = if payloads.is_empty() {
        (0..count).map(sample_payload).collect()
    } else {
        payloads
            .iter()
            .map(|p| {
                serde_json::from_str(p).unwrap_or_else(|_| serde_json::Value::String(p.clone()))
            })
            .collect()
    };

    for content in inputs {
        let decision = gate.submit(content)?;
        println!("{}", serde_json::to_string(&decision)?);
    }
    println!("{}", serde_json::to_string_pretty(&gate.status()?)?);
    Ok(())
}

fn sample_payload(i: usize) -> serde_json::Value {
    let text = match i % 4 {
        0 => "chicka chicka orange".to_string(),
        1 => format!("status ping {}", i),
        2 => format!("analyze relay sector {}", i),
        _ => format!("{} {}", "long form field report ".repeat(5), i),
    };
    serde_json::Value::String(text)
}
