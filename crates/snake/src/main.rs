//! ofdpa-snake - OF-DPA patch panel / snake test setup
//!
//! Entry point for the `ofdpa-snake` command.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use ofdpa::{ControlPlane, RpcClient, SoftSwitch};
use tracing::{error, info, warn};

use ofdpa_snake::{derive_entries, ConfigOverrides, SnakeConfig, SnakeError, SnakeRunner};

/// Wire switch ports into patch-panel pairs for a snake test
#[derive(Parser, Debug)]
#[command(name = "ofdpa-snake")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// First port of the snake [default: 1]
    #[arg(short = 's', long)]
    start_port: Option<u32>,

    /// Last port of the snake [default: 48]
    #[arg(short = 'e', long)]
    end_port: Option<u32>,

    /// VLAN to use between the pairs, 0 for untagged [default: 10]
    #[arg(short = 'v', long)]
    vlan_id: Option<u32>,

    /// Highest port number on the switch
    #[arg(long)]
    max_port: Option<u32>,

    /// Client name registered with the OF-DPA agent [default: OFDPA_patch]
    #[arg(long)]
    client_name: Option<String>,

    /// YAML config file; command-line values take precedence
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    /// Install into an in-memory switch instead of the OF-DPA agent
    #[arg(long)]
    dry_run: bool,

    /// Print every derived table entry as JSON before wiring
    #[arg(long)]
    print_plan: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short = 'l', long, default_value = "info")]
    log_level: String,
}

impl Args {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            start_port: self.start_port,
            end_port: self.end_port,
            vlan_id: self.vlan_id,
            max_port: self.max_port,
            client_name: self.client_name.clone(),
        }
    }
}

/// Initializes tracing with `RUST_LOG` taking precedence over `log_level`.
fn init_logging(log_level: &str) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true))
        .init();
}

fn open_session(
    config: &SnakeConfig,
    dry_run: bool,
) -> Result<Box<dyn ControlPlane>, SnakeError> {
    if dry_run {
        warn!("Dry run: entries go to an in-memory switch");
        return Ok(Box::new(SoftSwitch::new()));
    }
    let client = RpcClient::initialize(&config.client_name).map_err(SnakeError::session)?;
    Ok(Box::new(client))
}

fn run(args: &Args) -> anyhow::Result<()> {
    let config = match &args.config {
        Some(path) => SnakeConfig::load(path)?,
        None => SnakeConfig::default(),
    }
    .merge(args.overrides());

    info!(
        "Snake ports {}..={} vlan {} (client {})",
        config.start_port, config.end_port, config.vlan_id, config.client_name
    );

    let planner = config.planner();
    let plan = planner.plan(config.start_port, config.end_port, config.vlan_id)?;

    if args.print_plan {
        let entries = derive_entries(&plan);
        let json = serde_json::to_string_pretty(&entries).context("serializing plan")?;
        println!("{}", json);
    }

    let plane = open_session(&config, args.dry_run)?;
    let report = SnakeRunner::new(planner, plane).wire_plan(&plan)?;

    println!(
        "Wired {} pairs on {}: {} VLAN flows, {} groups, {} ACL flows",
        report.pairs.len(),
        report.vlan,
        report.installed.vlan_flows,
        report.installed.groups,
        report.installed.acl_flows
    );
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(&args.log_level);

    info!("--- Starting ofdpa-snake ---");

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
