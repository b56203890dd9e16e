//! fleetctl - drive the simulated VPS fleet from the terminal

use clap::{Parser, Subcommand};
use parking_lot::Mutex;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tabled::{Table, Tabled};
use tokio::sync::watch;
use vps_fleet::driver::{self, SharedFleet};
use vps_fleet::models::{regions_for, PLANS, PROVIDERS};
use vps_fleet::store::STORE_FILE;
use vps_fleet::{Fleet, FleetConfig, ProvisionRequest, Result, Server, StatusFilter, Store};

/// Driver step used by `--wait`
const WAIT_STEP: Duration = Duration::from_millis(100);

#[derive(Parser)]
#[command(name = "fleetctl")]
#[command(about = "Simulated VPS fleet dashboard")]
#[command(version)]
struct Cli {
    /// Path to data directory
    #[arg(long, global = true, default_value = ".vps-fleet")]
    data_dir: PathBuf,

    /// TOML config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Fixed random seed
    #[arg(long, global = true)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List servers
    List {
        /// Free-text search over name, provider, region, IP and tags
        #[arg(short, long, default_value = "")]
        query: String,
        /// all, running, stopped, restarting or deploying
        #[arg(short, long, default_value = "all")]
        status: StatusFilter,
    },
    /// Fleet-wide summary
    Summary,
    /// Power a server on or off
    Toggle {
        /// Server ID
        id: String,
    },
    /// Reboot a running server
    Reboot {
        /// Server ID
        id: String,
        /// Block until the reboot completes
        #[arg(short, long)]
        wait: bool,
    },
    /// Provision a new server
    Provision {
        /// Display name
        #[arg(short, long, default_value = "")]
        name: String,
        #[arg(long)]
        provider: String,
        #[arg(long)]
        region: String,
        #[arg(long)]
        plan: String,
        /// Comma-separated tags
        #[arg(short, long, default_value = "")]
        tags: String,
        /// Disable backups
        #[arg(long)]
        no_backups: bool,
        /// Block until deployment completes
        #[arg(short, long)]
        wait: bool,
    },
    /// Show providers, regions and plans
    Catalog,
    /// Run the live simulation
    Run {
        /// Stop after this many seconds (default: until Ctrl-C)
        #[arg(long)]
        seconds: Option<u64>,
        /// Driver step in milliseconds
        #[arg(long, default_value = "250")]
        step_ms: u64,
    },
    /// Restore the seed fleet
    Reset,
}

#[derive(Tabled)]
struct ServerRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Provider")]
    provider: String,
    #[tabled(rename = "Region")]
    region: String,
    #[tabled(rename = "IP")]
    ip: String,
    #[tabled(rename = "CPU")]
    cpu: String,
    #[tabled(rename = "Mem")]
    memory: String,
    #[tabled(rename = "Disk")]
    disk: String,
    #[tabled(rename = "BW")]
    bandwidth: String,
    #[tabled(rename = "Cost")]
    cost: String,
    #[tabled(rename = "Tier")]
    tier: String,
}

impl From<&Server> for ServerRow {
    fn from(s: &Server) -> Self {
        Self {
            id: s.id.clone(),
            name: s.name.clone(),
            status: s.status.to_string(),
            provider: s.provider.clone(),
            region: s.region.clone(),
            ip: s.ip.clone(),
            cpu: format!("{}%", s.cpu_usage),
            memory: format!("{}%", s.memory_usage),
            disk: format!("{}%", s.disk_usage),
            bandwidth: format!("{:.0}GB", s.bandwidth_used),
            cost: format!("${}", s.monthly_cost),
            tier: s.support_tier.to_string(),
        }
    }
}

#[derive(Tabled)]
struct PlanRow {
    #[tabled(rename = "Plan")]
    name: String,
    #[tabled(rename = "Cost")]
    cost: String,
    #[tabled(rename = "vCPU")]
    cpus: u32,
    #[tabled(rename = "Memory")]
    memory: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("vps_fleet=info")),
        )
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => FleetConfig::load(path)?,
        None => FleetConfig::default(),
    };
    if let Some(seed) = cli.seed {
        config.seed = Some(seed);
    }

    let store = Store::open(cli.data_dir.join(STORE_FILE))?;
    let mut fleet = Fleet::open(config, store)?;

    match cli.command {
        Commands::List { query, status } => {
            print_servers(&fleet.visible(&query, status));
        }
        Commands::Summary => print_summary(&fleet),
        Commands::Toggle { id } => match fleet.toggle_power(&id) {
            Some(server) => println!("{} is now {}", server.id, server.status),
            None => println!("Server not found: {}", id),
        },
        Commands::Reboot { id, wait } => match fleet.reboot(&id) {
            Some(server) => {
                println!("{} is {}", server.id, server.status);
                if wait {
                    let shared = driver::run_until_idle(fleet, WAIT_STEP).await;
                    let status = shared.lock().get(&id).map(|s| s.status);
                    if let Some(status) = status {
                        println!("{} is now {}", id, status);
                    }
                }
            }
            None => println!("Server not found: {}", id),
        },
        Commands::Provision {
            name,
            provider,
            region,
            plan,
            tags,
            no_backups,
            wait,
        } => {
            let request = ProvisionRequest::new(provider, region, plan)
                .name(name)
                .tags_csv(&tags)
                .backups(!no_backups);
            let server = fleet.provision(&request)?;
            println!(
                "Provisioning {} ({}) at {} - ${}/mo, {} support",
                server.name, server.id, server.ip, server.monthly_cost, server.support_tier
            );
            if wait {
                let shared = driver::run_until_idle(fleet, WAIT_STEP).await;
                let status = shared.lock().get(&server.id).map(|s| s.status);
                if let Some(status) = status {
                    println!("{} is now {}", server.id, status);
                }
            }
        }
        Commands::Catalog => print_catalog(),
        Commands::Run { seconds, step_ms } => {
            run_live(fleet, seconds, Duration::from_millis(step_ms.max(1))).await;
        }
        Commands::Reset => {
            fleet.reset();
            println!("Fleet reset: {} servers", fleet.servers().len());
        }
    }

    Ok(())
}

fn print_servers(servers: &[Server]) {
    if servers.is_empty() {
        println!("No servers match.");
        return;
    }
    let rows: Vec<ServerRow> = servers.iter().map(ServerRow::from).collect();
    println!("{}", Table::new(rows));
}

fn print_summary(fleet: &Fleet) {
    let s = fleet.summary();
    println!("Active:  {}/{}", s.active, s.total);
    println!("Avg CPU: {}%", s.avg_cpu);
    println!("Spend:   ${}/mo", s.monthly_spend);
    println!("Alerts:  {}", s.alerts);
}

fn print_catalog() {
    println!("Providers:");
    for provider in PROVIDERS {
        println!("  {:<14} {}", provider, regions_for(provider).join(", "));
    }
    println!();
    let rows: Vec<PlanRow> = PLANS
        .iter()
        .map(|p| PlanRow {
            name: p.name.to_string(),
            cost: format!("${}", p.monthly_cost),
            cpus: p.cpu_count,
            memory: format!("{}GB", p.memory_gb),
        })
        .collect();
    println!("{}", Table::new(rows));
}

async fn run_live(fleet: Fleet, seconds: Option<u64>, step: Duration) {
    let tick = fleet.config().tick_interval();
    let shared: SharedFleet = Arc::new(Mutex::new(fleet));
    let (tx, rx) = watch::channel(false);
    let handle = tokio::spawn(driver::run(shared.clone(), step, rx));

    let deadline = seconds.map(|s| tokio::time::Instant::now() + Duration::from_secs(s));
    let mut report = tokio::time::interval(tick);

    loop {
        tokio::select! {
            _ = report.tick() => {
                let s = shared.lock().summary();
                println!(
                    "active {}/{}  avg cpu {:>3}%  spend ${}/mo  alerts {}",
                    s.active, s.total, s.avg_cpu, s.monthly_spend, s.alerts
                );
            }
            _ = tokio::signal::ctrl_c() => break,
            _ = sleep_until(deadline) => break,
        }
    }

    let _ = tx.send(true);
    let _ = handle.await;
}

async fn sleep_until(deadline: Option<tokio::time::Instant>) {
    match deadline {
        Some(at) => tokio::time::sleep_until(at).await,
        None => std::future::pending().await,
    }
}
