//! Listings server binary
//!
//! Runs one of the three processes of the listings system:
//! - `racing`: the race listing service
//! - `sports`: the sporting event listing service
//! - `gateway`: the public HTTP gateway in front of both
//!
//! # Examples
//!
//! ```bash
//! # Start the racing service on the default port (9000)
//! listings racing
//!
//! # Start the sports service with its own database file
//! listings sports --db-path /var/lib/listings/sports.db
//!
//! # Start the gateway against remote services
//! listings gateway --racing-endpoint racing:9000 --sports-endpoint sports:10000
//! ```

use clap::{Args, Parser, Subcommand, ValueEnum};
use listings::config::{GatewaySettings, ServiceSettings, Settings};
use listings::query::DefaultFieldPolicy;
use std::path::PathBuf;
use tracing::info;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Race and sports event listing services
#[derive(Parser, Debug)]
#[command(name = "listings")]
#[command(version = listings::VERSION)]
#[command(about = "Race and sports event listing services", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (TOML)
    #[arg(long, global = true, env = "LISTINGS_CONFIG")]
    config: Option<PathBuf>,

    /// Log directory path
    #[arg(long, global = true, default_value = "logs", env = "LISTINGS_LOG_DIR")]
    log_dir: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "info", env = "LISTINGS_LOG_LEVEL")]
    log_level: String,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the racing service
    Racing(ServiceArgs),

    /// Start the sports service
    Sports(ServiceArgs),

    /// Start the HTTP gateway
    Gateway(GatewayArgs),

    /// Show version
    Version,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OrderPolicy {
    /// Sort by the advertised start time
    UseDefault,
    /// Ignore order specs without a field
    RequireExplicit,
}

impl From<OrderPolicy> for DefaultFieldPolicy {
    fn from(policy: OrderPolicy) -> Self {
        match policy {
            OrderPolicy::UseDefault => DefaultFieldPolicy::UseDefault,
            OrderPolicy::RequireExplicit => DefaultFieldPolicy::RequireExplicit,
        }
    }
}

/// Listing service arguments
#[derive(Args, Debug)]
struct ServiceArgs {
    /// Bind address
    #[arg(short, long)]
    bind: Option<String>,

    /// Port
    #[arg(short, long)]
    port: Option<u16>,

    /// SQLite database file
    #[arg(long)]
    db_path: Option<PathBuf>,

    /// Pooled SQLite connections
    #[arg(long)]
    pool_size: Option<usize>,

    /// Demo rows seeded on startup
    #[arg(long)]
    seed_count: Option<u32>,

    /// Handling of order specs that name a direction but no field
    #[arg(long, value_enum)]
    order_policy: Option<OrderPolicy>,
}

impl ServiceArgs {
    fn apply(self, settings: &mut ServiceSettings) {
        if let Some(bind) = self.bind {
            settings.bind = bind;
        }
        if let Some(port) = self.port {
            settings.port = port;
        }
        if let Some(db_path) = self.db_path {
            settings.db_path = db_path;
        }
        if let Some(pool_size) = self.pool_size {
            settings.pool_size = pool_size;
        }
        if let Some(seed_count) = self.seed_count {
            settings.seed_count = seed_count;
        }
        if let Some(policy) = self.order_policy {
            settings.order_policy = policy.into();
        }
    }
}

/// Gateway arguments
#[derive(Args, Debug)]
struct GatewayArgs {
    /// Bind address
    #[arg(short, long)]
    bind: Option<String>,

    /// Port
    #[arg(short, long)]
    port: Option<u16>,

    /// Racing service endpoint
    #[arg(long)]
    racing_endpoint: Option<String>,

    /// Sports service endpoint
    #[arg(long)]
    sports_endpoint: Option<String>,

    /// Upstream request timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,
}

impl GatewayArgs {
    fn apply(self, settings: &mut GatewaySettings) {
        if let Some(bind) = self.bind {
            settings.bind = bind;
        }
        if let Some(port) = self.port {
            settings.port = port;
        }
        if let Some(endpoint) = self.racing_endpoint {
            settings.racing_endpoint = endpoint;
        }
        if let Some(endpoint) = self.sports_endpoint {
            settings.sports_endpoint = endpoint;
        }
        if let Some(timeout) = self.timeout {
            settings.timeout_secs = timeout;
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if let Commands::Version = cli.command {
        println!("listings {}", listings::VERSION);
        return Ok(());
    }

    let log_file = match &cli.command {
        Commands::Racing(_) => "racing.log",
        Commands::Sports(_) => "sports.log",
        _ => "gateway.log",
    };
    let _guard = setup_logging(&cli, log_file)?;

    let mut settings = Settings::load(cli.config.as_deref())?;
    info!(version = %listings::VERSION, "Listings starting");

    match cli.command {
        Commands::Racing(args) => {
            args.apply(&mut settings.racing);
            listings::server::start_racing(settings.racing).await
        }
        Commands::Sports(args) => {
            args.apply(&mut settings.sports);
            listings::server::start_sports(settings.sports).await
        }
        Commands::Gateway(args) => {
            args.apply(&mut settings.gateway);
            listings::gateway::start_gateway(settings.gateway).await
        }
        Commands::Version => Ok(()),
    }
}

/// Setup logging with rolling files and console output
fn setup_logging(
    cli: &Cli,
    file_name: &str,
) -> anyhow::Result<tracing_appender::non_blocking::WorkerGuard> {
    std::fs::create_dir_all(&cli.log_dir)?;

    let file_appender = RollingFileAppender::new(Rotation::DAILY, &cli.log_dir, file_name);
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    let log_level = cli
        .log_level
        .parse::<tracing::Level>()
        .unwrap_or(tracing::Level::INFO);

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stdout)
                .with_ansi(!cli.no_color)
                .pretty(),
        )
        .with(fmt::layer().with_writer(file_writer).with_ansi(false))
        .with(EnvFilter::from_default_env().add_directive(log_level.into()))
        .init();

    Ok(guard)
}
