//! OICP CPO client - command line
//!
//! Talks to the roaming hub as the operator configured in the config file.
//!
//! ```sh
//! # Validate config (~/.config/oicp-cpo/config.toml) and show it
//! oicp-cpo --check
//!
//! # Push two status records
//! oicp-cpo push-status --evse DE*ABC*E1=Available --evse DE*ABC*E2=Occupied
//!
//! # Push the difference between two snapshots
//! oicp-cpo sync --old before.json --new after.json
//!
//! # Ask the hub whether a card may start charging
//! oicp-cpo authorize-start --uid 11223344 --evse DE*ABC*E1
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::{error, info, warn};

use oicp_cpo::config::AppConfig;
use oicp_cpo::domain::{
    ActionType, AuthorizeStartRequest, EvseId, EvseStatus, EvseStatusRecord, Identification,
    OperatorEvseStatus, StatusDiff, StatusSnapshot,
};
use oicp_cpo::{create_event_bus, init_tracing, CpoClient, Outcome, StatusSynchronizer, SystemResolver};

#[derive(Parser, Debug)]
#[command(
    name = "oicp-cpo",
    version,
    about = "OICP v2.0 client for charge point operators",
    long_about = "Pushes EVSE status and data to the roaming hub and requests \
                  authorizations.\n\n\
                  Default config: ~/.config/oicp-cpo/config.toml"
)]
struct Cli {
    /// Path to the configuration file (TOML).
    #[arg(short, long, env = "OICP_CONFIG")]
    config: Option<PathBuf>,

    /// Override the log level (trace, debug, info, warn, error).
    #[arg(short, long)]
    log_level: Option<String>,

    /// Validate the configuration file and exit.
    #[arg(long)]
    check: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Push EVSE status records.
    PushStatus {
        /// `EVSE_ID=STATUS`, repeatable.
        #[arg(long = "evse", value_parser = parse_status_record, required = true)]
        records: Vec<EvseStatusRecord>,

        /// fullLoad, update, insert or delete.
        #[arg(long, default_value = "update", value_parser = parse_action)]
        action: ActionType,
    },
    /// Push the difference between two status snapshots.
    Sync {
        /// JSON object of EVSE id to status, before.
        #[arg(long)]
        old: PathBuf,
        /// JSON object of EVSE id to status, after.
        #[arg(long)]
        new: PathBuf,
    },
    /// Request a start authorization for an RFID card.
    AuthorizeStart {
        #[arg(long)]
        uid: String,
        #[arg(long)]
        evse: Option<String>,
    },
}

fn parse_status_record(value: &str) -> Result<EvseStatusRecord, String> {
    let (id, status) = value
        .split_once('=')
        .ok_or_else(|| format!("expected EVSE_ID=STATUS, got '{}'", value))?;
    let evse_id = EvseId::new(id).map_err(|e| e.to_string())?;
    let status = EvseStatus::from_wire(status).ok_or_else(|| format!("unknown status '{}'", status))?;
    Ok(EvseStatusRecord::new(evse_id, status))
}

fn parse_action(value: &str) -> Result<ActionType, String> {
    ActionType::from_wire(value).ok_or_else(|| format!("unknown action type '{}'", value))
}

fn read_snapshot(path: &Path) -> Result<StatusSnapshot, Box<dyn std::error::Error>> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

fn print_outcome<T: std::fmt::Debug>(outcome: &Outcome<T>) {
    match outcome {
        Outcome::Success { payload, transport } => {
            println!("✅ {} (HTTP {}, {:?})", transport.soap_action, transport.status_code, transport.elapsed);
            println!("{:#?}", payload);
        }
        other => println!("❌ {}: {}", other.kind(), other.describe()),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // ── Load configuration ─────────────────────────────────────
    let config_path = cli.config.unwrap_or_else(oicp_cpo::default_config_path);

    let mut config = match AppConfig::load(&config_path) {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing_subscriber::fmt()
                .with_env_filter(tracing_subscriber::EnvFilter::new("info"))
                .init();
            error!("Failed to load config from {}: {}", config_path.display(), e);
            return Err(e.into());
        }
    };

    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }
    init_tracing(&config.logging);
    info!("Configuration loaded from {}", config_path.display());

    // ── Config validation mode ─────────────────────────────────
    if cli.check {
        let endpoint = config.hub.endpoint();
        endpoint.validate()?;
        println!("✅ Configuration is valid");
        println!("   Config file  : {}", config_path.display());
        println!("   Hub host     : {}:{}", endpoint.hostname, endpoint.port);
        println!("   Virtual host : {}", endpoint.virtual_host);
        println!("   TLS          : {}", endpoint.use_tls);
        println!("   Timeout      : {:?}", endpoint.default_timeout);
        println!(
            "   Operator     : {}",
            config.operator.operator_id.as_deref().unwrap_or("<not set>")
        );
        println!("   Log level    : {}", config.logging.level);
        return Ok(());
    }

    let Some(command) = cli.command else {
        println!("Nothing to do. See --help.");
        return Ok(());
    };

    let operator_id = config.operator.operator_id()?;
    let event_bus = create_event_bus();
    let client = Arc::new(
        CpoClient::new(config.hub.endpoint(), Arc::new(SystemResolver))?
            .with_event_bus(event_bus.clone()),
    );

    match command {
        Command::PushStatus { records, action } => {
            let status = OperatorEvseStatus {
                operator_id,
                operator_name: config.operator.operator_name.clone(),
                records,
            };
            let outcome = client.push_evse_status(status, action, None).await?;
            print_outcome(&outcome);
        }
        Command::Sync { old, new } => {
            let old = read_snapshot(&old)?;
            let new = read_snapshot(&new)?;
            let mut diff = StatusDiff::from_snapshots(operator_id, &old, &new);
            diff.operator_name = config.operator.operator_name.clone();

            // Print events as they happen; the printer stops once the
            // synchronizer (the last holder of the bus) is dropped
            let mut subscriber = event_bus.subscribe();
            let printer = tokio::spawn(async move {
                while let Some(message) = subscriber.recv().await {
                    match serde_json::to_string(&message) {
                        Ok(line) => println!("{}", line),
                        Err(e) => error!("Failed to serialize event: {}", e),
                    }
                }
                subscriber.missed()
            });

            let synchronizer = StatusSynchronizer::new(client, event_bus);
            let report = synchronizer.synchronize(&diff, None).await;
            drop(synchronizer);
            let missed = printer.await?;
            if missed > 0 {
                warn!("{} events were not printed", missed);
            }

            let report = report?;
            println!("{}", serde_json::to_string_pretty(&report)?);
            if report.phases.is_empty() {
                println!("Snapshots are identical, nothing pushed.");
            }
        }
        Command::AuthorizeStart { uid, evse } => {
            let mut request = AuthorizeStartRequest::new(operator_id, Identification::rfid(uid));
            request.evse_id = evse.map(EvseId::new).transpose()?;
            let outcome = client.authorize_start(&request, None).await?;
            print_outcome(&outcome);
        }
    }

    Ok(())
}
