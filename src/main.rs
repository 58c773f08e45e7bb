//! IoT Privacy - GDPR privacy policies for simulated IoT telemetry
//!
//! Command-line front-end: simulate device packets through the privacy
//! pipeline, scan or transform single packets, and inspect configuration.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use iot_privacy::{
    audit::{new_session_id, AuditLog},
    config::AppConfig,
    pipeline::{PipelineOutcome, StepStatus},
    privacy::{verify, PolicyConfig},
    simulator::{Scenario, Simulator},
    Packet, PrivacyPipeline,
};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "iot-privacy")]
#[command(author = "A3S Lab Team")]
#[command(version)]
#[command(about = "GDPR privacy policies and integrity audit for IoT telemetry")]
struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "IOT_PRIVACY_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Privacy controls layered over the `[policy]` section of the config file.
///
/// `--pseudo` switches a control on, `--no-pseudo` switches it off; a
/// control named by neither flag keeps its configured value.
#[derive(Args, Debug, Default)]
struct PolicyFlags {
    /// Pseudonymize direct identifiers
    #[arg(long)]
    pseudo: bool,

    /// Keep direct identifiers in clear text
    #[arg(long, conflicts_with = "pseudo")]
    no_pseudo: bool,

    /// Mask IP address and device serial
    #[arg(long)]
    mask_ip: bool,

    /// Leave IP address and device serial unmasked
    #[arg(long, conflicts_with = "mask_ip")]
    no_mask_ip: bool,

    /// Drop GPS coordinates and city
    #[arg(long)]
    drop_geo: bool,

    /// Keep GPS coordinates and city
    #[arg(long, conflicts_with = "drop_geo")]
    no_drop_geo: bool,

    /// Anonymize (overrides the other controls)
    #[arg(long)]
    anonymize: bool,

    /// Disable anonymization even if the config enables it
    #[arg(long, conflicts_with = "anonymize")]
    no_anonymize: bool,
}

impl PolicyFlags {
    fn merge(&self, base: PolicyConfig) -> PolicyConfig {
        let toggle = |configured: bool, on: bool, off: bool| (configured || on) && !off;
        PolicyConfig {
            pseudo: toggle(base.pseudo, self.pseudo, self.no_pseudo),
            mask_ip: toggle(base.mask_ip, self.mask_ip, self.no_mask_ip),
            drop_geo: toggle(base.drop_geo, self.drop_geo, self.no_drop_geo),
            anonymize_art9: toggle(base.anonymize_art9, self.anonymize, self.no_anonymize),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Run the packet simulator through the privacy pipeline
    Simulate {
        /// Scenario: smart-home or wearable-health
        #[arg(long)]
        scenario: Option<Scenario>,

        /// Number of packets (0 = until Ctrl+C)
        #[arg(long)]
        count: Option<u64>,

        /// Delay between packets in milliseconds
        #[arg(long)]
        interval_ms: Option<u64>,

        /// Seed for reproducible packets
        #[arg(long)]
        seed: Option<u64>,

        /// Directory to export the audit log CSV into
        #[arg(long)]
        export: Option<PathBuf>,

        /// Print raw and transformed packets
        #[arg(long)]
        show_packets: bool,

        #[command(flatten)]
        policy: PolicyFlags,
    },

    /// Classify the fields of a packet read from a JSON file
    Scan {
        /// Packet JSON file
        packet: PathBuf,
    },

    /// Apply the privacy policy to a packet read from a JSON file
    Transform {
        /// Packet JSON file
        packet: PathBuf,

        #[command(flatten)]
        policy: PolicyFlags,
    },

    /// Show configuration
    Config {
        /// Show default configuration
        #[arg(long)]
        default: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("iot_privacy={}", log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = AppConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Simulate {
            scenario,
            count,
            interval_ms,
            seed,
            export,
            show_packets,
            policy,
        } => {
            let options = SimulateOptions {
                scenario: scenario.unwrap_or(config.simulator.scenario),
                count: count.unwrap_or(config.simulator.count),
                interval: Duration::from_millis(interval_ms.unwrap_or(config.simulator.interval_ms)),
                seed,
                export: export.or_else(|| config.audit.export_dir.clone()),
                show_packets,
                policy: policy.merge(config.policy),
            };
            run_simulation(&config, options).await?;
        }
        Commands::Scan { packet } => {
            let packet = read_packet(&packet)?;
            let pipeline = PrivacyPipeline::with_salt(config.secret.salt.clone());
            let report = pipeline.classifier().scan(&packet);
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Commands::Transform { packet, policy } => {
            let packet = read_packet(&packet)?;
            run_transform(&config, &packet, policy.merge(config.policy))?;
        }
        Commands::Config { default } => {
            show_config(if default { None } else { Some(&config) })?;
        }
    }

    Ok(())
}

struct SimulateOptions {
    scenario: Scenario,
    count: u64,
    interval: Duration,
    seed: Option<u64>,
    export: Option<PathBuf>,
    show_packets: bool,
    policy: PolicyConfig,
}

async fn run_simulation(config: &AppConfig, options: SimulateOptions) -> Result<()> {
    let pipeline = PrivacyPipeline::with_salt(config.secret.salt.clone());
    let mut simulator = match options.seed {
        Some(seed) => Simulator::from_seed(seed),
        None => Simulator::new(),
    };
    let mut log = AuditLog::new(new_session_id());

    tracing::info!(
        session = log.session_id(),
        scenario = %options.scenario,
        mode = %options.policy.mode(),
        "Starting simulation. Press Ctrl+C to stop."
    );
    if options.scenario.is_health() && !options.policy.anonymize_art9 {
        tracing::warn!(
            scenario = %options.scenario,
            "Health data will be processed without Art. 9 anonymization"
        );
    }

    let mut ticker = tokio::time::interval(options.interval);
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                tracing::info!("Shutting down...");
                break;
            }
            _ = ticker.tick() => {
                let packet = simulator.next_packet(options.scenario);
                let outcome = pipeline.process(&packet, &options.policy, log.session_id())?;
                print_outcome(log.len() + 1, &packet, &outcome, &options);
                log.append(outcome.record);

                if options.count > 0 && log.len() as u64 >= options.count {
                    break;
                }
            }
        }
    }

    println!();
    println!(
        "Processed {} packets ({} integrity failures)",
        log.len(),
        log.failures()
    );

    if let Some(dir) = options.export.as_deref() {
        if log.is_empty() {
            println!("No data recorded, nothing to export.");
        } else {
            let path = log.export_csv(dir)?;
            println!("Audit log written to {}", path.display());
        }
    }

    Ok(())
}

fn print_outcome(n: usize, raw: &Packet, outcome: &PipelineOutcome, options: &SimulateOptions) {
    println!(
        "#{:<4} {:<16} {:<14} {} hash={}...",
        n,
        outcome.record.system_context(),
        outcome.transformed.mode,
        outcome.integrity,
        outcome.record.data_hash().short()
    );

    if outcome.special_category_alert(&options.policy) {
        println!("      ! Art. 9 special-category data present without anonymization");
    }

    for step in &outcome.steps {
        let marker = match step.status {
            StepStatus::Applied => "✓",
            StepStatus::Disabled => "✗",
            StepStatus::NotApplicable => "-",
            StepStatus::Failed => "!",
        };
        println!("      {} {}", marker, step.control);
    }

    if options.show_packets {
        if let (Ok(raw), Ok(clean)) = (
            serde_json::to_string(raw),
            serde_json::to_string(&outcome.transformed.clean),
        ) {
            println!("      raw:   {}", raw);
            println!("      clean: {}", clean);
        }
        println!("      audit: {}", outcome.record.to_json());
    }
}

fn run_transform(config: &AppConfig, packet: &Packet, policy: PolicyConfig) -> Result<()> {
    packet.validate()?;
    let pipeline = PrivacyPipeline::with_salt(config.secret.salt.clone());
    let transformed = pipeline.engine().transform(packet, &policy);
    let integrity = verify(&packet.payload, &transformed.payload);

    tracing::info!(mode = %transformed.mode, integrity = %integrity, "Transformed packet");
    println!("{}", serde_json::to_string_pretty(&transformed.clean)?);
    Ok(())
}

fn read_packet(path: &Path) -> Result<Packet> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read packet file {}", path.display()))?;
    let packet: Packet = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse packet file {}", path.display()))?;
    Ok(packet)
}

fn show_config(config: Option<&AppConfig>) -> Result<()> {
    let config = config.cloned().unwrap_or_default();
    println!("{}", config.to_toml_string()?);
    Ok(())
}
