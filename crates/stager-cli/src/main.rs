//! Stager - fleet firmware staging
//!
//! Usage:
//!   stager stage --version 4.1.3b ... fi-a.example.net fi-b.example.net
//!   stager catalog --version 4.1.3b

mod sim;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use stager_core::catalog::{
    BundleSelection, HardwareFamily, b_series_filename, c_series_filename, infra_filename,
};
use stager_core::fleet::load_fleet_file;
use stager_core::session::{Credentials, ManagementTransport};
use stager_core::stage::{CurrentVersionPolicy, FleetRunner, StageOptions};
use stager_core::tasks::{TransferConfig, TransferProtocol};
use stager_core::version::VersionSpec;

#[derive(Parser)]
#[command(name = "stager")]
#[command(about = "Stage firmware bundles across a fleet of managed domains", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Ensure download tasks for the requested version exist on each target
    Stage(Box<StageArgs>),

    /// Show the bundle filenames a version resolves to, without contacting
    /// any target
    Catalog {
        /// Requested version in filename notation (e.g. 4.1.3b)
        #[arg(long)]
        version: String,

        /// Restrict to one hardware family code (6200, 6300, 6400)
        #[arg(long)]
        family: Option<u32>,

        /// Output format
        #[arg(short = 'o', long, default_value = "table")]
        format: OutputFormat,
    },
}

#[derive(Clone, Copy, ValueEnum, Default)]
enum OutputFormat {
    /// Human-readable table
    #[default]
    Table,
    /// Machine-readable JSON
    Json,
    /// Only report failures (non-zero exit if any)
    Quiet,
}

#[derive(Args)]
struct StageArgs {
    /// Target addresses (appended to any --fleet entries)
    targets: Vec<String>,

    /// Requested version in filename notation (e.g. 4.1.3b)
    #[arg(long)]
    version: String,

    /// Transfer protocol for download tasks (ftp, tftp, sftp, scp, http)
    #[arg(long)]
    protocol: String,

    /// Server download tasks fetch bundles from
    #[arg(long)]
    server: String,

    /// Path on the download server
    #[arg(long = "remote-path")]
    remote_path: String,

    /// User for the download server
    #[arg(long)]
    user: String,

    /// Password for the download server
    #[arg(long)]
    password: String,

    /// Management user for connecting to each target
    #[arg(long = "admin-user")]
    admin_user: String,

    /// Management password for connecting to each target
    #[arg(long = "admin-password")]
    admin_password: String,

    /// Read additional targets from a TOML fleet file
    #[arg(long)]
    fleet: Option<PathBuf>,

    /// Do not stage the infrastructure bundle
    #[arg(long = "no-infra")]
    no_infra: bool,

    /// Do not stage the B-series bundle
    #[arg(long = "no-b-series")]
    no_b_series: bool,

    /// Do not stage the C-series bundle
    #[arg(long = "no-c-series")]
    no_c_series: bool,

    /// Stage the infrastructure bundle even on targets already running the
    /// requested version
    #[arg(long, short)]
    force: bool,

    /// Skip B/C-series bundles too when a target is already current
    #[arg(long = "skip-on-current")]
    skip_on_current: bool,

    /// Fleet-state file for the bundled simulation driver
    #[arg(long = "sim-state")]
    sim_state: Option<PathBuf>,

    /// Output format
    #[arg(short = 'o', long, default_value = "table")]
    format: OutputFormat,
}

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "stager=debug,info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Stage(args) => run_stage(*args),
        Commands::Catalog {
            version,
            family,
            format,
        } => run_catalog(&version, family, format),
    }
}

fn run_stage(args: StageArgs) -> Result<()> {
    // A malformed requested version is a configuration error; it aborts the
    // whole run before any target is contacted.
    let version = VersionSpec::parse(&args.version)?;
    let protocol = parse_protocol(&args.protocol)?;

    let mut targets = args.targets.clone();
    if let Some(ref path) = args.fleet {
        targets.extend(load_fleet_file(path)?);
    }
    if targets.is_empty() {
        anyhow::bail!("no targets given; pass addresses or --fleet <file>");
    }

    let selection = BundleSelection {
        infrastructure: !args.no_infra,
        b_series: !args.no_b_series,
        c_series: !args.no_c_series,
    };
    if selection.is_empty() {
        anyhow::bail!("all bundle kinds disabled; nothing to stage");
    }

    let transfer = TransferConfig {
        protocol,
        server: args.server,
        remote_path: args.remote_path,
        username: args.user,
        password: args.password,
    };
    let credentials = Credentials::new(args.admin_user, args.admin_password);

    let mut options = StageOptions::new(version, transfer, credentials)
        .with_selection(selection)
        .with_force(args.force);
    if args.skip_on_current {
        options = options.with_on_current(CurrentVersionPolicy::SkipTarget);
    }

    let transport: Box<dyn ManagementTransport> = match args.sim_state {
        Some(ref path) => Box::new(
            sim::SimTransport::from_file(path).context("failed to load simulation driver state")?,
        ),
        None => anyhow::bail!(
            "no management driver available in this build; \
             pass --sim-state <file> or link a ManagementTransport implementation"
        ),
    };

    let runner = FleetRunner::new(transport, options);
    let report = runner.run(&targets);

    match args.format {
        OutputFormat::Table => print!("{}", report.render_table()),
        OutputFormat::Json => println!("{}", report.render_json()?),
        OutputFormat::Quiet => {
            if report.has_failures() {
                println!(
                    "{} of {} targets failed",
                    report.failed_targets(),
                    report.results.len()
                );
            }
        }
    }

    if report.has_failures() {
        std::process::exit(1);
    }
    Ok(())
}

fn run_catalog(version: &str, family: Option<u32>, format: OutputFormat) -> Result<()> {
    let version = VersionSpec::parse(version)?;
    let families: Vec<HardwareFamily> = match family {
        Some(code) => vec![HardwareFamily::from_code(code)?],
        None => HardwareFamily::ALL.to_vec(),
    };

    match format {
        OutputFormat::Table => {
            println!("{:<10} {:<10} Filename", "Family", "Bundle");
            println!("{}", "-".repeat(64));
            for family in &families {
                println!(
                    "{:<10} {:<10} {}",
                    family.code(),
                    "infra",
                    infra_filename(*family, &version)
                );
            }
            println!("{:<10} {:<10} {}", "-", "b-series", b_series_filename(&version));
            println!("{:<10} {:<10} {}", "-", "c-series", c_series_filename(&version));
        }
        OutputFormat::Json => {
            let infra: Vec<_> = families
                .iter()
                .map(|family| {
                    serde_json::json!({
                        "family": family.code(),
                        "filename": infra_filename(*family, &version),
                    })
                })
                .collect();
            let output = serde_json::json!({
                "version": version.filename_notation(),
                "display_version": version.display_notation(),
                "infrastructure": infra,
                "b_series": b_series_filename(&version),
                "c_series": c_series_filename(&version),
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Quiet => {}
    }

    Ok(())
}

fn parse_protocol(s: &str) -> Result<TransferProtocol> {
    TransferProtocol::ALL
        .into_iter()
        .find(|protocol| protocol.as_str() == s.to_lowercase())
        .ok_or_else(|| {
            anyhow::anyhow!("unknown protocol: '{}'. Use ftp, tftp, sftp, scp, or http", s)
        })
}
