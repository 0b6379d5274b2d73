use std::env;
use std::io::{self, Write};
use std::path::Path;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use driver_scanner_core::{
    render_device_table, validate_scan_filter, BlockDeviceProvider, DeviceScanner,
    MountTableProvider, ScanFilter, PROC_FILESYSTEMS,
};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

mod version;

use version::BuildInfo;

#[derive(Debug, Parser)]
#[command(
    name = "driver-scanner",
    version,
    about = "Scan and list block devices with mount and filesystem information."
)]
struct Cli {
    /// Enable debug output.
    #[arg(long, global = true)]
    debug: bool,

    /// Enable verbose output.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Scan block devices and display their information.
    Scan(ScanArgs),
    /// Print version information.
    Version(VersionArgs),
}

#[derive(Debug, Args)]
struct ScanArgs {
    /// Filter by filesystem type (e.g. ext4).
    #[arg(long, value_name = "TYPE")]
    fstype: Option<String>,

    /// Filter by minimum device size (e.g. 1G, 500M).
    #[arg(long, value_name = "SIZE")]
    min_size: Option<String>,

    /// Filter by mount point (substring match).
    #[arg(long, value_name = "TEXT")]
    mount_point: Option<String>,

    /// Print the matching devices as JSON instead of a table.
    #[arg(long)]
    json: bool,

    /// Accept any --fstype value instead of checking /proc/filesystems.
    #[arg(long)]
    no_fstype_check: bool,
}

impl ScanArgs {
    fn filter(&self) -> ScanFilter {
        ScanFilter {
            fstype: self.fstype.clone().unwrap_or_default(),
            min_size: self.min_size.clone().unwrap_or_default(),
            mount_point: self.mount_point.clone().unwrap_or_default(),
        }
    }
}

#[derive(Debug, Args)]
struct VersionArgs {
    /// Print only the version number.
    #[arg(long)]
    short: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.debug, cli.verbose);
    debug!(
        debug = cli.debug,
        verbose = cli.verbose,
        "log level configured from flags"
    );

    match cli.command {
        Commands::Scan(args) => run_scan_command(args),
        Commands::Version(args) => run_version_command(args),
    }
}

fn run_scan_command(args: ScanArgs) -> Result<()> {
    let registry = (!args.no_fstype_check).then(|| Path::new(PROC_FILESYSTEMS));
    let scanner = DeviceScanner::system();
    run_scan(&scanner, &args, registry, &mut io::stdout().lock())
}

/// Validates the filter, runs the scan and writes the result to `out`. Nothing
/// is written when validation or the scan fails.
fn run_scan<D, M>(
    scanner: &DeviceScanner<D, M>,
    args: &ScanArgs,
    registry: Option<&Path>,
    out: &mut impl Write,
) -> Result<()>
where
    D: BlockDeviceProvider,
    M: MountTableProvider,
{
    let filter = args.filter();
    info!(
        fstype = %filter.fstype,
        min_size = %filter.min_size,
        mount_point = %filter.mount_point,
        "scan command invoked"
    );

    validate_scan_filter(&filter, registry)?;

    let devices = scanner.scan(filter).context("scan failed")?;

    info!(count = devices.len(), "scan complete");
    if devices.is_empty() {
        warn!("no devices matched the filter criteria");
    }

    if args.json {
        serde_json::to_writer_pretty(&mut *out, &devices).context("failed to serialize devices")?;
        writeln!(out).context("failed to write scan output")?;
    } else {
        out.write_all(render_device_table(&devices).as_bytes())
            .context("failed to write scan output")?;
    }

    Ok(())
}

fn run_version_command(args: VersionArgs) -> Result<()> {
    BuildInfo::current()
        .write_to(&mut io::stdout().lock(), args.short)
        .context("failed to write version information")
}

/// `--debug` wins over `--verbose`. Without either, `RUST_LOG` applies, then
/// `LOG_LEVEL`, and finally warnings only. Blank variables are ignored.
fn log_directives(
    debug: bool,
    verbose: bool,
    rust_log: Option<&str>,
    log_level: Option<&str>,
) -> String {
    if debug {
        return "debug".to_string();
    }
    if verbose {
        return "info".to_string();
    }
    [rust_log, log_level]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|value| !value.is_empty())
        .unwrap_or("warn")
        .to_string()
}

fn init_tracing(debug: bool, verbose: bool) {
    let rust_log = env::var(EnvFilter::DEFAULT_ENV).ok();
    let log_level = env::var("LOG_LEVEL").ok();
    let directives = log_directives(debug, verbose, rust_log.as_deref(), log_level.as_deref());
    let filter = EnvFilter::try_new(&directives).unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}
