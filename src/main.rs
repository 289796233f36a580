//! VitalGuard host entry point.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  ContactBook     ConsoleNotifier   ConsoleAlarm   RecordLog    │
//! │  (Contacts)      (Notification)    (Alarm)        (Persist)    │
//! │  JsonConfigFile  LogEventSink      Monotonic/ManualClock       │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │            MonitorService (pure logic)                 │    │
//! │  │  Telemetry · Risk · Fall FSM · Screen · Escalation     │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! │                                                                │
//! │  runtime::replay (manual clock) · runtime::live (executor)     │
//! └────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```bash
//! # Replay a JSON-lines trace of {"t_ms": .., "command": {..}}
//! vitalguard replay trace.jsonl --contacts contacts.json --record-log out.bin
//!
//! # Live: one AppCommand JSON object per stdin line, until EOF
//! vitalguard live --contacts contacts.json < commands.jsonl
//!
//! # Print a record log as JSON lines
//! vitalguard dump-log out.bin
//! ```

use std::cell::RefCell;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::{info, warn};

use vitalguard::adapters::config_file::JsonConfigFile;
use vitalguard::adapters::contact_book::ContactBook;
use vitalguard::adapters::local::LocalPorts;
use vitalguard::adapters::log_sink::LogEventSink;
use vitalguard::adapters::record_log::{RecordLog, read_records};
use vitalguard::adapters::time::{ManualClock, MonotonicClock};
use vitalguard::app::commands::AppCommand;
use vitalguard::app::ports::ConfigPort;
use vitalguard::app::service::MonitorService;
use vitalguard::config::MonitorConfig;
use vitalguard::escalation::SubjectId;
use vitalguard::profile::SubjectProfile;
use vitalguard::runtime::channels::{COMMANDS, SHUTDOWN};
use vitalguard::runtime::live::{self, Runtime};
use vitalguard::runtime::replay::{self, TraceEntry};

// ── CLI ───────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "vitalguard", version, about = "Vital-sign monitoring and emergency escalation core")]
struct Cli {
    /// Monitor configuration (JSON).  Defaults apply when absent.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log level: trace, debug, info, warn, error.
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    mode: Mode,
}

#[derive(clap::Args, Debug)]
struct SubjectArgs {
    /// Numeric subject id.
    #[arg(long, default_value_t = 1)]
    subject: u32,

    /// Subject profile (JSON).
    #[arg(long)]
    profile: Option<PathBuf>,

    /// Emergency contacts (JSON).
    #[arg(long)]
    contacts: Option<PathBuf>,

    /// Append readings and alerts to this framed record log.
    #[arg(long)]
    record_log: Option<PathBuf>,

    /// Stop logging records once the log reaches this many bytes.
    #[arg(long, requires = "record_log")]
    record_log_limit: Option<u64>,

    /// Log every assessment, not only abnormal ones.
    #[arg(long, short = 'v', default_value_t = false)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Mode {
    /// Replay a timestamped trace on a manual clock.
    Replay {
        trace: PathBuf,

        /// Keep time running this long after the last entry.
        #[arg(long, default_value_t = 180_000)]
        settle_ms: u64,

        #[command(flatten)]
        subject: SubjectArgs,
    },
    /// Read commands from stdin and run on the wall clock.
    Live {
        #[command(flatten)]
        subject: SubjectArgs,
    },
    /// Print the records of a record log as JSON lines.
    DumpLog { path: PathBuf },
}

// ── Setup helpers ─────────────────────────────────────────────

type Store = RecordLog<Box<dyn Write>>;

fn load_config(path: Option<&Path>) -> Result<MonitorConfig> {
    match path {
        Some(p) => JsonConfigFile::new(p)
            .load()
            .with_context(|| format!("loading config {}", p.display())),
        None => Ok(MonitorConfig::default()),
    }
}

fn load_profile(path: Option<&Path>) -> Result<SubjectProfile> {
    let Some(p) = path else {
        warn!("No subject profile given, using population defaults");
        return Ok(SubjectProfile::default());
    };
    let text = std::fs::read_to_string(p).with_context(|| format!("reading profile {}", p.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing profile {}", p.display()))
}

fn build_ports(args: &SubjectArgs) -> Result<LocalPorts<Store>> {
    let contacts = match &args.contacts {
        Some(p) => ContactBook::load(p)
            .with_context(|| format!("loading contacts {}", p.display()))?,
        None => {
            warn!("No contacts file given, escalations will reach nobody");
            ContactBook::new()
        }
    };
    let writer: Box<dyn Write> = match &args.record_log {
        Some(p) => Box::new(BufWriter::new(
            File::create(p).with_context(|| format!("creating record log {}", p.display()))?,
        )),
        None => Box::new(io::sink()),
    };
    let store = match args.record_log_limit {
        Some(limit) => RecordLog::new(writer).with_limit(limit),
        None => RecordLog::new(writer),
    };
    Ok(LocalPorts::new(contacts, store))
}

fn sink_for(args: &SubjectArgs) -> LogEventSink {
    if args.verbose {
        LogEventSink::verbose()
    } else {
        LogEventSink::new()
    }
}

fn read_trace(path: &Path) -> Result<Vec<TraceEntry>> {
    let file = File::open(path).with_context(|| format!("opening trace {}", path.display()))?;
    let mut entries = Vec::new();
    for (n, line) in BufReader::new(file).lines().enumerate() {
        let line = line.with_context(|| format!("reading trace line {}", n + 1))?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let entry: TraceEntry =
            serde_json::from_str(line).with_context(|| format!("trace line {}", n + 1))?;
        entries.push(entry);
    }
    Ok(entries)
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value).context("serialising output")?;
    println!("{text}");
    Ok(())
}

fn finish(ports: LocalPorts<Store>) -> Result<()> {
    info!(
        "Notifications: {} sent, {} failed; {} records ({} bytes) logged",
        ports.notifier.sent(),
        ports.notifier.failed(),
        ports.store.records_written(),
        ports.store.bytes_written()
    );
    let mut writer = ports.store.into_inner();
    writer.flush().context("flushing record log")
}

// ── Modes ─────────────────────────────────────────────────────

fn run_replay(config: MonitorConfig, trace: &Path, settle_ms: u64, args: &SubjectArgs) -> Result<()> {
    let entries = read_trace(trace)?;
    info!("Replaying {} entries from {}", entries.len(), trace.display());

    let clock = ManualClock::new(0);
    let profile = load_profile(args.profile.as_deref())?;
    let mut service = MonitorService::new(SubjectId(args.subject), config, profile, clock.clone());
    let mut ports = build_ports(args)?;
    let mut sink = sink_for(args);

    let stats = replay::replay(&mut service, &clock, entries, settle_ms, &mut ports, &mut sink);
    info!(
        "Replay done: {} commands ({} rejected), {} ticks, ended at {} ms",
        stats.commands, stats.rejected, stats.ticks, stats.end_ms
    );
    print_json(service.metrics())?;
    finish(ports)
}

fn run_live(config: MonitorConfig, args: &SubjectArgs) -> Result<()> {
    let profile = load_profile(args.profile.as_deref())?;
    let service = MonitorService::new(SubjectId(args.subject), config, profile, MonotonicClock::new());
    let rt = RefCell::new(Runtime::new(service, build_ports(args)?, sink_for(args)));

    let reader = std::thread::Builder::new()
        .name("stdin".into())
        .spawn(|| {
            for (n, line) in io::stdin().lock().lines().enumerate() {
                let Ok(line) = line else { break };
                if line.trim().is_empty() {
                    continue;
                }
                match serde_json::from_str::<AppCommand>(&line) {
                    Ok(cmd) => futures_lite::future::block_on(COMMANDS.send(cmd)),
                    Err(e) => warn!("stdin line {}: {}", n + 1, e),
                }
            }
            SHUTDOWN.signal(());
        })
        .context("spawning stdin reader")?;

    live::run(&rt, &COMMANDS, &SHUTDOWN);
    if reader.join().is_err() {
        warn!("stdin reader panicked");
    }

    let rt = rt.into_inner();
    print_json(rt.service.metrics())?;
    finish(rt.ports)
}

fn dump_log(path: &Path) -> Result<()> {
    let file = File::open(path).with_context(|| format!("opening record log {}", path.display()))?;
    let records = read_records(BufReader::new(file))
        .with_context(|| format!("reading record log {}", path.display()))?;
    let stdout = io::stdout();
    let mut out = stdout.lock();
    for record in &records {
        let line = serde_json::to_string(record).context("serialising record")?;
        writeln!(out, "{line}")?;
    }
    Ok(())
}

// ── Main ──────────────────────────────────────────────────────

fn main() -> Result<()> {
    let cli = Cli::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&cli.log_level))
        .format_timestamp_millis()
        .init();

    info!("VitalGuard v{}", env!("CARGO_PKG_VERSION"));

    match &cli.mode {
        Mode::Replay {
            trace,
            settle_ms,
            subject,
        } => {
            let config = load_config(cli.config.as_deref())?;
            run_replay(config, trace, *settle_ms, subject)
        }
        Mode::Live { subject } => {
            let config = load_config(cli.config.as_deref())?;
            run_live(config, subject)
        }
        Mode::DumpLog { path } => dump_log(path),
    }
}
