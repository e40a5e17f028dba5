mod config;
mod error;
mod platform;

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use catlog_logs::{EventParser, FilterPipeline, OffsetPolicy, TimestampNormalizer};
use catlog_render::{RenderConfig, Rendered, create_renderer};
use catlog_sources::{
    AuthLogFile, EventSource, Journalctl, LinuxAuthSource, SourceCollector, UnavailableSource,
    drain,
};
use catlog_types::{CollectionRequest, FilterCriteria, KindSelector, OutputFormat, SourceMode};

use crate::config::Config;
use crate::error::AppError;
use crate::platform::Platform;

/// catlog - audit SSH, sudo, su and polkit activity from host logs
#[derive(Parser, Debug)]
#[command(name = "catlog")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Only events whose actor is exactly this user
    #[arg(long, value_name = "NAME")]
    user: Option<String>,

    /// Only events from this host
    #[arg(long, value_name = "NAME")]
    host: Option<String>,

    /// Event families to keep: sudo, ssh, su, pkexec, win (repeatable, comma-separated)
    #[arg(long, value_name = "KIND", value_delimiter = ',')]
    only: Vec<KindSelector>,

    /// Journal start time, passed through to journalctl
    #[arg(long, value_name = "SPEC")]
    since: Option<String>,

    /// Journal end time, passed through to journalctl
    #[arg(long, value_name = "SPEC")]
    until: Option<String>,

    /// Show at most N events; zero or negative shows all
    #[arg(long, value_name = "N", allow_hyphen_values = true)]
    limit: Option<i64>,

    /// Output format: table, json or csv
    #[arg(long)]
    format: Option<OutputFormat>,

    /// CSV file to write (default: timestamped file in the current directory)
    #[arg(long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Disable table colors
    #[arg(long)]
    no_color: bool,

    /// Log channel: auto, journal or authlog
    #[arg(long)]
    source: Option<SourceMode>,

    /// Year for syslog lines that carry none (default: current year)
    #[arg(long, value_name = "YYYY")]
    year: Option<i32>,

    /// Read syslog times without an offset as UTC instead of local time
    #[arg(long)]
    utc: bool,

    /// Configuration file
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

fn main() -> ExitCode {
    let args = Args::parse();

    // Logs go to stderr; stdout carries the report
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(error::exit_code(&e))
        }
    }
}

fn run(args: Args) -> Result<()> {
    let config = Config::load(args.config.as_deref())?;

    let platform = Platform::detect();
    info!(%platform, "Detected platform");

    let mut source: Box<dyn EventSource> = match &platform {
        Platform::Linux { .. } => Box::new(linux_source(&args, &config)?),
        Platform::Windows => Box::new(UnavailableSource::new("Windows Security event log")),
        Platform::Unsupported(os) => return Err(AppError::UnsupportedOs(os.clone()).into()),
    };
    let events = drain(source.as_mut()).map_err(AppError::from)?;

    let events = FilterPipeline::new(criteria(&args)).apply(events);

    let format = args.format.or(config.format).unwrap_or_default();
    let render_config = RenderConfig::detect(args.no_color || config.color_disabled());
    let renderer = create_renderer(format, render_config, args.output);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if format != OutputFormat::Json {
        writeln!(out, "Found {} relevant events:", events.len())?;
    }
    let rendered = renderer
        .render(&events, &mut out)
        .context("cannot render events")?;
    if let Rendered::File(path) = rendered {
        writeln!(out, "CSV written to {}", path.display())?;
    }
    out.flush()?;
    Ok(())
}

fn linux_source(args: &Args, config: &Config) -> Result<LinuxAuthSource> {
    let mut normalizer =
        TimestampNormalizer::new().context("cannot compile timestamp patterns")?;
    if let Some(year) = args.year {
        normalizer = normalizer.with_year(year);
    }
    if args.utc {
        normalizer = normalizer.with_offset(OffsetPolicy::utc());
    }
    info!(year = normalizer.year(), offset = ?normalizer.offset(), "Classic syslog settings");
    let parser = EventParser::new(normalizer).context("cannot compile event patterns")?;

    let journal = match &config.journal_command {
        Some(program) => Journalctl::with_program(program.as_str()),
        None => Journalctl::new(),
    };
    let authlog = match &config.authlog_paths {
        Some(paths) => AuthLogFile::with_candidates(paths),
        None => AuthLogFile::new(),
    };
    let collector = SourceCollector::with_parts(journal, authlog);

    let mut request = CollectionRequest::new(args.source.or(config.source).unwrap_or_default());
    if let Some(since) = &args.since {
        request = request.with_since(since.as_str());
    }
    if let Some(until) = &args.until {
        request = request.with_until(until.as_str());
    }
    info!(mode = request.mode.label(), "Collecting");

    Ok(LinuxAuthSource::new(collector, parser, request))
}

fn criteria(args: &Args) -> FilterCriteria {
    let mut criteria = FilterCriteria::new().with_kinds(&args.only);
    if let Some(user) = &args.user {
        criteria = criteria.with_actor(user.as_str());
    }
    if let Some(host) = &args.host {
        criteria = criteria.with_host(host.as_str());
    }
    if let Some(limit) = args.limit {
        criteria = criteria.with_limit(limit);
    }
    criteria
}
