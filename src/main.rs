mod api;
mod checks;
mod config;
mod hwpath;
mod models;
mod util;
mod verdict;

use anyhow::{Context, Result};
use api::fetcher::{self, FetchOptions};
use api::session::{ConnectionParams, Session, TlsVerify};
use checks::levels::NoPrediction;
use checks::{CheckParams, Sections};
use clap::Parser;
use config::Config;
use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;
use verdict::{Metric, State};

#[derive(Parser, Debug)]
#[command(name = "powerstore-agent", about = "Dell PowerStore REST API monitoring agent", version)]
struct Cli {
    /// Disable checking of the appliance's TLS certificate
    #[arg(long)]
    no_cert_check: bool,

    /// CA bundle for TLS certificate verification
    #[arg(long, value_name = "PATH", value_parser = existing_file)]
    ca_bundle: Option<PathBuf>,

    /// Network timeout in seconds, applied to the connection and to every single query
    #[arg(short = 't', long, value_name = "SECS")]
    timeout: Option<u64>,

    /// REST API port (default 443)
    #[arg(short = 'p', long)]
    port: Option<u16>,

    /// Username for login
    #[arg(short = 'u', long)]
    user: Option<String>,

    /// Password for login
    #[arg(short = 's', long, conflicts_with = "password_id")]
    password: Option<String>,

    /// Password store reference ID:PATH
    #[arg(long, value_name = "STOREREF")]
    password_id: Option<String>,

    /// Also fetch the newest performance and space samples per appliance
    #[arg(long)]
    metrics: bool,

    /// Evaluate all services and exit 0=OK, 1=WARN, 2=CRIT, 3=UNKNOWN
    #[arg(long)]
    check: bool,

    /// Evaluate a saved agent dump instead of polling (with --check)
    #[arg(long, value_name = "DUMP", requires = "check")]
    from_file: Option<PathBuf>,

    /// Configuration file (default: per-user config.toml)
    #[arg(long, value_name = "PATH")]
    config_file: Option<PathBuf>,

    /// Print the effective configuration and exit
    #[arg(long)]
    show_config: bool,

    /// Debug logging; failures propagate with their full cause chain
    #[arg(long)]
    debug: bool,

    /// Informational logging on stderr
    #[arg(short = 'v', long)]
    verbose: bool,

    /// Host name or IP address of the appliance
    #[arg(value_name = "HOST", required_unless_present = "show_config")]
    host: Option<String>,
}

fn existing_file(s: &str) -> Result<PathBuf, String> {
    let path = PathBuf::from(s);
    if path.is_file() {
        Ok(path)
    } else {
        Err(format!("readable_file:{} is not a valid path", s))
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli);

    let outcome = Config::load(cli.config_file.as_deref()).and_then(|cfg| {
        if cli.show_config {
            run_show_config(&cfg).map(|_| 0)
        } else if cli.check {
            run_check(&cli, &cfg)
        } else {
            run_agent(&cli, &cfg).map(|_| 0)
        }
    });

    match outcome {
        Ok(0) => Ok(()),
        Ok(code) => std::process::exit(code),
        Err(e) if cli.debug => Err(e),
        Err(e) => {
            eprintln!("{:#}", e);
            std::process::exit(1);
        }
    }
}

fn init_tracing(cli: &Cli) {
    let level = if cli.debug { "debug" } else if cli.verbose { "info" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn connection_params(cli: &Cli, cfg: &Config) -> Result<ConnectionParams> {
    let address = cli.host.clone().context("HOST is required")?;
    let secret = match (&cli.password, &cli.password_id) {
        (Some(pw), _)           => Some(pw.clone()),
        (None, Some(reference)) => Some(util::password_store::lookup(reference)?),
        (None, None)            => None,
    };
    let verify = if cli.no_cert_check {
        TlsVerify::Disabled
    } else {
        TlsVerify::CaBundle(cli.ca_bundle.clone().unwrap_or_else(|| cfg.connection.ca_bundle.clone()))
    };
    Ok(ConnectionParams {
        address,
        port:    cli.port.unwrap_or(cfg.connection.port),
        user:    cli.user.clone().or_else(|| cfg.connection.user.clone()),
        secret,
        verify,
        timeout: Duration::from_secs(cli.timeout.unwrap_or(cfg.connection.timeout_secs)),
    })
}

fn run_agent(cli: &Cli, cfg: &Config) -> Result<()> {
    let params = connection_params(cli, cfg)?;
    let session = Session::authenticate(&params)?;
    let mut out = BufWriter::new(io::stdout().lock());
    let result = fetcher::fetch_all(&session, &mut out, FetchOptions { metrics: cli.metrics });
    out.flush()?;
    result
}

fn run_check(cli: &Cli, cfg: &Config) -> Result<i32> {
    let dump = match &cli.from_file {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("cannot read agent dump {}", path.display()))?,
        None => {
            let params = connection_params(cli, cfg)?;
            let session = Session::authenticate(&params)?;
            let mut buf = Vec::new();
            fetcher::fetch_all(&session, &mut buf, FetchOptions { metrics: cli.metrics })?;
            String::from_utf8(buf).context("agent output is not UTF-8")?
        }
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let code = report_checks(&dump, cfg, cli.verbose, &mut out)?;
    out.flush()?;
    Ok(code)
}

/// Discover and evaluate every service in `dump`, one line per service.
/// Returns the worst state's exit code.
fn report_checks<W: Write>(dump: &str, cfg: &Config, verbose: bool, out: &mut W) -> Result<i32> {
    let sections = Sections::from_dump(dump);
    let services = checks::discover(&sections);
    if services.is_empty() {
        writeln!(out, "{} - no services discovered", State::Unknown)?;
        return Ok(State::Unknown.code());
    }

    let params = CheckParams { space: &cfg.space, volume: &cfg.volume, predictor: &NoPrediction };
    let mut worst = State::Ok;
    for service in &services {
        let v = checks::evaluate(service, &sections, &params);
        worst = State::worst(worst, v.state);
        let perf: Vec<String> = v.metrics.iter().map(Metric::perfdata).collect();
        if perf.is_empty() {
            writeln!(out, "{} {} - {}", v.state, service.name(), v.summary())?;
        } else {
            writeln!(out, "{} {} - {} | {}", v.state, service.name(), v.summary(), perf.join(" "))?;
        }
        if verbose {
            for line in &v.details {
                writeln!(out, "    {}", line)?;
            }
        }
    }
    Ok(worst.code())
}

fn run_show_config(cfg: &Config) -> Result<()> {
    let path = Config::config_path()
        .map(|p| p.to_string_lossy().into_owned())
        .unwrap_or_else(|| "(unknown)".to_string());
    println!("# Config: {}", path);
    println!();
    print!("{}", cfg.to_toml()?);
    Ok(())
}
