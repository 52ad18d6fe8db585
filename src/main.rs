use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use tracing::{Level, error, info};

use autoresponder::config::{Config, DEFAULT_CONFIG_PATH};
use autoresponder::error::Error;
use autoresponder::mailbox::imap::TlsStream;
use autoresponder::mailbox::ImapSession;
use autoresponder::pipeline::{RunContext, RunSummary, close_mailbox, run_session};
use autoresponder::transport::SmtpRelay;

/// Answer every matching inbox message with a templated reply and move it
/// to trash.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Override path to config file
    #[arg(
        short,
        long,
        env = "AUTORESPONDER_CONFIG",
        default_value = DEFAULT_CONFIG_PATH
    )]
    config_path: PathBuf,
}

fn main() -> ExitCode {
    let args = Args::parse();

    // Fails only if a provider is already installed.
    let _ = rustls::crypto::ring::default_provider().install_default();

    let config = match Config::load(&args.config_path) {
        Ok(config) => config,
        Err(e) => {
            init_tracing(false);
            return fatal(&e.into(), &args.config_path, None);
        }
    };
    init_tracing(config.general.debug);

    match run(&config) {
        Ok(summary) => {
            info!("{summary}");
            ExitCode::SUCCESS
        }
        Err(e) => fatal(&e, &args.config_path, Some(&config)),
    }
}

fn init_tracing(debug: bool) {
    let default_level = if debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_target(false)
        .init();
}

/// Report a fatal error. Passwords never appear: `Config`'s `Debug` redacts them.
///
/// Written straight to stderr when ERROR logging is switched off.
fn fatal(err: &Error, config_path: &Path, config: Option<&Config>) -> ExitCode {
    let report = fatal_report(err, config_path, config);
    if tracing::enabled!(Level::ERROR) {
        for line in &report {
            error!("{line}");
        }
    } else {
        for line in &report {
            eprintln!("{line}");
        }
    }
    ExitCode::FAILURE
}

fn fatal_report(err: &Error, config_path: &Path, config: Option<&Config>) -> Vec<String> {
    let mut report = vec![
        format!("Error! {err}"),
        format!("Current configuration file path: '{}'.", config_path.display()),
    ];
    if let Some(config) = config {
        report.push(format!("Current configuration: {config:?}"));
    }
    report
}

/// One pass over the inbox. Both connections are closed before returning,
/// whatever happened.
fn run(config: &Config) -> Result<RunSummary, Error> {
    let ctx = RunContext::from_config(config)?;
    let server = &config.server;

    let mut imap = ImapSession::connect(&server.imap_host, server.imap_port)?;
    let mut smtp = match open_transport(&mut imap, config) {
        Ok(smtp) => smtp,
        Err(e) => {
            close_mailbox(&mut imap);
            return Err(e);
        }
    };

    Ok(run_session(&mut imap, &mut smtp, &ctx)?.summary())
}

/// Log in to IMAP and connect to the SMTP relay.
fn open_transport(imap: &mut ImapSession<TlsStream>, config: &Config) -> Result<SmtpRelay, Error> {
    let creds = &config.credentials;
    let server = &config.server;

    imap.login(&creds.incoming_username, &creds.incoming_password)?;
    let smtp = SmtpRelay::connect(
        &server.smtp_host,
        server.smtp_port,
        &creds.outgoing_username,
        &creds.outgoing_password,
    )?;
    Ok(smtp)
}
