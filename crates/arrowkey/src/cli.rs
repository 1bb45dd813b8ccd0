//! The `readkey` command.

use std::io::Write;

use clap::Parser;

use crate::error::{KeyError, Result};
use crate::{KeyEvent, TerminalController, read_key};

/// Environment variable holding an `EnvFilter` directive for log output.
pub const LOG_ENV: &str = "ARROWKEY_LOG";

#[derive(Debug, Parser)]
#[command(
    name = "readkey",
    about = "Read keystrokes from the terminal without echo, decoding Up/Down arrows",
    version
)]
pub struct Cli {
    /// Number of keys to read; each is printed on its own line.
    #[arg(
        short = 'n',
        long,
        default_value_t = 1,
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    pub count: u32,

    /// Read one key and exit with its status: up=0, down=1, literal=byte,
    /// malformed=255.
    #[arg(long, conflicts_with = "count")]
    pub exit_status: bool,

    /// Log raw-mode transitions and decoded keys to stderr.
    #[arg(short, long)]
    pub verbose: bool,

    /// Emit logs as JSON lines (needs the `tracing-json` feature).
    #[arg(long)]
    pub log_json: bool,
}

impl Cli {
    fn default_filter(&self) -> &'static str {
        if self.verbose { "debug" } else { "warn" }
    }
}

/// Status for a key in `--exit-status` mode, as the process will report it.
#[must_use]
pub fn key_exit_status(key: KeyEvent) -> i32 {
    key.status_code() & 0xff
}

/// Install the stderr log subscriber for this invocation.
#[cfg(feature = "tracing")]
pub fn init_logging(cli: &Cli) {
    #[cfg(feature = "tracing-json")]
    {
        if cli.log_json {
            arrowkey_core::logging::init_json_logging(LOG_ENV, cli.default_filter());
            return;
        }
    }

    let filter = tracing_subscriber::EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(cli.default_filter()));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();

    #[cfg(not(feature = "tracing-json"))]
    {
        if cli.log_json {
            arrowkey_core::warn!("--log-json needs the tracing-json feature; using text logs");
        }
    }
}

#[cfg(not(feature = "tracing"))]
pub fn init_logging(_cli: &Cli) {}

pub fn run_from_env() -> Result<i32> {
    let cli = Cli::parse();
    init_logging(&cli);
    let mut terminal = TerminalController::new();
    run(&cli, &mut terminal, &mut std::io::stdout())
}

/// Execute `cli` and return the process exit status.
///
/// # Errors
///
/// Setup, read and output failures, as [`KeyError`].
pub fn run(cli: &Cli, terminal: &mut TerminalController, out: &mut dyn Write) -> Result<i32> {
    if cli.exit_status {
        let key = read_key(terminal)?;
        return Ok(key_exit_status(key));
    }

    for _ in 0..cli.count {
        let key = read_key(terminal)?;
        // Raw mode is off again here, so a plain newline is enough.
        writeln!(out, "{key}").map_err(KeyError::Output)?;
        out.flush().map_err(KeyError::Output)?;
    }
    Ok(0)
}
