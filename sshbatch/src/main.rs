//! sshbatch CLI: run a batch of commands on a remote host over SSH.
//!
//! Sample usage:
//!
//! ```text
//! sshbatch -H 172.16.1.101 -u cisco -p cisco \
//!     -c "term len 0,show users,show run" \
//!     --invoke-shell --prompt "#" --prompt-count 4 -t 15
//! ```

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use log::{error, info};

use sshbatch::{
    CommandBatch, Error, HostKeyVerification, SessionBuilder, SessionMode, resolve_password,
};

/// Environment variable consulted when no explicit password is given.
const PASSWORD_ENV: &str = "SSHBATCH_PASSWORD";

#[derive(Parser, Debug)]
#[command(name = "sshbatch")]
#[command(about = "SSH batch runner with prompt-count completion detection")]
#[command(version)]
struct Cli {
    /// SSH host (hostname or IP address)
    #[arg(short = 'H', long)]
    host: String,

    /// SSH port
    #[arg(long, default_value_t = 22)]
    port: u16,

    /// SSH username
    #[arg(short = 'u', long)]
    user: String,

    /// SSH password; falls back to $SSHBATCH_PASSWORD when omitted
    #[arg(short = 'p', long)]
    password: Option<String>,

    /// SSH private key path (used instead of a password)
    #[arg(short = 'k', long)]
    key: Option<PathBuf>,

    /// Commands to run, separated by commas; an empty unit sends a bare newline
    #[arg(short = 'c', long, default_value = "")]
    cmds: String,

    /// Run the batch over a persistent interactive shell
    #[arg(long)]
    invoke_shell: bool,

    /// Prompt substring to look for before finishing the batch
    #[arg(long, default_value = "")]
    prompt: String,

    /// Number of prompt occurrences that complete the batch
    #[arg(long, default_value_t = 1)]
    prompt_count: u32,

    /// Command timeout in seconds
    #[arg(short = 't', long, default_value_t = 5)]
    timeout: u64,

    /// Inter-command delay in seconds
    #[arg(short = 'i', long, default_value_t = 1.0)]
    delay: f64,

    /// Host key checking mode
    #[arg(long, value_enum, default_value_t = HostKeyMode::AcceptNew)]
    host_key: HostKeyMode,

    /// known_hosts file to check host keys against
    #[arg(long)]
    known_hosts: Option<PathBuf>,

    /// Directory for per-session transcript files
    #[arg(long)]
    log_dir: Option<PathBuf>,

    /// Suppress live echo of received output
    #[arg(short = 'q', long)]
    quiet: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum HostKeyMode {
    /// Reject unknown and changed host keys
    Strict,
    /// Auto-learn unknown keys, reject changed keys
    AcceptNew,
    /// Skip host key checking entirely
    None,
}

impl From<HostKeyMode> for HostKeyVerification {
    fn from(mode: HostKeyMode) -> Self {
        match mode {
            HostKeyMode::Strict => HostKeyVerification::Strict,
            HostKeyMode::AcceptNew => HostKeyVerification::AcceptNew,
            HostKeyMode::None => HostKeyVerification::Disabled,
        }
    }
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        error!("{}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Error> {
    let mode = if cli.invoke_shell {
        SessionMode::Shell
    } else {
        SessionMode::Exec
    };

    let mut builder = SessionBuilder::new(&cli.host)
        .port(cli.port)
        .username(&cli.user)
        .mode(mode)
        .prompt(&cli.prompt)
        .prompt_count(cli.prompt_count)
        .timeout(Duration::from_secs(cli.timeout))
        .delay(Duration::from_secs_f64(cli.delay))
        .host_key_verification(cli.host_key.into())
        .quiet(cli.quiet);

    if let Some(path) = cli.known_hosts {
        builder = builder.known_hosts_path(path);
    }
    if let Some(dir) = cli.log_dir {
        builder = builder.transcript_dir(dir);
    }

    builder = match cli.key {
        Some(key) => builder.private_key(key),
        None => {
            let fallback = std::env::var(PASSWORD_ENV).ok();
            builder.password_secret(resolve_password(cli.password, fallback)?)
        }
    };

    let mut session = builder.build()?;
    session.open().await?;

    let response = session.run_commands(CommandBatch::new(&cli.cmds)).await?;
    info!("exiting: {}", response.outcome);

    session.close().await
}
