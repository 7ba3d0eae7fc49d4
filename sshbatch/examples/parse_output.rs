//! Collect `show version` output and parse it into records with TextFSM.
//!
//! # Usage
//!
//! ```bash
//! cargo run --example parse_output -- <host> <user> <password>
//! ```

use std::env;
use std::time::Duration;

use sshbatch::{CommandBatch, SessionBuilder, parse};

const VERSION_TEMPLATE: &str = "\
Value VERSION (\\S+)
Value UPTIME (.+)

Start
  ^.*Software.*Version ${VERSION},
  ^\\S+ uptime is ${UPTIME} -> Record
";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = env::args().skip(1);
    let host = args.next().unwrap_or_else(|| "172.16.101.100".to_string());
    let user = args.next().unwrap_or_else(|| "cisco".to_string());
    let password = args.next().unwrap_or_else(|| "cisco".to_string());

    let mut session = SessionBuilder::new(&host)
        .username(&user)
        .password(&password)
        .prompt("#")
        .timeout(Duration::from_secs(10))
        .delay(Duration::from_millis(500))
        .quiet(true)
        .build()?;

    session.open().await?;

    let response = session
        .run_commands(CommandBatch::new("term len 0,show version").prompt_count(2))
        .await?;

    if !response.is_complete() {
        eprintln!("batch did not complete: {}", response.outcome);
    }

    let records = parse::parse_template_str(VERSION_TEMPLATE, &response.output)?;
    println!("{}", serde_json::to_string_pretty(&records)?);

    session.close().await?;
    Ok(())
}
