//! Run two command batches over one persistent shell channel.
//!
//! The second batch reuses the channel the first batch opened, with its own
//! prompt threshold.
//!
//! # Usage
//!
//! ```bash
//! cargo run --example run_batch -- <host> <user> <password>
//! ```

use std::env;
use std::time::Duration;

use sshbatch::{CommandBatch, SessionBuilder};

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
        .prompt_count(2)
        .timeout(Duration::from_secs(15))
        .delay(Duration::from_millis(500))
        .quiet(true)
        .build()?;

    session.open().await?;

    let response = session
        .run_commands(CommandBatch::new("term len 0,show users"))
        .await?;
    println!("{}", response.output);
    println!("[first batch: {}]", response.outcome);

    println!("-------- next batch --------");

    // The trailing empty units send bare newlines, one prompt echo each
    let response = session
        .run_commands(CommandBatch::new("show users,,").prompt_count(3))
        .await?;
    println!("{}", response.output);
    println!("[second batch: {}]", response.outcome);

    session.close().await?;
    Ok(())
}
