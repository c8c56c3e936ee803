//! formstate - run a scripted form from the command line
//!
//! Reads a JSON form script, dispatches its operations, submits and
//! prints the outcome and the final state as JSON.

use anyhow::{bail, Context, Result};
use formstate::script::{run_script, FormScript};
use formstate::FormConfig;
use std::io::{self, Read};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    let config = FormConfig::load()?;

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log_filter_or_default().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let content = match std::env::args_os().nth(1).map(PathBuf::from) {
        Some(path) if path.as_os_str() != "-" => std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read script {}", path.display()))?,
        Some(_) | None => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            buffer
        }
    };
    if content.trim().is_empty() {
        bail!("usage: formstate [SCRIPT.json | -]");
    }

    let script = FormScript::from_json(&content).context("Invalid form script")?;
    let outcome = run_script(script, &config).await?;

    println!("{}", serde_json::to_string_pretty(&outcome)?);
    Ok(())
}
