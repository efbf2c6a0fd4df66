use std::env;
use std::io;
use std::process;

use anyhow::{Context, Result};
use clap::command;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use gitsweep::config::Config;
use gitsweep::git::Git2Backend;
use gitsweep::sweep::sweep;

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("gitsweep=warn"));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

async fn run() -> Result<()> {
    let config = Config::load();
    let root = env::current_dir().context("cannot determine the current directory")?;
    let backend = Git2Backend::new(config.fetch_timeout);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    sweep(&root, &backend, &config, &mut out).await?;
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Takes no arguments; this only provides --help and --version.
    command!()
        .about("Deletes every git repository in the current directory that has nothing left to push.")
        .get_matches();

    init_tracing();

    if let Err(e) = run().await {
        eprintln!("gitsweep: {e:#}");
        process::exit(1);
    }
}
