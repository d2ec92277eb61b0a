mod config;
mod services;
mod session;

use anyhow::Result;
use std::io;

use config::Settings;
use session::{Session, run_repl};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("nlsql=info,warn")),
        )
        .with_writer(io::stderr)
        .init();

    let settings = Settings::load()?;
    tracing::debug!(
        provider = ?settings.provider,
        db = %settings.db_path.display(),
        docs = %settings.docs_dir.display(),
        "Settings loaded"
    );

    smol::block_on(async {
        let mut session = Session::open(&settings).await?;

        let mut input = io::stdin().lock();
        let mut stdout = io::stdout();
        let outcome = run_repl(&mut session, &mut input, &mut stdout).await;

        session.close().await?;
        outcome
    })
}
