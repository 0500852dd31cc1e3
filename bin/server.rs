// Fee Ledger - Web Server
// Local REST API over the student collection

use anyhow::{bail, Context, Result};
use clap::Parser;
use fee_ledger::{
    api, logging, FeeLedger, LedgerArgs, LoginGate, SqliteBlobStore, StudentStore,
};

/// fee-ledger-server - JSON API for the fee dashboard
#[derive(Parser, Debug)]
#[command(name = "fee-ledger-server")]
struct ServerArgs {
    #[command(flatten)]
    ledger: LedgerArgs,

    /// Address to listen on. The API has no per-request auth, so anything
    /// wider than loopback must be asked for explicitly.
    #[arg(long, env = "LISTEN", default_value = "127.0.0.1:3000")]
    listen: String,
}

// ============================================================================
// Main Server
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let args = ServerArgs::parse();
    if let Err(e) = args.ledger.validate() {
        bail!("Invalid configuration: {}", e);
    }

    logging::init_stderr(&args.ledger.log_level);

    tracing::info!("Fee Ledger - Web Server v{}", fee_ledger::VERSION);

    // Open database
    let backend = SqliteBlobStore::open(&args.ledger.db_path)
        .with_context(|| format!("Failed to open database {}", args.ledger.db_path.display()))?;
    let store = StudentStore::open(Box::new(backend), &args.ledger.storage_key);
    tracing::info!(
        db = %args.ledger.db_path.display(),
        students = store.len(),
        "Database opened"
    );

    // Create shared state
    let ledger = FeeLedger::new(store, args.ledger.settings());
    let state = api::AppState::new(ledger, LoginGate::new(&args.ledger.password));

    let app = api::router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&args.listen)
        .await
        .with_context(|| format!("Failed to bind to {}", args.listen))?;

    tracing::info!("Server running on http://{}", args.listen);
    tracing::info!("API: http://{}/api/students", args.listen);

    axum::serve(listener, app)
        .await
        .context("Server error")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listens_on_loopback_by_default() {
        let args = ServerArgs::try_parse_from(["fee-ledger-server"]).unwrap();
        assert_eq!(args.listen, "127.0.0.1:3000");
    }

    #[test]
    fn test_listen_can_be_widened() {
        let args = ServerArgs::try_parse_from(["fee-ledger-server", "--listen", "0.0.0.0:8080"]).unwrap();
        assert_eq!(args.listen, "0.0.0.0:8080");
    }
}
