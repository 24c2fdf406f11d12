//! Periodic removal of expired session rows.
//!
//! Validation already deletes expired rows lazily when their token shows up,
//! but sessions of clients that never return would otherwise accumulate
//! forever. This task sweeps them on a fixed interval using
//! `tokio::time::interval`.

use std::time::Duration;

use sqlx::PgPool;
use tokio_util::sync::CancellationToken;

use crate::session::sweep_expired;

/// How often the sweep runs.
const SWEEP_INTERVAL: Duration = Duration::from_secs(24 * 3600); // daily

/// Run the session sweep loop until `cancel` is triggered.
pub async fn run(pool: PgPool, cancel: CancellationToken) {
    tracing::info!(
        interval_secs = SWEEP_INTERVAL.as_secs(),
        "Session sweep job started"
    );

    let mut interval = tokio::time::interval(SWEEP_INTERVAL);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Session sweep job stopping");
                break;
            }
            _ = interval.tick() => {
                match sweep_expired(&pool).await {
                    Ok(removed) => {
                        if removed > 0 {
                            tracing::info!(removed, "Session sweep: purged expired sessions");
                        } else {
                            tracing::debug!("Session sweep: nothing to purge");
                        }
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "Session sweep: cleanup failed");
                    }
                }
            }
        }
    }
}
