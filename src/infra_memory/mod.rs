mod member_repo_memory;
mod refresh_token_store_memory;
mod token_blacklist_memory;

pub use member_repo_memory::*;
pub use refresh_token_store_memory::*;
pub use token_blacklist_memory::*;

use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Implemented by the in-memory stores so one background task can reclaim
/// their expired entries. The Redis adapters get this from key TTLs.
pub trait ExpirySweep: Send + Sync {
    fn sweep(&self);
}

pub fn spawn_sweeper(
    stores: Vec<Arc<dyn ExpirySweep>>,
    period: Duration,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(period) => {
                    for store in &stores {
                        store.sweep();
                    }
                    debug!("expiry sweep complete");
                }
            }
        }
    })
}
