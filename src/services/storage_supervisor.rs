use std::time::Duration;

use tokio::time::sleep;
use tracing::{info, warn};

use crate::state::SharedState;

const INITIAL_DELAY: Duration = Duration::from_millis(1_000);
const MAX_DELAY: Duration = Duration::from_secs(10);
const HEALTH_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Poll the installed store and keep the degraded flag in sync with its health.
///
/// The store handle itself is never replaced; on failure the supervisor asks the
/// backend to reconnect with exponential backoff until it answers again.
pub async fn run(state: SharedState) {
    let store = state.supervised_store();

    loop {
        match store.health_check().await {
            Ok(()) => {
                if state.is_degraded() {
                    info!("storage healthy again; leaving degraded mode");
                    state.update_degraded(false);
                }
                sleep(HEALTH_POLL_INTERVAL).await;
            }
            Err(err) => {
                warn!(error = %err, "storage health check failed; entering degraded mode");
                state.update_degraded(true);

                let mut attempt: u32 = 0;
                let mut delay = INITIAL_DELAY;
                loop {
                    match store.try_reconnect().await {
                        Ok(()) => {
                            info!(attempt, "storage reconnection succeeded");
                            break;
                        }
                        Err(reconnect_err) => {
                            warn!(attempt, error = %reconnect_err, "storage reconnect attempt failed");
                            attempt += 1;
                            sleep(delay).await;
                            delay = (delay * 2).min(MAX_DELAY);
                        }
                    }
                }
            }
        }
    }
}
