//! Keep-awake watchdog background task

use std::{sync::Arc, time::Duration};
use tokio::time::interval;
use tracing::{debug, info, warn};

use crate::state::AppState;

/// How often the keep-awake lock is checked while a countdown runs
pub const KEEP_AWAKE_CHECK_INTERVAL: Duration = Duration::from_secs(15);

/// Periodically re-request keep-awake if it was dropped during a countdown.
///
/// Best effort only: the countdown does not depend on it.
pub async fn keep_awake_watchdog_task(state: Arc<AppState>, period: Duration) {
    info!("Starting keep-awake watchdog");

    let mut interval = interval(period);

    loop {
        interval.tick().await;

        match state.lock_controller() {
            Ok(controller) => {
                if controller.refresh_keep_awake() {
                    debug!("Keep-awake re-requested");
                }
            }
            Err(e) => warn!("Keep-awake check skipped: {}", e),
        }
    }
}
