mod rate_limiter;

use tokio::runtime::{Builder, Runtime};

/// Current-thread runtime with paused time, so backoffs and windows elapse
/// instantly.
pub(crate) fn paused_runtime() -> Runtime {
    Builder::new_current_thread()
        .enable_time()
        .start_paused(true)
        .build()
        .unwrap()
}
