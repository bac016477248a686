use std::future::Future;
use std::io;

use engine_logging::engine_warn;
use tokio_util::sync::CancellationToken;

/// Cancels `token` on the first interrupt, then waits for another one.
///
/// Resolves to `true` when a second interrupt arrives, meaning the operator
/// does not want to wait for the query in flight. Resolves to `false` if
/// interrupts cannot be received.
pub async fn relay_interrupts<F, Fut>(token: CancellationToken, mut interrupt: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: Future<Output = io::Result<()>>,
{
    if interrupt().await.is_err() {
        return false;
    }
    engine_warn!("Interrupt received; finishing the current query (Ctrl-C again to quit now)");
    token.cancel();
    interrupt().await.is_ok()
}
