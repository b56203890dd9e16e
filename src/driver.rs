//! Wall-clock driver for the fleet engine

use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

use crate::fleet::Fleet;

pub type SharedFleet = Arc<Mutex<Fleet>>;

/// Advance `fleet` by `step` every `step` of real time until `shutdown`
/// flips to `true` or its sender is dropped. Pending completions are
/// cancelled on exit.
pub async fn run(fleet: SharedFleet, step: Duration, mut shutdown: watch::Receiver<bool>) {
    let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + step, step);
    tracing::info!(step_ms = step.as_millis() as u64, "Fleet driver started");

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                fleet.lock().advance(step);
            }
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    break;
                }
            }
        }
    }

    let cancelled = fleet.lock().shutdown();
    tracing::info!(cancelled, "Fleet driver stopped");
}

/// Run a driver over `fleet` until no completion is pending, then stop it
/// and hand the fleet back.
pub async fn run_until_idle(fleet: Fleet, step: Duration) -> SharedFleet {
    let shared: SharedFleet = Arc::new(Mutex::new(fleet));
    let (tx, rx) = watch::channel(false);
    let handle = tokio::spawn(run(shared.clone(), step, rx));

    loop {
        let pending = shared.lock().pending_completions();
        if pending == 0 {
            break;
        }
        tokio::time::sleep(step).await;
    }

    let _ = tx.send(true);
    if let Err(e) = handle.await {
        tracing::warn!(error = %e, "Fleet driver task failed");
    }
    shared
}
