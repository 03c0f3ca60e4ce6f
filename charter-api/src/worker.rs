use charter_core::ExpirySweep;
use tokio::sync::watch;
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::{error, info};

/// Runs the expiry sweep on a fixed period until `shutdown` flips to true.
/// A failed sweep is logged and retried on the next tick.
pub async fn start_expiry_worker(
    sweep: ExpirySweep,
    period: Duration,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    info!("Expiry worker started, sweeping every {:?}", period);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                match sweep.run().await {
                    Ok(report) if report.expired_count > 0 => {
                        info!(expired = report.expired_count, "Scheduled expiry sweep finished");
                    }
                    Ok(_) => {}
                    Err(e) => error!("Scheduled expiry sweep failed: {}", e),
                }
            }
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    break;
                }
            }
        }
    }

    info!("Expiry worker stopped");
}
