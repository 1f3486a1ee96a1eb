//! Pool Janitor Task
//!
//! Background task that periodically reclaims expired pool entries and
//! finalizes everything left when its pool shuts down.

use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, info};

use crate::config::deadline_after;
use crate::error::{CacheError, Result};
use crate::pool::PoolTable;

// == Janitor ==
/// Handle on a running janitor: its one-shot stop signal and its task.
///
/// Dropping the handle closes the stop channel, which the task treats like
/// an explicit stop. Only [`Janitor::stop`] waits for the final clean.
#[derive(Debug)]
pub(crate) struct Janitor {
    stop: oneshot::Sender<()>,
    handle: JoinHandle<()>,
}

impl Janitor {
    // == Stop ==
    /// Signals the task and waits until it has cleaned the pool and exited.
    pub async fn stop(self) -> Result<()> {
        // The task only drops its receiver on exit; join reports why
        let _ = self.stop.send(());
        self.handle
            .await
            .map_err(|e| CacheError::Janitor(e.to_string()))
    }
}

/// Spawns the janitor for `table` on `runtime`.
///
/// The first sweep runs one full `interval` after spawning. Each tick flushes
/// expired entries under the table lock; the stop signal cleans the table
/// exactly once and ends the task.
pub(crate) fn spawn_janitor<K, V>(
    table: Arc<Mutex<PoolTable<K, V>>>,
    interval: Duration,
    runtime: &Handle,
) -> Janitor
where
    K: Eq + Hash + Send + 'static,
    V: Send + 'static,
{
    let (stop_tx, mut stop_rx) = oneshot::channel::<()>();

    let handle = runtime.spawn(async move {
        info!(
            "Starting pool janitor with interval of {} ms",
            interval.as_millis()
        );

        let mut ticker = time::interval_at(deadline_after(Instant::now(), interval), interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let reclaimed = table.lock().flush(Instant::now());
                    if reclaimed > 0 {
                        info!("Pool sweep: reclaimed {} expired entries", reclaimed);
                    } else {
                        debug!("Pool sweep: no expired entries found");
                    }
                }
                signal = &mut stop_rx => {
                    if signal.is_err() {
                        debug!("Pool cache dropped without shutdown, cleaning up");
                    }
                    let finalized = table.lock().clean();
                    info!("Pool janitor stopped: finalized {} remaining entries", finalized);
                    return;
                }
            }
        }
    });

    Janitor {
        stop: stop_tx,
        handle,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::Finalizer;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const TTL: Duration = Duration::from_secs(2);

    fn table() -> Arc<Mutex<PoolTable<&'static str, u32>>> {
        Arc::new(Mutex::new(PoolTable::new(TTL)))
    }

    fn counting(calls: &Arc<AtomicUsize>) -> Option<Finalizer<u32>> {
        let calls = calls.clone();
        Some(Finalizer::discard(move || {
            calls.fetch_add(1, Ordering::SeqCst);
        }))
    }

    #[tokio::test(start_paused = true)]
    async fn test_janitor_removes_expired_entries() {
        let table = table();
        let calls = Arc::new(AtomicUsize::new(0));
        table
            .lock()
            .store("conn", 1, counting(&calls), Instant::now())
            .unwrap();

        let janitor = spawn_janitor(table.clone(), Duration::from_secs(1), &Handle::current());

        // Expires at 2s, swept by the 3s tick
        time::sleep(Duration::from_millis(3500)).await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(table.lock().len(), 0);

        janitor.stop().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_janitor_preserves_fresh_entries() {
        let table = table();
        let calls = Arc::new(AtomicUsize::new(0));
        table
            .lock()
            .store("conn", 1, counting(&calls), Instant::now())
            .unwrap();

        let janitor = spawn_janitor(table.clone(), Duration::from_millis(500), &Handle::current());

        time::sleep(Duration::from_millis(1500)).await;

        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(table.lock().len(), 1);

        janitor.stop().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_cleans_remaining_entries() {
        let table = table();
        let calls = Arc::new(AtomicUsize::new(0));
        {
            let mut guard = table.lock();
            guard.store("a", 1, counting(&calls), Instant::now()).unwrap();
            guard.store("a", 2, counting(&calls), Instant::now()).unwrap();
            guard.store("b", 3, counting(&calls), Instant::now()).unwrap();
        }

        let janitor = spawn_janitor(table.clone(), Duration::from_secs(1), &Handle::current());
        janitor.stop().await.unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert!(table.lock().is_closed());
    }

    #[tokio::test]
    async fn test_unbounded_interval_still_stops() {
        let table = table();
        let calls = Arc::new(AtomicUsize::new(0));
        table
            .lock()
            .store("a", 1, counting(&calls), Instant::now())
            .unwrap();

        let janitor = spawn_janitor(table.clone(), Duration::MAX, &Handle::current());
        tokio::task::yield_now().await;
        janitor.stop().await.unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(table.lock().is_closed());
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweep_survives_panicking_finalizer() {
        let table = table();
        let calls = Arc::new(AtomicUsize::new(0));
        table
            .lock()
            .store("bad", 1, Some(Finalizer::discard(|| panic!("boom"))), Instant::now())
            .unwrap();

        let janitor = spawn_janitor(table.clone(), Duration::from_secs(1), &Handle::current());

        // The bad entry is swept by the 3s tick
        time::sleep(Duration::from_millis(3500)).await;
        assert_eq!(table.lock().key_count(), 0);

        table
            .lock()
            .store("good", 2, counting(&calls), Instant::now())
            .unwrap();
        time::sleep(Duration::from_secs(3)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        janitor.stop().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropped_handle_still_cleans() {
        let table = table();
        let calls = Arc::new(AtomicUsize::new(0));
        table
            .lock()
            .store("a", 1, counting(&calls), Instant::now())
            .unwrap();

        let janitor = spawn_janitor(table.clone(), Duration::from_secs(1), &Handle::current());
        let Janitor { stop, handle } = janitor;
        drop(stop);
        handle.await.unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(table.lock().is_closed());
    }
}
