//! Expiration Sweeper
//!
//! Background task that periodically purges expired pages from the store.

use std::time::Duration;

use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::store::PageStore;

/// Owned handle to a running sweeper.
///
/// Dropping the handle also stops the sweeper after its current tick.
#[derive(Debug)]
pub struct SweeperHandle {
    shutdown: Option<oneshot::Sender<()>>,
    task: JoinHandle<()>,
}

impl SweeperHandle {
    /// Signals the sweeper to stop and waits for it to exit.
    ///
    /// A sweep already in progress runs to completion first.
    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }

        if let Err(err) = self.task.await {
            warn!(error = %err, "expiration sweeper ended abnormally");
        }
    }

    #[cfg(test)]
    fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

/// Spawns a background task that purges expired pages every `interval`.
///
/// The first sweep happens one interval after startup. A failed sweep is
/// logged and the next tick proceeds on schedule.
///
/// # Example
/// ```ignore
/// let store = PageStore::connect("sqlite://pages.db").await?;
/// let sweeper = spawn_sweeper(store.clone(), Duration::from_secs(3600));
/// // Later, during shutdown:
/// sweeper.shutdown().await;
/// ```
pub fn spawn_sweeper(store: PageStore, interval: Duration) -> SweeperHandle {
    let (shutdown_tx, mut shutdown_rx) = oneshot::channel::<()>();

    let task = tokio::spawn(async move {
        info!(
            "Starting expiration sweeper with interval of {} seconds",
            interval.as_secs()
        );

        loop {
            tokio::select! {
                _ = tokio::time::sleep(interval) => {}
                _ = &mut shutdown_rx => break,
            }

            // Not raced against shutdown: a started sweep always finishes
            run_sweep(&store).await;
        }

        info!("Expiration sweeper stopped");
    });

    SweeperHandle {
        shutdown: Some(shutdown_tx),
        task,
    }
}

async fn run_sweep(store: &PageStore) {
    match store.sweep().await {
        Ok(0) => debug!("Expiration sweep: no expired pages found"),
        Ok(removed) => info!("Expiration sweep: removed {} expired page(s)", removed),
        Err(err) => warn!(error = %err, "Expiration sweep failed, retrying next tick"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Retention;
    use chrono::{Duration as ChronoDuration, Utc};

    const TICK: Duration = Duration::from_millis(50);

    #[tokio::test]
    async fn test_sweeper_removes_expired_pages() {
        let store = PageStore::in_memory().await.unwrap();

        // Created two days ago with one-day retention: already expired
        let created_at = Utc::now() - ChronoDuration::days(2);
        store
            .create_at("<p>old</p>".to_string(), Retention::from_days(1), created_at)
            .await
            .unwrap();
        assert_eq!(store.count().await.unwrap(), 1);

        let sweeper = spawn_sweeper(store.clone(), TICK);
        tokio::time::sleep(TICK * 6).await;

        assert_eq!(store.count().await.unwrap(), 0);
        sweeper.shutdown().await;
    }

    #[tokio::test]
    async fn test_sweeper_preserves_live_pages() {
        let store = PageStore::in_memory().await.unwrap();

        let week = store
            .create("<p>week</p>".to_string(), Retention::from_days(7))
            .await
            .unwrap();
        let forever = store
            .create("<p>forever</p>".to_string(), Retention::Indefinite)
            .await
            .unwrap();

        let sweeper = spawn_sweeper(store.clone(), TICK);
        tokio::time::sleep(TICK * 4).await;

        assert!(store.fetch(&week.id).await.is_ok());
        assert!(store.fetch(&forever.id).await.is_ok());
        sweeper.shutdown().await;
    }

    #[tokio::test]
    async fn test_sweeper_survives_failed_sweep() {
        let store = PageStore::in_memory().await.unwrap();

        store
            .create_at(
                "<p>old</p>".to_string(),
                Retention::from_days(1),
                Utc::now() - ChronoDuration::days(2),
            )
            .await
            .unwrap();
        sqlx::query(
            "CREATE TRIGGER block_delete BEFORE DELETE ON pages \
             BEGIN SELECT RAISE(ABORT, 'deletes blocked'); END",
        )
        .execute(store.pool())
        .await
        .unwrap();

        let sweeper = spawn_sweeper(store.clone(), TICK);
        tokio::time::sleep(TICK * 4).await;

        // Every tick so far has failed, and the task keeps going
        assert_eq!(store.count().await.unwrap(), 1);
        assert!(!sweeper.is_finished());

        sqlx::query("DROP TRIGGER block_delete")
            .execute(store.pool())
            .await
            .unwrap();
        tokio::time::sleep(TICK * 6).await;

        assert_eq!(store.count().await.unwrap(), 0);
        sweeper.shutdown().await;
    }

    #[tokio::test]
    async fn test_sweeper_shutdown_stops_task() {
        let store = PageStore::in_memory().await.unwrap();

        let sweeper = spawn_sweeper(store, Duration::from_secs(3600));
        assert!(!sweeper.is_finished());

        // Returns promptly even with a long interval
        tokio::time::timeout(Duration::from_secs(1), sweeper.shutdown())
            .await
            .expect("shutdown should not wait for the next tick");
    }
}
