//! Polling coordinator.
//!
//! Owns the refresh lifecycle: fetches the pool and user endpoints on a
//! fixed interval, publishes normalized snapshots, and notifies listeners
//! after each successful cycle. A failed cycle after the first success
//! leaves the previous snapshots in place and notifies nobody.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::{Mutex, RwLock};
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::ckstats::{Snapshot, StatsApi, StatsError, normalize};

type Listener = Arc<dyn Fn() + Send + Sync>;

/// Result of a single refresh trigger.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RefreshOutcome {
    /// New snapshots were published and listeners notified.
    Updated,
    /// Another refresh was already in flight; this trigger did nothing.
    Skipped,
    /// The cycle failed; previously published snapshots are untouched.
    Failed,
}

impl RefreshOutcome {
    pub fn as_str(self) -> &'static str {
        match self {
            RefreshOutcome::Updated => "updated",
            RefreshOutcome::Skipped => "skipped",
            RefreshOutcome::Failed => "failed",
        }
    }
}

pub struct PoolCoordinator {
    api: Arc<dyn StatsApi>,
    poll_interval: Duration,
    user_address: Option<String>,

    /// Latest published snapshots. Replaced by reference on success,
    /// never mutated in place, so readers hold a consistent view.
    pool: RwLock<Option<Arc<Snapshot>>>,
    user: RwLock<Option<Arc<Snapshot>>>,

    /// Invoked synchronously, in registration order, once per successful
    /// cycle.
    listeners: Mutex<Vec<Listener>>,

    /// Held for the duration of a cycle; `try_lock` failure means a
    /// refresh is already in flight and the trigger is skipped.
    refresh_gate: tokio::sync::Mutex<()>,
}

impl PoolCoordinator {
    pub fn new(
        api: Arc<dyn StatsApi>,
        poll_interval: Duration,
        user_address: Option<String>,
    ) -> Self {
        Self {
            api,
            poll_interval,
            user_address,
            pool: RwLock::new(None),
            user: RwLock::new(None),
            listeners: Mutex::new(Vec::new()),
            refresh_gate: tokio::sync::Mutex::new(()),
        }
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Mandatory initial refresh.
    ///
    /// Setup must abort if this fails; no snapshot is published on the
    /// error path.
    pub async fn first_refresh(&self) -> Result<(), StatsError> {
        let _guard = self.refresh_gate.lock().await;
        let (pool, user) = self.fetch_cycle().await?;
        self.publish(pool, user);
        self.notify_listeners();
        Ok(())
    }

    /// Run one refresh cycle unless one is already in flight.
    pub async fn refresh(&self) -> RefreshOutcome {
        let Ok(_guard) = self.refresh_gate.try_lock() else {
            debug!("Refresh already in flight; skipping trigger");
            return RefreshOutcome::Skipped;
        };

        match self.fetch_cycle().await {
            Ok((pool, user)) => {
                self.publish(pool, user);
                self.notify_listeners();
                debug!("Pool snapshot refreshed");
                RefreshOutcome::Updated
            }
            Err(err) => {
                // Degraded: last-known snapshots stay visible.
                warn!("Pool refresh failed; keeping previous snapshot: {err}");
                RefreshOutcome::Failed
            }
        }
    }

    /// Poll loop. The interval skips missed ticks, so a slow cycle never
    /// causes a burst of catch-up refreshes.
    ///
    /// Cancellation also races the cycle itself: dropping the refresh
    /// future mid-fetch publishes nothing, since snapshots only land after
    /// both endpoints have answered.
    pub async fn run(self: Arc<Self>, cancel: CancellationToken) {
        let mut interval = tokio::time::interval(self.poll_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        // The first tick completes immediately; setup already refreshed.
        interval.tick().await;

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    info!("Poll loop shutdown requested");
                    break;
                }
                _ = interval.tick() => {
                    tokio::select! {
                        _ = cancel.cancelled() => {
                            info!("Poll loop shutdown requested; dropping in-flight refresh");
                            break;
                        }
                        _ = self.refresh() => {}
                    }
                }
            }
        }
    }

    pub fn pool_snapshot(&self) -> Option<Arc<Snapshot>> {
        self.pool.read().clone()
    }

    pub fn user_snapshot(&self) -> Option<Arc<Snapshot>> {
        self.user.read().clone()
    }

    pub fn add_listener(&self, listener: impl Fn() + Send + Sync + 'static) {
        self.listeners.lock().push(Arc::new(listener));
    }

    async fn fetch_cycle(&self) -> Result<(Snapshot, Option<Snapshot>), StatsError> {
        let (pool_raw, users_raw) = tokio::try_join!(self.api.pool_current(), self.api.users())?;
        Ok(normalize(&pool_raw, &users_raw, self.user_address.as_deref()))
    }

    fn publish(&self, pool: Snapshot, user: Option<Snapshot>) {
        *self.pool.write() = Some(Arc::new(pool));
        *self.user.write() = user.map(Arc::new);
    }

    fn notify_listeners(&self) {
        // Invoke on a snapshot of the list so a listener may re-enter the
        // coordinator (e.g. register another listener) without deadlocking.
        let listeners: Vec<Listener> = self.listeners.lock().clone();
        for listener in &listeners {
            listener();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use reqwest::StatusCode;
    use serde_json::{Value, json};
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::ckstats::POOL_CURRENT_ENDPOINT;

    /// Scripted stats API: pops one pool response per cycle, optionally
    /// sleeping first to keep a cycle in flight.
    struct ScriptedApi {
        pool_responses: Mutex<VecDeque<Result<Value, ()>>>,
        users_response: Value,
        delay: Option<Duration>,
    }

    impl ScriptedApi {
        fn new(pool_responses: Vec<Result<Value, ()>>) -> Self {
            Self {
                pool_responses: Mutex::new(pool_responses.into()),
                users_response: json!([]),
                delay: None,
            }
        }

        fn with_users(mut self, users: Value) -> Self {
            self.users_response = users;
            self
        }

        fn with_delay(mut self, delay: Duration) -> Self {
            self.delay = Some(delay);
            self
        }

        fn server_error() -> StatsError {
            StatsError::BadStatus {
                path: POOL_CURRENT_ENDPOINT,
                status: StatusCode::INTERNAL_SERVER_ERROR,
            }
        }
    }

    #[async_trait]
    impl StatsApi for ScriptedApi {
        async fn pool_current(&self) -> Result<Value, StatsError> {
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            let next = self.pool_responses.lock().pop_front();
            match next {
                Some(Ok(value)) => Ok(value),
                _ => Err(Self::server_error()),
            }
        }

        async fn users(&self) -> Result<Value, StatsError> {
            Ok(self.users_response.clone())
        }

        async fn health(&self) -> Result<(), StatsError> {
            Ok(())
        }
    }

    fn coordinator(api: ScriptedApi) -> PoolCoordinator {
        PoolCoordinator::new(Arc::new(api), Duration::from_secs(300), None)
    }

    #[tokio::test]
    async fn first_refresh_publishes_both_snapshots() {
        let api = ScriptedApi::new(vec![Ok(json!({"users": 2, "hashrate1m": 1000}))])
            .with_users(json!([{"userAddress": "addr1"}]));
        let coordinator = coordinator(api);

        coordinator.first_refresh().await.unwrap();

        let pool = coordinator.pool_snapshot().unwrap();
        assert_eq!(pool.or_zero("users"), json!(2));
        let user = coordinator.user_snapshot().unwrap();
        assert_eq!(user.or_unknown("userAddress"), json!("addr1"));
    }

    #[tokio::test]
    async fn failed_first_refresh_publishes_nothing() {
        let coordinator = coordinator(ScriptedApi::new(vec![Err(())]));

        assert!(coordinator.first_refresh().await.is_err());
        assert!(coordinator.pool_snapshot().is_none());
        assert!(coordinator.user_snapshot().is_none());
    }

    #[tokio::test]
    async fn listeners_fire_once_per_successful_cycle() {
        let api = ScriptedApi::new(vec![Ok(json!({"users": 1})), Ok(json!({"users": 2}))]);
        let coordinator = coordinator(api);
        let calls = Arc::new(AtomicUsize::new(0));
        let counted = calls.clone();
        coordinator.add_listener(move || {
            counted.fetch_add(1, Ordering::SeqCst);
        });

        coordinator.first_refresh().await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        assert_eq!(coordinator.refresh().await, RefreshOutcome::Updated);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn listeners_fire_in_registration_order() {
        let api = ScriptedApi::new(vec![Ok(json!({}))]);
        let coordinator = coordinator(api);
        let order = Arc::new(Mutex::new(Vec::new()));
        for tag in ["first", "second", "third"] {
            let order = order.clone();
            coordinator.add_listener(move || order.lock().push(tag));
        }

        coordinator.first_refresh().await.unwrap();
        assert_eq!(*order.lock(), vec!["first", "second", "third"]);
    }

    #[tokio::test]
    async fn failed_cycle_keeps_snapshot_and_skips_listeners() {
        let api = ScriptedApi::new(vec![Ok(json!({"users": 5})), Err(())])
            .with_users(json!([{"userAddress": "addr1"}]));
        let coordinator = coordinator(api);
        let calls = Arc::new(AtomicUsize::new(0));
        let counted = calls.clone();

        coordinator.first_refresh().await.unwrap();
        let before = coordinator.pool_snapshot().unwrap();
        coordinator.add_listener(move || {
            counted.fetch_add(1, Ordering::SeqCst);
        });

        assert_eq!(coordinator.refresh().await, RefreshOutcome::Failed);

        let after = coordinator.pool_snapshot().unwrap();
        assert_eq!(*before, *after);
        assert!(coordinator.user_snapshot().is_some());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn successful_cycle_replaces_user_snapshot() {
        // Users disconnect between cycles: the user snapshot becomes absent.
        let api = ScriptedApi::new(vec![Ok(json!({})), Ok(json!({}))]);
        let coordinator = PoolCoordinator::new(
            Arc::new(api.with_users(json!([]))),
            Duration::from_secs(300),
            None,
        );

        coordinator.first_refresh().await.unwrap();
        assert!(coordinator.user_snapshot().is_none());
        assert_eq!(coordinator.refresh().await, RefreshOutcome::Updated);
        assert!(coordinator.user_snapshot().is_none());
    }

    #[tokio::test]
    async fn listener_may_register_another_listener() {
        let api = ScriptedApi::new(vec![Ok(json!({})), Ok(json!({}))]);
        let coordinator = Arc::new(coordinator(api));
        let calls = Arc::new(AtomicUsize::new(0));
        let counted = calls.clone();
        let reentrant = coordinator.clone();
        coordinator.add_listener(move || {
            let counted = counted.clone();
            reentrant.add_listener(move || {
                counted.fetch_add(1, Ordering::SeqCst);
            });
        });

        // First cycle registers the inner listener, second cycle fires it.
        coordinator.first_refresh().await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(coordinator.refresh().await, RefreshOutcome::Updated);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_drops_inflight_fetch() {
        let api =
            ScriptedApi::new(vec![Ok(json!({}))]).with_delay(Duration::from_secs(8));
        let coordinator = Arc::new(coordinator(api));
        let cancel = CancellationToken::new();
        let task = tokio::spawn(coordinator.clone().run(cancel.clone()));

        // Let the poll timer fire so a fetch is in flight, then cancel
        // mid-fetch.
        tokio::time::sleep(Duration::from_secs(301)).await;
        cancel.cancel();

        let cancelled_at = tokio::time::Instant::now();
        task.await.unwrap();

        // The loop must exit without waiting out the fetch, and the
        // abandoned cycle must publish nothing.
        assert!(cancelled_at.elapsed() < Duration::from_secs(7));
        assert!(coordinator.pool_snapshot().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn overlapping_triggers_are_skipped() {
        let api = ScriptedApi::new(vec![Ok(json!({})), Ok(json!({})), Ok(json!({}))])
            .with_delay(Duration::from_millis(50));
        let coordinator = coordinator(api);

        let (first, second, third) = tokio::join!(
            coordinator.refresh(),
            coordinator.refresh(),
            coordinator.refresh()
        );

        assert_eq!(first, RefreshOutcome::Updated);
        assert_eq!(second, RefreshOutcome::Skipped);
        assert_eq!(third, RefreshOutcome::Skipped);
    }
}
