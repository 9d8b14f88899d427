/// file: src/refetch.rs
/// description: per-page snapshot refetch coordination between push events and REST
use crate::dispatch::EventDispatcher;
use crate::error::FleetwatchError;
use crate::events::EventKind;
use crate::types::Page;
use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use tracing::warn;

/// Push kinds that invalidate the alerts page's snapshot.
pub const ALERTS_PAGE_TRIGGERS: &[EventKind] = &[
    EventKind::AlertNew,
    EventKind::AlertAck,
    EventKind::AlertResolve,
];

/// Push kinds that invalidate the devices page's snapshot.
pub const DEVICES_PAGE_TRIGGERS: &[EventKind] = &[
    EventKind::DeviceIsolated,
    EventKind::DeviceReinstated,
    EventKind::RecoverySuccess,
    EventKind::RecoveryFailed,
];

/// Query filters carried by a list snapshot request.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Filters {
    pub search: Option<String>,
    pub status: Option<String>,
    pub severity: Option<String>,
}

/// The authoritative query parameters for one page's snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub filters: Filters,
    pub page: u32,
    pub limit: u32,
}

impl Default for FetchRequest {
    fn default() -> Self {
        Self {
            filters: Filters::default(),
            page: 1,
            limit: 20,
        }
    }
}

/// What a page renders: the loading flag and the last snapshot that landed.
#[derive(Debug, Clone)]
pub struct ListState<T> {
    pub loading: bool,
    pub items: Vec<T>,
    pub total: u64,
}

impl<T> Default for ListState<T> {
    fn default() -> Self {
        Self {
            loading: false,
            items: Vec::new(),
            total: 0,
        }
    }
}

/// One-shot authoritative snapshot source for a page's list contents.
#[async_trait]
pub trait SnapshotFetcher<T>: Send + Sync {
    async fn fetch(&self, request: &FetchRequest) -> Result<Page<T>, FleetwatchError>;
}

struct Inner<T> {
    fetcher: Arc<dyn SnapshotFetcher<T>>,
    triggers: Vec<EventKind>,
    request: Mutex<FetchRequest>,
    state: Mutex<ListState<T>>,
}

/// Decides when a page re-issues its authoritative snapshot fetch: on any
/// change to the [`FetchRequest`] and on arrival of any push event kind in
/// the page's trigger set.
///
/// In-flight fetches are not cancelled or correlated with the request that
/// issued them. Each response unconditionally overwrites the displayed state
/// when it resolves, so the later-resolving response wins even if its request
/// was already stale. Pinned by a test; see DESIGN.md before changing.
pub struct RefetchCoordinator<T> {
    inner: Arc<Inner<T>>,
}

impl<T> Clone for RefetchCoordinator<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T: Send + 'static> RefetchCoordinator<T> {
    pub fn new(fetcher: Arc<dyn SnapshotFetcher<T>>, triggers: Vec<EventKind>) -> Self {
        Self {
            inner: Arc::new(Inner {
                fetcher,
                triggers,
                request: Mutex::new(FetchRequest::default()),
                state: Mutex::new(ListState::default()),
            }),
        }
    }

    pub fn request(&self) -> FetchRequest {
        self.inner
            .request
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Replaces the query parameters. A changed filter, page, or page size
    /// issues a fresh fetch; an identical request does nothing.
    pub fn set_request(&self, request: FetchRequest) {
        {
            let mut current = self.inner.request.lock().unwrap_or_else(|e| e.into_inner());
            if *current == request {
                return;
            }
            *current = request;
        }
        self.spawn_fetch();
    }

    /// Issues a fetch for the current request unconditionally.
    pub fn refresh(&self) {
        self.spawn_fetch();
    }

    /// Push-event entry point; refetches when `kind` is in the trigger set.
    pub fn notify(&self, kind: EventKind) {
        if self.inner.triggers.contains(&kind) {
            self.spawn_fetch();
        }
    }

    /// Registers this coordinator as a dispatcher consumer of its triggers.
    pub fn attach(&self, dispatcher: &mut EventDispatcher) {
        let coordinator = self.clone();
        let triggers = self.inner.triggers.clone();
        dispatcher.subscribe(&triggers, move |event| coordinator.notify(event.kind()));
    }

    fn spawn_fetch(&self) {
        {
            let mut state = self.inner.state.lock().unwrap_or_else(|e| e.into_inner());
            state.loading = true;
        }
        let inner = self.inner.clone();
        let request = self.request();
        tokio::spawn(async move {
            let result = inner.fetcher.fetch(&request).await;
            let mut state = inner.state.lock().unwrap_or_else(|e| e.into_inner());
            match result {
                Ok(page) => {
                    state.items = page.items;
                    state.total = page.total;
                }
                Err(e) => {
                    warn!(error = %e, "snapshot fetch failed, presenting empty result");
                    crate::monitoring::SNAPSHOT_FAILURE_COUNTER.increment(1);
                    // total keeps its prior value
                    state.items.clear();
                }
            }
            state.loading = false;
        });
    }
}

impl<T: Clone + Send + 'static> RefetchCoordinator<T> {
    pub fn state(&self) -> ListState<T> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::oneshot;

    fn page(items: &[&str], total: u64) -> Page<String> {
        Page {
            total,
            page: 1,
            page_size: 20,
            items: items.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Resolves each fetch with the next scripted receiver, letting the test
    /// decide completion order.
    struct ScriptedFetcher {
        slots: Mutex<VecDeque<oneshot::Receiver<Result<Page<String>, FleetwatchError>>>>,
    }

    impl ScriptedFetcher {
        fn new(slots: Vec<oneshot::Receiver<Result<Page<String>, FleetwatchError>>>) -> Self {
            Self {
                slots: Mutex::new(slots.into()),
            }
        }
    }

    #[async_trait]
    impl SnapshotFetcher<String> for ScriptedFetcher {
        async fn fetch(&self, _request: &FetchRequest) -> Result<Page<String>, FleetwatchError> {
            let slot = self
                .slots
                .lock()
                .unwrap()
                .pop_front()
                .expect("unscripted fetch");
            slot.await.expect("test dropped the response sender")
        }
    }

    struct CountingFetcher {
        calls: AtomicUsize,
        total: u64,
    }

    #[async_trait]
    impl SnapshotFetcher<String> for CountingFetcher {
        async fn fetch(&self, request: &FetchRequest) -> Result<Page<String>, FleetwatchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(page(&[request.filters.status.as_deref().unwrap_or("all")], self.total))
        }
    }

    async fn settle() {
        for _ in 0..16 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test]
    async fn filter_change_issues_a_fetch_and_identical_request_does_not() {
        let fetcher = Arc::new(CountingFetcher {
            calls: AtomicUsize::new(0),
            total: 3,
        });
        let coordinator = RefetchCoordinator::new(fetcher.clone(), vec![]);

        let mut request = FetchRequest::default();
        request.filters.status = Some("active".into());
        coordinator.set_request(request.clone());
        settle().await;
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);

        // unchanged request: nothing in flight
        coordinator.set_request(request.clone());
        settle().await;
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);

        // pagination counts as a change
        request.page = 2;
        coordinator.set_request(request);
        settle().await;
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 2);
        assert!(!coordinator.state().loading);
    }

    #[tokio::test]
    async fn trigger_events_refetch_and_others_do_not() {
        let fetcher = Arc::new(CountingFetcher {
            calls: AtomicUsize::new(0),
            total: 1,
        });
        let coordinator = RefetchCoordinator::new(
            fetcher.clone(),
            vec![EventKind::AlertNew, EventKind::AlertAck, EventKind::AlertResolve],
        );

        coordinator.notify(EventKind::AlertNew);
        coordinator.notify(EventKind::MetricUpdate);
        coordinator.notify(EventKind::DeviceIsolated);
        settle().await;

        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn dispatcher_attachment_drives_refetches() {
        let fetcher = Arc::new(CountingFetcher {
            calls: AtomicUsize::new(0),
            total: 1,
        });
        let coordinator =
            RefetchCoordinator::new(fetcher.clone(), vec![EventKind::DeviceIsolated]);
        let mut dispatcher = EventDispatcher::new();
        coordinator.attach(&mut dispatcher);

        dispatcher.dispatch(r#"{"type":"device_isolated","device_id":"d1"}"#);
        dispatcher.dispatch(r#"{"type":"alert_new","alert_id":"a1"}"#);
        settle().await;

        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn fetch_failure_presents_empty_items_and_keeps_total() {
        let (ok_tx, ok_rx) = oneshot::channel();
        let (err_tx, err_rx) = oneshot::channel();
        let fetcher = Arc::new(ScriptedFetcher::new(vec![ok_rx, err_rx]));
        let coordinator = RefetchCoordinator::new(fetcher, vec![]);

        coordinator.refresh();
        ok_tx.send(Ok(page(&["a1", "a2"], 42))).unwrap();
        settle().await;
        let state = coordinator.state();
        assert_eq!(state.items, vec!["a1", "a2"]);
        assert_eq!(state.total, 42);

        coordinator.refresh();
        assert!(coordinator.state().loading);
        err_tx
            .send(Err(FleetwatchError::FrameChannelClosed("down".into())))
            .unwrap();
        settle().await;

        let state = coordinator.state();
        assert!(state.items.is_empty());
        assert_eq!(state.total, 42, "total keeps its prior value on failure");
        assert!(!state.loading, "loading always resolves false");
    }

    // A fetch for a stale request that resolves after a newer one overwrites
    // the newer result. Intentional parity with the dashboard this client
    // feeds; do not "fix" without updating DESIGN.md.
    #[tokio::test]
    async fn later_resolving_stale_fetch_wins() {
        let (a_tx, a_rx) = oneshot::channel();
        let (b_tx, b_rx) = oneshot::channel();
        let fetcher = Arc::new(ScriptedFetcher::new(vec![a_rx, b_rx]));
        let coordinator = RefetchCoordinator::new(fetcher, vec![]);

        // fetch A: status=active
        let mut request = FetchRequest::default();
        request.filters.status = Some("active".into());
        coordinator.set_request(request.clone());
        settle().await; // A is now in flight, parked on its scripted slot

        // filter changes before A resolves; fetch B: status=all
        request.filters.status = Some("all".into());
        coordinator.set_request(request);
        settle().await;

        // B resolves first, then stale A lands on top of it
        b_tx.send(Ok(page(&["b-item"], 2))).unwrap();
        settle().await;
        assert_eq!(coordinator.state().items, vec!["b-item"]);

        a_tx.send(Ok(page(&["a-item"], 1))).unwrap();
        settle().await;

        let state = coordinator.state();
        assert_eq!(state.items, vec!["a-item"], "stale response overwrote fresh state");
        assert_eq!(state.total, 1);
        assert!(!state.loading);
    }
}
