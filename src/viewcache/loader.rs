//! View Data Loader
//!
//! Wraps an async loader closure with per-consumer memoization: repeated
//! loads return the stored value, concurrent loads share one in-flight
//! future, and a forced refresh always starts a brand-new load. Wired to
//! the [`InvalidationBus`] through an optional cache key; deregistration
//! happens on drop.

use std::future::Future;
use std::sync::{Arc, Mutex, Weak};

use futures::future::{BoxFuture, Shared};
use futures::FutureExt;
use thiserror::Error;
use tracing::debug;

use super::InvalidationBus;

/// Cloneable load failure, shared by every caller joined on one load.
#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct LoadError(Arc<anyhow::Error>);

impl LoadError {
    /// The underlying loader error.
    pub fn inner(&self) -> &anyhow::Error {
        &self.0
    }
}

type SharedLoad<T> = Shared<BoxFuture<'static, Result<T, LoadError>>>;
type Loader<T> = Arc<dyn Fn() -> BoxFuture<'static, anyhow::Result<T>> + Send + Sync>;

/// Memoization state for one consumer.
struct State<T> {
    data: Option<T>,
    loaded: bool,
    inflight: Option<SharedLoad<T>>,
    /// Bumped whenever a new load starts, so a superseded load's
    /// completion cannot clobber newer state.
    generation: u64,
}

impl<T> Default for State<T> {
    fn default() -> Self {
        Self {
            data: None,
            loaded: false,
            inflight: None,
            generation: 0,
        }
    }
}

// == View Data ==
/// Memoized async data holder for a single view.
///
/// ```ignore
/// let pets = ViewData::with_cache_key("pets", bus.clone(), move || {
///     let api = api.clone();
///     async move { api.list_pets().await }
/// });
///
/// let data = pets.load().await?;      // fetches once
/// let again = pets.load().await?;     // memoized, no fetch
/// let fresh = pets.refresh().await?;  // always fetches
/// ```
pub struct ViewData<T> {
    loader: Loader<T>,
    state: Arc<Mutex<State<T>>>,
    registration: Option<(Arc<InvalidationBus>, String)>,
}

impl<T: Clone + Send + 'static> ViewData<T> {
    // == Constructors ==
    /// Wraps a loader with memoization, without bus wiring.
    pub fn new<F, Fut>(loader: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<T>> + Send + 'static,
    {
        Self {
            loader: Arc::new(move || loader().boxed()),
            state: Arc::new(Mutex::new(State::default())),
            registration: None,
        }
    }

    /// Wraps a loader and registers a reset callback under `key` on the
    /// bus. The callback clears the stored data and the loaded flag; it
    /// never refetches by itself — the next `load()` does.
    pub fn with_cache_key<F, Fut>(
        key: impl Into<String>,
        bus: Arc<InvalidationBus>,
        loader: F,
    ) -> Self
    where
        T: Sync,
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<T>> + Send + 'static,
    {
        let mut this = Self::new(loader);
        let key = key.into();

        let state: Weak<Mutex<State<T>>> = Arc::downgrade(&this.state);
        bus.register(key.clone(), move || {
            if let Some(state) = state.upgrade() {
                let mut state = state.lock().unwrap();
                state.data = None;
                state.loaded = false;
            }
        });

        this.registration = Some((bus, key));
        this
    }

    // == Load ==
    /// Returns the data, loading it at most once.
    ///
    /// Already-loaded data is returned without invoking the loader; a
    /// concurrent non-forced load joins the in-flight future instead of
    /// starting a second one.
    pub async fn load(&self) -> Result<T, LoadError> {
        self.load_inner(false).await
    }

    // == Refresh ==
    /// Always refetches, regardless of cached state.
    ///
    /// Forced loads skip the in-flight guard on purpose: the asymmetry
    /// between forced and non-forced calls is part of the contract.
    pub async fn refresh(&self) -> Result<T, LoadError> {
        self.load_inner(true).await
    }

    async fn load_inner(&self, force: bool) -> Result<T, LoadError> {
        // What to do once the lock is released. Deciding this under a single
        // lock keeps the in-flight dedup atomic; awaiting happens afterwards so
        // no `MutexGuard` is ever held across an `.await` (keeps the future
        // `Send`).
        enum Step<T> {
            Join(SharedLoad<T>),
            Start(SharedLoad<T>, u64),
        }

        let step = {
            let mut state = self.state.lock().unwrap();

            let mut join = None;
            if !force {
                if state.loaded {
                    if let Some(data) = state.data.clone() {
                        return Ok(data);
                    }
                }
                join = state.inflight.clone();
            }

            if let Some(inflight) = join {
                Step::Join(inflight)
            } else {
                state.generation = state.generation.wrapping_add(1);
                let shared = (self.loader)()
                    .map(|result| result.map_err(|err| LoadError(Arc::new(err))))
                    .boxed()
                    .shared();
                state.inflight = Some(shared.clone());
                Step::Start(shared, state.generation)
            }
        };

        match step {
            Step::Join(inflight) => inflight.await,
            Step::Start(shared, generation) => {
                let result = shared.await;

                let mut state = self.state.lock().unwrap();
                if state.generation == generation {
                    state.inflight = None;
                    match &result {
                        Ok(data) => {
                            state.data = Some(data.clone());
                            state.loaded = true;
                        }
                        // loaded stays false so the next call retries
                        Err(err) => debug!(%err, "view data load failed"),
                    }
                }
                result
            }
        }
    }

    // == Accessors ==
    /// The stored value, if any.
    pub fn data(&self) -> Option<T> {
        self.state.lock().unwrap().data.clone()
    }

    /// Whether a load has completed successfully.
    pub fn is_loaded(&self) -> bool {
        self.state.lock().unwrap().loaded
    }

    /// Whether a load is currently in flight.
    pub fn is_loading(&self) -> bool {
        self.state.lock().unwrap().inflight.is_some()
    }
}

impl<T> Drop for ViewData<T> {
    fn drop(&mut self) {
        if let Some((bus, key)) = self.registration.take() {
            bus.unregister(&key);
        }
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use anyhow::anyhow;

    fn counting_loader(
        calls: Arc<AtomicUsize>,
        delay: Duration,
    ) -> impl Fn() -> BoxFuture<'static, anyhow::Result<usize>> + Send + Sync + 'static {
        move || {
            let calls = Arc::clone(&calls);
            async move {
                tokio::time::sleep(delay).await;
                Ok(calls.fetch_add(1, Ordering::SeqCst) + 1)
            }
            .boxed()
        }
    }

    #[tokio::test]
    async fn test_load_memoizes() {
        let calls = Arc::new(AtomicUsize::new(0));
        let view = ViewData::new(counting_loader(Arc::clone(&calls), Duration::ZERO));

        assert_eq!(view.load().await.unwrap(), 1);
        assert_eq!(view.load().await.unwrap(), 1);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(view.is_loaded());
        assert_eq!(view.data(), Some(1));
    }

    #[tokio::test]
    async fn test_refresh_always_fetches() {
        let calls = Arc::new(AtomicUsize::new(0));
        let view = ViewData::new(counting_loader(Arc::clone(&calls), Duration::ZERO));

        assert_eq!(view.load().await.unwrap(), 1);
        assert_eq!(view.refresh().await.unwrap(), 2);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_concurrent_loads_share_one_fetch() {
        let calls = Arc::new(AtomicUsize::new(0));
        let view = Arc::new(ViewData::new(counting_loader(
            Arc::clone(&calls),
            Duration::from_millis(30),
        )));

        let a = {
            let view = Arc::clone(&view);
            tokio::spawn(async move { view.load().await.unwrap() })
        };
        let b = {
            let view = Arc::clone(&view);
            tokio::spawn(async move { view.load().await.unwrap() })
        };

        let (a, b) = (a.await.unwrap(), b.await.unwrap());
        assert_eq!(a, b);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_forced_load_bypasses_inflight_guard() {
        let calls = Arc::new(AtomicUsize::new(0));
        let view = Arc::new(ViewData::new(counting_loader(
            Arc::clone(&calls),
            Duration::from_millis(30),
        )));

        let slow = {
            let view = Arc::clone(&view);
            tokio::spawn(async move { view.load().await.unwrap() })
        };
        tokio::time::sleep(Duration::from_millis(5)).await;
        view.refresh().await.unwrap();

        slow.await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_failure_is_not_cached() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let view = ViewData::new(move || {
            let n = counter.fetch_add(1, Ordering::SeqCst);
            async move {
                if n == 0 {
                    Err(anyhow!("backend indisponível"))
                } else {
                    Ok(n)
                }
            }
        });

        let err = view.load().await.unwrap_err();
        assert!(err.to_string().contains("backend indisponível"));
        assert!(!view.is_loaded());
        assert_eq!(view.data(), None);

        // The next call retries instead of serving a cached error
        assert_eq!(view.load().await.unwrap(), 1);
        assert!(view.is_loaded());
    }

    #[tokio::test]
    async fn test_invalidation_round_trip() {
        let bus = Arc::new(InvalidationBus::new());
        let calls = Arc::new(AtomicUsize::new(0));
        let view = ViewData::with_cache_key(
            "pets",
            Arc::clone(&bus),
            counting_loader(Arc::clone(&calls), Duration::ZERO),
        );

        view.load().await.unwrap();
        assert!(view.is_loaded());

        bus.invalidate(["pets"]);
        assert!(!view.is_loaded());
        assert_eq!(view.data(), None);

        // Invalidation does not refetch by itself; the next load does
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        view.load().await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_drop_unregisters_from_bus() {
        let bus = Arc::new(InvalidationBus::new());
        let view = ViewData::with_cache_key("trips", Arc::clone(&bus), || async { Ok(1u8) });
        assert!(bus.is_registered("trips"));

        drop(view);
        assert!(!bus.is_registered("trips"));

        // Invalidating after drop is a silent no-op
        bus.invalidate(["trips"]);
    }

    #[tokio::test]
    async fn test_is_loading_during_flight() {
        let view = Arc::new(ViewData::new(|| async {
            tokio::time::sleep(Duration::from_millis(40)).await;
            Ok(7u8)
        }));

        let task = {
            let view = Arc::clone(&view);
            tokio::spawn(async move { view.load().await.unwrap() })
        };
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(view.is_loading());

        assert_eq!(task.await.unwrap(), 7);
        assert!(!view.is_loading());
        assert!(view.is_loaded());
    }
}
