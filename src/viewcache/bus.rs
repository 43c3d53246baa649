//! Invalidation Bus
//!
//! A registry mapping string cache keys to reset callbacks. Publishers
//! (mutation handlers) invalidate keys without holding any reference to
//! the consumers that cached the data.

use std::collections::HashMap;
use std::sync::Mutex;

use tracing::debug;

type InvalidationCallback = Box<dyn Fn() + Send + Sync>;

// == Invalidation Bus ==
/// Key -> callback registry with overwrite-on-register semantics.
///
/// The bus is an explicit object shared by `Arc`, not ambient global
/// state: anything that wants to publish or subscribe gets a handle
/// threaded through construction. At most one callback is live per key; a
/// later registration silently replaces an earlier one.
#[derive(Default)]
pub struct InvalidationBus {
    callbacks: Mutex<HashMap<String, InvalidationCallback>>,
}

impl InvalidationBus {
    /// Creates an empty bus.
    pub fn new() -> Self {
        Self::default()
    }

    // == Register ==
    /// Stores (or replaces) the callback for a key.
    pub fn register(&self, key: impl Into<String>, callback: impl Fn() + Send + Sync + 'static) {
        self.callbacks
            .lock()
            .unwrap()
            .insert(key.into(), Box::new(callback));
    }

    // == Unregister ==
    /// Removes the callback for a key; no-op when absent.
    pub fn unregister(&self, key: &str) {
        self.callbacks.lock().unwrap().remove(key);
    }

    /// Whether a callback is currently registered for a key.
    pub fn is_registered(&self, key: &str) -> bool {
        self.callbacks.lock().unwrap().contains_key(key)
    }

    // == Invalidate ==
    /// Synchronously invokes the callback of every listed key, skipping
    /// keys with no registration.
    ///
    /// Callbacks are infallible `Fn()` closures, so there is no failure to
    /// isolate; a panicking callback unwinds like any other bug. Callbacks
    /// run while the registry lock is held and must not call back into the
    /// bus.
    pub fn invalidate<I, S>(&self, keys: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let callbacks = self.callbacks.lock().unwrap();
        for key in keys {
            let key = key.as_ref();
            match callbacks.get(key) {
                Some(callback) => {
                    debug!(key, "invalidating cached view data");
                    callback();
                }
                None => debug!(key, "no cache registered for key, skipping"),
            }
        }
    }
}
