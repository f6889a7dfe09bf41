//! Debounced search with result caching and in-flight supersession
//!
//! Each debounced firing walks one query through:
//!
//! ```text
//! Idle -> Debouncing -> ShortCircuited          (shorter than min_length)
//!                    -> CacheHit
//!                    -> InFlight -> Resolved
//!                                -> Failed
//!                                -> Superseded  (same query issued again)
//! ```
//!
//! Results are delivered through a callback instead of a returned future:
//! a superseded request must deliver nothing at all.
//!
//! Every search is tagged with the handler epoch current when it was queued.
//! `destroy` bumps the epoch under the delivery lock, and both the debounced
//! firing and lookup completion re-check it under that lock before touching
//! the cache or running a callback.

use crate::cache::FifoCache;
use crate::error::LookupError;
use crate::lookup::Lookup;
use crate::signal::AbortSignal;
use crate::Result;
use ahash::AHashMap;
use pacer_core::config::{validate_search_bounds, SearchConfig};
use pacer_core::{DebounceOptions, Debouncer, Error};
use parking_lot::{Mutex, ReentrantMutex};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tracing::{debug, trace};

/// Search handler settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchOptions {
    /// Debounce applied to `search` calls (default: 300ms)
    pub debounce: Duration,
    /// Shorter queries (in chars) resolve to no results without a lookup
    pub min_length: usize,
    /// Longer queries are truncated to this many chars
    pub max_length: usize,
    pub cache: bool,
    pub cache_size: usize,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self::from(&SearchConfig::default())
    }
}

impl From<&SearchConfig> for SearchOptions {
    fn from(config: &SearchConfig) -> Self {
        Self {
            debounce: config.debounce(),
            min_length: config.min_length,
            max_length: config.max_length,
            cache: config.cache,
            cache_size: config.cache_size,
        }
    }
}

/// What a search callback receives
pub struct SearchOutcome<T> {
    pub results: Arc<[T]>,
    /// The query as looked up (after truncation)
    pub query: String,
    pub from_cache: bool,
    pub error: Option<LookupError>,
}

impl<T> SearchOutcome<T> {
    fn empty(query: String, error: Option<LookupError>) -> Self {
        Self {
            results: Arc::from(Vec::new()),
            query,
            from_cache: false,
            error,
        }
    }
}

impl<T> Clone for SearchOutcome<T> {
    fn clone(&self) -> Self {
        Self {
            results: Arc::clone(&self.results),
            query: self.query.clone(),
            from_cache: self.from_cache,
            error: self.error.clone(),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for SearchOutcome<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SearchOutcome")
            .field("results", &self.results)
            .field("query", &self.query)
            .field("from_cache", &self.from_cache)
            .field("error", &self.error)
            .finish()
    }
}

type Callback<T> = Box<dyn FnOnce(SearchOutcome<T>) + Send>;
type Results<T> = Arc<[T]>;

/// A search waiting out the debounce
struct Queued<T> {
    query: String,
    epoch: u64,
    callback: Callback<T>,
}

/// Registry entry for the outstanding lookup of one query
struct InFlight {
    id: u64,
    signal: AbortSignal,
}

struct Inner<L: Lookup> {
    lookup: L,
    options: SearchOptions,
    runtime: Handle,
    cache: Mutex<Option<FifoCache<Results<L::Item>>>>,
    in_flight: Mutex<AHashMap<String, InFlight>>,
    next_id: AtomicU64,
    /// Bumped by `destroy`; work queued under an older epoch is dropped
    epoch: AtomicU64,
    /// Serializes deliveries against `destroy`
    delivery: ReentrantMutex<()>,
}

/// Debounced, deduplicating, caching front for a [`Lookup`]
pub struct SearchHandler<L: Lookup> {
    inner: Arc<Inner<L>>,
    debounced: Debouncer<Queued<L::Item>, ()>,
}

impl<L: Lookup> SearchHandler<L> {
    /// Build a handler; must run inside a tokio runtime
    pub fn new(lookup: L, options: SearchOptions) -> Result<Self> {
        validate_search_bounds(options.min_length, options.max_length, options.cache, options.cache_size)?;
        let runtime = Handle::try_current().map_err(|_| Error::NoRuntime)?;

        let cache = options.cache.then(|| FifoCache::new(options.cache_size));
        let inner = Arc::new(Inner {
            lookup,
            options: options.clone(),
            runtime,
            cache: Mutex::new(cache),
            in_flight: Mutex::new(AHashMap::new()),
            next_id: AtomicU64::new(0),
            epoch: AtomicU64::new(0),
            delivery: ReentrantMutex::new(()),
        });

        let fire_inner = Arc::clone(&inner);
        let debounced = Debouncer::new(
            move |queued: Queued<L::Item>| Inner::fire(&fire_inner, queued),
            options.debounce,
            DebounceOptions::default(),
        )?;

        Ok(Self { inner, debounced })
    }

    pub fn with_config(lookup: L, config: &SearchConfig) -> Result<Self> {
        Self::new(lookup, SearchOptions::from(config))
    }

    /// Queue a search; `callback` runs at most once with its outcome
    ///
    /// Calls within the debounce window replace each other, so only the
    /// latest query and callback of a burst are used.
    pub fn search<C>(&self, query: impl Into<String>, callback: C)
    where
        C: FnOnce(SearchOutcome<L::Item>) + Send + 'static,
    {
        self.debounced.call(Queued {
            query: query.into(),
            epoch: self.inner.epoch.load(Ordering::Acquire),
            callback: Box::new(callback),
        });
    }

    pub fn clear_cache(&self) {
        if let Some(cache) = self.inner.cache.lock().as_mut() {
            cache.clear();
        }
    }

    /// Number of cached queries (0 when caching is disabled)
    pub fn cache_size(&self) -> usize {
        self.inner.cache.lock().as_ref().map_or(0, FifoCache::len)
    }

    /// Number of lookups currently outstanding
    pub fn in_flight(&self) -> usize {
        self.inner.in_flight.lock().len()
    }

    /// Drop the queued search, abort every outstanding lookup and empty the
    /// cache; no callback from before this call will run
    ///
    /// A delivery already running on another thread finishes before this
    /// returns. The handler stays usable for new searches.
    pub fn destroy(&self) {
        let _delivery = self.inner.delivery.lock();
        self.inner.epoch.fetch_add(1, Ordering::AcqRel);
        self.debounced.cancel();

        let aborted: Vec<InFlight> = self.inner.in_flight.lock().drain().map(|(_, entry)| entry).collect();
        if !aborted.is_empty() {
            debug!(count = aborted.len(), "aborting in-flight lookups");
        }
        for entry in aborted {
            entry.signal.abort();
        }

        self.clear_cache();
    }

    pub fn options(&self) -> &SearchOptions {
        &self.inner.options
    }
}

impl<L: Lookup> Inner<L> {
    /// Debounced firing for one query
    fn fire(inner: &Arc<Self>, queued: Queued<L::Item>) {
        let Queued { query, epoch, callback } = queued;
        let options = &inner.options;

        let _delivery = inner.delivery.lock();
        if !inner.is_current(epoch) {
            trace!(%query, "dropping search queued before destroy");
            return;
        }

        if query.chars().count() < options.min_length {
            trace!(%query, "query below minimum length");
            callback(SearchOutcome::empty(query, None));
            return;
        }
        let query = truncate_chars(query, options.max_length);

        let cached = inner
            .cache
            .lock()
            .as_ref()
            .and_then(|cache| cache.get(&query).cloned());
        if let Some(results) = cached {
            debug!(%query, "search cache hit");
            callback(SearchOutcome {
                results,
                query,
                from_cache: true,
                error: None,
            });
            return;
        }

        let id = inner.next_id.fetch_add(1, Ordering::Relaxed);
        let signal = AbortSignal::new();
        let previous = inner.in_flight.lock().insert(
            query.clone(),
            InFlight {
                id,
                signal: signal.clone(),
            },
        );
        if let Some(previous) = previous {
            debug!(%query, "superseding in-flight lookup");
            previous.signal.abort();
        }

        let task_inner = Arc::clone(inner);
        inner.runtime.spawn(async move {
            task_inner.resolve(id, epoch, query, signal, callback).await;
        });
    }

    async fn resolve(&self, id: u64, epoch: u64, query: String, signal: AbortSignal, callback: Callback<L::Item>) {
        let outcome = self.lookup.lookup(&query, signal.clone()).await;

        let _delivery = self.delivery.lock();
        if !self.finish(id, &query, &signal) || !self.is_current(epoch) {
            debug!(%query, "discarding superseded or destroyed lookup");
            return;
        }

        match outcome {
            Ok(results) => {
                let results: Results<L::Item> = Arc::from(results);
                if let Some(cache) = self.cache.lock().as_mut() {
                    if let Some(evicted) = cache.insert(query.clone(), Arc::clone(&results)) {
                        trace!(%evicted, "search cache eviction");
                    }
                }
                callback(SearchOutcome {
                    results,
                    query,
                    from_cache: false,
                    error: None,
                });
            }
            // Aborted without our signal firing: nothing to report
            Err(e) if e.is_aborted() => {}
            Err(e) => callback(SearchOutcome::empty(query, Some(e))),
        }
    }

    fn is_current(&self, epoch: u64) -> bool {
        self.epoch.load(Ordering::Acquire) == epoch
    }

    /// Remove this request's registry entry; `false` if it was aborted
    ///
    /// A superseding request's entry is left in place.
    fn finish(&self, id: u64, query: &str, signal: &AbortSignal) -> bool {
        let mut in_flight = self.in_flight.lock();
        if in_flight.get(query).is_some_and(|entry| entry.id == id) {
            in_flight.remove(query);
        }
        !signal.is_aborted()
    }
}

impl<L: Lookup> fmt::Debug for SearchHandler<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SearchHandler")
            .field("options", &self.inner.options)
            .field("cache_size", &self.cache_size())
            .field("in_flight", &self.in_flight())
            .finish()
    }
}

fn truncate_chars(mut query: String, max_chars: usize) -> String {
    if let Some((byte_idx, _)) = query.char_indices().nth(max_chars) {
        query.truncate(byte_idx);
    }
    query
}
