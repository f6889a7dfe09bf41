//! The asynchronous lookup a search handler dedupes and caches

use crate::error::LookupError;
use crate::signal::AbortSignal;
use async_trait::async_trait;
use std::future::Future;
use std::marker::PhantomData;

/// Source of search results
#[async_trait]
pub trait Lookup: Send + Sync + 'static {
    type Item: Send + Sync + 'static;

    /// Fetch results for `query`
    ///
    /// Should fail with [`LookupError::Aborted`] once `signal` fires.
    async fn lookup(&self, query: &str, signal: AbortSignal) -> Result<Vec<Self::Item>, LookupError>;
}

/// [`Lookup`] backed by an async closure
pub struct FnLookup<F, T> {
    func: F,
    _item: PhantomData<fn() -> T>,
}

/// Adapt `func(query, signal)` into a [`Lookup`]
pub fn lookup_fn<T, F, Fut>(func: F) -> FnLookup<F, T>
where
    F: Fn(String, AbortSignal) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Vec<T>, LookupError>> + Send + 'static,
    T: Send + Sync + 'static,
{
    FnLookup {
        func,
        _item: PhantomData,
    }
}

#[async_trait]
impl<T, F, Fut> Lookup for FnLookup<F, T>
where
    F: Fn(String, AbortSignal) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Vec<T>, LookupError>> + Send + 'static,
    T: Send + Sync + 'static,
{
    type Item = T;

    async fn lookup(&self, query: &str, signal: AbortSignal) -> Result<Vec<T>, LookupError> {
        (self.func)(query.to_owned(), signal).await
    }
}
