//! Boundary capabilities the engine consumes.
//!
//! The engine stays storage- and domain-agnostic. Callers inject:
//! - A [`Sampler`] that produces the candidate pool (e.g., from Postgres,
//!   a cache, a network service)
//! - Any number of [`Rule`]s, each computing one soft judgement per item
//! - An optional [`ReviewHook`] that observes the final ranked list
//!   (e.g., persistence, progress reporting)
//!
//! Each trait has a closure adapter ([`sampler_fn`], [`rule_fn`],
//! [`review_fn`]) for the common case where the boundary is a small
//! infallible async closure. Fallible or stateful boundaries implement the
//! trait directly.

use std::future::Future;

use crate::score::Scored;

/// Error type surfaced by boundary implementations.
///
/// Boundary failures pass through the engine unmodified; they come back to
/// the `select` caller as the `source()` of the corresponding
/// [`SelectError`](crate::SelectError) variant.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[async_trait::async_trait]
pub trait Sampler<R, T>: Send + Sync {
    /// Produce the candidate pool for one selection call.
    ///
    /// The pool is materialized before scoring begins; order is
    /// significant (it is the tie-break order for equal scores).
    async fn sample(&self, request: &R) -> Result<Vec<T>, BoxError>;
}

#[async_trait::async_trait]
pub trait Rule<R, T>: Send + Sync {
    /// Raw judgement for `(request, item)`.
    ///
    /// The engine clamps the result into `[0.0, 1.0]` before use;
    /// out-of-range values are not an error.
    async fn judge(&self, request: &R, item: &T) -> Result<f64, BoxError>;

    /// Label used in error reporting and logs.
    fn name(&self) -> &str {
        "rule"
    }
}

#[async_trait::async_trait]
pub trait ReviewHook<R, T>: Send + Sync {
    /// Called once per selection with the fully ranked list, best first.
    ///
    /// The return value is ignored on success; an error propagates to the
    /// `select` caller unmodified.
    async fn review(&self, request: &R, ranked: &[Scored<T>]) -> Result<(), BoxError>;
}

// =============================================================================
// Closure adapters
// =============================================================================

/// A [`Sampler`] backed by an async closure. Built with [`sampler_fn`].
pub struct FnSampler<F> {
    f: F,
}

/// Wrap an infallible async closure as a [`Sampler`].
pub fn sampler_fn<F>(f: F) -> FnSampler<F> {
    FnSampler { f }
}

#[async_trait::async_trait]
impl<R, T, F, Fut> Sampler<R, T> for FnSampler<F>
where
    R: Clone + Send + Sync,
    T: Send,
    F: Fn(R) -> Fut + Send + Sync,
    Fut: Future<Output = Vec<T>> + Send,
{
    async fn sample(&self, request: &R) -> Result<Vec<T>, BoxError> {
        Ok((self.f)(request.clone()).await)
    }
}

/// A [`Rule`] backed by an async closure. Built with [`rule_fn`].
pub struct FnRule<F> {
    name: String,
    f: F,
}

/// Wrap an infallible async closure as a named [`Rule`].
///
/// The closure receives owned clones of the request and the item, so it can
/// move them into its future freely.
pub fn rule_fn<F>(name: impl Into<String>, f: F) -> FnRule<F> {
    FnRule {
        name: name.into(),
        f,
    }
}

#[async_trait::async_trait]
impl<R, T, F, Fut> Rule<R, T> for FnRule<F>
where
    R: Clone + Send + Sync,
    T: Clone + Send + Sync,
    F: Fn(R, T) -> Fut + Send + Sync,
    Fut: Future<Output = f64> + Send,
{
    async fn judge(&self, request: &R, item: &T) -> Result<f64, BoxError> {
        Ok((self.f)(request.clone(), item.clone()).await)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// A [`ReviewHook`] backed by an async closure. Built with [`review_fn`].
pub struct FnReviewHook<F> {
    f: F,
}

/// Wrap an infallible async closure as a [`ReviewHook`].
///
/// The closure receives an owned copy of the ranked list.
pub fn review_fn<F>(f: F) -> FnReviewHook<F> {
    FnReviewHook { f }
}

#[async_trait::async_trait]
impl<R, T, F, Fut> ReviewHook<R, T> for FnReviewHook<F>
where
    R: Clone + Send + Sync,
    T: Clone + Send + Sync,
    F: Fn(R, Vec<Scored<T>>) -> Fut + Send + Sync,
    Fut: Future<Output = ()> + Send,
{
    async fn review(&self, request: &R, ranked: &[Scored<T>]) -> Result<(), BoxError> {
        (self.f)(request.clone(), ranked.to_vec()).await;
        Ok(())
    }
}
