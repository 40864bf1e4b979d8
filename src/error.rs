//! Error taxonomy: build-time contract violations and selection-time failures.

use thiserror::Error;

use crate::boundary::BoxError;

/// Contract violations caught when the engine is built.
///
/// Failing fast here turns a subtle runtime bug into a loud construction
/// error; each variant names the offending parameter.
#[derive(Debug, Error)]
pub enum BuildError {
    /// No candidate sampler was supplied.
    #[error("missing sampler: a candidate sampler is required")]
    MissingSampler,

    /// A rule was registered with a weight that is not positive and finite.
    #[error("invalid weight {weight} for rule {rule:?}: weights must be positive and finite")]
    InvalidWeight { rule: String, weight: f64 },
}

/// Failures surfaced by one selection call.
///
/// Boundary failures (sampler, rule, hook) are never retried or suppressed;
/// the original error is available via `source()`.
#[derive(Debug, Error)]
pub enum SelectError {
    /// The sampler returned zero candidates.
    #[error("empty candidate pool")]
    EmptyPool,

    /// Every candidate finished with a composite score of `0.0` and the
    /// engine was built with `require_viable(true)`.
    #[error("no viable candidate: every composite score is 0.0")]
    NoViableCandidate,

    /// The sampler failed.
    #[error("sampler failed: {source}")]
    Sampler { source: BoxError },

    /// A rule failed while judging a candidate.
    #[error("rule {rule:?} failed: {source}")]
    Rule { rule: String, source: BoxError },

    /// The review hook failed.
    #[error("review hook failed: {source}")]
    Hook { source: BoxError },

    /// The blocking `pick` wrapper could not start its private runtime.
    #[error("runtime error: {source}")]
    Runtime { source: std::io::Error },
}
