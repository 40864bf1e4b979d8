#![forbid(unsafe_code)]

//! # goodenough
//!
//! A "good-enough" item selector: sample a pool of candidates, run each
//! through a chain of independent soft rules, and return the single best
//! one.
//!
//! Instead of a single deterministic comparator, "best" is the product of
//! per-rule judgements. Each rule returns a number that the engine clamps
//! into `[0, 1]` and raises to the rule's weight; a candidate's composite
//! score is the product across all rules, so any rule judging `0.0` vetoes
//! the candidate outright and later rules skip it. Sampling, rule logic,
//! and post-selection auditing are all injected by the caller — the engine
//! is the decision loop only.
//!
//! ```
//! use goodenough::{rule_fn, sampler_fn, GoodEnough};
//!
//! let engine = GoodEnough::builder()
//!     .sampler(sampler_fn(|_request: ()| async move { vec![1u32, 2, 3, 4, 5] }))
//!     .rule(rule_fn("prefer_even", |_request: (), item: u32| async move {
//!         if item % 2 == 0 {
//!             1.0
//!         } else {
//!             0.0
//!         }
//!     }))
//!     .build()
//!     .unwrap();
//!
//! // 2 is the first candidate every rule agrees on.
//! assert_eq!(engine.pick(&()).unwrap(), 2);
//! ```

pub mod boundary;
pub mod engine;
pub mod error;
pub mod score;

pub use boundary::{
    review_fn, rule_fn, sampler_fn, BoxError, FnReviewHook, FnRule, FnSampler, ReviewHook, Rule,
    Sampler,
};
pub use engine::{GoodEnough, GoodEnoughBuilder, SelectionReport};
pub use error::{BuildError, SelectError};
pub use score::{clamp, Scored};
