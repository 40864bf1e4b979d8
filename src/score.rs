//! Scoring pass: clamped, weighted, multiplicative accumulation.
//!
//! Each candidate carries one running score, starting at `1.0`. A rule pass
//! multiplies every live candidate's score by the rule's weighted, clamped
//! judgement. Any rule that judges a candidate `0.0` zeroes it permanently
//! for the rest of the selection call; zeroed candidates are never shown to
//! later rules.

use futures::stream::{self, StreamExt, TryStreamExt};
use serde::Serialize;

use crate::boundary::Rule;
use crate::error::SelectError;

/// Restrict a raw rule judgement into `[0.0, 1.0]`.
///
/// Out-of-range values are truncated silently. NaN maps to `0.0` so that
/// every composite score is an ordinary number and the final ordering is
/// total.
pub fn clamp(raw: f64) -> f64 {
    if raw.is_nan() {
        return 0.0;
    }
    raw.clamp(0.0, 1.0)
}

/// Apply a rule's weight to its clamped judgement.
///
/// The weight is an exponent: `1.0` leaves the judgement untouched,
/// `> 1.0` sharpens the rule toward `0` or `1`, `< 1.0` softens it. This
/// keeps the multiplicative "all rules must agree" composition while
/// letting some rules dominate contested picks.
pub fn weighted(clamped: f64, weight: f64) -> f64 {
    if weight == 1.0 {
        clamped
    } else {
        clamped.powf(weight)
    }
}

/// A candidate paired with its running composite score.
///
/// Immutable: updates go through [`Scored::rescored`], which returns a new
/// value instead of mutating in place.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Scored<T> {
    /// The candidate item, as yielded by the sampler.
    pub item: T,
    /// Product of all weighted, clamped rule judgements so far; in `[0, 1]`.
    pub score: f64,
}

impl<T> Scored<T> {
    /// A fresh entry with the initial score of exactly `1.0`.
    pub fn new(item: T) -> Self {
        Self { item, score: 1.0 }
    }

    /// The same item with a replaced score.
    pub fn rescored(self, score: f64) -> Self {
        Self {
            item: self.item,
            score,
        }
    }
}

/// Counters for one rule pass.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct PassStats {
    /// Candidates the rule was actually invoked on.
    pub invocations: usize,
    /// Candidates skipped because their score was already `0.0`.
    pub skips: usize,
}

/// Run one rule over the pool, returning the rescored pool and pass counters.
///
/// Judgement futures are started in pool order and their results are applied
/// in pool order; `concurrency` bounds how many are in flight at once
/// (`1` means strictly sequential). Zero-scored entries are never shown to
/// the rule. Output length and order match the input.
pub(crate) async fn rule_pass<R, T>(
    request: &R,
    rule: &dyn Rule<R, T>,
    weight: f64,
    scored: Vec<Scored<T>>,
    concurrency: usize,
) -> Result<(Vec<Scored<T>>, PassStats), SelectError> {
    let pending = scored
        .iter()
        .enumerate()
        .filter(|(_, entry)| entry.score != 0.0)
        .map(|(idx, entry)| async move {
            match rule.judge(request, &entry.item).await {
                Ok(raw) => Ok((idx, raw)),
                Err(source) => Err(SelectError::Rule {
                    rule: rule.name().to_string(),
                    source,
                }),
            }
        });

    let judged: Vec<(usize, f64)> = stream::iter(pending)
        .buffered(concurrency.max(1))
        .try_collect()
        .await?;

    let stats = PassStats {
        invocations: judged.len(),
        skips: scored.len() - judged.len(),
    };

    let mut raw_by_idx: Vec<Option<f64>> = vec![None; scored.len()];
    for (idx, raw) in judged {
        raw_by_idx[idx] = Some(raw);
    }

    let rescored = scored
        .into_iter()
        .zip(raw_by_idx)
        .map(|(entry, raw)| match raw {
            Some(raw) => {
                let score = entry.score * weighted(clamp(raw), weight);
                entry.rescored(score)
            }
            None => entry,
        })
        .collect();

    Ok((rescored, stats))
}
