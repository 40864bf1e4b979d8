//! The selection engine: pool acquisition, rule passes, ranking, review.
//!
//! Core loop of one `select` call:
//! 1. Ask the sampler for the candidate pool and materialize it.
//! 2. Give every candidate a starting score of `1.0`.
//! 3. Run the rules in registration order; each pass multiplies live
//!    candidates' scores by the rule's weighted, clamped judgement and
//!    skips candidates already at `0.0`.
//! 4. Stable-sort descending by score (ties keep pool order, first seen
//!    wins).
//! 5. Invoke the review hook, if any, with the full ranked list.
//! 6. Return the top item.
//!
//! The engine holds no state across calls; the scored list lives and dies
//! inside one call.

use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use tracing::{debug, trace};

use crate::boundary::{ReviewHook, Rule, Sampler};
use crate::error::{BuildError, SelectError};
use crate::score::{rule_pass, Scored};

/// Upper bound on within-rule judgement fan-out.
const MAX_RULE_CONCURRENCY: usize = 64;

struct WeightedRule<R, T> {
    rule: Arc<dyn Rule<R, T>>,
    weight: f64,
}

/// Per-call counters, returned by [`GoodEnough::select_with_report`].
///
/// Serializable so review hooks and callers can log it as-is.
#[derive(Debug, Clone, Serialize)]
pub struct SelectionReport {
    /// Candidates the sampler produced.
    pub pool_size: usize,
    /// Rules configured on the engine.
    pub rules_evaluated: usize,
    /// Total rule invocations across all passes.
    pub rule_invocations: usize,
    /// Invocations avoided via the zero-score short-circuit.
    pub short_circuit_skips: usize,
    /// Candidates that finished at a composite score of `0.0`.
    pub zeroed_candidates: usize,
    /// Composite score of the returned item.
    pub winner_score: f64,
    /// Wall time of the whole call, sampler and hook included.
    pub elapsed_ms: u128,
}

/// Picks the best item from a sampled pool by multiplicative soft-rule
/// scoring. Built via [`GoodEnough::builder`].
pub struct GoodEnough<R, T> {
    sampler: Arc<dyn Sampler<R, T>>,
    hook: Option<Arc<dyn ReviewHook<R, T>>>,
    rules: Vec<WeightedRule<R, T>>,
    rule_concurrency: usize,
    require_viable: bool,
}

impl<R, T> GoodEnough<R, T> {
    pub fn builder() -> GoodEnoughBuilder<R, T> {
        GoodEnoughBuilder::default()
    }

    /// Pick the best item for `request`.
    pub async fn select(&self, request: &R) -> Result<T, SelectError> {
        let (item, _report) = self.select_with_report(request).await?;
        Ok(item)
    }

    /// Pick the best item for `request` and report what the call did.
    pub async fn select_with_report(
        &self,
        request: &R,
    ) -> Result<(T, SelectionReport), SelectError> {
        let start = Instant::now();

        let pool = self
            .sampler
            .sample(request)
            .await
            .map_err(|source| SelectError::Sampler { source })?;
        if pool.is_empty() {
            return Err(SelectError::EmptyPool);
        }

        let mut report = SelectionReport {
            pool_size: pool.len(),
            rules_evaluated: self.rules.len(),
            rule_invocations: 0,
            short_circuit_skips: 0,
            zeroed_candidates: 0,
            winner_score: 0.0,
            elapsed_ms: 0,
        };
        debug!(
            pool_size = report.pool_size,
            rules = report.rules_evaluated,
            "scoring candidate pool"
        );

        let mut ranked: Vec<Scored<T>> = pool.into_iter().map(Scored::new).collect();

        for entry in &self.rules {
            let (rescored, stats) = rule_pass(
                request,
                entry.rule.as_ref(),
                entry.weight,
                ranked,
                self.rule_concurrency,
            )
            .await?;
            ranked = rescored;
            report.rule_invocations += stats.invocations;
            report.short_circuit_skips += stats.skips;
            trace!(
                rule = entry.rule.name(),
                invocations = stats.invocations,
                skips = stats.skips,
                "rule pass complete"
            );
        }

        report.zeroed_candidates = ranked.iter().filter(|e| e.score == 0.0).count();

        // Stable sort: exact score ties keep sampler order, first seen wins.
        ranked.sort_by(|a, b| b.score.total_cmp(&a.score));

        if let Some(hook) = &self.hook {
            hook.review(request, &ranked)
                .await
                .map_err(|source| SelectError::Hook { source })?;
        }

        // Non-empty: the pool was checked after sampling and scoring
        // preserves length.
        let best = ranked.into_iter().next().ok_or(SelectError::EmptyPool)?;
        if self.require_viable && best.score == 0.0 {
            return Err(SelectError::NoViableCandidate);
        }

        report.winner_score = best.score;
        report.elapsed_ms = start.elapsed().as_millis();
        debug!(score = report.winner_score, "selection complete");
        Ok((best.item, report))
    }

    /// Blocking wrapper around [`select`](Self::select).
    ///
    /// Spins up a private current-thread runtime and drives the selection to
    /// completion. Must not be called from inside an async runtime; use
    /// `select` there instead.
    pub fn pick(&self, request: &R) -> Result<T, SelectError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|source| SelectError::Runtime { source })?;
        runtime.block_on(self.select(request))
    }
}

/// Builder for [`GoodEnough`]. Rules apply in registration order.
pub struct GoodEnoughBuilder<R, T> {
    sampler: Option<Arc<dyn Sampler<R, T>>>,
    hook: Option<Arc<dyn ReviewHook<R, T>>>,
    rules: Vec<(Arc<dyn Rule<R, T>>, f64)>,
    rule_concurrency: usize,
    require_viable: bool,
}

impl<R, T> Default for GoodEnoughBuilder<R, T> {
    fn default() -> Self {
        Self {
            sampler: None,
            hook: None,
            rules: Vec::new(),
            rule_concurrency: 1,
            require_viable: false,
        }
    }
}

impl<R, T> GoodEnoughBuilder<R, T> {
    /// The candidate sampler. Required.
    pub fn sampler(mut self, sampler: impl Sampler<R, T> + 'static) -> Self {
        self.sampler = Some(Arc::new(sampler));
        self
    }

    /// Optional review hook, invoked once per selection with the ranked list.
    pub fn review_hook(mut self, hook: impl ReviewHook<R, T> + 'static) -> Self {
        self.hook = Some(Arc::new(hook));
        self
    }

    /// Register a rule with the default weight of `1.0`.
    pub fn rule(self, rule: impl Rule<R, T> + 'static) -> Self {
        self.weighted_rule(rule, 1.0)
    }

    /// Register a rule with an explicit weight.
    ///
    /// The weight is applied as an exponent to the rule's clamped judgement
    /// and must be positive and finite; `build` rejects anything else.
    pub fn weighted_rule(mut self, rule: impl Rule<R, T> + 'static, weight: f64) -> Self {
        self.rules.push((Arc::new(rule), weight));
        self
    }

    /// Bound on concurrent judgements within one rule pass.
    ///
    /// Defaults to `1` (strictly sequential). Judgements always start in
    /// pool order and apply in pool order, so raising this changes only
    /// scheduling, never scores or ordering. Capped internally.
    pub fn rule_concurrency(mut self, concurrency: usize) -> Self {
        self.rule_concurrency = concurrency;
        self
    }

    /// Fail with [`SelectError::NoViableCandidate`] when every candidate
    /// ends at a composite score of `0.0`, instead of silently returning
    /// the first zero-scored item. Off by default.
    pub fn require_viable(mut self, require: bool) -> Self {
        self.require_viable = require;
        self
    }

    /// Validate the configuration and build the engine.
    pub fn build(self) -> Result<GoodEnough<R, T>, BuildError> {
        let sampler = self.sampler.ok_or(BuildError::MissingSampler)?;

        let mut rules = Vec::with_capacity(self.rules.len());
        for (rule, weight) in self.rules {
            if !(weight > 0.0 && weight.is_finite()) {
                return Err(BuildError::InvalidWeight {
                    rule: rule.name().to_string(),
                    weight,
                });
            }
            rules.push(WeightedRule { rule, weight });
        }

        Ok(GoodEnough {
            sampler,
            hook: self.hook,
            rules,
            rule_concurrency: self.rule_concurrency.clamp(1, MAX_RULE_CONCURRENCY),
            require_viable: self.require_viable,
        })
    }
}
