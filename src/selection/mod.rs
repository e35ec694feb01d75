//! @acp:module "Selection"
//! @acp:summary "Question selection for new test sessions"
//! @acp:domain selection
//! @acp:layer service
//!
//! # Question Selection
//!
//! Decides which question ids populate a test session:
//!
//! - **Candidate pool**: explicit topics, or the whole catalog with a
//!   subject-balanced hint for random tests, drawn from the questions left
//!   after exclusion
//! - **Recent exclusion**: questions from the last K sessions are avoided, and
//!   re-admitted when the remaining pool is too small
//! - **Adaptive buckets**: New / Wrong-or-Unanswered / Correct, filled by ratio
//!   with a fixed fallback cascade
//! - **Exact size**: a selection either has exactly the requested count or fails
//!   with the largest reachable pool size

pub mod allocation;
pub mod classify;
pub mod config;
pub mod error;
pub mod exclusion;
pub mod pool;
pub mod rendering;
pub mod sampling;
pub mod types;

use std::collections::BTreeSet;
use std::fmt;

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::{debug, info};

use allocation::allocate;
use classify::classify;
use exclusion::recently_seen;
use pool::{build_pool, subject_hint};
use sampling::sample_bucket;
use types::{Bucket, Catalog, QuestionId, SessionHistory};

// Re-export commonly used types
pub use config::SelectionConfig;
pub use error::{ConfigError, SelectionError};
pub use types::{Scope, SelectionOutcome, SelectionRequest, TestType};

/// Steps of a single selection, used for tracing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    PoolBuilt,
    ExclusionApplied,
    BucketsClassified,
    Allocated,
    Sampled,
    Done,
    Insufficient,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::PoolBuilt => "pool-built",
            Self::ExclusionApplied => "exclusion-applied",
            Self::BucketsClassified => "buckets-classified",
            Self::Allocated => "allocated",
            Self::Sampled => "sampled",
            Self::Done => "done",
            Self::Insufficient => "insufficient",
        };
        f.write_str(name)
    }
}

/// Main selection engine
#[derive(Debug, Clone)]
pub struct SelectionEngine {
    config: SelectionConfig,
}

impl SelectionEngine {
    /// Create an engine, rejecting invalid configuration
    pub fn new(config: SelectionConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &SelectionConfig {
        &self.config
    }

    /// Whether a request will use adaptive buckets
    pub fn is_adaptive(&self, request: &SelectionRequest) -> bool {
        request.adaptive_enabled && self.config.adaptive_selection_enabled
    }

    /// Select exactly `request.question_count` question ids
    pub fn select<R: Rng + ?Sized>(
        &self,
        catalog: &Catalog,
        history: &SessionHistory,
        request: &SelectionRequest,
        rng: &mut R,
    ) -> Result<SelectionOutcome, SelectionError> {
        let requested = request.question_count;
        if requested == 0 {
            return Err(SelectionError::InvalidQuestionCount);
        }

        let pool = build_pool(catalog, &request.scope)?;
        debug!("{}: {} candidates for {}", Stage::PoolBuilt, pool.len(), request.student_id);

        let window = request
            .recent_exclusion_window
            .unwrap_or(self.config.recent_exclusion_window);
        let seen = recently_seen(history, &request.student_id, window);
        let fresh: BTreeSet<QuestionId> = pool.questions.difference(&seen).copied().collect();
        let excluded_count = pool.len() - fresh.len();

        // Fall back to the full pool when the fresh one is too small
        let (eligible, exclusion_relaxed) = if fresh.len() < requested && excluded_count > 0 {
            (pool.questions.clone(), true)
        } else {
            (fresh, false)
        };
        debug!(
            "{}: {} excluded, {} eligible, relaxed={}",
            Stage::ExclusionApplied,
            excluded_count,
            eligible.len(),
            exclusion_relaxed
        );

        if eligible.len() < requested {
            debug!("{}: {} of {}", Stage::Insufficient, eligible.len(), requested);
            return Err(SelectionError::InsufficientPool {
                available_count: eligible.len(),
                requested_count: requested,
            });
        }

        let preferred = match request.scope {
            Scope::RandomAll => subject_hint(catalog, &eligible, requested, rng),
            Scope::Topics(_) => BTreeSet::new(),
        };

        let mut selected: Vec<QuestionId> = Vec::with_capacity(requested);
        let composition = if self.is_adaptive(request) {
            let classified = classify(&eligible, history, &request.student_id);
            debug!("{}: {:?}", Stage::BucketsClassified, classified.counts());

            let plan = allocate(requested, classified.counts(), &self.config.adaptive_ratios);
            debug!(
                "{}: ideal {:?}, quotas {:?}, {} backfills",
                Stage::Allocated,
                plan.ideal,
                plan.quotas,
                plan.backfills.len()
            );

            for bucket in Bucket::ALL {
                selected.extend(sample_bucket(
                    classified.bucket(bucket),
                    plan.quotas.get(bucket),
                    &preferred,
                    rng,
                ));
            }
            Some(plan.quotas)
        } else {
            debug!("{}: single bucket of {}", Stage::Allocated, requested);
            selected.extend(sample_bucket(&eligible, requested, &preferred, rng));
            None
        };

        // Presentation order must not reveal bucket membership
        selected.shuffle(rng);
        debug!("{}: {} questions", Stage::Sampled, selected.len());
        debug_assert_eq!(selected.len(), requested);

        info!(
            "{}: selected {} questions for {} (pool {}, relaxed={})",
            Stage::Done,
            selected.len(),
            request.student_id,
            pool.len(),
            exclusion_relaxed
        );

        Ok(SelectionOutcome {
            question_ids: selected,
            composition,
            pool_size: pool.len(),
            excluded_count,
            exclusion_relaxed,
        })
    }
}

impl Default for SelectionEngine {
    fn default() -> Self {
        Self {
            config: SelectionConfig::default(),
        }
    }
}
