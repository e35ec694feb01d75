//! @acp:module "Candidate Pool"
//! @acp:summary "Resolves eligible question ids and the random-all subject hint"
//! @acp:domain selection
//! @acp:layer service

use std::collections::BTreeSet;

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::{debug, warn};

use super::error::SelectionError;
use super::types::{Catalog, QuestionId, Scope, Subject, TopicId};

/// Questions resolved for one request scope
#[derive(Debug, Clone, Default)]
pub struct CandidatePool {
    /// Every question in scope
    pub questions: BTreeSet<QuestionId>,
    /// Requested topics missing from the catalog
    pub unknown_topics: Vec<TopicId>,
}

impl CandidatePool {
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}

/// Build the candidate pool for a scope
pub fn build_pool(catalog: &Catalog, scope: &Scope) -> Result<CandidatePool, SelectionError> {
    match scope {
        Scope::Topics(topic_ids) => build_topic_pool(catalog, topic_ids),
        Scope::RandomAll => {
            let questions = catalog.all_question_ids();
            debug!("Built random pool with {} questions", questions.len());
            Ok(CandidatePool {
                questions,
                unknown_topics: Vec::new(),
            })
        }
    }
}

fn build_topic_pool(catalog: &Catalog, topic_ids: &[TopicId]) -> Result<CandidatePool, SelectionError> {
    if topic_ids.is_empty() {
        return Err(SelectionError::ScopeEmpty);
    }

    let pool = union_topics(catalog, topic_ids);
    for topic_id in &pool.unknown_topics {
        warn!("Ignoring unknown topic in scope: {}", topic_id);
    }

    debug!(
        "Built topic pool with {} questions from {} topics",
        pool.len(),
        topic_ids.len()
    );

    Ok(pool)
}

/// Union of the questions of the given topics; unknown ids are collected, not fatal
pub fn union_topics(catalog: &Catalog, topic_ids: &[TopicId]) -> CandidatePool {
    let mut pool = CandidatePool::default();
    for topic_id in topic_ids {
        if catalog.topic(topic_id).is_none() {
            pool.unknown_topics.push(topic_id.clone());
            continue;
        }
        pool.questions.extend(catalog.questions_in_topic(topic_id).iter().copied());
    }
    pool
}

/// Subject-balanced draw order hint for random-all tests
///
/// Each subject gets an equal share of `question_count`, taken from a shuffled
/// list of its questions that are still in `eligible`. Subjects that cannot
/// fill their share leave the rest to the general pool.
pub fn subject_hint<R: Rng + ?Sized>(
    catalog: &Catalog,
    eligible: &BTreeSet<QuestionId>,
    question_count: usize,
    rng: &mut R,
) -> BTreeSet<QuestionId> {
    let mut preferred = BTreeSet::new();

    for (position, subject) in Subject::ALL.iter().enumerate() {
        let share = subject_share(question_count, position);
        if share == 0 {
            continue;
        }

        let mut candidates: Vec<QuestionId> = catalog
            .topics_in_subject(*subject)
            .flat_map(|t| catalog.questions_in_topic(&t.id).iter().copied())
            .filter(|id| eligible.contains(id))
            .collect();
        candidates.shuffle(rng);

        if candidates.len() < share {
            debug!(
                "Subject {} filled {} of its {} share",
                subject.as_str(),
                candidates.len(),
                share
            );
        }
        preferred.extend(candidates.into_iter().take(share));
    }

    preferred
}

/// Equal share per subject; the remainder goes to the first subjects
fn subject_share(question_count: usize, position: usize) -> usize {
    let subjects = Subject::ALL.len();
    let base = question_count / subjects;
    if position < question_count % subjects {
        base + 1
    } else {
        base
    }
}
