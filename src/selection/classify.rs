//! @acp:module "Performance Classifier"
//! @acp:summary "Partitions a candidate pool by a student's latest outcomes"
//! @acp:domain selection
//! @acp:layer service

use std::collections::{BTreeSet, HashMap};

use super::types::{Bucket, BucketCounts, PerformanceRecord, QuestionId, SessionHistory};

/// Candidate pool split into the three performance buckets
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassifiedPool {
    pub new: BTreeSet<QuestionId>,
    pub wrong: BTreeSet<QuestionId>,
    pub correct: BTreeSet<QuestionId>,
}

impl ClassifiedPool {
    pub fn bucket(&self, bucket: Bucket) -> &BTreeSet<QuestionId> {
        match bucket {
            Bucket::New => &self.new,
            Bucket::WrongOrUnanswered => &self.wrong,
            Bucket::Correct => &self.correct,
        }
    }

    fn bucket_mut(&mut self, bucket: Bucket) -> &mut BTreeSet<QuestionId> {
        match bucket {
            Bucket::New => &mut self.new,
            Bucket::WrongOrUnanswered => &mut self.wrong,
            Bucket::Correct => &mut self.correct,
        }
    }

    pub fn counts(&self) -> BucketCounts {
        BucketCounts::new(self.new.len(), self.wrong.len(), self.correct.len())
    }
}

/// Latest recorded outcome per question for one student
#[derive(Debug, Clone, Default)]
pub struct PerformanceIndex {
    latest: HashMap<QuestionId, PerformanceRecord>,
}

impl PerformanceIndex {
    /// Replay the student's sessions oldest first so later outcomes win
    pub fn build(history: &SessionHistory, student_id: &str) -> Self {
        let mut latest = HashMap::new();
        for session in history.for_student(student_id).into_iter().rev() {
            for answer in &session.answers {
                latest.insert(answer.question_id, PerformanceRecord::from(answer.outcome));
            }
        }
        Self { latest }
    }

    pub fn record(&self, question_id: QuestionId) -> PerformanceRecord {
        self.latest
            .get(&question_id)
            .copied()
            .unwrap_or(PerformanceRecord::NeverAttempted)
    }
}

/// Partition `pool` into new / wrong-or-unanswered / correct for a student
pub fn classify(pool: &BTreeSet<QuestionId>, history: &SessionHistory, student_id: &str) -> ClassifiedPool {
    let index = PerformanceIndex::build(history, student_id);
    let mut classified = ClassifiedPool::default();

    for &question_id in pool {
        let bucket = Bucket::from(index.record(question_id));
        classified.bucket_mut(bucket).insert(question_id);
    }

    classified
}
