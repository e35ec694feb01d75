//! @acp:module "Selection Types"
//! @acp:summary "Catalog, history and request data structures for question selection"
//! @acp:domain selection
//! @acp:layer model

use std::collections::{BTreeSet, HashMap};

use chrono::{DateTime, Utc};
use rmcp::schemars::{self, JsonSchema};
use serde::{Deserialize, Serialize};

pub type QuestionId = u64;
pub type TopicId = String;
pub type StudentId = String;

/// Subjects covered by the catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Subject {
    Physics,
    Chemistry,
    Botany,
    Zoology,
}

impl Subject {
    /// Fixed iteration order used for balanced random tests
    pub const ALL: [Subject; 4] = [
        Subject::Physics,
        Subject::Chemistry,
        Subject::Botany,
        Subject::Zoology,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Physics => "physics",
            Self::Chemistry => "chemistry",
            Self::Botany => "botany",
            Self::Zoology => "zoology",
        }
    }
}

/// A catalogued question. Content is opaque to selection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    pub id: QuestionId,
    pub topic_id: TopicId,
    pub subject: Subject,
    #[serde(flatten)]
    pub content: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Topic {
    pub id: TopicId,
    pub subject: Subject,
    pub name: String,
}

/// Read-only snapshot of topics and questions
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub topics: Vec<Topic>,
    #[serde(default)]
    pub questions: Vec<Question>,
    #[serde(skip)]
    index: CatalogIndex,
}

#[derive(Debug, Clone, Default)]
struct CatalogIndex {
    topics: HashMap<TopicId, usize>,
    questions_by_topic: HashMap<TopicId, Vec<QuestionId>>,
}

impl Catalog {
    pub fn new(topics: Vec<Topic>, questions: Vec<Question>) -> Self {
        let mut catalog = Self {
            topics,
            questions,
            index: CatalogIndex::default(),
        };
        catalog.reindex();
        catalog
    }

    /// Rebuild lookup tables. Must be called after deserializing.
    pub fn reindex(&mut self) {
        let mut index = CatalogIndex::default();
        for (pos, topic) in self.topics.iter().enumerate() {
            index.topics.insert(topic.id.clone(), pos);
        }
        for question in &self.questions {
            index
                .questions_by_topic
                .entry(question.topic_id.clone())
                .or_default()
                .push(question.id);
        }
        self.index = index;
    }

    pub fn topic(&self, id: &str) -> Option<&Topic> {
        self.index.topics.get(id).map(|&pos| &self.topics[pos])
    }

    /// Question ids owned by a topic, in catalog order
    pub fn questions_in_topic(&self, id: &str) -> &[QuestionId] {
        self.index
            .questions_by_topic
            .get(id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn topics_in_subject(&self, subject: Subject) -> impl Iterator<Item = &Topic> {
        self.topics.iter().filter(move |t| t.subject == subject)
    }

    pub fn all_question_ids(&self) -> BTreeSet<QuestionId> {
        self.questions.iter().map(|q| q.id).collect()
    }
}

/// Outcome of one presented question within a finished session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Correct,
    Incorrect,
    Unanswered,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnsweredQuestion {
    pub question_id: QuestionId,
    pub outcome: Outcome,
}

/// A finished test attempt. Never mutated once recorded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletedSession {
    pub student_id: StudentId,
    pub completed_at: DateTime<Utc>,
    #[serde(default)]
    pub answers: Vec<AnsweredQuestion>,
}

/// Snapshot of every completed session known to the platform
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionHistory {
    #[serde(default)]
    pub sessions: Vec<CompletedSession>,
}

impl SessionHistory {
    pub fn new(sessions: Vec<CompletedSession>) -> Self {
        Self { sessions }
    }

    /// A student's sessions, most recently completed first.
    /// Sessions sharing a timestamp keep their reverse history order.
    pub fn for_student<'a>(&'a self, student_id: &str) -> Vec<&'a CompletedSession> {
        let mut sessions: Vec<&CompletedSession> = self
            .sessions
            .iter()
            .filter(|s| s.student_id == student_id)
            .collect();
        sessions.reverse();
        sessions.sort_by(|a, b| b.completed_at.cmp(&a.completed_at));
        sessions
    }
}

/// Most recent outcome of a question for one student
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PerformanceRecord {
    NeverAttempted,
    Correct,
    IncorrectOrUnanswered,
}

impl From<Outcome> for PerformanceRecord {
    fn from(outcome: Outcome) -> Self {
        match outcome {
            Outcome::Correct => Self::Correct,
            Outcome::Incorrect | Outcome::Unanswered => Self::IncorrectOrUnanswered,
        }
    }
}

/// Performance bucket used by adaptive selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Bucket {
    New,
    WrongOrUnanswered,
    Correct,
}

impl Bucket {
    pub const ALL: [Bucket; 3] = [Bucket::New, Bucket::WrongOrUnanswered, Bucket::Correct];

    /// Donor buckets consulted, in order, when this bucket runs short
    pub fn fallback_order(&self) -> [Bucket; 2] {
        match self {
            Self::New => [Self::WrongOrUnanswered, Self::Correct],
            Self::WrongOrUnanswered => [Self::New, Self::Correct],
            Self::Correct => [Self::WrongOrUnanswered, Self::New],
        }
    }
}

impl From<PerformanceRecord> for Bucket {
    fn from(record: PerformanceRecord) -> Self {
        match record {
            PerformanceRecord::NeverAttempted => Self::New,
            PerformanceRecord::IncorrectOrUnanswered => Self::WrongOrUnanswered,
            PerformanceRecord::Correct => Self::Correct,
        }
    }
}

/// One count per bucket
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BucketCounts {
    pub new: usize,
    pub wrong: usize,
    pub correct: usize,
}

impl BucketCounts {
    pub fn new(new: usize, wrong: usize, correct: usize) -> Self {
        Self {
            new,
            wrong,
            correct,
        }
    }

    pub fn get(&self, bucket: Bucket) -> usize {
        match bucket {
            Bucket::New => self.new,
            Bucket::WrongOrUnanswered => self.wrong,
            Bucket::Correct => self.correct,
        }
    }

    pub fn get_mut(&mut self, bucket: Bucket) -> &mut usize {
        match bucket {
            Bucket::New => &mut self.new,
            Bucket::WrongOrUnanswered => &mut self.wrong,
            Bucket::Correct => &mut self.correct,
        }
    }

    pub fn total(&self) -> usize {
        self.new + self.wrong + self.correct
    }
}

/// Topic restriction for a selection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope {
    Topics(Vec<TopicId>),
    RandomAll,
}

/// How the test was requested by the client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum TestType {
    #[default]
    Random,
    Search,
    Custom,
}

impl Scope {
    /// Derive the scope from client input.
    /// An empty topic list means random-all only for random tests.
    pub fn from_request(selected_topics: Vec<TopicId>, test_type: TestType) -> Self {
        if selected_topics.is_empty() && test_type == TestType::Random {
            Self::RandomAll
        } else {
            Self::Topics(selected_topics)
        }
    }
}

/// Parameters for one selection
#[derive(Debug, Clone)]
pub struct SelectionRequest {
    pub student_id: StudentId,
    pub scope: Scope,
    pub question_count: usize,
    pub adaptive_enabled: bool,
    /// Overrides the configured exclusion window
    pub recent_exclusion_window: Option<usize>,
}

impl SelectionRequest {
    pub fn new(student_id: impl Into<StudentId>, scope: Scope, question_count: usize) -> Self {
        Self {
            student_id: student_id.into(),
            scope,
            question_count,
            adaptive_enabled: false,
            recent_exclusion_window: None,
        }
    }

    pub fn adaptive(mut self, enabled: bool) -> Self {
        self.adaptive_enabled = enabled;
        self
    }

    pub fn with_exclusion_window(mut self, window: usize) -> Self {
        self.recent_exclusion_window = Some(window);
        self
    }
}

/// Successful selection
#[derive(Debug, Clone, Serialize)]
pub struct SelectionOutcome {
    /// Final, shuffled question ids
    pub question_ids: Vec<QuestionId>,
    /// Per-bucket composition when adaptive selection ran
    pub composition: Option<BucketCounts>,
    /// Candidate pool size before exclusion
    pub pool_size: usize,
    /// Recently-seen questions found in the pool
    pub excluded_count: usize,
    /// Whether recently-seen questions had to be re-admitted
    pub exclusion_relaxed: bool,
}
