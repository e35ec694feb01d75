//! @acp:module "MCP Tools"
//! @acp:summary "Tool parameter and response types"
//! @acp:domain daemon
//! @acp:layer model
//!
//! The `select_questions` payloads mirror the test-creation contract consumed
//! by the client: success carries only `question_ids`, and the insufficiency
//! shape is fixed.

use rmcp::schemars::{self, JsonSchema};
use serde::{Deserialize, Serialize};

use crate::selection::types::{BucketCounts, QuestionId};
use crate::selection::TestType;

pub const INSUFFICIENT_ERROR: &str = "Insufficient questions available";

#[derive(Debug, Deserialize, JsonSchema)]
pub struct SelectQuestionsParams {
    /// Student the test is created for
    pub student_id: String,
    /// Topic ids to draw from; empty means random across all subjects for random tests
    #[serde(default)]
    pub selected_topics: Vec<String>,
    /// Number of questions in the test (must be > 0)
    pub question_count: usize,
    /// Rebalance toward weak spots (default: false)
    #[serde(default)]
    pub adaptive_selection: bool,
    /// "random", "search" or "custom" (default: "random")
    #[serde(default)]
    pub test_type: TestType,
    /// Override the configured number of recent sessions to avoid
    #[serde(default)]
    pub recent_exclusion_window: Option<usize>,
    /// Seed for reproducible sampling
    #[serde(default)]
    pub seed: Option<u64>,
    /// Add a human-readable summary to the response (default: false)
    #[serde(default)]
    pub include_summary: bool,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct RecentExclusionsParams {
    pub student_id: String,
    /// Number of recent sessions (default: configured window)
    #[serde(default)]
    pub window: Option<usize>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct PerformanceBucketsParams {
    pub student_id: String,
    /// Topic ids; empty means the whole catalog
    #[serde(default)]
    pub selected_topics: Vec<String>,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct SelectQuestionsResponse {
    pub question_ids: Vec<QuestionId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct InsufficientQuestionsResponse {
    pub error: String,
    pub available_questions: usize,
    pub requested_questions: usize,
    pub message: String,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct RecentExclusionsResponse {
    pub student_id: String,
    pub window: usize,
    pub question_ids: Vec<QuestionId>,
}

#[derive(Debug, Serialize)]
pub struct PerformanceBucketsResponse {
    pub student_id: String,
    pub pool_size: usize,
    pub buckets: BucketCounts,
    pub unknown_topics: Vec<String>,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct CatalogOverview {
    pub total_topics: usize,
    pub total_questions: usize,
    pub subjects: Vec<SubjectSummary>,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct SubjectSummary {
    pub subject: String,
    pub topic_count: usize,
    pub question_count: usize,
}
