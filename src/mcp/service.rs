//! @acp:module "MCP Service"
//! @acp:summary "Core MCP service implementation using rmcp SDK"
//! @acp:domain daemon
//! @acp:layer service
//!
//! Implements the ServerHandler trait for the question selection engine.
//! Test-creation endpoints call `select_questions`; the remaining tools expose
//! the inputs the engine works from.

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::SeedableRng;
use rmcp::{model::*, schemars, ErrorData as McpError, ServerHandler};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::tools::*;
use crate::selection::classify::classify;
use crate::selection::exclusion::recently_seen;
use crate::selection::pool::{union_topics, CandidatePool};
use crate::selection::rendering::MessageRenderer;
use crate::selection::types::{QuestionId, Subject};
use crate::selection::{Scope, SelectionError, SelectionRequest};
use crate::state::AppState;

/// Selection MCP Service - exposes question selection to the platform
#[derive(Clone)]
pub struct QSelectMcpService {
    state: AppState,
}

/// Convert a schemars Schema to a JsonObject for rmcp Tool
fn schema_to_json_object<T: JsonSchema>() -> Arc<serde_json::Map<String, serde_json::Value>> {
    let schema = schemars::schema_for!(T);
    let json_value = serde_json::to_value(&schema).unwrap_or_default();
    if let serde_json::Value::Object(map) = json_value {
        Arc::new(map)
    } else {
        Arc::new(serde_json::Map::new())
    }
}

fn empty_schema() -> Arc<serde_json::Map<String, serde_json::Value>> {
    let mut map = serde_json::Map::new();
    map.insert(
        "type".to_string(),
        serde_json::Value::String("object".to_string()),
    );
    Arc::new(map)
}

fn to_json<T: Serialize>(value: &T) -> Result<String, McpError> {
    serde_json::to_string_pretty(value)
        .map_err(|e| McpError::internal_error(format!("JSON error: {}", e), None))
}

impl QSelectMcpService {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }

    fn build_tools() -> Vec<Tool> {
        vec![
            Tool::new(
                "select_questions",
                "Choose the question ids for a new test session. Avoids questions from the student's recent sessions, optionally rebalances toward weak spots, and returns exactly question_count ids or an insufficiency error with available and requested counts.",
                schema_to_json_object::<SelectQuestionsParams>(),
            ),
            Tool::new(
                "get_recent_exclusions",
                "Get the question ids a student saw in their most recent completed sessions.",
                schema_to_json_object::<RecentExclusionsParams>(),
            ),
            Tool::new(
                "get_performance_buckets",
                "Count how many questions in a topic scope are new, wrong or unanswered, and correct for a student.",
                schema_to_json_object::<PerformanceBucketsParams>(),
            ),
            Tool::new(
                "get_catalog_overview",
                "Get topic and question counts per subject.",
                empty_schema(),
            ),
            Tool::new(
                "get_selection_config",
                "Get the active selection configuration (exclusion window, adaptive ratios, feature flag).",
                empty_schema(),
            ),
            Tool::new(
                "reload_data",
                "Reload the question catalog and completed-session history from the data directory.",
                empty_schema(),
            ),
        ]
    }

    /// Select questions for a new test session
    async fn handle_select_questions(
        &self,
        params: SelectQuestionsParams,
    ) -> Result<CallToolResult, McpError> {
        let scope = Scope::from_request(params.selected_topics, params.test_type);
        let mut request = SelectionRequest::new(params.student_id, scope, params.question_count)
            .adaptive(params.adaptive_selection);
        if let Some(window) = params.recent_exclusion_window {
            request = request.with_exclusion_window(window);
        }

        let mut rng = match params.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let engine = self.state.engine();
        let result = {
            let catalog = self.state.catalog().await;
            let history = self.state.history().await;
            engine.select(&catalog, &history, &request, &mut rng)
        };

        let renderer = MessageRenderer::new(engine.config().messages.clone());

        match result {
            Ok(outcome) => {
                let summary = if params.include_summary {
                    Some(
                        renderer
                            .summary(&outcome)
                            .map_err(|e| McpError::internal_error(e.to_string(), None))?,
                    )
                } else {
                    None
                };

                let response = SelectQuestionsResponse {
                    question_ids: outcome.question_ids,
                    summary,
                };
                Ok(CallToolResult::success(vec![Content::text(to_json(&response)?)]))
            }
            Err(SelectionError::InsufficientPool {
                available_count,
                requested_count,
            }) => {
                warn!(
                    "Insufficient questions for {}: {} available, {} requested",
                    request.student_id, available_count, requested_count
                );
                let message = renderer
                    .insufficient(available_count, requested_count)
                    .map_err(|e| McpError::internal_error(e.to_string(), None))?;

                let response = InsufficientQuestionsResponse {
                    error: INSUFFICIENT_ERROR.to_string(),
                    available_questions: available_count,
                    requested_questions: requested_count,
                    message,
                };
                Ok(CallToolResult::error(vec![Content::text(to_json(&response)?)]))
            }
            Err(e) => Err(McpError::invalid_params(e.to_string(), None)),
        }
    }

    /// Get recently seen questions for a student
    async fn handle_get_recent_exclusions(
        &self,
        params: RecentExclusionsParams,
    ) -> Result<CallToolResult, McpError> {
        let history = self.state.history().await;
        let window = params
            .window
            .unwrap_or(self.state.engine().config().recent_exclusion_window);

        let question_ids: Vec<QuestionId> = recently_seen(&history, &params.student_id, window)
            .into_iter()
            .collect();

        let response = RecentExclusionsResponse {
            student_id: params.student_id,
            window,
            question_ids,
        };

        Ok(CallToolResult::success(vec![Content::text(to_json(&response)?)]))
    }

    /// Count performance buckets for a scope
    async fn handle_get_performance_buckets(
        &self,
        params: PerformanceBucketsParams,
    ) -> Result<CallToolResult, McpError> {
        let catalog = self.state.catalog().await;
        let history = self.state.history().await;

        let pool = if params.selected_topics.is_empty() {
            CandidatePool {
                questions: catalog.all_question_ids(),
                unknown_topics: Vec::new(),
            }
        } else {
            union_topics(&catalog, &params.selected_topics)
        };

        let classified = classify(&pool.questions, &history, &params.student_id);

        let response = PerformanceBucketsResponse {
            student_id: params.student_id,
            pool_size: pool.len(),
            buckets: classified.counts(),
            unknown_topics: pool.unknown_topics,
        };

        Ok(CallToolResult::success(vec![Content::text(to_json(&response)?)]))
    }

    /// Get per-subject catalog counts
    async fn handle_get_catalog_overview(&self) -> Result<CallToolResult, McpError> {
        let catalog = self.state.catalog().await;

        let subjects: Vec<SubjectSummary> = Subject::ALL
            .iter()
            .map(|&subject| SubjectSummary {
                subject: subject.as_str().to_string(),
                topic_count: catalog.topics_in_subject(subject).count(),
                question_count: catalog
                    .questions
                    .iter()
                    .filter(|q| q.subject == subject)
                    .count(),
            })
            .collect();

        let response = CatalogOverview {
            total_topics: catalog.topics.len(),
            total_questions: catalog.questions.len(),
            subjects,
        };

        Ok(CallToolResult::success(vec![Content::text(to_json(&response)?)]))
    }

    /// Get the active configuration
    async fn handle_get_selection_config(&self) -> Result<CallToolResult, McpError> {
        let json = to_json(self.state.engine().config())?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    /// Reload catalog and history snapshots
    async fn handle_reload_data(&self) -> Result<CallToolResult, McpError> {
        self.state
            .reload_catalog()
            .await
            .map_err(|e| McpError::internal_error(format!("Catalog reload failed: {:#}", e), None))?;
        self.state
            .reload_history()
            .await
            .map_err(|e| McpError::internal_error(format!("History reload failed: {:#}", e), None))?;

        info!("Data reloaded from {}", self.state.data_dir().display());
        Ok(CallToolResult::success(vec![Content::text(
            r#"{"message": "Catalog and session history reloaded"}"#.to_string(),
        )]))
    }

    /// Parse tool arguments from request
    fn parse_args<T: for<'de> Deserialize<'de>>(
        args: Option<serde_json::Map<String, serde_json::Value>>,
    ) -> Result<T, McpError> {
        let value = serde_json::Value::Object(args.unwrap_or_default());
        serde_json::from_value(value).map_err(|e| McpError::invalid_params(e.to_string(), None))
    }
}

#[allow(clippy::manual_async_fn)]
impl ServerHandler for QSelectMcpService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation::from_build_env(),
            instructions: Some(
                "Question selection server for test preparation. Use select_questions to pick \
                 the questions of a new test session; use get_catalog_overview and \
                 get_performance_buckets to inspect what a selection can draw from."
                    .to_string(),
            ),
        }
    }

    fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: rmcp::service::RequestContext<rmcp::service::RoleServer>,
    ) -> impl std::future::Future<Output = Result<ListToolsResult, McpError>> + Send + '_ {
        async move {
            Ok(ListToolsResult {
                tools: Self::build_tools(),
                next_cursor: None,
            })
        }
    }

    fn call_tool(
        &self,
        request: CallToolRequestParam,
        _context: rmcp::service::RequestContext<rmcp::service::RoleServer>,
    ) -> impl std::future::Future<Output = Result<CallToolResult, McpError>> + Send + '_ {
        async move {
            let tool_name: &str = &request.name;
            match tool_name {
                "select_questions" => {
                    let params: SelectQuestionsParams = Self::parse_args(request.arguments)?;
                    self.handle_select_questions(params).await
                }
                "get_recent_exclusions" => {
                    let params: RecentExclusionsParams = Self::parse_args(request.arguments)?;
                    self.handle_get_recent_exclusions(params).await
                }
                "get_performance_buckets" => {
                    let params: PerformanceBucketsParams = Self::parse_args(request.arguments)?;
                    self.handle_get_performance_buckets(params).await
                }
                "get_catalog_overview" => self.handle_get_catalog_overview().await,
                "get_selection_config" => self.handle_get_selection_config().await,
                "reload_data" => self.handle_reload_data().await,
                _ => Err(McpError::invalid_params(
                    format!("Unknown tool: {}", request.name),
                    None,
                )),
            }
        }
    }
}
