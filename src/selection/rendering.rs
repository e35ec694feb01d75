//! @acp:module "Selection Messages"
//! @acp:summary "Template rendering for user-facing selection messages"
//! @acp:domain selection
//! @acp:layer service

use handlebars::Handlebars;
use serde_json::{json, Value};
use thiserror::Error;

use super::config::MessageTemplates;
use super::types::SelectionOutcome;

/// Renders insufficiency messages and selection summaries
pub struct MessageRenderer<'a> {
    handlebars: Handlebars<'a>,
    templates: MessageTemplates,
}

impl<'a> MessageRenderer<'a> {
    pub fn new(templates: MessageTemplates) -> Self {
        let mut handlebars = Handlebars::new();
        // Messages are plain text, not HTML
        handlebars.register_escape_fn(handlebars::no_escape);

        Self {
            handlebars,
            templates,
        }
    }

    /// Message shown next to the "use available / reduce request" choices
    pub fn insufficient(&self, available: usize, requested: usize) -> Result<String, RenderError> {
        let data = json!({
            "available": available,
            "requested": requested,
        });
        self.render_template(&self.templates.insufficient, &data)
    }

    /// One-line description of a successful selection
    pub fn summary(&self, outcome: &SelectionOutcome) -> Result<String, RenderError> {
        let data = json!({
            "count": outcome.question_ids.len(),
            "pool_size": outcome.pool_size,
            "excluded": outcome.excluded_count,
            "relaxed": outcome.exclusion_relaxed,
            "composition": outcome.composition,
        });
        self.render_template(&self.templates.summary, &data)
    }

    fn render_template(&self, template: &str, data: &Value) -> Result<String, RenderError> {
        self.handlebars
            .render_template(template, data)
            .map_err(|e| RenderError::Template(e.to_string()))
    }
}

/// Render error types
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Template error: {0}")]
    Template(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selection::types::BucketCounts;

    fn create_test_outcome(composition: Option<BucketCounts>, relaxed: bool) -> SelectionOutcome {
        SelectionOutcome {
            question_ids: (0..10).collect(),
            composition,
            pool_size: 120,
            excluded_count: 4,
            exclusion_relaxed: relaxed,
        }
    }

    #[test]
    fn test_insufficient_message() {
        let renderer = MessageRenderer::new(MessageTemplates::default());

        let message = renderer.insufficient(8, 20).unwrap();
        assert!(message.starts_with("Only 8 questions are available"));
        assert!(message.contains("20 were requested"));
    }

    #[test]
    fn test_summary_with_composition() {
        let renderer = MessageRenderer::new(MessageTemplates::default());
        let outcome = create_test_outcome(Some(BucketCounts::new(6, 3, 1)), false);

        let summary = renderer.summary(&outcome).unwrap();
        assert_eq!(
            summary,
            "Selected 10 questions from a pool of 120 (6 new, 3 to revisit, 1 mastered)."
        );
    }

    #[test]
    fn test_summary_relaxed_without_composition() {
        let renderer = MessageRenderer::new(MessageTemplates::default());
        let outcome = create_test_outcome(None, true);

        let summary = renderer.summary(&outcome).unwrap();
        assert_eq!(
            summary,
            "Selected 10 questions from a pool of 120; some recently seen questions were included."
        );
    }

    #[test]
    fn test_custom_template() {
        let templates = MessageTemplates {
            insufficient: "{{available}}/{{requested}}".to_string(),
            ..Default::default()
        };
        let renderer = MessageRenderer::new(templates);

        assert_eq!(renderer.insufficient(3, 5).unwrap(), "3/5");
    }

    #[test]
    fn test_broken_template_is_error() {
        let templates = MessageTemplates {
            insufficient: "{{#if available}}unterminated".to_string(),
            ..Default::default()
        };
        let renderer = MessageRenderer::new(templates);

        let err = renderer.insufficient(3, 5).unwrap_err();
        assert!(matches!(err, RenderError::Template(_)));
        assert!(err.to_string().starts_with("Template error: "));
    }
}
