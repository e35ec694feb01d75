//! @acp:module "Application State"
//! @acp:summary "Shared state for the selection server: config, catalog and history snapshots"
//! @acp:domain daemon
//! @acp:layer service
//!
//! Loads the question catalog and completed-session history from a data
//! directory and provides thread-safe access for request handlers.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use tokio::sync::RwLock;
use tracing::info;

use crate::selection::types::{Catalog, SessionHistory};
use crate::selection::{SelectionConfig, SelectionEngine};

const CATALOG_FILE: &str = "catalog.json";
const SESSIONS_FILE: &str = "sessions.json";
pub const CONFIG_FILE: &str = "selection.config.json";

/// Shared application state for the server
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    /// Directory holding catalog and session files
    data_dir: PathBuf,
    /// Engine built from the start-up config
    engine: SelectionEngine,
    /// Loaded question catalog
    catalog: RwLock<Catalog>,
    /// Loaded completed sessions
    history: RwLock<SessionHistory>,
}

impl AppState {
    /// Load state from a data directory.
    /// `config_path` overrides `<data_dir>/selection.config.json`.
    pub async fn load(data_dir: &Path, config_path: Option<&Path>) -> anyhow::Result<Self> {
        // Config problems are fatal at start-up
        let config_path = config_path
            .map(Path::to_path_buf)
            .unwrap_or_else(|| data_dir.join(CONFIG_FILE));
        let config = SelectionConfig::load(&config_path).await?;
        let engine = SelectionEngine::new(config)?;

        let catalog = load_catalog(data_dir).await?;
        let history = load_history(data_dir).await?;

        Ok(Self {
            inner: Arc::new(AppStateInner {
                data_dir: data_dir.to_path_buf(),
                engine,
                catalog: RwLock::new(catalog),
                history: RwLock::new(history),
            }),
        })
    }

    /// Create AppState for testing with in-memory data
    #[cfg(test)]
    pub fn for_testing(catalog: Catalog, history: SessionHistory, config: SelectionConfig) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                data_dir: PathBuf::from("."),
                engine: SelectionEngine::new(config).expect("valid test config"),
                catalog: RwLock::new(catalog),
                history: RwLock::new(history),
            }),
        }
    }

    /// Get data directory
    pub fn data_dir(&self) -> &Path {
        &self.inner.data_dir
    }

    pub fn engine(&self) -> &SelectionEngine {
        &self.inner.engine
    }

    /// Get read access to catalog
    pub async fn catalog(&self) -> tokio::sync::RwLockReadGuard<'_, Catalog> {
        self.inner.catalog.read().await
    }

    /// Get read access to history
    pub async fn history(&self) -> tokio::sync::RwLockReadGuard<'_, SessionHistory> {
        self.inner.history.read().await
    }

    /// Reload catalog from disk
    pub async fn reload_catalog(&self) -> anyhow::Result<()> {
        let catalog = load_catalog(&self.inner.data_dir).await?;

        let mut write_guard = self.inner.catalog.write().await;
        *write_guard = catalog;

        info!("Catalog reloaded from disk");
        Ok(())
    }

    /// Reload session history from disk
    pub async fn reload_history(&self) -> anyhow::Result<()> {
        let history = load_history(&self.inner.data_dir).await?;

        let mut write_guard = self.inner.history.write().await;
        *write_guard = history;

        info!("Session history reloaded from disk");
        Ok(())
    }
}

async fn load_catalog(data_dir: &Path) -> anyhow::Result<Catalog> {
    let catalog_path = data_dir.join(CATALOG_FILE);
    if !catalog_path.exists() {
        return Err(anyhow::anyhow!(
            "No catalog found at {}",
            catalog_path.display()
        ));
    }

    let content = tokio::fs::read_to_string(&catalog_path)
        .await
        .with_context(|| format!("reading {}", catalog_path.display()))?;
    let mut catalog: Catalog = serde_json::from_str(&content)
        .with_context(|| format!("parsing {}", catalog_path.display()))?;
    catalog.reindex();

    info!(
        "Loaded catalog with {} topics, {} questions",
        catalog.topics.len(),
        catalog.questions.len()
    );
    Ok(catalog)
}

async fn load_history(data_dir: &Path) -> anyhow::Result<SessionHistory> {
    let sessions_path = data_dir.join(SESSIONS_FILE);
    if !sessions_path.exists() {
        info!("No session history at {}, starting empty", sessions_path.display());
        return Ok(SessionHistory::default());
    }

    let content = tokio::fs::read_to_string(&sessions_path)
        .await
        .with_context(|| format!("reading {}", sessions_path.display()))?;
    let history: SessionHistory = serde_json::from_str(&content)
        .with_context(|| format!("parsing {}", sessions_path.display()))?;

    info!("Loaded {} completed sessions", history.sessions.len());
    Ok(history)
}

#[cfg(test)]
mod tests {
    use super::*;

    const CATALOG_JSON: &str = r#"{
        "topics": [
            {"id": "waves", "subject": "physics", "name": "Waves"}
        ],
        "questions": [
            {"id": 1, "topic_id": "waves", "subject": "physics", "stem": "What is a node?"},
            {"id": 2, "topic_id": "waves", "subject": "physics"}
        ]
    }"#;

    const SESSIONS_JSON: &str = r#"{
        "sessions": [
            {
                "student_id": "amy",
                "completed_at": "2024-04-02T10:00:00Z",
                "answers": [{"question_id": 1, "outcome": "incorrect"}]
            }
        ]
    }"#;

    #[tokio::test]
    async fn test_load_data_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CATALOG_FILE), CATALOG_JSON).unwrap();
        std::fs::write(dir.path().join(SESSIONS_FILE), SESSIONS_JSON).unwrap();

        let state = AppState::load(dir.path(), None).await.unwrap();

        let catalog = state.catalog().await;
        assert_eq!(catalog.questions_in_topic("waves"), &[1, 2]);
        assert!(catalog.questions[0].content.contains_key("stem"));
        assert_eq!(state.history().await.sessions.len(), 1);
        assert_eq!(state.engine().config().recent_exclusion_window, 3);
    }

    #[tokio::test]
    async fn test_missing_catalog_fails() {
        let dir = tempfile::tempdir().unwrap();

        let result = AppState::load(dir.path(), None).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_missing_history_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CATALOG_FILE), CATALOG_JSON).unwrap();

        let state = AppState::load(dir.path(), None).await.unwrap();
        assert!(state.history().await.sessions.is_empty());
    }

    #[tokio::test]
    async fn test_bad_ratios_fail_at_startup() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CATALOG_FILE), CATALOG_JSON).unwrap();
        let config_path = dir.path().join("custom.json");
        std::fs::write(
            &config_path,
            r#"{"adaptive_ratios": {"new": 10, "wrong": 10, "correct": 10}}"#,
        )
        .unwrap();

        let result = AppState::load(dir.path(), Some(&config_path)).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_reload_history_picks_up_new_sessions() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CATALOG_FILE), CATALOG_JSON).unwrap();

        let state = AppState::load(dir.path(), None).await.unwrap();
        assert!(state.history().await.sessions.is_empty());

        std::fs::write(dir.path().join(SESSIONS_FILE), SESSIONS_JSON).unwrap();
        state.reload_history().await.unwrap();
        assert_eq!(state.history().await.sessions.len(), 1);
    }
}
