use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tracing::info;

use ella_agent::guardrails::{GuardrailGate, LlmGuardrailClassifier};
use ella_agent::llm::{CompletionError, CompletionSettings, OpenAiCompatibleClient};
use ella_agent::runtime::ConversationRuntime;
use ella_agent::tools::{CatalogSearchTool, ToolRegistry};
use ella_core::config::{AppConfig, ConfigError, LlmConfig, LlmProvider, LoadOptions};
use ella_db::repositories::ConnectorRepository;
use ella_db::{
    connect_with_settings, migrations, ChangeHub, DbPool, MessageStore, SqlConnectorRepository,
    SqlConversationRepository,
};

pub struct Application {
    pub config: AppConfig,
    pub db_pool: DbPool,
    pub runtime: Arc<ConversationRuntime>,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("database connection failed: {0}")]
    DatabaseConnect(#[source] sqlx::Error),
    #[error("database migration failed: {0}")]
    Migration(#[source] sqlx::migrate::MigrateError),
    #[error("completion client setup failed: {0}")]
    Completion(#[from] CompletionError),
}

pub async fn bootstrap(options: LoadOptions) -> Result<Application, BootstrapError> {
    let config = AppConfig::load(options)?;
    bootstrap_with_config(config).await
}

/// Wires the full application: pool, migrations, message store, catalog tool,
/// guardrail gate, and (when enabled) the completion engine and classifier.
/// Everything is constructed here and injected explicitly.
pub async fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(event_name = "system.bootstrap.start", "starting application bootstrap");

    let db_pool = connect_with_settings(
        &config.database.url,
        config.database.max_connections,
        config.database.timeout_secs,
    )
    .await
    .map_err(BootstrapError::DatabaseConnect)?;
    info!(event_name = "system.bootstrap.database_connected", "database connection established");

    migrations::run_pending(&db_pool).await.map_err(BootstrapError::Migration)?;
    info!(event_name = "system.bootstrap.migrations_applied", "database migrations applied");

    let store = MessageStore::new(
        Arc::new(SqlConversationRepository::new(db_pool.clone())),
        &config.chat.storage_key,
        ChangeHub::new(),
    );

    let connectors: Arc<dyn ConnectorRepository> =
        Arc::new(SqlConnectorRepository::new(db_pool.clone()));
    let mut tools = ToolRegistry::default();
    tools.register(CatalogSearchTool::new(connectors));

    let mut runtime = ConversationRuntime::new(store, GuardrailGate::new(config.guardrail.clone()))
        .with_tools(tools)
        .with_default_language(config.chat.default_language)
        .with_max_tool_rounds(config.llm.max_tool_rounds);

    if config.llm.enabled {
        let settings = completion_settings(&config.llm);
        let engine = OpenAiCompatibleClient::new(settings.clone())?;
        let classifier_client = OpenAiCompatibleClient::new(settings)?;
        runtime = runtime
            .with_engine(Arc::new(engine))
            .with_classifier(Arc::new(LlmGuardrailClassifier::new(classifier_client)));
        info!(
            event_name = "system.bootstrap.engine_ready",
            model = %config.llm.model,
            "completion engine configured"
        );
    } else {
        info!(
            event_name = "system.bootstrap.fallback_mode",
            "no completion engine configured, using the rule-based responder"
        );
    }

    Ok(Application { config, db_pool, runtime: Arc::new(runtime) })
}

fn completion_settings(llm: &LlmConfig) -> CompletionSettings {
    let base_url = llm.base_url.clone().unwrap_or_else(|| match llm.provider {
        LlmProvider::OpenAi => "https://api.openai.com/v1".to_string(),
        LlmProvider::Ollama => "http://localhost:11434/v1".to_string(),
    });

    CompletionSettings {
        base_url,
        api_key: llm.api_key.clone(),
        model: llm.model.clone(),
        temperature: llm.temperature,
        timeout: Duration::from_secs(llm.timeout_secs),
    }
}
