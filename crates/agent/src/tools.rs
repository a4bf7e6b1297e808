use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::warn;

use ella_db::repositories::ConnectorRepository;

use crate::llm::{ToolCall, ToolDefinition};

#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &'static str;
    fn definition(&self) -> ToolDefinition;
    async fn execute(&self, input: Value) -> Result<Value>;
}

#[derive(Default)]
pub struct ToolRegistry {
    tools: HashMap<String, Box<dyn Tool>>,
}

impl ToolRegistry {
    pub fn register<T>(&mut self, tool: T)
    where
        T: Tool + 'static,
    {
        self.tools.insert(tool.name().to_string(), Box::new(tool));
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools.values().map(|tool| tool.definition()).collect()
    }

    /// Executes one engine-requested invocation. A tool result must never
    /// abort the turn, so unknown tools and tool failures both collapse to an
    /// empty result the engine can narrate.
    pub async fn dispatch(&self, call: &ToolCall) -> Value {
        let Some(tool) = self.tools.get(&call.function.name) else {
            warn!(tool = %call.function.name, "engine requested an unregistered tool");
            return json!([]);
        };

        let input = match serde_json::from_str::<Value>(&call.function.arguments) {
            Ok(input) => input,
            Err(error) => {
                warn!(tool = %call.function.name, error = %error,
                    "tool arguments are not valid JSON");
                return json!([]);
            }
        };

        match tool.execute(input).await {
            Ok(result) => result,
            Err(error) => {
                warn!(tool = %call.function.name, error = %error, "tool execution failed");
                json!([])
            }
        }
    }
}

/// Looks up connectors matching a free-text query for the engine to reference
/// in its answer.
pub struct CatalogSearchTool {
    connectors: Arc<dyn ConnectorRepository>,
}

impl CatalogSearchTool {
    pub const NAME: &'static str = "search_integrations";

    pub fn new(connectors: Arc<dyn ConnectorRepository>) -> Self {
        Self { connectors }
    }
}

#[derive(Deserialize)]
struct SearchInput {
    query: String,
}

#[async_trait]
impl Tool for CatalogSearchTool {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn definition(&self) -> ToolDefinition {
        ToolDefinition::function(
            Self::NAME,
            "Look up com:con's existing BAF connectors that match a keyword. Returns a JSON \
             array of objects with \"name\", \"description\", and \"category\" fields. Use this \
             data to craft a personalised, helpful reply (do NOT expose raw JSON).",
            json!({
                "type": "object",
                "properties": {
                    "query": {"type": "string"}
                },
                "required": ["query"]
            }),
        )
    }

    async fn execute(&self, input: Value) -> Result<Value> {
        let input: SearchInput = match serde_json::from_value(input) {
            Ok(input) => input,
            Err(error) => {
                warn!(error = %error, "catalog search input failed validation");
                return Ok(json!([]));
            }
        };
        let query = input.query.trim();

        let mut records = match self.connectors.search(query).await {
            Ok(records) => records,
            Err(error) => {
                warn!(error = %error, "catalog search failed");
                return Ok(json!([]));
            }
        };

        // No direct hits: broaden by individual tokens and union the results,
        // first occurrence of a name wins.
        if records.is_empty() {
            let mut seen = std::collections::HashSet::new();
            for token in query.to_lowercase().split_whitespace().filter(|token| token.len() > 2) {
                match self.connectors.search(token).await {
                    Ok(token_records) => {
                        for record in token_records {
                            if seen.insert(record.name.clone()) {
                                records.push(record);
                            }
                        }
                    }
                    Err(error) => {
                        warn!(error = %error, token, "catalog token search failed");
                        return Ok(json!([]));
                    }
                }
            }
        }

        Ok(serde_json::to_value(records)?)
    }
}
