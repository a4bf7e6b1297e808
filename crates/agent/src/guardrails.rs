use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use ella_core::{
    is_category_allowed, parse_guardrail_output, rejection_message, GuardrailCategory,
    GuardrailConfig, GuardrailOutput, Language, SchemaError,
};

use crate::llm::{
    ChatMessage, CompletionClient, CompletionError, CompletionOutcome, CompletionRequest,
};
use crate::prompts;

#[derive(Debug, Error)]
pub enum ClassifierError {
    #[error(transparent)]
    Completion(#[from] CompletionError),
    #[error(transparent)]
    Schema(#[from] SchemaError),
}

/// Produces a relevance classification for one user input. The classification
/// model is external; implementations must hand back only payloads that
/// passed [`parse_guardrail_output`].
#[async_trait]
pub trait GuardrailClassifier: Send + Sync {
    async fn classify(&self, input: &str) -> Result<GuardrailOutput, ClassifierError>;
}

/// Classifier backed by a completion engine instructed to reply with a single
/// JSON object matching the GuardrailOutput shape.
pub struct LlmGuardrailClassifier<C> {
    client: C,
}

impl<C> LlmGuardrailClassifier<C>
where
    C: CompletionClient,
{
    pub fn new(client: C) -> Self {
        Self { client }
    }
}

#[async_trait]
impl<C> GuardrailClassifier for LlmGuardrailClassifier<C>
where
    C: CompletionClient,
{
    async fn classify(&self, input: &str) -> Result<GuardrailOutput, ClassifierError> {
        let request = CompletionRequest {
            messages: vec![
                ChatMessage::system(prompts::GUARDRAIL_INSTRUCTIONS),
                ChatMessage::user(input),
            ],
            tools: Vec::new(),
        };

        let text = match self.client.complete(request).await? {
            CompletionOutcome::Final(text) => text,
            CompletionOutcome::ToolCalls(_) => {
                return Err(CompletionError::Malformed(
                    "classifier requested a tool instead of replying".to_string(),
                )
                .into());
            }
        };

        let payload: Value = serde_json::from_str(text.trim())
            .map_err(|error| ClassifierError::Schema(SchemaError::Shape(error)))?;
        Ok(parse_guardrail_output(&payload)?)
    }
}

/// Gate verdict for one submission.
#[derive(Clone, Debug, PartialEq)]
pub enum GateDecision {
    Allowed,
    Rejected { category: GuardrailCategory, message: String },
}

/// Applies the configured guardrail policy to a classification. Any failure
/// on the classification path collapses to the conservative `Irrelevant`
/// outcome: an untrusted payload must never open the gate.
pub struct GuardrailGate {
    config: GuardrailConfig,
}

impl GuardrailGate {
    pub fn new(config: GuardrailConfig) -> Self {
        Self { config }
    }

    pub async fn evaluate(
        &self,
        classifier: Option<&dyn GuardrailClassifier>,
        input: &str,
        language: Language,
    ) -> GateDecision {
        if !self.config.enabled {
            return GateDecision::Allowed;
        }

        let Some(classifier) = classifier else {
            // Engine-less deployments have no classifier to consult; there is
            // also no engine behind the gate to protect.
            debug!("guardrail enabled but no classifier wired, allowing input");
            return GateDecision::Allowed;
        };

        let output = match classifier.classify(input).await {
            Ok(output) => output,
            Err(error) => {
                warn!(error = %error, "guardrail classification failed, rejecting conservatively");
                GuardrailOutput::conservative(error.to_string())
            }
        };

        let category = output.effective_category(&self.config);
        if output.is_relevant && is_category_allowed(category, &self.config) {
            GateDecision::Allowed
        } else {
            GateDecision::Rejected {
                category,
                message: rejection_message(category, &self.config, language),
            }
        }
    }
}
