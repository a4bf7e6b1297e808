use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::i18n::{self, Language};

/// Relevance categories the classifier may assign. The set is closed: any
/// other value fails schema validation at the trust boundary.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GuardrailCategory {
    BusinessIntegration,
    ProductInquiry,
    LeadGeneration,
    WorkflowAutomation,
    Irrelevant,
}

impl GuardrailCategory {
    pub const ALL: [GuardrailCategory; 5] = [
        Self::BusinessIntegration,
        Self::ProductInquiry,
        Self::LeadGeneration,
        Self::WorkflowAutomation,
        Self::Irrelevant,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BusinessIntegration => "business-integration",
            Self::ProductInquiry => "product-inquiry",
            Self::LeadGeneration => "lead-generation",
            Self::WorkflowAutomation => "workflow-automation",
            Self::Irrelevant => "irrelevant",
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown guardrail category `{0}`")]
pub struct CategoryParseError(String);

impl std::str::FromStr for GuardrailCategory {
    type Err = CategoryParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|category| category.as_str() == normalized)
            .ok_or(CategoryParseError(normalized))
    }
}

/// Classification produced by the guardrail model. Externally sourced, so it
/// must pass [`parse_guardrail_output`] before an allow decision may use it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuardrailOutput {
    pub is_relevant: bool,
    pub reasoning: String,
    pub category: GuardrailCategory,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
}

impl GuardrailOutput {
    /// Conservative substitute used whenever a real classification cannot be
    /// trusted (classifier unreachable, payload failed validation).
    pub fn conservative(reasoning: impl Into<String>) -> Self {
        Self {
            is_relevant: false,
            reasoning: reasoning.into(),
            category: GuardrailCategory::Irrelevant,
            confidence: None,
        }
    }

    /// Category after strict-mode discounting: a classification whose
    /// confidence is present but below the configured threshold is not
    /// trusted for an allow decision and collapses to `Irrelevant`.
    pub fn effective_category(&self, config: &GuardrailConfig) -> GuardrailCategory {
        if config.strict_mode {
            if let Some(confidence) = self.confidence {
                if confidence < config.confidence_threshold {
                    return GuardrailCategory::Irrelevant;
                }
            }
        }
        self.category
    }
}

/// Gate configuration, in the external wire shape.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuardrailConfig {
    pub enabled: bool,
    pub strict_mode: bool,
    pub confidence_threshold: f64,
    pub allowed_categories: Vec<GuardrailCategory>,
    #[serde(default)]
    pub custom_rejection_messages: HashMap<GuardrailCategory, String>,
}

impl Default for GuardrailConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            strict_mode: false,
            confidence_threshold: 0.7,
            allowed_categories: vec![
                GuardrailCategory::BusinessIntegration,
                GuardrailCategory::ProductInquiry,
                GuardrailCategory::LeadGeneration,
                GuardrailCategory::WorkflowAutomation,
            ],
            custom_rejection_messages: HashMap::new(),
        }
    }
}

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("payload does not match the declared shape: {0}")]
    Shape(#[from] serde_json::Error),
    #[error("confidence {0} is outside the [0, 1] range")]
    ConfidenceRange(f64),
    #[error("confidence threshold {0} is outside the [0, 1] range")]
    ThresholdRange(f64),
}

/// Validates an externally produced classification against the declared
/// shape. Callers must treat any error as a rejected classification, never as
/// an allowed one.
pub fn parse_guardrail_output(value: &Value) -> Result<GuardrailOutput, SchemaError> {
    let output: GuardrailOutput = serde_json::from_value(value.clone())?;
    if let Some(confidence) = output.confidence {
        if !(0.0..=1.0).contains(&confidence) {
            return Err(SchemaError::ConfidenceRange(confidence));
        }
    }
    Ok(output)
}

/// Validates an externally supplied gate configuration.
pub fn parse_guardrail_config(value: &Value) -> Result<GuardrailConfig, SchemaError> {
    let config: GuardrailConfig = serde_json::from_value(value.clone())?;
    if !(0.0..=1.0).contains(&config.confidence_threshold) {
        return Err(SchemaError::ThresholdRange(config.confidence_threshold));
    }
    Ok(config)
}

pub fn is_category_allowed(category: GuardrailCategory, config: &GuardrailConfig) -> bool {
    config.allowed_categories.contains(&category)
}

/// Rejection text for a gated-off input: configured override first, then the
/// fixed localized default for `irrelevant`, then the localized generic one.
pub fn rejection_message(
    category: GuardrailCategory,
    config: &GuardrailConfig,
    language: Language,
) -> String {
    if let Some(custom) = config.custom_rejection_messages.get(&category) {
        return custom.clone();
    }

    let texts = i18n::texts(language);
    match category {
        GuardrailCategory::Irrelevant => texts.rejection_irrelevant.to_string(),
        _ => texts.rejection_generic.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::i18n::{self, Language};

    use super::{
        is_category_allowed, parse_guardrail_config, parse_guardrail_output, rejection_message,
        GuardrailCategory, GuardrailConfig, GuardrailOutput, SchemaError,
    };

    #[test]
    fn category_wire_names_round_trip() {
        for category in GuardrailCategory::ALL {
            let parsed: GuardrailCategory =
                category.as_str().parse().expect("every wire name parses");
            assert_eq!(parsed, category);
        }
        assert!("small-talk".parse::<GuardrailCategory>().is_err());
    }

    #[test]
    fn valid_output_parses_with_and_without_confidence() {
        let with_confidence = json!({
            "isRelevant": true,
            "reasoning": "asks about connecting an ERP to a CRM",
            "category": "business-integration",
            "confidence": 0.92,
        });
        let output = parse_guardrail_output(&with_confidence).expect("valid payload");
        assert!(output.is_relevant);
        assert_eq!(output.category, GuardrailCategory::BusinessIntegration);
        assert_eq!(output.confidence, Some(0.92));

        let without_confidence = json!({
            "isRelevant": false,
            "reasoning": "personal question",
            "category": "irrelevant",
        });
        let output = parse_guardrail_output(&without_confidence).expect("confidence is optional");
        assert_eq!(output.confidence, None);
    }

    #[test]
    fn malformed_output_fails_schema_validation() {
        let unknown_category = json!({
            "isRelevant": true,
            "reasoning": "?",
            "category": "small-talk",
        });
        assert!(matches!(
            parse_guardrail_output(&unknown_category),
            Err(SchemaError::Shape(_))
        ));

        let missing_reasoning = json!({"isRelevant": true, "category": "irrelevant"});
        assert!(parse_guardrail_output(&missing_reasoning).is_err());

        let out_of_range = json!({
            "isRelevant": true,
            "reasoning": "sure",
            "category": "product-inquiry",
            "confidence": 1.4,
        });
        assert!(matches!(
            parse_guardrail_output(&out_of_range),
            Err(SchemaError::ConfidenceRange(_))
        ));
    }

    #[test]
    fn config_threshold_is_range_checked() {
        let config = json!({
            "enabled": true,
            "strictMode": true,
            "confidenceThreshold": 2.5,
            "allowedCategories": ["business-integration"],
            "customRejectionMessages": {},
        });
        assert!(matches!(
            parse_guardrail_config(&config),
            Err(SchemaError::ThresholdRange(_))
        ));
    }

    #[test]
    fn category_allowed_iff_member_of_allow_list() {
        let config = GuardrailConfig {
            allowed_categories: vec![
                GuardrailCategory::BusinessIntegration,
                GuardrailCategory::LeadGeneration,
            ],
            ..GuardrailConfig::default()
        };

        for category in GuardrailCategory::ALL {
            assert_eq!(
                is_category_allowed(category, &config),
                config.allowed_categories.contains(&category),
            );
        }

        let empty = GuardrailConfig { allowed_categories: Vec::new(), ..GuardrailConfig::default() };
        assert!(GuardrailCategory::ALL.iter().all(|c| !is_category_allowed(*c, &empty)));
    }

    #[test]
    fn rejection_message_prefers_custom_then_irrelevant_then_generic() {
        let mut config = GuardrailConfig::default();
        config
            .custom_rejection_messages
            .insert(GuardrailCategory::LeadGeneration, "Please use the contact form.".to_string());

        for category in GuardrailCategory::ALL {
            let message = rejection_message(category, &config, Language::En);
            match category {
                GuardrailCategory::LeadGeneration => {
                    assert_eq!(message, "Please use the contact form.");
                }
                GuardrailCategory::Irrelevant => {
                    assert_eq!(message, i18n::texts(Language::En).rejection_irrelevant);
                }
                _ => assert_eq!(message, i18n::texts(Language::En).rejection_generic),
            }
        }
    }

    #[test]
    fn rejection_defaults_are_localized() {
        let config = GuardrailConfig::default();
        let german = rejection_message(GuardrailCategory::Irrelevant, &config, Language::De);
        assert_eq!(german, i18n::texts(Language::De).rejection_irrelevant);
    }

    #[test]
    fn strict_mode_discounts_low_confidence_classifications() {
        let config = GuardrailConfig {
            strict_mode: true,
            confidence_threshold: 0.7,
            ..GuardrailConfig::default()
        };
        let output = GuardrailOutput {
            is_relevant: true,
            reasoning: "probably about integrations".to_string(),
            category: GuardrailCategory::BusinessIntegration,
            confidence: Some(0.4),
        };

        assert_eq!(output.effective_category(&config), GuardrailCategory::Irrelevant);

        let confident = GuardrailOutput { confidence: Some(0.9), ..output.clone() };
        assert_eq!(
            confident.effective_category(&config),
            GuardrailCategory::BusinessIntegration
        );

        let lax = GuardrailConfig { strict_mode: false, ..config };
        assert_eq!(output.effective_category(&lax), GuardrailCategory::BusinessIntegration);
    }

    #[test]
    fn absent_confidence_is_not_discounted_in_strict_mode() {
        let config = GuardrailConfig { strict_mode: true, ..GuardrailConfig::default() };
        let output = GuardrailOutput {
            is_relevant: true,
            reasoning: "no confidence reported".to_string(),
            category: GuardrailCategory::ProductInquiry,
            confidence: None,
        };
        assert_eq!(output.effective_category(&config), GuardrailCategory::ProductInquiry);
    }

    #[test]
    fn conservative_output_is_never_allowed() {
        let config = GuardrailConfig::default();
        let output = GuardrailOutput::conservative("classifier unreachable");
        assert!(!output.is_relevant);
        assert!(!is_category_allowed(output.effective_category(&config), &config));
    }
}
