use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Languages the assistant speaks. The active language is chosen per
/// submission by the embedding page and defaults from configuration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    De,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unsupported language `{0}` (expected en|de)")]
pub struct LanguageParseError(String);

impl std::str::FromStr for Language {
    type Err = LanguageParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "en" => Ok(Self::En),
            "de" => Ok(Self::De),
            other => Err(LanguageParseError(other.to_string())),
        }
    }
}

/// Fixed user-visible texts, one set per language. Anything the assistant can
/// say without a completion engine lives here so wording stays reviewable.
pub struct FixedTexts {
    pub welcome: &'static str,
    pub apology: &'static str,
    pub rejection_irrelevant: &'static str,
    pub rejection_generic: &'static str,
}

const TEXTS_EN: FixedTexts = FixedTexts {
    welcome: "Hello! I'm Ella, your personal integration assistant. I'm here to help you \
              discover how com:con's Business Automation Framework (BAF) can streamline your \
              business operations. What would you like to know?",
    apology: "I'm sorry, something went wrong on my end. Please send your message again in a \
              moment.",
    rejection_irrelevant: "I'm designed to help with business integration and com:con \
                           solutions. Could you ask about connecting your business systems \
                           instead?",
    rejection_generic: "I focus on business solutions and system integration. How can I help \
                        with your company's integration needs?",
};

const TEXTS_DE: FixedTexts = FixedTexts {
    welcome: "Hallo! Ich bin Ella, Ihr persönlicher Integrations-Assistent. Ich helfe Ihnen \
              dabei zu entdecken, wie com:cons Business Automation Framework (BAF) Ihre \
              Geschäftsprozesse optimieren kann. Was möchten Sie wissen?",
    apology: "Es tut mir leid, bei mir ist etwas schiefgelaufen. Bitte senden Sie Ihre \
              Nachricht gleich noch einmal.",
    rejection_irrelevant: "Ich bin darauf ausgelegt, bei Geschäftsintegration und \
                           com:con-Lösungen zu helfen. Möchten Sie stattdessen etwas zur \
                           Vernetzung Ihrer Geschäftssysteme fragen?",
    rejection_generic: "Ich konzentriere mich auf Geschäftslösungen und Systemintegration. \
                        Wie kann ich bei den Integrationsanforderungen Ihres Unternehmens \
                        helfen?",
};

pub fn texts(language: Language) -> &'static FixedTexts {
    match language {
        Language::En => &TEXTS_EN,
        Language::De => &TEXTS_DE,
    }
}
