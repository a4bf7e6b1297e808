//! Core domain types for the Ella assistant service.
//!
//! This crate holds everything the other crates agree on: the conversation
//! message model, the guardrail classification contract, the connector read
//! model, localized fixed texts, the layered application configuration, and
//! the error taxonomy. It performs no I/O.

pub mod config;
pub mod domain;
pub mod errors;
pub mod i18n;

pub use domain::connector::ConnectorRecord;
pub use domain::guardrail::{
    is_category_allowed, parse_guardrail_config, parse_guardrail_output, rejection_message,
    GuardrailCategory, GuardrailConfig, GuardrailOutput, SchemaError,
};
pub use domain::message::{Message, MessageId, Sender};
pub use errors::{ApplicationError, DomainError, InterfaceError};
pub use i18n::Language;
