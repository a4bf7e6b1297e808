pub mod connector;
pub mod guardrail;
pub mod message;
