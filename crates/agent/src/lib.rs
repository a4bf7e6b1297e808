//! Conversation orchestration for the Ella assistant.
//!
//! This crate is the part of the system that actually runs a turn:
//! - **Guardrail gate** (`guardrails`) - validate the relevance classification
//!   and decide whether an input reaches the completion engine at all
//! - **Completion engine client** (`llm`) - OpenAI-compatible chat completions
//!   with tool declarations
//! - **Tool execution** (`tools`) - the catalog search tool the engine may
//!   invoke mid-turn
//! - **Fallback responder** (`fallback`) - deterministic keyword rules used
//!   when no engine is configured
//! - **Turn state machine + runtime** (`conversation`, `runtime`) - one open
//!   turn per conversation, append-before-network, single-apology failures
//!
//! # Safety Principle
//!
//! Externally produced payloads (relevance classifications, tool arguments)
//! are schema-validated at the trust boundary and fail conservative: a payload
//! that does not conform is never treated as an allowed classification or a
//! usable tool input.

pub mod conversation;
pub mod fallback;
pub mod guardrails;
pub mod llm;
pub mod prompts;
pub mod runtime;
pub mod tools;
