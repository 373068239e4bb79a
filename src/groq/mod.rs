//! Groq LLM integration module
//!
//! Client for Groq's OpenAI-compatible chat completions API, plus the
//! `CompletionBackend` trait the agent loop consumes.

pub mod client;

pub use client::{
    ChatMessage, CompletionBackend, GroqClient, ProviderError, DEFAULT_BASE_URL,
    DEFAULT_CODE_MODEL, DEFAULT_REASONING_MODEL,
};
