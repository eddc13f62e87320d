//! AI Provider Adapters.
//!
//! Implementations of the AIProvider port.
//!
//! ## Available Adapters
//!
//! - `GeminiProvider` - Google Gemini models via generateContent
//! - `OpenAIProvider` - OpenAI-compatible chat completions
//! - `ResilientProvider` - Wrapper adding a per-attempt timeout and bounded retry
//! - `MockAIProvider` - Scripted mock for testing

mod gemini_provider;
mod mock_provider;
mod openai_provider;
mod resilient_provider;

pub use gemini_provider::{GeminiConfig, GeminiProvider, GEMINI_BASE_URL};
pub use mock_provider::{MockAIProvider, MockResponse, DEFAULT_MOCK_REPLY};
pub use openai_provider::{OpenAIConfig, OpenAIProvider, OPENAI_BASE_URL};
pub use resilient_provider::{ResilientProvider, DEFAULT_MAX_ATTEMPTS, DEFAULT_TIMEOUT};
