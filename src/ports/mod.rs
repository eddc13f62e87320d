//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! - `AIProvider` - Hosted completion service
//! - `PersonaRepository` - Read-only persona records
//! - `SessionStore` - Sessions kept between turns

mod ai_provider;
mod persona_repository;
mod session_store;

pub use ai_provider::{
    AIError, AIProvider, CompletionRequest, CompletionResponse, FinishReason, Message,
    MessageRole, ProviderInfo, RequestMetadata, ResponseSchema, TokenUsage,
};
pub use persona_repository::{PersonaRepository, PersonaRepositoryError};
pub use session_store::{SessionStore, SessionStoreError};
