//! Persona Adapters
//!
//! - **YamlPersonaRepository** - Reads persona records from YAML files
//! - **CachingPersonaRepository** - Process-lifetime memoization decorator

mod caching_persona_repository;
mod yaml_persona_repository;

pub use caching_persona_repository::CachingPersonaRepository;
pub use yaml_persona_repository::YamlPersonaRepository;
