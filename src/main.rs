//! Corp Sim command-line runner
//!
//! Starts one session and reads user turns from stdin, printing every output
//! event. `/state` shows the phase state, `/quit` ends the session.

use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use corp_sim::adapters::ai::{
    GeminiConfig, GeminiProvider, OpenAIConfig, OpenAIProvider, ResilientProvider,
};
use corp_sim::adapters::persona::{CachingPersonaRepository, YamlPersonaRepository};
use corp_sim::adapters::storage::{FileSessionStore, InMemorySessionStore};
use corp_sim::application::{
    AdvanceSessionCommand, AdvanceSessionHandler, EndSessionCommand, EndSessionHandler,
    GetSessionStateHandler, GetSessionStateQuery, StartSessionCommand, StartSessionHandler,
    TurnDispatcher,
};
use corp_sim::config::{AiConfig, AiProvider, AppConfig};
use corp_sim::domain::foundation::{AppId, SessionId, SessionKey, UserId};
use corp_sim::ports::{AIError, AIProvider, SessionStore};

const CLI_USER: &str = "test_user";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let config = AppConfig::load()?;
    config.validate()?;

    let provider = build_provider(&config.ai)?;
    let personas = Arc::new(CachingPersonaRepository::new(YamlPersonaRepository::new(
        &config.simulation.personas_dir,
    )));
    let store: Arc<dyn SessionStore> = match &config.simulation.session_dir {
        Some(dir) => {
            tracing::info!(path = %dir.display(), "Storing sessions on disk");
            Arc::new(FileSessionStore::new(dir))
        }
        None => Arc::new(InMemorySessionStore::new()),
    };
    let dispatcher = Arc::new(TurnDispatcher::new(
        provider,
        personas,
        config.dispatcher_settings(),
    ));

    let key = SessionKey::new(
        AppId::new(&config.simulation.app_name)?,
        UserId::new(CLI_USER)?,
        SessionId::generate(),
    );
    StartSessionHandler::new(store.clone())
        .handle(StartSessionCommand { key: key.clone() })
        .await?;
    let advance = AdvanceSessionHandler::new(store.clone(), dispatcher);

    println!("Session {} started. Describe the problem you want help with.", key);
    println!("Commands: /state, /quit");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let message = line.trim();
        match message {
            "" => continue,
            "/quit" => break,
            "/state" => {
                let result = GetSessionStateHandler::new(store.clone())
                    .handle(GetSessionStateQuery { key: key.clone() })
                    .await?;
                println!(
                    "[phase: {} | turns: {} | events: {}]",
                    result.phase.label(),
                    result.state.turn_count,
                    result.event_count
                );
                continue;
            }
            _ => {}
        }

        match advance
            .handle(AdvanceSessionCommand {
                key: key.clone(),
                message: message.to_string(),
            })
            .await
        {
            Ok(result) => {
                for event in result.events {
                    println!("\n{}: {}", event.author, event.text);
                }
                println!();
            }
            Err(err) => eprintln!("\n[error] {}\n", err),
        }
    }

    EndSessionHandler::new(store)
        .handle(EndSessionCommand { key })
        .await?;
    Ok(())
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "corp_sim=info".into());
    let json = std::env::var("CORP_SIM_LOG_JSON").is_ok_and(|v| v == "1");

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn build_provider(ai: &AiConfig) -> Result<Arc<dyn AIProvider>, AIError> {
    let api_key = ai
        .api_key()
        .ok_or_else(|| AIError::InvalidRequest("no API key configured".to_string()))?;

    let provider: Arc<dyn AIProvider> = match ai.provider {
        AiProvider::Gemini => {
            let mut gemini = GeminiConfig::new(api_key)
                .with_model(&ai.orchestrator_model)
                .with_timeout(ai.timeout());
            if let Some(url) = &ai.base_url {
                gemini = gemini.with_base_url(url);
            }
            Arc::new(
                ResilientProvider::new(GeminiProvider::new(gemini)?)
                    .with_timeout(ai.timeout())
                    .with_max_attempts(ai.max_attempts),
            )
        }
        AiProvider::OpenAI => {
            let mut openai = OpenAIConfig::new(api_key)
                .with_model(&ai.orchestrator_model)
                .with_timeout(ai.timeout());
            if let Some(url) = &ai.base_url {
                openai = openai.with_base_url(url);
            }
            Arc::new(
                ResilientProvider::new(OpenAIProvider::new(openai)?)
                    .with_timeout(ai.timeout())
                    .with_max_attempts(ai.max_attempts),
            )
        }
    };

    tracing::info!(
        provider = %provider.provider_info().name,
        orchestrator_model = %ai.orchestrator_model,
        persona_model = %ai.persona_model,
        "Completion provider ready"
    );
    Ok(provider)
}
