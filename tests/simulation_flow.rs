//! End-to-end tests for a simulated conversation.
//!
//! Drives the handlers with a scripted completion provider, the shipped
//! persona files and a file-backed session store.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use corp_sim::adapters::ai::{MockAIProvider, ResilientProvider};
use corp_sim::adapters::persona::{CachingPersonaRepository, YamlPersonaRepository};
use corp_sim::adapters::storage::FileSessionStore;
use corp_sim::application::{
    AdvanceSessionCommand, AdvanceSessionError, AdvanceSessionHandler, AdvanceSessionResult,
    DispatcherSettings, EndSessionCommand, EndSessionHandler, GetSessionStateHandler,
    GetSessionStateQuery, StartSessionCommand, StartSessionHandler, TurnDispatcher,
};
use corp_sim::domain::foundation::SessionKey;
use corp_sim::domain::simulation::{Phase, SimulationError, DISPATCHER_AUTHOR};
use corp_sim::ports::{AIError, AIProvider, PersonaRepository, SessionStore};

const SUMMARY_REPLY: &str = r#"{
    "reply": "Thanks, that is a clear picture.",
    "problem_summary": {
        "problem": "Month-end close takes nine days",
        "proposed_solution": "Automate bank reconciliations",
        "key_benefit": "Close in three days",
        "core_challenge": "The CFO distrusts IT projects",
        "preliminary_advice": "Lead with hours saved and payback"
    }
}"#;

const COORDINATOR_QUESTION: &str =
    r#"{"reply": "Tell me how Stephen usually reacts to proposals.", "simulation_config": null}"#;

const COORDINATOR_CONFIG: &str = r#"{
    "reply": "Great. Say ready when you want to begin.",
    "simulation_config": {
        "target_persona": "Stephen",
        "persona_description": "Direct CFO who hates jargon",
        "meeting_context": "Quarterly budget review",
        "max_turns": 3
    }
}"#;

const FEEDBACK_REPLY: &str = r#"{
    "what_went_well": ["You quantified the nine-day close"],
    "areas_for_improvement": ["The payback claim had no numbers behind it"],
    "actionable_suggestions": ["Bring a one-page cost and payback estimate"]
}"#;

fn personas_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("personas")
}

fn key() -> SessionKey {
    SessionKey::parse("corp_sim", "test_user", "session_123").unwrap()
}

struct Harness {
    store: Arc<FileSessionStore>,
    advance: AdvanceSessionHandler,
    _dir: tempfile::TempDir,
}

impl Harness {
    async fn new(provider: Arc<dyn AIProvider>) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(FileSessionStore::new(dir.path()));
        let personas = Arc::new(CachingPersonaRepository::new(YamlPersonaRepository::new(
            personas_dir(),
        )));
        let dispatcher = TurnDispatcher::new(provider, personas, DispatcherSettings::default());

        StartSessionHandler::new(store.clone())
            .handle(StartSessionCommand { key: key() })
            .await
            .unwrap();

        Self {
            advance: AdvanceSessionHandler::new(store.clone(), Arc::new(dispatcher)),
            store,
            _dir: dir,
        }
    }

    async fn say(&self, message: &str) -> Result<AdvanceSessionResult, AdvanceSessionError> {
        self.advance
            .handle(AdvanceSessionCommand {
                key: key(),
                message: message.to_string(),
            })
            .await
    }
}

#[tokio::test]
async fn full_conversation_walks_all_four_phases() {
    let provider = MockAIProvider::new()
        .with_response(SUMMARY_REPLY)
        .with_response(COORDINATOR_QUESTION)
        .with_response(COORDINATOR_CONFIG)
        .with_response("Make it quick. What is this going to cost me?")
        .with_response("Three days sounds nice. What does the software cost?")
        .with_response("A year is a long time. Show me the numbers.")
        .with_response(FEEDBACK_REPLY)
        .with_response("Open with the cost of the nine-day close, then the payback.");
    let harness = Harness::new(Arc::new(provider.clone())).await;

    let result = harness
        .say("Our month-end close takes nine days and I want to automate it")
        .await
        .unwrap();
    assert_eq!(result.phase, Phase::Listener);
    assert!(result.events[0].text.contains("**Problem:** Month-end close takes nine days"));

    let result = harness.say("Great, let's practice this").await.unwrap();
    assert_eq!(result.phase, Phase::Coordinator);
    assert_eq!(result.events.len(), 2);
    assert_eq!(result.events[0].author, DISPATCHER_AUTHOR);
    assert_eq!(result.events[1].author, "Coordinator");

    let result = harness.say("Stephen is blunt and hates jargon").await.unwrap();
    assert_eq!(result.phase, Phase::Coordinator);
    assert!(result.events.iter().all(|e| !e.is_from_dispatcher()));

    let result = harness.say("I'm ready").await.unwrap();
    assert_eq!(result.phase, Phase::Simulation);
    assert_eq!(
        result.events[0].text,
        "**Phase Transition:** Entering simulation mode. The Actor will now respond as Stephen."
    );
    assert_eq!(result.events[1].author, "Actor_Stephen");

    harness.say("We can cut the close to three days").await.unwrap();
    let result = harness.say("It pays back within a year").await.unwrap();
    assert_eq!(result.phase, Phase::Simulation);

    // Third simulated turn reaches the negotiated ceiling of three.
    let result = harness.say("Thanks for your time").await.unwrap();
    assert_eq!(result.phase, Phase::Feedback);
    assert_eq!(
        result.events[0].text,
        "**Phase Transition:** Simulation ended. Moving to feedback and debrief."
    );
    assert!(result.events[1].text.contains("- You quantified the nine-day close"));

    let result = harness.say("What should I open with next time?").await.unwrap();
    assert_eq!(result.phase, Phase::Feedback);
    assert_eq!(
        result.events[0].text,
        "Open with the cost of the nine-day close, then the payback."
    );
    assert_eq!(provider.remaining(), 0);

    let session = harness.store.load(&key()).await.unwrap();
    let state = &session.phase_state;
    assert_eq!(state.turn_count, 3);
    assert!(state.problem_summary.is_some());
    assert_eq!(state.simulation_config.as_ref().unwrap().max_turns, Some(3));
    assert!(state.feedback.is_some());
    assert_eq!(session.processed, session.events.len());

    let turns: Vec<u32> = state
        .simulation_history
        .iter()
        .map(|entry| entry.turn.unwrap())
        .collect();
    assert_eq!(turns, vec![0, 1, 1, 2, 2, 3]);
    assert!(state
        .simulation_history
        .iter()
        .all(|entry| !entry.is_from_dispatcher()));

    // The facilitator saw the recorded transcript.
    let feedback_call = &provider.get_calls()[6];
    let prompt = feedback_call.system_prompt.as_ref().unwrap();
    assert!(prompt.contains("user (turn 1): We can cut the close to three days"));
}

#[tokio::test]
async fn service_failure_leaves_history_unchanged() {
    let provider = MockAIProvider::new()
        .with_response(r#"{"reply": "What slows the close down?", "problem_summary": null}"#)
        .with_error(AIError::unavailable("model overloaded"));
    let harness = Harness::new(Arc::new(provider)).await;

    harness.say("Our close is slow").await.unwrap();
    let before = harness.store.load(&key()).await.unwrap();

    let err = harness.say("Let's rehearse the pitch").await.unwrap_err();

    assert!(matches!(
        err,
        AdvanceSessionError::Simulation(SimulationError::ServiceUnavailable(_))
    ));
    let after = harness.store.load(&key()).await.unwrap();
    assert_eq!(
        after.phase_state.conversation_history.len(),
        before.phase_state.conversation_history.len()
    );
    assert_eq!(after.current_phase(), Phase::Listener);
    assert_eq!(after, before);
}

#[tokio::test]
async fn resilient_provider_recovers_from_one_transient_failure() {
    let mock = MockAIProvider::new()
        .with_error(AIError::rate_limited(1))
        .with_response(r#"{"reply": "Tell me more.", "problem_summary": null}"#);
    let provider = ResilientProvider::new(mock.clone())
        .with_timeout(Duration::from_secs(5))
        .with_base_backoff(Duration::ZERO);
    let harness = Harness::new(Arc::new(provider)).await;

    let result = harness.say("Our close is slow").await.unwrap();

    assert_eq!(result.events[0].text, "Tell me more.");
    assert_eq!(mock.call_count(), 2);
}

#[tokio::test]
async fn malformed_structured_output_is_retried_then_reported() {
    let provider = MockAIProvider::new()
        .with_response("I think I understand your problem.")
        .with_response(r#"{"reply": "Understood. How many people work on the close?"}"#)
        .with_response("still not json")
        .with_response("nor this");
    let harness = Harness::new(Arc::new(provider.clone())).await;

    let result = harness.say("Our close is slow").await.unwrap();
    assert_eq!(result.events[0].text, "Understood. How many people work on the close?");
    assert_eq!(provider.call_count(), 2);

    let err = harness.say("About six accountants").await.unwrap_err();
    assert!(matches!(
        err,
        AdvanceSessionError::Simulation(SimulationError::MalformedStructuredOutput { .. })
    ));
    let session = harness.store.load(&key()).await.unwrap();
    assert_eq!(session.phase_state.conversation_history.len(), 2);
}

#[tokio::test]
async fn shipped_personas_load_idempotently() {
    let personas = CachingPersonaRepository::new(YamlPersonaRepository::new(personas_dir()));

    let first = personas.load("cto_jack").await.unwrap();
    let second = personas.load("CTO Jack").await.unwrap();
    assert_eq!(first, second);
    assert_eq!(first.name, "Jack");

    let err: SimulationError = personas.load("nonexistent_persona").await.unwrap_err().into();
    assert_eq!(err, SimulationError::PersonaNotFound("nonexistent_persona".to_string()));

    let available = personas.list().await.unwrap();
    assert_eq!(available, vec!["cto_jack", "pm_bob", "stephen"]);
}

#[tokio::test]
async fn session_lifecycle_through_handlers() {
    let provider = MockAIProvider::new()
        .with_response(r#"{"reply": "What is the problem?", "problem_summary": null}"#);
    let harness = Harness::new(Arc::new(provider)).await;
    let store: Arc<dyn SessionStore> = harness.store.clone();

    harness.say("Hello").await.unwrap();
    let state = GetSessionStateHandler::new(store.clone())
        .handle(GetSessionStateQuery { key: key() })
        .await
        .unwrap();
    assert_eq!(state.phase, Phase::Listener);
    assert_eq!(state.event_count, 2);

    EndSessionHandler::new(store.clone())
        .handle(EndSessionCommand { key: key() })
        .await
        .unwrap();
    assert!(!store.exists(&key()).await.unwrap());
}
