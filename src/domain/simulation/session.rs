//! Session aggregate.
//!
//! A session owns the ordered event log of one conversation and the
//! `PhaseState` derived from it. History is synced from the log incrementally:
//! `processed` is the index of the first event not yet copied into the
//! transcripts, so syncing twice never duplicates an entry.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::foundation::SessionKey;

use super::events::DISPATCHER_AUTHOR;
use super::phase::{deserialize_phase_lenient, Phase};
use super::phase_state::{HistoryEntry, PhaseState};

/// One message in the session log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionEvent {
    pub author: String,
    pub text: String,
    /// Phase current when the event was appended.
    #[serde(default, deserialize_with = "deserialize_phase_lenient")]
    pub phase: Phase,
    /// Simulation turn, for events appended during the simulation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub turn: Option<u32>,
    pub recorded_at: DateTime<Utc>,
}

/// Per-conversation state, keyed by `(app_id, user_id, session_id)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub key: SessionKey,
    #[serde(default)]
    pub events: Vec<SessionEvent>,
    #[serde(default)]
    pub phase_state: PhaseState,
    /// High-water mark into `events`.
    #[serde(default)]
    pub processed: usize,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Session {
    pub fn new(key: SessionKey) -> Self {
        let now = Utc::now();
        Self {
            key,
            events: Vec::new(),
            phase_state: PhaseState::default(),
            processed: 0,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn current_phase(&self) -> Phase {
        self.phase_state.current_phase
    }

    /// Appends an event stamped with the current phase.
    pub fn append(&mut self, author: impl Into<String>, text: impl Into<String>) {
        let phase = self.phase_state.current_phase;
        self.append_in(phase, author, text);
    }

    /// Appends an event stamped with `phase`. Events in the simulation also
    /// carry the current turn count.
    pub fn append_in(&mut self, phase: Phase, author: impl Into<String>, text: impl Into<String>) {
        let turn = (phase == Phase::Simulation).then_some(self.phase_state.turn_count);
        let now = Utc::now();
        self.events.push(SessionEvent {
            author: author.into(),
            text: text.into(),
            phase,
            turn,
            recorded_at: now,
        });
        self.updated_at = now;
    }

    /// Events not yet copied into the transcripts.
    pub fn pending_events(&self) -> &[SessionEvent] {
        self.events.get(self.processed..).unwrap_or_default()
    }

    /// Copies pending events into the phase state transcripts and advances the
    /// high-water mark. Returns the number of events consumed.
    pub fn sync_history(&mut self) -> usize {
        let start = self.processed.min(self.events.len());
        let state = &mut self.phase_state;

        for event in &self.events[start..] {
            if event.text.trim().is_empty() {
                continue;
            }
            let entry = HistoryEntry {
                speaker: event.author.clone(),
                message: event.text.clone(),
                phase: event.phase,
                turn: event.turn,
            };
            if event.phase == Phase::Simulation && event.author != DISPATCHER_AUTHOR {
                state.simulation_history.push(entry.clone());
            }
            state.conversation_history.push(entry);
        }

        let consumed = self.events.len() - start;
        self.processed = self.events.len();
        consumed
    }
}
