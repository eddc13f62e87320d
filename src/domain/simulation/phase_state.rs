//! Per-session phase bookkeeping.

use serde::{Deserialize, Serialize};

use super::events::{DISPATCHER_AUTHOR, USER_AUTHOR};
use super::outputs::{Feedback, ProblemSummary, SimulationConfig};
use super::phase::{deserialize_phase_lenient, Phase};

/// One transcript line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub speaker: String,
    pub message: String,
    #[serde(default, deserialize_with = "deserialize_phase_lenient")]
    pub phase: Phase,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub turn: Option<u32>,
}

impl HistoryEntry {
    pub fn is_from_user(&self) -> bool {
        self.speaker == USER_AUTHOR
    }

    pub fn is_from_dispatcher(&self) -> bool {
        self.speaker == DISPATCHER_AUTHOR
    }
}

/// Everything the responders know about a conversation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PhaseState {
    #[serde(default, deserialize_with = "deserialize_phase_lenient")]
    pub current_phase: Phase,
    #[serde(default)]
    pub problem_summary: Option<ProblemSummary>,
    #[serde(default)]
    pub simulation_config: Option<SimulationConfig>,
    #[serde(default)]
    pub feedback: Option<Feedback>,
    #[serde(default)]
    pub conversation_history: Vec<HistoryEntry>,
    /// User messages received while in the simulation phase.
    #[serde(default)]
    pub turn_count: u32,
    #[serde(default)]
    pub simulation_history: Vec<HistoryEntry>,
}

impl PhaseState {
    /// Turn ceiling for the simulation: the negotiated value, else `default`.
    pub fn max_turns(&self, default: u32) -> u32 {
        self.simulation_config
            .as_ref()
            .and_then(|config| config.max_turns)
            .unwrap_or(default)
    }

    /// Persona the Actor should play, as requested by the Coordinator.
    pub fn requested_persona(&self) -> Option<&str> {
        self.simulation_config
            .as_ref()
            .map(|config| config.target_persona.as_str())
    }

    /// The simulation transcript as `speaker (turn n): message` lines.
    pub fn simulation_transcript(&self) -> String {
        self.simulation_history
            .iter()
            .map(|entry| match entry.turn {
                Some(turn) => format!("{} (turn {}): {}", entry.speaker, turn, entry.message),
                None => format!("{}: {}", entry.speaker, entry.message),
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// History entries recorded while in `phase`.
    pub fn history_for(&self, phase: Phase) -> impl Iterator<Item = &HistoryEntry> {
        self.conversation_history
            .iter()
            .filter(move |entry| entry.phase == phase)
    }
}
