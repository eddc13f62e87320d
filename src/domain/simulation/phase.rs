//! Conversation phases.
//!
//! A conversation walks `Listener → Coordinator → Simulation → Feedback` and
//! never moves backwards. `Feedback` is terminal.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

use super::errors::SimulationError;
use crate::domain::foundation::{StateMachine, ValidationError};

/// The stage a conversation is in.
///
/// Variants are declared in conversation order, so the derived `Ord` is the
/// forward order of the state machine.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// Problem intake and summarization.
    #[default]
    Listener,
    /// Negotiating the persona and meeting setup.
    Coordinator,
    /// Role-play with the persona.
    Simulation,
    /// Structured debrief.
    Feedback,
}

impl Phase {
    /// All phases in forward order.
    pub const ALL: [Phase; 4] = [
        Phase::Listener,
        Phase::Coordinator,
        Phase::Simulation,
        Phase::Feedback,
    ];

    /// Wire name used in persisted state.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Listener => "listener",
            Self::Coordinator => "coordinator",
            Self::Simulation => "simulation",
            Self::Feedback => "feedback",
        }
    }

    /// Short label suitable for display.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Listener => "Problem definition",
            Self::Coordinator => "Simulation setup",
            Self::Simulation => "Simulation",
            Self::Feedback => "Feedback and debrief",
        }
    }

    /// The phase that follows this one, if any.
    pub fn next(&self) -> Option<Phase> {
        match self {
            Self::Listener => Some(Self::Coordinator),
            Self::Coordinator => Some(Self::Simulation),
            Self::Simulation => Some(Self::Feedback),
            Self::Feedback => None,
        }
    }

    /// Parses a persisted phase name. A missing or unrecognized value is an
    /// `InvalidPhaseState` naming `Listener` as the phase to resume from.
    pub fn parse_persisted(value: Option<&str>) -> Result<Phase, SimulationError> {
        let reason = match value {
            None => "current phase is missing".to_string(),
            Some(raw) => match raw.parse::<Phase>() {
                Ok(phase) => return Ok(phase),
                Err(err) => err.to_string(),
            },
        };
        Err(SimulationError::InvalidPhaseState {
            phase: Phase::Listener,
            reason,
        })
    }
}

impl StateMachine for Phase {
    fn can_transition_to(&self, target: &Self) -> bool {
        self.valid_transitions().contains(target)
    }

    fn valid_transitions(&self) -> Vec<Self> {
        self.next().into_iter().collect()
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Phase {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "listener" => Ok(Self::Listener),
            "coordinator" => Ok(Self::Coordinator),
            "simulation" => Ok(Self::Simulation),
            "feedback" => Ok(Self::Feedback),
            other => Err(ValidationError::invalid_format(
                "phase",
                format!("unknown phase '{}'", other),
            )),
        }
    }
}

/// Serde helper for persisted phase fields: unknown values reset to
/// `Listener` instead of failing the whole load.
pub(crate) fn deserialize_phase_lenient<'de, D>(deserializer: D) -> Result<Phase, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    match Phase::parse_persisted(raw.as_deref()) {
        Ok(phase) => Ok(phase),
        Err(err) => {
            tracing::warn!(error = %err, "Recovering phase state");
            Ok(Phase::Listener)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_phase_is_listener() {
        assert_eq!(Phase::default(), Phase::Listener);
    }

    #[test]
    fn phases_are_ordered_forward() {
        assert!(Phase::Listener < Phase::Coordinator);
        assert!(Phase::Coordinator < Phase::Simulation);
        assert!(Phase::Simulation < Phase::Feedback);
    }

    #[test]
    fn serializes_to_lowercase() {
        let json = serde_json::to_string(&Phase::Coordinator).unwrap();
        assert_eq!(json, "\"coordinator\"");
    }

    #[test]
    fn only_the_next_phase_is_reachable() {
        assert!(Phase::Listener.can_transition_to(&Phase::Coordinator));
        assert!(!Phase::Listener.can_transition_to(&Phase::Simulation));
        assert!(!Phase::Simulation.can_transition_to(&Phase::Coordinator));
        assert!(Phase::Coordinator.transition_to(Phase::Listener).is_err());
    }

    #[test]
    fn feedback_is_terminal() {
        assert!(Phase::Feedback.is_terminal());
        for phase in &Phase::ALL[..3] {
            assert!(!phase.is_terminal());
        }
    }

    #[test]
    fn from_str_is_case_insensitive() {
        assert_eq!("Simulation".parse::<Phase>().unwrap(), Phase::Simulation);
        assert!("debrief".parse::<Phase>().is_err());
    }

    #[test]
    fn persisted_phase_is_parsed_or_reported() {
        assert_eq!(Phase::parse_persisted(Some("feedback")), Ok(Phase::Feedback));

        match Phase::parse_persisted(Some("warp_speed")) {
            Err(SimulationError::InvalidPhaseState { phase, reason }) => {
                assert_eq!(phase, Phase::Listener);
                assert!(reason.contains("warp_speed"));
            }
            other => panic!("unexpected result: {other:?}"),
        }
        assert!(matches!(
            Phase::parse_persisted(None),
            Err(SimulationError::InvalidPhaseState { phase: Phase::Listener, .. })
        ));
    }
}
