//! Phase Transition Evaluator.
//!
//! Decides, once per user message, whether the conversation moves to the next
//! phase. The rules are keyword triggers evaluated against the phase the
//! conversation was in when the message arrived, plus a turn ceiling for the
//! simulation.
//!
//! Keyword matching is a case-insensitive substring search, so "weekend"
//! matches the `end` trigger.

use super::persona::display_name;
use crate::domain::foundation::StateMachine;
use super::phase::Phase;
use super::phase_state::PhaseState;

/// Keyword sets that advance each non-terminal phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerTable {
    listener: Vec<String>,
    coordinator: Vec<String>,
    simulation: Vec<String>,
}

impl Default for TriggerTable {
    fn default() -> Self {
        Self {
            listener: lowercased(&["simulation", "practice", "rehearse"]),
            coordinator: lowercased(&["ready", "start", "begin"]),
            simulation: lowercased(&["end", "stop", "finish"]),
        }
    }
}

fn lowercased(words: &[&str]) -> Vec<String> {
    words.iter().map(|w| w.to_lowercase()).collect()
}

impl TriggerTable {
    /// Replaces the keywords that advance `phase`. Ignored for `Feedback`.
    pub fn with_keywords(mut self, phase: Phase, keywords: &[&str]) -> Self {
        let words = lowercased(keywords);
        match phase {
            Phase::Listener => self.listener = words,
            Phase::Coordinator => self.coordinator = words,
            Phase::Simulation => self.simulation = words,
            Phase::Feedback => {}
        }
        self
    }

    pub fn keywords_for(&self, phase: Phase) -> &[String] {
        match phase {
            Phase::Listener => &self.listener,
            Phase::Coordinator => &self.coordinator,
            Phase::Simulation => &self.simulation,
            Phase::Feedback => &[],
        }
    }

    /// Returns the first keyword for `phase` found in `message`.
    pub fn matching_keyword(&self, phase: Phase, message: &str) -> Option<&str> {
        let message = message.to_lowercase();
        self.keywords_for(phase)
            .iter()
            .find(|keyword| message.contains(keyword.as_str()))
            .map(String::as_str)
    }
}

/// Why a transition fired.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitionCause {
    Keyword(String),
    TurnCeiling { turn_count: u32, max_turns: u32 },
}

/// A forward move between adjacent phases.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub from: Phase,
    pub to: Phase,
    pub cause: TransitionCause,
}

impl Transition {
    /// The announcement shown to the user. `persona_key` names the persona the
    /// Actor will play when entering the simulation.
    pub fn announcement(&self, persona_key: &str) -> String {
        match self.to {
            Phase::Coordinator => {
                "**Phase Transition:** Moving from problem definition to simulation setup."
                    .to_string()
            }
            Phase::Simulation => format!(
                "**Phase Transition:** Entering simulation mode. The Actor will now respond as {}.",
                display_name(persona_key)
            ),
            Phase::Feedback => {
                "**Phase Transition:** Simulation ended. Moving to feedback and debrief."
                    .to_string()
            }
            Phase::Listener => String::new(),
        }
    }
}

/// Applies the transition rules to a phase state.
#[derive(Debug, Clone)]
pub struct PhaseTransitionEvaluator {
    triggers: TriggerTable,
    default_max_turns: u32,
}

impl PhaseTransitionEvaluator {
    pub fn new(triggers: TriggerTable, default_max_turns: u32) -> Self {
        Self {
            triggers,
            default_max_turns,
        }
    }

    pub fn default_max_turns(&self) -> u32 {
        self.default_max_turns
    }

    /// Records one user message against `state`.
    ///
    /// Counts the turn when the message arrived during the simulation, then
    /// checks the triggers for that pre-transition phase. Moves at most one
    /// step forward.
    pub fn apply(&self, state: &mut PhaseState, message: &str) -> Option<Transition> {
        let from = state.current_phase;
        if from == Phase::Simulation {
            state.turn_count += 1;
        }

        if from.is_terminal() {
            return None;
        }
        let cause = self.cause_for(state, message)?;
        let next = from.next()?;
        let to = match from.transition_to(next) {
            Ok(to) => to,
            Err(err) => {
                tracing::warn!(error = %err, "Rejected phase transition");
                return None;
            }
        };
        state.current_phase = to;
        tracing::info!(from = %from, to = %to, cause = ?cause, "Phase transition");
        Some(Transition { from, to, cause })
    }

    fn cause_for(&self, state: &PhaseState, message: &str) -> Option<TransitionCause> {
        let phase = state.current_phase;
        if let Some(keyword) = self.triggers.matching_keyword(phase, message) {
            return Some(TransitionCause::Keyword(keyword.to_string()));
        }
        if phase == Phase::Simulation {
            let max_turns = state.max_turns(self.default_max_turns);
            if state.turn_count >= max_turns {
                return Some(TransitionCause::TurnCeiling {
                    turn_count: state.turn_count,
                    max_turns,
                });
            }
        }
        None
    }
}

impl Default for PhaseTransitionEvaluator {
    fn default() -> Self {
        Self::new(TriggerTable::default(), super::outputs::DEFAULT_MAX_TURNS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn state_in(phase: Phase) -> PhaseState {
        PhaseState {
            current_phase: phase,
            ..PhaseState::default()
        }
    }

    #[test]
    fn practice_moves_listener_to_coordinator() {
        let evaluator = PhaseTransitionEvaluator::default();
        let mut state = state_in(Phase::Listener);

        let transition = evaluator.apply(&mut state, "Let's PRACTICE this").unwrap();

        assert_eq!(transition.from, Phase::Listener);
        assert_eq!(transition.to, Phase::Coordinator);
        assert_eq!(transition.cause, TransitionCause::Keyword("practice".into()));
        assert_eq!(state.current_phase, Phase::Coordinator);
    }

    #[test]
    fn coordinator_without_trigger_stays() {
        let evaluator = PhaseTransitionEvaluator::default();
        let mut state = state_in(Phase::Coordinator);

        assert!(evaluator.apply(&mut state, "He hates jargon").is_none());
        assert_eq!(state.current_phase, Phase::Coordinator);
    }

    #[test]
    fn listener_ignores_simulation_stop_words() {
        let evaluator = PhaseTransitionEvaluator::default();
        let mut state = state_in(Phase::Listener);

        assert!(evaluator.apply(&mut state, "I'm ready to stop").is_none());
        assert_eq!(state.current_phase, Phase::Listener);
    }

    #[test]
    fn turn_is_counted_before_ceiling_check() {
        let evaluator = PhaseTransitionEvaluator::default();
        let mut state = state_in(Phase::Simulation);
        state.turn_count = 9;

        let transition = evaluator.apply(&mut state, "Our costs are fixed").unwrap();

        assert_eq!(state.turn_count, 10);
        assert_eq!(state.current_phase, Phase::Feedback);
        assert_eq!(
            transition.cause,
            TransitionCause::TurnCeiling {
                turn_count: 10,
                max_turns: 10
            }
        );
    }

    #[test]
    fn turns_are_not_counted_outside_simulation() {
        let evaluator = PhaseTransitionEvaluator::default();
        let mut state = state_in(Phase::Coordinator);

        evaluator.apply(&mut state, "I'm ready");

        assert_eq!(state.current_phase, Phase::Simulation);
        assert_eq!(state.turn_count, 0);
    }

    #[test]
    fn stop_keyword_ends_simulation_early() {
        let evaluator = PhaseTransitionEvaluator::default();
        let mut state = state_in(Phase::Simulation);

        let transition = evaluator.apply(&mut state, "Finish here please").unwrap();

        assert_eq!(transition.to, Phase::Feedback);
        assert_eq!(state.turn_count, 1);
    }

    #[test]
    fn substring_matching_is_naive() {
        let evaluator = PhaseTransitionEvaluator::default();
        let mut state = state_in(Phase::Simulation);

        let transition = evaluator.apply(&mut state, "We could go live next weekend").unwrap();

        assert_eq!(transition.cause, TransitionCause::Keyword("end".into()));
    }

    #[test]
    fn feedback_is_terminal() {
        let evaluator = PhaseTransitionEvaluator::default();
        let mut state = state_in(Phase::Feedback);

        assert!(evaluator.apply(&mut state, "end simulation ready practice").is_none());
        assert_eq!(state.current_phase, Phase::Feedback);
    }

    #[test]
    fn every_transition_is_a_single_forward_step() {
        let evaluator = PhaseTransitionEvaluator::default();
        for (phase, message) in [
            (Phase::Listener, "let's rehearse"),
            (Phase::Coordinator, "ready"),
            (Phase::Simulation, "stop here"),
        ] {
            let mut state = state_in(phase);
            let transition = evaluator.apply(&mut state, message).unwrap();

            assert!(transition.from.can_transition_to(&transition.to));
            assert_eq!(transition.from.valid_transitions(), vec![transition.to]);
            assert_eq!(state.current_phase, transition.to);
        }
    }

    #[test]
    fn custom_trigger_table() {
        let triggers = TriggerTable::default().with_keywords(Phase::Coordinator, &["GO"]);
        let evaluator = PhaseTransitionEvaluator::new(triggers, 3);
        let mut state = state_in(Phase::Coordinator);

        assert!(evaluator.apply(&mut state, "ready").is_none());
        assert!(evaluator.apply(&mut state, "let's go").is_some());
        assert_eq!(evaluator.default_max_turns(), 3);
    }

    #[test]
    fn announcements_name_the_persona() {
        let transition = Transition {
            from: Phase::Coordinator,
            to: Phase::Simulation,
            cause: TransitionCause::Keyword("ready".into()),
        };
        assert_eq!(
            transition.announcement("cto_jack"),
            "**Phase Transition:** Entering simulation mode. The Actor will now respond as Cto_Jack."
        );
    }

    proptest! {
        #[test]
        fn phase_never_moves_backwards(messages in proptest::collection::vec("[a-z ]{0,24}", 0..40)) {
            let evaluator = PhaseTransitionEvaluator::default();
            let mut state = PhaseState::default();
            let mut previous = state.current_phase;

            for message in &messages {
                let transition = evaluator.apply(&mut state, message);
                prop_assert!(state.current_phase >= previous);
                if let Some(t) = transition {
                    prop_assert_eq!(Some(t.to), t.from.next());
                }
                previous = state.current_phase;
            }
        }

        #[test]
        fn turn_count_only_grows_in_simulation(messages in proptest::collection::vec("[a-z ]{0,24}", 0..40)) {
            let evaluator = PhaseTransitionEvaluator::default();
            let mut state = PhaseState::default();

            for message in &messages {
                let before = state.turn_count;
                let phase = state.current_phase;
                evaluator.apply(&mut state, message);
                let expected = if phase == Phase::Simulation { before + 1 } else { before };
                prop_assert_eq!(state.turn_count, expected);
            }
        }
    }
}
