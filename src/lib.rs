//! Corp Sim - Meeting Rehearsal Simulator
//!
//! A user describes a workplace problem, agrees on a counterpart persona,
//! role-plays the meeting with that persona and receives structured feedback.
//! Each user message is routed through a four-phase state machine
//! (listener, coordinator, simulation, feedback) to a prompt-driven responder.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
