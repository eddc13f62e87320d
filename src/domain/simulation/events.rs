//! Output events returned to the caller of a dispatch.

use serde::{Deserialize, Serialize};

/// Author recorded for messages typed by the user.
pub const USER_AUTHOR: &str = "user";

/// Author recorded for transition announcements.
pub const DISPATCHER_AUTHOR: &str = "Meeting_Orchestrator";

/// One message emitted in response to a user turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputEvent {
    pub author: String,
    /// May be empty only for pure marker events.
    pub text: String,
}

impl OutputEvent {
    pub fn new(author: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            author: author.into(),
            text: text.into(),
        }
    }

    /// Announcement authored by the dispatcher.
    pub fn announcement(text: impl Into<String>) -> Self {
        Self::new(DISPATCHER_AUTHOR, text)
    }

    pub fn is_from_dispatcher(&self) -> bool {
        self.author == DISPATCHER_AUTHOR
    }
}
