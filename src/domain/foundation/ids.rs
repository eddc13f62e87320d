//! Strongly-typed identifier value objects.
//!
//! Sessions are addressed by the triple `(app_id, user_id, session_id)` handed
//! to us by whoever hosts the conversation, so all three are validated strings
//! rather than generated UUIDs.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::ValidationError;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident, $field:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Creates a new identifier, returning error if empty or blank.
            pub fn new(id: impl Into<String>) -> Result<Self, ValidationError> {
                let id = id.into();
                if id.trim().is_empty() {
                    return Err(ValidationError::empty_field($field));
                }
                Ok(Self(id))
            }

            /// Returns the inner string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

string_id!(
    /// Identifier of the hosting application (e.g. `corp_sim`).
    AppId,
    "app_id"
);

string_id!(
    /// Identifier of the user driving a conversation.
    UserId,
    "user_id"
);

string_id!(
    /// Identifier of one conversation for a user.
    SessionId,
    "session_id"
);

impl SessionId {
    /// Creates a random session identifier.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

/// Full address of a session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionKey {
    pub app_id: AppId,
    pub user_id: UserId,
    pub session_id: SessionId,
}

impl SessionKey {
    pub fn new(app_id: AppId, user_id: UserId, session_id: SessionId) -> Self {
        Self {
            app_id,
            user_id,
            session_id,
        }
    }

    /// Builds a key from raw strings, validating each part.
    pub fn parse(
        app_id: impl Into<String>,
        user_id: impl Into<String>,
        session_id: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            app_id: AppId::new(app_id)?,
            user_id: UserId::new(user_id)?,
            session_id: SessionId::new(session_id)?,
        })
    }
}

impl fmt::Display for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.app_id, self.user_id, self.session_id)
    }
}
