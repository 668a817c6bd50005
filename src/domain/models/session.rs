#[cfg(test)]
#[path = "session_test.rs"]
mod tests;

use std::fmt;

use chrono::Utc;
use uuid::Uuid;

/// Opaque token correlating every request of this process with one backend
/// conversation context.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SessionId(String);

impl SessionId {
    /// Microsecond timestamp plus a random suffix, enough to keep concurrent
    /// clients apart without any coordination.
    pub fn generate() -> SessionId {
        let micros = Utc::now().timestamp_micros();
        let suffix = Uuid::new_v4().simple().to_string();

        return SessionId(format!("s_{micros}_{}", &suffix[..8]));
    }

    pub fn as_str(&self) -> &str {
        return &self.0;
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        return write!(f, "{}", self.0);
    }
}

/// Created once at startup and alive until the process exits. Has no mutable
/// state.
#[derive(Clone, Debug)]
pub struct Session {
    id: SessionId,
}

impl Default for Session {
    fn default() -> Session {
        return Session::new();
    }
}

impl Session {
    pub fn new() -> Session {
        return Session {
            id: SessionId::generate(),
        };
    }

    pub fn id(&self) -> &SessionId {
        return &self.id;
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum SessionState {
    Idle,
    Sending,
    Streaming,
    Failed,
}

impl SessionState {
    pub fn is_idle(&self) -> bool {
        return *self == SessionState::Idle;
    }
}
