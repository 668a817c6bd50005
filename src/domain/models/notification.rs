#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Success,
    Error,
}

/// Transient, non-blocking message for the user (a toast in the terminal UI).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notification {
    pub level: NotificationLevel,
    pub text: String,
}

impl Notification {
    pub fn info(text: &str) -> Notification {
        return Notification {
            level: NotificationLevel::Info,
            text: text.to_string(),
        };
    }

    pub fn success(text: &str) -> Notification {
        return Notification {
            level: NotificationLevel::Success,
            text: text.to_string(),
        };
    }

    pub fn error(text: &str) -> Notification {
        return Notification {
            level: NotificationLevel::Error,
            text: text.to_string(),
        };
    }
}
