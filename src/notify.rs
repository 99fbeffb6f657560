use std::fmt;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    Success(String),
    Error { title: String, description: String },
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        Self::Success(message.into())
    }

    pub fn error(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self::Error {
            title: title.into(),
            description: description.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error { .. })
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success(message) => f.write_str(message),
            Self::Error { title, description } if description.is_empty() => f.write_str(title),
            Self::Error { title, description } => write!(f, "{title}: {description}"),
        }
    }
}

pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, notification: Notification) {
        debug!(?notification, "notify");
        if notification.is_error() {
            eprintln!("error: {notification}");
        } else {
            println!("{notification}");
        }
    }
}
