// Notification port: loading/error indicators and transient toasts
pub mod board;
pub mod tracing_notifier;

pub use board::{Indicator, NotificationBoard, Toast};
pub use tracing_notifier::TracingNotifier;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastKind {
    Success,
    Error,
}

impl ToastKind {
    pub fn css_class(self) -> &'static str {
        match self {
            ToastKind::Success => "toast toast-success",
            ToastKind::Error => "toast toast-error",
        }
    }

    pub fn background(self) -> &'static str {
        match self {
            ToastKind::Success => "#4CAF50",
            ToastKind::Error => "#f44336",
        }
    }
}

/// Where the loader's callers report progress and failures to the user.
/// Rendering is left to the adapter; callers only name a container.
pub trait NotificationPort: Send + Sync {
    /// Replaces the container's content with a loading indicator.
    fn show_loading(&self, container: &str);
    /// Replaces the container's content with an error message.
    fn show_error(&self, container: &str, message: &str);
    /// Shows a floating notification that removes itself after a fixed delay.
    fn show_toast(&self, message: &str, kind: ToastKind);
}

// Both ports receive every notification, left first.
impl<A: NotificationPort, B: NotificationPort> NotificationPort for (A, B) {
    fn show_loading(&self, container: &str) {
        self.0.show_loading(container);
        self.1.show_loading(container);
    }

    fn show_error(&self, container: &str, message: &str) {
        self.0.show_error(container, message);
        self.1.show_error(container, message);
    }

    fn show_toast(&self, message: &str, kind: ToastKind) {
        self.0.show_toast(message, kind);
        self.1.show_toast(message, kind);
    }
}
