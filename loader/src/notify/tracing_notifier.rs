// Notification adapter for headless runs: every notification becomes a log line
use tracing::{error, info};

use super::{NotificationPort, ToastKind};

#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl NotificationPort for TracingNotifier {
    fn show_loading(&self, container: &str) {
        info!(container = %container, "数据加载中...");
    }

    fn show_error(&self, container: &str, message: &str) {
        error!(container = %container, "加载失败: {}", message);
    }

    fn show_toast(&self, message: &str, kind: ToastKind) {
        match kind {
            ToastKind::Success => info!(toast = "success", "{}", message),
            ToastKind::Error => error!(toast = "error", "{}", message),
        }
    }
}
