// In-memory notification surface: container indicators plus self-removing toasts
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tracing::warn;

use super::{NotificationPort, ToastKind};
use crate::config::LoaderSettings;

pub const LOADING_TEXT: &str = "数据加载中...";
pub const ERROR_PREFIX: &str = "加载失败: ";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Indicator {
    Loading,
    Error(String),
}

impl Indicator {
    pub fn render_html(&self) -> String {
        match self {
            Indicator::Loading => format!("<div class=\"loading\">{}</div>", LOADING_TEXT),
            Indicator::Error(message) => format!(
                "<div class=\"error\">{}{}</div>",
                ERROR_PREFIX,
                escape_html(message)
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Toast {
    pub id: u64,
    pub message: String,
    pub kind: ToastKind,
    /// Set once the display time is over and the fade-out has started.
    pub fading: bool,
}

impl Toast {
    pub fn render_html(&self) -> String {
        format!(
            "<div class=\"{}\" style=\"background: {}\">{}</div>",
            self.kind.css_class(),
            self.kind.background(),
            escape_html(&self.message)
        )
    }
}

#[derive(Default)]
struct BoardState {
    containers: HashMap<String, Indicator>,
    toasts: Vec<Toast>,
}

/// Shared, cloneable notification surface. Toast removal runs on the tokio runtime.
#[derive(Clone)]
pub struct NotificationBoard {
    state: Arc<Mutex<BoardState>>,
    next_toast_id: Arc<AtomicU64>,
    display: Duration,
    fade: Duration,
}

impl NotificationBoard {
    pub fn new(display: Duration, fade: Duration) -> Self {
        NotificationBoard {
            state: Arc::new(Mutex::new(BoardState::default())),
            next_toast_id: Arc::new(AtomicU64::new(1)),
            display,
            fade,
        }
    }

    pub fn from_settings(settings: &LoaderSettings) -> Self {
        Self::new(settings.toast_duration(), settings.toast_fade())
    }

    pub fn container(&self, container: &str) -> Option<Indicator> {
        self.lock().containers.get(container).cloned()
    }

    pub fn render_container(&self, container: &str) -> Option<String> {
        self.container(container).map(|indicator| indicator.render_html())
    }

    /// Removes whatever indicator the container shows.
    pub fn clear_container(&self, container: &str) -> Option<Indicator> {
        self.lock().containers.remove(container)
    }

    pub fn toasts(&self) -> Vec<Toast> {
        self.lock().toasts.clone()
    }

    pub fn dismiss_toast(&self, id: u64) -> bool {
        let mut state = self.lock();
        let before = state.toasts.len();
        state.toasts.retain(|toast| toast.id != id);
        state.toasts.len() != before
    }

    fn lock(&self) -> MutexGuard<'_, BoardState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn schedule_removal(&self, id: u64) {
        let handle = match tokio::runtime::Handle::try_current() {
            Ok(handle) => handle,
            Err(_) => {
                warn!(toast_id = id, "No tokio runtime; toast stays until dismissed");
                return;
            }
        };
        let board = self.clone();
        handle.spawn(async move {
            tokio::time::sleep(board.display).await;
            {
                let mut state = board.lock();
                if let Some(toast) = state.toasts.iter_mut().find(|toast| toast.id == id) {
                    toast.fading = true;
                }
            }
            tokio::time::sleep(board.fade).await;
            board.dismiss_toast(id);
        });
    }
}

impl Default for NotificationBoard {
    fn default() -> Self {
        Self::new(Duration::from_millis(3000), Duration::from_millis(300))
    }
}

impl NotificationPort for NotificationBoard {
    fn show_loading(&self, container: &str) {
        self.lock()
            .containers
            .insert(container.to_string(), Indicator::Loading);
    }

    fn show_error(&self, container: &str, message: &str) {
        self.lock()
            .containers
            .insert(container.to_string(), Indicator::Error(message.to_string()));
    }

    fn show_toast(&self, message: &str, kind: ToastKind) {
        let id = self.next_toast_id.fetch_add(1, Ordering::Relaxed);
        self.lock().toasts.push(Toast {
            id,
            message: message.to_string(),
            kind,
            fading: false,
        });
        self.schedule_removal(id);
    }
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loading_and_error_replace_container_content() {
        let board = NotificationBoard::default();
        board.show_loading("#cost-table");
        assert_eq!(board.container("#cost-table"), Some(Indicator::Loading));
        assert_eq!(
            board.render_container("#cost-table").unwrap(),
            "<div class=\"loading\">数据加载中...</div>"
        );

        board.show_error("#cost-table", "HTTP error! status: 404");
        assert_eq!(
            board.render_container("#cost-table").unwrap(),
            "<div class=\"error\">加载失败: HTTP error! status: 404</div>"
        );
        assert_eq!(board.container("#other"), None);
    }

    #[test]
    fn test_error_message_is_escaped() {
        let html = Indicator::Error("<script>x</script> & more".to_string()).render_html();
        assert_eq!(
            html,
            "<div class=\"error\">加载失败: &lt;script&gt;x&lt;/script&gt; &amp; more</div>"
        );
    }

    #[test]
    fn test_toast_without_runtime_stays() {
        let board = NotificationBoard::default();
        board.show_toast("数据已刷新", ToastKind::Success);
        let toasts = board.toasts();
        assert_eq!(toasts.len(), 1);
        assert_eq!(
            toasts[0].render_html(),
            "<div class=\"toast toast-success\" style=\"background: #4CAF50\">数据已刷新</div>"
        );
        assert!(board.dismiss_toast(toasts[0].id));
        assert!(board.toasts().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_board_timings_come_from_settings() {
        let settings = LoaderSettings {
            toast_duration_ms: 1000,
            toast_fade_ms: 100,
            ..LoaderSettings::default()
        };
        let board = NotificationBoard::from_settings(&settings);
        board.show_toast("<b>导出失败</b>", ToastKind::Error);
        assert_eq!(
            board.toasts()[0].render_html(),
            "<div class=\"toast toast-error\" style=\"background: #f44336\">&lt;b&gt;导出失败&lt;/b&gt;</div>"
        );

        tokio::time::sleep(Duration::from_millis(1050)).await;
        assert!(board.toasts()[0].fading);
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(board.toasts().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_toast_removes_itself_after_display_and_fade() {
        let board = NotificationBoard::new(Duration::from_millis(3000), Duration::from_millis(300));
        board.show_toast("导出失败", ToastKind::Error);
        assert_eq!(board.toasts().len(), 1);

        tokio::time::sleep(Duration::from_millis(2999)).await;
        let toasts = board.toasts();
        assert_eq!(toasts.len(), 1);
        assert!(!toasts[0].fading);

        tokio::time::sleep(Duration::from_millis(100)).await;
        let toasts = board.toasts();
        assert_eq!(toasts.len(), 1);
        assert!(toasts[0].fading);

        tokio::time::sleep(Duration::from_millis(300)).await;
        assert!(board.toasts().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_toasts_expire_independently() {
        let board = NotificationBoard::default();
        board.show_toast("first", ToastKind::Success);
        tokio::time::sleep(Duration::from_millis(2000)).await;
        board.show_toast("second", ToastKind::Error);

        tokio::time::sleep(Duration::from_millis(1500)).await;
        let remaining: Vec<String> = board.toasts().into_iter().map(|t| t.message).collect();
        assert_eq!(remaining, vec!["second".to_string()]);
    }
}
