use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::debug;
use uuid::Uuid;

/// Most recent toasts kept; older ones are dropped on add.
pub const MAX_TOASTS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastKind {
    Success,
    Error,
    Warning,
    Info,
}

impl fmt::Display for ToastKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ToastKind::Success => "success",
            ToastKind::Error => "error",
            ToastKind::Warning => "warning",
            ToastKind::Info => "info",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Toast {
    pub id: Uuid,
    pub title: String,
    pub message: String,
    #[serde(rename = "type")]
    pub kind: ToastKind,
}

impl Toast {
    pub fn new(kind: ToastKind, title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            message: message.into(),
            kind,
        }
    }

    pub fn success(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ToastKind::Success, title, message)
    }

    pub fn error(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ToastKind::Error, title, message)
    }

    pub fn warning(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ToastKind::Warning, title, message)
    }

    pub fn info(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ToastKind::Info, title, message)
    }
}

/// Shared toast list. Clones observe and mutate the same queue.
#[derive(Clone)]
pub struct ToastQueue {
    state: Arc<watch::Sender<Vec<Toast>>>,
}

impl Default for ToastQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl ToastQueue {
    pub fn new() -> Self {
        let (state, _) = watch::channel(Vec::new());
        Self {
            state: Arc::new(state),
        }
    }

    /// Prepend a toast, dropping the oldest beyond [`MAX_TOASTS`].
    pub fn add(&self, toast: Toast) -> Uuid {
        let id = toast.id;
        debug!(toast_id = %id, kind = %toast.kind, "Toast added");
        self.state.send_modify(|toasts| {
            toasts.insert(0, toast);
            toasts.truncate(MAX_TOASTS);
        });
        id
    }

    /// Remove a toast. Returns false if it was already gone.
    pub fn remove(&self, id: Uuid) -> bool {
        self.state.send_if_modified(|toasts| {
            let before = toasts.len();
            toasts.retain(|t| t.id != id);
            toasts.len() != before
        })
    }

    /// Remove every listed toast still present, as one change.
    pub(crate) fn remove_all(&self, ids: &[Uuid]) -> usize {
        let mut removed = 0;
        self.state.send_if_modified(|toasts| {
            let before = toasts.len();
            toasts.retain(|t| !ids.contains(&t.id));
            removed = before - toasts.len();
            removed > 0
        });
        removed
    }

    pub fn clear(&self) {
        self.state.send_if_modified(|toasts| {
            let had_any = !toasts.is_empty();
            toasts.clear();
            had_any
        });
    }

    pub fn snapshot(&self) -> Vec<Toast> {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Vec<Toast>> {
        self.state.subscribe()
    }

    pub fn len(&self) -> usize {
        self.state.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.borrow().is_empty()
    }
}

impl fmt::Debug for ToastQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToastQueue").field("len", &self.len()).finish()
    }
}
