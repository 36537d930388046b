//! Ephemeral toast notifications.
//!
//! [`ToastQueue`] holds at most [`MAX_TOASTS`] entries, newest first. Entries
//! are not timed when added; a mounted [`ToastExpiry`] starts the timer when it
//! observes the list and restarts it whenever the list changes.

mod expiry;
mod queue;

pub use expiry::{ToastExpiry, TOAST_LIFETIME};
pub use queue::{Toast, ToastKind, ToastQueue, MAX_TOASTS};
