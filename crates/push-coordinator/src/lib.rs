//! Push notification delivery for the CCSMS client.
//!
//! The [`PushCoordinator`] walks an authenticated session through permission,
//! service worker, token, and backend registration, then routes foreground
//! messages to in-app callbacks and platform pop-ups. Every step is
//! fail-soft: a denied permission or an unavailable push service leaves the
//! client working with in-app notifications only, and no error ever reaches
//! the caller.

mod coordinator;
mod error;
mod fsm;
mod inbox;
mod platform;
mod registry;

pub use api_client::PushRegistration;
pub use coordinator::{MessageCallback, PushCoordinator};
pub use error::{PushError, PushResult};
pub use fsm::{PushMachine, PushMachineInput, PushMachineState, PushState};
pub use inbox::{InboxSnapshot, NotificationInbox};
pub use platform::{
    Permission, PlatformNotification, PushMessage, PushNotificationPayload, PushPlatform,
    UnsupportedPlatform, DEFAULT_NOTIFICATION_ICON, DEFAULT_NOTIFICATION_TITLE,
};
pub use registry::DeviceRegistry;
