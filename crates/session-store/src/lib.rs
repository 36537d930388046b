//! Authenticated session state for the CCSMS client.
//!
//! The [`SessionStore`] holds the signed-in user and token pair, persists it
//! to the tab-scoped storage under `auth-session`, and broadcasts every change
//! to subscribers. The [`HydrationGate`] makes sure nothing acts on the session
//! before it has been restored from storage, and the [`RouteGuard`] turns a
//! hydrated session into a navigation decision.

mod error;
mod guard;
mod hydration;
mod model;
mod rate_limit;
mod store;
mod theme;

pub use error::{SessionError, SessionResult};
pub use guard::{is_public_route, role_home, RouteDecision, RouteGuard, LOGIN_ROUTE};
pub use hydration::{HydrationGate, HYDRATION_FALLBACK};
pub use model::{deserialize_id, AuthPayload, Role, Session, TokenPair, User, UserPatch};
pub use rate_limit::{LoginAttempts, LoginRateLimiter, RateLimitStatus, MAX_LOGIN_ATTEMPTS};
pub use store::{SessionStore, SESSION_ENVELOPE_VERSION};
pub use theme::{Theme, ThemePreference};
