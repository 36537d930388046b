//! Persisted session envelope.
//!
//! Session state is written as `{ "state": ..., "version": n }`. Older writers
//! stored the state object directly, so both shapes are accepted on read and
//! a partial update writes back the shape it found.

use serde::{Deserialize, Serialize};

/// A persisted value in either the wrapped or the legacy flat shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SessionEnvelope<T> {
    /// `{ "state": T, "version": n }`
    Wrapped {
        state: T,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        version: Option<u32>,
    },
    /// `T` stored without a wrapper.
    Flat(T),
}

impl<T> SessionEnvelope<T> {
    /// Wrap `state` in the current persisted shape.
    pub fn wrap(state: T, version: u32) -> Self {
        SessionEnvelope::Wrapped {
            state,
            version: Some(version),
        }
    }

    pub fn state(&self) -> &T {
        match self {
            SessionEnvelope::Wrapped { state, .. } => state,
            SessionEnvelope::Flat(state) => state,
        }
    }

    pub fn state_mut(&mut self) -> &mut T {
        match self {
            SessionEnvelope::Wrapped { state, .. } => state,
            SessionEnvelope::Flat(state) => state,
        }
    }

    pub fn into_state(self) -> T {
        match self {
            SessionEnvelope::Wrapped { state, .. } => state,
            SessionEnvelope::Flat(state) => state,
        }
    }

    pub fn version(&self) -> Option<u32> {
        match self {
            SessionEnvelope::Wrapped { version, .. } => *version,
            SessionEnvelope::Flat(_) => None,
        }
    }

    pub fn is_wrapped(&self) -> bool {
        matches!(self, SessionEnvelope::Wrapped { .. })
    }

    /// Transform the state while keeping the wrapper shape and version.
    pub fn map_state<U>(self, f: impl FnOnce(T) -> U) -> SessionEnvelope<U> {
        match self {
            SessionEnvelope::Wrapped { state, version } => SessionEnvelope::Wrapped {
                state: f(state),
                version,
            },
            SessionEnvelope::Flat(state) => SessionEnvelope::Flat(f(state)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct Tokens {
        access_token: Option<String>,
    }

    #[test]
    fn test_wrapped_shape_parses_first() {
        let raw = json!({ "state": { "accessToken": "a1" }, "version": 0 });
        let envelope: SessionEnvelope<Tokens> = serde_json::from_value(raw).unwrap();

        assert!(envelope.is_wrapped());
        assert_eq!(envelope.version(), Some(0));
        assert_eq!(envelope.state().access_token.as_deref(), Some("a1"));
    }

    #[test]
    fn test_flat_shape_falls_back() {
        let raw = json!({ "accessToken": "a1" });
        let envelope: SessionEnvelope<Tokens> = serde_json::from_value(raw).unwrap();

        assert!(!envelope.is_wrapped());
        assert_eq!(envelope.into_state().access_token.as_deref(), Some("a1"));
    }

    #[test]
    fn test_partial_update_preserves_shape() {
        let wrapped: SessionEnvelope<Value> =
            serde_json::from_value(json!({ "state": { "accessToken": "old", "user": 1 }, "version": 3 }))
                .unwrap();
        let updated = wrapped.map_state(|mut state| {
            state["accessToken"] = json!("new");
            state
        });
        assert_eq!(
            serde_json::to_value(&updated).unwrap(),
            json!({ "state": { "accessToken": "new", "user": 1 }, "version": 3 })
        );

        let flat: SessionEnvelope<Value> =
            serde_json::from_value(json!({ "accessToken": "old" })).unwrap();
        let updated = flat.map_state(|mut state| {
            state["accessToken"] = json!("new");
            state
        });
        assert_eq!(serde_json::to_value(&updated).unwrap(), json!({ "accessToken": "new" }));
    }
}
