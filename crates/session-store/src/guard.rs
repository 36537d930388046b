//! Route guard.

use crate::{Role, Session};

/// Where unauthenticated users are sent.
pub const LOGIN_ROUTE: &str = "/login";

/// Outcome of checking a route against the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteDecision {
    /// Session not hydrated yet; render nothing and decide later.
    Pending,
    Allow,
    RedirectToLogin,
    /// Signed-in user landed on `/`; send them to their role's home.
    RedirectTo(&'static str),
}

/// Routes reachable without a session.
pub fn is_public_route(path: &str) -> bool {
    let path = path.split(['?', '#']).next().unwrap_or(path);
    path == "/"
        || path.starts_with("/login")
        || path.starts_with("/register")
        || path.starts_with("/invoice/")
}

pub fn role_home(role: Role) -> &'static str {
    match role {
        Role::Agent => "/agent",
        Role::Admin | Role::Customer => "/dashboard",
    }
}

/// Turns the session into a navigation decision for a path.
#[derive(Debug, Clone, Copy, Default)]
pub struct RouteGuard;

impl RouteGuard {
    pub fn decide(&self, session: &Session, path: &str) -> RouteDecision {
        if !session.hydrated {
            return RouteDecision::Pending;
        }

        let authenticated = session.is_authenticated && session.user.is_some();
        if path == "/" {
            return match session.role() {
                Some(role) if authenticated => RouteDecision::RedirectTo(role_home(role)),
                _ => RouteDecision::Allow,
            };
        }
        if is_public_route(path) {
            return RouteDecision::Allow;
        }
        if !authenticated {
            return RouteDecision::RedirectToLogin;
        }
        RouteDecision::Allow
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::tests::sample_user;

    fn signed_in(role: Role) -> Session {
        let mut user = sample_user();
        user.role = role;
        Session {
            user: Some(user),
            access_token: Some("a".into()),
            refresh_token: Some("r".into()),
            is_authenticated: true,
            hydrated: true,
        }
    }

    #[test]
    fn test_no_decision_before_hydration() {
        let guard = RouteGuard;
        let mut session = signed_in(Role::Admin);
        session.hydrated = false;
        assert_eq!(guard.decide(&session, "/complaints"), RouteDecision::Pending);
        assert_eq!(guard.decide(&Session::default(), "/dashboard"), RouteDecision::Pending);
    }

    #[test]
    fn test_signed_out_users_go_to_login() {
        let guard = RouteGuard;
        let session = Session {
            hydrated: true,
            ..Default::default()
        };
        assert_eq!(guard.decide(&session, "/complaints/42"), RouteDecision::RedirectToLogin);
        assert_eq!(guard.decide(&session, "/login"), RouteDecision::Allow);
        assert_eq!(guard.decide(&session, "/register?role=agent"), RouteDecision::Allow);
        assert_eq!(guard.decide(&session, "/invoice/INV-1"), RouteDecision::Allow);
        assert_eq!(guard.decide(&session, "/"), RouteDecision::Allow);
    }

    #[test]
    fn test_root_redirects_to_role_home() {
        let guard = RouteGuard;
        assert_eq!(
            guard.decide(&signed_in(Role::Admin), "/"),
            RouteDecision::RedirectTo("/dashboard")
        );
        assert_eq!(
            guard.decide(&signed_in(Role::Agent), "/"),
            RouteDecision::RedirectTo("/agent")
        );
        assert_eq!(
            guard.decide(&signed_in(Role::Customer), "/"),
            RouteDecision::RedirectTo("/dashboard")
        );
        assert_eq!(guard.decide(&signed_in(Role::Customer), "/complaints"), RouteDecision::Allow);
    }

    #[test]
    fn test_public_routes() {
        assert!(is_public_route("/login"));
        assert!(is_public_route("/invoice/abc#top"));
        assert!(!is_public_route("/invoice"));
        assert!(!is_public_route("/notifications"));
    }
}
