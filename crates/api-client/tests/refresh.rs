mod common;

use api_client::{ApiError, ApiResponse, Complaint, TransportError};
use client_storage::StorageKeys;
use common::*;
use serde_json::{json, Value};

const COMPLAINTS: &str = "/complaints/";
const REFRESH: &str = "/auth/refresh/";

#[tokio::test]
async fn test_401_refreshes_once_and_retries_with_new_token() {
    let transport = FakeTransport::new(|req| match (req.path.as_str(), bearer(req)) {
        (REFRESH, _) => {
            assert_eq!(req.body, Some(json!({ "refresh": "r1" })));
            ok(json!({ "access": "a2" }))
        }
        (COMPLAINTS, Some("a2")) => ok(json!([])),
        (COMPLAINTS, _) => unauthorized(),
        _ => status(404, json!({})),
    });
    let h = harness(transport);
    h.sign_in("a1", "r1");

    let complaints: Vec<Complaint> = h.client.get(COMPLAINTS).await.unwrap();
    assert!(complaints.is_empty());

    assert_eq!(h.transport.requests_to(REFRESH).len(), 1);
    let calls = h.transport.requests_to(COMPLAINTS);
    assert_eq!(calls.len(), 2);
    assert_eq!(bearer(&calls[0]), Some("a1"));
    assert!(!calls[0].retried);
    assert_eq!(bearer(&calls[1]), Some("a2"));
    assert!(calls[1].retried);
    assert!(h.transport.requests_to(REFRESH)[0].bearer.is_none());

    let envelope = h.stored_envelope().unwrap();
    assert_eq!(envelope.version(), Some(0));
    assert_eq!(envelope.state()["accessToken"], json!("a2"));
    assert_eq!(envelope.state()["refreshToken"], json!("r1"));
    assert_eq!(h.store.access_token().as_deref(), Some("a2"));
    assert!(h.navigator.visits().is_empty());
}

#[tokio::test]
async fn test_retry_that_also_401s_does_not_refresh_again() {
    let transport = FakeTransport::new(|req| match req.path.as_str() {
        REFRESH => ok(json!({ "access": "a2" })),
        _ => unauthorized(),
    });
    let h = harness(transport);
    h.sign_in("a1", "r1");

    let err = h.client.get::<Value>(COMPLAINTS).await.unwrap_err();
    assert!(err.is_auth_expired());
    assert_eq!(err.to_string(), "Please log in to continue");

    assert_eq!(h.transport.requests_to(REFRESH).len(), 1);
    assert_eq!(h.transport.requests_to(COMPLAINTS).len(), 2);
    assert_eq!(h.navigator.visits(), vec!["/login".to_string()]);
}

#[tokio::test]
async fn test_missing_refresh_token_clears_session_and_redirects_once() {
    let transport = FakeTransport::new(|_| unauthorized());
    let h = harness(transport);
    h.storage.set_json(
        StorageKeys::AUTH_SESSION,
        &json!({ "state": { "accessToken": "a1", "isAuthenticated": true }, "version": 0 }),
    );

    for _ in 0..3 {
        let err = h.client.get::<Value>(COMPLAINTS).await.unwrap_err();
        assert!(matches!(err, ApiError::LoginRequired));
    }

    assert!(h.stored_envelope().is_none());
    assert!(h.transport.requests_to(REFRESH).is_empty());
    assert_eq!(h.navigator.visits(), vec!["/login".to_string()]);
}

#[tokio::test]
async fn test_failed_refresh_clears_session_and_redirects_once() {
    let transport = FakeTransport::new(|req| match req.path.as_str() {
        REFRESH => status(401, json!({ "detail": "Token is blacklisted" })),
        _ => unauthorized(),
    });
    let h = harness(transport);
    h.sign_in("a1", "r1");

    let first = h.client.get::<Value>(COMPLAINTS).await.unwrap_err();
    let second = h.client.get::<Value>("/notifications/").await.unwrap_err();
    assert!(first.is_auth_expired());
    assert!(second.is_auth_expired());

    assert!(h.stored_envelope().is_none());
    let session = h.store.snapshot();
    assert!(!session.is_authenticated);
    assert!(session.user.is_none());
    assert!(session.access_token.is_none());
    assert!(session.refresh_token.is_none());
    assert_eq!(h.navigator.visits(), vec!["/login".to_string()]);
}

#[tokio::test]
async fn test_refresh_preserves_flat_envelope_and_rotates_refresh_token() {
    let transport = FakeTransport::new(|req| match (req.path.as_str(), bearer(req)) {
        (REFRESH, _) => ok(json!({ "access": "a2", "refresh": "r2" })),
        (_, Some("a2")) => ok(json!({ "ok": true })),
        _ => unauthorized(),
    });
    let h = harness(transport);
    h.storage.set_json(
        StorageKeys::AUTH_SESSION,
        &json!({ "accessToken": "a1", "refreshToken": "r1", "theme": "kept" }),
    );

    let body: Value = h.client.get(COMPLAINTS).await.unwrap();
    assert_eq!(body, json!({ "ok": true }));

    let envelope = h.stored_envelope().unwrap();
    assert!(!envelope.is_wrapped());
    assert_eq!(
        envelope.into_state(),
        json!({ "accessToken": "a2", "refreshToken": "r2", "theme": "kept" })
    );
}

#[tokio::test]
async fn test_concurrent_401s_share_one_refresh() {
    let transport = FakeTransport::new(|req| match (req.path.as_str(), bearer(req)) {
        (REFRESH, _) => ok(json!({ "access": "a2" })),
        (_, Some("a2")) => ok(json!([])),
        _ => unauthorized(),
    });
    let h = harness(transport);
    h.sign_in("a1", "r1");

    let (first, second, third) = tokio::join!(
        h.client.get::<Value>(COMPLAINTS),
        h.client.get::<Value>("/notifications/"),
        h.client.get::<Value>("/users/agents/"),
    );
    first.unwrap();
    second.unwrap();
    third.unwrap();

    assert_eq!(h.transport.requests_to(REFRESH).len(), 1);
    let retried: Vec<_> = h
        .transport
        .requests()
        .into_iter()
        .filter(|r| r.retried)
        .collect();
    assert_eq!(retried.len(), 3);
    assert!(retried.iter().all(|r| bearer(r) == Some("a2")));
}

#[tokio::test]
async fn test_network_and_html_errors_are_normalized() {
    let transport = FakeTransport::new(|req| match req.path.as_str() {
        "/down/" => Err(TransportError::Connect("connection refused".into())),
        "/slow/" => Err(TransportError::Timeout),
        _ => Ok(ApiResponse {
            status: 500,
            content_type: Some("text/html; charset=utf-8".into()),
            body: b"<!DOCTYPE html><html><body>Traceback</body></html>".to_vec(),
        }),
    });
    let h = harness(transport);
    h.sign_in("a1", "r1");

    let down = h.client.get::<Value>("/down/").await.unwrap_err();
    assert!(down.is_network());
    assert_eq!(down.to_string(), "Network Error: Unable to connect to server");
    assert!(h.client.get::<Value>("/slow/").await.unwrap_err().is_network());

    let page = h.client.get::<Value>("/boom/").await.unwrap_err();
    assert_eq!(
        page.to_string(),
        "Server Error (500): The server returned an HTML error page."
    );
    assert_eq!(page.status(), Some(500));
}

#[tokio::test]
async fn test_login_401_is_a_plain_error_without_refresh() {
    let transport = FakeTransport::new(|_| {
        status(
            401,
            json!({ "non_field_errors": ["Unable to log in with provided credentials."] }),
        )
    });
    let h = harness(transport);
    h.sign_in("a1", "r1");

    let err = h
        .client
        .auth()
        .login("a@example.com", "wrong")
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Unable to log in with provided credentials.");
    assert_eq!(err.status(), Some(401));

    let calls = h.transport.requests();
    assert_eq!(calls.len(), 1);
    assert!(calls[0].bearer.is_none());
    assert!(h.navigator.visits().is_empty());
}

#[tokio::test]
async fn test_binary_error_body_is_decoded() {
    let transport = FakeTransport::new(|_| {
        Ok(ApiResponse {
            status: 500,
            content_type: Some("text/csv".into()),
            body: br#"{"error": "No complaints in range"}"#.to_vec(),
        })
    });
    let h = harness(transport);
    h.sign_in("a1", "r1");

    let err = h.client.analytics().export_csv(None).await.unwrap_err();
    assert_eq!(err.to_string(), "No complaints in range");

    let export = &h.transport.requests()[0];
    assert_eq!(export.path, "/analytics/export/");
    assert_eq!(
        export.query,
        vec![("date_range".to_string(), "30".to_string())]
    );
}
