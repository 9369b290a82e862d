//! Login, signup, profile and logout against the mock service.

mod common;

use common::{memory_store, MockServer};
use taskdeck_core::{ApiClient, ApiError, AuthClient, Operation, TaskClient};

#[tokio::test]
async fn test_login_persists_token_used_by_later_calls() {
    let server = MockServer::start().await;
    let store = memory_store();
    let auth = AuthClient::new(server.api(), store.clone());

    let session = auth.login("a@b.com", "secret").await.unwrap();
    assert_eq!(session.access_token, "T1");
    assert_eq!(session.user_id(), Some(1));
    assert_eq!(store.get().unwrap().as_deref(), Some("T1"));

    // The stored token authenticates the next request
    let profile = auth.fetch_profile().await.unwrap();
    assert_eq!(profile.email.as_deref(), Some("a@b.com"));
    assert_eq!(profile.full_name().as_deref(), Some("Ada Byron"));
    assert_eq!(profile.extra["created_at"], "2024-01-01T00:00:00Z");

    let sent = server.state.requests_to("/auth/api/v1/profile");
    assert_eq!(sent[0].authorization.as_deref(), Some("Bearer T1"));
}

#[tokio::test]
async fn test_login_sends_email_and_password() {
    let server = MockServer::start().await;
    let auth = AuthClient::new(server.api(), memory_store());

    auth.login("a@b.com", "secret").await.unwrap();

    let sent = server.state.requests_to("/auth/api/v1/login");
    assert_eq!(sent.len(), 1);
    assert_eq!(
        sent[0].body,
        Some(serde_json::json!({"email": "a@b.com", "password": "secret"}))
    );
    assert!(sent[0].authorization.is_none());
}

#[tokio::test]
async fn test_invalid_credentials_leave_store_empty() {
    let server = MockServer::start().await;
    let store = memory_store();
    let auth = AuthClient::new(server.api(), store.clone());

    let err = auth.login("a@b.com", "wrong").await.unwrap_err();
    assert!(matches!(err, ApiError::InvalidCredentials));
    assert_eq!(store.get().unwrap(), None);
}

#[tokio::test]
async fn test_login_accepts_legacy_token_key() {
    let server = MockServer::start().await;
    let store = memory_store();
    let auth = AuthClient::new(server.api(), store.clone());

    let session = auth.login("legacy@b.com", "secret").await.unwrap();
    assert_eq!(session.access_token, "T9");
    assert_eq!(store.get().unwrap().as_deref(), Some("T9"));
}

#[tokio::test]
async fn test_login_without_token_is_malformed() {
    let server = MockServer::start().await;
    let store = memory_store();
    let auth = AuthClient::new(server.api(), store.clone());

    let err = auth.login("broken@b.com", "secret").await.unwrap_err();
    assert!(matches!(err, ApiError::MalformedResponse(_)));
    assert_eq!(store.get().unwrap(), None);
}

#[tokio::test]
async fn test_signup_returns_message_without_logging_in() {
    let server = MockServer::start().await;
    let store = memory_store();
    let auth = AuthClient::new(server.api(), store.clone());

    let confirmation = auth
        .signup("new@b.com", "secret1", "Ada", "Byron")
        .await
        .unwrap();
    assert_eq!(confirmation.message, "User created successfully");
    assert_eq!(store.get().unwrap(), None);

    let sent = server.state.requests_to("/auth/api/v1/signup");
    let body = sent[0].body.as_ref().unwrap();
    assert_eq!(body["first_name"], "Ada");
    assert_eq!(body["last_name"], "Byron");
}

#[tokio::test]
async fn test_signup_with_empty_body() {
    let server = MockServer::start().await;
    let auth = AuthClient::new(server.api(), memory_store());

    let confirmation = auth
        .signup("quiet@b.com", "secret1", "Ada", "Byron")
        .await
        .unwrap();
    assert_eq!(confirmation.message, "");
}

#[tokio::test]
async fn test_signup_failure() {
    let server = MockServer::start().await;
    let auth = AuthClient::new(server.api(), memory_store());

    let err = auth
        .signup("taken@b.com", "secret1", "Ada", "Byron")
        .await
        .unwrap_err();
    match err {
        ApiError::SignupFailed(detail) => assert!(detail.contains("409")),
        other => panic!("expected SignupFailed, got {:?}", other),
    }
}

#[tokio::test]
async fn test_profile_requires_token() {
    let server = MockServer::start().await;
    let auth = AuthClient::new(server.api(), memory_store());

    let err = auth.fetch_profile().await.unwrap_err();
    assert!(matches!(err, ApiError::MissingToken));
    assert_eq!(server.state.request_count(), 0);
}

#[tokio::test]
async fn test_profile_with_stale_token_is_unauthenticated() {
    let server = MockServer::start().await;
    let store = memory_store();
    store.set("expired").unwrap();
    let auth = AuthClient::new(server.api(), store);

    let err = auth.fetch_profile().await.unwrap_err();
    assert!(matches!(err, ApiError::Unauthenticated));
}

#[tokio::test]
async fn test_logout_clears_store_and_sends_bearer() {
    let server = MockServer::start().await;
    let store = memory_store();
    let auth = AuthClient::new(server.api(), store.clone());
    let session = auth.login("a@b.com", "secret").await.unwrap();
    store.set_session(&session).unwrap();

    auth.logout().await.unwrap();

    assert_eq!(store.get().unwrap(), None);
    assert_eq!(store.session().unwrap(), None);
    let sent = server.state.requests_to("/auth/api/v1/logout");
    assert_eq!(sent[0].authorization.as_deref(), Some("Bearer T1"));
}

#[tokio::test]
async fn test_logout_rejected_still_clears_store() {
    let server = MockServer::start().await;
    server.state.set_logout_status(500);
    let store = memory_store();
    let auth = AuthClient::new(server.api(), store.clone());
    auth.login("a@b.com", "secret").await.unwrap();

    let err = auth.logout().await.unwrap_err();
    assert!(matches!(err, ApiError::LogoutRejected { status: 500 }));
    assert_eq!(store.get().unwrap(), None);
}

#[tokio::test]
async fn test_logout_unreachable_server_still_clears_store() {
    let store = memory_store();
    store.set("T1").unwrap();
    // Port 1 refuses connections
    let api = ApiClient::new("http://127.0.0.1:1").unwrap();
    let auth = AuthClient::new(api, store.clone());

    let err = auth.logout().await.unwrap_err();
    assert!(matches!(err, ApiError::Network(_)));
    assert_eq!(store.get().unwrap(), None);
}

#[tokio::test]
async fn test_logout_without_token_skips_network() {
    let server = MockServer::start().await;
    let auth = AuthClient::new(server.api(), memory_store());

    auth.logout().await.unwrap();
    assert_eq!(server.state.request_count(), 0);
}

#[tokio::test]
async fn test_duplicate_login_is_rejected_while_in_flight() {
    let server = MockServer::start().await;
    let store = memory_store();
    let auth = AuthClient::new(server.api(), store.clone());
    let second = auth.clone();

    let (first, duplicate) = tokio::join!(
        auth.login("slow@b.com", "secret"),
        second.login("slow@b.com", "secret"),
    );

    assert_eq!(first.unwrap().access_token, "T1");
    assert!(matches!(
        duplicate.unwrap_err(),
        ApiError::RequestInFlight(Operation::Login)
    ));
    assert_eq!(server.state.requests_to("/auth/api/v1/login").len(), 1);

    // Slot is released once the first call completes
    auth.login("a@b.com", "secret").await.unwrap();
}

#[tokio::test]
async fn test_in_flight_guard_is_per_operation() {
    let server = MockServer::start().await;
    let store = memory_store();
    store.set("T1").unwrap();
    let api = server.api();
    let auth = AuthClient::new(api.clone(), store.clone());
    let tasks = TaskClient::new(api, store);

    let (login, listed) = tokio::join!(auth.login("slow@b.com", "secret"), tasks.fetch_tasks("T1"));
    assert!(login.is_ok());
    assert_eq!(listed.unwrap().len(), 2);
}
