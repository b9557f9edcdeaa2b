//! Expired access tokens, refresh and the error taxonomy.

use super::harness::{auth_json, child_json, client, list_json, signed_in, MockBackend};
use crate::{ApiError, ListBucket, SessionState};
use auth_gateway::{Credentials, Method, TokenStore};
use serde_json::json;
use std::time::Duration;

#[tokio::test]
async fn expired_token_is_refreshed_and_request_retried() {
    let backend = MockBackend::new();
    backend.accept_token("T2");
    backend.on(Method::POST, "/api/Auth/refresh", 200, auth_json("T2", "R2", "Parent"));
    backend.on(Method::GET, "/api/Children", 200, json!([child_json("c1", 10.0, 3)]));
    let client = client(&backend, signed_in("T1", "R1"));

    let children = client.list_children().await.unwrap();

    assert_eq!(children.len(), 1);
    assert_eq!(client.session().credentials(), Credentials::new("T2", "R2"));
    let refresh = &backend.requests_to("/api/Auth/refresh")[0];
    assert_eq!(refresh.body, Some(json!({"refreshToken": "R1"})));
    assert_eq!(refresh.authorization, None);
    let attempts: Vec<_> = backend
        .requests_to("/api/Children")
        .into_iter()
        .map(|r| r.authorization)
        .collect();
    assert_eq!(
        attempts,
        vec![Some("Bearer T1".to_string()), Some("Bearer T2".to_string())]
    );
}

#[tokio::test]
async fn rejected_refresh_expires_session() {
    let backend = MockBackend::new();
    backend.accept_token("T2");
    backend.on(
        Method::POST,
        "/api/Auth/refresh",
        400,
        json!({"error": "Invalid refresh token."}),
    );
    let client = client(&backend, signed_in("T1", "R1"));

    let err = client.get_profile().await.unwrap_err();

    assert!(matches!(err, ApiError::AuthExpired));
    assert!(err.requires_sign_in());
    assert_eq!(client.session().state(), SessionState::SignedOut);
}

#[tokio::test]
async fn missing_refresh_token_expires_session_without_refresh_call() {
    let backend = MockBackend::new();
    backend.accept_token("T2");
    let session = crate::Session::with_tokens(Some("T1".into()), None);
    let client = client(&backend, session);

    let err = client.my_lists(ListBucket::Active).await.unwrap_err();

    assert!(matches!(err, ApiError::AuthExpired));
    assert!(backend.requests_to("/api/Auth/refresh").is_empty());
    assert_eq!(client.session().state(), SessionState::SignedOut);
}

#[tokio::test]
async fn unauthorized_after_refresh_is_retry_exhausted() {
    let backend = MockBackend::new();
    backend.accept_token("someone-else");
    backend.on(Method::POST, "/api/Auth/refresh", 200, auth_json("T2", "R2", "Child"));
    let client = client(&backend, signed_in("T1", "R1"));

    let err = client.my_lists(ListBucket::Pending).await.unwrap_err();

    assert!(matches!(err, ApiError::RetryExhausted));
    assert_eq!(backend.requests_to("/api/Auth/refresh").len(), 1);
    assert_eq!(backend.requests_to("/api/ShoppingLists/pending").len(), 2);
}

#[tokio::test(start_paused = true)]
async fn concurrent_calls_share_one_refresh() {
    let backend = MockBackend::new();
    backend.accept_token("T2");
    backend.set_refresh_delay(Duration::from_millis(100));
    backend.on(Method::POST, "/api/Auth/refresh", 200, auth_json("T2", "R2", "Child"));
    backend.on(Method::GET, "/api/ShoppingLists/active", 200, json!([list_json("l1", 0)]));
    backend.on(Method::GET, "/api/ShoppingLists/pending", 200, json!([]));
    let client = client(&backend, signed_in("T1", "R1"));

    let (active, pending) = tokio::join!(
        client.my_lists(ListBucket::Active),
        client.my_lists(ListBucket::Pending)
    );

    assert_eq!(active.unwrap().len(), 1);
    assert!(pending.unwrap().is_empty());
    assert_eq!(backend.requests_to("/api/Auth/refresh").len(), 1);
}

#[tokio::test]
async fn network_error_is_not_retried() {
    let backend = MockBackend::new();
    backend.accept_token("T1");
    backend.fail(Method::GET, "/api/Me");
    let client = client(&backend, signed_in("T1", "R1"));

    let err = client.get_profile().await.unwrap_err();

    assert!(matches!(err, ApiError::Network(_)));
    assert!(err.is_transient());
    assert_eq!(backend.requests().len(), 1);
}

#[tokio::test]
async fn refresh_network_error_expires_session() {
    let backend = MockBackend::new();
    backend.accept_token("T2");
    backend.fail(Method::POST, "/api/Auth/refresh");
    let client = client(&backend, signed_in("T1", "R1"));

    let err = client.list_children().await.unwrap_err();

    assert!(matches!(err, ApiError::AuthExpired));
}

#[tokio::test(start_paused = true)]
async fn sign_out_during_refresh_stays_signed_out() {
    let backend = MockBackend::new();
    backend.accept_token("T2");
    backend.set_refresh_delay(Duration::from_millis(100));
    backend.on(Method::POST, "/api/Auth/refresh", 200, auth_json("T2", "R2", "Parent"));
    backend.on(Method::GET, "/api/Children", 200, json!([]));
    let client = client(&backend, signed_in("T1", "R1"));

    let (result, _) = tokio::join!(client.list_children(), async {
        tokio::time::sleep(Duration::from_millis(50)).await;
        client.session().sign_out();
    });

    assert!(matches!(result.unwrap_err(), ApiError::AuthExpired));
    assert_eq!(client.session().state(), SessionState::SignedOut);
    assert_eq!(client.session().access_token(), None);
    assert_eq!(backend.requests_to("/api/Children").len(), 1);
}

#[tokio::test(start_paused = true)]
async fn sign_in_during_refresh_keeps_new_session() {
    let backend = MockBackend::new();
    backend.accept_token("T2");
    backend.set_refresh_delay(Duration::from_millis(100));
    backend.on(Method::POST, "/api/Auth/refresh", 200, auth_json("T2", "R2", "Parent"));
    let client = client(&backend, signed_in("T1", "R1"));
    let fresh: crate::AuthResponse =
        serde_json::from_value(auth_json("T9", "R9", "Child")).unwrap();

    let (result, _) = tokio::join!(client.get_profile(), async {
        tokio::time::sleep(Duration::from_millis(50)).await;
        client.session().sign_in(&fresh);
    });

    assert!(result.is_err());
    assert_eq!(client.session().state(), SessionState::SignedIn);
    assert_eq!(client.session().credentials(), Credentials::new("T9", "R9"));
}
