//! Children, profile and shopping-list calls.

use super::harness::{child_json, client, list_json, signed_in, MockBackend};
use crate::{
    ApiError, CreateChildRequest, ListStatus, ListType, UpdateProfileRequest,
    MIN_IMAGE_BASE64_LEN,
};
use auth_gateway::Method;
use serde_json::json;

#[tokio::test]
async fn create_child_posts_default_allowance() {
    let backend = MockBackend::new();
    backend.accept_token("T1");
    backend.on(Method::POST, "/api/Children", 201, child_json("c1", 0.0, 0));
    let client = client(&backend, signed_in("T1", "R1"));

    let child = client
        .create_child(CreateChildRequest::new("kid@example.com", "secret1", "Ana", "Kovac"))
        .await
        .unwrap();

    assert_eq!(child.id, "c1");
    let body = backend.requests_to("/api/Children")[0].body.clone().unwrap();
    assert_eq!(body["monthlyAllowance"], json!(0.0));
    assert_eq!(body["firstName"], json!("Ana"));
}

#[tokio::test]
async fn deduct_points_returns_updated_child() {
    let backend = MockBackend::new();
    backend.accept_token("T1");
    backend.on(
        Method::POST,
        "/api/Children/c1/deduct-points",
        200,
        child_json("c1", 40.0, 2),
    );
    let client = client(&backend, signed_in("T1", "R1"));

    let child = client.deduct_child_points("c1", 3).await.unwrap();

    assert_eq!(child.points, 2);
    assert_eq!(
        backend.requests_to("/api/Children/c1/deduct-points")[0].body,
        Some(json!({"points": 3}))
    );
}

#[tokio::test]
async fn invalid_amounts_fail_before_sending() {
    let backend = MockBackend::new();
    backend.accept_token("T1");
    let client = client(&backend, signed_in("T1", "R1"));

    assert!(matches!(
        client.deduct_child_points("c1", 0).await,
        Err(ApiError::Validation(_))
    ));
    assert!(matches!(
        client.deduct_child_balance("c1", -5.0).await,
        Err(ApiError::Validation(_))
    ));
    assert!(matches!(
        client.update_child_allowance("c1", -1.0).await,
        Err(ApiError::Validation(_))
    ));
    assert!(matches!(
        client.complete_item("l1", "i1", 0.0).await,
        Err(ApiError::Validation(_))
    ));
    assert!(backend.requests().is_empty());
}

#[tokio::test]
async fn backend_error_message_is_surfaced() {
    let backend = MockBackend::new();
    backend.accept_token("T1");
    backend.on(
        Method::POST,
        "/api/ShoppingLists/l1/items",
        400,
        json!({"error": "Cannot add items to this list."}),
    );
    let client = client(&backend, signed_in("T1", "R1"));

    let err = client.add_item("l1", "Milk").await.unwrap_err();

    assert_eq!(err.to_string(), "400: Cannot add items to this list.");
    assert_eq!(err.status(), Some(400));
}

#[tokio::test]
async fn fallback_message_when_body_has_none() {
    let backend = MockBackend::new();
    backend.accept_token("T1");
    backend.on_text(Method::PUT, "/api/ShoppingLists/l1/approve", 403, "");
    let client = client(&backend, signed_in("T1", "R1"));

    let err = client.approve_list("l1").await.unwrap_err();

    assert_eq!(err.to_string(), "403: Could not approve list");
}

#[tokio::test]
async fn create_list_sends_integer_type() {
    let backend = MockBackend::new();
    backend.accept_token("T1");
    backend.on(Method::POST, "/api/ShoppingLists", 201, list_json("l1", 0));
    let client = client(&backend, signed_in("T1", "R1"));

    let list = client
        .create_shopping_list("  Groceries ", ListType::Emergency)
        .await
        .unwrap();

    assert_eq!(list.status, ListStatus::Pending);
    assert_eq!(
        backend.requests_to("/api/ShoppingLists")[0].body,
        Some(json!({"title": "Groceries", "type": 1}))
    );
}

#[tokio::test]
async fn delete_accepts_no_content() {
    let backend = MockBackend::new();
    backend.accept_token("T1");
    backend.on(Method::DELETE, "/api/ShoppingLists/l1/items/i1", 204, json!(null));
    backend.on(Method::DELETE, "/api/ShoppingLists/l1", 204, json!(null));
    let client = client(&backend, signed_in("T1", "R1"));

    client.delete_item("l1", "i1").await.unwrap();
    client.delete_list("l1").await.unwrap();

    assert_eq!(backend.requests().len(), 2);
}

#[tokio::test]
async fn parent_reviews_child_lists() {
    let backend = MockBackend::new();
    backend.accept_token("T1");
    backend.on(
        Method::GET,
        "/api/children/c1/shopping-lists/pending",
        200,
        json!([list_json("l1", 0), list_json("l2", 0)]),
    );
    backend.on(Method::PUT, "/api/ShoppingLists/l1/reject", 200, list_json("l1", 2));
    let client = client(&backend, signed_in("T1", "R1"));

    let pending = client.child_pending_lists("c1").await.unwrap();
    let rejected = client.reject_list(&pending[0].id).await.unwrap();

    assert_eq!(pending.len(), 2);
    assert_eq!(rejected.status, ListStatus::Rejected);
}

#[tokio::test]
async fn verify_item_posts_image() {
    let backend = MockBackend::new();
    backend.accept_token("T1");
    backend.on(
        Method::POST,
        "/api/ShoppingLists/l1/items/i1/verify",
        200,
        json!({
            "isMatch": true,
            "confidence": 0.91,
            "ocrText": "MLIJEKO 1L 2,49",
            "extractedPrice": "2,49",
            "message": "ok"
        }),
    );
    let client = client(&backend, signed_in("T1", "R1"));
    let image = "A".repeat(MIN_IMAGE_BASE64_LEN);

    let result = client.verify_item("l1", "i1", &image).await.unwrap();

    assert!(result.is_match);
    assert_eq!(result.extracted_price_value(), Some(2.49));
    let body = backend.requests_to("/api/ShoppingLists/l1/items/i1/verify")[0]
        .body
        .clone()
        .unwrap();
    assert_eq!(body["imageBase64"], json!(image));
}

#[tokio::test]
async fn update_item_omits_missing_price() {
    let backend = MockBackend::new();
    backend.accept_token("T1");
    backend.on(
        Method::PUT,
        "/api/ShoppingLists/l1/items/i1",
        200,
        json!({"id": "i1", "name": "Bread", "price": null, "isCompleted": false}),
    );
    let client = client(&backend, signed_in("T1", "R1"));

    let item = client.update_item("l1", "i1", "Bread", None).await.unwrap();

    assert_eq!(item.name, "Bread");
    assert_eq!(
        backend.requests_to("/api/ShoppingLists/l1/items/i1")[0].body,
        Some(json!({"name": "Bread"}))
    );
}

#[tokio::test]
async fn empty_profile_update_is_rejected() {
    let backend = MockBackend::new();
    let client = client(&backend, signed_in("T1", "R1"));

    let err = client
        .update_profile(UpdateProfileRequest::default())
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::Validation(_)));
}

#[tokio::test]
async fn non_json_success_body_is_decode_error() {
    let backend = MockBackend::new();
    backend.accept_token("T1");
    backend.on_text(Method::GET, "/api/Me", 200, "<html>maintenance</html>");
    let client = client(&backend, signed_in("T1", "R1"));

    let err = client.get_profile().await.unwrap_err();

    assert!(matches!(err, ApiError::Decode(_)));
}
