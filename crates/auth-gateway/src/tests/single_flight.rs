//! Concurrent 401s share a single refresh.

use super::harness::{request, MockRefresher, RefreshBehavior, TestHarness};
use crate::{AuthPath, Credentials, RefreshState, StatusCode};
use futures_util::future::join_all;
use std::time::Duration;

const CONCURRENT_CALLERS: usize = 8;

#[tokio::test(start_paused = true)]
async fn concurrent_unauthorized_callers_share_one_refresh() {
    let h = TestHarness::new(
        Credentials::new("T1", "R1"),
        MockRefresher::succeed_with("T2", Some("R2")),
    );
    h.refresher.set_delay(Duration::from_millis(100));
    h.transport.accept_token("T2");

    let requests: Vec<_> = (0..CONCURRENT_CALLERS)
        .map(|i| request(&format!("Children/{}", i)))
        .collect();
    let results = join_all(requests.iter().map(|r| h.gateway.send(r))).await;

    for result in results {
        let result = result.unwrap();
        assert_eq!(result.response.status, StatusCode::OK);
        assert_eq!(result.auth, AuthPath::RetriedAfterRefresh);
    }
    assert_eq!(h.refresher.calls(), 1, "exactly one refresh call");
    assert_eq!(h.store.update_count(), 1);
    assert_eq!(h.transport.request_count(), CONCURRENT_CALLERS * 2);
    let retried_with_new_token = h
        .transport
        .authorizations()
        .into_iter()
        .filter(|a| a.as_deref() == Some("Bearer T2"))
        .count();
    assert_eq!(retried_with_new_token, CONCURRENT_CALLERS);
}

#[tokio::test(start_paused = true)]
async fn two_callers_both_retry_with_refreshed_token() {
    let h = TestHarness::new(
        Credentials::new("T1", "R1"),
        MockRefresher::succeed_with("T2", Some("R2")),
    );
    h.refresher.set_delay(Duration::from_millis(50));
    h.transport.accept_token("T2");

    let a = request("ShoppingLists/active");
    let b = request("ShoppingLists/pending");
    let (ra, rb) = tokio::join!(h.gateway.send(&a), h.gateway.send(&b));

    assert_eq!(ra.unwrap().response.status, StatusCode::OK);
    assert_eq!(rb.unwrap().response.status, StatusCode::OK);
    assert_eq!(h.refresher.calls(), 1);

    let requests = h.transport.requests();
    for url in [&a.url, &b.url] {
        let last = requests.iter().filter(|r| &r.url == url).last().unwrap();
        assert_eq!(last.authorization.as_deref(), Some("Bearer T2"));
    }
}

#[tokio::test(start_paused = true)]
async fn store_holds_new_token_before_retry_is_issued() {
    let h = TestHarness::new(
        Credentials::new("T1", "R1"),
        MockRefresher::succeed_with("T2", None),
    );
    h.refresher.set_delay(Duration::from_millis(20));
    h.transport.accept_token("T2");

    let (a, b) = (request("Children"), request("Me"));
    let _ = tokio::join!(h.gateway.send(&a), h.gateway.send(&b));

    let retries: Vec<_> = h
        .transport
        .requests()
        .into_iter()
        .filter(|r| r.authorization.as_deref() == Some("Bearer T2"))
        .collect();
    assert_eq!(retries.len(), 2);
    for retry in retries {
        assert_eq!(retry.store_access_token.as_deref(), Some("T2"));
    }
}

#[tokio::test(start_paused = true)]
async fn concurrent_callers_share_refresh_failure() {
    let h = TestHarness::new(
        Credentials::new("T1", "R1"),
        MockRefresher::new(RefreshBehavior::Reject(400)),
    );
    h.refresher.set_delay(Duration::from_millis(50));

    let requests: Vec<_> = (0..4).map(|i| request(&format!("Children/{}", i))).collect();
    let results = join_all(requests.iter().map(|r| h.gateway.send(r))).await;

    for result in results {
        let result = result.unwrap();
        assert_eq!(result.response.status, StatusCode::UNAUTHORIZED);
        assert_eq!(result.auth, AuthPath::RefreshUnavailable);
    }
    assert_eq!(h.refresher.calls(), 1);
    assert_eq!(h.logout.calls(), 4, "each waiter signals logout");
    assert_eq!(h.transport.request_count(), 4, "no retries after failed refresh");
}

#[tokio::test(start_paused = true)]
async fn state_is_refreshing_while_refresh_in_flight() {
    let h = TestHarness::new(
        Credentials::new("T1", "R1"),
        MockRefresher::succeed_with("T2", None),
    );
    h.refresher.set_delay(Duration::from_millis(100));
    h.transport.accept_token("T2");
    assert_eq!(h.gateway.refresh_state(), RefreshState::Idle);

    let gateway = h.gateway.clone();
    let handle = tokio::spawn(async move { gateway.send(&request("Children")).await });

    tokio::time::sleep(Duration::from_millis(10)).await;
    assert_eq!(h.gateway.refresh_state(), RefreshState::Refreshing);

    let result = handle.await.unwrap().unwrap();
    assert_eq!(result.response.status, StatusCode::OK);
    assert_eq!(h.gateway.refresh_state(), RefreshState::Idle);
}

#[tokio::test(start_paused = true)]
async fn late_caller_joins_in_flight_refresh() {
    let h = TestHarness::new(
        Credentials::new("T1", "R1"),
        MockRefresher::succeed_with("T2", None),
    );
    h.refresher.set_delay(Duration::from_millis(100));
    h.transport.accept_token("T2");

    let gateway = h.gateway.clone();
    let first = tokio::spawn(async move { gateway.send(&request("Children")).await });
    tokio::time::sleep(Duration::from_millis(60)).await;

    // Arrives while the first refresh is still running.
    let second = h
        .gateway
        .send_authenticated(&request("Me"), Some("T1"), true)
        .await
        .unwrap();

    assert_eq!(second.response.status, StatusCode::OK);
    assert_eq!(first.await.unwrap().unwrap().response.status, StatusCode::OK);
    assert_eq!(h.refresher.calls(), 1);
}
