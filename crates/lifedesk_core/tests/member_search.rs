mod common;

use common::signed_in;
use lifedesk_core::controller::MemberSearch;
use lifedesk_core::ClientConfig;
use serde_json::json;
use std::time::Duration;

fn config() -> ClientConfig {
    ClientConfig::new("http://localhost:8000/api/v1", std::env::temp_dir()).unwrap()
}

#[tokio::test(start_paused = true)]
async fn short_query_clears_results_without_request() {
    let h = signed_in();
    let search = MemberSearch::new(h.ctx.clone(), &config());

    search.set_query("a");
    tokio::time::sleep(Duration::from_secs(2)).await;

    assert!(search.results().is_empty());
    assert_eq!(h.transport.request_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn only_latest_query_is_sent_after_quiet_period() {
    let h = signed_in();
    h.transport.reply(
        "GET /users/search?query=ali",
        json!([{"id": 4, "username": "alice", "email": "alice@example.com"}]),
    );
    let search = MemberSearch::new(h.ctx.clone(), &config());

    search.set_query("al");
    tokio::time::sleep(Duration::from_millis(200)).await;
    search.set_query("ali");
    tokio::time::sleep(Duration::from_millis(499)).await;
    assert_eq!(h.transport.request_count(), 0);

    search.settle().await;

    assert_eq!(h.transport.routes(), vec!["GET /users/search?query=ali"]);
    assert_eq!(search.results()[0].username, "alice");
    assert_eq!(search.query(), "ali");
}

#[tokio::test(start_paused = true)]
async fn late_response_for_replaced_query_is_discarded() {
    let h = signed_in();
    let release_al = h.transport.gated_reply(
        "GET /users/search?query=al",
        json!([{"id": 4, "username": "alice"}, {"id": 5, "username": "alan"}]),
    );
    h.transport.reply(
        "GET /users/search?query=bob",
        json!([{"id": 2, "username": "bob"}]),
    );
    let search = MemberSearch::new(h.ctx.clone(), &config());

    search.set_query("al");
    h.transport.wait_for_requests(1).await;
    assert!(search.is_loading());

    search.set_query("bob");
    search.settle().await;
    let usernames = |search: &MemberSearch| {
        search
            .results()
            .into_iter()
            .map(|user| user.username)
            .collect::<Vec<_>>()
    };
    assert_eq!(usernames(&search), vec!["bob"]);

    release_al.send(()).unwrap();
    tokio::time::sleep(Duration::from_millis(10)).await;

    assert_eq!(usernames(&search), vec!["bob"]);
    assert_eq!(search.query(), "bob");
    assert!(!search.is_loading());
    assert_eq!(
        h.transport.routes(),
        vec!["GET /users/search?query=al", "GET /users/search?query=bob"]
    );
}

#[tokio::test(start_paused = true)]
async fn shortening_query_drops_previous_results() {
    let h = signed_in();
    h.transport.reply(
        "GET /users/search?query=bo",
        json!([{"id": 2, "username": "bob"}]),
    );
    let search = MemberSearch::new(h.ctx.clone(), &config());
    search.set_query("bo");
    search.settle().await;
    assert_eq!(search.results().len(), 1);

    search.set_query("b");

    assert!(search.results().is_empty());
    assert_eq!(h.transport.request_count(), 1);
}
