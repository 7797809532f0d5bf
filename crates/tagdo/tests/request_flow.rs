//! End-to-end flows through the client: logging in from a login response,
//! attaching the credential, reacting to rejections, and what the route
//! guards decide along the way.

use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde_json::json;
use tagdo::prelude::*;
use tagdo::{SESSION_EXPIRED, UNAUTHORIZED, parse_login_response};
use tagdo_session::{Clock, TokioClock};
use tokio::time::sleep;

fn token_for(user: &str, exp: i64) -> String {
    let payload = json!({
        "userId": user,
        "email": "ada@example.com",
        "name": "Ada",
        "surname": "Lovelace",
        "permissions": 3,
        "exp": exp,
    });
    let body = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&payload).unwrap());
    format!("h.{body}.s")
}

fn client(storage: MemoryStorage, clock: TokioClock) -> Client {
    Client::builder().clock(clock).build(storage)
}

#[tokio::test(start_paused = true)]
async fn test_login_response_then_authorized_request() {
    let clock = TokioClock::new();
    let client = client(MemoryStorage::open(MemoryBackend::new()), clock);
    let auth = client.request_auth();
    assert_eq!(auth.authorization(), None);

    let token = parse_login_response(200, &token_for("u-1", clock.now_secs() + 600)).unwrap();
    client.store().set(token.clone());

    assert_eq!(auth.authorization(), Some(format!("Bearer {token}")));
    assert_eq!(client.navigate(Guard::Protected, "/todos"), Navigation::Allow);
    assert_eq!(
        client.navigate(Guard::RedirectIfAuthenticated, "/login"),
        Navigation::Redirect { to: "/".into(), from: None }
    );
}

#[tokio::test(start_paused = true)]
async fn test_unauthorized_response_logs_out() {
    let clock = TokioClock::new();
    let client = client(MemoryStorage::open(MemoryBackend::new()), clock);
    client.store().set(token_for("u-1", clock.now_secs() + 600));
    let auth = client.request_auth();

    let err = auth
        .check_response(UNAUTHORIZED, r#"{"title":"Unauthorized"}"#)
        .unwrap_err();

    assert_eq!(err.status, 401);
    assert_eq!(err.to_string(), "Request failed (401)");
    assert_eq!(auth.authorization(), None);
    assert_eq!(
        client.navigate(Guard::Protected, "/todos"),
        Navigation::Redirect {
            to: "/login".into(),
            from: Some("/todos".into()),
        }
    );
}

#[tokio::test(start_paused = true)]
async fn test_session_expired_status_logs_out() {
    let clock = TokioClock::new();
    let client = client(MemoryStorage::open(MemoryBackend::new()), clock);
    client.store().set(token_for("u-1", clock.now_secs() + 600));

    assert!(client.request_auth().on_response_status(SESSION_EXPIRED));
    assert!(!client.store().snapshot().authenticated);
}

#[tokio::test(start_paused = true)]
async fn test_other_failures_keep_session() {
    let clock = TokioClock::new();
    let client = client(MemoryStorage::open(MemoryBackend::new()), clock);
    client.store().set(token_for("u-1", clock.now_secs() + 600));
    let auth = client.request_auth();

    assert!(!auth.on_response_status(403));
    let err = auth.check_response(500, "oops").unwrap_err();

    assert_eq!(err.details, Some(json!("oops")));
    assert!(client.store().snapshot().authenticated);
    assert!(auth.check_response(204, "").is_ok());
}

#[tokio::test(start_paused = true)]
async fn test_guard_flips_when_token_expires() {
    let clock = TokioClock::new();
    let client = client(MemoryStorage::open(MemoryBackend::new()), clock);
    client.store().set(token_for("u-1", clock.now_secs() + 1));
    assert_eq!(client.navigate(Guard::Protected, "/"), Navigation::Allow);

    sleep(Duration::from_millis(1_500)).await;

    assert_eq!(
        client.navigate(Guard::Protected, "/"),
        Navigation::Redirect {
            to: "/login".into(),
            from: Some("/".into()),
        }
    );
    assert_eq!(client.request_auth().authorization(), None);
}

#[tokio::test(start_paused = true)]
async fn test_logout_in_one_client_reaches_the_other() {
    let clock = TokioClock::new();
    let tab_a = MemoryStorage::open(MemoryBackend::new());
    let tab_b = tab_a.new_context();
    let client_a = client(tab_a, clock);
    let client_b = client(tab_b, clock);
    assert!(!client_b.store().snapshot().authenticated);
    client_a.store().set(token_for("u-1", clock.now_secs() + 600));
    // Let tab B's sync task pick up the login.
    sleep(Duration::from_millis(10)).await;
    assert!(client_b.store().snapshot().authenticated);

    client_a.request_auth().on_response_status(UNAUTHORIZED);
    sleep(Duration::from_millis(10)).await;

    assert!(!client_b.store().snapshot().authenticated);
}

#[tokio::test(start_paused = true)]
async fn test_provider_scope_through_client() {
    let clock = TokioClock::new();
    let client = client(MemoryStorage::open(MemoryBackend::new()), clock);
    let token = token_for("u-9", clock.now_secs() + 600);

    let name = client
        .provider()
        .scope(async {
            let auth = use_auth()?;
            auth.set_token(token);
            Ok::<_, TagdoError>(auth.claims().map(|c| c.display_name()))
        })
        .await
        .unwrap();

    assert_eq!(name.as_deref(), Some("Ada Lovelace"));
}
