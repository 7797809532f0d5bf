use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use tagdo::prelude::*;
use tracing_subscriber::EnvFilter;

// ---------------------------------------------------------------------------
// Token minting
// ---------------------------------------------------------------------------

/// Builds an unsigned token the way the API would issue one. The client
/// never checks signatures, so the last segment can be anything.
fn mint(user: &str, ttl_secs: i64) -> Token {
    let payload = serde_json::json!({
        "userId": user,
        "email": format!("{user}@tagdo.local"),
        "name": "Ada",
        "surname": "Lovelace",
        "permissions": 0b11,
        "exp": SystemClock.now_secs() + ttl_secs,
    });
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"none","typ":"JWT"}"#);
    let body = URL_SAFE_NO_PAD.encode(payload.to_string());
    format!("{header}.{body}.demo")
}

fn print_snapshot(tab: &str, client: &Client) -> Result<(), serde_json::Error> {
    let snapshot = client.store().snapshot();
    println!("[{tab}] {}", serde_json::to_string(&snapshot)?);
    Ok(())
}

// ---------------------------------------------------------------------------
// Two tabs, one login
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let tab_a = MemoryStorage::open(MemoryBackend::new());
    let tab_b = tab_a.new_context();
    let a = Client::builder().build(tab_a);
    let b = Client::builder().build(tab_b);

    // Build both stores up front so tab B is listening before the login.
    print_snapshot("a", &a)?;
    print_snapshot("b", &b)?;

    tracing::info!("logging in on tab a");
    let token = parse_login(&mint("demo-user", 2))?;
    a.store().set(token);
    tokio::time::sleep(Duration::from_millis(50)).await;
    print_snapshot("b", &b)?;
    println!("[b] guard on /todos: {:?}", b.navigate(Guard::Protected, "/todos"));

    tracing::info!("waiting for the token to expire");
    tokio::time::sleep(Duration::from_millis(2_500)).await;
    print_snapshot("a", &a)?;
    print_snapshot("b", &b)?;
    println!("[b] guard on /todos: {:?}", b.navigate(Guard::Protected, "/todos"));

    tracing::info!("logging in again, then the server rejects the credential");
    a.store().set(mint("demo-user", 3600));
    tokio::time::sleep(Duration::from_millis(50)).await;
    if let Err(err) = a.request_auth().check_response(401, "") {
        println!("[a] request failed: {err}");
    }
    tokio::time::sleep(Duration::from_millis(50)).await;
    print_snapshot("b", &b)?;

    Ok(())
}

fn parse_login(body: &str) -> Result<Token, TagdoError> {
    Ok(tagdo::parse_login_response(200, body)?)
}
