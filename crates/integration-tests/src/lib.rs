//! Integration tests for Zestify.
//!
//! The tests in `tests/` drive a running storefront over HTTP and use the
//! storefront database directly to create fixtures.
//!
//! # Running Tests
//!
//! ```bash
//! cargo run -p zestify-cli -- migrate
//! cargo run -p zestify-storefront &
//! cargo test -p zestify-integration-tests -- --ignored
//! ```
//!
//! # Environment Variables
//!
//! - `STOREFRONT_BASE_URL` - Storefront under test (default: `http://localhost:8000`)
//! - `STOREFRONT_DATABASE_URL` / `DATABASE_URL` - Its database

#![allow(clippy::missing_panics_doc, clippy::expect_used)]

use reqwest::{Client, Response, StatusCode, header};
use sqlx::PgPool;
use uuid::Uuid;

use zestify_core::ProductId;

/// Password used by every test account.
pub const TEST_PASSWORD: &str = "correct-horse-42";

/// Base URL of the storefront under test.
#[must_use]
pub fn base_url() -> String {
    dotenvy::dotenv().ok();
    std::env::var("STOREFRONT_BASE_URL").unwrap_or_else(|_| "http://localhost:8000".to_string())
}

/// A cookie-keeping client that does not follow redirects, so tests can
/// assert on `Location`.
///
/// Each client claims its own `X-Forwarded-For` address so the login rate
/// limiter treats test clients independently.
#[must_use]
pub fn client() -> Client {
    let [a, b, c, ..] = *Uuid::new_v4().as_bytes();
    let mut headers = header::HeaderMap::new();
    headers.insert(
        "x-forwarded-for",
        header::HeaderValue::from_str(&format!("10.{a}.{b}.{c}"))
            .expect("valid forwarded-for header"),
    );

    Client::builder()
        .default_headers(headers)
        .cookie_store(true)
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .expect("Failed to create HTTP client")
}

/// Connect to the storefront database.
pub async fn pool() -> PgPool {
    dotenvy::dotenv().ok();
    let url = std::env::var("STOREFRONT_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .expect("STOREFRONT_DATABASE_URL or DATABASE_URL must be set");
    PgPool::connect(&url).await.expect("Failed to connect to database")
}

/// Insert a product with a unique name and return its ID and name.
pub async fn create_product(pool: &PgPool, price: &str) -> (ProductId, String) {
    let name = format!("Test Product {}", Uuid::new_v4().simple());
    let (id,): (i64,) = sqlx::query_as(
        r"
        INSERT INTO storefront.product (name, description, price)
        VALUES ($1, 'Integration test product', $2::NUMERIC)
        RETURNING id
        ",
    )
    .bind(&name)
    .bind(price)
    .fetch_one(pool)
    .await
    .expect("Failed to insert product");
    (ProductId::new(id), name)
}

/// Delete a product, leaving any cart lines that point at it as ghosts.
pub async fn delete_product(pool: &PgPool, id: ProductId) {
    sqlx::query("DELETE FROM storefront.product WHERE id = $1")
        .bind(id.as_i64())
        .execute(pool)
        .await
        .expect("Failed to delete product");
}

/// Register a fresh account and log `client` in. Returns the username.
pub async fn register_and_login(client: &Client) -> String {
    let base = base_url();
    let suffix: String = Uuid::new_v4().simple().to_string().chars().take(12).collect();
    let username = format!("user_{suffix}");
    let email = format!("{username}@example.com");

    let resp = client
        .post(format!("{base}/register"))
        .form(&[
            ("username", username.as_str()),
            ("email", email.as_str()),
            ("password", TEST_PASSWORD),
            ("confirm_password", TEST_PASSWORD),
        ])
        .send()
        .await
        .expect("register request failed");
    assert_eq!(location(&resp).as_deref(), Some("/login"));

    let resp = client
        .post(format!("{base}/login"))
        .form(&[("username", username.as_str()), ("password", TEST_PASSWORD)])
        .send()
        .await
        .expect("login request failed");
    assert_eq!(location(&resp).as_deref(), Some("/dashboard"));

    username
}

/// The `Location` of a 303 response.
#[must_use]
pub fn location(resp: &Response) -> Option<String> {
    if resp.status() != StatusCode::SEE_OTHER {
        return None;
    }
    resp.headers()
        .get(header::LOCATION)?
        .to_str()
        .ok()
        .map(String::from)
}

/// GET a page and return its body, asserting a 200.
pub async fn page(client: &Client, path: &str) -> String {
    let resp = client
        .get(format!("{}{path}", base_url()))
        .send()
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::OK, "GET {path}");
    resp.text().await.expect("failed to read body")
}
