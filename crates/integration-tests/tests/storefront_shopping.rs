//! End-to-end shopping flows against a running storefront.
//!
//! These tests require:
//! - A migrated `PostgreSQL` database (`zestify migrate`)
//! - The storefront running (`cargo run -p zestify-storefront`)
//!
//! Run with: `cargo test -p zestify-integration-tests -- --ignored`

#![allow(clippy::expect_used)]

use reqwest::StatusCode;

use zestify_integration_tests::{
    base_url, client, create_product, delete_product, location, page, pool, register_and_login,
};

#[tokio::test]
#[ignore = "Requires running storefront and database"]
async fn test_health_endpoints() {
    let client = client();
    let base = base_url();

    let resp = client.get(format!("{base}/health")).send().await.expect("health");
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = client
        .get(format!("{base}/health/ready"))
        .send()
        .await
        .expect("readiness");
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
#[ignore = "Requires running storefront and database"]
async fn test_search_finds_product_by_name() {
    let pool = pool().await;
    let (_, name) = create_product(&pool, "49.99").await;
    let client = client();

    let body = page(&client, &format!("/search?q={}", name.replace(' ', "+"))).await;
    assert!(body.contains(&name));

    let body = page(&client, "/search?q=no-such-product-anywhere").await;
    assert!(!body.contains(&name));
}

#[tokio::test]
#[ignore = "Requires running storefront and database"]
async fn test_unknown_product_is_not_found() {
    let resp = client()
        .get(format!("{}/product/999999999", base_url()))
        .send()
        .await
        .expect("request");
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "Requires running storefront and database"]
async fn test_anonymous_cart_add_and_remove() {
    let pool = pool().await;
    let (id, name) = create_product(&pool, "10.00").await;
    let client = client();
    let base = base_url();

    let resp = client
        .post(format!("{base}/cart/add/{id}"))
        .form(&[("quantity", "2")])
        .send()
        .await
        .expect("add to cart");
    assert_eq!(location(&resp).as_deref(), Some("/cart"));

    let body = page(&client, "/cart").await;
    assert!(body.contains(&name));

    let resp = client
        .post(format!("{base}/cart/remove/{id}"))
        .send()
        .await
        .expect("remove from cart");
    assert_eq!(location(&resp).as_deref(), Some("/cart"));

    let body = page(&client, "/cart").await;
    assert!(!body.contains(&name));
    assert!(body.contains("Your cart is empty."));
}

#[tokio::test]
#[ignore = "Requires running storefront and database"]
async fn test_deleted_product_disappears_from_cart() {
    let pool = pool().await;
    let (kept, kept_name) = create_product(&pool, "5.00").await;
    let (ghost, ghost_name) = create_product(&pool, "7.00").await;
    let client = client();
    let base = base_url();

    for id in [kept, ghost] {
        client
            .post(format!("{base}/cart/add/{id}"))
            .send()
            .await
            .expect("add to cart");
    }
    delete_product(&pool, ghost).await;

    let body = page(&client, "/cart").await;
    assert!(body.contains(&kept_name));
    assert!(!body.contains(&ghost_name));
}

#[tokio::test]
#[ignore = "Requires running storefront and database"]
async fn test_checkout_requires_login() {
    let resp = client()
        .get(format!("{}/checkout", base_url()))
        .send()
        .await
        .expect("checkout");
    assert_eq!(location(&resp).as_deref(), Some("/login?next=%2Fcheckout"));
}

#[tokio::test]
#[ignore = "Requires running storefront and database"]
async fn test_place_order_clears_cart() {
    let pool = pool().await;
    let (id, name) = create_product(&pool, "129.99").await;
    let client = client();
    let base = base_url();
    register_and_login(&client).await;

    client
        .post(format!("{base}/cart/add/{id}"))
        .send()
        .await
        .expect("add to cart");

    let resp = client
        .post(format!("{base}/checkout"))
        .send()
        .await
        .expect("checkout");
    assert_eq!(location(&resp).as_deref(), Some("/payment-process"));

    let resp = client
        .post(format!("{base}/payment-process"))
        .send()
        .await
        .expect("place order");
    let confirmation = location(&resp).expect("redirect to confirmation");
    assert!(confirmation.starts_with("/order-confirmation/"));

    let body = page(&client, &confirmation).await;
    assert!(body.contains("placed successfully!"));
    assert!(body.contains(&format!("1x {name}")));

    let body = page(&client, "/cart").await;
    assert!(body.contains("Your cart is empty."));

    // A second attempt with an empty cart goes back to the cart page.
    let resp = client
        .post(format!("{base}/payment-process"))
        .send()
        .await
        .expect("place order again");
    assert_eq!(location(&resp).as_deref(), Some("/cart"));
}

#[tokio::test]
#[ignore = "Requires running storefront and database"]
async fn test_orders_are_private() {
    let pool = pool().await;
    let (id, _) = create_product(&pool, "20.00").await;
    let base = base_url();

    let owner = client();
    register_and_login(&owner).await;
    owner
        .post(format!("{base}/cart/add/{id}"))
        .send()
        .await
        .expect("add to cart");
    let resp = owner
        .post(format!("{base}/payment-process"))
        .send()
        .await
        .expect("place order");
    let confirmation = location(&resp).expect("redirect to confirmation");

    let stranger = client();
    register_and_login(&stranger).await;
    let resp = stranger
        .get(format!("{base}{confirmation}"))
        .send()
        .await
        .expect("foreign order");
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
