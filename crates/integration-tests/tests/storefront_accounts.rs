//! Account, address book, saved payment and wishlist flows against a
//! running storefront.
//!
//! Run with: `cargo test -p zestify-integration-tests -- --ignored`

#![allow(clippy::expect_used)]

use reqwest::StatusCode;

use zestify_integration_tests::{
    TEST_PASSWORD, base_url, client, create_product, location, page, pool, register_and_login,
};

#[tokio::test]
#[ignore = "Requires running storefront and database"]
async fn test_login_redirects_to_next() {
    let client = client();
    let base = base_url();
    let username = register_and_login(&client).await;

    client
        .post(format!("{base}/logout"))
        .send()
        .await
        .expect("logout");

    let resp = client
        .post(format!("{base}/login"))
        .form(&[
            ("username", username.as_str()),
            ("password", TEST_PASSWORD),
            ("next", "/addresses"),
        ])
        .send()
        .await
        .expect("login");
    assert_eq!(location(&resp).as_deref(), Some("/addresses"));
}

#[tokio::test]
#[ignore = "Requires running storefront and database"]
async fn test_login_ignores_offsite_next() {
    let client = client();
    let base = base_url();
    let username = register_and_login(&client).await;
    client
        .post(format!("{base}/logout"))
        .send()
        .await
        .expect("logout");

    let resp = client
        .post(format!("{base}/login"))
        .form(&[
            ("username", username.as_str()),
            ("password", TEST_PASSWORD),
            ("next", "//evil.example/"),
        ])
        .send()
        .await
        .expect("login");
    assert_eq!(location(&resp).as_deref(), Some("/dashboard"));
}

#[tokio::test]
#[ignore = "Requires running storefront and database"]
async fn test_wrong_password_is_rejected() {
    let client = client();
    let base = base_url();
    let username = register_and_login(&client).await;
    client
        .post(format!("{base}/logout"))
        .send()
        .await
        .expect("logout");

    let resp = client
        .post(format!("{base}/login"))
        .form(&[("username", username.as_str()), ("password", "not-the-password")])
        .send()
        .await
        .expect("login");
    assert_eq!(location(&resp).as_deref(), Some("/login"));

    let body = page(&client, "/login").await;
    assert!(body.contains("Incorrect password."));
}

#[tokio::test]
#[ignore = "Requires running storefront and database"]
async fn test_first_address_becomes_default() {
    let client = client();
    let base = base_url();
    register_and_login(&client).await;

    let resp = client
        .post(format!("{base}/addresses/add"))
        .form(&[
            ("full_name", "Asha Rao"),
            ("phone_number", "+91 98765-43210"),
            ("address_line_1", "12 MG Road"),
            ("address_line_2", ""),
            ("city", "Bengaluru"),
            ("state", "KA"),
            ("zip_code", "560001"),
            ("address_type", "Home"),
        ])
        .send()
        .await
        .expect("add address");
    assert_eq!(location(&resp).as_deref(), Some("/addresses"));

    let body = page(&client, "/addresses").await;
    assert!(body.contains("Asha Rao"));
    assert!(body.contains("Karnataka"));
    assert!(body.contains("Default"));
}

#[tokio::test]
#[ignore = "Requires running storefront and database"]
async fn test_concurrent_first_addresses_keep_one_default() {
    let client = client();
    let base = base_url();
    let username = register_and_login(&client).await;

    let submit = |city: &'static str| {
        client
            .post(format!("{base}/addresses/add"))
            .form(&[
                ("full_name", "Asha Rao"),
                ("phone_number", "9876543210"),
                ("address_line_1", "12 MG Road"),
                ("city", city),
                ("state", "KA"),
                ("zip_code", "560001"),
                ("address_type", "Home"),
            ])
            .send()
    };
    let (first, second) = tokio::join!(submit("Bengaluru"), submit("Mysuru"));

    for resp in [first.expect("first add"), second.expect("second add")] {
        assert!(!resp.status().is_server_error(), "got {}", resp.status());
        assert_eq!(location(&resp).as_deref(), Some("/addresses"));
    }

    let (total, defaults): (i64, i64) = sqlx::query_as(
        r"
        SELECT COUNT(*), COUNT(*) FILTER (WHERE a.is_default)
        FROM storefront.address a
        JOIN storefront.users u ON u.id = a.user_id
        WHERE u.username = $1
        ",
    )
    .bind(&username)
    .fetch_one(&pool().await)
    .await
    .expect("count addresses");
    assert_eq!(total, 2);
    assert_eq!(defaults, 1);
}

#[tokio::test]
#[ignore = "Requires running storefront and database"]
async fn test_invalid_address_is_rerendered() {
    let client = client();
    let base = base_url();
    register_and_login(&client).await;

    let resp = client
        .post(format!("{base}/addresses/add"))
        .form(&[
            ("full_name", "Asha Rao"),
            ("phone_number", "12345"),
            ("address_line_1", "12 MG Road"),
            ("city", "Bengaluru"),
            ("state", "KA"),
            ("zip_code", "012345"),
            ("address_type", "Home"),
        ])
        .send()
        .await
        .expect("add address");
    assert_eq!(resp.status(), StatusCode::OK);
    let body = resp.text().await.expect("body");
    assert!(body.contains("Please correct the errors below."));
    assert!(body.contains("field-error"));
}

#[tokio::test]
#[ignore = "Requires running storefront and database"]
async fn test_saved_card_keeps_only_last_four() {
    let client = client();
    let base = base_url();
    register_and_login(&client).await;

    let resp = client
        .post(format!("{base}/payments/add/card"))
        .form(&[
            ("card_holder_name", "Asha Rao"),
            ("full_card_number", "4111 1111 1111 1111"),
            ("cvv", "123"),
            ("expiry_month", "12"),
            ("expiry_year", "2099"),
        ])
        .send()
        .await
        .expect("add card");
    assert_eq!(location(&resp).as_deref(), Some("/payments"));

    let body = page(&client, "/payments").await;
    assert!(body.contains("**** **** **** 1111"));
    assert!(!body.contains("4111 1111 1111 1111"));
    assert!(body.contains("Default"));
}

#[tokio::test]
#[ignore = "Requires running storefront and database"]
async fn test_unknown_payment_method_type() {
    let client = client();
    let base = base_url();
    register_and_login(&client).await;

    let resp = client
        .get(format!("{base}/payments/add/paypal"))
        .send()
        .await
        .expect("add paypal");
    assert_eq!(location(&resp).as_deref(), Some("/payments"));

    let body = page(&client, "/payments").await;
    assert!(body.contains("Invalid payment method type."));
}

#[tokio::test]
#[ignore = "Requires running storefront and database"]
async fn test_wishlist_toggle() {
    let pool = pool().await;
    let (id, name) = create_product(&pool, "15.00").await;
    let client = client();
    let base = base_url();
    register_and_login(&client).await;

    client
        .post(format!("{base}/dashboard/wishlist/add/{id}"))
        .send()
        .await
        .expect("add to wishlist");
    let body = page(&client, "/dashboard/wishlist").await;
    assert!(body.contains(&name));

    client
        .post(format!("{base}/dashboard/wishlist/add/{id}"))
        .send()
        .await
        .expect("remove from wishlist");
    let body = page(&client, "/dashboard/wishlist").await;
    assert!(body.contains("Your wishlist is empty."));
}
