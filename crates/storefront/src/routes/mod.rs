//! HTTP route handlers for the storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                                   - All products
//! GET  /search?q=                          - Product search
//! GET  /product/{id}                       - Product detail
//! GET  /category/{slug}                    - Products in a category
//!
//! # Cart
//! GET  /cart                               - Cart page
//! POST /cart/add/{product_id}              - Add to cart
//! GET|POST /cart/remove/{product_id}       - Remove from cart
//!
//! # Checkout (requires auth)
//! GET|POST /checkout                       - Review cart, continue to payment
//! GET|POST /payment-process                - Choose payment, place order
//! GET  /order-confirmation/{id}            - Placed order summary
//!
//! # Auth
//! GET|POST /login                          - Login (rate limited POST)
//! GET|POST /register                       - Registration (rate limited POST)
//! GET|POST /logout                         - Logout
//!
//! # Dashboard (requires auth)
//! GET  /dashboard                          - Overview with recent orders
//! GET|POST /dashboard/settings             - Profile settings
//! GET  /dashboard/orders                   - Order history
//! GET  /dashboard/wishlist                 - Saved products
//! GET|POST /dashboard/wishlist/add/{id}    - Toggle a wishlist entry
//!
//! # Addresses (requires auth)
//! GET  /addresses                          - Address book
//! GET|POST /addresses/add                  - New address
//! GET|POST /addresses/edit/{id}            - Edit address
//! POST /addresses/delete/{id}              - Delete address
//! POST /addresses/default/{id}             - Make default
//!
//! # Payment methods (requires auth)
//! GET  /payments                           - Saved cards and UPI IDs
//! GET|POST /payments/add/{method_type}     - New card or UPI ID
//! GET|POST /payments/{card|upi}/delete/{id}
//! GET|POST /payments/{card|upi}/default/{id}
//! ```

pub mod account;
pub mod addresses;
pub mod auth;
pub mod cart;
pub mod categories;
pub mod checkout;
pub mod forms;
pub mod home;
pub mod page;
pub mod payments;
pub mod products;
pub mod wishlist;

use axum::{
    Router,
    http::{HeaderMap, header},
    routing::{get, post},
};
use url::Url;

use crate::middleware::auth_rate_limiter;
use crate::state::AppState;

pub use page::PageContext;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/login",
            get(auth::login_page).merge(post(auth::login).layer(auth_rate_limiter())),
        )
        .route(
            "/register",
            get(auth::register_page).merge(post(auth::register).layer(auth_rate_limiter())),
        )
        .route("/logout", get(auth::logout).post(auth::logout))
}

/// Create the dashboard routes router.
pub fn dashboard_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(account::dashboard))
        .route(
            "/settings",
            get(account::settings_page).post(account::update_settings),
        )
        .route("/orders", get(account::orders))
        .route("/wishlist", get(wishlist::index))
        .route(
            "/wishlist/add/{product_id}",
            get(wishlist::toggle).post(wishlist::toggle),
        )
}

/// Create the address book routes router.
pub fn address_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(addresses::index))
        .route("/add", get(addresses::add_page).post(addresses::add))
        .route("/edit/{id}", get(addresses::edit_page).post(addresses::edit))
        .route("/delete/{id}", post(addresses::delete))
        .route("/default/{id}", post(addresses::set_default))
}

/// Create the payment method routes router.
pub fn payment_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(payments::index))
        .route(
            "/add/{method_type}",
            get(payments::add_page).post(payments::add),
        )
        .route(
            "/card/delete/{id}",
            get(payments::delete_card).post(payments::delete_card),
        )
        .route(
            "/upi/delete/{id}",
            get(payments::delete_upi).post(payments::delete_upi),
        )
        .route(
            "/card/default/{id}",
            get(payments::default_card).post(payments::default_card),
        )
        .route(
            "/upi/default/{id}",
            get(payments::default_upi).post(payments::default_upi),
        )
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add/{product_id}", post(cart::add))
        .route(
            "/remove/{product_id}",
            get(cart::remove).post(cart::remove),
        )
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        // Catalog
        .route("/", get(home::index))
        .route("/search", get(home::search))
        .route("/product/{id}", get(products::show))
        .route("/category/{slug}", get(categories::show))
        // Cart and checkout
        .nest("/cart", cart_routes())
        .route(
            "/checkout",
            get(checkout::checkout_page).post(checkout::checkout),
        )
        .route(
            "/payment-process",
            get(checkout::payment_page).post(checkout::place_order),
        )
        .route(
            "/order-confirmation/{id}",
            get(checkout::order_confirmation),
        )
        // Accounts
        .merge(auth_routes())
        .nest("/dashboard", dashboard_routes())
        .nest("/addresses", address_routes())
        .nest("/payments", payment_routes())
}

/// Accept `target` only when it is a path on this site.
#[must_use]
pub fn same_site_path(target: &str) -> Option<&str> {
    let target = target.trim();
    let local = target.starts_with('/')
        && !target.starts_with("//")
        && !target.contains('\\')
        && !target.chars().any(char::is_control);
    local.then_some(target)
}

/// The path of the `Referer` header when it points back at this site,
/// either at the configured base URL or at the request's `Host`.
#[must_use]
pub fn same_site_referer(headers: &HeaderMap, base_url: &str) -> Option<String> {
    let referer = headers.get(header::REFERER)?.to_str().ok()?;
    let referer = Url::parse(referer).ok()?;

    let matches_base = Url::parse(base_url)
        .is_ok_and(|base| base.origin() == referer.origin());
    let matches_host = headers
        .get(header::HOST)
        .and_then(|h| h.to_str().ok())
        .is_some_and(|host| {
            referer.host_str().is_some_and(|h| match referer.port() {
                Some(port) => host == format!("{h}:{port}"),
                None => host == h,
            })
        });

    if !(matches_base || matches_host) {
        return None;
    }

    let mut path = referer.path().to_owned();
    if let Some(query) = referer.query() {
        path.push('?');
        path.push_str(query);
    }
    same_site_path(&path).map(str::to_owned)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    #[test]
    fn test_same_site_path() {
        assert_eq!(same_site_path("/checkout"), Some("/checkout"));
        assert_eq!(same_site_path("/search?q=ball"), Some("/search?q=ball"));
        assert_eq!(same_site_path("//evil.example"), None);
        assert_eq!(same_site_path("https://evil.example/"), None);
        assert_eq!(same_site_path("/\\evil.example"), None);
        assert_eq!(same_site_path(""), None);
    }

    fn headers(referer: &str, host: Option<&str>) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::REFERER, HeaderValue::from_str(referer).unwrap());
        if let Some(host) = host {
            headers.insert(header::HOST, HeaderValue::from_str(host).unwrap());
        }
        headers
    }

    #[test]
    fn test_referer_matching_base_url() {
        let h = headers("https://shop.example/category/music?page=2", None);
        assert_eq!(
            same_site_referer(&h, "https://shop.example"),
            Some("/category/music?page=2".to_string())
        );
    }

    #[test]
    fn test_referer_matching_host_header() {
        let h = headers("http://localhost:8000/product/3", Some("localhost:8000"));
        assert_eq!(
            same_site_referer(&h, "https://shop.example"),
            Some("/product/3".to_string())
        );
    }

    #[test]
    fn test_foreign_referer_is_ignored() {
        let h = headers("https://evil.example/", Some("shop.example"));
        assert_eq!(same_site_referer(&h, "https://shop.example"), None);
        assert_eq!(same_site_referer(&HeaderMap::new(), "https://shop.example"), None);
    }
}
