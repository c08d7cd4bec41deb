//! Cart route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, State, rejection::FormRejection},
    response::{IntoResponse, Redirect},
};
use rust_decimal::Decimal;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use zestify_core::ProductId;

use crate::db::ProductRepository;
use crate::error::{AppError, Result};
use crate::filters;
use crate::models::Product;
use crate::routes::PageContext;
use crate::services::cart::{Cart, CartItem};
use crate::state::AppState;

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "store/cart.html")]
pub struct CartTemplate {
    pub page: PageContext,
    pub items: Vec<CartItem>,
    pub total_price: Decimal,
}

/// Add-to-cart form. A missing or non-positive quantity adds one unit.
#[derive(Debug, Default, Deserialize)]
pub struct AddToCartForm {
    #[serde(default)]
    pub quantity: Option<String>,
}

impl AddToCartForm {
    fn quantity(&self) -> u32 {
        self.quantity
            .as_deref()
            .and_then(|q| q.trim().parse::<u32>().ok())
            .unwrap_or(1)
            .max(1)
    }
}

async fn existing_product(state: &AppState, id: ProductId) -> Result<Product> {
    ProductRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))
}

/// Display the cart.
#[instrument(skip(state, session))]
pub async fn show(State(state): State<AppState>, session: Session) -> Result<impl IntoResponse> {
    let cart = Cart::load(&session, &ProductRepository::new(state.pool())).await?;
    let page = PageContext::with_cart(&state, &session, &cart)
        .await?
        .without_hero();

    Ok(CartTemplate {
        page,
        items: cart.items(),
        total_price: cart.total_price(),
    })
}

/// Add a product to the cart. The body is optional.
#[instrument(skip(state, session, form))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    Path(product_id): Path<ProductId>,
    form: std::result::Result<Form<AddToCartForm>, FormRejection>,
) -> Result<Redirect> {
    let product = existing_product(&state, product_id).await?;
    let quantity = form.map_or(1, |Form(f)| f.quantity());

    let mut cart = Cart::load(&session, &ProductRepository::new(state.pool())).await?;
    cart.add(&product, quantity).await?;
    tracing::debug!(quantity, "added to cart");

    Ok(Redirect::to("/cart"))
}

/// Remove a product's line from the cart.
#[instrument(skip(state, session))]
pub async fn remove(
    State(state): State<AppState>,
    session: Session,
    Path(product_id): Path<ProductId>,
) -> Result<Redirect> {
    let product = existing_product(&state, product_id).await?;

    let mut cart = Cart::load(&session, &ProductRepository::new(state.pool())).await?;
    cart.remove(product.id).await?;

    Ok(Redirect::to("/cart"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(q: Option<&str>) -> AddToCartForm {
        AddToCartForm {
            quantity: q.map(String::from),
        }
    }

    #[test]
    fn test_quantity_defaults_to_one() {
        assert_eq!(form(None).quantity(), 1);
        assert_eq!(form(Some("")).quantity(), 1);
        assert_eq!(form(Some("abc")).quantity(), 1);
        assert_eq!(form(Some("0")).quantity(), 1);
        assert_eq!(form(Some("-3")).quantity(), 1);
    }

    #[test]
    fn test_posted_quantity_is_used() {
        assert_eq!(form(Some("3")).quantity(), 3);
        assert_eq!(form(Some(" 2 ")).quantity(), 2);
    }
}
