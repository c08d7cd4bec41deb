//! Checkout, payment and order confirmation handlers.
//!
//! There is no payment gateway: confirming the payment page places the
//! order straight away.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
};
use rust_decimal::Decimal;
use tower_sessions::Session;
use tracing::instrument;

use zestify_core::OrderId;

use crate::db::{AddressRepository, OrderRepository, PaymentMethodRepository, ProductRepository};
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::RequireAuth;
use crate::models::{Address, Order, SavedCard, SavedUpi};
use crate::routes::PageContext;
use crate::services::cart::{Cart, CartItem};
use crate::services::flash;
use crate::state::AppState;

const EMPTY_AT_CHECKOUT: &str = "Your cart is empty and cannot be checked out.";
const EMPTY_AT_PAYMENT: &str = "Your cart is empty and cannot be processed.";

/// Checkout page template.
#[derive(Template, WebTemplate)]
#[template(path = "store/checkout.html")]
pub struct CheckoutTemplate {
    pub page: PageContext,
    pub items: Vec<CartItem>,
    pub total_price: Decimal,
    pub addresses: Vec<Address>,
}

/// Payment page template.
#[derive(Template, WebTemplate)]
#[template(path = "store/payment.html")]
pub struct PaymentTemplate {
    pub page: PageContext,
    pub items: Vec<CartItem>,
    pub total_price: Decimal,
    pub cards: Vec<SavedCard>,
    pub upis: Vec<SavedUpi>,
}

/// Order confirmation template.
#[derive(Template, WebTemplate)]
#[template(path = "store/order_confirmation.html")]
pub struct OrderConfirmationTemplate {
    pub page: PageContext,
    pub order: Order,
}

/// Load the cart, or flash `message` and send the user back to `/cart`
/// when it is empty.
async fn non_empty_cart(
    state: &AppState,
    session: &Session,
    message: &str,
) -> Result<std::result::Result<Cart, Response>> {
    let cart = Cart::load(session, &ProductRepository::new(state.pool())).await?;
    if cart.is_empty() {
        flash::error(session, message).await?;
        return Ok(Err(Redirect::to("/cart").into_response()));
    }
    Ok(Ok(cart))
}

/// Review the cart and choose a delivery address.
#[instrument(skip(state, session))]
pub async fn checkout_page(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(current): RequireAuth,
) -> Result<Response> {
    let cart = match non_empty_cart(&state, &session, EMPTY_AT_CHECKOUT).await? {
        Ok(cart) => cart,
        Err(redirect) => return Ok(redirect),
    };

    let addresses = AddressRepository::new(state.pool())
        .list_for_user(current.id)
        .await?;
    let page = PageContext::with_cart(&state, &session, &cart)
        .await?
        .without_hero();

    Ok(CheckoutTemplate {
        page,
        items: cart.items(),
        total_price: cart.total_price(),
        addresses,
    }
    .into_response())
}

/// Continue from checkout to payment.
#[instrument(skip(state, session))]
pub async fn checkout(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(_current): RequireAuth,
) -> Result<Response> {
    match non_empty_cart(&state, &session, EMPTY_AT_CHECKOUT).await? {
        Ok(_) => Ok(Redirect::to("/payment-process").into_response()),
        Err(redirect) => Ok(redirect),
    }
}

/// Choose a payment method.
#[instrument(skip(state, session))]
pub async fn payment_page(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(current): RequireAuth,
) -> Result<Response> {
    let cart = match non_empty_cart(&state, &session, EMPTY_AT_PAYMENT).await? {
        Ok(cart) => cart,
        Err(redirect) => return Ok(redirect),
    };

    let methods = PaymentMethodRepository::new(state.pool());
    let cards = methods.list_cards(current.id).await?;
    let upis = methods.list_upis(current.id).await?;
    let page = PageContext::with_cart(&state, &session, &cart)
        .await?
        .without_hero();

    Ok(PaymentTemplate {
        page,
        items: cart.items(),
        total_price: cart.total_price(),
        cards,
        upis,
    }
    .into_response())
}

/// Place the order from the cart and empty it.
#[instrument(skip(state, session))]
pub async fn place_order(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(current): RequireAuth,
) -> Result<Response> {
    let mut cart = match non_empty_cart(&state, &session, EMPTY_AT_PAYMENT).await? {
        Ok(cart) => cart,
        Err(redirect) => return Ok(redirect),
    };

    let summary = cart.order_summary();

    let order = OrderRepository::new(state.pool())
        .create(current.id, &summary, cart.total_price())
        .await?;
    cart.clear().await?;

    tracing::info!(order_id = %order.id, total = %order.total_price, "order placed");
    flash::success(&session, format!("Order #{} placed successfully!", order.id)).await?;

    Ok(Redirect::to(&format!("/order-confirmation/{}", order.id)).into_response())
}

/// Show a placed order. Only the owner can see it.
#[instrument(skip(state, session))]
pub async fn order_confirmation(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(current): RequireAuth,
    Path(id): Path<OrderId>,
) -> Result<impl IntoResponse> {
    let order = OrderRepository::new(state.pool())
        .get_for_user(id, current.id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("order {id}")))?;
    let page = PageContext::load(&state, &session).await?.without_hero();

    Ok(OrderConfirmationTemplate { page, order })
}
