//! Wishlist handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, State},
    http::HeaderMap,
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;
use tracing::instrument;

use zestify_core::ProductId;

use crate::db::wishlist::WishlistToggle;
use crate::db::{ProductRepository, WishlistRepository};
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::RequireAuth;
use crate::models::Product;
use crate::routes::{PageContext, same_site_referer};
use crate::services::flash;
use crate::state::AppState;

/// Wishlist page template.
#[derive(Template, WebTemplate)]
#[template(path = "account/wishlist.html")]
pub struct WishlistTemplate {
    pub page: PageContext,
    pub products: Vec<Product>,
}

/// The user's saved products.
#[instrument(skip(state, session))]
pub async fn index(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(current): RequireAuth,
) -> Result<impl IntoResponse> {
    let products = WishlistRepository::new(state.pool())
        .products_for_user(current.id)
        .await?;
    let page = PageContext::load(&state, &session).await?.without_hero();

    Ok(WishlistTemplate { page, products })
}

/// Add a product to the wishlist, or remove it if already saved, then
/// return to the referring page.
#[instrument(skip(state, session, headers))]
pub async fn toggle(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(current): RequireAuth,
    Path(product_id): Path<ProductId>,
    headers: HeaderMap,
) -> Result<Response> {
    let product = ProductRepository::new(state.pool())
        .get(product_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {product_id}")))?;

    match WishlistRepository::new(state.pool())
        .toggle(current.id, product.id)
        .await?
    {
        WishlistToggle::Added => {
            flash::success(&session, format!("{} added to your wishlist!", product.name)).await?;
        }
        WishlistToggle::Removed => {
            flash::info(&session, format!("{} removed from your wishlist.", product.name)).await?;
        }
    }

    let back = same_site_referer(&headers, &state.config().base_url).unwrap_or_else(|| "/".to_owned());
    Ok(Redirect::to(&back).into_response())
}
