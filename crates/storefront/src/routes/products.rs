//! Product detail handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, State},
    response::IntoResponse,
};
use tower_sessions::Session;
use tracing::instrument;

use zestify_core::ProductId;

use crate::db::ProductRepository;
use crate::error::{AppError, Result};
use crate::filters;
use crate::models::Product;
use crate::routes::PageContext;
use crate::state::AppState;

/// Product detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "store/product_detail.html")]
pub struct ProductDetailTemplate {
    pub page: PageContext,
    pub product: Product,
}

/// Display a product.
#[instrument(skip(state, session))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<ProductId>,
) -> Result<impl IntoResponse> {
    let product = ProductRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))?;

    let page = PageContext::load(&state, &session).await?.without_hero();

    Ok(ProductDetailTemplate { page, product })
}
