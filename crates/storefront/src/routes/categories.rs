//! Category listing handler.

use axum::{
    extract::{Path, State},
    response::IntoResponse,
};
use tower_sessions::Session;
use tracing::instrument;

use zestify_core::Slug;

use crate::db::{CategoryRepository, ProductRepository};
use crate::error::{AppError, Result};
use crate::routes::PageContext;
use crate::routes::home::ProductGridTemplate;
use crate::state::AppState;

/// Display the products in a category.
#[instrument(skip(state, session))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse> {
    let not_found = || AppError::NotFound(format!("category {slug}"));

    let slug = Slug::parse(&slug).map_err(|_| not_found())?;
    let category = CategoryRepository::new(state.pool())
        .get_by_slug(&slug)
        .await?
        .ok_or_else(not_found)?;

    let products = ProductRepository::new(state.pool())
        .list_by_category(category.id)
        .await?;

    let page = PageContext::load(&state, &session)
        .await?
        .without_hero()
        .in_category(category.slug.as_str());

    Ok(ProductGridTemplate {
        page,
        products,
        heading: Some(category.name),
        query: String::new(),
    })
}
