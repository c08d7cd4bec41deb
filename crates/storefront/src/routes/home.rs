//! Home page and search handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Query, State},
    response::IntoResponse,
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::db::ProductRepository;
use crate::error::Result;
use crate::filters;
use crate::models::Product;
use crate::routes::PageContext;
use crate::state::AppState;

/// Product grid used by the home, search and category pages.
#[derive(Template, WebTemplate)]
#[template(path = "store/index.html")]
pub struct ProductGridTemplate {
    pub page: PageContext,
    pub products: Vec<Product>,
    /// Heading above the grid, e.g. the category name.
    pub heading: Option<String>,
    /// The search query, echoed into the search box.
    pub query: String,
}

/// Search query parameters.
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
}

/// Display every product, newest first.
#[instrument(skip(state, session))]
pub async fn index(State(state): State<AppState>, session: Session) -> Result<impl IntoResponse> {
    let products = ProductRepository::new(state.pool()).list_all().await?;
    let page = PageContext::load(&state, &session).await?;

    Ok(ProductGridTemplate {
        page,
        products,
        heading: None,
        query: String::new(),
    })
}

/// Search product names and descriptions. Without `q` every product is
/// listed.
#[instrument(skip(state, session))]
pub async fn search(
    State(state): State<AppState>,
    session: Session,
    Query(params): Query<SearchQuery>,
) -> Result<impl IntoResponse> {
    let repo = ProductRepository::new(state.pool());
    let query = params.q.unwrap_or_default();

    let (products, heading) = if query.is_empty() {
        (repo.list_all().await?, None)
    } else {
        let found = repo.search(&query).await?;
        let heading = format!("Search results for \"{query}\"");
        (found, Some(heading))
    };

    let page = PageContext::load(&state, &session).await?.without_hero();

    Ok(ProductGridTemplate {
        page,
        products,
        heading,
        query,
    })
}
