//! Authentication route handlers.
//!
//! Username/email login, registration and logout. Outcomes are reported
//! with flash messages and redirects.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{Result, clear_sentry_user, set_sentry_user};
use crate::filters;
use crate::middleware::{clear_current_user, set_current_user};
use crate::routes::{PageContext, same_site_path};
use crate::services::auth::{AuthService, Registration};
use crate::services::flash;
use crate::state::AppState;

/// Where a successful login lands when no `next` is given.
const DEFAULT_LOGIN_REDIRECT: &str = "/dashboard";

// =============================================================================
// Form Types
// =============================================================================

/// Login form data. `username` may also hold an email address.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub next: Option<String>,
}

/// Registration form data.
#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    pub username: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

/// Query parameters for the login page.
#[derive(Debug, Deserialize)]
pub struct NextQuery {
    pub next: Option<String>,
}

// =============================================================================
// Templates
// =============================================================================

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub page: PageContext,
    /// Same-site path to return to after login.
    pub next: String,
}

/// Register page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/register.html")]
pub struct RegisterTemplate {
    pub page: PageContext,
}

/// The login redirect target for a user-supplied `next`.
fn login_destination(next: Option<&str>) -> &str {
    next.and_then(same_site_path)
        .unwrap_or(DEFAULT_LOGIN_REDIRECT)
}

// =============================================================================
// Login Routes
// =============================================================================

/// Display the login page.
#[instrument(skip(state, session))]
pub async fn login_page(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<NextQuery>,
) -> Result<impl IntoResponse> {
    let next = query
        .next
        .as_deref()
        .and_then(same_site_path)
        .unwrap_or_default()
        .to_owned();
    let page = PageContext::load(&state, &session).await?.without_hero();

    Ok(LoginTemplate { page, next })
}

/// Handle login form submission.
#[instrument(skip(state, session, form), fields(username = %form.username))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Result<Response> {
    let user = match AuthService::new(state.pool())
        .login(&form.username, &form.password)
        .await
    {
        Ok(user) => user,
        Err(e) if e.is_user_facing() => {
            tracing::info!(error = %e, "login rejected");
            flash::error(&session, e.to_string()).await?;
            return Ok(Redirect::to("/login").into_response());
        }
        Err(e) => return Err(e.into()),
    };

    // New session ID on privilege change; the cart carries over.
    session.cycle_id().await?;
    set_current_user(&session, &user.to_current_user()).await?;
    set_sentry_user(&user.id, Some(user.email.as_str()));

    flash::success(&session, "Welcome back!").await?;
    tracing::info!(user_id = %user.id, "user logged in");

    Ok(Redirect::to(login_destination(form.next.as_deref())).into_response())
}

// =============================================================================
// Registration Routes
// =============================================================================

/// Display the registration page.
#[instrument(skip(state, session))]
pub async fn register_page(
    State(state): State<AppState>,
    session: Session,
) -> Result<impl IntoResponse> {
    let page = PageContext::load(&state, &session).await?.without_hero();
    Ok(RegisterTemplate { page })
}

/// Handle registration form submission.
#[instrument(skip(state, session, form), fields(username = %form.username))]
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<RegisterForm>,
) -> Result<Response> {
    let registration = Registration {
        username: form.username.trim(),
        email: form.email.trim(),
        password: &form.password,
        confirm_password: &form.confirm_password,
    };

    match AuthService::new(state.pool()).register(registration).await {
        Ok(user) => {
            tracing::info!(user_id = %user.id, "account created");
            flash::success(&session, "Account created successfully! Please log in.").await?;
            Ok(Redirect::to("/login").into_response())
        }
        Err(e) if e.is_user_facing() => {
            flash::error(&session, e.to_string()).await?;
            Ok(Redirect::to("/register").into_response())
        }
        Err(e) => Err(e.into()),
    }
}

// =============================================================================
// Logout Route
// =============================================================================

/// Handle logout.
///
/// Destroys the whole session, which also empties the cart.
#[instrument(skip(session))]
pub async fn logout(session: Session) -> Result<Response> {
    if let Err(e) = clear_current_user(&session).await {
        tracing::error!("Failed to clear session user: {}", e);
    }

    session.flush().await?;
    clear_sentry_user();

    flash::success(&session, "You have been logged out.").await?;
    Ok(Redirect::to("/").into_response())
}
