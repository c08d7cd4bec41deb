//! Dashboard route handlers.
//!
//! These routes require authentication.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use zestify_core::Email;

use crate::db::{OrderRepository, RepositoryError, UserRepository};
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::{RequireAuth, set_current_user};
use crate::models::{CurrentUser, Order, User};
use crate::routes::PageContext;
use crate::routes::forms::FormErrors;
use crate::services::flash;
use crate::state::AppState;

/// Orders shown on the dashboard overview.
const RECENT_ORDER_COUNT: i64 = 5;

/// Loyalty points shown on the dashboard. There is no points ledger yet.
pub const LOYALTY_POINTS: u32 = 120;

const NAME_MAX_LENGTH: usize = 150;

// =============================================================================
// Templates
// =============================================================================

/// Dashboard overview template.
#[derive(Template, WebTemplate)]
#[template(path = "account/dashboard.html")]
pub struct DashboardTemplate {
    pub page: PageContext,
    pub user: User,
    pub recent_orders: Vec<Order>,
    pub loyalty_points: u32,
}

/// Account settings template.
#[derive(Template, WebTemplate)]
#[template(path = "account/settings.html")]
pub struct SettingsTemplate {
    pub page: PageContext,
    pub username: String,
    pub form: SettingsForm,
    pub errors: FormErrors,
}

/// Order history template.
#[derive(Template, WebTemplate)]
#[template(path = "account/orders.html")]
pub struct OrdersTemplate {
    pub page: PageContext,
    pub orders: Vec<Order>,
}

// =============================================================================
// Forms
// =============================================================================

/// Editable profile fields. The username is not editable.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SettingsForm {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
}

/// A settings form that passed field validation.
struct ValidSettings {
    first_name: String,
    last_name: String,
    email: Email,
}

impl SettingsForm {
    fn from_user(user: &User) -> Self {
        Self {
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            email: user.email.to_string(),
        }
    }

    fn validate(&self) -> std::result::Result<ValidSettings, FormErrors> {
        let mut errors = FormErrors::new();

        let first_name = self.first_name.trim();
        let last_name = self.last_name.trim();
        if first_name.chars().count() > NAME_MAX_LENGTH {
            errors.add("first_name", "Ensure this value has at most 150 characters.");
        }
        if last_name.chars().count() > NAME_MAX_LENGTH {
            errors.add("last_name", "Ensure this value has at most 150 characters.");
        }
        let email = errors.check("email", Email::parse(&self.email));

        match email {
            Some(email) if errors.is_empty() => Ok(ValidSettings {
                first_name: first_name.to_owned(),
                last_name: last_name.to_owned(),
                email,
            }),
            _ => Err(errors),
        }
    }
}

/// Load the logged-in user's row. A session pointing at a deleted account
/// is treated as logged out.
async fn load_user(state: &AppState, current: &CurrentUser) -> Result<User> {
    UserRepository::new(state.pool())
        .get_by_id(current.id)
        .await?
        .ok_or_else(|| AppError::Unauthorized("account no longer exists".to_string()))
}

// =============================================================================
// Handlers
// =============================================================================

/// Dashboard overview: profile, recent orders and loyalty points.
#[instrument(skip(state, session, current), fields(user_id = %current.id))]
pub async fn dashboard(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(current): RequireAuth,
) -> Result<impl IntoResponse> {
    let user = load_user(&state, &current).await?;
    let recent_orders = OrderRepository::new(state.pool())
        .list_for_user(user.id, Some(RECENT_ORDER_COUNT))
        .await?;
    let page = PageContext::load(&state, &session).await?.without_hero();

    Ok(DashboardTemplate {
        page,
        user,
        recent_orders,
        loyalty_points: LOYALTY_POINTS,
    })
}

/// Display the settings form.
#[instrument(skip(state, session, current), fields(user_id = %current.id))]
pub async fn settings_page(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(current): RequireAuth,
) -> Result<impl IntoResponse> {
    let user = load_user(&state, &current).await?;
    let page = PageContext::load(&state, &session).await?.without_hero();

    Ok(SettingsTemplate {
        page,
        username: user.username.clone(),
        form: SettingsForm::from_user(&user),
        errors: FormErrors::new(),
    })
}

/// Save profile changes.
#[instrument(skip(state, session, current, form), fields(user_id = %current.id))]
pub async fn update_settings(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(current): RequireAuth,
    Form(form): Form<SettingsForm>,
) -> Result<Response> {
    let user = load_user(&state, &current).await?;
    let users = UserRepository::new(state.pool());

    let valid = match form.validate() {
        Ok(valid) => valid,
        Err(errors) => return render_settings_errors(&state, &session, user, form, errors).await,
    };

    if users.email_in_use(&valid.email, Some(user.id)).await? {
        return render_settings_errors(&state, &session, user, form, email_taken()).await;
    }

    let updated = match users
        .update_profile(user.id, &valid.first_name, &valid.last_name, &valid.email)
        .await
    {
        Ok(updated) => updated,
        Err(RepositoryError::Conflict(_)) => {
            return render_settings_errors(&state, &session, user, form, email_taken()).await;
        }
        Err(e) => return Err(e.into()),
    };

    // Keep the session copy of the email in step with the account.
    set_current_user(&session, &updated.to_current_user()).await?;
    flash::success(&session, "Account details updated successfully!").await?;

    Ok(Redirect::to("/dashboard/settings").into_response())
}

fn email_taken() -> FormErrors {
    let mut errors = FormErrors::new();
    errors.add("email", "That email is already in use.");
    errors
}

async fn render_settings_errors(
    state: &AppState,
    session: &Session,
    user: User,
    form: SettingsForm,
    errors: FormErrors,
) -> Result<Response> {
    flash::error(session, "Please correct the errors below.").await?;
    let page = PageContext::load(state, session).await?.without_hero();

    Ok(SettingsTemplate {
        page,
        username: user.username,
        form,
        errors,
    }
    .into_response())
}

/// Full order history, newest first.
#[instrument(skip(state, session, current), fields(user_id = %current.id))]
pub async fn orders(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(current): RequireAuth,
) -> Result<impl IntoResponse> {
    let orders = OrderRepository::new(state.pool())
        .list_for_user(current.id, None)
        .await?;
    let page = PageContext::load(&state, &session).await?.without_hero();

    Ok(OrdersTemplate { page, orders })
}
