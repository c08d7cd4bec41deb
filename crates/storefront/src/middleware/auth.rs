//! Authentication extractors.
//!
//! Provides extractors for requiring a logged-in user in route handlers.

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use crate::models::{CurrentUser, session_keys};

/// Extractor that requires a logged-in user.
///
/// Anonymous requests are redirected to `/login?next=<path>`.
///
/// # Example
///
/// ```rust,ignore
/// async fn dashboard(RequireAuth(user): RequireAuth) -> impl IntoResponse {
///     format!("Hello, {}!", user.username)
/// }
/// ```
pub struct RequireAuth(pub CurrentUser);

/// Rejection for [`RequireAuth`].
#[derive(Debug)]
pub enum AuthRejection {
    /// Redirect to the login page, returning to `next` afterwards.
    RedirectToLogin { next: String },
    /// The session layer is missing from the stack.
    NoSession,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin { next } => Redirect::to(&login_url(&next)).into_response(),
            Self::NoSession => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
        }
    }
}

/// `/login?next=...` for the given path.
#[must_use]
pub fn login_url(next: &str) -> String {
    format!("/login?next={}", urlencoding::encode(next))
}

impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let session = parts
            .extensions
            .get::<Session>()
            .ok_or(AuthRejection::NoSession)?;

        let user: Option<CurrentUser> = session
            .get(session_keys::CURRENT_USER)
            .await
            .ok()
            .flatten();

        user.map(Self).ok_or_else(|| AuthRejection::RedirectToLogin {
            next: parts
                .uri
                .path_and_query()
                .map_or_else(|| parts.uri.path().to_owned(), |pq| pq.as_str().to_owned()),
        })
    }
}

/// Store the logged-in user in the session.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_user(
    session: &Session,
    user: &CurrentUser,
) -> Result<(), tower_sessions::session::Error> {
    session.insert(session_keys::CURRENT_USER, user).await
}

/// Remove the logged-in user from the session.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_current_user(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session
        .remove::<CurrentUser>(session_keys::CURRENT_USER)
        .await?;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_login_url_encodes_next() {
        assert_eq!(login_url("/checkout"), "/login?next=%2Fcheckout");
        assert_eq!(
            login_url("/search?q=a b"),
            "/login?next=%2Fsearch%3Fq%3Da%20b"
        );
    }

    #[test]
    fn test_redirect_rejection_points_at_login() {
        let response = AuthRejection::RedirectToLogin {
            next: "/dashboard".to_string(),
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers().get("location").unwrap(),
            "/login?next=%2Fdashboard"
        );
    }
}
