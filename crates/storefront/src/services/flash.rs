//! Flash messages queued in the session for the next page render.

use tower_sessions::Session;
use tracing::warn;

use crate::models::{FlashLevel, FlashMessage, session_keys};

/// Queue a message for the next rendered page.
///
/// # Errors
///
/// Returns an error if the session cannot be read or written.
pub async fn push(
    session: &Session,
    level: FlashLevel,
    text: impl Into<String>,
) -> Result<(), tower_sessions::session::Error> {
    let mut messages: Vec<FlashMessage> = session
        .get(session_keys::FLASH_MESSAGES)
        .await
        .ok()
        .flatten()
        .unwrap_or_default();
    messages.push(FlashMessage::new(level, text));
    session.insert(session_keys::FLASH_MESSAGES, messages).await
}

pub async fn success(
    session: &Session,
    text: impl Into<String>,
) -> Result<(), tower_sessions::session::Error> {
    push(session, FlashLevel::Success, text).await
}

pub async fn info(
    session: &Session,
    text: impl Into<String>,
) -> Result<(), tower_sessions::session::Error> {
    push(session, FlashLevel::Info, text).await
}

pub async fn error(
    session: &Session,
    text: impl Into<String>,
) -> Result<(), tower_sessions::session::Error> {
    push(session, FlashLevel::Error, text).await
}

/// Drain all queued messages. Failures are logged and yield nothing so a
/// broken session never blocks a page render.
pub async fn take(session: &Session) -> Vec<FlashMessage> {
    match session
        .remove::<Vec<FlashMessage>>(session_keys::FLASH_MESSAGES)
        .await
    {
        Ok(messages) => messages.unwrap_or_default(),
        Err(e) => {
            warn!(error = %e, "failed to read flash messages");
            Vec::new()
        }
    }
}
