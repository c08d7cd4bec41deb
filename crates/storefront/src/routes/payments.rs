//! Saved payment method handlers: cards and UPI IDs.
//!
//! Only the last four digits of a card are stored. The CVV is validated
//! and then dropped.

use core::fmt;
use core::str::FromStr;

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use zestify_core::{
    CardExpiry, CardNumber, PaymentError, SavedCardId, SavedUpiId, UpiId, validate_cvv,
};

use crate::db::PaymentMethodRepository;
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::RequireAuth;
use crate::models::{CurrentUser, NewCard, NewUpi, SavedCard, SavedUpi};
use crate::routes::PageContext;
use crate::routes::forms::FormErrors;
use crate::services::flash;
use crate::state::AppState;

const FORM_ERROR_MESSAGE: &str = "Please correct the errors in the form.";

/// Which kind of payment method a form adds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MethodType {
    Card,
    Upi,
}

impl MethodType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Card => "card",
            Self::Upi => "upi",
        }
    }
}

impl fmt::Display for MethodType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MethodType {
    type Err = ();

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "card" => Ok(Self::Card),
            "upi" => Ok(Self::Upi),
            _ => Err(()),
        }
    }
}

// =============================================================================
// Templates
// =============================================================================

/// Saved payment methods template.
#[derive(Template, WebTemplate)]
#[template(path = "account/payments.html")]
pub struct PaymentsTemplate {
    pub page: PageContext,
    pub cards: Vec<SavedCard>,
    pub upis: Vec<SavedUpi>,
}

/// Add card / add UPI form template.
#[derive(Template, WebTemplate)]
#[template(path = "account/payment_form.html")]
pub struct PaymentFormTemplate {
    pub page: PageContext,
    pub method_type: MethodType,
    pub form: PaymentMethodForm,
    pub errors: FormErrors,
}

// =============================================================================
// Form
// =============================================================================

/// Fields of both the card and the UPI form. Only the fields of the chosen
/// method are read.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PaymentMethodForm {
    pub card_holder_name: String,
    pub full_card_number: String,
    pub cvv: String,
    pub expiry_month: String,
    pub expiry_year: String,
    pub upi_id: String,
}

impl PaymentMethodForm {
    /// Validate the card fields against the current month.
    fn validate_card(&self, today: NaiveDate) -> std::result::Result<NewCard, FormErrors> {
        let mut errors = FormErrors::new();

        let holder = errors.required("card_holder_name", &self.card_holder_name, 150);
        let number = errors.check("full_card_number", CardNumber::parse(&self.full_card_number));
        errors.check("cvv", validate_cvv(&self.cvv));

        let expiry = match CardExpiry::parse(&self.expiry_month, &self.expiry_year)
            .and_then(|expiry| expiry.ensure_valid_on(today))
        {
            Ok(expiry) => Some(expiry),
            Err(e @ PaymentError::InvalidExpiryMonth) => {
                errors.add("expiry_month", e.to_string());
                None
            }
            Err(e) => {
                errors.add("expiry_year", e.to_string());
                None
            }
        };

        match (holder, number, expiry) {
            (Some(holder), Some(number), Some(expiry)) if errors.is_empty() => Ok(NewCard {
                card_holder_name: holder.to_owned(),
                last_four: number.last_four().to_owned(),
                card_type: number.brand(),
                expiry_month: expiry.month_str(),
                expiry_year: expiry.year_str(),
            }),
            _ => Err(errors),
        }
    }

    fn validate_upi(&self) -> std::result::Result<NewUpi, FormErrors> {
        let mut errors = FormErrors::new();
        match errors.check("upi_id", UpiId::parse(&self.upi_id)) {
            Some(upi_id) => Ok(NewUpi { upi_id }),
            None => Err(errors),
        }
    }

    /// Copy for re-rendering, without the secrets.
    fn redisplay(mut self) -> Self {
        self.cvv.clear();
        self.full_card_number.clear();
        self
    }
}

/// Parse the `{method_type}` path segment, flashing an error for unknown
/// types.
async fn method_type(session: &Session, raw: &str) -> Result<Option<MethodType>> {
    if let Ok(kind) = raw.parse() {
        return Ok(Some(kind));
    }
    flash::error(session, "Invalid payment method type.").await?;
    Ok(None)
}

async fn render_form(
    state: &AppState,
    session: &Session,
    method_type: MethodType,
    form: PaymentMethodForm,
    errors: FormErrors,
) -> Result<Response> {
    let page = PageContext::load(state, session).await?.without_hero();
    Ok(PaymentFormTemplate {
        page,
        method_type,
        form,
        errors,
    }
    .into_response())
}

fn payments_redirect() -> Response {
    Redirect::to("/payments").into_response()
}

// =============================================================================
// Handlers
// =============================================================================

/// Saved cards and UPI IDs.
#[instrument(skip(state, session))]
pub async fn index(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(current): RequireAuth,
) -> Result<impl IntoResponse> {
    let methods = PaymentMethodRepository::new(state.pool());
    let cards = methods.list_cards(current.id).await?;
    let upis = methods.list_upis(current.id).await?;
    let page = PageContext::load(&state, &session).await?.without_hero();

    Ok(PaymentsTemplate { page, cards, upis })
}

/// Blank card or UPI form.
#[instrument(skip(state, session))]
pub async fn add_page(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(_current): RequireAuth,
    Path(raw_type): Path<String>,
) -> Result<Response> {
    let Some(kind) = method_type(&session, &raw_type).await? else {
        return Ok(payments_redirect());
    };
    render_form(&state, &session, kind, PaymentMethodForm::default(), FormErrors::new()).await
}

/// Save a card or UPI ID. The user's first of each becomes the default.
#[instrument(skip(state, session, form))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(current): RequireAuth,
    Path(raw_type): Path<String>,
    Form(form): Form<PaymentMethodForm>,
) -> Result<Response> {
    let Some(kind) = method_type(&session, &raw_type).await? else {
        return Ok(payments_redirect());
    };
    let methods = PaymentMethodRepository::new(state.pool());

    let message = match kind {
        MethodType::Card => match form.validate_card(Utc::now().date_naive()) {
            Ok(card) => {
                let saved = methods.create_card(current.id, &card).await?;
                format!(
                    "Card ending in {} saved successfully.",
                    saved.card_number_last_four
                )
            }
            Err(errors) => {
                flash::error(&session, FORM_ERROR_MESSAGE).await?;
                return render_form(&state, &session, kind, form.redisplay(), errors).await;
            }
        },
        MethodType::Upi => match form.validate_upi() {
            Ok(upi) => {
                let saved = methods.create_upi(current.id, &upi).await?;
                format!("UPI ID {} saved successfully.", saved.upi_id)
            }
            Err(errors) => {
                flash::error(&session, FORM_ERROR_MESSAGE).await?;
                return render_form(&state, &session, kind, form.redisplay(), errors).await;
            }
        },
    };

    flash::success(&session, message).await?;
    Ok(payments_redirect())
}

async fn owned_card(
    state: &AppState,
    id: SavedCardId,
    current: &CurrentUser,
) -> Result<SavedCard> {
    PaymentMethodRepository::new(state.pool())
        .get_card(id, current.id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("card {id}")))
}

async fn owned_upi(
    state: &AppState,
    id: SavedUpiId,
    current: &CurrentUser,
) -> Result<SavedUpi> {
    PaymentMethodRepository::new(state.pool())
        .get_upi(id, current.id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("UPI ID {id}")))
}

/// Delete a card. A removed default hands over to the newest remaining card.
#[instrument(skip(state, session))]
pub async fn delete_card(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(current): RequireAuth,
    Path(id): Path<SavedCardId>,
) -> Result<Response> {
    let card = owned_card(&state, id, &current).await?;
    PaymentMethodRepository::new(state.pool())
        .delete_card(card.id, current.id)
        .await?;

    flash::success(
        &session,
        format!(
            "Card ending in ****{} has been removed.",
            card.card_number_last_four
        ),
    )
    .await?;
    Ok(payments_redirect())
}

/// Delete a UPI ID. A removed default hands over to the newest remaining one.
#[instrument(skip(state, session))]
pub async fn delete_upi(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(current): RequireAuth,
    Path(id): Path<SavedUpiId>,
) -> Result<Response> {
    let upi = owned_upi(&state, id, &current).await?;
    PaymentMethodRepository::new(state.pool())
        .delete_upi(upi.id, current.id)
        .await?;

    flash::success(&session, format!("UPI ID '{}' has been removed.", upi.upi_id)).await?;
    Ok(payments_redirect())
}

/// Make a card the default.
#[instrument(skip(state, session))]
pub async fn default_card(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(current): RequireAuth,
    Path(id): Path<SavedCardId>,
) -> Result<Response> {
    let card = owned_card(&state, id, &current).await?;
    PaymentMethodRepository::new(state.pool())
        .set_default_card(card.id, current.id)
        .await?;

    flash::success(
        &session,
        format!(
            "Card ending in ****{} is now your default payment card.",
            card.card_number_last_four
        ),
    )
    .await?;
    Ok(payments_redirect())
}

/// Make a UPI ID the default.
#[instrument(skip(state, session))]
pub async fn default_upi(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(current): RequireAuth,
    Path(id): Path<SavedUpiId>,
) -> Result<Response> {
    let upi = owned_upi(&state, id, &current).await?;
    PaymentMethodRepository::new(state.pool())
        .set_default_upi(upi.id, current.id)
        .await?;

    flash::success(
        &session,
        format!("UPI ID '{}' is now your default UPI ID.", upi.upi_id),
    )
    .await?;
    Ok(payments_redirect())
}

#[cfg(test)]
mod tests {
    use zestify_core::CardBrand;

    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 18).unwrap_or_default()
    }

    fn card_form() -> PaymentMethodForm {
        PaymentMethodForm {
            card_holder_name: "Asha Rao".to_string(),
            full_card_number: "4111 1111 1111 1111".to_string(),
            cvv: "123".to_string(),
            expiry_month: "7".to_string(),
            expiry_year: "2031".to_string(),
            ..PaymentMethodForm::default()
        }
    }

    #[test]
    fn test_method_type_parse() {
        assert_eq!("card".parse(), Ok(MethodType::Card));
        assert_eq!("upi".parse(), Ok(MethodType::Upi));
        assert!("paypal".parse::<MethodType>().is_err());
    }

    #[test]
    fn test_valid_card_keeps_only_last_four() {
        let Ok(card) = card_form().validate_card(today()) else {
            panic!("expected a valid card");
        };
        assert_eq!(card.last_four, "1111");
        assert_eq!(card.card_type, CardBrand::Visa);
        assert_eq!(card.expiry_month, "07");
        assert_eq!(card.expiry_year, "2031");
    }

    #[test]
    fn test_card_expiring_this_month_is_accepted() {
        let form = PaymentMethodForm {
            expiry_month: "10".to_string(),
            expiry_year: "2026".to_string(),
            ..card_form()
        };
        assert!(form.validate_card(today()).is_ok());
    }

    #[test]
    fn test_expired_card_is_rejected() {
        let form = PaymentMethodForm {
            expiry_month: "09".to_string(),
            expiry_year: "2026".to_string(),
            ..card_form()
        };
        let Err(errors) = form.validate_card(today()) else {
            panic!("expected errors");
        };
        assert_eq!(errors.get("expiry_year"), Some("This card has expired."));
    }

    #[test]
    fn test_card_field_errors() {
        let form = PaymentMethodForm {
            card_holder_name: String::new(),
            full_card_number: "4111 1111 1111 1112".to_string(),
            cvv: "12".to_string(),
            expiry_month: "13".to_string(),
            ..card_form()
        };
        let Err(errors) = form.validate_card(today()) else {
            panic!("expected errors");
        };
        assert!(errors.get("card_holder_name").is_some());
        assert_eq!(errors.get("full_card_number"), Some("Card number is not valid."));
        assert_eq!(errors.get("cvv"), Some("CVV must be 3 or 4 digits."));
        assert_eq!(errors.get("expiry_month"), Some("Enter a valid month (01-12)."));
    }

    #[test]
    fn test_upi_validation() {
        let form = PaymentMethodForm {
            upi_id: "asha@okaxis".to_string(),
            ..PaymentMethodForm::default()
        };
        assert!(form.validate_upi().is_ok());

        let form = PaymentMethodForm {
            upi_id: "not-a-upi".to_string(),
            ..PaymentMethodForm::default()
        };
        let Err(errors) = form.validate_upi() else {
            panic!("expected errors");
        };
        assert_eq!(
            errors.get("upi_id"),
            Some("Enter a valid UPI ID (e.g. name@bank).")
        );
    }

    #[test]
    fn test_redisplay_drops_secrets() {
        let form = card_form().redisplay();
        assert!(form.cvv.is_empty());
        assert!(form.full_card_number.is_empty());
        assert_eq!(form.card_holder_name, "Asha Rao");
    }
}
