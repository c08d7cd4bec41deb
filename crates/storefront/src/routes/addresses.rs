//! Address book handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use zestify_core::{
    AddressId, AddressType, INDIAN_STATES, PhoneNumber, Pincode, validate_state,
};

use crate::db::{AddressRepository, RepositoryError};
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::RequireAuth;
use crate::models::{Address, AddressInput};
use crate::routes::PageContext;
use crate::routes::forms::FormErrors;
use crate::services::flash;
use crate::state::AppState;

/// `(code, name)` pairs offered in the state dropdown.
pub type StateChoices = &'static [(&'static str, &'static str)];

// =============================================================================
// Templates
// =============================================================================

/// Address list template.
#[derive(Template, WebTemplate)]
#[template(path = "account/addresses.html")]
pub struct AddressesTemplate {
    pub page: PageContext,
    pub addresses: Vec<Address>,
}

/// Add/edit address form template.
#[derive(Template, WebTemplate)]
#[template(path = "account/address_form.html")]
pub struct AddressFormTemplate {
    pub page: PageContext,
    /// Form action and heading both depend on whether this is an edit.
    pub editing: Option<AddressId>,
    pub form: AddressForm,
    pub errors: FormErrors,
    pub states: StateChoices,
}

// =============================================================================
// Form
// =============================================================================

/// Raw address form fields, kept as typed for re-rendering.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AddressForm {
    pub full_name: String,
    pub phone_number: String,
    pub zip_code: String,
    pub address_line_1: String,
    pub address_line_2: String,
    pub city: String,
    pub state: String,
    pub address_type: String,
}

impl AddressForm {
    fn from_address(address: &Address) -> Self {
        Self {
            full_name: address.full_name.clone(),
            phone_number: address.phone_number.clone(),
            zip_code: address.zip_code.clone(),
            address_line_1: address.address_line_1.clone(),
            address_line_2: address.address_line_2.clone().unwrap_or_default(),
            city: address.city.clone(),
            state: address.state.clone(),
            address_type: address.address_type.as_str().to_owned(),
        }
    }

    /// Whether `code` is the selected state, for the dropdown.
    #[must_use]
    pub fn is_state(&self, code: &str) -> bool {
        self.state == code
    }

    /// Whether `kind` is the selected address type. Blank means `Home`.
    #[must_use]
    pub fn is_type(&self, kind: &str) -> bool {
        let selected = if self.address_type.trim().is_empty() {
            AddressType::default().as_str()
        } else {
            self.address_type.trim()
        };
        selected.eq_ignore_ascii_case(kind)
    }

    /// Validate every field, collecting all errors.
    fn validate(&self) -> std::result::Result<AddressInput, FormErrors> {
        let mut errors = FormErrors::new();

        let full_name = errors.required("full_name", &self.full_name, 150);
        let phone_number = errors.check("phone_number", PhoneNumber::parse(&self.phone_number));
        let zip_code = errors.check("zip_code", Pincode::parse(&self.zip_code));
        let address_line_1 = errors.required("address_line_1", &self.address_line_1, 255);

        let address_line_2 = self.address_line_2.trim();
        if address_line_2.chars().count() > 255 {
            errors.add(
                "address_line_2",
                "Ensure this value has at most 255 characters.",
            );
        }

        let city = errors.required("city", &self.city, 100);
        let state = errors
            .check("state", validate_state(&self.state))
            .map(|_| self.state.trim().to_owned());

        let address_type = if self.address_type.trim().is_empty() {
            Some(AddressType::default())
        } else {
            let parsed = self.address_type.parse::<AddressType>().ok();
            if parsed.is_none() {
                errors.add("address_type", "Select a valid choice.");
            }
            parsed
        };

        match (
            full_name,
            phone_number,
            zip_code,
            address_line_1,
            city,
            state,
            address_type,
        ) {
            (
                Some(full_name),
                Some(phone_number),
                Some(zip_code),
                Some(address_line_1),
                Some(city),
                Some(state),
                Some(address_type),
            ) if errors.is_empty() => Ok(AddressInput {
                full_name: full_name.to_owned(),
                phone_number,
                address_line_1: address_line_1.to_owned(),
                address_line_2: (!address_line_2.is_empty()).then(|| address_line_2.to_owned()),
                city: city.to_owned(),
                state,
                zip_code,
                address_type,
            }),
            _ => Err(errors),
        }
    }
}

async fn render_form(
    state: &AppState,
    session: &Session,
    editing: Option<AddressId>,
    form: AddressForm,
    errors: FormErrors,
) -> Result<Response> {
    let page = PageContext::load(state, session).await?.without_hero();
    Ok(AddressFormTemplate {
        page,
        editing,
        form,
        errors,
        states: &INDIAN_STATES,
    }
    .into_response())
}

fn address_not_found(id: AddressId) -> AppError {
    AppError::NotFound(format!("address {id}"))
}

/// Map a missing-row error from the repository to a 404.
fn owned(id: AddressId) -> impl FnOnce(RepositoryError) -> AppError {
    move |e| match e {
        RepositoryError::NotFound => address_not_found(id),
        other => AppError::Database(other),
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// The address book, default first.
#[instrument(skip(state, session))]
pub async fn index(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(current): RequireAuth,
) -> Result<impl IntoResponse> {
    let addresses = AddressRepository::new(state.pool())
        .list_for_user(current.id)
        .await?;
    let page = PageContext::load(&state, &session).await?.without_hero();

    Ok(AddressesTemplate { page, addresses })
}

/// Blank address form.
#[instrument(skip(state, session))]
pub async fn add_page(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(_current): RequireAuth,
) -> Result<Response> {
    render_form(&state, &session, None, AddressForm::default(), FormErrors::new()).await
}

/// Save a new address.
#[instrument(skip(state, session, form))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(current): RequireAuth,
    Form(form): Form<AddressForm>,
) -> Result<Response> {
    let input = match form.validate() {
        Ok(input) => input,
        Err(errors) => {
            flash::error(&session, "Please correct the errors below.").await?;
            return render_form(&state, &session, None, form, errors).await;
        }
    };

    AddressRepository::new(state.pool())
        .create(current.id, &input)
        .await?;
    flash::success(&session, "New address added successfully!").await?;

    Ok(Redirect::to("/addresses").into_response())
}

/// Prefilled form for an existing address.
#[instrument(skip(state, session))]
pub async fn edit_page(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(current): RequireAuth,
    Path(id): Path<AddressId>,
) -> Result<Response> {
    let address = AddressRepository::new(state.pool())
        .get_for_user(id, current.id)
        .await?
        .ok_or_else(|| address_not_found(id))?;

    render_form(
        &state,
        &session,
        Some(id),
        AddressForm::from_address(&address),
        FormErrors::new(),
    )
    .await
}

/// Save changes to an existing address.
#[instrument(skip(state, session, form))]
pub async fn edit(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(current): RequireAuth,
    Path(id): Path<AddressId>,
    Form(form): Form<AddressForm>,
) -> Result<Response> {
    let repo = AddressRepository::new(state.pool());
    repo.get_for_user(id, current.id)
        .await?
        .ok_or_else(|| address_not_found(id))?;

    let input = match form.validate() {
        Ok(input) => input,
        Err(errors) => {
            flash::error(&session, "Please correct the errors below.").await?;
            return render_form(&state, &session, Some(id), form, errors).await;
        }
    };

    repo.update(id, current.id, &input).await.map_err(owned(id))?;
    flash::success(&session, "Address updated successfully!").await?;

    Ok(Redirect::to("/addresses").into_response())
}

/// Delete an address.
#[instrument(skip(state, session))]
pub async fn delete(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(current): RequireAuth,
    Path(id): Path<AddressId>,
) -> Result<Redirect> {
    AddressRepository::new(state.pool())
        .delete(id, current.id)
        .await
        .map_err(owned(id))?;
    flash::info(&session, "Address removed.").await?;

    Ok(Redirect::to("/addresses"))
}

/// Make an address the default.
#[instrument(skip(state, session))]
pub async fn set_default(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(current): RequireAuth,
    Path(id): Path<AddressId>,
) -> Result<Redirect> {
    AddressRepository::new(state.pool())
        .set_default(id, current.id)
        .await
        .map_err(owned(id))?;
    flash::success(&session, "Default address updated.").await?;

    Ok(Redirect::to("/addresses"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_form() -> AddressForm {
        AddressForm {
            full_name: "Asha Rao".to_string(),
            phone_number: "+91 98765 43210".to_string(),
            zip_code: "560001".to_string(),
            address_line_1: "12 MG Road".to_string(),
            address_line_2: String::new(),
            city: "Bengaluru".to_string(),
            state: "KA".to_string(),
            address_type: String::new(),
        }
    }

    #[test]
    fn test_valid_form_normalizes_fields() {
        let Ok(input) = valid_form().validate() else {
            panic!("expected a valid address");
        };
        assert_eq!(input.phone_number.as_str(), "9876543210");
        assert_eq!(input.zip_code.as_str(), "560001");
        assert_eq!(input.address_line_2, None);
        assert_eq!(input.address_type, AddressType::Home);
        assert_eq!(input.state, "KA");
    }

    #[test]
    fn test_every_bad_field_is_reported() {
        let form = AddressForm {
            full_name: "  ".to_string(),
            phone_number: "12345".to_string(),
            zip_code: "012345".to_string(),
            state: "ZZ".to_string(),
            address_type: "Office".to_string(),
            ..valid_form()
        };
        let Err(errors) = form.validate() else {
            panic!("expected errors");
        };
        assert_eq!(errors.get("full_name"), Some("This field is required."));
        assert_eq!(
            errors.get("phone_number"),
            Some("Enter a valid 10-digit mobile number.")
        );
        assert_eq!(errors.get("zip_code"), Some("Enter a valid 6-digit pincode."));
        assert_eq!(errors.get("state"), Some("Select a valid state."));
        assert_eq!(errors.get("address_type"), Some("Select a valid choice."));
        assert_eq!(errors.get("city"), None);
    }

    #[test]
    fn test_work_address_with_locality() {
        let form = AddressForm {
            address_line_2: " Indiranagar ".to_string(),
            address_type: "Work".to_string(),
            ..valid_form()
        };
        let Ok(input) = form.validate() else {
            panic!("expected a valid address");
        };
        assert_eq!(input.address_line_2.as_deref(), Some("Indiranagar"));
        assert_eq!(input.address_type, AddressType::Work);
    }

    #[test]
    fn test_selection_helpers() {
        let form = valid_form();
        assert!(form.is_state("KA"));
        assert!(!form.is_state("KL"));
        assert!(form.is_type("Home"));
        assert!(!form.is_type("Work"));
    }
}
