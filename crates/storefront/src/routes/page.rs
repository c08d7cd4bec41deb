//! Context shared by every rendered page: the navigation categories, the
//! cart badge, the logged-in user and pending flash messages.

use std::borrow::Borrow;
use std::sync::Arc;

use rust_decimal::Decimal;
use tower_sessions::Session;

use zestify_core::{CurrencyCode, Price};

use crate::db::ProductRepository;
use crate::error::Result;
use crate::models::{Category, CurrentUser, FlashMessage, session_keys};
use crate::services::cart::Cart;
use crate::services::flash;
use crate::state::AppState;

/// Layout data for `base.html`.
pub struct PageContext {
    pub categories: Arc<Vec<Category>>,
    /// Units in the cart, after ghost cleanup.
    pub cart_count: u64,
    pub user: Option<CurrentUser>,
    pub messages: Vec<FlashMessage>,
    /// Product, category and account pages skip the home page banner.
    pub hide_hero: bool,
    /// Slug of the category being browsed, highlighted in the navigation.
    pub active_category: Option<String>,
    pub currency: CurrencyCode,
}

impl PageContext {
    /// Build the context, loading the cart to count its items.
    ///
    /// # Errors
    ///
    /// Returns an error if the categories or the cart cannot be loaded.
    pub async fn load(state: &AppState, session: &Session) -> Result<Self> {
        let cart = Cart::load(session, &ProductRepository::new(state.pool())).await?;
        Self::with_cart(state, session, &cart).await
    }

    /// Build the context for a handler that already loaded the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the categories cannot be loaded.
    pub async fn with_cart(state: &AppState, session: &Session, cart: &Cart) -> Result<Self> {
        let categories = state.categories().await?;
        let user = session
            .get::<CurrentUser>(session_keys::CURRENT_USER)
            .await
            .ok()
            .flatten();
        let messages = flash::take(session).await;

        Ok(Self {
            categories,
            cart_count: cart.len(),
            user,
            messages,
            hide_hero: false,
            active_category: None,
            currency: state.config().currency,
        })
    }

    #[must_use]
    pub const fn without_hero(mut self) -> Self {
        self.hide_hero = true;
        self
    }

    #[must_use]
    pub fn in_category(mut self, slug: impl Into<String>) -> Self {
        self.active_category = Some(slug.into());
        self
    }

    #[must_use]
    pub const fn is_logged_in(&self) -> bool {
        self.user.is_some()
    }

    /// Whether `slug` is the category being browsed.
    #[must_use]
    pub fn is_active_category(&self, slug: &str) -> bool {
        self.active_category.as_deref() == Some(slug)
    }

    /// Format an amount in the store currency, e.g. `₹1,299.00`.
    #[must_use]
    pub fn money(&self, amount: impl Borrow<Decimal>) -> String {
        Price::new(*amount.borrow(), self.currency).display()
    }
}
