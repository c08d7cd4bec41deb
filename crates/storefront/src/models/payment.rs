//! Saved payment method types.
//!
//! Only the last four digits of a card are ever stored.

use zestify_core::{CardBrand, SavedCardId, SavedUpiId, UpiId, UserId};

/// A saved card.
#[derive(Debug, Clone)]
pub struct SavedCard {
    pub id: SavedCardId,
    pub user_id: UserId,
    pub card_number_last_four: String,
    pub card_holder_name: String,
    pub card_type: String,
    pub expiry_month: String,
    pub expiry_year: String,
    pub is_default: bool,
}

impl SavedCard {
    /// Masked number for display, e.g. `**** **** **** 4242`.
    #[must_use]
    pub fn masked_number(&self) -> String {
        format!("**** **** **** {}", self.card_number_last_four)
    }

    /// Expiry as `MM/YYYY`.
    #[must_use]
    pub fn expiry(&self) -> String {
        format!("{}/{}", self.expiry_month, self.expiry_year)
    }
}

/// A saved UPI ID.
#[derive(Debug, Clone)]
pub struct SavedUpi {
    pub id: SavedUpiId,
    pub user_id: UserId,
    pub upi_id: String,
    pub is_default: bool,
}

/// A validated card ready to be stored.
#[derive(Debug, Clone)]
pub struct NewCard {
    pub card_holder_name: String,
    pub last_four: String,
    pub card_type: CardBrand,
    pub expiry_month: String,
    pub expiry_year: String,
}

/// A validated UPI ID ready to be stored.
#[derive(Debug, Clone)]
pub struct NewUpi {
    pub upi_id: UpiId,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_card_display_helpers() {
        let card = SavedCard {
            id: SavedCardId::new(3),
            user_id: UserId::new(1),
            card_number_last_four: "4242".to_string(),
            card_holder_name: "Asha Rao".to_string(),
            card_type: "Visa".to_string(),
            expiry_month: "07".to_string(),
            expiry_year: "2031".to_string(),
            is_default: true,
        };
        assert_eq!(card.masked_number(), "**** **** **** 4242");
        assert_eq!(card.expiry(), "07/2031");
    }
}
