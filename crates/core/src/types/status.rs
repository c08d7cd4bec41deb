//! Status and kind enums stored as `TEXT` columns.
//!
//! Repositories convert with `Display`/`FromStr` and surface unknown values
//! as data corruption.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

/// Order lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum OrderStatus {
    #[default]
    Processing,
    Packed,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    /// Every status, in lifecycle order.
    pub const ALL: [Self; 5] = [
        Self::Processing,
        Self::Packed,
        Self::Shipped,
        Self::Delivered,
        Self::Cancelled,
    ];

    /// Stored and displayed label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Processing => "Processing",
            Self::Packed => "Packed",
            Self::Shipped => "Shipped",
            Self::Delivered => "Delivered",
            Self::Cancelled => "Cancelled",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("invalid order status: {s}"))
    }
}

/// Kind of delivery address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum AddressType {
    #[default]
    Home,
    Work,
}

impl AddressType {
    /// Stored and displayed label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Home => "Home",
            Self::Work => "Work",
        }
    }
}

impl fmt::Display for AddressType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AddressType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Home" | "home" => Ok(Self::Home),
            "Work" | "work" => Ok(Self::Work),
            _ => Err(format!("invalid address type: {s}")),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_order_status_round_trips_through_text() {
        for status in OrderStatus::ALL {
            assert_eq!(status.to_string().parse::<OrderStatus>().unwrap(), status);
        }
    }

    #[test]
    fn test_order_status_parse_is_case_insensitive() {
        assert_eq!(
            "shipped".parse::<OrderStatus>().unwrap(),
            OrderStatus::Shipped
        );
        assert!("Lost".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn test_order_status_default() {
        assert_eq!(OrderStatus::default(), OrderStatus::Processing);
    }

    #[test]
    fn test_address_type_parse() {
        assert_eq!("Work".parse::<AddressType>().unwrap(), AddressType::Work);
        assert_eq!("home".parse::<AddressType>().unwrap(), AddressType::Home);
        assert!("Office".parse::<AddressType>().is_err());
    }
}
