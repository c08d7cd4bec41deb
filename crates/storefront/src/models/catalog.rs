//! Catalog types: categories and products.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use zestify_core::{CategoryId, ProductId, Slug};

/// A product category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub slug: Slug,
}

/// A product in the catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    pub id: ProductId,
    pub category_id: Option<CategoryId>,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    /// Path relative to the media directory, e.g. `products/pro_football.jpg`.
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Product {
    /// Public URL of the product image, if it has one.
    #[must_use]
    pub fn image_url(&self) -> Option<String> {
        self.image
            .as_deref()
            .filter(|path| !path.is_empty())
            .map(|path| format!("/media/{}", path.trim_start_matches('/')))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(image: Option<&str>) -> Product {
        Product {
            id: ProductId::new(1),
            category_id: None,
            name: "Pro Football".to_string(),
            description: String::new(),
            price: Decimal::new(2999, 2),
            image: image.map(String::from),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_image_url() {
        assert_eq!(
            product(Some("products/pro_football.jpg")).image_url().as_deref(),
            Some("/media/products/pro_football.jpg")
        );
        assert_eq!(product(Some("")).image_url(), None);
        assert_eq!(product(None).image_url(), None);
    }
}
