//! Seed the catalog with default categories and demo products.
//!
//! Both commands are idempotent: categories are matched by slug and products
//! by exact name, so re-running only fills in what is missing.

use std::path::{Path, PathBuf};

use rust_decimal::Decimal;
use tracing::{info, warn};

use zestify_storefront::db::{self, CategoryRepository, ProductRepository, products::NewProduct};

/// Categories created by `seed categories`.
const DEFAULT_CATEGORIES: [&str; 4] = ["Smartphone", "Music", "Sports", "Electronics"];

/// Keyword rules for filing products, checked in order. `headphone` comes
/// before `phone` so headphones land in Music.
const CATEGORY_KEYWORDS: &[(&[&str], &str)] = &[
    (&["headphone", "speaker"], "Music"),
    (&["phone", "iphone"], "Smartphone"),
    (&["football", "shoe"], "Sports"),
    (&["camera", "laptop"], "Electronics"),
];

/// Media subdirectory for product images.
const PRODUCT_IMAGE_DIR: &str = "products";

struct DemoProduct {
    name: &'static str,
    description: &'static str,
    /// Price in paise.
    price_minor: i64,
    image_url: &'static str,
}

impl DemoProduct {
    fn price(&self) -> Decimal {
        Decimal::new(self.price_minor, 2)
    }
}

const DEMO_PRODUCTS: [DemoProduct; 5] = [
    DemoProduct {
        name: "iPhone 17 Pro Max",
        description: "The latest ultimate iPhone with titanium design, A19 Bionic chip, and 100x zoom.",
        price_minor: 129_999,
        image_url: "https://www.mobileana.com/wp-content/uploads/2025/06/Apple-iPhone-17-Pro-Max-Cosmic-Orange.webp",
    },
    DemoProduct {
        name: "Pro Football",
        description: "Official size and weight professional match ball. High durability and grip.",
        price_minor: 2_999,
        image_url: "https://m.media-amazon.com/images/I/61O1RqeDeQL._AC_UF894,1000_QL80_.jpg",
    },
    DemoProduct {
        name: "Bose Noise Cancelling Headphones",
        description: "World-class adjustable noise cancellation, high-fidelity audio, and comfortable fit.",
        price_minor: 34_900,
        image_url: "https://m.media-amazon.com/images/I/51ZR4lyxBHL.jpg",
    },
    DemoProduct {
        name: "Canon DSLR Camera",
        description: "Capture stunning 4K video and 24MP photos with this versatile DSLR kit.",
        price_minor: 89_950,
        image_url: "https://in.canon/media/image/2022/05/23/0ad3522b3e844ca19ac0a33a6b88cb28_EOS+R7+w+RF-S18-150mm+f3.5-6.3+IS+SSTM+Front+Slant.png",
    },
    DemoProduct {
        name: "Smart Bluetooth Speakers",
        description: "360-degree sound with deep bass and voice control assistant built-in.",
        price_minor: 19_999,
        image_url: "https://avstore.in/cdn/shop/products/1.AVStore-Marshall-Acton-III-Top-Front-Hero-Black.jpg?v=1675690233&width=2048",
    },
];

/// The default category a product name belongs to, if any keyword matches.
fn category_for(product_name: &str) -> Option<&'static str> {
    let name = product_name.to_lowercase();
    CATEGORY_KEYWORDS
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| name.contains(k)))
        .map(|(_, category)| *category)
}

/// `Pro Football` -> `pro_football.jpg`.
fn image_file_name(product_name: &str) -> String {
    let stem: String = product_name
        .to_lowercase()
        .replace(' ', "_")
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-')
        .collect();
    format!("{stem}.jpg")
}

async fn connect() -> Result<sqlx::PgPool, Box<dyn std::error::Error>> {
    let database_url = super::database_url()
        .ok_or("STOREFRONT_DATABASE_URL (or DATABASE_URL) not set")?;
    Ok(db::create_pool(&database_url).await?)
}

/// Create the default categories, then file every product whose name
/// matches a keyword rule.
///
/// Rules are checked in [`CATEGORY_KEYWORDS`] order, so a name containing
/// "headphone" is filed under Music rather than Smartphone even though it
/// also contains "phone".
///
/// # Errors
///
/// Returns an error if the database is unreachable or a query fails.
pub async fn categories() -> Result<(), Box<dyn std::error::Error>> {
    let pool = connect().await?;
    let categories = CategoryRepository::new(&pool);
    let products = ProductRepository::new(&pool);

    info!("Creating categories...");
    let mut created = Vec::with_capacity(DEFAULT_CATEGORIES.len());
    for name in DEFAULT_CATEGORIES {
        let (category, is_new) = categories.get_or_create(name, None).await?;
        info!(name, slug = %category.slug, is_new, "category ready");
        created.push(category);
    }

    info!("Assigning products...");
    for product in products.list_all().await? {
        let Some(target) = category_for(&product.name) else {
            info!(product = %product.name, "no matching category, left unchanged");
            continue;
        };
        let Some(category) = created.iter().find(|c| c.name == target) else {
            continue;
        };
        products.set_category(product.id, category.id).await?;
        info!(product = %product.name, category = %category.name, "assigned");
    }

    info!("Category seeding complete");
    Ok(())
}

/// Insert the demo products that do not exist yet, downloading each image
/// into `STOREFRONT_MEDIA_DIR/products/` unless `skip_images` is set.
///
/// A failed image download does not skip the product: the failure is logged
/// as a warning and the product is created without an image.
///
/// # Errors
///
/// Returns an error if the database is unreachable or a query fails.
pub async fn products(skip_images: bool) -> Result<(), Box<dyn std::error::Error>> {
    let pool = connect().await?;
    let products = ProductRepository::new(&pool);

    let media_dir = PathBuf::from(
        std::env::var("STOREFRONT_MEDIA_DIR").unwrap_or_else(|_| "media".to_string()),
    );
    let client = reqwest::Client::new();

    let mut added = 0_usize;
    for item in &DEMO_PRODUCTS {
        if products.exists_by_name(item.name).await? {
            info!(product = item.name, "skipped (already exists)");
            continue;
        }

        let image = if skip_images {
            None
        } else {
            match download_image(&client, &media_dir, item).await {
                Ok(path) => Some(path),
                Err(e) => {
                    warn!(product = item.name, error = %e, "image download failed");
                    None
                }
            }
        };

        products
            .create(&NewProduct {
                name: item.name,
                description: item.description,
                price: item.price(),
                category_id: None,
                image,
            })
            .await?;
        added += 1;
        info!(product = item.name, "added");
    }

    info!(added, "Product seeding complete");
    Ok(())
}

/// Download a product image and return its path relative to the media dir.
async fn download_image(
    client: &reqwest::Client,
    media_dir: &Path,
    item: &DemoProduct,
) -> Result<String, Box<dyn std::error::Error>> {
    info!(product = item.name, "downloading image...");
    let bytes = client
        .get(item.image_url)
        .send()
        .await?
        .error_for_status()?
        .bytes()
        .await?;

    let dir = media_dir.join(PRODUCT_IMAGE_DIR);
    tokio::fs::create_dir_all(&dir).await?;

    let file_name = image_file_name(item.name);
    tokio::fs::write(dir.join(&file_name), &bytes).await?;

    Ok(format!("{PRODUCT_IMAGE_DIR}/{file_name}"))
}
