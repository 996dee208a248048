use rust_decimal::Decimal;
use serde::Serialize;

use crate::config::MediaConfig;

pub const DEFAULT_PRODUCT_NAME: &str = "Default Product";

#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct Product {
    pub id: i32,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub stock: i32,
    pub image: Option<String>,
}

/// Validated field values written on create and on full replacement.
#[derive(Debug, Clone, PartialEq)]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub stock: i32,
    pub image: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductResponse {
    pub id: i32,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub stock: i32,
    pub image: Option<String>,
}

impl ProductResponse {
    pub fn from_product(product: Product, media: &MediaConfig) -> Self {
        let mut price = product.price;
        price.rescale(2);

        Self {
            id: product.id,
            name: product.name,
            description: product.description,
            price,
            stock: product.stock,
            image: product.image.as_deref().map(|path| media.public_url(path)),
        }
    }
}
