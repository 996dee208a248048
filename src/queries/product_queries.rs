use sqlx::PgPool;

use crate::{
    error::Result,
    models::{NewProduct, Product},
};

const PRODUCT_COLUMNS: &str = "id, name, description, price, stock, image";

pub async fn find_all(pool: &PgPool) -> Result<Vec<Product>> {
    let products = sqlx::query_as::<_, Product>(&format!(
        "SELECT {PRODUCT_COLUMNS} FROM products ORDER BY id"
    ))
    .fetch_all(pool)
    .await?;

    Ok(products)
}

pub async fn find_by_id(pool: &PgPool, id: i32) -> Result<Option<Product>> {
    let product = sqlx::query_as::<_, Product>(&format!(
        "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(product)
}

pub async fn create_product(pool: &PgPool, req: &NewProduct) -> Result<Product> {
    let product = sqlx::query_as::<_, Product>(&format!(
        r#"
        INSERT INTO products (name, description, price, stock, image)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING {PRODUCT_COLUMNS}
        "#
    ))
    .bind(&req.name)
    .bind(&req.description)
    .bind(req.price)
    .bind(req.stock)
    .bind(&req.image)
    .fetch_one(pool)
    .await?;

    Ok(product)
}

pub async fn update_product(pool: &PgPool, id: i32, req: &NewProduct) -> Result<Option<Product>> {
    let product = sqlx::query_as::<_, Product>(&format!(
        r#"
        UPDATE products
        SET
            name = $1,
            description = $2,
            price = $3,
            stock = $4,
            image = $5
        WHERE id = $6
        RETURNING {PRODUCT_COLUMNS}
        "#
    ))
    .bind(&req.name)
    .bind(&req.description)
    .bind(req.price)
    .bind(req.stock)
    .bind(&req.image)
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(product)
}

pub async fn delete_product(pool: &PgPool, id: i32) -> Result<u64> {
    let result = sqlx::query("DELETE FROM products WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
}
