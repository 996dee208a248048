use async_trait::async_trait;
use sqlx::PgPool;

use super::{ProductRepository, SessionStore, UserStore};
use crate::{
    database,
    error::Result,
    models::{NewProduct, Product, Session, User},
    queries::{product_queries, session_queries, user_queries},
};

#[derive(Clone)]
pub struct PgProductRepository {
    pool: PgPool,
}

impl PgProductRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProductRepository for PgProductRepository {
    async fn find_all(&self) -> Result<Vec<Product>> {
        product_queries::find_all(&self.pool).await
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<Product>> {
        product_queries::find_by_id(&self.pool, id).await
    }

    async fn create(&self, product: &NewProduct) -> Result<Product> {
        product_queries::create_product(&self.pool, product).await
    }

    async fn update(&self, id: i32, product: &NewProduct) -> Result<Option<Product>> {
        product_queries::update_product(&self.pool, id, product).await
    }

    async fn delete(&self, id: i32) -> Result<bool> {
        let rows = product_queries::delete_product(&self.pool, id).await?;
        Ok(rows > 0)
    }

    async fn check_health(&self) -> Result<()> {
        database::check_health(&self.pool).await
    }
}

#[derive(Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        user_queries::find_by_username(&self.pool, username).await
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<User>> {
        user_queries::find_by_id(&self.pool, id).await
    }

    async fn create(&self, username: &str, password_hash: &str, is_staff: bool) -> Result<User> {
        user_queries::create_user(&self.pool, username, password_hash, is_staff).await
    }
}

#[derive(Clone)]
pub struct PgSessionStore {
    pool: PgPool,
}

impl PgSessionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SessionStore for PgSessionStore {
    async fn create(&self, token: &str, user_id: i32) -> Result<Session> {
        session_queries::create_session(&self.pool, token, user_id).await
    }

    async fn validate(&self, token: &str) -> Result<Option<Session>> {
        session_queries::find_by_token(&self.pool, token).await
    }

    async fn destroy(&self, token: &str) -> Result<()> {
        session_queries::delete_session(&self.pool, token).await?;
        Ok(())
    }
}
