//! Storage interfaces the handlers depend on.
//!
//! Handlers only ever see these traits through [`crate::AppState`]; the
//! PostgreSQL implementations back the server and the in-memory ones back
//! the test suite.

mod memory;
mod postgres;

use async_trait::async_trait;

use crate::{
    error::Result,
    models::{NewProduct, Product, Session, User},
};

pub use memory::{MemoryProductRepository, MemorySessionStore, MemoryUserStore};
pub use postgres::{PgProductRepository, PgSessionStore, PgUserStore};

#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// All products in insertion order.
    async fn find_all(&self) -> Result<Vec<Product>>;

    async fn find_by_id(&self, id: i32) -> Result<Option<Product>>;

    /// Persists a new product and returns it with its assigned id.
    async fn create(&self, product: &NewProduct) -> Result<Product>;

    /// Replaces every field of an existing product. `None` when the id is unknown.
    async fn update(&self, id: i32, product: &NewProduct) -> Result<Option<Product>>;

    /// Returns `false` when there was nothing to delete.
    async fn delete(&self, id: i32) -> Result<bool>;

    async fn check_health(&self) -> Result<()> {
        Ok(())
    }
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>>;

    async fn find_by_id(&self, id: i32) -> Result<Option<User>>;

    async fn create(&self, username: &str, password_hash: &str, is_staff: bool) -> Result<User>;
}

#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn create(&self, token: &str, user_id: i32) -> Result<Session>;

    /// Looks up a live session by its token.
    async fn validate(&self, token: &str) -> Result<Option<Session>>;

    /// Removing an unknown token is not an error.
    async fn destroy(&self, token: &str) -> Result<()>;
}
