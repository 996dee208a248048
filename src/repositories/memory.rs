use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;

use super::{ProductRepository, SessionStore, UserStore};
use crate::{
    error::{AppError, Result},
    models::{NewProduct, Product, Session, User},
};

#[derive(Default)]
struct ProductTable {
    next_id: i32,
    rows: BTreeMap<i32, Product>,
}

/// Products kept in a map keyed by id. Ids are never reused, even after a delete.
#[derive(Default)]
pub struct MemoryProductRepository {
    table: RwLock<ProductTable>,
}

impl MemoryProductRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn build_product(id: i32, product: &NewProduct) -> Product {
    let mut price = product.price;
    price.rescale(2);

    Product {
        id,
        name: product.name.clone(),
        description: product.description.clone(),
        price,
        stock: product.stock,
        image: product.image.clone(),
    }
}

#[async_trait]
impl ProductRepository for MemoryProductRepository {
    async fn find_all(&self) -> Result<Vec<Product>> {
        Ok(self.table.read().rows.values().cloned().collect())
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<Product>> {
        Ok(self.table.read().rows.get(&id).cloned())
    }

    async fn create(&self, product: &NewProduct) -> Result<Product> {
        let mut table = self.table.write();
        table.next_id += 1;
        let stored = build_product(table.next_id, product);
        table.rows.insert(stored.id, stored.clone());

        Ok(stored)
    }

    async fn update(&self, id: i32, product: &NewProduct) -> Result<Option<Product>> {
        let mut table = self.table.write();
        let Some(row) = table.rows.get_mut(&id) else {
            return Ok(None);
        };
        *row = build_product(id, product);

        Ok(Some(row.clone()))
    }

    async fn delete(&self, id: i32) -> Result<bool> {
        Ok(self.table.write().rows.remove(&id).is_some())
    }
}

#[derive(Default)]
pub struct MemoryUserStore {
    users: RwLock<Vec<User>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` when no user has that name.
    pub fn set_active(&self, username: &str, active: bool) -> bool {
        let mut users = self.users.write();
        match users.iter_mut().find(|user| user.username == username) {
            Some(user) => {
                user.is_active = active;
                true
            }
            None => false,
        }
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        Ok(self
            .users
            .read()
            .iter()
            .find(|user| user.username == username)
            .cloned())
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<User>> {
        Ok(self.users.read().iter().find(|user| user.id == id).cloned())
    }

    async fn create(&self, username: &str, password_hash: &str, is_staff: bool) -> Result<User> {
        let mut users = self.users.write();
        if users.iter().any(|user| user.username == username) {
            return Err(AppError::BadRequest(format!(
                "User {} already exists",
                username
            )));
        }

        let user = User {
            id: users.len() as i32 + 1,
            username: username.to_string(),
            password: password_hash.to_string(),
            is_staff,
            is_active: true,
            created_at: Utc::now(),
        };
        users.push(user.clone());

        Ok(user)
    }
}

#[derive(Default)]
pub struct MemorySessionStore {
    sessions: RwLock<HashMap<String, Session>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.sessions.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.read().is_empty()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn create(&self, token: &str, user_id: i32) -> Result<Session> {
        let session = Session {
            token: token.to_string(),
            user_id,
            created_at: Utc::now(),
        };
        self.sessions
            .write()
            .insert(token.to_string(), session.clone());

        Ok(session)
    }

    async fn validate(&self, token: &str) -> Result<Option<Session>> {
        Ok(self.sessions.read().get(token).cloned())
    }

    async fn destroy(&self, token: &str) -> Result<()> {
        self.sessions.write().remove(token);
        Ok(())
    }
}
