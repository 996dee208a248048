mod health;
mod login;
mod products;

use axum::{
    Router,
    routing::{get, post},
};

use crate::AppState;

pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/products/", get(products::list_products))
        .route("/products/enter/", post(products::create_product))
        .route(
            "/products/{id}/",
            get(products::get_product)
                .put(products::replace_product)
                .delete(products::delete_product),
        )
        .route("/login/", post(login::login_user))
        .route("/logout/", post(login::logout_user))
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check))
}
