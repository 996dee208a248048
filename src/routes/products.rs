use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::{
    AppState,
    error::{AppError, Result},
    models::ProductResponse,
    serializers::product_serializer::{self, ImageChange, ProductDraft},
    services::media_service,
    utils::extractors::ProductPayload,
};

pub async fn list_products(State(state): State<AppState>) -> Result<Json<Vec<ProductResponse>>> {
    let products = state.products.find_all().await?;

    Ok(Json(
        products
            .into_iter()
            .map(|product| ProductResponse::from_product(product, &state.media))
            .collect(),
    ))
}

pub async fn create_product(
    State(state): State<AppState>,
    payload: ProductPayload,
) -> Result<(StatusCode, Json<ProductResponse>)> {
    let draft = product_serializer::validate_product(payload)?;

    let uploaded = store_upload(&state, &draft).await?;
    let new_product = draft.into_new_product(uploaded.clone());

    let product = match state.products.create(&new_product).await {
        Ok(product) => product,
        Err(e) => {
            discard_upload(&state, uploaded).await;
            return Err(e);
        }
    };

    tracing::info!("Product {} created", product.id);

    Ok((
        StatusCode::CREATED,
        Json(ProductResponse::from_product(product, &state.media)),
    ))
}

pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ProductResponse>> {
    let id = parse_id(&id)?;
    let product = state
        .products
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Product {}", id)))?;

    Ok(Json(ProductResponse::from_product(product, &state.media)))
}

/// The id is resolved before the body is looked at, so an unknown product is a 404
/// even when the payload is malformed.
pub async fn replace_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: std::result::Result<ProductPayload, AppError>,
) -> Result<Json<ProductResponse>> {
    let id = parse_id(&id)?;
    let existing = state
        .products
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Product {}", id)))?;

    let draft = product_serializer::validate_product(payload?)?;

    let uploaded = store_upload(&state, &draft).await?;
    let image = match draft.image {
        ImageChange::Keep => existing.image,
        ImageChange::Clear => None,
        ImageChange::Upload(_) => uploaded.clone(),
    };
    let new_product = draft.into_new_product(image);

    let product = match state.products.update(id, &new_product).await {
        Ok(Some(product)) => product,
        Ok(None) => {
            discard_upload(&state, uploaded).await;
            return Err(AppError::NotFound(format!("Product {}", id)));
        }
        Err(e) => {
            discard_upload(&state, uploaded).await;
            return Err(e);
        }
    };

    tracing::info!("Product {} replaced", product.id);

    Ok(Json(ProductResponse::from_product(product, &state.media)))
}

pub async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    let id = parse_id(&id)?;

    if !state.products.delete(id).await? {
        return Err(AppError::NotFound(format!("Product {}", id)));
    }

    tracing::info!("Product {} deleted", id);

    Ok(StatusCode::NO_CONTENT)
}

/// Only plain non-negative integers name a product; anything else cannot match one.
fn parse_id(raw: &str) -> Result<i32> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(AppError::NotFound(format!("Product {}", raw)));
    }

    raw.parse::<i32>()
        .map_err(|_| AppError::NotFound(format!("Product {}", raw)))
}

async fn store_upload(state: &AppState, draft: &ProductDraft) -> Result<Option<String>> {
    match &draft.image {
        ImageChange::Upload(image) => {
            let path = media_service::store_product_image(&state.media, image).await?;
            Ok(Some(path))
        }
        ImageChange::Keep | ImageChange::Clear => Ok(None),
    }
}

async fn discard_upload(state: &AppState, uploaded: Option<String>) {
    if let Some(path) = uploaded {
        media_service::discard_product_image(&state.media, &path).await;
    }
}
