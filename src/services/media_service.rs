use uuid::Uuid;

use crate::{config::MediaConfig, error::Result, serializers::product_serializer::UploadedImage};

const PRODUCT_IMAGE_DIR: &str = "product_images";

/// Writes the image under the media root and returns its path relative to that root.
pub async fn store_product_image(media: &MediaConfig, image: &UploadedImage) -> Result<String> {
    let dir = media.root.join(PRODUCT_IMAGE_DIR);
    tokio::fs::create_dir_all(&dir).await?;

    let file_name = format!("{}.{}", Uuid::new_v4(), image.extension);
    tokio::fs::write(dir.join(&file_name), &image.bytes).await?;

    let path = format!("{}/{}", PRODUCT_IMAGE_DIR, file_name);
    tracing::info!("Stored product image {}", path);

    Ok(path)
}

/// Removes a stored image whose product row was never written.
pub async fn discard_product_image(media: &MediaConfig, path: &str) {
    if let Err(e) = tokio::fs::remove_file(media.root.join(path)).await {
        tracing::error!("Failed to remove orphaned image {}: {}", path, e);
    }
}

#[cfg(test)]
mod tests {
    use axum::body::Bytes;

    use super::*;

    #[tokio::test]
    async fn stores_and_discards_images() {
        let root = std::env::temp_dir().join(format!("catalog-media-{}", Uuid::new_v4()));
        let media = MediaConfig::new(&root, "/media/");
        let image = UploadedImage {
            bytes: Bytes::from_static(b"GIF89a"),
            extension: "gif",
        };

        let path = store_product_image(&media, &image).await.unwrap();
        assert!(path.starts_with("product_images/"));
        assert!(path.ends_with(".gif"));
        assert_eq!(tokio::fs::read(root.join(&path)).await.unwrap(), b"GIF89a");

        discard_product_image(&media, &path).await;
        assert!(!root.join(&path).exists());

        let _ = tokio::fs::remove_dir_all(&root).await;
    }
}
