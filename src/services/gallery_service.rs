use crate::error::{AppError, AppResult};
use crate::services::storage_service::ObjectStorage;

pub const GALLERY_BUCKET: &str = "gallery";
const GALLERY_PAGE_LIMIT: usize = 100;
const IMAGE_EXTENSIONS: [&str; 4] = ["jpg", "jpeg", "png", "webp"];

pub fn is_gallery_image(name: &str) -> bool {
    name.rsplit_once('.')
        .map(|(_, ext)| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

pub async fn list_year_images(storage: &ObjectStorage, year: &str) -> AppResult<Vec<String>> {
    if year.len() != 4 || !year.bytes().all(|b| b.is_ascii_digit()) {
        return Err(AppError::validation("Year must be four digits"));
    }

    let names = storage
        .list(GALLERY_BUCKET, year, GALLERY_PAGE_LIMIT)
        .await?;

    Ok(names
        .into_iter()
        .filter(|name| is_gallery_image(name))
        .map(|name| storage.public_url(GALLERY_BUCKET, &format!("{}/{}", year, name)))
        .collect())
}
