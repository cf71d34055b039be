//! Локальное хранилище картинок самолетов.
//!
//! Файлы лежат в `{root}/uploads/airplanes/{slug}-{uuid}.{ext}`, а наружу
//! отдаются через `/media/...`.

use image::ImageFormat;
use std::path::{Path, PathBuf};
use tracing::info;
use uuid::Uuid;

use crate::error::ApiError;

pub const MEDIA_URL_PREFIX: &str = "/media";
const AIRPLANE_UPLOAD_DIR: &str = "uploads/airplanes";

#[derive(Debug, Clone)]
pub struct MediaStorage {
    root: PathBuf,
}

impl MediaStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Сохраняет картинку и возвращает относительный путь для записи в БД.
    pub async fn save_airplane_image(
        &self,
        airplane_name: &str,
        image: &CheckedImage,
    ) -> std::io::Result<String> {
        let dir = self.root.join(AIRPLANE_UPLOAD_DIR);
        tokio::fs::create_dir_all(&dir).await?;

        let filename = format!("{}-{}.{}", slugify(airplane_name), Uuid::new_v4(), image.extension);
        tokio::fs::write(dir.join(&filename), &image.data).await?;

        let relative = format!("{AIRPLANE_UPLOAD_DIR}/{filename}");
        info!(path = %relative, bytes = image.data.len(), "airplane image stored");
        Ok(relative)
    }

    pub fn url_for(relative: &str) -> String {
        format!("{MEDIA_URL_PREFIX}/{relative}")
    }
}

/// Загруженный файл, который точно декодируется как картинка.
#[derive(Debug)]
pub struct CheckedImage {
    pub data: Vec<u8>,
    pub extension: &'static str,
}

/// Проверяет, что байты - это PNG, JPEG или WebP, и картинка декодируется.
pub fn check_image(data: Vec<u8>, max_bytes: usize) -> Result<CheckedImage, ApiError> {
    if data.is_empty() {
        return Err(ApiError::validation("image", "The submitted file is empty."));
    }
    if data.len() > max_bytes {
        return Err(ApiError::validation(
            "image",
            format!("File too large: {} bytes (max {max_bytes})", data.len()),
        ));
    }

    let not_an_image = || {
        ApiError::validation(
            "image",
            "Upload a valid image. The file you uploaded was either not an image or a corrupted image.",
        )
    };

    let format = image::guess_format(&data).map_err(|_| not_an_image())?;
    let extension = match format {
        ImageFormat::Png => "png",
        ImageFormat::Jpeg => "jpg",
        ImageFormat::WebP => "webp",
        _ => return Err(not_an_image()),
    };
    image::load_from_memory_with_format(&data, format).map_err(|_| not_an_image())?;

    Ok(CheckedImage { data, extension })
}

/// ASCII-слаг: буквы/цифры в нижнем регистре, остальное схлопывается в `-`.
/// Не-ASCII буквы отбрасываются: "Ан-24" дает "24".
pub fn slugify(value: &str) -> String {
    let mut slug = String::with_capacity(value.len());
    let mut dash = false;
    for c in value.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
            dash = false;
        } else if !dash && !slug.is_empty() {
            slug.push('-');
            dash = true;
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    if slug.is_empty() {
        slug.push_str("airplane");
    }
    slug
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Rgb};
    use std::io::Cursor;

    fn tiny_png() -> Vec<u8> {
        let img: ImageBuffer<Rgb<u8>, Vec<u8>> = ImageBuffer::new(2, 2);
        let mut buf = Cursor::new(Vec::new());
        img.write_to(&mut buf, ImageFormat::Png).unwrap();
        buf.into_inner()
    }

    #[test]
    fn slugify_collapses_separators() {
        assert_eq!(slugify("Boeing 737-800"), "boeing-737-800");
        assert_eq!(slugify("  Airbus   A320 "), "airbus-a320");
        assert_eq!(slugify("!!!"), "airplane");
        assert_eq!(slugify("Ан-24"), "24");
    }

    #[test]
    fn accepts_real_png() {
        let checked = check_image(tiny_png(), 1024 * 1024).unwrap();
        assert_eq!(checked.extension, "png");
    }

    #[test]
    fn rejects_text_payload() {
        let err = check_image(b"notimage".to_vec(), 1024).unwrap_err();
        assert!(matches!(err, ApiError::Validation { ref field, .. } if field == "image"));
    }

    #[test]
    fn rejects_oversized_and_empty_files() {
        assert!(check_image(tiny_png(), 4).is_err());
        assert!(check_image(Vec::new(), 1024).is_err());
    }

    #[tokio::test]
    async fn stores_file_under_uploads() {
        let root = std::env::temp_dir().join(format!("airport-media-{}", Uuid::new_v4()));
        let storage = MediaStorage::new(&root);
        let checked = check_image(tiny_png(), 1024 * 1024).unwrap();

        let relative = storage.save_airplane_image("Test Airplane", &checked).await.unwrap();
        assert!(relative.starts_with("uploads/airplanes/test-airplane-"));
        assert!(relative.ends_with(".png"));
        assert!(root.join(&relative).exists());
        assert_eq!(MediaStorage::url_for(&relative), format!("/media/{relative}"));

        tokio::fs::remove_dir_all(&root).await.unwrap();
    }
}
