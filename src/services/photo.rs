use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use tokio::fs;
use uuid::Uuid;

use crate::error::{AppError, AppResult};

/// Directory (relative to the media root) holding user photos
pub const PHOTO_DIR: &str = "usuarios/fotos";

/// A photo received from an upload form, not yet written to disk
#[derive(Debug, Clone)]
pub struct UploadedPhoto {
    pub filename: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl UploadedPhoto {
    pub fn validate(&self) -> AppResult<()> {
        if self.bytes.is_empty() {
            return Err(AppError::Validation(
                "O arquivo de foto enviado está vazio.".to_string(),
            ));
        }
        if let Some(content_type) = &self.content_type {
            if !content_type.starts_with("image/") {
                return Err(AppError::Validation(
                    "O arquivo enviado não é uma imagem válida.".to_string(),
                ));
            }
        }
        Ok(())
    }
}

/// Local file storage for user photos
#[derive(Debug, Clone)]
pub struct PhotoStorage {
    media_root: PathBuf,
}

impl PhotoStorage {
    pub fn new(media_root: impl Into<PathBuf>) -> Self {
        Self {
            media_root: media_root.into(),
        }
    }

    pub fn media_root(&self) -> &Path {
        &self.media_root
    }

    /// Build a collision-free relative path: `usuarios/fotos/<uuid><ext>`.
    /// The extension of the original name is kept, leading dot included.
    pub fn generate_path(original_filename: &str) -> String {
        let extension = Path::new(original_filename)
            .file_name()
            .map(Path::new)
            .and_then(Path::extension)
            .map(|ext| format!(".{}", ext.to_string_lossy()))
            .unwrap_or_default();

        format!("{}/{}{}", PHOTO_DIR, Uuid::new_v4(), extension)
    }

    /// Resolve a stored relative path under the media root. Paths that try to
    /// escape the root resolve to `None`.
    pub fn absolute_path(&self, relative: &str) -> Option<PathBuf> {
        let relative = Path::new(relative);
        let is_contained = relative
            .components()
            .all(|component| matches!(component, Component::Normal(_)));

        if relative.as_os_str().is_empty() || !is_contained {
            return None;
        }
        Some(self.media_root.join(relative))
    }

    /// Write the photo under a freshly generated name and return its relative path
    pub async fn store(&self, original_filename: &str, content: &[u8]) -> AppResult<String> {
        let relative = Self::generate_path(original_filename);
        let path = self
            .absolute_path(&relative)
            .ok_or_else(|| AppError::Storage(format!("Invalid photo path: {}", relative)))?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| AppError::Storage(format!("{}: {}", parent.display(), e)))?;
        }

        fs::write(&path, content)
            .await
            .map_err(|e| AppError::Storage(format!("{}: {}", path.display(), e)))?;

        tracing::debug!(photo = %relative, bytes = content.len(), "Photo stored");
        Ok(relative)
    }

    /// Delete a stored photo. Failures are logged, never returned.
    pub async fn remove(&self, relative: &str) {
        let Some(path) = self.absolute_path(relative) else {
            tracing::warn!(photo = %relative, "Refusing to remove photo outside media root");
            return;
        };

        match fs::remove_file(&path).await {
            Ok(()) => tracing::info!(photo = %relative, "Photo removed"),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(photo = %relative, "Photo already gone");
            }
            Err(e) => tracing::warn!(photo = %relative, error = %e, "Failed to remove photo"),
        }
    }

    pub async fn exists(&self, relative: &str) -> bool {
        match self.absolute_path(relative) {
            Some(path) => fs::metadata(&path)
                .await
                .map(|meta| meta.is_file())
                .unwrap_or(false),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_generate_path_keeps_extension() {
        let path = PhotoStorage::generate_path("mark.png");
        assert!(path.starts_with("usuarios/fotos/"));
        assert!(path.ends_with(".png"));

        let id = path
            .trim_start_matches("usuarios/fotos/")
            .trim_end_matches(".png");
        assert!(Uuid::parse_str(id).is_ok());
    }

    #[test]
    fn test_generate_path_without_extension() {
        let path = PhotoStorage::generate_path("photo");
        let id = path.trim_start_matches("usuarios/fotos/");
        assert!(Uuid::parse_str(id).is_ok());
    }

    #[test]
    fn test_generate_path_ignores_client_directories() {
        let path = PhotoStorage::generate_path("../../etc/avatar.jpeg");
        assert!(path.starts_with("usuarios/fotos/"));
        assert!(path.ends_with(".jpeg"));
        assert!(!path.contains(".."));
    }

    #[test]
    fn test_generated_paths_do_not_collide() {
        let paths: HashSet<String> = (0..1000)
            .map(|_| PhotoStorage::generate_path("same.png"))
            .collect();
        assert_eq!(paths.len(), 1000);
    }

    #[test]
    fn test_absolute_path_rejects_escapes() {
        let storage = PhotoStorage::new("/srv/media");
        assert!(storage.absolute_path("../secret").is_none());
        assert!(storage.absolute_path("/etc/passwd").is_none());
        assert!(storage.absolute_path("").is_none());
        assert_eq!(
            storage.absolute_path("usuarios/fotos/a.png"),
            Some(PathBuf::from("/srv/media/usuarios/fotos/a.png"))
        );
    }

    #[test]
    fn test_validate_rejects_non_images() {
        let photo = UploadedPhoto {
            filename: "notes.txt".to_string(),
            content_type: Some("text/plain".to_string()),
            bytes: b"hello".to_vec(),
        };
        assert!(matches!(photo.validate(), Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_store_and_remove() {
        let dir = tempfile::tempdir().unwrap();
        let storage = PhotoStorage::new(dir.path());

        let relative = storage.store("mark.png", b"png-bytes").await.unwrap();
        assert!(storage.exists(&relative).await);

        storage.remove(&relative).await;
        assert!(!storage.exists(&relative).await);

        // Removing twice is a no-op
        storage.remove(&relative).await;
    }
}
