/// Media storage for uploaded recipe images
///
/// Files live under a media root on the local filesystem and are referenced
/// in the database by their path relative to that root, e.g.
/// `uploads/recipe/3f1c...e2.png`. [`MediaStorage::url`] turns that path
/// into the public URL under which the API serves it.
///
/// Uploads are decoded with the `image` crate before anything is written,
/// so only real images end up on disk. Decoding runs on the blocking pool.
///
/// # Example
///
/// ```no_run
/// use recipebox_shared::storage::MediaStorage;
///
/// # async fn example(upload: Vec<u8>) -> Result<(), recipebox_shared::storage::StorageError> {
/// let storage = MediaStorage::new("./media", "/media/");
/// let path = storage.save_recipe_image(upload).await?;
/// println!("served at {}", storage.url(&path));
/// # Ok(())
/// # }
/// ```

use std::path::PathBuf;

use tracing::{debug, warn};
use uuid::Uuid;

/// Directory, relative to the media root, that holds recipe images
pub const RECIPE_IMAGE_DIR: &str = "uploads/recipe";

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Upload is not a decodable image
    #[error("Upload a valid image. The file you uploaded was either not an image or a corrupted image.")]
    InvalidImage(String),

    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Relative path for a new recipe image with the given extension
///
/// The file name is a random UUID so uploads never collide.
pub fn recipe_image_file_path(extension: &str) -> String {
    format!("{}/{}.{}", RECIPE_IMAGE_DIR, Uuid::new_v4(), extension)
}

/// Decodes `data` and returns the file extension for its format
///
/// # Errors
///
/// [`StorageError::InvalidImage`] if the format is unknown or the data does
/// not decode.
pub fn detect_image_extension(data: &[u8]) -> Result<&'static str, StorageError> {
    let format =
        image::guess_format(data).map_err(|e| StorageError::InvalidImage(e.to_string()))?;

    image::load_from_memory_with_format(data, format)
        .map_err(|e| StorageError::InvalidImage(e.to_string()))?;

    format
        .extensions_str()
        .first()
        .copied()
        .ok_or_else(|| StorageError::InvalidImage(format!("{:?} has no file extension", format)))
}

/// Local media storage
#[derive(Debug, Clone)]
pub struct MediaStorage {
    root: PathBuf,
    base_url: String,
}

impl MediaStorage {
    /// Creates a storage rooted at `root`, served under `base_url`
    ///
    /// `base_url` gets a trailing slash if it lacks one.
    pub fn new(root: impl Into<PathBuf>, base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }

        Self {
            root: root.into(),
            base_url,
        }
    }

    /// Absolute location of a stored file
    pub fn path(&self, relative: &str) -> PathBuf {
        self.root.join(relative)
    }

    /// Public URL of a stored file
    pub fn url(&self, relative: &str) -> String {
        format!("{}{}", self.base_url, relative.trim_start_matches('/'))
    }

    /// Validates and stores a recipe image, returning its relative path
    pub async fn save_recipe_image(&self, data: impl Into<Vec<u8>>) -> Result<String, StorageError> {
        let data: Vec<u8> = data.into();

        let (data, extension) = tokio::task::spawn_blocking(move || {
            detect_image_extension(&data).map(|extension| (data, extension))
        })
        .await
        .map_err(|e| StorageError::Io(std::io::Error::other(e)))??;

        let relative = recipe_image_file_path(extension);
        let target = self.path(&relative);

        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&target, &data).await?;

        debug!(path = %relative, bytes = data.len(), "Recipe image stored");
        Ok(relative)
    }

    /// Removes a stored file; a file that is already gone is not an error
    pub async fn remove(&self, relative: &str) -> Result<(), StorageError> {
        match tokio::fs::remove_file(self.path(relative)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!(path = %relative, "Stored file already missing");
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }
}
