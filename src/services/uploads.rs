use crate::error::{Error, Result};
use bytes::Bytes;
use std::path::{Path, PathBuf};
use tokio::fs;
use uuid::Uuid;

/// Multipart field carrying the profile image
pub const PROFILE_PICTURE_FIELD: &str = "profilePicture";

/// URL prefix under which stored profile images are served
pub const PUBLIC_PREFIX: &str = "/uploads/profiles/";

const PROFILES_DIR: &str = "profiles";

/// An image received in a multipart request, not yet written anywhere.
#[derive(Debug, Clone)]
pub struct UploadedImage {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

/// Accepted image formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    Jpeg,
    Png,
    Gif,
}

impl ImageKind {
    /// Maps a MIME type (`image/jpg` included) to a kind.
    pub fn from_mime(mime: &str) -> Option<Self> {
        let essence = mime.split(';').next().unwrap_or("").trim().to_ascii_lowercase();
        match essence.as_str() {
            "image/jpeg" | "image/jpg" => Some(ImageKind::Jpeg),
            "image/png" => Some(ImageKind::Png),
            "image/gif" => Some(ImageKind::Gif),
            _ => None,
        }
    }

    /// Maps a file name extension to a kind.
    pub fn from_file_name(file_name: &str) -> Option<Self> {
        let extension = Path::new(file_name).extension()?.to_str()?.to_ascii_lowercase();
        match extension.as_str() {
            "jpeg" | "jpg" => Some(ImageKind::Jpeg),
            "png" => Some(ImageKind::Png),
            "gif" => Some(ImageKind::Gif),
            _ => None,
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            ImageKind::Jpeg => "jpg",
            ImageKind::Png => "png",
            ImageKind::Gif => "gif",
        }
    }
}

/// Stores profile images under `<base_path>/profiles` and removes them again.
#[derive(Debug, Clone)]
pub struct ProfileImageStorage {
    base_path: PathBuf,
    max_bytes: usize,
}

impl ProfileImageStorage {
    pub fn new(base_path: impl Into<PathBuf>, max_bytes: usize) -> Self {
        Self {
            base_path: base_path.into(),
            max_bytes,
        }
    }

    /// Creates the profiles directory if needed
    pub async fn init(&self) -> Result<()> {
        let profiles_dir = self.profiles_root();
        fs::create_dir_all(&profiles_dir).await.map_err(|e| {
            Error::Internal(format!("Failed to create upload directory {:?}: {}", profiles_dir, e))
        })
    }

    /// Directory served under `/uploads`
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    fn profiles_root(&self) -> PathBuf {
        self.base_path.join(PROFILES_DIR)
    }

    /// Checks size and type. Nothing is written.
    ///
    /// The declared content type decides; the file name extension is only
    /// consulted when no content type was sent.
    pub fn validate(&self, image: &UploadedImage) -> Result<ImageKind> {
        if image.bytes.len() > self.max_bytes {
            return Err(Error::validation(
                PROFILE_PICTURE_FIELD,
                format!(
                    "File too large: maximum size is {} MB",
                    self.max_bytes / (1024 * 1024)
                ),
            ));
        }

        let kind = match image.content_type.as_deref() {
            Some(mime) => ImageKind::from_mime(mime),
            None => image.file_name.as_deref().and_then(ImageKind::from_file_name),
        };

        kind.ok_or_else(|| {
            Error::validation(
                PROFILE_PICTURE_FIELD,
                "Only image files (jpeg, jpg, png, gif) are allowed",
            )
        })
    }

    /// Validates and writes the image, returning its public path
    /// (`/uploads/profiles/profile-<uuid>.<ext>`).
    pub async fn store(&self, image: &UploadedImage) -> Result<String> {
        let kind = self.validate(image)?;
        let file_name = format!("profile-{}.{}", Uuid::now_v7(), kind.extension());
        let target = self.profiles_root().join(&file_name);

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).await.map_err(|e| {
                Error::Internal(format!("Failed to create directory {:?}: {}", parent, e))
            })?;
        }

        fs::write(&target, &image.bytes).await.map_err(|e| {
            Error::Internal(format!("Failed to write upload {:?}: {}", target, e))
        })?;

        tracing::debug!(path = ?target, size = image.bytes.len(), "Stored profile image");
        Ok(format!("{}{}", PUBLIC_PREFIX, file_name))
    }

    /// Resolves a public path to its location on disk.
    ///
    /// Returns `None` for anything that is not a plain file name under the
    /// profiles prefix, so stored paths can never point outside the directory.
    pub fn local_path(&self, public_path: &str) -> Option<PathBuf> {
        let file_name = public_path.strip_prefix(PUBLIC_PREFIX)?;
        let is_plain = !file_name.is_empty()
            && file_name != "."
            && file_name != ".."
            && !file_name.contains(['/', '\\']);
        is_plain.then(|| self.profiles_root().join(file_name))
    }

    /// Deletes a stored image. A file that is already gone counts as removed.
    pub async fn remove(&self, public_path: &str) -> Result<()> {
        let path = self.local_path(public_path).ok_or_else(|| {
            Error::Internal(format!("Refusing to remove path outside uploads: {}", public_path))
        })?;

        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Error::Internal(format!(
                "Failed to remove upload {:?}: {}",
                path, e
            ))),
        }
    }
}
