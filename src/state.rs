use crate::{
    services::uploads::ProfileImageStorage, store::SharedStore,
    workers::upload_cleanup::UploadCleanupQueue,
};
use secrecy::SecretString;
use std::sync::Arc;

/// Application state shared across all HTTP handlers
///
/// Holds the persistence handle, signing settings for bearer tokens and the
/// profile image storage with its cleanup queue.
#[derive(Clone)]
pub struct AppState {
    /// Account and customer store
    pub store: SharedStore,
    /// HMAC secret used to sign and verify bearer tokens
    pub jwt_secret: SecretString,
    /// Lifetime of issued tokens
    pub jwt_expiration_hours: i64,
    /// Profile image storage
    pub uploads: Arc<ProfileImageStorage>,
    /// Queue of images the cleanup worker should remove
    pub upload_cleanup: UploadCleanupQueue,
}

impl AppState {
    /// Create a new AppState instance
    ///
    /// # Arguments
    /// * `store` - Store implementation to use
    /// * `jwt_secret` - Token signing secret
    /// * `jwt_expiration_hours` - Token lifetime
    /// * `uploads` - Profile image storage
    /// * `upload_cleanup` - Sending half of the cleanup worker's queue
    pub fn new(
        store: SharedStore,
        jwt_secret: SecretString,
        jwt_expiration_hours: i64,
        uploads: Arc<ProfileImageStorage>,
        upload_cleanup: UploadCleanupQueue,
    ) -> Self {
        Self {
            store,
            jwt_secret,
            jwt_expiration_hours,
            uploads,
            upload_cleanup,
        }
    }
}
