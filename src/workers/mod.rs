pub mod upload_cleanup;

pub use upload_cleanup::{spawn_upload_cleanup_worker, upload_cleanup_worker, UploadCleanupQueue};
