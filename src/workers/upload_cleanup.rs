use crate::services::uploads::ProfileImageStorage;
use std::sync::Arc;
use tokio::{
    sync::{broadcast, mpsc},
    task::JoinHandle,
};
use tracing::{debug, info, warn};

/// A stored profile image that is no longer referenced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadCleanupMessage {
    /// Public path, e.g. `/uploads/profiles/profile-<uuid>.png`
    pub path: String,
    pub reason: CleanupReason,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CleanupReason {
    /// The request that stored the image failed afterwards
    Rollback,
    /// A successful update replaced the image
    Replaced,
}

impl std::fmt::Display for CleanupReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CleanupReason::Rollback => write!(f, "rollback"),
            CleanupReason::Replaced => write!(f, "replaced"),
        }
    }
}

/// Sending half handed to request handlers.
///
/// Scheduling never fails the caller; a closed queue is only logged.
#[derive(Debug, Clone)]
pub struct UploadCleanupQueue {
    tx: mpsc::UnboundedSender<UploadCleanupMessage>,
}

impl UploadCleanupQueue {
    pub fn new(tx: mpsc::UnboundedSender<UploadCleanupMessage>) -> Self {
        Self { tx }
    }

    pub fn schedule(&self, path: impl Into<String>, reason: CleanupReason) {
        let message = UploadCleanupMessage {
            path: path.into(),
            reason,
        };
        if let Err(e) = self.tx.send(message) {
            warn!("[UploadCleanup] Queue closed, leaving {} on disk", e.0.path);
        }
    }
}

/// Background worker that removes profile images handed to it.
///
/// Exits when every sender is dropped or on shutdown.
pub async fn upload_cleanup_worker(
    storage: Arc<ProfileImageStorage>,
    mut shutdown_rx: broadcast::Receiver<()>,
    mut cleanup_rx: mpsc::UnboundedReceiver<UploadCleanupMessage>,
) {
    info!("[UploadCleanup] Started");

    loop {
        tokio::select! {
            _ = shutdown_rx.recv() => {
                // Finish what was already queued before stopping
                while let Ok(message) = cleanup_rx.try_recv() {
                    remove_upload(&storage, message).await;
                }
                info!("[UploadCleanup] Shutting down");
                break;
            }
            message = cleanup_rx.recv() => {
                match message {
                    Some(message) => remove_upload(&storage, message).await,
                    None => break,
                }
            }
        }
    }

    info!("[UploadCleanup] Stopped");
}

/// Spawns the worker and returns the queue feeding it.
///
/// Await the handle after signalling shutdown so queued removals finish.
pub fn spawn_upload_cleanup_worker(
    storage: Arc<ProfileImageStorage>,
    shutdown_rx: broadcast::Receiver<()>,
) -> (UploadCleanupQueue, JoinHandle<()>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let handle = tokio::spawn(upload_cleanup_worker(storage, shutdown_rx, rx));
    (UploadCleanupQueue::new(tx), handle)
}

async fn remove_upload(storage: &ProfileImageStorage, message: UploadCleanupMessage) {
    match storage.remove(&message.path).await {
        Ok(()) => debug!("[UploadCleanup] Removed {} ({})", message.path, message.reason),
        Err(e) => warn!("[UploadCleanup] Failed to remove {}: {}", message.path, e),
    }
}
