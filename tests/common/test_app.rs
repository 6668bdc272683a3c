use customer_manager::{
    build_router,
    services::{accounts, uploads::ProfileImageStorage},
    store::MemoryStore,
    workers::spawn_upload_cleanup_worker,
    AppState,
};
use reqwest::{Client, redirect::Policy};
use secrecy::SecretString;
use std::{path::PathBuf, sync::Arc, time::Duration};
use tokio::{net::TcpListener, sync::broadcast};
use uuid::Uuid;

/// Secret the test server signs tokens with
pub const TEST_JWT_SECRET: &str = "test-secret-key-for-integration-tests";

/// Credentials of the account every test app starts with
pub const ADMIN_USERNAME: &str = "admin";
pub const ADMIN_PASSWORD: &str = "admin123";

/// HTTP test application wrapper
///
/// Runs the real router on a random port, backed by a fresh in-memory store
/// and a private upload directory, so tests can run in parallel.
pub struct TestApp {
    /// Server base URL (e.g., "http://127.0.0.1:54321")
    pub address: String,
    /// HTTP client for making requests
    pub client: Client,
    /// Direct handle on the store behind the server
    pub store: MemoryStore,
    /// Profile image storage behind the server
    pub uploads: Arc<ProfileImageStorage>,
    /// Id of the seeded admin account
    pub admin_id: Uuid,
    _shutdown_tx: broadcast::Sender<()>,
}

impl TestApp {
    /// Create a new HTTP test app with server on random port
    ///
    /// # How it works:
    /// 1. Seeds an `admin` / `admin123` account into a new `MemoryStore`
    /// 2. Starts the upload cleanup worker on a temp directory
    /// 3. Binds to port 0 (OS assigns random available port) and serves the router
    /// 4. Creates a reqwest client configured for testing
    pub async fn new() -> Self {
        let store = MemoryStore::new();
        let admin = accounts::create_account(&store, ADMIN_USERNAME, "admin@example.com", ADMIN_PASSWORD)
            .await
            .expect("Failed to seed admin account");

        let upload_dir: PathBuf =
            std::env::temp_dir().join(format!("customer_manager_test_{}", Uuid::now_v7()));
        let uploads = Arc::new(ProfileImageStorage::new(&upload_dir, 5 * 1024 * 1024));
        uploads.init().await.expect("Failed to create upload directory");

        let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
        let (upload_cleanup, _upload_cleanup_handle) =
            spawn_upload_cleanup_worker(uploads.clone(), shutdown_rx);

        let state = AppState::new(
            Arc::new(store.clone()),
            SecretString::from(TEST_JWT_SECRET.to_string()),
            24,
            uploads.clone(),
            upload_cleanup,
        );
        let app = build_router(state, "http://localhost:3000").expect("Failed to build router");

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind random port");
        let port = listener.local_addr().unwrap().port();
        let address = format!("http://127.0.0.1:{port}");

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let client = Client::builder()
            .redirect(Policy::none())
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            address,
            client,
            store,
            uploads,
            admin_id: admin.id,
            _shutdown_tx: shutdown_tx,
        }
    }

    /// Get the full URL for an API endpoint
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    /// Number of files currently in the profiles directory
    pub fn stored_image_count(&self) -> usize {
        std::fs::read_dir(self.uploads.base_path().join("profiles"))
            .map(|entries| entries.count())
            .unwrap_or(0)
    }

    /// Waits until the cleanup worker has brought the profiles directory down to
    /// `expected` files. Returns the final count.
    pub async fn wait_for_image_count(&self, expected: usize) -> usize {
        for _ in 0..100 {
            if self.stored_image_count() == expected {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        self.stored_image_count()
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(self.uploads.base_path());
    }
}
