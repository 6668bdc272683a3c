//! Persistence seams for accounts and customers.
//!
//! Services only talk to these traits. `queries::PgStore` is the PostgreSQL
//! implementation; [`memory::MemoryStore`] keeps everything in process.
//!
//! Implementations must enforce unique usernames and unique customer emails,
//! reporting violations as `Error::Validation`, and must return list results
//! ordered by `created_at` descending with ties broken by `id` descending.

pub mod memory;

use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    error::Result,
    models::{
        accounts::{Account, NewAccount},
        customers::{Customer, CustomerChanges, CustomerFilter, NewCustomer, PageWindow},
    },
};

pub use memory::MemoryStore;

/// Credential store
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Inserts an account; a taken username fails with `Error::Validation`.
    async fn insert_account(&self, new_account: NewAccount) -> Result<Account>;

    async fn find_account_by_id(&self, id: Uuid) -> Result<Option<Account>>;

    async fn find_account_by_username(&self, username: &str) -> Result<Option<Account>>;

    /// Batch lookup used to expand creator references. Unknown ids are skipped.
    async fn find_accounts_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Account>>;

    /// Replaces the password hash; `Error::NotFound` if the account does not exist.
    async fn update_account_password(&self, id: Uuid, password_hash: &str) -> Result<()>;
}

/// Customer record store
#[async_trait]
pub trait CustomerStore: Send + Sync {
    /// Inserts a customer; a taken email fails with `Error::Validation`.
    async fn insert_customer(&self, new_customer: NewCustomer) -> Result<Customer>;

    /// Fetches a record regardless of its active flag.
    async fn find_customer(&self, id: Uuid) -> Result<Option<Customer>>;

    /// Replaces the fields of an active customer. Returns `None` if no active
    /// customer has this id; a taken email fails with `Error::Validation`.
    async fn update_customer(&self, id: Uuid, changes: CustomerChanges) -> Result<Option<Customer>>;

    /// Flips the active flag off. Returns `false` if no active customer has this id.
    async fn deactivate_customer(&self, id: Uuid) -> Result<bool>;

    /// Matching active customers, newest first. `window: None` returns every match.
    async fn list_customers(&self, filter: &CustomerFilter, window: Option<PageWindow>) -> Result<Vec<Customer>>;

    async fn count_customers(&self, filter: &CustomerFilter) -> Result<i64>;
}

/// Everything the application needs from persistence.
pub trait Store: AccountStore + CustomerStore {}

impl<T: AccountStore + CustomerStore> Store for T {}

/// Shared handle stored in `AppState`
pub type SharedStore = Arc<dyn Store>;
