//! PostgreSQL queries and the store implementation built on them.

pub mod accounts;
pub mod customers;

use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    database::DbPool,
    error::{Error, Result},
    models::{
        accounts::{Account, NewAccount},
        customers::{Customer, CustomerChanges, CustomerFilter, NewCustomer, PageWindow},
    },
    store::{AccountStore, CustomerStore},
};

/// Maps a unique-constraint violation to a field-level validation error.
pub(crate) fn map_db_error(e: sqlx::Error, field: &str, message: &str) -> Error {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_unique_violation() {
            return Error::validation(field, message);
        }
    }
    Error::from_sqlx(e)
}

/// Store backed by a PostgreSQL pool. Each call acquires its own connection.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }

    async fn conn(&self) -> Result<sqlx::pool::PoolConnection<sqlx::Postgres>> {
        self.pool.acquire().await.map_err(|e| {
            Error::StoreUnavailable(format!("Failed to acquire database connection: {}", e))
        })
    }
}

#[async_trait]
impl AccountStore for PgStore {
    async fn insert_account(&self, new_account: NewAccount) -> Result<Account> {
        let mut conn = self.conn().await?;
        accounts::create_account(&mut conn, new_account).await
    }

    async fn find_account_by_id(&self, id: Uuid) -> Result<Option<Account>> {
        let mut conn = self.conn().await?;
        accounts::get_account_by_id(&mut conn, id).await
    }

    async fn find_account_by_username(&self, username: &str) -> Result<Option<Account>> {
        let mut conn = self.conn().await?;
        accounts::get_account_by_username(&mut conn, username).await
    }

    async fn find_accounts_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Account>> {
        let mut conn = self.conn().await?;
        accounts::get_accounts_by_ids(&mut conn, ids).await
    }

    async fn update_account_password(&self, id: Uuid, password_hash: &str) -> Result<()> {
        let mut conn = self.conn().await?;
        accounts::update_account_password(&mut conn, id, password_hash).await
    }
}

#[async_trait]
impl CustomerStore for PgStore {
    async fn insert_customer(&self, new_customer: NewCustomer) -> Result<Customer> {
        let mut conn = self.conn().await?;
        customers::create_customer(&mut conn, new_customer).await
    }

    async fn find_customer(&self, id: Uuid) -> Result<Option<Customer>> {
        let mut conn = self.conn().await?;
        customers::get_customer_by_id(&mut conn, id).await
    }

    async fn update_customer(&self, id: Uuid, changes: CustomerChanges) -> Result<Option<Customer>> {
        let mut conn = self.conn().await?;
        customers::update_customer(&mut conn, id, changes).await
    }

    async fn deactivate_customer(&self, id: Uuid) -> Result<bool> {
        let mut conn = self.conn().await?;
        customers::deactivate_customer(&mut conn, id).await
    }

    async fn list_customers(&self, filter: &CustomerFilter, window: Option<PageWindow>) -> Result<Vec<Customer>> {
        let mut conn = self.conn().await?;
        customers::list_customers(&mut conn, filter, window).await
    }

    async fn count_customers(&self, filter: &CustomerFilter) -> Result<i64> {
        let mut conn = self.conn().await?;
        customers::count_customers(&mut conn, filter).await
    }
}
