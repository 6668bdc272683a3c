//! In-process store backed by hash maps behind a single `RwLock`.
//!
//! Holding the write lock across the uniqueness check and the insert makes each
//! write atomic, which is all the application relies on from a store.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    error::{Error, Result},
    models::{
        accounts::{Account, NewAccount},
        customers::{Customer, CustomerChanges, CustomerFilter, NewCustomer, PageWindow},
    },
    store::{AccountStore, CustomerStore},
};

#[derive(Debug, Default)]
struct MemoryData {
    accounts: HashMap<Uuid, Account>,
    customers: HashMap<Uuid, Customer>,
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    data: Arc<RwLock<MemoryData>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flips an account's active flag. There is no HTTP route for this; seeding
    /// and tests use it to model deactivated accounts.
    pub async fn set_account_active(&self, id: Uuid, is_active: bool) -> Result<()> {
        let mut data = self.data.write().await;
        let account = data
            .accounts
            .get_mut(&id)
            .ok_or_else(|| Error::NotFound(format!("Account with ID {} not found", id)))?;
        account.is_active = is_active;
        Ok(())
    }
}

fn duplicate_email() -> Error {
    Error::validation("email", "Email already exists")
}

/// Newest first; ties broken by id so repeated queries return the same order.
fn sort_newest_first(customers: &mut [Customer]) {
    customers.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| b.id.cmp(&a.id))
    });
}

#[async_trait]
impl AccountStore for MemoryStore {
    async fn insert_account(&self, new_account: NewAccount) -> Result<Account> {
        let mut data = self.data.write().await;

        if data.accounts.values().any(|a| a.username == new_account.username) {
            return Err(Error::validation("username", "Username already exists"));
        }

        let account = Account {
            id: Uuid::now_v7(),
            username: new_account.username,
            email: new_account.email,
            password_hash: new_account.password_hash,
            is_active: true,
            created_at: Utc::now(),
        };
        data.accounts.insert(account.id, account.clone());

        Ok(account)
    }

    async fn find_account_by_id(&self, id: Uuid) -> Result<Option<Account>> {
        Ok(self.data.read().await.accounts.get(&id).cloned())
    }

    async fn find_account_by_username(&self, username: &str) -> Result<Option<Account>> {
        Ok(self
            .data
            .read()
            .await
            .accounts
            .values()
            .find(|a| a.username == username)
            .cloned())
    }

    async fn find_accounts_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Account>> {
        let data = self.data.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| data.accounts.get(id).cloned())
            .collect())
    }

    async fn update_account_password(&self, id: Uuid, password_hash: &str) -> Result<()> {
        let mut data = self.data.write().await;
        let account = data
            .accounts
            .get_mut(&id)
            .ok_or_else(|| Error::NotFound(format!("Account with ID {} not found", id)))?;
        account.password_hash = password_hash.to_string();
        Ok(())
    }
}

#[async_trait]
impl CustomerStore for MemoryStore {
    async fn insert_customer(&self, new_customer: NewCustomer) -> Result<Customer> {
        let mut data = self.data.write().await;

        if data.customers.values().any(|c| c.email == new_customer.fields.email) {
            return Err(duplicate_email());
        }

        let now = Utc::now();
        let fields = new_customer.fields;
        let customer = Customer {
            id: Uuid::now_v7(),
            full_name: fields.full_name,
            email: fields.email,
            contact_number: fields.contact_number,
            date_of_birth: fields.date_of_birth,
            profile_picture: new_customer.profile_picture,
            state: fields.state,
            city: fields.city,
            is_active: true,
            created_by: new_customer.created_by,
            created_at: now,
            updated_at: now,
        };
        data.customers.insert(customer.id, customer.clone());

        Ok(customer)
    }

    async fn find_customer(&self, id: Uuid) -> Result<Option<Customer>> {
        Ok(self.data.read().await.customers.get(&id).cloned())
    }

    async fn update_customer(&self, id: Uuid, changes: CustomerChanges) -> Result<Option<Customer>> {
        let mut data = self.data.write().await;

        if !data.customers.get(&id).is_some_and(|c| c.is_active) {
            return Ok(None);
        }

        if data
            .customers
            .values()
            .any(|c| c.id != id && c.email == changes.fields.email)
        {
            return Err(duplicate_email());
        }

        let Some(customer) = data.customers.get_mut(&id) else {
            return Ok(None);
        };

        let fields = changes.fields;
        customer.full_name = fields.full_name;
        customer.email = fields.email;
        customer.contact_number = fields.contact_number;
        customer.date_of_birth = fields.date_of_birth;
        customer.state = fields.state;
        customer.city = fields.city;
        if let Some(path) = changes.profile_picture {
            customer.profile_picture = Some(path);
        }
        customer.updated_at = Utc::now();

        Ok(Some(customer.clone()))
    }

    async fn deactivate_customer(&self, id: Uuid) -> Result<bool> {
        let mut data = self.data.write().await;
        match data.customers.get_mut(&id) {
            Some(customer) if customer.is_active => {
                customer.is_active = false;
                customer.updated_at = Utc::now();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn list_customers(&self, filter: &CustomerFilter, window: Option<PageWindow>) -> Result<Vec<Customer>> {
        let data = self.data.read().await;

        let mut matches: Vec<Customer> = data
            .customers
            .values()
            .filter(|c| filter.matches(c))
            .cloned()
            .collect();
        sort_newest_first(&mut matches);

        let page = match window {
            Some(window) => matches
                .into_iter()
                .skip(usize::try_from(window.skip).unwrap_or(usize::MAX))
                .take(usize::try_from(window.take).unwrap_or(0))
                .collect(),
            None => matches,
        };

        Ok(page)
    }

    async fn count_customers(&self, filter: &CustomerFilter) -> Result<i64> {
        let data = self.data.read().await;
        let count = data.customers.values().filter(|c| filter.matches(c)).count();
        Ok(count as i64)
    }
}
