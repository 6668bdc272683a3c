use std::collections::HashMap;

use chrono::Utc;
use uuid::Uuid;

use crate::{
    error::{Error, Result},
    models::customers::{
        total_pages, CreatorRef, Customer, CustomerChanges, CustomerExport, CustomerFilter,
        CustomerForm, CustomerPage, CustomerResponse, ListCustomersQuery, NewCustomer,
    },
    services::uploads::{ProfileImageStorage, UploadedImage},
    store::Store,
    validation::validate_customer_form,
    workers::upload_cleanup::{CleanupReason, UploadCleanupQueue},
};

fn customer_not_found() -> Error {
    Error::NotFound("Customer not found".to_string())
}

/// Attaches `{id, username}` of each record's creator using one batch lookup.
async fn with_creators(store: &dyn Store, customers: Vec<Customer>) -> Result<Vec<CustomerResponse>> {
    let mut ids: Vec<Uuid> = customers.iter().map(|c| c.created_by).collect();
    ids.sort_unstable();
    ids.dedup();

    let creators: HashMap<Uuid, CreatorRef> = if ids.is_empty() {
        HashMap::new()
    } else {
        store
            .find_accounts_by_ids(&ids)
            .await?
            .into_iter()
            .map(|account| {
                (
                    account.id,
                    CreatorRef {
                        id: account.id,
                        username: account.username,
                    },
                )
            })
            .collect()
    };

    Ok(customers
        .into_iter()
        .map(|customer| {
            let creator = creators.get(&customer.created_by).cloned();
            CustomerResponse::new(customer, creator)
        })
        .collect())
}

/// One page of matching active customers, newest first.
///
/// A page past the end yields an empty list with the real totals.
pub async fn list_customers(store: &dyn Store, query: &ListCustomersQuery) -> Result<CustomerPage> {
    let filter = query.filter();
    let page = query.page();
    let limit = query.limit();

    let total = store.count_customers(&filter).await?;
    let customers = store.list_customers(&filter, Some(query.window())).await?;
    let customers = with_creators(store, customers).await?;

    Ok(CustomerPage {
        customers,
        total_pages: total_pages(total, limit),
        current_page: page,
        total,
    })
}

/// Every matching active customer in export projection, newest first.
pub async fn export_customers(store: &dyn Store, filter: &CustomerFilter) -> Result<Vec<CustomerExport>> {
    let customers = store.list_customers(filter, None).await?;
    tracing::info!(count = customers.len(), "Exporting customers");
    Ok(customers.into_iter().map(CustomerExport::from).collect())
}

/// A single active customer. Deactivated records are reported as missing.
pub async fn get_customer(store: &dyn Store, id: Uuid) -> Result<CustomerResponse> {
    let customer = store
        .find_customer(id)
        .await?
        .filter(|c| c.is_active)
        .ok_or_else(customer_not_found)?;

    with_creators(store, vec![customer])
        .await?
        .pop()
        .ok_or_else(customer_not_found)
}

/// Validates the form and image, stores the image, then inserts the record.
///
/// Nothing is written when validation fails. If the insert fails the stored
/// image is queued for removal.
pub async fn create_customer(
    store: &dyn Store,
    uploads: &ProfileImageStorage,
    cleanup: &UploadCleanupQueue,
    created_by: Uuid,
    form: CustomerForm,
    image: Option<UploadedImage>,
) -> Result<CustomerResponse> {
    let fields = validate_customer_form(&form, Utc::now().date_naive())?;
    if let Some(image) = &image {
        uploads.validate(image)?;
    }

    let profile_picture = match &image {
        Some(image) => Some(uploads.store(image).await?),
        None => None,
    };

    let inserted = store
        .insert_customer(NewCustomer {
            fields,
            profile_picture: profile_picture.clone(),
            created_by,
        })
        .await;

    let customer = match inserted {
        Ok(customer) => customer,
        Err(e) => {
            if let Some(path) = profile_picture {
                cleanup.schedule(path, CleanupReason::Rollback);
            }
            return Err(e);
        }
    };

    tracing::info!(customer_id = %customer.id, created_by = %created_by, "Customer created");

    with_creators(store, vec![customer])
        .await?
        .pop()
        .ok_or_else(customer_not_found)
}

/// Replaces every field of an active customer.
///
/// Without a new image the current one is kept. With one, the previous image is
/// queued for removal after the update succeeds, and the new image is queued
/// instead if the update fails.
pub async fn update_customer(
    store: &dyn Store,
    uploads: &ProfileImageStorage,
    cleanup: &UploadCleanupQueue,
    id: Uuid,
    form: CustomerForm,
    image: Option<UploadedImage>,
) -> Result<CustomerResponse> {
    let fields = validate_customer_form(&form, Utc::now().date_naive())?;
    if let Some(image) = &image {
        uploads.validate(image)?;
    }

    let previous = store
        .find_customer(id)
        .await?
        .filter(|c| c.is_active)
        .ok_or_else(customer_not_found)?;

    let new_picture = match &image {
        Some(image) => Some(uploads.store(image).await?),
        None => None,
    };

    let updated = store
        .update_customer(
            id,
            CustomerChanges {
                fields,
                profile_picture: new_picture.clone(),
            },
        )
        .await
        .and_then(|customer| customer.ok_or_else(customer_not_found));

    let customer = match updated {
        Ok(customer) => customer,
        Err(e) => {
            if let Some(path) = new_picture {
                cleanup.schedule(path, CleanupReason::Rollback);
            }
            return Err(e);
        }
    };

    if let (Some(new_path), Some(old_path)) = (&new_picture, previous.profile_picture) {
        if *new_path != old_path {
            cleanup.schedule(old_path, CleanupReason::Replaced);
        }
    }

    tracing::info!(customer_id = %customer.id, "Customer updated");

    with_creators(store, vec![customer])
        .await?
        .pop()
        .ok_or_else(customer_not_found)
}

/// Soft-deletes an active customer. Its image stays on disk.
pub async fn delete_customer(store: &dyn Store, id: Uuid) -> Result<()> {
    if !store.deactivate_customer(id).await? {
        return Err(customer_not_found());
    }
    tracing::info!(customer_id = %id, "Customer deactivated");
    Ok(())
}
