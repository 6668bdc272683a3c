use sqlx::{Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    error::{Error, Result},
    models::customers::{Customer, CustomerChanges, CustomerFilter, NewCustomer, PageWindow},
    DbConn,
};

use super::map_db_error;

const CUSTOMER_COLUMNS: &str = "id, full_name, email, contact_number, date_of_birth, profile_picture, \
     state, city, is_active, created_by, created_at, updated_at";

const DUPLICATE_EMAIL: &str = "Email already exists";

/// Escapes LIKE wildcards so the term is matched literally, then wraps it in `%`.
pub fn like_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

/// Appends the `WHERE` clause for `filter` (active records only).
fn push_filter(query: &mut QueryBuilder<'_, Postgres>, filter: &CustomerFilter) {
    query.push(" WHERE is_active = TRUE");

    if let Some(search) = &filter.search {
        let pattern = like_pattern(search);
        query.push(" AND (full_name ILIKE ");
        query.push_bind(pattern.clone());
        query.push(r" ESCAPE '\' OR email ILIKE ");
        query.push_bind(pattern.clone());
        query.push(r" ESCAPE '\' OR contact_number ILIKE ");
        query.push_bind(pattern);
        query.push(r" ESCAPE '\')");
    }

    if let Some(state) = &filter.state {
        query.push(" AND state ILIKE ");
        query.push_bind(like_pattern(state));
        query.push(r" ESCAPE '\'");
    }

    if let Some(city) = &filter.city {
        query.push(" AND city ILIKE ");
        query.push_bind(like_pattern(city));
        query.push(r" ESCAPE '\'");
    }
}

/// Creates a new customer in the database.
pub async fn create_customer(conn: &mut DbConn, new_customer: NewCustomer) -> Result<Customer> {
    let sql = format!(
        r#"
        INSERT INTO customers
            (id, full_name, email, contact_number, date_of_birth, profile_picture, state, city, created_by)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        RETURNING {}
        "#,
        CUSTOMER_COLUMNS
    );
    let fields = new_customer.fields;

    sqlx::query_as::<_, Customer>(&sql)
        .bind(Uuid::now_v7())
        .bind(fields.full_name)
        .bind(fields.email)
        .bind(fields.contact_number)
        .bind(fields.date_of_birth)
        .bind(new_customer.profile_picture)
        .bind(fields.state)
        .bind(fields.city)
        .bind(new_customer.created_by)
        .fetch_one(conn)
        .await
        .map_err(|e| map_db_error(e, "email", DUPLICATE_EMAIL))
}

/// Gets a customer by ID, active or not.
pub async fn get_customer_by_id(conn: &mut DbConn, id: Uuid) -> Result<Option<Customer>> {
    let sql = format!("SELECT {} FROM customers WHERE id = $1", CUSTOMER_COLUMNS);

    sqlx::query_as::<_, Customer>(&sql)
        .bind(id)
        .fetch_optional(conn)
        .await
        .map_err(Error::from_sqlx)
}

/// Replaces an active customer's fields; a `None` picture keeps the stored one.
pub async fn update_customer(conn: &mut DbConn, id: Uuid, changes: CustomerChanges) -> Result<Option<Customer>> {
    let sql = format!(
        r#"
        UPDATE customers
        SET full_name = $1,
            email = $2,
            contact_number = $3,
            date_of_birth = $4,
            state = $5,
            city = $6,
            profile_picture = COALESCE($7, profile_picture),
            updated_at = now()
        WHERE id = $8 AND is_active = TRUE
        RETURNING {}
        "#,
        CUSTOMER_COLUMNS
    );
    let fields = changes.fields;

    sqlx::query_as::<_, Customer>(&sql)
        .bind(fields.full_name)
        .bind(fields.email)
        .bind(fields.contact_number)
        .bind(fields.date_of_birth)
        .bind(fields.state)
        .bind(fields.city)
        .bind(changes.profile_picture)
        .bind(id)
        .fetch_optional(conn)
        .await
        .map_err(|e| map_db_error(e, "email", DUPLICATE_EMAIL))
}

/// Soft-deletes a customer. Returns whether an active record was flipped.
pub async fn deactivate_customer(conn: &mut DbConn, id: Uuid) -> Result<bool> {
    let rows_affected = sqlx::query(
        r#"
        UPDATE customers
        SET is_active = FALSE, updated_at = now()
        WHERE id = $1 AND is_active = TRUE
        "#,
    )
    .bind(id)
    .execute(conn)
    .await
    .map_err(Error::from_sqlx)?
    .rows_affected();

    Ok(rows_affected > 0)
}

/// Lists matching active customers, newest first, optionally windowed.
pub async fn list_customers(
    conn: &mut DbConn,
    filter: &CustomerFilter,
    window: Option<PageWindow>,
) -> Result<Vec<Customer>> {
    let mut query = QueryBuilder::new(format!("SELECT {} FROM customers", CUSTOMER_COLUMNS));
    push_filter(&mut query, filter);
    query.push(" ORDER BY created_at DESC, id DESC");

    if let Some(window) = window {
        query.push(" LIMIT ");
        query.push_bind(window.take);
        query.push(" OFFSET ");
        query.push_bind(window.skip);
    }

    tracing::debug!(sql = query.sql(), "Listing customers");

    query
        .build_query_as::<Customer>()
        .fetch_all(conn)
        .await
        .map_err(Error::from_sqlx)
}

/// Counts matching active customers.
pub async fn count_customers(conn: &mut DbConn, filter: &CustomerFilter) -> Result<i64> {
    let mut query = QueryBuilder::new("SELECT COUNT(*) FROM customers");
    push_filter(&mut query, filter);

    query
        .build_query_scalar::<i64>()
        .fetch_one(conn)
        .await
        .map_err(Error::from_sqlx)
}
