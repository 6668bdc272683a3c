use uuid::Uuid;

use crate::{
    error::{Error, Result},
    models::accounts::{Account, NewAccount},
    DbConn,
};

use super::map_db_error;

const ACCOUNT_COLUMNS: &str = "id, username, email, password_hash, is_active, created_at";

/// Creates a new account in the database.
pub async fn create_account(conn: &mut DbConn, new_account: NewAccount) -> Result<Account> {
    let sql = format!(
        "INSERT INTO accounts (id, username, email, password_hash) VALUES ($1, $2, $3, $4) RETURNING {}",
        ACCOUNT_COLUMNS
    );

    sqlx::query_as::<_, Account>(&sql)
        .bind(Uuid::now_v7())
        .bind(&new_account.username)
        .bind(&new_account.email)
        .bind(&new_account.password_hash)
        .fetch_one(conn)
        .await
        .map_err(|e| map_db_error(e, "username", "Username already exists"))
}

/// Gets a single account by its ID. The account may not exist.
pub async fn get_account_by_id(conn: &mut DbConn, id: Uuid) -> Result<Option<Account>> {
    let sql = format!("SELECT {} FROM accounts WHERE id = $1", ACCOUNT_COLUMNS);

    sqlx::query_as::<_, Account>(&sql)
        .bind(id)
        .fetch_optional(conn)
        .await
        .map_err(Error::from_sqlx)
}

/// Gets a single account by its username (case-sensitive). The account may not exist.
pub async fn get_account_by_username(conn: &mut DbConn, username: &str) -> Result<Option<Account>> {
    let sql = format!("SELECT {} FROM accounts WHERE username = $1", ACCOUNT_COLUMNS);

    sqlx::query_as::<_, Account>(&sql)
        .bind(username)
        .fetch_optional(conn)
        .await
        .map_err(Error::from_sqlx)
}

/// Gets every account whose ID is in `ids`.
pub async fn get_accounts_by_ids(conn: &mut DbConn, ids: &[Uuid]) -> Result<Vec<Account>> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let sql = format!("SELECT {} FROM accounts WHERE id = ANY($1)", ACCOUNT_COLUMNS);

    sqlx::query_as::<_, Account>(&sql)
        .bind(ids.to_vec())
        .fetch_all(conn)
        .await
        .map_err(Error::from_sqlx)
}

/// Updates an account's password hash.
pub async fn update_account_password(conn: &mut DbConn, id: Uuid, password_hash: &str) -> Result<()> {
    let rows_affected = sqlx::query(
        r#"
        UPDATE accounts
        SET password_hash = $1
        WHERE id = $2
        "#,
    )
    .bind(password_hash)
    .bind(id)
    .execute(conn)
    .await
    .map_err(Error::from_sqlx)?
    .rows_affected();

    if rows_affected == 0 {
        return Err(Error::NotFound(format!("Account with ID {} not found", id)));
    }

    Ok(())
}
