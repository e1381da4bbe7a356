use crate::{error::QueryError, schema::User};

use sqlx::{Pool, Postgres};

/// Resolves an API token to the user it was issued for.
pub async fn get_token_user(pool: &Pool<Postgres>, key: &str) -> Result<Option<User>, QueryError> {
    let row: Option<User> = sqlx::query_as(
        "
        SELECT u.id, u.email, u.name, u.is_active
        FROM auth_tokens t
        INNER JOIN users u ON u.id = t.user_id
        WHERE t.key = $1
    ",
    )
    .bind(key)
    .fetch_optional(pool)
    .await
    .map_err(QueryError::from)?;

    Ok(row)
}
