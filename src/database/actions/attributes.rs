use crate::{
    error::QueryError,
    queryset::QuerySet,
    schema::{AttrKind, LinkedRecipeAttr, RecipeAttr, Uuid},
};

use sqlx::{PgConnection, Pool, Postgres};

pub async fn list_attrs(
    kind: AttrKind,
    qs: &QuerySet,
    pool: &Pool<Postgres>,
) -> Result<Vec<RecipeAttr>, QueryError> {
    let table = kind.table();
    let order = qs.order.sql();

    let list: Vec<RecipeAttr> = sqlx::query_as(&format!(
        "SELECT id, user_id, name FROM {table} WHERE user_id = $1 ORDER BY {order}"
    ))
    .bind(qs.user_id)
    .fetch_all(pool)
    .await?;

    Ok(list)
}

pub async fn get_attr(
    kind: AttrKind,
    qs: &QuerySet,
    id: Uuid,
    pool: &Pool<Postgres>,
) -> Result<Option<RecipeAttr>, QueryError> {
    let table = kind.table();

    let row: Option<RecipeAttr> = sqlx::query_as(&format!(
        "SELECT id, user_id, name FROM {table} WHERE id = $1 AND user_id = $2"
    ))
    .bind(id)
    .bind(qs.user_id)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

pub async fn rename_attr(
    kind: AttrKind,
    qs: &QuerySet,
    id: Uuid,
    name: &str,
    pool: &Pool<Postgres>,
) -> Result<Option<RecipeAttr>, QueryError> {
    let table = kind.table();

    let row: Option<RecipeAttr> = sqlx::query_as(&format!(
        "UPDATE {table} SET name = $3 WHERE id = $1 AND user_id = $2 RETURNING id, user_id, name"
    ))
    .bind(id)
    .bind(qs.user_id)
    .bind(name)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

pub async fn delete_attr(
    kind: AttrKind,
    qs: &QuerySet,
    id: Uuid,
    pool: &Pool<Postgres>,
) -> Result<bool, QueryError> {
    let table = kind.table();

    let query = sqlx::query(&format!("DELETE FROM {table} WHERE id = $1 AND user_id = $2"))
        .bind(id)
        .bind(qs.user_id)
        .execute(pool)
        .await?;

    Ok(query.rows_affected() > 0)
}

/// Returns the caller's row with `name`, inserting it first when missing.
pub async fn get_or_create_attr(
    kind: AttrKind,
    user_id: Uuid,
    name: &str,
    conn: &mut PgConnection,
) -> Result<RecipeAttr, QueryError> {
    let table = kind.table();

    let row: RecipeAttr = sqlx::query_as(&format!(
        "
        INSERT INTO {table} (user_id, name) VALUES ($1, $2)
        ON CONFLICT (user_id, name) DO UPDATE SET name = EXCLUDED.name
        RETURNING id, user_id, name
    "
    ))
    .bind(user_id)
    .bind(name)
    .fetch_one(&mut *conn)
    .await?;

    Ok(row)
}

/// Replaces every association of `kind` on a recipe with `names`.
pub async fn set_recipe_attrs(
    kind: AttrKind,
    recipe_id: Uuid,
    user_id: Uuid,
    names: &[String],
    conn: &mut PgConnection,
) -> Result<(), QueryError> {
    let (link, column) = kind.link();

    sqlx::query(&format!("DELETE FROM {link} WHERE recipe_id = $1"))
        .bind(recipe_id)
        .execute(&mut *conn)
        .await?;

    for name in names {
        let attr = get_or_create_attr(kind, user_id, name, conn).await?;

        sqlx::query(&format!(
            "INSERT INTO {link} (recipe_id, {column}) VALUES ($1, $2) ON CONFLICT DO NOTHING"
        ))
        .bind(recipe_id)
        .bind(attr.id)
        .execute(&mut *conn)
        .await?;
    }

    Ok(())
}

pub async fn list_linked_attrs(
    kind: AttrKind,
    recipe_ids: &[Uuid],
    pool: &Pool<Postgres>,
) -> Result<Vec<LinkedRecipeAttr>, QueryError> {
    let table = kind.table();
    let (link, column) = kind.link();

    let list: Vec<LinkedRecipeAttr> = sqlx::query_as(&format!(
        "
        SELECT l.recipe_id AS recipe_id, a.id AS id, a.user_id AS user_id, a.name AS name
        FROM {link} l
        INNER JOIN {table} a ON a.id = l.{column}
        WHERE l.recipe_id = ANY($1)
        ORDER BY a.id
    "
    ))
    .bind(recipe_ids.to_vec())
    .fetch_all(pool)
    .await?;

    Ok(list)
}
