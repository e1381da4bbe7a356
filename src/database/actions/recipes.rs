use std::collections::HashMap;

use crate::{
    error::QueryError,
    queryset::QuerySet,
    schema::{
        AttrKind, LinkedRecipeAttr, NewRecipe, Recipe, RecipeAttr, RecipeChanges, RecipeRow, Uuid,
    },
};

use sqlx::{Pool, Postgres};

use super::{list_linked_attrs, set_recipe_attrs};

const RECIPE_COLUMNS: &str = "id, user_id, title, time_minutes, price, link, description";

pub async fn list_recipes(qs: &QuerySet, pool: &Pool<Postgres>) -> Result<Vec<Recipe>, QueryError> {
    let order = qs.order.sql();

    let rows: Vec<RecipeRow> = sqlx::query_as(&format!(
        "SELECT {RECIPE_COLUMNS} FROM recipes WHERE user_id = $1 ORDER BY {order}"
    ))
    .bind(qs.user_id)
    .fetch_all(pool)
    .await?;

    with_attrs(rows, pool).await
}

pub async fn get_recipe(
    qs: &QuerySet,
    id: Uuid,
    pool: &Pool<Postgres>,
) -> Result<Option<Recipe>, QueryError> {
    let row: Option<RecipeRow> = sqlx::query_as(&format!(
        "SELECT {RECIPE_COLUMNS} FROM recipes WHERE id = $1 AND user_id = $2"
    ))
    .bind(id)
    .bind(qs.user_id)
    .fetch_optional(pool)
    .await?;

    match row {
        Some(row) => Ok(with_attrs(vec![row], pool).await?.pop()),
        None => Ok(None),
    }
}

pub async fn create_recipe(
    user_id: Uuid,
    recipe: NewRecipe,
    pool: &Pool<Postgres>,
) -> Result<Uuid, QueryError> {
    let mut tx = pool.begin().await?;

    let id: (Uuid,) = sqlx::query_as(
        "
        INSERT INTO recipes (user_id, title, time_minutes, price, link, description)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING id
    ",
    )
    .bind(user_id)
    .bind(recipe.title)
    .bind(recipe.time_minutes)
    .bind(recipe.price)
    .bind(recipe.link)
    .bind(recipe.description)
    .fetch_one(&mut *tx)
    .await?;

    set_recipe_attrs(AttrKind::Tag, id.0, user_id, &recipe.tags, &mut tx).await?;
    set_recipe_attrs(AttrKind::Ingredient, id.0, user_id, &recipe.ingredients, &mut tx).await?;

    tx.commit().await?;

    Ok(id.0)
}

/// Applies `changes` to a recipe inside the queryset. Returns `false` when
/// the row is not visible to the queryset's owner.
pub async fn update_recipe(
    qs: &QuerySet,
    id: Uuid,
    changes: RecipeChanges,
    pool: &Pool<Postgres>,
) -> Result<bool, QueryError> {
    let mut tx = pool.begin().await?;

    let row: Option<(Uuid,)> = sqlx::query_as(
        "
        UPDATE recipes
        SET title = COALESCE($3, title),
            time_minutes = COALESCE($4, time_minutes),
            price = COALESCE($5, price),
            link = COALESCE($6, link),
            description = COALESCE($7, description)
        WHERE id = $1 AND user_id = $2
        RETURNING id
    ",
    )
    .bind(id)
    .bind(qs.user_id)
    .bind(&changes.title)
    .bind(changes.time_minutes)
    .bind(changes.price)
    .bind(&changes.link)
    .bind(&changes.description)
    .fetch_optional(&mut *tx)
    .await?;

    if row.is_none() {
        return Ok(false);
    }

    for kind in [AttrKind::Tag, AttrKind::Ingredient] {
        if let Some(names) = changes.attrs(kind) {
            set_recipe_attrs(kind, id, qs.user_id, names, &mut tx).await?;
        }
    }

    tx.commit().await?;

    Ok(true)
}

pub async fn delete_recipe(
    qs: &QuerySet,
    id: Uuid,
    pool: &Pool<Postgres>,
) -> Result<bool, QueryError> {
    let query = sqlx::query("DELETE FROM recipes WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(qs.user_id)
        .execute(pool)
        .await?;

    Ok(query.rows_affected() > 0)
}

async fn with_attrs(rows: Vec<RecipeRow>, pool: &Pool<Postgres>) -> Result<Vec<Recipe>, QueryError> {
    if rows.is_empty() {
        return Ok(vec![]);
    }

    let ids: Vec<Uuid> = rows.iter().map(|row| row.id).collect();
    let mut tags = group_by_recipe(list_linked_attrs(AttrKind::Tag, &ids, pool).await?);
    let mut ingredients =
        group_by_recipe(list_linked_attrs(AttrKind::Ingredient, &ids, pool).await?);

    Ok(rows
        .into_iter()
        .map(|row| {
            let id = row.id;
            Recipe::from_row(
                row,
                tags.remove(&id).unwrap_or_default(),
                ingredients.remove(&id).unwrap_or_default(),
            )
        })
        .collect())
}

fn group_by_recipe(linked: Vec<LinkedRecipeAttr>) -> HashMap<Uuid, Vec<RecipeAttr>> {
    let mut hashmap: HashMap<Uuid, Vec<RecipeAttr>> = HashMap::new();
    linked.into_iter().for_each(|x| {
        hashmap.entry(x.recipe_id).or_default().push(x.into());
    });

    hashmap
}
