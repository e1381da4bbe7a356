use async_trait::async_trait;
use sqlx::{Pool, Postgres};

use super::{
    actions,
    error::QueryError,
    queryset::QuerySet,
    schema::{AttrKind, NewRecipe, Recipe, RecipeAttr, RecipeChanges, User, Uuid},
};

/// Persistence boundary of the API. Every read and write that targets
/// existing rows goes through a `QuerySet`, so rows outside of it behave
/// exactly like rows that don't exist.
#[async_trait]
pub trait Store: Send + Sync {
    async fn get_token_user(&self, key: &str) -> Result<Option<User>, QueryError>;

    async fn list_recipes(&self, qs: &QuerySet) -> Result<Vec<Recipe>, QueryError>;

    async fn get_recipe(&self, qs: &QuerySet, id: Uuid) -> Result<Option<Recipe>, QueryError>;

    async fn create_recipe(&self, user_id: Uuid, recipe: NewRecipe) -> Result<Recipe, QueryError>;

    async fn update_recipe(
        &self,
        qs: &QuerySet,
        id: Uuid,
        changes: RecipeChanges,
    ) -> Result<Option<Recipe>, QueryError>;

    async fn delete_recipe(&self, qs: &QuerySet, id: Uuid) -> Result<bool, QueryError>;

    async fn list_attrs(&self, kind: AttrKind, qs: &QuerySet)
        -> Result<Vec<RecipeAttr>, QueryError>;

    /// `None` keeps the current name and only checks visibility.
    async fn update_attr(
        &self,
        kind: AttrKind,
        qs: &QuerySet,
        id: Uuid,
        name: Option<String>,
    ) -> Result<Option<RecipeAttr>, QueryError>;

    async fn delete_attr(&self, kind: AttrKind, qs: &QuerySet, id: Uuid)
        -> Result<bool, QueryError>;
}

#[derive(Clone)]
pub struct PgStore {
    pool: Pool<Postgres>,
}

impl PgStore {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Store for PgStore {
    async fn get_token_user(&self, key: &str) -> Result<Option<User>, QueryError> {
        actions::get_token_user(&self.pool, key).await
    }

    async fn list_recipes(&self, qs: &QuerySet) -> Result<Vec<Recipe>, QueryError> {
        actions::list_recipes(qs, &self.pool).await
    }

    async fn get_recipe(&self, qs: &QuerySet, id: Uuid) -> Result<Option<Recipe>, QueryError> {
        actions::get_recipe(qs, id, &self.pool).await
    }

    async fn create_recipe(&self, user_id: Uuid, recipe: NewRecipe) -> Result<Recipe, QueryError> {
        let id = actions::create_recipe(user_id, recipe, &self.pool).await?;

        actions::get_recipe(&QuerySet::owned_by(user_id), id, &self.pool)
            .await?
            .ok_or_else(|| QueryError::Database(format!("Recipe {id} vanished after insert")))
    }

    async fn update_recipe(
        &self,
        qs: &QuerySet,
        id: Uuid,
        changes: RecipeChanges,
    ) -> Result<Option<Recipe>, QueryError> {
        if !actions::update_recipe(qs, id, changes, &self.pool).await? {
            return Ok(None);
        }

        actions::get_recipe(qs, id, &self.pool).await
    }

    async fn delete_recipe(&self, qs: &QuerySet, id: Uuid) -> Result<bool, QueryError> {
        actions::delete_recipe(qs, id, &self.pool).await
    }

    async fn list_attrs(
        &self,
        kind: AttrKind,
        qs: &QuerySet,
    ) -> Result<Vec<RecipeAttr>, QueryError> {
        actions::list_attrs(kind, qs, &self.pool).await
    }

    async fn update_attr(
        &self,
        kind: AttrKind,
        qs: &QuerySet,
        id: Uuid,
        name: Option<String>,
    ) -> Result<Option<RecipeAttr>, QueryError> {
        match name {
            Some(name) => actions::rename_attr(kind, qs, id, &name, &self.pool).await,
            None => actions::get_attr(kind, qs, id, &self.pool).await,
        }
    }

    async fn delete_attr(
        &self,
        kind: AttrKind,
        qs: &QuerySet,
        id: Uuid,
    ) -> Result<bool, QueryError> {
        actions::delete_attr(kind, qs, id, &self.pool).await
    }
}
