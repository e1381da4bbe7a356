use std::{
    collections::HashMap,
    sync::{Mutex, MutexGuard},
};

use async_trait::async_trait;

use super::{
    error::QueryError,
    queryset::{Ordered, QuerySet},
    schema::{AttrKind, NewRecipe, Recipe, RecipeAttr, RecipeChanges, User, Uuid},
    store::Store,
};

#[derive(Default)]
struct Tables {
    next_id: Uuid,
    users: Vec<User>,
    tokens: HashMap<String, Uuid>,
    recipes: Vec<Recipe>,
    attrs: HashMap<AttrKind, Vec<RecipeAttr>>,
}

impl Tables {
    fn next_id(&mut self) -> Uuid {
        self.next_id += 1;
        self.next_id
    }

    fn get_or_create_attr(&mut self, kind: AttrKind, user_id: Uuid, name: &str) -> RecipeAttr {
        let existing = self
            .attrs
            .get(&kind)
            .and_then(|rows| rows.iter().find(|a| a.user_id == user_id && a.name == name))
            .cloned();

        match existing {
            Some(attr) => attr,
            None => {
                let attr = RecipeAttr {
                    id: self.next_id(),
                    user_id,
                    name: name.to_string(),
                };
                self.attrs.entry(kind).or_default().push(attr.clone());
                attr
            }
        }
    }

    fn resolve_attrs(&mut self, kind: AttrKind, user_id: Uuid, names: &[String]) -> Vec<RecipeAttr> {
        let mut resolved: Vec<RecipeAttr> = vec![];
        for name in names {
            let attr = self.get_or_create_attr(kind, user_id, name);
            if !resolved.iter().any(|a| a.id == attr.id) {
                resolved.push(attr);
            }
        }
        resolved.sort_by_key(|a| a.id);
        resolved
    }

    fn set_attrs(&mut self, recipe: &mut Recipe, kind: AttrKind, names: &[String]) {
        let attrs = self.resolve_attrs(kind, recipe.user_id, names);
        match kind {
            AttrKind::Tag => recipe.tags = attrs,
            AttrKind::Ingredient => recipe.ingredients = attrs,
        }
    }
}

/// `Store` kept entirely in process memory, used to drive the API in tests.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn tables(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn add_user(&self, email: &str, token: &str) -> Uuid {
        let mut tables = self.tables();
        let id = tables.next_id();
        tables.users.push(User {
            id,
            email: email.to_string(),
            name: String::new(),
            is_active: true,
        });
        tables.tokens.insert(token.to_string(), id);
        id
    }

    pub fn deactivate_user(&self, user_id: Uuid) {
        let mut tables = self.tables();
        if let Some(user) = tables.users.iter_mut().find(|u| u.id == user_id) {
            user.is_active = false;
        }
    }

    pub fn recipe_count(&self) -> usize {
        self.tables().recipes.len()
    }

    pub fn attr_names(&self, kind: AttrKind, user_id: Uuid) -> Vec<String> {
        self.tables()
            .attrs
            .get(&kind)
            .map(|rows| {
                rows.iter()
                    .filter(|a| a.user_id == user_id)
                    .map(|a| a.name.to_owned())
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn seed_attr(&self, kind: AttrKind, user_id: Uuid, name: &str) -> Uuid {
        self.tables().get_or_create_attr(kind, user_id, name).id
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn get_token_user(&self, key: &str) -> Result<Option<User>, QueryError> {
        let tables = self.tables();
        Ok(tables
            .tokens
            .get(key)
            .and_then(|id| tables.users.iter().find(|u| u.id == *id))
            .cloned())
    }

    async fn list_recipes(&self, qs: &QuerySet) -> Result<Vec<Recipe>, QueryError> {
        let mut rows: Vec<Recipe> = self
            .tables()
            .recipes
            .iter()
            .filter(|r| qs.contains(r.user_id))
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.compare(b, qs.order));

        Ok(rows)
    }

    async fn get_recipe(&self, qs: &QuerySet, id: Uuid) -> Result<Option<Recipe>, QueryError> {
        Ok(self
            .tables()
            .recipes
            .iter()
            .find(|r| r.id == id && qs.contains(r.user_id))
            .cloned())
    }

    async fn create_recipe(&self, user_id: Uuid, recipe: NewRecipe) -> Result<Recipe, QueryError> {
        let mut tables = self.tables();
        let mut row = Recipe {
            id: tables.next_id(),
            user_id,
            title: recipe.title,
            time_minutes: recipe.time_minutes,
            price: recipe.price,
            link: recipe.link,
            description: recipe.description,
            tags: vec![],
            ingredients: vec![],
        };
        tables.set_attrs(&mut row, AttrKind::Tag, &recipe.tags);
        tables.set_attrs(&mut row, AttrKind::Ingredient, &recipe.ingredients);
        tables.recipes.push(row.clone());

        Ok(row)
    }

    async fn update_recipe(
        &self,
        qs: &QuerySet,
        id: Uuid,
        changes: RecipeChanges,
    ) -> Result<Option<Recipe>, QueryError> {
        let mut tables = self.tables();
        let Some(index) = tables
            .recipes
            .iter()
            .position(|r| r.id == id && qs.contains(r.user_id))
        else {
            return Ok(None);
        };

        let mut row = tables.recipes[index].clone();
        if let Some(title) = &changes.title {
            row.title = title.to_owned();
        }
        if let Some(time_minutes) = changes.time_minutes {
            row.time_minutes = time_minutes;
        }
        if let Some(price) = changes.price {
            row.price = price;
        }
        if let Some(link) = &changes.link {
            row.link = link.to_owned();
        }
        if let Some(description) = &changes.description {
            row.description = description.to_owned();
        }
        for kind in [AttrKind::Tag, AttrKind::Ingredient] {
            if let Some(names) = changes.attrs(kind) {
                tables.set_attrs(&mut row, kind, names);
            }
        }
        tables.recipes[index] = row.clone();

        Ok(Some(row))
    }

    async fn delete_recipe(&self, qs: &QuerySet, id: Uuid) -> Result<bool, QueryError> {
        let mut tables = self.tables();
        let before = tables.recipes.len();
        tables
            .recipes
            .retain(|r| !(r.id == id && qs.contains(r.user_id)));

        Ok(tables.recipes.len() < before)
    }

    async fn list_attrs(
        &self,
        kind: AttrKind,
        qs: &QuerySet,
    ) -> Result<Vec<RecipeAttr>, QueryError> {
        let mut rows: Vec<RecipeAttr> = self
            .tables()
            .attrs
            .get(&kind)
            .map(|rows| rows.iter().filter(|a| qs.contains(a.user_id)).cloned().collect())
            .unwrap_or_default();
        rows.sort_by(|a, b| a.compare(b, qs.order));

        Ok(rows)
    }

    async fn update_attr(
        &self,
        kind: AttrKind,
        qs: &QuerySet,
        id: Uuid,
        name: Option<String>,
    ) -> Result<Option<RecipeAttr>, QueryError> {
        let mut tables = self.tables();
        let rows = tables.attrs.entry(kind).or_default();

        let Some(index) = rows.iter().position(|a| a.id == id && qs.contains(a.user_id)) else {
            return Ok(None);
        };
        let Some(name) = name else {
            return Ok(Some(rows[index].clone()));
        };

        if rows
            .iter()
            .any(|a| a.id != id && a.user_id == qs.user_id && a.name == name)
        {
            return Err(QueryError::Conflict(format!("{}_user_id_name_key", kind.table())));
        }
        rows[index].name = name;
        let renamed = rows[index].clone();

        for recipe in tables.recipes.iter_mut() {
            let linked = match kind {
                AttrKind::Tag => &mut recipe.tags,
                AttrKind::Ingredient => &mut recipe.ingredients,
            };
            linked
                .iter_mut()
                .filter(|a| a.id == id)
                .for_each(|a| a.name = renamed.name.to_owned());
        }

        Ok(Some(renamed))
    }

    async fn delete_attr(
        &self,
        kind: AttrKind,
        qs: &QuerySet,
        id: Uuid,
    ) -> Result<bool, QueryError> {
        let mut tables = self.tables();
        let rows = tables.attrs.entry(kind).or_default();
        let before = rows.len();
        rows.retain(|a| !(a.id == id && qs.contains(a.user_id)));
        let deleted = rows.len() < before;

        if deleted {
            for recipe in tables.recipes.iter_mut() {
                match kind {
                    AttrKind::Tag => recipe.tags.retain(|a| a.id != id),
                    AttrKind::Ingredient => recipe.ingredients.retain(|a| a.id != id),
                }
            }
        }

        Ok(deleted)
    }
}
