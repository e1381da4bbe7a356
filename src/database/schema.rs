use rust_decimal::Decimal;

pub type Uuid = i32;

#[derive(sqlx::FromRow, Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub is_active: bool,
}

/// Either of the two per-user collections recipes are labelled with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AttrKind {
    Tag,
    Ingredient,
}

impl AttrKind {
    pub fn table(&self) -> &'static str {
        match self {
            AttrKind::Tag => "tags",
            AttrKind::Ingredient => "ingredients",
        }
    }

    /* association table and its foreign key column */
    pub fn link(&self) -> (&'static str, &'static str) {
        match self {
            AttrKind::Tag => ("recipe_tags", "tag_id"),
            AttrKind::Ingredient => ("recipe_ingredients", "ingredient_id"),
        }
    }

    pub fn field(&self) -> &'static str {
        match self {
            AttrKind::Tag => "tags",
            AttrKind::Ingredient => "ingredients",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AttrKind::Tag => "tag",
            AttrKind::Ingredient => "ingredient",
        }
    }
}

/// A tag or an ingredient row. Both tables share this layout.
#[derive(sqlx::FromRow, Debug, Clone, PartialEq)]
pub struct RecipeAttr {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
}

pub type Tag = RecipeAttr;
pub type Ingredient = RecipeAttr;

#[derive(sqlx::FromRow, Debug, Clone)]
pub struct LinkedRecipeAttr {
    pub recipe_id: Uuid,
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
}

impl From<LinkedRecipeAttr> for RecipeAttr {
    fn from(value: LinkedRecipeAttr) -> Self {
        Self {
            id: value.id,
            user_id: value.user_id,
            name: value.name,
        }
    }
}

#[derive(sqlx::FromRow, Debug, Clone)]
pub struct RecipeRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub time_minutes: i32,
    pub price: Decimal,
    pub link: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Recipe {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub time_minutes: i32,
    pub price: Decimal,
    pub link: String,
    pub description: String,
    pub tags: Vec<Tag>,
    pub ingredients: Vec<Ingredient>,
}

impl Recipe {
    pub fn from_row(row: RecipeRow, tags: Vec<Tag>, ingredients: Vec<Ingredient>) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            title: row.title,
            time_minutes: row.time_minutes,
            price: row.price,
            link: row.link,
            description: row.description,
            tags,
            ingredients,
        }
    }
}

/// Validated recipe fields headed for the store. `None` leaves a column
/// (or an association list) untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecipeChanges {
    pub title: Option<String>,
    pub time_minutes: Option<i32>,
    pub price: Option<Decimal>,
    pub link: Option<String>,
    pub description: Option<String>,
    pub tags: Option<Vec<String>>,
    pub ingredients: Option<Vec<String>>,
}

impl RecipeChanges {
    pub fn attrs(&self, kind: AttrKind) -> Option<&Vec<String>> {
        match kind {
            AttrKind::Tag => self.tags.as_ref(),
            AttrKind::Ingredient => self.ingredients.as_ref(),
        }
    }
}

/// Fully populated recipe fields for an insert.
#[derive(Debug, Clone, PartialEq)]
pub struct NewRecipe {
    pub title: String,
    pub time_minutes: i32,
    pub price: Decimal,
    pub link: String,
    pub description: String,
    pub tags: Vec<String>,
    pub ingredients: Vec<String>,
}
