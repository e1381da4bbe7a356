use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::{json, Value};

use crate::{
    constants::{MAX_LINK_LENGTH, MAX_NAME_LENGTH, PRICE_DECIMAL_PLACES, PRICE_WHOLE_DIGITS},
    error::{FieldErrors, TypeError},
    form::Form,
    rejection::ApiError,
    schema::{AttrKind, NewRecipe, Recipe, RecipeAttr, RecipeChanges, Uuid},
};

// Output shapes

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct RecipeAttrSerializer {
    pub id: Uuid,
    pub name: String,
}

pub type TagSerializer = RecipeAttrSerializer;
pub type IngredientSerializer = RecipeAttrSerializer;

impl From<&RecipeAttr> for RecipeAttrSerializer {
    fn from(value: &RecipeAttr) -> Self {
        Self {
            id: value.id,
            name: value.name.to_owned(),
        }
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct RecipeSerializer {
    pub id: Uuid,
    pub title: String,
    pub time_minutes: i32,
    pub price: Decimal,
    pub link: String,
    pub tags: Vec<TagSerializer>,
    pub ingredients: Vec<IngredientSerializer>,
}

impl From<&Recipe> for RecipeSerializer {
    fn from(value: &Recipe) -> Self {
        Self {
            id: value.id,
            title: value.title.to_owned(),
            time_minutes: value.time_minutes,
            price: value.price,
            link: value.link.to_owned(),
            tags: value.tags.iter().map(TagSerializer::from).collect(),
            ingredients: value
                .ingredients
                .iter()
                .map(IngredientSerializer::from)
                .collect(),
        }
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct RecipeDetailSerializer {
    #[serde(flatten)]
    pub recipe: RecipeSerializer,
    pub description: String,
}

impl From<&Recipe> for RecipeDetailSerializer {
    fn from(value: &Recipe) -> Self {
        Self {
            recipe: RecipeSerializer::from(value),
            description: value.description.to_owned(),
        }
    }
}

/// Which of the two recipe shapes a response is rendered with.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RecipeSerializerClass {
    Recipe,
    RecipeDetail,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum RecipeRepresentation {
    Recipe(RecipeSerializer),
    RecipeDetail(RecipeDetailSerializer),
}

impl RecipeSerializerClass {
    pub fn represent(&self, recipe: &Recipe) -> RecipeRepresentation {
        match self {
            RecipeSerializerClass::Recipe => RecipeRepresentation::Recipe(recipe.into()),
            RecipeSerializerClass::RecipeDetail => {
                RecipeRepresentation::RecipeDetail(recipe.into())
            }
        }
    }
}

// Input validation

fn char_field(
    form: &Form,
    key: &str,
    required: bool,
    allow_blank: bool,
    max_length: Option<usize>,
) -> Result<Option<String>, TypeError> {
    let value = match form.get_str(key)? {
        Some(value) => value,
        None if required => return Err(TypeError::required()),
        None => return Ok(None),
    };

    if value.is_empty() && !allow_blank {
        return Err(TypeError::blank());
    }
    if let Some(limit) = max_length {
        if value.chars().count() > limit {
            return Err(TypeError::max_length(limit));
        }
    }

    Ok(Some(value))
}

fn integer_field(form: &Form, key: &str, required: bool) -> Result<Option<i32>, TypeError> {
    match form.get_number::<i32>(key, "A valid integer is required.")? {
        Some(value) => Ok(Some(value)),
        None if required => Err(TypeError::required()),
        None => Ok(None),
    }
}

fn price_field(form: &Form, key: &str, required: bool) -> Result<Option<Decimal>, TypeError> {
    let mut price = match form.get_number::<Decimal>(key, "A valid number is required.")? {
        Some(price) => price,
        None if required => return Err(TypeError::required()),
        None => return Ok(None),
    };

    if price.scale() > PRICE_DECIMAL_PLACES {
        return Err(TypeError::new(&format!(
            "Ensure that there are no more than {PRICE_DECIMAL_PLACES} decimal places."
        )));
    }
    if price.abs().trunc() >= Decimal::from(10u32.pow(PRICE_WHOLE_DIGITS)) {
        return Err(TypeError::new(&format!(
            "Ensure that there are no more than {PRICE_WHOLE_DIGITS} digits before the decimal point."
        )));
    }
    price.rescale(PRICE_DECIMAL_PLACES);

    Ok(Some(price))
}

/// Nested `[{"name": ..}]` list. Errors come back in the nested shape: one
/// object per item, empty for items that passed.
fn nested_names(form: &Form, key: &str) -> Result<Option<Vec<String>>, Value> {
    let items = match form.get_list(key) {
        Ok(Some(items)) => items,
        Ok(None) => return Ok(None),
        Err(e) => return Err(json!([e.into_info()])),
    };

    let mut names = vec![];
    let mut errors = vec![];
    for item in items {
        let result = match item {
            Value::Object(map) => {
                let form = Form::from_data(map.into_iter().collect());
                char_field(&form, "name", true, false, Some(MAX_NAME_LENGTH))
                    .map_err(|e| json!({ "name": [e.into_info()] }))
            }
            other => Err(json!({
                "non_field_errors": [format!(
                    "Invalid data. Expected a dictionary, but got {}.",
                    json_type(&other)
                )]
            })),
        };

        match result {
            Ok(name) => {
                names.push(name.unwrap_or_default());
                errors.push(json!({}));
            }
            Err(e) => errors.push(e),
        }
    }

    if errors.iter().any(|e| e != &json!({})) {
        return Err(Value::Array(errors));
    }

    Ok(Some(names))
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "int",
        Value::String(_) => "str",
        Value::Array(_) => "list",
        Value::Object(_) => "dict",
    }
}

fn take_field<T>(errors: &mut FieldErrors, key: &str, result: Result<Option<T>, TypeError>) -> Option<T> {
    match result {
        Ok(value) => value,
        Err(e) => {
            errors.insert(key.to_string(), json!([e.into_info()]));
            None
        }
    }
}

/// Validates recipe input. With `partial` every field becomes optional,
/// otherwise `title`, `time_minutes` and `price` must be present.
///
/// Read-only and unknown keys (`id`, `user`, ..) are ignored.
pub fn validate_recipe(form: &Form, partial: bool) -> Result<RecipeChanges, ApiError> {
    let required = !partial;
    let mut errors = FieldErrors::new();

    let title = take_field(
        &mut errors,
        "title",
        char_field(form, "title", required, false, Some(MAX_NAME_LENGTH)),
    );
    let time_minutes = take_field(
        &mut errors,
        "time_minutes",
        integer_field(form, "time_minutes", required),
    );
    let price = take_field(&mut errors, "price", price_field(form, "price", required));
    let link = take_field(
        &mut errors,
        "link",
        char_field(form, "link", false, true, Some(MAX_LINK_LENGTH)),
    );
    let description = take_field(
        &mut errors,
        "description",
        char_field(form, "description", false, true, None),
    );

    let mut attrs = vec![];
    for kind in [AttrKind::Tag, AttrKind::Ingredient] {
        match nested_names(form, kind.field()) {
            Ok(names) => attrs.push(names),
            Err(e) => {
                errors.insert(kind.field().to_string(), e);
                attrs.push(None);
            }
        }
    }

    if !errors.is_empty() {
        return Err(ApiError::Validation(errors));
    }

    let ingredients = attrs.pop().flatten();
    let tags = attrs.pop().flatten();

    Ok(RecipeChanges {
        title,
        time_minutes,
        price,
        link,
        description,
        tags,
        ingredients,
    })
}

pub fn validate_new_recipe(form: &Form) -> Result<NewRecipe, ApiError> {
    let changes = validate_recipe(form, false)?;

    match (changes.title, changes.time_minutes, changes.price) {
        (Some(title), Some(time_minutes), Some(price)) => Ok(NewRecipe {
            title,
            time_minutes,
            price,
            link: changes.link.unwrap_or_default(),
            description: changes.description.unwrap_or_default(),
            tags: changes.tags.unwrap_or_default(),
            ingredients: changes.ingredients.unwrap_or_default(),
        }),
        _ => Err(ApiError::Internal(String::from(
            "Required recipe fields missing after validation",
        ))),
    }
}

/// Validates tag or ingredient input, returning the new name if one was given.
pub fn validate_attr(form: &Form, partial: bool) -> Result<Option<String>, ApiError> {
    char_field(form, "name", !partial, false, Some(MAX_NAME_LENGTH))
        .map_err(|e| ApiError::field("name", &e.into_info()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::FormData;
    use std::str::FromStr;

    fn form(value: Value) -> Form {
        let data: FormData = serde_json::from_value(value).unwrap();
        Form::from_data(data)
    }

    fn recipe() -> Recipe {
        Recipe {
            id: 3,
            user_id: 1,
            title: String::from("Soup"),
            time_minutes: 20,
            price: Decimal::from_str("5.50").unwrap(),
            link: String::new(),
            description: String::from("Hot"),
            tags: vec![RecipeAttr {
                id: 9,
                user_id: 1,
                name: String::from("Vegan"),
            }],
            ingredients: vec![],
        }
    }

    fn field_errors(err: ApiError) -> FieldErrors {
        match err {
            ApiError::Validation(errors) => errors,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn list_shape_omits_description() {
        let value = serde_json::to_value(RecipeSerializerClass::Recipe.represent(&recipe())).unwrap();

        assert_eq!(
            value,
            json!({
                "id": 3,
                "title": "Soup",
                "time_minutes": 20,
                "price": "5.50",
                "link": "",
                "tags": [{ "id": 9, "name": "Vegan" }],
                "ingredients": [],
            })
        );
    }

    #[test]
    fn detail_shape_adds_description() {
        let value =
            serde_json::to_value(RecipeSerializerClass::RecipeDetail.represent(&recipe())).unwrap();

        assert_eq!(value["description"], json!("Hot"));
        assert_eq!(value["title"], json!("Soup"));
        assert_eq!(value["tags"][0]["name"], json!("Vegan"));
    }

    #[test]
    fn full_validation_requires_core_fields() {
        let errors = field_errors(validate_recipe(&form(json!({})), false).unwrap_err());

        assert_eq!(errors["title"], json!(["This field is required."]));
        assert_eq!(errors["time_minutes"], json!(["This field is required."]));
        assert_eq!(errors["price"], json!(["This field is required."]));
        assert!(!errors.contains_key("link"));
    }

    #[test]
    fn partial_validation_accepts_empty_body() {
        let changes = validate_recipe(&form(json!({})), true).unwrap();
        assert_eq!(changes, RecipeChanges::default());
    }

    #[test]
    fn new_recipe_ignores_user_and_fills_defaults() {
        let recipe = validate_new_recipe(&form(json!({
            "title": "Soup",
            "time_minutes": "15",
            "price": 4.5,
            "user": 42,
        })))
        .unwrap();

        assert_eq!(recipe.title, "Soup");
        assert_eq!(recipe.time_minutes, 15);
        assert_eq!(recipe.price.to_string(), "4.50");
        assert_eq!(recipe.link, "");
        assert!(recipe.tags.is_empty());
    }

    #[test]
    fn price_precision_is_enforced() {
        let places = field_errors(
            validate_recipe(&form(json!({ "price": "1.234" })), true).unwrap_err(),
        );
        assert_eq!(
            places["price"],
            json!(["Ensure that there are no more than 2 decimal places."])
        );

        let digits = field_errors(
            validate_recipe(&form(json!({ "price": "1000" })), true).unwrap_err(),
        );
        assert_eq!(
            digits["price"],
            json!(["Ensure that there are no more than 3 digits before the decimal point."])
        );

        let invalid = field_errors(
            validate_recipe(&form(json!({ "price": "cheap" })), true).unwrap_err(),
        );
        assert_eq!(invalid["price"], json!(["A valid number is required."]));
    }

    #[test]
    fn title_rules() {
        let blank = field_errors(validate_recipe(&form(json!({ "title": "  " })), true).unwrap_err());
        assert_eq!(blank["title"], json!(["This field may not be blank."]));

        let long = "x".repeat(MAX_NAME_LENGTH + 1);
        let too_long =
            field_errors(validate_recipe(&form(json!({ "title": long })), true).unwrap_err());
        assert_eq!(
            too_long["title"],
            json!(["Ensure this field has no more than 255 characters."])
        );
    }

    #[test]
    fn nested_names_report_per_item_errors() {
        let errors = field_errors(
            validate_recipe(
                &form(json!({ "tags": [{ "name": "Vegan" }, { "label": "x" }, "Dinner"] })),
                true,
            )
            .unwrap_err(),
        );

        assert_eq!(
            errors["tags"],
            json!([
                {},
                { "name": ["This field is required."] },
                { "non_field_errors": ["Invalid data. Expected a dictionary, but got str."] },
            ])
        );
    }

    #[test]
    fn nested_names_are_collected_in_order() {
        let changes = validate_recipe(
            &form(json!({
                "tags": [{ "name": "Vegan" }, { "name": "Dinner" }],
                "ingredients": [],
            })),
            true,
        )
        .unwrap();

        assert_eq!(
            changes.tags,
            Some(vec![String::from("Vegan"), String::from("Dinner")])
        );
        assert_eq!(changes.ingredients, Some(vec![]));
    }

    #[test]
    fn attr_name_required_unless_partial() {
        let err = field_errors(validate_attr(&form(json!({})), false).unwrap_err());
        assert_eq!(err["name"], json!(["This field is required."]));

        assert_eq!(validate_attr(&form(json!({})), true).unwrap(), None);
        assert_eq!(
            validate_attr(&form(json!({ "name": "Lunch" })), false).unwrap(),
            Some(String::from("Lunch"))
        );
    }
}
