use std::{collections::HashMap, str::FromStr};

use serde_json::Value;

use super::error::TypeError;

pub type FormData = HashMap<String, Value>;

/// Loosely typed request body. Every getter returns `Ok(None)` for an
/// absent key so the caller decides whether the field is required.
pub struct Form {
    inner: HashMap<String, Value>,
}

impl Form {
    pub fn from_data(data: FormData) -> Self {
        Self { inner: data }
    }

    pub fn get_str(&self, key: &str) -> Result<Option<String>, TypeError> {
        match self.inner.get(key) {
            Some(Value::String(v)) => Ok(Some(v.trim().to_string())),
            Some(Value::Number(v)) => Ok(Some(v.to_string())),
            Some(Value::Null) => Err(TypeError::new("This field may not be null.")),
            Some(_) => Err(TypeError::new("Not a valid string.")),
            None => Ok(None),
        }
    }

    pub fn get_number<T>(&self, key: &str, invalid: &str) -> Result<Option<T>, TypeError>
    where
        T: FromStr,
    {
        let raw = match self.inner.get(key) {
            Some(Value::Number(v)) => v.to_string(),
            Some(Value::String(v)) => v.trim().to_string(),
            Some(Value::Null) => return Err(TypeError::new("This field may not be null.")),
            Some(_) => return Err(TypeError::new(invalid)),
            None => return Ok(None),
        };

        raw.parse()
            .map(Some)
            .map_err(|_e| TypeError::new(invalid))
    }

    pub fn get_list(&self, key: &str) -> Result<Option<Vec<Value>>, TypeError> {
        match self.inner.get(key) {
            Some(Value::Array(items)) => Ok(Some(items.to_owned())),
            Some(other) => Err(TypeError::new(&format!(
                "Expected a list of items but got type \"{}\".",
                type_name(other)
            ))),
            None => Ok(None),
        }
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "str",
        Value::Array(_) => "list",
        Value::Object(_) => "dict",
    }
}
