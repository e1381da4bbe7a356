use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum QueryError {
    #[error("Unique constraint violated ({0})")]
    Conflict(String),

    #[error("{0}")]
    Database(String),
}

impl From<sqlx::Error> for QueryError {
    fn from(value: sqlx::Error) -> Self {
        match value {
            sqlx::Error::Database(e) if e.is_unique_violation() => {
                Self::Conflict(e.constraint().unwrap_or("unknown").to_string())
            }
            sqlx::Error::Database(e) => Self::Database(format!("{e}")),
            sqlx::Error::RowNotFound => Self::Database(String::from("RowNotFound")),
            sqlx::Error::ColumnNotFound(e) => Self::Database(format!("Column not found: {e}")),
            sqlx::Error::ColumnDecode { index, source } => {
                Self::Database(format!("Column decode {index} ({source})"))
            }
            sqlx::Error::PoolTimedOut => Self::Database(String::from("Pool timed out")),
            sqlx::Error::PoolClosed => Self::Database(String::from("Pool closed")),
            sqlx::Error::WorkerCrashed => Self::Database(String::from("Worker crashed")),
            e => Self::Database(format!("{e}")),
        }
    }
}

/// Field name to the problems found with it: a list of messages, or one
/// error object per item for nested lists.
pub type FieldErrors = Map<String, Value>;

/// A single value that failed to convert into its field type.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("{info}")]
pub struct TypeError {
    info: String,
}

impl TypeError {
    pub fn new(info: &str) -> Self {
        Self {
            info: info.to_string(),
        }
    }

    pub fn required() -> Self {
        Self::new("This field is required.")
    }

    pub fn blank() -> Self {
        Self::new("This field may not be blank.")
    }

    pub fn max_length(limit: usize) -> Self {
        Self::new(&format!("Ensure this field has no more than {limit} characters."))
    }

    pub fn into_info(self) -> String {
        self.info
    }
}
