use crate::{
    constants::AUTH_HEADER_KEYWORD,
    rejection::ApiError,
    schema::{User, Uuid},
    store::Store,
};

/// Identity of the caller, attached to every authenticated request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionData {
    pub user_id: Uuid,
    pub email: String,
}

impl From<User> for SessionData {
    fn from(value: User) -> Self {
        SessionData {
            user_id: value.id,
            email: value.email,
        }
    }
}

/// Extracts the token key from an `Authorization: Token <key>` header.
///
/// `Ok(None)` means the request carries no token credentials at all, which
/// includes headers that use some other scheme.
pub fn parse_token_header(header: Option<&str>) -> Result<Option<String>, ApiError> {
    let parts: Vec<&str> = match header {
        Some(header) => header.split_whitespace().collect(),
        None => return Ok(None),
    };

    match parts.as_slice() {
        [] => Ok(None),
        [keyword, ..] if !keyword.eq_ignore_ascii_case(AUTH_HEADER_KEYWORD) => Ok(None),
        [_] => Err(ApiError::Unauthorized(String::from(
            "Invalid token header. No credentials provided.",
        ))),
        [_, key] => Ok(Some(key.to_string())),
        _ => Err(ApiError::Unauthorized(String::from(
            "Invalid token header. Token string should not contain spaces.",
        ))),
    }
}

pub async fn authenticate(header: Option<&str>, store: &dyn Store) -> Result<SessionData, ApiError> {
    let key = parse_token_header(header)?.ok_or_else(|| {
        ApiError::Unauthorized(String::from(
            "Authentication credentials were not provided.",
        ))
    })?;

    let user = store.get_token_user(&key).await?;

    match user {
        Some(user) if user.is_active => Ok(user.into()),
        Some(user) => {
            log::debug!("Rejected token of inactive user {}", user.id);
            Err(ApiError::Unauthorized(String::from("User inactive or deleted.")))
        }
        None => Err(ApiError::Unauthorized(String::from("Invalid token."))),
    }
}
