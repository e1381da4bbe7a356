use std::{convert::Infallible, sync::Arc};

use warp::{reject::Rejection, Filter};

use crate::store::Store;

use super::session::{authenticate, SessionData};

pub fn with_store(
    store: Arc<dyn Store>,
) -> impl Filter<Extract = (Arc<dyn Store>,), Error = Infallible> + Clone {
    warp::any().map(move || store.clone())
}

/// Resolves the `Authorization` header to a session, or rejects with
/// `ApiError::Unauthorized`.
pub fn with_session(
    store: Arc<dyn Store>,
) -> impl Filter<Extract = (SessionData,), Error = Rejection> + Clone {
    warp::header::optional::<String>("authorization")
        .and(with_store(store))
        .and_then(|header: Option<String>, store: Arc<dyn Store>| async move {
            authenticate(header.as_deref(), store.as_ref())
                .await
                .map_err(warp::reject::custom)
        })
}
