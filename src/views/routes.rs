use std::{convert::Infallible, sync::Arc};

use futures_util::{pin_mut, Stream, StreamExt};
use warp::{
    filters::BoxedFilter,
    http::Method,
    hyper::body::{Buf, Bytes},
    reject::{self, Rejection},
    reply::Response,
    Filter, Reply,
};

use crate::{
    constants::{API_APP, API_ROOT},
    middleware::with_session,
    permissions::Action,
    rejection::{handle_rejection, ApiError},
    schema::Uuid,
    session::SessionData,
    store::Store,
};

use super::{
    attributes::BaseRecipeAttrViewSet,
    recipes::RecipeViewSet,
    viewset::{ViewRequest, ViewSet},
};

fn with_viewset(
    viewset: Arc<dyn ViewSet>,
) -> impl Filter<Extract = (Arc<dyn ViewSet>,), Error = Infallible> + Clone {
    warp::any().map(move || viewset.clone())
}

/// Reads the request body, refusing it as soon as it is known to exceed
/// `max_body_bytes`: up front from `content-length`, otherwise while the
/// chunks arrive.
fn with_body(max_body_bytes: u64) -> impl Filter<Extract = (Bytes,), Error = Rejection> + Clone {
    warp::header::optional::<u64>("content-length")
        .and(warp::body::stream())
        .and_then(move |length: Option<u64>, body| read_body(length, body, max_body_bytes))
}

async fn read_body<S, B>(length: Option<u64>, body: S, max_body_bytes: u64) -> Result<Bytes, Rejection>
where
    S: Stream<Item = Result<B, warp::Error>>,
    B: Buf,
{
    if length.is_some_and(|length| length > max_body_bytes) {
        return Err(reject::custom(ApiError::PayloadTooLarge(max_body_bytes)));
    }

    pin_mut!(body);
    let mut buffer: Vec<u8> = Vec::new();
    while let Some(chunk) = body.next().await {
        let mut chunk = chunk.map_err(|e| {
            reject::custom(ApiError::BadRequest(format!("Failed to read request body: {e}")))
        })?;

        if (buffer.len() + chunk.remaining()) as u64 > max_body_bytes {
            return Err(reject::custom(ApiError::PayloadTooLarge(max_body_bytes)));
        }
        while chunk.has_remaining() {
            let bytes = chunk.chunk();
            let read = bytes.len();
            buffer.extend_from_slice(bytes);
            chunk.advance(read);
        }
    }

    Ok(Bytes::from(buffer))
}

/// Mounts `<resource>/` and `<resource>/<pk>/` for a viewset. Every method
/// reaches the viewset's dispatcher once the caller is authenticated, so an
/// unsupported method answers 405 only to authenticated callers. The body
/// limit is also applied only after authentication.
pub fn viewset_routes(
    viewset: Arc<dyn ViewSet>,
    store: Arc<dyn Store>,
    max_body_bytes: u64,
) -> BoxedFilter<(Response,)> {
    let prefix = viewset.resource().path();

    let collection = warp::path(prefix)
        .and(warp::path::end())
        .map(|| None::<Uuid>);
    let detail = warp::path(prefix)
        .and(warp::path::param::<Uuid>())
        .and(warp::path::end())
        .map(Some);

    collection
        .or(detail)
        .unify()
        .and(warp::method())
        .and(with_session(store))
        .and(with_body(max_body_bytes))
        .and(with_viewset(viewset))
        .and_then(
            |pk: Option<Uuid>,
             method: Method,
             session: SessionData,
             body: Bytes,
             viewset: Arc<dyn ViewSet>| async move {
                Ok::<_, Rejection>(dispatch(pk, method, session, body, viewset).await)
            },
        )
        .boxed()
}

async fn dispatch(
    pk: Option<Uuid>,
    method: Method,
    session: SessionData,
    body: Bytes,
    viewset: Arc<dyn ViewSet>,
) -> Response {
    let action = match Action::resolve(&method, pk.is_some()) {
        Some(action) if action.permitted(viewset.resource()) => action,
        _ => return ApiError::MethodNotAllowed(method.to_string()).into_response(),
    };

    log::debug!(
        "{} {} by user {}",
        viewset.resource().path(),
        action.name(),
        session.user_id
    );

    let request = ViewRequest {
        method,
        action,
        session,
        pk,
        body,
    };

    match viewset.dispatch(request).await {
        Ok(response) => response,
        Err(e) => e.into_response(),
    }
}

/// The whole API under `/api/recipe/`, with rejections rendered as JSON.
pub fn routes(
    store: Arc<dyn Store>,
    max_body_bytes: u64,
) -> impl Filter<Extract = (impl Reply,), Error = Infallible> + Clone {
    let recipes: Arc<dyn ViewSet> = Arc::new(RecipeViewSet::new(store.clone()));
    let tags: Arc<dyn ViewSet> = Arc::new(BaseRecipeAttrViewSet::tags(store.clone()));
    let ingredients: Arc<dyn ViewSet> = Arc::new(BaseRecipeAttrViewSet::ingredients(store.clone()));

    warp::path(API_ROOT)
        .and(warp::path(API_APP))
        .and(
            viewset_routes(recipes, store.clone(), max_body_bytes)
                .or(viewset_routes(tags, store.clone(), max_body_bytes))
                .unify()
                .or(viewset_routes(ingredients, store, max_body_bytes))
                .unify(),
        )
        .recover(handle_rejection)
        .unify()
        .with(warp::log("recipe_api"))
}
