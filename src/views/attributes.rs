use std::sync::Arc;

use async_trait::async_trait;
use warp::{http::StatusCode, reply::Response};

use crate::{
    error::QueryError,
    permissions::{Action, Resource},
    queryset::{OrderBy, QuerySet},
    rejection::ApiError,
    schema::{AttrKind, Uuid},
    serializers::{validate_attr, RecipeAttrSerializer},
    session::SessionData,
    store::Store,
};

use super::viewset::{no_content, respond, ViewRequest, ViewSet};

/// List, update and delete over one of the caller's recipe attribute
/// collections. Attributes are only ever created through a recipe.
pub struct BaseRecipeAttrViewSet {
    kind: AttrKind,
    store: Arc<dyn Store>,
}

pub type TagViewSet = BaseRecipeAttrViewSet;
pub type IngredientViewSet = BaseRecipeAttrViewSet;

impl BaseRecipeAttrViewSet {
    pub fn tags(store: Arc<dyn Store>) -> TagViewSet {
        Self {
            kind: AttrKind::Tag,
            store,
        }
    }

    pub fn ingredients(store: Arc<dyn Store>) -> IngredientViewSet {
        Self {
            kind: AttrKind::Ingredient,
            store,
        }
    }

    pub fn get_queryset(&self, session: &SessionData) -> QuerySet {
        QuerySet::owned_by(session.user_id).order_by(OrderBy::NameDesc)
    }

    async fn list(&self, request: &ViewRequest) -> Result<Response, ApiError> {
        let qs = self.get_queryset(&request.session);

        let rows = self.store.list_attrs(self.kind, &qs).await?;
        let data: Vec<RecipeAttrSerializer> = rows.iter().map(RecipeAttrSerializer::from).collect();

        Ok(respond(StatusCode::OK, &data))
    }

    async fn update(&self, request: &ViewRequest, pk: Uuid) -> Result<Response, ApiError> {
        let qs = self.get_queryset(&request.session);
        let partial = request.action == Action::PartialUpdate;

        self.store
            .update_attr(self.kind, &qs, pk, None)
            .await?
            .ok_or(ApiError::NotFound)?;

        let name = validate_attr(&request.form()?, partial)?;
        let attr = match self.store.update_attr(self.kind, &qs, pk, name).await {
            Ok(attr) => attr.ok_or(ApiError::NotFound)?,
            Err(QueryError::Conflict(constraint)) => {
                log::debug!("Rename of {} {pk} hit {constraint}", self.kind.label());
                return Err(ApiError::field(
                    "name",
                    &format!("{} with this name already exists.", self.kind.label()),
                ));
            }
            Err(e) => return Err(e.into()),
        };

        Ok(respond(StatusCode::OK, &RecipeAttrSerializer::from(&attr)))
    }

    async fn destroy(&self, request: &ViewRequest, pk: Uuid) -> Result<Response, ApiError> {
        let qs = self.get_queryset(&request.session);

        if !self.store.delete_attr(self.kind, &qs, pk).await? {
            return Err(ApiError::NotFound);
        }
        log::info!(
            "User {} deleted {} {pk}",
            request.session.user_id,
            self.kind.label()
        );

        Ok(no_content())
    }
}

#[async_trait]
impl ViewSet for BaseRecipeAttrViewSet {
    fn resource(&self) -> Resource {
        self.kind.into()
    }

    async fn dispatch(&self, request: ViewRequest) -> Result<Response, ApiError> {
        match request.action {
            Action::List => self.list(&request).await,
            Action::Update | Action::PartialUpdate => self.update(&request, request.pk()?).await,
            Action::Destroy => self.destroy(&request, request.pk()?).await,
            Action::Retrieve | Action::Create => {
                Err(ApiError::MethodNotAllowed(request.method.to_string()))
            }
        }
    }
}
