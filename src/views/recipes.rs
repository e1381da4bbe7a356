use std::sync::Arc;

use async_trait::async_trait;
use warp::{http::StatusCode, reply::Response};

use crate::{
    permissions::{Action, Resource},
    queryset::{OrderBy, QuerySet},
    rejection::ApiError,
    schema::Uuid,
    serializers::{validate_new_recipe, validate_recipe, RecipeSerializerClass},
    session::SessionData,
    store::Store,
};

use super::viewset::{no_content, respond, ViewRequest, ViewSet};

/// Full CRUD over the caller's recipes.
pub struct RecipeViewSet {
    store: Arc<dyn Store>,
}

impl RecipeViewSet {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub fn get_queryset(&self, session: &SessionData) -> QuerySet {
        QuerySet::owned_by(session.user_id).order_by(OrderBy::IdDesc)
    }

    /// Lists use the lightweight shape, everything else the detail shape.
    pub fn get_serializer_class(&self, action: Action) -> RecipeSerializerClass {
        if action == Action::List {
            return RecipeSerializerClass::Recipe;
        }

        RecipeSerializerClass::RecipeDetail
    }

    async fn list(&self, request: &ViewRequest) -> Result<Response, ApiError> {
        let qs = self.get_queryset(&request.session);
        let serializer = self.get_serializer_class(request.action);

        let rows = self.store.list_recipes(&qs).await?;
        let data: Vec<_> = rows.iter().map(|r| serializer.represent(r)).collect();

        Ok(respond(StatusCode::OK, &data))
    }

    async fn retrieve(&self, request: &ViewRequest, pk: Uuid) -> Result<Response, ApiError> {
        let qs = self.get_queryset(&request.session);
        let serializer = self.get_serializer_class(request.action);

        let recipe = self.store.get_recipe(&qs, pk).await?.ok_or(ApiError::NotFound)?;

        Ok(respond(StatusCode::OK, &serializer.represent(&recipe)))
    }

    async fn create(&self, request: &ViewRequest) -> Result<Response, ApiError> {
        let serializer = self.get_serializer_class(request.action);
        let recipe = validate_new_recipe(&request.form()?)?;

        // owner always comes from the session, never from the body
        let recipe = self
            .store
            .create_recipe(request.session.user_id, recipe)
            .await?;
        log::info!("User {} created recipe {}", request.session.user_id, recipe.id);

        Ok(respond(StatusCode::CREATED, &serializer.represent(&recipe)))
    }

    async fn update(&self, request: &ViewRequest, pk: Uuid) -> Result<Response, ApiError> {
        let qs = self.get_queryset(&request.session);
        let serializer = self.get_serializer_class(request.action);
        let partial = request.action == Action::PartialUpdate;

        // an invisible row is reported before the body is looked at
        self.store.get_recipe(&qs, pk).await?.ok_or(ApiError::NotFound)?;

        let changes = validate_recipe(&request.form()?, partial)?;
        let recipe = self
            .store
            .update_recipe(&qs, pk, changes)
            .await?
            .ok_or(ApiError::NotFound)?;

        Ok(respond(StatusCode::OK, &serializer.represent(&recipe)))
    }

    async fn destroy(&self, request: &ViewRequest, pk: Uuid) -> Result<Response, ApiError> {
        let qs = self.get_queryset(&request.session);

        if !self.store.delete_recipe(&qs, pk).await? {
            return Err(ApiError::NotFound);
        }
        log::info!("User {} deleted recipe {pk}", request.session.user_id);

        Ok(no_content())
    }
}

#[async_trait]
impl ViewSet for RecipeViewSet {
    fn resource(&self) -> Resource {
        Resource::Recipe
    }

    async fn dispatch(&self, request: ViewRequest) -> Result<Response, ApiError> {
        match request.action {
            Action::List => self.list(&request).await,
            Action::Create => self.create(&request).await,
            Action::Retrieve => self.retrieve(&request, request.pk()?).await,
            Action::Update | Action::PartialUpdate => self.update(&request, request.pk()?).await,
            Action::Destroy => self.destroy(&request, request.pk()?).await,
        }
    }
}
